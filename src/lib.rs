/// Music Sort - hear and watch comparison sorts
///
/// This library provides the core components for sort playback:
/// - A grid of notes, one per column, placed by pitch
/// - Trace generators for bubble, insertion and selection sort
/// - A playback engine that steps through a trace on a fixed cadence
/// - Audio and MIDI output for the swapped notes

pub mod audio;
pub mod config;
pub mod error;
pub mod grid;
pub mod midi;
pub mod playback;
pub mod render;
pub mod sort;

// Re-export commonly used types
pub use audio::AudioOutput;
pub use config::Config;
pub use error::{Error, Result};
pub use grid::{note_to_frequency, Grid, Note, Sequence};
pub use midi::MidiOutputDevice;
pub use playback::timer::{ManualTimer, ThreadTimer, Timer, TimerId};
pub use playback::{OutputPair, PlaybackEngine, PlaybackState, SoundEmitter, StepRenderer};
pub use render::{Frame, FrameRenderer, TextRenderer};
pub use sort::{Algorithm, Step, Trace};
