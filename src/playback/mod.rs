//! Playback engine - walks a trace on a fixed cadence and drives the outputs
use std::time::Duration;

use crate::error::Result;
use crate::grid::{Note, Sequence};
use crate::sort::{Algorithm, Trace};

pub mod timer;

use timer::{Timer, TimerId};

/// Reference delay between dispatched steps.
pub const DEFAULT_STEP_INTERVAL: Duration = Duration::from_millis(1000);

/// Paints one step of a trace.
pub trait StepRenderer {
    fn render(
        &mut self,
        snapshot: &Sequence,
        highlight_a: Option<usize>,
        highlight_b: Option<usize>,
    ) -> Result<()>;
}

/// Sounds the swapped pitches of each step.
///
/// `start` is called every time playback (re)starts and must leave the
/// emitter ready to sound, recreating any underlying handle that cannot be
/// restarted. `stop` silences it.
pub trait SoundEmitter {
    fn start(&mut self) -> Result<()>;
    fn sound(&mut self, note_a: Option<Note>, note_b: Option<Note>) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
}

/// Fans out to two emitters. Each leg is driven only while it is started,
/// so one dead output never silences the other.
pub struct OutputPair<A: SoundEmitter, B: SoundEmitter> {
    first: A,
    second: B,
    first_live: bool,
    second_live: bool,
}

impl<A: SoundEmitter, B: SoundEmitter> OutputPair<A, B> {
    pub fn new(first: A, second: B) -> Self {
        Self {
            first,
            second,
            first_live: false,
            second_live: false,
        }
    }

    pub fn first(&self) -> &A {
        &self.first
    }

    pub fn first_mut(&mut self) -> &mut A {
        &mut self.first
    }

    pub fn second(&self) -> &B {
        &self.second
    }

    pub fn second_mut(&mut self) -> &mut B {
        &mut self.second
    }
}

impl<A: SoundEmitter, B: SoundEmitter> SoundEmitter for OutputPair<A, B> {
    /// Fails only when neither leg could start.
    fn start(&mut self) -> Result<()> {
        let first = self.first.start();
        let second = self.second.start();
        self.first_live = first.is_ok();
        self.second_live = second.is_ok();
        match (first, second) {
            (Err(e), Err(_)) => Err(e),
            (Err(e), Ok(())) | (Ok(()), Err(e)) => {
                log::warn!("One sound output unavailable: {}", e);
                Ok(())
            }
            (Ok(()), Ok(())) => Ok(()),
        }
    }

    fn sound(&mut self, note_a: Option<Note>, note_b: Option<Note>) -> Result<()> {
        let mut result = Ok(());
        if self.first_live {
            result = result.and(self.first.sound(note_a, note_b));
        }
        if self.second_live {
            result = result.and(self.second.sound(note_a, note_b));
        }
        result
    }

    fn stop(&mut self) -> Result<()> {
        let mut result = Ok(());
        if std::mem::take(&mut self.first_live) {
            result = result.and(self.first.stop());
        }
        if std::mem::take(&mut self.second_live) {
            result = result.and(self.second.stop());
        }
        result
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Playing,
    Paused,
    /// Every step has been dispatched.
    Finished,
}

/// Owns the trace being played, the cursor into it, and the single
/// pending tick.
pub struct PlaybackEngine<T: Timer, R: StepRenderer, S: SoundEmitter> {
    timer: T,
    renderer: R,
    emitter: S,
    interval: Duration,
    trace: Option<Trace>,
    index: usize,
    state: PlaybackState,
    pending: Option<TimerId>,
    sounding: bool,
}

impl<T: Timer, R: StepRenderer, S: SoundEmitter> PlaybackEngine<T, R, S> {
    pub fn new(timer: T, renderer: R, emitter: S, interval: Duration) -> Self {
        Self {
            timer,
            renderer,
            emitter,
            interval,
            trace: None,
            index: 0,
            state: PlaybackState::Idle,
            pending: None,
            sounding: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    pub fn trace(&self) -> Option<&Trace> {
        self.trace.as_ref()
    }

    /// Index of the next step to dispatch.
    pub fn position(&self) -> usize {
        self.index
    }

    pub fn has_pending_tick(&self) -> bool {
        self.pending.is_some()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Takes effect from the next armed tick.
    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn emitter(&self) -> &S {
        &self.emitter
    }

    pub fn emitter_mut(&mut self) -> &mut S {
        &mut self.emitter
    }

    pub fn timer(&self) -> &T {
        &self.timer
    }

    pub fn timer_mut(&mut self) -> &mut T {
        &mut self.timer
    }

    /// Replaces the trace and rewinds without playing.
    pub fn load(&mut self, trace: Trace) {
        self.cancel_pending();
        self.release_sound();
        log::info!("Loaded {} trace with {} steps", trace.algorithm(), trace.len());
        self.trace = Some(trace);
        self.index = 0;
        self.state = PlaybackState::Idle;
    }

    /// Replaces the trace, rewinds, and starts ticking straight away.
    pub fn load_and_play(&mut self, trace: Trace) {
        self.load(trace);
        self.begin();
    }

    /// Starts playing `trace` from its first step. Ignored while already playing.
    pub fn start(&mut self, trace: Trace) {
        if self.is_playing() {
            log::debug!("Start ignored, already playing");
            return;
        }
        self.load_and_play(trace);
    }

    /// Swaps in a new trace, keeping playback running if it was.
    pub fn switch_algorithm(&mut self, trace: Trace) {
        if self.is_playing() {
            self.load_and_play(trace);
        } else {
            self.load(trace);
        }
    }

    /// Generates and switches to the named algorithm's trace over `initial`.
    /// An unknown name leaves the current trace in place.
    pub fn select(&mut self, name: &str, initial: &Sequence) -> Result<Algorithm> {
        let algorithm = name.parse::<Algorithm>().map_err(|e| {
            log::warn!("{}, keeping current trace", e);
            e
        })?;
        self.switch_algorithm(algorithm.trace(initial));
        Ok(algorithm)
    }

    /// Plays the loaded trace: resumes when paused, rewinds when finished.
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Playing => {}
            PlaybackState::Paused => self.resume(),
            PlaybackState::Idle | PlaybackState::Finished => {
                if self.trace.is_none() {
                    log::warn!("Play requested with no trace loaded");
                    return;
                }
                self.index = 0;
                self.begin();
            }
        }
    }

    pub fn pause(&mut self) {
        if self.state != PlaybackState::Playing {
            return;
        }
        self.cancel_pending();
        self.release_sound();
        self.state = PlaybackState::Paused;
        log::debug!("Paused at step {}", self.index);
    }

    pub fn resume(&mut self) {
        if self.state == PlaybackState::Paused {
            self.begin();
        }
    }

    /// Cancels the pending tick and silences output. Safe to repeat.
    pub fn stop(&mut self) {
        self.cancel_pending();
        self.release_sound();
        self.index = 0;
        if self.state != PlaybackState::Idle {
            log::debug!("Stopped");
        }
        self.state = PlaybackState::Idle;
    }

    /// Runs every tick the timer reports as due.
    pub fn poll(&mut self) {
        for id in self.timer.fired() {
            self.on_timer(id);
        }
    }

    /// Handles one fired tick. Ticks that are no longer pending are dropped.
    pub fn on_timer(&mut self, id: TimerId) {
        if self.pending != Some(id) {
            log::debug!("Dropping stale tick {:?}", id);
            return;
        }
        self.pending = None;
        if self.state == PlaybackState::Playing {
            self.tick();
        }
    }

    fn tick(&mut self) {
        let Some(trace) = self.trace.as_ref() else {
            self.state = PlaybackState::Idle;
            return;
        };

        let Some(step) = trace.get(self.index) else {
            log::info!("{} trace finished after {} steps", trace.algorithm(), trace.len());
            self.state = PlaybackState::Finished;
            self.release_sound();
            return;
        };

        log::debug!(
            "Step {}/{}: {} swap {:?} {:?}",
            self.index + 1,
            trace.len(),
            step.snapshot,
            step.index_a,
            step.index_b
        );

        if let Err(e) = self
            .renderer
            .render(&step.snapshot, step.index_a, step.index_b)
        {
            log::warn!("Render failed at step {}: {}", self.index, e);
        }

        let (note_a, note_b) = step.swapped_notes();
        if self.sounding && (note_a.is_some() || note_b.is_some()) {
            if let Err(e) = self.emitter.sound(note_a, note_b) {
                log::warn!("Sound failed at step {}: {}", self.index, e);
            }
        }

        self.index += 1;
        self.arm(self.interval);
    }

    fn begin(&mut self) {
        // Always restart the emitter; some outputs cannot be resumed.
        self.release_sound();
        match self.emitter.start() {
            Ok(()) => self.sounding = true,
            Err(e) => log::warn!("Sound output unavailable: {}", e),
        }
        self.state = PlaybackState::Playing;
        self.arm(Duration::ZERO);
    }

    fn arm(&mut self, delay: Duration) {
        self.cancel_pending();
        self.pending = Some(self.timer.schedule(delay));
    }

    fn cancel_pending(&mut self) {
        if let Some(id) = self.pending.take() {
            self.timer.cancel(id);
        }
    }

    fn release_sound(&mut self) {
        if !self.sounding {
            return;
        }
        self.sounding = false;
        if let Err(e) = self.emitter.stop() {
            log::warn!("Failed to stop sound: {}", e);
        }
    }
}
