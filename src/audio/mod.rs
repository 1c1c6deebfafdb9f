//! Tone output using cpal
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::{Arc, Mutex};

use crate::error::{Error, Result};
use crate::grid::Note;
use crate::playback::SoundEmitter;

pub const DEFAULT_GAIN: f32 = 0.05;

/// Two sine voices, one per swapped note.
///
/// The stream is torn down on `stop` and built fresh on every `start`, so
/// each playback run gets a stream that has never been paused.
pub struct AudioOutput {
    stream: Option<cpal::Stream>,
    voices: Arc<Mutex<[Option<f32>; 2]>>,
    gain: f32,
}

impl AudioOutput {
    pub fn new(gain: f32) -> Self {
        Self {
            stream: None,
            voices: Arc::new(Mutex::new([None, None])),
            gain,
        }
    }

    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }

    /// Frequencies currently sounding.
    pub fn voices(&self) -> [Option<f32>; 2] {
        self.voices.lock().map(|v| *v).unwrap_or([None, None])
    }

    fn set_voices(&self, voices: [Option<f32>; 2]) {
        if let Ok(mut lock) = self.voices.lock() {
            *lock = voices;
        }
    }

    fn setup_audio_stream(voices: Arc<Mutex<[Option<f32>; 2]>>, gain: f32) -> Result<cpal::Stream> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or_else(|| Error::Output("no output device available".to_string()))?;
        let config = device
            .default_output_config()
            .map_err(|e| Error::Output(e.to_string()))?;

        let sample_rate = config.sample_rate().0 as f32;
        let channels = config.channels() as usize;
        let mut phases = [0.0f32; 2];

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => device.build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let voices = voices.lock().unwrap();
                    let active = voices.iter().filter(|v| v.is_some()).count().max(1) as f32;

                    for frame in data.chunks_mut(channels) {
                        let mut value = 0.0;
                        for (voice, phase) in voices.iter().zip(phases.iter_mut()) {
                            match voice {
                                Some(frequency) => {
                                    value += (*phase * 2.0 * std::f32::consts::PI).sin();
                                    *phase += frequency / sample_rate;
                                    if *phase >= 1.0 {
                                        *phase -= 1.0;
                                    }
                                }
                                None => *phase = 0.0,
                            }
                        }
                        let sample = value / active * gain;
                        for out in frame.iter_mut() {
                            *out = sample;
                        }
                    }
                },
                |err| log::error!("Audio stream error: {}", err),
                None,
            ),
            format => {
                return Err(Error::Output(format!(
                    "unsupported sample format {:?}",
                    format
                )))
            }
        }
        .map_err(|e| Error::Output(e.to_string()))?;

        stream.play().map_err(|e| Error::Output(e.to_string()))?;
        Ok(stream)
    }
}

impl SoundEmitter for AudioOutput {
    fn start(&mut self) -> Result<()> {
        // Drop the previous stream before opening a new one.
        self.stream = None;
        self.set_voices([None, None]);
        let stream = Self::setup_audio_stream(Arc::clone(&self.voices), self.gain)?;
        self.stream = Some(stream);
        log::debug!("Audio stream opened");
        Ok(())
    }

    fn sound(&mut self, note_a: Option<Note>, note_b: Option<Note>) -> Result<()> {
        if self.stream.is_none() {
            return Err(Error::Output("audio stream not started".to_string()));
        }
        self.set_voices([note_a.map(Note::frequency), note_b.map(Note::frequency)]);
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.set_voices([None, None]);
        if self.stream.take().is_some() {
            log::debug!("Audio stream closed");
        }
        Ok(())
    }
}

impl Default for AudioOutput {
    fn default() -> Self {
        Self::new(DEFAULT_GAIN)
    }
}
