//! MIDI output using midir
use midir::{MidiOutput, MidiOutputConnection};

use crate::error::{Error, Result};
use crate::grid::Note;
use crate::playback::SoundEmitter;

const CLIENT_NAME: &str = "Music Sort MIDI Output";
const VELOCITY: u8 = 100;

/// Sends the swapped notes of each step as note-on messages, releasing the
/// previous step's notes first.
pub struct MidiOutputDevice {
    connection: Option<MidiOutputConnection>,
    held: Vec<u8>,
}

impl MidiOutputDevice {
    pub fn new() -> Self {
        Self {
            connection: None,
            held: Vec::new(),
        }
    }

    pub fn available_ports() -> Vec<String> {
        if let Ok(midi_out) = MidiOutput::new(CLIENT_NAME) {
            midi_out
                .ports()
                .iter()
                .filter_map(|p| midi_out.port_name(p).ok())
                .collect()
        } else {
            vec![]
        }
    }

    pub fn connect(&mut self, port_index: usize) -> Result<()> {
        let midi_out = MidiOutput::new(CLIENT_NAME)
            .map_err(|e| Error::Output(format!("Failed to create MIDI output: {}", e)))?;

        let ports = midi_out.ports();
        let port = ports
            .get(port_index)
            .ok_or_else(|| Error::Output(format!("Invalid MIDI port index {}", port_index)))?;

        let connection = midi_out
            .connect(port, "music-sort")
            .map_err(|e| Error::Output(format!("Failed to connect: {}", e)))?;

        self.disconnect();
        self.connection = Some(connection);
        log::info!("Connected MIDI output port {}", port_index);
        Ok(())
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    /// Notes currently held on.
    pub fn held(&self) -> &[u8] {
        &self.held
    }

    pub fn disconnect(&mut self) {
        let _ = self.release_all();
        self.connection = None;
    }

    fn send(&mut self, message: &[u8]) -> Result<()> {
        if let Some(ref mut conn) = self.connection {
            conn.send(message)
                .map_err(|e| Error::Output(format!("Failed to send MIDI: {}", e)))?;
        }
        Ok(())
    }

    fn release_all(&mut self) -> Result<()> {
        let held = std::mem::take(&mut self.held);
        let mut result = Ok(());
        for note in held {
            result = result.and(self.send(&[0x80, note, 0]));
        }
        result
    }
}

impl SoundEmitter for MidiOutputDevice {
    fn start(&mut self) -> Result<()> {
        self.release_all()
    }

    fn sound(&mut self, note_a: Option<Note>, note_b: Option<Note>) -> Result<()> {
        self.release_all()?;
        let mut notes: Vec<u8> = [note_a, note_b]
            .into_iter()
            .flatten()
            .map(Note::midi_number)
            .collect();
        notes.dedup();
        for note in notes {
            self.send(&[0x90, note, VELOCITY])?;
            self.held.push(note);
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<()> {
        self.release_all()
    }
}

impl Default for MidiOutputDevice {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unconnected_device_tracks_held_notes() {
        let mut device = MidiOutputDevice::new();
        device.sound(Some(Note::G), Some(Note::F)).unwrap();
        assert_eq!(device.held(), &[67, 65]);
        device.sound(Some(Note::C), Some(Note::C)).unwrap();
        assert_eq!(device.held(), &[60]);
        device.stop().unwrap();
        assert!(device.held().is_empty());
    }
}
