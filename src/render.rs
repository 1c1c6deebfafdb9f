//! Render adapters for dispatched steps
use std::io::Write;

use crate::error::{Error, Result};
use crate::grid::{Note, Sequence};
use crate::playback::StepRenderer;

/// The most recently rendered step, highlights included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub snapshot: Sequence,
    pub highlight_a: Option<usize>,
    pub highlight_b: Option<usize>,
}

impl Frame {
    pub fn unhighlighted(snapshot: Sequence) -> Self {
        Self {
            snapshot,
            highlight_a: None,
            highlight_b: None,
        }
    }

    pub fn is_highlighted(&self, col: usize) -> bool {
        self.highlight_a == Some(col) || self.highlight_b == Some(col)
    }
}

/// Keeps the latest frame for a GUI to paint on its next repaint.
#[derive(Debug, Default)]
pub struct FrameRenderer {
    frame: Option<Frame>,
}

impl FrameRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn frame(&self) -> Option<&Frame> {
        self.frame.as_ref()
    }

    pub fn clear(&mut self) {
        self.frame = None;
    }
}

impl StepRenderer for FrameRenderer {
    fn render(&mut self, snapshot: &Sequence, a: Option<usize>, b: Option<usize>) -> Result<()> {
        self.frame = Some(Frame {
            snapshot: snapshot.clone(),
            highlight_a: a,
            highlight_b: b,
        });
        Ok(())
    }
}

/// Draws each step as an ASCII grid, highest note on top.
pub struct TextRenderer<W: Write> {
    out: W,
}

impl<W: Write> TextRenderer<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

pub fn draw_text(frame: &Frame) -> String {
    let rows = frame.snapshot.display_rows();
    let mut text = String::new();
    for row in 0..Note::COUNT {
        for (col, note) in frame.snapshot.iter().enumerate() {
            let cell = if rows[col] != row {
                " . ".to_string()
            } else if frame.is_highlighted(col) {
                format!("[{}]", note)
            } else {
                format!(" {} ", note)
            };
            text.push_str(&cell);
        }
        text.push('\n');
    }
    text
}

impl<W: Write> StepRenderer for TextRenderer<W> {
    fn render(&mut self, snapshot: &Sequence, a: Option<usize>, b: Option<usize>) -> Result<()> {
        let frame = Frame {
            snapshot: snapshot.clone(),
            highlight_a: a,
            highlight_b: b,
        };
        writeln!(self.out, "{}", draw_text(&frame)).map_err(|e| Error::Output(e.to_string()))?;
        self.out.flush().map_err(|e| Error::Output(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_renderer_keeps_latest() {
        let mut renderer = FrameRenderer::new();
        assert!(renderer.frame().is_none());
        let seq: Sequence = "dc".parse().unwrap();
        renderer.render(&seq, Some(0), Some(1)).unwrap();
        let frame = renderer.frame().unwrap();
        assert!(frame.is_highlighted(0));
        assert!(frame.is_highlighted(1));
        assert!(!frame.is_highlighted(2));
        assert_eq!(frame.snapshot, seq);
    }

    #[test]
    fn test_text_grid_layout() {
        let frame = Frame {
            snapshot: "cb".parse().unwrap(),
            highlight_a: Some(1),
            highlight_b: None,
        };
        let text = draw_text(&frame);
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 7);
        assert_eq!(lines[0], " . [B]");
        assert_eq!(lines[6], " C  . ");
    }

    #[test]
    fn test_text_renderer_writes() {
        let mut renderer = TextRenderer::new(Vec::new());
        renderer
            .render(&"c".parse().unwrap(), None, None)
            .unwrap();
        let out = String::from_utf8(renderer.into_inner()).unwrap();
        assert!(out.ends_with(" C \n\n"));
    }
}
