/// Presents a wireframe pixel buffer as colored terminal cells
use crossterm::{
    style::{Color as TermColor, Print, ResetColor, SetForegroundColor},
    QueueableCommand,
};
use std::io::Write;
use wire3d_core::{Color, PixelBuffer};

/// Character used for lit cells
const WIRE_CHAR: char = '#';

/// Maps one pixel to one terminal cell: background pixels become blanks,
/// everything else a colored glyph.
pub struct TerminalPresenter {
    background: u32,
}

impl TerminalPresenter {
    pub fn new(background: Color) -> Self {
        Self {
            background: background.to_argb(),
        }
    }

    /// Glyph for a packed pixel, `None` for background
    pub fn cell(&self, argb: u32) -> Option<(char, TermColor)> {
        if argb == self.background {
            return None;
        }
        let color = Color::from_packed(argb);
        Some((
            WIRE_CHAR,
            TermColor::Rgb {
                r: color.r,
                g: color.g,
                b: color.b,
            },
        ))
    }

    pub fn draw<W: Write>(&self, buffer: &PixelBuffer, writer: &mut W) -> std::io::Result<()> {
        let pixels = buffer.snapshot();
        let mut current: Option<TermColor> = None;

        for row in pixels.chunks(buffer.width().max(1)) {
            for &argb in row {
                match self.cell(argb) {
                    Some((c, color)) => {
                        if current != Some(color) {
                            writer.queue(SetForegroundColor(color))?;
                            current = Some(color);
                        }
                        writer.queue(Print(c))?;
                    }
                    None => {
                        writer.queue(Print(' '))?;
                    }
                }
            }
            writer.queue(Print("\r\n"))?;
        }
        writer.queue(ResetColor)?;
        Ok(())
    }
}
