//! Console simulation of the printer

use std::io::Write;

use colored::Colorize;
use tracing::debug;

use super::{Alignment, DeviceError, Emphasis, OutputDevice, Style, StyleUpdate};
use crate::layout;

/// Console column width used to center text in dry-run mode
pub const CONSOLE_WIDTH: usize = 50;

/// Prints the briefing to a writer instead of paper
///
/// Centered text is padded to the console width and bold text gets an ANSI
/// bold marker. The session is framed by banners on construction and on cut.
pub struct DryRunDevice<W: Write> {
    out: W,
    width: usize,
    style: Style,
}

impl<W: Write> DryRunDevice<W> {
    /// Create the device and print the opening banner
    pub fn new(out: W, width: usize) -> Result<Self, DeviceError> {
        debug!(width, "DryRunDevice::new: called");
        let mut device = Self {
            out,
            width,
            style: Style::default(),
        };
        device.banner("DRY RUN - PRINT SIMULATION")?;
        Ok(device)
    }

    /// Current effective style
    pub fn style(&self) -> Style {
        self.style
    }

    /// Consume the device and return the writer
    pub fn into_inner(self) -> W {
        self.out
    }

    fn banner(&mut self, title: &str) -> Result<(), DeviceError> {
        let rule = layout::rule('=', self.width);
        write!(self.out, "\n{rule}\n{title}\n{rule}\n\n")?;
        Ok(())
    }

    fn emphasize(&self, text: &str) -> String {
        match self.style.emphasis {
            Emphasis::Bold => text.bold().to_string(),
            Emphasis::Normal => text.to_string(),
        }
    }
}

impl<W: Write> OutputDevice for DryRunDevice<W> {
    fn set_style(&mut self, update: StyleUpdate) -> Result<(), DeviceError> {
        self.style.apply(&update);
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), DeviceError> {
        for piece in text.split_inclusive('\n') {
            let (line, newline) = match piece.strip_suffix('\n') {
                Some(line) => (line, "\n"),
                None => (piece, ""),
            };
            let line = match self.style.alignment {
                Alignment::Center if !line.is_empty() => layout::center(line, self.width).trim_end().to_string(),
                _ => line.to_string(),
            };
            let line = if line.is_empty() { line } else { self.emphasize(&line) };
            write!(self.out, "{line}{newline}")?;
        }
        Ok(())
    }

    fn cut(&mut self) -> Result<(), DeviceError> {
        debug!("DryRunDevice::cut: called");
        self.banner("END OF PRINT")?;
        self.out.flush()?;
        Ok(())
    }
}
