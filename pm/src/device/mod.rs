//! Output devices for the briefing
//!
//! Everything the composer prints goes through [`OutputDevice`]: partial style
//! updates, text writes and a final paper cut. Two implementations exist:
//!
//! - [`DryRunDevice`] - console simulation used for testing a configuration
//! - [`EscPosDevice`] - ESC/POS byte stream for thermal receipt printers

use std::io;
use std::path::PathBuf;

use thiserror::Error;
use tracing::debug;

mod console;
mod escpos;

pub use console::{CONSOLE_WIDTH, DryRunDevice};
pub use escpos::EscPosDevice;

use crate::config::Config;

/// Errors raised by an output device
///
/// Any of these aborts the run: a briefing that cannot be printed is a hard failure.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("Failed to open printer at {path}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Device I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Horizontal text alignment
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Alignment {
    #[default]
    Left,
    Center,
}

/// Text weight
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Emphasis {
    #[default]
    Normal,
    Bold,
}

/// Effective style of a device
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Style {
    pub alignment: Alignment,
    pub emphasis: Emphasis,
    pub width_scale: u8,
    pub height_scale: u8,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            alignment: Alignment::Left,
            emphasis: Emphasis::Normal,
            width_scale: 1,
            height_scale: 1,
        }
    }
}

impl Style {
    /// Apply a partial update; unset fields keep their current value
    pub fn apply(&mut self, update: &StyleUpdate) {
        if let Some(alignment) = update.alignment {
            self.alignment = alignment;
        }
        if let Some(emphasis) = update.emphasis {
            self.emphasis = emphasis;
        }
        if let Some(width_scale) = update.width_scale {
            self.width_scale = width_scale;
        }
        if let Some(height_scale) = update.height_scale {
            self.height_scale = height_scale;
        }
    }
}

/// Partial style change passed to [`OutputDevice::set_style`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleUpdate {
    pub alignment: Option<Alignment>,
    pub emphasis: Option<Emphasis>,
    pub width_scale: Option<u8>,
    pub height_scale: Option<u8>,
}

impl StyleUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn align(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }

    pub fn left(self) -> Self {
        self.align(Alignment::Left)
    }

    pub fn center(self) -> Self {
        self.align(Alignment::Center)
    }

    pub fn bold(mut self) -> Self {
        self.emphasis = Some(Emphasis::Bold);
        self
    }

    pub fn normal(mut self) -> Self {
        self.emphasis = Some(Emphasis::Normal);
        self
    }

    pub fn scale(mut self, width: u8, height: u8) -> Self {
        self.width_scale = Some(width);
        self.height_scale = Some(height);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.alignment.is_none() && self.emphasis.is_none() && self.width_scale.is_none() && self.height_scale.is_none()
    }
}

/// A line-oriented output device
pub trait OutputDevice {
    /// Change some style attributes; the rest are retained
    fn set_style(&mut self, update: StyleUpdate) -> Result<(), DeviceError>;

    /// Write text; line breaks are part of `text`
    fn write(&mut self, text: &str) -> Result<(), DeviceError>;

    /// Finish the session (feed and cut paper, or print the closing banner)
    fn cut(&mut self) -> Result<(), DeviceError>;

    /// Whether emoji and other non-ASCII symbols render on this device
    fn unicode(&self) -> bool {
        true
    }
}

/// Open the device selected by configuration
///
/// Dry-run prints to stdout, otherwise ESC/POS is written to the printer device path.
pub fn open(config: &Config) -> Result<Box<dyn OutputDevice>, DeviceError> {
    debug!(dry_run = config.general.dry_run, "open: called");
    if config.general.dry_run {
        debug!("open: using console dry-run device");
        Ok(Box::new(DryRunDevice::new(io::stdout(), config.layout.console_width)?))
    } else {
        debug!(path = %config.printer.device_path.display(), "open: using ESC/POS printer");
        Ok(Box::new(EscPosDevice::open(&config.printer.device_path)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_retains_fields() {
        let mut style = Style::default();
        style.apply(&StyleUpdate::new().center().bold().scale(2, 2));
        style.apply(&StyleUpdate::new().normal());

        assert_eq!(style.alignment, Alignment::Center);
        assert_eq!(style.emphasis, Emphasis::Normal);
        assert_eq!(style.width_scale, 2);
        assert_eq!(style.height_scale, 2);
    }

    #[test]
    fn test_empty_update() {
        assert!(StyleUpdate::new().is_empty());
        assert!(!StyleUpdate::new().left().is_empty());
    }

    #[test]
    fn test_open_missing_printer_fails() {
        let mut config = Config::default();
        config.general.dry_run = false;
        config.printer.device_path = PathBuf::from("/nonexistent/printmaster/lp0");

        let err = open(&config).err().expect("opening a missing printer should fail");
        assert!(matches!(err, DeviceError::Open { .. }));
        assert!(err.to_string().contains("/nonexistent/printmaster/lp0"));
    }
}
