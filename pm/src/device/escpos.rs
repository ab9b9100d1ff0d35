//! ESC/POS thermal printer output

use std::fs::{File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::Path;

use tracing::debug;

use super::{Alignment, DeviceError, Emphasis, OutputDevice, Style, StyleUpdate};

const ESC: u8 = 0x1b;
const GS: u8 = 0x1d;

/// Lines fed before cutting so the last text clears the cutter
const FEED_BEFORE_CUT: u8 = 3;

/// Largest character magnification supported by `GS !`
const MAX_SCALE: u8 = 8;

/// Writes ESC/POS control sequences to a printer byte stream
pub struct EscPosDevice<W: Write> {
    out: W,
    style: Style,
}

impl EscPosDevice<BufWriter<File>> {
    /// Open a printer device node such as `/dev/usb/lp0`
    pub fn open(path: &Path) -> Result<Self, DeviceError> {
        debug!(path = %path.display(), "EscPosDevice::open: called");
        let file = OpenOptions::new()
            .write(true)
            .open(path)
            .map_err(|source| DeviceError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        Self::new(BufWriter::new(file))
    }
}

impl<W: Write> EscPosDevice<W> {
    /// Wrap a byte stream and reset the printer
    pub fn new(mut out: W) -> Result<Self, DeviceError> {
        out.write_all(&[ESC, b'@'])?;
        Ok(Self {
            out,
            style: Style::default(),
        })
    }

    /// Current effective style
    pub fn style(&self) -> Style {
        self.style
    }

    /// Consume the device and return the byte stream
    pub fn into_inner(self) -> W {
        self.out
    }
}

impl<W: Write> OutputDevice for EscPosDevice<W> {
    fn set_style(&mut self, update: StyleUpdate) -> Result<(), DeviceError> {
        self.style.apply(&update);

        if let Some(alignment) = update.alignment {
            let n = match alignment {
                Alignment::Left => 0,
                Alignment::Center => 1,
            };
            self.out.write_all(&[ESC, b'a', n])?;
        }
        if let Some(emphasis) = update.emphasis {
            let n = match emphasis {
                Emphasis::Normal => 0,
                Emphasis::Bold => 1,
            };
            self.out.write_all(&[ESC, b'E', n])?;
        }
        if update.width_scale.is_some() || update.height_scale.is_some() {
            let width = self.style.width_scale.clamp(1, MAX_SCALE) - 1;
            let height = self.style.height_scale.clamp(1, MAX_SCALE) - 1;
            self.out.write_all(&[GS, b'!', (width << 4) | height])?;
        }
        Ok(())
    }

    fn write(&mut self, text: &str) -> Result<(), DeviceError> {
        self.out.write_all(&encode_cp437(text))?;
        Ok(())
    }

    fn cut(&mut self) -> Result<(), DeviceError> {
        debug!("EscPosDevice::cut: called");
        self.out.write_all(&[ESC, b'd', FEED_BEFORE_CUT])?;
        self.out.write_all(&[GS, b'V', 0])?;
        self.out.flush()?;
        Ok(())
    }

    fn unicode(&self) -> bool {
        false
    }
}

/// Encode text for the printer's default code page (CP437)
///
/// ASCII passes through and the degree sign maps to its CP437 slot. Other
/// characters are transliterated to ASCII (`Příliš` prints as `Prilis`);
/// `?` is left only for characters with no transliteration.
fn encode_cp437(text: &str) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(text.len());
    for c in text.chars() {
        match c {
            c if c.is_ascii() => bytes.push(c as u8),
            '°' => bytes.push(0xf8),
            c => match deunicode::deunicode_char(c) {
                Some(ascii) if !ascii.is_empty() => bytes.extend(ascii.bytes().filter(u8::is_ascii)),
                _ => bytes.push(b'?'),
            },
        }
    }
    bytes
}
