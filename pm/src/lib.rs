//! PrintMaster - daily briefing for receipt printers
//!
//! Gathers the day's weather, calendar agenda, news headlines and horoscope,
//! adds clothing advice and a joke, and prints the result on a thermal
//! receipt printer or, in dry-run mode, on the console.
//!
//! # Architecture
//!
//! ```text
//! sources (weather, horoscope, calendar, news)
//!     │  SourceResult per source, failures degrade a section
//!     ▼
//! briefing::BriefingComposer ── wardrobe, almanac, jokes, layout
//!     │  BriefingDocument (sections of style/text operations)
//!     ▼
//! device::OutputDevice (DryRunDevice | EscPosDevice)
//! ```
//!
//! All network access goes through [`sources::Transport`], all randomness
//! through an injected rng, and all output through [`device::OutputDevice`].

pub mod almanac;
pub mod briefing;
pub mod cli;
pub mod config;
pub mod device;
pub mod jokes;
pub mod layout;
pub mod sources;
pub mod wardrobe;

pub use almanac::{Almanac, DayNotes};
pub use briefing::{BriefingComposer, BriefingDocument, Section, SectionKind, SourceReport};
pub use config::{Config, ConfigError};
pub use device::{DeviceError, DryRunDevice, EscPosDevice, OutputDevice, StyleUpdate};
pub use sources::{FailureKind, HttpTransport, SourceError, SourceResult, Transport};
pub use wardrobe::WardrobeCatalog;
