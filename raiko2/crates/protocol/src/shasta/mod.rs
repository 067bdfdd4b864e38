//! Shasta protocol implementation.
//!
//! This module contains all Shasta-specific protocol types and codecs.

pub mod codec;
pub mod constants;
pub mod error;
pub mod manifest;
pub mod types;

pub use codec::{decode_proposed_event, decode_proved_event};
pub use constants::*;
pub use error::{ProtocolError, Result};
pub use manifest::{BlockManifest, DerivationSourceManifest};
pub use types::*;
