//! TLE (Two-Line Element) handling
//!
//! Compact catalog records are rendered into the fixed-column TLE format and
//! decoded into SGP4 models; SGP4 accepts elements through no other door.

pub mod encoder;
pub mod parser;
pub mod types;

pub use parser::decode_handle;
pub use types::{OrbitalElementRecord, PropagationHandle};
