//! Core coordinate utilities
//!
//! - `coordinates`: Earth constants, sidereal time, ECI -> ECEF, geodetic readout
//! - `space`: Earth-fixed <-> scene mapping used by rendering and picking

pub mod coordinates;
pub mod space;
