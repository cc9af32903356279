//! Core wire-level primitives of a KERI (Key Event Receipt Infrastructure)
//! implementation: derivation code tables, qualified cryptographic material
//! (`CryMat`), and versioned multi-format event serialization (`Serder`).
//!
//! This crate is a pure library of value transformations: no I/O, no
//! locks, no background tasks. Event validation, witness protocols,
//! persistence, habitat lifecycle, and transports are all built on top of
//! this layer elsewhere and are out of scope here.

pub mod codex;
mod errors;
pub mod matter;
pub mod sad;
pub mod serder;

pub use crate::errors::{Error, Result};
pub use crate::matter::{Cigar, CryMat, Diger, Matter, Verfer};
pub use crate::sad::{SadValue, Sadder};
pub use crate::serder::{deversify, smell, versify, Kind, Serder, Versionage, VERSION};
