//! Helpers shared by the group signature crates: serde adapters for arkworks objects, hashing to
//! field and group elements, Elgamal encryption and the printable text encoding used for export.

#[macro_use]
pub mod macros;
pub mod elgamal;
pub mod hashing_utils;
pub mod serde_utils;
pub mod text;
