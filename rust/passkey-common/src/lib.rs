#![warn(missing_docs)]

//! Primitive types shared by the passkey wallet crates: fixed-width 256-bit
//! words, 32-byte addresses, and the domain-separated hashing used to derive
//! addresses deterministically.

mod address;
pub use address::*;

mod word;
pub use word::*;

mod hash;
pub use hash::*;

mod error;
pub use error::*;
