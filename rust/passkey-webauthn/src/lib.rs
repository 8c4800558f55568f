#![warn(missing_docs)]

//! WebAuthn assertion handling for passkey-bound wallets.
//!
//! A passkey assertion arrives as a [`WebAuthnAssertion`]: the raw
//! `authenticatorData`, the `clientDataJSON` text, the byte offsets at which
//! the challenge and the ceremony type sit inside that text, and the ECDSA
//! P-256 signature scalars `(r, s)`. [`WebAuthnVerifier`] checks the
//! assertion against an expected challenge and a bound [`PasskeyPublicKey`].
//!
//! Offsets are supplied by the caller and are therefore untrusted; every
//! check is bounds-checked and a bad assertion is a rejection, never a panic.

mod error;
pub use error::*;

mod assertion;
pub use assertion::*;

mod public_key;
pub use public_key::*;

mod verifier;
pub use verifier::*;

#[cfg(any(test, feature = "helpers"))]
mod helpers;
#[cfg(any(test, feature = "helpers"))]
pub use helpers::*;
