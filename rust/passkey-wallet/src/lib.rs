#![warn(missing_docs)]

//! A wallet whose passkey is bound through email.
//!
//! The wallet keeps a single mutable piece of state, the P-256 public key of
//! its bound passkey. The key is replaced only by [`PasskeyWallet::bind_passkey`],
//! which accepts an email-proved `Bind Pubkey {uint} {uint}` command routed
//! through a per-owner guardian contract. The guardian lives at an address
//! derived deterministically from the wallet, the owner and the account
//! salt, and is deployed lazily the first time it is needed.
//!
//! ```text
//! bind_passkey ──► GuardianAddressDeriver ──► template id check
//!                      │
//!                      ▼
//!               GuardianProvisioner (deploy + configure, or validate)
//!                      │
//!                      ▼
//!               EmailAuth::authenticate ──► ProofVerifier / DkimRegistry
//!                      │
//!                      ▼
//!               decode (x, y) ──► commit host changes ──► update passkey
//! ```
//!
//! Every host write made while binding is staged in a [`Transaction`] and
//! committed only when the whole call succeeds.

mod error;
pub use error::*;

mod config;
pub use config::*;

mod deployment;
pub use deployment::*;

mod host;
pub use host::*;

mod derive;
pub use derive::*;

mod provisioner;
pub use provisioner::*;

mod binding;
pub use binding::*;

mod wallet;
pub use wallet::*;
