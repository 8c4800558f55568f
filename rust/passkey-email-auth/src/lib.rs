#![warn(missing_docs)]

//! Email-proved command authentication.
//!
//! An [`EmailAuth`] guardian accepts an [`EmailAuthMsg`] when an external
//! zero-knowledge proof verifier vouches that the sender controls an email
//! address, the DKIM key that signed the email is registered, and the
//! command text in the email is exactly what one of the guardian's
//! [`CommandTemplate`]s renders for the supplied parameters.
//!
//! The proof verifier and DKIM registry are consumed through the
//! [`ProofVerifier`] and [`DkimRegistry`] traits and located by address
//! through an [`OracleResolver`].

mod error;
pub use error::*;

mod template;
pub use template::*;

mod registry;
pub use registry::*;

mod message;
pub use message::*;

mod oracle;
pub use oracle::*;

mod guardian;
pub use guardian::*;

#[cfg(any(test, feature = "helpers"))]
mod helpers;
#[cfg(any(test, feature = "helpers"))]
pub use helpers::*;
