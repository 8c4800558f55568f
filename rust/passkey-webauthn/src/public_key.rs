use p256::{EncodedPoint, FieldBytes, ecdsa::VerifyingKey};
use passkey_common::Word;
use serde::{Deserialize, Serialize};

use crate::WebAuthnVerifyError;

/// An uncompressed P-256 public key held as its affine coordinates.
///
/// The all-zero pair is the "unset" key: it is not a curve point, so nothing
/// ever verifies against it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PasskeyPublicKey {
    /// Affine x coordinate.
    pub x: Word,
    /// Affine y coordinate.
    pub y: Word,
}

impl PasskeyPublicKey {
    /// The unset key `(0, 0)`.
    pub const UNSET: PasskeyPublicKey = PasskeyPublicKey {
        x: Word::ZERO,
        y: Word::ZERO,
    };

    /// Create a key from its coordinates.
    pub const fn new(x: Word, y: Word) -> Self {
        Self { x, y }
    }

    /// Whether this is the unset key.
    pub fn is_unset(&self) -> bool {
        self.x.is_zero() && self.y.is_zero()
    }

    /// Interpret the coordinates as a P-256 verifying key.
    ///
    /// # Errors
    ///
    /// Returns [`WebAuthnVerifyError::InvalidPublicKey`] if `(x, y)` is not on
    /// the curve.
    pub fn verifying_key(&self) -> Result<VerifyingKey, WebAuthnVerifyError> {
        let point = EncodedPoint::from_affine_coordinates(
            &FieldBytes::from(self.x.to_be_bytes()),
            &FieldBytes::from(self.y.to_be_bytes()),
            false,
        );
        VerifyingKey::from_encoded_point(&point).map_err(|_| WebAuthnVerifyError::InvalidPublicKey)
    }
}
