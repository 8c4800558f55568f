use thiserror::Error;

/// Errors from decoding a [`WebAuthnAssertion`](crate::WebAuthnAssertion)
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssertionDecodeError {
    /// A length or offset prefix was not a valid LEB128 varint.
    #[error("invalid varint in {0}")]
    InvalidVarint(&'static str),

    /// The envelope ended before the named field was complete.
    #[error("envelope truncated while reading {0}")]
    Truncated(&'static str),

    /// The `clientDataJSON` bytes were not UTF-8.
    #[error("clientDataJSON is not valid UTF-8")]
    ClientDataNotUtf8,

    /// Bytes remained after the signature scalars.
    #[error("{0} unexpected trailing bytes")]
    TrailingBytes(usize),
}

/// Reasons a WebAuthn assertion is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WebAuthnVerifyError {
    /// The `clientDataJSON` could not be parsed as a client data record.
    #[error("invalid clientDataJSON: {0}")]
    InvalidClientData(String),

    /// The challenge location points outside `clientDataJSON`.
    #[error("challenge location out of bounds")]
    ChallengeOutOfBounds,

    /// The challenge in `clientDataJSON` does not encode the expected challenge.
    #[error("challenge mismatch")]
    ChallengeMismatch,

    /// The response type location points outside `clientDataJSON`.
    #[error("response type location out of bounds")]
    ResponseTypeOutOfBounds,

    /// The ceremony type is not `webauthn.get`.
    #[error("response type is not webauthn.get")]
    ResponseTypeMismatch,

    /// The authenticator data is too short to carry the flags byte.
    #[error("invalid authenticator data")]
    InvalidAuthenticatorData,

    /// The user-present flag is not set.
    #[error("user presence flag not set")]
    UserNotPresent,

    /// The user-verified flag is required but not set.
    #[error("user verification flag not set")]
    UserNotVerified,

    /// The `s` scalar is in the upper half of the curve order.
    #[error("signature s value is not in low-s form")]
    MalleableSignature,

    /// The public key is not a point on P-256 (this includes the unset key).
    #[error("public key is not a valid P-256 point")]
    InvalidPublicKey,

    /// The ECDSA signature is malformed or does not verify.
    #[error("invalid ECDSA signature: {0}")]
    InvalidSignature(String),
}
