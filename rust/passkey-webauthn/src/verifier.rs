//! WebAuthn P-256 verifier.
//!
//! Verifies a passkey assertion by:
//! 1. Parsing `clientDataJSON` and checking the challenge found at the
//!    claimed offset encodes the expected challenge
//! 2. Checking the ceremony type found at the claimed offset is `webauthn.get`
//! 3. Checking the user-present (and optionally user-verified) flags
//! 4. Computing `authenticatorData || SHA-256(clientDataJSON)` as the signed message
//! 5. Verifying the ECDSA P-256 signature `(r, s)` over that message

use base64::Engine;
use p256::{
    FieldBytes,
    ecdsa::{Signature, VerifyingKey, signature::Verifier as _},
};
use passkey_common::Word;

use crate::{PasskeyPublicKey, WebAuthnAssertion, WebAuthnVerifyError};

/// The text that must appear at the response type location.
pub const RESPONSE_TYPE_GET: &str = r#""type":"webauthn.get""#;

/// The text that opens the challenge member in `clientDataJSON`.
pub const CHALLENGE_PREFIX: &str = r#""challenge":""#;

/// Authenticator data flag: user present.
pub const FLAG_USER_PRESENT: u8 = 0x01;

/// Authenticator data flag: user verified.
pub const FLAG_USER_VERIFIED: u8 = 0x04;

/// Offset of the flags byte in authenticator data (after the 32-byte RP ID hash).
const FLAGS_OFFSET: usize = 32;

/// rpIdHash (32) | flags (1) | signCount (4)
const AUTHENTICATOR_DATA_MIN_LEN: usize = 37;

/// Half the order of the P-256 group, big-endian. Signatures with `s` above
/// this bound are rejected.
const P256_HALF_ORDER: [u8; 32] = [
    0x7f, 0xff, 0xff, 0xff, 0x80, 0x00, 0x00, 0x00, 0x7f, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
    0xde, 0x73, 0x7d, 0x56, 0xd3, 0x8b, 0xcf, 0x42, 0x79, 0xdc, 0xe5, 0x61, 0x7e, 0x31, 0x92, 0xa8,
];

/// A WebAuthn P-256 verifier bound to one passkey public key.
#[derive(Debug, Clone)]
pub struct WebAuthnVerifier {
    key: VerifyingKey,
}

impl WebAuthnVerifier {
    /// Create a verifier for a bound passkey.
    ///
    /// # Errors
    ///
    /// Returns [`WebAuthnVerifyError::InvalidPublicKey`] if the key is unset
    /// or not on the curve.
    pub fn new(public_key: &PasskeyPublicKey) -> Result<Self, WebAuthnVerifyError> {
        Ok(Self {
            key: public_key.verifying_key()?,
        })
    }

    /// Get the inner P-256 verifying key.
    #[must_use]
    pub const fn verifying_key(&self) -> &VerifyingKey {
        &self.key
    }

    /// Verify an assertion over `challenge`, reporting why it was rejected.
    ///
    /// # Errors
    ///
    /// Returns the first check that failed.
    pub fn verify_assertion(
        &self,
        challenge: &[u8],
        assertion: &WebAuthnAssertion,
        require_user_verification: bool,
    ) -> Result<(), WebAuthnVerifyError> {
        let client_data = assertion.client_data_json.as_bytes();
        let expected_challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(challenge);

        // Step 1: the client data must be a record, and the challenge found at
        // the claimed offset must be the expected one
        let parsed = ClientData::parse(&assertion.client_data_json)?;

        let challenge_member = format!(r#"{CHALLENGE_PREFIX}{expected_challenge}""#);
        let found = window(client_data, assertion.challenge_location, challenge_member.len())
            .ok_or(WebAuthnVerifyError::ChallengeOutOfBounds)?;
        if found != challenge_member.as_bytes() || parsed.challenge != expected_challenge {
            return Err(WebAuthnVerifyError::ChallengeMismatch);
        }

        // Step 2: this must be an authentication ceremony, not a registration
        let found = window(
            client_data,
            assertion.response_type_location,
            RESPONSE_TYPE_GET.len(),
        )
        .ok_or(WebAuthnVerifyError::ResponseTypeOutOfBounds)?;
        if found != RESPONSE_TYPE_GET.as_bytes() || parsed.r#type != "webauthn.get" {
            return Err(WebAuthnVerifyError::ResponseTypeMismatch);
        }

        // Step 3: authenticator flags
        if assertion.authenticator_data.len() < AUTHENTICATOR_DATA_MIN_LEN {
            return Err(WebAuthnVerifyError::InvalidAuthenticatorData);
        }
        let flags = assertion.authenticator_data[FLAGS_OFFSET];
        if flags & FLAG_USER_PRESENT == 0 {
            return Err(WebAuthnVerifyError::UserNotPresent);
        }
        if require_user_verification && flags & FLAG_USER_VERIFIED == 0 {
            return Err(WebAuthnVerifyError::UserNotVerified);
        }

        // Steps 4 and 5: signedData = authenticatorData || SHA-256(clientDataJSON),
        // and the ECDSA verification hashes it once more with SHA-256
        let signature = signature_from_scalars(&assertion.r, &assertion.s)?;
        self.key
            .verify(&assertion.signed_message(), &signature)
            .map_err(|error| WebAuthnVerifyError::InvalidSignature(error.to_string()))
    }

    /// Verify an assertion over `challenge`, answering only accept or reject.
    pub fn verify(
        &self,
        challenge: &[u8],
        assertion: &WebAuthnAssertion,
        require_user_verification: bool,
    ) -> bool {
        match self.verify_assertion(challenge, assertion, require_user_verification) {
            Ok(()) => true,
            Err(reason) => {
                tracing::debug!(%reason, "rejecting passkey assertion");
                false
            }
        }
    }
}

/// Verify `assertion` over `challenge` against the key `(x, y)`.
///
/// This is a pure query: every failure, including an invalid key, yields
/// `false`.
pub fn verify(
    assertion: &WebAuthnAssertion,
    challenge: &[u8],
    require_user_verification: bool,
    x: &Word,
    y: &Word,
) -> bool {
    match WebAuthnVerifier::new(&PasskeyPublicKey::new(*x, *y)) {
        Ok(verifier) => verifier.verify(challenge, assertion, require_user_verification),
        Err(reason) => {
            tracing::debug!(%reason, "rejecting passkey assertion");
            false
        }
    }
}

#[derive(serde::Deserialize)]
struct ClientData {
    r#type: String,
    challenge: String,
}

impl ClientData {
    fn parse(client_data_json: &str) -> Result<Self, WebAuthnVerifyError> {
        serde_json::from_str(client_data_json)
            .map_err(|error| WebAuthnVerifyError::InvalidClientData(error.to_string()))
    }
}

/// The `len` bytes of `text` starting at `at`, if they are all in bounds.
fn window(text: &[u8], at: u64, len: usize) -> Option<&[u8]> {
    let start = usize::try_from(at).ok()?;
    let end = start.checked_add(len)?;
    text.get(start..end)
}

fn signature_from_scalars(r: &Word, s: &Word) -> Result<Signature, WebAuthnVerifyError> {
    if s.as_bytes() > &P256_HALF_ORDER {
        return Err(WebAuthnVerifyError::MalleableSignature);
    }
    Signature::from_scalars(
        FieldBytes::from(r.to_be_bytes()),
        FieldBytes::from(s.to_be_bytes()),
    )
    .map_err(|error| WebAuthnVerifyError::InvalidSignature(error.to_string()))
}
