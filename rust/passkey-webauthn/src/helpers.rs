//! A deterministic software authenticator for tests.

use p256::ecdsa::{Signature, SigningKey, signature::Signer as _};
use passkey_common::Word;
use sha2::{Digest, Sha256};

use crate::{
    CHALLENGE_PREFIX, FLAG_USER_PRESENT, FLAG_USER_VERIFIED, PasskeyPublicKey, WebAuthnAssertion,
};

/// The relying party origin used in generated client data.
pub const TEST_ORIGIN: &str = "https://passkey.example";

/// Produces WebAuthn assertions with a P-256 key derived from a fixed seed,
/// mimicking what a platform authenticator returns from
/// `navigator.credentials.get()`.
pub struct TestAuthenticator {
    signing_key: SigningKey,
}

impl TestAuthenticator {
    /// Create an authenticator whose private scalar is `[seed; 32]`.
    ///
    /// # Panics
    ///
    /// Panics if `seed` is zero, which is not a valid scalar.
    pub fn from_seed(seed: u8) -> Self {
        let signing_key =
            SigningKey::from_bytes(&[seed; 32].into()).expect("non-zero seed is a valid scalar");
        Self { signing_key }
    }

    /// The public key to bind to a wallet.
    pub fn public_key(&self) -> PasskeyPublicKey {
        let point = self.signing_key.verifying_key().to_encoded_point(false);
        let coordinate = |bytes: Option<&p256::FieldBytes>| {
            Word::try_from(bytes.expect("uncompressed point has coordinates").as_slice())
                .expect("P-256 coordinates are 32 bytes")
        };
        PasskeyPublicKey::new(coordinate(point.x()), coordinate(point.y()))
    }

    /// Minimal authenticator data: `rpIdHash (32) | flags (1) | signCount (4)`.
    pub fn authenticator_data(&self, flags: u8) -> Vec<u8> {
        let rp_id_hash = Sha256::digest(b"passkey.example");
        let mut data = Vec::with_capacity(37);
        data.extend_from_slice(&rp_id_hash);
        data.push(flags);
        data.extend_from_slice(&[0x00, 0x00, 0x00, 0x01]);
        data
    }

    /// Client data in the member order browsers emit, so the challenge sits
    /// at byte 23 and the type at byte 1 for a `webauthn.get` ceremony.
    pub fn client_data_json(ceremony: &str, challenge: &[u8]) -> String {
        use base64::Engine;
        let challenge = base64::engine::general_purpose::URL_SAFE_NO_PAD.encode(challenge);
        format!(
            r#"{{"type":"{ceremony}","challenge":"{challenge}","origin":"{TEST_ORIGIN}","crossOrigin":false}}"#
        )
    }

    /// Sign arbitrary authenticator and client data, locating the type and
    /// challenge members by searching the client data.
    pub fn sign(&self, authenticator_data: Vec<u8>, client_data_json: String) -> WebAuthnAssertion {
        let challenge_location = client_data_json.find(CHALLENGE_PREFIX).unwrap_or(0) as u64;
        let response_type_location = client_data_json.find(r#""type":""#).unwrap_or(0) as u64;

        let mut assertion = WebAuthnAssertion {
            authenticator_data,
            client_data_json,
            challenge_location,
            response_type_location,
            r: Word::ZERO,
            s: Word::ZERO,
        };

        let signature: Signature = self.signing_key.sign(&assertion.signed_message());
        let signature = signature.normalize_s().unwrap_or(signature);
        let (r, s) = signature.split_bytes();
        assertion.r = Word::try_from(r.as_slice()).expect("r is 32 bytes");
        assertion.s = Word::try_from(s.as_slice()).expect("s is 32 bytes");
        assertion
    }

    /// A genuine `webauthn.get` assertion over `challenge` with the
    /// user-present and user-verified flags set.
    pub fn assert(&self, challenge: &[u8]) -> WebAuthnAssertion {
        self.sign(
            self.authenticator_data(FLAG_USER_PRESENT | FLAG_USER_VERIFIED),
            Self::client_data_json("webauthn.get", challenge),
        )
    }
}
