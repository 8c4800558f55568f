use passkey_common::{WORD_SIZE, Word};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::AssertionDecodeError;

/// A WebAuthn `get` assertion as submitted to the wallet.
///
/// On the wire the assertion is carried as a single envelope:
///
/// ```text
/// varint(authenticator_data.len) | authenticator_data
/// | varint(client_data_json.len) | client_data_json
/// | varint(challenge_location) | varint(response_type_location)
/// | r (32 bytes, big-endian) | s (32 bytes, big-endian)
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebAuthnAssertion {
    /// The raw `authenticatorData` returned by the authenticator.
    pub authenticator_data: Vec<u8>,
    /// The `clientDataJSON` text returned by the browser.
    pub client_data_json: String,
    /// Byte offset of `"challenge":"…"` inside `client_data_json`.
    pub challenge_location: u64,
    /// Byte offset of `"type":"webauthn.get"` inside `client_data_json`.
    pub response_type_location: u64,
    /// The ECDSA `r` scalar.
    pub r: Word,
    /// The ECDSA `s` scalar.
    pub s: Word,
}

impl WebAuthnAssertion {
    /// The exact byte string the authenticator signed:
    /// `authenticatorData || SHA-256(clientDataJSON)`.
    pub fn signed_message(&self) -> Vec<u8> {
        let client_data_hash = Sha256::digest(self.client_data_json.as_bytes());
        let mut message = Vec::with_capacity(self.authenticator_data.len() + 32);
        message.extend_from_slice(&self.authenticator_data);
        message.extend_from_slice(&client_data_hash);
        message
    }

    /// Encode the assertion envelope.
    #[must_use]
    pub fn to_vec(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(
            self.authenticator_data.len() + self.client_data_json.len() + 2 * WORD_SIZE + 16,
        );
        leb128::write::unsigned(&mut buf, self.authenticator_data.len() as u64)
            .expect("write to Vec never fails");
        buf.extend_from_slice(&self.authenticator_data);
        leb128::write::unsigned(&mut buf, self.client_data_json.len() as u64)
            .expect("write to Vec never fails");
        buf.extend_from_slice(self.client_data_json.as_bytes());
        leb128::write::unsigned(&mut buf, self.challenge_location)
            .expect("write to Vec never fails");
        leb128::write::unsigned(&mut buf, self.response_type_location)
            .expect("write to Vec never fails");
        buf.extend_from_slice(self.r.as_bytes());
        buf.extend_from_slice(self.s.as_bytes());
        buf
    }

    /// Decode an assertion envelope.
    ///
    /// # Errors
    ///
    /// Returns an [`AssertionDecodeError`] if a prefix is malformed, a field
    /// runs past the end of the input, the client data is not UTF-8, or bytes
    /// remain after `s`.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, AssertionDecodeError> {
        let mut reader = Reader::new(bytes);

        let authenticator_data_len = reader.varint("authenticator data length")?;
        let authenticator_data = reader
            .take(authenticator_data_len, "authenticator data")?
            .to_vec();

        let client_data_len = reader.varint("client data length")?;
        let client_data_json = std::str::from_utf8(reader.take(client_data_len, "client data")?)
            .map_err(|_| AssertionDecodeError::ClientDataNotUtf8)?
            .to_owned();

        let challenge_location = reader.varint("challenge location")?;
        let response_type_location = reader.varint("response type location")?;

        let r = reader.word("r")?;
        let s = reader.word("s")?;

        if reader.remaining() > 0 {
            return Err(AssertionDecodeError::TrailingBytes(reader.remaining()));
        }

        Ok(Self {
            authenticator_data,
            client_data_json,
            challenge_location,
            response_type_location,
            r,
            s,
        })
    }
}

impl TryFrom<&[u8]> for WebAuthnAssertion {
    type Error = AssertionDecodeError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        Self::from_bytes(bytes)
    }
}

impl From<&WebAuthnAssertion> for Vec<u8> {
    fn from(assertion: &WebAuthnAssertion) -> Self {
        assertion.to_vec()
    }
}

struct Reader<'a> {
    bytes: &'a [u8],
    position: usize,
}

impl<'a> Reader<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, position: 0 }
    }

    fn remaining(&self) -> usize {
        self.bytes.len() - self.position
    }

    fn varint(&mut self, field: &'static str) -> Result<u64, AssertionDecodeError> {
        let mut rest = self
            .bytes
            .get(self.position..)
            .ok_or(AssertionDecodeError::Truncated(field))?;
        let before = rest.len();
        let value = leb128::read::unsigned(&mut rest).map_err(|error| match error {
            leb128::read::Error::IoError(_) => AssertionDecodeError::Truncated(field),
            leb128::read::Error::Overflow => AssertionDecodeError::InvalidVarint(field),
        })?;
        self.position += before - rest.len();
        Ok(value)
    }

    fn take(&mut self, len: u64, field: &'static str) -> Result<&'a [u8], AssertionDecodeError> {
        let len = usize::try_from(len).map_err(|_| AssertionDecodeError::Truncated(field))?;
        let end = self
            .position
            .checked_add(len)
            .ok_or(AssertionDecodeError::Truncated(field))?;
        let slice = self
            .bytes
            .get(self.position..end)
            .ok_or(AssertionDecodeError::Truncated(field))?;
        self.position = end;
        Ok(slice)
    }

    fn word(&mut self, field: &'static str) -> Result<Word, AssertionDecodeError> {
        let slice = self.take(WORD_SIZE as u64, field)?;
        Word::try_from(slice).map_err(|_| AssertionDecodeError::Truncated(field))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use testresult::TestResult;

    fn sample() -> WebAuthnAssertion {
        WebAuthnAssertion {
            authenticator_data: vec![0xaa; 37],
            client_data_json: r#"{"type":"webauthn.get","challenge":"AAEC"}"#.to_owned(),
            challenge_location: 23,
            response_type_location: 1,
            r: Word::from(7u64),
            s: Word::from(9u64),
        }
    }

    #[test]
    fn it_decodes_what_it_encodes() -> TestResult {
        let assertion = sample();
        let decoded = WebAuthnAssertion::from_bytes(&assertion.to_vec())?;
        assert_eq!(decoded, assertion);
        Ok(())
    }

    #[test]
    fn it_reconstructs_the_signed_message() {
        let assertion = sample();
        let message = assertion.signed_message();
        assert_eq!(message.len(), 37 + 32);
        assert_eq!(&message[..37], assertion.authenticator_data.as_slice());
        assert_eq!(
            &message[37..],
            Sha256::digest(assertion.client_data_json.as_bytes()).as_slice()
        );
    }

    #[test]
    fn it_rejects_every_truncation() {
        let encoded = sample().to_vec();
        for cut in 0..encoded.len() {
            assert!(
                WebAuthnAssertion::from_bytes(&encoded[..cut]).is_err(),
                "prefix of length {cut} should not decode"
            );
        }
    }

    #[test]
    fn it_rejects_trailing_bytes() {
        let mut encoded = sample().to_vec();
        encoded.push(0);
        assert_eq!(
            WebAuthnAssertion::from_bytes(&encoded),
            Err(AssertionDecodeError::TrailingBytes(1))
        );
    }

    #[test]
    fn it_rejects_non_utf8_client_data() {
        let mut buf = Vec::new();
        leb128::write::unsigned(&mut buf, 1).unwrap();
        buf.push(0x01);
        leb128::write::unsigned(&mut buf, 2).unwrap();
        buf.extend_from_slice(&[0xff, 0xfe]);
        buf.extend_from_slice(&[0, 0]);
        buf.extend_from_slice(&[0u8; 64]);

        assert_eq!(
            WebAuthnAssertion::from_bytes(&buf),
            Err(AssertionDecodeError::ClientDataNotUtf8)
        );
    }

    #[test]
    fn it_rejects_lengths_that_overrun_the_input() {
        let mut buf = Vec::new();
        leb128::write::unsigned(&mut buf, u64::MAX).unwrap();
        buf.extend_from_slice(&[0u8; 8]);

        assert_eq!(
            WebAuthnAssertion::from_bytes(&buf),
            Err(AssertionDecodeError::Truncated("authenticator data"))
        );
    }
}
