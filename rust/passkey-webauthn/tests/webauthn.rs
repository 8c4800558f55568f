//! WebAuthn integration tests.
//!
//! These tests build assertions with a deterministic software authenticator,
//! mimicking what a real authenticator produces, push them through the wire
//! envelope and verify them against the bound key.

use passkey_webauthn::{
    AssertionDecodeError, FLAG_USER_PRESENT, TestAuthenticator, WebAuthnAssertion,
    WebAuthnVerifier, WebAuthnVerifyError, verify,
};
use testresult::TestResult;

const CHALLENGE: [u8; 32] = [0x5a; 32];

#[test]
fn it_places_the_challenge_and_type_where_browsers_do() {
    let assertion = TestAuthenticator::from_seed(7).assert(&CHALLENGE);
    assert_eq!(assertion.challenge_location, 23);
    assert_eq!(assertion.response_type_location, 1);
}

#[test]
fn it_verifies_an_assertion_carried_in_an_envelope() -> TestResult {
    let authenticator = TestAuthenticator::from_seed(7);
    let key = authenticator.public_key();
    let envelope = authenticator.assert(&CHALLENGE).to_vec();

    let assertion = WebAuthnAssertion::try_from(envelope.as_slice())?;
    let verifier = WebAuthnVerifier::new(&key)?;
    verifier.verify_assertion(&CHALLENGE, &assertion, true)?;
    assert!(verify(&assertion, &CHALLENGE, true, &key.x, &key.y));
    Ok(())
}

#[test]
fn it_fails_when_any_authenticator_byte_is_flipped() -> TestResult {
    let authenticator = TestAuthenticator::from_seed(7);
    let key = authenticator.public_key();
    let assertion = authenticator.assert(&CHALLENGE);
    assert!(verify(&assertion, &CHALLENGE, false, &key.x, &key.y));

    for index in 0..assertion.authenticator_data.len() {
        let mut tampered = assertion.clone();
        tampered.authenticator_data[index] ^= 0x01;
        assert!(
            !verify(&tampered, &CHALLENGE, false, &key.x, &key.y),
            "flipping authenticator byte {index} should fail verification"
        );
    }
    Ok(())
}

#[test]
fn it_fails_against_another_key() -> TestResult {
    let assertion = TestAuthenticator::from_seed(7).assert(&CHALLENGE);
    let other = TestAuthenticator::from_seed(8).public_key();
    let verifier = WebAuthnVerifier::new(&other)?;

    assert!(matches!(
        verifier.verify_assertion(&CHALLENGE, &assertion, false),
        Err(WebAuthnVerifyError::InvalidSignature(_))
    ));
    Ok(())
}

#[test]
fn it_fails_when_the_client_data_is_altered_after_signing() {
    let authenticator = TestAuthenticator::from_seed(7);
    let key = authenticator.public_key();
    let mut assertion = authenticator.assert(&CHALLENGE);
    assertion.client_data_json = assertion
        .client_data_json
        .replace("passkey.example", "evil.example");

    assert!(!verify(&assertion, &CHALLENGE, false, &key.x, &key.y));
}

#[test]
fn it_accepts_presence_only_unless_verification_is_required() -> TestResult {
    let authenticator = TestAuthenticator::from_seed(7);
    let key = authenticator.public_key();
    let assertion = authenticator.sign(
        authenticator.authenticator_data(FLAG_USER_PRESENT),
        TestAuthenticator::client_data_json("webauthn.get", &CHALLENGE),
    );

    assert!(verify(&assertion, &CHALLENGE, false, &key.x, &key.y));
    assert!(!verify(&assertion, &CHALLENGE, true, &key.x, &key.y));
    Ok(())
}

#[test]
fn it_never_panics_on_hostile_offsets() {
    let authenticator = TestAuthenticator::from_seed(7);
    let key = authenticator.public_key();
    let assertion = authenticator.assert(&CHALLENGE);
    let len = assertion.client_data_json.len() as u64;

    let hostile = [0, 2, 22, 24, len - 10, len, len + 1, u64::MAX / 2, u64::MAX];
    for challenge_location in hostile {
        for response_type_location in hostile {
            let mut moved = assertion.clone();
            moved.challenge_location = challenge_location;
            moved.response_type_location = response_type_location;
            assert!(!verify(&moved, &CHALLENGE, false, &key.x, &key.y));
        }
    }
}

#[test]
fn it_reports_truncated_envelopes() {
    let envelope = TestAuthenticator::from_seed(7).assert(&CHALLENGE).to_vec();
    let cut = &envelope[..envelope.len() - 1];
    assert_eq!(
        WebAuthnAssertion::from_bytes(cut),
        Err(AssertionDecodeError::Truncated("s"))
    );
}
