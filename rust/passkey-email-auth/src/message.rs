use passkey_common::Word;
use serde::{Deserialize, Serialize};

/// The public outputs of an email zero-knowledge proof, plus the proof
/// itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailProof {
    /// The domain that signed the email.
    pub domain_name: String,
    /// Hash of the DKIM public key that signed the email.
    pub public_key_hash: Word,
    /// The email's timestamp, or zero if the circuit does not expose it.
    pub timestamp: u64,
    /// The subject command with the sender address masked out.
    pub masked_command: String,
    /// A value unique to the email, preventing replays.
    pub email_nullifier: Word,
    /// Salt binding the sender address to the account.
    pub account_salt: Word,
    /// Whether the email asserts that the guardian is being used for the
    /// first time.
    pub is_code_exist: bool,
    /// Opaque proof bytes, interpreted only by the proof verifier.
    pub proof: Vec<u8>,
}

/// An email-authenticated command submitted to a guardian.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailAuthMsg {
    /// The id of the template the command claims to follow.
    pub template_id: Word,
    /// Opaque, positionally meaningful parameters for the template.
    pub command_params: Vec<Vec<u8>>,
    /// Number of leading bytes of the masked command to ignore.
    pub skipped_command_prefix: usize,
    /// The proved email.
    pub proof: EmailProof,
}
