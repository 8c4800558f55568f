use passkey_common::{Address, PrimitiveError, Word};
use thiserror::Error;

/// Errors from parsing the textual form of a command template.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TemplateParseError {
    /// The template has no tokens.
    #[error("command template is empty")]
    Empty,

    /// Two separators were adjacent, or the template started or ended with one.
    #[error("empty token at position {0}")]
    EmptyToken(usize),

    /// A `{…}` token names no known parameter type.
    #[error("unknown placeholder {0:?}")]
    UnknownPlaceholder(String),
}

/// Errors from rendering a command or extracting parameters from one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    /// The number of parameters differs from the number of placeholders.
    #[error("expected {expected} command parameters, got {actual}")]
    ParamCount {
        /// Placeholders in the template
        expected: usize,
        /// Parameters supplied or found
        actual: usize,
    },

    /// A `{uint}` parameter was not exactly 32 bytes.
    #[error("parameter {index} is {length} bytes, expected a 32-byte uint")]
    InvalidUint {
        /// Position among the parameters
        index: usize,
        /// Length that was supplied
        length: usize,
    },

    /// A `{string}` parameter was empty, not UTF-8, or contained whitespace.
    #[error("parameter {index} is not a single-word string")]
    InvalidString {
        /// Position among the parameters
        index: usize,
    },

    /// A `{uint}` word in a command was not canonical decimal.
    #[error("parameter {index}: {source}")]
    InvalidDecimal {
        /// Position among the parameters
        index: usize,
        /// Why the word did not parse
        source: PrimitiveError,
    },

    /// The command has a different number of words than the template.
    #[error("expected {expected} command words, got {actual}")]
    WordCount {
        /// Tokens in the template
        expected: usize,
        /// Words in the command
        actual: usize,
    },

    /// A literal word of the template does not appear in the command.
    #[error("expected {expected:?} at word {index}, found {found:?}")]
    LiteralMismatch {
        /// Position among the command words
        index: usize,
        /// The template literal
        expected: String,
        /// The word in the command
        found: String,
    },
}

/// Reasons an [`EmailAuth`](crate::EmailAuth) guardian rejects a call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EmailAuthError {
    /// Only the controller may call this entry point.
    #[error("caller {0} is not the controller")]
    Unauthorized(Address),

    /// A template is already registered under this id.
    #[error("template {0} already exists")]
    TemplateAlreadyExists(Word),

    /// No template is registered under this id.
    #[error("template {0} does not exist")]
    TemplateNotFound(Word),

    /// No DKIM registry has been configured.
    #[error("DKIM registry is not set")]
    DkimRegistryNotSet,

    /// No proof verifier has been configured.
    #[error("proof verifier is not set")]
    VerifierNotSet,

    /// A configured oracle address does not resolve to an oracle.
    #[error("no oracle is available at {0}")]
    OracleUnavailable(Address),

    /// The DKIM registry does not vouch for the email's signing key.
    #[error("invalid DKIM public key hash for {0}")]
    InvalidDkimPublicKeyHash(String),

    /// This email has already been used.
    #[error("email nullifier {0} already used")]
    EmailNullifierUsed(Word),

    /// The email was proved for a different account.
    #[error("account salt mismatch")]
    AccountSaltMismatch,

    /// The email is not newer than the last accepted one.
    #[error("timestamp {received} is not after {last}")]
    InvalidTimestamp {
        /// Timestamp of the last accepted email
        last: u64,
        /// Timestamp of this email
        received: u64,
    },

    /// The skipped prefix does not fall on a character boundary of the
    /// masked command.
    #[error("skipped command prefix {0} is out of range")]
    InvalidSkippedPrefix(usize),

    /// The parameters do not fit the template.
    #[error("invalid command parameters: {0}")]
    InvalidCommandParams(#[from] CommandError),

    /// The command in the email differs from the rendered template.
    #[error("invalid command")]
    CommandMismatch,

    /// The proof verifier rejected the proof.
    #[error("invalid email proof")]
    InvalidEmailProof,
}
