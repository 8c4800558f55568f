use std::{fmt, str::FromStr};

use passkey_common::Word;
use serde::{Deserialize, Serialize};

use crate::{CommandError, TemplateParseError};

const SEPARATOR: char = ' ';

/// The type of value a placeholder stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamType {
    /// A 256-bit unsigned integer, carried as 32 big-endian bytes and written
    /// in canonical decimal.
    Uint,
    /// A single word of UTF-8 text.
    String,
}

impl ParamType {
    /// The placeholder text for this type, e.g. `{uint}`.
    pub const fn placeholder(&self) -> &'static str {
        match self {
            ParamType::Uint => "{uint}",
            ParamType::String => "{string}",
        }
    }
}

/// One token of a [`CommandTemplate`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandToken {
    /// A word that must appear verbatim.
    Literal(String),
    /// A typed slot filled by the next command parameter.
    Placeholder(ParamType),
}

/// A typed command parameter.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CommandParam {
    /// A `{uint}` value.
    Uint(Word),
    /// A `{string}` value.
    String(String),
}

impl CommandParam {
    /// The opaque byte encoding carried in an email message: 32 big-endian
    /// bytes for a uint, UTF-8 for a string.
    pub fn encode(&self) -> Vec<u8> {
        match self {
            CommandParam::Uint(word) => word.as_bytes().to_vec(),
            CommandParam::String(text) => text.as_bytes().to_vec(),
        }
    }
}

impl From<Word> for CommandParam {
    fn from(word: Word) -> Self {
        CommandParam::Uint(word)
    }
}

/// A command grammar: literal words and typed placeholders separated by
/// single spaces.
///
/// ```rust
/// use passkey_email_auth::{CommandTemplate, CommandParam};
/// use passkey_common::Word;
///
/// let template: CommandTemplate = "Bind Pubkey {uint} {uint}".parse().unwrap();
/// let params = [Word::from(1u64), Word::from(2u64)].map(|w| CommandParam::from(w).encode());
/// assert_eq!(template.render(&params).unwrap(), "Bind Pubkey 1 2");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CommandTemplate {
    tokens: Vec<CommandToken>,
}

impl CommandTemplate {
    /// Build a template from its tokens.
    pub fn new(tokens: Vec<CommandToken>) -> Self {
        Self { tokens }
    }

    /// The tokens in order.
    pub fn tokens(&self) -> &[CommandToken] {
        &self.tokens
    }

    /// The placeholder types in order.
    pub fn placeholders(&self) -> impl Iterator<Item = ParamType> + '_ {
        self.tokens.iter().filter_map(|token| match token {
            CommandToken::Placeholder(param_type) => Some(*param_type),
            CommandToken::Literal(_) => None,
        })
    }

    /// Render the exact command text an email must carry for `params`.
    pub fn render<P: AsRef<[u8]>>(&self, params: &[P]) -> Result<String, CommandError> {
        let expected = self.placeholders().count();
        if params.len() != expected {
            return Err(CommandError::ParamCount {
                expected,
                actual: params.len(),
            });
        }

        let mut slots = params.iter().map(AsRef::as_ref).enumerate();
        let mut words = Vec::with_capacity(self.tokens.len());
        for token in &self.tokens {
            match token {
                CommandToken::Literal(text) => words.push(text.clone()),
                CommandToken::Placeholder(param_type) => {
                    let Some((index, bytes)) = slots.next() else {
                        return Err(CommandError::ParamCount {
                            expected,
                            actual: params.len(),
                        });
                    };
                    words.push(render_param(*param_type, index, bytes)?);
                }
            }
        }

        Ok(words.join(" "))
    }

    /// Parse a command back into typed parameters.
    pub fn extract(&self, command: &str) -> Result<Vec<CommandParam>, CommandError> {
        let words: Vec<&str> = command.split(SEPARATOR).collect();
        if words.len() != self.tokens.len() {
            return Err(CommandError::WordCount {
                expected: self.tokens.len(),
                actual: words.len(),
            });
        }

        let mut params = Vec::new();
        for (position, (token, word)) in self.tokens.iter().zip(words).enumerate() {
            match token {
                CommandToken::Literal(text) if text == word => {}
                CommandToken::Literal(text) => {
                    return Err(CommandError::LiteralMismatch {
                        index: position,
                        expected: text.clone(),
                        found: word.to_owned(),
                    });
                }
                CommandToken::Placeholder(ParamType::Uint) => {
                    let value = Word::from_decimal(word).map_err(|source| {
                        CommandError::InvalidDecimal {
                            index: params.len(),
                            source,
                        }
                    })?;
                    params.push(CommandParam::Uint(value));
                }
                CommandToken::Placeholder(ParamType::String) => {
                    if word.is_empty() {
                        return Err(CommandError::InvalidString {
                            index: params.len(),
                        });
                    }
                    params.push(CommandParam::String(word.to_owned()));
                }
            }
        }

        Ok(params)
    }

    /// Whether `command` is exactly what this template renders for `params`.
    pub fn matches<P: AsRef<[u8]>>(&self, command: &str, params: &[P]) -> bool {
        self.render(params).is_ok_and(|rendered| rendered == command)
    }
}

fn render_param(param_type: ParamType, index: usize, bytes: &[u8]) -> Result<String, CommandError> {
    match param_type {
        ParamType::Uint => {
            let word = Word::try_from(bytes).map_err(|_| CommandError::InvalidUint {
                index,
                length: bytes.len(),
            })?;
            Ok(word.to_decimal())
        }
        ParamType::String => match std::str::from_utf8(bytes) {
            Ok(text) if !text.is_empty() && !text.chars().any(char::is_whitespace) => {
                Ok(text.to_owned())
            }
            _ => Err(CommandError::InvalidString { index }),
        },
    }
}

impl FromStr for CommandTemplate {
    type Err = TemplateParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(TemplateParseError::Empty);
        }

        let tokens = s
            .split(SEPARATOR)
            .enumerate()
            .map(|(position, word)| match word {
                "" => Err(TemplateParseError::EmptyToken(position)),
                "{uint}" => Ok(CommandToken::Placeholder(ParamType::Uint)),
                "{string}" => Ok(CommandToken::Placeholder(ParamType::String)),
                _ if word.contains(['{', '}']) => {
                    Err(TemplateParseError::UnknownPlaceholder(word.to_owned()))
                }
                _ => Ok(CommandToken::Literal(word.to_owned())),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { tokens })
    }
}

impl fmt::Display for CommandTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (position, token) in self.tokens.iter().enumerate() {
            if position > 0 {
                f.write_str(" ")?;
            }
            match token {
                CommandToken::Literal(text) => f.write_str(text)?,
                CommandToken::Placeholder(param_type) => f.write_str(param_type.placeholder())?,
            }
        }
        Ok(())
    }
}
