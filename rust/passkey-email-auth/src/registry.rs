use passkey_common::Word;
use sha2::{Digest, Sha256};

use crate::{CommandTemplate, CommandToken, ParamType};

/// Domain separation tag for the passkey binding command grammar.
pub const DOMAIN_TAG: &str = "EMAIL_PASSKEY_BINDING_V1";

/// Compute the id of the template at `index` under `domain_tag`:
/// `SHA-256(len(tag) as u64 BE || tag || index as u64 BE)`.
pub fn template_id(domain_tag: &str, index: u64) -> Word {
    let mut hasher = Sha256::new();
    hasher.update((domain_tag.len() as u64).to_be_bytes());
    hasher.update(domain_tag.as_bytes());
    hasher.update(index.to_be_bytes());
    Word::from_be_bytes(hasher.finalize().into())
}

/// The fixed, ordered set of command grammars a wallet accepts, and the
/// stable ids under which guardians register them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplateRegistry {
    domain_tag: String,
    templates: Vec<CommandTemplate>,
}

impl CommandTemplateRegistry {
    /// A registry with custom grammar.
    pub fn new(domain_tag: impl Into<String>, templates: Vec<CommandTemplate>) -> Self {
        Self {
            domain_tag: domain_tag.into(),
            templates,
        }
    }

    /// The default grammar: `Bind Pubkey {uint} {uint}` at index 0.
    pub fn bind_passkey() -> Self {
        Self::new(
            DOMAIN_TAG,
            vec![CommandTemplate::new(vec![
                CommandToken::Literal("Bind".into()),
                CommandToken::Literal("Pubkey".into()),
                CommandToken::Placeholder(ParamType::Uint),
                CommandToken::Placeholder(ParamType::Uint),
            ])],
        )
    }

    /// The domain separation tag.
    pub fn domain_tag(&self) -> &str {
        &self.domain_tag
    }

    /// The id for the template at `index`. Pure in `(domain tag, index)`;
    /// `index` need not name a template.
    pub fn template_id(&self, index: u64) -> Word {
        template_id(&self.domain_tag, index)
    }

    /// The templates in index order.
    pub fn templates(&self) -> &[CommandTemplate] {
        &self.templates
    }

    /// The template at `index`, if any.
    pub fn template(&self, index: u64) -> Option<&CommandTemplate> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.templates.get(index))
    }

    /// Every template paired with its id, in index order.
    pub fn entries(&self) -> impl Iterator<Item = (Word, &CommandTemplate)> + '_ {
        (0u64..)
            .zip(&self.templates)
            .map(|(index, template)| (self.template_id(index), template))
    }
}

impl Default for CommandTemplateRegistry {
    fn default() -> Self {
        Self::bind_passkey()
    }
}
