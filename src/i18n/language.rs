//! Language type: validated language tag.
//!
//! A `Language` can only be built from a tag present in the registry, so any
//! code holding one can look up its upstream edition without failing.

use crate::error::VerseError;
use crate::i18n::{LanguageEntry, LanguageRegistry};

/// A validated language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Language {
    entry: &'static LanguageEntry,
}

impl Language {
    /// Tag used when the client does not pass `language`.
    pub const DEFAULT_TAG: &'static str = "en";

    /// Create a Language from a tag string.
    ///
    /// # Returns
    /// * `Ok(Language)` if the tag is in the registry
    /// * `Err(VerseError::InvalidLanguage)` naming the offending tag otherwise
    ///
    /// # Example
    /// ```ignore
    /// let german = Language::from_tag("de")?;
    /// assert_eq!(german.upstream_code(), "de.bubenheim");
    /// ```
    pub fn from_tag(tag: &str) -> Result<Language, VerseError> {
        LanguageRegistry::get()
            .get_by_tag(tag)
            .map(|entry| Language { entry })
            .ok_or_else(|| VerseError::InvalidLanguage(tag.to_string()))
    }

    /// Upstream translation edition identifier.
    pub fn upstream_code(&self) -> &'static str {
        self.entry.upstream_code
    }

    /// Human-readable name placed in `VerseResponse::language`.
    pub fn display_name(&self) -> &'static str {
        self.entry.display_name
    }
}
