//! Language registry: Single source of truth for all supported translations.
//!
//! The registry is an ordered list, not a map, so `/languages` output follows
//! the table order below. It uses a singleton pattern with `OnceLock` to ensure
//! thread-safe initialization and read-only access from every request.

use std::sync::OnceLock;

/// A supported translation language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageEntry {
    /// Short tag accepted in the `language` query parameter (e.g., "en", "ur")
    pub tag: &'static str,

    /// Upstream translation edition identifier (e.g., "en.sahih")
    pub upstream_code: &'static str,

    /// Human-readable name returned to clients (e.g., "Deutsch (German)")
    pub display_name: &'static str,

    /// Flag glyph shown next to the name
    pub flag: &'static str,
}

/// Global language registry singleton.
pub struct LanguageRegistry {
    languages: Vec<LanguageEntry>,
}

/// Global registry instance (initialized lazily)
static REGISTRY: OnceLock<LanguageRegistry> = OnceLock::new();

impl LanguageRegistry {
    /// Get the global language registry instance.
    pub fn get() -> &'static LanguageRegistry {
        REGISTRY.get_or_init(|| LanguageRegistry {
            languages: default_languages(),
        })
    }

    /// Get a language entry by its tag.
    ///
    /// # Returns
    /// * `Some(&LanguageEntry)` if the tag exists
    /// * `None` if the tag is not found
    pub fn get_by_tag(&self, tag: &str) -> Option<&LanguageEntry> {
        self.languages.iter().find(|lang| lang.tag == tag)
    }

    /// All languages, in table order.
    pub fn list(&self) -> &[LanguageEntry] {
        &self.languages
    }
}

/// Default language table.
///
/// Order here is the order clients see. Tags must stay unique.
fn default_languages() -> Vec<LanguageEntry> {
    vec![
        LanguageEntry {
            tag: "ar",
            upstream_code: "ar.alafasy",
            display_name: "العربية (Arabic)",
            flag: "🇸🇦",
        },
        LanguageEntry {
            tag: "zh",
            upstream_code: "zh.jian",
            display_name: "中文 (Chinese)",
            flag: "🇨🇳",
        },
        LanguageEntry {
            tag: "nl",
            upstream_code: "nl.keyzer",
            display_name: "Nederlands (Dutch)",
            flag: "🇳🇱",
        },
        LanguageEntry {
            tag: "en",
            upstream_code: "en.sahih",
            display_name: "English",
            flag: "🇬🇧",
        },
        LanguageEntry {
            tag: "fi",
            upstream_code: "fi.finnish",
            display_name: "Suomi (Finnish)",
            flag: "🇫🇮",
        },
        LanguageEntry {
            tag: "fr",
            upstream_code: "fr.hamidullah",
            display_name: "Français (French)",
            flag: "🇫🇷",
        },
        LanguageEntry {
            tag: "de",
            upstream_code: "de.bubenheim",
            display_name: "Deutsch (German)",
            flag: "🇩🇪",
        },
        LanguageEntry {
            tag: "no",
            upstream_code: "no.berg",
            display_name: "Norsk (Norwegian)",
            flag: "🇳🇴",
        },
        LanguageEntry {
            tag: "ru",
            upstream_code: "ru.kuliev",
            display_name: "Русский (Russian)",
            flag: "🇷🇺",
        },
        LanguageEntry {
            tag: "es",
            upstream_code: "es.cortes",
            display_name: "Español (Spanish)",
            flag: "🇪🇸",
        },
        LanguageEntry {
            tag: "sv",
            upstream_code: "sv.bernstrom",
            display_name: "Svenska (Swedish)",
            flag: "🇸🇪",
        },
        LanguageEntry {
            tag: "tr",
            upstream_code: "tr.ates",
            display_name: "Türkçe (Turkish)",
            flag: "🇹🇷",
        },
        LanguageEntry {
            tag: "uk",
            upstream_code: "uk.korkmasov",
            display_name: "Українська (Ukrainian)",
            flag: "🇺🇦",
        },
        LanguageEntry {
            tag: "ur",
            upstream_code: "ur.jalandhry",
            display_name: "اردو (Urdu)",
            flag: "🇵🇰",
        },
    ]
}
