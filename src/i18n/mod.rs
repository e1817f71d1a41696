//! Language table for verse translations.
//!
//! # Architecture
//!
//! - `registry`: Single source of truth for all supported languages and their upstream editions
//! - `language`: Type-safe Language handle, only constructible from a registered tag
//!
//! # Example
//!
//! ```rust,ignore
//! use crate::i18n::{Language, LanguageRegistry};
//!
//! let urdu = Language::from_tag("ur")?;
//! let all = LanguageRegistry::get().list();
//! ```

mod language;
mod registry;

pub use language::Language;
pub use registry::{LanguageEntry, LanguageRegistry};
