//! Reshape provider payloads into [`VerseResponse`].

use crate::config::PayloadFormat;
use crate::error::VerseError;
use crate::i18n::Language;
use crate::upstream::RawProviderResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The only verse shape clients ever see.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseResponse {
    pub surah_number: u32,
    pub surah_name: String,
    pub surah_name_arabic: String,
    pub verse_number: u32,
    pub arabic_text: String,
    pub translation: String,
    /// Display name, not the tag
    pub language: String,
    pub reference: String,
}

/// Arabic base-text record of an AlQuran Cloud editions payload.
#[derive(Debug, Deserialize)]
struct ArabicRecord {
    text: String,
    #[serde(rename = "numberInSurah")]
    number_in_surah: u32,
    surah: SurahRecord,
}

#[derive(Debug, Deserialize)]
struct SurahRecord {
    number: u32,
    name: String,
    #[serde(rename = "englishName")]
    english_name: String,
}

#[derive(Debug, Deserialize)]
struct TranslationRecord {
    text: String,
}

/// Map a provider result to a `VerseResponse` in `language`.
pub fn normalize(raw: RawProviderResult, language: Language) -> Result<VerseResponse, VerseError> {
    match raw.format {
        PayloadFormat::AlQuranCloud => from_alquran_editions(raw.payload, language),
        PayloadFormat::Other(format) => Err(VerseError::UnsupportedFormat {
            provider: raw.source,
            format,
        }),
    }
}

fn from_alquran_editions(payload: Value, language: Language) -> Result<VerseResponse, VerseError> {
    let Value::Array(records) = payload else {
        return Err(VerseError::Internal(
            "editions payload is not an array".to_string(),
        ));
    };
    let mut records = records.into_iter();
    let (Some(arabic), Some(translation)) = (records.next(), records.next()) else {
        return Err(VerseError::Internal(
            "editions payload has fewer than two records".to_string(),
        ));
    };

    let arabic: ArabicRecord = serde_json::from_value(arabic)
        .map_err(|e| VerseError::Internal(format!("malformed Arabic record: {}", e)))?;
    let translation: TranslationRecord = serde_json::from_value(translation)
        .map_err(|e| VerseError::Internal(format!("malformed translation record: {}", e)))?;

    Ok(VerseResponse {
        reference: format!(
            "Surah {} ({}:{})",
            arabic.surah.english_name, arabic.surah.number, arabic.number_in_surah
        ),
        surah_number: arabic.surah.number,
        surah_name: arabic.surah.english_name,
        surah_name_arabic: arabic.surah.name,
        verse_number: arabic.number_in_surah,
        arabic_text: arabic.text,
        translation: translation.text,
        language: language.display_name().to_string(),
    })
}
