//! Turn `(surah, verse-in-surah)` into an absolute verse index.

use crate::error::VerseError;
use crate::upstream::UpstreamFetcher;
use tracing::{debug, warn};

pub const SURAH_COUNT: u32 = 114;

/// Resolve the absolute index of `verse` within `surah`.
///
/// Re-fetches the surah listing on every call and scans it linearly.
pub async fn resolve_verse_index(
    fetcher: &UpstreamFetcher,
    surah: u32,
    verse: u32,
) -> Result<u32, VerseError> {
    if !(1..=SURAH_COUNT).contains(&surah) {
        return Err(VerseError::SurahNotFound(surah));
    }
    if verse == 0 {
        return Err(VerseError::VerseNotFound { surah, verse });
    }

    let ayahs = fetcher.fetch_surah_ayahs(surah).await.map_err(|e| {
        warn!(surah, provider = %fetcher.primary().id, error = %e, "Surah lookup failed");
        VerseError::SurahNotFound(surah)
    })?;

    let index = ayahs
        .iter()
        .find(|ayah| ayah.number_in_surah == verse)
        .map(|ayah| ayah.number)
        .ok_or(VerseError::VerseNotFound { surah, verse })?;

    debug!(surah, verse, index, "Resolved verse index");
    Ok(index)
}
