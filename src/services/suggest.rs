use crate::services::source::SourceError;

/// Fallback opener used when the suggestion source is unavailable
pub const FALLBACK_OPENER: &str = "Hey, love your vibe.";

/// Generates a conversation opener from a profile's bio and
/// looking-for field
///
/// Backed by a generative text provider in production. May fail; the
/// conversation store substitutes [`FALLBACK_OPENER`] instead of
/// propagating the error.
pub trait SuggestionSource {
    fn suggest_opener(
        &self,
        bio: &str,
        looking_for: &str,
    ) -> impl std::future::Future<Output = Result<String, SourceError>> + Send;
}

/// Deterministic suggestion source for tests and offline mode
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedSuggestionSource;

impl SuggestionSource for CannedSuggestionSource {
    async fn suggest_opener(
        &self,
        _bio: &str,
        looking_for: &str,
    ) -> Result<String, SourceError> {
        Ok(format!("\"{}\", huh? I can work with that.", looking_for))
    }
}
