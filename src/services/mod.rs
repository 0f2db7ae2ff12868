// Service exports
pub mod reply;
pub mod repository;
pub mod source;
pub mod suggest;

pub use reply::{CannedReplySource, ReplySource, CANNED_REPLY};
pub use repository::{InMemoryProfileRepository, ProfileRepository};
pub use source::{fallback_profiles, ProfileSource, SourceError, StaticProfileSource};
pub use suggest::{CannedSuggestionSource, SuggestionSource, FALLBACK_OPENER};
