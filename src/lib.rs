//! Vibe Core - swipe deck and match engine for the Vibe dating app
//!
//! This library provides the decision core consumed by the presentation
//! layer: a continuously replenished candidate queue, gesture-to-decision
//! resolution, match creation with deduplication, per-match conversation
//! state, and cumulative rating aggregation. Rendering, authentication
//! and the generative profile/text backends stay outside, behind the
//! traits in [`services`].

pub mod config;
pub mod core;
pub mod models;
pub mod services;

// Re-export commonly used types
pub use crate::core::{
    ConversationStore, DeckState, GestureResolver, MatchEngine, ProfileQueue, RatingAggregator,
    SwipeDeck, SwipeOutcome,
};
pub use crate::models::{Match, Message, Preferences, Profile, Sender, SwipeDecision};
pub use crate::services::{ProfileSource, ReplySource, SourceError, SuggestionSource};
