// Core engine exports
pub mod chat;
pub mod deck;
pub mod engine;
pub mod gesture;
pub mod queue;
pub mod rating;

pub use chat::{ChatError, ConversationStore, ReplyTicket};
pub use deck::{DeckState, SwipeDeck, SwipeOutcome};
pub use engine::{AlwaysMatch, MatchBook, MatchEngine, MatchPolicy, NeverMatch, RandomMatchPolicy};
pub use gesture::{GestureResolver, Lean};
pub use queue::{FillTicket, ProfileQueue};
pub use rating::{round1, RatingAggregator, RatingError};
