// Model exports
pub mod domain;

pub use domain::{
    AudienceFilter, Match, Message, OwnProfile, Preferences, Profile, Sender, SwipeDecision,
};
