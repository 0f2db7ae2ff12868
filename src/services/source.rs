use crate::models::{Preferences, Profile};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Errors from the external profile/suggestion/reply sources
///
/// Always recovered locally with a fallback value; never surfaced as a
/// user-visible error.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("source unavailable: {0}")]
    Unavailable(String),

    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

/// Supplies batches of candidate profiles
///
/// Implementations are expected to bias results by the preference vibe
/// tags and audience filter. May fail; callers substitute fallbacks and
/// never propagate the error to the user.
pub trait ProfileSource {
    fn fetch(
        &self,
        count: usize,
        preferences: &Preferences,
    ) -> impl std::future::Future<Output = Result<Vec<Profile>, SourceError>> + Send;
}

/// In-memory profile source serving a fixed roster in order
///
/// Used by tests and offline mode. Once the roster is consumed it
/// returns empty batches, which drives the deck into its exhausted
/// state.
#[derive(Debug)]
pub struct StaticProfileSource {
    roster: Vec<Profile>,
    cursor: AtomicUsize,
}

impl StaticProfileSource {
    pub fn new(roster: Vec<Profile>) -> Self {
        Self {
            roster,
            cursor: AtomicUsize::new(0),
        }
    }
}

impl ProfileSource for StaticProfileSource {
    async fn fetch(
        &self,
        count: usize,
        _preferences: &Preferences,
    ) -> Result<Vec<Profile>, SourceError> {
        let start = self.cursor.fetch_add(count, Ordering::Relaxed);
        let end = (start + count).min(self.roster.len());
        if start >= self.roster.len() {
            return Ok(vec![]);
        }
        Ok(self.roster[start..end].to_vec())
    }
}

/// Fixed fallback roster substituted when the initial fetch fails, so
/// the deck is never empty at startup
pub fn fallback_profiles() -> Vec<Profile> {
    vec![
        Profile {
            id: "fallback-1".to_string(),
            name: "Sasha".to_string(),
            age: 23,
            bio: "Here for a good time, not a long time.".to_string(),
            status: "Night Owl".to_string(),
            interests: vec![
                "Clubbing".to_string(),
                "Afters".to_string(),
                "Spicy Food".to_string(),
            ],
            vibes: vec!["Smoke Buddy".to_string(), "Club Buddy".to_string()],
            mood: "Wild".to_string(),
            looking_for: "Fun tonight".to_string(),
            distance: 2.0,
            rating: 8.9,
            rating_count: 12,
            image_urls: vec!["https://picsum.photos/seed/sasha/600/900".to_string()],
        },
        Profile {
            id: "fallback-2".to_string(),
            name: "Jay".to_string(),
            age: 26,
            bio: "Gym rat by day, gamer by night. Need player 2.".to_string(),
            status: "Chill Vibes Only".to_string(),
            interests: vec!["Gym".to_string(), "Gaming".to_string(), "Drive".to_string()],
            vibes: vec!["FIFA Buddy".to_string(), "Gym Buddy".to_string()],
            mood: "Chill".to_string(),
            looking_for: "Gaming buddy +".to_string(),
            distance: 5.0,
            rating: 7.5,
            rating_count: 8,
            image_urls: vec!["https://picsum.photos/seed/jay/600/900".to_string()],
        },
        Profile {
            id: "fallback-3".to_string(),
            name: "Riley".to_string(),
            age: 24,
            bio: "Spontaneous adventures? I'm in.".to_string(),
            status: "Explorer".to_string(),
            interests: vec![
                "Hiking".to_string(),
                "Photography".to_string(),
                "Coffee".to_string(),
            ],
            vibes: vec!["Hiking Buddy".to_string(), "Travel Buddy".to_string()],
            mood: "Spontaneous".to_string(),
            looking_for: "Adventure".to_string(),
            distance: 8.0,
            rating: 9.2,
            rating_count: 5,
            image_urls: vec!["https://picsum.photos/seed/riley/600/900".to_string()],
        },
    ]
}
