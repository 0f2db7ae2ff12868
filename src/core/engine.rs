use crate::models::{Match, Profile};
use chrono::Utc;
use rand::Rng;
use std::collections::HashSet;
use uuid::Uuid;

/// Mutual-interest decision, evaluated exactly once per Accept
///
/// The default implementation is a Bernoulli trial standing in for a
/// real mutual-like lookup against a persisted like table keyed by the
/// unordered (user, candidate) pair. A backend-driven policy replaces
/// this without touching the deck controller.
pub trait MatchPolicy: Send {
    fn mutual(&mut self, candidate: &Profile) -> bool;
}

/// Fixed-probability stand-in policy
#[derive(Debug, Clone, Copy)]
pub struct RandomMatchPolicy {
    probability: f64,
}

impl RandomMatchPolicy {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl MatchPolicy for RandomMatchPolicy {
    fn mutual(&mut self, _candidate: &Profile) -> bool {
        rand::thread_rng().gen_bool(self.probability)
    }
}

/// Policy that matches every accepted candidate; useful for demos and tests
#[derive(Debug, Clone, Copy)]
pub struct AlwaysMatch;

impl MatchPolicy for AlwaysMatch {
    fn mutual(&mut self, _candidate: &Profile) -> bool {
        true
    }
}

/// Policy that never matches
#[derive(Debug, Clone, Copy)]
pub struct NeverMatch;

impl MatchPolicy for NeverMatch {
    fn mutual(&mut self, _candidate: &Profile) -> bool {
        false
    }
}

/// The session's match collection, most-recent-first
///
/// Owned exclusively by the match engine; presentation code reads it by
/// reference and mutates match records only through the store/aggregator
/// contracts.
#[derive(Debug, Default)]
pub struct MatchBook {
    matches: Vec<Match>,
    matched_ids: HashSet<String>,
}

impl MatchBook {
    pub fn len(&self) -> usize {
        self.matches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matches.is_empty()
    }

    /// Iterate most-recent-first
    pub fn iter(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter()
    }

    pub fn get(&self, id: Uuid) -> Option<&Match> {
        self.matches.iter().find(|m| m.id == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut Match> {
        self.matches.iter_mut().find(|m| m.id == id)
    }

    pub fn by_candidate(&self, profile_id: &str) -> Option<&Match> {
        self.matches.iter().find(|m| m.profile.id == profile_id)
    }

    pub fn contains_candidate(&self, profile_id: &str) -> bool {
        self.matched_ids.contains(profile_id)
    }

    fn insert(&mut self, m: Match) {
        self.matched_ids.insert(m.profile.id.clone());
        self.matches.insert(0, m);
    }
}

/// Decides match outcomes for accepted candidates and owns the match book
pub struct MatchEngine {
    policy: Box<dyn MatchPolicy>,
    book: MatchBook,
}

impl MatchEngine {
    pub fn new(policy: Box<dyn MatchPolicy>) -> Self {
        Self {
            policy,
            book: MatchBook::default(),
        }
    }

    pub fn with_probability(probability: f64) -> Self {
        Self::new(Box::new(RandomMatchPolicy::new(probability)))
    }

    pub fn book(&self) -> &MatchBook {
        &self.book
    }

    pub fn book_mut(&mut self) -> &mut MatchBook {
        &mut self.book
    }

    /// Run the match policy for an accepted candidate
    ///
    /// Returns the id of the newly created match, or `None` when the
    /// policy declines. A replayed Accept on an already-matched candidate
    /// is a no-op: the normal queue advance cannot produce one, but the
    /// guard holds regardless of where the Accept came from.
    pub fn on_accept(&mut self, candidate: &Profile) -> Option<Uuid> {
        if self.book.contains_candidate(&candidate.id) {
            tracing::debug!(profile_id = %candidate.id, "accept replayed for matched candidate, ignoring");
            return None;
        }

        if !self.policy.mutual(candidate) {
            return None;
        }

        let now = Utc::now();
        let m = Match {
            id: Uuid::new_v4(),
            profile: candidate.clone(),
            last_message: String::new(),
            unread: true,
            created_at: now,
            last_activity: now,
        };
        let id = m.id;
        tracing::info!(profile_id = %candidate.id, match_id = %id, "match created");
        self.book.insert(m);
        Some(id)
    }
}

impl std::fmt::Debug for MatchEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchEngine")
            .field("matches", &self.book.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(id: &str) -> Profile {
        Profile {
            id: id.to_string(),
            name: format!("User {}", id),
            age: 25,
            bio: String::new(),
            status: String::new(),
            interests: vec![],
            vibes: vec![],
            mood: "Chill".to_string(),
            looking_for: "Chat".to_string(),
            distance: 4.0,
            rating: 0.0,
            rating_count: 0,
            image_urls: vec![],
        }
    }

    #[test]
    fn test_match_created_with_fresh_state() {
        let mut engine = MatchEngine::new(Box::new(AlwaysMatch));
        let id = engine.on_accept(&candidate("p1")).unwrap();

        let m = engine.book().get(id).unwrap();
        assert!(m.unread);
        assert_eq!(m.last_message, "");
        assert_eq!(m.profile.id, "p1");
        assert_eq!(m.last_activity, m.created_at);
    }

    #[test]
    fn test_no_match_when_policy_declines() {
        let mut engine = MatchEngine::new(Box::new(NeverMatch));
        assert!(engine.on_accept(&candidate("p1")).is_none());
        assert!(engine.book().is_empty());
    }

    #[test]
    fn test_duplicate_accept_is_noop() {
        let mut engine = MatchEngine::new(Box::new(AlwaysMatch));
        let first = engine.on_accept(&candidate("p1"));
        let second = engine.on_accept(&candidate("p1"));

        assert!(first.is_some());
        assert!(second.is_none());
        assert_eq!(engine.book().len(), 1);
    }

    #[test]
    fn test_most_recent_first_ordering() {
        let mut engine = MatchEngine::new(Box::new(AlwaysMatch));
        engine.on_accept(&candidate("p1"));
        engine.on_accept(&candidate("p2"));
        engine.on_accept(&candidate("p3"));

        let order: Vec<&str> = engine
            .book()
            .iter()
            .map(|m| m.profile.id.as_str())
            .collect();
        assert_eq!(order, vec!["p3", "p2", "p1"]);
    }

    #[test]
    fn test_by_candidate_lookup() {
        let mut engine = MatchEngine::new(Box::new(AlwaysMatch));
        let id = engine.on_accept(&candidate("p1")).unwrap();

        assert_eq!(engine.book().by_candidate("p1").unwrap().id, id);
        assert!(engine.book().by_candidate("p2").is_none());
    }

    #[test]
    fn test_random_policy_probability_clamped() {
        // Out-of-range probabilities must not panic gen_bool
        let mut policy = RandomMatchPolicy::new(1.5);
        assert!(policy.mutual(&candidate("p1")));

        let mut never = RandomMatchPolicy::new(-0.5);
        assert!(!never.mutual(&candidate("p1")));
    }
}
