use crate::config::{DeckSettings, Settings};
use crate::core::engine::{MatchBook, MatchEngine};
use crate::core::gesture::{GestureResolver, Lean};
use crate::core::queue::ProfileQueue;
use crate::models::{Preferences, Profile, SwipeDecision};
use crate::services::source::{fallback_profiles, ProfileSource};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Deck lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeckState {
    /// Initial fill in flight, nothing to show
    Loading,
    /// A current candidate is interactable
    Ready,
    /// Queue empty and the source yielded nothing; terminal until an
    /// explicit reload
    Exhausted,
}

/// What a resolved interaction did, reported to the renderer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeOutcome {
    /// Decision recorded and a match was created
    Matched(Uuid),
    /// Decision recorded, deck advanced, no match
    Advanced,
    /// Gesture fell short of the thresholds; card returns to rest
    Undecided,
    /// No candidate, or the previous decision is still settling
    Ignored,
}

/// Orchestrates queue, resolver and match engine
///
/// Holds the visible window (current, next) for the renderer and applies
/// decisions with the ordering guarantee: decision recorded before
/// advance, advance before the next candidate accepts input. All async
/// work is caller-driven; nothing is spawned internally, so `&mut self`
/// serializes every mutation.
pub struct SwipeDeck<S> {
    user_id: String,
    preferences: Preferences,
    source: S,
    queue: ProfileQueue,
    resolver: GestureResolver,
    engine: MatchEngine,
    state: DeckState,
    settling: bool,
    settings: DeckSettings,
}

impl<S: ProfileSource> SwipeDeck<S> {
    pub fn new(
        user_id: impl Into<String>,
        preferences: Preferences,
        source: S,
        engine: MatchEngine,
        settings: &Settings,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            preferences,
            source,
            queue: ProfileQueue::new(settings.deck.low_water_mark),
            resolver: GestureResolver::from_settings(&settings.gesture),
            engine,
            state: DeckState::Loading,
            settling: false,
            settings: settings.deck,
        }
    }

    pub fn state(&self) -> DeckState {
        self.state
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn matches(&self) -> &MatchBook {
        self.engine.book()
    }

    pub fn matches_mut(&mut self) -> &mut MatchBook {
        self.engine.book_mut()
    }

    /// The visible window: current candidate and the preview behind it
    pub fn window(&self) -> (Option<&Profile>, Option<&Profile>) {
        let window = self.queue.peek_window(2);
        (window.first().copied(), window.get(1).copied())
    }

    pub fn current(&self) -> Option<&Profile> {
        self.queue.current()
    }

    /// Continuous drag affordance, delegated to the resolver
    pub fn lean(&self, dx: f64) -> Lean {
        self.resolver.lean(dx)
    }

    /// Perform the initial fill and leave `Loading`
    pub async fn start(&mut self) {
        info!(user_id = %self.user_id, "starting swipe deck");
        self.fill(self.settings.initial_fill, true).await;
    }

    /// Resolve a released gesture; sub-threshold releases mutate nothing
    pub async fn release(&mut self, dx: f64, vx: f64) -> SwipeOutcome {
        match self.resolver.resolve(dx, vx) {
            Some(decision) => self.decide(decision).await,
            None => SwipeOutcome::Undecided,
        }
    }

    /// Apply a terminal decision to the current candidate
    ///
    /// This is also the explicit button path; it is indistinguishable
    /// downstream from a gesture-driven decision. At most one decision
    /// per candidate: input arriving while the settle delay is pending
    /// is ignored.
    pub async fn decide(&mut self, decision: SwipeDecision) -> SwipeOutcome {
        if self.settling || self.state != DeckState::Ready {
            debug!(?decision, state = ?self.state, "decision ignored");
            return SwipeOutcome::Ignored;
        }
        let Some(current) = self.queue.current().cloned() else {
            return SwipeOutcome::Ignored;
        };

        self.settling = true;

        let outcome = match decision {
            SwipeDecision::Accept => match self.engine.on_accept(&current) {
                Some(match_id) => SwipeOutcome::Matched(match_id),
                None => SwipeOutcome::Advanced,
            },
            SwipeDecision::Reject => SwipeOutcome::Advanced,
        };
        debug!(profile_id = %current.id, ?decision, ?outcome, "decision recorded");

        // Settle delay: lets the exit animation finish before the next
        // candidate goes live
        tokio::time::sleep(self.settings.settle_delay()).await;

        self.queue.advance();
        self.settling = false;

        if self.queue.needs_fill() {
            self.refill().await;
        }

        // Nothing left to show, whether the source drained or the refill
        // failed with an empty backlog; reload is the only way forward.
        if self.queue.current().is_none() {
            info!(user_id = %self.user_id, "deck exhausted");
            self.state = DeckState::Exhausted;
        }

        outcome
    }

    /// Replace preferences, discarding the queue built under the old ones
    ///
    /// A fill that was in flight under the old preferences carries a
    /// stale generation tag and is discarded by the queue on arrival.
    /// Matches already created are unaffected.
    pub async fn set_preferences(&mut self, preferences: Preferences) {
        info!(user_id = %self.user_id, "preferences changed, rebuilding queue");
        self.preferences = preferences;
        self.queue.rebuild();
        self.settling = false;
        self.state = DeckState::Loading;
        self.fill(self.settings.initial_fill, true).await;
    }

    /// Explicit reset out of `Exhausted`; re-issues the initial fill
    pub async fn reload(&mut self) {
        info!(user_id = %self.user_id, "reloading deck");
        self.queue.reset_drained();
        self.settling = false;
        self.state = DeckState::Loading;
        self.fill(self.settings.initial_fill, false).await;
    }

    async fn fill(&mut self, batch: usize, fallback_on_error: bool) {
        let Some(ticket) = self.queue.begin_fill(batch) else {
            return;
        };
        match self.source.fetch(batch, &self.preferences).await {
            Ok(profiles) => {
                let added = self.queue.complete_fill(ticket, profiles);
                debug!(added, "deck filled");
            }
            Err(e) if fallback_on_error => {
                warn!("profile fetch failed, substituting fallback roster: {}", e);
                self.queue.complete_fill(ticket, fallback_profiles());
            }
            Err(e) => {
                warn!("profile fetch failed: {}", e);
                self.queue.abort_fill(ticket);
            }
        }
        self.state = if self.queue.depth() > 0 {
            DeckState::Ready
        } else {
            DeckState::Exhausted
        };
    }

    async fn refill(&mut self) {
        let Some(ticket) = self.queue.begin_fill(self.settings.refill_batch) else {
            return;
        };
        match self.source.fetch(ticket.batch(), &self.preferences).await {
            Ok(profiles) => {
                let added = self.queue.complete_fill(ticket, profiles);
                debug!(added, "deck refilled");
            }
            Err(e) => {
                warn!("refill fetch failed: {}", e);
                self.queue.abort_fill(ticket);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::{AlwaysMatch, NeverMatch};
    use crate::services::source::{SourceError, StaticProfileSource};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn profile(id: &str) -> Profile {
        Profile {
            id: id.to_string(),
            name: format!("User {}", id),
            age: 24,
            bio: String::new(),
            status: String::new(),
            interests: vec![],
            vibes: vec![],
            mood: "Chill".to_string(),
            looking_for: "Chat".to_string(),
            distance: 3.0,
            rating: 0.0,
            rating_count: 0,
            image_urls: vec![],
        }
    }

    fn roster(n: usize) -> Vec<Profile> {
        (0..n).map(|i| profile(&format!("p{}", i))).collect()
    }

    fn deck_with(
        roster: Vec<Profile>,
        policy: Box<dyn crate::core::engine::MatchPolicy>,
    ) -> SwipeDeck<StaticProfileSource> {
        SwipeDeck::new(
            "me",
            Preferences::default(),
            StaticProfileSource::new(roster),
            MatchEngine::new(policy),
            &Settings::default(),
        )
    }

    /// Source that always fails, for fallback tests
    struct BrokenSource;

    impl ProfileSource for BrokenSource {
        async fn fetch(
            &self,
            _count: usize,
            _preferences: &Preferences,
        ) -> Result<Vec<Profile>, SourceError> {
            Err(SourceError::Unavailable("offline".to_string()))
        }
    }

    /// Source that counts fetches, for replenishment accounting
    struct CountingSource {
        inner: StaticProfileSource,
        fetches: AtomicUsize,
        batches: std::sync::Mutex<Vec<usize>>,
    }

    impl CountingSource {
        fn new(roster: Vec<Profile>) -> Self {
            Self {
                inner: StaticProfileSource::new(roster),
                fetches: AtomicUsize::new(0),
                batches: std::sync::Mutex::new(vec![]),
            }
        }
    }

    impl ProfileSource for CountingSource {
        async fn fetch(
            &self,
            count: usize,
            preferences: &Preferences,
        ) -> Result<Vec<Profile>, SourceError> {
            self.fetches.fetch_add(1, Ordering::Relaxed);
            self.batches.lock().unwrap().push(count);
            self.inner.fetch(count, preferences).await
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_reaches_ready_with_window() {
        let mut deck = deck_with(roster(6), Box::new(NeverMatch));
        assert_eq!(deck.state(), DeckState::Loading);

        deck.start().await;
        assert_eq!(deck.state(), DeckState::Ready);

        let (current, next) = deck.window();
        assert_eq!(current.unwrap().id, "p0");
        assert_eq!(next.unwrap().id, "p1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_decision_advances_deck() {
        let mut deck = deck_with(roster(6), Box::new(NeverMatch));
        deck.start().await;

        let outcome = deck.decide(SwipeDecision::Reject).await;
        assert_eq!(outcome, SwipeOutcome::Advanced);
        assert_eq!(deck.current().unwrap().id, "p1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_accept_runs_match_engine() {
        let mut deck = deck_with(roster(6), Box::new(AlwaysMatch));
        deck.start().await;

        let outcome = deck.decide(SwipeDecision::Accept).await;
        let SwipeOutcome::Matched(match_id) = outcome else {
            panic!("expected a match, got {:?}", outcome);
        };
        assert_eq!(deck.matches().get(match_id).unwrap().profile.id, "p0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_sub_threshold_release_mutates_nothing() {
        let mut deck = deck_with(roster(6), Box::new(AlwaysMatch));
        deck.start().await;
        let depth_before = deck.queue.depth();

        let outcome = deck.release(60.0, 0.0).await;
        assert_eq!(outcome, SwipeOutcome::Undecided);
        assert_eq!(deck.queue.depth(), depth_before);
        assert!(deck.matches().is_empty());
        assert_eq!(deck.current().unwrap().id, "p0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_gesture_and_button_paths_converge() {
        let mut gesture_deck = deck_with(roster(6), Box::new(AlwaysMatch));
        gesture_deck.start().await;
        let mut button_deck = deck_with(roster(6), Box::new(AlwaysMatch));
        button_deck.start().await;

        let by_gesture = gesture_deck.release(180.0, 0.0).await;
        let by_button = button_deck.decide(SwipeDecision::Accept).await;

        assert!(matches!(by_gesture, SwipeOutcome::Matched(_)));
        assert!(matches!(by_button, SwipeOutcome::Matched(_)));
        assert_eq!(gesture_deck.current().unwrap().id, "p1");
        assert_eq!(button_deck.current().unwrap().id, "p1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_refill_triggered_below_low_water() {
        let source = CountingSource::new(roster(12));
        let mut deck = SwipeDeck::new(
            "me",
            Preferences::default(),
            source,
            MatchEngine::new(Box::new(NeverMatch)),
            &Settings::default(),
        );
        deck.start().await;
        assert_eq!(deck.source.fetches.load(Ordering::Relaxed), 1);

        // 5 entries; dropping to 4, then 3 stays at/above low water (3)
        deck.decide(SwipeDecision::Reject).await;
        deck.decide(SwipeDecision::Reject).await;
        assert_eq!(deck.source.fetches.load(Ordering::Relaxed), 1);

        // Dropping to 2 crosses the mark: exactly one batch-3 refill
        deck.decide(SwipeDecision::Reject).await;
        assert_eq!(deck.source.fetches.load(Ordering::Relaxed), 2);
        assert_eq!(*deck.source.batches.lock().unwrap(), vec![5, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_refill_with_empty_backlog_exhausts() {
        // Serves its roster, then fails every later fetch instead of
        // returning an empty batch
        struct DryingSource {
            inner: StaticProfileSource,
        }
        impl ProfileSource for DryingSource {
            async fn fetch(
                &self,
                count: usize,
                preferences: &Preferences,
            ) -> Result<Vec<Profile>, SourceError> {
                let batch = self.inner.fetch(count, preferences).await?;
                if batch.is_empty() {
                    Err(SourceError::Unavailable("upstream down".to_string()))
                } else {
                    Ok(batch)
                }
            }
        }

        let mut deck = SwipeDeck::new(
            "me",
            Preferences::default(),
            DryingSource {
                inner: StaticProfileSource::new(roster(5)),
            },
            MatchEngine::new(Box::new(NeverMatch)),
            &Settings::default(),
        );
        deck.start().await;

        for _ in 0..5 {
            deck.decide(SwipeDecision::Reject).await;
        }

        // Never Ready with an empty window, even though the source
        // errored rather than draining cleanly
        assert!(deck.current().is_none());
        assert_eq!(deck.state(), DeckState::Exhausted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_clears_abandoned_settle() {
        let mut deck = deck_with(roster(8), Box::new(NeverMatch));
        deck.start().await;

        // Drop a decision future mid-settle
        let abandoned = tokio::time::timeout(
            std::time::Duration::ZERO,
            deck.decide(SwipeDecision::Reject),
        )
        .await;
        assert!(abandoned.is_err());

        deck.reload().await;
        assert_eq!(
            deck.decide(SwipeDecision::Reject).await,
            SwipeOutcome::Advanced
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_exhaustion_and_reload() {
        let mut deck = deck_with(roster(2), Box::new(NeverMatch));
        deck.start().await;

        deck.decide(SwipeDecision::Reject).await;
        deck.decide(SwipeDecision::Reject).await;
        assert_eq!(deck.state(), DeckState::Exhausted);

        // Roster is drained, so reload lands back in Exhausted
        deck.reload().await;
        assert_eq!(deck.state(), DeckState::Exhausted);

        // Input in Exhausted is ignored
        assert_eq!(deck.decide(SwipeDecision::Accept).await, SwipeOutcome::Ignored);
    }

    #[tokio::test(start_paused = true)]
    async fn test_reload_recovers_when_source_has_profiles() {
        // Empty first batch, profiles afterwards
        struct LateSource {
            calls: AtomicUsize,
        }
        impl ProfileSource for LateSource {
            async fn fetch(
                &self,
                count: usize,
                _preferences: &Preferences,
            ) -> Result<Vec<Profile>, SourceError> {
                if self.calls.fetch_add(1, Ordering::Relaxed) == 0 {
                    Ok(vec![])
                } else {
                    Ok((0..count).map(|i| profile(&format!("late{}", i))).collect())
                }
            }
        }

        let mut deck = SwipeDeck::new(
            "me",
            Preferences::default(),
            LateSource { calls: AtomicUsize::new(0) },
            MatchEngine::new(Box::new(NeverMatch)),
            &Settings::default(),
        );
        deck.start().await;
        assert_eq!(deck.state(), DeckState::Exhausted);

        deck.reload().await;
        assert_eq!(deck.state(), DeckState::Ready);
        assert_eq!(deck.current().unwrap().id, "late0");
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_roster_on_startup_failure() {
        let mut deck = SwipeDeck::new(
            "me",
            Preferences::default(),
            BrokenSource,
            MatchEngine::new(Box::new(NeverMatch)),
            &Settings::default(),
        );
        deck.start().await;

        assert_eq!(deck.state(), DeckState::Ready);
        assert_eq!(deck.current().unwrap().id, "fallback-1");
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_preferences_rebuilds_queue() {
        let mut deck = deck_with(roster(12), Box::new(AlwaysMatch));
        deck.start().await;
        deck.decide(SwipeDecision::Accept).await;
        let matches_before = deck.matches().len();

        deck.set_preferences(Preferences {
            vibes: vec!["Gym Buddy".to_string()],
            audience: crate::models::AudienceFilter::Women,
        })
        .await;

        assert_eq!(deck.state(), DeckState::Ready);
        // Fresh initial fill from the source, old backlog discarded
        assert_eq!(deck.current().unwrap().id, "p5");
        // Matches created under the old preferences survive
        assert_eq!(deck.matches().len(), matches_before);
    }
}
