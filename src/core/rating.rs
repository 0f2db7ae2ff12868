use crate::models::Profile;
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

/// Errors from rating submission
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RatingError {
    /// This match was already rated this session; expected and
    /// recoverable, surfaced to the UI as a disabled control
    #[error("match already rated this session")]
    AlreadyRated,

    #[error("rating sample {0} outside 1-10")]
    OutOfRange(u8),
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Maintains the running cumulative-average rating per profile
///
/// Each match permits one rating submission per session. The reputation
/// pair is replaced atomically: every error path leaves it untouched.
#[derive(Debug, Default)]
pub struct RatingAggregator {
    rated: HashSet<Uuid>,
}

impl RatingAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_rated(&self, match_id: Uuid) -> bool {
        self.rated.contains(&match_id)
    }

    /// Fold one integer sample in [1,10] into the profile's reputation
    ///
    /// Cumulative average: later samples never outweigh earlier ones.
    /// Returns the new rating.
    pub fn apply(
        &mut self,
        match_id: Uuid,
        profile: &mut Profile,
        sample: u8,
    ) -> Result<f64, RatingError> {
        if !(1..=10).contains(&sample) {
            return Err(RatingError::OutOfRange(sample));
        }
        if self.rated.contains(&match_id) {
            return Err(RatingError::AlreadyRated);
        }

        let count = profile.rating_count as f64;
        let rating = round1((profile.rating * count + sample as f64) / (count + 1.0));

        profile.rating = rating;
        profile.rating_count += 1;
        self.rated.insert(match_id);

        tracing::debug!(
            profile_id = %profile.id,
            rating,
            count = profile.rating_count,
            "rating applied"
        );
        Ok(rating)
    }

    /// Forget the per-session guard; a new session may rate again
    pub fn reset_session(&mut self) {
        self.rated.clear();
    }
}
