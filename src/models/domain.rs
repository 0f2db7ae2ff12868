use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Candidate profile as surfaced in the swipe deck
///
/// Immutable once fetched, except for the reputation pair
/// (`rating`/`rating_count`) which is owned by the rating aggregator.
/// Invariant: `rating_count == 0` implies `rating == 0.0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub name: String,
    pub age: u8,
    pub bio: String,
    /// One-line vibe status shown under the name
    pub status: String,
    #[serde(default)]
    pub interests: Vec<String>,
    /// Buddy-type tags used for filtering and overlap highlighting
    #[serde(default)]
    pub vibes: Vec<String>,
    pub mood: String,
    #[serde(rename = "lookingFor")]
    pub looking_for: String,
    /// Distance in miles
    pub distance: f64,
    #[serde(default)]
    pub rating: f64,
    #[serde(rename = "ratingCount", default)]
    pub rating_count: u32,
    #[serde(rename = "imageUrls", default)]
    pub image_urls: Vec<String>,
}

impl Profile {
    /// Vibe tags this profile shares with the user's preferences,
    /// in profile order
    pub fn shared_vibes(&self, preferences: &Preferences) -> Vec<String> {
        self.vibes
            .iter()
            .filter(|v| preferences.vibes.contains(v))
            .cloned()
            .collect()
    }
}

/// Audience filter for candidate fetching
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudienceFilter {
    #[default]
    All,
    Women,
    Men,
}

/// The current user's swipe preferences
///
/// Changing preferences invalidates the profile queue built under them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Preferences {
    /// Selected vibe tags, user-extendable
    #[serde(default)]
    pub vibes: Vec<String>,
    #[serde(default)]
    pub audience: AudienceFilter,
}

/// Terminal outcome of a resolved swipe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SwipeDecision {
    Accept,
    Reject,
}

/// A mutual match with a candidate
///
/// At most one per candidate id per session; the collection is ordered
/// most-recent-first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Match {
    pub id: Uuid,
    pub profile: Profile,
    /// Preview of the last self-authored message
    #[serde(rename = "lastMessage")]
    pub last_message: String,
    pub unread: bool,
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
    /// When the preview last changed; creation time until the first
    /// self-authored message
    #[serde(rename = "lastActivity")]
    pub last_activity: DateTime<Utc>,
}

/// Who authored a message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    Me,
    Them,
}

/// One message in a conversation transcript
///
/// Append-only; never mutated or reordered after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    pub id: Uuid,
    #[serde(rename = "matchId")]
    pub match_id: Uuid,
    pub sender: Sender,
    pub text: String,
    #[serde(rename = "sentAt")]
    pub sent_at: DateTime<Utc>,
}

/// The authenticated user's own editable profile
///
/// Written only through the `ProfileRepository` boundary; candidate
/// profiles are never mutated through it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OwnProfile {
    pub name: String,
    pub age: u8,
    pub bio: String,
    #[serde(rename = "mainImage")]
    pub main_image: String,
    #[serde(default)]
    pub gallery: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_with_vibes(vibes: &[&str]) -> Profile {
        Profile {
            id: "p1".to_string(),
            name: "Sasha".to_string(),
            age: 23,
            bio: "Here for a good time".to_string(),
            status: "Night Owl".to_string(),
            interests: vec!["Clubbing".to_string()],
            vibes: vibes.iter().map(|v| v.to_string()).collect(),
            mood: "Wild".to_string(),
            looking_for: "Fun tonight".to_string(),
            distance: 2.0,
            rating: 0.0,
            rating_count: 0,
            image_urls: vec![],
        }
    }

    #[test]
    fn test_shared_vibes_overlap() {
        let profile = profile_with_vibes(&["Smoke Buddy", "Club Buddy", "Gym Buddy"]);
        let preferences = Preferences {
            vibes: vec!["Club Buddy".to_string(), "FIFA Buddy".to_string()],
            audience: AudienceFilter::All,
        };

        assert_eq!(profile.shared_vibes(&preferences), vec!["Club Buddy"]);
    }

    #[test]
    fn test_shared_vibes_empty_preferences() {
        let profile = profile_with_vibes(&["Smoke Buddy"]);
        let preferences = Preferences::default();

        assert!(profile.shared_vibes(&preferences).is_empty());
    }

    #[test]
    fn test_audience_filter_serde() {
        let json = serde_json::to_string(&AudienceFilter::Women).unwrap();
        assert_eq!(json, "\"women\"");

        let parsed: AudienceFilter = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(parsed, AudienceFilter::All);
    }

    #[test]
    fn test_profile_camel_case_fields() {
        let profile = profile_with_vibes(&[]);
        let json = serde_json::to_value(&profile).unwrap();

        assert!(json.get("lookingFor").is_some());
        assert!(json.get("ratingCount").is_some());
        assert!(json.get("imageUrls").is_some());
    }
}
