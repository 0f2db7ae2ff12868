use crate::models::{OwnProfile, Profile};
use crate::services::source::SourceError;
use std::collections::HashMap;
use std::sync::Mutex;

/// Optional persisted-state boundary for profile storage
///
/// `upsert_self` is used only for the authenticated user's own profile;
/// candidate and match state stay session-local and are never written
/// through this capability.
pub trait ProfileRepository {
    fn get(
        &self,
        id: &str,
    ) -> impl std::future::Future<Output = Result<Option<Profile>, SourceError>> + Send;

    fn list_others(
        &self,
        excluding_id: &str,
        limit: usize,
    ) -> impl std::future::Future<Output = Result<Vec<Profile>, SourceError>> + Send;

    fn upsert_self(
        &self,
        user_id: &str,
        profile: &OwnProfile,
    ) -> impl std::future::Future<Output = Result<(), SourceError>> + Send;
}

/// In-memory repository backing tests and single-process deployments
#[derive(Debug, Default)]
pub struct InMemoryProfileRepository {
    candidates: Mutex<HashMap<String, Profile>>,
    own: Mutex<HashMap<String, OwnProfile>>,
}

impl InMemoryProfileRepository {
    pub fn with_candidates(candidates: Vec<Profile>) -> Self {
        let map = candidates.into_iter().map(|p| (p.id.clone(), p)).collect();
        Self {
            candidates: Mutex::new(map),
            own: Mutex::new(HashMap::new()),
        }
    }

    pub fn own_profile(&self, user_id: &str) -> Option<OwnProfile> {
        self.own.lock().expect("repository lock poisoned").get(user_id).cloned()
    }
}

impl ProfileRepository for InMemoryProfileRepository {
    async fn get(&self, id: &str) -> Result<Option<Profile>, SourceError> {
        let candidates = self.candidates.lock().expect("repository lock poisoned");
        Ok(candidates.get(id).cloned())
    }

    async fn list_others(
        &self,
        excluding_id: &str,
        limit: usize,
    ) -> Result<Vec<Profile>, SourceError> {
        let candidates = self.candidates.lock().expect("repository lock poisoned");
        let mut others: Vec<Profile> = candidates
            .values()
            .filter(|p| p.id != excluding_id)
            .cloned()
            .collect();
        others.sort_by(|a, b| a.id.cmp(&b.id));
        others.truncate(limit);
        Ok(others)
    }

    async fn upsert_self(&self, user_id: &str, profile: &OwnProfile) -> Result<(), SourceError> {
        let mut own = self.own.lock().expect("repository lock poisoned");
        own.insert(user_id.to_string(), profile.clone());
        Ok(())
    }
}
