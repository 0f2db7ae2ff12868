use crate::models::Profile;
use crate::services::source::SourceError;

/// Canned counterpart line used when no real delivery channel exists
pub const CANNED_REPLY: &str = "That's interesting! Tell me more :)";

/// Produces the counterpart's reply text for a simulated conversation
///
/// A stand-in for a real message-delivery channel; production wires a
/// real channel (or a no-op) here, keeping the conversation store's
/// append/ordering contract independent of where replies originate.
pub trait ReplySource {
    fn reply(
        &self,
        profile: &Profile,
    ) -> impl std::future::Future<Output = Result<String, SourceError>> + Send;
}

/// Always replies with the canned line
#[derive(Debug, Clone, Copy, Default)]
pub struct CannedReplySource;

impl ReplySource for CannedReplySource {
    async fn reply(&self, _profile: &Profile) -> Result<String, SourceError> {
        Ok(CANNED_REPLY.to_string())
    }
}
