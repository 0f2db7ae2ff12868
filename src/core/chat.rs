use crate::core::engine::MatchBook;
use crate::models::{Message, Sender};
use crate::services::reply::{ReplySource, CANNED_REPLY};
use crate::services::suggest::{SuggestionSource, FALLBACK_OPENER};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};
use uuid::Uuid;

/// Errors from conversation operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChatError {
    /// Contract violation: the caller referenced a match that does not
    /// exist. Treated as fatal by callers, never silently ignored.
    #[error("no match with id {0}")]
    InvalidMatch(Uuid),
}

/// Handle for a pending simulated reply
///
/// Bound to the match id at send time, so switching conversation views
/// can never misdeliver the reply into the wrong thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyTicket {
    match_id: Uuid,
}

impl ReplyTicket {
    pub fn match_id(&self) -> Uuid {
        self.match_id
    }
}

/// Per-match ordered message log
///
/// Transcripts are append-only and never reordered. The owning match's
/// preview (`last_message`) tracks self-authored messages only.
#[derive(Debug)]
pub struct ConversationStore {
    threads: HashMap<Uuid, Vec<Message>>,
    last_stamp: Option<DateTime<Utc>>,
    reply_delay: Duration,
}

impl ConversationStore {
    pub fn new(reply_delay: Duration) -> Self {
        Self {
            threads: HashMap::new(),
            last_stamp: None,
            reply_delay,
        }
    }

    /// Ordered transcript for a match; empty for a fresh match
    pub fn transcript(&self, match_id: Uuid) -> &[Message] {
        self.threads.get(&match_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Append a message to a match's transcript
    ///
    /// Timestamps are strictly increasing within the store. A message
    /// from `Sender::Me` also updates the match preview and its activity
    /// stamp; an incoming message flags the match unread instead.
    pub fn append(
        &mut self,
        book: &mut MatchBook,
        match_id: Uuid,
        text: &str,
        sender: Sender,
    ) -> Result<&Message, ChatError> {
        let entry = book
            .get_mut(match_id)
            .ok_or(ChatError::InvalidMatch(match_id))?;

        let sent_at = self.next_stamp();
        let message = Message {
            id: Uuid::new_v4(),
            match_id,
            sender,
            text: text.to_string(),
            sent_at,
        };

        match sender {
            Sender::Me => {
                entry.last_message = text.to_string();
                entry.last_activity = sent_at;
            }
            Sender::Them => entry.unread = true,
        }

        let thread = self.threads.entry(match_id).or_default();
        thread.push(message);
        Ok(thread.last().expect("just pushed"))
    }

    /// Append an outgoing message and schedule its simulated reply
    pub fn send(
        &mut self,
        book: &mut MatchBook,
        match_id: Uuid,
        text: &str,
    ) -> Result<ReplyTicket, ChatError> {
        self.append(book, match_id, text, Sender::Me)?;
        debug!(%match_id, "outgoing message appended, reply scheduled");
        Ok(ReplyTicket { match_id })
    }

    /// Deliver the simulated counterpart reply for an outgoing message
    ///
    /// Sleeps the configured delay, then appends to the ticket's match,
    /// regardless of which conversation view is open by then. A failing
    /// reply source falls back to the canned line; delivery itself never
    /// errors except on a vanished match.
    pub async fn deliver_reply<R: ReplySource>(
        &mut self,
        book: &mut MatchBook,
        source: &R,
        ticket: ReplyTicket,
    ) -> Result<(), ChatError> {
        tokio::time::sleep(self.reply_delay).await;

        let profile = book
            .get(ticket.match_id)
            .ok_or(ChatError::InvalidMatch(ticket.match_id))?
            .profile
            .clone();

        let text = match source.reply(&profile).await {
            Ok(text) => text,
            Err(e) => {
                warn!("reply source failed, using canned line: {}", e);
                CANNED_REPLY.to_string()
            }
        };

        self.append(book, ticket.match_id, &text, Sender::Them)?;
        Ok(())
    }

    /// Clear the match's unread flag; idempotent
    pub fn mark_read(&self, book: &mut MatchBook, match_id: Uuid) -> Result<(), ChatError> {
        let entry = book
            .get_mut(match_id)
            .ok_or(ChatError::InvalidMatch(match_id))?;
        entry.unread = false;
        Ok(())
    }

    /// Ask the suggestion source for an opener for this match
    ///
    /// Source failure is recovered with the fixed fallback phrase; only
    /// an unknown match id is an error.
    pub async fn request_suggestion<T: SuggestionSource>(
        &self,
        book: &MatchBook,
        match_id: Uuid,
        source: &T,
    ) -> Result<String, ChatError> {
        let entry = book.get(match_id).ok_or(ChatError::InvalidMatch(match_id))?;

        match source
            .suggest_opener(&entry.profile.bio, &entry.profile.looking_for)
            .await
        {
            Ok(opener) => Ok(opener),
            Err(e) => {
                warn!("suggestion source failed, using fallback opener: {}", e);
                Ok(FALLBACK_OPENER.to_string())
            }
        }
    }

    // Utc::now() can repeat under coarse clocks; nudge forward to keep
    // transcript timestamps strictly increasing.
    fn next_stamp(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let stamp = match self.last_stamp {
            Some(prev) if now <= prev => prev + ChronoDuration::milliseconds(1),
            _ => now,
        };
        self.last_stamp = Some(stamp);
        stamp
    }
}

impl Default for ConversationStore {
    fn default() -> Self {
        Self::new(Duration::from_millis(2000))
    }
}
