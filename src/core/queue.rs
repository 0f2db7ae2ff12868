use crate::models::Profile;
use std::collections::{HashSet, VecDeque};

/// Tag for an in-flight fill request
///
/// Carries the queue generation it was issued under; a fill completing
/// after the queue was rebuilt (preferences changed) is discarded on
/// arrival instead of polluting the new queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillTicket {
    generation: u64,
    batch: usize,
}

impl FillTicket {
    pub fn batch(&self) -> usize {
        self.batch
    }
}

/// FIFO backlog of not-yet-decided candidates
///
/// Deduplicated by profile id for the lifetime of the queue instance:
/// an id that has entered the queue once is never appended again, even
/// after it has been decided and advanced past.
#[derive(Debug)]
pub struct ProfileQueue {
    entries: VecDeque<Profile>,
    seen: HashSet<String>,
    generation: u64,
    in_flight: bool,
    drained: bool,
    low_water: usize,
}

impl ProfileQueue {
    pub fn new(low_water: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            seen: HashSet::new(),
            generation: 0,
            in_flight: false,
            drained: false,
            low_water,
        }
    }

    /// Number of not-yet-decided entries ahead of the cursor
    pub fn depth(&self) -> usize {
        self.entries.len()
    }

    pub fn current(&self) -> Option<&Profile> {
        self.entries.front()
    }

    /// First `k` not-yet-decided entries, without removing them
    pub fn peek_window(&self, k: usize) -> Vec<&Profile> {
        self.entries.iter().take(k).collect()
    }

    /// Remove and return the head entry (the candidate just decided)
    pub fn advance(&mut self) -> Option<Profile> {
        self.entries.pop_front()
    }

    /// Whether a background refill should be issued
    ///
    /// True only below the low-water mark, with no fill already in
    /// flight, and while the source is not known to be drained.
    pub fn needs_fill(&self) -> bool {
        self.depth() < self.low_water && !self.in_flight && !self.drained
    }

    /// Terminal state: the source yielded nothing and the backlog is empty.
    /// Requires an explicit reload to leave.
    pub fn is_exhausted(&self) -> bool {
        self.drained && self.entries.is_empty()
    }

    pub fn fill_in_flight(&self) -> bool {
        self.in_flight
    }

    /// Start a fill; returns `None` if one is already in flight
    pub fn begin_fill(&mut self, batch: usize) -> Option<FillTicket> {
        if self.in_flight {
            return None;
        }
        self.in_flight = true;
        Some(FillTicket {
            generation: self.generation,
            batch,
        })
    }

    /// Apply a completed fill
    ///
    /// A stale ticket (issued before a rebuild) is discarded wholesale.
    /// An empty batch from the source marks it drained. Returns the number
    /// of entries actually appended after dedup.
    pub fn complete_fill(&mut self, ticket: FillTicket, profiles: Vec<Profile>) -> usize {
        if ticket.generation != self.generation {
            tracing::debug!(
                ticket_generation = ticket.generation,
                queue_generation = self.generation,
                "discarding stale fill"
            );
            return 0;
        }
        self.in_flight = false;

        if profiles.is_empty() {
            self.drained = true;
            return 0;
        }

        let mut appended = 0;
        for profile in profiles {
            if self.seen.insert(profile.id.clone()) {
                self.entries.push_back(profile);
                appended += 1;
            }
        }
        appended
    }

    /// Abandon a fill whose fetch failed; appends nothing, leaves prior
    /// state unchanged apart from clearing the single-flight latch
    pub fn abort_fill(&mut self, ticket: FillTicket) {
        if ticket.generation == self.generation {
            self.in_flight = false;
        }
    }

    /// Discard all not-yet-decided entries and start a new generation
    ///
    /// Called when preferences change. Entries already converted to
    /// matches live in the match book and are unaffected.
    pub fn rebuild(&mut self) {
        self.generation += 1;
        self.entries.clear();
        self.seen.clear();
        self.in_flight = false;
        self.drained = false;
    }

    /// Explicit reset out of the exhausted state; keeps the seen set so a
    /// reload never re-surfaces already-decided candidates
    pub fn reset_drained(&mut self) {
        self.drained = false;
    }
}
