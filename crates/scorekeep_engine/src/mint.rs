//! Minting of engine-produced score entries.

use chrono::{DateTime, Utc};
use scorekeep_foundation::{CategoryId, PlayerId, RoundId, ScoreEntry};

/// Hands out entries with deterministic ids for one pass.
///
/// Ids are `"{origin}:{position}"`, where position is the index the entry
/// will have in the ledger once the pass output is appended.
#[derive(Clone, Debug)]
pub struct Minter {
    next: usize,
    now: DateTime<Utc>,
    round: Option<RoundId>,
}

impl Minter {
    /// Starts minting after `ledger_len` existing entries.
    #[must_use]
    pub const fn new(ledger_len: usize, now: DateTime<Utc>, round: Option<RoundId>) -> Self {
        Self {
            next: ledger_len,
            now,
            round,
        }
    }

    /// Mints one entry. `origin` prefixes the id.
    pub fn mint(
        &mut self,
        origin: &str,
        note: String,
        player: &PlayerId,
        value: f64,
        category: Option<&CategoryId>,
    ) -> ScoreEntry {
        let mut entry = ScoreEntry::new(
            format!("{origin}:{}", self.next),
            player.clone(),
            value,
            self.now,
        )
        .minted(note);
        entry.category_id = category.cloned();
        entry.round_id = self.round.clone();
        self.next += 1;
        entry
    }

    /// Number of entries minted so far plus the starting ledger length.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.next
    }
}
