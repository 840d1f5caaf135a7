//! An immutable view of one session handed to the engine per evaluation.

use im::Vector;

use crate::ids::PlayerId;
use crate::model::{ScoreEntry, SessionSettings};
use crate::tables::Tables;

/// Everything one evaluation pass reads.
///
/// The engine never mutates a snapshot. The caller appends the entries the
/// engine mints and swaps in the instances it returns.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct Snapshot {
    /// Categories, definitions, instances, rules.
    pub tables: Tables,
    /// The score ledger in append order.
    pub entries: Vector<ScoreEntry>,
    /// Players, rounds, phase.
    pub settings: SessionSettings,
}

impl Snapshot {
    /// Creates a snapshot with no entries.
    #[must_use]
    pub fn new(tables: Tables, settings: SessionSettings) -> Self {
        Self {
            tables,
            entries: Vector::new(),
            settings,
        }
    }

    /// Appends one entry.
    #[must_use]
    pub fn with_entry(mut self, entry: ScoreEntry) -> Self {
        self.entries.push_back(entry);
        self
    }

    /// Appends entries in order.
    pub fn append<I: IntoIterator<Item = ScoreEntry>>(&mut self, entries: I) {
        self.entries.extend(entries);
    }

    /// Entries credited to one player.
    pub fn entries_for<'a>(&'a self, player: &'a PlayerId) -> impl Iterator<Item = &'a ScoreEntry> + 'a {
        self.entries.iter().filter(move |e| &e.player_id == player)
    }

    /// Players named in settings, plus any player with entries but no seat.
    #[must_use]
    pub fn players(&self) -> Vec<PlayerId> {
        let mut players = self.settings.players.clone();
        for entry in &self.entries {
            if !players.contains(&entry.player_id) {
                players.push(entry.player_id.clone());
            }
        }
        players
    }
}
