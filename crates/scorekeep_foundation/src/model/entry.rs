//! Score entries, the append-only ledger.

use chrono::{DateTime, Utc};

use crate::ids::{CategoryId, CategoryKey, EntryId, PlayerId, RoundId};

/// Where an entry came from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum EntrySource {
    /// Typed in by a user.
    #[default]
    Manual,
    /// Minted by the engine (rules or score impact).
    RuleEngine,
}

/// An immutable, additive unit of score.
///
/// Corrections are new entries, never edits.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ScoreEntry {
    /// Unique id.
    pub id: EntryId,
    /// Player credited.
    pub player_id: PlayerId,
    /// Points, possibly negative.
    pub value: f64,
    /// Round the entry belongs to.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub round_id: Option<RoundId>,
    /// Category, or None for the uncategorized bucket.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub category_id: Option<CategoryId>,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Origin of the entry.
    #[cfg_attr(feature = "serde", serde(default))]
    pub source: EntrySource,
    /// What produced an engine-minted entry.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub note: Option<String>,
}

impl ScoreEntry {
    /// Creates a manual, uncategorized entry.
    #[must_use]
    pub fn new(
        id: impl Into<EntryId>,
        player_id: impl Into<PlayerId>,
        value: f64,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            player_id: player_id.into(),
            value,
            round_id: None,
            category_id: None,
            created_at,
            source: EntrySource::Manual,
            note: None,
        }
    }

    /// Books the entry to a category.
    #[must_use]
    pub fn in_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.category_id = Some(category.into());
        self
    }

    /// Attaches the entry to a round.
    #[must_use]
    pub fn in_round(mut self, round: impl Into<RoundId>) -> Self {
        self.round_id = Some(round.into());
        self
    }

    /// Marks the entry as engine-minted with a note.
    #[must_use]
    pub fn minted(mut self, note: impl Into<String>) -> Self {
        self.source = EntrySource::RuleEngine;
        self.note = Some(note.into());
        self
    }

    /// The bucket this entry sums into.
    #[must_use]
    pub fn bucket(&self) -> CategoryKey {
        CategoryKey::from(self.category_id.clone())
    }
}
