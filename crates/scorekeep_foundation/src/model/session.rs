//! Session-level settings the engine reads: players, rounds, phase.

use crate::ids::{PlayerId, RoundId};

/// A round of play.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Round {
    /// Unique id.
    pub id: RoundId,
    /// 0-based position.
    pub index: u32,
    /// Display name.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub name: Option<String>,
}

impl Round {
    /// Creates a round.
    #[must_use]
    pub fn new(id: impl Into<RoundId>, index: u32) -> Self {
        Self {
            id: id.into(),
            index,
            name: None,
        }
    }
}

/// Players, rounds, and mechanics of one session.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase", default))]
pub struct SessionSettings {
    /// Players in seat order.
    pub players: Vec<PlayerId>,
    /// Rounds in order.
    pub rounds: Vec<Round>,
    /// Whether the session tracks rounds.
    pub rounds_enabled: bool,
    /// Whether the template has a phase mechanic.
    pub phase_enabled: bool,
    /// The round in progress.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub current_round: Option<RoundId>,
    /// The phase in progress.
    #[cfg_attr(feature = "serde", serde(skip_serializing_if = "Option::is_none"))]
    pub current_phase: Option<u32>,
}

impl SessionSettings {
    /// Creates settings for the given players, without rounds or phases.
    #[must_use]
    pub fn with_players<I, P>(players: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PlayerId>,
    {
        Self {
            players: players.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    /// Enables rounds and appends `count` rounds with ids `r1..=rN`.
    #[must_use]
    pub fn with_rounds(mut self, count: u32) -> Self {
        self.rounds_enabled = true;
        self.rounds = (0..count)
            .map(|i| Round::new(format!("r{}", i + 1), i))
            .collect();
        self
    }

    /// Sets the round in progress.
    #[must_use]
    pub fn at_round(mut self, round: impl Into<RoundId>) -> Self {
        self.current_round = Some(round.into());
        self
    }

    /// Enables the phase mechanic.
    #[must_use]
    pub const fn with_phase(mut self, phase: Option<u32>) -> Self {
        self.phase_enabled = true;
        self.current_phase = phase;
        self
    }

    /// Looks up a round by id.
    #[must_use]
    pub fn round(&self, id: &RoundId) -> Option<&Round> {
        self.rounds.iter().find(|r| &r.id == id)
    }

    /// The round in progress, if it is known.
    #[must_use]
    pub fn current(&self) -> Option<&Round> {
        self.current_round.as_ref().and_then(|id| self.round(id))
    }

    /// Index of the round in progress.
    #[must_use]
    pub fn current_round_index(&self) -> Option<u32> {
        self.current().map(|r| r.index)
    }
}
