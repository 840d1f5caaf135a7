//! Evaluation passes over a session snapshot.
//!
//! A pass runs three stages in fixed order:
//! 1. Category totals for every player (entries already in the snapshot)
//! 2. Object/variable context, global scope then each player
//! 3. Rules against the totals from stage 1
//!
//! Entries minted by stages 2 and 3 are returned, not applied. They count
//! toward totals on the next pass.

use chrono::{DateTime, Utc};
use im::OrdMap;
use scorekeep_foundation::{Instance, PlayerId, ScoreEntry, Snapshot};

use crate::config::EngineConfig;
use crate::mint::Minter;
use crate::objects::evaluate_objects;
use crate::resolver::EvaluationContext;
use crate::rule::evaluate_rules;
use crate::totals::{PlayerTotals, player_totals};

// =============================================================================
// Pass Outcome
// =============================================================================

/// Everything one pass produces.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PassOutcome {
    /// Totals per player, computed before any new entry.
    pub totals: OrdMap<PlayerId, PlayerTotals>,
    /// Instances whose derived state or computed value changed.
    pub instances: Vec<Instance>,
    /// New entries: score impacts first, then rule corrections.
    pub entries: Vec<ScoreEntry>,
}

impl PassOutcome {
    /// Totals of one player.
    #[must_use]
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerTotals> {
        self.totals.get(id)
    }

    /// Returns true if the pass changed nothing.
    #[must_use]
    pub fn is_quiescent(&self) -> bool {
        self.instances.is_empty() && self.entries.is_empty()
    }

    /// A new snapshot with updated instances swapped in and entries appended.
    #[must_use]
    pub fn apply(&self, snapshot: &Snapshot) -> Snapshot {
        let mut next = snapshot.clone();
        for instance in &self.instances {
            next.tables.insert_instance(instance.clone());
        }
        next.append(self.entries.iter().cloned());
        next
    }
}

// =============================================================================
// Engine
// =============================================================================

/// The scoring engine. Holds configuration only; every pass is a pure
/// function of the snapshot and the clock value passed in.
#[derive(Clone, Debug, Default)]
pub struct Engine {
    config: EngineConfig,
}

impl Engine {
    /// Creates an engine with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an engine with a custom configuration.
    #[must_use]
    pub const fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    /// The engine configuration.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Category totals for every player, without objects or rules.
    #[must_use]
    pub fn totals(&self, snapshot: &Snapshot) -> OrdMap<PlayerId, PlayerTotals> {
        let ctx = EvaluationContext::new(&snapshot.tables, &snapshot.settings, &self.config);
        snapshot
            .players()
            .into_iter()
            .map(|player| {
                let totals = player_totals(&snapshot.entries, &ctx.for_player(Some(&player)));
                (player, totals)
            })
            .collect()
    }

    /// Runs one pass. `now` stamps computed values and minted entries.
    #[tracing::instrument(skip_all, fields(entries = snapshot.entries.len()))]
    pub fn evaluate(&self, snapshot: &Snapshot, now: DateTime<Utc>) -> PassOutcome {
        let players = snapshot.players();
        let ctx = EvaluationContext::new(&snapshot.tables, &snapshot.settings, &self.config);
        let round = snapshot.settings.current().map(|r| r.id.clone());
        let mut minter = Minter::new(snapshot.entries.len(), now, round);

        let totals = self.totals(snapshot);
        tracing::debug!(players = players.len(), "category stage done");

        let objects = evaluate_objects(&ctx, &players, &totals, now, &mut minter);

        let mut entries = objects.entries;
        for player in &players {
            let Some(player_totals) = totals.get(player) else {
                continue;
            };
            let scoped = ctx.for_player(Some(player));
            entries.extend(evaluate_rules(
                snapshot.tables.rules(),
                player_totals,
                &scoped,
                &mut minter,
            ));
        }
        tracing::debug!(minted = entries.len(), "pass done");

        PassOutcome {
            totals,
            instances: objects.instances,
            entries,
        }
    }
}
