//! The seam between formulas and the data they read.
//!
//! The evaluator never looks at tables or totals itself. Everything a
//! formula can observe, from `{Gold}` to `round()`, is answered by a
//! [`Resolver`].

use std::collections::HashMap;

use scorekeep_foundation::{InstanceState, Result, Value};

/// Answers references and context functions during evaluation.
///
/// Methods take `&mut self` so implementations can memoize and track the
/// references currently being evaluated.
pub trait Resolver {
    /// Resolves `{name}`. Returns `Ok(None)` when nothing matches.
    ///
    /// # Errors
    /// Returns an error when resolving the name requires evaluating another
    /// formula that fails (for example a reference cycle).
    fn resolve(&mut self, name: &str) -> Result<Option<Value>>;

    /// State of the instance `name` refers to, for `state(...)`.
    ///
    /// # Errors
    /// Implementations may fail while deriving the state.
    fn state(&mut self, name: &str) -> Result<Option<InstanceState>> {
        let _ = name;
        Ok(None)
    }

    /// Whether `player` (or the current player when None) owns `name`.
    ///
    /// # Errors
    /// Implementations may fail while deriving ownership.
    fn owns(&mut self, name: &str, player: Option<&str>) -> Result<bool> {
        let _ = (name, player);
        Ok(false)
    }

    /// Current phase, for `phase()`.
    fn phase(&self) -> Option<u32> {
        None
    }

    /// Current round index, for `round()`.
    fn round(&self) -> Option<u32> {
        None
    }

    /// Called when `{name}` matched nothing. The reference then reads as 0.
    fn unknown_reference(&mut self, name: &str) {
        tracing::warn!(reference = name, "unknown reference resolves to 0");
    }
}

/// A resolver that knows nothing. Every reference reads as 0.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoContext;

impl Resolver for NoContext {
    fn resolve(&mut self, _name: &str) -> Result<Option<Value>> {
        Ok(None)
    }

    fn unknown_reference(&mut self, name: &str) {
        tracing::debug!(reference = name, "reference read without context");
    }
}

/// A resolver backed by fixed maps. Names are matched case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct StaticResolver {
    values: HashMap<String, Value>,
    states: HashMap<String, InstanceState>,
    owners: HashMap<String, String>,
    player: Option<String>,
    round: Option<u32>,
    phase: Option<u32>,
}

fn key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl StaticResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds a name to a value.
    #[must_use]
    pub fn with(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key(name), value.into());
        self
    }

    /// Binds a name to an instance state.
    #[must_use]
    pub fn with_state(mut self, name: &str, state: InstanceState) -> Self {
        self.states.insert(key(name), state);
        self
    }

    /// Records `player` as the owner of `name`.
    #[must_use]
    pub fn with_owner(mut self, name: &str, player: &str) -> Self {
        self.owners.insert(key(name), player.to_string());
        self
    }

    /// Sets the player `owns(ref)` checks when no player is given.
    #[must_use]
    pub fn for_player(mut self, player: &str) -> Self {
        self.player = Some(player.to_string());
        self
    }

    /// Sets the current round index.
    #[must_use]
    pub const fn at_round(mut self, round: u32) -> Self {
        self.round = Some(round);
        self
    }

    /// Sets the current phase.
    #[must_use]
    pub const fn at_phase(mut self, phase: u32) -> Self {
        self.phase = Some(phase);
        self
    }
}

impl Resolver for StaticResolver {
    fn resolve(&mut self, name: &str) -> Result<Option<Value>> {
        Ok(self.values.get(&key(name)).cloned())
    }

    fn state(&mut self, name: &str) -> Result<Option<InstanceState>> {
        Ok(self.states.get(&key(name)).copied())
    }

    fn owns(&mut self, name: &str, player: Option<&str>) -> Result<bool> {
        let player = player.or(self.player.as_deref());
        Ok(match (self.owners.get(&key(name)), player) {
            (Some(owner), Some(player)) => owner == player,
            _ => false,
        })
    }

    fn phase(&self) -> Option<u32> {
        self.phase
    }

    fn round(&self) -> Option<u32> {
        self.round
    }
}
