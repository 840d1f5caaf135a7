//! Reference resolution shared by every evaluation stage.
//!
//! A `{name}` reference is looked up in this order:
//! 1. a category whose name matches, ignoring case
//! 2. a definition whose name matches, ignoring case
//! 3. a category or definition whose id is the literal text
//! 4. the reserved name `total`
//!
//! Anything else is unknown and reads as 0.

use scorekeep_foundation::{
    Category, CategoryId, Definition, DefinitionId, Instance, InstanceState, PlayerId,
    SessionSettings, Tables, Value,
};

use crate::config::EngineConfig;
use crate::objects;

/// What a reference name points at.
#[derive(Clone, Copy, Debug)]
pub enum Target<'a> {
    /// A category total.
    Category(&'a Category),
    /// A definition's value in the current scope.
    Definition(&'a Definition),
    /// The grand total so far.
    Total,
}

/// Everything a formula can see apart from totals: the tables, the session
/// settings, the configuration, and the scope's player.
#[derive(Clone, Copy, Debug)]
pub struct EvaluationContext<'a> {
    /// Categories, definitions, instances, rules.
    pub tables: &'a Tables,
    /// Players, rounds, phase.
    pub settings: &'a SessionSettings,
    /// Engine configuration.
    pub config: &'a EngineConfig,
    /// The scope's player; None for the global scope.
    pub player: Option<&'a PlayerId>,
}

impl<'a> EvaluationContext<'a> {
    /// Creates a global-scope context.
    #[must_use]
    pub const fn new(
        tables: &'a Tables,
        settings: &'a SessionSettings,
        config: &'a EngineConfig,
    ) -> Self {
        Self {
            tables,
            settings,
            config,
            player: None,
        }
    }

    /// The same context scoped to a player (None for global).
    #[must_use]
    pub const fn for_player(self, player: Option<&'a PlayerId>) -> Self {
        Self { player, ..self }
    }

    /// Resolves a reference name.
    #[must_use]
    pub fn lookup(&self, name: &str) -> Option<Target<'a>> {
        let name = name.trim();
        if let Some(category) = self.tables.category_by_name(name) {
            return Some(Target::Category(category));
        }
        if let Some(definition) = self.tables.definition_by_name(name) {
            return Some(Target::Definition(definition));
        }
        if let Some(category) = self.tables.category(&CategoryId::new(name)) {
            return Some(Target::Category(category));
        }
        if let Some(definition) = self.tables.definition(&DefinitionId::new(name)) {
            return Some(Target::Definition(definition));
        }
        name.eq_ignore_ascii_case("total").then_some(Target::Total)
    }

    /// Resolves a reference that must name a definition.
    #[must_use]
    pub fn definition(&self, name: &str) -> Option<&'a Definition> {
        match self.lookup(name) {
            Some(Target::Definition(definition)) => Some(definition),
            _ => None,
        }
    }

    /// The instance of a definition in this scope, falling back to the
    /// global instance.
    #[must_use]
    pub fn instance_of(&self, definition: &DefinitionId) -> Option<&'a Instance> {
        self.player
            .and_then(|p| self.tables.instance_for(definition, Some(p)))
            .or_else(|| self.tables.instance_for(definition, None))
    }

    /// A definition's stored value in this scope: the last computed value,
    /// else the written value, else the default, else 0.
    #[must_use]
    pub fn stored_value(&self, definition: &Definition) -> Value {
        let instance = self.instance_of(&definition.id);
        if let Some(computed) = instance.and_then(|i| i.computed_value) {
            return Value::Number(computed);
        }
        instance
            .and_then(|i| i.value.clone())
            .or_else(|| definition.default_value.clone())
            .unwrap_or(Value::Number(0.0))
    }

    /// Derived state of the definition `name` refers to.
    #[must_use]
    pub fn state_of(&self, name: &str) -> Option<InstanceState> {
        self.definition(name)
            .map(|definition| objects::derive_state(self, definition))
    }

    /// Whether `player` (default: this scope's player) owns `name`.
    #[must_use]
    pub fn owns(&self, name: &str, player: Option<&str>) -> bool {
        let Some(definition) = self.definition(name) else {
            return false;
        };
        let player = match player {
            Some(id) => PlayerId::new(id.trim()),
            None => match self.player {
                Some(p) => p.clone(),
                None => return false,
            },
        };
        let scoped = EvaluationContext {
            tables: self.tables,
            settings: self.settings,
            config: self.config,
            player: Some(&player),
        };
        objects::derive_state(&scoped, definition) == InstanceState::Owned
    }

    /// Index of the round in progress.
    #[must_use]
    pub fn round_index(&self) -> Option<u32> {
        self.settings.current_round_index()
    }

    /// The phase in progress, when the phase mechanic is enabled.
    #[must_use]
    pub const fn phase(&self) -> Option<u32> {
        if self.settings.phase_enabled {
            self.settings.current_phase
        } else {
            None
        }
    }

    /// Logs a reference that matched nothing.
    pub fn unknown_reference(&self, name: &str) {
        let player = self.player.map(PlayerId::as_str);
        if self.config.warn_unknown_references {
            tracing::warn!(reference = name, player, "unknown reference resolves to 0");
        } else {
            tracing::debug!(reference = name, player, "unknown reference resolves to 0");
        }
    }
}
