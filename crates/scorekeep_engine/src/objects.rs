//! Object/variable evaluation: ownership, active window, state, computed
//! values, and score impacts.
//!
//! Chains of `RefersTo` ownership or windows are followed with a path guard;
//! a definition reached twice on one path resolves as inactive.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use scorekeep_foundation::{
    ActiveWindow, Definition, DefinitionId, Error, ErrorKind, Instance, InstanceId, InstanceState,
    Ownership, PlayerId, Result, RoundBinding, ScoreEntry, Tables, Value, validate_value,
};
use scorekeep_formula::{Formula, Resolver};

use crate::mint::Minter;
use crate::resolver::{EvaluationContext, Target};
use crate::totals::PlayerTotals;

/// Who an instance belongs to after ownership resolution.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Owner {
    /// Nobody; the instance is out of play.
    Inactive,
    /// The session as a whole.
    Global,
    /// One player.
    Player(PlayerId),
}

// =============================================================================
// Ownership, window, state
// =============================================================================

/// Resolves the owner of `definition` in the context's scope.
#[must_use]
pub fn resolve_owner(ctx: &EvaluationContext<'_>, definition: &Definition) -> Owner {
    owner(ctx, definition, &mut Vec::new())
}

/// Whether `definition` is temporally visible in the context's scope.
#[must_use]
pub fn window_active(ctx: &EvaluationContext<'_>, definition: &Definition) -> bool {
    window(ctx, definition, &mut Vec::new())
}

/// State of `definition`'s instance in the context's scope.
///
/// A pinned state wins. Otherwise an instance without a value is inactive,
/// then ownership and window decide.
#[must_use]
pub fn derive_state(ctx: &EvaluationContext<'_>, definition: &Definition) -> InstanceState {
    state(ctx, definition, &mut Vec::new())
}

fn state(
    ctx: &EvaluationContext<'_>,
    definition: &Definition,
    path: &mut Vec<DefinitionId>,
) -> InstanceState {
    if path.contains(&definition.id) {
        tracing::warn!(definition = %definition.name, "ownership/window cycle resolves inactive");
        return InstanceState::Inactive;
    }
    let instance = ctx.instance_of(&definition.id);
    if let Some(pinned) = instance.and_then(|i| i.state) {
        return pinned;
    }
    if instance.is_none_or(|i| i.value.is_none()) {
        return InstanceState::Inactive;
    }

    path.push(definition.id.clone());
    let owner = owner(ctx, definition, path);
    let visible = owner != Owner::Inactive && window(ctx, definition, path);
    path.pop();

    if !visible {
        return InstanceState::Inactive;
    }
    match owner {
        Owner::Inactive => InstanceState::Inactive,
        Owner::Global => InstanceState::Active,
        Owner::Player(_) => InstanceState::Owned,
    }
}

fn owner(ctx: &EvaluationContext<'_>, definition: &Definition, path: &mut Vec<DefinitionId>) -> Owner {
    match &definition.ownership {
        Ownership::Inactive => Owner::Inactive,
        Ownership::Global => Owner::Global,
        Ownership::PerPlayer => ctx.player.map_or(Owner::Inactive, |p| Owner::Player(p.clone())),
        Ownership::RefersTo(other) => {
            let Some(other) = referenced(ctx.tables, definition, other) else {
                return Owner::Inactive;
            };
            if path.contains(&other.id) {
                tracing::warn!(definition = %definition.name, "ownership cycle resolves inactive");
                return Owner::Inactive;
            }
            if !state(ctx, other, path).is_live() {
                return Owner::Inactive;
            }
            path.push(definition.id.clone());
            let inherited = owner(ctx, other, path);
            path.pop();
            inherited
        }
    }
}

fn window(ctx: &EvaluationContext<'_>, definition: &Definition, path: &mut Vec<DefinitionId>) -> bool {
    let settings = ctx.settings;
    match &definition.active_window {
        ActiveWindow::Always => true,
        ActiveWindow::BoundToRound(binding) => {
            settings.rounds_enabled
                && settings.current().is_some_and(|round| match binding {
                    RoundBinding::Id(id) => &round.id == id,
                    RoundBinding::Index(index) => round.index == *index,
                    RoundBinding::Any => true,
                })
        }
        ActiveWindow::BoundToPhase => settings.phase_enabled,
        ActiveWindow::RefersTo(other) => referenced(ctx.tables, definition, other)
            .is_some_and(|other| state(ctx, other, path).is_live()),
    }
}

fn referenced<'a>(tables: &'a Tables, from: &Definition, id: &DefinitionId) -> Option<&'a Definition> {
    let found = tables.definition(id);
    if found.is_none() {
        tracing::warn!(definition = %from.name, refers_to = %id, "reference to missing definition");
    }
    found
}

// =============================================================================
// Scope resolver
// =============================================================================

/// Resolver for calculations and score impacts in one scope.
///
/// Categories read the scope player's totals (0 in the global scope).
/// Definitions with a calculation are recomputed on demand, memoized, and
/// cycle-guarded; failures fall back to the stored value.
struct ObjectScope<'a> {
    ctx: EvaluationContext<'a>,
    totals: Option<&'a PlayerTotals>,
    computed: HashMap<DefinitionId, Option<f64>>,
    visiting: Vec<DefinitionId>,
}

impl<'a> ObjectScope<'a> {
    fn new(ctx: EvaluationContext<'a>, totals: Option<&'a PlayerTotals>) -> Self {
        Self {
            ctx,
            totals,
            computed: HashMap::new(),
            visiting: Vec::new(),
        }
    }

    /// Whether the definition's instance is live and visible in this scope.
    fn in_play(&self, definition: &Definition) -> bool {
        derive_state(&self.ctx, definition).is_live() && window_active(&self.ctx, definition)
    }

    /// Fresh calculation of `definition`, None when it has no calculation,
    /// is out of play, or failed.
    fn calculate(&mut self, definition: &Definition) -> Result<Option<f64>> {
        let Some(text) = definition.calculation.as_deref() else {
            return Ok(None);
        };
        if let Some(value) = self.computed.get(&definition.id) {
            return Ok(*value);
        }
        if self.visiting.contains(&definition.id) {
            return Err(Error::reference_cycle(&definition.name));
        }
        if self.visiting.len() >= self.ctx.config.max_depth {
            return Err(Error::depth_exceeded(self.ctx.config.max_depth));
        }
        if !self.in_play(definition) {
            self.computed.insert(definition.id.clone(), None);
            return Ok(None);
        }

        self.visiting.push(definition.id.clone());
        let result = self.evaluate(text);
        self.visiting.pop();

        let value = match result {
            Ok(value) if value.is_finite() => Some(value),
            Ok(value) => {
                tracing::warn!(definition = %definition.name, value, "non-finite calculation ignored");
                None
            }
            Err(err) => {
                tracing::warn!(
                    definition = %definition.name,
                    player = self.ctx.player.map(PlayerId::as_str),
                    formula = text,
                    error = %err,
                    "calculation failed, keeping previous value"
                );
                None
            }
        };
        self.computed.insert(definition.id.clone(), value);
        Ok(value)
    }

    fn evaluate(&mut self, text: &str) -> Result<f64> {
        Formula::parse(text)?.evaluate(self)
    }

    fn grand_total(&self) -> f64 {
        self.totals.map_or(0.0, |t| t.grand_total)
    }
}

impl Resolver for ObjectScope<'_> {
    fn resolve(&mut self, name: &str) -> Result<Option<Value>> {
        Ok(match self.ctx.lookup(name) {
            Some(Target::Category(category)) => Some(Value::Number(
                self.totals.map_or(0.0, |t| t.category(&category.id)),
            )),
            Some(Target::Definition(definition)) => Some(match self.calculate(definition)? {
                Some(fresh) => Value::Number(fresh),
                None => self.ctx.stored_value(definition),
            }),
            Some(Target::Total) => Some(Value::Number(self.grand_total())),
            None => None,
        })
    }

    fn state(&mut self, name: &str) -> Result<Option<InstanceState>> {
        Ok(self.ctx.state_of(name))
    }

    fn owns(&mut self, name: &str, player: Option<&str>) -> Result<bool> {
        Ok(self.ctx.owns(name, player))
    }

    fn phase(&self) -> Option<u32> {
        self.ctx.phase()
    }

    fn round(&self) -> Option<u32> {
        self.ctx.round_index()
    }

    fn unknown_reference(&mut self, name: &str) {
        self.ctx.unknown_reference(name);
    }
}

/// Evaluates an ad-hoc formula in the context's scope.
///
/// References resolve exactly as they do for calculations: categories read
/// `totals` (0 when None), definitions are recomputed fresh.
///
/// # Errors
/// Returns the parse or evaluation error of the formula.
pub fn evaluate_formula(
    ctx: &EvaluationContext<'_>,
    totals: Option<&PlayerTotals>,
    formula: &str,
) -> Result<Value> {
    let mut scope = ObjectScope::new(*ctx, totals);
    Formula::parse(formula)?.evaluate_value(&mut scope)
}

// =============================================================================
// Evaluation
// =============================================================================

/// Output of the object stage.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ObjectOutcome {
    /// Instances whose derived state or computed value changed.
    pub instances: Vec<Instance>,
    /// Score-impact entries, one per firing instance.
    pub entries: Vec<ScoreEntry>,
}

/// Evaluates every instance: the global scope first, then each player.
///
/// `totals` holds each player's totals from the category stage. Instances
/// of players without totals see empty totals.
#[must_use]
pub fn evaluate_objects(
    ctx: &EvaluationContext<'_>,
    players: &[PlayerId],
    totals: &im::OrdMap<PlayerId, PlayerTotals>,
    now: DateTime<Utc>,
    minter: &mut Minter,
) -> ObjectOutcome {
    let mut scopes: Vec<Option<&PlayerId>> = vec![None];
    scopes.extend(players.iter().map(Some));
    for instance in ctx.tables.instances() {
        if let Some(p) = &instance.player_id {
            if !scopes.contains(&Some(p)) {
                scopes.push(Some(p));
            }
        }
    }

    let mut outcome = ObjectOutcome::default();
    for player in scopes {
        let scoped = ctx.for_player(player);
        let player_totals = player.and_then(|p| totals.get(p));
        evaluate_scope(&scoped, player_totals, now, minter, &mut outcome);
    }
    tracing::debug!(
        updated = outcome.instances.len(),
        impacts = outcome.entries.len(),
        "object stage done"
    );
    outcome
}

fn evaluate_scope(
    ctx: &EvaluationContext<'_>,
    totals: Option<&PlayerTotals>,
    now: DateTime<Utc>,
    minter: &mut Minter,
    outcome: &mut ObjectOutcome,
) {
    let mut scope = ObjectScope::new(*ctx, totals);
    let instances = ctx
        .tables
        .instances()
        .filter(|i| i.player_id.as_ref() == ctx.player);

    for instance in instances {
        let Some(definition) = ctx.tables.definition(&instance.definition_id) else {
            tracing::warn!(instance = %instance.id, "instance of missing definition skipped");
            continue;
        };

        let mut updated = instance.clone();
        let state = derive_state(ctx, definition);
        updated.derived_state = Some(state);
        let in_play = state.is_live() && window_active(ctx, definition);

        if in_play && definition.calculation.is_some() {
            // The path is empty here, so only the calculation itself can fail.
            if let Ok(Some(value)) = scope.calculate(definition) {
                updated.computed_value = Some(value);
                updated.last_computed_at = Some(now);
            }
        }

        if in_play {
            if let (Some(player), Some(text)) = (&instance.player_id, definition.score_impact.as_deref()) {
                if let Some(entry) = score_impact(&mut scope, definition, text, player, minter) {
                    outcome.entries.push(entry);
                }
            }
        }

        if &updated != instance {
            outcome.instances.push(updated);
        }
    }
}

fn score_impact(
    scope: &mut ObjectScope<'_>,
    definition: &Definition,
    text: &str,
    player: &PlayerId,
    minter: &mut Minter,
) -> Option<ScoreEntry> {
    let value = match scope.evaluate(text) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!(
                definition = %definition.name,
                player = %player,
                formula = text,
                error = %err,
                "score impact failed"
            );
            return None;
        }
    };
    if !value.is_finite() {
        tracing::warn!(definition = %definition.name, value, "non-finite score impact ignored");
        return None;
    }
    if value.abs() <= scope.ctx.config.impact_epsilon {
        return None;
    }
    Some(minter.mint(
        &format!("impact:{}", definition.id),
        format!("impact:{}", definition.name),
        player,
        value,
        definition.impact_category_id.as_ref(),
    ))
}

// =============================================================================
// Materialization and writes
// =============================================================================

/// Instances missing for `players`, valued with each definition's default.
///
/// Global and inactive definitions get one global instance; per-player and
/// refers-to definitions get one per player. Existing instances are kept.
#[must_use]
pub fn materialize_instances(tables: &Tables, players: &[PlayerId]) -> Vec<Instance> {
    let mut created = Vec::new();
    for definition in tables.definitions() {
        let scopes: Vec<Option<&PlayerId>> = match definition.ownership {
            Ownership::Global | Ownership::Inactive => vec![None],
            Ownership::PerPlayer | Ownership::RefersTo(_) => players.iter().map(Some).collect(),
        };
        for player in scopes {
            if tables.instance_for(&definition.id, player).is_some() {
                continue;
            }
            let mut instance = Instance::new(
                Instance::id_for(&definition.id, player),
                definition.id.clone(),
                player.cloned(),
            );
            instance.value.clone_from(&definition.default_value);
            created.push(instance);
        }
    }
    created
}

/// Writes a value to an instance after validating it against its definition.
///
/// # Errors
/// Returns a validation error when the value breaks the definition's rules,
/// or an internal error when the instance or its definition is missing.
pub fn set_instance_value(tables: &mut Tables, id: &InstanceId, value: Value) -> Result<()> {
    let Some(instance) = tables.instance(id) else {
        return Err(Error::new(ErrorKind::Internal(format!("no instance {id}"))));
    };
    let Some(definition) = tables.definition(&instance.definition_id) else {
        return Err(Error::new(ErrorKind::Internal(format!(
            "instance {id} has no definition"
        ))));
    };
    validate_value(definition, &value)?;
    let mut instance = instance.clone();
    instance.value = Some(value);
    tables.insert_instance(instance);
    Ok(())
}
