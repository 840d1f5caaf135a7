//! The category total pipeline: bucket, roll up, formulas, weights.
//!
//! Stage order is fixed. Formulas see rolled-up values before weights are
//! applied, and a parent's total is the sum of its children before any of
//! them is replaced by a formula result.

use std::collections::{HashMap, HashSet};

use im::{OrdMap, Vector};
use scorekeep_foundation::{
    Category, CategoryId, CategoryKey, DisplayType, Error, InstanceState, Result, RoundId,
    ScoreEntry, Tables, Value,
};
use scorekeep_formula::{Formula, Resolver};

use crate::config::GrandTotalPolicy;
use crate::resolver::{EvaluationContext, Target};

/// Category (or sentinel) to total. Only populated categories appear.
pub type CategoryTotals = OrdMap<CategoryKey, f64>;

/// One player's totals after the pipeline.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PlayerTotals {
    /// Per-category totals.
    pub categories: CategoryTotals,
    /// Sum of `categories` under the configured policy.
    pub grand_total: f64,
    /// Grand total over entries of the current round, when one exists.
    pub round_total: Option<f64>,
}

impl PlayerTotals {
    /// Total of one category, 0 when unpopulated.
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> f64 {
        self.categories
            .get(&CategoryKey::Category(id.clone()))
            .copied()
            .unwrap_or(0.0)
    }

    /// Total of one bucket, None when unpopulated.
    #[must_use]
    pub fn get(&self, key: &CategoryKey) -> Option<f64> {
        self.categories.get(key).copied()
    }
}

/// Runs the pipeline over `entries` for the context's player (every player
/// when the context is global), restricted to one round when given.
#[must_use]
pub fn compute_category_totals(
    entries: &Vector<ScoreEntry>,
    ctx: &EvaluationContext<'_>,
    round: Option<&RoundId>,
) -> CategoryTotals {
    let direct = bucket(entries, ctx, round);
    let rolled = roll_up(&direct, ctx.tables);
    let formulas = apply_formulas(rolled, ctx);
    apply_weights(formulas, ctx.tables)
}

/// Totals, grand total, and round total for the context's player.
#[must_use]
pub fn player_totals(entries: &Vector<ScoreEntry>, ctx: &EvaluationContext<'_>) -> PlayerTotals {
    let policy = ctx.config.grand_total;
    let categories = compute_category_totals(entries, ctx, None);
    let total = grand_total(&categories, ctx.tables, policy);
    let round_total = ctx.settings.current().map(|round| {
        let in_round = compute_category_totals(entries, ctx, Some(&round.id));
        grand_total(&in_round, ctx.tables, policy)
    });
    PlayerTotals {
        categories,
        grand_total: total,
        round_total,
    }
}

/// Sums a totals map under a policy.
#[must_use]
pub fn grand_total(totals: &CategoryTotals, tables: &Tables, policy: GrandTotalPolicy) -> f64 {
    match policy {
        GrandTotalPolicy::AllCategories => totals.values().sum(),
        GrandTotalPolicy::RootsOnly => totals
            .iter()
            .filter(|(key, _)| match key {
                CategoryKey::Uncategorized => true,
                CategoryKey::Category(id) => tables.category(id).is_none_or(|c| tables.is_root(c)),
            })
            .map(|(_, value)| value)
            .sum(),
    }
}

// =============================================================================
// Bucket
// =============================================================================

fn bucket(
    entries: &Vector<ScoreEntry>,
    ctx: &EvaluationContext<'_>,
    round: Option<&RoundId>,
) -> CategoryTotals {
    let mut totals = CategoryTotals::new();
    let selected = entries.iter().filter(|entry| {
        ctx.player.is_none_or(|p| &entry.player_id == p)
            && round.is_none_or(|r| entry.round_id.as_ref() == Some(r))
    });
    for entry in selected {
        *totals.entry(entry.bucket()).or_insert(0.0) += entry.value;
    }
    totals
}

// =============================================================================
// Roll-up
// =============================================================================

struct RollUp<'a> {
    direct: &'a CategoryTotals,
    children: HashMap<&'a CategoryId, Vec<&'a Category>>,
    done: HashMap<&'a CategoryId, Option<f64>>,
    visiting: HashSet<&'a CategoryId>,
}

impl<'a> RollUp<'a> {
    fn total(&mut self, category: &'a Category) -> Option<f64> {
        if let Some(value) = self.done.get(&category.id) {
            return *value;
        }
        if !self.visiting.insert(&category.id) {
            tracing::warn!(category = %category.id, "category parent cycle broken");
            return None;
        }

        let children = self.children.get(&category.id).cloned().unwrap_or_default();
        let value = if children.is_empty() {
            self.direct
                .get(&CategoryKey::Category(category.id.clone()))
                .copied()
        } else {
            children
                .into_iter()
                .filter_map(|child| self.total(child))
                .fold(None, |sum, v| Some(sum.unwrap_or(0.0) + v))
        };

        self.visiting.remove(&category.id);
        self.done.insert(&category.id, value);
        value
    }
}

/// Replaces every known category's direct total with its rolled-up total.
///
/// Entries booked directly to a category with children do not count; the
/// category's total is the sum of its populated children. Entries booked to
/// ids missing from the tables pass through unchanged.
fn roll_up(direct: &CategoryTotals, tables: &Tables) -> CategoryTotals {
    let categories = tables.categories();
    let mut children: HashMap<&CategoryId, Vec<&Category>> = HashMap::new();
    for category in categories.iter().copied() {
        if let Some(parent) = &category.parent_id {
            if tables.category(parent).is_some() {
                children.entry(parent).or_default().push(category);
            }
        }
    }

    let mut rolled: CategoryTotals = direct
        .iter()
        .filter(|(key, _)| key.category().is_none_or(|id| tables.category(id).is_none()))
        .map(|(key, value)| (key.clone(), *value))
        .collect();

    let mut walk = RollUp {
        direct,
        children,
        done: HashMap::new(),
        visiting: HashSet::new(),
    };
    for category in categories {
        let has_children = walk.children.contains_key(&category.id);
        let key = CategoryKey::Category(category.id.clone());
        if has_children && direct.contains_key(&key) {
            tracing::debug!(category = %category.id, "entries on a parent category ignored");
        }
        if let Some(value) = walk.total(category) {
            rolled.insert(key, value);
        }
    }
    rolled
}

// =============================================================================
// Formulas
// =============================================================================

/// Resolver for category formulas. Formula categories referenced from other
/// formulas are evaluated on demand.
struct FormulaStage<'a> {
    ctx: EvaluationContext<'a>,
    totals: CategoryTotals,
    done: HashMap<CategoryId, Option<f64>>,
    visiting: Vec<CategoryId>,
}

impl FormulaStage<'_> {
    fn category_value(&mut self, category: &Category) -> Result<f64> {
        let key = CategoryKey::Category(category.id.clone());
        if category.display_type != DisplayType::Formula {
            return Ok(self.totals.get(&key).copied().unwrap_or(0.0));
        }
        if let Some(value) = self.done.get(&category.id) {
            return Ok(value.unwrap_or(0.0));
        }
        if self.visiting.contains(&category.id) {
            return Err(Error::reference_cycle(&category.name));
        }
        if self.visiting.len() >= self.ctx.config.max_depth {
            return Err(Error::depth_exceeded(self.ctx.config.max_depth));
        }

        self.visiting.push(category.id.clone());
        let result = self.run(category);
        self.visiting.pop();

        let value = match result {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!(
                    category = %category.name,
                    formula = category.formula.as_deref().unwrap_or_default(),
                    error = %err,
                    "category formula failed, keeping rolled-up total"
                );
                self.totals.get(&key).copied()
            }
        };
        if let Some(value) = value {
            self.totals.insert(key, value);
        }
        self.done.insert(category.id.clone(), value);
        Ok(value.unwrap_or(0.0))
    }

    fn run(&mut self, category: &Category) -> Result<f64> {
        let Some(text) = category.formula.as_deref() else {
            return Err(Error::syntax("empty formula", 1, 1, String::new()));
        };
        let formula = Formula::parse(text)?;
        formula.evaluate(self)
    }
}

impl Resolver for FormulaStage<'_> {
    fn resolve(&mut self, name: &str) -> Result<Option<Value>> {
        Ok(match self.ctx.lookup(name) {
            Some(Target::Category(category)) => Some(Value::Number(self.category_value(category)?)),
            Some(Target::Definition(definition)) => Some(self.ctx.stored_value(definition)),
            Some(Target::Total) => Some(Value::Number(grand_total(
                &self.totals,
                self.ctx.tables,
                self.ctx.config.grand_total,
            ))),
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

fn apply_formulas(totals: CategoryTotals, ctx: &EvaluationContext<'_>) -> CategoryTotals {
    let mut stage = FormulaStage {
        ctx: *ctx,
        totals,
        done: HashMap::new(),
        visiting: Vec::new(),
    };
    for category in ctx.tables.categories() {
        if category.display_type == DisplayType::Formula {
            // Failures are logged and resolved inside category_value.
            let _ = stage.category_value(category);
        }
    }
    stage.totals
}

// =============================================================================
// Weights
// =============================================================================

fn apply_weights(mut totals: CategoryTotals, tables: &Tables) -> CategoryTotals {
    for category in tables.categories() {
        if category.display_type != DisplayType::Weighted {
            continue;
        }
        let key = CategoryKey::Category(category.id.clone());
        if let Some(value) = totals.get_mut(&key) {
            *value *= category.effective_weight();
        }
    }
    totals
}
