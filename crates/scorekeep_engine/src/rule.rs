//! Conditional scoring rules.
//!
//! A rule compares one of the player's totals against a threshold and, when
//! the comparison holds, mints the additive correction that achieves its
//! action. Rules keep no memory of having fired: a satisfied `set` rule
//! converges because its next delta is within epsilon.
//!
//! Deltas aimed at a weighted category are booked pre-weight, so the
//! weighted total moves by the full delta. Categories with children and
//! formula categories never count direct entries; rules aimed at them are
//! skipped with a warning.

use scorekeep_foundation::{DisplayType, RuleScope, ScoreEntry, ScoringRule};

use crate::mint::Minter;
use crate::resolver::EvaluationContext;
use crate::totals::PlayerTotals;

/// Evaluates rules in order for the context's player.
///
/// Returns no entries in the global scope.
pub fn evaluate_rules<'r>(
    rules: impl IntoIterator<Item = &'r ScoringRule>,
    totals: &PlayerTotals,
    ctx: &EvaluationContext<'_>,
    minter: &mut Minter,
) -> Vec<ScoreEntry> {
    let Some(player) = ctx.player else {
        tracing::debug!("rules skipped in the global scope");
        return Vec::new();
    };
    let epsilon = ctx.config.impact_epsilon;
    let mut entries = Vec::new();

    for rule in rules {
        if !rule.enabled {
            continue;
        }
        let Some(observed) = observed(rule, totals) else {
            continue;
        };
        if !rule.condition.operator.holds(observed, rule.condition.threshold, epsilon) {
            continue;
        }

        let target = rule.action.target_category_id.as_ref();
        let current = target.map_or(totals.grand_total, |id| totals.category(id));
        let delta = rule.action.delta(current);
        if !delta.is_finite() {
            tracing::warn!(rule = %rule.name, delta, "non-finite rule delta ignored");
            continue;
        }
        if delta.abs() <= epsilon {
            continue;
        }
        let Some(booked) = booked_value(rule, delta, ctx) else {
            continue;
        };
        if booked.abs() <= epsilon {
            continue;
        }

        tracing::debug!(
            rule = %rule.name,
            player = %player,
            observed,
            op = rule.condition.operator.symbol(),
            threshold = rule.condition.threshold,
            delta,
            booked,
            "rule fired"
        );
        entries.push(minter.mint(
            &format!("rule:{}", rule.id),
            format!("rule:{}", rule.name),
            player,
            booked,
            target,
        ));
    }
    entries
}

/// The raw entry value that moves the target's total by `delta`.
///
/// None when no entry on the target can ever count.
fn booked_value(rule: &ScoringRule, delta: f64, ctx: &EvaluationContext<'_>) -> Option<f64> {
    let Some(id) = rule.action.target_category_id.as_ref() else {
        return Some(delta);
    };
    let Some(category) = ctx.tables.category(id) else {
        return Some(delta);
    };
    if !ctx.tables.children_of(id).is_empty() {
        tracing::warn!(rule = %rule.name, category = %category.name, "rule targets a parent category, skipped");
        return None;
    }
    match category.display_type {
        DisplayType::Formula => {
            tracing::warn!(rule = %rule.name, category = %category.name, "rule targets a formula category, skipped");
            None
        }
        DisplayType::Weighted => {
            let weight = category.effective_weight();
            let booked = delta / weight;
            if booked.is_finite() {
                Some(booked)
            } else {
                tracing::warn!(rule = %rule.name, category = %category.name, weight, "rule targets a zero-weight category, skipped");
                None
            }
        }
        DisplayType::Sum => Some(delta),
    }
}

/// The value a rule's condition compares, None when it has nothing to compare.
fn observed(rule: &ScoringRule, totals: &PlayerTotals) -> Option<f64> {
    match rule.condition.scope {
        RuleScope::Total => Some(totals.grand_total),
        RuleScope::Category => Some(
            rule.condition
                .category_id
                .as_ref()
                .map_or(0.0, |id| totals.category(id)),
        ),
        RuleScope::Round => totals.round_total,
    }
}
