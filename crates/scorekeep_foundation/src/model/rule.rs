//! Conditional scoring rules.

use crate::ids::{CategoryId, RuleId};

/// What a rule condition compares.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum RuleScope {
    /// The player's grand total.
    Total,
    /// One category's total.
    Category,
    /// The player's total over entries of the current round.
    Round,
}

/// Comparison operator of a condition.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Comparison {
    /// `>`
    #[cfg_attr(feature = "serde", serde(rename = ">"))]
    Gt,
    /// `>=`
    #[cfg_attr(feature = "serde", serde(rename = ">="))]
    Gte,
    /// `<`
    #[cfg_attr(feature = "serde", serde(rename = "<"))]
    Lt,
    /// `<=`
    #[cfg_attr(feature = "serde", serde(rename = "<="))]
    Lte,
    /// `==`, within epsilon
    #[cfg_attr(feature = "serde", serde(rename = "=="))]
    Eq,
    /// `!=`, outside epsilon
    #[cfg_attr(feature = "serde", serde(rename = "!="))]
    Ne,
}

impl Comparison {
    /// Applies the comparison. Equality uses `epsilon` as tolerance.
    #[must_use]
    pub fn holds(self, left: f64, right: f64, epsilon: f64) -> bool {
        match self {
            Self::Gt => left > right,
            Self::Gte => left >= right,
            Self::Lt => left < right,
            Self::Lte => left <= right,
            Self::Eq => (left - right).abs() <= epsilon,
            Self::Ne => (left - right).abs() > epsilon,
        }
    }

    /// Operator text.
    #[must_use]
    pub const fn symbol(self) -> &'static str {
        match self {
            Self::Gt => ">",
            Self::Gte => ">=",
            Self::Lt => "<",
            Self::Lte => "<=",
            Self::Eq => "==",
            Self::Ne => "!=",
        }
    }
}

/// When a rule fires.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RuleCondition {
    /// What is compared.
    pub scope: RuleScope,
    /// How it is compared.
    pub operator: Comparison,
    /// Right-hand side.
    pub threshold: f64,
    /// Category compared when `scope` is [`RuleScope::Category`].
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub category_id: Option<CategoryId>,
}

/// Effect kind of a rule action.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum RuleActionKind {
    /// Add a literal amount.
    Add,
    /// Multiply the current value.
    Multiply,
    /// Replace the current value.
    Set,
}

/// What a rule does when it fires.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct RuleAction {
    /// Effect kind.
    pub kind: RuleActionKind,
    /// Operand of the effect.
    pub amount: f64,
    /// Category the correction is booked to; None for the uncategorized bucket.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub target_category_id: Option<CategoryId>,
}

impl RuleAction {
    /// The additive correction that achieves this action against `current`.
    #[must_use]
    pub fn delta(&self, current: f64) -> f64 {
        match self.kind {
            RuleActionKind::Add => self.amount,
            RuleActionKind::Multiply => current * (self.amount - 1.0),
            RuleActionKind::Set => self.amount - current,
        }
    }
}

/// A condition/action pair emitting corrective entries.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ScoringRule {
    /// Unique id.
    pub id: RuleId,
    /// Display name.
    #[cfg_attr(feature = "serde", serde(default))]
    pub name: String,
    /// When the rule fires.
    pub condition: RuleCondition,
    /// What it does.
    pub action: RuleAction,
    /// Disabled rules are skipped.
    #[cfg_attr(feature = "serde", serde(default = "enabled_default"))]
    pub enabled: bool,
}

#[cfg(feature = "serde")]
const fn enabled_default() -> bool {
    true
}

impl ScoringRule {
    /// Creates an enabled rule.
    #[must_use]
    pub fn new(
        id: impl Into<RuleId>,
        name: impl Into<String>,
        condition: RuleCondition,
        action: RuleAction,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            condition,
            action,
            enabled: true,
        }
    }

    /// Enables or disables the rule.
    #[must_use]
    pub const fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}
