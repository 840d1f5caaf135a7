//! Scoring categories.

use crate::ids::CategoryId;

/// How a category's final total is produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum DisplayType {
    /// Sum of entries (or of children).
    #[default]
    Sum,
    /// Sum multiplied by the category weight.
    Weighted,
    /// Result of the category formula.
    Formula,
}

/// A named scoring bucket in a category forest.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Category {
    /// Unique id.
    pub id: CategoryId,
    /// Parent category, if nested.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub parent_id: Option<CategoryId>,
    /// Display name, also the name formulas reference.
    pub name: String,
    /// Position among siblings.
    #[cfg_attr(feature = "serde", serde(default))]
    pub sort_order: i32,
    /// How the total is produced.
    #[cfg_attr(feature = "serde", serde(default))]
    pub display_type: DisplayType,
    /// Multiplier for weighted categories.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub weight: Option<f64>,
    /// Formula text for formula categories, stored verbatim.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub formula: Option<String>,
}

impl Category {
    /// Creates a plain sum category.
    #[must_use]
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            parent_id: None,
            name: name.into(),
            sort_order: 0,
            display_type: DisplayType::Sum,
            weight: None,
            formula: None,
        }
    }

    /// Nests this category under a parent.
    #[must_use]
    pub fn with_parent(mut self, parent: impl Into<CategoryId>) -> Self {
        self.parent_id = Some(parent.into());
        self
    }

    /// Sets the sort order.
    #[must_use]
    pub const fn with_sort_order(mut self, order: i32) -> Self {
        self.sort_order = order;
        self
    }

    /// Makes this a weighted category.
    #[must_use]
    pub const fn weighted(mut self, weight: f64) -> Self {
        self.display_type = DisplayType::Weighted;
        self.weight = Some(weight);
        self
    }

    /// Makes this a formula category.
    #[must_use]
    pub fn with_formula(mut self, formula: impl Into<String>) -> Self {
        self.display_type = DisplayType::Formula;
        self.formula = Some(formula.into());
        self
    }

    /// Weight to apply, falling back to 1.0 when unset or not finite.
    #[must_use]
    pub fn effective_weight(&self) -> f64 {
        match self.weight {
            Some(w) if w.is_finite() => w,
            _ => 1.0,
        }
    }
}
