//! Variable/object definitions and their instances.

use chrono::{DateTime, Utc};

use crate::ids::{CategoryId, DefinitionId, ElementId, InstanceId, PlayerId, RoundId};
use crate::value::Value;

/// An element declared on a distinct-element set definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementSpec {
    /// Element id referenced by set values.
    pub id: ElementId,
    /// Display name.
    pub name: String,
}

impl ElementSpec {
    /// Creates an element spec.
    #[must_use]
    pub fn new(id: impl Into<ElementId>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// Shape of a set-typed definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "setType", rename_all = "camelCase"))]
pub enum SetShape {
    /// Identical items, counted.
    Identical,
    /// Distinct declared elements with quantities.
    Elements {
        /// The declared elements.
        elements: Vec<ElementSpec>,
    },
}

/// The value type a definition holds.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "camelCase"))]
pub enum ValueKind {
    /// Numeric variable.
    Number,
    /// Boolean flag.
    Boolean,
    /// Free text.
    Text,
    /// Collection.
    Set {
        /// Identical or distinct elements.
        shape: SetShape,
    },
}

/// Who may own instances of a definition.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "repr::OwnershipRepr", into = "repr::OwnershipRepr")
)]
pub enum Ownership {
    /// Never owned; instances are always inactive.
    Inactive,
    /// One shared instance for the whole session.
    #[default]
    Global,
    /// One instance per player, owned by that player.
    PerPlayer,
    /// Follows the owner of another definition for the same player.
    RefersTo(DefinitionId),
}

/// Which round an instance bound to rounds is visible in.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RoundBinding {
    /// A specific round by id.
    Id(RoundId),
    /// A specific round by 0-based index.
    Index(u32),
    /// Any round, as long as rounds are enabled.
    Any,
}

/// When an instance is temporally visible.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "repr::ActiveWindowRepr", into = "repr::ActiveWindowRepr")
)]
pub enum ActiveWindow {
    /// Always visible.
    #[default]
    Always,
    /// Visible during a round.
    BoundToRound(RoundBinding),
    /// Visible when the template has a phase mechanic.
    BoundToPhase,
    /// Visible while another definition is active or owned.
    RefersTo(DefinitionId),
}

/// The authored schema for a variable or object slot.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Definition {
    /// Unique id.
    pub id: DefinitionId,
    /// Name formulas reference.
    pub name: String,
    /// Value type.
    pub kind: ValueKind,
    /// Value given to newly materialized instances.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub default_value: Option<Value>,
    /// Lower bound for numeric values.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub min: Option<f64>,
    /// Upper bound for numeric values.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub max: Option<f64>,
    /// Ownership rule.
    #[cfg_attr(feature = "serde", serde(default))]
    pub ownership: Ownership,
    /// Temporal visibility rule.
    #[cfg_attr(feature = "serde", serde(default))]
    pub active_window: ActiveWindow,
    /// Formula producing the instance's computed value.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub calculation: Option<String>,
    /// Formula producing a score entry for the owning player.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub score_impact: Option<String>,
    /// Category the score-impact entry is booked to.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub impact_category_id: Option<CategoryId>,
}

impl Definition {
    /// Creates a global numeric definition.
    #[must_use]
    pub fn new(id: impl Into<DefinitionId>, name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind,
            default_value: None,
            min: None,
            max: None,
            ownership: Ownership::Global,
            active_window: ActiveWindow::Always,
            calculation: None,
            score_impact: None,
            impact_category_id: None,
        }
    }

    /// Sets the ownership rule.
    #[must_use]
    pub fn with_ownership(mut self, ownership: Ownership) -> Self {
        self.ownership = ownership;
        self
    }

    /// Sets the active window.
    #[must_use]
    pub fn with_window(mut self, window: ActiveWindow) -> Self {
        self.active_window = window;
        self
    }

    /// Sets the default value.
    #[must_use]
    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Sets numeric bounds.
    #[must_use]
    pub const fn with_bounds(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.min = min;
        self.max = max;
        self
    }

    /// Sets the calculation formula.
    #[must_use]
    pub fn with_calculation(mut self, formula: impl Into<String>) -> Self {
        self.calculation = Some(formula.into());
        self
    }

    /// Sets the score-impact formula.
    #[must_use]
    pub fn with_score_impact(mut self, formula: impl Into<String>) -> Self {
        self.score_impact = Some(formula.into());
        self
    }

    /// Books score-impact entries to a category.
    #[must_use]
    pub fn with_impact_category(mut self, category: impl Into<CategoryId>) -> Self {
        self.impact_category_id = Some(category.into());
        self
    }

    /// Returns the set shape for set-typed definitions.
    #[must_use]
    pub const fn set_shape(&self) -> Option<&SetShape> {
        match &self.kind {
            ValueKind::Set { shape } => Some(shape),
            _ => None,
        }
    }
}

/// Evaluated (or explicitly stored) state of an instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum InstanceState {
    /// Visible and not owned by a specific player.
    Active,
    /// Visible and owned by a player.
    Owned,
    /// Not in play.
    Inactive,
}

impl InstanceState {
    /// The tag formulas see from `state(...)`.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Owned => "owned",
            Self::Inactive => "inactive",
        }
    }

    /// Returns true for active or owned.
    #[must_use]
    pub const fn is_live(self) -> bool {
        matches!(self, Self::Active | Self::Owned)
    }
}

/// A concrete value of a definition, global or scoped to one player.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Instance {
    /// Unique id.
    pub id: InstanceId,
    /// The definition this instance materializes.
    pub definition_id: DefinitionId,
    /// Owning player scope, None for the global instance.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub player_id: Option<PlayerId>,
    /// Value set by explicit writes only.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub value: Option<Value>,
    /// Result of the last calculation.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub computed_value: Option<f64>,
    /// Explicitly stored state; overrides derivation when present.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub state: Option<InstanceState>,
    /// State derived by the last evaluation pass.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub derived_state: Option<InstanceState>,
    /// When `computed_value` was produced.
    #[cfg_attr(feature = "serde", serde(default, skip_serializing_if = "Option::is_none"))]
    pub last_computed_at: Option<DateTime<Utc>>,
}

impl Instance {
    /// Creates an instance with no value.
    #[must_use]
    pub fn new(
        id: impl Into<InstanceId>,
        definition_id: impl Into<DefinitionId>,
        player_id: Option<PlayerId>,
    ) -> Self {
        Self {
            id: id.into(),
            definition_id: definition_id.into(),
            player_id,
            value: None,
            computed_value: None,
            state: None,
            derived_state: None,
            last_computed_at: None,
        }
    }

    /// Sets the stored value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    /// Pins an explicit state.
    #[must_use]
    pub const fn with_state(mut self, state: InstanceState) -> Self {
        self.state = Some(state);
        self
    }

    /// The pinned state if any, else the last derived one.
    #[must_use]
    pub fn effective_state(&self) -> Option<InstanceState> {
        self.state.or(self.derived_state)
    }

    /// Deterministic id for the instance of `definition` in a scope.
    #[must_use]
    pub fn id_for(definition: &DefinitionId, player: Option<&PlayerId>) -> InstanceId {
        match player {
            Some(p) => InstanceId::new(format!("{definition}@{p}")),
            None => InstanceId::new(format!("{definition}@global")),
        }
    }
}

#[cfg(feature = "serde")]
mod repr {
    //! String-or-object wire forms for ownership and active window.

    use serde::{Deserialize, Serialize};

    use super::{ActiveWindow, Ownership, RoundBinding};
    use crate::ids::{DefinitionId, RoundId};

    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    pub(super) enum OwnershipRepr {
        Tag(String),
        RefersTo {
            #[serde(rename = "refersTo")]
            refers_to: DefinitionId,
        },
    }

    impl TryFrom<OwnershipRepr> for Ownership {
        type Error = String;

        fn try_from(repr: OwnershipRepr) -> Result<Self, Self::Error> {
            match repr {
                OwnershipRepr::RefersTo { refers_to } => Ok(Self::RefersTo(refers_to)),
                OwnershipRepr::Tag(tag) => match tag.to_ascii_lowercase().as_str() {
                    "inactive" | "none" => Ok(Self::Inactive),
                    "global" => Ok(Self::Global),
                    "per-player" | "perplayer" | "per_player" | "player" => Ok(Self::PerPlayer),
                    other => Err(format!("unknown ownership: {other}")),
                },
            }
        }
    }

    impl From<Ownership> for OwnershipRepr {
        fn from(ownership: Ownership) -> Self {
            match ownership {
                Ownership::Inactive => Self::Tag("inactive".into()),
                Ownership::Global => Self::Tag("global".into()),
                Ownership::PerPlayer => Self::Tag("per-player".into()),
                Ownership::RefersTo(id) => Self::RefersTo { refers_to: id },
            }
        }
    }

    #[derive(Serialize, Deserialize)]
    pub(super) struct RoundSpec {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<RoundId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        index: Option<u32>,
    }

    // RefersTo must precede Round: the Round variant's only field is optional.
    #[derive(Serialize, Deserialize)]
    #[serde(untagged)]
    pub(super) enum ActiveWindowRepr {
        Tag(String),
        RefersTo {
            #[serde(rename = "refersTo")]
            refers_to: DefinitionId,
        },
        Round {
            round: Option<RoundSpec>,
        },
    }

    impl TryFrom<ActiveWindowRepr> for ActiveWindow {
        type Error = String;

        fn try_from(repr: ActiveWindowRepr) -> Result<Self, Self::Error> {
            match repr {
                ActiveWindowRepr::RefersTo { refers_to } => Ok(Self::RefersTo(refers_to)),
                ActiveWindowRepr::Round { round } => {
                    let binding = match round {
                        Some(RoundSpec { id: Some(id), .. }) => RoundBinding::Id(id),
                        Some(RoundSpec {
                            index: Some(index), ..
                        }) => RoundBinding::Index(index),
                        _ => RoundBinding::Any,
                    };
                    Ok(Self::BoundToRound(binding))
                }
                ActiveWindowRepr::Tag(tag) => match tag.to_ascii_lowercase().as_str() {
                    "always" => Ok(Self::Always),
                    "round" => Ok(Self::BoundToRound(RoundBinding::Any)),
                    "phase" => Ok(Self::BoundToPhase),
                    other => Err(format!("unknown active window: {other}")),
                },
            }
        }
    }

    impl From<ActiveWindow> for ActiveWindowRepr {
        fn from(window: ActiveWindow) -> Self {
            match window {
                ActiveWindow::Always => Self::Tag("always".into()),
                ActiveWindow::BoundToPhase => Self::Tag("phase".into()),
                ActiveWindow::BoundToRound(RoundBinding::Any) => Self::Tag("round".into()),
                ActiveWindow::BoundToRound(RoundBinding::Id(id)) => Self::Round {
                    round: Some(RoundSpec {
                        id: Some(id),
                        index: None,
                    }),
                },
                ActiveWindow::BoundToRound(RoundBinding::Index(index)) => Self::Round {
                    round: Some(RoundSpec {
                        id: None,
                        index: Some(index),
                    }),
                },
                ActiveWindow::RefersTo(id) => Self::RefersTo { refers_to: id },
            }
        }
    }
}
