//! Collection values for set-typed definitions.

use crate::ids::ElementId;
use crate::model::SetShape;
use crate::validate::ValidationError;

/// Quantity of one declared element in a distinct-element set.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ElementQuantity {
    /// The declared element.
    pub element_id: ElementId,
    /// How many of it are held.
    pub quantity: u64,
}

/// The value of a set-typed instance.
///
/// Quantities are unsigned, so a set can never hold a negative count.
/// Decrements saturate at zero.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum SetValue {
    /// A set of identical items, tracked as a count.
    Count(u64),
    /// A set of distinct declared elements with quantities.
    Elements(Vec<ElementQuantity>),
}

impl SetValue {
    /// Creates an empty value of the given shape.
    #[must_use]
    pub const fn empty(shape: &SetShape) -> Self {
        match shape {
            SetShape::Identical => Self::Count(0),
            SetShape::Elements { .. } => Self::Elements(Vec::new()),
        }
    }

    /// Scalar used when a set flows into arithmetic: the count for identical
    /// sets, the total quantity across elements otherwise. Saturates at
    /// `u64::MAX`.
    #[must_use]
    pub fn total(&self) -> u64 {
        match self {
            Self::Count(n) => *n,
            Self::Elements(items) => items.iter().fold(0, |sum, e| sum.saturating_add(e.quantity)),
        }
    }

    /// Returns true if the set holds nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Returns the quantity held of one element (0 for identical sets).
    #[must_use]
    pub fn quantity_of(&self, element: &ElementId) -> u64 {
        match self {
            Self::Count(_) => 0,
            Self::Elements(items) => items
                .iter()
                .find(|e| &e.element_id == element)
                .map_or(0, |e| e.quantity),
        }
    }

    /// Adds to an identical-set count.
    ///
    /// # Errors
    /// Returns [`ValidationError::WrongSetShape`] for distinct-element sets.
    pub fn increment(&mut self, by: u64) -> Result<(), ValidationError> {
        match self {
            Self::Count(n) => {
                *n = n.saturating_add(by);
                Ok(())
            }
            Self::Elements(_) => Err(ValidationError::WrongSetShape),
        }
    }

    /// Removes from an identical-set count, stopping at zero.
    ///
    /// # Errors
    /// Returns [`ValidationError::WrongSetShape`] for distinct-element sets.
    pub fn decrement(&mut self, by: u64) -> Result<(), ValidationError> {
        match self {
            Self::Count(n) => {
                *n = n.saturating_sub(by);
                Ok(())
            }
            Self::Elements(_) => Err(ValidationError::WrongSetShape),
        }
    }

    /// Adds `quantity` of a declared element.
    ///
    /// # Errors
    /// As [`Self::adjust_element`].
    pub fn add_element(
        &mut self,
        shape: &SetShape,
        element: &ElementId,
        quantity: u64,
    ) -> Result<(), ValidationError> {
        let delta = i64::try_from(quantity).unwrap_or(i64::MAX);
        self.adjust_element(shape, element, delta)
    }

    /// Removes `quantity` of a declared element, stopping at zero.
    ///
    /// # Errors
    /// As [`Self::add_element`].
    pub fn remove_element(
        &mut self,
        shape: &SetShape,
        element: &ElementId,
        quantity: u64,
    ) -> Result<(), ValidationError> {
        let delta = i64::try_from(quantity).unwrap_or(i64::MAX);
        self.adjust_element(shape, element, -delta)
    }

    /// Changes the quantity of one element by `delta`.
    ///
    /// The element must be declared on `shape`. Quantities saturate at zero
    /// and elements that reach zero are dropped from the list.
    ///
    /// # Errors
    /// Returns an error for identical sets or undeclared elements.
    pub fn adjust_element(
        &mut self,
        shape: &SetShape,
        element: &ElementId,
        delta: i64,
    ) -> Result<(), ValidationError> {
        let SetShape::Elements { elements } = shape else {
            return Err(ValidationError::WrongSetShape);
        };
        if !elements.iter().any(|spec| &spec.id == element) {
            return Err(ValidationError::UnknownElement(element.clone()));
        }
        let Self::Elements(items) = self else {
            return Err(ValidationError::WrongSetShape);
        };

        let index = items.iter().position(|e| &e.element_id == element);
        let current = index.map_or(0, |i| items[i].quantity);
        let updated = if delta >= 0 {
            current.saturating_add(delta.unsigned_abs())
        } else {
            current.saturating_sub(delta.unsigned_abs())
        };

        match (index, updated) {
            (Some(i), 0) => {
                items.remove(i);
            }
            (Some(i), q) => items[i].quantity = q,
            (None, 0) => {}
            (None, q) => items.push(ElementQuantity {
                element_id: element.clone(),
                quantity: q,
            }),
        }
        Ok(())
    }
}
