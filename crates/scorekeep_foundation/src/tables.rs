//! Arena-of-tables storage for categories, definitions, instances, and rules.
//!
//! Each entity kind lives in its own persistent map keyed by its typed id.
//! Cloning a `Tables` is O(1) thanks to structural sharing, so a session
//! snapshot can be handed to the engine without copying.
//!
//! Name lookups are case-insensitive. When two records share a name, the one
//! inserted first wins.

use im::{OrdMap, Vector};

use crate::ids::{CategoryId, DefinitionId, InstanceId, PlayerId};
use crate::model::{Category, Definition, Instance, ScoringRule};

/// Indexed tables for one template or session.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "repr::TablesRepr", into = "repr::TablesRepr"))]
pub struct Tables {
    categories: OrdMap<CategoryId, Category>,
    category_names: OrdMap<String, CategoryId>,
    definitions: OrdMap<DefinitionId, Definition>,
    definition_names: OrdMap<String, DefinitionId>,
    instances: OrdMap<InstanceId, Instance>,
    instance_scopes: OrdMap<(DefinitionId, Option<PlayerId>), InstanceId>,
    rules: Vector<ScoringRule>,
}

fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

impl Tables {
    /// Creates empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // -------------------------------------------------------------------------
    // Categories
    // -------------------------------------------------------------------------

    /// Inserts or replaces a category.
    pub fn insert_category(&mut self, category: Category) {
        if let Some(old) = self.categories.get(&category.id) {
            let key = name_key(&old.name);
            if self.category_names.get(&key) == Some(&category.id) {
                self.category_names.remove(&key);
            }
        }
        let key = name_key(&category.name);
        if !self.category_names.contains_key(&key) {
            self.category_names.insert(key, category.id.clone());
        }
        self.categories.insert(category.id.clone(), category);
    }

    /// Builder form of [`Self::insert_category`].
    #[must_use]
    pub fn with_category(mut self, category: Category) -> Self {
        self.insert_category(category);
        self
    }

    /// Looks up a category by id.
    #[must_use]
    pub fn category(&self, id: &CategoryId) -> Option<&Category> {
        self.categories.get(id)
    }

    /// Looks up a category by name, ignoring case.
    #[must_use]
    pub fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.category_names
            .get(&name_key(name))
            .and_then(|id| self.categories.get(id))
    }

    /// All categories ordered by sort order, then id.
    #[must_use]
    pub fn categories(&self) -> Vec<&Category> {
        let mut all: Vec<&Category> = self.categories.values().collect();
        all.sort_by(|a, b| a.sort_order.cmp(&b.sort_order).then_with(|| a.id.cmp(&b.id)));
        all
    }

    /// Direct children of a category, ordered like [`Self::categories`].
    #[must_use]
    pub fn children_of(&self, id: &CategoryId) -> Vec<&Category> {
        self.categories()
            .into_iter()
            .filter(|c| c.parent_id.as_ref() == Some(id))
            .collect()
    }

    /// Returns true if the category's parent is absent from these tables.
    #[must_use]
    pub fn is_root(&self, category: &Category) -> bool {
        category
            .parent_id
            .as_ref()
            .is_none_or(|parent| !self.categories.contains_key(parent))
    }

    /// Number of categories.
    #[must_use]
    pub fn category_count(&self) -> usize {
        self.categories.len()
    }

    // -------------------------------------------------------------------------
    // Definitions
    // -------------------------------------------------------------------------

    /// Inserts or replaces a definition.
    pub fn insert_definition(&mut self, definition: Definition) {
        if let Some(old) = self.definitions.get(&definition.id) {
            let key = name_key(&old.name);
            if self.definition_names.get(&key) == Some(&definition.id) {
                self.definition_names.remove(&key);
            }
        }
        let key = name_key(&definition.name);
        if !self.definition_names.contains_key(&key) {
            self.definition_names.insert(key, definition.id.clone());
        }
        self.definitions.insert(definition.id.clone(), definition);
    }

    /// Builder form of [`Self::insert_definition`].
    #[must_use]
    pub fn with_definition(mut self, definition: Definition) -> Self {
        self.insert_definition(definition);
        self
    }

    /// Looks up a definition by id.
    #[must_use]
    pub fn definition(&self, id: &DefinitionId) -> Option<&Definition> {
        self.definitions.get(id)
    }

    /// Looks up a definition by name, ignoring case.
    #[must_use]
    pub fn definition_by_name(&self, name: &str) -> Option<&Definition> {
        self.definition_names
            .get(&name_key(name))
            .and_then(|id| self.definitions.get(id))
    }

    /// All definitions in id order.
    pub fn definitions(&self) -> impl Iterator<Item = &Definition> {
        self.definitions.values()
    }

    // -------------------------------------------------------------------------
    // Instances
    // -------------------------------------------------------------------------

    /// Inserts or replaces an instance.
    ///
    /// At most one instance exists per definition and scope; inserting a
    /// second one for the same scope replaces the index entry.
    pub fn insert_instance(&mut self, instance: Instance) {
        if let Some(old) = self.instances.get(&instance.id) {
            let scope = (old.definition_id.clone(), old.player_id.clone());
            if self.instance_scopes.get(&scope) == Some(&instance.id) {
                self.instance_scopes.remove(&scope);
            }
        }
        self.instance_scopes.insert(
            (instance.definition_id.clone(), instance.player_id.clone()),
            instance.id.clone(),
        );
        self.instances.insert(instance.id.clone(), instance);
    }

    /// Builder form of [`Self::insert_instance`].
    #[must_use]
    pub fn with_instance(mut self, instance: Instance) -> Self {
        self.insert_instance(instance);
        self
    }

    /// Looks up an instance by id.
    #[must_use]
    pub fn instance(&self, id: &InstanceId) -> Option<&Instance> {
        self.instances.get(id)
    }

    /// The instance of `definition` for a player scope (None = global).
    #[must_use]
    pub fn instance_for(
        &self,
        definition: &DefinitionId,
        player: Option<&PlayerId>,
    ) -> Option<&Instance> {
        self.instance_scopes
            .get(&(definition.clone(), player.cloned()))
            .and_then(|id| self.instances.get(id))
    }

    /// All instances of one definition.
    pub fn instances_of<'a>(
        &'a self,
        definition: &'a DefinitionId,
    ) -> impl Iterator<Item = &'a Instance> + 'a {
        self.instances
            .values()
            .filter(move |i| &i.definition_id == definition)
    }

    /// All instances in id order.
    pub fn instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.values()
    }

    // -------------------------------------------------------------------------
    // Rules
    // -------------------------------------------------------------------------

    /// Appends a rule; rules evaluate in insertion order.
    pub fn push_rule(&mut self, rule: ScoringRule) {
        self.rules.push_back(rule);
    }

    /// Builder form of [`Self::push_rule`].
    #[must_use]
    pub fn with_rule(mut self, rule: ScoringRule) -> Self {
        self.push_rule(rule);
        self
    }

    /// Rules in evaluation order.
    pub fn rules(&self) -> impl Iterator<Item = &ScoringRule> {
        self.rules.iter()
    }
}

#[cfg(feature = "serde")]
mod repr {
    use serde::{Deserialize, Serialize};

    use super::Tables;
    use crate::model::{Category, Definition, Instance, ScoringRule};

    #[derive(Default, Serialize, Deserialize)]
    #[serde(default)]
    pub(super) struct TablesRepr {
        categories: Vec<Category>,
        definitions: Vec<Definition>,
        instances: Vec<Instance>,
        rules: Vec<ScoringRule>,
    }

    impl From<TablesRepr> for Tables {
        fn from(repr: TablesRepr) -> Self {
            let mut tables = Tables::new();
            for category in repr.categories {
                tables.insert_category(category);
            }
            for definition in repr.definitions {
                tables.insert_definition(definition);
            }
            for instance in repr.instances {
                tables.insert_instance(instance);
            }
            for rule in repr.rules {
                tables.push_rule(rule);
            }
            tables
        }
    }

    impl From<Tables> for TablesRepr {
        fn from(tables: Tables) -> Self {
            Self {
                categories: tables.categories.values().cloned().collect(),
                definitions: tables.definitions.values().cloned().collect(),
                instances: tables.instances.values().cloned().collect(),
                rules: tables.rules.iter().cloned().collect(),
            }
        }
    }
}
