//! Resource-kind resolution.
//!
//! Every payload the to-do API returns is tagged with a `kind` string. The
//! `KindRegistry` maps those names onto the resource class the SDK hydrates
//! them into. The mapping is total: names that are not registered resolve to
//! the generic `ResourceClass::Entity`, so new server-side kinds degrade to
//! an untyped entity instead of failing.

use std::collections::HashMap;
use std::fmt;

/// The resource types a payload can be hydrated into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceClass {
    TodoList,
    Item,
    Collection,
    /// Generic fallback for any kind without a dedicated type.
    Entity,
}

impl ResourceClass {
    pub fn is_collection(self) -> bool {
        matches!(self, ResourceClass::Collection)
    }
}

impl fmt::Display for ResourceClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceClass::TodoList => "TodoList",
            ResourceClass::Item => "Item",
            ResourceClass::Collection => "Collection",
            ResourceClass::Entity => "Entity",
        };
        f.write_str(name)
    }
}

/// Kinds the to-do API declares, in declaration order.
pub const DEFAULT_KINDS: &[(&str, ResourceClass)] = &[
    ("TodoList", ResourceClass::TodoList),
    ("Item", ResourceClass::Item),
    ("Collection", ResourceClass::Collection),
];

/// Name-to-class lookup table.
///
/// Built once and moved into a `TodoApi`; it is read-only from then on.
#[derive(Debug, Clone)]
pub struct KindRegistry {
    classes: HashMap<String, ResourceClass>,
}

impl KindRegistry {
    /// Registry holding the to-do API's declared kinds.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for (name, class) in DEFAULT_KINDS {
            registry.register(*name, *class);
        }
        registry
    }

    /// Registry with no kinds; everything resolves to `Entity`.
    pub fn empty() -> Self {
        Self {
            classes: HashMap::new(),
        }
    }

    /// Map `name` to `class`, returning the previous mapping if any.
    pub fn register(&mut self, name: impl Into<String>, class: ResourceClass) -> Option<ResourceClass> {
        self.classes.insert(name.into(), class)
    }

    /// Class for `name`. Exact, case-sensitive match; unknown names yield
    /// `ResourceClass::Entity`.
    pub fn resolve(&self, name: &str) -> ResourceClass {
        self.classes.get(name).copied().unwrap_or(ResourceClass::Entity)
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

impl Default for KindRegistry {
    fn default() -> Self {
        Self::new()
    }
}
