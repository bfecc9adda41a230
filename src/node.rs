//! Registered option metadata and the modifiers applied at registration.

use crate::group::Group;
use crate::handle::Cell;
use std::fmt;
use std::panic::Location;

/// One registered configuration option.
pub struct Node {
    pub(crate) name: String,
    description: String,
    aliases: Vec<String>,
    pub(crate) value: Box<dyn Cell>,
    is_secret: bool,
    is_required: bool,
    pub(crate) set_by: Option<String>,
    origin: &'static Location<'static>,
}

impl Node {
    pub(crate) fn new(
        name: &str,
        description: &str,
        value: Box<dyn Cell>,
        origin: &'static Location<'static>,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            aliases: Vec::new(),
            value,
            is_secret: false,
            is_required: false,
            set_by: None,
            origin,
        }
    }

    /// Canonical dot-separated name.
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn aliases(&self) -> &[String] {
        &self.aliases
    }

    pub fn is_secret(&self) -> bool {
        self.is_secret
    }

    pub fn is_required(&self) -> bool {
        self.is_required
    }

    /// Label of the provider that supplied the current value, `None` while
    /// the option still holds its default.
    pub fn set_by(&self) -> Option<&str> {
        self.set_by.as_deref()
    }

    /// Source location of the registration call.
    pub fn origin(&self) -> &'static Location<'static> {
        self.origin
    }

    pub fn type_name(&self) -> &'static str {
        self.value.type_name()
    }

    /// Current value in its string form, secrets included.
    pub fn render_value(&self) -> String {
        self.value.render()
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("aliases", &self.aliases)
            .field("type", &self.value.type_name())
            .field("is_secret", &self.is_secret)
            .field("is_required", &self.is_required)
            .field("set_by", &self.set_by)
            .field("origin", &self.origin)
            .finish()
    }
}

/// A change applied to a node while it is registered.
///
/// Modifiers run left to right after the node is built and before it is
/// checked against the registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modifier {
    /// Adds an alternate name for the option.
    Alias(String),
    /// Masks the value in [`Registry::show`](crate::Registry::show).
    Secret,
    /// Fails parsing when no provider sets the option.
    Required,
    /// Prefixes the name and applies the group's own modifiers.
    Group(Group),
}

impl Modifier {
    pub fn apply(&self, node: &mut Node) {
        match self {
            Modifier::Alias(alias) => node.aliases.push(alias.clone()),
            Modifier::Secret => node.is_secret = true,
            Modifier::Required => node.is_required = true,
            Modifier::Group(group) => group.apply(node),
        }
    }
}

/// Adds an alias, e.g. a short flag name.
///
/// ```
/// use declcfg::{alias, Registry};
///
/// let registry = Registry::new();
/// registry.int("db.port", 5432, "database port", &[alias("p")]);
/// assert_eq!(registry.resolve("p").as_deref(), Some("db.port"));
/// ```
pub fn alias(name: impl Into<String>) -> Modifier {
    Modifier::Alias(name.into())
}

/// Marks the option as secret so inspection output masks it.
pub fn secret() -> Modifier {
    Modifier::Secret
}

/// Marks the option as required.
pub fn required() -> Modifier {
    Modifier::Required
}

/// Applies a [`Group`]: prefixes the name and runs the group's modifiers.
pub fn group(group: &Group) -> Modifier {
    Modifier::Group(group.clone())
}
