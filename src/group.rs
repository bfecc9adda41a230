//! Reusable bundles of a name prefix and modifiers.

use crate::node::{Modifier, Node};

/// A name prefix plus modifiers shared by several options.
///
/// # Example
/// ```
/// use declcfg::{group, secret, Group, Registry};
///
/// let db = Group::new("db", []);
/// let hidden = Group::options([secret()]);
///
/// let registry = Registry::new();
/// registry.string("host", "localhost", "db host", &[group(&db)]);
/// registry.string("token", "", "api token", &[group(&hidden)]);
///
/// assert!(registry.contains("db.host"));
/// assert!(registry.show().contains("<secret>"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Group {
    prefix: String,
    modifiers: Vec<Modifier>,
}

impl Group {
    /// Creates a group whose options are named `<prefix>.<name>`.
    pub fn new(prefix: impl Into<String>, modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        Self {
            prefix: prefix.into(),
            modifiers: modifiers.into_iter().collect(),
        }
    }

    /// Creates a prefix-less group that only carries modifiers.
    pub fn options(modifiers: impl IntoIterator<Item = Modifier>) -> Self {
        Self::new(String::new(), modifiers)
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn modifiers(&self) -> &[Modifier] {
        &self.modifiers
    }

    /// Returns the full name of `child` inside this group.
    pub fn key(&self, child: &str) -> String {
        if self.prefix.is_empty() {
            return child.to_string();
        }

        format!("{}.{}", self.prefix, child)
    }

    pub(crate) fn apply(&self, node: &mut Node) {
        node.name = self.key(&node.name);
        for modifier in &self.modifiers {
            modifier.apply(node);
        }
    }
}
