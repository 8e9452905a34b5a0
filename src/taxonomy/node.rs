use serde::{Deserialize, Serialize};

/// One concept in the expertise tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaxonomyNode {
    /// Unique across the whole tree
    pub id: String,

    pub label: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,

    /// Display color, set on top-level categories
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Alternative spellings matched by the mapper
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,

    /// Depth, 0 for categories
    pub level: usize,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<TaxonomyNode>,
}

impl TaxonomyNode {
    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Label followed by aliases
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.label.as_str()).chain(self.aliases.iter().map(String::as_str))
    }

    /// Case-insensitive substring match on label, aliases or description;
    /// `needle` must already be lower-case
    pub(crate) fn mentions(&self, needle: &str) -> bool {
        self.terms().any(|term| term.to_lowercase().contains(needle))
            || self
                .description
                .as_deref()
                .is_some_and(|d| d.to_lowercase().contains(needle))
    }
}

/// Node as written in a definition file; depth and parent come from nesting
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct NodeDefinition {
    pub id: String,
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub children: Vec<NodeDefinition>,
}
