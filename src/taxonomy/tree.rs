//! Expertise taxonomy tree and free-text mapper

use crate::taxonomy::error::{TaxonomyError, TaxonomyResult};
use crate::taxonomy::node::{NodeDefinition, TaxonomyNode};
use once_cell::sync::Lazy;
use std::collections::HashMap;

const BUILTIN_DEFINITION: &str = include_str!("expertise.yaml");

static BUILTIN: Lazy<Taxonomy> =
    Lazy::new(|| Taxonomy::from_yaml(BUILTIN_DEFINITION).expect("embedded expertise taxonomy is valid"));

/// Terms at most this long only match labels exactly or through aliases
const MIN_PARTIAL_TERM_CHARS: usize = 4;

/// Immutable category tree.
///
/// Node lookups go through a child-index path per ID, so `find_node_by_id`
/// and `ancestor_path` cost the depth of the node.
#[derive(Debug, Clone)]
pub struct Taxonomy {
    categories: Vec<TaxonomyNode>,
    paths: HashMap<String, Vec<usize>>,
}

impl Taxonomy {
    /// The bundled expertise taxonomy
    pub fn builtin() -> &'static Taxonomy {
        &BUILTIN
    }

    /// Load a tree from its YAML definition (a list of categories).
    ///
    /// Levels and parent IDs are assigned from nesting. IDs must be unique
    /// and labels non-empty.
    pub fn from_yaml(definition: &str) -> TaxonomyResult<Self> {
        let definitions: Vec<NodeDefinition> = serde_yaml::from_str(definition)?;
        Self::from_definitions(definitions)
    }

    pub(crate) fn from_definitions(definitions: Vec<NodeDefinition>) -> TaxonomyResult<Self> {
        let categories: Vec<TaxonomyNode> = definitions
            .into_iter()
            .map(|definition| convert(definition, 0, None))
            .collect();

        let mut paths = HashMap::new();
        for (index, category) in categories.iter().enumerate() {
            register(category, vec![index], &mut paths)?;
        }

        tracing::debug!(
            categories = categories.len(),
            nodes = paths.len(),
            "Taxonomy loaded"
        );
        Ok(Self { categories, paths })
    }

    pub fn categories(&self) -> &[TaxonomyNode] {
        &self.categories
    }

    /// Total node count, categories included
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }

    /// Every node in depth-first pre-order
    pub fn nodes(&self) -> Vec<&TaxonomyNode> {
        fn walk<'a>(nodes: &'a [TaxonomyNode], out: &mut Vec<&'a TaxonomyNode>) {
            for node in nodes {
                out.push(node);
                walk(&node.children, out);
            }
        }
        let mut out = Vec::with_capacity(self.paths.len());
        walk(&self.categories, &mut out);
        out
    }

    pub fn find_node_by_id(&self, id: &str) -> Option<&TaxonomyNode> {
        let path = self.paths.get(id)?;
        let (first, rest) = path.split_first()?;
        let mut node = self.categories.get(*first)?;
        for &index in rest {
            node = node.children.get(index)?;
        }
        Some(node)
    }

    /// Nodes whose label, an alias or the description contains `text`
    /// (case-insensitive), in depth-first order
    pub fn find_nodes_by_text(&self, text: &str) -> Vec<&TaxonomyNode> {
        let needle = text.trim().to_lowercase();
        if needle.is_empty() {
            return Vec::new();
        }
        self.nodes()
            .into_iter()
            .filter(|node| node.mentions(&needle))
            .collect()
    }

    /// Direct children; empty for leaves and unknown IDs
    pub fn children_of(&self, id: &str) -> &[TaxonomyNode] {
        self.find_node_by_id(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
    }

    /// Nodes from the category down to `id`; empty for unknown IDs
    pub fn ancestor_path(&self, id: &str) -> Vec<&TaxonomyNode> {
        let Some(path) = self.paths.get(id) else {
            return Vec::new();
        };
        let mut out = Vec::with_capacity(path.len());
        let mut level: &[TaxonomyNode] = &self.categories;
        for &index in path {
            match level.get(index) {
                Some(node) => {
                    out.push(node);
                    level = &node.children;
                }
                None => break,
            }
        }
        out
    }

    /// Like [`Taxonomy::find_node_by_id`] but an unknown ID is an error
    pub fn node(&self, id: &str) -> TaxonomyResult<&TaxonomyNode> {
        self.find_node_by_id(id)
            .ok_or_else(|| TaxonomyError::UnknownNode(id.to_string()))
    }

    /// Most specific node for a single free-text term.
    ///
    /// Candidates: label equal to the term, an alias equal to the term, or
    /// (for terms longer than 3 chars) a label containing the term. The
    /// deepest candidate wins; ties go to the first in depth-first order.
    pub fn map_term(&self, term: &str) -> Option<&TaxonomyNode> {
        let term = term.trim().to_lowercase();
        if term.is_empty() {
            return None;
        }
        let partial = term.chars().count() >= MIN_PARTIAL_TERM_CHARS;

        let mut best: Option<&TaxonomyNode> = None;
        for node in self.nodes() {
            let label = node.label.to_lowercase();
            let matched = label == term
                || node.aliases.iter().any(|alias| alias.to_lowercase() == term)
                || (partial && label.contains(&term));
            if matched && best.map_or(true, |b| node.level > b.level) {
                best = Some(node);
            }
        }
        best
    }

    /// Canonical node IDs for free-text expertise terms.
    ///
    /// Unmatched terms are dropped; the result is deduplicated in
    /// first-mapped order.
    pub fn map_to_taxonomy<S: AsRef<str>>(&self, terms: &[S]) -> Vec<String> {
        let mut ids: Vec<String> = Vec::new();
        for term in terms {
            match self.map_term(term.as_ref()) {
                Some(node) => {
                    if !ids.contains(&node.id) {
                        ids.push(node.id.clone());
                    }
                }
                None => tracing::trace!(term = term.as_ref(), "Expertise term not in taxonomy"),
            }
        }
        ids
    }

    /// Whether free-text `expertise` belongs under `node_id`.
    ///
    /// True when the mapped IDs include the node, or when any of the node's
    /// label/aliases and any expertise string contain one another.
    pub fn matches_expertise<S: AsRef<str>>(&self, node_id: &str, expertise: &[S]) -> bool {
        if self.map_to_taxonomy(expertise).iter().any(|id| id == node_id) {
            return true;
        }
        let Some(node) = self.find_node_by_id(node_id) else {
            return false;
        };

        let expertise: Vec<String> = expertise
            .iter()
            .map(|e| e.as_ref().trim().to_lowercase())
            .filter(|e| !e.is_empty())
            .collect();
        node.terms().map(str::to_lowercase).any(|term| {
            expertise
                .iter()
                .any(|exp| exp.contains(&term) || term.contains(exp.as_str()))
        })
    }
}

fn convert(definition: NodeDefinition, level: usize, parent_id: Option<&str>) -> TaxonomyNode {
    let children = definition
        .children
        .into_iter()
        .map(|child| convert(child, level + 1, Some(definition.id.as_str())))
        .collect();
    TaxonomyNode {
        id: definition.id,
        label: definition.label,
        icon: definition.icon,
        color: definition.color,
        description: definition.description,
        aliases: definition.aliases,
        level,
        parent_id: parent_id.map(str::to_string),
        children,
    }
}

fn register(
    node: &TaxonomyNode,
    path: Vec<usize>,
    paths: &mut HashMap<String, Vec<usize>>,
) -> TaxonomyResult<()> {
    if node.label.trim().is_empty() {
        return Err(TaxonomyError::EmptyLabel(node.id.clone()));
    }
    if paths.contains_key(&node.id) {
        return Err(TaxonomyError::DuplicateNodeId(node.id.clone()));
    }
    paths.insert(node.id.clone(), path.clone());
    for (index, child) in node.children.iter().enumerate() {
        let mut child_path = path.clone();
        child_path.push(index);
        register(child, child_path, paths)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SMALL: &str = r##"
- id: methods
  label: Methods
  color: "#3b82f6"
  children:
    - id: phylogenetics
      label: Phylogenetic Analysis
      children:
        - id: tree-building
          label: Tree Construction
          aliases: [phylogeny]
          children:
            - { id: bayesian-inference, label: Bayesian Inference, aliases: [bayesian] }
- id: organisms
  label: Organisms
  description: Model organisms and systems
"##;

    #[test]
    fn test_levels_and_parents_derived() {
        let taxonomy = Taxonomy::from_yaml(SMALL).unwrap();
        assert_eq!(taxonomy.len(), 5);

        let node = taxonomy.find_node_by_id("bayesian-inference").unwrap();
        assert_eq!(node.level, 3);
        assert_eq!(node.parent_id.as_deref(), Some("tree-building"));
        assert_eq!(taxonomy.find_node_by_id("methods").unwrap().parent_id, None);
    }

    #[test]
    fn test_rejects_duplicate_ids() {
        let yaml = r#"
- id: a
  label: A
  children:
    - { id: b, label: B }
- id: b
  label: Other B
"#;
        assert!(matches!(
            Taxonomy::from_yaml(yaml),
            Err(TaxonomyError::DuplicateNodeId(id)) if id == "b"
        ));
    }

    #[test]
    fn test_rejects_empty_label() {
        let yaml = "- { id: a, label: \"  \" }";
        assert!(matches!(Taxonomy::from_yaml(yaml), Err(TaxonomyError::EmptyLabel(_))));
        assert!(matches!(Taxonomy::from_yaml("{not: [a list"), Err(TaxonomyError::Parse(_))));
    }

    #[test]
    fn test_traversal() {
        let taxonomy = Taxonomy::from_yaml(SMALL).unwrap();

        let path: Vec<&str> = taxonomy
            .ancestor_path("bayesian-inference")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        assert_eq!(path, vec!["methods", "phylogenetics", "tree-building", "bayesian-inference"]);

        assert_eq!(taxonomy.children_of("methods").len(), 1);
        assert!(taxonomy.children_of("bayesian-inference").is_empty());
        assert!(taxonomy.children_of("missing").is_empty());
        assert!(taxonomy.ancestor_path("missing").is_empty());
        assert!(taxonomy.node("missing").is_err());
    }

    #[test]
    fn test_find_nodes_by_text() {
        let taxonomy = Taxonomy::from_yaml(SMALL).unwrap();
        let ids: Vec<&str> = taxonomy
            .find_nodes_by_text("PHYLO")
            .iter()
            .map(|n| n.id.as_str())
            .collect();
        // label of phylogenetics, alias of tree-building
        assert_eq!(ids, vec!["phylogenetics", "tree-building"]);

        let ids: Vec<&str> = taxonomy.find_nodes_by_text("model").iter().map(|n| n.id.as_str()).collect();
        assert_eq!(ids, vec!["organisms"]);
        assert!(taxonomy.find_nodes_by_text("  ").is_empty());
    }

    #[test]
    fn test_map_prefers_deepest() {
        let taxonomy = Taxonomy::from_yaml(SMALL).unwrap();
        assert_eq!(taxonomy.map_to_taxonomy(&["bayesian"]), vec!["bayesian-inference"]);
        assert_eq!(taxonomy.map_to_taxonomy(&["Phylogeny"]), vec!["tree-building"]);
        assert_eq!(taxonomy.map_to_taxonomy(&["methods"]), vec!["methods"]);
        // three chars: exact only
        assert!(taxonomy.map_to_taxonomy(&["met"]).is_empty());
    }

    #[test]
    fn test_map_dedups_and_drops_unmatched() {
        let taxonomy = Taxonomy::from_yaml(SMALL).unwrap();
        let ids = taxonomy.map_to_taxonomy(&["bayesian", "knitting", "Bayesian Inference"]);
        assert_eq!(ids, vec!["bayesian-inference"]);
    }

    #[test]
    fn test_matches_expertise_text_fallback() {
        let taxonomy = Taxonomy::from_yaml(SMALL).unwrap();
        assert!(taxonomy.matches_expertise("bayesian-inference", &["bayesian"]));
        // "tree construction methods" maps nowhere but contains the label
        assert!(taxonomy.matches_expertise("tree-building", &["tree construction methods"]));
        assert!(!taxonomy.matches_expertise("organisms", &["bayesian"]));
        assert!(!taxonomy.matches_expertise("missing", &["bayesian"]));
    }

    #[test]
    fn test_builtin_taxonomy_loads() {
        let taxonomy = Taxonomy::builtin();
        assert_eq!(taxonomy.categories().len(), 4);
        assert_eq!(taxonomy.len(), 105);
        assert_eq!(taxonomy.find_node_by_id("raxml").unwrap().level, 3);
        assert_eq!(taxonomy.find_node_by_id("human").unwrap().parent_id.as_deref(), Some("model-organisms"));
    }
}
