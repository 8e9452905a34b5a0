//! Workshop taxonomy merged with the faculty topic set

use crate::taxonomy::node::TaxonomyNode;
use crate::taxonomy::tree::Taxonomy;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use strum::{Display, EnumString};

pub const UNIFIED_TAXONOMY_VERSION: &str = "1.0.0";
pub const SYNC_STRATEGY: &str = "merge-similar-preserve-unique";

const WORKSHOP_PREFIX: &str = "workshop-";
const FACULTY_PREFIX: &str = "faculty-";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum TaxonomySource {
    Workshop,
    Faculty,
}

/// A faculty scientific topic; children are topic IDs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FacultyTopic {
    pub label: String,
    #[serde(default)]
    pub level: usize,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(default)]
    pub children: Vec<String>,
}

/// Faculty topic set keyed by topic ID
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacultyTopics {
    #[serde(default)]
    pub topics: BTreeMap<String, FacultyTopic>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedNode {
    pub id: String,
    pub label: String,
    pub level: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    pub sources: Vec<TaxonomySource>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workshop_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub faculty_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<UnifiedNode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedMetadata {
    pub version: String,
    pub last_updated: DateTime<Utc>,
    pub total_nodes: usize,
    pub sources: Vec<TaxonomySource>,
    pub sync_strategy: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnifiedTaxonomy {
    pub metadata: UnifiedMetadata,
    pub categories: Vec<UnifiedNode>,
    /// Workshop node ID -> unified ID
    pub workshop_mappings: BTreeMap<String, String>,
    /// Faculty topic ID -> unified ID
    pub faculty_mappings: BTreeMap<String, String>,
}

impl UnifiedTaxonomy {
    /// Merge workshop categories with faculty topics.
    ///
    /// Each workshop category absorbs the first unclaimed faculty topic whose
    /// label equals, contains or is contained in the category label, or
    /// equals one of its aliases. Unclaimed faculty topics are appended.
    pub fn build(workshop: &Taxonomy, faculty: &FacultyTopics) -> Self {
        let workshop_nodes: Vec<UnifiedNode> = workshop
            .categories()
            .iter()
            .map(|category| from_workshop(category, None))
            .collect();
        let faculty_nodes = from_faculty(faculty);

        let mut claimed: HashSet<String> = HashSet::new();
        let mut categories = Vec::with_capacity(workshop_nodes.len() + faculty_nodes.len());

        for mut node in workshop_nodes {
            let label = node.label.to_lowercase();
            let candidate = faculty_nodes.iter().find(|f| {
                if claimed.contains(&f.id) {
                    return false;
                }
                let other = f.label.to_lowercase();
                label == other
                    || label.contains(&other)
                    || other.contains(&label)
                    || node.aliases.iter().any(|a| a.to_lowercase() == other)
            });

            if let Some(faculty_node) = candidate {
                tracing::debug!(
                    workshop = %node.id,
                    faculty = %faculty_node.id,
                    "Merging taxonomy nodes"
                );
                claimed.insert(faculty_node.id.clone());
                node.sources = vec![TaxonomySource::Workshop, TaxonomySource::Faculty];
                node.faculty_id = faculty_node.faculty_id.clone();
                if node.description.is_none() {
                    node.description = faculty_node.description.clone();
                }
                for alias in &faculty_node.aliases {
                    if !node.aliases.contains(alias) {
                        node.aliases.push(alias.clone());
                    }
                }
            }
            categories.push(node);
        }

        categories.extend(faculty_nodes.into_iter().filter(|f| !claimed.contains(&f.id)));

        let mut workshop_mappings = BTreeMap::new();
        let mut faculty_mappings = BTreeMap::new();
        collect_mappings(&categories, &mut workshop_mappings, &mut faculty_mappings);

        let total_nodes = count_nodes(&categories);
        tracing::info!(
            total_nodes,
            merged = claimed.len(),
            "Unified taxonomy built"
        );

        Self {
            metadata: UnifiedMetadata {
                version: UNIFIED_TAXONOMY_VERSION.to_string(),
                last_updated: Utc::now(),
                total_nodes,
                sources: vec![TaxonomySource::Workshop, TaxonomySource::Faculty],
                sync_strategy: SYNC_STRATEGY.to_string(),
            },
            categories,
            workshop_mappings,
            faculty_mappings,
        }
    }

    pub fn find_node(&self, id: &str) -> Option<&UnifiedNode> {
        fn search<'a>(nodes: &'a [UnifiedNode], id: &str) -> Option<&'a UnifiedNode> {
            for node in nodes {
                if node.id == id {
                    return Some(node);
                }
                if let Some(found) = search(&node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        search(&self.categories, id)
    }

    /// Nodes mentioning `text` in label, aliases or description; each once
    pub fn search(&self, text: &str) -> Vec<&UnifiedNode> {
        fn walk<'a>(nodes: &'a [UnifiedNode], needle: &str, out: &mut Vec<&'a UnifiedNode>) {
            for node in nodes {
                let hit = node.label.to_lowercase().contains(needle)
                    || node.aliases.iter().any(|a| a.to_lowercase().contains(needle))
                    || node
                        .description
                        .as_deref()
                        .is_some_and(|d| d.to_lowercase().contains(needle));
                if hit {
                    out.push(node);
                }
                walk(&node.children, needle, out);
            }
        }

        let needle = text.trim().to_lowercase();
        let mut out = Vec::new();
        if !needle.is_empty() {
            walk(&self.categories, &needle, &mut out);
        }
        out
    }

    pub fn map_workshop(&self, workshop_id: &str) -> Option<&str> {
        self.workshop_mappings.get(workshop_id).map(String::as_str)
    }

    pub fn map_faculty(&self, faculty_id: &str) -> Option<&str> {
        self.faculty_mappings.get(faculty_id).map(String::as_str)
    }
}

fn from_workshop(node: &TaxonomyNode, parent_id: Option<&str>) -> UnifiedNode {
    let id = format!("{}{}", WORKSHOP_PREFIX, node.id);
    let children = node
        .children
        .iter()
        .map(|child| from_workshop(child, Some(id.as_str())))
        .collect();
    UnifiedNode {
        label: node.label.clone(),
        level: node.level,
        icon: node.icon.clone(),
        description: node.description.clone(),
        aliases: node.aliases.clone(),
        parent_id: parent_id.map(str::to_string),
        sources: vec![TaxonomySource::Workshop],
        workshop_id: Some(node.id.clone()),
        faculty_id: None,
        children,
        id,
    }
}

/// Every faculty topic becomes a top-level node with its listed children
fn from_faculty(faculty: &FacultyTopics) -> Vec<UnifiedNode> {
    faculty
        .topics
        .iter()
        .map(|(topic_id, topic)| {
            let id = format!("{}{}", FACULTY_PREFIX, topic_id);
            let children = topic
                .children
                .iter()
                .map(|child_id| {
                    let child = faculty.topics.get(child_id);
                    UnifiedNode {
                        id: format!("{}{}", FACULTY_PREFIX, child_id),
                        label: child.map_or_else(|| child_id.clone(), |c| c.label.clone()),
                        level: child.map_or(topic.level + 1, |c| c.level),
                        icon: child.and_then(|c| c.icon.clone()),
                        description: child.and_then(|c| c.description.clone()),
                        aliases: Vec::new(),
                        parent_id: Some(id.clone()),
                        sources: vec![TaxonomySource::Faculty],
                        workshop_id: None,
                        faculty_id: Some(child_id.clone()),
                        children: Vec::new(),
                    }
                })
                .collect();
            UnifiedNode {
                id,
                label: topic.label.clone(),
                level: topic.level,
                icon: topic.icon.clone(),
                description: topic.description.clone(),
                aliases: Vec::new(),
                parent_id: None,
                sources: vec![TaxonomySource::Faculty],
                workshop_id: None,
                faculty_id: Some(topic_id.clone()),
                children,
            }
        })
        .collect()
}

fn collect_mappings(
    nodes: &[UnifiedNode],
    workshop: &mut BTreeMap<String, String>,
    faculty: &mut BTreeMap<String, String>,
) {
    for node in nodes {
        if let Some(id) = &node.workshop_id {
            workshop.insert(id.clone(), node.id.clone());
        }
        if let Some(id) = &node.faculty_id {
            faculty.insert(id.clone(), node.id.clone());
        }
        collect_mappings(&node.children, workshop, faculty);
    }
}

fn count_nodes(nodes: &[UnifiedNode]) -> usize {
    nodes.len() + nodes.iter().map(|n| count_nodes(&n.children)).sum::<usize>()
}
