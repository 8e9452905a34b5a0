//! Raw archive file shapes

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Workshop catalogue entry (`workshops.json`, keyed by workshop ID)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopInfo {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub short_name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub start_year: Option<i32>,
    #[serde(default)]
    pub end_year: Option<i32>,
    #[serde(default)]
    pub location: String,
}

/// One taught session as recorded in a faculty member's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeachingRecord {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    pub topic: String,
    #[serde(rename = "type", default)]
    pub session_type: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub co_presenters: Vec<String>,
    #[serde(default)]
    pub techniques: Vec<String>,
}

/// workshop (as spelled in teaching data) -> year -> sessions
pub type WorkshopsHistory = BTreeMap<String, BTreeMap<String, Vec<TeachingRecord>>>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeachingHistory {
    #[serde(default)]
    pub workshops_history: WorkshopsHistory,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FacultyTeaching {
    #[serde(default)]
    pub teaching: Option<TeachingHistory>,
}

/// faculty ID -> teaching record (`teaching.json`)
pub type TeachingArchive = BTreeMap<String, FacultyTeaching>;

/// workshop ID -> catalogue entry
pub type WorkshopCatalogue = BTreeMap<String, WorkshopInfo>;
