//! Document sources

use crate::archive::model::{TeachingArchive, WorkshopCatalogue};
use crate::archive::workshop_id::normalize_workshop_id;
use crate::error::{AppError, Result};
use crate::models::{SessionDocument, SessionType};
use parking_lot::Mutex;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Delivers the complete, normalized document set.
///
/// Implementations should hand back the same `Arc` until the underlying data
/// changes; the search service rebuilds only when the pointer differs.
pub trait DocumentSource: Send + Sync {
    fn documents(&self) -> Result<Arc<Vec<SessionDocument>>>;
}

/// A fixed, already-built document set
#[derive(Debug, Clone, Default)]
pub struct StaticDocuments {
    documents: Arc<Vec<SessionDocument>>,
}

impl StaticDocuments {
    pub fn new(documents: Arc<Vec<SessionDocument>>) -> Self {
        Self { documents }
    }
}

impl From<Vec<SessionDocument>> for StaticDocuments {
    fn from(documents: Vec<SessionDocument>) -> Self {
        Self::new(Arc::new(documents))
    }
}

impl DocumentSource for StaticDocuments {
    fn documents(&self) -> Result<Arc<Vec<SessionDocument>>> {
        Ok(Arc::clone(&self.documents))
    }
}

/// Sessions read from the archive's teaching-history and workshop catalogue
/// JSON files. The parsed set is cached until [`ArchiveSource::reload`].
pub struct ArchiveSource {
    teaching_path: PathBuf,
    workshops_path: PathBuf,
    cached: Mutex<Option<Arc<Vec<SessionDocument>>>>,
}

impl ArchiveSource {
    pub fn new(teaching_path: impl Into<PathBuf>, workshops_path: impl Into<PathBuf>) -> Self {
        Self {
            teaching_path: teaching_path.into(),
            workshops_path: workshops_path.into(),
            cached: Mutex::new(None),
        }
    }

    /// Re-read both files and replace the cached set
    pub fn reload(&self) -> Result<Arc<Vec<SessionDocument>>> {
        let documents = Arc::new(load_sessions(&self.teaching_path, &self.workshops_path)?);
        *self.cached.lock() = Some(Arc::clone(&documents));
        Ok(documents)
    }
}

impl DocumentSource for ArchiveSource {
    fn documents(&self) -> Result<Arc<Vec<SessionDocument>>> {
        if let Some(documents) = self.cached.lock().as_ref() {
            return Ok(Arc::clone(documents));
        }
        self.reload()
    }
}

fn read_json(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| {
        AppError::Io(std::io::Error::new(
            e.kind(),
            format!("{}: {}", path.display(), e),
        ))
    })
}

/// Parse both archive files from disk
pub fn load_sessions(teaching_path: &Path, workshops_path: &Path) -> Result<Vec<SessionDocument>> {
    let teaching: TeachingArchive = serde_json::from_str(&read_json(teaching_path)?)?;
    let workshops: WorkshopCatalogue = serde_json::from_str(&read_json(workshops_path)?)?;
    let sessions = sessions_from(&teaching, &workshops);
    tracing::info!(
        sessions = sessions.len(),
        faculty = teaching.len(),
        workshops = workshops.len(),
        path = %teaching_path.display(),
        "Loaded archive sessions"
    );
    Ok(sessions)
}

/// Flatten faculty teaching histories into session documents.
///
/// IDs are `{faculty}-{workshop}-{year}-{index}` with the index counted
/// within one faculty/workshop/year list. The faculty member is the primary
/// presenter. Sessions of workshops missing from the catalogue and years that
/// are not integers are skipped.
pub fn sessions_from(teaching: &TeachingArchive, workshops: &WorkshopCatalogue) -> Vec<SessionDocument> {
    let mut sessions = Vec::new();

    for (faculty_id, faculty) in teaching {
        let Some(history) = &faculty.teaching else {
            continue;
        };

        for (teaching_workshop, years) in &history.workshops_history {
            let workshop_id = normalize_workshop_id(teaching_workshop);
            let Some(workshop) = workshops.get(&workshop_id) else {
                tracing::warn!(
                    faculty_id = %faculty_id,
                    workshop = %teaching_workshop,
                    "Skipping sessions of unknown workshop"
                );
                continue;
            };

            for (year_key, records) in years {
                let Ok(year) = year_key.trim().parse::<i32>() else {
                    tracing::warn!(
                        faculty_id = %faculty_id,
                        workshop_id = %workshop_id,
                        year = %year_key,
                        "Skipping sessions with unparseable year"
                    );
                    continue;
                };

                for (index, record) in records.iter().enumerate() {
                    let mut session = SessionDocument::new(
                        format!("{}-{}-{}-{}", faculty_id, workshop_id, year_key, index),
                        workshop_id.clone(),
                        year,
                        record.topic.clone(),
                        SessionType::from(record.session_type.as_str()),
                    )
                    .with_presenters(vec![faculty_id.as_str()])
                    .with_co_presenters(record.co_presenters.clone())
                    .with_techniques(record.techniques.clone())
                    .with_date(record.date.clone());
                    session.workshop_name = workshop.name.clone();
                    session.time = record.time.clone();
                    session.location = record.location.clone().filter(|l| !l.trim().is_empty());
                    sessions.push(session);
                }
            }
        }
    }

    sessions
}
