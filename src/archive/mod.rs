//! Archive data: the session document source
//!
//! Teaching histories are stored per faculty member
//! (faculty -> workshop -> year -> sessions) next to a workshop catalogue.
//! This module flattens them into [`SessionDocument`](crate::models::SessionDocument)s.

mod model;
mod source;
mod workshop_id;

pub use model::{
    FacultyTeaching, TeachingArchive, TeachingHistory, TeachingRecord, WorkshopCatalogue, WorkshopInfo,
    WorkshopsHistory,
};
pub use source::{load_sessions, sessions_from, ArchiveSource, DocumentSource, StaticDocuments};
pub use workshop_id::{normalize_workshop_id, teaching_workshop_id};
