use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use validator::Validate;

/// A single teaching session in the archive; the unit the search index works on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct SessionDocument {
    /// Unique identifier (`{faculty}-{workshop}-{year}-{index}` for archive data)
    #[serde(default)]
    #[validate(length(min = 1))]
    pub id: String,

    /// Normalized workshop identifier (e.g. `wog`, `wpsg`)
    pub workshop_id: String,

    /// Workshop display name
    #[serde(default)]
    pub workshop_name: String,

    /// Workshop year
    pub year: i32,

    /// Free-text topic, used as the session title
    pub topic: String,

    /// Session type
    #[serde(rename = "type")]
    pub session_type: SessionType,

    /// Primary presenter identifiers
    #[serde(default)]
    pub presenters: Vec<String>,

    /// Co-presenter identifiers
    #[serde(default)]
    pub co_presenters: Vec<String>,

    /// Technique tags attached by the data source
    #[serde(default)]
    pub techniques: Vec<String>,

    /// Date display string
    #[serde(default)]
    pub date: String,

    /// Time display string
    #[serde(default)]
    pub time: String,

    /// Room or venue
    #[serde(default)]
    pub location: Option<String>,
}

impl SessionDocument {
    /// Create a session with the required fields; everything else starts empty
    pub fn new(
        id: impl Into<String>,
        workshop_id: impl Into<String>,
        year: i32,
        topic: impl Into<String>,
        session_type: SessionType,
    ) -> Self {
        Self {
            id: id.into(),
            workshop_id: workshop_id.into(),
            workshop_name: String::new(),
            year,
            topic: topic.into(),
            session_type,
            presenters: Vec::new(),
            co_presenters: Vec::new(),
            techniques: Vec::new(),
            date: String::new(),
            time: String::new(),
            location: None,
        }
    }

    pub fn with_presenters(mut self, presenters: Vec<impl Into<String>>) -> Self {
        self.presenters = presenters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_co_presenters(mut self, co_presenters: Vec<impl Into<String>>) -> Self {
        self.co_presenters = co_presenters.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_techniques(mut self, techniques: Vec<impl Into<String>>) -> Self {
        self.techniques = techniques.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_date(mut self, date: impl Into<String>) -> Self {
        self.date = date.into();
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Primary presenters followed by co-presenters
    pub fn all_presenters(&self) -> impl Iterator<Item = &str> {
        self.presenters
            .iter()
            .chain(self.co_presenters.iter())
            .map(String::as_str)
    }

    /// Session date, if the display string is an ISO `YYYY-MM-DD` date
    pub fn parsed_date(&self) -> Option<NaiveDate> {
        NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").ok()
    }
}

/// Kind of session. Parsing is case-insensitive and never fails: unknown
/// labels are kept verbatim in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SessionType {
    Lecture,
    Practical,
    Lab,
    Orientation,
    Social,
    Discussion,
    Assessment,
    Other(String),
}

impl SessionType {
    pub fn as_str(&self) -> &str {
        match self {
            SessionType::Lecture => "lecture",
            SessionType::Practical => "practical",
            SessionType::Lab => "lab",
            SessionType::Orientation => "orientation",
            SessionType::Social => "social",
            SessionType::Discussion => "discussion",
            SessionType::Assessment => "assessment",
            SessionType::Other(label) => label,
        }
    }
}

impl fmt::Display for SessionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SessionType {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        Ok(match trimmed.to_lowercase().as_str() {
            "lecture" => SessionType::Lecture,
            "practical" => SessionType::Practical,
            "lab" => SessionType::Lab,
            "orientation" => SessionType::Orientation,
            "social" => SessionType::Social,
            "discussion" => SessionType::Discussion,
            "assessment" => SessionType::Assessment,
            _ => SessionType::Other(trimmed.to_string()),
        })
    }
}

impl From<String> for SessionType {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(session_type) => session_type,
            Err(never) => match never {},
        }
    }
}

impl From<&str> for SessionType {
    fn from(value: &str) -> Self {
        SessionType::from(value.to_string())
    }
}

impl From<SessionType> for String {
    fn from(value: SessionType) -> Self {
        value.to_string()
    }
}
