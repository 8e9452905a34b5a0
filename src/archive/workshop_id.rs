//! Workshop identifier spellings

/// Teaching-data spelling -> catalogue ID
const WORKSHOP_IDS: &[(&str, &str)] = &[
    ("WoG", "wog"),
    ("WPSG", "wpsg"),
    ("WPhylo", "wphylo"),
    ("WMolEvo", "wmolevo"),
    ("HTranscript", "htranscriptomics"),
    ("HMicrobial", "hmicrobial"),
];

/// Catalogue ID for a workshop as spelled in teaching data.
///
/// Known spellings map through the table; anything else is lower-cased.
pub fn normalize_workshop_id(id: &str) -> String {
    WORKSHOP_IDS
        .iter()
        .find(|(teaching, _)| *teaching == id)
        .map(|(_, catalogue)| catalogue.to_string())
        .unwrap_or_else(|| id.to_lowercase())
}

/// Teaching-data spelling for a catalogue ID; unknown IDs come back unchanged
pub fn teaching_workshop_id(id: &str) -> String {
    WORKSHOP_IDS
        .iter()
        .find(|(_, catalogue)| *catalogue == id)
        .map(|(teaching, _)| teaching.to_string())
        .unwrap_or_else(|| id.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize() {
        assert_eq!(normalize_workshop_id("WoG"), "wog");
        assert_eq!(normalize_workshop_id("HTranscript"), "htranscriptomics");
        assert_eq!(normalize_workshop_id("WCHG"), "wchg");
        assert_eq!(normalize_workshop_id("wpsg"), "wpsg");
    }

    #[test]
    fn test_reverse() {
        assert_eq!(teaching_workshop_id("wphylo"), "WPhylo");
        assert_eq!(teaching_workshop_id("unknown"), "unknown");
        assert_eq!(normalize_workshop_id(&teaching_workshop_id("hmicrobial")), "hmicrobial");
    }
}
