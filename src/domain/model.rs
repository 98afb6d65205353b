use serde::{Deserialize, Serialize};
use std::fmt;

/// One storm extracted from a single line of model output.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HurricaneRecord {
    pub name: String,
    pub start_date: String,
    pub end_date: String,
    pub death_count: String,
    pub affected_areas: Vec<String>,
}

/// Text collected from the two zones of the season page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    pub paragraphs: Vec<String>,
    pub infobox_cells: Vec<String>,
}

impl PageText {
    /// Paragraph text first, infobox text appended, single-space separated.
    pub fn combined(&self) -> String {
        format!(
            "{} {}",
            self.paragraphs.join(" "),
            self.infobox_cells.join(" ")
        )
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.iter().all(|p| p.trim().is_empty())
            && self.infobox_cells.iter().all(|c| c.trim().is_empty())
    }
}

/// Why a non-blank reply line did not become a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineRejection {
    TooFewFields { found: usize },
    MissingLabel { field: &'static str },
    /// The text before the colon is not the label expected at this position.
    UnexpectedLabel { field: &'static str, found: String },
}

impl fmt::Display for LineRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineRejection::TooFewFields { found } => {
                write!(f, "expected 5 comma-separated fields, found {}", found)
            }
            LineRejection::MissingLabel { field } => {
                write!(f, "field '{}' has no 'Label:' prefix", field)
            }
            LineRejection::UnexpectedLabel { field, found } => {
                write!(f, "field '{}' carries unexpected label '{}'", field, found)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedLine {
    /// 1-based line number within the reply
    pub line_number: usize,
    pub line: String,
    pub reason: LineRejection,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedReply {
    pub records: Vec<HurricaneRecord>,
    pub rejected: Vec<RejectedLine>,
}
