use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Self-reported severity attached to a symptom analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Mild,
    Moderate,
    Severe,
}

impl Severity {
    /// Parse a severity label (case-insensitive)
    ///
    /// # Examples
    ///
    /// ```
    /// use healthai::storage::Severity;
    ///
    /// assert_eq!(Severity::parse_str("Severe").unwrap(), Severity::Severe);
    /// assert!(Severity::parse_str("extreme").is_err());
    /// ```
    pub fn parse_str(s: &str) -> Result<Self, String> {
        match s.trim().to_lowercase().as_str() {
            "mild" => Ok(Self::Mild),
            "moderate" => Ok(Self::Moderate),
            "severe" => Ok(Self::Severe),
            other => Err(format!(
                "Unknown severity: {} (expected mild, moderate or severe)",
                other
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_str(s)
    }
}

/// One saved symptom analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Unique identifier (UUID v4)
    pub id: String,
    /// The symptom description as entered
    pub symptoms: String,
    /// The generated analysis (markdown)
    pub analysis: String,
    /// When the analysis was produced
    pub timestamp: DateTime<Utc>,
    /// Severity label selected for the analysis
    pub severity: Severity,
    /// Free-text duration label, e.g. "2 days"
    pub duration: Option<String>,
}

impl AnalysisRecord {
    /// First eight characters of the id, or the whole id when shorter
    pub fn short_id(&self) -> &str {
        self.id.get(..8).unwrap_or(&self.id)
    }
}
