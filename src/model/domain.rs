//! Enumerated vocabularies: civic domains, grievance statuses, languages
//!
//! All three parse leniently (trimmed, whitespace-collapsed, case-insensitive)
//! and serialize as their canonical label. Unknown input is rejected rather
//! than mapped to a guessed value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Canonical comparison form for free-text labels: trimmed, inner whitespace
/// collapsed to single spaces, lowercased.
pub fn normalize_label(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Civic category a grievance is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Domain {
    Health,
    Education,
    Environment,
    Infrastructure,
    Transport,
    Electricity,
    WaterSupply,
    Sanitation,
    Agriculture,
    PublicSafety,
    Employment,
    SocialWelfare,
    Housing,
    Technology,
    Finance,
    Others,
}

impl Domain {
    pub const ALL: [Domain; 16] = [
        Domain::Health,
        Domain::Education,
        Domain::Environment,
        Domain::Infrastructure,
        Domain::Transport,
        Domain::Electricity,
        Domain::WaterSupply,
        Domain::Sanitation,
        Domain::Agriculture,
        Domain::PublicSafety,
        Domain::Employment,
        Domain::SocialWelfare,
        Domain::Housing,
        Domain::Technology,
        Domain::Finance,
        Domain::Others,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Domain::Health => "Health",
            Domain::Education => "Education",
            Domain::Environment => "Environment",
            Domain::Infrastructure => "Infrastructure",
            Domain::Transport => "Transport",
            Domain::Electricity => "Electricity",
            Domain::WaterSupply => "Water Supply",
            Domain::Sanitation => "Sanitation",
            Domain::Agriculture => "Agriculture",
            Domain::PublicSafety => "Public Safety",
            Domain::Employment => "Employment",
            Domain::SocialWelfare => "Social Welfare",
            Domain::Housing => "Housing",
            Domain::Technology => "Technology",
            Domain::Finance => "Finance",
            Domain::Others => "Others",
        }
    }

    /// Whether `raw` names this domain under the shared normalization policy
    pub fn matches(&self, raw: &str) -> bool {
        normalize_label(raw) == normalize_label(self.as_str())
    }
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Domain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().is_empty() {
            return Err("Domain is required".to_string());
        }
        Domain::ALL
            .into_iter()
            .find(|d| d.matches(s))
            .ok_or_else(|| format!("Unknown domain: {}", s.trim()))
    }
}

impl TryFrom<String> for Domain {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Domain> for &'static str {
    fn from(value: Domain) -> Self {
        value.as_str()
    }
}

/// Grievance status as set by an administrator
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "String", into = "&'static str")]
pub enum GrievanceStatus {
    #[default]
    Pending,
    BeingStudied,
    InProgress,
    UnderReview,
    Resolved,
}

impl GrievanceStatus {
    pub const ALL: [GrievanceStatus; 5] = [
        GrievanceStatus::Pending,
        GrievanceStatus::BeingStudied,
        GrievanceStatus::InProgress,
        GrievanceStatus::UnderReview,
        GrievanceStatus::Resolved,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GrievanceStatus::Pending => "Pending",
            GrievanceStatus::BeingStudied => "Being Studied",
            GrievanceStatus::InProgress => "In Progress",
            GrievanceStatus::UnderReview => "Under Review",
            GrievanceStatus::Resolved => "Resolved",
        }
    }
}

impl fmt::Display for GrievanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GrievanceStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        GrievanceStatus::ALL
            .into_iter()
            .find(|st| normalize_label(st.as_str()) == wanted)
            .ok_or_else(|| format!("Unknown status: {}", s.trim()))
    }
}

impl TryFrom<String> for GrievanceStatus {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<GrievanceStatus> for &'static str {
    fn from(value: GrievanceStatus) -> Self {
        value.as_str()
    }
}

/// Language the citizen prefers to be contacted in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "&'static str")]
pub enum Language {
    #[default]
    English,
    Hindi,
    Bengali,
    Telugu,
    Marathi,
    Tamil,
    Urdu,
    Gujarati,
    Kannada,
    Malayalam,
    Punjabi,
    Assamese,
    Kashmiri,
    Nepali,
    Dogri,
    Konkani,
    Sindhi,
    Sanskrit,
}

impl Language {
    pub const ALL: [Language; 18] = [
        Language::English,
        Language::Hindi,
        Language::Bengali,
        Language::Telugu,
        Language::Marathi,
        Language::Tamil,
        Language::Urdu,
        Language::Gujarati,
        Language::Kannada,
        Language::Malayalam,
        Language::Punjabi,
        Language::Assamese,
        Language::Kashmiri,
        Language::Nepali,
        Language::Dogri,
        Language::Konkani,
        Language::Sindhi,
        Language::Sanskrit,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Language::English => "english",
            Language::Hindi => "hindi",
            Language::Bengali => "bengali",
            Language::Telugu => "telugu",
            Language::Marathi => "marathi",
            Language::Tamil => "tamil",
            Language::Urdu => "urdu",
            Language::Gujarati => "gujarati",
            Language::Kannada => "kannada",
            Language::Malayalam => "malayalam",
            Language::Punjabi => "punjabi",
            Language::Assamese => "assamese",
            Language::Kashmiri => "kashmiri",
            Language::Nepali => "nepali",
            Language::Dogri => "dogri",
            Language::Konkani => "konkani",
            Language::Sindhi => "sindhi",
            Language::Sanskrit => "sanskrit",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = normalize_label(s);
        if wanted.is_empty() {
            return Ok(Language::default());
        }
        Language::ALL
            .into_iter()
            .find(|l| l.as_str() == wanted)
            .ok_or_else(|| format!("Unsupported language: {}", s.trim()))
    }
}

impl TryFrom<String> for Language {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Language> for &'static str {
    fn from(value: Language) -> Self {
        value.as_str()
    }
}
