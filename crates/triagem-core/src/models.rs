//! Data models for Triagem
//!
//! Defines the application record as stored in the remote table, plus
//! the draft/patch shapes used for writes. The server is authoritative
//! for ids, timestamps, and the final row shape after any write.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Review status of an application
///
/// Transitions only ever go `Pending -> Approved` or `Pending -> Rejected`;
/// the remote store rejects anything else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Pending,
    Approved,
    Rejected,
}

impl Status {
    /// Whether this status is a reviewer decision (a valid target for
    /// a status update). `Pending` is the initial state only.
    pub fn is_decision(&self) -> bool {
        matches!(self, Status::Approved | Status::Rejected)
    }

    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Status::Pending => "Pendente",
            Status::Approved => "Aprovada",
            Status::Rejected => "Rejeitada",
        }
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Status::Pending => "pending",
            Status::Approved => "approved",
            Status::Rejected => "rejected",
        };
        write!(f, "{}", s)
    }
}

impl std::str::FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Status::Pending),
            "approved" => Ok(Status::Approved),
            "rejected" => Ok(Status::Rejected),
            other => Err(format!("unknown status '{}'", other)),
        }
    }
}

/// Declared availability of a candidate
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    FullTime,
    PartTime,
    Weekends,
    Flexible,
}

impl Availability {
    /// Display label
    pub fn label(&self) -> &'static str {
        match self {
            Availability::FullTime => "Tempo Integral",
            Availability::PartTime => "Meio Período",
            Availability::Weekends => "Fins de Semana",
            Availability::Flexible => "Flexível",
        }
    }
}

/// One application submission as stored in the remote table
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Application {
    /// Server-assigned unique identifier (opaque)
    pub id: String,
    /// Candidate name
    pub name: String,
    /// Candidate age
    pub age: u8,
    /// Contact email
    pub email: String,
    /// Phone / messaging contact
    pub contact: String,
    /// Region code (see [`region_label`])
    pub region: String,
    /// Optional photo URL
    pub photo_url: Option<String>,
    /// Review status
    pub status: Status,
    /// Whether the candidate reports prior experience
    pub has_prior_experience: Option<bool>,
    /// Free-text motivation
    pub motivation: Option<String>,
    /// Declared availability
    pub availability: Option<Availability>,
    /// When the application was submitted
    pub submitted_at: DateTime<Utc>,
    /// When the row was last updated
    pub updated_at: DateTime<Utc>,
}

/// Draft for creating a new application
///
/// The server assigns `id`, `status` (pending) and both timestamps.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NewApplication {
    pub name: String,
    pub age: u8,
    pub email: String,
    pub contact: String,
    pub region: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub has_prior_experience: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability: Option<Availability>,
}

/// Partial update to an existing application
///
/// Unset fields are left untouched by the server; the server merges
/// and returns the full updated row.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ApplicationPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub motivation: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl ApplicationPatch {
    /// Status-change patch, stamped with the current time
    pub fn status(status: Status) -> Self {
        Self {
            status: Some(status),
            motivation: None,
            updated_at: Utc::now(),
        }
    }
}

/// Display label for a region code
///
/// Unknown codes fall back to the raw code string.
pub fn region_label(code: &str) -> &str {
    match code {
        "cabo-delgado" => "Cabo Delgado",
        "gaza" => "Gaza",
        "inhambane" => "Inhambane",
        "manica" => "Manica",
        "maputo" => "Maputo",
        "maputo-cidade" => "Maputo (Cidade)",
        "nampula" => "Nampula",
        "niassa" => "Niassa",
        "sofala" => "Sofala",
        "tete" => "Tete",
        "zambezia" => "Zambézia",
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Application {
        Application {
            id: "a1".to_string(),
            name: "Ana Silva".to_string(),
            age: 24,
            email: "ana@example.com".to_string(),
            contact: "+258 84 000 0000".to_string(),
            region: "sofala".to_string(),
            photo_url: None,
            status: Status::Pending,
            has_prior_experience: Some(true),
            motivation: Some("Quero ajudar".to_string()),
            availability: Some(Availability::Weekends),
            submitted_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_status_is_decision() {
        assert!(!Status::Pending.is_decision());
        assert!(Status::Approved.is_decision());
        assert!(Status::Rejected.is_decision());
    }

    #[test]
    fn test_status_parse() {
        assert_eq!("approved".parse::<Status>().unwrap(), Status::Approved);
        assert!("aprovada".parse::<Status>().is_err());
    }

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_string(&Status::Pending).unwrap(), "\"pending\"");
        let s: Status = serde_json::from_str("\"rejected\"").unwrap();
        assert_eq!(s, Status::Rejected);
    }

    #[test]
    fn test_region_label_known() {
        assert_eq!(region_label("maputo-cidade"), "Maputo (Cidade)");
        assert_eq!(region_label("zambezia"), "Zambézia");
    }

    #[test]
    fn test_region_label_fallback() {
        // Unknown codes pass through unchanged
        assert_eq!(region_label("ilha-de-mocambique"), "ilha-de-mocambique");
    }

    #[test]
    fn test_availability_labels() {
        assert_eq!(Availability::PartTime.label(), "Meio Período");
        assert_eq!(Availability::Flexible.label(), "Flexível");
    }

    #[test]
    fn test_application_serialization() {
        let app = sample();
        let json = serde_json::to_string(&app).unwrap();
        let back: Application = serde_json::from_str(&json).unwrap();
        assert_eq!(app, back);
    }

    #[test]
    fn test_patch_skips_unset_fields() {
        let patch = ApplicationPatch::status(Status::Approved);
        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["status"], "approved");
        assert!(json.get("motivation").is_none());
        assert!(json.get("updated_at").is_some());
    }
}
