//! Violation records and the fixed type → fine table.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Local, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use crate::analysis::Confidence;

/// The closed set of violation types an officer can issue a fine for.
///
/// Serialised as the human-readable label (`"Red Light"`, `"No Helmet (Driver)"`),
/// which is also what the AI adapter and the database columns carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationType {
    #[serde(rename = "Speeding")]
    Speeding,
    #[serde(rename = "Red Light")]
    RedLight,
    #[serde(rename = "No Parking")]
    NoParking,
    #[serde(rename = "Wrong Lane")]
    WrongLane,
    #[serde(rename = "Illegal U-Turn")]
    IllegalUTurn,
    #[serde(rename = "No Helmet (Driver)")]
    NoHelmetDriver,
    #[serde(rename = "No Helmet (Pillion)")]
    NoHelmetPillion,
    #[serde(rename = "Triple Riding")]
    TripleRiding,
}

impl ViolationType {
    pub const ALL: [ViolationType; 8] = [
        Self::Speeding,
        Self::RedLight,
        Self::NoParking,
        Self::WrongLane,
        Self::IllegalUTurn,
        Self::NoHelmetDriver,
        Self::NoHelmetPillion,
        Self::TripleRiding,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Speeding => "Speeding",
            Self::RedLight => "Red Light",
            Self::NoParking => "No Parking",
            Self::WrongLane => "Wrong Lane",
            Self::IllegalUTurn => "Illegal U-Turn",
            Self::NoHelmetDriver => "No Helmet (Driver)",
            Self::NoHelmetPillion => "No Helmet (Pillion)",
            Self::TripleRiding => "Triple Riding",
        }
    }

    /// Statutory fine in INR.
    pub fn fine(&self) -> u32 {
        match self {
            Self::Speeding => 500,
            Self::RedLight => 1000,
            Self::NoParking => 300,
            Self::WrongLane => 400,
            Self::IllegalUTurn => 600,
            Self::NoHelmetDriver | Self::NoHelmetPillion => 800,
            Self::TripleRiding => 1200,
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown violation type: {0}")]
pub struct UnknownViolationType(pub String);

impl FromStr for ViolationType {
    type Err = UnknownViolationType;

    /// Matches labels case-insensitively and ignoring spaces, hyphens and
    /// parentheses, so `red-light` and `no helmet driver` both resolve.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = squash(s);
        Self::ALL
            .into_iter()
            .find(|t| squash(t.label()) == wanted)
            .ok_or_else(|| UnknownViolationType(s.to_string()))
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Payment state of an issued violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ViolationStatus {
    Pending,
    Paid,
    Overdue,
}

impl ViolationStatus {
    pub const ALL: [ViolationStatus; 3] = [Self::Pending, Self::Paid, Self::Overdue];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
            Self::Overdue => "Overdue",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::Paid => "The fine for this violation has been successfully paid.",
            Self::Pending => "The violation has been issued and is awaiting payment.",
            Self::Overdue => "The payment deadline has passed and the fine is now overdue.",
        }
    }
}

impl fmt::Display for ViolationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown violation status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for ViolationStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|st| st.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownStatus(s.to_string()))
    }
}

/// A persisted violation record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Violation {
    pub id: String,
    pub vehicle_number: String,
    pub violation_type: ViolationType,
    pub date: DateTime<Utc>,
    pub location: String,
    pub status: ViolationStatus,
    pub image_url: String,
    pub fine: u32,
    pub description: String,
    pub confidence_score: Confidence,
    pub contributing_factors: Vec<String>,
}

impl Violation {
    /// Local timestamp in the dashboard's `MM/DD/YYYY hh:mm AM` form.
    pub fn display_date(&self) -> String {
        self.display_date_in(&Local)
    }

    pub fn display_date_in<Tz: TimeZone>(&self, tz: &Tz) -> String
    where
        Tz::Offset: fmt::Display,
    {
        self.date
            .with_timezone(tz)
            .format("%m/%d/%Y %I:%M %p")
            .to_string()
    }
}

/// Fields the save step submits; the store assigns id, date and status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewViolation {
    pub vehicle_number: String,
    pub violation_type: ViolationType,
    pub location: String,
    pub image_url: String,
    pub fine: u32,
    pub description: String,
    pub confidence_score: Confidence,
    pub contributing_factors: Vec<String>,
}

impl NewViolation {
    /// Materialise the record as the store would after an insert.
    pub fn into_violation(self, id: String, date: DateTime<Utc>) -> Violation {
        Violation {
            id,
            vehicle_number: self.vehicle_number,
            violation_type: self.violation_type,
            date,
            location: self.location,
            status: ViolationStatus::Pending,
            image_url: self.image_url,
            fine: self.fine,
            description: self.description,
            confidence_score: self.confidence_score,
            contributing_factors: self.contributing_factors,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fine_table_matches_schedule() {
        let fines: Vec<u32> = ViolationType::ALL.iter().map(|t| t.fine()).collect();
        assert_eq!(fines, vec![500, 1000, 300, 400, 600, 800, 800, 1200]);
    }

    #[test]
    fn labels_serialise_verbatim() {
        let json = serde_json::to_string(&ViolationType::NoHelmetPillion).unwrap();
        assert_eq!(json, "\"No Helmet (Pillion)\"");
        let parsed: ViolationType = serde_json::from_str("\"Illegal U-Turn\"").unwrap();
        assert_eq!(parsed, ViolationType::IllegalUTurn);
    }

    #[test]
    fn parses_loose_labels() {
        assert_eq!("red-light".parse::<ViolationType>().unwrap(), ViolationType::RedLight);
        assert_eq!(
            "no helmet driver".parse::<ViolationType>().unwrap(),
            ViolationType::NoHelmetDriver
        );
        assert!("Unclear".parse::<ViolationType>().is_err());
    }

    #[test]
    fn status_parses_case_insensitively() {
        assert_eq!("paid".parse::<ViolationStatus>().unwrap(), ViolationStatus::Paid);
        assert_eq!(" OVERDUE ".parse::<ViolationStatus>().unwrap(), ViolationStatus::Overdue);
        assert!("cancelled".parse::<ViolationStatus>().is_err());
    }

    #[test]
    fn display_date_uses_the_given_zone() {
        use chrono::FixedOffset;

        let new = NewViolation {
            vehicle_number: "DL 3C AB 0001".into(),
            violation_type: ViolationType::RedLight,
            location: "ITO Crossing".into(),
            image_url: String::new(),
            fine: 1000,
            description: String::new(),
            confidence_score: Confidence::new(90).unwrap(),
            contributing_factors: vec![],
        };
        let date = Utc.with_ymd_and_hms(2026, 3, 10, 20, 0, 0).unwrap();
        let v = new.into_violation("late".into(), date);
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        assert_eq!(v.display_date_in(&Utc), "03/10/2026 08:00 PM");
        assert_eq!(v.display_date_in(&ist), "03/11/2026 01:30 AM");
    }

    #[test]
    fn new_violation_is_created_pending() {
        let new = NewViolation {
            vehicle_number: "MH 12 AB 1234".into(),
            violation_type: ViolationType::Speeding,
            location: "Not Detected".into(),
            image_url: "https://cdn/x.jpg".into(),
            fine: 500,
            description: "Car over the limit.".into(),
            confidence_score: Confidence::new(88).unwrap(),
            contributing_factors: vec!["Open road".into()],
        };
        let v = new.into_violation("abc".into(), Utc::now());
        assert_eq!(v.status, ViolationStatus::Pending);
        assert_eq!(v.id, "abc");
        assert_eq!(v.fine, 500);
    }
}
