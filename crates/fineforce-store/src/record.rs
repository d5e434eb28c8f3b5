//! Row shape of the `violations` table (snake_case columns).

use chrono::{DateTime, Utc};
use fineforce_core::{Confidence, Violation, ViolationStatus, ViolationType};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ViolationRow {
    pub id: String,
    pub vehicle_number: String,
    pub violation_type: ViolationType,
    pub date: DateTime<Utc>,
    pub location: String,
    pub status: ViolationStatus,
    pub image_url: String,
    pub fine: u32,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub confidence_score: Option<Confidence>,
    #[serde(default)]
    pub contributing_factors: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

impl ViolationRow {
    pub fn from_violation(v: &Violation, user_id: Option<String>) -> Self {
        Self {
            id: v.id.clone(),
            vehicle_number: v.vehicle_number.clone(),
            violation_type: v.violation_type,
            date: v.date,
            location: v.location.clone(),
            status: v.status,
            image_url: v.image_url.clone(),
            fine: v.fine,
            description: Some(v.description.clone()),
            confidence_score: Some(v.confidence_score),
            contributing_factors: Some(v.contributing_factors.clone()),
            user_id,
        }
    }
}

impl From<ViolationRow> for Violation {
    fn from(row: ViolationRow) -> Self {
        Violation {
            id: row.id,
            vehicle_number: row.vehicle_number,
            violation_type: row.violation_type,
            date: row.date,
            location: row.location,
            status: row.status,
            image_url: row.image_url,
            fine: row.fine,
            description: row.description.unwrap_or_default(),
            confidence_score: row.confidence_score.unwrap_or_default(),
            contributing_factors: row.contributing_factors.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn row_with_missing_optional_columns() {
        let json = r#"{
            "id": "7f1c",
            "vehicle_number": "MH 12 AB 1234",
            "violation_type": "Red Light",
            "date": "2026-03-10T09:30:00+00:00",
            "location": "ITO Crossing, Delhi",
            "status": "Overdue",
            "image_url": "https://cdn/x.jpg",
            "fine": 1000,
            "description": null
        }"#;
        let row: ViolationRow = serde_json::from_str(json).unwrap();
        let v: Violation = row.into();
        assert_eq!(v.violation_type, ViolationType::RedLight);
        assert_eq!(v.status, ViolationStatus::Overdue);
        assert_eq!(v.description, "");
        assert!(v.contributing_factors.is_empty());
        assert_eq!(v.display_date_in(&chrono::Utc), "03/10/2026 09:30 AM");
    }

    #[test]
    fn row_with_out_of_range_confidence_is_rejected() {
        let row = |score: i64| {
            serde_json::json!({
                "id": "7f1c",
                "vehicle_number": "MH 12 AB 1234",
                "violation_type": "Speeding",
                "date": "2026-03-10T09:30:00+00:00",
                "location": "x",
                "status": "Pending",
                "image_url": "x",
                "fine": 500,
                "confidence_score": score
            })
        };
        assert!(serde_json::from_value::<ViolationRow>(row(140)).is_err());
        assert!(serde_json::from_value::<ViolationRow>(row(-1)).is_err());
        let ok: Violation = serde_json::from_value::<ViolationRow>(row(100)).unwrap().into();
        assert_eq!(ok.confidence_score.value(), 100);
    }

    #[test]
    fn insert_row_serialises_snake_case_with_owner() {
        let v = fineforce_core::NewViolation {
            vehicle_number: "KA 01 XY 0001".into(),
            violation_type: ViolationType::TripleRiding,
            location: "Not Detected".into(),
            image_url: "https://cdn/y.jpg".into(),
            fine: 1200,
            description: "Three riders on one scooter.".into(),
            confidence_score: Confidence::new(77).unwrap(),
            contributing_factors: vec!["No enforcement".into()],
        }
        .into_violation("id-1".into(), Utc::now());
        let row = ViolationRow::from_violation(&v, Some("user-9".into()));
        let json = serde_json::to_value(row).unwrap();
        assert_eq!(json["violation_type"], "Triple Riding");
        assert_eq!(json["status"], "Pending");
        assert_eq!(json["user_id"], "user-9");
        assert_eq!(json["contributing_factors"][0], "No enforcement");
    }
}
