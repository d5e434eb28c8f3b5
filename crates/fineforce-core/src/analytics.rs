//! Reference datasets for the analytics, enforcement and predictive views.
//!
//! These are curated figures rather than query results; the live list only
//! feeds [`crate::metrics`].

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RiskLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum OfficerStatus {
    #[serde(rename = "On Patrol")]
    OnPatrol,
    #[serde(rename = "Off Duty")]
    OffDuty,
    #[serde(rename = "On Break")]
    OnBreak,
}

impl fmt::Display for OfficerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OnPatrol => "On Patrol",
            Self::OffDuty => "Off Duty",
            Self::OnBreak => "On Break",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Officer {
    pub id: &'static str,
    pub name: &'static str,
    pub status: OfficerStatus,
    pub zone: &'static str,
    pub vehicle_id: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Hotspot {
    pub id: u32,
    pub location: &'static str,
    pub risk_level: RiskLevel,
    pub avg_violations_per_day: u32,
    pub common_violation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictedHotspot {
    pub id: u32,
    pub location: &'static str,
    pub predicted_risk: RiskLevel,
    pub confidence: u8,
    pub key_factors: &'static [&'static str],
    pub expected_violations: &'static [&'static str],
    pub recommended_action: &'static str,
    /// `(latitude, longitude)`.
    pub coords: (f64, f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertType {
    #[serde(rename = "SOS Button")]
    SosButton,
    #[serde(rename = "Unsafe Area Report")]
    UnsafeAreaReport,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AlertStatus {
    Active,
    Resolved,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SafetyAlert {
    pub id: &'static str,
    pub location: &'static str,
    pub timestamp: &'static str,
    pub alert_type: AlertType,
    pub status: AlertStatus,
    pub details: &'static str,
}

/// Forecast horizon for predicted hotspots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForecastWindow {
    Next4Hours,
    TomorrowAm,
    ThisWeekend,
}

impl ForecastWindow {
    pub const ALL: [ForecastWindow; 3] = [Self::Next4Hours, Self::TomorrowAm, Self::ThisWeekend];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Next4Hours => "Next 4 Hours",
            Self::TomorrowAm => "Tomorrow AM",
            Self::ThisWeekend => "This Weekend",
        }
    }

    pub fn hotspots(&self) -> &'static [PredictedHotspot] {
        match self {
            Self::Next4Hours => NEXT_4_HOURS,
            Self::TomorrowAm => TOMORROW_AM,
            Self::ThisWeekend => THIS_WEEKEND,
        }
    }
}

impl FromStr for ForecastWindow {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(['_', ' '], "-").as_str() {
            "next-4-hours" | "next4hours" | "now" => Ok(Self::Next4Hours),
            "tomorrow-am" | "tomorrow" => Ok(Self::TomorrowAm),
            "this-weekend" | "weekend" => Ok(Self::ThisWeekend),
            other => Err(format!("unknown forecast window: {other}")),
        }
    }
}

/// Violations per weekday, Monday first.
pub const WEEKLY_VIOLATIONS: [(&str, u32); 7] = [
    ("Mon", 180),
    ("Tue", 210),
    ("Wed", 250),
    ("Thu", 220),
    ("Fri", 310),
    ("Sat", 350),
    ("Sun", 290),
];

pub const VIOLATION_TYPE_SHARE: [(&str, u32); 5] = [
    ("Speeding", 400),
    ("Red Light", 300),
    ("No Parking", 180),
    ("Wrong Lane", 120),
    ("Illegal U-Turn", 80),
];

pub const OFFICERS: &[Officer] = &[
    Officer {
        id: "O-001",
        name: "Rohan Sharma",
        status: OfficerStatus::OnPatrol,
        zone: "Zone A (South Mumbai)",
        vehicle_id: "FP-101",
    },
    Officer {
        id: "O-002",
        name: "Priya Singh",
        status: OfficerStatus::OnPatrol,
        zone: "Zone B (North Delhi)",
        vehicle_id: "FP-102",
    },
    Officer {
        id: "O-003",
        name: "Amit Patel",
        status: OfficerStatus::OnBreak,
        zone: "Zone C (West Bangalore)",
        vehicle_id: "FP-103",
    },
    Officer {
        id: "O-004",
        name: "Sunita Gupta",
        status: OfficerStatus::OnPatrol,
        zone: "Zone D (East Chennai)",
        vehicle_id: "FP-104",
    },
    Officer {
        id: "O-005",
        name: "Vikram Kumar",
        status: OfficerStatus::OffDuty,
        zone: "Zone A (South Mumbai)",
        vehicle_id: "FP-105",
    },
    Officer {
        id: "O-006",
        name: "Anjali Mehta",
        status: OfficerStatus::OffDuty,
        zone: "Zone B (North Delhi)",
        vehicle_id: "FP-106",
    },
];

pub const HOTSPOTS: &[Hotspot] = &[
    Hotspot {
        id: 1,
        location: "ITO Crossing, Delhi",
        risk_level: RiskLevel::High,
        avg_violations_per_day: 25,
        common_violation: "Red Light",
    },
    Hotspot {
        id: 2,
        location: "Mumbai-Pune Expressway",
        risk_level: RiskLevel::High,
        avg_violations_per_day: 32,
        common_violation: "Speeding",
    },
    Hotspot {
        id: 3,
        location: "Select Citywalk Mall, Delhi",
        risk_level: RiskLevel::Medium,
        avg_violations_per_day: 18,
        common_violation: "No Parking",
    },
    Hotspot {
        id: 4,
        location: "Silk Board Junction, Bangalore",
        risk_level: RiskLevel::Medium,
        avg_violations_per_day: 15,
        common_violation: "Wrong Lane",
    },
    Hotspot {
        id: 5,
        location: "Koregaon Park, Pune",
        risk_level: RiskLevel::Low,
        avg_violations_per_day: 8,
        common_violation: "Illegal U-Turn",
    },
];

const NEXT_4_HOURS: &[PredictedHotspot] = &[
    PredictedHotspot {
        id: 1,
        location: "Mumbai-Pune Expressway @ Lonavala",
        predicted_risk: RiskLevel::High,
        confidence: 92,
        key_factors: &["Evening Rush Hour", "Historical Data"],
        expected_violations: &["Speeding", "Wrong Lane"],
        recommended_action: "Deploy 1 patrol unit for speed monitoring.",
        coords: (18.75, 73.4),
    },
    PredictedHotspot {
        id: 2,
        location: "ITO Crossing, Delhi",
        predicted_risk: RiskLevel::Medium,
        confidence: 85,
        key_factors: &["High Traffic Volume", "Complex Intersection"],
        expected_violations: &["Red Light", "Illegal U-Turn"],
        recommended_action: "Ensure traffic camera is fully operational.",
        coords: (28.6315, 77.2480),
    },
];

const TOMORROW_AM: &[PredictedHotspot] = &[
    PredictedHotspot {
        id: 3,
        location: "Marathahalli, Bangalore",
        predicted_risk: RiskLevel::High,
        confidence: 95,
        key_factors: &["IT Corridor Traffic", "Historical Data"],
        expected_violations: &["Speeding", "No Parking"],
        recommended_action: "Deploy 2 officers for presence and enforcement.",
        coords: (12.9569, 77.7011),
    },
    PredictedHotspot {
        id: 4,
        location: "Anna Salai, Chennai",
        predicted_risk: RiskLevel::Medium,
        confidence: 88,
        key_factors: &["Morning Commute", "Weather Forecast: Rain"],
        expected_violations: &["Red Light"],
        recommended_action: "Monitor intersection via traffic cams.",
        coords: (13.05, 80.25),
    },
    PredictedHotspot {
        id: 5,
        location: "Cyber Hub, Gurugram",
        predicted_risk: RiskLevel::Medium,
        confidence: 78,
        key_factors: &["Office Timings", "Heavy Vehicle Traffic"],
        expected_violations: &["Wrong Lane"],
        recommended_action: "Consider temporary signage for lane discipline.",
        coords: (28.4968, 77.0886),
    },
];

const THIS_WEEKEND: &[PredictedHotspot] = &[
    PredictedHotspot {
        id: 6,
        location: "Phoenix Marketcity, Pune",
        predicted_risk: RiskLevel::High,
        confidence: 93,
        key_factors: &["Weekend Shopping Peak", "Limited Parking"],
        expected_violations: &["No Parking"],
        recommended_action: "Deploy 1 patrol unit for parking enforcement.",
        coords: (18.5627, 73.9167),
    },
    PredictedHotspot {
        id: 7,
        location: "Connaught Place, Delhi",
        predicted_risk: RiskLevel::High,
        confidence: 90,
        key_factors: &["Nightlife Activity", "Historical Data (Sat PM)"],
        expected_violations: &["Illegal U-Turn", "No Parking"],
        recommended_action: "Deploy 2 officers for patrol and visibility.",
        coords: (28.6330, 77.2193),
    },
    PredictedHotspot {
        id: 8,
        location: "Bandra-Worli Sea Link, Mumbai",
        predicted_risk: RiskLevel::Medium,
        confidence: 82,
        key_factors: &["Increased Weekend Travel"],
        expected_violations: &["Speeding"],
        recommended_action: "Automated speed camera monitoring.",
        coords: (19.03, 72.82),
    },
];

pub const SAFETY_ALERTS: &[SafetyAlert] = &[
    SafetyAlert {
        id: "SA-001",
        location: "Near Cyber Hub, Gurugram",
        timestamp: "2 min ago",
        alert_type: AlertType::SosButton,
        status: AlertStatus::Active,
        details: "User triggered SOS. Last known location pinged.",
    },
    SafetyAlert {
        id: "SA-002",
        location: "Koregaon Park, Pune",
        timestamp: "15 min ago",
        alert_type: AlertType::UnsafeAreaReport,
        status: AlertStatus::Active,
        details: "Report of suspicious activity near the park entrance.",
    },
    SafetyAlert {
        id: "SA-003",
        location: "Anjuna Beach, Goa",
        timestamp: "45 min ago",
        alert_type: AlertType::SosButton,
        status: AlertStatus::Resolved,
        details: "User confirmed safety. Accidental trigger.",
    },
    SafetyAlert {
        id: "SA-004",
        location: "Sector 18, Noida",
        timestamp: "1 hour ago",
        alert_type: AlertType::UnsafeAreaReport,
        status: AlertStatus::Active,
        details: "Reports of street lights not working in alleyway.",
    },
];

/// Active alerts first, preserving order within each group.
pub fn alerts_by_urgency() -> Vec<&'static SafetyAlert> {
    let (mut active, resolved): (Vec<_>, Vec<_>) = SAFETY_ALERTS
        .iter()
        .partition(|a| a.status == AlertStatus::Active);
    active.extend(resolved);
    active
}
