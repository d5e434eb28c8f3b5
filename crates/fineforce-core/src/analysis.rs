//! Transient AI assessment of an evidence image, edited by the officer before saving.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::validate::ValidationError;
use crate::violation::{NewViolation, ViolationType};

/// Confidence below this value raises the low-confidence advisory.
pub const LOW_CONFIDENCE_THRESHOLD: u8 = 70;

const UNCLEAR: &str = "Unclear";

/// Violation type as assessed by the AI: a concrete type, or `Unclear` when the
/// image shows no obvious violation. `Unclear` must be resolved before saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum AssessedType {
    Concrete(ViolationType),
    Unclear,
}

impl AssessedType {
    pub fn concrete(&self) -> Option<ViolationType> {
        match self {
            Self::Concrete(t) => Some(*t),
            Self::Unclear => None,
        }
    }

    pub fn is_unclear(&self) -> bool {
        matches!(self, Self::Unclear)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Concrete(t) => t.label(),
            Self::Unclear => UNCLEAR,
        }
    }
}

impl fmt::Display for AssessedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl TryFrom<String> for AssessedType {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s == UNCLEAR {
            return Ok(Self::Unclear);
        }
        // Exact labels only: this is the AI's enumerated schema field.
        ViolationType::ALL
            .into_iter()
            .find(|t| t.label() == s)
            .map(Self::Concrete)
            .ok_or_else(|| format!("unexpected violationType {s:?}"))
    }
}

impl From<AssessedType> for String {
    fn from(t: AssessedType) -> Self {
        t.label().to_string()
    }
}

impl From<ViolationType> for AssessedType {
    fn from(t: ViolationType) -> Self {
        Self::Concrete(t)
    }
}

/// Integer confidence score in `[0, 100]`.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Confidence(u8);

impl Confidence {
    pub fn new(value: u8) -> Option<Self> {
        (value <= 100).then_some(Self(value))
    }

    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<i64> for Confidence {
    type Error = String;

    fn try_from(v: i64) -> Result<Self, Self::Error> {
        u8::try_from(v)
            .ok()
            .and_then(Self::new)
            .ok_or_else(|| format!("confidence score {v} outside 0..=100"))
    }
}

impl From<Confidence> for u8 {
    fn from(c: Confidence) -> Self {
        c.0
    }
}

/// Structured response of the image-analysis adapter, editable during review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub vehicle_number: String,
    pub violation_type: AssessedType,
    pub fine: u32,
    pub location: String,
    pub description: String,
    pub confidence_score: Confidence,
    pub contributing_factors: Vec<String>,
}

impl AnalysisResult {
    /// Select a violation type and re-derive the fine from the table,
    /// overwriting any manual fine edit.
    pub fn set_violation_type(&mut self, t: ViolationType) {
        self.violation_type = AssessedType::Concrete(t);
        self.fine = t.fine();
    }

    pub fn is_low_confidence(&self) -> bool {
        !self.violation_type.is_unclear()
            && self.confidence_score.value() < LOW_CONFIDENCE_THRESHOLD
    }

    /// Build the insert payload. Fails while the type is still `Unclear`.
    pub fn to_new_violation(&self, image_url: String) -> Result<NewViolation, ValidationError> {
        let violation_type = self
            .violation_type
            .concrete()
            .ok_or(ValidationError::UnresolvedType)?;
        Ok(NewViolation {
            vehicle_number: self.vehicle_number.clone(),
            violation_type,
            location: self.location.clone(),
            image_url,
            fine: self.fine,
            description: self.description.clone(),
            confidence_score: self.confidence_score,
            contributing_factors: self.contributing_factors.clone(),
        })
    }
}
