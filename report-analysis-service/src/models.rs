use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: String,
    pub key_findings: Vec<KeyFinding>,
    pub abnormal_values: Vec<AbnormalValue>,
    pub risk_level: RiskLevel,
    pub lifestyle_guidance: LifestyleGuidance,
    pub doctor_questions: Vec<String>,
    pub disclaimer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyFinding {
    pub test_name: String,
    pub value: String,
    pub reference_range: String,
    pub status: FindingStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbnormalValue {
    pub test_name: String,
    pub value: String,
    pub reference_range: String,
    pub explanation: String,
    pub possible_factors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LifestyleGuidance {
    pub hydration: String,
    pub exercise: String,
    pub diet: String,
    pub sleep: String,
    pub follow_ups: String,
}

/// Overall severity of a report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
    Urgent,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 4] = [
        RiskLevel::Low,
        RiskLevel::Moderate,
        RiskLevel::High,
        RiskLevel::Urgent,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Moderate => "Moderate",
            RiskLevel::High => "High",
            RiskLevel::Urgent => "Urgent",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|level| level.as_str() == value)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of a single lab finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FindingStatus {
    Normal,
    Borderline,
    #[serde(rename = "High-Risk")]
    HighRisk,
}

impl FindingStatus {
    pub const ALL: [FindingStatus; 3] = [
        FindingStatus::Normal,
        FindingStatus::Borderline,
        FindingStatus::HighRisk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FindingStatus::Normal => "Normal",
            FindingStatus::Borderline => "Borderline",
            FindingStatus::HighRisk => "High-Risk",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|status| status.as_str() == value)
    }
}

impl fmt::Display for FindingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file received in a single upload request. Never written anywhere.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Bytes,
}

impl UploadedFile {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: impl Into<Bytes>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AnalysisResponse {
    pub analysis: AnalysisResult,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_status_uses_hyphenated_wire_name() {
        let json = serde_json::to_string(&FindingStatus::HighRisk).unwrap();
        assert_eq!(json, "\"High-Risk\"");

        let parsed: FindingStatus = serde_json::from_str("\"High-Risk\"").unwrap();
        assert_eq!(parsed, FindingStatus::HighRisk);
    }

    #[test]
    fn enum_parse_is_exact() {
        assert_eq!(RiskLevel::parse("Urgent"), Some(RiskLevel::Urgent));
        assert_eq!(RiskLevel::parse("urgent"), None);
        assert_eq!(FindingStatus::parse("Borderline"), Some(FindingStatus::Borderline));
        assert_eq!(FindingStatus::parse("HighRisk"), None);
    }

    #[test]
    fn analysis_result_serializes_fields_in_contract_order() {
        let result = AnalysisResult {
            summary: "s".to_string(),
            key_findings: vec![],
            abnormal_values: vec![],
            risk_level: RiskLevel::Low,
            lifestyle_guidance: LifestyleGuidance {
                hydration: "h".to_string(),
                exercise: "e".to_string(),
                diet: "d".to_string(),
                sleep: "z".to_string(),
                follow_ups: "f".to_string(),
            },
            doctor_questions: vec![],
            disclaimer: "x".to_string(),
        };

        let json = serde_json::to_string(&result).unwrap();
        let order = [
            "\"summary\"",
            "\"key_findings\"",
            "\"abnormal_values\"",
            "\"risk_level\"",
            "\"lifestyle_guidance\"",
            "\"doctor_questions\"",
            "\"disclaimer\"",
        ];
        let positions: Vec<usize> = order.iter().map(|k| json.find(k).unwrap()).collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }
}
