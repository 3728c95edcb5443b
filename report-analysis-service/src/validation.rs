//! Validation boundary between provider output and the rest of the service.
//!
//! The provider is only asked, not forced, to follow the result schema. Its
//! text is parsed into an untyped document first and then checked field by
//! field; any violation becomes [`AnalysisError::InvalidProviderOutput`] naming
//! the offending JSON path.

use serde_json::{Map, Value};

use crate::error::{AnalysisError, Result};
use crate::models::{
    AbnormalValue, AnalysisResult, FindingStatus, KeyFinding, LifestyleGuidance, RiskLevel,
};

/// Parse and validate the raw completion text.
pub fn parse_analysis(text: &str) -> Result<AnalysisResult> {
    let document: Value = serde_json::from_str(text.trim())
        .map_err(|e| AnalysisError::InvalidProviderOutput(format!("not valid JSON ({})", e)))?;
    validate_analysis(&document)
}

pub fn validate_analysis(document: &Value) -> Result<AnalysisResult> {
    let root = as_object(document, "$")?;

    Ok(AnalysisResult {
        summary: required_string(root, "summary", "summary")?,
        key_findings: list(root, "key_findings", "key_findings", key_finding)?,
        abnormal_values: list(root, "abnormal_values", "abnormal_values", abnormal_value)?,
        risk_level: risk_level(root)?,
        lifestyle_guidance: lifestyle_guidance(root)?,
        doctor_questions: list(root, "doctor_questions", "doctor_questions", |v, path| {
            string_value(v, path)
        })?,
        disclaimer: required_string(root, "disclaimer", "disclaimer")?,
    })
}

fn invalid(path: &str, message: &str) -> AnalysisError {
    AnalysisError::InvalidProviderOutput(format!("{}: {}", path, message))
}

fn as_object<'a>(value: &'a Value, path: &str) -> Result<&'a Map<String, Value>> {
    value
        .as_object()
        .ok_or_else(|| invalid(path, "expected an object"))
}

fn string_value(value: &Value, path: &str) -> Result<String> {
    value
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| invalid(path, "expected a string"))
}

/// Measured values are text in the contract, but models often emit bare numbers.
fn text_or_number(value: &Value, path: &str) -> Result<String> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(invalid(path, "expected a string")),
    }
}

fn field<'a>(object: &'a Map<String, Value>, key: &str, path: &str) -> Result<&'a Value> {
    match object.get(key) {
        Some(Value::Null) | None => Err(invalid(path, "missing required field")),
        Some(value) => Ok(value),
    }
}

fn required_string(object: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    string_value(field(object, key, path)?, path)
}

fn required_text(object: &Map<String, Value>, key: &str, path: &str) -> Result<String> {
    text_or_number(field(object, key, path)?, path)
}

/// Absent or null lists normalize to empty; anything else must be an array.
fn list<T, F>(object: &Map<String, Value>, key: &str, path: &str, item: F) -> Result<Vec<T>>
where
    F: Fn(&Value, &str) -> Result<T>,
{
    match object.get(key) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(items)) => items
            .iter()
            .enumerate()
            .map(|(i, v)| item(v, &format!("{}[{}]", path, i)))
            .collect(),
        Some(_) => Err(invalid(path, "expected an array")),
    }
}

fn risk_level(root: &Map<String, Value>) -> Result<RiskLevel> {
    let raw = required_string(root, "risk_level", "risk_level")?;
    RiskLevel::parse(&raw)
        .ok_or_else(|| invalid("risk_level", "expected one of Low, Moderate, High, Urgent"))
}

fn finding_status(object: &Map<String, Value>, path: &str) -> Result<FindingStatus> {
    let raw = required_string(object, "status", path)?;
    FindingStatus::parse(&raw)
        .ok_or_else(|| invalid(path, "expected one of Normal, Borderline, High-Risk"))
}

fn key_finding(value: &Value, path: &str) -> Result<KeyFinding> {
    let object = as_object(value, path)?;
    Ok(KeyFinding {
        test_name: required_string(object, "test_name", &format!("{}.test_name", path))?,
        value: required_text(object, "value", &format!("{}.value", path))?,
        reference_range: required_text(
            object,
            "reference_range",
            &format!("{}.reference_range", path),
        )?,
        status: finding_status(object, &format!("{}.status", path))?,
    })
}

fn abnormal_value(value: &Value, path: &str) -> Result<AbnormalValue> {
    let object = as_object(value, path)?;
    let factors_path = format!("{}.possible_factors", path);
    Ok(AbnormalValue {
        test_name: required_string(object, "test_name", &format!("{}.test_name", path))?,
        value: required_text(object, "value", &format!("{}.value", path))?,
        reference_range: required_text(
            object,
            "reference_range",
            &format!("{}.reference_range", path),
        )?,
        explanation: required_string(object, "explanation", &format!("{}.explanation", path))?,
        possible_factors: list(object, "possible_factors", &factors_path, |v, p| {
            string_value(v, p)
        })?,
    })
}

fn lifestyle_guidance(root: &Map<String, Value>) -> Result<LifestyleGuidance> {
    let path = "lifestyle_guidance";
    let object = as_object(field(root, path, path)?, path)?;
    let text = |key: &str| required_string(object, key, &format!("{}.{}", path, key));
    Ok(LifestyleGuidance {
        hydration: text("hydration")?,
        exercise: text("exercise")?,
        diet: text("diet")?,
        sleep: text("sleep")?,
        follow_ups: text("follow_ups")?,
    })
}
