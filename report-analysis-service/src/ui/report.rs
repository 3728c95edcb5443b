//! Renders an [`AnalysisResult`] as HTML sections.

use super::html::escape;
use crate::models::{AbnormalValue, AnalysisResult, FindingStatus, KeyFinding, RiskLevel};

pub fn risk_class(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => "risk-low",
        RiskLevel::Moderate => "risk-moderate",
        RiskLevel::High => "risk-high",
        RiskLevel::Urgent => "risk-urgent",
    }
}

pub fn status_class(status: FindingStatus) -> &'static str {
    match status {
        FindingStatus::Normal => "status-normal",
        FindingStatus::Borderline => "status-borderline",
        FindingStatus::HighRisk => "status-high-risk",
    }
}

fn status_icon(status: FindingStatus) -> &'static str {
    match status {
        FindingStatus::Normal => "&#10004;",
        FindingStatus::Borderline => "&#9888;",
        FindingStatus::HighRisk => "&#10071;",
    }
}

/// Empty lists produce no section at all.
pub fn render_analysis(result: &AnalysisResult) -> String {
    let mut html = String::from(r#"<div class="analysis">"#);

    html.push_str(&format!(
        r#"<div class="card risk-banner {}"><p class="risk-label">Overall Risk Level</p><p class="risk-value">{}</p></div>"#,
        risk_class(result.risk_level),
        result.risk_level
    ));

    html.push_str(&format!(
        r#"<section class="card"><h2>Summary</h2><p>{}</p></section>"#,
        escape(&result.summary)
    ));

    if !result.key_findings.is_empty() {
        html.push_str(r#"<section class="card key-findings"><h2>Key Findings</h2>"#);
        for finding in &result.key_findings {
            html.push_str(&render_finding(finding));
        }
        html.push_str("</section>");
    }

    if !result.abnormal_values.is_empty() {
        html.push_str(
            r#"<section class="card abnormal-values"><h2>Understanding Abnormal Values</h2>"#,
        );
        for value in &result.abnormal_values {
            html.push_str(&render_abnormal_value(value));
        }
        html.push_str("</section>");
    }

    let guidance = &result.lifestyle_guidance;
    html.push_str(r#"<section class="card wellness"><h2>Wellness Recommendations</h2><div class="wellness-grid">"#);
    for (label, text, wide) in [
        ("&#128167; Hydration", &guidance.hydration, false),
        ("&#127939; Exercise", &guidance.exercise, false),
        ("&#129367; Diet", &guidance.diet, false),
        ("&#128564; Sleep", &guidance.sleep, false),
        ("&#128197; Follow-ups", &guidance.follow_ups, true),
    ] {
        html.push_str(&format!(
            r#"<div class="wellness-item{}"><p class="wellness-label">{}</p><p>{}</p></div>"#,
            if wide { " wide" } else { "" },
            label,
            escape(text)
        ));
    }
    html.push_str("</div></section>");

    if !result.doctor_questions.is_empty() {
        html.push_str(
            r#"<section class="card doctor-questions"><h2>Questions to Ask Your Doctor</h2><ol>"#,
        );
        for (index, question) in result.doctor_questions.iter().enumerate() {
            html.push_str(&format!(
                r#"<li><span class="question-number">{}</span><p>{}</p></li>"#,
                index + 1,
                escape(question)
            ));
        }
        html.push_str("</ol></section>");
    }

    html.push_str(&format!(
        r#"<section class="card disclaimer"><h3>Important Medical Disclaimer</h3><p>{}</p></section>"#,
        escape(&result.disclaimer)
    ));

    html.push_str("</div>");
    html
}

fn render_finding(finding: &KeyFinding) -> String {
    format!(
        r#"<div class="finding"><span class="finding-icon {class}">{icon}</span><div class="finding-body"><p class="finding-name">{name}</p><p class="finding-detail"><strong>Value:</strong> {value} | <strong>Reference:</strong> {range}</p></div><span class="badge {class}">{status}</span></div>"#,
        class = status_class(finding.status),
        icon = status_icon(finding.status),
        name = escape(&finding.test_name),
        value = escape(&finding.value),
        range = escape(&finding.reference_range),
        status = finding.status,
    )
}

fn render_abnormal_value(value: &AbnormalValue) -> String {
    let mut html = format!(
        r#"<div class="abnormal"><h3>{}</h3><p class="abnormal-detail"><strong>Your Value:</strong> {} | <strong>Normal Range:</strong> {}</p><p>{}</p>"#,
        escape(&value.test_name),
        escape(&value.value),
        escape(&value.reference_range),
        escape(&value.explanation)
    );

    if !value.possible_factors.is_empty() {
        html.push_str(r#"<div class="factors"><p>Common Contributing Factors:</p><ul>"#);
        for factor in &value.possible_factors {
            html.push_str(&format!("<li>{}</li>", escape(factor)));
        }
        html.push_str("</ul></div>");
    }

    html.push_str("</div>");
    html
}
