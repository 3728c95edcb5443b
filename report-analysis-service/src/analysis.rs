use std::sync::Arc;
use tracing::{error, info};

use crate::error::{AnalysisError, Result};
use crate::extract::extract_content;
use crate::models::{AnalysisResult, UploadedFile};
use crate::provider::{AnalysisProvider, GenerationRequest};
use crate::validation::parse_analysis;

/// Upload → extracted content → provider completion → validated result.
///
/// `provider` is `None` when the service has no API key; that check runs
/// before the file is inspected.
pub async fn analyze_report(
    provider: Option<&Arc<dyn AnalysisProvider>>,
    file: &UploadedFile,
) -> Result<AnalysisResult> {
    let provider = provider.ok_or_else(|| {
        error!("Analysis requested but GEMINI_API_KEY is not configured");
        AnalysisError::ApiKeyNotConfigured
    })?;

    let content = extract_content(file)?;
    info!(
        file_name = %file.file_name,
        mime_type = %file.mime_type,
        size_bytes = file.bytes.len(),
        content_kind = content.kind(),
        "Submitting report for analysis"
    );

    let request = GenerationRequest::for_report(content);
    let completion = provider
        .generate(&request)
        .await?
        .ok_or(AnalysisError::EmptyCompletion)?;

    let analysis = parse_analysis(&completion)?;
    info!(
        risk_level = %analysis.risk_level,
        key_findings = analysis.key_findings.len(),
        abnormal_values = analysis.abnormal_values.len(),
        "Analysis completed"
    );

    Ok(analysis)
}
