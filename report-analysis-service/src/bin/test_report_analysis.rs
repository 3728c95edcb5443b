use anyhow::{Context, Result, anyhow};
use report_analysis_service::{
    AnalysisProvider, GeminiProvider, ServiceConfig, UploadedFile, analyze_report,
    ui::render_analysis,
};
use std::path::Path;
use std::sync::Arc;

fn mime_type_for(path: &Path) -> Result<&'static str> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .ok_or_else(|| anyhow!("File has no extension: {}", path.display()))?;

    match extension.as_str() {
        "pdf" => Ok("application/pdf"),
        "png" => Ok("image/png"),
        "jpg" | "jpeg" => Ok("image/jpeg"),
        "webp" => Ok("image/webp"),
        "gif" => Ok("image/gif"),
        "heic" => Ok("image/heic"),
        other => Err(anyhow!("Unsupported extension: .{}", other)),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt().with_env_filter("info").init();

    println!("Medical Report -> Gemini -> Structured Analysis Test");
    println!("====================================================");

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 || args.len() > 3 {
        eprintln!("Usage: {} <report_file> [--html]", args[0]);
        eprintln!("Example: {} /path/to/lab_results.pdf", args[0]);
        std::process::exit(1);
    }
    let path = Path::new(&args[1]);
    let print_html = args.get(2).is_some_and(|flag| flag == "--html");

    let config = ServiceConfig::from_env()?;
    let Some(provider) = GeminiProvider::from_config(&config)? else {
        eprintln!("Please set GEMINI_API_KEY environment variable");
        std::process::exit(1);
    };
    let provider: Arc<dyn AnalysisProvider> = Arc::new(provider);

    let mime_type = mime_type_for(path)?;
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    println!("File: {} ({}, {} bytes)", path.display(), mime_type, bytes.len());
    println!("Model: {}", config.gemini_model);
    println!();

    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file = UploadedFile::new(file_name, mime_type, bytes);

    let analysis = analyze_report(Some(&provider), &file)
        .await
        .context("Analysis failed")?;

    if print_html {
        println!("{}", render_analysis(&analysis));
        return Ok(());
    }

    println!("Risk level: {}", analysis.risk_level);
    println!("Summary: {}", analysis.summary);
    println!();
    println!("Key findings ({}):", analysis.key_findings.len());
    for finding in &analysis.key_findings {
        println!(
            "   - {}: {} (ref {}) [{}]",
            finding.test_name, finding.value, finding.reference_range, finding.status
        );
    }
    println!("Abnormal values: {}", analysis.abnormal_values.len());
    println!("Doctor questions: {}", analysis.doctor_questions.len());
    println!();
    println!("{}", serde_json::to_string_pretty(&analysis)?);

    Ok(())
}
