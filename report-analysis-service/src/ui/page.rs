use thiserror::Error;

use super::html::escape;
use super::report::render_analysis;
use super::upload::{SelectedFile, UploadEvent, UploadZone};
use crate::models::AnalysisResult;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransitionError {
    #[error("an analysis is already in progress")]
    Busy,
    #[error("reset the current result before starting a new analysis")]
    ResultShown,
    #[error("no analysis is in progress")]
    NotAnalyzing,
}

/// Page lifecycle: `Idle → Analyzing → (Result | Error)`, reset back to `Idle`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PageState {
    #[default]
    Idle,
    Analyzing(SelectedFile),
    Result(AnalysisResult),
    Error {
        message: String,
        last_file: Option<SelectedFile>,
    },
}

impl PageState {
    pub fn is_busy(&self) -> bool {
        matches!(self, PageState::Analyzing(_))
    }

    /// Starting from `Error` discards the previous message.
    pub fn begin(&mut self, file: SelectedFile) -> Result<(), TransitionError> {
        match self {
            PageState::Analyzing(_) => Err(TransitionError::Busy),
            PageState::Result(_) => Err(TransitionError::ResultShown),
            PageState::Idle | PageState::Error { .. } => {
                *self = PageState::Analyzing(file);
                Ok(())
            }
        }
    }

    pub fn complete(
        &mut self,
        outcome: Result<AnalysisResult, String>,
    ) -> Result<(), TransitionError> {
        let PageState::Analyzing(file) = self else {
            return Err(TransitionError::NotAnalyzing);
        };
        let last_file = Some(file.clone());
        *self = match outcome {
            Ok(result) => PageState::Result(result),
            Err(message) => PageState::Error { message, last_file },
        };
        Ok(())
    }

    /// "Try again" / "Analyze Another Report". Ignored while analyzing.
    pub fn reset(&mut self) {
        if !self.is_busy() {
            *self = PageState::Idle;
        }
    }

    fn upload_zone(&self) -> UploadZone {
        let mut zone = UploadZone::new();
        let file = match self {
            PageState::Analyzing(file) => Some(file),
            PageState::Error { last_file, .. } => last_file.as_ref(),
            _ => None,
        };
        if let Some(file) = file {
            zone.handle(UploadEvent::Choose(vec![file.clone()]), |_| {});
        }
        zone.set_busy(self.is_busy());
        zone
    }
}

pub fn render_page(state: &PageState) -> String {
    let mut html = String::from("<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">");
    html.push_str(r#"<meta name="viewport" content="width=device-width, initial-scale=1">"#);
    html.push_str("<title>HealthScan AI</title>");
    html.push_str(&format!("<style>{}</style></head><body>", STYLESHEET));

    html.push_str(
        r#"<header><div class="brand"><div class="logo">&#9877;</div><div><h1>HealthScan AI</h1><p>Educational Medical Report Analysis</p></div></div></header><main>"#,
    );

    match state {
        PageState::Result(result) => {
            html.push_str(
                r#"<a class="back" href="/">&larr; <span>Analyze Another Report</span></a>"#,
            );
            html.push_str(&render_analysis(result));
        }
        _ => html.push_str(&render_upload_view(state)),
    }

    html.push_str(
        r#"</main><footer><p>HealthScan AI is for educational and informational purposes only. Always consult with qualified healthcare professionals for medical advice.</p></footer>"#,
    );
    html.push_str(&format!("<script>{}</script></body></html>", SCRIPT));
    html
}

fn render_upload_view(state: &PageState) -> String {
    let mut html = String::from(
        r#"<div class="hero"><h2>Understand Your Health Reports</h2><p>Upload your medical reports and get a clear, easy-to-understand analysis powered by AI. For educational purposes only.</p></div>"#,
    );

    html.push_str(&state.upload_zone().render());

    let loading_hidden = if state.is_busy() { "" } else { " hidden" };
    html.push_str(&format!(
        r#"<div id="loading" class="loading{}"><div class="spinner"></div><p class="loading-title">Analyzing your report...</p><p class="loading-hint">This may take 10-30 seconds</p></div>"#,
        loading_hidden
    ));

    if let PageState::Error { message, .. } = state {
        html.push_str(&format!(
            r#"<div class="error-panel"><p>Error: {}</p><a href="/">Try again</a></div>"#,
            escape(message)
        ));
    }

    html.push_str(concat!(
        r#"<div class="features">"#,
        r#"<div class="feature"><h3>Clear Explanations</h3><p>Get simple, easy-to-understand explanations of your test results</p></div>"#,
        r#"<div class="feature"><h3>Lifestyle Guidance</h3><p>Receive personalized wellness recommendations based on your results</p></div>"#,
        r#"<div class="feature"><h3>Doctor Questions</h3><p>Get suggested questions to ask your healthcare provider</p></div>"#,
        "</div>",
    ));
    html
}

const STYLESHEET: &str = r#"
*{box-sizing:border-box}body{margin:0;font-family:system-ui,sans-serif;color:#1f2937;background:linear-gradient(135deg,#eff6ff,#fff,#faf5ff)}
header{border-bottom:1px solid #e5e7eb;background:#ffffffcc;padding:16px 24px}.brand{display:flex;gap:12px;align-items:center}
.logo{width:40px;height:40px;border-radius:8px;background:linear-gradient(135deg,#3b82f6,#9333ea);color:#fff;display:flex;align-items:center;justify-content:center}
header h1{margin:0;font-size:1.5rem;color:#4f46e5}header p{margin:0;font-size:.75rem;color:#6b7280}
main{max-width:64rem;margin:0 auto;padding:48px 24px;display:flex;flex-direction:column;align-items:center;gap:24px}
.hero{text-align:center}.hero h2{font-size:2.5rem;margin:0 0 12px}.hero p{color:#4b5563;max-width:40rem}
.upload{width:100%;max-width:42rem}.upload-zone{border:2px dashed #d1d5db;border-radius:16px;padding:48px;text-align:center}
.upload-zone.drag-active{border-color:#3b82f6;background:#eff6ff80}.upload-zone.busy{opacity:.5;pointer-events:none}
.upload-label{cursor:pointer;display:flex;flex-direction:column;align-items:center;gap:8px}.hidden{display:none}
.upload-icon{width:64px;height:64px;border-radius:50%;background:linear-gradient(135deg,#3b82f6,#9333ea);color:#fff;font-size:2rem;display:flex;align-items:center;justify-content:center}
.upload-title{font-weight:600;font-size:1.1rem;margin:0}.upload-hint{color:#6b7280;margin:0}.upload-types{display:flex;gap:24px;font-size:.75rem;color:#9ca3af}
.selected-file{margin-top:16px;padding:16px;background:#f0fdf4;border:1px solid #bbf7d0;border-radius:8px;color:#166534}
.loading{text-align:center}.spinner{width:64px;height:64px;margin:0 auto;border:4px solid #2563eb;border-top-color:transparent;border-radius:50%;animation:spin 1s linear infinite}
@keyframes spin{to{transform:rotate(360deg)}}.loading-title{font-weight:600}.loading-hint{color:#6b7280;font-size:.875rem}
.error-panel{width:100%;max-width:42rem;background:#fef2f2;border:2px solid #fecaca;border-radius:16px;padding:24px;color:#991b1b}
.features{display:grid;grid-template-columns:repeat(auto-fit,minmax(14rem,1fr));gap:24px;width:100%;margin-top:48px}
.feature,.card{background:#fff;border:1px solid #f3f4f6;border-radius:16px;padding:24px;box-shadow:0 10px 15px -3px #0000001a}
.analysis{width:100%;display:flex;flex-direction:column;gap:24px}.back{align-self:flex-start;color:#4b5563;text-decoration:none}
.risk-banner{border-width:2px}.risk-label{margin:0;opacity:.75;font-size:.875rem}.risk-value{margin:0;font-size:1.5rem;font-weight:700}
.risk-low{color:#16a34a;background:#f0fdf4;border-color:#bbf7d0}.risk-moderate{color:#ca8a04;background:#fefce8;border-color:#fef08a}
.risk-high{color:#ea580c;background:#fff7ed;border-color:#fed7aa}.risk-urgent{color:#dc2626;background:#fef2f2;border-color:#fecaca}
.finding{display:flex;gap:16px;align-items:flex-start;padding:16px;border-radius:12px;background:#f9fafb;margin-bottom:12px}.finding-body{flex:1}
.finding-name{font-weight:600;margin:0}.finding-detail{font-size:.875rem;color:#4b5563;margin:4px 0 0}
.badge{padding:4px 12px;border-radius:999px;font-size:.75rem;font-weight:500}
.status-normal{color:#15803d;background:#dcfce7}.status-borderline{color:#a16207;background:#fef9c3}.status-high-risk{color:#b91c1c;background:#fee2e2}
.abnormal{border-left:4px solid #3b82f6;padding:8px 0 8px 24px;margin-bottom:16px}.factors{background:#eff6ff;border-radius:8px;padding:16px;color:#1e40af}
.wellness-grid{display:grid;grid-template-columns:1fr 1fr;gap:16px}.wellness-item{background:#faf5ff;border-radius:12px;padding:16px}.wellness-item.wide{grid-column:span 2}
.wellness-label{font-weight:600;color:#581c87;margin:0 0 8px}
.doctor-questions ol{list-style:none;padding:0}.doctor-questions li{display:flex;gap:12px;align-items:flex-start;padding:12px;border-radius:8px;background:#f9fafb;margin-bottom:8px}
.question-number{flex-shrink:0;width:24px;height:24px;border-radius:50%;background:#3b82f6;color:#fff;display:flex;align-items:center;justify-content:center;font-size:.875rem;font-weight:700}
.doctor-questions p{margin:0}.disclaimer{background:#fef2f2;border:2px solid #fecaca;color:#991b1b}
footer{border-top:1px solid #e5e7eb;text-align:center;color:#6b7280;font-size:.875rem;padding:32px 24px;margin-top:80px}
"#;

// Mirrors UploadZone::handle in the browser.
const SCRIPT: &str = r#"
(function(){
  var form=document.getElementById('upload-form');
  var zone=document.getElementById('upload-zone');
  var input=document.getElementById('file-upload');
  if(!form||!zone||!input){return;}
  var busy=false;
  function submit(){
    if(busy||!input.files||!input.files[0]){return;}
    busy=true;
    zone.classList.add('busy');
    var title=zone.querySelector('.upload-title');
    if(title){title.textContent=input.files[0].name;}
    var loading=document.getElementById('loading');
    if(loading){loading.classList.remove('hidden');}
    form.submit();
    setTimeout(function(){input.disabled=true;},0);
  }
  function drag(e){
    e.preventDefault();e.stopPropagation();
    if(e.type==='dragenter'||e.type==='dragover'){zone.classList.add('drag-active');}
    else if(e.type==='dragleave'){zone.classList.remove('drag-active');}
  }
  ['dragenter','dragover','dragleave'].forEach(function(t){zone.addEventListener(t,drag);});
  zone.addEventListener('drop',function(e){
    e.preventDefault();e.stopPropagation();
    zone.classList.remove('drag-active');
    if(busy||!e.dataTransfer.files||!e.dataTransfer.files[0]){return;}
    var picked=new DataTransfer();
    picked.items.add(e.dataTransfer.files[0]);
    input.files=picked.files;
    submit();
  });
  input.addEventListener('change',function(e){e.preventDefault();submit();});
})();
"#;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{LifestyleGuidance, RiskLevel};

    fn file() -> SelectedFile {
        SelectedFile::new("labs.pdf", 2048, "application/pdf")
    }

    fn low_risk() -> AnalysisResult {
        AnalysisResult {
            summary: "All clear.".to_string(),
            key_findings: vec![],
            abnormal_values: vec![],
            risk_level: RiskLevel::Low,
            lifestyle_guidance: LifestyleGuidance {
                hydration: "h".to_string(),
                exercise: "e".to_string(),
                diet: "d".to_string(),
                sleep: "s".to_string(),
                follow_ups: "f".to_string(),
            },
            doctor_questions: vec![],
            disclaimer: "Not advice.".to_string(),
        }
    }

    #[test]
    fn happy_path_reaches_result_and_resets() {
        let mut state = PageState::default();
        state.begin(file()).unwrap();
        assert!(state.is_busy());

        state.complete(Ok(low_risk())).unwrap();
        assert!(matches!(state, PageState::Result(_)));

        state.reset();
        assert_eq!(state, PageState::Idle);
    }

    #[test]
    fn only_one_analysis_in_flight() {
        let mut state = PageState::default();
        state.begin(file()).unwrap();
        assert_eq!(state.begin(file()), Err(TransitionError::Busy));
    }

    #[test]
    fn new_upload_from_error_clears_message() {
        let mut state = PageState::default();
        state.begin(file()).unwrap();
        state.complete(Err("Failed to generate analysis".to_string())).unwrap();
        assert!(matches!(state, PageState::Error { .. }));

        state.begin(file()).unwrap();
        assert_eq!(state, PageState::Analyzing(file()));
    }

    #[test]
    fn result_must_be_reset_before_new_upload() {
        let mut state = PageState::Result(low_risk());
        assert_eq!(state.begin(file()), Err(TransitionError::ResultShown));
    }

    #[test]
    fn complete_requires_analyzing() {
        let mut state = PageState::Idle;
        assert_eq!(
            state.complete(Ok(low_risk())),
            Err(TransitionError::NotAnalyzing)
        );
    }

    #[test]
    fn reset_is_ignored_while_analyzing() {
        let mut state = PageState::Analyzing(file());
        state.reset();
        assert!(state.is_busy());
    }

    #[test]
    fn idle_page_shows_upload_without_spinner() {
        let html = render_page(&PageState::Idle);
        assert!(html.contains("Understand Your Health Reports"));
        assert!(html.contains("Upload Medical Report"));
        assert!(html.contains(r#"class="loading hidden""#));
        assert!(!html.contains(r#"class="error-panel""#));
    }

    #[test]
    fn analyzing_page_disables_upload_and_shows_spinner() {
        let html = render_page(&PageState::Analyzing(file()));
        assert!(html.contains("upload-zone busy"));
        assert!(html.contains(r#"class="loading""#));
        assert!(html.contains("Analyzing your report..."));
    }

    #[test]
    fn error_page_offers_retry() {
        let state = PageState::Error {
            message: "Unsupported file type. Please upload a PDF or image file.".to_string(),
            last_file: Some(file()),
        };
        let html = render_page(&state);
        assert!(html.contains("Error: Unsupported file type."));
        assert!(html.contains("Try again"));
        assert!(html.contains("labs.pdf (2.0 KB)"));
    }

    #[test]
    fn result_page_replaces_upload_with_report() {
        let html = render_page(&PageState::Result(low_risk()));
        assert!(html.contains("Analyze Another Report"));
        assert!(html.contains("risk-banner risk-low"));
        assert!(!html.contains(r#"id="upload-zone""#));
    }
}
