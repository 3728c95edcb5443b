pub mod analysis;
pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod provider;
pub mod service;
pub mod ui;
pub mod validation;

pub use analysis::analyze_report;
pub use config::{LogFormat, ServiceConfig};
pub use error::{AnalysisError, Result};
pub use models::*;
pub use provider::{AnalysisProvider, GeminiProvider, GenerationRequest};
pub use service::{AppState, build_router, create_app};
