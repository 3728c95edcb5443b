use report_analysis_service::{LogFormat, ServiceConfig, create_app};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str = "report_analysis_service=debug,tower_http=debug";

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_LOG_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(fmt::layer().pretty()).init(),
        LogFormat::Json => registry
            .with(fmt::layer().json().with_current_span(true))
            .init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Config errors surface through anyhow on stderr before a subscriber exists.
    let config = ServiceConfig::from_env()?;
    init_tracing(config.log_format);

    let port = config.port;
    let app = create_app(config)?;
    let listener = TcpListener::bind(format!("0.0.0.0:{}", port)).await?;
    let addr = listener.local_addr()?;

    info!(%addr, "HealthScan AI report analysis service listening");
    info!("Upload page: http://{}/", addr);
    info!("Analysis endpoint: POST http://{}/api/analyze", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
