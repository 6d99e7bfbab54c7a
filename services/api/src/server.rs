use crate::cli::ServeArgs;
use crate::infra::{configured_geocoder, local_hub, AppState};
use crate::routes::with_rental_routes;
use axum::{Extension, Router};
use axum_prometheus::PrometheusMetricLayer;
use renthub::config::{AppConfig, ServerConfig};
use renthub::error::AppError;
use renthub::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

pub(crate) async fn run(args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    apply_overrides(&mut config.server, args);
    telemetry::init(&config.telemetry)?;

    let readiness = Arc::new(AtomicBool::new(false));
    let app = build_app(&config, readiness.clone());

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness.store(true, Ordering::Release);
    info!(environment = ?config.environment, %addr, "renthub api listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(drain_on_ctrl_c(readiness))
        .await?;
    info!("renthub api stopped");
    Ok(())
}

fn apply_overrides(server: &mut ServerConfig, args: ServeArgs) {
    let ServeArgs { host, port } = args;
    if let Some(host) = host {
        server.host = host;
    }
    if let Some(port) = port {
        server.port = port;
    }
}

/// Rental routes over a fresh local hub, with health checks and request metrics.
fn build_app(config: &AppConfig, readiness: Arc<AtomicBool>) -> Router {
    let (metrics_layer, metrics) = PrometheusMetricLayer::pair();
    let state = AppState {
        readiness,
        metrics: Arc::new(metrics),
    };

    with_rental_routes(local_hub(), configured_geocoder(&config.geocoding))
        .layer(Extension(state))
        .layer(metrics_layer)
}

/// Resolves on Ctrl-C after flipping `/ready` to 503 so load balancers stop routing here.
async fn drain_on_ctrl_c(readiness: Arc<AtomicBool>) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "no shutdown signal handler; serving until killed");
        std::future::pending::<()>().await;
    }
    readiness.store(false, Ordering::Release);
    info!("shutdown requested; draining in-flight requests");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_flags_override_configured_address() {
        let mut server = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
        };

        apply_overrides(&mut server, ServeArgs::default());
        assert_eq!((server.host.as_str(), server.port), ("127.0.0.1", 8080));

        apply_overrides(
            &mut server,
            ServeArgs {
                host: Some("0.0.0.0".to_string()),
                port: None,
            },
        );
        assert_eq!((server.host.as_str(), server.port), ("0.0.0.0", 8080));

        apply_overrides(
            &mut server,
            ServeArgs {
                host: None,
                port: Some(9000),
            },
        );
        assert_eq!(server.port, 9000);
    }
}
