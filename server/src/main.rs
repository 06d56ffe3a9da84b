use anyhow::Context;
use saferoof_config::{load as load_config, HttpConfig};
use saferoof_gateway::{create_router, GatewayState};
use tokio::{fs, net::TcpListener, signal};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_env_filter(env_filter)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("failed to set tracing subscriber")?;

    info!("starting SafeRoof backend");

    let config = load_config().context("failed to load configuration")?;

    let state = GatewayState::from_config(&config)
        .await
        .map_err(|e| anyhow::anyhow!("failed to initialize gateway state: {e}"))?;

    fs::create_dir_all(&state.uploads_dir)
        .await
        .with_context(|| {
            format!(
                "failed to create uploads directory {}",
                state.uploads_dir.display()
            )
        })?;

    info!(uploads = %state.uploads_dir.display(), "upload storage ready");

    let app = create_router(state);

    let address = bind_address(&config.http);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("failed to bind http listener on {address}"))?;

    info!(%address, "http server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("http server error")?;

    info!("backend shut down");
    Ok(())
}

fn bind_address(http: &HttpConfig) -> String {
    format!("{}:{}", http.address, http.port)
}

fn shutdown_signal() -> impl std::future::Future<Output = ()> {
    async {
        if let Err(error) = signal::ctrl_c().await {
            error!(?error, "failed to listen for shutdown signal");
        }
        info!("shutdown signal received");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bind_address_joins_host_and_port() {
        let http = HttpConfig {
            address: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(bind_address(&http), "0.0.0.0:8080");
    }

    #[test]
    fn bind_address_uses_defaults() {
        let http = HttpConfig::default();
        assert_eq!(bind_address(&http), "127.0.0.1:3000");
    }
}
