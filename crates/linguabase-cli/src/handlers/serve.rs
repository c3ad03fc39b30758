//! Serve command handler

use crate::cli::ServeArgs;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::logging::timing::Timer;
use crate::output::OutputWriter;
use crate::server::{build_router, serve, AppState};
use linguabase_core::store::data_dir_exists;
use linguabase_core::{DocumentStore, ServiceProxy};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, instrument, warn};

/// Handle the serve command
#[instrument(skip_all)]
pub async fn handle_serve(args: ServeArgs, config: &Config, output: &mut OutputWriter) -> Result<()> {
    let config = apply_args(args, config.clone());

    let listener = {
        let _timer = Timer::new("server_startup");

        if !data_dir_exists(&config.data.data_dir).await {
            warn!(data_dir = %config.data.data_dir.display(), "data directory does not exist");
            output.warning(&format!(
                "Data directory {} does not exist; document requests will fail",
                config.data.data_dir.display()
            ))?;
        }

        let addr = config.server.socket_addr();
        TcpListener::bind(&addr)
            .await
            .map_err(|e| Error::other(format!("failed to bind {}: {}", addr, e)))?
    };

    let store = DocumentStore::new(config.data.clone());
    let proxy = ServiceProxy::new(config.services.clone())?;
    let router = build_router(Arc::new(AppState::new(store, proxy)), &config.server);

    let local = listener.local_addr()?;
    info!(
        addr = %local,
        data_dir = %config.data.data_dir.display(),
        tts = %config.services.tts.url,
        stt = %config.services.stt.url,
        chat = %config.services.chat.url,
        model = %config.services.default_model,
        "Linguabase API listening"
    );
    output.success(&format!("Linguabase API listening on http://{}", local))?;
    output.info("Press Ctrl+C to stop")?;

    serve(listener, router, shutdown_signal()).await?;

    info!("server stopped");
    Ok(())
}

/// Command-line flags win over file and environment
fn apply_args(args: ServeArgs, mut config: Config) -> Config {
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(dir) = args.data_dir {
        config.data.data_dir = dir;
    }
    config
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("failed to listen for Ctrl+C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown requested");
}
