use anyhow::Result;
use ticker_bot::{AppContext, Config, bootstrap};
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    bootstrap::init_logging();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration, shutting down");
            return Err(e.into());
        }
    };
    info!(?config, "configuration loaded");

    let ctx = AppContext::new();
    tokio::select! {
        started = bootstrap::start(&ctx, &config) => {
            if let Err(e) = started {
                error!(error = ?e, "startup failed, shutting down");
                return Err(e);
            }
        }
        signal = shutdown_signal() => {
            signal?;
            info!("Shutdown before tracker started.");
            return Ok(());
        }
    }

    shutdown_signal().await?;
    info!("shutdown requested");

    ctx.shutdown_and_join().await;

    info!("Shutdown complete.");
    Ok(())
}

async fn shutdown_signal() -> std::io::Result<()> {
    #[cfg(unix)]
    {
        use tokio::{
            select,
            signal::unix::{SignalKind, signal},
        };
        let mut sigterm = signal(SignalKind::terminate())?;
        let mut sigint = signal(SignalKind::interrupt())?;
        select! {
            _ = sigterm.recv() => {},
            _ = sigint.recv()  => {},
        }
    }

    #[cfg(not(unix))]
    {
        tokio::signal::ctrl_c().await?;
    }

    Ok(())
}
