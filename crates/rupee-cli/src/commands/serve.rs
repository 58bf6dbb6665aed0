use rupee_web::AppState;
use tracing::{info, warn};

use crate::cli::ServeArgs;
use crate::error::CliError;

use super::Services;

pub async fn run(args: &ServeArgs, services: Services) -> Result<(), CliError> {
    let state = AppState::new(services.coordinator, services.queries);
    rupee_web::serve(args.listen_addr, state, shutdown_signal()).await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("shutdown requested"),
        Err(error) => warn!(%error, "could not listen for ctrl-c; serving until killed"),
    }
}
