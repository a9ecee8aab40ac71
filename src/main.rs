/// projboard server entry point
///
/// Loads configuration from the environment and starts the HTTP server.

use projboard::{config::Config, server::start_server};

/// Application entry point
///
/// The server provides:
/// - Homepage, login, signup, logout and error pages
/// - Profiles at /user/{userid}
/// - Projects at /project/{projectid}
/// - Health check at /healthz
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (defaults to 0.0.0.0:3004 and data/projboard.db)
    let config = Config::default();

    start_server(config).await?;

    Ok(())
}
