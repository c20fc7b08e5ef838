//! Shared setup for the yabre demos

use anyhow::Result;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing subscriber
///
/// `RUST_LOG` overrides the default filter. Script `print(...)` output is
/// logged under the `yabre::script` target.
pub fn init_tracing() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "yabre_sdk=info,yabre_repository=info,yabre::script=info,yabre::decision=info"
                    .into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
