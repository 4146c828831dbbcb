use anagrafe::cli::{start, telemetry};
use anyhow::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let action = start()?;

    let result = action.execute().await;

    telemetry::shutdown_tracer();

    result
}
