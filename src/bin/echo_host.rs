//! Native host that sends every message straight back.

use native_bridge::{
    error::Result,
    host::{event_loop, send_message},
    logging,
};
use serde_json::Value;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    logging::init();
    tracing::info!(args = ?std::env::args().skip(1).collect::<Vec<_>>(), "echo host starting");

    event_loop(|raw: String| async move {
        let message: Value = serde_json::from_str(&raw)?;
        tracing::debug!(%message, "echo");
        send_message(&message).await
    })
    .await
}
