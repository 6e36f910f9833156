use std::sync::Arc;

use gateway_shim::api::handler;
use gateway_shim::core::config::AdapterConfig;
use gateway_shim::gateway::{GatewayAdapter, PlainTextApplication};
use lambda_runtime::{Error, LambdaEvent, service_fn};
use serde_json::Value;

#[tokio::main]
async fn main() -> Result<(), Error> {
    gateway_shim::setup_logging();

    let config = AdapterConfig::from_env().map_err(|e| {
        tracing::error!("Config error: {}", e);
        Error::from(e)
    })?;

    // Built on the first request, then shared for the life of the process.
    let adapter = Arc::new(GatewayAdapter::new(config, || {
        Ok(PlainTextApplication::new(
            "Hello from the gateway! Handler is working.",
        ))
    }));

    lambda_runtime::run(service_fn(move |event: LambdaEvent<Value>| {
        let adapter = Arc::clone(&adapter);
        async move { handler(&*adapter, event).await }
    }))
    .await
}
