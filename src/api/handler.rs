//! Lambda handler: platform event in, platform response out.

use lambda_runtime::{Error, LambdaEvent};
use serde_json::Value;
use tracing::{debug, info};

use super::{helpers, parsing};
use crate::gateway::{Application, GatewayAdapter};

/// Lambda handler for the gateway entrypoint.
///
/// The request is translated and run through `adapter`; every failure is
/// already turned into a 500 by the adapter, so this always returns `Ok`.
///
/// # Errors
///
/// Never returns an error; the signature matches what `lambda_runtime` expects.
#[tracing::instrument(level = "info", skip(adapter, event), fields(request_id = %event.context.request_id))]
pub async fn function_handler<A: Application>(
    adapter: &GatewayAdapter<A>,
    event: LambdaEvent<Value>,
) -> Result<Value, Error> {
    debug!("Gateway received event: {:?}", event.payload);

    let trace_id = event
        .payload
        .get("headers")
        .and_then(|h| parsing::get_header_value(h, "X-Amzn-Trace-Id"))
        .unwrap_or("")
        .to_string();

    let request = parsing::incoming_request_from_event(&event.payload);
    let response = adapter.handle(request);

    info!(status = response.status, xray_trace_id = %trace_id, "Gateway responded");
    Ok(helpers::to_platform_response(&response))
}
