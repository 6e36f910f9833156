/// Gateway shim - runs a synchronous gateway-interface application behind a
/// serverless HTTP platform.
///
/// Each invocation goes through the same steps:
/// 1. The platform event becomes an [`core::models::IncomingRequest`]
/// 2. The request becomes a [`gateway::GatewayContext`], with every missing field defaulted
/// 3. The application is called with the context and a response slot
/// 4. The captured status, headers and body chunks become an [`core::models::OutgoingResponse`]
///
/// The application is constructed on the first request and kept for the life
/// of the process. A failed construction is kept too and reported on every
/// request without retrying. Any failure is answered with a plain-text 500.
///
/// # Example
///
/// ```
/// use gateway_shim::core::config::AdapterConfig;
/// use gateway_shim::core::models::IncomingRequest;
/// use gateway_shim::gateway::{GatewayAdapter, chunks, from_fn};
///
/// let adapter = GatewayAdapter::new(AdapterConfig::default(), || {
///     Ok(from_fn(|ctx, resp| {
///         resp.start_response("200 OK", [("Content-Type", "text/plain")]);
///         Ok(chunks([format!("you asked for {}", ctx.path_info).into_bytes()]))
///     }))
/// });
///
/// let response = adapter.handle(IncomingRequest::new().with_path("hello"));
/// assert_eq!(response.status, 200);
/// assert_eq!(response.body, b"you asked for /hello");
/// ```
pub mod api;
pub mod core;
pub mod errors;
pub mod gateway;

pub use errors::GatewayError;

/// Configure structured logging with JSON format for Lambda environments.
///
/// The filter comes from `RUST_LOG`, falling back to `info` (or `debug` with
/// the `debug-logs` feature). Calling this more than once is harmless.
///
/// # Example
///
/// ```
/// gateway_shim::setup_logging();
/// ```
pub fn setup_logging() {
    use tracing_subscriber::EnvFilter;
    use tracing_subscriber::prelude::*;

    let default_level = if cfg!(feature = "debug-logs") {
        "debug"
    } else {
        "info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let fmt_layer = tracing_subscriber::fmt::layer().json().with_target(true);

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init();
}
