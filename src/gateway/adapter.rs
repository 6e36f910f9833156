//! The gateway adapter: request translation, application invocation,
//! response translation and the outermost failure boundary.

use tracing::{debug, error, info_span};
use uuid::Uuid;

use crate::core::config::AdapterConfig;
use crate::core::models::{CapturedResponse, IncomingRequest, OutgoingResponse};
use crate::errors::{GatewayError, catch_panic};
use crate::gateway::application::Application;
use crate::gateway::context::GatewayContext;
use crate::gateway::lazy::LazyApplication;

pub const GENERIC_ERROR_BODY: &str = "Internal Server Error";

pub struct GatewayAdapter<A> {
    app: LazyApplication<A>,
    config: AdapterConfig,
}

impl<A: Application> GatewayAdapter<A> {
    /// Creates an adapter whose application is built by `factory` on the first
    /// request. The settings-module variable is filled in, if unset, right
    /// before the factory runs.
    pub fn new<F>(config: AdapterConfig, factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<A> + Send + Sync + 'static,
    {
        let bootstrap = config.clone();
        let app = LazyApplication::new(move || {
            let module = bootstrap.ensure_settings_module();
            debug!(
                var = %bootstrap.settings_module_var,
                module = %module,
                "Settings module selected"
            );
            factory()
        });
        Self { app, config }
    }

    #[must_use]
    pub fn config(&self) -> &AdapterConfig {
        &self.config
    }

    #[must_use]
    pub fn application(&self) -> &LazyApplication<A> {
        &self.app
    }

    #[must_use]
    pub fn build_context(&self, request: IncomingRequest) -> GatewayContext {
        GatewayContext::from_request(request, &self.config)
    }

    /// Runs the full translation and lets failures through.
    ///
    /// # Errors
    ///
    /// Returns the cached initialization failure, an application failure, or
    /// an unparsable status line.
    pub fn try_handle(&self, request: IncomingRequest) -> Result<OutgoingResponse, GatewayError> {
        let app = self.app.get()?;
        let mut context = self.build_context(request);
        let captured = invoke(app, &mut context)?;
        captured.finalize()
    }

    /// Handles one request. Never fails and never panics: any failure,
    /// including a panicking application, becomes a 500 response.
    pub fn handle(&self, request: IncomingRequest) -> OutgoingResponse {
        let span = info_span!(
            "gateway_request",
            correlation_id = %Uuid::new_v4(),
            method = request.method.as_deref().unwrap_or("GET"),
            path = request.path.as_deref().unwrap_or("/"),
        );
        let _guard = span.enter();

        let result = catch_panic(false, || self.try_handle(request)).and_then(|r| r);

        match result {
            Ok(response) => {
                debug!(status = response.status, bytes = response.body.len(), "Request handled");
                response
            }
            Err(e) => {
                error!(kind = e.kind(), error = %e, trace = %e.trace(), "Request failed");
                self.error_response(&e)
            }
        }
    }

    /// Synthesized 500 for a contained failure.
    #[must_use]
    pub fn error_response(&self, err: &GatewayError) -> OutgoingResponse {
        if self.config.expose_errors {
            OutgoingResponse::plain_text(500, diagnostic_body(err))
        } else {
            OutgoingResponse::plain_text(500, GENERIC_ERROR_BODY)
        }
    }
}

/// Calls the application and drains its body chunks in order.
///
/// # Errors
///
/// Returns [`GatewayError::Application`] if the call or any chunk fails.
pub fn invoke<A: Application + ?Sized>(
    app: &A,
    context: &mut GatewayContext,
) -> Result<CapturedResponse, GatewayError> {
    let mut captured = CapturedResponse::new();
    let body = app
        .call(context, &mut captured)
        .map_err(|e| GatewayError::application(&e))?;

    for chunk in body {
        let chunk = chunk.map_err(|e| GatewayError::application(&e))?;
        captured.push_chunk(&chunk);
    }

    Ok(captured)
}

#[must_use]
pub fn diagnostic_body(err: &GatewayError) -> String {
    format!(
        "Error: {err}\nType: {}\n\nTraceback:\n{}\n",
        err.kind(),
        err.trace()
    )
}
