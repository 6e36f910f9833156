use std::any::Any;
use std::backtrace::Backtrace;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Once;

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    #[error("Failed to initialize application: {message}")]
    Initialization { message: String, trace: String },

    #[error("Application failed while handling request: {message}")]
    Application { message: String, trace: String },

    #[error("Invalid status line: {0:?}")]
    StatusLine(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl GatewayError {
    /// Wraps a failed application construction, keeping its cause chain.
    #[must_use]
    pub fn initialization(error: &anyhow::Error) -> Self {
        GatewayError::Initialization {
            message: format!("{error:#}"),
            trace: format!("{error:?}"),
        }
    }

    /// Wraps a failure raised while the application handled a request.
    #[must_use]
    pub fn application(error: &anyhow::Error) -> Self {
        GatewayError::Application {
            message: format!("{error:#}"),
            trace: format!("{error:?}"),
        }
    }

    /// Builds a failure out of a caught panic. When the panic went through
    /// [`catch_panic`] on this thread, the trace carries its location and
    /// backtrace; otherwise it is just the message.
    #[must_use]
    pub fn from_panic(payload: &(dyn Any + Send), during_init: bool) -> Self {
        let message = format!("panicked: {}", panic_message(payload));
        let trace = take_panic_trace().unwrap_or_else(|| message.clone());
        if during_init {
            GatewayError::Initialization { message, trace }
        } else {
            GatewayError::Application { message, trace }
        }
    }

    /// Stable name of the failure class, reported in diagnostic responses.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            GatewayError::Initialization { .. } => "InitializationError",
            GatewayError::Application { .. } => "ApplicationError",
            GatewayError::StatusLine(_) => "StatusLineError",
            GatewayError::Config(_) => "ConfigError",
        }
    }

    /// Full diagnostic trace: the cause chain, plus a backtrace when one was captured.
    #[must_use]
    pub fn trace(&self) -> String {
        match self {
            GatewayError::Initialization { trace, .. } | GatewayError::Application { trace, .. } => {
                trace.clone()
            }
            other => other.to_string(),
        }
    }
}

impl From<anyhow::Error> for GatewayError {
    fn from(error: anyhow::Error) -> Self {
        GatewayError::application(&error)
    }
}

thread_local! {
    static PANIC_TRACE: RefCell<Option<String>> = const { RefCell::new(None) };
}

static PANIC_HOOK: Once = Once::new();

/// Chains a panic hook that records where the panic happened, and the
/// backtrace when `RUST_BACKTRACE` enables one, for the panicking thread.
fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let previous = panic::take_hook();
        panic::set_hook(Box::new(move |info| {
            let backtrace = Backtrace::capture();
            PANIC_TRACE.with(|slot| {
                *slot.borrow_mut() = Some(format!("{info}\n\nstack backtrace:\n{backtrace}"));
            });
            previous(info);
        }));
    });
}

fn take_panic_trace() -> Option<String> {
    PANIC_TRACE.with(|slot| slot.borrow_mut().take())
}

/// Runs `f`, turning a panic into an initialization or application failure
/// that keeps the panic's location and backtrace.
///
/// # Errors
///
/// Returns the converted panic.
pub fn catch_panic<R>(during_init: bool, f: impl FnOnce() -> R) -> Result<R, GatewayError> {
    install_panic_hook();
    take_panic_trace();
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| GatewayError::from_panic(payload.as_ref(), during_init))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
