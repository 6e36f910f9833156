use std::error::Error;

use gateway_shim::GatewayError;
use gateway_shim::errors::catch_panic;

#[test]
fn test_gateway_error_implements_error_trait() {
    fn assert_error<T: Error>(_: &T) {}

    let error = GatewayError::Config("bad flag".to_string());
    assert_error(&error);
}

#[test]
fn test_gateway_error_display() {
    let error = GatewayError::StatusLine("OK".to_string());
    assert_eq!(format!("{error}"), "Invalid status line: \"OK\"");

    let error = GatewayError::Config("GATEWAY_EXPOSE_ERRORS".to_string());
    assert_eq!(
        format!("{error}"),
        "Invalid configuration: GATEWAY_EXPOSE_ERRORS"
    );
}

#[test]
fn test_from_anyhow_keeps_cause_chain() {
    let err = anyhow::anyhow!("connection refused").context("opening database");
    let gateway_err: GatewayError = err.into();

    match &gateway_err {
        GatewayError::Application { message, trace } => {
            assert_eq!(message, "opening database: connection refused");
            assert!(trace.contains("Caused by"));
            assert!(trace.contains("connection refused"));
        }
        _ => panic!("Unexpected error type"),
    }
    assert_eq!(gateway_err.kind(), "ApplicationError");
}

#[test]
fn test_initialization_error_kind_and_trace() {
    let err = GatewayError::initialization(&anyhow::anyhow!("no settings"));
    assert_eq!(err.kind(), "InitializationError");
    assert_eq!(
        err.to_string(),
        "Failed to initialize application: no settings"
    );
    assert!(err.trace().contains("no settings"));
}

#[test]
fn test_panic_payloads_are_described() {
    let payload: Box<dyn std::any::Any + Send> = Box::new(String::from("boom"));
    let err = GatewayError::from_panic(payload.as_ref(), false);
    assert_eq!(err.kind(), "ApplicationError");
    assert!(err.to_string().contains("panicked: boom"));

    let payload: Box<dyn std::any::Any + Send> = Box::new(42_u8);
    let err = GatewayError::from_panic(payload.as_ref(), true);
    assert_eq!(err.kind(), "InitializationError");
    assert!(err.to_string().contains("unknown panic payload"));
}

#[test]
fn test_caught_panic_trace_has_location() {
    let err = catch_panic(false, || -> u8 { panic!("index out of range") }).unwrap_err();

    assert_eq!(err.kind(), "ApplicationError");
    assert!(err.to_string().contains("panicked: index out of range"));
    let trace = err.trace();
    assert!(trace.contains("errors_tests.rs"), "trace was: {trace}");
    assert!(trace.contains("stack backtrace"));
}

#[test]
fn test_catch_panic_passes_values_through() {
    assert_eq!(catch_panic(true, || 7), Ok(7));
}
