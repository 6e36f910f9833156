//! Translation between the platform request/response contract and the
//! synchronous gateway interface.

pub mod adapter;
pub mod application;
pub mod context;
pub mod lazy;

pub use adapter::GatewayAdapter;
pub use application::{Application, BodyChunks, PlainTextApplication, chunks, empty_body, from_fn};
pub use context::GatewayContext;
pub use lazy::{InitState, LazyApplication};
