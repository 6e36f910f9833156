//! Process-wide application handle, constructed on first use.
//!
//! The first caller runs the factory; concurrent callers wait on the same
//! attempt. Whatever it produces, the instance or the error, is kept for the
//! life of the process and the factory is never run again.

use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::OnceCell;
use tracing::{error, info};

use crate::errors::{GatewayError, catch_panic};

type Factory<A> = Box<dyn Fn() -> anyhow::Result<A> + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitState {
    Uninitialized,
    Ready,
    Failed,
}

pub struct LazyApplication<A> {
    factory: Factory<A>,
    cell: OnceCell<Result<A, GatewayError>>,
    attempts: AtomicUsize,
}

impl<A> LazyApplication<A> {
    pub fn new<F>(factory: F) -> Self
    where
        F: Fn() -> anyhow::Result<A> + Send + Sync + 'static,
    {
        Self {
            factory: Box::new(factory),
            cell: OnceCell::new(),
            attempts: AtomicUsize::new(0),
        }
    }

    /// Returns the application, constructing it on the first call.
    ///
    /// # Errors
    ///
    /// Returns the cached [`GatewayError::Initialization`] if construction
    /// failed, now or on any earlier call.
    pub fn get(&self) -> Result<&A, GatewayError> {
        self.cell
            .get_or_init(|| self.construct())
            .as_ref()
            .map_err(Clone::clone)
    }

    #[must_use]
    pub fn state(&self) -> InitState {
        match self.cell.get() {
            None => InitState::Uninitialized,
            Some(Ok(_)) => InitState::Ready,
            Some(Err(_)) => InitState::Failed,
        }
    }

    /// Number of times the factory has been run.
    #[must_use]
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }

    fn construct(&self) -> Result<A, GatewayError> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        info!(attempt, "Initializing application");

        match catch_panic(true, || (self.factory)()) {
            Ok(Ok(app)) => {
                info!("Application initialized");
                Ok(app)
            }
            Ok(Err(e)) => {
                error!(error = %format!("{e:#}"), "Application initialization failed, caching failure");
                Err(GatewayError::initialization(&e))
            }
            Err(err) => {
                error!(error = %err, "Application initialization panicked, caching failure");
                Err(err)
            }
        }
    }
}

impl<A> std::fmt::Debug for LazyApplication<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LazyApplication")
            .field("state", &self.state())
            .field("attempts", &self.attempts())
            .finish_non_exhaustive()
    }
}
