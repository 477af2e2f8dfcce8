//! Failure isolation for one screen's state.
//!
//! An [`ErrorBoundary`] wraps a value (for example the list view) and runs
//! updates against it. A failed update does not propagate: the boundary flips
//! to [`BoundaryState::Failed`], keeps the last good value for display and
//! ignores further updates until [`ErrorBoundary::reset`] is called.

use std::future::Future;
use tracing::{error, info};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum BoundaryState<T> {
    Healthy(T),
    Failed { message: String, last_good: T },
}

type ResetHook = Box<dyn FnMut() + Send>;

pub struct ErrorBoundary<T> {
    name: String,
    state: BoundaryState<T>,
    on_reset: Option<ResetHook>,
}

impl<T: Clone> ErrorBoundary<T> {
    pub fn new(name: impl Into<String>, initial: T) -> Self {
        Self {
            name: name.into(),
            state: BoundaryState::Healthy(initial),
            on_reset: None,
        }
    }

    /// Registers a callback invoked after every successful reset.
    pub fn with_reset_hook(mut self, hook: impl FnMut() + Send + 'static) -> Self {
        self.on_reset = Some(Box::new(hook));
        self
    }

    pub fn state(&self) -> &BoundaryState<T> {
        &self.state
    }

    pub fn has_error(&self) -> bool {
        matches!(self.state, BoundaryState::Failed { .. })
    }

    pub fn error_message(&self) -> Option<&str> {
        match &self.state {
            BoundaryState::Failed { message, .. } => Some(message),
            BoundaryState::Healthy(_) => None,
        }
    }

    /// The value to render: current when healthy, last good when failed.
    pub fn value(&self) -> &T {
        match &self.state {
            BoundaryState::Healthy(value) => value,
            BoundaryState::Failed { last_good, .. } => last_good,
        }
    }

    /// Applies `update` to the current value. No-op while failed.
    pub fn run<F>(&mut self, update: F) -> &BoundaryState<T>
    where
        F: FnOnce(&T) -> Result<T>,
    {
        let next = match &self.state {
            BoundaryState::Healthy(current) => match update(current) {
                Ok(next) => BoundaryState::Healthy(next),
                Err(e) => self.failed(e.to_string(), current.clone()),
            },
            BoundaryState::Failed { .. } => return &self.state,
        };
        self.state = next;
        &self.state
    }

    /// Async variant of [`ErrorBoundary::run`]; the update receives a copy of the value.
    pub async fn run_async<F, Fut>(&mut self, update: F) -> &BoundaryState<T>
    where
        F: FnOnce(T) -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let current = match &self.state {
            BoundaryState::Healthy(current) => current.clone(),
            BoundaryState::Failed { .. } => return &self.state,
        };
        self.state = match update(current.clone()).await {
            Ok(next) => BoundaryState::Healthy(next),
            Err(e) => self.failed(e.to_string(), current),
        };
        &self.state
    }

    /// Records a failure observed outside [`ErrorBoundary::run`].
    pub fn capture(&mut self, message: impl Into<String>) {
        if let BoundaryState::Healthy(current) = &self.state {
            self.state = self.failed(message.into(), current.clone());
        }
    }

    /// Returns to healthy with the last good value and fires the reset hook.
    pub fn reset(&mut self) {
        let BoundaryState::Failed { last_good, .. } = &self.state else {
            return;
        };
        self.state = BoundaryState::Healthy(last_good.clone());
        info!(boundary = %self.name, "error boundary reset");

        if let Some(hook) = self.on_reset.as_mut() {
            hook();
        }
    }

    fn failed(&self, message: String, last_good: T) -> BoundaryState<T> {
        error!(boundary = %self.name, "error boundary caught: {}", message);
        BoundaryState::Failed { message, last_good }
    }
}
