//! Pipeline Behaviors
//!
//! Logging and validation stages shared by all requests.

use std::time::Instant;

use async_trait::async_trait;

use crate::error::{AppError, AppResult, FieldError};

use super::{Behavior, Next, Request};

/// Input checks run before a command reaches its handler
pub trait Validate {
    /// Every failed check; empty when the request is valid
    fn validate(&self) -> Vec<FieldError>;
}

/// Logs each request with its outcome and duration
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingBehavior;

#[async_trait]
impl<R: Request> Behavior<R> for LoggingBehavior {
    async fn handle<'a>(&'a self, request: R, next: Next<'a, R>) -> AppResult<R::Response> {
        let start = Instant::now();
        tracing::debug!(request = R::NAME, payload = ?request, "Handling request");

        let result = next.run(request).await;
        let duration_ms = start.elapsed().as_millis();

        match &result {
            Ok(_) => {
                tracing::info!(request = R::NAME, duration_ms = %duration_ms, "Request handled");
            }
            Err(e)
                if matches!(
                    e,
                    AppError::Database(_) | AppError::Internal(_) | AppError::Config(_)
                ) =>
            {
                tracing::error!(
                    request = R::NAME,
                    duration_ms = %duration_ms,
                    error = ?e,
                    "Request failed"
                );
            }
            Err(e) => {
                tracing::warn!(
                    request = R::NAME,
                    duration_ms = %duration_ms,
                    error = %e,
                    "Request rejected"
                );
            }
        }

        result
    }
}

/// Rejects requests whose [`Validate`] checks fail
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationBehavior;

#[async_trait]
impl<R: Request + Validate> Behavior<R> for ValidationBehavior {
    async fn handle<'a>(&'a self, request: R, next: Next<'a, R>) -> AppResult<R::Response> {
        let errors = request.validate();
        if !errors.is_empty() {
            tracing::debug!(request = R::NAME, errors = errors.len(), "Validation failed");
            return Err(AppError::Validation(errors));
        }

        next.run(request).await
    }
}
