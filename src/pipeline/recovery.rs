//! Outermost stage: turns a panic anywhere inside the chain into a 500.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;

use axum::response::{IntoResponse, Response};
use futures_util::FutureExt;

use crate::http::error::ApiError;
use crate::observability::metrics;

/// Drive `fut`, converting an unwinding panic into an internal-error
/// response so the server keeps serving.
pub async fn recover<F>(request_id: &str, fut: F) -> Response
where
    F: Future<Output = Response>,
{
    match AssertUnwindSafe(fut).catch_unwind().await {
        Ok(response) => response,
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            tracing::error!(request_id = %request_id, panic = %message, "Recovered from panic in request pipeline");
            metrics::record_panic_recovered();
            ApiError::Internal(message).into_response()
        }
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}
