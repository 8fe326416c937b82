//! Store deadlines
//!
//! Every repository call is bounded. When the limit passes the inner future
//! is dropped, which releases its pooled connection and rolls back any open
//! transaction.

use std::future::Future;
use std::time::Duration;

use crate::error::{AuthError, AuthResult};

pub async fn within<T, F>(limit: Duration, operation: &'static str, fut: F) -> AuthResult<T>
where
    F: Future<Output = AuthResult<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => Err(AuthError::Timeout(operation)),
    }
}
