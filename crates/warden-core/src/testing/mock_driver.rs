//! In-memory version driver for testing.
//!
//! Replays scripted responses so schema state logic can be exercised without
//! a database.

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use crate::error::{Result, WardenError};
use crate::schema::{DriverVersion, VersionDriver};

/// A scripted driver response.
#[derive(Debug, Clone)]
pub enum MockResponse {
    /// Return this version marker.
    Version(DriverVersion),
    /// Fail with `WardenError::Database(message)`.
    Fail(String),
    /// Return the version marker after a delay.
    Delayed(DriverVersion, Duration),
    /// Never complete.
    Hang,
}

/// Mock version driver.
///
/// Responses are consumed in order; the last one is repeated once the script
/// runs out. With no script at all the driver reports an uninitialized
/// database.
///
/// # Example
///
/// ```ignore
/// let driver = MockVersionDriver::new()
///     .respond(DriverVersion::nil())
///     .respond(DriverVersion::new(3, false));
///
/// let first = driver.version().await?;  // nil
/// let second = driver.version().await?; // 3
/// assert_eq!(driver.calls(), 2);
/// ```
pub struct MockVersionDriver {
    script: Mutex<VecDeque<MockResponse>>,
    calls: AtomicUsize,
}

impl MockVersionDriver {
    /// Create a new mock driver with an empty script.
    pub fn new() -> Self {
        Self {
            script: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a successful response.
    pub fn respond(self, version: DriverVersion) -> Self {
        self.push(MockResponse::Version(version))
    }

    /// Queue a failure.
    pub fn fail(self, message: impl Into<String>) -> Self {
        self.push(MockResponse::Fail(message.into()))
    }

    /// Queue a response that arrives after `delay`.
    pub fn respond_after(self, version: DriverVersion, delay: Duration) -> Self {
        self.push(MockResponse::Delayed(version, delay))
    }

    /// Queue a response that never arrives.
    pub fn hang(self) -> Self {
        self.push(MockResponse::Hang)
    }

    /// Number of times `version` has been called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn push(self, response: MockResponse) -> Self {
        self.script
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push_back(response);
        self
    }

    fn next_response(&self) -> MockResponse {
        let mut script = self.script.lock().unwrap_or_else(|e| e.into_inner());
        if script.len() > 1 {
            script.pop_front().unwrap_or(MockResponse::Version(DriverVersion::nil()))
        } else {
            script
                .front()
                .cloned()
                .unwrap_or(MockResponse::Version(DriverVersion::nil()))
        }
    }
}

impl Default for MockVersionDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl VersionDriver for MockVersionDriver {
    fn version(&self) -> Pin<Box<dyn Future<Output = Result<DriverVersion>> + Send + '_>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let response = self.next_response();

        Box::pin(async move {
            match response {
                MockResponse::Version(v) => Ok(v),
                MockResponse::Fail(message) => Err(WardenError::Database(message)),
                MockResponse::Delayed(v, delay) => {
                    tokio::time::sleep(delay).await;
                    Ok(v)
                }
                MockResponse::Hang => std::future::pending::<Result<DriverVersion>>().await,
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_empty_script_reports_nil() {
        let driver = MockVersionDriver::new();
        assert!(driver.version().await.unwrap().is_nil());
        assert_eq!(driver.calls(), 1);
    }

    #[tokio::test]
    async fn test_script_order_and_repeat_last() {
        let driver = MockVersionDriver::new()
            .respond(DriverVersion::nil())
            .respond(DriverVersion::new(3, false));

        assert!(driver.version().await.unwrap().is_nil());
        assert_eq!(driver.version().await.unwrap().version, 3);
        assert_eq!(driver.version().await.unwrap().version, 3);
        assert_eq!(driver.calls(), 3);
    }

    #[tokio::test]
    async fn test_failure() {
        let driver = MockVersionDriver::new().fail("permission denied");
        let err = driver.version().await.unwrap_err();
        assert!(matches!(err, WardenError::Database(ref m) if m == "permission denied"));
    }
}
