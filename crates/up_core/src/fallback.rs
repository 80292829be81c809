//! Ordered "attempt in order, first success wins" evaluation.
//!
//! Search strategies and model identifiers are both plain lists; this module
//! walks such a list and keeps a record of every attempt that failed so the
//! caller can report it.

use std::fmt;
use std::future::Future;
use crate::{Error, Result};

#[derive(Debug)]
pub struct FailedAttempt {
    pub label: String,
    pub error: Error,
}

impl fmt::Display for FailedAttempt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.label, self.error)
    }
}

#[derive(Debug)]
pub struct Success<T> {
    pub label: String,
    pub value: T,
    /// Attempts that ran (and failed) before the winning one.
    pub failures: Vec<FailedAttempt>,
}

/// Every strategy failed, in evaluation order.
#[derive(Debug, Default)]
pub struct Exhausted {
    pub attempts: Vec<FailedAttempt>,
}

impl Exhausted {
    pub fn last_error(&self) -> Option<&Error> {
        self.attempts.last().map(|a| &a.error)
    }

    pub fn summary(&self) -> String {
        if self.attempts.is_empty() {
            return "no strategies to attempt".to_string();
        }
        self.attempts
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for Exhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "all {} attempts failed ({})", self.attempts.len(), self.summary())
    }
}

/// Runs `attempt` for each strategy in order and returns the first `Ok`.
pub async fn first_success<S, T, F, Fut>(
    strategies: impl IntoIterator<Item = S>,
    mut attempt: F,
) -> std::result::Result<Success<T>, Exhausted>
where
    S: fmt::Display,
    F: FnMut(S) -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let mut failures = Vec::new();
    for strategy in strategies {
        let label = strategy.to_string();
        match attempt(strategy).await {
            Ok(value) => {
                return Ok(Success { label, value, failures });
            }
            Err(error) => {
                tracing::debug!("↪️ {} failed: {}", label, error);
                failures.push(FailedAttempt { label, error });
            }
        }
    }
    Err(Exhausted { attempts: failures })
}
