//! Readiness probing for files that may still be written by another process

use std::fs::File;
use std::io::{self, ErrorKind};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info};

/// How often and how far apart a file is probed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of open attempts, at least 1
    pub max_attempts: u32,
    /// Pause between two attempts
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_secs(1),
        }
    }
}

/// Result of waiting for a file
#[derive(Debug)]
pub enum Readiness {
    /// The file could be opened for reading
    Ready { attempts: u32 },
    /// Opening failed in a way that retrying will not fix
    NonRetryable { attempts: u32, error: io::Error },
    /// The file stayed locked for the whole budget
    RetriesExhausted {
        attempts: u32,
        last_error: Option<io::Error>,
    },
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }
}

/// Whether an open failure may clear up by itself.
///
/// Any error reported by the OS counts: locks and sharing violations, but also a
/// file that is not visible yet right after its creation event. Only a path the
/// OS never got to see (`InvalidInput`, e.g. an interior NUL) fails at once.
pub fn is_retryable(error: &io::Error) -> bool {
    error.kind() != ErrorKind::InvalidInput
}

/// Probe `path` by opening it for reading until it succeeds or the budget runs out
pub fn wait_until_readable(path: &Path, policy: RetryPolicy) -> Readiness {
    wait_with_probe(path, policy, |p| File::open(p).map(drop))
}

/// Same as [`wait_until_readable`] with a custom probe.
///
/// The probe is called at most `policy.max_attempts` times; the delay is only
/// slept between attempts, never after the last one.
pub fn wait_with_probe<F>(path: &Path, policy: RetryPolicy, mut probe: F) -> Readiness
where
    F: FnMut(&Path) -> io::Result<()>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut last_error = None;

    for attempt in 1..=max_attempts {
        match probe(path) {
            Ok(()) => {
                info!(
                    path = %path.display(),
                    attempt,
                    "File opened successfully"
                );
                return Readiness::Ready { attempts: attempt };
            }
            Err(error) if is_retryable(&error) => {
                debug!(
                    path = %path.display(),
                    %error,
                    "File is locked. Retrying in {:?}... (attempt {attempt}/{max_attempts})",
                    policy.delay
                );
                last_error = Some(error);
                if attempt < max_attempts {
                    std::thread::sleep(policy.delay);
                }
            }
            Err(error) => {
                return Readiness::NonRetryable {
                    attempts: attempt,
                    error,
                };
            }
        }
    }

    Readiness::RetriesExhausted {
        attempts: max_attempts,
        last_error,
    }
}
