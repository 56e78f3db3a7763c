//! Ingestion Loop
//!
//! Pulls payloads from a [`MessageSource`], validates them and hands them to
//! the [`OrderService`] write path. A failure on one message never ends the
//! loop: malformed payloads are discarded, transient store failures are
//! retried with backoff and then dropped.

use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use super::MessageSource;
use crate::config::Config;
use crate::error::SourceError;
use crate::service::OrderService;
use crate::validation::Validator;

// == Retry Policy ==
/// Bounded exponential backoff for transient store failures.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts per message, including the first
    pub max_attempts: u32,
    /// Delay before the second attempt
    pub initial_backoff: Duration,
    /// Cap on any single delay
    pub max_backoff: Duration,
}

impl RetryPolicy {
    /// Delay to wait after failed attempt number `attempt` (1-based).
    pub fn backoff(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt.saturating_sub(1));
        self.initial_backoff
            .saturating_mul(factor)
            .min(self.max_backoff)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(200),
            max_backoff: Duration::from_secs(5),
        }
    }
}

// == Ingest Config ==
/// Tuning knobs for [`IngestionLoop`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestConfig {
    /// Retry behavior for transient store failures
    pub retry: RetryPolicy,
    /// Pause after a failed stream read
    pub read_backoff: Duration,
}

impl From<&Config> for IngestConfig {
    fn from(config: &Config) -> Self {
        Self {
            retry: RetryPolicy {
                max_attempts: config.process_max_attempts.max(1),
                ..RetryPolicy::default()
            },
            read_backoff: config.read_backoff(),
        }
    }
}

// == Ingest Report ==
/// Per-run message counts, returned when the loop exits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Messages persisted (or recognized as duplicates)
    pub processed: u64,
    /// Messages discarded as malformed
    pub rejected: u64,
    /// Valid messages dropped after the write path failed
    pub failed: u64,
    /// Failed reads from the stream itself
    pub read_errors: u64,
}

// == Stop Handle ==
/// Requests that a running [`IngestionLoop`] exit.
#[derive(Debug, Clone)]
pub struct StopHandle {
    token: CancellationToken,
}

impl StopHandle {
    /// Asks the loop to exit before starting another message.
    pub fn stop(&self) {
        self.token.cancel();
    }

    /// Returns true once a stop has been requested.
    pub fn is_stopped(&self) -> bool {
        self.token.is_cancelled()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Outcome {
    Processed,
    Rejected,
    Failed,
}

// == Ingestion Loop ==
/// Drives messages from a source into the order write path.
pub struct IngestionLoop<S, V> {
    source: S,
    handler: MessageHandler<V>,
    stop: CancellationToken,
}

/// Validation and write path for a single payload.
struct MessageHandler<V> {
    validator: V,
    service: OrderService,
    config: IngestConfig,
}

impl<S, V> IngestionLoop<S, V>
where
    S: MessageSource,
    V: Validator,
{
    /// Builds a loop reading from `source`; nothing runs until [`run`](Self::run).
    pub fn new(source: S, validator: V, service: OrderService, config: IngestConfig) -> Self {
        Self {
            source,
            handler: MessageHandler {
                validator,
                service,
                config,
            },
            stop: CancellationToken::new(),
        }
    }

    /// Returns a handle for the explicit stop signal.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle {
            token: self.stop.clone(),
        }
    }

    // == Run ==
    /// Consumes messages until `cancel` fires, a stop is requested, or the
    /// source closes.
    ///
    /// Both signals are checked between messages and while waiting on the
    /// source. A message whose store write is in flight runs to completion.
    pub async fn run(mut self, cancel: CancellationToken) -> IngestReport {
        let mut report = IngestReport::default();
        info!("Ingestion loop started");

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Ingestion loop cancelled");
                    break;
                }
                _ = self.stop.cancelled() => {
                    info!("Ingestion loop stop requested");
                    break;
                }
                next = self.source.next_message() => next,
            };

            match next {
                Ok(payload) => {
                    match self.handler.handle(&payload, &cancel, &self.stop).await {
                        Outcome::Processed => report.processed += 1,
                        Outcome::Rejected => report.rejected += 1,
                        Outcome::Failed => report.failed += 1,
                    }
                }
                Err(SourceError::Closed) => {
                    info!("Message stream closed");
                    break;
                }
                Err(err @ SourceError::Transient(_)) => {
                    report.read_errors += 1;
                    warn!(error = %err, "Failed to read from message stream");
                    let backoff = self.handler.config.read_backoff;
                    if !pause(backoff, &cancel, &self.stop).await {
                        break;
                    }
                }
            }
        }

        info!(
            processed = report.processed,
            rejected = report.rejected,
            failed = report.failed,
            read_errors = report.read_errors,
            "Ingestion loop exited"
        );
        report
    }
}

impl<V: Validator> MessageHandler<V> {
    async fn handle(
        &self,
        payload: &[u8],
        cancel: &CancellationToken,
        stop: &CancellationToken,
    ) -> Outcome {
        let order = match self.validator.validate(payload) {
            Ok(order) => order,
            Err(err) => {
                warn!(error = %err, bytes = payload.len(), "Discarding malformed message");
                return Outcome::Rejected;
            }
        };

        let order_uid = order.order_uid.clone();
        let retry = &self.config.retry;
        let mut attempt = 1;

        loop {
            match self.service.process_order(order.clone()).await {
                Ok(()) => {
                    info!(order_uid = %order_uid, "Order processed");
                    return Outcome::Processed;
                }
                Err(err) if err.is_transient() && attempt < retry.max_attempts => {
                    let delay = retry.backoff(attempt);
                    warn!(
                        order_uid = %order_uid,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "Order write failed, retrying"
                    );
                    if !pause(delay, cancel, stop).await {
                        warn!(order_uid = %order_uid, "Shutdown during retry, message abandoned");
                        return Outcome::Failed;
                    }
                    attempt += 1;
                }
                Err(err) => {
                    error!(order_uid = %order_uid, attempt, error = %err, "Failed to process order");
                    return Outcome::Failed;
                }
            }
        }
    }
}

/// Sleeps for `delay`; returns false early if either signal fires.
async fn pause(delay: Duration, cancel: &CancellationToken, stop: &CancellationToken) -> bool {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => false,
        _ = stop.cancelled() => false,
        _ = tokio::time::sleep(delay) => true,
    }
}
