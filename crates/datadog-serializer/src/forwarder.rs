// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Forwarder contract and the channel-backed default implementation.
//!
//! Batching, retry, compression, and the wire protocol are the forwarder's
//! own business; the rest of the pipeline reaches it only through
//! [`Forwarder`].

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::logger::LogComponent;
use crate::serializer::Series;

const PAYLOAD_CHANNEL_BUFFER_SIZE: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
#[allow(clippy::module_name_repetitions)]
pub enum ForwarderError {
    #[error("forwarder send loop is already running")]
    AlreadyStarted,
    #[error("forwarder send loop is not running")]
    NotStarted,
    #[error("forwarder channel closed")]
    ChannelClosed,
}

/// Capability exposed by a forwarder component.
#[async_trait]
pub trait Forwarder: Send + Sync {
    /// Begins the background send loop. Returns as soon as the loop has been
    /// handed off; it never waits for the loop to become ready.
    fn start(&self) -> Result<(), ForwarderError>;

    /// Hands a batch of series to the send loop for eventual transmission.
    async fn submit(&self, series: Vec<Series>) -> Result<(), ForwarderError>;

    /// Cancels the background send loop.
    fn stop(&self);
}

/// Construction inputs for [`DefaultForwarder`].
pub struct ForwarderParams {
    pub config: Arc<Config>,
    pub log: Arc<dyn LogComponent>,
}

impl ForwarderParams {
    pub fn new(config: Arc<Config>, log: Arc<dyn LogComponent>) -> Self {
        ForwarderParams { config, log }
    }
}

/// Default forwarder: a bounded channel drained by a cancellable background
/// task.
///
/// Construction only sets up the channel; no work happens until
/// [`Forwarder::start`] spawns the send loop. `start` is single-shot.
pub struct DefaultForwarder {
    tx: mpsc::Sender<Vec<Series>>,
    rx: Mutex<Option<mpsc::Receiver<Vec<Series>>>>,
    cancel: CancellationToken,
    started: AtomicBool,
    accepted: Arc<AtomicUsize>,
    timeout: Duration,
    log: Arc<dyn LogComponent>,
}

impl DefaultForwarder {
    pub fn new(params: &ForwarderParams) -> Self {
        let (tx, rx) = mpsc::channel(PAYLOAD_CHANNEL_BUFFER_SIZE);
        DefaultForwarder {
            tx,
            rx: Mutex::new(Some(rx)),
            cancel: CancellationToken::new(),
            started: AtomicBool::new(false),
            accepted: Arc::new(AtomicUsize::new(0)),
            timeout: Duration::from_secs(params.config.forwarder_timeout),
            log: Arc::clone(&params.log),
        }
    }

    /// Number of batches the send loop has accepted so far.
    pub fn accepted_batches(&self) -> usize {
        self.accepted.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Forwarder for DefaultForwarder {
    fn start(&self) -> Result<(), ForwarderError> {
        #[allow(clippy::expect_used)]
        let mut receiver_slot = self.rx.lock().expect("lock poisoned");
        let Some(mut rx) = receiver_slot.take() else {
            return Err(ForwarderError::AlreadyStarted);
        };
        self.started.store(true, Ordering::SeqCst);

        let cancel = self.cancel.clone();
        let accepted = Arc::clone(&self.accepted);
        let log = Arc::clone(&self.log);
        let timeout = self.timeout;
        tokio::spawn(async move {
            log.debug("Forwarder send loop started");
            loop {
                tokio::select! {
                    () = cancel.cancelled() => {
                        log.debug("Forwarder send loop stopped");
                        break;
                    }
                    batch = rx.recv() => match batch {
                        Some(series) => {
                            accepted.fetch_add(1, Ordering::SeqCst);
                            log.debug(&format!(
                                "Accepted batch of {} series for transmission (timeout {}s)",
                                series.len(),
                                timeout.as_secs()
                            ));
                        }
                        None => break,
                    }
                }
            }
        });
        Ok(())
    }

    async fn submit(&self, series: Vec<Series>) -> Result<(), ForwarderError> {
        if !self.started.load(Ordering::SeqCst) {
            return Err(ForwarderError::NotStarted);
        }
        self.tx
            .send(series)
            .await
            .map_err(|_| ForwarderError::ChannelClosed)
    }

    fn stop(&self) {
        self.cancel.cancel();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ApmConfig, LogLevel};
    use crate::logger::TracingLogAdapter;
    use crate::serializer::Point;

    fn test_params() -> ForwarderParams {
        ForwarderParams::new(
            Arc::new(Config {
                logs_enabled: true,
                log_level: LogLevel::Info,
                site: "datadoghq.com".to_string(),
                api_key: "_not_a_real_key_".to_string(),
                apm_config: ApmConfig {
                    enabled: true,
                    apm_non_local_traffic: true,
                },
                forwarder_timeout: 10,
            }),
            Arc::new(TracingLogAdapter::new(LogLevel::Debug)),
        )
    }

    fn sample_series() -> Vec<Series> {
        vec![Series {
            metric: "test.metric".to_string(),
            points: vec![Point {
                timestamp: 1,
                value: 1.0,
            }],
            tags: vec!["env:test".to_string()],
        }]
    }

    #[tokio::test]
    async fn submit_before_start_is_an_error() {
        let forwarder = DefaultForwarder::new(&test_params());
        let err = forwarder.submit(sample_series()).await.unwrap_err();
        assert_eq!(err, ForwarderError::NotStarted);
    }

    #[tokio::test]
    async fn start_is_single_shot() {
        let forwarder = DefaultForwarder::new(&test_params());
        forwarder.start().unwrap();
        assert_eq!(forwarder.start().unwrap_err(), ForwarderError::AlreadyStarted);
        forwarder.stop();
    }

    #[tokio::test]
    async fn send_loop_accepts_submitted_batches() {
        let forwarder = DefaultForwarder::new(&test_params());
        forwarder.start().unwrap();

        forwarder.submit(sample_series()).await.unwrap();
        forwarder.submit(sample_series()).await.unwrap();

        // The loop runs on a separate task; give it a beat to drain.
        for _ in 0..100 {
            if forwarder.accepted_batches() == 2 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(forwarder.accepted_batches(), 2);
        forwarder.stop();
    }

    #[tokio::test]
    async fn submit_after_stop_is_an_error() {
        let forwarder = DefaultForwarder::new(&test_params());
        forwarder.start().unwrap();
        forwarder.stop();

        // Once the loop observes cancellation the receiver is gone.
        let mut result = Ok(());
        for _ in 0..100 {
            result = forwarder.submit(sample_series()).await;
            if result.is_err() {
                break;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        assert_eq!(result.unwrap_err(), ForwarderError::ChannelClosed);
    }
}
