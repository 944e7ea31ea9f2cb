// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Adapter from an externally supplied structured logger to the logging
//! capability the component graph expects.

use tracing::{debug, error, info, warn};

use crate::config::LogLevel;

/// Leveled logging capability threaded through the component graph.
pub trait LogComponent: Send + Sync {
    /// Configured verbosity of the underlying logger.
    fn level(&self) -> LogLevel;
    fn debug(&self, message: &str);
    fn info(&self, message: &str);
    fn warn(&self, message: &str);
    fn error(&self, message: &str);
}

/// [`LogComponent`] backed by the process-wide `tracing` dispatcher.
///
/// Pure delegation: every call maps to the matching `tracing` macro, so
/// filtering and formatting stay with the installed subscriber.
pub struct TracingLogAdapter {
    level: LogLevel,
}

impl TracingLogAdapter {
    pub fn new(level: LogLevel) -> Self {
        TracingLogAdapter { level }
    }
}

impl LogComponent for TracingLogAdapter {
    fn level(&self) -> LogLevel {
        self.level
    }

    fn debug(&self, message: &str) {
        debug!("{message}");
    }

    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn warn(&self, message: &str) {
        warn!("{message}");
    }

    fn error(&self, message: &str) {
        error!("{message}");
    }
}
