// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Serializer client returned to the bootstrap caller.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::accessor::ForwarderAccessor;
use crate::config::Config;
use crate::forwarder::ForwarderError;
use crate::logger::LogComponent;

/// A single timestamped value in a series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub timestamp: i64,
    pub value: f64,
}

/// A named collection of points with its tags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub metric: String,
    pub points: Vec<Point>,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum SerializerError {
    #[error("no forwarder is currently available")]
    NoForwarder,
    #[error("forwarder rejected the payload: {0}")]
    Forwarder(#[from] ForwarderError),
}

/// Submits collections of series through the accessor facade to the
/// forwarder.
#[derive(Clone)]
pub struct Serializer {
    forwarder: ForwarderAccessor,
    config: Arc<Config>,
    log: Arc<dyn LogComponent>,
}

impl fmt::Debug for Serializer {
    /// Prints a minimal summary without exposing component internals.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Serializer")
            .field("site", &self.config.site)
            .field("forwarder_present", &self.forwarder.get().is_some())
            .finish()
    }
}

impl Serializer {
    pub fn new(
        forwarder: ForwarderAccessor,
        config: Arc<Config>,
        log: Arc<dyn LogComponent>,
    ) -> Self {
        Serializer {
            forwarder,
            config,
            log,
        }
    }

    /// Accessor facade this serializer submits through.
    pub fn forwarder(&self) -> &ForwarderAccessor {
        &self.forwarder
    }

    /// Submits a collection of series toward eventual transmission.
    ///
    /// An absent or empty collection is a successful no-op that never reaches
    /// the forwarder. Otherwise the current forwarder is looked up per call:
    /// an empty facade or a rejected hand-off is surfaced to the caller.
    pub async fn send_iterable_series(
        &self,
        series: Option<Vec<Series>>,
    ) -> Result<(), SerializerError> {
        let series = series.unwrap_or_default();
        if series.is_empty() {
            self.log.debug("No series to send");
            return Ok(());
        }

        let forwarder = self.forwarder.get().ok_or(SerializerError::NoForwarder)?;
        self.log.debug(&format!(
            "Submitting {} series for {}",
            series.len(),
            self.config.site
        ));
        forwarder.submit(series).await?;
        Ok(())
    }
}
