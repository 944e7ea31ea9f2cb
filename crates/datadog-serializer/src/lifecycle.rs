// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Lifecycle management for the forwarder's background send loop.

use std::fmt;
use std::sync::Arc;

use crate::forwarder::Forwarder;
use crate::logger::LogComponent;

/// Owns the constructed forwarder and drives its start/stop transitions.
///
/// Bootstrap success and forwarder-start success are decoupled: a failed
/// start is logged and the caller keeps its serializer, whose subsequent
/// submissions fail on their own terms.
pub struct ForwarderLifecycle {
    forwarder: Arc<dyn Forwarder>,
    log: Arc<dyn LogComponent>,
}

impl fmt::Debug for ForwarderLifecycle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForwarderLifecycle")
            .field("forwarder", &"<Forwarder>")
            .finish()
    }
}

impl ForwarderLifecycle {
    pub fn new(forwarder: Arc<dyn Forwarder>, log: Arc<dyn LogComponent>) -> Self {
        ForwarderLifecycle { forwarder, log }
    }

    /// Triggers the forwarder's non-blocking start.
    ///
    /// Observes only the immediate return of the start call; never waits for
    /// the send loop to become ready.
    pub fn start(&self) {
        if let Err(err) = self.forwarder.start() {
            self.log.error(&format!("Error starting forwarder: {err}"));
        }
    }

    /// Cancels the background send loop.
    pub fn stop(&self) {
        self.forwarder.stop();
    }
}
