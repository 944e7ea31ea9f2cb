// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Narrow get/reset facade over the current forwarder reference.

use std::sync::{Arc, RwLock};

use crate::forwarder::Forwarder;

/// Cloneable handle to the single forwarder slot.
///
/// The facade only hands out references; it never constructs a forwarder,
/// never mutates its internals, and never stops its send loop. Holders that
/// cloned a reference out of [`ForwarderAccessor::get`] keep using it even
/// after a [`ForwarderAccessor::reset`]; only later lookups observe the
/// empty slot.
#[derive(Clone, Default)]
pub struct ForwarderAccessor {
    slot: Arc<RwLock<Option<Arc<dyn Forwarder>>>>,
}

impl ForwarderAccessor {
    /// Facade populated with the constructed forwarder.
    pub fn new(forwarder: Arc<dyn Forwarder>) -> Self {
        ForwarderAccessor {
            slot: Arc::new(RwLock::new(Some(forwarder))),
        }
    }

    /// Facade with no forwarder set.
    pub fn empty() -> Self {
        ForwarderAccessor::default()
    }

    /// Returns the current forwarder reference, if one is set.
    #[allow(clippy::expect_used)]
    pub fn get(&self) -> Option<Arc<dyn Forwarder>> {
        self.slot.read().expect("lock poisoned").clone()
    }

    /// Clears the held reference. The underlying send loop keeps running;
    /// stopping it is the lifecycle manager's job.
    #[allow(clippy::expect_used)]
    pub fn reset(&self) {
        *self.slot.write().expect("lock poisoned") = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::forwarder::ForwarderError;
    use crate::serializer::Series;
    use async_trait::async_trait;

    struct NoopForwarder;

    #[async_trait]
    impl Forwarder for NoopForwarder {
        fn start(&self) -> Result<(), ForwarderError> {
            Ok(())
        }

        async fn submit(&self, _series: Vec<Series>) -> Result<(), ForwarderError> {
            Ok(())
        }

        fn stop(&self) {}
    }

    #[test]
    fn get_returns_the_populated_forwarder() {
        let forwarder: Arc<dyn Forwarder> = Arc::new(NoopForwarder);
        let accessor = ForwarderAccessor::new(Arc::clone(&forwarder));
        let held = accessor.get().unwrap();
        assert!(Arc::ptr_eq(&held, &forwarder));
    }

    #[test]
    fn reset_clears_the_slot() {
        let accessor = ForwarderAccessor::new(Arc::new(NoopForwarder));
        accessor.reset();
        assert!(accessor.get().is_none());
        // Reset is idempotent.
        accessor.reset();
        assert!(accessor.get().is_none());
    }

    #[test]
    fn empty_facade_reports_absent() {
        assert!(ForwarderAccessor::empty().get().is_none());
    }

    #[test]
    fn clones_share_the_slot() {
        let accessor = ForwarderAccessor::new(Arc::new(NoopForwarder));
        let clone = accessor.clone();
        clone.reset();
        assert!(accessor.get().is_none());
    }

    #[test]
    fn held_reference_survives_reset() {
        let accessor = ForwarderAccessor::new(Arc::new(NoopForwarder));
        let held = accessor.get().unwrap();
        accessor.reset();
        assert!(accessor.get().is_none());
        assert!(held.start().is_ok());
    }
}
