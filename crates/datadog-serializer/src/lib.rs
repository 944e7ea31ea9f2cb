// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Bootstrap for a minimal telemetry-submission pipeline.
//!
//! This crate assembles the components required to submit series data to the
//! Datadog intake: an ephemeral configuration artifact, a structured
//! configuration handle, a logging adapter, the default forwarder with its
//! background send loop, and the serializer client handed back to the caller.
//!
//! The modules map onto the bootstrap stages:
//! - [`artifact`]: renders bootstrap parameters into a transient `datadog.yaml`
//! - [`config`]: parses the artifact into an immutable [`config::Config`]
//! - [`logger`]: adapts the installed `tracing` dispatcher into the
//!   [`logger::LogComponent`] capability the components expect
//! - [`graph`]: per-bootstrap dependency graph with topological construction
//! - [`forwarder`]: the forwarder contract and its channel-backed default
//! - [`lifecycle`]: starts (and can later stop) the forwarder's send loop
//! - [`accessor`]: narrow get/reset facade over the current forwarder
//! - [`serializer`]: the client returned to the caller
//! - [`bootstrap`]: wires all of the above together

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod accessor;
pub mod artifact;
pub mod bootstrap;
pub mod config;
pub mod forwarder;
pub mod graph;
pub mod lifecycle;
pub mod logger;
pub mod serializer;
