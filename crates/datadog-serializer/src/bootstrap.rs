// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! One-shot assembly of the telemetry-submission pipeline.
//!
//! The bootstrap renders the configuration artifact, declares the component
//! graph, resolves it, and only then hands the forwarder's send loop off to
//! a background task. Artifact, configuration, and graph failures abort the
//! call with no partial result; a forwarder-start failure is logged and the
//! caller still receives a working serializer client.

use std::io;
use std::sync::Arc;

use thiserror::Error;

use crate::accessor::ForwarderAccessor;
use crate::artifact::{BootstrapParams, ConfigArtifact};
use crate::config::{Config, ConfigError};
use crate::forwarder::{DefaultForwarder, ForwarderParams};
use crate::graph::{dependency, GraphBuilder, GraphError};
use crate::lifecycle::ForwarderLifecycle;
use crate::logger::{LogComponent, TracingLogAdapter};
use crate::serializer::Serializer;

#[derive(Debug, Error)]
#[allow(clippy::module_name_repetitions)]
pub enum BootstrapError {
    #[error("failed to materialize configuration artifact: {0}")]
    Artifact(#[from] io::Error),
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
    #[error("dependency graph error: {0}")]
    Graph(#[from] GraphError),
}

/// Assembles the submission pipeline and returns the serializer client
/// together with the lifecycle handle of the started forwarder.
///
/// Must run inside a Tokio runtime: the forwarder's send loop is spawned
/// onto it. The call never waits for the loop to become ready, and dropping
/// the returned lifecycle handle leaves the loop running until process exit.
pub fn new_serializer(
    log: Arc<TracingLogAdapter>,
    params: &BootstrapParams,
) -> Result<(Serializer, ForwarderLifecycle), BootstrapError> {
    log.debug(&format!(
        "Bootstrapping submission pipeline at {} verbosity",
        log.level()
    ));

    // Scoped: the artifact directory is removed when this value drops, on
    // the error paths below included.
    let artifact = ConfigArtifact::materialize(params)?;

    let mut graph = GraphBuilder::new();
    graph.supply_shared(Arc::clone(&log));

    let config_path = artifact.path().to_path_buf();
    graph.provide::<Config, _>(Vec::new(), move |_| Ok(Config::from_file(&config_path)?));

    graph.provide::<ForwarderParams, _>(
        vec![dependency::<Config>(), dependency::<TracingLogAdapter>()],
        |components| {
            let config = components.get::<Config>()?;
            let log = components.get::<TracingLogAdapter>()?;
            Ok(ForwarderParams::new(config, log))
        },
    );

    graph.provide::<DefaultForwarder, _>(vec![dependency::<ForwarderParams>()], |components| {
        Ok(DefaultForwarder::new(&*components.get::<ForwarderParams>()?))
    });

    graph.provide::<ForwarderAccessor, _>(vec![dependency::<DefaultForwarder>()], |components| {
        Ok(ForwarderAccessor::new(components.get::<DefaultForwarder>()?))
    });

    graph.provide::<Serializer, _>(
        vec![
            dependency::<ForwarderAccessor>(),
            dependency::<Config>(),
            dependency::<TracingLogAdapter>(),
        ],
        |components| {
            Ok(Serializer::new(
                (*components.get::<ForwarderAccessor>()?).clone(),
                components.get::<Config>()?,
                components.get::<TracingLogAdapter>()?,
            ))
        },
    );

    let components = graph.resolve()?;
    let config: Arc<Config> = components.get()?;
    let forwarder: Arc<DefaultForwarder> = components.get()?;
    let serializer: Arc<Serializer> = components.get()?;

    // The loader has consumed the artifact; release its backing storage.
    drop(artifact);
    log.debug(&format!("Component graph resolved for {}", config.site));

    let lifecycle =
        ForwarderLifecycle::new(forwarder, Arc::clone(&log) as Arc<dyn LogComponent>);
    lifecycle.start();

    Ok(((*serializer).clone(), lifecycle))
}
