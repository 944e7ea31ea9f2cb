// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::sync::Arc;
use std::time::Duration;

use datadog_serializer::artifact::BootstrapParams;
use datadog_serializer::bootstrap::{new_serializer, BootstrapError};
use datadog_serializer::config::LogLevel;
use datadog_serializer::logger::TracingLogAdapter;
use datadog_serializer::serializer::{Point, Series, SerializerError};

fn params() -> BootstrapParams {
    BootstrapParams {
        site: "datadoghq.com".to_string(),
        api_key: String::new(),
        log_level: "info".to_string(),
    }
}

fn adapter() -> Arc<TracingLogAdapter> {
    Arc::new(TracingLogAdapter::new(LogLevel::Info))
}

fn sample_series() -> Vec<Series> {
    vec![Series {
        metric: "demo.requests".to_string(),
        points: vec![Point {
            timestamp: 1,
            value: 1.0,
        }],
        tags: vec!["env:test".to_string()],
    }]
}

#[tokio::test]
async fn bootstrap_with_empty_credential_submits_empty_collection() {
    let (serializer, lifecycle) = new_serializer(adapter(), &params()).unwrap();

    assert!(serializer.forwarder().get().is_some());
    serializer.send_iterable_series(None).await.unwrap();
    serializer
        .send_iterable_series(Some(Vec::new()))
        .await
        .unwrap();

    lifecycle.stop();
}

#[tokio::test]
async fn submissions_flow_into_the_started_forwarder() {
    let (serializer, lifecycle) = new_serializer(adapter(), &params()).unwrap();

    serializer
        .send_iterable_series(Some(sample_series()))
        .await
        .unwrap();

    lifecycle.stop();
}

#[tokio::test]
async fn reset_empties_the_facade_without_stopping_the_loop() {
    let (serializer, lifecycle) = new_serializer(adapter(), &params()).unwrap();

    serializer.forwarder().reset();
    assert!(serializer.forwarder().get().is_none());

    // A non-empty submission now fails; an empty one is still a no-op.
    let err = serializer
        .send_iterable_series(Some(sample_series()))
        .await
        .unwrap_err();
    assert!(matches!(err, SerializerError::NoForwarder));
    serializer.send_iterable_series(None).await.unwrap();

    lifecycle.stop();
}

#[tokio::test]
async fn stopped_forwarder_surfaces_submission_errors() {
    let (serializer, lifecycle) = new_serializer(adapter(), &params()).unwrap();

    lifecycle.stop();

    // The loop observes cancellation asynchronously; once it does, the
    // hand-off channel is gone and submissions fail instead of hanging.
    let mut result = Ok(());
    for _ in 0..100 {
        result = serializer.send_iterable_series(Some(sample_series())).await;
        if result.is_err() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(matches!(
        result.unwrap_err(),
        SerializerError::Forwarder(_)
    ));
}

#[tokio::test]
async fn malformed_log_level_is_a_fatal_configuration_error() {
    let mut bad = params();
    bad.log_level = "verbose".to_string();
    let err = new_serializer(adapter(), &bad).unwrap_err();
    assert!(matches!(err, BootstrapError::Config(_)));
}
