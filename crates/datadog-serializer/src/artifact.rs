// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Transient configuration artifact rendering.
//!
//! The bootstrap does not read an operator-provided `datadog.yaml`; it renders
//! one from a small set of bootstrap parameters into a fresh temporary
//! directory, lets the configuration loader consume it exactly once, and
//! removes it again. The artifact lives only as long as the [`ConfigArtifact`]
//! value does.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;

const DEFAULT_SITE: &str = "datadoghq.com";
const DEFAULT_LOG_LEVEL: &str = "info";
const ARTIFACT_FILE_NAME: &str = "datadog.yaml";

/// Parameters rendered into the configuration artifact.
///
/// Built once at process start and consumed only by [`ConfigArtifact`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootstrapParams {
    pub site: String,
    pub api_key: String,
    pub log_level: String,
}

impl BootstrapParams {
    /// Reads the bootstrap parameters from the process environment.
    ///
    /// `DD_API_KEY` is the only recognized input; a missing key yields an
    /// empty credential rather than an error, so the pipeline can still be
    /// assembled unauthenticated.
    pub fn from_env() -> Self {
        BootstrapParams {
            site: DEFAULT_SITE.to_string(),
            api_key: env::var("DD_API_KEY").unwrap_or_default(),
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// A rendered `datadog.yaml` under a uniquely named temporary directory.
///
/// The directory and file are removed when this value is dropped, including
/// on early-error paths of the bootstrap.
#[derive(Debug)]
pub struct ConfigArtifact {
    dir: TempDir,
    path: PathBuf,
}

impl ConfigArtifact {
    /// Renders `params` into a fresh artifact under the system temp location.
    pub fn materialize(params: &BootstrapParams) -> io::Result<Self> {
        Self::create(tempfile::Builder::new().prefix("conf").tempdir()?, params)
    }

    /// Renders `params` into a fresh artifact under `base`.
    ///
    /// `base` must already exist; a missing or unwritable base surfaces as the
    /// same fatal I/O error the default location would.
    pub fn materialize_in(base: &Path, params: &BootstrapParams) -> io::Result<Self> {
        Self::create(
            tempfile::Builder::new().prefix("conf").tempdir_in(base)?,
            params,
        )
    }

    fn create(dir: TempDir, params: &BootstrapParams) -> io::Result<Self> {
        let path = dir.path().join(ARTIFACT_FILE_NAME);
        fs::write(&path, render(params))?;
        debug!("Rendered configuration artifact at {}", path.display());
        Ok(ConfigArtifact { dir, path })
    }

    /// Location of the rendered `datadog.yaml`.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Location of the temporary directory holding the artifact.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }
}

// Must stay key-for-key compatible with what `config::Config` expects.
fn render(params: &BootstrapParams) -> String {
    format!(
        "logs_enabled: true
log_level: {}
site: {}
api_key: {}
apm_config:
  enabled: true
  apm_non_local_traffic: true
forwarder_timeout: 10
",
        params.log_level, params.site, params.api_key
    )
}
