//! Configuration file discovery.
//!
//! - Per-OS registry of known application config locations
//! - `~` expansion and lexical absolutization
//! - Optional upward search for project-local files
//! - A service that parses every file found and enriches its servers

mod bubble;
mod paths;
mod registry;
mod service;

pub use bubble::{find_in_parent_directories, MAX_BUBBLE_STEPS};
pub use paths::{absolutize, expand_home};
pub use registry::{friendly_name, AppPaths, BaseDirs, PathCandidate, PathRegistry, TargetOs};
pub use service::{
    retain_with_servers, ConfigFileReport, DiscoveryOptions, DiscoveryService, FileGroup,
    FileGroups, GroupStats, CUSTOM_GROUP,
};

use lsmcp_config::CustomPathSetting;
use thiserror::Error;

/// Errors that can occur while locating configuration files.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Unsupported operating system: {0}")]
    UnsupportedOs(String),

    #[error("App '{app}' not found for OS '{os}'")]
    UnknownApp { app: String, os: String },

    #[error("home directory could not be determined")]
    HomeDirUnavailable,
}

impl From<DiscoveryError> for lsmcp_common::Error {
    fn from(err: DiscoveryError) -> Self {
        match err {
            DiscoveryError::UnsupportedOs(os) => lsmcp_common::Error::UnsupportedPlatform(os),
            DiscoveryError::UnknownApp { app, os } => lsmcp_common::Error::UnknownApp { app, os },
            DiscoveryError::HomeDirUnavailable => lsmcp_common::Error::HomeDirUnavailable,
        }
    }
}

/// Register `customApps` from tool settings for one OS.
pub fn register_settings_apps<'a>(
    registry: &mut PathRegistry,
    os: TargetOs,
    apps: impl IntoIterator<Item = (&'a String, &'a Vec<CustomPathSetting>)>,
) {
    for (app, paths) in apps {
        let candidates = paths
            .iter()
            .map(|p| PathCandidate {
                file_path: p.file_path.clone().into(),
                scope: p.scope,
            })
            .collect();
        registry.register_custom_app(os, app, candidates);
    }
}
