//! Resolved project metadata shared with every scanner

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Project metadata populated by the resolver stage.
///
/// The context is created empty when the pipeline starts, written to only by
/// resolvers, and handed to scanners as a shared immutable reference. Env
/// variable values are masked here; a scanner that needs raw values must
/// re-read `.env` itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectContext {
    /// Absolute path of the acquired project root.
    pub root_path: PathBuf,
    pub framework_type: String,
    pub project_name: String,
    /// Version constraint of `laravel/framework` from the manifest.
    pub laravel_version: String,
    /// PHP version constraint from the manifest.
    pub php_version: String,
    /// Declared dependency constraints from `composer.json`.
    pub composer_deps: BTreeMap<String, String>,
    /// Resolved `name -> exact version` pairs from `composer.lock`.
    pub installed_packages: BTreeMap<String, String>,
    /// Env variable names; values are replaced with a mask.
    pub env_variables: BTreeMap<String, String>,
    /// Relative paths of files discovered under `config/`.
    pub config_files: Vec<String>,
}
