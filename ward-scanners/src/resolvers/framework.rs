//! Framework resolver: manifest, env keys, config file discovery

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use ward_core::domain::{ContextResolver, ProjectContext, ResolveError};

use crate::envfile::EnvFile;

/// Mask stored in place of every env value; scanners re-read `.env` when
/// they need the real thing.
const ENV_VALUE_MASK: &str = "***";

#[derive(Debug, Deserialize)]
struct ComposerManifest {
    #[serde(default)]
    name: String,
    #[serde(default)]
    require: BTreeMap<String, String>,
}

/// Resolves framework and PHP versions, the project name, declared
/// dependencies, env variable names, and the `config/` file list.
#[derive(Debug, Default)]
pub struct FrameworkResolver;

impl FrameworkResolver {
    pub fn new() -> Self {
        Self
    }

    async fn resolve_composer(&self, root: &Path, project: &mut ProjectContext) {
        let Ok(raw) = tokio::fs::read_to_string(root.join("composer.json")).await else {
            return;
        };
        let Ok(manifest) = serde_json::from_str::<ComposerManifest>(&raw) else {
            return;
        };

        if project.project_name.is_empty() && !manifest.name.is_empty() {
            project.project_name = manifest.name.clone();
        }
        if let Some(version) = manifest.require.get("laravel/framework") {
            project.laravel_version = version.clone();
        }
        if let Some(version) = manifest.require.get("php") {
            project.php_version = version.clone();
        }
        project.composer_deps = manifest.require;
    }

    async fn resolve_env(&self, root: &Path, project: &mut ProjectContext) {
        let Ok(content) = tokio::fs::read_to_string(root.join(".env")).await else {
            return;
        };
        let env = EnvFile::parse(&content);

        if project.project_name.is_empty() {
            if let Some(name) = env.get("APP_NAME") {
                project.project_name = name.to_string();
            }
        }
        project.env_variables = env
            .keys()
            .map(|key| (key.to_string(), ENV_VALUE_MASK.to_string()))
            .collect();
    }

    async fn discover_config_files(&self, root: &Path, project: &mut ProjectContext) {
        let Ok(mut entries) = tokio::fs::read_dir(root.join("config")).await else {
            return;
        };
        let mut files = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = entry.file_name().to_string_lossy().to_string();
            if entry.file_type().await.map(|t| t.is_file()).unwrap_or(false)
                && name.ends_with(".php")
            {
                files.push(format!("config/{name}"));
            }
        }
        files.sort();
        project.config_files = files;
    }
}

#[async_trait]
impl ContextResolver for FrameworkResolver {
    fn name(&self) -> &'static str {
        "framework"
    }

    fn priority(&self) -> u32 {
        10
    }

    async fn resolve(
        &self,
        root: &Path,
        project: &mut ProjectContext,
    ) -> Result<(), ResolveError> {
        project.root_path = root.to_path_buf();
        project.framework_type = "laravel".to_string();

        self.resolve_composer(root, project).await;
        self.resolve_env(root, project).await;
        self.discover_config_files(root, project).await;
        Ok(())
    }
}
