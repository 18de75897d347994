//! Config loading, validation, and conversion into runtime types.

use super::model::{AgentEntry, Config};
use crate::agent::{AgentDescriptor, AgentRegistry};
use crate::error::{ConductorError, Result};
use crate::orchestrator::OrchestratorSettings;
use std::path::{Path, PathBuf};
use std::time::Duration;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Returns `Ok(None)` if the file does not exist.
    /// Returns `Err` if the file exists but cannot be read or parsed.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<Self>> {
        let path = path.as_ref();

        if !path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(path).map_err(|e| {
            ConductorError::ConfigError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content).map(Some)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| ConductorError::ConfigError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            ConductorError::ConfigError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values.
    ///
    /// Validation rules:
    /// - Timeouts and `max_concurrency` must be positive
    /// - Agent names and paths must not be empty
    /// - An interpreter must parse into at least one word
    pub fn validate(&self) -> Result<()> {
        if self.defaults.run_timeout_seconds == 0 {
            return Err(invalid("defaults.run_timeout_seconds must be greater than 0"));
        }
        if self.defaults.batch_timeout_seconds == 0 {
            return Err(invalid("defaults.batch_timeout_seconds must be greater than 0"));
        }
        if self.defaults.max_concurrency == 0 {
            return Err(invalid("defaults.max_concurrency must be greater than 0"));
        }

        for (name, agent) in &self.agents {
            if name.is_empty() {
                return Err(invalid("agent name cannot be empty"));
            }
            if agent.path.as_os_str().is_empty() {
                return Err(invalid(&format!("agent '{}' has empty path", name)));
            }
            interpreter_words(name, agent)?;
        }

        Ok(())
    }

    /// Build the agent registry, resolving relative paths against `base_dir`.
    ///
    /// Availability is computed here, once.
    pub fn build_registry(&self, base_dir: &Path) -> Result<AgentRegistry> {
        let mut registry = AgentRegistry::new();
        for (name, agent) in &self.agents {
            registry.insert(
                AgentDescriptor::new(
                    name.as_str(),
                    resolve(base_dir, &agent.path),
                    agent.description.as_str(),
                )
                .with_interpreter(interpreter_words(name, agent)?)
                .with_environment(agent.environment.clone()),
            );
        }
        Ok(registry)
    }

    /// Orchestrator settings, resolving the workspace against `base_dir`.
    pub fn settings(&self, base_dir: &Path) -> OrchestratorSettings {
        OrchestratorSettings {
            workspace: resolve(base_dir, &self.workspace),
            run_timeout: Duration::from_secs(self.defaults.run_timeout_seconds),
            batch_timeout: Duration::from_secs(self.defaults.batch_timeout_seconds),
            max_workers: self.defaults.max_concurrency,
        }
    }

    /// Event log path, resolved against `base_dir`.
    pub fn events_path(&self, base_dir: &Path) -> Option<PathBuf> {
        self.events_file.as_ref().map(|p| resolve(base_dir, p))
    }
}

fn invalid(message: &str) -> ConductorError {
    ConductorError::ConfigError(format!("config validation failed: {}", message))
}

fn interpreter_words(name: &str, agent: &AgentEntry) -> Result<Vec<String>> {
    let Some(interpreter) = &agent.interpreter else {
        return Ok(Vec::new());
    };

    let words = shell_words::split(interpreter).map_err(|e| {
        invalid(&format!(
            "agent '{}' has unparseable interpreter '{}': {}",
            name, interpreter, e
        ))
    })?;

    if words.is_empty() {
        return Err(invalid(&format!("agent '{}' has empty interpreter", name)));
    }
    Ok(words)
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}
