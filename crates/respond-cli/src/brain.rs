use std::sync::Arc;

use anyhow::{Context, Result};

use respond_config::{BrainBackend, BrainConfig};
use respond_storage::{Brain, MemoryBrain, SqliteBrain};

/// Open the brain described by the config.
pub fn open_brain(config: &BrainConfig) -> Result<Arc<dyn Brain>> {
    match config.backend {
        BrainBackend::Memory => {
            tracing::debug!("Using in-memory brain; responds will not persist");
            Ok(Arc::new(MemoryBrain::new()))
        }
        BrainBackend::Sqlite => {
            let path = config.resolved_path()?;
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
            let brain = SqliteBrain::open(&path)
                .with_context(|| format!("Failed to open brain at {}", path.display()))?;
            Ok(Arc::new(brain))
        }
    }
}

/// Human-readable brain location.
pub fn describe(config: &BrainConfig) -> String {
    match config.backend {
        BrainBackend::Memory => "memory".to_string(),
        BrainBackend::Sqlite => match config.resolved_path() {
            Ok(path) => format!("sqlite ({})", path.display()),
            Err(e) => format!("sqlite (unresolved: {e})"),
        },
    }
}
