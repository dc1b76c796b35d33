use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use engine_logging::engine_info;
use pinboard_engine::EngineConfig;

/// Loads engine settings from a RON file, or the defaults when no file is given.
///
/// Fields missing from the file keep their default values.
pub fn load_engine_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: EngineConfig = ron::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    engine_info!("Loaded engine config from {:?}", path);
    Ok(config)
}
