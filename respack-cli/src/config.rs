use std::path::{Path, PathBuf};

use anyhow::Context;
use respack_core::ResourceLocator;
use serde::Deserialize;

/// Packs to chain into a [`ResourceLocator`], read from a JSON file.
#[derive(Debug, Deserialize)]
pub struct LocatorConfig {
    pub packs: Vec<PackConfig>,
}

#[derive(Debug, Deserialize)]
pub struct PackConfig {
    pub path: PathBuf,
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub preload: bool,
    #[serde(default)]
    pub priority: i32,
}

impl LocatorConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path).with_context(|| format!("Config file `{}` not found.", path.display()))?;
        let config = serde_json::from_str(&data).with_context(|| format!("Invalid config file `{}`", path.display()))?;
        Ok(config)
    }

    pub fn add_to(&self, locator: &mut ResourceLocator) -> anyhow::Result<()> {
        for pack in &self.packs {
            locator
                .add_pack(&pack.path, &pack.key, pack.preload, pack.priority)
                .with_context(|| format!("Failed to open pack `{}`", pack.path.display()))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_config() {
        let config: LocatorConfig = serde_json::from_str(
            r#"{"packs": [{"path": "base.dat"}, {"path": "dlc.dat", "key": "k", "preload": true, "priority": 5}]}"#,
        )
        .unwrap();
        assert_eq!(config.packs.len(), 2);
        assert_eq!(config.packs[0].key, "");
        assert!(!config.packs[0].preload);
        assert_eq!(config.packs[1].priority, 5);
        assert!(config.packs[1].preload);
    }
}
