mod pack;

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

pub use pack::{PackResourceLocator, PackResourceLocatorBuilder};

use crate::asset_type::AssetType;
use crate::database::AssetDatabase;
use crate::error::{PackError, Result};
use crate::metadata::Metadata;
use crate::resource_data::ResourceData;
use crate::system::SystemApi;

/// A source of assets that [`ResourceLocator`] can chain.
pub trait ResourceLocatorProvider: Send {
    fn get_data(&mut self, asset: &str, asset_type: AssetType, stream: bool) -> Result<ResourceData>;

    /// The returned index borrows the provider's current state; it cannot outlive a purge.
    fn asset_database(&mut self) -> Result<&AssetDatabase>;

    /// Releases the in-memory state. `asset`/`asset_type` name what triggered the purge.
    fn purge(&mut self, system: &Arc<dyn SystemApi>, asset: &str, asset_type: AssetType);

    fn priority(&self) -> i32 {
        0
    }

    fn name(&self) -> String;
}

/// Chains providers and routes each asset to the highest-priority provider holding it.
pub struct ResourceLocator {
    system: Arc<dyn SystemApi>,
    providers: Vec<Box<dyn ResourceLocatorProvider>>,
    assets: HashMap<(AssetType, String), usize>,
}

impl ResourceLocator {
    pub fn new(system: Arc<dyn SystemApi>) -> Self {
        Self {
            system,
            providers: Vec::new(),
            assets: HashMap::new(),
        }
    }

    pub fn system(&self) -> &Arc<dyn SystemApi> {
        &self.system
    }

    pub fn add_provider(&mut self, provider: Box<dyn ResourceLocatorProvider>) -> Result<()> {
        let index = self
            .providers
            .partition_point(|p| p.priority() >= provider.priority());
        log::debug!("Adding locator {} with priority {}", provider.name(), provider.priority());
        self.providers.insert(index, provider);
        self.rebuild_asset_map()
    }

    /// Opens a pack through the system services and adds it to the chain.
    pub fn add_pack(&mut self, path: impl AsRef<Path>, encryption_key: &str, preload: bool, priority: i32) -> Result<()> {
        let locator = PackResourceLocator::builder()
            .encryption_key(encryption_key)
            .preload(preload)
            .priority(priority)
            .open(self.system.as_ref(), path)?;
        self.add_provider(Box::new(locator))
    }

    fn rebuild_asset_map(&mut self) -> Result<()> {
        self.assets.clear();
        // providers are sorted by descending priority; the first one to claim an asset keeps it
        for (index, provider) in self.providers.iter_mut().enumerate() {
            for (name, asset_type, _) in provider.asset_database()?.iter() {
                self.assets.entry((asset_type, name.to_string())).or_insert(index);
            }
        }
        Ok(())
    }

    fn provider_for(&self, asset: &str, asset_type: AssetType) -> Result<usize> {
        self.assets
            .get(&(asset_type, asset.to_string()))
            .copied()
            .ok_or_else(|| PackError::not_found(asset, asset_type))
    }

    pub fn get_resource(&mut self, asset: &str, asset_type: AssetType, stream: bool) -> Result<ResourceData> {
        let index = self.provider_for(asset, asset_type)?;
        self.providers[index].get_data(asset, asset_type, stream)
    }

    pub fn get_metadata(&mut self, asset: &str, asset_type: AssetType) -> Result<Metadata> {
        let index = self.provider_for(asset, asset_type)?;
        self.providers[index]
            .asset_database()?
            .meta(asset, asset_type)
            .cloned()
            .ok_or_else(|| PackError::not_found(asset, asset_type))
    }

    pub fn contains(&self, asset: &str, asset_type: AssetType) -> bool {
        self.assets.contains_key(&(asset_type, asset.to_string()))
    }

    /// Names of every asset of `asset_type`, sorted.
    pub fn asset_list(&self, asset_type: AssetType) -> Vec<String> {
        let mut names: Vec<String> = self
            .assets
            .keys()
            .filter(|(t, _)| *t == asset_type)
            .map(|(_, name)| name.clone())
            .collect();
        names.sort();
        names
    }

    /// Purges the provider serving `asset`; unknown assets are ignored.
    pub fn purge(&mut self, asset: &str, asset_type: AssetType) {
        if let Ok(index) = self.provider_for(asset, asset_type) {
            self.providers[index].purge(&self.system, asset, asset_type);
        }
    }

    pub fn purge_all(&mut self) {
        for provider in &mut self.providers {
            provider.purge(&self.system, "", AssetType::BinaryFile);
        }
    }

    pub fn provider_count(&self) -> usize {
        self.providers.len()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::pack::CompressionType;
    use crate::test_util::{MemorySystem, build_pack};
    use crate::write::{FileOptions, PackWriter};

    fn patch_pack() -> Vec<u8> {
        let mut writer = PackWriter::new(Cursor::new(Vec::new()));
        writer
            .add_asset("hero.png", AssetType::Texture, FileOptions::default(), b"patched hero")
            .unwrap();
        writer
            .add_asset("settings.yaml", AssetType::ConfigFile, FileOptions::default(), b"volume: 3")
            .unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn chain() -> ResourceLocator {
        let system = MemorySystem::with_files([
            ("base.dat", build_pack("", CompressionType::Zstd)),
            ("patch.dat", patch_pack()),
        ]);
        let mut locator = ResourceLocator::new(system);
        locator.add_pack("base.dat", "", true, 0).unwrap();
        locator.add_pack("patch.dat", "", false, 10).unwrap();
        locator
    }

    #[test]
    fn test_priority_wins() {
        let mut locator = chain();
        assert_eq!(locator.provider_count(), 2);
        let hero = locator.get_resource("hero.png", AssetType::Texture, false).unwrap();
        assert_eq!(hero.into_bytes().unwrap(), b"patched hero");
        let font = locator.get_resource("ui.font", AssetType::Font, false).unwrap();
        assert_eq!(font.into_bytes().unwrap(), b"font glyph table");
        assert_eq!(locator.get_metadata("ui.font", AssetType::Font).unwrap().get_string("source"), Some("ui.font"));
    }

    #[test]
    fn test_asset_list_and_missing() {
        let mut locator = chain();
        assert_eq!(locator.asset_list(AssetType::Texture), ["hero.png"]);
        assert_eq!(locator.asset_list(AssetType::ConfigFile), ["settings.yaml"]);
        assert!(locator.contains("theme.ogg", AssetType::AudioClip));
        let err = locator.get_resource("theme.ogg", AssetType::Font, false).unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_purge_through_chain() {
        let mut locator = chain();
        locator.purge("theme.ogg", AssetType::AudioClip);
        assert_eq!(locator.get_resource("hero.png", AssetType::Texture, false).unwrap().path(), "hero.png");
        locator.purge("nothing", AssetType::Shader);
        let theme = locator.get_resource("theme.ogg", AssetType::AudioClip, true).unwrap();
        assert!(!theme.into_bytes().unwrap().is_empty());

        locator.purge_all();
        let hero = locator.get_resource("hero.png", AssetType::Texture, false).unwrap();
        assert_eq!(hero.into_bytes().unwrap(), b"patched hero");
    }
}
