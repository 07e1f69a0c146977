mod file;
mod state;

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::sync::Arc;

pub use file::{BinaryFile, TextFile};
pub use state::{AsyncResource, LoadState};

use crate::asset_type::AssetType;
use crate::error::Result;
use crate::locator::ResourceLocator;
use crate::metadata::Metadata;
use crate::resource_data::ResourceData;

/// Identity shared by every resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceBase {
    asset_id: String,
    meta: Metadata,
}

impl ResourceBase {
    pub fn new(asset_id: impl Into<String>, meta: Metadata) -> Self {
        Self {
            asset_id: asset_id.into(),
            meta,
        }
    }
}

pub trait Resource: Send + Sync {
    fn base(&self) -> &ResourceBase;

    fn state(&self) -> &AsyncResource;

    /// Takes over the content of `other`, a newer load of the same asset.
    fn reload(&mut self, other: Self)
    where
        Self: Sized;

    fn asset_id(&self) -> &str {
        &self.base().asset_id
    }

    fn meta(&self) -> &Metadata {
        &self.base().meta
    }

    fn is_loaded(&self) -> bool {
        self.state().is_loaded()
    }

    fn wait_for_load(&self) {
        self.state().wait_for_load()
    }
}

/// A resource that can be built from locator data of a fixed asset type.
pub trait LoadableResource: Resource + Sized + 'static {
    const ASSET_TYPE: AssetType;

    /// Starts loading; the returned resource resolves once decoding finished.
    fn load(asset_id: &str, data: ResourceData, meta: Metadata) -> Arc<Self>;
}

/// Loads resources through a [`ResourceLocator`] and keeps them cached by name.
pub struct Resources {
    locator: ResourceLocator,
    cache: HashMap<(TypeId, String), Arc<dyn Any + Send + Sync>>,
}

impl Resources {
    pub fn new(locator: ResourceLocator) -> Self {
        Self {
            locator,
            cache: HashMap::new(),
        }
    }

    pub fn locator(&self) -> &ResourceLocator {
        &self.locator
    }

    pub fn locator_mut(&mut self) -> &mut ResourceLocator {
        &mut self.locator
    }

    /// Returns the cached resource or starts loading it.
    pub fn get<T: LoadableResource>(&mut self, name: &str) -> Result<Arc<T>> {
        let key = (TypeId::of::<T>(), name.to_string());
        if let Some(cached) = self.cache.get(&key)
            && let Ok(resource) = Arc::clone(cached).downcast::<T>()
        {
            return Ok(resource);
        }

        let meta = self.locator.get_metadata(name, T::ASSET_TYPE)?;
        let data = self.locator.get_resource(name, T::ASSET_TYPE, false)?;
        let resource = T::load(name, data, meta);
        self.cache.insert(key, resource.clone());
        Ok(resource)
    }

    pub fn is_cached<T: LoadableResource>(&self, name: &str) -> bool {
        self.cache.contains_key(&(TypeId::of::<T>(), name.to_string()))
    }

    /// Drops the cached handle; outstanding `Arc`s stay valid.
    pub fn unload<T: LoadableResource>(&mut self, name: &str) -> bool {
        self.cache.remove(&(TypeId::of::<T>(), name.to_string())).is_some()
    }

    /// Releases the locators' archives. Cached resources own their payloads and are kept.
    pub fn purge(&mut self) {
        log::info!("Purging resource locators ({} cached resources)", self.cache.len());
        self.locator.purge_all();
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::write::{FileOptions, PackWriter};
    use crate::test_util::MemorySystem;

    fn resources() -> Resources {
        let mut writer = PackWriter::new(Cursor::new(Vec::new())).encryption_key("k");
        let meta: Metadata = [("encoding", "utf-8")].into_iter().collect();
        writer
            .add_asset("intro.txt", AssetType::TextFile, FileOptions::default().meta(meta), b"Once upon a time")
            .unwrap();
        writer
            .add_asset("level.bin", AssetType::BinaryFile, FileOptions::default(), &[7; 64])
            .unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let mut locator = ResourceLocator::new(MemorySystem::with_file("game.dat", bytes));
        locator.add_pack("game.dat", "k", false, 0).unwrap();
        Resources::new(locator)
    }

    #[test]
    fn test_get_caches() {
        let mut resources = resources();
        let intro = resources.get::<TextFile>("intro.txt").unwrap();
        intro.wait_for_load();
        assert_eq!(intro.text().unwrap().as_str(), "Once upon a time");
        assert_eq!(intro.meta().get_string("encoding"), Some("utf-8"));

        let again = resources.get::<TextFile>("intro.txt").unwrap();
        assert!(Arc::ptr_eq(&intro, &again));
        assert_eq!(resources.len(), 1);

        let level = resources.get::<BinaryFile>("level.bin").unwrap();
        level.wait_for_load();
        assert_eq!(level.data().unwrap().len(), 64);
    }

    #[test]
    fn test_wrong_type_is_not_found() {
        let mut resources = resources();
        let err = resources.get::<BinaryFile>("intro.txt").unwrap_err();
        assert!(err.is_not_found());
        assert!(resources.is_empty());
    }

    #[test]
    fn test_unload_and_purge() {
        let mut resources = resources();
        let intro = resources.get::<TextFile>("intro.txt").unwrap();
        resources.purge();
        intro.wait_for_load();
        assert!(intro.is_loaded());

        assert!(resources.unload::<TextFile>("intro.txt"));
        assert!(!resources.is_cached::<TextFile>("intro.txt"));
        let reloaded = resources.get::<TextFile>("intro.txt").unwrap();
        assert!(!Arc::ptr_eq(&intro, &reloaded));
        reloaded.wait_for_load();
        assert_eq!(reloaded.text().unwrap().as_str(), "Once upon a time");
    }
}
