use std::path::{Path, PathBuf};
use std::sync::{Arc, Weak};

use crate::asset_pack::AssetPack;
use crate::asset_type::AssetType;
use crate::database::AssetDatabase;
use crate::error::{PackError, Result};
use crate::resource_data::ResourceData;
use crate::system::{ResourceDataReader, SystemApi};

use super::ResourceLocatorProvider;

#[derive(Debug, Default)]
pub struct PackResourceLocatorBuilder {
    encryption_key: String,
    preload: bool,
    priority: i32,
}

impl PackResourceLocatorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn encryption_key(mut self, key: impl Into<String>) -> Self {
        self.encryption_key = key.into();
        self
    }

    pub fn preload(mut self, enabled: bool) -> Self {
        self.preload = enabled;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Builds the locator from an already opened reader.
    pub fn build(self, reader: Box<dyn ResourceDataReader>, path: impl AsRef<Path>) -> Result<PackResourceLocator> {
        let mut locator = PackResourceLocator::new(reader, path, self.encryption_key, self.preload)?;
        locator.priority = self.priority;
        Ok(locator)
    }

    /// Opens `path` through `system` and builds the locator.
    pub fn open(self, system: &dyn SystemApi, path: impl AsRef<Path>) -> Result<PackResourceLocator> {
        let reader = system.get_data_reader(path.as_ref())?;
        self.build(reader, path)
    }
}

/// Serves assets out of a pack whose in-memory state can be dropped with
/// [`purge`](ResourceLocatorProvider::purge) and is rebuilt on next access.
pub struct PackResourceLocator {
    path: PathBuf,
    encryption_key: String,
    preload: bool,
    priority: i32,
    archive: Option<AssetPack>,
    system: Option<Weak<dyn SystemApi>>,
}

impl PackResourceLocator {
    pub fn builder() -> PackResourceLocatorBuilder {
        PackResourceLocatorBuilder::new()
    }

    /// The archive is parsed right away from `reader`; `path` is only used to reopen it after a purge.
    pub fn new(
        reader: Box<dyn ResourceDataReader>,
        path: impl AsRef<Path>,
        encryption_key: impl Into<String>,
        preload: bool,
    ) -> Result<Self> {
        let encryption_key = encryption_key.into();
        let archive = AssetPack::new(reader, &encryption_key, preload)?;
        Ok(Self {
            path: path.as_ref().to_path_buf(),
            encryption_key,
            preload,
            priority: 0,
            archive: Some(archive),
            system: None,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_preload(&self) -> bool {
        self.preload
    }

    /// Whether the archive is currently resident.
    pub fn is_loaded(&self) -> bool {
        self.archive.is_some()
    }

    fn ensure_loaded(&mut self) -> Result<&AssetPack> {
        let archive = match self.archive.take() {
            Some(archive) => archive,
            None => self.load_after_purge()?,
        };
        Ok(self.archive.insert(archive))
    }

    fn load_after_purge(&self) -> Result<AssetPack> {
        let system = self
            .system
            .as_ref()
            .and_then(Weak::upgrade)
            .ok_or(PackError::ServicesUnavailable)?;
        log::debug!("Reloading purged pack {}", self.path.display());
        let reader = system.get_data_reader(&self.path)?;
        AssetPack::new(reader, &self.encryption_key, self.preload)
    }
}

impl ResourceLocatorProvider for PackResourceLocator {
    fn get_data(&mut self, asset: &str, asset_type: AssetType, stream: bool) -> Result<ResourceData> {
        self.ensure_loaded()?.get_data(asset, asset_type, stream)
    }

    fn asset_database(&mut self) -> Result<&AssetDatabase> {
        Ok(self.ensure_loaded()?.asset_database())
    }

    fn purge(&mut self, system: &Arc<dyn SystemApi>, asset: &str, asset_type: AssetType) {
        // The whole archive is the unit of eviction, the asset only says what triggered it.
        if self.archive.take().is_some() {
            log::info!("Purged pack {} (requested for {asset_type}:{asset})", self.path.display());
        }
        self.system = Some(Arc::downgrade(system));
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    fn name(&self) -> String {
        self.path.display().to_string()
    }
}

impl std::fmt::Debug for PackResourceLocator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackResourceLocator")
            .field("path", &self.path)
            .field("preload", &self.preload)
            .field("priority", &self.priority)
            .field("loaded", &self.archive.is_some())
            .finish()
    }
}
