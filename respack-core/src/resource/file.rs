use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::{RwLock, RwLockReadGuard};

use super::{AsyncResource, LoadableResource, Resource, ResourceBase};
use crate::asset_type::AssetType;
use crate::error::{PackError, Result};
use crate::metadata::Metadata;
use crate::resource_data::ResourceData;

/// Decodes `data` on the rayon pool into the payload `slot` picks out of `resource`.
///
/// The resource always ends up `Loaded` or `Failed`, also when `decode` panics.
fn spawn_decode<R, T, F>(resource: Arc<R>, data: ResourceData, slot: fn(&R) -> &RwLock<T>, decode: F)
where
    R: Resource + 'static,
    T: Send + Sync + 'static,
    F: FnOnce(&str, Vec<u8>) -> Result<T> + Send + 'static,
{
    resource.state().start_loading();
    rayon::spawn(move || {
        let asset_id = resource.asset_id();
        let decoded = panic::catch_unwind(AssertUnwindSafe(|| {
            data.into_bytes().and_then(|bytes| decode(asset_id, bytes))
        }));
        match decoded {
            Ok(Ok(value)) => {
                *slot(&*resource).write() = value;
                resource.state().done_loading();
            }
            Ok(Err(err)) => {
                log::error!("Failed to load `{}`: {}", asset_id, err);
                resource.state().loading_failed();
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .copied()
                    .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
                    .unwrap_or("unknown panic");
                log::error!("Decoder panicked while loading `{}`: {}", asset_id, reason);
                resource.state().loading_failed();
            }
        }
    });
}

/// Raw bytes of an asset.
#[derive(Debug)]
pub struct BinaryFile {
    base: ResourceBase,
    state: AsyncResource,
    data: RwLock<Vec<u8>>,
}

impl BinaryFile {
    /// `None` until the load completed successfully.
    pub fn data(&self) -> Option<RwLockReadGuard<'_, Vec<u8>>> {
        self.state.is_loaded().then(|| self.data.read())
    }
}

impl Resource for BinaryFile {
    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn state(&self) -> &AsyncResource {
        &self.state
    }

    fn reload(&mut self, other: Self) {
        self.base = other.base;
        self.state = other.state;
        self.data = other.data;
    }
}

impl LoadableResource for BinaryFile {
    const ASSET_TYPE: AssetType = AssetType::BinaryFile;

    fn load(asset_id: &str, data: ResourceData, meta: Metadata) -> Arc<Self> {
        let file = Arc::new(Self {
            base: ResourceBase::new(asset_id, meta),
            state: AsyncResource::new(),
            data: RwLock::new(Vec::new()),
        });
        spawn_decode(Arc::clone(&file), data, |file| &file.data, |_, bytes| Ok(bytes));
        file
    }
}

/// UTF-8 text asset.
#[derive(Debug)]
pub struct TextFile {
    base: ResourceBase,
    state: AsyncResource,
    text: RwLock<String>,
}

impl TextFile {
    pub fn text(&self) -> Option<RwLockReadGuard<'_, String>> {
        self.state.is_loaded().then(|| self.text.read())
    }
}

impl Resource for TextFile {
    fn base(&self) -> &ResourceBase {
        &self.base
    }

    fn state(&self) -> &AsyncResource {
        &self.state
    }

    fn reload(&mut self, other: Self) {
        self.base = other.base;
        self.state = other.state;
        self.text = other.text;
    }
}

impl LoadableResource for TextFile {
    const ASSET_TYPE: AssetType = AssetType::TextFile;

    fn load(asset_id: &str, data: ResourceData, meta: Metadata) -> Arc<Self> {
        let file = Arc::new(Self {
            base: ResourceBase::new(asset_id, meta),
            state: AsyncResource::new(),
            text: RwLock::new(String::new()),
        });
        spawn_decode(Arc::clone(&file), data, |file| &file.text, |asset_id, bytes| {
            String::from_utf8(bytes).map_err(|_| PackError::InvalidText(asset_id.to_string()))
        });
        file
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource_data::ResourceDataStatic;

    fn static_data(path: &str, bytes: &[u8]) -> ResourceData {
        ResourceData::Static(ResourceDataStatic::new(path, bytes.to_vec()))
    }

    #[test]
    fn test_binary_file() {
        let meta: Metadata = [("compressed", "false")].into_iter().collect();
        let file = BinaryFile::load("blob.bin", static_data("blob.bin", &[1, 2, 3]), meta);
        file.wait_for_load();
        assert!(file.is_loaded());
        assert_eq!(file.asset_id(), "blob.bin");
        assert_eq!(file.meta().get_bool("compressed"), Some(false));
        assert_eq!(file.data().unwrap().as_slice(), [1, 2, 3]);
    }

    #[test]
    fn test_text_file() {
        let file = TextFile::load("readme.txt", static_data("readme.txt", b"hello"), Metadata::new());
        file.wait_for_load();
        assert_eq!(file.text().unwrap().as_str(), "hello");

        let broken = TextFile::load("broken.txt", static_data("broken.txt", &[0xFF, 0xFE]), Metadata::new());
        broken.wait_for_load();
        assert!(broken.state().is_failed());
        assert!(broken.text().is_none());
    }

    #[test]
    fn test_panicking_decoder_fails_resource() {
        let file = Arc::new(BinaryFile {
            base: ResourceBase::new("bad.bin", Metadata::new()),
            state: AsyncResource::new(),
            data: RwLock::new(Vec::new()),
        });
        spawn_decode(
            Arc::clone(&file),
            static_data("bad.bin", &[1]),
            |file| &file.data,
            |_, _| -> Result<Vec<u8>> { panic!("decoder bug") },
        );
        file.wait_for_load();
        assert!(file.state().is_failed());
        assert!(file.data().is_none());
    }

    fn loaded_text(asset_id: &str, text: &str) -> TextFile {
        let file = TextFile {
            base: ResourceBase::new(asset_id, Metadata::new()),
            state: AsyncResource::new(),
            text: RwLock::new(text.to_string()),
        };
        file.state.start_loading();
        file.state.done_loading();
        file
    }

    #[test]
    fn test_reload_in_place() {
        let mut file = loaded_text("a.txt", "v1");
        file.reload(loaded_text("a.txt", "v2"));
        assert_eq!(file.text().unwrap().as_str(), "v2");
        assert!(file.is_loaded());
        assert_eq!(file.asset_id(), "a.txt");
    }
}
