pub mod asset_pack;
pub mod asset_type;
pub mod compression;
pub mod database;
pub mod error;
pub mod filename;
pub mod locator;
pub mod metadata;
pub mod pack;
pub mod read;
pub mod resource;
pub mod resource_data;
pub mod system;
pub mod write;

mod serde_util;
mod spec;
#[cfg(test)]
mod test_util;

pub use asset_pack::AssetPack;
pub use asset_type::{AssetType, ImportAssetType};
pub use database::AssetDatabase;
pub use error::{CorruptArchive, PackError, Result};
pub use locator::{PackResourceLocator, ResourceLocator, ResourceLocatorProvider};
pub use metadata::Metadata;
pub use resource_data::ResourceData;
pub use system::{OsSystemApi, ResourceDataReader, SystemApi};
