use crate::asset_type::AssetType;
use crate::pack::FeatureFlags;

pub type Result<T> = std::result::Result<T, PackError>;

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("Upstream IO Error: {0}")]
    IO(#[from] std::io::Error),

    #[error("Asset not found: {asset_type}:{name}")]
    NotFound { name: String, asset_type: AssetType },
    #[error("Corrupt archive: {0}")]
    CorruptArchive(#[from] CorruptArchive),
    #[error("No system services available to reopen the pack")]
    ServicesUnavailable,

    #[error("Duplicate asset in pack: {asset_type}:{name}")]
    DuplicateAsset { name: String, asset_type: AssetType },
    #[error("Invalid asset name `{0}`: must be a relative path without `..`")]
    InvalidAssetName(String),
    #[error("Unknown asset type: {0}")]
    UnknownAssetType(String),
    #[error("Text asset `{0}` is not valid UTF-8")]
    InvalidText(String),
}

impl PackError {
    pub fn not_found(name: &str, asset_type: AssetType) -> Self {
        Self::NotFound {
            name: name.to_string(),
            asset_type,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    pub fn is_corrupt(&self) -> bool {
        matches!(self, Self::CorruptArchive(_))
    }
}

/// Structural or cryptographic failures while reading a pack.
#[derive(Debug, thiserror::Error)]
pub enum CorruptArchive {
    #[error("Invalid pack magic: expected {expected:X?}, found {found:X?}")]
    InvalidMagic { expected: [u8; 4], found: [u8; 4] },
    #[error("Unsupported pack version: {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },
    #[error("Pack contains unsupported feature flags: 0x{0:X}")]
    UnsupportedFeature(FeatureFlags),
    #[error("Pack is encrypted but no encryption key was given")]
    MissingKey,
    #[error("Failed to decrypt pack data")]
    Decryption,
    #[error("Index checksum mismatch: expected {expected:08x}, found {found:08x}")]
    IndexChecksum { expected: u32, found: u32 },
    #[error("Checksum mismatch for `{name}`: expected {expected:08x}, found {found:08x}")]
    EntryChecksum { name: String, expected: u32, found: u32 },
    #[error("Invalid index: {0}")]
    InvalidIndex(String),
    #[error("Failed to decode `{name}`: {source}")]
    Decode {
        name: String,
        source: crate::compression::CompressionError,
    },
    #[error("Invalid entry range: offset={offset}, size={size}, file_size={file_size}")]
    InvalidEntryRange { offset: u64, size: u64, file_size: u64 },
    #[error("Unexpected end of pack data")]
    Truncated,
}

impl PackError {
    /// Maps an early EOF while parsing structure to [`CorruptArchive::Truncated`].
    pub(crate) fn from_structure_io(err: std::io::Error) -> Self {
        if err.kind() == std::io::ErrorKind::UnexpectedEof {
            CorruptArchive::Truncated.into()
        } else {
            PackError::IO(err)
        }
    }
}
