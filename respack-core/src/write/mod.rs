use std::collections::HashSet;
use std::io::{Seek, SeekFrom, Write};

use crate::asset_type::AssetType;
use crate::compression;
use crate::error::{PackError, Result};
use crate::filename::{self, FileName};
use crate::metadata::Metadata;
use crate::pack::{CompressionType, FeatureFlags, PackCipher, PackEntry, PackHeader, entry_iv};
use crate::spec;

/// Per-asset options for [`PackWriter::start_asset`].
#[derive(Debug, Clone, Default)]
pub struct FileOptions {
    compression: CompressionType,
    meta: Metadata,
}

impl FileOptions {
    pub fn compression(mut self, compression: CompressionType) -> Self {
        self.compression = compression;
        self
    }

    pub fn meta(mut self, meta: Metadata) -> Self {
        self.meta = meta;
        self
    }
}

struct PendingAsset {
    name: String,
    asset_type: AssetType,
    options: FileOptions,
    data: Vec<u8>,
}

/// Builds a pack: blobs are written as assets are finished, the index and
/// header once [`finish`](Self::finish) is called.
pub struct PackWriter<W: Write + Seek> {
    pub(crate) inner: W,
    cipher: Option<PackCipher>,
    iv: [u8; 16],
    entries: Vec<PackEntry>,
    names: HashSet<(AssetType, String)>,
    current: Option<PendingAsset>,
    offset: u64,
    started: bool,
}

impl<W: Write + Seek> PackWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            cipher: None,
            iv: default_iv(""),
            entries: Vec::new(),
            names: HashSet::new(),
            current: None,
            offset: spec::Header::SIZE as u64,
            started: false,
        }
    }

    /// Encrypts the index and every blob; an empty key leaves the pack plain.
    pub fn encryption_key(mut self, key: &str) -> Self {
        self.cipher = PackCipher::from_key(key);
        self.iv = default_iv(key);
        self
    }

    pub fn iv(mut self, iv: [u8; 16]) -> Self {
        self.iv = iv;
        self
    }

    pub fn start_asset(&mut self, name: &str, asset_type: AssetType, options: FileOptions) -> Result<()> {
        self.flush_asset()?;
        if !filename::is_valid_name(name) {
            return Err(PackError::InvalidAssetName(name.to_string()));
        }
        if !self.names.insert((asset_type, name.to_string())) {
            return Err(PackError::DuplicateAsset {
                name: name.to_string(),
                asset_type,
            });
        }
        self.current = Some(PendingAsset {
            name: name.to_string(),
            asset_type,
            options,
            data: Vec::new(),
        });
        Ok(())
    }

    pub fn add_asset(&mut self, name: &str, asset_type: AssetType, options: FileOptions, data: &[u8]) -> Result<()> {
        self.start_asset(name, asset_type, options)?;
        self.write_all(data)?;
        Ok(())
    }

    fn flush_asset(&mut self) -> Result<()> {
        let Some(asset) = self.current.take() else {
            return Ok(());
        };
        if !self.started {
            self.inner.seek(SeekFrom::Start(spec::Header::SIZE as u64))?;
            self.started = true;
        }

        let hash = FileName::new(&asset.name).hash_mixed();
        let checksum = filename::checksum(&asset.data);
        let stored = compression::compress(&asset.data, asset.options.compression)
            .map_err(|e| std::io::Error::other(e.to_string()))?;
        let stored = match &self.cipher {
            Some(cipher) => cipher.encrypt(&entry_iv(&self.iv, hash, asset.asset_type), &stored),
            None => stored,
        };
        self.inner.write_all(&stored)?;

        self.entries.push(PackEntry {
            name: asset.name,
            asset_type: asset.asset_type,
            hash,
            offset: self.offset,
            stored_size: stored.len() as u64,
            size: asset.data.len() as u64,
            compression: asset.options.compression,
            checksum,
            meta: asset.options.meta,
        });
        self.offset += stored.len() as u64;
        Ok(())
    }

    /// Writes the index and the header, returning the inner writer.
    pub fn finish(mut self) -> Result<W> {
        self.flush_asset()?;
        if !self.started {
            self.inner.seek(SeekFrom::Start(spec::Header::SIZE as u64))?;
        }

        let mut index = Vec::new();
        for entry in &self.entries {
            entry.write_to(&mut index)?;
        }
        let index_checksum = filename::checksum(&index);
        let mut feature = FeatureFlags::empty();
        if let Some(cipher) = &self.cipher {
            index = cipher.encrypt(&self.iv, &index);
            feature |= FeatureFlags::ENCRYPTED;
        }
        let index_size = u32::try_from(index.len()).map_err(|_| std::io::Error::other("pack index too large"))?;
        let total_entries =
            u32::try_from(self.entries.len()).map_err(|_| std::io::Error::other("too many assets in pack"))?;
        self.inner.write_all(&index)?;

        let header = PackHeader::new(feature, total_entries, index_size, index_checksum, self.offset, self.iv);
        self.inner.seek(SeekFrom::Start(0))?;
        self.inner.write_all(&spec::Header::from(&header).into_bytes())?;
        self.inner.flush()?;

        log::debug!("Wrote pack with {} assets", self.entries.len());
        Ok(self.inner)
    }
}

impl<W: Write + Seek> Write for PackWriter<W> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match &mut self.current {
            Some(asset) => {
                asset.data.extend_from_slice(buf);
                Ok(buf.len())
            }
            None => Err(std::io::Error::other("no asset started")),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

fn default_iv(key: &str) -> [u8; 16] {
    let hash = blake3::derive_key("respack 2024-06-01 pack iv", key.as_bytes());
    let mut iv = [0u8; 16];
    iv.copy_from_slice(&hash[..16]);
    iv
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::asset_pack::AssetPack;

    #[test]
    fn test_write_without_asset() {
        let mut writer = PackWriter::new(Cursor::new(Vec::new()));
        assert!(writer.write_all(b"data").is_err());
    }

    #[test]
    fn test_duplicate_asset() {
        let mut writer = PackWriter::new(Cursor::new(Vec::new()));
        writer.add_asset("a", AssetType::Texture, FileOptions::default(), b"1").unwrap();
        writer.add_asset("a", AssetType::Sprite, FileOptions::default(), b"2").unwrap();
        let err = writer.add_asset("a", AssetType::Texture, FileOptions::default(), b"3").unwrap_err();
        assert!(matches!(err, PackError::DuplicateAsset { .. }));
    }

    #[test]
    fn test_rejects_escaping_names() {
        let mut writer = PackWriter::new(Cursor::new(Vec::new()));
        for name in ["../../escaped.txt", "/abs.txt", "", "ui/../../x"] {
            let err = writer.add_asset(name, AssetType::TextFile, FileOptions::default(), b"x").unwrap_err();
            assert!(matches!(err, PackError::InvalidAssetName(_)), "{name}");
        }
        writer.add_asset("ui/ok.txt", AssetType::TextFile, FileOptions::default(), b"x").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        let pack = AssetPack::new(Box::new(Cursor::new(bytes)), "", true).unwrap();
        assert_eq!(pack.asset_database().len(), 1);
    }

    #[test]
    fn test_empty_pack() {
        let bytes = PackWriter::new(Cursor::new(Vec::new())).finish().unwrap().into_inner();
        assert_eq!(bytes.len(), spec::Header::SIZE);
        let pack = AssetPack::new(Box::new(Cursor::new(bytes)), "", true).unwrap();
        assert!(pack.asset_database().is_empty());
    }

    #[test]
    fn test_metadata_and_order_survive() {
        let mut writer = PackWriter::new(Cursor::new(Vec::new())).encryption_key("k");
        let meta: Metadata = [("width", "32")].into_iter().collect();
        writer
            .add_asset("b.png", AssetType::Texture, FileOptions::default().meta(meta.clone()), b"png")
            .unwrap();
        writer.start_asset("a.txt", AssetType::TextFile, FileOptions::default()).unwrap();
        writer.write_all(b"hello ").unwrap();
        writer.write_all(b"world").unwrap();
        let bytes = writer.finish().unwrap().into_inner();

        let pack = AssetPack::new(Box::new(Cursor::new(bytes)), "k", false).unwrap();
        let names: Vec<_> = pack.asset_database().iter().map(|(n, _, _)| n).collect();
        assert_eq!(names, ["b.png", "a.txt"]);
        assert_eq!(pack.asset_database().meta("b.png", AssetType::Texture), Some(&meta));
        let text = pack.get_data("a.txt", AssetType::TextFile, false).unwrap();
        assert_eq!(text.into_bytes().unwrap(), b"hello world");
    }

    #[test]
    fn test_output_is_deterministic() {
        let build = || {
            let mut writer = PackWriter::new(Cursor::new(Vec::new())).encryption_key("k");
            writer
                .add_asset("x", AssetType::BinaryFile, FileOptions::default().compression(CompressionType::Zstd), b"xyz")
                .unwrap();
            writer.finish().unwrap().into_inner()
        };
        assert_eq!(build(), build());
    }
}
