use std::collections::HashMap;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::asset_type::AssetType;
use crate::error::Result;
use crate::filename;
use crate::metadata::Metadata;
use crate::pack::{CompressionType, PackEntry, PackHeader};
use crate::read;
use crate::spec;
use crate::system::{ResourceDataReader, SystemApi};
use crate::write::{FileOptions, PackWriter};

pub(crate) fn sample_assets() -> Vec<(&'static str, AssetType, Vec<u8>)> {
    vec![
        ("hero.png", AssetType::Texture, b"\x89PNG\r\n\x1a\nhero pixels ".repeat(40)),
        ("theme.ogg", AssetType::AudioClip, b"OggS theme samples ".repeat(300)),
        ("ui.font", AssetType::Font, b"font glyph table".to_vec()),
    ]
}

pub(crate) fn build_pack(key: &str, compression: CompressionType) -> Vec<u8> {
    let mut writer = PackWriter::new(Cursor::new(Vec::new())).encryption_key(key);
    for (name, asset_type, data) in sample_assets() {
        let meta: Metadata = [("source", name)].into_iter().collect();
        let options = FileOptions::default().compression(compression).meta(meta);
        writer.add_asset(name, asset_type, options, &data).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

/// Rewrites the index of a plain pack after `edit` changed its entries.
pub(crate) fn tamper_index(bytes: &[u8], edit: impl FnOnce(&mut Vec<PackEntry>)) -> Vec<u8> {
    let index = read::read_index(&mut Cursor::new(bytes), None).unwrap();
    let header = index.header().clone();
    let mut entries = index.database().entries().to_vec();
    edit(&mut entries);

    let mut raw = Vec::new();
    for entry in &entries {
        entry.write_to(&mut raw).unwrap();
    }
    let header = PackHeader::new(
        header.feature(),
        entries.len() as u32,
        raw.len() as u32,
        filename::checksum(&raw),
        header.index_offset(),
        *header.iv(),
    );
    let mut out = bytes[..header.index_offset() as usize].to_vec();
    out[..spec::Header::SIZE].copy_from_slice(&spec::Header::from(&header).into_bytes());
    out.extend_from_slice(&raw);
    out
}

/// In-memory file system counting how many readers it handed out.
#[derive(Default)]
pub(crate) struct MemorySystem {
    files: HashMap<PathBuf, Vec<u8>>,
    opened: AtomicUsize,
}

impl MemorySystem {
    pub(crate) fn with_file(path: &str, data: Vec<u8>) -> Arc<Self> {
        Self::with_files([(path, data)])
    }

    pub(crate) fn with_files<'a>(files: impl IntoIterator<Item = (&'a str, Vec<u8>)>) -> Arc<Self> {
        Arc::new(Self {
            files: files.into_iter().map(|(path, data)| (PathBuf::from(path), data)).collect(),
            opened: AtomicUsize::new(0),
        })
    }

    pub(crate) fn opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

impl SystemApi for MemorySystem {
    fn get_data_reader(&self, path: &Path) -> Result<Box<dyn ResourceDataReader>> {
        self.opened.fetch_add(1, Ordering::SeqCst);
        let data = self
            .files
            .get(path)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, path.display().to_string()))?;
        Ok(Box::new(Cursor::new(data.clone())))
    }
}
