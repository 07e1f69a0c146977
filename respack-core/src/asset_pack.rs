use std::sync::Arc;

use parking_lot::Mutex;
use rayon::prelude::*;

use crate::asset_type::AssetType;
use crate::compression;
use crate::database::AssetDatabase;
use crate::error::{CorruptArchive, PackError, Result};
use crate::filename;
use crate::pack::{PackCipher, PackEntry, PackHeader, PackIndex, entry_iv};
use crate::read::{self, io::entry::PackEntryReader, io::range::SharedReader};
use crate::resource_data::{ResourceData, ResourceDataStatic, ResourceDataStream};
use crate::system::ResourceDataReader;

/// An opened pack: its index plus either every blob in memory or a reader to fetch them from.
pub struct AssetPack {
    index: PackIndex,
    cipher: Option<PackCipher>,
    source: PackSource,
}

enum PackSource {
    /// Decrypted (still compressed) blobs, parallel to the database entries.
    Preloaded { blobs: Vec<Arc<[u8]>> },
    Lazy { reader: SharedReader },
}

impl AssetPack {
    /// Parses the pack; with `preload` every blob is read and decrypted up front.
    pub fn new(mut reader: Box<dyn ResourceDataReader>, encryption_key: &str, preload: bool) -> Result<Self> {
        let cipher = PackCipher::from_key(encryption_key);
        let index = read::read_index(&mut reader, cipher.as_ref())?;
        if cipher.is_some() && !index.header().is_encrypted() {
            log::warn!("Encryption key given for an unencrypted pack, ignoring it");
        }
        let cipher = if index.header().is_encrypted() { cipher } else { None };

        let source = if preload {
            let raw = index
                .database()
                .entries()
                .iter()
                .map(|entry| read::read_stored_blob(&mut reader, entry))
                .collect::<Result<Vec<_>>>()?;
            let blobs = raw
                .into_par_iter()
                .zip(index.database().entries().par_iter())
                .map(|(data, entry)| decrypt_blob(cipher.as_ref(), index.header(), entry, data).map(Arc::from))
                .collect::<Result<Vec<Arc<[u8]>>>>()?;
            PackSource::Preloaded { blobs }
        } else {
            PackSource::Lazy {
                reader: Arc::new(Mutex::new(reader)),
            }
        };

        log::debug!(
            "Opened pack with {} assets (encrypted: {}, preloaded: {})",
            index.database().len(),
            index.header().is_encrypted(),
            preload
        );

        Ok(Self { index, cipher, source })
    }

    pub fn header(&self) -> &PackHeader {
        self.index.header()
    }

    pub fn asset_database(&self) -> &AssetDatabase {
        self.index.database()
    }

    pub fn is_preloaded(&self) -> bool {
        matches!(self.source, PackSource::Preloaded { .. })
    }

    /// Looks up an asset. Streaming is only honored for lazily read packs;
    /// preloaded packs already hold the data and return it materialized.
    pub fn get_data(&self, name: &str, asset_type: AssetType, stream: bool) -> Result<ResourceData> {
        let database = self.index.database();
        let position = database
            .position(name, asset_type)
            .ok_or_else(|| PackError::not_found(name, asset_type))?;
        let entry = &database.entries()[position];

        match &self.source {
            PackSource::Preloaded { blobs } => {
                let data = decode_blob(entry, blobs[position].to_vec())?;
                Ok(ResourceData::Static(ResourceDataStatic::new(name, data)))
            }
            PackSource::Lazy { reader } if stream => {
                let entry_reader =
                    PackEntryReader::new(Arc::clone(reader), entry, self.cipher.clone(), self.header().iv())?;
                Ok(ResourceData::Stream(ResourceDataStream::new(
                    name,
                    entry.size(),
                    Box::new(entry_reader),
                )))
            }
            PackSource::Lazy { reader } => {
                let raw = {
                    let mut reader = reader.lock();
                    read::read_stored_blob(&mut *reader, entry)?
                };
                let data = decrypt_blob(self.cipher.as_ref(), self.header(), entry, raw)?;
                let data = decode_blob(entry, data)?;
                Ok(ResourceData::Static(ResourceDataStatic::new(name, data)))
            }
        }
    }
}

fn decrypt_blob(cipher: Option<&PackCipher>, header: &PackHeader, entry: &PackEntry, data: Vec<u8>) -> Result<Vec<u8>> {
    match cipher {
        Some(cipher) => Ok(cipher.decrypt(&entry_iv(header.iv(), entry.hash(), entry.asset_type()), &data)?),
        None => Ok(data),
    }
}

fn decode_blob(entry: &PackEntry, data: Vec<u8>) -> Result<Vec<u8>> {
    let data = compression::decompress(data, entry.compression(), entry.size()).map_err(|source| {
        CorruptArchive::Decode {
            name: entry.name().to_string(),
            source,
        }
    })?;
    let found = filename::checksum(&data);
    if found != entry.checksum() {
        return Err(CorruptArchive::EntryChecksum {
            name: entry.name().to_string(),
            expected: entry.checksum(),
            found,
        }
        .into());
    }

    Ok(data)
}

impl std::fmt::Debug for AssetPack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetPack")
            .field("header", self.header())
            .field("assets", &self.asset_database().len())
            .field("preloaded", &self.is_preloaded())
            .finish()
    }
}
