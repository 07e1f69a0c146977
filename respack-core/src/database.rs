use std::collections::HashMap;
use std::hash::BuildHasherDefault;

use nohash::NoHashHasher;
use serde::Serialize;

use crate::asset_type::AssetType;
use crate::error::{PackError, Result};
use crate::filename::name_hash;
use crate::metadata::Metadata;
use crate::pack::PackEntry;

/// Ordered index of the assets available in a pack.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(transparent)]
pub struct AssetDatabase {
    entries: Vec<PackEntry>,
    #[serde(skip)]
    lookup: HashMap<u64, Vec<usize>, BuildHasherDefault<NoHashHasher<u64>>>,
}

impl AssetDatabase {
    pub fn from_entries(entries: Vec<PackEntry>) -> Result<Self> {
        let mut this = Self {
            entries: Vec::with_capacity(entries.len()),
            lookup: HashMap::default(),
        };
        for entry in entries {
            this.push(entry)?;
        }
        Ok(this)
    }

    fn push(&mut self, entry: PackEntry) -> Result<()> {
        if self.get(entry.name(), entry.asset_type()).is_some() {
            return Err(PackError::DuplicateAsset {
                name: entry.name().to_string(),
                asset_type: entry.asset_type(),
            });
        }
        self.lookup.entry(entry.hash()).or_default().push(self.entries.len());
        self.entries.push(entry);
        Ok(())
    }

    pub fn get(&self, name: &str, asset_type: AssetType) -> Option<&PackEntry> {
        self.position(name, asset_type).map(|i| &self.entries[i])
    }

    /// Index of the asset in [`entries`](Self::entries).
    pub fn position(&self, name: &str, asset_type: AssetType) -> Option<usize> {
        self.lookup.get(&name_hash(name))?.iter().copied().find(|&i| {
            let e = &self.entries[i];
            e.asset_type() == asset_type && e.name() == name
        })
    }

    pub fn contains(&self, name: &str, asset_type: AssetType) -> bool {
        self.get(name, asset_type).is_some()
    }

    pub fn meta(&self, name: &str, asset_type: AssetType) -> Option<&Metadata> {
        self.get(name, asset_type).map(PackEntry::meta)
    }

    pub fn entries(&self) -> &[PackEntry] {
        &self.entries
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, AssetType, &Metadata)> {
        self.entries.iter().map(|e| (e.name(), e.asset_type(), e.meta()))
    }

    pub fn asset_names(&self, asset_type: AssetType) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |e| e.asset_type() == asset_type)
            .map(PackEntry::name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PartialEq for AssetDatabase {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}
