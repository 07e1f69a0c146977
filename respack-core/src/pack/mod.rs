mod cipher;
mod entry;
mod flag;
mod header;

pub use cipher::*;
pub use entry::*;
pub use flag::*;
pub use header::*;

use crate::database::AssetDatabase;

/// Pack index, stores the header and the asset database.
#[derive(Debug, Clone)]
pub struct PackIndex {
    header: PackHeader,
    database: AssetDatabase,
}

impl PackIndex {
    pub fn new(header: PackHeader, database: AssetDatabase) -> Self {
        PackIndex { header, database }
    }

    pub fn header(&self) -> &PackHeader {
        &self.header
    }

    pub fn database(&self) -> &AssetDatabase {
        &self.database
    }
}
