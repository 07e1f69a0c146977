mod entry;
mod header;

pub use entry::EntryRecord;
pub use header::Header;
