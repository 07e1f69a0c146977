pub mod compressed;
pub mod encrypted;
pub mod entry;
pub mod range;
