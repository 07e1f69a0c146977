use bitflags::bitflags;
use serde::{Deserialize, Serialize};

#[repr(u8)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionType {
    #[default]
    None = 0,
    Deflate = 1,
    Zstd = 2,
}

impl CompressionType {
    const MASK: u32 = 0xF;

    pub fn from_attributes(attributes: u32) -> Option<Self> {
        match attributes & Self::MASK {
            0 => Some(CompressionType::None),
            1 => Some(CompressionType::Deflate),
            2 => Some(CompressionType::Zstd),
            _ => None,
        }
    }

    pub fn into_attributes(self) -> u32 {
        self as u32
    }
}

impl std::str::FromStr for CompressionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "none" | "store" => Ok(CompressionType::None),
            "deflate" => Ok(CompressionType::Deflate),
            "zstd" => Ok(CompressionType::Zstd),
            _ => Err(format!("unknown compression type `{s}`")),
        }
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
    pub struct FeatureFlags: u16 {
        const ENCRYPTED = 1 << 0;
    }
}

impl FeatureFlags {
    pub fn check_supported(&self) -> bool {
        let supported_flags = FeatureFlags::ENCRYPTED;
        self.bits() & !supported_flags.bits() == 0
    }

    pub fn is_encrypted(&self) -> bool {
        self.contains(FeatureFlags::ENCRYPTED)
    }
}

impl Serialize for FeatureFlags {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_u16(self.bits())
    }
}

impl<'de> Deserialize<'de> for FeatureFlags {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = u16::deserialize(deserializer)?;
        Ok(FeatureFlags::from_bits_truncate(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compression_attributes() {
        for c in [CompressionType::None, CompressionType::Deflate, CompressionType::Zstd] {
            assert_eq!(CompressionType::from_attributes(c.into_attributes()), Some(c));
        }
        assert_eq!(CompressionType::from_attributes(0xF0 | 2), Some(CompressionType::Zstd));
        assert_eq!(CompressionType::from_attributes(7), None);
    }

    #[test]
    fn test_feature_support() {
        assert!(FeatureFlags::ENCRYPTED.check_supported());
        assert!(FeatureFlags::empty().check_supported());
        assert!(!FeatureFlags::from_bits_retain(0b1_0001).check_supported());
        assert!(!FeatureFlags::from_bits_retain(1 << 15).is_encrypted());
    }
}
