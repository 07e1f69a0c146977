use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use serde::{Deserialize, Serialize};

use crate::error::PackError;

/// Kind of an asset stored in a pack.
///
/// The declaration order matters: assets which depend on other types come
/// AFTER them (materials depend on shaders, sprite sheets on textures), and
/// consumers process types in this order.
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetType {
    BinaryFile = 0,
    TextFile = 1,
    Texture = 2,
    Shader = 3,
    MaterialDefinition = 4,
    Image = 5,
    Sprite = 6,
    SpriteSheet = 7,
    Animation = 8,
    Font = 9,
    AudioClip = 10,
    ConfigFile = 11,
}

impl AssetType {
    pub const ALL: [AssetType; 12] = [
        AssetType::BinaryFile,
        AssetType::TextFile,
        AssetType::Texture,
        AssetType::Shader,
        AssetType::MaterialDefinition,
        AssetType::Image,
        AssetType::Sprite,
        AssetType::SpriteSheet,
        AssetType::Animation,
        AssetType::Font,
        AssetType::AudioClip,
        AssetType::ConfigFile,
    ];

    const NAMES: [&'static str; 12] = [
        "binaryFile",
        "textFile",
        "texture",
        "shader",
        "materialDefinition",
        "image",
        "sprite",
        "spriteSheet",
        "animation",
        "font",
        "audioClip",
        "configFile",
    ];

    #[inline]
    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    #[inline]
    pub fn to_u32(self) -> u32 {
        self as u32
    }
}

static ASSET_TYPE_BY_NAME: LazyLock<HashMap<&'static str, AssetType>> =
    LazyLock::new(|| AssetType::ALL.iter().map(|t| (t.name(), *t)).collect());

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for AssetType {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ASSET_TYPE_BY_NAME
            .get(s)
            .copied()
            .ok_or_else(|| PackError::UnknownAssetType(s.to_string()))
    }
}

impl TryFrom<u32> for AssetType {
    type Error = PackError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        AssetType::ALL
            .get(value as usize)
            .copied()
            .ok_or_else(|| PackError::UnknownAssetType(value.to_string()))
    }
}

impl Serialize for AssetType {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for AssetType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        value.parse().map_err(serde::de::Error::custom)
    }
}

/// Kind of a source file as seen by the import pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ImportAssetType {
    Undefined,
    Skip,
    Codegen,
    SimpleCopy,
    Font,
    BitmapFont,
    Image,
    Texture,
    Material,
    Animation,
    Config,
    Audio,
    Sprite,
    SpriteSheet,
    Shader,
}

impl ImportAssetType {
    pub const ALL: [ImportAssetType; 15] = [
        ImportAssetType::Undefined,
        ImportAssetType::Skip,
        ImportAssetType::Codegen,
        ImportAssetType::SimpleCopy,
        ImportAssetType::Font,
        ImportAssetType::BitmapFont,
        ImportAssetType::Image,
        ImportAssetType::Texture,
        ImportAssetType::Material,
        ImportAssetType::Animation,
        ImportAssetType::Config,
        ImportAssetType::Audio,
        ImportAssetType::Sprite,
        ImportAssetType::SpriteSheet,
        ImportAssetType::Shader,
    ];

    const NAMES: [&'static str; 15] = [
        "undefined",
        "skip",
        "codegen",
        "simpleCopy",
        "font",
        "bitmapFont",
        "image",
        "texture",
        "material",
        "animation",
        "config",
        "audio",
        "sprite",
        "spriteSheet",
        "shader",
    ];

    #[inline]
    pub fn name(self) -> &'static str {
        Self::NAMES[self as usize]
    }

    /// Picks an importer from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "png" | "jpg" | "jpeg" | "tga" | "bmp" => ImportAssetType::Image,
            "ttf" | "otf" | "font" => ImportAssetType::Font,
            "ogg" | "wav" | "mp3" | "flac" => ImportAssetType::Audio,
            "shader" | "glsl" | "hlsl" | "vert" | "frag" => ImportAssetType::Shader,
            "mat" => ImportAssetType::Material,
            "anim" => ImportAssetType::Animation,
            "sprite" => ImportAssetType::Sprite,
            "spritesheet" | "atlas" => ImportAssetType::SpriteSheet,
            "yaml" | "yml" | "json" | "toml" | "cfg" => ImportAssetType::Config,
            "txt" | "md" | "csv" => ImportAssetType::SimpleCopy,
            _ => ImportAssetType::Undefined,
        }
    }

    /// The asset type an importer of this kind produces in the pack.
    pub fn output_type(self) -> Option<AssetType> {
        match self {
            ImportAssetType::Skip | ImportAssetType::Codegen => None,
            ImportAssetType::Undefined => Some(AssetType::BinaryFile),
            ImportAssetType::SimpleCopy => Some(AssetType::TextFile),
            ImportAssetType::Font | ImportAssetType::BitmapFont => Some(AssetType::Font),
            ImportAssetType::Image | ImportAssetType::Texture => Some(AssetType::Texture),
            ImportAssetType::Material => Some(AssetType::MaterialDefinition),
            ImportAssetType::Animation => Some(AssetType::Animation),
            ImportAssetType::Config => Some(AssetType::ConfigFile),
            ImportAssetType::Audio => Some(AssetType::AudioClip),
            ImportAssetType::Sprite => Some(AssetType::Sprite),
            ImportAssetType::SpriteSheet => Some(AssetType::SpriteSheet),
            ImportAssetType::Shader => Some(AssetType::Shader),
        }
    }
}

static IMPORT_TYPE_BY_NAME: LazyLock<HashMap<&'static str, ImportAssetType>> =
    LazyLock::new(|| ImportAssetType::ALL.iter().map(|t| (t.name(), *t)).collect());

impl fmt::Display for ImportAssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

impl FromStr for ImportAssetType {
    type Err = PackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        IMPORT_TYPE_BY_NAME
            .get(s)
            .copied()
            .ok_or_else(|| PackError::UnknownAssetType(s.to_string()))
    }
}
