use std::io::Read;
use std::path::{Component, Path};

use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileName {
    name: String,
}

impl FileName {
    pub fn new(name: &str) -> Self {
        Self { name: name.to_string() }
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn hash_lower_case(&self) -> u32 {
        let bytes: Vec<u8> = self
            .name
            .to_lowercase()
            .encode_utf16()
            .flat_map(|c| c.to_le_bytes())
            .collect();

        checksum(&bytes)
    }

    pub fn hash_upper_case(&self) -> u32 {
        let bytes: Vec<u8> = self
            .name
            .to_uppercase()
            .encode_utf16()
            .flat_map(|c| c.to_le_bytes())
            .collect();

        checksum(&bytes)
    }

    pub fn hash_mixed(&self) -> u64 {
        Self::mix_hash(self.hash_lower_case(), self.hash_upper_case())
    }

    pub fn mix_hash(lower: u32, upper: u32) -> u64 {
        let upper = upper as u64;
        let lower = lower as u64;

        upper << 32 | lower
    }
}

/// Name hash used as the lookup key of an asset in the database.
pub fn name_hash(name: &str) -> u64 {
    FileName::new(name).hash_mixed()
}

/// Whether `name` is a relative path made only of plain components, so it can
/// be joined under an output directory without escaping it.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name.contains('\\')
        && Path::new(name).components().all(|c| matches!(c, Component::Normal(_)))
}

const MURMUR3_SEED: u32 = 0xFFFFFFFF;

pub fn murmur3_hash<R: Read>(mut reader: R) -> Result<u32> {
    Ok(murmur3::murmur3_32(&mut reader, MURMUR3_SEED)?)
}

/// Murmur3 of an in-memory buffer; reading from a slice cannot fail.
pub fn checksum(data: &[u8]) -> u32 {
    murmur3_hash(data).unwrap_or_default()
}

/// Incremental form of [`checksum`] for data that arrives in pieces.
#[derive(Debug, Clone)]
pub struct ChecksumHasher {
    state: u32,
    tail: [u8; 4],
    tail_len: usize,
    len: u64,
}

impl Default for ChecksumHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl ChecksumHasher {
    const C1: u32 = 0xcc9e2d51;
    const C2: u32 = 0x1b873593;

    pub fn new() -> Self {
        Self {
            state: MURMUR3_SEED,
            tail: [0; 4],
            tail_len: 0,
            len: 0,
        }
    }

    fn scramble(k: u32) -> u32 {
        k.wrapping_mul(Self::C1).rotate_left(15).wrapping_mul(Self::C2)
    }

    fn mix_block(&mut self, block: [u8; 4]) {
        self.state ^= Self::scramble(u32::from_le_bytes(block));
        self.state = self.state.rotate_left(13).wrapping_mul(5).wrapping_add(0xe6546b64);
    }

    pub fn update(&mut self, mut data: &[u8]) {
        self.len += data.len() as u64;
        if self.tail_len > 0 {
            let take = (4 - self.tail_len).min(data.len());
            self.tail[self.tail_len..self.tail_len + take].copy_from_slice(&data[..take]);
            self.tail_len += take;
            data = &data[take..];
            if self.tail_len < 4 {
                return;
            }
            self.mix_block(self.tail);
            self.tail_len = 0;
        }
        let mut blocks = data.chunks_exact(4);
        for block in &mut blocks {
            self.mix_block([block[0], block[1], block[2], block[3]]);
        }
        let rest = blocks.remainder();
        self.tail[..rest.len()].copy_from_slice(rest);
        self.tail_len = rest.len();
    }

    pub fn finish(&self) -> u32 {
        let mut h = self.state;
        if self.tail_len > 0 {
            let mut k = 0u32;
            for (i, b) in self.tail[..self.tail_len].iter().enumerate() {
                k |= (*b as u32) << (8 * i);
            }
            h ^= Self::scramble(k);
        }
        h ^= self.len as u32;
        h ^= h >> 16;
        h = h.wrapping_mul(0x85ebca6b);
        h ^= h >> 13;
        h = h.wrapping_mul(0xc2b2ae35);
        h ^ (h >> 16)
    }
}
