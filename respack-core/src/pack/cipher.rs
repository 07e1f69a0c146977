use aes::cipher::block_padding::Pkcs7;
use aes::cipher::generic_array::GenericArray;
use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit};

use crate::asset_type::AssetType;
use crate::error::CorruptArchive;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;
type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

const KEY_CONTEXT: &str = "respack 2024-06-01 pack encryption key";

/// AES-256-CBC keyed from the pack's encryption key string.
#[derive(Clone)]
pub struct PackCipher {
    key: [u8; 32],
}

impl PackCipher {
    /// Returns `None` for an empty key, which means "no encryption".
    pub fn from_key(key: &str) -> Option<Self> {
        if key.is_empty() {
            return None;
        }
        Some(Self {
            key: blake3::derive_key(KEY_CONTEXT, key.as_bytes()),
        })
    }

    pub fn encrypt(&self, iv: &[u8; 16], data: &[u8]) -> Vec<u8> {
        let encryptor = Aes256CbcEnc::new(GenericArray::from_slice(&self.key), GenericArray::from_slice(iv));
        encryptor.encrypt_padded_vec_mut::<Pkcs7>(data)
    }

    pub fn decrypt(&self, iv: &[u8; 16], data: &[u8]) -> Result<Vec<u8>, CorruptArchive> {
        if data.len() % 16 != 0 {
            return Err(CorruptArchive::Decryption);
        }
        let decryptor = Aes256CbcDec::new(GenericArray::from_slice(&self.key), GenericArray::from_slice(iv));
        decryptor
            .decrypt_padded_vec_mut::<Pkcs7>(data)
            .map_err(|_| CorruptArchive::Decryption)
    }
}

impl std::fmt::Debug for PackCipher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PackCipher").finish_non_exhaustive()
    }
}

/// IV of a single entry blob: the pack IV with the entry's name hash and type folded in.
pub fn entry_iv(pack_iv: &[u8; 16], name_hash: u64, asset_type: AssetType) -> [u8; 16] {
    let mut iv = *pack_iv;
    let salt = name_hash.to_le_bytes().into_iter().chain(asset_type.to_u32().to_le_bytes());
    for (b, h) in iv.iter_mut().zip(salt) {
        *b ^= h;
    }
    iv
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_key_disables_encryption() {
        assert!(PackCipher::from_key("").is_none());
        assert!(PackCipher::from_key("secret").is_some());
    }

    #[test]
    fn test_encrypt_decrypt() {
        let cipher = PackCipher::from_key("secret").unwrap();
        let iv = [3u8; 16];
        let data = b"Hello, world! This spans more than one block.";
        let encrypted = cipher.encrypt(&iv, data);
        assert_eq!(encrypted.len() % 16, 0);
        assert_ne!(&encrypted[..data.len()], &data[..]);
        assert_eq!(cipher.decrypt(&iv, &encrypted).unwrap(), data);
    }

    #[test]
    fn test_wrong_key_does_not_yield_plaintext() {
        let iv = [0u8; 16];
        let data = b"levels/forest/clearing.scene";
        let encrypted = PackCipher::from_key("secret").unwrap().encrypt(&iv, data);
        let other = PackCipher::from_key("guess").unwrap();
        match other.decrypt(&iv, &encrypted) {
            Ok(plain) => assert_ne!(plain, data),
            Err(e) => assert!(matches!(e, CorruptArchive::Decryption)),
        }
        assert!(other.decrypt(&iv, &encrypted[..15]).is_err());
    }

    #[test]
    fn test_entry_iv_differs_per_entry() {
        let iv = [9u8; 16];
        assert_ne!(entry_iv(&iv, 1, AssetType::Texture), entry_iv(&iv, 2, AssetType::Texture));
        assert_eq!(entry_iv(&iv, 0, AssetType::BinaryFile), iv);
    }

    #[test]
    fn test_entry_iv_differs_per_type() {
        let iv = [9u8; 16];
        let hash = crate::filename::name_hash("hero");
        let texture = entry_iv(&iv, hash, AssetType::Texture);
        let sprite = entry_iv(&iv, hash, AssetType::Sprite);
        assert_ne!(texture, sprite);

        let cipher = PackCipher::from_key("secret").unwrap();
        assert_ne!(cipher.encrypt(&texture, b"same payload"), cipher.encrypt(&sprite, b"same payload"));
    }
}
