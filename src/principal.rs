use sha2::{
    Digest,
    Sha256,
};
use std::{
    fmt,
    str::FromStr,
};
use thiserror::Error;

const C32_ALPHABET: &[u8; 32] = b"0123456789ABCDEFGHJKMNPQRSTVWXYZ";
const HASH160_LEN: usize = 20;
const CHECKSUM_LEN: usize = 4;

pub const VERSION_MAINNET_SINGLESIG: u8 = 22;
pub const VERSION_TESTNET_SINGLESIG: u8 = 26;

/// A ledger account identity: one version byte plus a 20-byte key hash,
/// displayed in c32check form (`SP…` on mainnet, `ST…` on testnet).
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Principal {
    version: u8,
    hash160: [u8; HASH160_LEN],
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PrincipalError {
    #[error("principal must start with 'S'")]
    MissingPrefix,
    #[error("invalid c32 character '{0}'")]
    BadCharacter(char),
    #[error("invalid version character '{0}'")]
    BadVersion(char),
    #[error("payload is {0} bytes, expected 24")]
    BadLength(usize),
    #[error("checksum mismatch")]
    BadChecksum,
}

impl Principal {
    pub fn new(version: u8, hash160: [u8; HASH160_LEN]) -> Self {
        Self { version, hash160 }
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn hash160(&self) -> &[u8; HASH160_LEN] {
        &self.hash160
    }

    fn checksum(version: u8, hash160: &[u8; HASH160_LEN]) -> [u8; CHECKSUM_LEN] {
        let mut payload = Vec::with_capacity(1 + HASH160_LEN);
        payload.push(version);
        payload.extend_from_slice(hash160);
        let first = Sha256::digest(&payload);
        let second = Sha256::digest(first);
        let mut out = [0u8; CHECKSUM_LEN];
        out.copy_from_slice(&second[..CHECKSUM_LEN]);
        out
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let checksum = Self::checksum(self.version, &self.hash160);
        let mut payload = Vec::with_capacity(HASH160_LEN + CHECKSUM_LEN);
        payload.extend_from_slice(&self.hash160);
        payload.extend_from_slice(&checksum);
        write!(
            f,
            "S{}{}",
            C32_ALPHABET[self.version as usize & 0x1f] as char,
            c32_encode(&payload)
        )
    }
}

impl fmt::Debug for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Principal({self})")
    }
}

impl FromStr for Principal {
    type Err = PrincipalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut chars = s.chars();
        // the prefix folds case like every other character
        match chars.next() {
            Some(c) if c.to_ascii_uppercase() == 'S' => {}
            _ => return Err(PrincipalError::MissingPrefix),
        }
        let version_char = chars.next().ok_or(PrincipalError::MissingPrefix)?;
        let version = c32_value(version_char)
            .ok_or(PrincipalError::BadVersion(version_char))?;
        let payload = c32_decode(chars.as_str())?;
        if payload.len() != HASH160_LEN + CHECKSUM_LEN {
            return Err(PrincipalError::BadLength(payload.len()));
        }
        let mut hash160 = [0u8; HASH160_LEN];
        hash160.copy_from_slice(&payload[..HASH160_LEN]);
        if payload[HASH160_LEN..] != Self::checksum(version, &hash160) {
            return Err(PrincipalError::BadChecksum);
        }
        Ok(Self { version, hash160 })
    }
}

fn c32_value(c: char) -> Option<u8> {
    // c32 normalization folds easily-confused characters
    let c = match c.to_ascii_uppercase() {
        'O' => '0',
        'L' | 'I' => '1',
        other => other,
    };
    C32_ALPHABET
        .iter()
        .position(|&a| a as char == c)
        .map(|v| v as u8)
}

/// Base32 of the byte string read as a big-endian integer, with one leading
/// '0' digit preserved per leading zero byte.
fn c32_encode(bytes: &[u8]) -> String {
    let leading_zero_bytes = bytes.iter().take_while(|&&b| b == 0).count();
    let mut digits = Vec::new();
    let mut carry: u32 = 0;
    let mut carry_bits: u32 = 0;
    for &byte in bytes.iter().rev() {
        carry |= (byte as u32) << carry_bits;
        carry_bits += 8;
        while carry_bits >= 5 {
            digits.push(C32_ALPHABET[(carry & 0x1f) as usize]);
            carry >>= 5;
            carry_bits -= 5;
        }
    }
    if carry_bits > 0 && carry > 0 {
        digits.push(C32_ALPHABET[(carry & 0x1f) as usize]);
    }
    while digits.last() == Some(&b'0') {
        digits.pop();
    }
    let mut out = String::with_capacity(leading_zero_bytes + digits.len());
    for _ in 0..leading_zero_bytes {
        out.push('0');
    }
    out.extend(digits.iter().rev().map(|&d| d as char));
    out
}

fn c32_decode(s: &str) -> Result<Vec<u8>, PrincipalError> {
    let mut values = Vec::with_capacity(s.len());
    for c in s.chars() {
        values.push(c32_value(c).ok_or(PrincipalError::BadCharacter(c))?);
    }
    let leading_zero_digits = values.iter().take_while(|&&v| v == 0).count();
    let mut bytes = Vec::new();
    let mut carry: u32 = 0;
    let mut carry_bits: u32 = 0;
    for &value in values.iter().rev() {
        carry |= (value as u32) << carry_bits;
        carry_bits += 5;
        while carry_bits >= 8 {
            bytes.push((carry & 0xff) as u8);
            carry >>= 8;
            carry_bits -= 8;
        }
    }
    if carry_bits > 0 && carry > 0 {
        bytes.push((carry & 0xff) as u8);
    }
    while bytes.last() == Some(&0) {
        bytes.pop();
    }
    let mut out = vec![0u8; leading_zero_digits];
    out.extend(bytes.iter().rev());
    Ok(out)
}
