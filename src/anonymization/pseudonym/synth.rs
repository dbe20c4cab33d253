//! Shape synthesis
//!
//! Turns a digest into a syntactically valid value of a given shape. The
//! output depends only on the digest (and, for paths, on whether the original
//! was a Windows path), never on the original characters.

use crate::anonymization::rules::ValueShape;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Synthesize a pseudonym of `shape` from `digest`
pub fn synthesize(shape: ValueShape, digest: &[u8; 32], original: &str) -> String {
    match shape {
        ValueShape::Email => format!("u{}@anon.invalid", base36(digest, 10)),
        ValueShape::Ipv4 => format!(
            "10.{}.{}.{}",
            digest[0],
            digest[1],
            u16::from(digest[2]) % 254 + 1
        ),
        ValueShape::Ipv6 => {
            let mut groups = vec![format!("fd{:02x}", digest[0])];
            groups.extend(
                digest[1..15]
                    .chunks_exact(2)
                    .map(|pair| format!("{:x}", u16::from_be_bytes([pair[0], pair[1]]))),
            );
            groups.join(":")
        }
        ValueShape::Hostname => format!("host-{}.anon.internal", base36(digest, 8)),
        ValueShape::Uuid => {
            let mut bytes = [0u8; 16];
            bytes.copy_from_slice(&digest[..16]);
            uuid::Builder::from_random_bytes(bytes)
                .into_uuid()
                .to_string()
        }
        ValueShape::Username => format!("user_{}", base36(digest, 8)),
        ValueShape::FilePath if is_windows_path(original) => {
            format!(r"C:\anon\{}", base36(digest, 8))
        }
        ValueShape::FilePath => format!("/anon/{}", base36(digest, 8)),
        ValueShape::Opaque => format!("anon_{}", base36(digest, 12)),
    }
}

/// Fixed-width base36 rendering of the first 16 digest bytes
fn base36(digest: &[u8; 32], width: usize) -> String {
    let mut n = u128::from_be_bytes(digest[..16].try_into().unwrap_or([0u8; 16]));
    let mut out = Vec::with_capacity(width);
    for _ in 0..width {
        out.push(BASE36[(n % 36) as usize]);
        n /= 36;
    }
    out.into_iter().map(char::from).collect()
}

fn is_windows_path(value: &str) -> bool {
    let bytes = value.as_bytes();
    bytes.len() >= 3 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' && bytes[2] == b'\\'
}
