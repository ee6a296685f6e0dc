use sha1::{Digest, Sha1};

/// Compute the SHA-1 hash of a byte slice, returning the lowercase hex digest.
#[must_use]
pub fn sha1_hex(data: &[u8]) -> String {
    let mut hasher = Sha1::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}
