use sha2::{Digest, Sha256};
use std::path::Path;

/// Hex sha-256 of arbitrary content. Used to detect whether a plan's
/// content changed between syncs.
pub fn content_hash(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Stable plan id derived from the absolute path, so re-registering the
/// same file always lands on the same entry.
pub fn plan_id(path: &Path) -> String {
    let mut hasher = Sha256::new();
    hasher.update(path.to_string_lossy().as_bytes());
    let digest = format!("{:x}", hasher.finalize());
    digest[..32].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_hash_is_deterministic() {
        assert_eq!(content_hash("hello"), content_hash("hello"));
        assert_ne!(content_hash("hello"), content_hash("hello "));
    }

    #[test]
    fn plan_id_is_stable_per_path() {
        let a = plan_id(Path::new("/tmp/p.md"));
        let b = plan_id(Path::new("/tmp/p.md"));
        let c = plan_id(Path::new("/tmp/q.md"));
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 32);
    }
}
