use sha2::{Digest, Sha256};
use std::path::Path;

use crate::paths::normalize_path;

/// Symbols a generated UID is drawn from.
pub const UID_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

pub const UID_LENGTH: usize = 9;

/// Deterministic Grafana UID for a dashboard file.
///
/// Hashes `"{project_id}:{normalized_path}"` with SHA-256 and reads
/// successive 5-bit windows (bit offset `i * 5`, most significant bit first)
/// as indexes into [`UID_ALPHABET`]. Only the project id and the path feed
/// the hash, so editing a dashboard never changes its UID.
pub fn generate_uid(project_id: &str, file_path: impl AsRef<Path>) -> String {
    let normalized = normalize_path(file_path);
    let hash_input = format!("{}:{}", project_id, normalized.to_string_lossy());

    let mut hasher = Sha256::new();
    hasher.update(hash_input.as_bytes());
    let digest = hasher.finalize();

    (0..UID_LENGTH)
        .map(|i| {
            let bit = i * 5;
            let byte = bit / 8;
            let shift = bit % 8;
            let window = (u16::from(digest[byte]) << 8)
                | u16::from(digest.get(byte + 1).copied().unwrap_or(0));
            let index = usize::from((window >> (11 - shift)) & 0x1F);
            char::from(UID_ALPHABET[index % UID_ALPHABET.len()])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const PROJECT: &str = "lhotari/pulsar-grafana-dashboards";

    #[test]
    fn test_uid_shape() {
        let uid = generate_uid(PROJECT, "dashboards/pulsar/broker.json");
        assert_eq!(uid.len(), UID_LENGTH);
        assert!(uid.bytes().all(|b| UID_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_uid_is_stable() {
        let first = generate_uid(PROJECT, "dashboards/pulsar/broker.json");
        let second = generate_uid(PROJECT, "dashboards/pulsar/broker.json");
        assert_eq!(first, second);
    }

    #[cfg(unix)]
    #[test]
    fn test_uid_matches_published_dashboards() {
        assert_eq!(generate_uid(PROJECT, "dashboards/pulsar/broker.json"), "wiEszoBwh");
        assert_eq!(generate_uid(PROJECT, "bookkeeper.json"), "gtgFdeutx");
        assert_eq!(generate_uid("acme/dashboards", "dashboards/pulsar/broker.json"), "uDlgwuoog");
        assert_eq!(generate_uid("acme/dashboards", "bookkeeper.json"), "rzEztusFw");
    }

    #[cfg(unix)]
    #[test]
    fn test_equivalent_paths_share_uid() {
        let expected = generate_uid(PROJECT, "dashboards/pulsar/broker.json");
        assert_eq!(generate_uid(PROJECT, "./dashboards//pulsar/broker.json"), expected);
        assert_eq!(generate_uid(PROJECT, "dashboards/pulsar/../pulsar/broker.json"), expected);
    }

    #[test]
    fn test_project_id_changes_uid() {
        assert_ne!(
            generate_uid(PROJECT, "bookkeeper.json"),
            generate_uid("someone/else", "bookkeeper.json")
        );
    }
}
