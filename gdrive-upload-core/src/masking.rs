//! Process-wide registry of secrets that must never be printed.
//!
//! The registry is append-only and lives as long as the process. Anything that
//! writes diagnostics (the log writer, the fatal handler) runs its text through
//! [`SecretRegistry::redact`] first.

use std::sync::{Arc, RwLock};

/// Replacement text for a masked secret.
pub const MASK: &str = "***";

/// Shared set of secrets. Clones share the same underlying set.
#[derive(Clone, Default)]
pub struct SecretRegistry {
    secrets: Arc<RwLock<Vec<String>>>,
}

impl SecretRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a secret. Multi-line secrets also register each line on its
    /// own, since log lines may carry only a fragment of them. Lines without
    /// any alphanumeric character (`{`, `},`, ...) are skipped.
    pub fn add(&self, secret: &str) {
        if secret.trim().is_empty() {
            return;
        }
        let mut secrets = self.secrets.write().unwrap_or_else(|e| e.into_inner());
        let mut insert = |s: &str| {
            if !secrets.iter().any(|known| known == s) {
                secrets.push(s.to_string());
            }
        };
        insert(secret);
        if secret.contains('\n') {
            for line in secret.lines().map(str::trim).filter(|l| is_maskable_fragment(l)) {
                insert(line);
            }
        }
        // Longest first, so a secret is never partially replaced by a shorter one it contains.
        secrets.sort_by(|a, b| b.len().cmp(&a.len()));
    }

    /// Returns `text` with every registered secret replaced by [`MASK`].
    pub fn redact(&self, text: &str) -> String {
        let secrets = self.secrets.read().unwrap_or_else(|e| e.into_inner());
        secrets
            .iter()
            .fold(text.to_string(), |acc, secret| acc.replace(secret.as_str(), MASK))
    }

    pub fn len(&self) -> usize {
        self.secrets.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn is_maskable_fragment(line: &str) -> bool {
    line.chars().any(char::is_alphanumeric)
}

impl std::fmt::Debug for SecretRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecretRegistry")
            .field("secrets", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn redacts_registered_secret() {
        let registry = SecretRegistry::new();
        registry.add("hunter2");
        assert_eq!(registry.redact("password is hunter2!"), "password is ***!");
    }

    #[test]
    fn clones_share_secrets() {
        let registry = SecretRegistry::new();
        let writer_side = registry.clone();
        registry.add("s3cr3t");
        assert_eq!(writer_side.redact("s3cr3t"), MASK);
    }

    #[test]
    fn multi_line_secret_masks_each_line() {
        let registry = SecretRegistry::new();
        registry.add("-----BEGIN KEY-----\nMIIEabc\n-----END KEY-----");
        let redacted = registry.redact("invalid key line: MIIEabc");
        assert_eq!(redacted, "invalid key line: ***");
        assert_eq!(registry.len(), 4);
    }

    #[test]
    fn pretty_printed_json_keeps_punctuation_lines_visible() {
        let registry = SecretRegistry::new();
        registry.add("{\n  \"private_key\": \"abc\",\n  \"nested\": {\n    \"x\": 1\n  },\n}");
        assert_eq!(registry.redact("Metadata { name: \"a\" }"), "Metadata { name: \"a\" }");
        assert_eq!(registry.redact("\"private_key\": \"abc\","), "***");
    }

    #[test]
    fn ignores_blank_and_duplicate_secrets() {
        let registry = SecretRegistry::new();
        registry.add("");
        registry.add("   ");
        registry.add("abc");
        registry.add("abc");
        assert_eq!(registry.len(), 1);
        assert!(!registry.is_empty());
    }

    #[test]
    fn longer_secret_wins_over_contained_one() {
        let registry = SecretRegistry::new();
        registry.add("abc");
        registry.add("abcdef");
        assert_eq!(registry.redact("xabcdefx"), "x***x");
    }
}
