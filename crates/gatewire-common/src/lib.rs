use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

#[derive(Debug, thiserror::Error)]
pub enum GlobalConfigError {
    #[error("missing required global config field: {0}")]
    MissingField(&'static str),
}

/// Final, merged global configuration used by the running process.
///
/// Merge order (after DB connection): CLI > ENV > DB, then persisted back to DB.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalConfig {
    pub host: String,
    pub port: u16,
    /// Stored as a hash (not plaintext).
    pub admin_key_hash: String,
    /// Optional outbound proxy used for upstream egress.
    pub proxy: Option<String>,
    /// Database DSN used for this process.
    pub dsn: String,
    /// Default seconds a credential stays degraded after a rate-limit response
    /// with no `Retry-After` header.
    pub default_degrade_secs: u64,
    /// Credential cache refresh interval, seconds.
    pub credential_cache_ttl_secs: u64,
}

/// Optional layer used for merging global config from CLI/ENV/DB sources.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalConfigPatch {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub admin_key_hash: Option<String>,
    pub proxy: Option<String>,
    pub dsn: Option<String>,
    pub default_degrade_secs: Option<u64>,
    pub credential_cache_ttl_secs: Option<u64>,
}

impl GlobalConfigPatch {
    pub fn overlay(&mut self, other: GlobalConfigPatch) {
        if other.host.is_some() {
            self.host = other.host;
        }
        if other.port.is_some() {
            self.port = other.port;
        }
        if other.admin_key_hash.is_some() {
            self.admin_key_hash = other.admin_key_hash;
        }
        if other.proxy.is_some() {
            self.proxy = other.proxy;
        }
        if other.dsn.is_some() {
            self.dsn = other.dsn;
        }
        if other.default_degrade_secs.is_some() {
            self.default_degrade_secs = other.default_degrade_secs;
        }
        if other.credential_cache_ttl_secs.is_some() {
            self.credential_cache_ttl_secs = other.credential_cache_ttl_secs;
        }
    }

    pub fn into_config(self) -> Result<GlobalConfig, GlobalConfigError> {
        Ok(GlobalConfig {
            host: self.host.unwrap_or_else(|| "0.0.0.0".to_string()),
            port: self.port.unwrap_or(8080),
            admin_key_hash: self
                .admin_key_hash
                .ok_or(GlobalConfigError::MissingField("admin_key_hash"))?,
            proxy: self.proxy,
            dsn: self.dsn.ok_or(GlobalConfigError::MissingField("dsn"))?,
            default_degrade_secs: self.default_degrade_secs.unwrap_or(30),
            credential_cache_ttl_secs: self.credential_cache_ttl_secs.unwrap_or(300),
        })
    }
}

impl From<GlobalConfig> for GlobalConfigPatch {
    fn from(value: GlobalConfig) -> Self {
        Self {
            host: Some(value.host),
            port: Some(value.port),
            admin_key_hash: Some(value.admin_key_hash),
            proxy: value.proxy,
            dsn: Some(value.dsn),
            default_degrade_secs: Some(value.default_degrade_secs),
            credential_cache_ttl_secs: Some(value.credential_cache_ttl_secs),
        }
    }
}

/// Lowercase hex SHA-256 of a plaintext credential or admin key. This is the
/// only form of a secret that ever reaches the catalog store.
pub fn hash_secret(plaintext: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(plaintext.as_bytes());
    hex_lower(&hasher.finalize())
}

/// A short, non-authenticating display prefix: `abcdefghij...`. Used in
/// admin UIs to let an operator recognize a key without exposing it.
pub fn display_prefix(plaintext: &str) -> String {
    let take = plaintext.chars().take(10).collect::<String>();
    format!("{take}...")
}

fn hex_lower(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_secret_is_64_char_lowercase_hex() {
        let hash = hash_secret("sk-test-12345");
        assert_eq!(hash.len(), 64);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn hash_secret_is_deterministic() {
        assert_eq!(hash_secret("same"), hash_secret("same"));
        assert_ne!(hash_secret("same"), hash_secret("different"));
    }

    #[test]
    fn display_prefix_truncates_and_suffixes() {
        assert_eq!(display_prefix("sk-abcdefghijklmnop"), "sk-abcdefgh...");
        assert_eq!(display_prefix("short"), "short...");
    }

    #[test]
    fn patch_overlay_prefers_later_values() {
        let mut base = GlobalConfigPatch {
            host: Some("0.0.0.0".to_string()),
            port: Some(8080),
            ..Default::default()
        };
        base.overlay(GlobalConfigPatch {
            port: Some(9090),
            ..Default::default()
        });
        assert_eq!(base.host.as_deref(), Some("0.0.0.0"));
        assert_eq!(base.port, Some(9090));
    }
}
