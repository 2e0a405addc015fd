//! Runtime configuration of the linear algebra layer

use tracing::warn;

/// Environment variable naming the default backend
pub const BACKEND_ENV: &str = "CRS_LINALG_BACKEND";
/// Environment variable setting the minimum rows per parallel task
pub const PARALLEL_MIN_LEN_ENV: &str = "CRS_PARALLEL_MIN_LEN";
/// Environment variable setting the tile edge of the blocked backend
pub const BLOCK_SIZE_ENV: &str = "CRS_BLOCK_SIZE";

/// Backend selection and kernel tuning
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct LinalgConfig {
    /// Name of the backend returned by `BackendRegistry::backend`
    pub default_backend: String,
    /// Minimum number of output rows (or columns) handed to one rayon task
    pub parallel_min_len: usize,
    /// Tile edge, in elements, of the blocked dense kernels
    pub block_size: usize,
}

impl LinalgConfig {
    pub fn with_default_backend(mut self, name: impl Into<String>) -> Self {
        self.default_backend = name.into();
        self
    }

    pub fn with_parallel_min_len(mut self, min_len: usize) -> Self {
        self.parallel_min_len = min_len.max(1);
        self
    }

    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size.max(1);
        self
    }

    /// Defaults overridden by `CRS_LINALG_BACKEND`, `CRS_PARALLEL_MIN_LEN`
    /// and `CRS_BLOCK_SIZE` when set
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(name) = lookup(BACKEND_ENV).filter(|name| !name.is_empty()) {
            config = config.with_default_backend(name);
        }
        if let Some(min_len) = parse_usize(&lookup, PARALLEL_MIN_LEN_ENV) {
            config = config.with_parallel_min_len(min_len);
        }
        if let Some(block_size) = parse_usize(&lookup, BLOCK_SIZE_ENV) {
            config = config.with_block_size(block_size);
        }

        config
    }

    /// Parse a JSON document; missing fields keep their defaults
    #[cfg(feature = "serde")]
    pub fn from_json(json: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for LinalgConfig {
    fn default() -> Self {
        Self {
            default_backend: crate::linalg::GENERIC.to_string(),
            parallel_min_len: 64,
            block_size: 64,
        }
    }
}

fn parse_usize(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<usize> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(key, value = %raw, "ignoring unparsable configuration value");
            None
        }
    }
}
