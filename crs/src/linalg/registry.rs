//! Named registry of linear algebra backends

use std::collections::HashMap;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;
use tracing::{debug, error, warn};

use super::{Blocked, Generic, LinearAlgebra, Parallel, GENERIC};
use crate::config::LinalgConfig;
use crate::{Error, Result};

struct Inner {
    backends: HashMap<String, Arc<dyn LinearAlgebra>>,
    default: String,
}

/// Backends by name plus the name of the default one
pub struct BackendRegistry {
    inner: RwLock<Inner>,
}

impl BackendRegistry {
    /// Registry without any backend; the default name is `"generic"`
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(Inner {
                backends: HashMap::new(),
                default: GENERIC.to_string(),
            }),
        }
    }

    /// Built-in backends with default tuning
    pub fn with_defaults() -> Self {
        Self::with_config(&LinalgConfig::default())
    }

    /// Built-in backends tuned by `config`, defaulting to
    /// `config.default_backend` when it names one of them
    pub fn with_config(config: &LinalgConfig) -> Self {
        let generic: Arc<dyn LinearAlgebra> = Arc::new(Generic);
        let registry = Self::new();
        {
            let mut inner = registry.inner.write();
            let builtins: [Arc<dyn LinearAlgebra>; 3] = [
                generic.clone(),
                Arc::new(Parallel::from_config(config)),
                Arc::new(Blocked::new(config.block_size, generic)),
            ];
            for backend in builtins {
                inner.backends.insert(backend.name().to_string(), backend);
            }
        }

        if let Err(e) = registry.set_default(&config.default_backend) {
            warn!(
                requested = %config.default_backend,
                fallback = GENERIC,
                error = %e,
                "unknown default backend"
            );
        }
        registry
    }

    /// Process-wide registry, configured from the environment on first use
    pub fn global() -> &'static BackendRegistry {
        static GLOBAL: OnceLock<BackendRegistry> = OnceLock::new();
        GLOBAL.get_or_init(|| Self::with_config(&LinalgConfig::from_env()))
    }

    /// Add a backend under its own name
    pub fn register(&self, backend: Arc<dyn LinearAlgebra>) -> Result<()> {
        let name = backend.name().to_string();
        let mut inner = self.inner.write();
        if inner.backends.contains_key(&name) {
            return Err(Error::DuplicateRegistration(name));
        }
        debug!(backend = %name, "registered linear algebra backend");
        inner.backends.insert(name, backend);
        Ok(())
    }

    pub fn find(&self, name: &str) -> Result<Arc<dyn LinearAlgebra>> {
        let inner = self.inner.read();
        match inner.backends.get(name) {
            Some(backend) => Ok(backend.clone()),
            None => {
                let available = sorted_names(&inner).join(", ");
                error!(backend = name, %available, "linear algebra backend not found");
                Err(Error::NotFound {
                    name: name.to_string(),
                    available,
                })
            }
        }
    }

    /// The current default backend
    pub fn backend(&self) -> Result<Arc<dyn LinearAlgebra>> {
        let name = self.default_name();
        self.find(&name)
    }

    pub fn set_default(&self, name: &str) -> Result<()> {
        let mut inner = self.inner.write();
        if !inner.backends.contains_key(name) {
            return Err(Error::NotFound {
                name: name.to_string(),
                available: sorted_names(&inner).join(", "),
            });
        }
        debug!(backend = name, "default linear algebra backend");
        inner.default = name.to_string();
        Ok(())
    }

    pub fn default_name(&self) -> String {
        self.inner.read().default.clone()
    }

    pub fn has(&self, name: &str) -> bool {
        self.inner.read().backends.contains_key(name)
    }

    /// Registered names in alphabetical order
    pub fn names(&self) -> Vec<String> {
        sorted_names(&self.inner.read())
    }
}

impl Default for BackendRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn sorted_names(inner: &Inner) -> Vec<String> {
    let mut names: Vec<String> = inner.backends.keys().cloned().collect();
    names.sort();
    names
}
