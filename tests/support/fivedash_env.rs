use std::{
    path::Path,
    sync::{Mutex, OnceLock},
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

/// Serialises env mutation across tests and restores the previous values on drop.
pub struct FivedashEnvGuard {
    previous: Vec<(&'static str, Option<String>)>,
    _lock: std::sync::MutexGuard<'static, ()>,
}

impl FivedashEnvGuard {
    pub fn set_config_home(path: &Path) -> Self {
        let mut guard = Self::lock();
        guard.set("FIVEDASH_CONFIG_HOME", Some(&path.to_string_lossy()));
        guard.set("FIVEDASH_BACKEND_URL", None);
        guard
    }

    pub fn with_backend_url(mut self, url: &str) -> Self {
        self.set("FIVEDASH_BACKEND_URL", Some(url));
        self
    }

    fn lock() -> Self {
        let lock = ENV_LOCK
            .get_or_init(|| Mutex::new(()))
            .lock()
            .unwrap_or_else(|err| err.into_inner());
        Self {
            previous: Vec::new(),
            _lock: lock,
        }
    }

    fn set(&mut self, key: &'static str, value: Option<&str>) {
        if !self.previous.iter().any(|(name, _)| *name == key) {
            self.previous.push((key, std::env::var(key).ok()));
        }
        // SAFETY: tests run under a global lock to prevent concurrent env mutations.
        unsafe {
            match value {
                Some(value) => std::env::set_var(key, value),
                None => std::env::remove_var(key),
            }
        }
    }
}

impl Drop for FivedashEnvGuard {
    fn drop(&mut self) {
        for (key, value) in self.previous.drain(..) {
            // SAFETY: tests run under a global lock to prevent concurrent env mutations.
            unsafe {
                match value {
                    Some(value) => std::env::set_var(key, value),
                    None => std::env::remove_var(key),
                }
            }
        }
    }
}
