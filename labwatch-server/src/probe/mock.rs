use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::Prober;

/// Prober with scripted answers, for tests and demo deployments.
#[derive(Clone)]
pub struct MockProber {
    default_alive: bool,
    overrides: Arc<Mutex<HashMap<String, bool>>>,
}

impl MockProber {
    /// A prober answering `default_alive` for every address without an
    /// explicit override.
    pub fn new(default_alive: bool) -> Self {
        Self {
            default_alive,
            overrides: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Script the answer for a single address.
    pub fn set(&self, addr: impl Into<String>, alive: bool) {
        let mut overrides = self.overrides.lock().unwrap_or_else(|e| e.into_inner());
        overrides.insert(addr.into(), alive);
    }
}

#[async_trait]
impl Prober for MockProber {
    async fn probe(&self, addr: &str) -> bool {
        let overrides = self.overrides.lock().unwrap_or_else(|e| e.into_inner());
        overrides.get(addr).copied().unwrap_or(self.default_alive)
    }
}
