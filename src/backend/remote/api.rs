//! Process-wide guard for loading the embedding API script.
//!
//! The script is requested at most once per process and never torn down.
//! Backends tolerate it finishing at any later time through the probe's
//! bounded retry.

use once_cell::sync::OnceCell;

use super::embed::EmbedPlatform;

static GLOBAL: ApiScriptGuard = ApiScriptGuard::new();

/// The guard shared by every remote backend in the process
pub fn global() -> &'static ApiScriptGuard {
    &GLOBAL
}

/// Idempotent initializer for the API script
#[derive(Debug)]
pub struct ApiScriptGuard {
    requested: OnceCell<()>,
}

impl ApiScriptGuard {
    pub const fn new() -> Self {
        Self {
            requested: OnceCell::new(),
        }
    }

    /// Inject the script unless it was already requested or is already
    /// loaded. Returns true if this call injected it.
    pub fn ensure_requested(&self, platform: &dyn EmbedPlatform) -> bool {
        let mut injected = false;
        self.requested.get_or_init(|| {
            if platform.api_ready() {
                tracing::debug!("embedding API already present");
            } else {
                tracing::info!("injecting embedding API script");
                platform.inject_api_script();
                injected = true;
            }
        });
        injected
    }

    pub fn is_requested(&self) -> bool {
        self.requested.get().is_some()
    }
}

impl Default for ApiScriptGuard {
    fn default() -> Self {
        Self::new()
    }
}
