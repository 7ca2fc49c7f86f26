//! Integration tests for the Autorithm auth layer.
//!
//! The tests in `tests/` drive the whole flow end to end:
//!
//! - `auth_flow` - registration, login, logout, and the password reset loop
//!   over a shared on-disk store, including multi-"tab" scenarios where
//!   several providers point at the same file
//! - `guards` - the server-side guards behind a real axum router with a
//!   tower-sessions `MemoryStore`
//!
//! This module only hosts the shared [`TestStore`] fixture.

#![cfg_attr(not(test), forbid(unsafe_code))]
#![allow(clippy::unwrap_used)]

use std::sync::Once;
use std::time::Duration;

use autorithm_auth::config::AuthConfig;
use autorithm_auth::services::auth::{AuthProvider, PageLocation, StaticLocation, TracingNavigator};
use autorithm_auth::store::LocalStore;

static TRACING: Once = Once::new();

/// Install the `RUST_LOG`-filtered subscriber once per test binary so the
/// reset links and swallowed-error warnings emitted by the providers show up
/// in test output.
fn init_tracing() {
    TRACING.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .init();
    });
}

/// A tempdir-backed store plus the zero-latency config the tests run with.
///
/// Keep the fixture alive for as long as any provider built from it; the
/// backing directory is removed on drop.
pub struct TestStore {
    dir: tempfile::TempDir,
    config: AuthConfig,
}

impl TestStore {
    /// Create a fresh store in its own temp directory.
    #[must_use]
    pub fn new() -> Self {
        init_tracing();
        let dir = tempfile::tempdir().unwrap();
        let config = AuthConfig {
            data_file: dir.path().join("autorithm.json"),
            base_url: "http://localhost:3000".to_owned(),
            simulated_latency: Duration::ZERO,
        };
        Self { dir, config }
    }

    /// Open a raw handle to the underlying key-value store.
    #[must_use]
    pub fn open(&self) -> LocalStore {
        LocalStore::new(self.config.data_file.clone())
    }

    /// Build an initialized provider, as if a tab had just loaded.
    #[must_use]
    pub fn provider(&self) -> AuthProvider {
        self.provider_at(StaticLocation::empty())
    }

    /// Build an initialized provider sitting on a page with the given
    /// location (used by the reset-password flow).
    #[must_use]
    pub fn provider_at(&self, location: impl PageLocation + 'static) -> AuthProvider {
        let mut provider = AuthProvider::new(
            self.open(),
            &self.config,
            Box::new(TracingNavigator),
            Box::new(location),
        );
        provider.init();
        provider
    }

    /// Path of the backing store file.
    #[must_use]
    pub fn data_file(&self) -> std::path::PathBuf {
        self.config.data_file.clone()
    }

    /// Path of the backing temp directory.
    #[must_use]
    pub fn dir(&self) -> &std::path::Path {
        self.dir.path()
    }
}

impl Default for TestStore {
    fn default() -> Self {
        Self::new()
    }
}
