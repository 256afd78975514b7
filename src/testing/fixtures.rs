//! Pre-built test objects
//!
//! Central fixture provider so test files stop recreating the same settings
//! and managers by hand.

use std::sync::Arc;

use crate::session::transport::CookieTransport;
use crate::session::SessionManager;
use crate::settings::SessionSettings;
use crate::testing::mock::MemoryHandler;

/// Central fixture provider for all test data
pub struct TestFixtures;

impl TestFixtures {
    /// Settings suitable for tests: insecure cookie (no TLS in tests),
    /// explicit flushing, records under the system temp directory
    #[must_use]
    pub fn settings() -> SessionSettings {
        let mut settings = SessionSettings::default();
        settings.cookie.secure = false;
        settings.storage.namespace = "keeprs-tests".to_string();
        settings.auto_flush = false;
        settings
    }

    /// A manager over an in-memory handler, with no client-supplied token
    #[must_use]
    pub fn memory_manager() -> (SessionManager<CookieTransport>, Arc<MemoryHandler>) {
        Self::build_memory_manager(None)
    }

    /// A manager over an in-memory handler whose client supplied `incoming`
    /// as its token value
    #[must_use]
    pub fn memory_manager_with_incoming(
        incoming: &str,
    ) -> (SessionManager<CookieTransport>, Arc<MemoryHandler>) {
        Self::build_memory_manager(Some(incoming.to_string()))
    }

    fn build_memory_manager(
        incoming: Option<String>,
    ) -> (SessionManager<CookieTransport>, Arc<MemoryHandler>) {
        let handler = Arc::new(MemoryHandler::new());
        let mut manager =
            SessionManager::new(Self::settings(), CookieTransport::new(incoming))
                .expect("test settings are valid");
        manager
            .set_save_handler(handler.clone(), false)
            .expect("no session is active yet");
        (manager, handler)
    }
}
