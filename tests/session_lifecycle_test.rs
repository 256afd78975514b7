//! End-to-end session lifecycle against the persistent file handler
//!
//! Each test runs in its own temporary save path and walks the crate the
//! way a host application would: construct a manager per "request", drain
//! its cookies, and carry the token value into the next request.

use std::time::Duration;

use keeprs::{
    CookieTransport, FileSessionHandler, SessionHandler, SessionManager, SessionSettings,
};
use tempfile::TempDir;

fn settings_in(root: &TempDir) -> SessionSettings {
    let mut settings = SessionSettings::default();
    settings.cookie.secure = false;
    settings.storage.save_path = root.path().display().to_string();
    settings.storage.namespace = "keeprs-tests".to_string();
    settings.auto_flush = false;
    settings
}

fn request_manager(
    settings: SessionSettings,
    token: Option<String>,
) -> SessionManager<CookieTransport> {
    SessionManager::new(settings, CookieTransport::new(token)).unwrap()
}

#[test]
fn data_survives_across_requests_through_the_cookie() {
    let _ = env_logger::builder().is_test(true).try_init();
    let root = TempDir::new().unwrap();

    // first request: start fresh, store data, flush, capture the token
    let mut first = request_manager(settings_in(&root), None);
    assert!(first.start().unwrap());
    assert!(first.exists());
    first.put("user", "alice");
    first.put("theme", "dark");
    first.flush().unwrap();

    let cookies = first.transport_mut().take_cookies();
    assert_eq!(cookies.len(), 1);
    let token = cookies[0].value().to_string();
    assert_eq!(first.id(), Some(token.as_str()));

    // second request: the client presents the cookie, data is back
    let mut second = request_manager(settings_in(&root), Some(token.clone()));
    assert!(second.start().unwrap());
    assert_eq!(second.id(), Some(token.as_str()));
    assert_eq!(second.get("user"), Some("alice"));
    assert_eq!(second.get("theme"), Some("dark"));
}

#[test]
fn flash_data_is_consumed_within_one_request() {
    let root = TempDir::new().unwrap();
    let mut manager = request_manager(settings_in(&root), None);
    manager.start().unwrap();

    manager.put("notice", "profile saved");
    assert_eq!(manager.flash("notice"), Some("profile saved".to_string()));
    assert_eq!(manager.flash("notice"), None);
    assert_eq!(manager.get("notice"), None);
}

#[test]
fn login_flow_regenerates_the_identifier() {
    let root = TempDir::new().unwrap();

    let mut manager = request_manager(settings_in(&root), None);
    manager.start().unwrap();
    manager.put("cart", "pending");
    manager.flush().unwrap();
    let anonymous_id = manager.id().unwrap().to_string();

    // privilege change: regenerate and drop the old record
    assert!(manager.regenerate(true).unwrap());
    manager.put("user", "alice");
    manager.flush().unwrap();
    let authenticated_id = manager.id().unwrap().to_string();
    assert_ne!(anonymous_id, authenticated_id);

    // the freshest cookie carries the new identifier
    let cookies = manager.transport_mut().take_cookies();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].value(), authenticated_id);

    // an attacker replaying the fixated identifier gets an empty session
    drop(manager);
    let mut replayed = request_manager(settings_in(&root), Some(anonymous_id));
    replayed.start().unwrap();
    assert_eq!(replayed.get("cart"), None);
    assert_eq!(replayed.get("user"), None);

    // the legitimate client keeps everything
    let mut legitimate = request_manager(settings_in(&root), Some(authenticated_id));
    legitimate.start().unwrap();
    assert_eq!(legitimate.get("cart"), Some("pending"));
    assert_eq!(legitimate.get("user"), Some("alice"));
}

#[test]
fn destroy_ends_the_session_everywhere() {
    let root = TempDir::new().unwrap();

    let mut manager = request_manager(settings_in(&root), None);
    manager.start().unwrap();
    manager.put("user", "alice");
    manager.flush().unwrap();
    let token = manager.id().unwrap().to_string();

    assert!(manager.destroy().unwrap());
    assert!(!manager.exists());
    assert_eq!(manager.get("user"), None);

    // the client receives a clearing cookie with matching scope
    let cookies = manager.transport_mut().take_cookies();
    assert_eq!(cookies.len(), 1);
    assert_eq!(cookies[0].value(), "");
    assert_eq!(cookies[0].path(), Some("/"));
    assert!(cookies[0].max_age().unwrap().whole_seconds() < 0);

    // replaying the destroyed token yields a fresh, empty session
    let mut replayed = request_manager(settings_in(&root), Some(token));
    replayed.start().unwrap();
    assert_eq!(replayed.get("user"), None);
}

#[test]
fn auto_flush_persists_on_scope_exit() {
    let root = TempDir::new().unwrap();
    let mut settings = settings_in(&root);
    settings.auto_flush = true;

    let token;
    {
        let mut manager = request_manager(settings.clone(), None);
        manager.start().unwrap();
        manager.put("unsaved", "still there");
        token = manager.id().unwrap().to_string();
        // no explicit flush; the manager flushes as it leaves scope
    }

    let mut next = request_manager(settings, Some(token));
    next.start().unwrap();
    assert_eq!(next.get("unsaved"), Some("still there"));
}

#[test]
fn gc_sweeps_expired_records() {
    let root = TempDir::new().unwrap();
    let mut settings = settings_in(&root);
    settings.gc_max_lifetime_secs = 1_000_000;

    let mut manager = request_manager(settings.clone(), None);
    manager.start().unwrap();
    manager.put("k", "v");
    manager.flush().unwrap();

    // nothing is old enough for the configured lifetime
    assert_eq!(manager.gc().unwrap(), 0);

    // out-of-band sweeper (cron-like): its own handler over the same path
    let sweeper = FileSessionHandler::new();
    sweeper
        .open(&settings.storage.save_path, &settings.storage.namespace)
        .unwrap();
    assert_eq!(sweeper.gc(Duration::from_secs(1_000_000)).unwrap(), 0);

    // give the record a measurable age, then expire everything
    std::thread::sleep(Duration::from_millis(25));
    assert_eq!(sweeper.gc(Duration::ZERO).unwrap(), 1);
}

#[test]
fn headless_contexts_never_carry_sessions() {
    let root = TempDir::new().unwrap();
    let mut manager = SessionManager::headless(settings_in(&root)).unwrap();

    assert!(!manager.start().unwrap());
    assert!(!manager.exists());
    manager.put("ignored", "value");
    assert_eq!(manager.get("ignored"), None);
}

#[test]
fn settings_load_from_toml() {
    let root = TempDir::new().unwrap();
    let toml = format!(
        r#"
        gc_max_lifetime_secs = 900
        auto_flush = false

        [cookie]
        name = "app_session"
        secure = false
        same_site = "strict"

        [storage]
        save_path = "{}"
        namespace = "app"
        "#,
        root.path().display()
    );

    let settings = SessionSettings::from_toml_str(&toml).unwrap();
    let mut manager = request_manager(settings, None);
    manager.start().unwrap();

    let cookies = manager.transport_mut().take_cookies();
    assert_eq!(cookies[0].name(), "app_session");
}
