//! Cookie construction for the session identifier token
//!
//! All cookies flow through a [`CookieFactory`] built from a fixed set of
//! [`CookieOptions`]. The manager snapshots a factory when a session starts
//! and keeps it for the whole lifecycle, so the clearing cookie issued by
//! `destroy` carries exactly the path/domain/secure/http-only attributes the
//! token was set with; a mismatched scope would silently fail to clear the
//! client side.

use actix_web::cookie::{time::Duration, Cookie, SameSite};
use actix_web::HttpRequest;

use crate::error::Result;
use crate::settings::CookieSettings;

/// Resolved attributes for the identifier cookie
#[derive(Debug, Clone)]
pub struct CookieOptions {
    pub name: String,
    pub path: String,
    pub domain: Option<String>,
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSite,
    /// `None` yields a session cookie the browser drops on exit
    pub max_age: Option<Duration>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            name: "keeprs_session".to_string(),
            path: "/".to_string(),
            domain: None,
            secure: true,
            http_only: true,
            same_site: SameSite::Lax,
            max_age: None,
        }
    }
}

impl CookieOptions {
    /// Resolve validated [`CookieSettings`] into concrete cookie attributes
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` when `same_site` does not parse
    /// or the cookie lifetime overflows.
    pub fn from_settings(settings: &CookieSettings) -> Result<Self> {
        let same_site = parse_same_site(&settings.same_site).ok_or_else(|| {
            crate::error::SessionError::Configuration(format!(
                "same_site '{}' is not one of strict, lax, none",
                settings.same_site
            ))
        })?;
        let max_age = match settings.max_age_secs {
            Some(secs) => Some(Duration::seconds(i64::try_from(secs).map_err(|_| {
                crate::error::SessionError::Configuration(format!(
                    "max_age_secs {secs} is out of range"
                ))
            })?)),
            None => None,
        };
        Ok(Self {
            name: settings.name.clone(),
            path: settings.path.clone(),
            domain: settings.domain.clone(),
            secure: settings.secure,
            http_only: settings.http_only,
            same_site,
            max_age,
        })
    }
}

/// Parse a configured `SameSite` policy name
pub(crate) fn parse_same_site(value: &str) -> Option<SameSite> {
    match value.to_ascii_lowercase().as_str() {
        "strict" => Some(SameSite::Strict),
        "lax" => Some(SameSite::Lax),
        "none" => Some(SameSite::None),
        _ => None,
    }
}

/// Cookie factory for the session identifier token
///
/// One factory is snapshotted per session lifecycle; issuing and clearing
/// always agree on attributes.
#[derive(Debug, Clone)]
pub struct CookieFactory {
    options: CookieOptions,
}

impl CookieFactory {
    /// Create a factory with the given attribute set
    #[must_use]
    pub fn new(options: CookieOptions) -> Self {
        Self { options }
    }

    /// The attribute set every cookie from this factory carries
    #[must_use]
    pub fn options(&self) -> &CookieOptions {
        &self.options
    }

    /// Build the identifier cookie carrying `id`
    #[must_use]
    pub fn create_session_cookie(&self, id: &str) -> Cookie<'static> {
        self.build(id.to_owned(), self.options.max_age)
    }

    /// Build an already-expired cookie that clears the identifier token,
    /// using the same scope attributes it was issued with
    #[must_use]
    pub fn create_expired_cookie(&self) -> Cookie<'static> {
        self.build(String::new(), Some(Duration::seconds(-1)))
    }

    fn build(&self, value: String, max_age: Option<Duration>) -> Cookie<'static> {
        let mut builder = Cookie::build(self.options.name.clone(), value)
            .http_only(self.options.http_only)
            .secure(self.options.secure)
            .same_site(self.options.same_site)
            .path(self.options.path.clone());
        if let Some(domain) = &self.options.domain {
            builder = builder.domain(domain.clone());
        }
        if let Some(max_age) = max_age {
            builder = builder.max_age(max_age);
        }
        builder.finish()
    }
}

/// Extract a cookie value from a request; `None` means "no session", which
/// is not an error
#[must_use]
pub fn extract_cookie_value(req: &HttpRequest, cookie_name: &str) -> Option<String> {
    req.cookie(cookie_name)
        .map(|cookie| cookie.value().to_string())
}
