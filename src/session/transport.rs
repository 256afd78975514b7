//! Transport seam carrying the session identifier token
//!
//! The manager never talks to the HTTP layer directly; it hands finished
//! cookies to a [`TokenTransport`]. The cookie-backed transport buffers them
//! for the host application to apply to its response, which keeps the
//! manager free of any response type. A headless transport stands in for
//! execution contexts (cli tools, background jobs) that cannot carry a
//! session token at all.

use actix_web::cookie::Cookie;
use actix_web::HttpRequest;

use crate::session::cookie::extract_cookie_value;

/// Capability for reading and writing the single session identifier token
pub trait TokenTransport {
    /// Whether this context can carry a session token at all; sessions never
    /// exist on a non-interactive transport
    fn interactive(&self) -> bool;

    /// The identifier supplied by the client, if any
    fn incoming_id(&self) -> Option<String>;

    /// Deliver an identifier cookie to the client
    fn issue(&mut self, cookie: Cookie<'static>);

    /// Deliver a clearing cookie and forget the client-held identifier, so a
    /// later `start` mints a fresh one
    fn revoke(&mut self, cookie: Cookie<'static>);
}

/// Cookie-backed transport that buffers outgoing cookies for the host
///
/// The host drains the buffer with [`CookieTransport::take_cookies`] and
/// adds each cookie to its HTTP response. Only the most recent cookie per
/// name is kept, so a `start` followed by `regenerate` yields a single
/// `Set-Cookie` for the session token.
#[derive(Debug, Default)]
pub struct CookieTransport {
    incoming: Option<String>,
    outgoing: Vec<Cookie<'static>>,
}

impl CookieTransport {
    /// Transport for a client that supplied `incoming` as its token value
    #[must_use]
    pub fn new(incoming: Option<String>) -> Self {
        Self {
            incoming,
            outgoing: Vec::new(),
        }
    }

    /// Read the token straight out of a request's cookies
    #[must_use]
    pub fn from_request(req: &HttpRequest, cookie_name: &str) -> Self {
        Self::new(extract_cookie_value(req, cookie_name))
    }

    /// Cookies waiting to be applied to the response
    #[must_use]
    pub fn pending_cookies(&self) -> &[Cookie<'static>] {
        &self.outgoing
    }

    /// Drain the buffered cookies for the host to apply
    pub fn take_cookies(&mut self) -> Vec<Cookie<'static>> {
        std::mem::take(&mut self.outgoing)
    }

    fn replace(&mut self, cookie: Cookie<'static>) {
        let name = cookie.name().to_owned();
        self.outgoing.retain(|pending| pending.name() != name);
        self.outgoing.push(cookie);
    }
}

impl TokenTransport for CookieTransport {
    fn interactive(&self) -> bool {
        true
    }

    fn incoming_id(&self) -> Option<String> {
        self.incoming.clone()
    }

    fn issue(&mut self, cookie: Cookie<'static>) {
        self.replace(cookie);
    }

    fn revoke(&mut self, cookie: Cookie<'static>) {
        self.incoming = None;
        self.replace(cookie);
    }
}

/// Transport for contexts that must never carry a session
#[derive(Debug, Clone, Copy, Default)]
pub struct HeadlessTransport;

impl TokenTransport for HeadlessTransport {
    fn interactive(&self) -> bool {
        false
    }

    fn incoming_id(&self) -> Option<String> {
        None
    }

    fn issue(&mut self, _cookie: Cookie<'static>) {}

    fn revoke(&mut self, _cookie: Cookie<'static>) {}
}
