//! The backend's cart cookie, held in the storefront session.

use reqwest::header::{COOKIE, HeaderMap, SET_COOKIE};
use reqwest::RequestBuilder;
use serde::{Deserialize, Serialize};

/// `name=value` pairs the backend has set, in the order first seen.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartCookie {
    pairs: Vec<(String, String)>,
    #[serde(skip)]
    changed: bool,
}

impl CartCookie {
    /// The `Cookie` header value, if any cookie is held.
    #[must_use]
    pub fn header_value(&self) -> Option<String> {
        if self.pairs.is_empty() {
            return None;
        }
        Some(
            self.pairs
                .iter()
                .map(|(name, value)| format!("{name}={value}"))
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// Whether a response added or replaced a cookie since loading.
    #[must_use]
    pub const fn is_changed(&self) -> bool {
        self.changed
    }

    /// Attach the held cookies to an outgoing request.
    pub(super) fn attach(&self, request: RequestBuilder) -> RequestBuilder {
        match self.header_value() {
            Some(value) => request.header(COOKIE, value),
            None => request,
        }
    }

    /// Take every `Set-Cookie` from a backend response. Attributes after the
    /// first `;` are dropped.
    pub fn absorb(&mut self, headers: &HeaderMap) {
        for raw in headers.get_all(SET_COOKIE) {
            let Ok(raw) = raw.to_str() else { continue };
            let pair = raw.split(';').next().unwrap_or_default();
            let Some((name, value)) = pair.split_once('=') else {
                continue;
            };
            self.set(name.trim(), value.trim());
        }
    }

    fn set(&mut self, name: &str, value: &str) {
        if name.is_empty() {
            return;
        }
        match self.pairs.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) if existing == value => {}
            Some((_, existing)) => {
                value.clone_into(existing);
                self.changed = true;
            }
            None => {
                self.pairs.push((name.to_owned(), value.to_owned()));
                self.changed = true;
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use reqwest::header::HeaderValue;

    use super::*;

    fn set_cookies(values: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for v in values {
            headers.append(SET_COOKIE, HeaderValue::from_str(v).unwrap());
        }
        headers
    }

    #[test]
    fn test_absorb_keeps_name_value_only() {
        let mut jar = CartCookie::default();
        assert_eq!(jar.header_value(), None);

        jar.absorb(&set_cookies(&[
            "connect.sid=s%3Aabc; Path=/; HttpOnly",
            "theme=dark",
        ]));
        assert!(jar.is_changed());
        assert_eq!(
            jar.header_value().unwrap(),
            "connect.sid=s%3Aabc; theme=dark"
        );
    }

    #[test]
    fn test_absorb_replaces_same_name() {
        let mut jar = CartCookie::default();
        jar.absorb(&set_cookies(&["sid=one; Path=/"]));
        jar.absorb(&set_cookies(&["sid=two; Path=/"]));
        assert_eq!(jar.header_value().unwrap(), "sid=two");
    }

    #[test]
    fn test_unchanged_after_session_round_trip() {
        let mut jar = CartCookie::default();
        jar.absorb(&set_cookies(&["sid=one"]));
        let stored = serde_json::to_string(&jar).unwrap();

        let mut loaded: CartCookie = serde_json::from_str(&stored).unwrap();
        assert!(!loaded.is_changed());
        loaded.absorb(&set_cookies(&["sid=one"]));
        assert!(!loaded.is_changed());
    }
}
