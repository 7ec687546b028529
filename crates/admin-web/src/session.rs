//! Server-side admin sessions keyed by a random cookie token.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;

use axum::http::{header::COOKIE, HeaderMap};
use tracing::debug;

pub const COOKIE_NAME: &str = "roku_remote_session";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashKind {
    Success,
    Danger,
}

impl FlashKind {
    pub fn css_class(self) -> &'static str {
        match self {
            FlashKind::Success => "success",
            FlashKind::Danger => "danger",
        }
    }
}

/// One-shot message shown on the next page render.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flash {
    pub kind: FlashKind,
    pub message: String,
}

impl Flash {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Success,
            message: message.into(),
        }
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self {
            kind: FlashKind::Danger,
            message: message.into(),
        }
    }
}

/// Most sessions kept at once; logging in past this drops the oldest.
pub const MAX_SESSIONS: usize = 16;

#[derive(Debug, Default)]
struct Sessions {
    flashes: HashMap<String, Vec<Flash>>,
    order: VecDeque<String>,
}

/// Logged-in sessions. A token present in the map is authenticated.
#[derive(Debug, Default)]
pub struct SessionStore {
    inner: Mutex<Sessions>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Sessions> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn create(&self) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        let mut s = self.lock();
        while s.order.len() >= MAX_SESSIONS {
            if let Some(oldest) = s.order.pop_front() {
                s.flashes.remove(&oldest);
                debug!("dropped oldest admin session");
            }
        }
        s.flashes.insert(token.clone(), Vec::new());
        s.order.push_back(token.clone());
        token
    }

    pub fn remove(&self, token: &str) {
        let mut s = self.lock();
        s.flashes.remove(token);
        s.order.retain(|t| t != token);
    }

    /// Token from the request cookie, if it names a live session.
    pub fn authenticated(&self, headers: &HeaderMap) -> Option<String> {
        let token = token_from_headers(headers)?;
        self.lock().flashes.contains_key(&token).then_some(token)
    }

    pub fn push_flash(&self, token: &str, flash: Flash) {
        if let Some(flashes) = self.lock().flashes.get_mut(token) {
            flashes.push(flash);
        }
    }

    pub fn take_flashes(&self, token: &str) -> Vec<Flash> {
        self.lock()
            .flashes
            .get_mut(token)
            .map(std::mem::take)
            .unwrap_or_default()
    }
}

pub fn token_from_headers(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == COOKIE_NAME)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

pub fn set_cookie(token: &str) -> String {
    format!("{COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Lax")
}

pub fn clear_cookie() -> String {
    format!("{COOKIE_NAME}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;

    #[test]
    fn reads_token_among_other_cookies() {
        let mut h = HeaderMap::new();
        h.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; roku_remote_session=abc123; x=y"),
        );
        assert_eq!(token_from_headers(&h).as_deref(), Some("abc123"));
    }

    #[test]
    fn empty_or_missing_cookie() {
        let mut h = HeaderMap::new();
        assert_eq!(token_from_headers(&h), None);
        h.insert(COOKIE, HeaderValue::from_static("roku_remote_session="));
        assert_eq!(token_from_headers(&h), None);
    }

    #[test]
    fn flashes_are_consumed_once() {
        let store = SessionStore::new();
        let token = store.create();
        store.push_flash(&token, Flash::success("saved"));
        assert_eq!(store.take_flashes(&token), vec![Flash::success("saved")]);
        assert!(store.take_flashes(&token).is_empty());
    }

    #[test]
    fn unknown_token_is_not_authenticated() {
        let store = SessionStore::new();
        let token = store.create();
        let mut h = HeaderMap::new();
        h.insert(
            COOKIE,
            HeaderValue::from_str(&format!("{COOKIE_NAME}={token}")).unwrap(),
        );
        assert_eq!(store.authenticated(&h), Some(token.clone()));

        store.remove(&token);
        assert_eq!(store.authenticated(&h), None);
        assert!(store.lock().flashes.is_empty());
        assert!(store.lock().order.is_empty());
    }

    #[test]
    fn logins_past_the_cap_evict_the_oldest() {
        let store = SessionStore::new();
        let tokens: Vec<String> = (0..MAX_SESSIONS + 2).map(|_| store.create()).collect();

        let s = store.lock();
        assert_eq!(s.flashes.len(), MAX_SESSIONS);
        assert_eq!(s.order.len(), MAX_SESSIONS);
        assert!(!s.flashes.contains_key(&tokens[0]));
        assert!(!s.flashes.contains_key(&tokens[1]));
        assert!(s.flashes.contains_key(&tokens[2]));
        assert!(s.flashes.contains_key(tokens.last().unwrap()));
    }
}
