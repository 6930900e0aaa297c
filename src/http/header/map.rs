use super::{canonical, CookieJar, SET_COOKIE};
use crate::error::Error;

use std::fmt;

/// HTTP headers of a request or response.
///
/// Keys are canonicalized on every access, so `Content-Type`,
/// `content_type` and `CONTENT-TYPE` name the same entry. Setting
/// an empty value removes the entry instead of storing it.
///
/// Cookies to send live in a separate [`CookieJar`] and are emitted
/// as `Set-Cookie` lines after the regular headers.
#[derive(Clone, Default, PartialEq)]
pub struct Headers {
    entries: Vec<(String, String)>,
    cookies: CookieJar,
}

impl Headers {
    pub fn new() -> Headers {
        Headers {
            entries: Vec::with_capacity(8),
            cookies: CookieJar::new(),
        }
    }

    fn position(&self, name: &str) -> Option<usize> {
        let name = canonical(name);
        self.entries.iter().position(|(key, _)| *key == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.position(name)
            .map(|index| self.entries[index].1.as_str())
    }

    /// Set the value of a header, replacing any previous value.
    ///
    /// An empty value deletes the header; deleting an absent
    /// header is not an error here.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();

        match (self.position(name), value.is_empty()) {
            (Some(index), true) => {
                self.entries.remove(index);
            }
            (Some(index), false) => self.entries[index].1 = value,
            (None, true) => {}
            (None, false) => self.entries.push((canonical(name), value)),
        }
    }

    /// Remove a header, returning its value.
    ///
    /// Fails with [`Error::NotFound`] if the header is absent.
    pub fn remove(&mut self, name: &str) -> Result<String, Error> {
        match self.position(name) {
            Some(index) => Ok(self.entries.remove(index).1),
            None => Err(Error::NotFound(canonical(name))),
        }
    }

    /// The canonical header names, in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    pub fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    /// Copy every header and cookie of `other` into this set.
    /// Values from `other` win on conflict.
    pub fn merge(&mut self, other: &Headers) {
        for (key, value) in other.iter() {
            self.set(key, value);
        }

        self.cookies.merge(&other.cookies);
    }

    /// The header lines to put on the wire: canonical headers in
    /// insertion order, then one `Set-Cookie` line per cookie.
    pub fn lines(&self) -> Vec<(String, String)> {
        let mut lines = self.entries.clone();

        for cookie in self.cookies.iter() {
            lines.push((SET_COOKIE.to_owned(), cookie.to_string()));
        }

        lines
    }
}

impl fmt::Debug for Headers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter())
            .entry(&"cookies", &self.cookies)
            .finish()
    }
}

impl<K, V> FromIterator<(K, V)> for Headers
where
    K: AsRef<str>,
    V: Into<String>,
{
    fn from_iter<T>(iter: T) -> Self
    where
        T: IntoIterator<Item = (K, V)>,
    {
        let mut headers = Headers::new();
        for (key, value) in iter {
            headers.set(key.as_ref(), value);
        }
        headers
    }
}
