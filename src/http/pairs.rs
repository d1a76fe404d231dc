use std::collections::btree_map::{self, BTreeMap};
use std::fmt;
use std::ops::Index;
use std::str::FromStr;

/// Ordered string-to-string map used for headers and query parameters.
///
/// Keys are compared byte-for-byte, so `Host` and `host` are distinct keys.
/// Lookups that need HTTP's case-insensitive field names go through
/// [`get_ignore_ascii_case`](Pairs::get_ignore_ascii_case).
///
/// # Example
///
/// ```
/// # use nethttp::http::Pairs;
/// let mut headers = Pairs::new();
/// headers.set("Content-Length", 42);
/// assert_eq!(&headers["Content-Length"], "42");
/// assert_eq!(headers.get_as::<usize>("Content-Length"), Some(42));
/// assert_eq!(&headers["missing"], "");
/// ```
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Pairs(BTreeMap<String, String>);

impl Pairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Looks up `key` with ASCII case folding. The first match in key order
    /// wins.
    pub fn get_ignore_ascii_case(&self, key: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }

    pub fn has_ignore_ascii_case(&self, key: &str) -> bool {
        self.get_ignore_ascii_case(key).is_some()
    }

    /// Parses the value under `key`. A missing key or a value that does not
    /// parse yields `None`.
    pub fn get_as<T: FromStr>(&self, key: &str) -> Option<T> {
        self.get(key).and_then(|v| v.trim().parse().ok())
    }

    /// Value under `key`, or `default` when absent.
    pub fn get_or<'a>(&'a self, key: &str, default: &'a str) -> &'a str {
        self.get(key).unwrap_or(default)
    }

    /// Inserts or overwrites `key`. Any displayable value is stored in its
    /// textual form.
    pub fn set(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.0.insert(key.into(), value.to_string());
        self
    }

    /// Inserts `key` only when it is not already present.
    pub fn set_default(&mut self, key: impl Into<String>, value: impl ToString) -> &mut Self {
        self.0.entry(key.into()).or_insert_with(|| value.to_string());
        self
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.0.remove(key)
    }

    pub fn any(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    /// Entries in ascending key order.
    pub fn iter(&self) -> btree_map::Iter<'_, String, String> {
        self.0.iter()
    }
}

impl Index<&str> for Pairs {
    type Output = str;

    /// Missing keys read as the empty string.
    fn index(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }
}

impl<'a> IntoIterator for &'a Pairs {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl IntoIterator for Pairs {
    type Item = (String, String);
    type IntoIter = btree_map::IntoIter<String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Pairs {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut pairs = Pairs::new();
        pairs.extend(iter);
        pairs
    }
}

impl<K: Into<String>, V: ToString> Extend<(K, V)> for Pairs {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.set(k, v);
        }
    }
}

impl<K: Into<String>, V: ToString, const N: usize> From<[(K, V); N]> for Pairs {
    fn from(entries: [(K, V); N]) -> Self {
        entries.into_iter().collect()
    }
}

impl fmt::Debug for Pairs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_overwrites() {
        let mut pairs = Pairs::new();
        pairs.set("a", "1").set("a", "2");
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs.get("a"), Some("2"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let pairs = Pairs::from([("Host", "example.com")]);
        assert!(pairs.has("Host"));
        assert!(!pairs.has("host"));
        assert_eq!(pairs.get_ignore_ascii_case("host"), Some("example.com"));
    }

    #[test]
    fn typed_lookup_failure_is_none() {
        let pairs = Pairs::from([("n", "abc")]);
        assert_eq!(pairs.get_as::<u32>("n"), None);
        assert_eq!(pairs.get_as::<u32>("missing"), None);
    }
}
