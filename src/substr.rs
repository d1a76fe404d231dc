//! Zero-copy views over byte buffers.
//!
//! A [`Substr`] borrows a region of a caller-owned buffer and every derived
//! view (`before`, `after`, `skip`, `truncate`, `seek`, ...) borrows the same
//! storage. Nothing here allocates or mutates the underlying bytes, which is
//! what lets the HTTP codec frame messages directly inside a receive buffer.
//!
//! ```
//! # use nethttp::substr::Substr;
//! let line = Substr::from("Host:  localhost:7200 \r\n");
//! let value = line.after(b':').skip_while(|b| b == b' ').before("\r\n").truncate(b' ');
//! assert_eq!(value, "localhost:7200");
//! ```

use std::borrow::Cow;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Something a [`Substr`] can search for: a byte, a char, a string, a byte
/// string, or another view.
pub trait Needle {
    fn needle_bytes(&self) -> Cow<'_, [u8]>;
}

impl Needle for u8 {
    fn needle_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(std::slice::from_ref(self))
    }
}

/// Matches the UTF-8 encoding of the char.
impl Needle for char {
    fn needle_bytes(&self) -> Cow<'_, [u8]> {
        let mut buf = [0u8; 4];
        Cow::Owned(self.encode_utf8(&mut buf).as_bytes().to_vec())
    }
}

impl Needle for str {
    fn needle_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.as_bytes())
    }
}

impl Needle for [u8] {
    fn needle_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl<const N: usize> Needle for [u8; N] {
    fn needle_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self)
    }
}

impl Needle for Substr<'_> {
    fn needle_bytes(&self) -> Cow<'_, [u8]> {
        Cow::Borrowed(self.bytes)
    }
}

impl<T: Needle + ?Sized> Needle for &T {
    fn needle_bytes(&self) -> Cow<'_, [u8]> {
        (**self).needle_bytes()
    }
}

/// ASCII whitespace predicate for the `*_while` family.
pub fn is_space(byte: u8) -> bool {
    byte.is_ascii_whitespace()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    match needle {
        [] => Some(0),
        [byte] => haystack.iter().position(|b| b == byte),
        [first, rest @ ..] => {
            let mut offset = 0;
            while let Some(pos) = haystack[offset..].iter().position(|b| b == first) {
                let start = offset + pos;
                if haystack[start + 1..].starts_with(rest) {
                    return Some(start);
                }
                offset = start + 1;
            }
            None
        }
    }
}

/// A read-only window into borrowed bytes.
#[derive(Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Substr<'a> {
    bytes: &'a [u8],
}

impl<'a> Substr<'a> {
    pub const fn new(bytes: &'a [u8]) -> Self {
        Self { bytes }
    }

    /// Builds a view that ends at the first NUL byte, or spans the whole slice
    /// when there is none.
    pub fn from_nul_terminated(bytes: &'a [u8]) -> Self {
        let len = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
        Self::new(&bytes[..len])
    }

    pub const fn as_bytes(&self) -> &'a [u8] {
        self.bytes
    }

    pub const fn len(&self) -> usize {
        self.bytes.len()
    }

    pub const fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Byte at `index`, or `0` past the end.
    pub fn get(&self, index: usize) -> u8 {
        self.bytes.get(index).copied().unwrap_or(0)
    }

    /// Returns the view as UTF-8 when it is valid.
    pub fn as_str(&self) -> Option<&'a str> {
        std::str::from_utf8(self.bytes).ok()
    }

    pub fn to_string_lossy(&self) -> Cow<'a, str> {
        String::from_utf8_lossy(self.bytes)
    }

    /// Parses the trimmed view as `T`.
    pub fn parse<T: FromStr>(&self) -> Option<T> {
        self.skip_while(is_space)
            .truncate_while(is_space)
            .as_str()
            .and_then(|s| s.parse().ok())
    }

    // ---- queries ------------------------------------------------------------

    /// Byte-wise lexicographic ordering; on a common prefix the shorter view
    /// sorts first.
    pub fn compare(&self, other: &Substr<'_>) -> Ordering {
        self.bytes.cmp(other.bytes)
    }

    pub fn has_prefix<N: Needle>(&self, needle: N) -> bool {
        self.bytes.starts_with(&needle.needle_bytes())
    }

    pub fn has_suffix<N: Needle>(&self, needle: N) -> bool {
        self.bytes.ends_with(&needle.needle_bytes())
    }

    pub fn contains<N: Needle>(&self, needle: N) -> bool {
        find(self.bytes, &needle.needle_bytes()).is_some()
    }

    pub fn eq_ignore_ascii_case(&self, other: impl AsRef<[u8]>) -> bool {
        self.bytes.eq_ignore_ascii_case(other.as_ref())
    }

    // ---- slicing ------------------------------------------------------------

    /// First `n` bytes, or an empty view if the view is shorter.
    pub fn prefix(&self, n: usize) -> Self {
        if n > self.len() {
            return Self::default();
        }
        Self::new(&self.bytes[..n])
    }

    /// Last `n` bytes, or an empty view if the view is shorter.
    pub fn suffix(&self, n: usize) -> Self {
        if n > self.len() {
            return Self::default();
        }
        Self::new(&self.bytes[self.len() - n..])
    }

    /// View starting at the first occurrence of `needle`.
    pub fn seek<N: Needle>(&self, needle: N) -> Self {
        match find(self.bytes, &needle.needle_bytes()) {
            Some(pos) => Self::new(&self.bytes[pos..]),
            None => Self::default(),
        }
    }

    /// View starting at the first byte matching `pred`.
    pub fn seek_by(&self, pred: impl Fn(u8) -> bool) -> Self {
        match self.bytes.iter().position(|&b| pred(b)) {
            Some(pos) => Self::new(&self.bytes[pos..]),
            None => Self::default(),
        }
    }

    pub fn seek_at(&self, offset: usize) -> Self {
        if offset >= self.len() {
            return Self::default();
        }
        Self::new(&self.bytes[offset..])
    }

    /// Drops `needle` from the front. Unchanged when `needle` is not a prefix.
    pub fn skip<N: Needle>(&self, needle: N) -> Self {
        let needle = needle.needle_bytes();
        if self.bytes.starts_with(&needle) {
            Self::new(&self.bytes[needle.len()..])
        } else {
            *self
        }
    }

    /// Drops the leading run of bytes matching `pred`.
    pub fn skip_while(&self, pred: impl Fn(u8) -> bool) -> Self {
        match self.bytes.iter().position(|&b| !pred(b)) {
            Some(pos) => Self::new(&self.bytes[pos..]),
            None => Self::default(),
        }
    }

    pub fn skip_n(&self, n: usize) -> Self {
        self.seek_at(n)
    }

    /// Everything up to (not including) the first `needle`; empty if absent.
    pub fn before<N: Needle>(&self, needle: N) -> Self {
        match find(self.bytes, &needle.needle_bytes()) {
            Some(pos) => Self::new(&self.bytes[..pos]),
            None => Self::default(),
        }
    }

    /// Everything following the first `needle`; empty if absent.
    pub fn after<N: Needle>(&self, needle: N) -> Self {
        let needle = needle.needle_bytes();
        match find(self.bytes, &needle) {
            Some(pos) => Self::new(&self.bytes[pos + needle.len()..]),
            None => Self::default(),
        }
    }

    /// From the start through the first `needle` inclusive; empty if absent.
    pub fn including<N: Needle>(&self, needle: N) -> Self {
        let needle = needle.needle_bytes();
        match find(self.bytes, &needle) {
            Some(pos) => Self::new(&self.bytes[..pos + needle.len()]),
            None => Self::default(),
        }
    }

    /// Drops `needle` from the back. Unchanged when `needle` is not a suffix.
    pub fn truncate<N: Needle>(&self, needle: N) -> Self {
        let needle = needle.needle_bytes();
        if self.bytes.ends_with(&needle) {
            Self::new(&self.bytes[..self.len() - needle.len()])
        } else {
            *self
        }
    }

    /// Drops the trailing run of bytes matching `pred`.
    pub fn truncate_while(&self, pred: impl Fn(u8) -> bool) -> Self {
        match self.bytes.iter().rposition(|&b| !pred(b)) {
            Some(pos) => Self::new(&self.bytes[..=pos]),
            None => Self::default(),
        }
    }

    pub fn truncate_n(&self, n: usize) -> Self {
        if n >= self.len() {
            return Self::default();
        }
        Self::new(&self.bytes[..self.len() - n])
    }

    /// Splits on every occurrence of `needle`.
    pub fn split<N: Needle>(&self, needle: N) -> Split<'a, N> {
        Split {
            rest: Some(*self),
            needle,
        }
    }
}

/// Iterator returned by [`Substr::split`].
pub struct Split<'a, N> {
    rest: Option<Substr<'a>>,
    needle: N,
}

impl<'a, N: Needle> Iterator for Split<'a, N> {
    type Item = Substr<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let rest = self.rest?;
        let separator = self.needle.needle_bytes();
        let found = if separator.is_empty() {
            None
        } else {
            find(rest.bytes, &separator)
        };
        match found {
            Some(pos) => {
                self.rest = Some(Substr::new(&rest.bytes[pos + separator.len()..]));
                Some(Substr::new(&rest.bytes[..pos]))
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

impl PartialOrd for Substr<'_> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Substr<'_> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

impl PartialEq<str> for Substr<'_> {
    fn eq(&self, other: &str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<&str> for Substr<'_> {
    fn eq(&self, other: &&str) -> bool {
        self.bytes == other.as_bytes()
    }
}

impl PartialEq<[u8]> for Substr<'_> {
    fn eq(&self, other: &[u8]) -> bool {
        self.bytes == other
    }
}

impl AsRef<[u8]> for Substr<'_> {
    fn as_ref(&self) -> &[u8] {
        self.bytes
    }
}

impl<'a> From<&'a [u8]> for Substr<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        Self::new(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for Substr<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        Self::new(bytes)
    }
}

impl<'a> From<&'a str> for Substr<'a> {
    fn from(s: &'a str) -> Self {
        Self::new(s.as_bytes())
    }
}

impl<'a> From<&'a String> for Substr<'a> {
    fn from(s: &'a String) -> Self {
        Self::new(s.as_bytes())
    }
}

impl<'a> From<&'a Vec<u8>> for Substr<'a> {
    fn from(bytes: &'a Vec<u8>) -> Self {
        Self::new(bytes)
    }
}

impl fmt::Debug for Substr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_string_lossy(), f)
    }
}

impl fmt::Display for Substr<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_lossy())
    }
}
