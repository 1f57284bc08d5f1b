//! Array ranges addressed by `field[n]` and `field[start:end]` selectors
//!
//! Selector indices are 1-based and may be negative (`-1` is the last
//! element). A [`Subset`] only holds the raw endpoints; binding it to a
//! concrete array length with [`Subset::size`] produces a [`Window`], which is
//! the only thing that can touch an array.

use crate::error::{Result, SelectError};
use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;

static INDEX_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?s)(?P<name>.*)\[\s*(?P<index>-?\d+)\s*\]$").unwrap()
});

static RANGE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?s)(?P<name>.*)\[\s*(?P<start>-?\d*)\s*:\s*(?P<end>-?\d*)\s*\]$").unwrap()
});

/// An unresolved array range
///
/// Endpoints are stored as 0-based offsets, or negative offsets counted from
/// the end of the array. `None` means open-ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Subset {
    start: Option<i64>,
    end: Option<i64>,
}

impl Subset {
    /// Build a subset from 1-based (or negative) selector endpoints
    pub fn resolve(raw_start: Option<i64>, raw_end: Option<i64>) -> Self {
        Subset {
            start: raw_start.map(to_offset),
            end: raw_end.map(to_offset),
        }
    }

    /// A single element, as in `field[n]`
    pub fn single(raw: i64) -> Self {
        Self::resolve(Some(raw), Some(raw))
    }

    /// Split a selector token such as `logins[2:4]` into its field name and subset
    ///
    /// Tokens without an index or range suffix yield `Ok(None)` and are used as
    /// literal field names. A suffix that has the right shape but does not hold
    /// a usable number is an error.
    pub fn parse(token: &str) -> Result<Option<(String, Subset)>> {
        if let Some(caps) = INDEX_REGEX.captures(token) {
            let index = parse_endpoint(token, &caps["index"])?;
            return Ok(Some((caps["name"].trim().to_string(), Subset::resolve(index, index))));
        }

        if let Some(caps) = RANGE_REGEX.captures(token) {
            let start = parse_endpoint(token, &caps["start"])?;
            let end = parse_endpoint(token, &caps["end"])?;
            return Ok(Some((caps["name"].trim().to_string(), Subset::resolve(start, end))));
        }

        Ok(None)
    }

    /// Bind this subset to an array of `len` elements
    pub fn size(&self, len: usize) -> Window {
        if len == 0 {
            return Window::empty();
        }

        let len = len as i64;
        let from_end = |offset: i64| if offset < 0 { len + offset } else { offset };

        let start = self.start.map_or(0, from_end).max(0);
        let end = self.end.map_or(len - 1, from_end).min(len - 1);

        if start > end {
            return Window::empty();
        }

        Window {
            range: start as usize..end as usize + 1,
        }
    }
}

/// 1-based selector position to 0-based offset; `0` is read as the first element
fn to_offset(raw: i64) -> i64 {
    if raw > 0 {
        raw - 1
    } else {
        raw
    }
}

fn parse_endpoint(token: &str, text: &str) -> Result<Option<i64>> {
    if text.is_empty() {
        return Ok(None);
    }

    text.parse::<i64>()
        .map(Some)
        .map_err(|_| SelectError::InvalidIndex {
            token: token.to_string(),
        })
}

/// A subset resolved against a concrete array length
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Window {
    range: Range<usize>,
}

impl Window {
    fn empty() -> Self {
        Window { range: 0..0 }
    }

    /// Indices covered by the window, in order
    pub fn indices(&self) -> Range<usize> {
        self.range.clone()
    }

    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    /// The covered elements of `array`
    pub fn slice<'a, T>(&self, array: &'a [T]) -> &'a [T] {
        array.get(self.indices()).unwrap_or(&[])
    }

    pub fn slice_mut<'a, T>(&self, array: &'a mut [T]) -> &'a mut [T] {
        match array.get_mut(self.indices()) {
            Some(items) => items,
            None => &mut [],
        }
    }

    /// Clone the covered elements onto the end of `target`
    pub fn extract_into<T: Clone>(&self, target: &mut Vec<T>, array: &[T]) {
        target.extend_from_slice(self.slice(array));
    }

    /// Delete the covered elements in place
    pub fn remove_from<T>(&self, array: &mut Vec<T>) {
        if self.range.end <= array.len() {
            array.drain(self.indices());
        }
    }

    /// Indices of a `len`-long array that fall outside the window, in order
    pub fn complement(&self, len: usize) -> impl Iterator<Item = usize> {
        let range = self.indices();
        (0..len).filter(move |i| !range.contains(i))
    }

    /// Number of elements of a `len`-long array that fall outside the window
    pub fn complement_count(&self, len: usize) -> usize {
        len.saturating_sub(self.len())
    }

    /// Delete everything outside the window, keeping the covered elements in order
    pub fn remove_complement<T>(&self, array: &mut Vec<T>) {
        if self.is_empty() {
            array.clear();
            return;
        }
        array.truncate(self.range.end);
        let head = self.range.start.min(array.len());
        array.drain(..head);
    }
}
