//! The preference document tree.
//!
//! A [`PreferenceDocument`] is an ordered mapping from string keys to
//! [`PrefValue`]s, plus the `version` attribute carried by the `<plist>`
//! root element.  Values are a simplified property-list model: strings,
//! dates, nested dictionaries, and arrays.
//!
//! # Ordering and uniqueness
//!
//! [`PrefDict`] keeps keys in insertion order, and that order is the order in
//! which codecs emit them.  Keys are unique within one dictionary level:
//! inserting an existing key replaces the value but keeps the key's original
//! position, so re-saving an edited document does not reshuffle the file.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, SecondsFormat, SubsecRound, Utc};
use indexmap::IndexMap;
use thiserror::Error;

/// Version attribute written on `<plist>` when none was loaded.
pub const DEFAULT_PLIST_VERSION: &str = "1.0";

// ── Dates ─────────────────────────────────────────────────────────────────────

/// Earliest year a [`PrefDate`] can hold.
pub const MIN_DATE_YEAR: i32 = 0;

/// Latest year a [`PrefDate`] can hold.
pub const MAX_DATE_YEAR: i32 = 9999;

/// Errors from building a [`PrefDate`].
#[derive(Debug, Error)]
pub enum DateError {
    /// The text is not an RFC 3339 timestamp.
    #[error("{0}")]
    Parse(#[from] chrono::ParseError),

    /// The instant has no four-digit year in UTC.
    #[error("year {0} is outside 0000-9999")]
    OutOfRange(i32),
}

/// A property-list date: a UTC instant with whole-second precision and a
/// four-digit year.
///
/// The XML property-list format stores dates as `YYYY-MM-DDTHH:MM:SSZ`, which
/// cannot represent fractions of a second or years outside `0000`-`9999`.
/// Sub-second precision is truncated on construction and out-of-range years
/// are refused, so every `PrefDate` survives a save and re-load unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PrefDate(DateTime<Utc>);

impl PrefDate {
    /// Wraps `instant`, dropping any sub-second component.
    ///
    /// Returns `None` when the UTC year is outside `0000`-`9999`.
    pub fn new(instant: DateTime<Utc>) -> Option<Self> {
        (MIN_DATE_YEAR..=MAX_DATE_YEAR)
            .contains(&instant.year())
            .then(|| Self(instant.trunc_subsecs(0)))
    }

    /// The current time, truncated to whole seconds.
    pub fn now() -> Self {
        Self(Utc::now().trunc_subsecs(0))
    }

    /// Builds a date from seconds since the Unix epoch.
    ///
    /// Returns `None` when `secs` falls outside years `0000`-`9999`.
    pub fn from_unix_seconds(secs: i64) -> Option<Self> {
        DateTime::<Utc>::from_timestamp(secs, 0).and_then(Self::new)
    }

    /// Parses an RFC 3339 timestamp and normalises it to UTC.
    ///
    /// Plist dates (`2024-01-02T03:04:05Z`) are a subset of RFC 3339, so
    /// every well-formed plist date parses.  Offsets other than `Z` are
    /// accepted and converted.
    ///
    /// # Errors
    ///
    /// Returns [`DateError::Parse`] if `text` is not an RFC 3339 timestamp, or
    /// [`DateError::OutOfRange`] if the UTC year has more than four digits or
    /// is negative.
    pub fn parse(text: &str) -> Result<Self, DateError> {
        let utc = DateTime::parse_from_rfc3339(text.trim())?.with_timezone(&Utc);
        Self::new(utc).ok_or(DateError::OutOfRange(utc.year()))
    }

    /// Returns the underlying UTC instant.
    pub fn as_datetime(&self) -> DateTime<Utc> {
        self.0
    }

    /// Seconds since the Unix epoch.
    pub fn unix_seconds(&self) -> i64 {
        self.0.timestamp()
    }
}

impl fmt::Display for PrefDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.to_rfc3339_opts(SecondsFormat::Secs, true))
    }
}

impl FromStr for PrefDate {
    type Err = DateError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<DateTime<Utc>> for PrefDate {
    type Error = DateError;

    fn try_from(instant: DateTime<Utc>) -> Result<Self, Self::Error> {
        Self::new(instant).ok_or(DateError::OutOfRange(instant.year()))
    }
}

// ── Values ────────────────────────────────────────────────────────────────────

/// A single value in the preference tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrefValue {
    /// `<string>` in XML, a JSON string.
    String(String),
    /// `<date>` in XML, `{"$date": "..."}` in JSON.
    Date(PrefDate),
    /// `<dict>` in XML, a JSON object.
    Dict(PrefDict),
    /// `<array>` in XML, a JSON array.
    Array(Vec<PrefValue>),
}

impl PrefValue {
    /// Short name of the value kind, as used in the XML element names.
    pub fn kind_name(&self) -> &'static str {
        match self {
            PrefValue::String(_) => "string",
            PrefValue::Date(_) => "date",
            PrefValue::Dict(_) => "dict",
            PrefValue::Array(_) => "array",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrefValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_date(&self) -> Option<PrefDate> {
        match self {
            PrefValue::Date(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&PrefDict> {
        match self {
            PrefValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_dict_mut(&mut self) -> Option<&mut PrefDict> {
        match self {
            PrefValue::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<&[PrefValue]> {
        match self {
            PrefValue::Array(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for PrefValue {
    fn from(s: &str) -> Self {
        PrefValue::String(s.to_string())
    }
}

impl From<String> for PrefValue {
    fn from(s: String) -> Self {
        PrefValue::String(s)
    }
}

impl From<PrefDate> for PrefValue {
    fn from(d: PrefDate) -> Self {
        PrefValue::Date(d)
    }
}

impl From<PrefDict> for PrefValue {
    fn from(d: PrefDict) -> Self {
        PrefValue::Dict(d)
    }
}

impl From<Vec<PrefValue>> for PrefValue {
    fn from(items: Vec<PrefValue>) -> Self {
        PrefValue::Array(items)
    }
}

// ── Dictionaries ──────────────────────────────────────────────────────────────

/// An ordered mapping from unique string keys to values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PrefDict {
    entries: IndexMap<String, PrefValue>,
}

impl PrefDict {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `value` under `key`, returning the previous value if any.
    ///
    /// A replaced key keeps its original position.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PrefValue>,
    ) -> Option<PrefValue> {
        self.entries.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut PrefValue> {
        self.entries.get_mut(key)
    }

    /// Removes `key`, shifting later entries down to preserve their order.
    pub fn remove(&mut self, key: &str) -> Option<PrefValue> {
        self.entries.shift_remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates entries in document order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PrefValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Iterates keys in document order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<PrefValue>> FromIterator<(K, V)> for PrefDict {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dict = PrefDict::new();
        for (key, value) in iter {
            dict.insert(key, value);
        }
        dict
    }
}

impl IntoIterator for PrefDict {
    type Item = (String, PrefValue);
    type IntoIter = indexmap::map::IntoIter<String, PrefValue>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

// ── Document ──────────────────────────────────────────────────────────────────

/// A complete preference set: the `<plist>` version plus its root dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreferenceDocument {
    /// Value of the `version` attribute on `<plist>`.
    pub version: String,
    /// Root dictionary.
    pub dict: PrefDict,
}

impl PreferenceDocument {
    /// Creates an empty document with the default plist version.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a document with the default plist version around `dict`.
    pub fn with_dict(dict: PrefDict) -> Self {
        Self {
            version: DEFAULT_PLIST_VERSION.to_string(),
            dict,
        }
    }

    /// Looks up a top-level key.
    pub fn get(&self, key: &str) -> Option<&PrefValue> {
        self.dict.get(key)
    }

    /// Inserts a top-level key.  See [`PrefDict::insert`].
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        value: impl Into<PrefValue>,
    ) -> Option<PrefValue> {
        self.dict.insert(key, value)
    }
}

impl Default for PreferenceDocument {
    fn default() -> Self {
        Self::with_dict(PrefDict::new())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
