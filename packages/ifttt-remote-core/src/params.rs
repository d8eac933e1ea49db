//! Request query parameters.
//!
//! Query strings are grouped per key into ordered value lists, so a key
//! repeated in the URL keeps every value. Parameters are logically
//! single-valued; [`ParamMap::single`] rejects keys with more than one value.

use std::collections::HashMap;

use crate::error::{RemoteError, RemoteResult};

/// Query parameters of one request, grouped by key.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ParamMap {
    values: HashMap<String, Vec<String>>,
}

/// Why a single-valued lookup failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLookupError {
    /// The key is not present.
    Missing,
    /// The key has more than one value.
    Ambiguous,
}

impl ParamMap {
    /// Parses a raw (still percent-encoded) query string.
    ///
    /// Pairs with an empty value are dropped, so `?__mode=` reads the same as
    /// a missing `__mode`.
    pub fn from_query(query: &str) -> Self {
        let mut values: HashMap<String, Vec<String>> = HashMap::new();
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if value.is_empty() {
                continue;
            }
            values
                .entry(key.into_owned())
                .or_default()
                .push(value.into_owned());
        }
        Self { values }
    }

    /// Returns every value recorded for `key`, in query order.
    fn all(&self, key: &str) -> &[String] {
        self.values.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the only value for `key`.
    pub fn lookup(&self, key: &str) -> Result<&str, ParamLookupError> {
        match self.all(key) {
            [] => Err(ParamLookupError::Missing),
            [value] => Ok(value.as_str()),
            _ => Err(ParamLookupError::Ambiguous),
        }
    }

    /// Returns the only value for `key` as a command parameter.
    ///
    /// # Errors
    ///
    /// [`RemoteError::InvalidParameter`] if the key is missing or repeated.
    pub fn single(&self, key: &str) -> RemoteResult<&str> {
        self.lookup(key).map_err(|e| match e {
            ParamLookupError::Missing => {
                RemoteError::InvalidParameter(format!("could not find parameter {}", key))
            }
            ParamLookupError::Ambiguous => {
                RemoteError::InvalidParameter(format!("parameter {} has more than one value", key))
            }
        })
    }
}
