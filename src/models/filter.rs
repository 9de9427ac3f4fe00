//! Filter predicates forwarded to the cache service.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// Ordered collection of filter predicates (for example `type=regular`).
///
/// Predicates are opaque here: the cache service parses them and rejects
/// malformed ones at request time. Duplicates are kept and insertion order
/// is preserved so the encoded request is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSet(Vec<String>);

impl FilterSet {
    /// Creates an empty filter set.
    #[must_use]
    pub const fn new() -> Self {
        Self(Vec::new())
    }

    /// Builds a filter set from values in arrival order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if any value is empty.
    pub fn from_values<I, S>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut set = Self::new();
        for value in values {
            set.push(value)?;
        }
        Ok(set)
    }

    /// Appends a predicate.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the predicate is empty.
    pub fn push(&mut self, predicate: impl Into<String>) -> Result<()> {
        let predicate = predicate.into();
        if predicate.is_empty() {
            return Err(Error::InvalidInput(
                "filter predicate must not be empty".to_string(),
            ));
        }
        self.0.push(predicate);
        Ok(())
    }

    /// Number of predicates.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no predicates were supplied.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Consumes the set, returning the predicates.
    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.0
    }
}
