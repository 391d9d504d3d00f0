//! Entity identity and versioning.
//!
//! Every entity revision is addressed by an [`Originator`] - the `(id, version)`
//! tuple carried on every event. The `id` is a lowercased UUID v4; the
//! `version` is the decimal string of a positive integer that increases by 1
//! per mutation, starting at `"1"` on creation.

use crate::error::CrudError;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Identity of an entity revision.
///
/// An `Originator` without a version refers to the latest revision when
/// reading; mutating operations always carry a concrete version.
///
/// # Examples
///
/// ```
/// use crudstore_core::originator::Originator;
///
/// let first = Originator::synthesize();
/// assert_eq!(first.version, "1");
/// assert!(first.validate().is_ok());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Originator {
    /// Entity id (lowercased canonical UUID v4).
    pub id: String,
    /// Decimal revision number, `"1"` for the creation event. Empty means
    /// "latest" on reads.
    #[serde(default)]
    pub version: String,
}

impl Originator {
    /// Create an originator from an id and a concrete version.
    #[must_use]
    pub fn new(id: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: version.into(),
        }
    }

    /// Create an originator referring to the latest revision of `id`.
    #[must_use]
    pub fn latest(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            version: String::new(),
        }
    }

    /// Allocate a fresh identity: a new UUID v4 at version `"1"`.
    #[must_use]
    pub fn synthesize() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            version: "1".to_string(),
        }
    }

    /// Whether a concrete version is present.
    #[must_use]
    pub fn has_version(&self) -> bool {
        !self.version.is_empty()
    }

    /// Parse the version as its integer value.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::InvalidArgument`] when the version is empty or not
    /// a decimal integer.
    pub fn version_number(&self) -> Result<u64, CrudError> {
        self.version.parse::<u64>().map_err(|_| {
            CrudError::InvalidArgument(format!("invalid originator version: {:?}", self.version))
        })
    }

    /// Derive the identity of the next revision (`version + 1`).
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::InvalidArgument`] when the current version does
    /// not parse as a decimal integer.
    pub fn next(&self) -> Result<Self, CrudError> {
        let next = self.version_number()? + 1;
        Ok(Self {
            id: self.id.clone(),
            version: next.to_string(),
        })
    }

    /// Syntactic validation of the identity.
    ///
    /// Checks that the id is present and is a valid UUID v4. A version is
    /// deliberately not required here; callers layer their own version rules.
    ///
    /// # Errors
    ///
    /// Returns [`CrudError::InvalidArgument`] when the id is empty or not a
    /// UUID v4.
    pub fn validate(&self) -> Result<(), CrudError> {
        if self.id.is_empty() {
            return Err(CrudError::InvalidArgument(
                "missing originator.id".to_string(),
            ));
        }

        let parsed = Uuid::parse_str(&self.id).map_err(|_| {
            CrudError::InvalidArgument("originator id should be valid uuid4".to_string())
        })?;
        if parsed.get_version_num() != 4 {
            return Err(CrudError::InvalidArgument(
                "originator id should be valid uuid4".to_string(),
            ));
        }

        Ok(())
    }
}

impl fmt::Display for Originator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.version.is_empty() {
            write!(f, "{}", self.id)
        } else {
            write!(f, "{}@{}", self.id, self.version)
        }
    }
}
