//! Identity types for document lineages
//!
//! This module defines:
//! - ObjectId: stable identity of a document lineage (`scheme~value`)
//! - UniqueId: one specific bitemporal record (`scheme~value~version`)

use crate::error::{MasterError, MasterResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Separator used in the textual forms of identifiers
pub const ID_SEPARATOR: char = '~';

fn check_part(part: &str, text: &str) -> MasterResult<()> {
    if part.is_empty() || part.contains(ID_SEPARATOR) {
        return Err(MasterError::InvalidId(text.to_string()));
    }
    Ok(())
}

/// Stable identity of a document lineage
///
/// An ObjectId never changes across versions or corrections. The scheme
/// names the master that owns the lineage (e.g. `DbExg` for exchanges).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ObjectId {
    scheme: String,
    value: String,
}

impl ObjectId {
    /// Create an ObjectId from its parts
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// Create an ObjectId whose text form parses back to it
    ///
    /// Fails with `InvalidId` if either part is empty or contains `~`.
    pub fn try_new(scheme: impl Into<String>, value: impl Into<String>) -> MasterResult<Self> {
        let object_id = Self::new(scheme, value);
        object_id.validate()?;
        Ok(object_id)
    }

    /// Check that both parts are non-empty and free of `~`
    pub fn validate(&self) -> MasterResult<()> {
        let text = self.to_string();
        check_part(&self.scheme, &text)?;
        check_part(&self.value, &text)
    }

    /// Create a new random ObjectId in `scheme` using UUID v4
    pub fn generate(scheme: impl Into<String>) -> Self {
        Self::new(scheme, Uuid::new_v4().simple().to_string())
    }

    /// Scheme of the owning master
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Value within the scheme
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Identify one record of this lineage
    pub fn at_version(&self, version: impl Into<String>) -> UniqueId {
        UniqueId::new(self.clone(), version)
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.scheme, ID_SEPARATOR, self.value)
    }
}

impl FromStr for ObjectId {
    type Err = MasterError;

    fn from_str(s: &str) -> MasterResult<Self> {
        let mut parts = s.split(ID_SEPARATOR);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(scheme), Some(value), None) => ObjectId::try_new(scheme, value),
            _ => Err(MasterError::InvalidId(s.to_string())),
        }
    }
}

/// Identity of one bitemporal record: `(ObjectId, version)`
///
/// Versions are assigned by the store, monotonically per object, in commit
/// order. They carry no time meaning of their own.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UniqueId {
    object_id: ObjectId,
    version: String,
}

impl UniqueId {
    /// Create a UniqueId from an object id and version string
    pub fn new(object_id: ObjectId, version: impl Into<String>) -> Self {
        Self {
            object_id,
            version: version.into(),
        }
    }

    /// The lineage this record belongs to
    pub fn object_id(&self) -> &ObjectId {
        &self.object_id
    }

    /// Version string within the lineage
    pub fn version(&self) -> &str {
        &self.version
    }
}

impl fmt::Display for UniqueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}{}", self.object_id, ID_SEPARATOR, self.version)
    }
}

impl FromStr for UniqueId {
    type Err = MasterError;

    fn from_str(s: &str) -> MasterResult<Self> {
        let (object_part, version) = s
            .rsplit_once(ID_SEPARATOR)
            .ok_or_else(|| MasterError::InvalidId(s.to_string()))?;
        check_part(version, s)?;
        let object_id = object_part
            .parse::<ObjectId>()
            .map_err(|_| MasterError::InvalidId(s.to_string()))?;
        Ok(UniqueId::new(object_id, version))
    }
}
