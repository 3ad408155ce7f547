use serde::{Deserialize, Serialize};
use std::fmt;

/// A project identifier.
///
/// Supplied by the source system (the first column of the import file), never generated here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProjectId(i32);

impl ProjectId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for ProjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for ProjectId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<ProjectId> for i32 {
    fn from(id: ProjectId) -> Self {
        id.0
    }
}

/// Surrogate identifier of a lookup entry (database SERIAL).
///
/// Only meaningful together with the [`LookupKind`](super::LookupKind) of the table it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LookupId(i32);

impl LookupId {
    pub fn new(id: i32) -> Self {
        Self(id)
    }

    pub fn as_i32(&self) -> i32 {
        self.0
    }
}

impl fmt::Display for LookupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for LookupId {
    fn from(id: i32) -> Self {
        Self(id)
    }
}

impl From<LookupId> for i32 {
    fn from(id: LookupId) -> Self {
        id.0
    }
}
