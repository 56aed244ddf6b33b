use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::ids::{EditId, PerformerId};
use crate::performer::PerformerEdit;

/// The closed set of edit operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    Create,
    Modify,
    Destroy,
    Merge,
}

impl OperationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Create => "CREATE",
            Self::Modify => "MODIFY",
            Self::Destroy => "DESTROY",
            Self::Merge => "MERGE",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OperationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CREATE" => Ok(Self::Create),
            "MODIFY" => Ok(Self::Modify),
            "DESTROY" => Ok(Self::Destroy),
            "MERGE" => Ok(Self::Merge),
            _ => Err(CoreError::InvalidData(format!("unsupported operation: {s}"))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetType {
    Performer,
    Studio,
    Scene,
    Tag,
}

impl TargetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Performer => "PERFORMER",
            Self::Studio => "STUDIO",
            Self::Scene => "SCENE",
            Self::Tag => "TAG",
        }
    }
}

impl fmt::Display for TargetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decoded payload of a performer edit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PerformerEditData {
    /// Values the edit wants to write.
    pub new: PerformerEdit,
    /// Values the submitter saw when the edit was drafted.
    #[serde(default)]
    pub old: Option<PerformerEdit>,
    /// Performers folded into the target by a merge, in order.
    #[serde(default)]
    pub merge_sources: Vec<PerformerId>,
}

impl PerformerEditData {
    pub fn to_msgpack(&self) -> Result<Vec<u8>, CoreError> {
        rmp_serde::to_vec_named(self).map_err(|e| CoreError::Serialization(e.to_string()))
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, CoreError> {
        rmp_serde::from_slice(bytes).map_err(|e| CoreError::Serialization(e.to_string()))
    }
}

/// One proposed change, as handed over once voting has accepted it.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    pub id: EditId,
    pub target_type: TargetType,
    pub operation: OperationKind,
    /// MessagePack-encoded payload; decode with the accessor for `target_type`.
    pub data: Vec<u8>,
}

impl Edit {
    pub fn new_performer(
        operation: OperationKind,
        data: &PerformerEditData,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            id: EditId::new(),
            target_type: TargetType::Performer,
            operation,
            data: data.to_msgpack()?,
        })
    }

    pub fn performer_data(&self) -> Result<PerformerEditData, CoreError> {
        if self.target_type != TargetType::Performer {
            return Err(CoreError::InvalidData(format!(
                "edit {} targets {}, not PERFORMER",
                self.id, self.target_type
            )));
        }
        PerformerEditData::from_msgpack(&self.data)
    }
}
