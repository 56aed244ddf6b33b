//! Repeatable values owned by a performer.
//!
//! Attachments have no identity of their own. Each type defines a semantic
//! key, and two values with the same key are the same attachment as far as
//! reconciliation is concerned.

use serde::{Deserialize, Serialize};

/// A value that can live in a per-performer attachment collection.
pub trait Attachment: Clone {
    type Key: Ord + Clone;

    fn semantic_key(&self) -> Self::Key;
}

/// The persisted attachment collections of a performer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttachmentKind {
    Alias,
    Url,
    Tattoo,
    Piercing,
}

impl AttachmentKind {
    pub const ALL: [AttachmentKind; 4] = [Self::Alias, Self::Url, Self::Tattoo, Self::Piercing];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Alias => "alias",
            Self::Url => "url",
            Self::Tattoo => "tattoo",
            Self::Piercing => "piercing",
        }
    }
}

/// Which body-modification collection a `BodyModification` belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BodyModKind {
    Tattoo,
    Piercing,
}

impl From<BodyModKind> for AttachmentKind {
    fn from(kind: BodyModKind) -> Self {
        match kind {
            BodyModKind::Tattoo => AttachmentKind::Tattoo,
            BodyModKind::Piercing => AttachmentKind::Piercing,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alias(pub String);

impl Alias {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Trimmed, case-folded form used for equality.
    pub fn normalized(&self) -> String {
        self.0.trim().to_lowercase()
    }
}

impl Attachment for Alias {
    type Key = String;

    fn semantic_key(&self) -> String {
        self.normalized()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Url {
    pub url: String,
    pub kind: String,
}

impl Url {
    pub fn new(url: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            kind: kind.into(),
        }
    }
}

impl Attachment for Url {
    type Key = (String, String);

    fn semantic_key(&self) -> (String, String) {
        (self.url.clone(), self.kind.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BodyModification {
    pub location: String,
    pub description: Option<String>,
}

impl BodyModification {
    pub fn new(location: impl Into<String>, description: Option<&str>) -> Self {
        Self {
            location: location.into(),
            description: description.map(str::to_string),
        }
    }
}

impl Attachment for BodyModification {
    type Key = (String, Option<String>);

    fn semantic_key(&self) -> (String, Option<String>) {
        (self.location.clone(), self.description.clone())
    }
}
