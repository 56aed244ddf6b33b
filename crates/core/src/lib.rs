pub mod attachment;
pub mod edit;
pub mod error;
pub mod ids;
pub mod performer;
pub mod reconcile;

pub use attachment::{Alias, Attachment, AttachmentKind, BodyModKind, BodyModification, Url};
pub use edit::{Edit, OperationKind, PerformerEditData, TargetType};
pub use error::CoreError;
pub use ids::*;
pub use performer::{FieldMismatch, Gender, Performer, PerformerEdit};
