pub mod config;
pub mod error;
pub mod filter;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use config::{JournalMode, StorageConfig};
pub use error::StorageError;
pub use filter::{compile_age, compile_birth_year, CriterionModifier, DateRangeFilter, IntCriterion};
pub use sqlite::{commit, SqliteRepository, SqliteStorage};
pub use traits::*;
