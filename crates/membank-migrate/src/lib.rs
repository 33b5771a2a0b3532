pub mod classify;
pub mod converters;
pub mod error;
pub mod markdown;
pub mod orchestrator;
pub mod registry;
pub mod validator;

pub use classify::classify;
pub use error::{MigrationError, Result};
pub use orchestrator::Migrator;
pub use registry::{Converter, ConverterRegistry};
pub use validator::{SchemaValidator, ValidationResult};
