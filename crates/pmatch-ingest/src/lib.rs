//! Registry ingestion for patient matching.

pub mod error;
pub mod registry;

pub use error::{IngestError, Result};
pub use registry::{CsvRegistry, Registries, RegistryReader, read_registry};
