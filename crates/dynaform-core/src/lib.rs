//! Dynaform Core Library
//!
//! This crate turns dynamic form definitions into typed field descriptors,
//! compiles their validation expressions, and tracks the upload lifecycle of
//! document fields.

pub mod config;
pub mod error;
pub mod hooks;
pub mod locale;
pub mod models;
pub mod schema;
pub mod validation;

// Re-export commonly used types
pub use config::EngineConfig;
pub use error::{ErrorMetadata, FormError, FormResult, LogLevel};
pub use hooks::{
    FieldEvent, FieldObserver, NoOpFieldObserver, RecordingFieldObserver, TracingFieldObserver,
};
pub use locale::Locale;
pub use models::{
    Artifact, ArtifactSource, ArtifactStream, DataType, DocumentValue, EditorKind,
    FieldDefinition, FieldDescriptor, FieldOption, FieldValue, LocalArtifactSource, MimeCategory,
    Number, UploadAttributes, UploadState,
};
pub use schema::{parse, parse_schema, FormSchema, SchemaFormat, SchemaParser};
pub use validation::{compile, ExpressionKind, ValidationMap, Validator, ValidatorKind};
