pub mod artifact;
pub mod data_type;
pub mod field;
pub mod upload;
pub mod value;

pub use artifact::{
    mime_type_for_extension, Artifact, ArtifactSource, ArtifactStream, LocalArtifactSource,
    MimeCategory,
};
pub use data_type::{DataType, EditorKind};
pub use field::{FieldDefinition, FieldDescriptor};
pub use upload::{DocumentValue, UploadAttributes, UploadState, SUBMITTED_ATTRIBUTES};
pub use value::{epoch_millis, FieldOption, FieldValue, Number};
