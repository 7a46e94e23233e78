//! Artifact references for document fields
//!
//! An artifact is the local payload a user picked for a document field: an
//! in-memory encoded image, a file on disk, or a URL. The engine never moves
//! the bytes itself; it only needs a mime type, a summary for display, and a
//! way to open a stream of known length, which the host supplies through
//! [`ArtifactSource`].

use serde::Serialize;
use std::fs::File;
use std::io::{self, Cursor, Read};
use std::path::{Path, PathBuf};

/// Locally selected payload of a document field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Artifact {
    /// Encoded image bytes (PNG, JPEG, ...)
    Image(Vec<u8>),
    /// Path to a file on the device
    File(PathBuf),
    /// URL to a resource; `file://` URLs resolve like [`Artifact::File`]
    Url(String),
}

/// Broad media family, used for the human readable summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MimeCategory {
    Image,
    Video,
    Audio,
    Document,
}

impl MimeCategory {
    pub fn from_mime_type(mime_type: &str) -> Self {
        match mime_type.split('/').next().unwrap_or_default() {
            "image" => MimeCategory::Image,
            "video" => MimeCategory::Video,
            "audio" => MimeCategory::Audio,
            _ => MimeCategory::Document,
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            MimeCategory::Image => "an image has been selected",
            MimeCategory::Video => "a video has been selected",
            MimeCategory::Audio => "an audio file has been selected",
            MimeCategory::Document => "a file has been selected",
        }
    }
}

/// Mime type for a file extension (without the dot, any case).
pub fn mime_type_for_extension(extension: &str) -> Option<&'static str> {
    let mime_type = match extension.to_lowercase().as_str() {
        // Images
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "ico" => "image/x-icon",
        // Videos
        "mpg" | "mpeg" | "mpe" => "video/mpeg",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mov" => "video/quicktime",
        "avi" => "video/x-msvideo",
        "mkv" => "video/x-matroska",
        "m4v" => "video/x-m4v",
        "3gp" => "video/3gpp",
        // Audio
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "ogg" => "audio/ogg",
        "m4a" => "audio/mp4",
        "flac" => "audio/flac",
        "aac" => "audio/aac",
        // Documents
        "pdf" => "application/pdf",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "xls" => "application/vnd.ms-excel",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "ppt" => "application/vnd.ms-powerpoint",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "txt" => "text/plain",
        "csv" => "text/csv",
        "zip" => "application/zip",
        _ => return None,
    };
    Some(mime_type)
}

impl Artifact {
    pub fn image(bytes: impl Into<Vec<u8>>) -> Self {
        Artifact::Image(bytes.into())
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Artifact::File(path.into())
    }

    pub fn url(url: impl Into<String>) -> Self {
        Artifact::Url(url.into())
    }

    /// Mime type from the image signature or the reference's extension.
    pub fn mime_type(&self) -> Option<&'static str> {
        match self {
            Artifact::Image(bytes) => image::guess_format(bytes)
                .ok()
                .map(|format| format.to_mime_type()),
            Artifact::File(_) | Artifact::Url(_) => {
                self.extension().and_then(|ext| mime_type_for_extension(&ext))
            }
        }
    }

    pub fn category(&self) -> Option<MimeCategory> {
        match self {
            Artifact::Image(_) => Some(MimeCategory::Image),
            _ => self.mime_type().map(MimeCategory::from_mime_type),
        }
    }

    /// Short description for display, e.g. "a video has been selected".
    pub fn summary(&self) -> Option<&'static str> {
        self.category().map(|category| category.summary())
    }

    fn extension(&self) -> Option<String> {
        let extension = match self {
            Artifact::Image(_) => return None,
            Artifact::File(path) => {
                let file_name = path.file_name()?.to_string_lossy();
                // Windows separators are plain characters on other hosts.
                let last = file_name.rsplit('\\').next()?.to_string();
                Path::new(&last).extension()?.to_string_lossy().into_owned()
            }
            Artifact::Url(url) => {
                let file_name = url_path(url).rsplit('/').next()?;
                Path::new(file_name).extension()?.to_string_lossy().into_owned()
            }
        };
        (!extension.is_empty()).then_some(extension)
    }

    /// Local path this artifact points at, if any.
    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Artifact::File(path) => Some(path.as_path()),
            Artifact::Url(url) => url.strip_prefix("file://").map(Path::new),
            Artifact::Image(_) => None,
        }
    }
}

/// Path part of a URL, without scheme, authority, query or fragment.
fn url_path(url: &str) -> &str {
    let without_fragment = url.split('#').next().unwrap_or_default();
    let without_query = without_fragment.split('?').next().unwrap_or_default();
    match without_query.split_once("://") {
        Some((_, rest)) => rest.find('/').map(|i| &rest[i..]).unwrap_or(""),
        None => without_query,
    }
}

/// Open stream over an artifact's bytes.
pub struct ArtifactStream {
    pub reader: Box<dyn Read + Send>,
    pub length: u64,
}

impl std::fmt::Debug for ArtifactStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArtifactStream")
            .field("length", &self.length)
            .finish_non_exhaustive()
    }
}

/// Capability supplied by the host: given an artifact, produce its bytes.
pub trait ArtifactSource: Send + Sync {
    fn open(&self, artifact: &Artifact) -> io::Result<ArtifactStream>;
}

/// Resolves in-memory images and local files (including `file://` URLs).
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalArtifactSource;

impl ArtifactSource for LocalArtifactSource {
    fn open(&self, artifact: &Artifact) -> io::Result<ArtifactStream> {
        if let Artifact::Image(bytes) = artifact {
            return Ok(ArtifactStream {
                length: bytes.len() as u64,
                reader: Box::new(Cursor::new(bytes.clone())),
            });
        }

        let path = artifact.local_path().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::Unsupported,
                "remote artifacts must be resolved by the host",
            )
        })?;
        let file = File::open(path)?;
        let length = file.metadata()?.len();
        Ok(ArtifactStream {
            reader: Box::new(file),
            length,
        })
    }
}
