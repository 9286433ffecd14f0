use std::path::Path;

use snafu::{ResultExt, ensure};

use crate::error::{AttachmentNotAFileSnafu, AttachmentUnavailableSnafu, ChatResult};
use crate::model::MessageKind;

const FALLBACK_MIME_TYPE: &str = "application/octet-stream";

/// A local file staged for sending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Name shown in the staged chip and on the file row.
    pub name: String,
    /// Reference the renderer can load, e.g. a local path.
    pub handle: String,
    pub mime_type: String,
}

impl Attachment {
    pub fn new(
        name: impl Into<String>,
        handle: impl Into<String>,
        mime_type: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
            mime_type: mime_type.into(),
        }
    }

    pub fn is_image(&self) -> bool {
        self.mime_type.starts_with("image/")
    }

    /// Everything that is not an image is sent as a generic file.
    pub fn kind(&self) -> MessageKind {
        if self.is_image() {
            MessageKind::Image
        } else {
            MessageKind::File
        }
    }
}

/// Host capability that turns a picked file into something displayable.
///
/// The chat core never manages platform resource lifetimes itself; the host decides
/// what a displayable handle is.
pub trait AttachmentHost {
    fn stage(&self, path: &Path) -> ChatResult<Attachment>;
}

/// Default host: the displayable handle is the file's own path.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileHost;

impl AttachmentHost for LocalFileHost {
    fn stage(&self, path: &Path) -> ChatResult<Attachment> {
        let metadata = std::fs::metadata(path).context(AttachmentUnavailableSnafu {
            stage: "stat-attachment",
            path: path.to_path_buf(),
        })?;
        ensure!(
            metadata.is_file(),
            AttachmentNotAFileSnafu {
                stage: "check-attachment-kind",
                path: path.to_path_buf(),
            }
        );

        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Attachment::new(
            name,
            path.display().to_string(),
            mime_type_for_path(path),
        ))
    }
}

/// Guesses a MIME type from the file extension.
pub fn mime_type_for_path(path: &Path) -> &'static str {
    let Some(extension) = path.extension().and_then(|extension| extension.to_str()) else {
        return FALLBACK_MIME_TYPE;
    };

    match extension.to_ascii_lowercase().as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "bmp" => "image/bmp",
        "tif" | "tiff" => "image/tiff",
        "mp4" => "video/mp4",
        "mov" => "video/quicktime",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "pdf" => "application/pdf",
        "zip" => "application/zip",
        "json" => "application/json",
        "txt" | "md" => "text/plain",
        "csv" => "text/csv",
        _ => FALLBACK_MIME_TYPE,
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn image_extensions_stage_as_image_messages() {
        assert_eq!(mime_type_for_path(Path::new("holiday.JPG")), "image/jpeg");
        let attachment = Attachment::new("holiday.jpg", "/tmp/holiday.jpg", "image/jpeg");
        assert_eq!(attachment.kind(), MessageKind::Image);
    }

    #[test]
    fn non_image_files_stage_as_generic_files() {
        assert_eq!(mime_type_for_path(Path::new("clip.mp4")), "video/mp4");
        assert_eq!(mime_type_for_path(Path::new("README")), FALLBACK_MIME_TYPE);
        let attachment = Attachment::new("clip.mp4", "/tmp/clip.mp4", "video/mp4");
        assert_eq!(attachment.kind(), MessageKind::File);
    }

    #[test]
    fn local_host_stages_existing_files() {
        let mut file = tempfile::Builder::new()
            .suffix(".png")
            .tempfile()
            .expect("create temp file");
        file.write_all(b"not really a png").expect("write temp file");

        let attachment = LocalFileHost.stage(file.path()).expect("stage file");
        assert!(attachment.is_image());
        assert_eq!(attachment.handle, file.path().display().to_string());
        assert!(attachment.name.ends_with(".png"));
    }

    #[test]
    fn local_host_rejects_directories_and_missing_paths() {
        let directory = tempfile::tempdir().expect("create temp dir");
        assert!(LocalFileHost.stage(directory.path()).is_err());

        let missing = PathBuf::from(directory.path()).join("missing.pdf");
        assert!(LocalFileHost.stage(&missing).is_err());
    }
}
