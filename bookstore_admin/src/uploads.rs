use std::path::Path;

use serde::{Deserialize, Serialize};

const MAX_IMAGE_SIZE: u64 = 10 * 1024 * 1024;
const MAX_BOOK_FILE_SIZE: u64 = 50 * 1024 * 1024;

const IMAGE_TYPES: &[(&str, &str)] = &[
    ("jpg", "image/jpeg"),
    ("jpeg", "image/jpeg"),
    ("png", "image/png"),
    ("gif", "image/gif"),
    ("webp", "image/webp"),
];

const BOOK_FILE_TYPES: &[(&str, &str)] = &[
    ("pdf", "application/pdf"),
    ("epub", "application/epub+zip"),
    (
        "docx",
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
    ),
    ("doc", "application/msword"),
    ("xls", "application/vnd.ms-excel"),
    (
        "xlsx",
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
    ),
    ("txt", "text/plain"),
    ("rtf", "application/rtf"),
    ("odt", "application/vnd.oasis.opendocument.text"),
];

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Eq, PartialEq, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum UploadKind {
    /// Cover images and snapshots
    Image,
    /// Downloadable e-book files
    BookFile,
}

impl UploadKind {
    fn max_size(self) -> u64 {
        match self {
            UploadKind::Image => MAX_IMAGE_SIZE,
            UploadKind::BookFile => MAX_BOOK_FILE_SIZE,
        }
    }

    fn allowed_types(self) -> &'static [(&'static str, &'static str)] {
        match self {
            UploadKind::Image => IMAGE_TYPES,
            UploadKind::BookFile => BOOK_FILE_TYPES,
        }
    }
}

#[derive(Debug, thiserror::Error, Eq, PartialEq)]
pub enum UploadError {
    #[error("Only image files are allowed")]
    NotAnImage,

    #[error("Invalid book file type")]
    InvalidBookFileType,

    #[error("Image must be smaller than 10MB")]
    ImageTooLarge,

    #[error("Book file must be smaller than 50MB")]
    BookFileTooLarge,

    #[error("File has no name")]
    MissingFileName,
}

#[derive(Debug, Clone)]
/// File checked against the upload rules and ready to be sent as multipart
pub struct UploadFile {
    pub file_name: String,
    pub mime_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Picks the MIME type from the extension, `None` when the kind does not accept it
pub fn mime_type_for(file_name: &str, kind: UploadKind) -> Option<&'static str> {
    let extension = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    kind.allowed_types()
        .iter()
        .find(|(ext, _)| *ext == extension)
        .map(|(_, mime)| *mime)
}

pub fn check_upload(
    file_name: &str,
    size: u64,
    kind: UploadKind,
) -> Result<&'static str, UploadError> {
    let mime_type = mime_type_for(file_name, kind).ok_or(match kind {
        UploadKind::Image => UploadError::NotAnImage,
        UploadKind::BookFile => UploadError::InvalidBookFileType,
    })?;
    if size > kind.max_size() {
        return Err(match kind {
            UploadKind::Image => UploadError::ImageTooLarge,
            UploadKind::BookFile => UploadError::BookFileTooLarge,
        });
    }
    Ok(mime_type)
}

/// Reads a local file and checks it before anything is sent
pub async fn read_upload(path: &Path, kind: UploadKind) -> Result<UploadFile, crate::errors::ApiError> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or(UploadError::MissingFileName)?
        .to_string();
    let size = tokio::fs::metadata(path).await?.len();
    let mime_type = check_upload(&file_name, size, kind)?;
    let bytes = tokio::fs::read(path).await?;
    Ok(UploadFile {
        file_name,
        mime_type,
        bytes,
    })
}

#[cfg(test)]
mod uploads_tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn mime_type_comes_from_extension() {
        assert_eq!(mime_type_for("cover.JPG", UploadKind::Image), Some("image/jpeg"));
        assert_eq!(mime_type_for("book.epub", UploadKind::BookFile), Some("application/epub+zip"));
        assert_eq!(mime_type_for("book.epub", UploadKind::Image), None);
        assert_eq!(mime_type_for("no_extension", UploadKind::Image), None);
    }

    #[test]
    fn size_limits_depend_on_kind() {
        assert_eq!(
            check_upload("cover.png", MAX_IMAGE_SIZE + 1, UploadKind::Image),
            Err(UploadError::ImageTooLarge)
        );
        assert_eq!(
            check_upload("book.pdf", MAX_IMAGE_SIZE + 1, UploadKind::BookFile),
            Ok("application/pdf")
        );
        assert_eq!(
            check_upload("book.pdf", MAX_BOOK_FILE_SIZE + 1, UploadKind::BookFile),
            Err(UploadError::BookFileTooLarge)
        );
        assert_eq!(
            check_upload("notes.exe", 10, UploadKind::BookFile),
            Err(UploadError::InvalidBookFileType)
        );
    }

    #[tokio::test]
    async fn reads_checked_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.webp");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(b"RIFF0000WEBP")
            .unwrap();

        let upload = read_upload(&path, UploadKind::Image).await.unwrap();
        assert_eq!(upload.file_name, "snapshot.webp");
        assert_eq!(upload.mime_type, "image/webp");
        assert_eq!(upload.bytes, b"RIFF0000WEBP");

        let rejected = read_upload(&path, UploadKind::BookFile).await;
        assert!(matches!(
            rejected,
            Err(crate::errors::ApiError::Upload(UploadError::InvalidBookFileType))
        ));
    }
}
