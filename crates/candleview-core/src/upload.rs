//! Upload gate: cheap file checks that run before any parsing attempt.

use std::fs;
use std::path::Path;

use thiserror::Error;

/// Extensions accepted for database uploads.
pub const ALLOWED_EXTENSIONS: [&str; 3] = ["db", "sqlite", "sqlite3"];

/// Maximum accepted upload size.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("unsupported file extension '{extension}'; expected one of .db, .sqlite, .sqlite3")]
    UnsupportedExtension { extension: String },

    #[error("file is {size} bytes; maximum size is {max} bytes")]
    Oversized { size: u64, max: u64 },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Check the extension whitelist, case-insensitively.
pub fn check_extension(path: &Path) -> Result<(), UploadError> {
    let extension = path
        .extension()
        .and_then(|extension| extension.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    if ALLOWED_EXTENSIONS.contains(&extension.as_str()) {
        return Ok(());
    }

    Err(UploadError::UnsupportedExtension { extension })
}

/// Gate and read an upload: extension whitelist first, then the size cap from
/// file metadata, then the actual read. Nothing is parsed here.
pub fn read_database_file(path: &Path, max_bytes: u64) -> Result<Vec<u8>, UploadError> {
    check_extension(path)?;

    let size = fs::metadata(path)?.len();
    if size > max_bytes {
        return Err(UploadError::Oversized {
            size,
            max: max_bytes,
        });
    }

    Ok(fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn accepts_whitelisted_extensions_case_insensitively() {
        for name in ["market.db", "market.sqlite", "market.SQLITE3"] {
            check_extension(&PathBuf::from(name)).expect("extension should pass");
        }
    }

    #[test]
    fn rejects_unlisted_extension() {
        let error = check_extension(&PathBuf::from("market.csv")).expect_err("must fail");
        assert!(matches!(
            error,
            UploadError::UnsupportedExtension { extension } if extension == "csv"
        ));
    }

    #[test]
    fn rejects_missing_extension() {
        let error = check_extension(&PathBuf::from("market")).expect_err("must fail");
        assert!(matches!(error, UploadError::UnsupportedExtension { .. }));
    }

    #[test]
    fn rejects_oversized_file_before_reading() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("big.db");
        std::fs::write(&path, vec![0_u8; 64]).expect("write fixture");

        let error = read_database_file(&path, 16).expect_err("must fail");
        assert!(matches!(error, UploadError::Oversized { size: 64, max: 16 }));
    }
}
