// src/cert/output.rs
use crate::app::ProvisionError;
use crate::utils::logging::Logger;
use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

pub const CERT_FILE_NAME: &str = "tls.crt";
pub const KEY_FILE_NAME: &str = "tls.key";

#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    pub certificate: PathBuf,
    pub key: PathBuf,
}

impl OutputPaths {
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            certificate: dir.join(CERT_FILE_NAME),
            key: dir.join(KEY_FILE_NAME),
        }
    }
}

/// Writes the certificate and key. Existing files are overwritten.
pub fn write_outputs(
    dir: &Path,
    certificate: &[u8],
    key_pem: &[u8],
    logger: &mut dyn Logger,
) -> Result<OutputPaths, ProvisionError> {
    let paths = OutputPaths::in_dir(dir);

    fs::create_dir_all(dir).map_err(|source| write_error(dir, source, logger))?;

    logger.debug_log(&format!("Writing certificate: {}", paths.certificate.display()));
    fs::write(&paths.certificate, certificate)
        .map_err(|source| write_error(&paths.certificate, source, logger))?;

    logger.debug_log(&format!("Writing private key: {}", paths.key.display()));
    write_private(&paths.key, key_pem).map_err(|source| write_error(&paths.key, source, logger))?;

    Ok(paths)
}

/// The key never exists on disk with wider permissions than 0600. A file
/// left over from an earlier run is tightened before it is truncated.
#[cfg(unix)]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let mut file = fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    file.set_len(0)?;
    file.write_all(contents)
}

#[cfg(not(unix))]
fn write_private(path: &Path, contents: &[u8]) -> io::Result<()> {
    fs::File::create(path)?.write_all(contents)
}

fn write_error(path: &Path, source: io::Error, logger: &mut dyn Logger) -> ProvisionError {
    logger.log(&format!("Failed to write {}: {}", path.display(), source));
    ProvisionError::Write {
        path: path.display().to_string(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::logging::testing::MemoryLogger;
    use tempfile::TempDir;

    #[test]
    fn both_files_are_written_verbatim() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("tls");
        let mut logger = MemoryLogger::default();

        let paths = write_outputs(&dir, b"CERT", b"KEY", &mut logger).unwrap();

        assert_eq!(paths, OutputPaths::in_dir(&dir));
        assert_eq!(fs::read(&paths.certificate).unwrap(), b"CERT");
        assert_eq!(fs::read(&paths.key).unwrap(), b"KEY");
    }

    #[cfg(unix)]
    #[test]
    fn key_file_is_owner_only() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let mut logger = MemoryLogger::default();

        let paths = write_outputs(temp_dir.path(), b"CERT", b"KEY", &mut logger).unwrap();

        let mode = fs::metadata(&paths.key).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[cfg(unix)]
    #[test]
    fn existing_key_file_is_tightened_and_replaced() {
        use std::os::unix::fs::PermissionsExt;

        let temp_dir = TempDir::new().unwrap();
        let key_path = temp_dir.path().join(KEY_FILE_NAME);
        fs::write(&key_path, b"A MUCH LONGER OLD KEY").unwrap();
        fs::set_permissions(&key_path, fs::Permissions::from_mode(0o644)).unwrap();
        let mut logger = MemoryLogger::default();

        write_outputs(temp_dir.path(), b"CERT", b"KEY", &mut logger).unwrap();

        assert_eq!(fs::read(&key_path).unwrap(), b"KEY");
        let mode = fs::metadata(&key_path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }

    #[test]
    fn existing_files_are_replaced() {
        let temp_dir = TempDir::new().unwrap();
        let mut logger = MemoryLogger::default();
        fs::write(temp_dir.path().join(CERT_FILE_NAME), b"OLD CERT").unwrap();

        write_outputs(temp_dir.path(), b"NEW", b"KEY", &mut logger).unwrap();

        assert_eq!(
            fs::read(temp_dir.path().join(CERT_FILE_NAME)).unwrap(),
            b"NEW"
        );
    }

    #[test]
    fn unwritable_directory_is_reported() {
        let temp_dir = TempDir::new().unwrap();
        let blocker = temp_dir.path().join("file");
        fs::write(&blocker, b"").unwrap();
        let mut logger = MemoryLogger::default();

        let err = write_outputs(&blocker.join("tls"), b"CERT", b"KEY", &mut logger).unwrap_err();

        assert!(matches!(err, ProvisionError::Write { .. }));
        assert!(logger.contains("Failed to write"));
    }
}
