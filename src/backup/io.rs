//! File export/import for backup envelopes.
//!
//! Layout: `MVBKP` magic, two version bytes, a little-endian u64 body
//! length, then the envelope as canonical JSON. Framing errors are
//! reported before any cryptographic work happens.

use std::io::{Read, Write};
use std::path::Path;

use super::envelope::EncryptedBackup;
use super::manager::BackupError;

/// File magic for backup envelopes.
pub const BACKUP_MAGIC: &[u8; 5] = b"MVBKP";
/// Current format version (major, minor).
pub const BACKUP_FORMAT_VERSION: [u8; 2] = [1, 0];
/// Refuse bodies larger than this; backups are envelopes, not archives.
const MAX_BODY_BYTES: u64 = 64 * 1024 * 1024;

/// Write an envelope to `path` with the `MVBKP` framing.
pub fn write_backup_file(path: &Path, backup: &EncryptedBackup) -> Result<(), BackupError> {
    let body = serde_json::to_vec(backup)?;
    let mut out = std::fs::File::create(path).map_err(io_err)?;
    out.write_all(BACKUP_MAGIC).map_err(io_err)?;
    out.write_all(&BACKUP_FORMAT_VERSION).map_err(io_err)?;
    out.write_all(&(body.len() as u64).to_le_bytes()).map_err(io_err)?;
    out.write_all(&body).map_err(io_err)?;
    Ok(())
}

/// Read an envelope from `path`, validating the framing first.
pub fn read_backup_file(path: &Path) -> Result<EncryptedBackup, BackupError> {
    let mut file = std::fs::File::open(path).map_err(io_err)?;

    let mut magic = [0u8; 5];
    file.read_exact(&mut magic).map_err(io_err)?;
    if &magic != BACKUP_MAGIC {
        return Err(BackupError::Malformed("bad magic"));
    }

    let mut version = [0u8; 2];
    file.read_exact(&mut version).map_err(io_err)?;
    if version[0] != BACKUP_FORMAT_VERSION[0] {
        return Err(BackupError::Malformed("unsupported format version"));
    }

    let mut len_bytes = [0u8; 8];
    file.read_exact(&mut len_bytes).map_err(io_err)?;
    let len = u64::from_le_bytes(len_bytes);
    if len > MAX_BODY_BYTES {
        return Err(BackupError::Malformed("body length out of range"));
    }

    let mut body = vec![0u8; len as usize];
    file.read_exact(&mut body).map_err(io_err)?;
    Ok(serde_json::from_slice(&body)?)
}

fn io_err(e: std::io::Error) -> BackupError {
    BackupError::Io(e.to_string())
}

#[cfg(test)]
#[path = "io_tests.rs"]
mod tests;
