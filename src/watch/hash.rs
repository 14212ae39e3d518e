// src/watch/hash.rs

use std::io::{self, Read};
use std::path::Path;

use blake3::Hasher;

use crate::errors::ObservationError;
use crate::fs::FileSystem;

/// Name of the digest algorithm recorded for artifacts.
pub const DIGEST_ALGORITHM: &str = "blake3";

/// Hash everything a reader yields, returning the lowercase hex digest.
pub fn hash_reader(mut reader: impl Read) -> io::Result<String> {
    let mut hasher = Hasher::new();
    let mut buf = [0u8; 8192];
    loop {
        let n = reader.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }
    Ok(hasher.finalize().to_hex().to_string())
}

/// Compute the digest of a single file.
pub fn compute_file_hash(fs: &dyn FileSystem, path: &Path) -> Result<String, ObservationError> {
    let io_err = |source| ObservationError::Io {
        path: path.to_path_buf(),
        source,
    };
    let reader = fs.open_read(path).map_err(io_err)?;
    hash_reader(reader).map_err(io_err)
}
