//! Container handling: format detection, member enumeration and the archive
//! classifier.

mod scanner;
mod stream;

pub use scanner::ArchiveScanner;
pub use stream::ArchiveStream;

use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

/// Bytes needed to sniff every supported format (`ustar` sits at offset 257).
const SNIFF_LEN: usize = 262;

/// Supported container formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchiveKind {
    /// ZIP (stored or deflate)
    Zip,
    /// Uncompressed TAR
    Tar,
    /// gzip-compressed TAR
    TarGz,
}

impl ArchiveKind {
    /// Detect the format from the file name alone.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();

        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") || name.ends_with(".jar") {
            Some(Self::Zip)
        } else {
            None
        }
    }

    /// Detect the format from the leading bytes of the file.
    pub fn sniff(path: &Path) -> io::Result<Option<Self>> {
        let mut header = Vec::with_capacity(SNIFF_LEN);
        File::open(path)?
            .take(SNIFF_LEN as u64)
            .read_to_end(&mut header)?;
        Ok(Self::from_magic(&header))
    }

    fn from_magic(header: &[u8]) -> Option<Self> {
        if header.starts_with(b"PK\x03\x04") || header.starts_with(b"PK\x05\x06") {
            Some(Self::Zip)
        } else if header.starts_with(&[0x1f, 0x8b]) {
            Some(Self::TarGz)
        } else if header.get(257..262) == Some(b"ustar".as_slice()) {
            Some(Self::Tar)
        } else {
            None
        }
    }

    /// Extension first, then magic bytes. Unreadable files are not containers.
    #[must_use]
    pub fn detect(path: &Path) -> Option<Self> {
        Self::from_path(path).or_else(|| Self::sniff(path).ok().flatten())
    }
}

/// One entry of a container, as seen during enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberEntry {
    /// Path of the member inside the container
    pub key: String,
    /// Directory entries are skipped by the classifier
    pub is_dir: bool,
}
