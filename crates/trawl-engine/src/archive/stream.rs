//! Sequential access to container members.

use super::{ArchiveKind, MemberEntry};
use crate::error::{ArchiveError, Result};
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{self, BufReader, Read, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use tracing::debug;
use zip::ZipArchive;

/// An opened container.
///
/// ZIP keeps its central directory in memory. TAR streams are re-read from
/// the start for every pass, so enumeration and extraction each open the
/// file anew.
pub struct ArchiveStream {
    path: PathBuf,
    inner: Inner,
}

enum Inner {
    Zip(ZipArchive<BufReader<File>>),
    Tar { gzip: bool },
}

impl std::fmt::Debug for ArchiveStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArchiveStream")
            .field("path", &self.path)
            .field("kind", &self.kind())
            .finish_non_exhaustive()
    }
}

impl ArchiveStream {
    /// Open a container of a known format.
    ///
    /// A ZIP whose every file entry is encrypted fails with
    /// [`ArchiveError::Encrypted`].
    pub fn open(path: &Path, kind: ArchiveKind) -> Result<Self> {
        let inner = match kind {
            ArchiveKind::Zip => Inner::Zip(open_zip(path)?),
            ArchiveKind::Tar | ArchiveKind::TarGz => {
                let gzip = kind == ArchiveKind::TarGz;
                // Probe the first header so garbage fails here, not mid-scan
                let mut archive = open_tar(path, gzip)?;
                if let Some(first) = archive.entries()?.next() {
                    first?;
                }
                Inner::Tar { gzip }
            }
        };

        Ok(Self {
            path: path.to_path_buf(),
            inner,
        })
    }

    /// Format of the opened container.
    #[must_use]
    pub fn kind(&self) -> ArchiveKind {
        match self.inner {
            Inner::Zip(_) => ArchiveKind::Zip,
            Inner::Tar { gzip: false } => ArchiveKind::Tar,
            Inner::Tar { gzip: true } => ArchiveKind::TarGz,
        }
    }

    /// Visit members in the container's native order until `visit` breaks.
    ///
    /// For TAR only regular files and directories are reported; links and
    /// special entries have no content of their own.
    pub fn for_each_member<F>(&mut self, mut visit: F) -> Result<()>
    where
        F: FnMut(MemberEntry) -> ControlFlow<()>,
    {
        match &mut self.inner {
            Inner::Zip(archive) => {
                // Names come from the central directory; local headers are
                // only read when a member is extracted.
                for index in 0..archive.len() {
                    let Some(name) = archive.name_for_index(index) else {
                        continue;
                    };
                    let entry = MemberEntry {
                        key: name.to_string(),
                        is_dir: name.ends_with('/'),
                    };
                    if visit(entry).is_break() {
                        break;
                    }
                }
            }
            Inner::Tar { gzip } => {
                let mut archive = open_tar(&self.path, *gzip)?;
                for entry in archive.entries()? {
                    let entry = entry?;
                    let entry_type = entry.header().entry_type();
                    if !entry_type.is_file() && !entry_type.is_dir() {
                        continue;
                    }

                    let member = MemberEntry {
                        key: entry.path()?.to_string_lossy().into_owned(),
                        is_dir: entry_type.is_dir(),
                    };
                    if visit(member).is_break() {
                        break;
                    }
                }
            }
        }

        Ok(())
    }

    /// Copy the member named `key` into `out`, at most `limit` bytes.
    ///
    /// Returns the number of bytes written. A member whose declared size is
    /// over `limit` fails with [`ArchiveError::TooLarge`] before anything is
    /// written; one that only turns out larger while streaming fails after a
    /// partial write.
    pub fn extract_member<W>(&mut self, key: &str, out: &mut W, limit: u64) -> Result<u64>
    where
        W: Write + ?Sized,
    {
        match &mut self.inner {
            Inner::Zip(archive) => {
                let index = archive
                    .index_for_name(key)
                    .ok_or_else(|| ArchiveError::MemberNotFound {
                        key: key.to_string(),
                    })?;

                let declared = {
                    let raw = archive.by_index_raw(index)?;
                    if raw.encrypted() {
                        return Err(ArchiveError::MemberEncrypted {
                            key: key.to_string(),
                        });
                    }
                    raw.size()
                };
                check_declared_size(declared, key, limit)?;

                let file = archive.by_index(index)?;
                copy_bounded(file, key, out, limit)
            }
            Inner::Tar { gzip } => {
                let mut archive = open_tar(&self.path, *gzip)?;
                for entry in archive.entries()? {
                    let mut entry = entry?;
                    if !entry.header().entry_type().is_file() {
                        continue;
                    }
                    let name = entry.path()?.to_string_lossy().into_owned();
                    if name == key {
                        check_declared_size(entry.size(), key, limit)?;
                        return copy_bounded(&mut entry, key, out, limit);
                    }
                }

                Err(ArchiveError::MemberNotFound {
                    key: key.to_string(),
                })
            }
        }
    }
}

fn open_zip(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let mut archive = ZipArchive::new(BufReader::new(File::open(path)?))?;

    let mut files = 0usize;
    let mut encrypted = 0usize;
    for index in 0..archive.len() {
        // A damaged entry is left for its own extraction to report
        let file = match archive.by_index_raw(index) {
            Ok(file) => file,
            Err(e) => {
                debug!(
                    archive = %path.display(),
                    index,
                    error = %e,
                    "skipping unreadable zip entry"
                );
                continue;
            }
        };
        if file.is_dir() {
            continue;
        }
        files += 1;
        if file.encrypted() {
            encrypted += 1;
        }
    }

    if files > 0 && encrypted == files {
        return Err(ArchiveError::Encrypted {
            path: path.display().to_string(),
        });
    }

    Ok(archive)
}

fn open_tar(path: &Path, gzip: bool) -> io::Result<tar::Archive<Box<dyn Read>>> {
    let file = BufReader::new(File::open(path)?);
    let reader: Box<dyn Read> = if gzip {
        Box::new(GzDecoder::new(file))
    } else {
        Box::new(file)
    };
    Ok(tar::Archive::new(reader))
}

fn check_declared_size(declared: u64, key: &str, limit: u64) -> Result<()> {
    if declared > limit {
        return Err(ArchiveError::TooLarge {
            key: key.to_string(),
            limit,
        });
    }
    Ok(())
}

fn copy_bounded<R, W>(reader: R, key: &str, out: &mut W, limit: u64) -> Result<u64>
where
    R: Read,
    W: Write + ?Sized,
{
    let written = io::copy(&mut reader.take(limit.saturating_add(1)), out)?;
    if written > limit {
        return Err(ArchiveError::TooLarge {
            key: key.to_string(),
            limit,
        });
    }
    Ok(written)
}
