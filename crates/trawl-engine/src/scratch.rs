//! Scratch extraction area.
//!
//! Relay rules need a member's bytes on disk. [`ScratchArea::create`] hands
//! out a [`ScratchExtraction`] guard whose `Drop` deletes the file, so the
//! copy disappears on every exit path: match, no match, error or unwinding.
//!
//! Layout: `<root>/<abs|rel>/<archive components>/%/<member key components>`.
//! Every component is percent-escaped so the mapping is injective: two
//! different archives never share a scratch path. Two concurrent extractions
//! of the *same* archive and member race on `create_new`; the loser fails and
//! its relay attempt counts as no match.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Component, Path, PathBuf};
use tracing::warn;

/// Root of the scratch tree.
#[derive(Debug, Clone)]
pub struct ScratchArea {
    root: PathBuf,
}

impl ScratchArea {
    /// Scratch area rooted at `root`. The directory is created lazily.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Deterministic scratch path for a member of an archive.
    #[must_use]
    pub fn path_for(&self, archive: &Path, key: &str) -> PathBuf {
        let mut path = self.root.clone();
        path.push(if archive.has_root() { "abs" } else { "rel" });

        for component in archive.components() {
            match component {
                Component::Prefix(prefix) => {
                    path.push(escape_component(prefix.as_os_str().as_encoded_bytes()));
                }
                Component::RootDir | Component::CurDir => {}
                Component::ParentDir => path.push(escape_component(b"..")),
                Component::Normal(part) => path.push(escape_component(part.as_encoded_bytes())),
            }
        }

        // Escaped components never consist of a bare `%`
        path.push(KEY_MARKER);

        let mut pushed = false;
        for part in key.split(['/', '\\']) {
            if part.is_empty() || part == "." {
                continue;
            }
            path.push(escape_component(part.as_bytes()));
            pushed = true;
        }
        if !pushed {
            path.push(KEY_MARKER);
        }

        path
    }

    /// Create the scratch file for a member, never overwriting an existing one.
    ///
    /// # Errors
    /// Fails with `AlreadyExists` if the path is taken, or any I/O error from
    /// creating the directory or file.
    pub fn create(&self, archive: &Path, key: &str) -> io::Result<ScratchExtraction> {
        let path = self.path_for(archive, key);
        let parent = path.parent().unwrap_or(self.root.as_path());

        // A concurrent guard may prune a shared parent before the file exists
        let mut attempts = 0;
        let file = loop {
            let opened = fs::create_dir_all(parent)
                .and_then(|()| OpenOptions::new().write(true).create_new(true).open(&path));
            match opened {
                Ok(file) => break file,
                Err(e) if e.kind() == io::ErrorKind::NotFound && attempts < 3 => attempts += 1,
                Err(e) => return Err(e),
            }
        };

        Ok(ScratchExtraction {
            path,
            root: self.root.clone(),
            file: Some(file),
        })
    }
}

/// A member copy on disk, deleted when dropped.
#[derive(Debug)]
pub struct ScratchExtraction {
    path: PathBuf,
    root: PathBuf,
    file: Option<File>,
}

impl ScratchExtraction {
    /// Location of the copy.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write handle, until [`close`](Self::close) is called.
    pub fn writer(&mut self) -> io::Result<&mut File> {
        self.file
            .as_mut()
            .ok_or_else(|| io::Error::other("scratch file already closed"))
    }

    /// Flush and release the write handle so the file can be read back.
    pub fn close(&mut self) -> io::Result<()> {
        match self.file.take() {
            Some(file) => file.sync_all(),
            None => Ok(()),
        }
    }
}

impl Drop for ScratchExtraction {
    fn drop(&mut self) {
        drop(self.file.take());

        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "failed to remove scratch file");
                return;
            }
        }

        // Prune now-empty directories up to the root; non-empty ones stay.
        let mut dir = self.path.parent();
        while let Some(current) = dir {
            if current == self.root || !current.starts_with(&self.root) {
                break;
            }
            if fs::remove_dir(current).is_err() {
                break;
            }
            dir = current.parent();
        }
    }
}

const KEY_MARKER: &str = "%";

/// Percent-escape one path component.
///
/// Printable ASCII passes through except `%`, `_` and the characters some
/// filesystems reserve; every other byte becomes `%HH`. Components made of
/// dots only are escaped whole so `.` and `..` never reach the filesystem.
fn escape_component(raw: &[u8]) -> String {
    let all_dots = raw.iter().all(|&b| b == b'.');
    let mut out = String::with_capacity(raw.len());
    for &b in raw {
        let plain = b.is_ascii_graphic() || b == b' ';
        let reserved = matches!(
            b,
            b'%' | b'_' | b'<' | b'>' | b':' | b'"' | b'|' | b'?' | b'*' | b'\\' | b'/'
        );
        if plain && !reserved && !all_dots {
            out.push(char::from(b));
        } else {
            out.push_str(&format!("%{b:02X}"));
        }
    }
    out
}
