//! Fixtures shared by the engine integration tests.

#![allow(dead_code)]

use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::{self, File};
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use trawl_core::EngineConfig;
use trawl_engine::sink::{self, partition, Diagnostic, SinkReceiver};
use trawl_engine::{Engine, ScanResult};
use trawl_rules::RuleSet;

/// Keep spreadsheets, discard logs, relay `.ini`/`.txt` files to a
/// `password=` content rule.
pub const RULES: &str = r#"
[[rule]]
name = "DiscardLogs"
action = "discard"
location = "by-extension"
scope = "member-enumeration"
triage = "Green"
match_kind = "exact"
word_list = ["log"]

[[rule]]
name = "KeepSpreadsheets"
action = "keep"
location = "by-extension"
scope = "member-enumeration"
triage = "Red"
match_kind = "exact"
word_list = ["xlsx"]

[[rule]]
name = "KeepPasswordNames"
action = "keep"
location = "by-name"
scope = "member-enumeration"
triage = "Red"
match_kind = "starts-with"
word_list = ["passw"]

[[rule]]
name = "RelayConfigs"
action = "relay"
location = "by-extension"
scope = "member-enumeration"
triage = "Yellow"
match_kind = "exact"
word_list = ["ini", "txt"]
relay_target = "PasswordAssignments"

[[rule]]
name = "PasswordAssignments"
action = "keep"
location = "by-content"
scope = "content-inspection"
triage = "Black"
match_kind = "contains"
word_list = ["password="]
"#;

/// Temp workspace with an isolated scratch area.
pub struct Harness {
    pub tmp: TempDir,
    pub config: EngineConfig,
}

impl Harness {
    pub fn new() -> Self {
        let _ = trawl_core::logging::try_init_tracing();

        let tmp = TempDir::new().expect("create temp dir");
        let mut config = EngineConfig::default();
        config.scratch.unpack_dir = Some(tmp.path().join("unpack"));
        Self { tmp, config }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.tmp.path().join(name)
    }

    pub fn engine(&self, rules: &str) -> (Engine, SinkReceiver) {
        let rules = Arc::new(RuleSet::from_toml_str(rules).expect("parse rules"));
        let (sink, receiver) = sink::channel();
        (Engine::new(&self.config, rules, sink), receiver)
    }

    /// Scratch root holds no leftover files or directories.
    pub fn scratch_is_empty(&self) -> bool {
        let root = self.config.unpack_dir();
        match fs::read_dir(&root) {
            Ok(mut entries) => entries.next().is_none(),
            Err(_) => true,
        }
    }
}

pub fn drain(receiver: &mut SinkReceiver) -> (Vec<ScanResult>, Vec<Diagnostic>) {
    partition(receiver.drain())
}

pub fn zip_bytes(members: &[(&str, &str)]) -> Vec<u8> {
    let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
    let options = zip::write::SimpleFileOptions::default()
        .compression_method(zip::CompressionMethod::Stored);
    for (name, data) in members {
        if name.ends_with('/') {
            writer.add_directory(*name, options).expect("add directory");
        } else {
            writer.start_file(*name, options).expect("start file");
            writer.write_all(data.as_bytes()).expect("write member");
        }
    }
    writer.finish().expect("finish zip").into_inner()
}

pub fn write_zip(path: &Path, members: &[(&str, &str)]) {
    fs::write(path, zip_bytes(members)).expect("write zip");
}

/// Set the traditional-encryption flag on matching entries (all if `only`
/// is `None`), in both the local and the central headers.
pub fn mark_encrypted(bytes: &mut [u8], only: Option<&str>) {
    let wanted = |name: &[u8]| only.map_or(true, |only| only.as_bytes() == name);

    let mut offset = 0;
    while offset + 4 <= bytes.len() {
        let window = &bytes[offset..];
        if window.starts_with(b"PK\x03\x04") {
            let name_len = u16::from_le_bytes([bytes[offset + 26], bytes[offset + 27]]) as usize;
            let start = offset + 30;
            if wanted(&bytes[start..start + name_len]) {
                bytes[offset + 6] |= 0x01;
            }
        } else if window.starts_with(b"PK\x01\x02") {
            let name_len = u16::from_le_bytes([bytes[offset + 28], bytes[offset + 29]]) as usize;
            let start = offset + 46;
            if wanted(&bytes[start..start + name_len]) {
                bytes[offset + 8] |= 0x01;
            }
        }
        offset += 1;
    }
}

pub fn write_encrypted_zip(path: &Path, members: &[(&str, &str)], only: Option<&str>) {
    let mut bytes = zip_bytes(members);
    mark_encrypted(&mut bytes, only);
    fs::write(path, bytes).expect("write zip");
}

/// Break the local header signature of the named entry. The central
/// directory still lists it.
pub fn corrupt_local_header(bytes: &mut [u8], name: &str) {
    let mut offset = 0;
    while offset + 30 <= bytes.len() {
        if bytes[offset..].starts_with(b"PK\x03\x04") {
            let name_len = u16::from_le_bytes([bytes[offset + 26], bytes[offset + 27]]) as usize;
            let start = offset + 30;
            if &bytes[start..start + name_len] == name.as_bytes() {
                bytes[offset] = b'X';
                return;
            }
        }
        offset += 1;
    }
    panic!("no local header for {name}");
}

/// A ZIP whose every member is WinZip AES-256 (method 99 with a 0x9901
/// extra field, AE-2 so the CRC is zero). The payload is salt, password
/// verifier, opaque ciphertext and authentication code; nothing here can be
/// decrypted.
pub fn aes_zip_bytes(members: &[(&str, &str)]) -> Vec<u8> {
    const AES_METHOD: u16 = 99;
    const VERSION_NEEDED: u16 = 51;
    // header id, data size, AE-2, vendor "AE", strength 3, actual method stored
    const AES_EXTRA: [u8; 11] = [0x01, 0x99, 0x07, 0x00, 0x02, 0x00, b'A', b'E', 0x03, 0x00, 0x00];

    let mut out = Vec::new();
    let mut central = Vec::new();

    for (name, data) in members {
        let mut payload = vec![0x5a; 16 + 2];
        payload.extend(data.bytes().map(|b| b ^ 0xa5));
        payload.extend_from_slice(&[0xc3; 10]);
        let compressed = payload.len() as u32;
        let uncompressed = data.len() as u32;
        let offset = out.len() as u32;

        out.extend_from_slice(b"PK\x03\x04");
        out.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
        out.extend_from_slice(&1u16.to_le_bytes());
        out.extend_from_slice(&AES_METHOD.to_le_bytes());
        out.extend_from_slice(&[0; 4]); // time, date
        out.extend_from_slice(&0u32.to_le_bytes()); // crc
        out.extend_from_slice(&compressed.to_le_bytes());
        out.extend_from_slice(&uncompressed.to_le_bytes());
        out.extend_from_slice(&(name.len() as u16).to_le_bytes());
        out.extend_from_slice(&(AES_EXTRA.len() as u16).to_le_bytes());
        out.extend_from_slice(name.as_bytes());
        out.extend_from_slice(&AES_EXTRA);
        out.extend_from_slice(&payload);

        central.extend_from_slice(b"PK\x01\x02");
        central.extend_from_slice(&VERSION_NEEDED.to_le_bytes()); // made by
        central.extend_from_slice(&VERSION_NEEDED.to_le_bytes());
        central.extend_from_slice(&1u16.to_le_bytes());
        central.extend_from_slice(&AES_METHOD.to_le_bytes());
        central.extend_from_slice(&[0; 4]);
        central.extend_from_slice(&0u32.to_le_bytes());
        central.extend_from_slice(&compressed.to_le_bytes());
        central.extend_from_slice(&uncompressed.to_le_bytes());
        central.extend_from_slice(&(name.len() as u16).to_le_bytes());
        central.extend_from_slice(&(AES_EXTRA.len() as u16).to_le_bytes());
        central.extend_from_slice(&0u16.to_le_bytes()); // comment
        central.extend_from_slice(&0u16.to_le_bytes()); // disk
        central.extend_from_slice(&0u16.to_le_bytes()); // internal attributes
        central.extend_from_slice(&0u32.to_le_bytes()); // external attributes
        central.extend_from_slice(&offset.to_le_bytes());
        central.extend_from_slice(name.as_bytes());
        central.extend_from_slice(&AES_EXTRA);
    }

    let central_offset = out.len() as u32;
    let central_size = central.len() as u32;
    let entries = members.len() as u16;
    out.extend_from_slice(&central);
    out.extend_from_slice(b"PK\x05\x06");
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out.extend_from_slice(&entries.to_le_bytes());
    out.extend_from_slice(&entries.to_le_bytes());
    out.extend_from_slice(&central_size.to_le_bytes());
    out.extend_from_slice(&central_offset.to_le_bytes());
    out.extend_from_slice(&0u16.to_le_bytes());
    out
}

fn append_tar<W: Write>(builder: &mut tar::Builder<W>, members: &[(&str, &str)]) {
    for (name, data) in members {
        let mut header = tar::Header::new_gnu();
        header.set_size(data.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder
            .append_data(&mut header, name, data.as_bytes())
            .expect("append member");
    }
}

pub fn write_tar(path: &Path, members: &[(&str, &str)]) {
    let mut builder = tar::Builder::new(File::create(path).expect("create tar"));
    append_tar(&mut builder, members);
    builder.finish().expect("finish tar");
}

pub fn write_tar_gz(path: &Path, members: &[(&str, &str)]) {
    let encoder = GzEncoder::new(File::create(path).expect("create tar.gz"), Compression::default());
    let mut builder = tar::Builder::new(encoder);
    append_tar(&mut builder, members);
    builder
        .into_inner()
        .expect("finish tar")
        .finish()
        .expect("finish gzip");
}
