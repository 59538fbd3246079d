use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde_json::json;
use sha2::{Digest, Sha256};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

use super::RenderError;

pub const BUNDLE_FORMAT: &str = "examdesk-documents-v1";
const MANIFEST_ENTRY: &str = "manifest.json";
const SCAFFOLD_SUFFIX: &str = ".part";

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedDocument {
    pub path: String,
    pub file_name: String,
    pub pages: usize,
    pub bytes: u64,
    pub sha256: String,
}

/// Collapses whitespace runs to `_` and drops characters that would escape
/// the output directory or upset common file systems.
pub fn normalize_file_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_sep = false;
    for c in raw.trim().chars() {
        if c.is_whitespace() {
            pending_sep = true;
            continue;
        }
        if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control() {
            continue;
        }
        if pending_sep && !out.is_empty() {
            out.push('_');
        }
        pending_sep = false;
        out.push(c);
    }
    let trimmed = out.trim_start_matches('.');
    if trimmed.is_empty() {
        "document".to_string()
    } else {
        trimmed.to_string()
    }
}

/// First of `name`, `name_2`, `name_3`, ... (suffix before the extension)
/// not yet in `taken`; the chosen name is recorded.
pub fn unique_name(name: &str, taken: &mut HashSet<String>) -> String {
    let (stem, ext) = match name.rfind('.') {
        Some(dot) if dot > 0 => name.split_at(dot),
        _ => (name, ""),
    };
    let mut candidate = name.to_string();
    let mut n = 2;
    while taken.contains(&candidate) {
        candidate = format!("{}_{}{}", stem, n, ext);
        n += 1;
    }
    taken.insert(candidate.clone());
    candidate
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let digest = Sha256::digest(bytes);
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

fn io_err(path: &Path, source: std::io::Error) -> RenderError {
    RenderError::Io {
        path: path.to_string_lossy().to_string(),
        source,
    }
}

/// Off-screen file being written; removed unless `commit` renames it into
/// place.
struct Scaffold {
    path: PathBuf,
    committed: bool,
}

impl Scaffold {
    fn create(target: &Path) -> Result<(Self, File), RenderError> {
        let mut name = target.file_name().unwrap_or_default().to_os_string();
        name.push(SCAFFOLD_SUFFIX);
        let path = target.with_file_name(name);
        let file = File::create(&path).map_err(|e| io_err(&path, e))?;
        Ok((
            Self {
                path,
                committed: false,
            },
            file,
        ))
    }

    fn commit(mut self, target: &Path) -> Result<(), RenderError> {
        std::fs::rename(&self.path, target).map_err(|e| io_err(target, e))?;
        self.committed = true;
        Ok(())
    }
}

impl Drop for Scaffold {
    fn drop(&mut self) {
        if !self.committed {
            if let Err(e) = std::fs::remove_file(&self.path) {
                tracing::warn!(path = %self.path.display(), error = %e, "could not remove scaffold");
            }
        }
    }
}

/// Writes `bytes` under `dir/file_name` through a `.part` scaffold so a
/// failure never leaves a truncated document behind.
pub fn save(dir: &Path, file_name: &str, bytes: &[u8], pages: usize) -> Result<SavedDocument, RenderError> {
    std::fs::create_dir_all(dir).map_err(|e| io_err(dir, e))?;
    let file_name = normalize_file_name(file_name);
    let target = dir.join(&file_name);
    let (scaffold, mut file) = Scaffold::create(&target)?;
    file.write_all(bytes).map_err(|e| io_err(&scaffold.path, e))?;
    file.sync_all().map_err(|e| io_err(&scaffold.path, e))?;
    drop(file);
    scaffold.commit(&target)?;

    tracing::info!(path = %target.display(), pages, bytes = bytes.len(), "document written");
    Ok(SavedDocument {
        path: target.to_string_lossy().to_string(),
        file_name,
        pages,
        bytes: bytes.len() as u64,
        sha256: sha256_hex(bytes),
    })
}

/// Packs already written documents into one zip with a manifest. Entry
/// names must be distinct.
pub fn bundle(out_path: &Path, documents: &[SavedDocument]) -> Result<SavedDocument, RenderError> {
    let mut entries = HashSet::from([MANIFEST_ENTRY.to_string()]);
    for doc in documents {
        if !entries.insert(doc.file_name.clone()) {
            return Err(RenderError::Bundle(format!("duplicate entry {}", doc.file_name)));
        }
    }
    let dir = out_path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = out_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "documents.zip".to_string());
    let target = dir.join(&file_name);
    let (scaffold, out_file) = Scaffold::create(&target)?;
    let bundle_err = |e: zip::result::ZipError| RenderError::Bundle(e.to_string());

    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let manifest = json!({
        "format": BUNDLE_FORMAT,
        "appVersion": env!("CARGO_PKG_VERSION"),
        "documents": documents,
    });
    zip.start_file(MANIFEST_ENTRY, opts).map_err(bundle_err)?;
    let manifest_text = serde_json::to_string_pretty(&manifest)
        .map_err(|e| RenderError::Bundle(e.to_string()))?;
    zip.write_all(manifest_text.as_bytes())
        .map_err(|e| io_err(&scaffold.path, e))?;

    for doc in documents {
        zip.start_file(doc.file_name.as_str(), opts).map_err(bundle_err)?;
        let src = Path::new(&doc.path);
        let mut f = File::open(src).map_err(|e| io_err(src, e))?;
        std::io::copy(&mut f, &mut zip).map_err(|e| io_err(src, e))?;
    }
    let file = zip.finish().map_err(bundle_err)?;
    file.sync_all().map_err(|e| io_err(&scaffold.path, e))?;
    drop(file);
    scaffold.commit(&target)?;

    let bytes = std::fs::read(&target).map_err(|e| io_err(&target, e))?;
    Ok(SavedDocument {
        path: target.to_string_lossy().to_string(),
        file_name,
        pages: documents.iter().map(|d| d.pages).sum(),
        bytes: bytes.len() as u64,
        sha256: sha256_hex(&bytes),
    })
}
