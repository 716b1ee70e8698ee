//! Binary downloads: the spreadsheet export and the static guide.

use std::path::{Path, PathBuf};

/// Default name when the export response carries no usable filename.
pub const DEFAULT_EXPORT_NAME: &str = "ubicaciones-tecnicas.xlsx";

/// Name of the static guide served next to the API.
pub const GUIDE_NAME: &str = "guia-ubicaciones-tecnicas.pdf";

/// A downloaded file, held in memory until saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Write the file into `dir` under its own name and return the path.
    pub fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.filename);
        std::fs::write(&path, &self.bytes)?;
        tracing::info!(path = %path.display(), bytes = self.bytes.len(), "saved download");
        Ok(path)
    }
}

/// Extract the filename from a `Content-Disposition` header value.
///
/// `filename*=UTF-8''...` wins over `filename="..."`, which wins over a
/// bare `filename=...`. Any directory part is stripped. Names that would
/// not land in the target directory (`.`, `..`, anything with `..`) are
/// unusable and yield `None`.
pub fn filename_from_disposition(header: &str) -> Option<String> {
    let mut plain = None;
    let mut extended = None;
    for part in header.split(';').map(str::trim) {
        let Some((key, value)) = part.split_once('=') else {
            continue;
        };
        match key.trim().to_ascii_lowercase().as_str() {
            "filename*" => {
                let value = value.trim();
                let encoded = value
                    .split_once("''")
                    .map(|(_, rest)| rest)
                    .unwrap_or(value);
                extended = percent_decode(encoded.trim_matches('"'));
            }
            "filename" => {
                plain = Some(value.trim().trim_matches('"').to_string());
            }
            _ => {}
        }
    }
    extended
        .and_then(|name| sanitize(&name))
        .or_else(|| plain.and_then(|name| sanitize(&name)))
}

fn sanitize(name: &str) -> Option<String> {
    let name = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
    if name.is_empty() || name == "." || name.contains("..") {
        return None;
    }
    Some(name.to_string())
}

fn percent_decode(s: &str) -> Option<String> {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let hex = s.get(i + 1..i + 3)?;
            out.push(u8::from_str_radix(hex, 16).ok()?);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    String::from_utf8(out).ok()
}
