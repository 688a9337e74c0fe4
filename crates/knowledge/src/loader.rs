//! Corpus loading: code/text files and PDF documents.

use std::path::Path;

use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::types::Document;

/// File extensions treated as indexable text. Dispatch is this table,
/// nothing else: adding a format means adding an entry here.
const TEXT_EXTENSIONS: &[&str] = &[
    "py", "ts", "tsx", "js", "jsx", "kt", "java", "md", "txt", "yml", "yaml", "json", "xml",
    "gradle", "properties", "rs", "go", "toml",
];

/// Directory names skipped during the corpus walk, at any depth.
const EXCLUDED_DIRS: &[&str] = &[
    "node_modules",
    ".git",
    ".venv",
    "dist",
    "build",
    "target",
    ".idea",
    ".gradle",
];

/// Load every indexable text file under `root`, recursively.
///
/// Files inside excluded directories are skipped, as are files whose
/// content is not valid UTF-8 or cannot be read (logged, never fatal).
/// A missing root yields an empty corpus. Results are sorted by source
/// path so rebuilds are deterministic.
pub fn load_code_documents(root: &Path) -> Vec<Document> {
    if !root.is_dir() {
        debug!("Code root {} does not exist, skipping", root.display());
        return Vec::new();
    }

    let mut documents = Vec::new();

    let walker = WalkDir::new(root)
        .follow_links(false)
        .into_iter()
        .filter_entry(|entry| !is_excluded_dir(entry));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry: {}", e);
                continue;
            }
        };

        if !entry.file_type().is_file() || !has_text_extension(entry.path()) {
            continue;
        }

        match std::fs::read_to_string(entry.path()) {
            Ok(content) => documents.push(Document {
                content,
                source: entry.path().display().to_string(),
            }),
            Err(e) => {
                warn!("Skipping {}: {}", entry.path().display(), e);
            }
        }
    }

    documents.sort_by(|a, b| a.source.cmp(&b.source));
    debug!("Loaded {} code documents from {}", documents.len(), root.display());
    documents
}

/// Load every PDF in the top level of `root`, one [`Document`] per
/// page, all pages sharing the PDF's path as their source.
///
/// Unparseable PDFs are skipped with a warning; a missing root yields
/// an empty corpus.
pub fn load_pdf_documents(root: &Path) -> Vec<Document> {
    if !root.is_dir() {
        debug!("PDF root {} does not exist, skipping", root.display());
        return Vec::new();
    }

    let mut paths: Vec<_> = match std::fs::read_dir(root) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && has_extension(p, "pdf"))
            .collect(),
        Err(e) => {
            warn!("Cannot read PDF root {}: {}", root.display(), e);
            return Vec::new();
        }
    };
    paths.sort();

    let mut documents = Vec::new();
    for path in paths {
        let pages = match pdf_extract::extract_text_by_pages(&path) {
            Ok(pages) => pages,
            Err(e) => {
                warn!("Skipping PDF {}: {}", path.display(), e);
                continue;
            }
        };

        let source = path.display().to_string();
        for page in pages {
            documents.push(Document {
                content: page,
                source: source.clone(),
            });
        }
    }

    debug!("Loaded {} PDF page documents from {}", documents.len(), root.display());
    documents
}

/// Whether the entry is a directory the corpus walk should not enter.
fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && entry
            .file_name()
            .to_str()
            .map(|n| EXCLUDED_DIRS.contains(&n))
            .unwrap_or(false)
}

/// Whether the path carries one of the indexable text extensions.
fn has_text_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| TEXT_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
        .unwrap_or(false)
}

/// Case-insensitive extension match.
fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
