//! Per-file content analysis.
//!
//! [`SignalExtractor::analyze_file`] reads one file and turns its text into a
//! [`FileAnalysis`]: category weights, an entry-point flag and the declared
//! imports. Every call is independent of every other, so the analyzer runs
//! them concurrently and merges the results afterwards.

use crate::models::{FileRecord, Scores, SoftError, SoftErrorKind};
use crate::patterns::PatternRegistry;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::BTreeSet;
use std::fs;
use std::io;
use std::path::Path;

/// Files larger than this are counted but their content is not read.
pub const MAX_CONTENT_SIZE: u64 = 5 * 1024 * 1024;

/// Extensions whose content is analyzed even for non-key files.
const CONTENT_EXTENSIONS: &[&str] = &[
    "py", "js", "jsx", "ts", "tsx", "json", "yml", "yaml", "html", "htm", "css", "java", "kt",
    "scala", "xml",
];

/// Media and binary suffixes that are never read.
const MEDIA_SUFFIXES: &[&str] = &[
    ".jpg", ".png", ".gif", ".svg", ".ico", ".woff", ".ttf", ".eot", ".mp3", ".mp4", ".avi",
    ".mov", ".pdf", ".zip", ".tar.gz", ".exe",
];

static PY_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"import\s+([\w\.]+)(?:\s+as\s+[\w\.]+)?").unwrap());

static PY_FROM_IMPORT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"from\s+([\w\.]+)\s+import\s+(?:[\w\., \*]+)").unwrap());

static JS_IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:import\s+(?:[\w*{}\s,]+\s+from\s+)?|require\(\s*)['"]([^'"]+)['"]"#).unwrap()
});

static PY_MAIN_GUARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"if\s+__name__\s*==\s*['"]__main__['"]"#).unwrap());

static JS_MAIN_GUARD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"require\.main\s*===?\s*module").unwrap());

static JVM_MAIN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"public\s+static\s+void\s+main\s*\(|fun\s+main\s*\(|def\s+main\s*\(\s*args").unwrap()
});

static REQUIREMENT_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([A-Za-z0-9][A-Za-z0-9._-]*)").unwrap());

/// Dependency sections read from `package.json`.
const PACKAGE_JSON_SECTIONS: &[&str] = &[
    "dependencies",
    "devDependencies",
    "peerDependencies",
    "optionalDependencies",
];

/// Whether a file's content should be analyzed at all.
pub fn is_content_eligible(file: &FileRecord) -> bool {
    if is_media(&file.name) {
        return false;
    }
    file.is_key_file
        || file
            .extension()
            .map(|ext| CONTENT_EXTENSIONS.contains(&ext.as_str()))
            .unwrap_or(false)
}

fn is_media(name: &str) -> bool {
    let lower = name.to_lowercase();
    MEDIA_SUFFIXES.iter().any(|suffix| lower.ends_with(suffix))
}

/// Reads a file as text, replacing undecodable bytes.
pub fn read_lossy(path: &Path) -> io::Result<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Extracts declared module names from source text.
///
/// Python files use `import x` and `from x import y`; JavaScript and
/// TypeScript files use `import ... from 'x'` and `require('x')`.
pub fn extract_imports(extension: &str, content: &str) -> BTreeSet<String> {
    let mut imports = BTreeSet::new();
    match extension {
        "py" => {
            for pattern in [&*PY_IMPORT, &*PY_FROM_IMPORT] {
                for caps in pattern.captures_iter(content) {
                    let module = caps[1].trim();
                    if !module.is_empty() {
                        imports.insert(module.to_string());
                    }
                }
            }
        }
        "js" | "jsx" | "ts" | "tsx" => {
            for caps in JS_IMPORT.captures_iter(content) {
                let module = caps[1].trim();
                if !module.is_empty() {
                    imports.insert(module.to_string());
                }
            }
        }
        _ => {}
    }
    imports
}

/// Detects a "run as a program" convention for the file's language.
pub fn detect_entry_point(extension: &str, content: &str) -> bool {
    match extension {
        "py" => PY_MAIN_GUARD.is_match(content),
        "js" | "ts" => JS_MAIN_GUARD.is_match(content),
        "java" | "kt" | "scala" => JVM_MAIN.is_match(content),
        _ => false,
    }
}

/// Collects dependency names from every dependency section of a
/// `package.json` document.
pub fn parse_package_json(content: &str) -> std::result::Result<BTreeSet<String>, serde_json::Error> {
    let manifest: serde_json::Value = serde_json::from_str(content)?;
    let mut names = BTreeSet::new();
    for section in PACKAGE_JSON_SECTIONS {
        if let Some(deps) = manifest.get(section).and_then(|v| v.as_object()) {
            names.extend(deps.keys().cloned());
        }
    }
    Ok(names)
}

/// Collects package names from a pip requirements file.
///
/// Comments, options (`-r`, `-e`, `--hash`) and URLs are skipped; version
/// specifiers and extras are dropped.
pub fn parse_requirements(content: &str) -> BTreeSet<String> {
    content
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .filter(|line| !line.is_empty() && !line.starts_with('-') && !line.contains("://"))
        .filter_map(|line| REQUIREMENT_NAME.captures(line))
        .map(|caps| caps[1].to_lowercase())
        .collect()
}

/// What one file contributed to its project.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FileAnalysis {
    /// Category weights triggered by this file.
    pub signals: Scores,
    pub has_entry_point: bool,
    pub imports: BTreeSet<String>,
    /// Set when the file could only be partially analyzed, or not at all.
    pub error: Option<SoftError>,
}

impl FileAnalysis {
    fn failed(error: SoftError) -> Self {
        Self {
            error: Some(error),
            ..Default::default()
        }
    }
}

/// Turns file contents into weighted signals using the general registry.
#[derive(Debug, Clone, Copy)]
pub struct SignalExtractor<'a> {
    registry: &'a PatternRegistry,
}

impl<'a> SignalExtractor<'a> {
    pub fn new(registry: &'a PatternRegistry) -> Self {
        Self { registry }
    }

    /// Reads and analyzes one file.
    ///
    /// Never fails: unreadable or oversized files produce an empty analysis
    /// carrying a [`SoftError`].
    pub fn analyze_file(&self, file: &FileRecord) -> FileAnalysis {
        if is_media(&file.name) {
            return FileAnalysis::default();
        }

        if file.size > MAX_CONTENT_SIZE {
            return FileAnalysis::failed(SoftError::new(
                &file.absolute_path,
                SoftErrorKind::Size,
                format!(
                    "{} bytes exceeds the {} byte content limit",
                    file.size, MAX_CONTENT_SIZE
                ),
            ));
        }

        match read_lossy(&file.absolute_path) {
            Ok(content) => self.analyze_content(file, &content),
            Err(err) => FileAnalysis::failed(SoftError::new(
                &file.absolute_path,
                SoftErrorKind::Access,
                err.to_string(),
            )),
        }
    }

    /// Analyzes already-read text of `file`.
    pub fn analyze_content(&self, file: &FileRecord, content: &str) -> FileAnalysis {
        let extension = file.extension().unwrap_or_default();
        let mut analysis = FileAnalysis {
            has_entry_point: detect_entry_point(&extension, content),
            imports: extract_imports(&extension, content),
            ..Default::default()
        };

        self.registry.score_content(content, &mut analysis.signals);
        self.registry
            .score_imports(&analysis.imports, &mut analysis.signals);

        match file.name.as_str() {
            "package.json" => match parse_package_json(content) {
                Ok(deps) => self.registry.score_dependencies(&deps, &mut analysis.signals),
                Err(err) => {
                    analysis.error = Some(SoftError::new(
                        &file.absolute_path,
                        SoftErrorKind::Decode,
                        format!("invalid package.json: {}", err),
                    ));
                }
            },
            "requirements.txt" => {
                let deps = parse_requirements(content);
                self.registry
                    .score_dependencies(&deps, &mut analysis.signals);
            }
            _ => {}
        }

        analysis
    }
}
