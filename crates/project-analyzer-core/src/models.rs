//! Core data models for project analysis.
//!
//! All types in this module are plain in-memory records that report
//! generators, user interfaces and statistics rollups consume. Every type is
//! JSON-serializable.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::{Path, PathBuf};

/// Accumulated weight per category name.
///
/// A `BTreeMap` keeps serialization and iteration order stable across runs.
pub type Scores = BTreeMap<String, f64>;

/// Adds `weight` to the score of `category`, creating the entry if needed.
pub fn add_score(scores: &mut Scores, category: &str, weight: f64) {
    *scores.entry(category.to_string()).or_insert(0.0) += weight;
}

/// Merges every entry of `other` into `scores`.
pub fn merge_scores(scores: &mut Scores, other: &Scores) {
    for (category, weight) in other {
        add_score(scores, category, *weight);
    }
}

/// Language buckets used to pick a project's primary language.
///
/// The declaration order is the tie-break order: when two buckets have the
/// same file count, the one declared first wins.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    Python,
    JavaScript,
    TypeScript,
    Java,
    Html,
    Css,
}

impl Language {
    /// All buckets in tie-break order.
    pub const ALL: [Language; 6] = [
        Language::Python,
        Language::JavaScript,
        Language::TypeScript,
        Language::Java,
        Language::Html,
        Language::Css,
    ];

    /// Maps a file extension (without the dot, any case) to its bucket.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "py" => Some(Language::Python),
            "js" | "jsx" => Some(Language::JavaScript),
            "ts" | "tsx" => Some(Language::TypeScript),
            "java" | "kt" | "scala" => Some(Language::Java),
            "html" | "htm" => Some(Language::Html),
            "css" | "scss" | "sass" => Some(Language::Css),
            _ => None,
        }
    }

    /// Lowercase display name, as used in statistics and reports.
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Python => "python",
            Language::JavaScript => "javascript",
            Language::TypeScript => "typescript",
            Language::Java => "java",
            Language::Html => "html",
            Language::Css => "css",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Textual banding of a confidence score.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ConfidenceLabel {
    #[serde(rename = "Very High")]
    VeryHigh,
    High,
    Medium,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
}

impl ConfidenceLabel {
    /// Bands a score: ≥0.9 Very High, ≥0.75 High, ≥0.5 Medium, ≥0.25 Low.
    pub fn from_score(score: f64) -> Self {
        if score >= 0.9 {
            ConfidenceLabel::VeryHigh
        } else if score >= 0.75 {
            ConfidenceLabel::High
        } else if score >= 0.5 {
            ConfidenceLabel::Medium
        } else if score >= 0.25 {
            ConfidenceLabel::Low
        } else {
            ConfidenceLabel::VeryLow
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLabel::VeryHigh => "Very High",
            ConfidenceLabel::High => "High",
            ConfidenceLabel::Medium => "Medium",
            ConfidenceLabel::Low => "Low",
            ConfidenceLabel::VeryLow => "Very Low",
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Category of a non-fatal problem recorded during a run.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum SoftErrorKind {
    /// Unreadable file or directory, permission denied.
    Access,
    /// File exceeds the content-read ceiling.
    Size,
    /// Undecodable text or malformed structured file.
    Decode,
    /// Any other failure while analyzing a single file.
    Extraction,
}

/// A non-fatal problem attached to the record that owns the failing path.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SoftError {
    /// The file or directory that could not be processed.
    pub path: PathBuf,
    pub kind: SoftErrorKind,
    /// Human-readable description.
    pub message: String,
}

impl SoftError {
    pub fn new(path: impl Into<PathBuf>, kind: SoftErrorKind, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            kind,
            message: message.into(),
        }
    }
}

/// A file admitted by the walker.
///
/// Created during the walk with empty analysis fields, then filled exactly
/// once by content analysis.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FileRecord {
    /// File name including extension.
    pub name: String,

    /// Path relative to the owning project's root.
    pub relative_path: PathBuf,

    /// Absolute path on disk.
    pub absolute_path: PathBuf,

    /// Size in bytes at walk time.
    pub size: u64,

    /// Whether the file name or path appears in the key-file catalog.
    pub is_key_file: bool,

    /// Category weights contributed by this file's content.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub signals: Scores,

    /// Whether a language-specific entry-point convention was found.
    #[serde(default)]
    pub has_entry_point: bool,

    /// Declared import or module names, deduplicated.
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub imports: BTreeSet<String>,
}

impl FileRecord {
    pub fn new(
        name: impl Into<String>,
        relative_path: impl Into<PathBuf>,
        absolute_path: impl Into<PathBuf>,
        size: u64,
        is_key_file: bool,
    ) -> Self {
        Self {
            name: name.into(),
            relative_path: relative_path.into(),
            absolute_path: absolute_path.into(),
            size,
            is_key_file,
            signals: Scores::new(),
            has_entry_point: false,
            imports: BTreeSet::new(),
        }
    }

    /// Lowercased extension without the leading dot.
    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    /// The language bucket this file counts towards, if any.
    pub fn language(&self) -> Option<Language> {
        self.extension()
            .and_then(|ext| Language::from_extension(&ext))
    }

    /// The relative path rendered with `/` separators.
    pub fn relative_path_str(&self) -> String {
        self.relative_path.to_string_lossy().replace('\\', "/")
    }
}

/// The individual facts that fed a project's confidence score.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ConfidenceFactors {
    /// `setup.py` or `pyproject.toml` present.
    pub has_setup_manifest: bool,
    /// `package.json` present.
    pub has_package_json: bool,
    /// `Dockerfile` or `docker-compose.yml` present.
    pub has_docker: bool,
    /// Markup and script files found together.
    pub has_html_and_js: bool,
    /// Highest-scoring framework category above the detection threshold.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_detected: Option<String>,
    /// Raw score of `framework_detected`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework_score: Option<f64>,
    /// Entry point found in a project whose primary language supports the
    /// "script" verdict.
    pub has_entry_point: bool,
}

/// Results of the microservice pass for one project.
///
/// Populated exactly once per run and read-only afterwards.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MicroserviceProfile {
    /// Accumulated weight per microservice-indicator category.
    pub indicator_scores: Scores,

    /// Accumulated weight per communication-style category.
    pub communication_scores: Scores,

    /// Sum of all indicator scores.
    pub total_score: f64,

    /// `total_score` above the size-dependent threshold.
    pub is_microservice: bool,

    /// `min(total_score / 5.0, 0.95)`.
    pub probability: f64,

    /// Highest-scoring communication category, or `"unknown"`.
    pub primary_communication: String,

    /// Declared API endpoints, sorted.
    pub endpoints: Vec<ServiceEndpoint>,

    /// Outbound calls that passed the service-likelihood filter, sorted.
    pub calls: Vec<ServiceCall>,
}

/// A project: one admitted directory with at least one eligible file.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProjectRecord {
    /// Display name (the directory name).
    pub name: String,

    /// Absolute path of the project root.
    pub path: PathBuf,

    /// Admitted files, ordered by relative path.
    pub files: Vec<FileRecord>,

    /// Relative paths of files flagged as key files.
    pub key_files: Vec<PathBuf>,

    /// Number of admitted files.
    pub file_count: usize,

    /// File counts per language bucket.
    pub language_counts: BTreeMap<Language, usize>,

    /// File counts per lowercased extension (with the leading dot).
    pub file_extensions: BTreeMap<String, usize>,

    /// Accumulated weight per general framework category.
    pub framework_scores: Scores,

    /// Any file declared an entry point.
    pub has_entry_point: bool,

    /// Union of all declared import names.
    pub imports: BTreeSet<String>,

    /// Bucket with the most files; `None` when no bucket has any.
    pub primary_language: Option<Language>,

    /// Winning verdict label.
    pub project_type: String,

    /// Score of the winning verdict, always within `[0, 1]`.
    pub confidence: f64,

    pub confidence_label: ConfidenceLabel,

    pub confidence_factors: ConfidenceFactors,

    /// Soft errors from files and subdirectories of this project.
    pub errors: Vec<SoftError>,

    /// When this record was produced.
    pub analyzed_at: DateTime<Utc>,

    /// Filled by the microservice pass.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub microservice: Option<MicroserviceProfile>,
}

impl ProjectRecord {
    /// Creates an empty, unclassified record for a directory.
    pub fn new(name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            files: Vec::new(),
            key_files: Vec::new(),
            file_count: 0,
            language_counts: BTreeMap::new(),
            file_extensions: BTreeMap::new(),
            framework_scores: Scores::new(),
            has_entry_point: false,
            imports: BTreeSet::new(),
            primary_language: None,
            project_type: "unknown".to_string(),
            confidence: 0.0,
            confidence_label: ConfidenceLabel::VeryLow,
            confidence_factors: ConfidenceFactors::default(),
            errors: Vec::new(),
            analyzed_at: Utc::now(),
            microservice: None,
        }
    }

    /// Number of files counted towards a language bucket.
    pub fn language_count(&self, language: Language) -> usize {
        self.language_counts.get(&language).copied().unwrap_or(0)
    }

    /// Primary language name, or `"unknown"`.
    pub fn primary_language_name(&self) -> &'static str {
        self.primary_language
            .map(|lang| lang.as_str())
            .unwrap_or("unknown")
    }

    /// Whether a key file with exactly this basename exists.
    pub fn has_key_file_named(&self, name: &str) -> bool {
        self.key_files
            .iter()
            .any(|path| path.file_name().map(|n| n == name).unwrap_or(false))
    }

    /// Whether the microservice pass judged this project a microservice.
    pub fn is_microservice(&self) -> bool {
        self.microservice
            .as_ref()
            .map(|profile| profile.is_microservice)
            .unwrap_or(false)
    }
}

/// HTTP method captured alongside an endpoint path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
    Unknown,
}

impl HttpMethod {
    /// Parses a verb as written in route declarations (`get`, `POST`, ...).
    pub fn from_verb(verb: &str) -> Self {
        match verb.to_lowercase().as_str() {
            "get" => HttpMethod::Get,
            "post" => HttpMethod::Post,
            "put" => HttpMethod::Put,
            "delete" => HttpMethod::Delete,
            "patch" => HttpMethod::Patch,
            _ => HttpMethod::Unknown,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification of an endpoint by the shape of its path.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    Health,
    Metrics,
    Auth,
    Webhook,
    Config,
    Admin,
    Resource,
    Other,
}

/// An API endpoint declared in a project's source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceEndpoint {
    /// Normalized path (leading `/` unless URL-like).
    pub path: String,
    pub method: HttpMethod,
    /// File name of the declaring file.
    pub file: String,
    /// Framework family whose pattern matched.
    pub framework: String,
    pub kind: EndpointKind,
}

/// An outbound call found in source text. Not validated as reachable.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ServiceCall {
    /// Target URL or URL-like literal.
    pub url: String,
    /// File name of the declaring file.
    pub file: String,
    /// Client family whose pattern matched (`python`, `javascript`, `java`, `urls`).
    pub family: String,
}

/// How two services talk to each other.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RelationshipType {
    #[serde(rename = "REST")]
    Rest,
    #[serde(rename = "gRPC")]
    Grpc,
    #[serde(rename = "GraphQL")]
    GraphQl,
    #[serde(rename = "Event-based")]
    EventBased,
    #[serde(rename = "SOAP")]
    Soap,
    #[serde(rename = "WebSocket")]
    WebSocket,
    #[serde(rename = "HTTP")]
    Http,
}

impl RelationshipType {
    /// Maps a communication-style category name to a relationship type.
    ///
    /// Returns `None` for `"unknown"` and for categories without an explicit
    /// mapping.
    pub fn from_communication(style: &str) -> Option<Self> {
        match style {
            "rest_api" => Some(RelationshipType::Rest),
            "grpc" => Some(RelationshipType::Grpc),
            "graphql" => Some(RelationshipType::GraphQl),
            "event_based" => Some(RelationshipType::EventBased),
            "soap" => Some(RelationshipType::Soap),
            "websocket" => Some(RelationshipType::WebSocket),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RelationshipType::Rest => "REST",
            RelationshipType::Grpc => "gRPC",
            RelationshipType::GraphQl => "GraphQL",
            RelationshipType::EventBased => "Event-based",
            RelationshipType::Soap => "SOAP",
            RelationshipType::WebSocket => "WebSocket",
            RelationshipType::Http => "HTTP",
        }
    }
}

impl fmt::Display for RelationshipType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A directed edge between two detected microservices.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Relationship {
    /// Calling project name.
    pub source: String,
    /// Called project name. Never equal to `source`.
    pub target: String,
    #[serde(rename = "type")]
    pub relationship_type: RelationshipType,
    /// URL of the call that produced this edge.
    pub url: String,
    /// File name declaring that call.
    pub file: String,
}

/// Ignore patterns applied when no custom list is configured.
///
/// Plain patterns match anywhere in a relative path, so short common words
/// are written as `**/name` globs that only match a whole entry name.
pub const DEFAULT_IGNORE_PATTERNS: &[&str] = &[
    // Version control
    ".git", ".github", ".svn", ".hg", ".bzr",
    // IDE and editor files
    ".vscode", "__pycache__", ".idea", ".vs", ".settings", ".project", ".classpath",
    // Virtual environments
    "venv", "**/env", ".env", ".virtualenv", ".venv", "virtualenv", "**/ENV", "node_modules",
    "site-packages",
    // Build and distribution
    "**/dist", "**/build", "**/target", "**/out", "**/bin",
    "*.pyc", "*.pyo", "*.pyd", "*.so", "*.dylib", "*.dll",
    "*.egg-info", "*.egg", "*.whl", "*.jar", "*.war",
    // Operating system files
    ".DS_Store", "Thumbs.db", ".directory",
    // System directories that tend to cause permission errors
    ".cache", ".config", ".azure", ".aws", ".android",
    ".gradle", ".nuget", ".m2", ".npm", ".yarn",
    "AppData", "Local Settings", "Application Data",
    "Temporary Internet Files", "**/Temp", "**/tmp",
    // Large data directories
    "**/data", "**/dataset", "**/datasets", "large_files",
    "**/logs", "**/log", "**/archive", "**/bak", "**/backup",
    // Media and archives
    "*.jpg", "*.jpeg", "*.png", "*.gif", "*.bmp",
    "*.mp3", "*.mp4", "*.mov", "*.avi", "*.wmv",
    "*.zip", "*.tar", "*.gz", "*.bz2", "*.xz", "*.rar",
];

/// Configuration for an analysis run.
///
/// # Example
///
/// ```
/// # use project_analyzer_core::AnalysisConfig;
/// # use std::path::PathBuf;
/// let config = AnalysisConfig::new(PathBuf::from("/home/user/code"))
///     .with_max_depth(2)
///     .with_max_workers(8)
///     .with_extra_ignores(vec!["fixtures".to_string()]);
///
/// assert_eq!(config.max_depth, 2);
/// assert!(config.ignore_patterns.contains(&"node_modules".to_string()));
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Root directories, analyzed one after another.
    pub root_paths: Vec<PathBuf>,

    /// Substring/glob patterns excluding files and directories.
    ///
    /// See [`IgnorePolicy`](crate::walker::IgnorePolicy) for the matching rules.
    pub ignore_patterns: Vec<String>,

    /// How many directory levels below each root are considered as
    /// candidate projects.
    ///
    /// - `0` → only the root itself
    /// - `n` → the root plus every admitted directory up to n levels deep
    pub max_depth: usize,

    /// Width of the worker pool. Must be at least 1.
    pub max_workers: usize,

    /// Whether to follow symbolic links while walking.
    pub follow_symlinks: bool,

    /// Whether to run the microservice pass after classification.
    pub detect_microservices: bool,

    /// Emit debug-level logging. Never changes results.
    pub verbose: bool,
}

impl Default for AnalysisConfig {
    /// Analyzes the current directory three levels deep with four workers.
    fn default() -> Self {
        Self {
            root_paths: vec![PathBuf::from(".")],
            ignore_patterns: DEFAULT_IGNORE_PATTERNS
                .iter()
                .map(|p| p.to_string())
                .collect(),
            max_depth: 3,
            max_workers: 4,
            follow_symlinks: false,
            detect_microservices: true,
            verbose: false,
        }
    }
}

impl AnalysisConfig {
    pub fn new(root: PathBuf) -> Self {
        Self {
            root_paths: vec![root],
            ..Default::default()
        }
    }

    pub fn with_roots(mut self, roots: Vec<PathBuf>) -> Self {
        self.root_paths = roots;
        self
    }

    /// Replaces the ignore list entirely.
    pub fn with_ignore_patterns(mut self, patterns: Vec<String>) -> Self {
        self.ignore_patterns = patterns;
        self
    }

    /// Appends patterns to the current ignore list, skipping duplicates.
    pub fn with_extra_ignores(mut self, patterns: Vec<String>) -> Self {
        for pattern in patterns {
            if !self.ignore_patterns.contains(&pattern) {
                self.ignore_patterns.push(pattern);
            }
        }
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    pub fn with_max_workers(mut self, workers: usize) -> Self {
        self.max_workers = workers;
        self
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    pub fn with_microservices(mut self, detect: bool) -> Self {
        self.detect_microservices = detect;
        self
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_record_serialization() {
        let mut project = ProjectRecord::new("orders", "/srv/orders");
        project.primary_language = Some(Language::Python);
        add_score(&mut project.framework_scores, "flask", 0.7);

        let json = serde_json::to_string(&project).unwrap();
        assert!(json.contains("\"primary_language\":\"python\""));
        assert!(json.contains("\"confidence_label\":\"Very Low\""));
        assert!(!json.contains("microservice\""));

        let deserialized: ProjectRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized.name, "orders");
        assert_eq!(deserialized.framework_scores.get("flask"), Some(&0.7));
    }

    #[test]
    fn test_relationship_type_serialization() {
        let rel = Relationship {
            source: "checkout".to_string(),
            target: "orders".to_string(),
            relationship_type: RelationshipType::EventBased,
            url: "http://orders/api".to_string(),
            file: "client.py".to_string(),
        };
        let json = serde_json::to_string(&rel).unwrap();
        assert!(json.contains("\"type\":\"Event-based\""));
    }

    #[test]
    fn test_language_from_extension() {
        assert_eq!(Language::from_extension("PY"), Some(Language::Python));
        assert_eq!(Language::from_extension("tsx"), Some(Language::TypeScript));
        assert_eq!(Language::from_extension("kt"), Some(Language::Java));
        assert_eq!(Language::from_extension("scss"), Some(Language::Css));
        assert_eq!(Language::from_extension("rs"), None);
    }

    #[test]
    fn test_confidence_label_banding() {
        assert_eq!(ConfidenceLabel::from_score(0.95), ConfidenceLabel::VeryHigh);
        assert_eq!(ConfidenceLabel::from_score(0.9), ConfidenceLabel::VeryHigh);
        assert_eq!(ConfidenceLabel::from_score(0.85), ConfidenceLabel::High);
        assert_eq!(ConfidenceLabel::from_score(0.5), ConfidenceLabel::Medium);
        assert_eq!(ConfidenceLabel::from_score(0.4), ConfidenceLabel::Low);
        assert_eq!(ConfidenceLabel::from_score(0.2), ConfidenceLabel::VeryLow);
    }

    #[test]
    fn test_http_method_from_verb() {
        assert_eq!(HttpMethod::from_verb("get"), HttpMethod::Get);
        assert_eq!(HttpMethod::from_verb("PATCH"), HttpMethod::Patch);
        assert_eq!(HttpMethod::from_verb("options"), HttpMethod::Unknown);
        assert_eq!(HttpMethod::Unknown.to_string(), "UNKNOWN");
    }

    #[test]
    fn test_file_record_language() {
        let file = FileRecord::new("App.JSX", "src/App.JSX", "/p/src/App.JSX", 10, false);
        assert_eq!(file.extension().as_deref(), Some("jsx"));
        assert_eq!(file.language(), Some(Language::JavaScript));
    }

    #[test]
    fn test_analysis_config_default() {
        let config = AnalysisConfig::default();
        assert_eq!(config.max_depth, 3);
        assert_eq!(config.max_workers, 4);
        assert!(!config.follow_symlinks);
        assert!(config.detect_microservices);
        assert!(config.ignore_patterns.iter().any(|p| p == "node_modules"));
    }

    #[test]
    fn test_extra_ignores_skip_duplicates() {
        let config = AnalysisConfig::default()
            .with_extra_ignores(vec!["node_modules".to_string(), "fixtures".to_string()]);
        let count = config
            .ignore_patterns
            .iter()
            .filter(|p| p.as_str() == "node_modules")
            .count();
        assert_eq!(count, 1);
        assert!(config.ignore_patterns.contains(&"fixtures".to_string()));
    }
}
