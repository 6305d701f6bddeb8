//! Directory traversal with ignore, size and depth policy.
//!
//! The walker answers two questions for the analyzer:
//!
//! 1. Which directories below a root are candidate projects?
//!    ([`DirectoryWalker::discover`], level by level up to a maximum depth)
//! 2. Which files does a candidate directory contain?
//!    ([`DirectoryWalker::inventory`], recursive, with basic metadata)
//!
//! Both apply the same [`IgnorePolicy`], evaluated against paths relative to
//! the analysis root. Unreadable entries become [`SoftError`]s and never stop
//! a walk.

use crate::error::{Error, Result};
use crate::models::{FileRecord, SoftError, SoftErrorKind};
use crate::patterns::is_glob;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Files larger than this are excluded from the inventory entirely.
pub const MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

/// Decides which files and directories are invisible to the analysis.
///
/// An entry is ignored when:
///
/// - any component of its relative path starts with a dot (hidden)
/// - a glob pattern matches its name or its relative path
/// - a plain pattern occurs anywhere in its relative path (`fixture` ignores
///   `fixtures/` and `tests/fixture_data.json`)
///
/// The analysis root itself (an empty relative path) is never ignored.
///
/// # Example
///
/// ```
/// use project_analyzer_core::walker::IgnorePolicy;
/// use std::path::Path;
///
/// let policy = IgnorePolicy::new(&["node_modules".to_string(), "**/build".to_string()])?;
/// assert!(policy.is_ignored(Path::new("web/node_modules/react/index.js")));
/// assert!(policy.is_ignored(Path::new("android/build")));
/// assert!(!policy.is_ignored(Path::new("android/build.gradle")));
/// # Ok::<(), project_analyzer_core::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct IgnorePolicy {
    globs: GlobSet,
    substrings: Vec<String>,
}

impl IgnorePolicy {
    /// Compiles an ignore list.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidPattern`] for the first glob that does not compile.
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut substrings = Vec::new();

        for pattern in patterns {
            let pattern = pattern.trim();
            if pattern.is_empty() {
                continue;
            }
            if is_glob(pattern) {
                let glob = Glob::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e))?;
                builder.add(glob);
            } else {
                substrings.push(pattern.to_string());
            }
        }

        let globs = builder
            .build()
            .map_err(|e| Error::invalid_pattern(patterns.join(", "), e))?;

        Ok(Self { globs, substrings })
    }

    /// Checks a path relative to the analysis root.
    pub fn is_ignored(&self, relative: &Path) -> bool {
        let relative = normalize(relative);
        if relative.is_empty() {
            return false;
        }

        if relative
            .split('/')
            .any(|part| part.starts_with('.') && part != "." && part != "..")
        {
            return true;
        }

        let name = relative.rsplit('/').next().unwrap_or(relative.as_str());
        if self.globs.is_match(name) || self.globs.is_match(&relative) {
            return true;
        }

        self.substrings
            .iter()
            .any(|pattern| relative.contains(pattern.as_str()))
    }
}

/// Renders a relative path with `/` separators and no leading `./`.
fn normalize(path: &Path) -> String {
    let rendered = path.to_string_lossy().replace('\\', "/");
    rendered.trim_start_matches("./").trim_matches('/').to_string()
}

/// File names that mark conventionally significant files.
///
/// Dot-files are left out: hidden entries never reach the inventory.
const KEY_FILE_NAMES: &[&str] = &[
    // Python
    "main.py", "app.py", "run.py", "server.py", "setup.py", "setup.cfg", "requirements.txt",
    "pyproject.toml", "Pipfile", "Pipfile.lock", "pytest.ini", "conftest.py",
    "manage.py", "wsgi.py", "asgi.py", "settings.py", "urls.py", "models.py",
    "views.py", "tox.ini", "__main__.py", "__init__.py", "config.py", "utils.py",
    "helpers.py", "alembic.ini",
    // JavaScript / TypeScript
    "package.json", "package-lock.json", "yarn.lock", "tsconfig.json",
    "next.config.js", "nuxt.config.js", "angular.json", "vue.config.js",
    "webpack.config.js", "rollup.config.js",
    "index.js", "main.js", "server.js", "app.js", "index.ts", "main.ts",
    // Configuration and documentation
    "README.md", "LICENSE", "CONTRIBUTING.md", "CHANGELOG.md",
    "Makefile", "CMakeLists.txt",
    "azure-pipelines.yml", "Jenkinsfile", "cloudbuild.yaml", "serverless.yml",
    // Containers and orchestration
    "Dockerfile", "docker-compose.yml", "docker-compose.yaml",
    "deployment.yaml", "service.yaml", "terraform.tf",
    // Databases
    "schema.sql", "schema.prisma",
    // Java / Kotlin / Android
    "pom.xml", "build.gradle", "settings.gradle", "gradlew",
    "AndroidManifest.xml", "build.xml", "ivy.xml", "MainActivity.java",
    // .NET
    "project.json", "app.config", "web.config", "NuGet.Config", "packages.config",
    // Ruby
    "Gemfile", "Rakefile", "Guardfile", "config.ru",
    // PHP
    "composer.json", "composer.lock", "artisan", "wp-config.php",
    // Go
    "go.mod", "go.sum", "main.go",
    // Rust
    "Cargo.toml", "Cargo.lock",
    // Swift
    "Package.swift", "Info.plist", "project.pbxproj", "AppDelegate.swift",
    // Flutter / Dart
    "pubspec.yaml", "pubspec.lock",
];

const KEY_FILE_GLOBS: &[&str] = &["*.csproj", "*.vbproj", "*.fsproj"];

/// Directories whose contents are key files wherever they appear.
const KEY_DIRECTORIES: &[&str] = &["k8s", "kubernetes", "migrations"];

/// Checks a file against the key-file catalog.
///
/// `relative_path` is the path of the file relative to its project.
pub fn is_key_file(name: &str, relative_path: &Path) -> bool {
    if KEY_FILE_NAMES.contains(&name) {
        return true;
    }

    if KEY_FILE_GLOBS
        .iter()
        .any(|pattern| name.ends_with(pattern.trim_start_matches('*')))
    {
        return true;
    }

    let parent = relative_path
        .parent()
        .map(normalize)
        .unwrap_or_default();
    if parent.is_empty() {
        return false;
    }
    let wrapped = format!("/{}/", parent);
    KEY_DIRECTORIES
        .iter()
        .any(|dir| wrapped.contains(&format!("/{}/", dir)))
}

/// Candidate directories below one root, grouped by depth.
#[derive(Debug, Clone, Default)]
pub struct Discovery {
    /// `levels[0]` holds the root alone; `levels[n]` the admitted directories
    /// `n` levels below it, sorted.
    pub levels: Vec<Vec<PathBuf>>,

    /// Directories that could not be read.
    pub errors: Vec<SoftError>,
}

impl Discovery {
    /// Total number of candidate directories, the root included.
    pub fn directory_count(&self) -> usize {
        self.levels.iter().map(Vec::len).sum()
    }

    /// All candidate directories, shallowest first.
    pub fn directories(&self) -> impl Iterator<Item = &PathBuf> {
        self.levels.iter().flatten()
    }
}

/// Files of one candidate directory.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    /// Admitted files, ordered by relative path.
    pub files: Vec<FileRecord>,

    /// Entries that could not be read.
    pub errors: Vec<SoftError>,
}

/// Walks directory trees according to an [`IgnorePolicy`].
#[derive(Debug, Clone)]
pub struct DirectoryWalker<'a> {
    policy: &'a IgnorePolicy,
    follow_symlinks: bool,
}

impl<'a> DirectoryWalker<'a> {
    pub fn new(policy: &'a IgnorePolicy) -> Self {
        Self {
            policy,
            follow_symlinks: false,
        }
    }

    pub fn with_follow_symlinks(mut self, follow: bool) -> Self {
        self.follow_symlinks = follow;
        self
    }

    fn is_ignored(&self, analysis_root: &Path, path: &Path) -> bool {
        match path.strip_prefix(analysis_root) {
            Ok(relative) => self.policy.is_ignored(relative),
            Err(_) => false,
        }
    }

    /// Discovers candidate project directories up to `max_depth` levels
    /// below `root`.
    ///
    /// The root is always a candidate. An ignored directory hides its whole
    /// subtree.
    pub fn discover(&self, root: &Path, max_depth: usize) -> Discovery {
        let mut discovery = Discovery {
            levels: vec![vec![root.to_path_buf()]],
            errors: Vec::new(),
        };

        if max_depth == 0 {
            return discovery;
        }

        let walker = WalkDir::new(root)
            .min_depth(1)
            .max_depth(max_depth)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(root, entry.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(root).to_path_buf();
                    warn!(path = %path.display(), error = %err, "Skipping unreadable directory");
                    discovery
                        .errors
                        .push(SoftError::new(path, SoftErrorKind::Access, err.to_string()));
                    continue;
                }
            };

            if !entry.file_type().is_dir() {
                continue;
            }

            let depth = entry.depth();
            if discovery.levels.len() <= depth {
                discovery.levels.resize_with(depth + 1, Vec::new);
            }
            discovery.levels[depth].push(entry.into_path());
        }

        for level in &mut discovery.levels {
            level.sort();
        }

        debug!(
            root = %root.display(),
            directories = discovery.directory_count(),
            "Discovered candidate directories"
        );

        discovery
    }

    /// Lists the admitted files below `directory`, recursively.
    ///
    /// Ignore checks use paths relative to `analysis_root`; the returned
    /// records carry paths relative to `directory`. Files over
    /// [`MAX_FILE_SIZE`] are left out without an error.
    pub fn inventory(&self, analysis_root: &Path, directory: &Path) -> Inventory {
        let mut inventory = Inventory::default();

        let walker = WalkDir::new(directory)
            .min_depth(1)
            .follow_links(self.follow_symlinks)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| !self.is_ignored(analysis_root, entry.path()));

        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err.path().unwrap_or(directory).to_path_buf();
                    debug!(path = %path.display(), error = %err, "Skipping unreadable entry");
                    inventory
                        .errors
                        .push(SoftError::new(path, SoftErrorKind::Access, err.to_string()));
                    continue;
                }
            };

            if !entry.file_type().is_file() {
                continue;
            }

            let size = match entry.metadata() {
                Ok(metadata) => metadata.len(),
                Err(err) => {
                    inventory.errors.push(SoftError::new(
                        entry.path(),
                        SoftErrorKind::Access,
                        err.to_string(),
                    ));
                    continue;
                }
            };

            if size > MAX_FILE_SIZE {
                debug!(path = %entry.path().display(), size, "Excluding oversized file");
                continue;
            }

            let relative = match entry.path().strip_prefix(directory) {
                Ok(relative) => relative.to_path_buf(),
                Err(_) => continue,
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            let key = is_key_file(&name, &relative);

            inventory
                .files
                .push(FileRecord::new(name, relative, entry.path(), size, key));
        }

        inventory
            .files
            .sort_by(|a, b| a.relative_path.cmp(&b.relative_path));

        inventory
    }
}
