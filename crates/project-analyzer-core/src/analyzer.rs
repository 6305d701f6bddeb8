//! Analysis orchestration.
//!
//! This module ties the pipeline together. The main entry point is the
//! [`ProjectAnalyzer`] trait, with a default implementation in
//! [`DefaultAnalyzer`]. For every configured root the analyzer:
//!
//! 1. discovers candidate directories with the [`DirectoryWalker`]
//! 2. inventories and analyzes each directory in parallel, producing one
//!    [`ProjectRecord`] per directory with at least one admitted file
//! 3. classifies each record with the [`ProjectClassifier`]
//! 4. optionally runs the [`MicroserviceDetector`]
//!
//! Once every root is done, relationships between detected services are
//! resolved and statistics are rolled up into an [`AnalysisReport`].

use crate::classifier::ProjectClassifier;
use crate::error::{Error, Result};
use crate::microservice::MicroserviceDetector;
use crate::models::{merge_scores, AnalysisConfig, ProjectRecord, Relationship, SoftError};
use crate::patterns::Registries;
use crate::service_graph::resolve_relationships;
use crate::signals::{is_content_eligible, FileAnalysis, SignalExtractor};
use crate::stats::AnalysisStats;
use crate::walker::{DirectoryWalker, IgnorePolicy};
use rayon::prelude::*;
use rayon::ThreadPool;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info};

/// Receives `(fraction, status)` pairs while a run progresses.
///
/// May be called from any worker thread, so it must not block.
pub type ProgressCallback<'a> = dyn Fn(f64, &str) + Send + Sync + 'a;

/// Share of a root's progress budget spent before report generation starts.
const DIRECTORY_SHARE: f64 = 0.8;

/// Share of a root's progress budget at which microservice detection starts.
const MICROSERVICE_START: f64 = 0.9;

/// Everything one analysis run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Analyzed projects, sorted by name.
    pub projects: Vec<ProjectRecord>,

    /// Resolved service relationships, sorted by source then target.
    pub relationships: Vec<Relationship>,

    pub stats: AnalysisStats,

    /// Soft errors that belong to no project, such as unreadable candidate
    /// directories.
    pub errors: Vec<SoftError>,

    /// Canonical roots, in configuration order.
    pub roots: Vec<PathBuf>,

    /// Wall-clock duration of the run.
    pub elapsed_ms: u64,
}

/// Trait for analyzing directory trees.
///
/// # Example
///
/// ```no_run
/// use project_analyzer_core::{AnalysisConfig, DefaultAnalyzer, ProjectAnalyzer};
/// use std::path::PathBuf;
///
/// let analyzer = DefaultAnalyzer::new()?;
/// let config = AnalysisConfig::new(PathBuf::from("/home/user/projects")).with_max_depth(2);
///
/// let report = analyzer.analyze(&config)?;
/// println!("Found {} projects", report.projects.len());
/// # Ok::<(), project_analyzer_core::Error>(())
/// ```
pub trait ProjectAnalyzer {
    /// Analyzes every configured root.
    ///
    /// # Errors
    ///
    /// Returns an error only for violated preconditions:
    /// - no roots were configured
    /// - a root doesn't exist or isn't a directory
    /// - `max_workers` is zero or an ignore glob doesn't compile
    ///
    /// Problems inside the tree are reported as soft errors instead.
    fn analyze(&self, config: &AnalysisConfig) -> Result<AnalysisReport> {
        self.analyze_with_progress(config, None)
    }

    /// Like [`analyze`](Self::analyze), reporting progress to `progress`.
    fn analyze_with_progress(
        &self,
        config: &AnalysisConfig,
        progress: Option<&ProgressCallback<'_>>,
    ) -> Result<AnalysisReport>;
}

/// Default implementation of the ProjectAnalyzer trait.
///
/// Holds the pattern tables for the whole run and passes them explicitly to
/// every stage. All per-run state lives on the stack of
/// [`analyze_with_progress`](ProjectAnalyzer::analyze_with_progress), so one
/// analyzer can be reused for any number of runs.
#[derive(Debug, Clone)]
pub struct DefaultAnalyzer {
    registries: Registries,

    /// Whether to log per-project results at info level.
    pub verbose: bool,
}

impl DefaultAnalyzer {
    /// Creates an analyzer with the built-in pattern tables.
    ///
    /// # Example
    ///
    /// ```
    /// use project_analyzer_core::DefaultAnalyzer;
    ///
    /// let analyzer = DefaultAnalyzer::new()?;
    /// assert!(!analyzer.verbose);
    /// # Ok::<(), project_analyzer_core::Error>(())
    /// ```
    pub fn new() -> Result<Self> {
        Ok(Self::with_registries(Registries::builtin()?))
    }

    /// Creates an analyzer with substitute pattern tables.
    pub fn with_registries(registries: Registries) -> Self {
        Self {
            registries,
            verbose: false,
        }
    }

    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn registries(&self) -> &Registries {
        &self.registries
    }

    /// Checks run preconditions and returns the canonical roots.
    fn validate(&self, config: &AnalysisConfig) -> Result<Vec<PathBuf>> {
        if config.root_paths.is_empty() {
            return Err(Error::NoRoots);
        }

        if config.max_workers == 0 {
            return Err(Error::invalid_config("max_workers must be at least 1"));
        }

        config
            .root_paths
            .iter()
            .map(|root| {
                if !root.exists() {
                    return Err(Error::path_not_found(root));
                }
                if !root.is_dir() {
                    return Err(Error::not_a_directory(root));
                }
                Ok(root.canonicalize()?)
            })
            .collect()
    }

    /// Builds the record of one candidate directory.
    ///
    /// Returns `None` when the directory has no admitted files, together
    /// with any errors met while listing it.
    fn analyze_directory(
        &self,
        walker: &DirectoryWalker<'_>,
        root: &Path,
        directory: &Path,
        verbose: bool,
    ) -> (Option<ProjectRecord>, Vec<SoftError>) {
        let inventory = walker.inventory(root, directory);
        if inventory.files.is_empty() {
            debug!(path = %directory.display(), "No admitted files, skipping");
            return (None, inventory.errors);
        }

        let mut project = ProjectRecord::new(display_name(directory), directory);
        project.errors = inventory.errors;
        let mut files = inventory.files;

        let frameworks = &self.registries.frameworks;
        for file in &mut files {
            if let Some(language) = file.language() {
                *project.language_counts.entry(language).or_insert(0) += 1;
            }
            if let Some(extension) = file.extension() {
                *project
                    .file_extensions
                    .entry(format!(".{}", extension))
                    .or_insert(0) += 1;
            }
            if file.is_key_file {
                project.key_files.push(file.relative_path.clone());
            }
            frameworks.score_path(&file.relative_path, &mut file.signals);
        }

        // One task per eligible file; results come back in file order.
        let extractor = SignalExtractor::new(frameworks);
        let analyses: Vec<(usize, FileAnalysis)> = files
            .par_iter()
            .enumerate()
            .filter(|(_, file)| is_content_eligible(file))
            .map(|(index, file)| (index, extractor.analyze_file(file)))
            .collect();

        for (index, analysis) in analyses {
            let file = &mut files[index];
            merge_scores(&mut file.signals, &analysis.signals);
            file.has_entry_point = analysis.has_entry_point;
            file.imports = analysis.imports;
            if let Some(error) = analysis.error {
                project.errors.push(error);
            }
        }

        for file in &files {
            merge_scores(&mut project.framework_scores, &file.signals);
            project.has_entry_point |= file.has_entry_point;
            project.imports.extend(file.imports.iter().cloned());
        }

        project.file_count = files.len();
        project.files = files;

        ProjectClassifier::new(frameworks)
            .classify(&project)
            .apply_to(&mut project);

        if verbose {
            info!(
                project = %project.name,
                project_type = %project.project_type,
                confidence = project.confidence,
                files = project.file_count,
                "Classified project"
            );
        } else {
            debug!(
                project = %project.name,
                project_type = %project.project_type,
                confidence = project.confidence,
                "Classified project"
            );
        }

        (Some(project), Vec::new())
    }

    /// Analyzes one root inside the worker pool.
    ///
    /// Progress for this root is reported within `[base, base + step]`.
    #[allow(clippy::too_many_arguments)]
    fn analyze_root(
        &self,
        pool: &ThreadPool,
        walker: &DirectoryWalker<'_>,
        root: &Path,
        config: &AnalysisConfig,
        base: f64,
        step: f64,
        progress: Option<&ProgressCallback<'_>>,
    ) -> (Vec<ProjectRecord>, Vec<SoftError>) {
        let verbose = self.verbose || config.verbose;
        let report = |fraction: f64, status: &str| {
            if let Some(callback) = progress {
                callback((base + fraction * step).min(1.0), status);
            }
        };

        report(0.0, &format!("Analyzing {}", display_name(root)));

        let discovery = walker.discover(root, config.max_depth);
        let directories: Vec<&PathBuf> = discovery.directories().collect();
        let total = directories.len();
        let done = AtomicUsize::new(0);

        let outcomes: Vec<(Option<ProjectRecord>, Vec<SoftError>)> = pool.install(|| {
            directories
                .par_iter()
                .map(|directory| {
                    let outcome = self.analyze_directory(walker, root, directory, verbose);
                    let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
                    report(
                        DIRECTORY_SHARE * finished as f64 / total as f64,
                        &format!("Analyzed {}", display_name(directory)),
                    );
                    outcome
                })
                .collect()
        });

        let mut errors = discovery.errors;
        let mut projects = Vec::new();
        for (project, orphan_errors) in outcomes {
            projects.extend(project);
            errors.extend(orphan_errors);
        }
        sort_projects(&mut projects);

        report(DIRECTORY_SHARE, "Generating reports");

        if config.detect_microservices {
            report(MICROSERVICE_START, "Detecting microservices");
            let detector = MicroserviceDetector::new(&self.registries.microservices);
            let scaled = |fraction: f64, status: &str| {
                report(
                    MICROSERVICE_START + (1.0 - MICROSERVICE_START) * fraction,
                    status,
                );
            };
            let callback: Option<&ProgressCallback<'_>> =
                progress.map(|_| &scaled as &ProgressCallback<'_>);
            pool.install(|| detector.detect(&mut projects, callback));
        }

        info!(
            root = %root.display(),
            projects = projects.len(),
            errors = errors.len(),
            "Root analyzed"
        );

        (projects, errors)
    }
}

impl ProjectAnalyzer for DefaultAnalyzer {
    fn analyze_with_progress(
        &self,
        config: &AnalysisConfig,
        progress: Option<&ProgressCallback<'_>>,
    ) -> Result<AnalysisReport> {
        let started = Instant::now();
        let roots = self.validate(config)?;
        let policy = IgnorePolicy::new(&config.ignore_patterns)?;
        let walker = DirectoryWalker::new(&policy).with_follow_symlinks(config.follow_symlinks);
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(config.max_workers)
            .build()?;

        let mut projects = Vec::new();
        let mut errors = Vec::new();
        let step = 1.0 / roots.len() as f64;

        for (index, root) in roots.iter().enumerate() {
            let (mut root_projects, mut root_errors) = self.analyze_root(
                &pool,
                &walker,
                root,
                config,
                index as f64 * step,
                step,
                progress,
            );
            projects.append(&mut root_projects);
            errors.append(&mut root_errors);
        }

        sort_projects(&mut projects);

        let relationships = if config.detect_microservices {
            resolve_relationships(&projects)
        } else {
            Vec::new()
        };

        let stats = AnalysisStats::from_projects(&projects, &relationships);
        let elapsed_ms = started.elapsed().as_millis() as u64;

        info!(
            projects = projects.len(),
            microservices = stats.microservices_count,
            relationships = relationships.len(),
            elapsed_ms,
            "Analysis complete"
        );

        if let Some(callback) = progress {
            callback(1.0, "Analysis complete");
        }

        Ok(AnalysisReport {
            projects,
            relationships,
            stats,
            errors,
            roots,
            elapsed_ms,
        })
    }
}

/// The directory name, or the full path for a filesystem root.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn sort_projects(projects: &mut [ProjectRecord]) {
    projects.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.path.cmp(&b.path)));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{EndpointKind, RelationshipType, SoftErrorKind};
    use crate::signals::MAX_CONTENT_SIZE;
    use crate::walker::MAX_FILE_SIZE;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Writes `content` to `root/relative`, creating parents.
    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    /// A fresh, non-hidden directory inside a temp dir.
    fn workspace(temp: &TempDir, name: &str) -> PathBuf {
        let dir = temp.path().join(name);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn analyze(root: &Path, depth: usize) -> AnalysisReport {
        let config = AnalysisConfig::new(root.to_path_buf()).with_max_depth(depth);
        DefaultAnalyzer::new().unwrap().analyze(&config).unwrap()
    }

    fn project<'a>(report: &'a AnalysisReport, name: &str) -> &'a ProjectRecord {
        report
            .projects
            .iter()
            .find(|p| p.name == name)
            .unwrap_or_else(|| panic!("no project named {}", name))
    }

    const DEPLOYMENT: &str = "apiVersion: apps/v1\nkind: Deployment\nspec:\n  template:\n    spec:\n      containers:\n        - image: app:1.0\n";
    const DOCKERFILE: &str = "FROM python:3.12-slim\nCOPY . /app\nCMD [\"python\", \"app.py\"]\n";

    #[test]
    fn test_analyzer_creation() {
        let analyzer = DefaultAnalyzer::new().unwrap();
        assert!(!analyzer.verbose);
        assert!(!analyzer.registries().frameworks.is_empty());

        let analyzer = analyzer.with_verbose(true);
        assert!(analyzer.verbose);
    }

    #[test]
    fn test_frontend_manifest_classified_as_framework() {
        let temp = TempDir::new().unwrap();
        let web = workspace(&temp, "web");
        write(
            &web,
            "package.json",
            r#"{"name": "web", "version": "1.0.0", "dependencies": {"react": "^18.2.0"}}"#,
        );

        let report = analyze(&web, 0);

        assert_eq!(report.projects.len(), 1);
        let web = &report.projects[0];
        assert_eq!(web.name, "web");
        assert_eq!(web.project_type, "react");
        assert!(web.confidence > 0.75);
        assert!(web.confidence_factors.has_package_json);
        assert_eq!(web.confidence_factors.framework_detected.as_deref(), Some("react"));
        assert_eq!(web.key_files, vec![PathBuf::from("package.json")]);
    }

    #[test]
    fn test_directory_without_files_yields_no_project() {
        let temp = TempDir::new().unwrap();
        let root = workspace(&temp, "repos");
        fs::create_dir_all(root.join("empty/nested")).unwrap();
        write(&root, "tool/main.py", "if __name__ == '__main__':\n    print('hi')\n");

        let report = analyze(&root, 2);

        let names: Vec<&str> = report.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["repos", "tool"]);
        assert_eq!(project(&report, "tool").project_type, "python_script");
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_small_service_detected_as_microservice() {
        let temp = TempDir::new().unwrap();
        let svc = workspace(&temp, "inventory");
        write(&svc, "Dockerfile", DOCKERFILE);
        write(&svc, "deployment.yaml", DEPLOYMENT);
        write(
            &svc,
            "app.py",
            "from flask import Flask\napp = Flask(__name__)\n\n@app.route('/health')\ndef health():\n    return 'ok'\n",
        );

        let report = analyze(&svc, 0);

        let svc = &report.projects[0];
        assert!(svc.file_count < 5);
        let profile = svc.microservice.as_ref().unwrap();
        assert!(profile.total_score > 3.0);
        assert!(profile.is_microservice);
        assert!(profile
            .endpoints
            .iter()
            .any(|e| e.path == "/health" && e.kind == EndpointKind::Health));
        assert_eq!(report.stats.microservices_count, 1);
    }

    #[test]
    fn test_service_call_becomes_single_relationship() {
        let temp = TempDir::new().unwrap();
        let root = workspace(&temp, "platform");
        let call = "import requests\n\ndef fetch_orders():\n    return requests.get(\"http://order-service/api/orders\").json()\n";

        write(&root, "checkout/Dockerfile", DOCKERFILE);
        write(&root, "checkout/deployment.yaml", DEPLOYMENT);
        write(&root, "checkout/client.py", call);
        write(&root, "checkout/worker.py", call);

        write(&root, "order-service/Dockerfile", DOCKERFILE);
        write(&root, "order-service/deployment.yaml", DEPLOYMENT);
        write(
            &root,
            "order-service/app.py",
            "from flask import Flask\napp = Flask(__name__)\n\n@app.route('/api/orders')\ndef orders():\n    return []\n",
        );

        let report = analyze(&root, 1);

        let checkout = project(&report, "checkout");
        assert!(checkout.is_microservice());
        assert_eq!(checkout.microservice.as_ref().unwrap().primary_communication, "rest_api");
        assert!(project(&report, "order-service").is_microservice());

        let from_checkout: Vec<&Relationship> = report
            .relationships
            .iter()
            .filter(|r| r.source == "checkout")
            .collect();
        assert_eq!(from_checkout.len(), 1);
        assert_eq!(from_checkout[0].target, "order-service");
        assert_eq!(from_checkout[0].relationship_type, RelationshipType::Rest);
        assert!(report.relationships.iter().all(|r| r.source != r.target));
    }

    #[test]
    fn test_third_party_urls_are_dropped() {
        let temp = TempDir::new().unwrap();
        let site = workspace(&temp, "site");
        write(&site, "Dockerfile", DOCKERFILE);
        write(&site, "deployment.yaml", DEPLOYMENT);
        write(
            &site,
            "app.js",
            "const css = fetch(\"https://fonts.googleapis.com/css\");\nmodule.exports = css;\n",
        );

        let report = analyze(&site, 0);

        let profile = report.projects[0].microservice.as_ref().unwrap();
        assert!(profile.calls.iter().all(|c| !c.url.contains("googleapis")));
        assert!(report.relationships.is_empty());
    }

    #[test]
    fn test_ignored_directories_produce_nothing() {
        let temp = TempDir::new().unwrap();
        let root = workspace(&temp, "app");
        write(&root, "index.js", "console.log('app');\n");
        write(&root, "node_modules/react/index.js", "module.exports = {};\n");
        write(&root, "lib/build/out.js", "void 0;\n");

        let config = AnalysisConfig::new(root.clone())
            .with_max_depth(3)
            .with_extra_ignores(vec!["build".to_string()]);
        let report = DefaultAnalyzer::new().unwrap().analyze(&config).unwrap();

        for project in &report.projects {
            assert!(!project.path.to_string_lossy().contains("node_modules"));
            assert!(!project.path.ends_with("build"));
            for file in &project.files {
                let rel = file.relative_path_str();
                assert!(!rel.contains("node_modules"), "{}", rel);
                assert!(!rel.contains("build/"), "{}", rel);
            }
        }
        assert_eq!(project(&report, "app").file_count, 1);
    }

    #[test]
    fn test_file_size_ceilings() {
        let temp = TempDir::new().unwrap();
        let root = workspace(&temp, "dumps");
        write(&root, "main.py", "print('hi')\n");
        fs::File::create(root.join("huge.json"))
            .unwrap()
            .set_len(MAX_FILE_SIZE + 1)
            .unwrap();
        fs::File::create(root.join("large.json"))
            .unwrap()
            .set_len(MAX_CONTENT_SIZE + 1)
            .unwrap();

        let report = analyze(&root, 0);

        let dumps = &report.projects[0];
        assert_eq!(dumps.file_count, 2);
        assert!(dumps.files.iter().all(|f| f.name != "huge.json"));
        assert_eq!(dumps.errors.len(), 1);
        assert_eq!(dumps.errors[0].kind, SoftErrorKind::Size);
        assert!(dumps.errors[0].path.ends_with("large.json"));
    }

    #[test]
    fn test_repeated_runs_are_identical() {
        let temp = TempDir::new().unwrap();
        let root = workspace(&temp, "mono");
        write(&root, "api/app.py", "from flask import Flask\nimport requests\napp = Flask(__name__)\n");
        write(&root, "api/requirements.txt", "flask==3.0\nrequests\n");
        write(&root, "ui/package.json", r#"{"dependencies": {"vue": "^3.0.0"}}"#);
        write(&root, "ui/src/main.js", "import { createApp } from 'vue';\n");

        let analyzer = DefaultAnalyzer::new().unwrap();
        let config = AnalysisConfig::new(root).with_max_depth(2).with_max_workers(3);
        let first = analyzer.analyze(&config).unwrap();
        let second = analyzer.analyze(&config).unwrap();

        let verdicts = |report: &AnalysisReport| -> Vec<(String, String, f64, &'static str)> {
            report
                .projects
                .iter()
                .map(|p| {
                    (
                        p.name.clone(),
                        p.project_type.clone(),
                        p.confidence,
                        p.primary_language_name(),
                    )
                })
                .collect()
        };
        assert_eq!(verdicts(&first), verdicts(&second));
        assert_eq!(first.relationships, second.relationships);

        let scores: Vec<_> = first.projects.iter().map(|p| p.framework_scores.clone()).collect();
        let again: Vec<_> = second.projects.iter().map(|p| p.framework_scores.clone()).collect();
        assert_eq!(scores, again);
    }

    #[test]
    fn test_precondition_failures() {
        let analyzer = DefaultAnalyzer::new().unwrap();
        let temp = TempDir::new().unwrap();

        let config = AnalysisConfig::default().with_roots(Vec::new());
        assert!(matches!(analyzer.analyze(&config), Err(Error::NoRoots)));

        let config = AnalysisConfig::new(PathBuf::from("/nonexistent/path/that/does/not/exist"));
        assert!(matches!(analyzer.analyze(&config), Err(Error::PathNotFound(_))));

        let file = temp.path().join("notes.txt");
        fs::write(&file, "x").unwrap();
        let config = AnalysisConfig::new(file);
        assert!(matches!(analyzer.analyze(&config), Err(Error::NotADirectory(_))));

        let config = AnalysisConfig::new(temp.path().to_path_buf()).with_max_workers(0);
        assert!(matches!(analyzer.analyze(&config), Err(Error::InvalidConfig(_))));

        let config = AnalysisConfig::new(temp.path().to_path_buf())
            .with_extra_ignores(vec!["[oops".to_string()]);
        assert!(matches!(analyzer.analyze(&config), Err(Error::InvalidPattern { .. })));
    }

    #[test]
    fn test_multiple_roots_sorted_by_name() {
        let temp = TempDir::new().unwrap();
        let zeta = workspace(&temp, "zeta");
        let alpha = workspace(&temp, "alpha");
        write(&zeta, "index.js", "module.exports = 1;\n");
        write(&alpha, "lib.py", "def f():\n    return 1\n");

        let config = AnalysisConfig::default().with_roots(vec![zeta, alpha]).with_max_depth(0);
        let report = DefaultAnalyzer::new().unwrap().analyze(&config).unwrap();

        let names: Vec<&str> = report.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "zeta"]);
        assert_eq!(report.roots.len(), 2);
        assert!(report.roots[0].ends_with("zeta"));
        assert_eq!(report.stats.total_projects, 2);
        assert_eq!(project(&report, "alpha").project_type, "python_module");
        assert_eq!(project(&report, "zeta").project_type, "js_module");
    }

    #[test]
    fn test_progress_milestones() {
        let temp = TempDir::new().unwrap();
        let root = workspace(&temp, "svc");
        write(&root, "Dockerfile", DOCKERFILE);
        write(&root, "api/app.py", "print('ok')\n");

        let events: Mutex<Vec<(f64, String)>> = Mutex::new(Vec::new());
        let callback = |fraction: f64, status: &str| {
            events.lock().unwrap().push((fraction, status.to_string()));
        };

        let config = AnalysisConfig::new(root).with_max_depth(1);
        DefaultAnalyzer::new()
            .unwrap()
            .analyze_with_progress(&config, Some(&callback as &ProgressCallback<'_>))
            .unwrap();

        let events = events.into_inner().unwrap();
        assert_eq!(events.first().map(|e| e.1.as_str()), Some("Analyzing svc"));
        assert_eq!(events.last(), Some(&(1.0, "Analysis complete".to_string())));
        assert!(events.iter().all(|(f, _)| (0.0..=1.0).contains(f)));
        for milestone in ["Generating reports", "Detecting microservices"] {
            assert!(events.iter().any(|(_, s)| s == milestone), "missing {}", milestone);
        }
    }

    #[test]
    fn test_parent_project_also_records_child_files() {
        let temp = TempDir::new().unwrap();
        let root = workspace(&temp, "suite");
        write(&root, "child/main.py", "print('child')\n");

        let report = analyze(&root, 1);

        let child = project(&report, "child");
        let suite = project(&report, "suite");
        assert_eq!(child.file_count, 1);
        assert_eq!(suite.file_count, 1);
        assert_eq!(child.files[0].relative_path_str(), "main.py");
        assert_eq!(suite.files[0].relative_path_str(), "child/main.py");
        assert_eq!(child.files[0].absolute_path, suite.files[0].absolute_path);
        assert_eq!(report.stats.total_files, 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_unreadable_directory_does_not_abort() {
        use std::os::unix::fs::PermissionsExt;

        let temp = TempDir::new().unwrap();
        let root = workspace(&temp, "mixed");
        write(&root, "api/app.py", "print('api')\n");
        write(&root, "locked/secret.py", "print('hidden')\n");

        let locked = root.join("locked");
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).unwrap();
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
            return;
        }

        let report = analyze(&root, 1);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();

        let names: Vec<&str> = report.projects.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["api", "mixed"]);
        assert!(report
            .errors
            .iter()
            .any(|e| e.kind == SoftErrorKind::Access && e.path.ends_with("locked")));
        assert!(project(&report, "mixed")
            .errors
            .iter()
            .any(|e| e.kind == SoftErrorKind::Access && e.path.ends_with("locked")));
        assert_eq!(project(&report, "mixed").file_count, 1);
    }

    #[test]
    fn test_microservice_pass_can_be_disabled() {
        let temp = TempDir::new().unwrap();
        let svc = workspace(&temp, "svc");
        write(&svc, "Dockerfile", DOCKERFILE);
        write(&svc, "deployment.yaml", DEPLOYMENT);

        let config = AnalysisConfig::new(svc).with_max_depth(0).with_microservices(false);
        let report = DefaultAnalyzer::new().unwrap().analyze(&config).unwrap();

        assert!(report.projects[0].microservice.is_none());
        assert!(report.relationships.is_empty());
        assert_eq!(report.stats.microservices_count, 0);
        assert!(serde_json::to_string(&report).is_ok());
    }
}
