//! Command-line interface for the project analyzer.
//!
//! Analyzes one or more directory trees and prints the classified projects,
//! detected microservices and the relationships between them, either as
//! localized tables or as a JSON report.

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use project_analyzer_core::{
    l10n::Localizer, AnalysisConfig, AnalysisReport, AnalysisStats, DefaultAnalyzer,
    ProgressCallback, ProjectAnalyzer, ProjectRecord,
};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Project Analyzer - Classify projects and map microservice relationships
#[derive(Parser, Debug)]
#[command(
    name = "project-analyzer",
    version,
    about = "Classify the projects in a directory tree and map microservice relationships",
    long_about = None
)]
struct Cli {
    /// Root directories to analyze (can be specified multiple times)
    #[arg(
        short = 'r',
        long = "root",
        value_name = "PATH",
        help = "Root directory to analyze (default: current directory)"
    )]
    roots: Vec<PathBuf>,

    /// Additional ignore patterns (substring or glob)
    #[arg(
        short = 'i',
        long = "ignore",
        value_name = "PATTERN",
        help = "Additional pattern to ignore (can be repeated)"
    )]
    ignore: Vec<String>,

    /// How many directory levels below each root to consider as projects
    #[arg(
        short = 'd',
        long = "depth",
        value_name = "N",
        default_value_t = 3,
        help = "Maximum directory depth"
    )]
    max_depth: usize,

    /// Worker pool width
    #[arg(
        short = 'w',
        long = "workers",
        value_name = "N",
        default_value_t = 4,
        help = "Number of worker threads"
    )]
    workers: usize,

    /// Skip microservice detection and relationship mapping
    #[arg(long = "no-microservices", help = "Skip microservice detection")]
    no_microservices: bool,

    /// Ignore the usual personal folders of a home directory
    #[arg(
        long = "skip-home-dir",
        help = "Ignore personal folders (Downloads, Documents, ...)"
    )]
    skip_home_dir: bool,

    /// Follow symbolic links while walking
    #[arg(long = "follow-symlinks", help = "Follow symbolic links")]
    follow_symlinks: bool,

    /// Sorting profile for the project table
    #[arg(
        short = 's',
        long = "sort",
        value_enum,
        default_value_t = SortProfile::Name,
        help = "Sort projects by: name, type, confidence, or files"
    )]
    sort: SortProfile,

    /// Output as JSON instead of tables
    #[arg(short = 'j', long = "json", help = "Output the full report as JSON")]
    json: bool,

    /// Show detailed progress
    #[arg(short = 'v', long = "verbose", help = "Show verbose output")]
    verbose: bool,

    /// Locale for messages (e.g., en, de)
    #[arg(
        short = 'l',
        long = "locale",
        value_name = "LOCALE",
        help = "Locale for messages (e.g., en, de)"
    )]
    locale: Option<String>,
}

/// Sorting profiles for the project table
#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortProfile {
    /// Sort alphabetically by project name
    Name,
    /// Group by project type, then name
    Type,
    /// Highest confidence first
    Confidence,
    /// Most files first
    Files,
}

/// Folder names of a typical home directory that rarely hold projects.
const HOME_DIR_PATTERNS: &[&str] = &[
    "Downloads", "Documents", "Pictures", "Music", "Videos", "Movies", "Desktop", "Public",
    "Templates", "Library", "Applications", "OneDrive", "Dropbox", "Google Drive", "iCloud Drive",
    "snap", "Steam",
];

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let localizer = match &cli.locale {
        Some(locale) => {
            Localizer::new(locale).with_context(|| format!("Failed to load locale: {}", locale))?
        }
        None => Localizer::from_system()
            .or_else(|_| Localizer::new("en"))
            .context("Failed to load default locale")?,
    };

    let config = build_config(&cli)?;
    let analyzer = DefaultAnalyzer::new()
        .context("Failed to load pattern tables")?
        .with_verbose(cli.verbose);

    if !cli.json && cli.verbose {
        let count = config.root_paths.len().to_string();
        eprintln!("{}", localizer.get("analysis-started", Some(&[("count", &count)])));
        for root in &config.root_paths {
            let path = root.display().to_string();
            eprintln!(
                "{}",
                localizer.get("analysis-started-path", Some(&[("path", &path)]))
            );
        }
    }

    let show_progress = !cli.json && cli.verbose;
    let progress = |fraction: f64, status: &str| {
        if show_progress {
            eprintln!("[{:>3.0}%] {}", fraction * 100.0, status);
        }
    };

    let mut report = analyzer
        .analyze_with_progress(&config, Some(&progress as &ProgressCallback<'_>))
        .context("Failed to analyze projects")?;

    if cli.json {
        output_json(&report)?;
    } else {
        sort_projects(&mut report.projects, cli.sort);
        output_tables(&report, &localizer);
    }

    Ok(())
}

/// Installs the log subscriber: `RUST_LOG` if set, else `debug` with
/// `--verbose`, else `warn`. Logs go to stderr.
fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Builds an AnalysisConfig from CLI arguments
fn build_config(cli: &Cli) -> Result<AnalysisConfig> {
    let roots = if cli.roots.is_empty() {
        vec![std::env::current_dir().context("Could not determine current directory")?]
    } else {
        cli.roots.clone()
    };

    let mut ignores = cli.ignore.clone();
    if cli.skip_home_dir {
        ignores.extend(home_dir_patterns());
    }

    Ok(AnalysisConfig::default()
        .with_roots(roots)
        .with_extra_ignores(ignores)
        .with_max_depth(cli.max_depth)
        .with_max_workers(cli.workers)
        .with_follow_symlinks(cli.follow_symlinks)
        .with_microservices(!cli.no_microservices)
        .with_verbose(cli.verbose))
}

/// Personal folder names, plus whatever the platform reports for the
/// current user's media and document folders.
fn home_dir_patterns() -> Vec<String> {
    let mut patterns: Vec<String> = HOME_DIR_PATTERNS.iter().map(|p| p.to_string()).collect();

    let resolved = [
        dirs::download_dir(),
        dirs::document_dir(),
        dirs::picture_dir(),
        dirs::audio_dir(),
        dirs::video_dir(),
        dirs::desktop_dir(),
    ];
    for dir in resolved.iter().flatten() {
        if let Some(name) = dir.file_name() {
            let name = name.to_string_lossy().into_owned();
            if !patterns.contains(&name) {
                patterns.push(name);
            }
        }
    }

    patterns
}

/// Sorts projects according to the specified profile
fn sort_projects(projects: &mut [ProjectRecord], profile: SortProfile) {
    match profile {
        SortProfile::Name => {
            projects.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
        }
        SortProfile::Type => {
            projects.sort_by(|a, b| {
                a.project_type
                    .cmp(&b.project_type)
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
        SortProfile::Confidence => {
            projects.sort_by(|a, b| {
                b.confidence
                    .total_cmp(&a.confidence)
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
        SortProfile::Files => {
            projects.sort_by(|a, b| {
                b.file_count
                    .cmp(&a.file_count)
                    .then_with(|| a.name.cmp(&b.name))
            });
        }
    }
}

/// Outputs the report as JSON to stdout
fn output_json(report: &AnalysisReport) -> Result<()> {
    let json =
        serde_json::to_string_pretty(report).context("Failed to serialize report to JSON")?;
    println!("{}", json);
    Ok(())
}

/// Outputs the project table, microservices, relationships and a summary
fn output_tables(report: &AnalysisReport, localizer: &Localizer) {
    if report.projects.is_empty() {
        println!("{}", localizer.get("analysis-no-results", None));
        return;
    }

    output_project_table(&report.projects, localizer);

    if report.projects.iter().any(|p| p.microservice.is_some()) {
        println!();
        output_microservices(&report.projects, localizer);
        println!();
        output_relationships(report, localizer);
    }

    println!();
    output_summary(&report.stats, localizer);

    println!();
    let count = report.projects.len().to_string();
    let elapsed = report.elapsed_ms.to_string();
    println!(
        "{}",
        localizer.get(
            "analysis-complete",
            Some(&[("count", &count), ("elapsed", &elapsed)])
        )
    );

    let errors = report.stats.error_count + report.errors.len();
    if errors > 0 {
        let count = errors.to_string();
        println!("{}", localizer.get("analysis-errors", Some(&[("count", &count)])));
    }
}

fn output_project_table(projects: &[ProjectRecord], localizer: &Localizer) {
    let headers = [
        localizer.get("header-name", None),
        localizer.get("header-type", None),
        localizer.get("header-language", None),
        localizer.get("header-confidence", None),
        localizer.get("header-files", None),
        localizer.get("header-path", None),
    ];

    let name_width = column_width(projects.iter().map(|p| p.name.as_str()), &headers[0], 30);
    let type_width = column_width(projects.iter().map(|p| p.project_type.as_str()), &headers[1], 20);
    let language_width = column_width(
        projects.iter().map(|p| p.primary_language_name()),
        &headers[2],
        12,
    );
    let confidence_width = headers[3].chars().count().max(16);
    let files_width = headers[4].chars().count().max(6);

    println!(
        "{:<name_width$}  {:<type_width$}  {:<language_width$}  {:<confidence_width$}  {:>files_width$}  {}",
        headers[0], headers[1], headers[2], headers[3], headers[4], headers[5],
    );
    println!(
        "{}",
        "=".repeat(name_width + type_width + language_width + confidence_width + files_width + 20)
    );

    for project in projects {
        let confidence = format!(
            "{:.2} ({})",
            project.confidence,
            project.confidence_label.as_str()
        );
        println!(
            "{:<name_width$}  {:<type_width$}  {:<language_width$}  {:<confidence_width$}  {:>files_width$}  {}",
            truncate(&project.name, name_width),
            truncate(&project.project_type, type_width),
            truncate(project.primary_language_name(), language_width),
            confidence,
            project.file_count,
            display_path(&project.path),
        );
    }
}

fn output_microservices(projects: &[ProjectRecord], localizer: &Localizer) {
    let services: Vec<&ProjectRecord> = projects.iter().filter(|p| p.is_microservice()).collect();
    println!(
        "{} ({})",
        localizer.get("section-microservices", None),
        services.len()
    );

    if services.is_empty() {
        println!("  {}", localizer.get("microservices-none", None));
        return;
    }

    for project in services {
        let Some(profile) = &project.microservice else {
            continue;
        };
        let endpoints = profile.endpoints.len().to_string();
        let calls = profile.calls.len().to_string();
        println!(
            "  {} [{:.2}]",
            localizer.get(
                "microservice-summary",
                Some(&[
                    ("name", &project.name),
                    ("communication", &profile.primary_communication),
                    ("endpoints", &endpoints),
                    ("calls", &calls),
                ])
            ),
            profile.probability
        );
    }
}

fn output_relationships(report: &AnalysisReport, localizer: &Localizer) {
    println!(
        "{} ({})",
        localizer.get("section-relationships", None),
        report.relationships.len()
    );

    if report.relationships.is_empty() {
        println!("  {}", localizer.get("relationships-none", None));
        return;
    }

    for relationship in &report.relationships {
        println!(
            "  {} -> {} [{}] {}",
            relationship.source,
            relationship.target,
            relationship.relationship_type,
            relationship.url
        );
    }
}

fn output_summary(stats: &AnalysisStats, localizer: &Localizer) {
    println!("{}", localizer.get("section-statistics", None));
    let sections = [
        ("stats-types", &stats.project_types),
        ("stats-languages", &stats.languages),
        ("stats-frameworks", &stats.frameworks),
    ];
    for (message, counts) in sections {
        if counts.is_empty() {
            continue;
        }
        let top: Vec<String> = AnalysisStats::top(counts, 5)
            .into_iter()
            .map(|(name, count)| format!("{} ({})", name, count))
            .collect();
        println!("  {}: {}", localizer.get(message, None), top.join(", "));
    }
}

/// Widest value in a column, at least the header, at most `cap`.
fn column_width<'a>(values: impl Iterator<Item = &'a str>, header: &str, cap: usize) -> usize {
    values
        .map(|v| v.chars().count())
        .max()
        .unwrap_or(0)
        .max(header.chars().count())
        .min(cap)
}

/// Shows paths below the home directory as `~/...`.
fn display_path(path: &Path) -> String {
    match dirs::home_dir().and_then(|home| path.strip_prefix(home).ok().map(Path::to_path_buf)) {
        Some(relative) if relative.as_os_str().is_empty() => "~".to_string(),
        Some(relative) => format!("~/{}", relative.display()),
        None => path.display().to_string(),
    }
}

/// Truncates a string to a maximum width, adding "..." if truncated.
/// Counts characters, not bytes.
fn truncate(s: &str, max_width: usize) -> String {
    let char_count = s.chars().count();

    if char_count <= max_width {
        s.to_string()
    } else if max_width <= 3 {
        "...".to_string()
    } else {
        s.chars().take(max_width - 3).collect::<String>() + "..."
    }
}
