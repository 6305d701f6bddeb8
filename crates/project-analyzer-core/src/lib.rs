//! # project-analyzer-core
//!
//! A library for classifying the projects in a directory tree and mapping the
//! relationships between the microservices among them.
//!
//! ## Features
//!
//! - **Parallel analysis** of directory trees with ignore, size and depth policy
//! - **Weighted heuristic classification** of language, project type and
//!   framework, with a confidence score and label
//! - **Microservice detection** from container, orchestration and
//!   communication-style signals
//! - **Endpoint and outbound-call extraction** for common web frameworks and
//!   HTTP clients
//! - **Service relationship graph** built from fuzzy URL-to-service matching
//! - **Localization support** via Fluent (currently English and German)
//! - **JSON serialization** for all data structures
//!
//! ## Quick Start
//!
//! ```no_run
//! use project_analyzer_core::{AnalysisConfig, DefaultAnalyzer, ProjectAnalyzer};
//! use std::path::PathBuf;
//!
//! let config = AnalysisConfig::new(PathBuf::from("/home/user/projects")).with_max_depth(2);
//!
//! let analyzer = DefaultAnalyzer::new()?;
//! let report = analyzer.analyze(&config)?;
//!
//! for project in &report.projects {
//!     println!("{}: {} ({:.2})", project.name, project.project_type, project.confidence);
//! }
//! for edge in &report.relationships {
//!     println!("{} -> {} [{}]", edge.source, edge.target, edge.relationship_type);
//! }
//! # Ok::<(), project_analyzer_core::Error>(())
//! ```
//!
//! ## Architecture
//!
//! The library is organized into several modules:
//!
//! - [`models`] - Core data structures (ProjectRecord, FileRecord, Relationship, etc.)
//! - [`patterns`] - Weighted rule tables for frameworks and microservice signals
//! - [`walker`] - Directory discovery, file inventory and ignore policy
//! - [`signals`] - Per-file content analysis
//! - [`classifier`] - Project verdicts from accumulated signals
//! - [`extraction`] - Endpoint and outbound-call pattern families
//! - [`microservice`] - Microservice scoring
//! - [`service_graph`] - Service map and relationship resolution
//! - [`stats`] - Aggregate statistics
//! - [`analyzer`] - Analyzer trait and default implementation
//! - [`error`] - Custom error types
//! - [`l10n`] - Localization utilities
//!
//! ## CLI Binary
//!
//! This crate also provides a `project-analyzer` binary for command-line usage.
//! See the binary's `--help` output for details.

// Module declarations
pub mod analyzer;
pub mod classifier;
pub mod error;
pub mod extraction;
pub mod l10n;
pub mod microservice;
pub mod models;
pub mod patterns;
pub mod service_graph;
pub mod signals;
pub mod stats;
pub mod walker;

// Re-export commonly used types for convenience
pub use analyzer::{AnalysisReport, DefaultAnalyzer, ProgressCallback, ProjectAnalyzer};
pub use error::{Error, Result};
pub use models::{
    AnalysisConfig, ConfidenceLabel, EndpointKind, FileRecord, HttpMethod, Language,
    MicroserviceProfile, ProjectRecord, Relationship, RelationshipType, ServiceCall,
    ServiceEndpoint, SoftError, SoftErrorKind,
};
pub use patterns::{MicroservicePatterns, PatternRegistry, PatternRule, Registries};
pub use stats::AnalysisStats;

/// Library version, derived from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_is_set() {
        assert!(!VERSION.is_empty());
        assert_eq!(NAME, "project-analyzer-core");
    }
}
