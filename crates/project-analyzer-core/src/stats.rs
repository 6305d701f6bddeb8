//! Aggregate statistics over analyzed projects.

use crate::classifier::FRAMEWORK_THRESHOLD;
use crate::models::{ProjectRecord, Relationship};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// Counts rolled up from a project sequence.
///
/// Pure aggregation: recomputing it over the same projects always yields the
/// same value.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AnalysisStats {
    pub total_projects: usize,
    pub total_files: usize,
    /// Projects per project type.
    pub project_types: BTreeMap<String, usize>,
    /// Projects per primary language (`"unknown"` included).
    pub languages: BTreeMap<String, usize>,
    /// Projects whose score for a framework category exceeds 1.0.
    pub frameworks: BTreeMap<String, usize>,
    /// Projects per confidence label.
    pub confidence_levels: BTreeMap<String, usize>,
    pub microservices_count: usize,
    /// Projects per primary communication style, microservices only.
    pub communication_styles: BTreeMap<String, usize>,
    /// Edges per relationship type.
    pub relationship_types: BTreeMap<String, usize>,
    /// Projects containing each key file name.
    pub key_files_frequency: BTreeMap<String, usize>,
    /// Files per extension, summed across projects.
    pub file_extensions: BTreeMap<String, usize>,
    /// Soft errors recorded on projects.
    pub error_count: usize,
}

impl AnalysisStats {
    /// Aggregates over projects and the relationships between them.
    pub fn from_projects(projects: &[ProjectRecord], relationships: &[Relationship]) -> Self {
        let mut stats = AnalysisStats {
            total_projects: projects.len(),
            ..Default::default()
        };

        for project in projects {
            stats.total_files += project.file_count;
            stats.error_count += project.errors.len();
            bump(&mut stats.project_types, &project.project_type);
            bump(&mut stats.languages, project.primary_language_name());
            bump(&mut stats.confidence_levels, project.confidence_label.as_str());

            for (framework, score) in &project.framework_scores {
                if *score > FRAMEWORK_THRESHOLD {
                    bump(&mut stats.frameworks, framework);
                }
            }

            for key_file in &project.key_files {
                if let Some(name) = Path::new(key_file).file_name() {
                    bump(&mut stats.key_files_frequency, &name.to_string_lossy());
                }
            }

            for (extension, count) in &project.file_extensions {
                *stats.file_extensions.entry(extension.clone()).or_insert(0) += count;
            }

            if let Some(profile) = project.microservice.as_ref().filter(|p| p.is_microservice) {
                stats.microservices_count += 1;
                bump(&mut stats.communication_styles, &profile.primary_communication);
            }
        }

        for relationship in relationships {
            bump(&mut stats.relationship_types, relationship.relationship_type.as_str());
        }

        stats
    }

    /// The most frequent entries of a count map, highest first, ties by name.
    pub fn top(counts: &BTreeMap<String, usize>, limit: usize) -> Vec<(&str, usize)> {
        let mut entries: Vec<(&str, usize)> = counts.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        entries.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        entries.truncate(limit);
        entries
    }
}

fn bump(counts: &mut BTreeMap<String, usize>, key: &str) {
    *counts.entry(key.to_string()).or_insert(0) += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{add_score, ConfidenceLabel, Language, MicroserviceProfile, RelationshipType};
    use std::path::PathBuf;

    fn project(name: &str, project_type: &str, language: Option<Language>) -> ProjectRecord {
        let mut p = ProjectRecord::new(name, format!("/p/{}", name));
        p.project_type = project_type.to_string();
        p.primary_language = language;
        p
    }

    #[test]
    fn test_empty() {
        let stats = AnalysisStats::from_projects(&[], &[]);
        assert_eq!(stats, AnalysisStats::default());
    }

    #[test]
    fn test_rollup() {
        let mut web = project("web", "react", Some(Language::JavaScript));
        web.file_count = 10;
        web.confidence_label = ConfidenceLabel::VeryHigh;
        add_score(&mut web.framework_scores, "react", 2.7);
        add_score(&mut web.framework_scores, "jquery", 0.6);
        web.key_files = vec![PathBuf::from("package.json"), PathBuf::from("src/index.js")];
        web.file_extensions.insert(".js".to_string(), 8);

        let mut api = project("api", "flask", Some(Language::Python));
        api.file_count = 4;
        api.key_files = vec![PathBuf::from("app.py"), PathBuf::from("sub/package.json")];
        api.file_extensions.insert(".py".to_string(), 3);
        api.file_extensions.insert(".js".to_string(), 1);
        api.microservice = Some(MicroserviceProfile {
            is_microservice: true,
            primary_communication: "rest_api".to_string(),
            ..Default::default()
        });

        let misc = project("misc", "unknown", None);

        let relationship = Relationship {
            source: "api".to_string(),
            target: "web".to_string(),
            relationship_type: RelationshipType::Rest,
            url: "http://web/api".to_string(),
            file: "client.py".to_string(),
        };

        let stats = AnalysisStats::from_projects(&[web, api, misc], &[relationship]);

        assert_eq!(stats.total_projects, 3);
        assert_eq!(stats.total_files, 14);
        assert_eq!(stats.languages.get("unknown"), Some(&1));
        assert_eq!(stats.languages.get("python"), Some(&1));
        assert_eq!(stats.frameworks.get("react"), Some(&1));
        assert!(stats.frameworks.get("jquery").is_none());
        assert_eq!(stats.confidence_levels.get("Very High"), Some(&1));
        assert_eq!(stats.confidence_levels.get("Very Low"), Some(&2));
        assert_eq!(stats.microservices_count, 1);
        assert_eq!(stats.communication_styles.get("rest_api"), Some(&1));
        assert_eq!(stats.relationship_types.get("REST"), Some(&1));
        assert_eq!(stats.key_files_frequency.get("package.json"), Some(&2));
        assert_eq!(stats.file_extensions.get(".js"), Some(&9));
    }

    #[test]
    fn test_top_entries() {
        let mut counts = BTreeMap::new();
        counts.insert("b".to_string(), 2);
        counts.insert("a".to_string(), 2);
        counts.insert("c".to_string(), 5);
        assert_eq!(AnalysisStats::top(&counts, 2), vec![("c", 5), ("a", 2)]);
    }
}
