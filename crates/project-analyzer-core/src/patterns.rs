//! Weighted rule tables used to turn files and file contents into scores.
//!
//! Rules are plain data. The built-in tables ship as JSON under `patterns/`
//! and are embedded at compile time, but any table with the same shape can be
//! loaded with [`PatternRegistry::from_json_str`] and handed to the analyzer,
//! which makes the matching engine testable independently of rule content.
//!
//! Two registries exist side by side:
//!
//! - the general registry (frameworks, libraries, tooling), consulted while
//!   directories are inventoried and file contents are read
//! - the microservice registries ([`MicroservicePatterns`]), consulted by the
//!   microservice pass only

use crate::error::{Error, Result};
use crate::models::{add_score, Scores};
use globset::{Glob, GlobSet, GlobSetBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};
use std::path::Path;

const FRAMEWORKS_JSON: &str = include_str!("../patterns/frameworks.json");
const MICROSERVICES_JSON: &str = include_str!("../patterns/microservices.json");

/// One category of a rule table.
///
/// Every non-empty list is an independent signal source. When a file triggers
/// a source, the category receives `weight` once for that file, no matter how
/// many entries of the list matched.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PatternRule {
    /// Category identifier, e.g. `"react"` or `"docker"`.
    pub name: String,

    /// File name or path patterns.
    ///
    /// Entries containing `*`, `?` or `[` are globs matched against the file
    /// name and the project-relative path. Other entries match when they occur
    /// anywhere in the project-relative path.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub files: Vec<String>,

    /// Module names matched exactly or as a dotted prefix of a declared import.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,

    /// Literal substrings searched in file contents.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub content_patterns: Vec<String>,

    /// Package names matched against manifest dependency declarations.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<String>,

    pub weight: f64,
}

/// File patterns of a rule, split by how they are matched.
#[derive(Debug, Clone)]
struct FileMatcher {
    globs: Option<GlobSet>,
    literals: Vec<String>,
}

impl FileMatcher {
    fn compile(patterns: &[String]) -> Result<Self> {
        let mut builder = GlobSetBuilder::new();
        let mut has_globs = false;
        let mut literals = Vec::new();

        for pattern in patterns {
            if is_glob(pattern) {
                let glob = Glob::new(pattern).map_err(|e| Error::invalid_pattern(pattern, e))?;
                builder.add(glob);
                has_globs = true;
            } else {
                literals.push(pattern.clone());
            }
        }

        let globs = if has_globs {
            Some(
                builder
                    .build()
                    .map_err(|e| Error::invalid_pattern(patterns.join(", "), e))?,
            )
        } else {
            None
        };

        Ok(Self { globs, literals })
    }

    fn is_match(&self, file_name: &str, relative_path: &str) -> bool {
        if let Some(globs) = &self.globs {
            if globs.is_match(file_name) || globs.is_match(relative_path) {
                return true;
            }
        }
        self.literals
            .iter()
            .any(|literal| relative_path.contains(literal.as_str()))
    }
}

/// Returns true if the pattern uses glob syntax.
pub(crate) fn is_glob(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: PatternRule,
    files: FileMatcher,
    dependencies: Vec<String>,
}

/// An ordered, read-only table of [`PatternRule`]s.
///
/// The table order is significant: it is the tie-break order whenever the
/// highest-scoring category of a table has to be picked.
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    rules: Vec<CompiledRule>,
}

impl PatternRegistry {
    /// Builds a registry from rules, compiling their file globs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Registry`] for empty or duplicate category names and
    /// non-positive weights, and [`Error::InvalidPattern`] for broken globs.
    pub fn from_rules(rules: Vec<PatternRule>) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut compiled = Vec::with_capacity(rules.len());

        for rule in rules {
            if rule.name.trim().is_empty() {
                return Err(Error::registry("category name must not be empty"));
            }
            if !seen.insert(rule.name.clone()) {
                return Err(Error::registry(format!(
                    "duplicate category '{}'",
                    rule.name
                )));
            }
            if !(rule.weight.is_finite() && rule.weight > 0.0) {
                return Err(Error::registry(format!(
                    "category '{}' has invalid weight {}",
                    rule.name, rule.weight
                )));
            }

            let files = FileMatcher::compile(&rule.files)?;
            let dependencies = rule.dependencies.iter().map(|d| d.to_lowercase()).collect();
            compiled.push(CompiledRule {
                rule,
                files,
                dependencies,
            });
        }

        Ok(Self { rules: compiled })
    }

    /// Parses a JSON array of rules.
    ///
    /// # Example
    ///
    /// ```
    /// use project_analyzer_core::PatternRegistry;
    ///
    /// let registry = PatternRegistry::from_json_str(
    ///     r#"[{"name": "docker", "files": ["Dockerfile"], "weight": 1.0}]"#,
    /// )?;
    /// assert_eq!(registry.len(), 1);
    /// # Ok::<(), project_analyzer_core::Error>(())
    /// ```
    pub fn from_json_str(json: &str) -> Result<Self> {
        let rules: Vec<PatternRule> = serde_json::from_str(json)?;
        Self::from_rules(rules)
    }

    /// The built-in general table: web, frontend, data science, testing,
    /// database, API, DevOps and build tooling categories.
    pub fn frameworks() -> Result<Self> {
        Self::from_json_str(FRAMEWORKS_JSON)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rules in table order.
    pub fn rules(&self) -> impl Iterator<Item = &PatternRule> {
        self.rules.iter().map(|compiled| &compiled.rule)
    }

    /// Looks up a rule by category name.
    pub fn get(&self, name: &str) -> Option<&PatternRule> {
        self.rules().find(|rule| rule.name == name)
    }

    /// Category names in table order.
    pub fn category_names(&self) -> Vec<&str> {
        self.rules().map(|rule| rule.name.as_str()).collect()
    }

    /// The highest-scoring category, ties going to the earliest in table order.
    ///
    /// Categories missing from `scores` or scoring zero are never picked.
    pub fn top_category<'s>(&self, scores: &'s Scores) -> Option<(&'s str, f64)> {
        let mut best: Option<(&'s str, f64)> = None;
        for rule in self.rules() {
            if let Some((name, score)) = scores.get_key_value(&rule.name) {
                if *score > best.map(|(_, s)| s).unwrap_or(0.0) {
                    best = Some((name.as_str(), *score));
                }
            }
        }
        best
    }

    /// Scores a file by its name and project-relative path.
    pub fn score_path(&self, relative_path: &Path, scores: &mut Scores) {
        let relative = relative_path.to_string_lossy().replace('\\', "/");
        let file_name = relative_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        for compiled in &self.rules {
            if compiled.files.is_match(&file_name, &relative) {
                add_score(scores, &compiled.rule.name, compiled.rule.weight);
            }
        }
    }

    /// Scores a file's text against every category's content substrings.
    pub fn score_content(&self, content: &str, scores: &mut Scores) {
        for compiled in &self.rules {
            let rule = &compiled.rule;
            if rule
                .content_patterns
                .iter()
                .any(|pattern| content.contains(pattern.as_str()))
            {
                add_score(scores, &rule.name, rule.weight);
            }
        }
    }

    /// Scores a file's declared imports.
    ///
    /// An import matches a rule entry when it is equal to it or starts with
    /// the entry followed by a dot (`django.urls` matches `django`).
    pub fn score_imports(&self, imports: &BTreeSet<String>, scores: &mut Scores) {
        if imports.is_empty() {
            return;
        }
        for compiled in &self.rules {
            let rule = &compiled.rule;
            let matched = rule.imports.iter().any(|wanted| {
                imports.iter().any(|module| {
                    module == wanted
                        || (module.starts_with(wanted.as_str())
                            && module[wanted.len()..].starts_with('.'))
                })
            });
            if matched {
                add_score(scores, &rule.name, rule.weight);
            }
        }
    }

    /// Scores the dependency names declared by a manifest.
    ///
    /// Names are compared case-insensitively.
    pub fn score_dependencies(&self, dependencies: &BTreeSet<String>, scores: &mut Scores) {
        if dependencies.is_empty() {
            return;
        }
        let declared: BTreeSet<String> = dependencies.iter().map(|d| d.to_lowercase()).collect();
        for compiled in &self.rules {
            if compiled.dependencies.iter().any(|dep| declared.contains(dep)) {
                add_score(scores, &compiled.rule.name, compiled.rule.weight);
            }
        }
    }
}

/// The two tables consulted by the microservice pass.
#[derive(Debug, Clone)]
pub struct MicroservicePatterns {
    /// Deployability signals: containers, orchestration, gateways, brokers...
    pub indicators: PatternRegistry,
    /// Communication styles: REST, gRPC, GraphQL, events, SOAP, WebSocket.
    pub communication: PatternRegistry,
}

#[derive(Deserialize)]
struct MicroserviceTables {
    indicators: Vec<PatternRule>,
    communication: Vec<PatternRule>,
}

impl MicroservicePatterns {
    /// Parses a JSON object with `indicators` and `communication` rule arrays.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let tables: MicroserviceTables = serde_json::from_str(json)?;
        Ok(Self {
            indicators: PatternRegistry::from_rules(tables.indicators)?,
            communication: PatternRegistry::from_rules(tables.communication)?,
        })
    }

    /// The built-in microservice tables.
    pub fn builtin() -> Result<Self> {
        Self::from_json_str(MICROSERVICES_JSON)
    }
}

/// Every table an analysis run needs, loaded once and passed explicitly.
#[derive(Debug, Clone)]
pub struct Registries {
    pub frameworks: PatternRegistry,
    pub microservices: MicroservicePatterns,
}

impl Registries {
    /// Loads the built-in tables.
    ///
    /// # Errors
    ///
    /// Only fails if the embedded tables are malformed.
    pub fn builtin() -> Result<Self> {
        Ok(Self {
            frameworks: PatternRegistry::frameworks()?,
            microservices: MicroservicePatterns::builtin()?,
        })
    }
}
