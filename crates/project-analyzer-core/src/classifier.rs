//! Project verdicts from accumulated signals.
//!
//! [`ProjectClassifier::classify`] is a pure function of a [`ProjectRecord`]
//! snapshot: language counts, key files, framework scores and the
//! entry-point flag go in, a [`Verdict`] comes out.

use crate::models::{ConfidenceFactors, ConfidenceLabel, Language, ProjectRecord};
use crate::patterns::PatternRegistry;
use std::collections::BTreeMap;

/// A framework category must score above this to become a candidate.
pub const FRAMEWORK_THRESHOLD: f64 = 1.0;

/// Raw framework scores are divided by this before capping.
const FRAMEWORK_NORMALIZER: f64 = 3.0;

/// Highest confidence a framework verdict can reach.
const FRAMEWORK_CAP: f64 = 0.95;

const FALLBACK_CONFIDENCE: f64 = 0.4;
const UNKNOWN_CONFIDENCE: f64 = 0.2;

/// The derived fields of a classified project.
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub primary_language: Option<Language>,
    pub project_type: String,
    pub confidence: f64,
    pub confidence_label: ConfidenceLabel,
    pub factors: ConfidenceFactors,
}

impl Verdict {
    /// Copies the verdict into a record.
    pub fn apply_to(self, project: &mut ProjectRecord) {
        project.primary_language = self.primary_language;
        project.project_type = self.project_type;
        project.confidence = self.confidence;
        project.confidence_label = self.confidence_label;
        project.confidence_factors = self.factors;
    }
}

/// Picks the language bucket with the most files.
///
/// Ties go to the bucket listed first in [`Language::ALL`]; `None` when every
/// bucket is empty.
pub fn primary_language(counts: &BTreeMap<Language, usize>) -> Option<Language> {
    let mut best: Option<(Language, usize)> = None;
    for language in Language::ALL {
        let count = counts.get(&language).copied().unwrap_or(0);
        if count > best.map(|(_, c)| c).unwrap_or(0) {
            best = Some((language, count));
        }
    }
    best.map(|(language, _)| language)
}

/// Classifies projects against the general registry.
///
/// The registry supplies the tie-break order between framework categories.
#[derive(Debug, Clone, Copy)]
pub struct ProjectClassifier<'a> {
    registry: &'a PatternRegistry,
}

impl<'a> ProjectClassifier<'a> {
    pub fn new(registry: &'a PatternRegistry) -> Self {
        Self { registry }
    }

    /// Computes the verdict for a project.
    ///
    /// Candidates are considered in this order, the first strictly highest
    /// score winning:
    ///
    /// | Candidate | Condition | Score |
    /// |---|---|---|
    /// | `python_package` | `setup.py` or `pyproject.toml` key file | 0.9 |
    /// | `node_package` | `package.json` key file | 0.85 |
    /// | `microservice` | `Dockerfile` or `docker-compose.yml` key file | 0.7 |
    /// | `web_application` | markup files plus script files | 0.75 |
    /// | top framework | framework score above 1.0 | min(score / 3, 0.95) |
    /// | `python_script` | entry point in a Python project | 0.8 |
    ///
    /// Without any candidate, the type falls back to a language module
    /// (confidence 0.4) or `unknown` (confidence 0.2).
    pub fn classify(&self, project: &ProjectRecord) -> Verdict {
        let language = primary_language(&project.language_counts);
        let mut factors = ConfidenceFactors::default();
        let mut candidates: Vec<(String, f64)> = Vec::new();

        if project.has_key_file_named("setup.py") || project.has_key_file_named("pyproject.toml") {
            candidates.push(("python_package".to_string(), 0.9));
            factors.has_setup_manifest = true;
        }

        if project.has_key_file_named("package.json") {
            candidates.push(("node_package".to_string(), 0.85));
            factors.has_package_json = true;
        }

        if project.has_key_file_named("Dockerfile") || project.has_key_file_named("docker-compose.yml") {
            candidates.push(("microservice".to_string(), 0.7));
            factors.has_docker = true;
        }

        let scripts = project.language_count(Language::JavaScript)
            + project.language_count(Language::TypeScript);
        if project.language_count(Language::Html) > 0 && scripts > 0 {
            candidates.push(("web_application".to_string(), 0.75));
            factors.has_html_and_js = true;
        }

        if let Some((framework, score)) = self.registry.top_category(&project.framework_scores) {
            if score > FRAMEWORK_THRESHOLD {
                let normalized = (score / FRAMEWORK_NORMALIZER).min(FRAMEWORK_CAP);
                match candidates.iter_mut().find(|(name, _)| name.as_str() == framework) {
                    Some(existing) => existing.1 = normalized,
                    None => candidates.push((framework.to_string(), normalized)),
                }
                factors.framework_detected = Some(framework.to_string());
                factors.framework_score = Some(score);
            }
        }

        if project.has_entry_point && language == Some(Language::Python) {
            candidates.push(("python_script".to_string(), 0.8));
            factors.has_entry_point = true;
        }

        let mut winner: Option<(String, f64)> = None;
        for (name, score) in candidates {
            if score > winner.as_ref().map(|(_, s)| *s).unwrap_or(0.0) {
                winner = Some((name, score));
            }
        }

        let (project_type, confidence) = winner.unwrap_or_else(|| fallback(language));

        Verdict {
            primary_language: language,
            project_type,
            confidence,
            confidence_label: ConfidenceLabel::from_score(confidence),
            factors,
        }
    }
}

fn fallback(language: Option<Language>) -> (String, f64) {
    let module = match language {
        Some(Language::Python) => "python_module",
        Some(Language::JavaScript) | Some(Language::TypeScript) => "js_module",
        Some(Language::Java) => "java_module",
        _ => return ("unknown".to_string(), UNKNOWN_CONFIDENCE),
    };
    (module.to_string(), FALLBACK_CONFIDENCE)
}
