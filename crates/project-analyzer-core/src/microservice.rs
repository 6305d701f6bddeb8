//! Microservice scoring, endpoint extraction and call extraction.
//!
//! The detector runs once per analysis run over the classified projects of a
//! root. Each project is handled by its own task and only ever touches its
//! own record, so the pass needs no locking.

use crate::analyzer::ProgressCallback;
use crate::extraction::{extract_calls, extract_endpoints, CALL_EXTENSIONS, ENDPOINT_EXTENSIONS};
use crate::models::{merge_scores, MicroserviceProfile, ProjectRecord, Scores, SoftError, SoftErrorKind};
use crate::patterns::{MicroservicePatterns, PatternRegistry};
use crate::signals::{read_lossy, MAX_CONTENT_SIZE};
use rayon::prelude::*;
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{debug, info};

/// Projects with fewer files than this need stronger evidence.
pub const SMALL_PROJECT_FILES: usize = 5;

const THRESHOLD: f64 = 2.0;
const SMALL_PROJECT_THRESHOLD: f64 = 3.0;
const PROBABILITY_NORMALIZER: f64 = 5.0;
const PROBABILITY_CAP: f64 = 0.95;

/// Returns `(is_microservice, probability)` for an indicator total.
///
/// # Example
///
/// ```
/// use project_analyzer_core::microservice::verdict;
///
/// assert_eq!(verdict(3.5, 3), (true, 0.7));
/// assert_eq!(verdict(2.5, 3), (false, 0.5));
/// assert_eq!(verdict(2.5, 12), (true, 0.5));
/// ```
pub fn verdict(total_score: f64, file_count: usize) -> (bool, f64) {
    let threshold = if file_count < SMALL_PROJECT_FILES {
        SMALL_PROJECT_THRESHOLD
    } else {
        THRESHOLD
    };
    let probability = (total_score / PROBABILITY_NORMALIZER).min(PROBABILITY_CAP);
    (total_score > threshold, probability)
}

/// The highest-scoring communication category, or `"unknown"`.
pub fn primary_communication(registry: &PatternRegistry, scores: &Scores) -> String {
    registry
        .top_category(scores)
        .map(|(name, _)| name.to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// Runs the microservice pass over classified projects.
#[derive(Debug, Clone, Copy)]
pub struct MicroserviceDetector<'a> {
    patterns: &'a MicroservicePatterns,
}

impl<'a> MicroserviceDetector<'a> {
    pub fn new(patterns: &'a MicroservicePatterns) -> Self {
        Self { patterns }
    }

    /// Builds the microservice profile of one project.
    ///
    /// Files that cannot be read are reported in the returned error list and
    /// contribute nothing.
    pub fn profile(&self, project: &ProjectRecord) -> (MicroserviceProfile, Vec<SoftError>) {
        let mut indicator_scores = Scores::new();
        let mut communication_scores = Scores::new();
        let mut endpoints = BTreeSet::new();
        let mut calls = BTreeSet::new();
        let mut errors = Vec::new();

        for file in &project.files {
            let mut indicators = Scores::new();
            let mut communication = Scores::new();

            self.patterns
                .indicators
                .score_path(&file.relative_path, &mut indicators);
            self.patterns
                .communication
                .score_path(&file.relative_path, &mut communication);
            self.patterns
                .indicators
                .score_imports(&file.imports, &mut indicators);
            self.patterns
                .communication
                .score_imports(&file.imports, &mut communication);

            if file.size <= MAX_CONTENT_SIZE {
                match read_lossy(&file.absolute_path) {
                    Ok(content) => {
                        self.patterns
                            .indicators
                            .score_content(&content, &mut indicators);
                        self.patterns
                            .communication
                            .score_content(&content, &mut communication);

                        let extension = file.extension().unwrap_or_default();
                        if ENDPOINT_EXTENSIONS.contains(&extension.as_str()) {
                            endpoints.extend(extract_endpoints(&file.name, &content));
                        }
                        if CALL_EXTENSIONS.contains(&extension.as_str()) {
                            calls.extend(extract_calls(&file.name, &content));
                        }
                    }
                    Err(err) => {
                        debug!(path = %file.absolute_path.display(), error = %err, "Skipping unreadable file");
                        errors.push(SoftError::new(
                            &file.absolute_path,
                            SoftErrorKind::Extraction,
                            err.to_string(),
                        ));
                    }
                }
            }

            merge_scores(&mut indicator_scores, &indicators);
            merge_scores(&mut communication_scores, &communication);
        }

        let total_score: f64 = indicator_scores.values().sum();
        let (is_microservice, probability) = verdict(total_score, project.file_count);
        let primary = primary_communication(&self.patterns.communication, &communication_scores);

        let profile = MicroserviceProfile {
            indicator_scores,
            communication_scores,
            total_score,
            is_microservice,
            probability,
            primary_communication: primary,
            endpoints: endpoints.into_iter().collect(),
            calls: calls.into_iter().collect(),
        };

        (profile, errors)
    }

    /// Profiles every project in parallel on the current rayon pool.
    ///
    /// Progress is reported as the fraction of projects done, from whichever
    /// worker finishes a project.
    pub fn detect(
        &self,
        projects: &mut [ProjectRecord],
        progress: Option<&ProgressCallback<'_>>,
    ) {
        let total = projects.len();
        let done = AtomicUsize::new(0);

        projects.par_iter_mut().for_each(|project| {
            let (profile, errors) = self.profile(project);
            if profile.is_microservice {
                debug!(
                    project = %project.name,
                    score = profile.total_score,
                    communication = %profile.primary_communication,
                    "Detected microservice"
                );
            }
            project.microservice = Some(profile);
            project.errors.extend(errors);

            let finished = done.fetch_add(1, Ordering::SeqCst) + 1;
            if let Some(callback) = progress {
                callback(
                    finished as f64 / total as f64,
                    &format!("Analyzing {} for microservice patterns", project.name),
                );
            }
        });

        let count = projects.iter().filter(|p| p.is_microservice()).count();
        info!(projects = total, microservices = count, "Microservice detection complete");
    }
}
