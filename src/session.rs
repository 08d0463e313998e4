//! Session state management for one decision
//!
//! A [`DecisionSession`] drives a single elicitation from factor collection
//! to a ranked outcome through discrete calls, independent of any UI
//! technology: collect factors, freeze the shape, answer one pairwise
//! question at a time, watch consistency, aggregate. The session never
//! retries an inconsistent judgment set on its own — re-elicitation is
//! entirely caller-driven.
//!
//! Sessions serialize to JSON (with a schema version check on load) so an
//! elicitation can be paused and resumed.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[cfg(feature = "checkpoint")]
use std::fs::File;
#[cfg(feature = "checkpoint")]
use std::io::{BufReader, BufWriter};
#[cfg(feature = "checkpoint")]
use std::path::Path;

use crate::error::{AhpResult, HierarchyError, SessionError};
use crate::hierarchy::Hierarchy;
use crate::judgment::Judgment;

/// Current session format version
pub const SESSION_VERSION: u32 = 1;

/// Phase of the elicitation state machine
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Factors are still being declared; the hierarchy shape is open
    CollectingFactors,
    /// Matrices exist and judgments are being gathered
    Eliciting,
    /// Composite priorities have been computed for the current judgments
    Ranked,
}

/// One pairwise question for the presentation layer to ask
///
/// Identifies the matrix by `(level, parent)` and the pair by the item
/// indices within that matrix, with factor names attached so the collaborator
/// can phrase the question without further lookups.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PairPrompt {
    /// Level of the matrix being elicited
    pub level: usize,
    /// Parent index of the matrix being elicited
    pub parent: usize,
    /// Row index of the pair's first item
    pub first: usize,
    /// Column index of the pair's second item
    pub second: usize,
    /// Name of the first item
    pub first_name: String,
    /// Name of the second item
    pub second_name: String,
    /// Name of the parent factor the comparison is made under, if any
    pub parent_name: Option<String>,
}

/// Statistics about elicitation coverage in a session
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct CoverageStats {
    /// Total number of comparison matrices
    pub matrix_count: usize,
    /// Matrices with every pair judged
    pub fully_judged_matrices: usize,
    /// Matrices currently passing the consistency check
    pub consistent_matrices: usize,
    /// Unordered pairs judged so far, across all matrices
    pub judged_pairs: usize,
    /// Unordered pairs in total, across all matrices
    pub total_pairs: usize,
}

impl CoverageStats {
    /// Fraction of pairs judged (1.0 when there is nothing to judge)
    pub fn pair_coverage(&self) -> f64 {
        if self.total_pairs == 0 {
            1.0
        } else {
            self.judged_pairs as f64 / self.total_pairs as f64
        }
    }

    /// Whether every matrix is fully judged
    pub fn is_complete(&self) -> bool {
        self.fully_judged_matrices == self.matrix_count
    }
}

/// One bottom-level factor with its composite weight, for display
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedAlternative {
    /// Position in the bottom level's factor list
    pub index: usize,
    /// Factor name
    pub name: String,
    /// Composite priority weight
    pub weight: f64,
}

/// Result of aggregating a fully elicited, consistent hierarchy
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RankedOutcome {
    /// Composite weights in bottom-level factor order, summing to 1
    pub weights: Vec<f64>,
    /// The same alternatives sorted by descending weight, for display only
    pub ranking: Vec<RankedAlternative>,
}

impl RankedOutcome {
    /// The top-ranked alternative, if any
    pub fn best(&self) -> Option<&RankedAlternative> {
        self.ranking.first()
    }
}

/// Complete state of one decision's elicitation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionSession {
    /// Schema version for forward compatibility
    version: u32,
    hierarchy: Hierarchy,
    phase: SessionPhase,
    /// Total judgments applied, re-judgments included
    judgments_applied: usize,
    /// Custom session metadata
    metadata: HashMap<String, String>,
}

impl DecisionSession {
    /// Create a session for a hierarchy with the given number of levels
    pub fn new(levels: usize) -> AhpResult<Self> {
        Ok(Self {
            version: SESSION_VERSION,
            hierarchy: Hierarchy::new(levels)?,
            phase: SessionPhase::CollectingFactors,
            judgments_applied: 0,
            metadata: HashMap::new(),
        })
    }

    /// Current phase of the state machine
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    /// Read access to the underlying hierarchy
    pub fn hierarchy(&self) -> &Hierarchy {
        &self.hierarchy
    }

    /// Total judgments applied so far, re-judgments included
    pub fn judgments_applied(&self) -> usize {
        self.judgments_applied
    }

    /// Declare a factor while the shape is still open
    pub fn add_factor(&mut self, level: usize, name: impl Into<String>) -> AhpResult<usize> {
        self.hierarchy.add_factor(level, name)
    }

    /// Freeze the hierarchy shape and enter the eliciting phase
    pub fn begin_elicitation(&mut self) -> AhpResult<()> {
        self.hierarchy.make_matrices()?;
        self.phase = SessionPhase::Eliciting;
        Ok(())
    }

    /// The next unjudged pair, scanning levels, then parents, then pairs
    ///
    /// Returns `None` before matrices exist and once every pair is judged.
    pub fn next_prompt(&self) -> Option<PairPrompt> {
        for (level, parent) in self.matrix_coords() {
            let matrix = self.hierarchy.matrix(level, parent).ok()?;
            if let Some(&(first, second)) = matrix.unjudged_pairs().first() {
                let first_name = self.hierarchy.factor(level, first).ok()?.name.clone();
                let second_name = self.hierarchy.factor(level, second).ok()?.name.clone();
                let parent_name = if level > 0 {
                    Some(self.hierarchy.factor(level - 1, parent).ok()?.name.clone())
                } else {
                    None
                };
                return Some(PairPrompt {
                    level,
                    parent,
                    first,
                    second,
                    first_name,
                    second_name,
                    parent_name,
                });
            }
        }
        None
    }

    /// Apply a verbal-scale judgment to one pair
    ///
    /// Returns whether the affected matrix is consistent with the judgment
    /// applied, so the caller can flag a group for re-elicitation right away.
    /// Applying a judgment after ranking drops the session back to the
    /// eliciting phase; the previous outcome is stale.
    pub fn apply_judgment(
        &mut self,
        level: usize,
        parent: usize,
        i: usize,
        j: usize,
        judgment: Judgment,
    ) -> AhpResult<bool> {
        self.apply_value(level, parent, i, j, judgment.value())
    }

    /// Apply a raw positive judgment value to one pair
    pub fn apply_value(
        &mut self,
        level: usize,
        parent: usize,
        i: usize,
        j: usize,
        value: f64,
    ) -> AhpResult<bool> {
        let matrix = self.hierarchy.matrix_mut(level, parent)?;
        matrix.set_value(i, j, value)?;
        self.judgments_applied += 1;
        if self.phase == SessionPhase::Ranked {
            self.phase = SessionPhase::Eliciting;
        }
        Ok(self.hierarchy.matrix(level, parent)?.is_consistent())
    }

    /// Return one matrix to its fresh state for re-elicitation
    pub fn reopen_matrix(&mut self, level: usize, parent: usize) -> AhpResult<()> {
        self.hierarchy.matrix_mut(level, parent)?.reset();
        if self.phase == SessionPhase::Ranked {
            self.phase = SessionPhase::Eliciting;
        }
        Ok(())
    }

    /// Coordinates of matrices currently failing the consistency check
    pub fn inconsistent_matrices(&self) -> Vec<(usize, usize)> {
        self.matrix_coords()
            .into_iter()
            .filter(|&(level, parent)| {
                self.hierarchy
                    .matrix(level, parent)
                    .map(|m| !m.is_consistent())
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Calculate elicitation coverage statistics
    pub fn coverage_stats(&self) -> CoverageStats {
        let mut stats = CoverageStats::default();
        for (level, parent) in self.matrix_coords() {
            let matrix = match self.hierarchy.matrix(level, parent) {
                Ok(m) => m,
                Err(_) => continue,
            };
            stats.matrix_count += 1;
            stats.judged_pairs += matrix.judged_pair_count();
            stats.total_pairs += matrix.total_pair_count();
            if matrix.is_fully_judged() {
                stats.fully_judged_matrices += 1;
            }
            if matrix.is_consistent() {
                stats.consistent_matrices += 1;
            }
        }
        stats
    }

    /// Aggregate composite priorities and enter the ranked phase
    ///
    /// Requires every matrix to be fully judged and consistent; fails loudly
    /// otherwise, naming the first offending matrix. The returned weights
    /// follow the bottom level's factor order; only the attached display
    /// ranking is sorted.
    pub fn rank(&mut self) -> AhpResult<RankedOutcome> {
        let bottom = self.hierarchy.level_count() - 1;
        let weights = self.hierarchy.run(bottom)?;

        for (level, parent) in self.matrix_coords() {
            let matrix = self.hierarchy.matrix(level, parent)?;
            if !matrix.is_consistent() {
                return Err(HierarchyError::Inconsistent {
                    level,
                    parent,
                    ci: matrix.consistency_index(),
                }
                .into());
            }
        }

        let weights: Vec<f64> = weights.iter().copied().collect();
        let mut ranking: Vec<RankedAlternative> = self
            .hierarchy
            .factors(bottom)?
            .iter()
            .zip(weights.iter())
            .map(|(factor, &weight)| RankedAlternative {
                index: factor.index,
                name: factor.name.clone(),
                weight,
            })
            .collect();
        ranking.sort_by(|a, b| {
            b.weight
                .partial_cmp(&a.weight)
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        self.phase = SessionPhase::Ranked;
        Ok(RankedOutcome { weights, ranking })
    }

    /// Add metadata to the session
    pub fn set_metadata(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.metadata.insert(key.into(), value.into());
    }

    /// Get metadata value
    pub fn get_metadata(&self, key: &str) -> Option<&String> {
        self.metadata.get(key)
    }

    /// Every (level, parent) matrix coordinate, in elicitation order
    fn matrix_coords(&self) -> Vec<(usize, usize)> {
        let mut coords = Vec::new();
        if !self.hierarchy.is_built() {
            return coords;
        }
        for level in 0..self.hierarchy.level_count() {
            let parents = if level == 0 {
                1
            } else {
                self.hierarchy.factor_count(level - 1).unwrap_or(0)
            };
            for parent in 0..parents {
                coords.push((level, parent));
            }
        }
        coords
    }

    /// Serialize the session to a JSON string
    pub fn to_json(&self) -> Result<String, SessionError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| SessionError::Serialization(format!("failed to serialize session: {e}")))
    }

    /// Deserialize a session from a JSON string
    pub fn from_json(json: &str) -> Result<Self, SessionError> {
        let session: Self = serde_json::from_str(json)
            .map_err(|e| SessionError::Deserialization(format!("failed to deserialize session: {e}")))?;

        if session.version > SESSION_VERSION {
            return Err(SessionError::VersionTooNew(session.version));
        }

        Ok(session)
    }
}

/// File-based session persistence (requires `checkpoint` feature)
#[cfg(feature = "checkpoint")]
impl DecisionSession {
    /// Save the session to a file
    pub fn save(&self, path: &Path) -> Result<(), SessionError> {
        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, self)
            .map_err(|e| SessionError::Serialization(format!("failed to serialize session: {e}")))
    }

    /// Load a session from a file
    pub fn load(path: &Path) -> Result<Self, SessionError> {
        let file = File::open(path)?;
        let reader = BufReader::new(file);
        let session: Self = serde_json::from_reader(reader)
            .map_err(|e| SessionError::Deserialization(format!("failed to deserialize session: {e}")))?;

        if session.version > SESSION_VERSION {
            return Err(SessionError::VersionTooNew(session.version));
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AhpError;
    use crate::judgment::Intensity;
    use approx::assert_relative_eq;

    fn two_level_session() -> DecisionSession {
        let mut session = DecisionSession::new(2).unwrap();
        session.add_factor(0, "price").unwrap();
        session.add_factor(0, "safety").unwrap();
        session.add_factor(1, "hatchback").unwrap();
        session.add_factor(1, "sedan").unwrap();
        session
    }

    /// Answer every pair with perfectly transitive judgments.
    fn elicit_all(session: &mut DecisionSession) {
        while let Some(prompt) = session.next_prompt() {
            session
                .apply_value(
                    prompt.level,
                    prompt.parent,
                    prompt.first,
                    prompt.second,
                    2.0,
                )
                .unwrap();
        }
    }

    #[test]
    fn test_phase_transitions() {
        let mut session = two_level_session();
        assert_eq!(session.phase(), SessionPhase::CollectingFactors);
        assert!(session.next_prompt().is_none());

        session.begin_elicitation().unwrap();
        assert_eq!(session.phase(), SessionPhase::Eliciting);

        elicit_all(&mut session);
        session.rank().unwrap();
        assert_eq!(session.phase(), SessionPhase::Ranked);

        // A fresh judgment invalidates the outcome.
        session
            .apply_judgment(0, 0, 0, 1, Judgment::favoring_first(Intensity::Moderate))
            .unwrap();
        assert_eq!(session.phase(), SessionPhase::Eliciting);
    }

    #[test]
    fn test_add_factor_after_build_fails() {
        let mut session = two_level_session();
        session.begin_elicitation().unwrap();

        assert!(matches!(
            session.add_factor(1, "late"),
            Err(AhpError::Hierarchy(HierarchyError::AlreadyBuilt))
        ));
    }

    #[test]
    fn test_prompt_order_and_names() {
        let mut session = two_level_session();
        session.begin_elicitation().unwrap();

        let prompt = session.next_prompt().unwrap();
        assert_eq!((prompt.level, prompt.parent), (0, 0));
        assert_eq!((prompt.first, prompt.second), (0, 1));
        assert_eq!(prompt.first_name, "price");
        assert_eq!(prompt.second_name, "safety");
        assert_eq!(prompt.parent_name, None);

        session.apply_value(0, 0, 0, 1, 3.0).unwrap();

        // Next question moves to the first child matrix, under "price".
        let prompt = session.next_prompt().unwrap();
        assert_eq!((prompt.level, prompt.parent), (1, 0));
        assert_eq!(prompt.parent_name.as_deref(), Some("price"));

        session.apply_value(1, 0, 0, 1, 2.0).unwrap();
        let prompt = session.next_prompt().unwrap();
        assert_eq!((prompt.level, prompt.parent), (1, 1));
        assert_eq!(prompt.parent_name.as_deref(), Some("safety"));

        session.apply_value(1, 1, 0, 1, 2.0).unwrap();
        assert!(session.next_prompt().is_none());
    }

    #[test]
    fn test_apply_reports_consistency() {
        let mut session = DecisionSession::new(1).unwrap();
        for name in ["a", "b", "c"] {
            session.add_factor(0, name).unwrap();
        }
        session.begin_elicitation().unwrap();

        assert!(session.apply_value(0, 0, 0, 1, 2.0).unwrap());
        assert!(session.apply_value(0, 0, 1, 2, 2.0).unwrap());
        // Closing the cycle the wrong way breaks consistency.
        assert!(!session.apply_value(0, 0, 2, 0, 4.0).unwrap());
        assert_eq!(session.inconsistent_matrices(), vec![(0, 0)]);
        assert_eq!(session.judgments_applied(), 3);
    }

    #[test]
    fn test_coverage_stats() {
        let mut session = two_level_session();
        assert_eq!(session.coverage_stats(), CoverageStats::default());

        session.begin_elicitation().unwrap();
        let stats = session.coverage_stats();
        assert_eq!(stats.matrix_count, 3);
        assert_eq!(stats.total_pairs, 3);
        assert_eq!(stats.judged_pairs, 0);
        assert!(!stats.is_complete());
        assert_eq!(stats.pair_coverage(), 0.0);

        session.apply_value(0, 0, 0, 1, 3.0).unwrap();
        let stats = session.coverage_stats();
        assert_eq!(stats.judged_pairs, 1);
        assert_eq!(stats.fully_judged_matrices, 1);
        assert_eq!(stats.consistent_matrices, 3);

        elicit_all(&mut session);
        assert!(session.coverage_stats().is_complete());
        assert_relative_eq!(session.coverage_stats().pair_coverage(), 1.0);
    }

    #[test]
    fn test_rank_requires_complete_elicitation() {
        let mut session = two_level_session();
        session.begin_elicitation().unwrap();
        session.apply_value(0, 0, 0, 1, 3.0).unwrap();

        assert!(matches!(
            session.rank(),
            Err(AhpError::Hierarchy(
                HierarchyError::IncompleteJudgments { .. }
            ))
        ));
        assert_eq!(session.phase(), SessionPhase::Eliciting);
    }

    #[test]
    fn test_rank_refuses_inconsistent_matrix() {
        let mut session = DecisionSession::new(1).unwrap();
        for name in ["a", "b", "c"] {
            session.add_factor(0, name).unwrap();
        }
        session.begin_elicitation().unwrap();
        session.apply_value(0, 0, 0, 1, 2.0).unwrap();
        session.apply_value(0, 0, 1, 2, 2.0).unwrap();
        session.apply_value(0, 0, 2, 0, 4.0).unwrap();

        match session.rank() {
            Err(AhpError::Hierarchy(HierarchyError::Inconsistent { level, parent, ci })) => {
                assert_eq!((level, parent), (0, 0));
                assert!(ci > 0.1);
            }
            other => panic!("expected Inconsistent, got {other:?}"),
        }

        // Caller-driven re-elicitation: reset and judge transitively.
        session.reopen_matrix(0, 0).unwrap();
        session.apply_value(0, 0, 0, 1, 2.0).unwrap();
        session.apply_value(0, 0, 1, 2, 2.0).unwrap();
        session.apply_value(0, 0, 0, 2, 4.0).unwrap();
        assert!(session.rank().is_ok());
    }

    #[test]
    fn test_rank_outcome_orders() {
        let mut session = two_level_session();
        session.begin_elicitation().unwrap();
        // Safety outweighs price; sedan wins under both criteria.
        session.apply_value(0, 0, 1, 0, 3.0).unwrap();
        session.apply_value(1, 0, 1, 0, 2.0).unwrap();
        session.apply_value(1, 1, 1, 0, 4.0).unwrap();

        let outcome = session.rank().unwrap();

        // Weights stay in factor order: hatchback first.
        assert_eq!(outcome.weights.len(), 2);
        assert!(outcome.weights[0] < outcome.weights[1]);
        assert_relative_eq!(outcome.weights.iter().sum::<f64>(), 1.0, epsilon = 1e-9);

        // Display ranking is sorted by weight.
        assert_eq!(outcome.best().unwrap().name, "sedan");
        assert_eq!(outcome.ranking[0].index, 1);
        assert!(outcome.ranking[0].weight >= outcome.ranking[1].weight);
    }

    #[test]
    fn test_metadata() {
        let mut session = two_level_session();
        session.set_metadata("analyst", "alice");
        assert_eq!(session.get_metadata("analyst"), Some(&"alice".to_string()));
        assert_eq!(session.get_metadata("missing"), None);
    }

    #[test]
    fn test_json_roundtrip() {
        let mut session = two_level_session();
        session.begin_elicitation().unwrap();
        session.apply_value(0, 0, 0, 1, 3.0).unwrap();
        session.set_metadata("analyst", "alice");

        let json = session.to_json().unwrap();
        let loaded = DecisionSession::from_json(&json).unwrap();

        assert_eq!(loaded.phase(), SessionPhase::Eliciting);
        assert_eq!(loaded.judgments_applied(), 1);
        assert_eq!(loaded.get_metadata("analyst"), Some(&"alice".to_string()));
        // Derived state survives the round trip.
        let matrix = loaded.hierarchy().matrix(0, 0).unwrap();
        assert_relative_eq!(matrix.priority_vector()[0], 0.75, epsilon = 1e-9);
        assert_eq!(loaded.next_prompt(), session.next_prompt());
    }

    #[test]
    fn test_version_check_on_load() {
        let session = two_level_session();
        let json = session
            .to_json()
            .unwrap()
            .replacen("\"version\": 1", "\"version\": 99", 1);

        assert!(matches!(
            DecisionSession::from_json(&json),
            Err(SessionError::VersionTooNew(99))
        ));
    }
}
