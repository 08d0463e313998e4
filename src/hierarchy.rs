//! Decision hierarchies and bottom-up priority aggregation
//!
//! A [`Hierarchy`] owns the factor names of every level — level 0 holds the
//! top criteria, the last level the alternatives — and, once the shape is
//! frozen with [`make_matrices`](Hierarchy::make_matrices), one
//! [`PairwiseMatrix`] per parent node: a single matrix comparing the level-0
//! criteria, and for each deeper level one matrix per factor of the level
//! above, all comparing that level's shared factor list.
//!
//! [`run`](Hierarchy::run) folds local priorities into composite priorities
//! recursively: the composite weight of a child is the sum over parents of
//! the parent's composite weight times the child's local priority under that
//! parent. Aggregation fails loudly when any involved matrix still has
//! unjudged pairs — an uncompared matrix is shape-identical to a judged one,
//! and folding it in silently would smuggle uniform weights into the result.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

use crate::error::{AhpResult, HierarchyError};
use crate::matrix::PairwiseMatrix;

/// One named node of the hierarchy
///
/// Identity is positional: duplicate names are permitted and every factor is
/// addressed by its `(level, index)` coordinates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Factor {
    /// Display name
    pub name: String,
    /// Level the factor belongs to
    pub level: usize,
    /// Position within the level's ordered factor list
    pub index: usize,
}

/// The factor tree plus one comparison matrix per parent node
///
/// Factor lists are mutable only until [`make_matrices`](Self::make_matrices)
/// is called; afterwards the level shapes are frozen and only matrix contents
/// change through elicitation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Hierarchy {
    levels: Vec<Vec<Factor>>,
    /// `matrices[level][parent]`; empty until built, then `matrices[0]` has
    /// exactly one entry and `matrices[i]` one entry per level `i - 1` factor
    matrices: Vec<Vec<PairwiseMatrix>>,
    built: bool,
}

impl Hierarchy {
    /// Create a hierarchy with `levels` empty levels
    pub fn new(levels: usize) -> AhpResult<Self> {
        if levels == 0 {
            return Err(HierarchyError::NoLevels.into());
        }
        Ok(Self {
            levels: vec![Vec::new(); levels],
            matrices: Vec::new(),
            built: false,
        })
    }

    /// Number of levels
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Whether the comparison matrices have been built
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Append a factor to a level and return its index
    ///
    /// Valid only before [`make_matrices`](Self::make_matrices).
    pub fn add_factor(&mut self, level: usize, name: impl Into<String>) -> AhpResult<usize> {
        if self.built {
            return Err(HierarchyError::AlreadyBuilt.into());
        }
        let levels = self.levels.len();
        let factors = self
            .levels
            .get_mut(level)
            .ok_or(HierarchyError::LevelOutOfRange {
                level,
                levels,
            })?;
        let index = factors.len();
        factors.push(Factor {
            name: name.into(),
            level,
            index,
        });
        Ok(index)
    }

    /// The factors of a level, in insertion order
    pub fn factors(&self, level: usize) -> AhpResult<&[Factor]> {
        self.levels
            .get(level)
            .map(Vec::as_slice)
            .ok_or_else(|| {
                HierarchyError::LevelOutOfRange {
                    level,
                    levels: self.levels.len(),
                }
                .into()
            })
    }

    /// Number of factors declared at a level
    pub fn factor_count(&self, level: usize) -> AhpResult<usize> {
        Ok(self.factors(level)?.len())
    }

    /// Look up one factor by its coordinates
    pub fn factor(&self, level: usize, index: usize) -> AhpResult<&Factor> {
        let factors = self.factors(level)?;
        factors.get(index).ok_or_else(|| {
            HierarchyError::FactorOutOfRange {
                level,
                index,
                count: factors.len(),
            }
            .into()
        })
    }

    /// Freeze the level shapes and allocate the comparison matrices
    ///
    /// Callable exactly once, after every factor of every level has been
    /// added. Level 0 gets a single matrix sized to its factor count; each
    /// deeper level `i` gets one matrix per level `i - 1` factor, every one
    /// sized to level `i`'s factor count.
    ///
    /// # Errors
    ///
    /// Fails if matrices were already built, or if any level is still empty —
    /// the checkable form of "called before all factors were added".
    pub fn make_matrices(&mut self) -> AhpResult<()> {
        if self.built {
            return Err(HierarchyError::AlreadyBuilt.into());
        }
        for (level, factors) in self.levels.iter().enumerate() {
            if factors.is_empty() {
                return Err(HierarchyError::EmptyLevel { level }.into());
            }
        }

        let mut matrices = Vec::with_capacity(self.levels.len());
        matrices.push(vec![PairwiseMatrix::new(self.levels[0].len())?]);
        for level in 1..self.levels.len() {
            let parents = self.levels[level - 1].len();
            let children = self.levels[level].len();
            let mut group = Vec::with_capacity(parents);
            for _ in 0..parents {
                group.push(PairwiseMatrix::new(children)?);
            }
            matrices.push(group);
        }

        self.matrices = matrices;
        self.built = true;
        Ok(())
    }

    /// The comparison matrix for `(level, parent)`
    ///
    /// Level 0 has a single matrix at parent index 0; level `i > 0` has one
    /// matrix per level `i - 1` factor.
    pub fn matrix(&self, level: usize, parent: usize) -> AhpResult<&PairwiseMatrix> {
        self.check_matrix_coords(level, parent)?;
        Ok(&self.matrices[level][parent])
    }

    /// Mutable access to the comparison matrix for `(level, parent)`
    pub fn matrix_mut(&mut self, level: usize, parent: usize) -> AhpResult<&mut PairwiseMatrix> {
        self.check_matrix_coords(level, parent)?;
        Ok(&mut self.matrices[level][parent])
    }

    fn check_matrix_coords(&self, level: usize, parent: usize) -> AhpResult<()> {
        if !self.built {
            return Err(HierarchyError::NotBuilt.into());
        }
        if level >= self.matrices.len() {
            return Err(HierarchyError::LevelOutOfRange {
                level,
                levels: self.matrices.len(),
            }
            .into());
        }
        let count = self.matrices[level].len();
        if parent >= count {
            return Err(HierarchyError::ParentOutOfRange {
                level,
                parent,
                count,
            }
            .into());
        }
        Ok(())
    }

    /// Composite priorities for the factors of `level`
    ///
    /// `run(0)` is the level-0 priority vector. For deeper levels the local
    /// priority vectors of the level's matrices are stacked into a matrix `V`
    /// (one row per parent, in parent order) and the result is
    /// `run(level - 1) · V`. The output order always matches the level's
    /// factor list; the engine never reorders by weight.
    ///
    /// # Errors
    ///
    /// Fails if matrices are not built, `level` is out of range, or any
    /// matrix at levels `0..=level` still has unjudged pairs.
    pub fn run(&self, level: usize) -> AhpResult<DVector<f64>> {
        if !self.built {
            return Err(HierarchyError::NotBuilt.into());
        }
        if level >= self.levels.len() {
            return Err(HierarchyError::LevelOutOfRange {
                level,
                levels: self.levels.len(),
            }
            .into());
        }
        for lv in 0..=level {
            for (parent, matrix) in self.matrices[lv].iter().enumerate() {
                if !matrix.is_fully_judged() {
                    let required = matrix.total_pair_count();
                    return Err(HierarchyError::IncompleteJudgments {
                        level: lv,
                        parent,
                        missing: required - matrix.judged_pair_count(),
                        required,
                    }
                    .into());
                }
            }
        }
        Ok(self.run_inner(level))
    }

    /// Structural recursion over the already-validated levels
    fn run_inner(&self, level: usize) -> DVector<f64> {
        if level == 0 {
            return self.matrices[0][0].priority_vector().clone();
        }

        let parents = self.matrices[level].len();
        let children = self.levels[level].len();
        let mut local = DMatrix::zeros(parents, children);
        for (parent, matrix) in self.matrices[level].iter().enumerate() {
            local.set_row(parent, &matrix.priority_vector().transpose());
        }

        let upper = self.run_inner(level - 1);
        local.transpose() * upper
    }

    /// Composite priorities for the bottom level
    pub fn composite_priorities(&self) -> AhpResult<DVector<f64>> {
        self.run(self.levels.len() - 1)
    }
}
