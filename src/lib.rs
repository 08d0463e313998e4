//! # ahp
//!
//! An Analytic Hierarchy Process engine for Rust.
//!
//! The Analytic Hierarchy Process decomposes a decision into a hierarchy of
//! criteria and alternatives, elicits pairwise importance judgments from a
//! human for each group of siblings, derives priority weights from the
//! principal eigenvector of each judgment matrix, checks each judgment set
//! for logical consistency, and aggregates weights bottom-up to rank the
//! alternatives.
//!
//! ## Core Concepts
//!
//! - **Pairwise comparison**: every question is relative ("how much more
//!   important is A than B?"), answered on a fixed 1..9 verbal scale with
//!   reciprocal semantics for the opposite direction
//! - **Eigenvector priorities**: each reciprocal judgment matrix yields its
//!   Perron root and principal eigenvector, rescaled into weights that sum
//!   to one
//! - **Consistency checking**: the spread between the principal eigenvalue
//!   and the matrix size exposes contradictory judgments before they are
//!   allowed into an aggregate
//!
//! Everything is synchronous and single-threaded: each call performs one
//! bounded computation and returns. A hierarchy and its matrices belong to
//! one decision session; concurrent decisions use independent instances, and
//! sharing one across threads requires the caller to serialize mutations.
//!
//! ## Quick Start
//!
//! ```rust
//! use ahp::prelude::*;
//!
//! let mut session = DecisionSession::new(2)?;
//! session.add_factor(0, "price")?;
//! session.add_factor(0, "safety")?;
//! session.add_factor(1, "hatchback")?;
//! session.add_factor(1, "sedan")?;
//! session.begin_elicitation()?;
//!
//! // Answer one pairwise question at a time.
//! session.apply_judgment(0, 0, 0, 1, Judgment::favoring_second(Intensity::Moderate))?;
//! while let Some(prompt) = session.next_prompt() {
//!     session.apply_judgment(
//!         prompt.level,
//!         prompt.parent,
//!         prompt.first,
//!         prompt.second,
//!         Judgment::favoring_second(Intensity::Weak),
//!     )?;
//! }
//!
//! let outcome = session.rank()?;
//! assert_eq!(outcome.best().unwrap().name, "sedan");
//! # Ok::<(), ahp::AhpError>(())
//! ```

pub mod error;
pub mod hierarchy;
pub mod judgment;
pub mod matrix;
pub mod session;

pub use error::{AhpError, AhpResult};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::error::{AhpError, AhpResult, HierarchyError, MatrixError, SessionError};
    pub use crate::hierarchy::{Factor, Hierarchy};
    pub use crate::judgment::{Intensity, Judgment, Side};
    pub use crate::matrix::{PairwiseMatrix, CONSISTENCY_THRESHOLD};
    pub use crate::session::{
        CoverageStats, DecisionSession, PairPrompt, RankedAlternative, RankedOutcome,
        SessionPhase, SESSION_VERSION,
    };
}
