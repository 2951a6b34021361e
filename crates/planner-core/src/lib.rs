//! Goal-decomposition resolver and execution planner.
//!
//! Given a target resource and quantity, the resolver expands the goal into a
//! dependency tree of production steps against a prebuilt rule index and a
//! caller-owned availability snapshot, bounding recursion and treating cycles
//! as terminal acquisitions. The plan builder flattens the tree into a
//! deduplicated, priority-ordered step list, derives the prose continuation
//! directive consumed one step per turn by the external executor, and
//! computes advisory difficulty warnings.
//!
//! Everything here is synchronous, single-threaded, pure computation: no
//! I/O, no suspension points. Replanning after an executor failure is a fresh
//! resolve call with updated availability, never a resumption.

pub mod classifier;
pub mod difficulty;
pub mod organisms;
pub mod plan;
pub mod resolver;
pub mod rules;

pub use classifier::classify;
pub use difficulty::{analyze_difficulty, analyze_difficulty_with, max_severity};
pub use organisms::OrganismTable;
pub use plan::{build_continuation_chain, build_plan, build_plan_with, flatten, prepend};
pub use resolver::{DependencyResolver, ResolverConfig};
pub use rules::{IndexDiagnostic, RuleIndex, ScoredRule};
