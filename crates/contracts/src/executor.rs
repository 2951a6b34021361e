//! Executor-facing contract re-exports.

pub use crate::{
    CraftingPlan, DifficultyWarning, Severity, Step, StepExecutor, StepKind, StepOutcome,
};
