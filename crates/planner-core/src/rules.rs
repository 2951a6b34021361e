//! Rule index: the raw rule registry preprocessed once into per-method lookup
//! tables keyed by output resource, each candidate list pre-sorted by a
//! provenance score (best first).
//!
//! The score is a heuristic "prefer the authoritative/simple path over exotic
//! conversions" rule, not a correctness guarantee. A large foreign rule set is
//! expected to contain nonsensical long conversion chains that happen to
//! type-check; scoring keeps them at the back of the candidate queue.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use contracts::{AvailabilityMap, ProductionRule, ResourceId, RuleMethod, StepKind};
use serde::{Deserialize, Serialize};

use crate::classifier::classify;

/// Provenance labels known to contribute conversion chains that type-check
/// but make no domain sense.
const UNTRUSTED_PROVENANCES: &[&str] = &["transmutation", "barter_exchange"];

const NATIVE_RULE_SCORE: i64 = 1_000;
const UNTRUSTED_RULE_SCORE: i64 = -1_000;
const NATIVE_INGREDIENT_BONUS: i64 = 5;

// ---------------------------------------------------------------------------
// Rule validation
// ---------------------------------------------------------------------------

/// Why a rule was rejected at index-build time. Rejection is never fatal; the
/// rule is skipped and a diagnostic is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleValidationError {
    ZeroOutputQuantity,
    EmptyInputDisjunction,
    ZeroInputQuantity(ResourceId),
}

impl fmt::Display for RuleValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZeroOutputQuantity => write!(f, "rule produces zero output per application"),
            Self::EmptyInputDisjunction => write!(f, "input requirement lists no acceptable kind"),
            Self::ZeroInputQuantity(kind) => {
                write!(f, "input requirement for {kind} consumes zero per application")
            }
        }
    }
}

fn validate(rule: &ProductionRule) -> Result<(), RuleValidationError> {
    if rule.output_quantity == 0 {
        return Err(RuleValidationError::ZeroOutputQuantity);
    }
    for input in &rule.inputs {
        let Some(first) = input.kinds.first() else {
            return Err(RuleValidationError::EmptyInputDisjunction);
        };
        if input.quantity == 0 {
            return Err(RuleValidationError::ZeroInputQuantity(first.clone()));
        }
    }
    Ok(())
}

/// Record of one skipped registry rule, queryable by the embedding
/// application after the index is built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IndexDiagnostic {
    pub output: ResourceId,
    pub method: RuleMethod,
    pub provenance_label: String,
    pub reason: String,
}

// ---------------------------------------------------------------------------
// RuleIndex
// ---------------------------------------------------------------------------

/// A production rule together with its provenance score.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredRule {
    pub rule: ProductionRule,
    pub score: i64,
}

/// Preprocessed registry snapshot: combine/heat/cut lookup tables keyed by
/// output resource, candidates sorted descending by score.
#[derive(Debug, Clone, Default)]
pub struct RuleIndex {
    combine: BTreeMap<ResourceId, Vec<ScoredRule>>,
    heat: BTreeMap<ResourceId, Vec<ScoredRule>>,
    cut: BTreeMap<ResourceId, Vec<ScoredRule>>,
    native_outputs: BTreeSet<ResourceId>,
    diagnostics: Vec<IndexDiagnostic>,
}

impl RuleIndex {
    /// Build the index from a registry snapshot. Failure-tolerant: a rule
    /// that cannot be inspected is skipped and recorded, never propagated.
    pub fn build(rules: impl IntoIterator<Item = ProductionRule>) -> Self {
        let mut index = Self::default();
        let mut accepted = Vec::new();

        for rule in rules {
            match validate(&rule) {
                Ok(()) => {
                    if rule.provenance.is_native() {
                        index.native_outputs.insert(rule.output.clone());
                    }
                    accepted.push(rule);
                }
                Err(error) => index.diagnostics.push(IndexDiagnostic {
                    output: rule.output.clone(),
                    method: rule.method,
                    provenance_label: rule.provenance.label().to_string(),
                    reason: error.to_string(),
                }),
            }
        }

        // Scoring needs the full native output set, so it runs as a second
        // pass over the accepted rules.
        for rule in accepted {
            let score = index.score(&rule);
            let table = match rule.method {
                RuleMethod::Combine => &mut index.combine,
                RuleMethod::Cut => &mut index.cut,
                _ => &mut index.heat,
            };
            table
                .entry(rule.output.clone())
                .or_default()
                .push(ScoredRule { rule, score });
        }

        for table in [&mut index.combine, &mut index.heat, &mut index.cut] {
            for candidates in table.values_mut() {
                candidates.sort_by(|a, b| {
                    b.score
                        .cmp(&a.score)
                        .then_with(|| a.rule.inputs.len().cmp(&b.rule.inputs.len()))
                        .then_with(|| {
                            a.rule.provenance.label().cmp(b.rule.provenance.label())
                        })
                });
            }
        }
        index
    }

    fn score(&self, rule: &ProductionRule) -> i64 {
        let base = if rule.provenance.is_native() {
            NATIVE_RULE_SCORE
        } else if UNTRUSTED_PROVENANCES.contains(&rule.provenance.label()) {
            UNTRUSTED_RULE_SCORE
        } else {
            0
        };

        let ingredient_adjustment = rule
            .inputs
            .iter()
            .map(|input| {
                let preferred = input
                    .kinds
                    .iter()
                    .find(|kind| self.is_native_form(kind))
                    .or_else(|| input.kinds.first());
                match preferred {
                    Some(kind) if self.is_native_form(kind) => NATIVE_INGREDIENT_BONUS,
                    _ => -NATIVE_INGREDIENT_BONUS,
                }
            })
            .sum::<i64>();

        base + ingredient_adjustment
    }

    /// Whether a kind has an authoritative concrete form: a native production
    /// rule, or a natural acquisition method per the classifier.
    pub fn is_native_form(&self, kind: &str) -> bool {
        self.native_outputs.contains(kind) || classify(kind) != StepKind::Unresolved
    }

    pub fn combine_candidates(&self, output: &str) -> &[ScoredRule] {
        self.combine.get(output).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn heat_candidates(&self, output: &str) -> &[ScoredRule] {
        self.heat.get(output).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cut_candidates(&self, output: &str) -> &[ScoredRule] {
        self.cut.get(output).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn diagnostics(&self) -> &[IndexDiagnostic] {
        &self.diagnostics
    }

    pub fn rule_count(&self) -> usize {
        [&self.combine, &self.heat, &self.cut]
            .into_iter()
            .flat_map(BTreeMap::values)
            .map(Vec::len)
            .sum()
    }

    /// Pick the concrete kind for a disjunctive input requirement: any kind
    /// with stock first, then the provenance-preferred kind, then the first
    /// listed. `None` only for an empty disjunction, which validation keeps
    /// out of the index.
    pub fn preferred_kind<'k>(
        &self,
        options: &'k [ResourceId],
        availability: &AvailabilityMap,
    ) -> Option<&'k ResourceId> {
        options
            .iter()
            .find(|kind| availability.get(kind.as_str()).copied().unwrap_or(0) > 0)
            .or_else(|| options.iter().find(|kind| self.is_native_form(kind)))
            .or_else(|| options.first())
    }
}
