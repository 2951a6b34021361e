//! Dependency resolver: the recursive core that expands a goal into a tree of
//! production steps.
//!
//! One resolve call threads a single mutable availability map through the
//! whole call tree (claims happen in traversal order and are never returned),
//! while the ancestor path set is branch-local: sibling subtrees never see
//! each other's in-progress entries, so cycle detection is strictly
//! path-based.

use std::collections::BTreeSet;

use contracts::{AvailabilityMap, DependencyNode, ResourceId, StepKind};

use crate::classifier::classify;
use crate::rules::{RuleIndex, ScoredRule};

/// Tuning knobs for one resolver instance.
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Hard recursion bound; deeper expansion is truncated to `Unresolved`.
    /// A safety valve against pathological rule sets, not a correctness
    /// mechanism.
    pub max_depth: u32,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self { max_depth: 10 }
    }
}

/// Resolves `(resource, quantity)` goals against a prebuilt rule index.
/// Synchronous and single-threaded; concurrent resolution of independent
/// goals must use independent availability maps.
#[derive(Debug)]
pub struct DependencyResolver<'a> {
    index: &'a RuleIndex,
    config: ResolverConfig,
}

impl<'a> DependencyResolver<'a> {
    pub fn new(index: &'a RuleIndex) -> Self {
        Self {
            index,
            config: ResolverConfig::default(),
        }
    }

    pub fn with_config(index: &'a RuleIndex, config: ResolverConfig) -> Self {
        Self { index, config }
    }

    /// Resolve a top-level goal. Never fails: worst case the returned tree is
    /// a single `Unresolved` leaf. Every value in `availability` on return is
    /// at most its value on entry.
    pub fn resolve(
        &self,
        resource: &str,
        quantity: u32,
        availability: &mut AvailabilityMap,
    ) -> DependencyNode {
        self.resolve_inner(resource, quantity, availability, &BTreeSet::new(), 0)
    }

    fn resolve_inner(
        &self,
        resource: &str,
        quantity: u32,
        availability: &mut AvailabilityMap,
        ancestors: &BTreeSet<ResourceId>,
        depth: u32,
    ) -> DependencyNode {
        if depth > self.config.max_depth {
            return DependencyNode::leaf(resource, quantity, StepKind::Unresolved);
        }

        // Claim existing stock before attempting any production.
        let stocked = availability.get(resource).copied().unwrap_or(0);
        if stocked >= quantity {
            availability.insert(resource.to_string(), stocked - quantity);
            return DependencyNode::leaf(resource, quantity, StepKind::AlreadyAvailable);
        }
        let mut shortfall = quantity;
        if stocked > 0 {
            // Partial claim: consume everything, produce only the remainder.
            availability.insert(resource.to_string(), 0);
            shortfall = quantity - stocked;
        }

        // Expanding a resource already on the current path would cycle; treat
        // it as terminal instead of erroring.
        if ancestors.contains(resource) {
            return DependencyNode::leaf(resource, shortfall, classify(resource));
        }

        // Natural acquisition beats any rule. Some registries carry reverse
        // rules (raw ore derivable from a refined block) that must never win.
        let verdict = classify(resource);
        if verdict != StepKind::Unresolved {
            return DependencyNode::leaf(resource, shortfall, verdict);
        }

        let mut branch = ancestors.clone();
        branch.insert(resource.to_string());

        // Speculative rule-backed attempts: heat first, then combine, then
        // cut, each family in pre-sorted score order. A candidate subtree is
        // accepted when it is native-tagged or free of deep unknowns.
        let candidates = self
            .index
            .heat_candidates(resource)
            .iter()
            .chain(self.index.combine_candidates(resource))
            .chain(self.index.cut_candidates(resource));
        for candidate in candidates {
            let node = self.apply_rule(resource, shortfall, candidate, availability, &branch, depth);
            if candidate.rule.provenance.is_native() || !node.contains_unresolved() {
                return node;
            }
        }

        // Every candidate dead-ended and the classifier already had no
        // verdict at the early exit above.
        DependencyNode::leaf(resource, shortfall, StepKind::Unresolved)
    }

    fn apply_rule(
        &self,
        resource: &str,
        needed: u32,
        candidate: &ScoredRule,
        availability: &mut AvailabilityMap,
        branch: &BTreeSet<ResourceId>,
        depth: u32,
    ) -> DependencyNode {
        let rule = &candidate.rule;
        let applications = needed.div_ceil(rule.output_quantity);

        let mut children = Vec::with_capacity(rule.inputs.len());
        for input in &rule.inputs {
            let Some(kind) = self.index.preferred_kind(&input.kinds, availability) else {
                continue;
            };
            let required = input.quantity.saturating_mul(applications);
            children.push(self.resolve_inner(kind, required, availability, branch, depth + 1));
        }

        DependencyNode {
            resource: resource.to_string(),
            quantity_needed: needed,
            kind: rule.method.step_kind(),
            rule: Some(rule.clone()),
            children,
        }
    }
}
