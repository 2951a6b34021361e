//! Plan builder: flattens a resolved dependency tree into a merged,
//! priority-ordered step list and derives the continuation chain consumed one
//! directive per turn by the external executor.

use std::collections::{BTreeMap, BTreeSet};

use contracts::{
    CraftingPlan, DependencyNode, OrganismSource, ResourceId, Step, StepKind, SCHEMA_VERSION_V1,
};

use crate::organisms::OrganismTable;

/// Post-order, whole-tree traversal with a global `(kind, resource)` seen
/// set: a node is emitted at most once across the entire tree, first
/// occurrence in traversal order winning position.
pub fn flatten(tree: &DependencyNode) -> Vec<&DependencyNode> {
    let mut seen = BTreeSet::new();
    let mut out = Vec::new();
    post_order(tree, &mut seen, &mut out);
    out
}

fn post_order<'t>(
    node: &'t DependencyNode,
    seen: &mut BTreeSet<(StepKind, ResourceId)>,
    out: &mut Vec<&'t DependencyNode>,
) {
    for child in &node.children {
        post_order(child, seen, out);
    }
    if seen.insert((node.kind, node.resource.clone())) {
        out.push(node);
    }
}

fn accumulate_totals(node: &DependencyNode, totals: &mut BTreeMap<(StepKind, ResourceId), u32>) {
    *totals
        .entry((node.kind, node.resource.clone()))
        .or_insert(0) += node.quantity_needed;
    for child in &node.children {
        accumulate_totals(child, totals);
    }
}

fn display_name(resource: &str) -> String {
    resource.replace('_', " ")
}

/// Build the ordered plan for a resolved tree using the built-in organism
/// table for rendering.
pub fn build_plan(tree: &DependencyNode) -> CraftingPlan {
    build_plan_with(tree, &OrganismTable)
}

/// Build the ordered plan for a resolved tree: merge duplicate counts, drop
/// `AlreadyAvailable` nodes, stable-sort by the fixed per-kind priority
/// weight, then derive the continuation entry directive.
pub fn build_plan_with(tree: &DependencyNode, organisms: &dyn OrganismSource) -> CraftingPlan {
    let mut totals = BTreeMap::new();
    accumulate_totals(tree, &mut totals);

    let mut steps = flatten(tree)
        .into_iter()
        .filter(|node| node.kind != StepKind::AlreadyAvailable)
        .map(|node| {
            let quantity = totals
                .get(&(node.kind, node.resource.clone()))
                .copied()
                .unwrap_or(node.quantity_needed);
            Step {
                kind: node.kind,
                resource: node.resource.clone(),
                quantity,
                display_name: display_name(&node.resource),
            }
        })
        .collect::<Vec<_>>();

    // Stable: ties keep their post-order-derived relative order.
    steps.sort_by_key(|step| step.kind.priority_weight());

    let mut plan = CraftingPlan {
        schema_version: SCHEMA_VERSION_V1.to_string(),
        goal_resource: tree.resource.clone(),
        goal_quantity: tree.quantity_needed,
        steps,
        continuation_entry: String::new(),
    };
    plan.continuation_entry = build_continuation_chain(&plan, organisms);
    plan
}

/// Splice externally supplied prerequisite steps at the very front, in the
/// given order, with no re-sorting: prerequisite ordering is
/// caller-guaranteed. The continuation entry is re-derived because it embeds
/// the remaining work.
pub fn prepend(plan: &mut CraftingPlan, prereq_steps: Vec<Step>) {
    prepend_with(plan, prereq_steps, &OrganismTable);
}

pub fn prepend_with(
    plan: &mut CraftingPlan,
    prereq_steps: Vec<Step>,
    organisms: &dyn OrganismSource,
) {
    let mut steps = prereq_steps;
    steps.append(&mut plan.steps);
    plan.steps = steps;
    plan.continuation_entry = build_continuation_chain(plan, organisms);
}

fn render_step(step: &Step, organisms: &dyn OrganismSource) -> String {
    match step.kind {
        StepKind::HarvestOrganism => match organisms.organism_for(&step.resource) {
            Some(organism) => format!(
                "hunt {organism} for {} {}",
                step.quantity, step.display_name
            ),
            None => format!("hunt for {} {}", step.quantity, step.display_name),
        },
        kind => format!("{} {} {}", kind.verb(), step.quantity, step.display_name),
    }
}

fn package_directive(
    plan: &CraftingPlan,
    step: &Step,
    remaining: &str,
    organisms: &dyn OrganismSource,
) -> String {
    let goal = display_name(&plan.goal_resource);
    let task = render_step(step, organisms);
    if remaining.is_empty() {
        format!(
            "Working towards {} {goal}. Current task: {task}. This is the final step of the plan.",
            plan.goal_quantity
        )
    } else {
        format!(
            "Working towards {} {goal}. Current task: {task}. Afterwards you still need to: {remaining}.",
            plan.goal_quantity
        )
    }
}

/// Derive the continuation chain and return its entry point: the directive
/// for step 0 with a prose description of every later step embedded. The
/// executor performs one directive per turn and re-derives the next from the
/// embedded description; the description is deliberately prose, not
/// structured data.
pub fn build_continuation_chain(plan: &CraftingPlan, organisms: &dyn OrganismSource) -> String {
    if plan.steps.is_empty() {
        return format!(
            "Goal already satisfied: {} {} requires no further work.",
            plan.goal_quantity,
            display_name(&plan.goal_resource)
        );
    }

    let mut remaining = String::new();
    let mut entry = String::new();
    for step in plan.steps.iter().rev() {
        entry = package_directive(plan, step, &remaining, organisms);
        remaining = if remaining.is_empty() {
            render_step(step, organisms)
        } else {
            format!("{}, then {remaining}", render_step(step, organisms))
        };
    }
    entry
}
