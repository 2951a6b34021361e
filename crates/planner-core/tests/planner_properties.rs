use std::collections::BTreeSet;

use contracts::{
    AvailabilityMap, DependencyNode, ProductionRule, Provenance, RuleInput, RuleMethod, StepKind,
};
use planner_core::classifier::classify;
use planner_core::difficulty::{analyze_difficulty, max_severity};
use planner_core::plan::build_plan;
use planner_core::resolver::{DependencyResolver, ResolverConfig};
use planner_core::rules::RuleIndex;
use proptest::prelude::*;

fn native_rule(
    output: &str,
    output_quantity: u32,
    inputs: Vec<(&str, u32)>,
    method: RuleMethod,
) -> ProductionRule {
    ProductionRule {
        output: output.to_string(),
        output_quantity,
        inputs: inputs
            .into_iter()
            .map(|(kind, quantity)| RuleInput::single(kind, quantity))
            .collect(),
        method,
        provenance: Provenance::Native,
    }
}

fn tree_height(node: &DependencyNode) -> u32 {
    1 + node
        .children
        .iter()
        .map(tree_height)
        .max()
        .unwrap_or(0)
}

fn collect_resources(node: &DependencyNode, out: &mut BTreeSet<String>) {
    out.insert(node.resource.clone());
    for child in &node.children {
        collect_resources(child, out);
    }
}

fn resource_name() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("iron_ore".to_string()),
        Just("raw_copper".to_string()),
        Just("fir_log".to_string()),
        Just("wheat".to_string()),
        Just("hide".to_string()),
        (0u32..8).prop_map(|index| format!("part_{index}")),
    ]
}

fn provenance() -> impl Strategy<Value = Provenance> {
    prop_oneof![
        Just(Provenance::Native),
        Just(Provenance::Foreign("expansion".to_string())),
        Just(Provenance::Foreign("transmutation".to_string())),
    ]
}

fn rule_method() -> impl Strategy<Value = RuleMethod> {
    prop_oneof![
        Just(RuleMethod::Combine),
        Just(RuleMethod::HeatPrimary),
        Just(RuleMethod::HeatSmoke),
        Just(RuleMethod::Cut),
    ]
}

fn production_rule() -> impl Strategy<Value = ProductionRule> {
    (
        resource_name(),
        1u32..5,
        prop::collection::vec((resource_name(), 1u32..4), 1..4),
        rule_method(),
        provenance(),
    )
        .prop_map(|(output, output_quantity, inputs, method, provenance)| ProductionRule {
            output,
            output_quantity,
            inputs: inputs
                .into_iter()
                .map(|(kind, quantity)| RuleInput::single(kind, quantity))
                .collect(),
            method,
            provenance,
        })
}

proptest! {
    #[test]
    fn property_1_resolution_terminates_within_depth_bound(
        rules in prop::collection::vec(production_rule(), 0..12),
        stock in prop::collection::btree_map(resource_name(), 0u32..10, 0..6),
        target in resource_name(),
        quantity in 1u32..12,
    ) {
        let index = RuleIndex::build(rules);
        let config = ResolverConfig::default();
        let resolver = DependencyResolver::with_config(&index, config.clone());
        let mut availability: AvailabilityMap = stock;

        let tree = resolver.resolve(&target, quantity, &mut availability);
        // Root sits at depth 0 and the guard truncates one level past the
        // bound, so the tallest legal tree has max_depth + 2 levels.
        prop_assert!(tree_height(&tree) <= config.max_depth + 2);
    }

    #[test]
    fn property_2_availability_only_decreases_and_untouched_stock_is_stable(
        rules in prop::collection::vec(production_rule(), 0..12),
        stock in prop::collection::btree_map(resource_name(), 0u32..10, 0..6),
        target in resource_name(),
        quantity in 1u32..12,
    ) {
        let index = RuleIndex::build(rules);
        let resolver = DependencyResolver::new(&index);
        let before = stock.clone();
        let mut availability: AvailabilityMap = stock;

        let tree = resolver.resolve(&target, quantity, &mut availability);

        for (resource, after) in &availability {
            let original = before.get(resource).copied().unwrap_or(0);
            prop_assert!(*after <= original, "{resource} grew: {original} -> {after}");
        }

        let mut touched = BTreeSet::new();
        collect_resources(&tree, &mut touched);
        for (resource, original) in &before {
            if !touched.contains(resource) {
                prop_assert_eq!(availability.get(resource), Some(original));
            }
        }
    }

    #[test]
    fn property_3_plans_are_ordered_by_kind_weight(
        rules in prop::collection::vec(production_rule(), 0..12),
        target in resource_name(),
        quantity in 1u32..12,
    ) {
        let index = RuleIndex::build(rules);
        let resolver = DependencyResolver::new(&index);
        let mut availability = AvailabilityMap::new();

        let tree = resolver.resolve(&target, quantity, &mut availability);
        let plan = build_plan(&tree);

        let weights = plan
            .steps
            .iter()
            .map(|step| step.kind.priority_weight())
            .collect::<Vec<_>>();
        let mut sorted = weights.clone();
        sorted.sort_unstable();
        prop_assert_eq!(weights, sorted);
    }
}

#[test]
fn property_4_mutual_recursion_yields_classifier_verdict() {
    // Both rules are foreign: neither side of the cycle may be accepted with
    // its dead end, so the root must fall back to the classifier verdict.
    let foreign = |output: &str, input: &str| ProductionRule {
        output: output.to_string(),
        output_quantity: 1,
        inputs: vec![RuleInput::single(input, 1)],
        method: RuleMethod::Combine,
        provenance: Provenance::Foreign("expansion".to_string()),
    };
    let index = RuleIndex::build(vec![foreign("gadget", "widget"), foreign("widget", "gadget")]);
    let resolver = DependencyResolver::new(&index);
    let mut availability = AvailabilityMap::new();

    let node = resolver.resolve("gadget", 1, &mut availability);
    assert_eq!(node.kind, classify("gadget"));
    assert_eq!(node.kind, StepKind::Unresolved);
    assert!(node.children.is_empty());
}

#[test]
fn property_5_partial_stock_is_used_before_production() {
    let index = RuleIndex::build(Vec::new());
    let resolver = DependencyResolver::new(&index);
    let mut availability = AvailabilityMap::from([("part_0".to_string(), 4)]);

    let tree = resolver.resolve("part_0", 10, &mut availability);
    let plan = build_plan(&tree);

    assert_eq!(availability["part_0"], 0);
    assert_eq!(plan.steps.len(), 1);
    assert_eq!(plan.steps[0].quantity, 6);
}

#[test]
fn property_6_duplicate_requirements_merge_into_one_positioned_step() {
    let index = RuleIndex::build(vec![
        native_rule(
            "scaffold",
            1,
            vec![("frame", 1), ("brace", 1)],
            RuleMethod::Combine,
        ),
        native_rule("frame", 1, vec![("stick", 2)], RuleMethod::Combine),
        native_rule("brace", 1, vec![("stick", 3)], RuleMethod::Combine),
        native_rule("stick", 1, vec![("fir_log", 1)], RuleMethod::Combine),
    ]);
    let resolver = DependencyResolver::new(&index);
    let mut availability = AvailabilityMap::new();

    let tree = resolver.resolve("scaffold", 1, &mut availability);
    let plan = build_plan(&tree);

    let sticks = plan
        .steps
        .iter()
        .filter(|step| step.resource == "stick")
        .collect::<Vec<_>>();
    assert_eq!(sticks.len(), 1);
    assert_eq!(sticks[0].quantity, 5);
}

#[test]
fn property_7_collect_steps_precede_combine_steps() {
    let index = RuleIndex::build(vec![native_rule(
        "kiln",
        1,
        vec![("clay", 8), ("stone", 4)],
        RuleMethod::Combine,
    )]);
    let resolver = DependencyResolver::new(&index);
    let mut availability = AvailabilityMap::new();

    let plan = build_plan(&resolver.resolve("kiln", 1, &mut availability));

    let last_collect = plan
        .steps
        .iter()
        .rposition(|step| step.kind == StepKind::CollectSurface)
        .expect("collect steps present");
    let first_combine = plan
        .steps
        .iter()
        .position(|step| step.kind == StepKind::Combine)
        .expect("combine step present");
    assert!(last_collect < first_combine);
}

#[test]
fn property_8_classifier_never_consults_rules_or_stock() {
    // Same verdicts with and without a registry claiming otherwise.
    let before = ["iron_ore", "fir_log", "wheat", "part_3"].map(classify);
    let _index = RuleIndex::build(vec![native_rule(
        "iron_ore",
        1,
        vec![("iron_block", 1)],
        RuleMethod::Combine,
    )]);
    let after = ["iron_ore", "fir_log", "wheat", "part_3"].map(classify);
    assert_eq!(before, after);
}

#[test]
fn property_9_difficulty_max_severity_is_superset_monotone() {
    let index = RuleIndex::build(vec![
        native_rule("bed_roll", 1, vec![("hide", 3)], RuleMethod::Combine),
        native_rule(
            "camp_kit",
            1,
            vec![("bed_roll", 1), ("trout", 2)],
            RuleMethod::Combine,
        ),
    ]);
    let resolver = DependencyResolver::new(&index);

    let small = build_plan(&resolver.resolve("bed_roll", 1, &mut AvailabilityMap::new()));
    let large = build_plan(&resolver.resolve("camp_kit", 1, &mut AvailabilityMap::new()));

    for step in &small.steps {
        assert!(large
            .steps
            .iter()
            .any(|other| other.kind == step.kind && other.resource == step.resource));
    }
    assert!(
        max_severity(&analyze_difficulty(&large)) >= max_severity(&analyze_difficulty(&small))
    );
}

#[test]
fn property_10_tool_chain_flattens_in_priority_order() {
    // raw_iron classifies as terrain extraction, fir_log as block cutting;
    // everything else is rule-backed. Extraction must sort before every
    // combine step even though the ore is a sibling, not an ancestor, of the
    // stick subtree.
    let index = RuleIndex::build(vec![
        native_rule(
            "iron_pick",
            1,
            vec![("raw_iron", 3), ("stick", 2)],
            RuleMethod::Combine,
        ),
        native_rule("stick", 1, vec![("plank", 2)], RuleMethod::Combine),
        native_rule("plank", 4, vec![("fir_log", 1)], RuleMethod::Combine),
    ]);
    let resolver = DependencyResolver::new(&index);
    let mut availability = AvailabilityMap::new();

    let plan = build_plan(&resolver.resolve("iron_pick", 1, &mut availability));

    let summary = plan
        .steps
        .iter()
        .map(|step| (step.kind, step.resource.as_str(), step.quantity))
        .collect::<Vec<_>>();
    assert_eq!(
        summary,
        vec![
            (StepKind::CutFromBlock, "fir_log", 1),
            (StepKind::Extract, "raw_iron", 3),
            (StepKind::Combine, "plank", 4),
            (StepKind::Combine, "stick", 2),
            (StepKind::Combine, "iron_pick", 1),
        ]
    );
    assert!(plan.is_complete());
    assert!(plan
        .continuation_entry
        .starts_with("Working towards 1 iron pick."));
}
