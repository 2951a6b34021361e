//! Raw-resource classifier: a static, side-effect-free mapping from a
//! resource identifier to its terminal acquisition method.
//!
//! The resolver consults this twice: as an early exit before any rule search
//! (natural acquisition always beats a reverse conversion rule) and as the
//! final fallback once every rule-backed path has dead-ended.
//!
//! Every predicate is anchored (exact, prefix, or suffix). Unanchored
//! containment misclassifies composite artifacts that merely embed a raw
//! material name — a `wooden_mallet` is not timber.

use contracts::StepKind;

const EXTRACT_SUFFIXES: &[&str] = &["_ore"];
const EXTRACT_PREFIXES: &[&str] = &["raw_"];
const EXTRACT_EXACT: &[&str] = &["coal", "saltpeter", "rock_salt"];

const CUT_SUFFIXES: &[&str] = &["_log", "_wood", "_stem"];
const CUT_PREFIXES: &[&str] = &["stripped_"];

const COLLECT_SUFFIXES: &[&str] = &["_flower", "_mushroom"];
const COLLECT_EXACT: &[&str] = &["stone", "sand", "gravel", "clay", "flint", "snow"];

const HARVEST_EXACT: &[&str] = &["berries", "reeds", "vines", "kelp"];

const FARM_SUFFIXES: &[&str] = &["_seeds"];
const FARM_EXACT: &[&str] = &["wheat", "carrot", "potato", "flax", "gourd"];

const FISH_SUFFIXES: &[&str] = &["_fish"];
const FISH_EXACT: &[&str] = &["cod", "salmon", "trout", "perch"];

const ORGANISM_EXACT: &[&str] = &["hide", "wool", "feather", "tallow", "sinew", "bone", "venison"];

fn matches_table(resource: &str, exact: &[&str], prefixes: &[&str], suffixes: &[&str]) -> bool {
    exact.contains(&resource)
        || prefixes.iter().any(|prefix| resource.starts_with(prefix))
        || suffixes.iter().any(|suffix| resource.ends_with(suffix))
}

/// Classify a resource identifier into its natural acquisition method, or
/// `Unresolved` when no table entry matches. Pure: never consults rules or
/// availability.
pub fn classify(resource: &str) -> StepKind {
    if matches_table(resource, EXTRACT_EXACT, EXTRACT_PREFIXES, EXTRACT_SUFFIXES) {
        return StepKind::Extract;
    }
    if matches_table(resource, &[], CUT_PREFIXES, CUT_SUFFIXES) {
        return StepKind::CutFromBlock;
    }
    if matches_table(resource, COLLECT_EXACT, &[], COLLECT_SUFFIXES) {
        return StepKind::CollectSurface;
    }
    if matches_table(resource, HARVEST_EXACT, &[], &[]) {
        return StepKind::Harvest;
    }
    if matches_table(resource, FARM_EXACT, &[], FARM_SUFFIXES) {
        return StepKind::Farm;
    }
    if matches_table(resource, FISH_EXACT, &[], FISH_SUFFIXES) {
        return StepKind::Fish;
    }
    if matches_table(resource, ORGANISM_EXACT, &[], &[]) {
        return StepKind::HarvestOrganism;
    }
    StepKind::Unresolved
}
