//! Difficulty analysis over a built plan: advisory warnings from fixed
//! lookup tables keyed by `(kind, resource)`, plus a bulk-quantity rule for
//! presence-requiring steps. Advisory text only; the plan is never altered.

use contracts::{
    CraftingPlan, DifficultyWarning, OrganismSource, Severity, Step, StepKind,
};

use crate::organisms::OrganismTable;

/// Quantity at which a presence-requiring step is flagged as slow.
pub const BULK_QUANTITY_THRESHOLD: u32 = 20;

/// Analyze with the built-in organism table.
pub fn analyze_difficulty(plan: &CraftingPlan) -> Vec<DifficultyWarning> {
    analyze_difficulty_with(plan, &OrganismTable)
}

pub fn analyze_difficulty_with(
    plan: &CraftingPlan,
    organisms: &dyn OrganismSource,
) -> Vec<DifficultyWarning> {
    let mut warnings = Vec::new();
    for step in &plan.steps {
        if step.kind == StepKind::Unresolved {
            warnings.push(DifficultyWarning {
                severity: Severity::Impossible,
                resource: step.resource.clone(),
                message: unresolved_advice(&step.resource),
            });
            continue;
        }
        if let Some(warning) = activity_note(step, organisms) {
            warnings.push(warning);
        }
        if step.kind.requires_presence() && step.quantity >= BULK_QUANTITY_THRESHOLD {
            warnings.push(DifficultyWarning {
                severity: Severity::Moderate,
                resource: step.resource.clone(),
                message: format!(
                    "{} {} {} will take a while",
                    step.kind.verb(),
                    step.quantity,
                    step.display_name
                ),
            });
        }
    }
    warnings
}

/// Highest severity present, `None` for a warning-free plan.
pub fn max_severity(warnings: &[DifficultyWarning]) -> Option<Severity> {
    warnings.iter().map(|warning| warning.severity).max()
}

fn activity_note(step: &Step, organisms: &dyn OrganismSource) -> Option<DifficultyWarning> {
    let (severity, message) = match (step.kind, step.resource.as_str()) {
        (StepKind::Extract, "adamant_ore") => (
            Severity::Extreme,
            "adamant ore occurs only below the deep strata; bring a hardened pick and torches"
                .to_string(),
        ),
        (StepKind::Extract, "glowspar_ore") => (
            Severity::Extreme,
            "glowspar forms only along lava channels; heat protection is required".to_string(),
        ),
        (StepKind::Extract, "silver_ore") => (
            Severity::Hard,
            "silver veins are rare; expect a long mining trip".to_string(),
        ),
        (StepKind::Harvest, "kelp") => (
            Severity::Hard,
            "kelp grows underwater; surfacing for air slows the harvest badly".to_string(),
        ),
        (StepKind::HarvestOrganism, resource) => {
            let target = organisms
                .organism_for(resource)
                .unwrap_or("the right creature");
            (
                Severity::Hard,
                format!("requires tracking down {target} in the wild"),
            )
        }
        (StepKind::Fish, _) => (
            Severity::Moderate,
            "fishing is slow and depends on open water nearby".to_string(),
        ),
        (StepKind::Farm, _) => (
            Severity::Moderate,
            "crops need tilled ground and time to grow".to_string(),
        ),
        _ => return None,
    };
    Some(DifficultyWarning {
        severity,
        resource: step.resource.clone(),
        message,
    })
}

fn unresolved_advice(resource: &str) -> String {
    match resource {
        "dragon_scale" => {
            "dragon scales cannot be produced; they are found only in high peak hoards".to_string()
        }
        "ancient_relic" => {
            "ancient relics come from ruin chests only; no production method exists".to_string()
        }
        "void_essence" => {
            "void essence has no known source in this world".to_string()
        }
        _ => format!("no production rule or natural source is known for {resource}"),
    }
}
