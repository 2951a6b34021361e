//! v1 cross-boundary contracts for the crafting resolver, plan builder, and
//! the external collaborators that surround them: the rule registry provider,
//! the inventory snapshot provider, and the turn-based step executor.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

pub mod executor;

pub const SCHEMA_VERSION_V1: &str = "1.0";

/// Identifier for a kind of material or artifact. Kinds only — quantities are
/// tracked separately, there is no notion of an instance.
pub type ResourceId = String;

/// Stock not yet claimed by any resolved node, per resource kind. Owned by the
/// caller and threaded mutably through one whole resolution; values only ever
/// decrease during a resolve call.
pub type AvailabilityMap = BTreeMap<ResourceId, u32>;

// ---------------------------------------------------------------------------
// Production rules
// ---------------------------------------------------------------------------

/// Where a production rule came from. Native rules are authoritative for the
/// domain; foreign rules carry the label of the pack that contributed them and
/// are ranked by the rule index before use.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Provenance {
    Native,
    Foreign(String),
}

impl Provenance {
    pub fn is_native(&self) -> bool {
        matches!(self, Self::Native)
    }

    pub fn label(&self) -> &str {
        match self {
            Self::Native => "native",
            Self::Foreign(label) => label,
        }
    }
}

/// Production method a rule uses. The four heat variants correspond to the
/// four heat appliances; the resolver treats them as one family when searching
/// for candidates.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RuleMethod {
    Combine,
    HeatPrimary,
    HeatBlast,
    HeatSmoke,
    HeatCampfire,
    Cut,
}

impl RuleMethod {
    pub fn is_heat(self) -> bool {
        matches!(
            self,
            Self::HeatPrimary | Self::HeatBlast | Self::HeatSmoke | Self::HeatCampfire
        )
    }

    /// The step kind a node produced by this rule method carries.
    pub fn step_kind(self) -> StepKind {
        match self {
            Self::Combine => StepKind::Combine,
            Self::HeatPrimary => StepKind::HeatTransform(HeatAppliance::Kiln),
            Self::HeatBlast => StepKind::HeatTransform(HeatAppliance::BlastKiln),
            Self::HeatSmoke => StepKind::HeatTransform(HeatAppliance::Smokehouse),
            Self::HeatCampfire => StepKind::HeatTransform(HeatAppliance::Campfire),
            Self::Cut => StepKind::CutFromBlock,
        }
    }
}

/// One input requirement of a rule. `kinds` is a disjunction: any listed kind
/// satisfies the requirement. Most requirements list exactly one kind.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RuleInput {
    pub kinds: Vec<ResourceId>,
    /// Quantity consumed per rule application.
    pub quantity: u32,
}

impl RuleInput {
    pub fn single(kind: impl Into<ResourceId>, quantity: u32) -> Self {
        Self {
            kinds: vec![kind.into()],
            quantity,
        }
    }

    pub fn any_of(kinds: Vec<ResourceId>, quantity: u32) -> Self {
        Self { kinds, quantity }
    }
}

/// A declarative mapping from input resource quantities to an output resource
/// quantity. Immutable once registered; the resolver only reads these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProductionRule {
    pub output: ResourceId,
    /// Quantity produced per rule application.
    pub output_quantity: u32,
    pub inputs: Vec<RuleInput>,
    pub method: RuleMethod,
    pub provenance: Provenance,
}

// ---------------------------------------------------------------------------
// Step kinds and scheduling order
// ---------------------------------------------------------------------------

/// Which heat appliance a heat-transform step runs in.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum HeatAppliance {
    Kiln,
    BlastKiln,
    Smokehouse,
    Campfire,
}

/// The closed set of executable step kinds. The scheduling order of a plan is
/// a fixed property of the variant (`priority_weight`), not of the tree shape
/// the step came from.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    Combine,
    HeatTransform(HeatAppliance),
    CutFromBlock,
    Extract,
    Harvest,
    CollectSurface,
    HarvestOrganism,
    Fish,
    Farm,
    AlreadyAvailable,
    Unresolved,
}

impl StepKind {
    /// Fixed scheduling weight; lower sorts earlier in a plan. Surface
    /// collection and block cutting come first, combining always last among
    /// real work, `Unresolved` sorts after everything as the signal of an
    /// incomplete plan.
    pub fn priority_weight(self) -> u8 {
        match self {
            Self::AlreadyAvailable => 0,
            Self::CollectSurface | Self::CutFromBlock => 1,
            Self::Extract => 2,
            Self::Harvest | Self::HarvestOrganism | Self::Fish | Self::Farm => 3,
            Self::HeatTransform(_) => 4,
            Self::Combine => 5,
            Self::Unresolved => u8::MAX,
        }
    }

    /// Leaf kinds never carry children in a dependency tree.
    pub fn is_leaf(self) -> bool {
        !matches!(
            self,
            Self::Combine | Self::HeatTransform(_) | Self::CutFromBlock
        )
    }

    /// Whether executing the step requires real-world presence. These are the
    /// "async" steps an executor must travel for; combining and cutting are
    /// handled at the work site the executor already occupies.
    pub fn requires_presence(self) -> bool {
        !matches!(
            self,
            Self::Combine | Self::CutFromBlock | Self::AlreadyAvailable | Self::Unresolved
        )
    }

    /// Imperative verb used when rendering directives and warnings.
    pub fn verb(self) -> &'static str {
        match self {
            Self::Combine => "craft",
            Self::HeatTransform(HeatAppliance::Kiln) => "smelt",
            Self::HeatTransform(HeatAppliance::BlastKiln) => "blast-smelt",
            Self::HeatTransform(HeatAppliance::Smokehouse) => "smoke",
            Self::HeatTransform(HeatAppliance::Campfire) => "cook",
            Self::CutFromBlock => "cut",
            Self::Extract => "mine",
            Self::Harvest => "gather",
            Self::CollectSurface => "collect",
            Self::HarvestOrganism => "hunt for",
            Self::Fish => "fish for",
            Self::Farm => "grow",
            Self::AlreadyAvailable => "keep",
            Self::Unresolved => "obtain",
        }
    }
}

impl fmt::Display for StepKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HeatTransform(appliance) => write!(f, "heat_transform:{appliance:?}"),
            other => write!(f, "{other:?}"),
        }
    }
}

// ---------------------------------------------------------------------------
// Dependency tree
// ---------------------------------------------------------------------------

/// One node of a resolved dependency tree. Created once per resolution call
/// and never mutated afterwards; only the shared availability map mutates
/// while the tree is being built.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DependencyNode {
    pub resource: ResourceId,
    pub quantity_needed: u32,
    pub kind: StepKind,
    /// Present only for rule-backed kinds.
    pub rule: Option<ProductionRule>,
    pub children: Vec<DependencyNode>,
}

impl DependencyNode {
    pub fn leaf(resource: impl Into<ResourceId>, quantity_needed: u32, kind: StepKind) -> Self {
        Self {
            resource: resource.into(),
            quantity_needed,
            kind,
            rule: None,
            children: Vec::new(),
        }
    }

    /// Deep-unknown check: true if any node in the subtree is `Unresolved`.
    /// Used to reject a speculative candidate production path.
    pub fn contains_unresolved(&self) -> bool {
        self.kind == StepKind::Unresolved || self.children.iter().any(Self::contains_unresolved)
    }

    /// Total nodes in the subtree, the node itself included.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(Self::node_count).sum::<usize>()
    }
}

// ---------------------------------------------------------------------------
// Flattened plan
// ---------------------------------------------------------------------------

/// The flattened, execution-facing unit: one deduplicated action with counts
/// merged across every tree occurrence of the same `(kind, resource)` pair.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Step {
    pub kind: StepKind,
    pub resource: ResourceId,
    pub quantity: u32,
    pub display_name: String,
}

/// An ordered, deduplicated plan for one top-level goal, plus the entry
/// directive of the continuation chain. Immutable once built except for the
/// explicit prepend operation the plan builder exposes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CraftingPlan {
    pub schema_version: String,
    pub goal_resource: ResourceId,
    pub goal_quantity: u32,
    pub steps: Vec<Step>,
    pub continuation_entry: String,
}

impl CraftingPlan {
    /// Steps requiring real-world presence, in plan order.
    pub fn presence_steps(&self) -> Vec<&Step> {
        self.steps
            .iter()
            .filter(|step| step.kind.requires_presence())
            .collect()
    }

    /// Combine steps only, in plan order.
    pub fn combine_steps(&self) -> Vec<&Step> {
        self.steps
            .iter()
            .filter(|step| step.kind == StepKind::Combine)
            .collect()
    }

    /// False when the plan still carries an `Unresolved` step.
    pub fn is_complete(&self) -> bool {
        self.steps
            .iter()
            .all(|step| step.kind != StepKind::Unresolved)
    }
}

// ---------------------------------------------------------------------------
// Difficulty advisories
// ---------------------------------------------------------------------------

/// Ordered severity of a difficulty warning.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Easy,
    Moderate,
    Hard,
    Extreme,
    Impossible,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Easy => "easy",
            Self::Moderate => "moderate",
            Self::Hard => "hard",
            Self::Extreme => "extreme",
            Self::Impossible => "impossible",
        };
        f.write_str(label)
    }
}

/// Advisory produced by plan difficulty analysis. Derived on demand, never
/// persisted, never alters the plan it describes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DifficultyWarning {
    pub severity: Severity,
    pub resource: ResourceId,
    pub message: String,
}

// ---------------------------------------------------------------------------
// Collaborator contracts
// ---------------------------------------------------------------------------

/// Outcome the external executor reports for one performed step.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StepOutcome {
    Completed,
    Failed { reason: String },
}

/// Contract implemented by the external, turn-based step executor. The
/// planner hands over one step per turn together with its directive string;
/// replanning after a failure is a fresh resolve call, not a resumption.
pub trait StepExecutor {
    fn execute_step(&mut self, step: &Step, directive: &str) -> StepOutcome;
}

/// Maps a harvested resource to the organism that yields it. Consulted only
/// when rendering warnings and continuation text, never by the resolver.
pub trait OrganismSource {
    fn organism_for(&self, resource: &str) -> Option<&str>;
}
