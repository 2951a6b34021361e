//! Static organism knowledge table for the stock world content. Implements
//! the collaborator contract used when rendering directives and warnings; the
//! resolver itself never consults it.

use contracts::OrganismSource;

/// Built-in `(resource -> organism)` table.
#[derive(Debug, Clone, Copy, Default)]
pub struct OrganismTable;

impl OrganismSource for OrganismTable {
    fn organism_for(&self, resource: &str) -> Option<&str> {
        match resource {
            "hide" | "sinew" | "venison" => Some("elk"),
            "wool" => Some("mountain sheep"),
            "feather" => Some("moor hen"),
            "tallow" => Some("boar"),
            "bone" => Some("wolf"),
            _ => None,
        }
    }
}
