use serde::{Deserialize, Serialize};

/// Index of an orbiting body in the catalog (declaration order).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub u32);

impl BodyId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Catalog category of a body. Drives orbit-ring styling and UI grouping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BodyCategory {
    Planet,
    Dwarf,
    Asteroid,
    Tno,
}

impl BodyCategory {
    /// Translation key of the category header shown in the body list.
    pub fn label_key(self) -> &'static str {
        match self {
            BodyCategory::Planet => "ui.categoriesNoEmoji.planets",
            BodyCategory::Dwarf => "ui.categoriesNoEmoji.dwarfPlanets",
            BodyCategory::Asteroid => "ui.categoriesNoEmoji.majorAsteroids",
            BodyCategory::Tno => "ui.categoriesNoEmoji.transNeptunianObjects",
        }
    }
}

/// What the follow camera can track.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FollowTarget {
    /// The central star, fixed at the origin.
    Star,
    Body(BodyId),
}
