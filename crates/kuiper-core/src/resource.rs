use serde::{Serialize, Deserialize};

/// The closed set of company resource stocks.
///
/// `None` exists for catalog records that target no resource at all (the
/// authoring tool emits it); the ledger carries a stock for it, which stays
/// at zero in practice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceType {
    Gold,
    Influence,
    ConstructionMaterials,
    None,
}

impl ResourceType {
    /// Every resource kind, in ledger iteration order.
    pub const ALL: [ResourceType; 4] = [
        ResourceType::Gold,
        ResourceType::Influence,
        ResourceType::ConstructionMaterials,
        ResourceType::None,
    ];

    /// UI-facing display name.
    pub fn label(self) -> &'static str {
        match self {
            ResourceType::Gold => "Gold",
            ResourceType::Influence => "Influence",
            ResourceType::ConstructionMaterials => "Construction Materials",
            ResourceType::None => "None",
        }
    }
}
