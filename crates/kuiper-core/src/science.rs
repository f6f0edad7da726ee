use serde::{Serialize, Deserialize};

/// The closed set of research disciplines.
///
/// A science is a flow, not a stock: the ledger stores a per-turn rate that
/// is consumed into technology progress each turn. It never accumulates as
/// a standing balance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Science {
    Physics,
    Astronomy,
    Biochemistry,
    Geology,
    Mathematics,
    Psychology,
    Engineering,
    Eureka,
    Unknown,
}

impl Science {
    /// Every discipline, in ledger iteration order.
    pub const ALL: [Science; 9] = [
        Science::Physics,
        Science::Astronomy,
        Science::Biochemistry,
        Science::Geology,
        Science::Mathematics,
        Science::Psychology,
        Science::Engineering,
        Science::Eureka,
        Science::Unknown,
    ];

    /// UI-facing display name.
    pub fn label(self) -> &'static str {
        match self {
            Science::Physics => "Physics",
            Science::Astronomy => "Astronomy",
            Science::Biochemistry => "Biochemistry",
            Science::Geology => "Geology",
            Science::Mathematics => "Mathematics",
            Science::Psychology => "Psychology",
            Science::Engineering => "Engineering",
            Science::Eureka => "Eureka",
            Science::Unknown => "Unknown",
        }
    }
}
