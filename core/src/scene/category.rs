//! Closed set of mesh categories.

use std::fmt;

/// Identifies one static mesh asset and its instance stream.
///
/// Ordering follows declaration order, which is also draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum MeshCategory {
    Player00,
    Dirt00,
    Grass00,
    Sand00,
    Tree00,
    Water00,
}

impl MeshCategory {
    /// Every category in draw order.
    pub const ALL: [MeshCategory; 6] = [
        MeshCategory::Player00,
        MeshCategory::Dirt00,
        MeshCategory::Grass00,
        MeshCategory::Sand00,
        MeshCategory::Tree00,
        MeshCategory::Water00,
    ];

    /// Number of categories.
    pub const COUNT: usize = Self::ALL.len();

    /// Asset base name; the mesh lives in `<name>.obj` and its palette in `<name>.png`.
    pub fn asset_name(self) -> &'static str {
        match self {
            Self::Player00 => "player_00",
            Self::Dirt00 => "dirt_00",
            Self::Grass00 => "grass_00",
            Self::Sand00 => "sand_00",
            Self::Tree00 => "tree_00",
            Self::Water00 => "water_00",
        }
    }

    /// Look up a category by its asset name.
    pub fn from_asset_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.asset_name() == name)
    }
}

impl fmt::Display for MeshCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.asset_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_names_round_trip() {
        for category in MeshCategory::ALL {
            assert_eq!(MeshCategory::from_asset_name(category.asset_name()), Some(category));
        }
        assert_eq!(MeshCategory::from_asset_name("stone_00"), None);
    }

    #[test]
    fn test_order_matches_all() {
        let mut sorted = MeshCategory::ALL;
        sorted.sort();
        assert_eq!(sorted, MeshCategory::ALL);
    }
}
