use serde::Deserialize;

use mirra::Category;

/// Draw tier per category. Higher tiers draw on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DepthTiers {
    pub player: i32,
    pub projectile: i32,
    pub item: i32,
    pub trap: i32,
    #[serde(rename = "crate")]
    pub crate_: i32,
    pub pool: i32,
    pub obstacle: i32,
    pub default: i32,
}

impl Default for DepthTiers {
    fn default() -> Self {
        Self {
            player: 10,
            projectile: 15,
            item: 20,
            trap: 5,
            crate_: 5,
            pool: 2,
            obstacle: 1,
            default: 0,
        }
    }
}

impl DepthTiers {
    pub fn tier(&self, category: Category) -> i32 {
        match category {
            Category::Player => self.player,
            Category::Projectile => self.projectile,
            Category::Item => self.item,
            Category::Trap => self.trap,
            Category::Crate => self.crate_,
            Category::Pool => self.pool,
            Category::Obstacle => self.obstacle,
            Category::Bush | Category::Unknown => self.default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_table() {
        let tiers = DepthTiers::default();
        assert_eq!(tiers.tier(Category::Item), 20);
        assert_eq!(tiers.tier(Category::Projectile), 15);
        assert_eq!(tiers.tier(Category::Player), 10);
        assert_eq!(tiers.tier(Category::Crate), 5);
        assert_eq!(tiers.tier(Category::Pool), 2);
        assert_eq!(tiers.tier(Category::Obstacle), 1);
        assert_eq!(tiers.tier(Category::Bush), 0);
        assert_eq!(tiers.tier(Category::Unknown), 0);
    }
}
