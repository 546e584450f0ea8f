// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Designer-authored tile configuration.
//!
//! A [`TileCatalog`] is the already-validated output of the content tooling:
//! explicit per-tile rules (category, weight, movement flags) plus extra
//! keyword rules for classifying tiles by name.

use quarry_core::resource::{Category, TileTraits};
use serde::{Deserialize, Serialize};

fn default_weight() -> f32 {
    1.0
}

/// Configuration for one named tile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TileRule {
    /// The exact tile name this rule applies to.
    pub name: String,
    /// The category the tile belongs to.
    pub category: Category,
    /// Relative selection weight within the category.
    #[serde(default = "default_weight")]
    pub weight: f32,
    /// Overrides the category's default walkability.
    #[serde(default)]
    pub walkable: Option<bool>,
    /// Overrides the category's default collision.
    #[serde(default)]
    pub has_collision: Option<bool>,
}

impl TileRule {
    /// The attributes this rule assigns, filling gaps from the category defaults.
    pub fn traits(&self) -> TileTraits {
        let defaults = TileTraits::for_category(&self.category);
        TileTraits {
            weight: self.weight,
            walkable: self.walkable.unwrap_or(defaults.walkable),
            has_collision: self.has_collision.unwrap_or(defaults.has_collision),
        }
    }
}

/// Maps a substring of a tile name to a category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordRule {
    /// Case-insensitive substring to look for.
    pub keyword: String,
    /// The category assigned on a match.
    pub category: Category,
}

/// The weighted-entry configuration consumed by the classifier.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TileCatalog {
    /// Explicit per-tile rules.
    pub tiles: Vec<TileRule>,
    /// Keyword rules, checked before the built-in keywords.
    pub keywords: Vec<KeywordRule>,
}

impl TileCatalog {
    /// Returns the rule for `name`, if one is configured.
    pub fn rule(&self, name: &str) -> Option<&TileRule> {
        self.tiles.iter().find(|rule| rule.name == name)
    }

    /// Returns `true` if neither tiles nor keywords are configured.
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty() && self.keywords.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rule_fills_defaults_from_category() {
        let rule = TileRule {
            name: "wall_glass".into(),
            category: Category::Wall,
            weight: 0.5,
            walkable: None,
            has_collision: Some(false),
        };
        let traits = rule.traits();
        assert_eq!(traits.weight, 0.5);
        assert!(!traits.walkable);
        assert!(!traits.has_collision);
    }

    #[test]
    fn deserializes_from_ron() {
        let source = r#"(
            tiles: [
                (name: "floor_moss", category: floor, weight: 3.0),
                (name: "bridge_rope", category: custom("bridge"), walkable: Some(true)),
            ],
            keywords: [
                (keyword: "lava", category: hazard),
            ],
        )"#;

        let catalog: TileCatalog = ron::from_str(source).expect("Catalog should parse");

        assert_eq!(catalog.tiles.len(), 2);
        assert_eq!(catalog.rule("floor_moss").unwrap().weight, 3.0);
        let bridge = catalog.rule("bridge_rope").unwrap();
        assert_eq!(bridge.category, Category::Custom("bridge".into()));
        assert_eq!(bridge.weight, 1.0);
        assert_eq!(catalog.keywords[0].category, Category::Hazard);
        assert!(catalog.rule("missing").is_none());
    }
}
