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

use serde::{Deserialize, Serialize};
use std::fmt;

/// A semantic grouping of interchangeable tiles, independent of [`ResourceKind`].
///
/// [`ResourceKind`]: super::ResourceKind
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Walkable ground.
    Floor,
    /// Solid boundaries.
    Wall,
    /// Passages between rooms.
    Door,
    /// Connective ground between rooms.
    Corridor,
    /// Liquid surfaces.
    Water,
    /// Non-blocking props.
    Decoration,
    /// Tiles that damage or block actors.
    Hazard,
    /// Fallback when nothing else matches.
    #[default]
    General,
    /// A designer-defined category.
    Custom(String),
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Floor => f.write_str("floor"),
            Category::Wall => f.write_str("wall"),
            Category::Door => f.write_str("door"),
            Category::Corridor => f.write_str("corridor"),
            Category::Water => f.write_str("water"),
            Category::Decoration => f.write_str("decoration"),
            Category::Hazard => f.write_str("hazard"),
            Category::General => f.write_str("general"),
            Category::Custom(name) => f.write_str(name),
        }
    }
}

/// The designer-facing attributes attached to a categorized tile.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TileTraits {
    /// Relative selection weight. Zero keeps the tile out of weighted draws.
    pub weight: f32,
    /// Whether actors can stand on the tile.
    pub walkable: bool,
    /// Whether the tile blocks movement.
    pub has_collision: bool,
}

impl TileTraits {
    /// The attributes a tile of `category` gets when nothing configures it.
    pub fn for_category(category: &Category) -> Self {
        let (walkable, has_collision) = match category {
            Category::Floor | Category::Door | Category::Corridor | Category::Decoration => {
                (true, false)
            }
            Category::Wall => (false, true),
            Category::Water | Category::Hazard => (false, false),
            Category::General | Category::Custom(_) => (true, false),
        };
        Self {
            weight: 1.0,
            walkable,
            has_collision,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walls_collide_and_floors_do_not() {
        let wall = TileTraits::for_category(&Category::Wall);
        assert!(!wall.walkable);
        assert!(wall.has_collision);

        let floor = TileTraits::for_category(&Category::Floor);
        assert!(floor.walkable);
        assert!(!floor.has_collision);
        assert_eq!(floor.weight, 1.0);
    }

    #[test]
    fn custom_category_displays_its_name() {
        assert_eq!(Category::Custom("bridge".into()).to_string(), "bridge");
        assert_eq!(Category::default(), Category::General);
    }
}
