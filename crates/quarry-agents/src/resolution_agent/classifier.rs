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

//! Name- and catalog-driven tile classification.

use ahash::AHashMap;
use quarry_core::repository::Classifier;
use quarry_core::resource::{Category, ResourceHandle, TileTraits};
use quarry_data::catalog::{TileCatalog, TileRule};

/// Keywords checked when neither an exact rule nor a configured keyword matches.
const BUILTIN_KEYWORDS: &[(&str, Category)] = &[
    ("floor", Category::Floor),
    ("ground", Category::Floor),
    ("wall", Category::Wall),
    ("door", Category::Door),
    ("gate", Category::Door),
    ("corridor", Category::Corridor),
    ("path", Category::Corridor),
    ("water", Category::Water),
    ("lava", Category::Hazard),
    ("spike", Category::Hazard),
    ("trap", Category::Hazard),
    ("decor", Category::Decoration),
    ("prop", Category::Decoration),
];

/// Classifies tiles from a [`TileCatalog`], then by name keywords.
///
/// Lookup order: exact tile rule, configured keywords in order, built-in
/// keywords, and finally [`Category::General`]. Keyword matching is a
/// case-insensitive substring test.
#[derive(Debug, Clone)]
pub struct CatalogClassifier {
    rules: AHashMap<String, TileRule>,
    keywords: Vec<(String, Category)>,
}

impl CatalogClassifier {
    /// Builds a classifier from a catalog.
    pub fn new(catalog: &TileCatalog) -> Self {
        let rules = catalog
            .tiles
            .iter()
            .map(|rule| (rule.name.clone(), rule.clone()))
            .collect();

        let keywords = catalog
            .keywords
            .iter()
            .map(|rule| (rule.keyword.to_lowercase(), rule.category.clone()))
            .chain(
                BUILTIN_KEYWORDS
                    .iter()
                    .map(|(keyword, category)| (keyword.to_string(), category.clone())),
            )
            .collect();

        Self { rules, keywords }
    }

    /// Classifies a bare name.
    pub fn classify_name(&self, name: &str) -> Category {
        if let Some(rule) = self.rules.get(name) {
            return rule.category.clone();
        }

        let lowered = name.to_lowercase();
        self.keywords
            .iter()
            .find(|(keyword, _)| lowered.contains(keyword.as_str()))
            .map(|(_, category)| category.clone())
            .unwrap_or_default()
    }
}

impl Default for CatalogClassifier {
    fn default() -> Self {
        Self::new(&TileCatalog::default())
    }
}

impl Classifier for CatalogClassifier {
    fn classify(&self, resource: &ResourceHandle) -> Category {
        self.classify_name(resource.name())
    }

    fn traits(&self, resource: &ResourceHandle, category: &Category) -> TileTraits {
        match self.rules.get(resource.name()) {
            Some(rule) if &rule.category == category => rule.traits(),
            _ => TileTraits::for_category(category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quarry_data::catalog::KeywordRule;

    fn catalog() -> TileCatalog {
        TileCatalog {
            tiles: vec![TileRule {
                name: "mossy_stones".into(),
                category: Category::Floor,
                weight: 4.0,
                walkable: None,
                has_collision: None,
            }],
            keywords: vec![KeywordRule {
                keyword: "Bridge".into(),
                category: Category::Custom("bridge".into()),
            }],
        }
    }

    #[test]
    fn exact_rule_wins() {
        let classifier = CatalogClassifier::new(&catalog());
        assert_eq!(classifier.classify_name("mossy_stones"), Category::Floor);
    }

    #[test]
    fn configured_keywords_come_before_builtins() {
        let classifier = CatalogClassifier::new(&catalog());
        assert_eq!(
            classifier.classify_name("bridge_over_water"),
            Category::Custom("bridge".into())
        );
        assert_eq!(classifier.classify_name("Stone_WALL_02"), Category::Wall);
        assert_eq!(classifier.classify_name("deep_water"), Category::Water);
    }

    #[test]
    fn unmatched_names_are_general() {
        let classifier = CatalogClassifier::default();
        assert_eq!(classifier.classify_name("mystery"), Category::General);
    }
}
