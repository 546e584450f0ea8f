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

//! Aggregated outcomes of batch resolution.

use quarry_core::error::{ResolveError, ResolveResult};
use quarry_core::resource::ResourceKind;

/// What happened to each name of a batch, grouped by outcome.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchReport {
    /// The kind every name was resolved as.
    pub kind: ResourceKind,
    /// Names that resolved, in request order.
    pub resolved: Vec<String>,
    /// Names the repository does not know, in request order.
    pub missing: Vec<String>,
    /// Names that failed with an error, with its message.
    pub failed: Vec<(String, String)>,
}

/// The outcome of `validate_required`: the full report when every name
/// resolved, one aggregate error listing every unresolved name otherwise.
pub type ValidationResult = ResolveResult<BatchReport>;

impl BatchReport {
    pub(crate) fn new(kind: ResourceKind) -> Self {
        Self {
            kind,
            resolved: Vec::new(),
            missing: Vec::new(),
            failed: Vec::new(),
        }
    }

    /// Number of names processed.
    pub fn requested(&self) -> usize {
        self.resolved.len() + self.missing.len() + self.failed.len()
    }

    /// Returns `true` if every name resolved.
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty() && self.failed.is_empty()
    }

    /// Every unresolved name: missing ones first, then failed ones.
    pub fn unresolved(&self) -> Vec<String> {
        self.missing
            .iter()
            .cloned()
            .chain(self.failed.iter().map(|(name, _)| name.clone()))
            .collect()
    }

    /// Turns an incomplete report into [`ResolveError::MissingRequired`].
    pub fn into_validation(self) -> ValidationResult {
        if self.is_complete() {
            Ok(self)
        } else {
            Err(ResolveError::MissingRequired {
                kind: self.kind,
                names: self.unresolved(),
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incomplete_report_aggregates_every_name() {
        let mut report = BatchReport::new(ResourceKind::Tile);
        report.resolved.push("floor".into());
        report.missing.push("lava".into());
        report.failed.push(("broken".into(), "io".into()));

        assert_eq!(report.requested(), 3);
        match report.into_validation() {
            Err(ResolveError::MissingRequired { kind, names }) => {
                assert_eq!(kind, ResourceKind::Tile);
                assert_eq!(names, vec!["lava".to_string(), "broken".to_string()]);
            }
            other => panic!("Unexpected validation outcome: {other:?}"),
        }
    }

    #[test]
    fn complete_report_validates() {
        let mut report = BatchReport::new(ResourceKind::Config);
        report.resolved.push("rules".into());
        assert!(report.into_validation().is_ok());
    }
}
