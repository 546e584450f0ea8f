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

//! Defines the error taxonomy of the resolution pipeline.

use crate::resource::ResourceKind;
use std::fmt;

/// An error surfaced by a synchronous resolution call.
///
/// A resource the repository does not know about is *not* an error: it is an
/// absent result plus a [`LoadFailure::NotFound`] notification.
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// The request itself was malformed (empty name, for instance).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// The repository failed unexpectedly while materializing a resource.
    #[error("repository failed to resolve {kind} '{name}': {source}")]
    Repository {
        /// The requested name.
        name: String,
        /// The requested kind.
        kind: ResourceKind,
        /// The error raised by the repository.
        #[source]
        source: anyhow::Error,
    },
    /// One or more required resources could not be resolved.
    #[error("missing required {kind} resources: {}", names.join(", "))]
    MissingRequired {
        /// The kind the names were resolved as.
        kind: ResourceKind,
        /// Every name that did not resolve, in request order.
        names: Vec<String>,
    },
    /// A configuration document could not be read or parsed.
    #[error("configuration error: {0}")]
    Config(String),
}

/// A specialized `Result` type for resolution operations.
pub type ResolveResult<T> = Result<T, ResolveError>;

/// The reason carried by a load-failed notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadFailure {
    /// The repository has no resource under that name.
    NotFound,
    /// The repository raised an error; the message is kept for observers.
    Repository(String),
}

impl fmt::Display for LoadFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LoadFailure::NotFound => f.write_str("resource not found"),
            LoadFailure::Repository(message) => write!(f, "repository error: {message}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn repository_error_keeps_its_source() {
        let err = ResolveError::Repository {
            name: "floor".into(),
            kind: ResourceKind::Tile,
            source: anyhow::anyhow!("disk on fire"),
        };
        assert_eq!(
            err.to_string(),
            "repository failed to resolve tile 'floor': disk on fire"
        );
        assert!(err.source().is_some());
    }

    #[test]
    fn missing_required_lists_every_name() {
        let err = ResolveError::MissingRequired {
            kind: ResourceKind::Prefab,
            names: vec!["chest".into(), "altar".into()],
        };
        assert_eq!(err.to_string(), "missing required prefab resources: chest, altar");
    }
}
