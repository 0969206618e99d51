//! Error types for route registration, path generation and route tables.
//!
//! Registration and path generation have disjoint taxonomies. Both describe
//! programming mistakes that should surface while the routing table is being
//! assembled, never during request traffic: dispatch itself cannot fail and
//! reports unmatched requests through [`crate::Dispatch::code`].

use std::path::PathBuf;
use thiserror::Error;

/// Raised while registering routes on a [`crate::RouterBuilder`].
///
/// A registration error is fatal to the call that raised it and may leave the
/// tree partially built. Callers should stop registering and discard the
/// builder.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    /// The method is already bound at the terminal node of this pattern.
    #[error("Route already exists: {method} {pattern}")]
    RouteExists {
        /// Upper-cased HTTP method
        method: String,
        /// Sanitized pattern as registered
        pattern: String,
    },
    /// Another route already claimed this name.
    #[error("Named route already exists: {0}")]
    NamedRouteExists(String),
    /// A `:` or `?` marker without a name after it.
    #[error("Route parameter must have a name.")]
    MissingParameterName,
    /// A literal or required parameter after an optional one.
    #[error("An optional parameter may only be followed by optional and wildcard parameters.")]
    InvalidOptionalParameter,
    /// A wildcard that is not the final segment.
    #[error("A wildcard must be the last route segment.")]
    InvalidWildcardParameter,
    /// The method string is not a valid HTTP method token.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),
}

/// Raised by reverse path generation.
#[derive(Debug, Error)]
pub enum PathError {
    /// No route was registered under this name.
    #[error("Named route does not exist: {0}")]
    NamedRouteUndefined(String),
    /// A required parameter had no value.
    #[error("No value given for route parameter: {0}")]
    MissingParameterValue(String),
    /// Name-keyed data cannot address an unnamed wildcard.
    #[error("Wildcard parameter must have a name.")]
    MissingWildcardName,
    /// Wildcard values must be sequences.
    #[error("Value for route wildcard must be an array.")]
    InvalidWildcardValue,
    /// A sequence or record was given for a single-segment parameter.
    #[error("Value for route parameter {0} must be a scalar.")]
    InvalidParameterValue(String),
    /// The supplied data could not be serialized.
    #[error("Route data could not be serialized: {0}")]
    InvalidData(#[from] serde_json::Error),
}

/// Raised while loading or building a [`crate::table::RouteTable`].
#[derive(Debug, Error)]
pub enum TableError {
    /// The table file could not be read.
    #[error("failed to read route table {path}: {source}")]
    Io {
        /// File that failed to load
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
    /// YAML parse failure
    #[error("invalid YAML route table: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// JSON parse failure
    #[error("invalid JSON route table: {0}")]
    Json(#[from] serde_json::Error),
    /// TOML parse failure
    #[error("invalid TOML route table: {0}")]
    Toml(#[from] toml::de::Error),
    /// The file extension does not name a supported format.
    #[error("unsupported route table format: {0}")]
    UnknownFormat(String),
    /// A declared route was rejected by the builder.
    #[error(transparent)]
    Route(#[from] RouteError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_follow_registration_wording() {
        let err = RouteError::RouteExists {
            method: "GET".into(),
            pattern: "pages/:id".into(),
        };
        assert_eq!(err.to_string(), "Route already exists: GET pages/:id");
        assert_eq!(
            PathError::MissingParameterValue("id".into()).to_string(),
            "No value given for route parameter: id"
        );
    }

    #[test]
    fn route_error_converts_into_table_error() {
        let err: TableError = RouteError::MissingParameterName.into();
        assert!(matches!(err, TableError::Route(RouteError::MissingParameterName)));
        assert_eq!(err.to_string(), "Route parameter must have a name.");
    }
}
