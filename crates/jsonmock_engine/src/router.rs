/* 📖 # How does a request path find its endpoint?

Declarations are tried in document order and the first one that produces a
result wins. There is no ranking by specificity.

For each declaration whose base path occurs somewhere in the request path:

1. If the path ends with `/<base path>`, the whole value stored under the
   declaration's key is returned (collection match).
2. Otherwise the last path segment is a parameter value. The records whose
   parameter field equals that value form the result (parameter match). When
   no record matches, the search continues with the next declaration instead
   of failing, because a later declaration may still match.

Field values are compared as text so `/items/1` finds both `{"id": 1}` and
`{"id": "1"}`. Paths are percent-decoded before matching, so the key
`"my items"` is reached through `/my%20items`. The parameter value is decoded
on its own and may contain an encoded `/`.
*/

use std::borrow::Cow;

use percent_encoding::percent_decode_str;
use serde_json::Value;
use tracing::debug;

use crate::document::Document;
use crate::registry::{EndpointDeclaration, EndpointRegistry};

/// Result of routing a request path.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteMatch<'r> {
    /// The path names the endpoint itself.
    Collection {
        declaration: &'r EndpointDeclaration,
        data: Value,
    },
    /// The path ends with a parameter value matched by at least one record.
    Parameter {
        declaration: &'r EndpointDeclaration,
        value: String,
        records: Vec<Value>,
    },
}

impl<'r> RouteMatch<'r> {
    pub fn declaration(&self) -> &'r EndpointDeclaration {
        match self {
            RouteMatch::Collection { declaration, .. } => declaration,
            RouteMatch::Parameter { declaration, .. } => declaration,
        }
    }

    /// The data to send back to the client.
    pub fn into_data(self) -> Value {
        match self {
            RouteMatch::Collection { data, .. } => data,
            RouteMatch::Parameter { records, .. } => Value::Array(records),
        }
    }
}

/// Matches request paths against the declared endpoints.
#[derive(Debug, Clone)]
pub struct Router {
    registry: EndpointRegistry,
}

impl Router {
    pub fn new(registry: EndpointRegistry) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &EndpointRegistry {
        &self.registry
    }

    /// Resolve a GET path against `document`.
    pub fn match_path(&self, document: &Document, request_path: &str) -> Option<RouteMatch<'_>> {
        let raw_path = normalize_path(request_path);
        let decoded = decode(raw_path);
        let path: &str = &decoded;
        for declaration in self.registry.declarations() {
            let base_path = declaration.base_path();
            if !path.contains(base_path) {
                continue;
            }
            let Some(data) = document.get(self.registry.data_key_for(declaration)) else {
                continue;
            };

            if ends_with_segment(path, base_path) {
                debug!(key = declaration.key(), "collection match");
                return Some(RouteMatch::Collection {
                    declaration,
                    data: data.clone(),
                });
            }

            let (Some(param), Some(records)) = (declaration.param_name(), data.as_array()) else {
                continue;
            };
            let value = last_segment(raw_path);
            let matching: Vec<Value> = records
                .iter()
                .filter(|record| {
                    record
                        .get(param)
                        .is_some_and(|field| stringify(field) == value)
                })
                .cloned()
                .collect();
            if matching.is_empty() {
                continue;
            }
            debug!(key = declaration.key(), %value, count = matching.len(), "parameter match");
            return Some(RouteMatch::Parameter {
                declaration,
                value,
                records: matching,
            });
        }
        None
    }

    /// Find the endpoint a POST to `request_path` writes to.
    ///
    /// Only the base path is considered; a trailing parameter value never
    /// selects a write target.
    pub fn match_write_target(&self, request_path: &str) -> Option<&EndpointDeclaration> {
        let path = decode(normalize_path(request_path));
        self.registry
            .declarations()
            .iter()
            .find(|declaration| ends_with_segment(&path, declaration.base_path()))
    }
}

/// Drop the query string and trailing `/`.
fn normalize_path(path: &str) -> &str {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/')
}

fn decode(text: &str) -> Cow<'_, str> {
    percent_decode_str(text).decode_utf8_lossy()
}

fn ends_with_segment(path: &str, base_path: &str) -> bool {
    path.strip_suffix(base_path)
        .is_some_and(|rest| rest.ends_with('/'))
}

fn last_segment(path: &str) -> String {
    let segment = path.rsplit('/').next().unwrap_or_default();
    decode(segment).into_owned()
}

/// Text form used to compare a field with a path segment.
pub fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
