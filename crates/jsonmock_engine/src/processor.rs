/* 📖 # What does a POST check, and in which order?

1. Some endpoint's base path ends the request path, otherwise 404.
2. The body is JSON, otherwise 400.
3. The stored value is an array and the body an object, otherwise 409.
4. If the endpoint declares a parameter other than `id`, the body carries a
   non-empty value for it, otherwise 400.
5. With `WritePolicy::unique_params`, no stored record has the same value for
   the parameter, otherwise 409.

The record then gets the next id and is appended, and the whole document is
written back to disk. Steps 3 to 5 and the write run under the store's write
lock, so concurrent POSTs never hand out the same id.
*/

use jsonmock_base::JsonMockResult;
use jsonmock_base::pal::http::HttpStatusCode;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::document::json_type_name;
use crate::registry::{EndpointDeclaration, EndpointRegistry};
use crate::router::{RouteMatch, Router, stringify};
use crate::store::{DocumentStore, StoreHandle};

/// Field holding the generated record id.
pub const ID_FIELD: &str = "id";

/// Why a request could not be served.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestError {
    /// No endpoint matches the request path.
    NotFound,
    /// The body is unusable or could not be stored.
    MalformedRequest { reason: String },
    /// The body or the stored data has the wrong shape for a write.
    Conflict { reason: String },
}

impl RequestError {
    pub fn status(&self) -> HttpStatusCode {
        match self {
            RequestError::NotFound => HttpStatusCode::NotFound,
            RequestError::MalformedRequest { .. } => HttpStatusCode::BadRequest,
            RequestError::Conflict { .. } => HttpStatusCode::Conflict,
        }
    }

    fn malformed(reason: impl Into<String>) -> Self {
        RequestError::MalformedRequest {
            reason: reason.into(),
        }
    }

    fn conflict(reason: impl Into<String>) -> Self {
        RequestError::Conflict {
            reason: reason.into(),
        }
    }
}

impl std::fmt::Display for RequestError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RequestError::NotFound => write!(f, "no endpoint matches the request path"),
            RequestError::MalformedRequest { reason } => write!(f, "malformed request: {}", reason),
            RequestError::Conflict { reason } => write!(f, "conflict: {}", reason),
        }
    }
}

impl std::error::Error for RequestError {}

/// Rules applied to POST bodies beyond the shape checks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WritePolicy {
    /// Reject a record whose parameter value is already taken.
    pub unique_params: bool,
}

/// Executes GET and POST requests against the store.
#[derive(Debug, Clone)]
pub struct RequestProcessor {
    router: Router,
    store: StoreHandle,
    policy: WritePolicy,
}

impl RequestProcessor {
    /// Create a processor whose endpoints are the keys of the stored document.
    ///
    /// Fails when a key is not a valid endpoint declaration.
    pub fn new(store: StoreHandle) -> JsonMockResult<Self> {
        let registry = store.read(EndpointRegistry::from_document)?;
        Ok(Self {
            router: Router::new(registry),
            store,
            policy: WritePolicy::default(),
        })
    }

    pub fn with_policy(mut self, policy: WritePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn store(&self) -> &StoreHandle {
        &self.store
    }

    /// Look up the data a GET on `path` returns.
    pub fn get(&self, path: &str) -> Result<Value, RequestError> {
        self.store
            .read(|document| {
                self.router
                    .match_path(document, path)
                    .map(RouteMatch::into_data)
            })
            .ok_or(RequestError::NotFound)
    }

    /// Append the JSON object in `body` to the collection at `path`.
    ///
    /// Returns the stored record including its generated id.
    pub fn post(&self, path: &str, body: &[u8]) -> Result<Value, RequestError> {
        let declaration = self
            .router
            .match_write_target(path)
            .ok_or(RequestError::NotFound)?;
        let body: Value = serde_json::from_slice(body)
            .map_err(|e| RequestError::malformed(format!("request body is not valid JSON: {}", e)))?;
        let key = self.router.registry().data_key_for(declaration);

        self.store.write(|store| {
            let mut collection = match store.document().get(key) {
                Some(Value::Array(records)) => records.clone(),
                Some(other) => {
                    return Err(RequestError::conflict(format!(
                        "endpoint '{}' holds {}, not a collection",
                        key,
                        json_type_name(other)
                    )));
                }
                None => {
                    return Err(RequestError::conflict(format!(
                        "endpoint '{}' holds no data",
                        key
                    )));
                }
            };
            let mut record = match body {
                Value::Object(record) => record,
                other => {
                    return Err(RequestError::conflict(format!(
                        "request body is {}, not an object",
                        json_type_name(&other)
                    )));
                }
            };
            self.validate(declaration, &record, &collection)?;

            let id = next_id(&collection)?;
            record.insert(ID_FIELD.to_string(), id.clone());
            let record = Value::Object(record);
            collection.push(record.clone());

            store
                .replace(key, Value::Array(collection))
                .map_err(|e| {
                    warn!(key, error = ?e, "failed to store new record");
                    RequestError::malformed(e.to_string())
                })?;
            info!(key, %id, "created record");
            Ok(record)
        })
    }

    fn validate(
        &self,
        declaration: &EndpointDeclaration,
        record: &Map<String, Value>,
        collection: &[Value],
    ) -> Result<(), RequestError> {
        let Some(param) = declaration.param_name() else {
            return Ok(());
        };
        if param == ID_FIELD {
            return Ok(());
        }
        let value = match record.get(param) {
            None | Some(Value::Null) => None,
            Some(Value::String(text)) if text.is_empty() => None,
            Some(value) => Some(value),
        };
        let Some(value) = value else {
            return Err(RequestError::malformed(format!(
                "request body is missing the '{}' field",
                param
            )));
        };

        if self.policy.unique_params {
            let wanted = stringify(value);
            let taken = collection.iter().any(|existing| {
                existing
                    .get(param)
                    .is_some_and(|field| stringify(field) == wanted)
            });
            if taken {
                return Err(RequestError::conflict(format!(
                    "a record with {} '{}' already exists",
                    param, wanted
                )));
            }
        }
        Ok(())
    }
}

/// Next free id: one above the highest integral id, or 1.
///
/// Ids stored as unsigned or as integral floats count too. Fails when the
/// next id does not fit a JSON integer.
fn next_id(collection: &[Value]) -> Result<Value, RequestError> {
    let Some(max) = collection
        .iter()
        .filter_map(|record| record.get(ID_FIELD).and_then(integral_id))
        .max()
    else {
        return Ok(Value::from(1));
    };
    let next = max
        .checked_add(1)
        .ok_or_else(|| RequestError::conflict(format!("no id left above {}", max)))?;
    if let Ok(next) = i64::try_from(next) {
        return Ok(Value::from(next));
    }
    u64::try_from(next)
        .map(Value::from)
        .map_err(|_| RequestError::conflict(format!("no id left above {}", max)))
}

fn integral_id(id: &Value) -> Option<i128> {
    if let Some(id) = id.as_i64() {
        return Some(i128::from(id));
    }
    if let Some(id) = id.as_u64() {
        return Some(i128::from(id));
    }
    // Saturates for floats beyond the i128 range
    id.as_f64()
        .filter(|id| id.is_finite() && id.fract() == 0.0)
        .map(|id| id as i128)
}
