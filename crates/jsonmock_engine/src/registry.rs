/* 📖 # How are endpoints declared?

There is no route configuration: every top-level key of the data document is
an endpoint. A key may name one parameter after a `:`, which lets clients
filter the collection by that field:

    "items"        GET /items returns the whole value
    "users/:name"  GET /users returns all users, GET /users/bob those named bob

The key itself stays the lookup key into the document, so writing
`users:name` instead of `users/:name` works just as well.
*/

use jsonmock_base::{JsonMockError, JsonMockResult};
use tracing::debug;

use crate::document::Document;

/// Delimiter between the base path and the parameter name of a key.
pub const PARAM_SPECIFIER: char = ':';

/// One endpoint derived from a document key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointDeclaration {
    key: String,
    base_path: String,
    param_name: Option<String>,
}

impl EndpointDeclaration {
    /// Parse a document key into an endpoint declaration.
    ///
    /// ```
    /// use jsonmock_engine::EndpointDeclaration;
    ///
    /// let decl = EndpointDeclaration::parse("users/:name").unwrap();
    /// assert_eq!(decl.base_path(), "users");
    /// assert_eq!(decl.param_name(), Some("name"));
    /// ```
    pub fn parse(key: &str) -> JsonMockResult<Self> {
        let mut parts = key.split(PARAM_SPECIFIER);
        let base = parts.next().unwrap_or_default();
        let param = parts.next();
        if parts.next().is_some() {
            return Err(config_error(key, "declares more than one parameter"));
        }

        let base_path = base.trim_matches('/');
        if base_path.is_empty() {
            return Err(config_error(key, "has an empty base path"));
        }
        let param_name = match param {
            Some("") => return Err(config_error(key, "has an empty parameter name")),
            Some(name) => Some(name.to_string()),
            None => None,
        };

        Ok(Self {
            key: key.to_string(),
            base_path: base_path.to_string(),
            param_name,
        })
    }

    /// The literal document key this endpoint was declared with.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Path without leading or trailing `/`.
    pub fn base_path(&self) -> &str {
        &self.base_path
    }

    pub fn param_name(&self) -> Option<&str> {
        self.param_name.as_deref()
    }
}

fn config_error(key: &str, problem: &str) -> Box<JsonMockError> {
    Box::new(JsonMockError::config(format!("endpoint '{}' {}", key, problem)))
}

/// Ordered list of endpoints; order decides match precedence.
#[derive(Debug, Clone, Default)]
pub struct EndpointRegistry {
    declarations: Vec<EndpointDeclaration>,
}

impl EndpointRegistry {
    /// Build the registry from the keys of a document.
    pub fn from_document(document: &Document) -> JsonMockResult<Self> {
        Self::from_keys(document.keys())
    }

    /// Build the registry from endpoint keys, keeping their order.
    pub fn from_keys<'a>(keys: impl IntoIterator<Item = &'a str>) -> JsonMockResult<Self> {
        let declarations = keys
            .into_iter()
            .map(EndpointDeclaration::parse)
            .collect::<JsonMockResult<Vec<_>>>()?;
        for declaration in &declarations {
            debug!(
                key = declaration.key(),
                base_path = declaration.base_path(),
                param = ?declaration.param_name(),
                "registered endpoint"
            );
        }
        Ok(Self { declarations })
    }

    pub fn declarations(&self) -> &[EndpointDeclaration] {
        &self.declarations
    }

    /// Document key holding the data of `declaration`.
    pub fn data_key_for<'a>(&self, declaration: &'a EndpointDeclaration) -> &'a str {
        declaration.key()
    }

    pub fn len(&self) -> usize {
        self.declarations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.declarations.is_empty()
    }
}
