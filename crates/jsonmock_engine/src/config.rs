use serde::Deserialize;

/// Port whose number is left out of the advertised URL.
pub const DEFAULT_PORT: u16 = 80;

/// Data file used when none is given on the command line.
pub const DEFAULT_DATA_FILE: &str = "db.json";

/// Runtime configuration of a mock server instance.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind the HTTP listener to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// JSON file holding routes and data.
    pub data_file: String,
    /// Fake hostname registered in the hosts file while the server runs.
    pub hostname: Option<String>,
    /// Reject POSTs whose parameter value already exists in the collection.
    pub unique_params: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            data_file: DEFAULT_DATA_FILE.to_string(),
            hostname: None,
            unique_params: false,
        }
    }
}

impl ServerConfig {
    /// URL clients should use to reach the server.
    ///
    /// ```
    /// use jsonmock_engine::ServerConfig;
    ///
    /// let config = ServerConfig { port: 8080, ..ServerConfig::default() };
    /// assert_eq!(config.display_url(), "http://localhost:8080/");
    /// ```
    pub fn display_url(&self) -> String {
        let host = self.hostname.as_deref().unwrap_or("localhost");
        if self.port == DEFAULT_PORT {
            format!("http://{}/", host)
        } else {
            format!("http://{}:{}/", host, self.port)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 80);
        assert_eq!(config.data_file, "db.json");
        assert!(!config.unique_params);
        assert_eq!(config.display_url(), "http://localhost/");
    }

    #[test]
    fn test_display_url_with_hostname() {
        let config = ServerConfig {
            hostname: Some("api.test".to_string()),
            ..ServerConfig::default()
        };
        assert_eq!(config.display_url(), "http://api.test/");

        let config = ServerConfig {
            port: 3000,
            ..config
        };
        assert_eq!(config.display_url(), "http://api.test:3000/");
    }

    #[test]
    fn test_deserialize_partial() {
        let config: ServerConfig =
            serde_json::from_str(r#"{"port": 8000, "unique_params": true}"#).unwrap();
        assert_eq!(config.port, 8000);
        assert!(config.unique_params);
        assert_eq!(config.data_file, "db.json");
        assert_eq!(config.host, "0.0.0.0");
    }
}
