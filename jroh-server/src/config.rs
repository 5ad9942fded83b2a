//! Service configuration
//!
//! An explicit, immutable configuration struct built once at application
//! start and passed by reference to [`Site::new`](crate::Site::new). There
//! is no global settings object: everything the registry and dispatcher
//! consult at registration time lives here.
//!
//! # Examples
//!
//! ```rust
//! use jroh_server::ServiceConfig;
//!
//! let config = ServiceConfig::new("/api")
//!     .with_name("petstore")
//!     .with_base_url("https://rpc.example.com")
//!     .with_default_notification(false);
//!
//! assert_eq!(config.path, "/api");
//! assert!(config.default_validate);
//! assert!(!config.default_notification);
//! ```

/// Immutable service-wide configuration
///
/// The `default_validate` / `default_notification` flags seed every method
/// registered without an explicit per-method override.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Service name reported by `rpc.describe`
    pub name: String,
    /// Service version reported by `rpc.describe`
    pub version: String,
    /// Mount path of the POST dispatch endpoint
    pub path: String,
    /// Externally visible base URL, when known
    pub base_url: Option<String>,
    /// Default for the per-method `validate` option
    pub default_validate: bool,
    /// Default for the per-method `notification` option
    pub default_notification: bool,
}

impl ServiceConfig {
    /// Create a configuration for a service mounted at `path`
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            name: "jroh".to_string(),
            version: "2.0".to_string(),
            path: path.into(),
            base_url: None,
            default_validate: true,
            default_notification: true,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = version.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_default_validate(mut self, validate: bool) -> Self {
        self.default_validate = validate;
        self
    }

    pub fn with_default_notification(mut self, notification: bool) -> Self {
        self.default_notification = notification;
        self
    }

    /// The URL advertised in the service description's `servers` entry
    pub fn server_url(&self) -> String {
        match &self.base_url {
            Some(base) => format!("{}/{}", base.trim_end_matches('/'), self.path.trim_start_matches('/')),
            None => self.path.clone(),
        }
    }
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self::new("/api")
    }
}
