//! Portal configuration

/// Public HAPI test server used outside development mode
pub const DEFAULT_FHIR_SERVER_URL: &str = "https://hapi.fhir.org/baseR4";

/// Portal configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_address: String,
    pub fhir_server_url: String,
    /// Development mode: honours `FHIR_SERVER_URL`
    pub development: bool,
    pub request_timeout_secs: u64,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// `.env` is read by the binary before this is called.
    pub fn from_env() -> Self {
        let development = std::env::var("DEVELOPMENT")
            .map(|v| is_truthy(&v))
            .unwrap_or(false);

        let fhir_server_url = if development {
            std::env::var("FHIR_SERVER_URL").unwrap_or_else(|_| DEFAULT_FHIR_SERVER_URL.into())
        } else {
            DEFAULT_FHIR_SERVER_URL.into()
        };

        let bind_address = match (std::env::var("IP"), std::env::var("PORT")) {
            (Ok(ip), Ok(port)) => format!("{}:{}", ip, port),
            _ => std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:8080".into()),
        };

        let request_timeout_secs = std::env::var("FHIR_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(30);

        Self {
            bind_address,
            fhir_server_url,
            development,
            request_timeout_secs,
        }
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}
