use thiserror::Error;

#[derive(Error, Debug)]
pub enum ThreadsError {
    /// The remote API answered with anything other than `200 OK`. `body` is the
    /// decoded error payload, untouched.
    #[error("Remote call failed with status {status}: {body}")]
    RemoteCallFailed {
        status: u16,
        body: serde_json::Value,
    },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid API response: {details}")]
    InvalidResponse { details: String },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ThreadsError {
    /// Returns the remote error payload if this is a `RemoteCallFailed`.
    pub fn remote_body(&self) -> Option<&serde_json::Value> {
        match self {
            ThreadsError::RemoteCallFailed { body, .. } => Some(body),
            _ => None,
        }
    }

    pub fn status_code(&self) -> Option<u16> {
        match self {
            ThreadsError::RemoteCallFailed { status, .. } => Some(*status),
            ThreadsError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },

    #[error("Failed to read configuration file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Missing required field: {field}")]
    MissingField { field: String },

    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not set: {var_name}")]
    MissingEnvironmentVariable { var_name: String },

    #[error("Configuration parsing error: {0}")]
    Parse(#[from] toml::de::Error),
}
