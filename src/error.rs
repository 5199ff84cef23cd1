use thiserror::Error;

pub type Result<T> = anyhow::Result<T>;

#[derive(Debug, Error)]
pub enum ScaffoldError {
    #[error("registry lookup for {name} failed: {message}")]
    Registry { name: String, message: String },

    #[error("unable to resolve a version for {name}")]
    Resolution {
        name: String,
        #[source]
        source: anyhow::Error,
    },

    #[error("{manager} exited with status {status}")]
    Installation { manager: String, status: i32 },

    #[error("failed to spawn {program}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("no package.json found at {path}")]
    ManifestMissing { path: String },

    #[error("invalid package specifier '{0}'")]
    InvalidSpecifier(String),
}

impl ScaffoldError {
    pub fn registry(name: &str, message: impl Into<String>) -> Self {
        Self::Registry { name: name.to_string(), message: message.into() }
    }
}
