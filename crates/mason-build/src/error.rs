use thiserror::Error;

pub type Result<T> = std::result::Result<T, BuildError>;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Project '{0}' not found: no such file and no tsconfig.json under that path")]
    UnresolvedSpec(String),
}

impl BuildError {
    /// Create an unresolvable-project-spec error
    pub fn unresolved_spec(spec: impl Into<String>) -> Self {
        Self::UnresolvedSpec(spec.into())
    }
}
