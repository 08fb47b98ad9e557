use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("No home directory")]
    NoHomeDir,

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Malformed identity token in line: {0}")]
    MalformedIdentity(String),

    #[error("Duplicate task identity: {0}")]
    DuplicateTask(String),

    #[error("Task {task} references unknown source {source_key}")]
    DanglingSource { task: String, source_key: String },

    #[error("Task not found: {0}")]
    TaskNotFound(String),

    #[error("Task {task} is missing required parameter '{parameter}'")]
    MissingParameter { task: String, parameter: String },

    #[error("Task {0} has no source")]
    MissingSource(String),

    #[error("Task {task} needs the product of {source_key}, which has none")]
    MissingArtifact { task: String, source_key: String },

    #[error("Dependency cycle detected at task: {0}")]
    Cycle(String),

    #[error("Operator '{operator}' failed: {message}")]
    Service { operator: String, message: String },
}

pub type Result<T> = std::result::Result<T, Error>;
