//! Error types shared by every pipeline stage

use std::io;
use thiserror::Error;

/// Pipeline errors
#[derive(Error, Debug)]
pub enum TriadError {
    /// A record could not be decoded into the shape its stage expects
    #[error("Parse error at line {line}: {message}")]
    Parse { line: u64, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Invalid job configuration
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Configuration file could not be decoded
    #[error("Configuration file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Report serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stage observed a cancellation request
    #[error("Stage '{stage}' was cancelled")]
    Cancelled { stage: String },

    /// A split or partition kept failing after every re-execution
    #[error("Stage '{stage}' failed after {attempts} attempt(s): {source}")]
    StageFailed {
        stage: String,
        attempts: u32,
        #[source]
        source: Box<TriadError>,
    },
}

impl TriadError {
    /// Build a parse error for the given (1-based) input line
    pub fn parse(line: u64, message: impl Into<String>) -> Self {
        TriadError::Parse {
            line,
            message: message.into(),
        }
    }

    /// The innermost error, unwrapping stage failures
    pub fn root_cause(&self) -> &TriadError {
        match self {
            TriadError::StageFailed { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// True for cancellation, including cancellation wrapped by a stage failure
    pub fn is_cancelled(&self) -> bool {
        match self {
            TriadError::Cancelled { .. } => true,
            TriadError::StageFailed { source, .. } => source.is_cancelled(),
            _ => false,
        }
    }
}

pub type TriadResult<T> = Result<T, TriadError>;
