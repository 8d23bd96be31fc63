use thiserror::Error;

use crate::engine::game::GameStatus;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store I/O failed for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: std::io::Error,
    },
    #[error("value for key `{key}` is not valid UTF-8: {source}")]
    NotText {
        key: String,
        #[source]
        source: std::string::FromUtf8Error,
    },
    #[error("could not serialize value for key `{key}`: {source}")]
    Serialize {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Why a puzzle payload was rejected.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum PuzzleError {
    #[error("puzzle title is empty")]
    EmptyTitle,
    #[error("puzzle story is empty")]
    EmptyStory,
    #[error("question `{question}` has fewer than two options")]
    TooFewOptions { question: String },
    #[error("question `{question}` repeats option id `{option}`")]
    DuplicateOption { question: String, option: String },
    #[error("question `{question}` names missing correct option `{option}`")]
    MissingCorrectOption { question: String, option: String },
    #[error("question difficulties must rise from easy to hard")]
    DifficultyOrder,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("puzzle generation is disabled")]
    Disabled,
    #[cfg(feature = "network")]
    #[error("request to puzzle provider failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("puzzle provider answered with status {0}")]
    Status(u16),
    #[error("puzzle provider returned no content")]
    EmptyResponse,
    #[error("puzzle payload is not valid JSON for the schema: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("puzzle payload failed validation: {0}")]
    Invalid(#[from] PuzzleError),
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error("cannot {action} while {from:?}")]
    InvalidTransition {
        from: GameStatus,
        action: &'static str,
    },
    #[error("option `{0}` is not part of the current question")]
    UnknownOption(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}
