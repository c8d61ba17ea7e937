//! Error types for loading questions and persisting history.
//!
//! Neither kind is fatal: malformed records are skipped during a load and
//! storage failures degrade the no-repeat guarantee to best effort.

use thiserror::Error;

/// Why a source record could not become a [`Question`](crate::model::Question).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// Fewer fields than prompt + four options + answer.
    #[error("expected at least 6 fields, found {0}")]
    TooFewFields(usize),

    /// The answer text is not one of the four options.
    #[error("correct answer \"{0}\" matches none of the options")]
    AnswerNotInOptions(String),

    /// The same option text appears more than once.
    #[error("duplicate option \"{0}\"")]
    DuplicateOption(String),

    /// A JSON record did not carry exactly four options.
    #[error("expected 4 options, found {0}")]
    WrongOptionCount(usize),

    /// A JSON record's correct index points outside its options.
    #[error("correct index {0} is out of range")]
    CorrectIndexOutOfRange(usize),

    /// Another record already uses this id.
    #[error("duplicate question id {0}")]
    DuplicateId(String),

    /// Unrecognized difficulty label.
    #[error("{0}")]
    Difficulty(String),

    /// The row could not be decoded at all.
    #[error("unreadable record: {0}")]
    Unreadable(String),
}

/// A source record that was skipped during a load.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed record at {location}: {kind}")]
pub struct MalformedRecord {
    /// Where the record came from (e.g. "line 12" or "record 3").
    pub location: String,
    /// The prompt text, when it could be read.
    pub prompt: Option<String>,
    pub kind: RecordError,
}

/// Failures of the persistence layer behind the history ledger.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The store could not be read or written (permissions, quota, missing dir).
    #[error("history storage unavailable: {0}")]
    Unavailable(String),

    /// The stored blob exists but does not decode.
    #[error("history storage is corrupt: {0}")]
    Corrupt(String),
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Unavailable(e.to_string())
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(e: serde_json::Error) -> Self {
        StorageError::Corrupt(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn malformed_record_message() {
        let err = MalformedRecord {
            location: "line 4".into(),
            prompt: Some("What is a norm?".into()),
            kind: RecordError::AnswerNotInOptions("Rules".into()),
        };
        assert_eq!(
            err.to_string(),
            "malformed record at line 4: correct answer \"Rules\" matches none of the options"
        );
    }

    #[test]
    fn io_errors_map_to_unavailable() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert!(matches!(StorageError::from(io), StorageError::Unavailable(_)));
    }
}
