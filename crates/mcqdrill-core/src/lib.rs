//! mcqdrill-core: question selection, history ledger, and negative-marking grader.
//!
//! This crate defines the question data model, the immutable question bank,
//! the per-user served-question ledger, and the selection and grading logic
//! that the `mcqdrill` CLI (or any other front end) builds on.

pub mod bank;
pub mod config;
pub mod error;
pub mod grader;
pub mod history;
pub mod model;
pub mod report;
pub mod selector;

pub use bank::QuestionBank;
pub use grader::grade_session;
pub use history::{HistoryStore, JsonFileHistoryStore, Ledger, MemoryHistoryStore};
pub use model::{Question, TestMode, TestResult, TestSession};
pub use selector::Selector;
