//! Mock oracle for tests and offline runs
//!
//! Replies come from a script, in order, without any network calls. Every
//! conversation it receives is recorded so tests can inspect the transcript.

use crate::oracle::{GenerationOracle, Message, OracleStatus, ResponseFormat};
use sqlgen_core::{Result, SqlGenError};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Mutex;

/// An oracle that answers with scripted replies
#[derive(Default)]
pub struct MockOracle {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<Message>>>,
}

impl MockOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Oracle answering with `replies` in order
    pub fn with_replies<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Load replies from a JSON array of strings
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let replies: Vec<String> = serde_json::from_str(&content)?;
        Ok(Self::with_replies(replies))
    }

    /// Queue another reply
    pub fn push_reply(&self, reply: impl Into<String>) {
        if let Ok(mut replies) = self.replies.lock() {
            replies.push_back(reply.into());
        }
    }

    /// Every conversation received so far
    pub fn calls(&self) -> Vec<Vec<Message>> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or(0)
    }

    /// Replies not consumed yet
    pub fn remaining(&self) -> usize {
        self.replies.lock().map(|r| r.len()).unwrap_or(0)
    }
}

impl GenerationOracle for MockOracle {
    fn name(&self) -> &str {
        "mock"
    }

    fn health_check(&self) -> Result<OracleStatus> {
        Ok(OracleStatus::Available)
    }

    fn complete(&self, conversation: &[Message], _format: &ResponseFormat) -> Result<String> {
        self.calls
            .lock()
            .map_err(|_| SqlGenError::Oracle("mock oracle state poisoned".to_string()))?
            .push(conversation.to_vec());

        self.replies
            .lock()
            .map_err(|_| SqlGenError::Oracle("mock oracle state poisoned".to_string()))?
            .pop_front()
            .ok_or_else(|| SqlGenError::Oracle("mock oracle has no scripted reply left".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replies_in_order() {
        let oracle = MockOracle::with_replies(["first", "second"]);
        let conversation = vec![Message::user("hi")];
        assert_eq!(
            oracle.complete(&conversation, &ResponseFormat::Text).unwrap(),
            "first"
        );
        oracle.push_reply("third");
        assert_eq!(
            oracle.complete(&conversation, &ResponseFormat::Text).unwrap(),
            "second"
        );
        assert_eq!(oracle.remaining(), 1);
        assert_eq!(oracle.call_count(), 2);
        assert_eq!(oracle.calls()[0], conversation);
    }

    #[test]
    fn test_exhausted_script_is_an_oracle_error() {
        let oracle = MockOracle::new();
        let err = oracle.complete(&[], &ResponseFormat::Text).unwrap_err();
        assert!(matches!(err, SqlGenError::Oracle(_)));
    }

    #[test]
    fn test_from_file() {
        let dir = std::env::temp_dir().join(format!("sqlgen_mock_test_{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("replies.json");
        std::fs::write(&path, r#"["a", "b"]"#).unwrap();

        let oracle = MockOracle::from_file(&path).unwrap();
        assert_eq!(oracle.remaining(), 2);

        std::fs::remove_dir_all(&dir).ok();
    }
}
