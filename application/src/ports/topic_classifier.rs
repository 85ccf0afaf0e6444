//! Topic classifier port
//!
//! Pluggable topical classification used by the input guard.

use async_trait::async_trait;
use haven_domain::Topic;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Classifier unavailable: {0}")]
    Unavailable(String),

    #[error("Unrecognized label: {0}")]
    UnrecognizedLabel(String),
}

#[async_trait]
pub trait TopicClassifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<Topic, ClassifierError>;
}
