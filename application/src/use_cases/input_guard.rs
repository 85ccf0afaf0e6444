//! Input guard use case.
//!
//! Screens a user turn before any model or tool work. The guard fails
//! closed: a classifier error or timeout refuses the turn.

use crate::config::GuardParams;
use crate::ports::topic_classifier::TopicClassifier;
use haven_domain::guard::reasons;
use haven_domain::{GuardVerdict, Topic};
use std::sync::Arc;
use tracing::{debug, warn};

pub struct InputGuard {
    classifier: Arc<dyn TopicClassifier>,
    params: GuardParams,
}

impl InputGuard {
    pub fn new(classifier: Arc<dyn TopicClassifier>, params: GuardParams) -> Self {
        Self { classifier, params }
    }

    /// Classify one user turn.
    pub async fn evaluate(&self, text: &str) -> GuardVerdict {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return GuardVerdict::malformed(reasons::EMPTY_INPUT);
        }
        if trimmed.chars().count() > self.params.max_input_chars {
            return GuardVerdict::malformed(reasons::INPUT_TOO_LONG);
        }

        let classified =
            tokio::time::timeout(self.params.classifier_timeout, self.classifier.classify(trimmed))
                .await;

        let topic: Topic = match classified {
            Ok(Ok(topic)) => topic,
            Ok(Err(e)) => {
                warn!("Topic classifier failed: {}", e);
                return GuardVerdict::malformed(reasons::GUARD_UNAVAILABLE);
            }
            Err(_) => {
                warn!(
                    "Topic classifier timed out after {:?}",
                    self.params.classifier_timeout
                );
                return GuardVerdict::malformed(reasons::GUARD_UNAVAILABLE);
            }
        };

        debug!(topic = %topic, "Classified user turn");
        if topic.is_in_scope() {
            GuardVerdict::accepted(topic)
        } else {
            GuardVerdict::out_of_scope(topic)
        }
    }
}
