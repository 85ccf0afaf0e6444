//! Classification by asking a language model for a single label.

use async_trait::async_trait;
use haven_application::{ClassifierError, ModelAdapter, TopicClassifier};
use haven_domain::{ConversationContext, Message, ModelReply, PromptTemplate, Topic};
use std::sync::Arc;
use tracing::debug;

pub struct ModelClassifier {
    adapter: Arc<dyn ModelAdapter>,
}

impl ModelClassifier {
    pub fn new(adapter: Arc<dyn ModelAdapter>) -> Self {
        Self { adapter }
    }
}

#[async_trait]
impl TopicClassifier for ModelClassifier {
    async fn classify(&self, text: &str) -> Result<Topic, ClassifierError> {
        let mut context = ConversationContext::new();
        context.push(Message::user(PromptTemplate::topic_classification(text)));

        let reply = self
            .adapter
            .generate(&context, &[])
            .await
            .map_err(|e| ClassifierError::Unavailable(e.to_string()))?;
        match reply {
            ModelReply::Draft(answer) => {
                debug!(provider = self.adapter.provider_id(), answer = %answer, "Classifier answer");
                parse_label(&answer)
            }
            ModelReply::ToolCalls(_) => Err(ClassifierError::UnrecognizedLabel(
                "model requested tools instead of answering".to_string(),
            )),
        }
    }
}

/// Read a label out of a model answer.
///
/// Accepts the bare label with stray quotes or punctuation, or a sentence
/// naming exactly one label.
pub fn parse_label(answer: &str) -> Result<Topic, ClassifierError> {
    let bare = answer.trim().trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '.' | '*'));
    if let Ok(topic) = bare.parse::<Topic>() {
        return Ok(topic);
    }

    let lower = answer.to_lowercase();
    let named: Vec<Topic> = Topic::ALL
        .into_iter()
        .filter(|t| lower.contains(t.as_str()))
        .collect();
    match named.as_slice() {
        [topic] => Ok(*topic),
        _ => Err(ClassifierError::UnrecognizedLabel(answer.trim().to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use haven_application::ModelError;
    use haven_domain::ToolDefinition;
    use std::sync::Mutex;

    struct CannedModel {
        reply: Result<ModelReply, ModelError>,
        prompts: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ModelAdapter for CannedModel {
        fn provider_id(&self) -> &str {
            "canned"
        }

        async fn generate(
            &self,
            context: &ConversationContext,
            tools: &[ToolDefinition],
        ) -> Result<ModelReply, ModelError> {
            assert!(tools.is_empty());
            self.prompts
                .lock()
                .unwrap()
                .push(context.messages()[0].content.clone());
            self.reply.clone()
        }
    }

    fn classifier(reply: Result<ModelReply, ModelError>) -> (ModelClassifier, Arc<CannedModel>) {
        let model = Arc::new(CannedModel {
            reply,
            prompts: Mutex::new(Vec::new()),
        });
        (ModelClassifier::new(model.clone()), model)
    }

    #[tokio::test]
    async fn test_label_is_parsed() {
        let (c, model) = classifier(Ok(ModelReply::Draft("weather-query\n".to_string())));
        assert_eq!(c.classify("Rain in Tampa?").await, Ok(Topic::WeatherQuery));
        assert!(model.prompts.lock().unwrap()[0].contains("Rain in Tampa?"));
    }

    #[tokio::test]
    async fn test_model_failure_is_unavailable() {
        let (c, _) = classifier(Err(ModelError::Timeout));
        assert!(matches!(
            c.classify("Rain in Tampa?").await,
            Err(ClassifierError::Unavailable(_))
        ));
    }

    #[test]
    fn test_parse_label_variants() {
        assert_eq!(parse_label("\"Preparedness_Question\"."), Ok(Topic::PreparednessQuestion));
        assert_eq!(parse_label("Label: outside-coverage"), Ok(Topic::OutsideCoverage));
        assert!(matches!(
            parse_label("I am not sure"),
            Err(ClassifierError::UnrecognizedLabel(_))
        ));
        assert!(parse_label("weather-query or location-query").is_err());
    }
}
