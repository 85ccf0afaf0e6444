//! Primary/fallback model routing.
//!
//! Every generation step goes to the primary provider first. If it errors
//! or times out, the same step is retried once against the fallback. The
//! provider that answered is reported back for the audit record.

use crate::ports::model_adapter::{ModelAdapter, ModelError};
use haven_domain::{ConversationContext, ModelReply, ToolDefinition};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{info, warn};

/// Both providers failed (or the only one did).
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Provider failure: primary: {primary}; fallback: {fallback:?}")]
pub struct ProviderFailure {
    pub primary: ModelError,
    pub fallback: Option<ModelError>,
}

/// Reply plus the id of the provider that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct ServedReply {
    pub reply: ModelReply,
    pub provider: String,
}

pub struct ModelRouter {
    primary: Arc<dyn ModelAdapter>,
    fallback: Option<Arc<dyn ModelAdapter>>,
    timeout: Duration,
}

impl ModelRouter {
    pub fn new(primary: Arc<dyn ModelAdapter>, timeout: Duration) -> Self {
        Self {
            primary,
            fallback: None,
            timeout,
        }
    }

    pub fn with_fallback(mut self, fallback: Arc<dyn ModelAdapter>) -> Self {
        self.fallback = Some(fallback);
        self
    }

    pub fn primary_id(&self) -> &str {
        self.primary.provider_id()
    }

    pub async fn generate(
        &self,
        context: &ConversationContext,
        tools: &[ToolDefinition],
    ) -> Result<ServedReply, ProviderFailure> {
        let primary_error = match self.call(self.primary.as_ref(), context, tools).await {
            Ok(reply) => {
                return Ok(ServedReply {
                    reply,
                    provider: self.primary.provider_id().to_string(),
                });
            }
            Err(e) => e,
        };

        let Some(fallback) = &self.fallback else {
            warn!(provider = %self.primary.provider_id(), "Model call failed: {}", primary_error);
            return Err(ProviderFailure {
                primary: primary_error,
                fallback: None,
            });
        };

        info!(
            primary = %self.primary.provider_id(),
            fallback = %fallback.provider_id(),
            "Primary provider failed ({}); trying fallback",
            primary_error
        );
        match self.call(fallback.as_ref(), context, tools).await {
            Ok(reply) => Ok(ServedReply {
                reply,
                provider: fallback.provider_id().to_string(),
            }),
            Err(e) => {
                warn!(provider = %fallback.provider_id(), "Fallback provider failed: {}", e);
                Err(ProviderFailure {
                    primary: primary_error,
                    fallback: Some(e),
                })
            }
        }
    }

    async fn call(
        &self,
        adapter: &dyn ModelAdapter,
        context: &ConversationContext,
        tools: &[ToolDefinition],
    ) -> Result<ModelReply, ModelError> {
        match tokio::time::timeout(self.timeout, adapter.generate(context, tools)).await {
            Ok(result) => result,
            Err(_) => Err(ModelError::Timeout),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{ScriptedModel, draft};

    fn ctx() -> ConversationContext {
        ConversationContext::with_system("sys")
    }

    #[tokio::test]
    async fn test_primary_serves() {
        let primary = Arc::new(ScriptedModel::new("primary", vec![draft("ok")]));
        let fallback = Arc::new(ScriptedModel::new("fallback", vec![draft("backup")]));
        let router = ModelRouter::new(primary, Duration::from_secs(5)).with_fallback(fallback.clone());

        let served = router.generate(&ctx(), &[]).await.unwrap();
        assert_eq!(served.provider, "primary");
        assert_eq!(fallback.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_primary_timeout_falls_back() {
        let primary = Arc::new(
            ScriptedModel::new("primary", vec![draft("too late")]).with_delay(Duration::from_secs(60)),
        );
        let fallback = Arc::new(ScriptedModel::new("fallback", vec![draft("backup")]));
        let router = ModelRouter::new(primary, Duration::from_secs(5)).with_fallback(fallback);

        let served = router.generate(&ctx(), &[]).await.unwrap();
        assert_eq!(served.provider, "fallback");
        assert_eq!(served.reply, ModelReply::Draft("backup".to_string()));
    }

    #[tokio::test]
    async fn test_both_fail() {
        let primary = Arc::new(ScriptedModel::new(
            "primary",
            vec![Err(ModelError::Connection("refused".into()))],
        ));
        let fallback = Arc::new(ScriptedModel::new(
            "fallback",
            vec![Err(ModelError::RequestFailed("500".into()))],
        ));
        let router = ModelRouter::new(primary, Duration::from_secs(5)).with_fallback(fallback);

        let err = router.generate(&ctx(), &[]).await.unwrap_err();
        assert!(matches!(err.primary, ModelError::Connection(_)));
        assert!(matches!(err.fallback, Some(ModelError::RequestFailed(_))));
        assert!(err.to_string().contains("fallback"));
    }

    #[tokio::test]
    async fn test_no_fallback_configured() {
        let primary = Arc::new(ScriptedModel::new("primary", vec![Err(ModelError::Timeout)]));
        let router = ModelRouter::new(primary, Duration::from_secs(5));
        let err = router.generate(&ctx(), &[]).await.unwrap_err();
        assert_eq!(err.fallback, None);
    }
}
