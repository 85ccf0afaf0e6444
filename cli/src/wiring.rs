//! Composition root: builds the session service from a loaded config.

use anyhow::{Context, Result};
use haven_application::{
    AlertEscalator, AlertRefresher, AuditLogger, AuditSink, InputGuard, ModelRouter, NoAuditSink,
    Orchestrator, ResponseValidator, SessionService, ToolInvoker, TopicClassifier,
};
use haven_infrastructure::config::FileConfig;
use haven_infrastructure::{
    ClassifierKind, JsonlAuditSink, KeywordClassifier, ModelClassifier, build_adapter,
    build_registry, catalog_spec,
};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

fn env_lookup(name: &str) -> Option<String> {
    std::env::var(name).ok()
}

/// Running application: sessions plus the background alert refresher.
pub struct App {
    pub service: Arc<SessionService>,
    shutdown: CancellationToken,
    refresher: Option<JoinHandle<()>>,
}

impl App {
    pub async fn build(config: &FileConfig) -> Result<Self> {
        let params = config.orchestrator.to_params();

        // Models
        let primary = build_adapter(&config.providers.primary, &env_lookup)
            .context("failed to set up the primary model provider")?;
        let mut models = ModelRouter::new(primary.clone(), params.model_timeout);
        if let Some(fallback_config) = &config.providers.fallback {
            match build_adapter(fallback_config, &env_lookup) {
                Ok(fallback) => models = models.with_fallback(fallback),
                Err(e) => warn!("Fallback provider disabled: {}", e),
            }
        }
        info!(provider = models.primary_id(), "Model provider ready");

        // Tools
        let registry = build_registry(&config.services, &env_lookup)
            .await
            .context("failed to set up tool backends")?;
        let invoker = Arc::new(
            ToolInvoker::new(Arc::new(registry))
                .with_overrides(config.tools.to_overrides(&catalog_spec())),
        );

        // Guard
        let classifier: Arc<dyn TopicClassifier> = match config.guard.classifier {
            ClassifierKind::Keyword => Arc::new(
                KeywordClassifier::with_unrelated_patterns(&config.guard.extra_unrelated_patterns)
                    .context("invalid guard.extra_unrelated_patterns")?,
            ),
            ClassifierKind::Model => Arc::new(ModelClassifier::new(primary)),
        };
        let guard = InputGuard::new(classifier, config.guard.to_params());

        // Audit
        let audit_path = config.audit.resolved_path();
        let primary_sink: Arc<dyn AuditSink> = Arc::new(
            JsonlAuditSink::open(&audit_path)
                .with_context(|| format!("cannot open audit log {}", audit_path.display()))?,
        );
        let fallback_path = config.audit.resolved_fallback_path();
        let secondary_sink: Arc<dyn AuditSink> = match JsonlAuditSink::open(&fallback_path) {
            Ok(sink) => Arc::new(sink),
            Err(e) => {
                warn!(
                    "Secondary audit log {} unavailable: {}",
                    fallback_path.display(),
                    e
                );
                Arc::new(NoAuditSink)
            }
        };
        info!(path = %audit_path.display(), "Audit log ready");
        let audit = AuditLogger::spawn(primary_sink, secondary_sink);

        let escalator = AlertEscalator::new();
        let orchestrator = Orchestrator::new(guard, models, invoker.clone(), audit)
            .with_escalator(escalator.clone())
            .with_validator(ResponseValidator::new(config.validator.clone()))
            .with_params(params);

        let shutdown = CancellationToken::new();
        let refresher = config.alerts.enabled.then(|| {
            AlertRefresher::new(escalator, invoker).spawn(&config.alerts, shutdown.child_token())
        });

        Ok(Self {
            service: Arc::new(SessionService::new(Arc::new(orchestrator))),
            shutdown,
            refresher,
        })
    }

    /// Stop background work and wait for pending audit records.
    pub async fn shutdown(self) {
        self.shutdown.cancel();
        if let Some(handle) = self.refresher
            && let Err(e) = handle.await
        {
            warn!("Alert refresher ended abnormally: {}", e);
        }
        let audit = self.service.orchestrator().audit();
        audit.flush().await;
        if audit.failure_count() > 0 {
            warn!(failures = audit.failure_count(), "Some turns were not written to the audit log");
        }
    }
}
