use std::sync::Arc;

use axum::extract::FromRef;
use common_audit::{AuditFailure, AuditRecorder, AuditSink};
use common_auth::{PasswordVerifier, Tier, TierGate, TierPolicy, TokenService};
use common_observability::GatewayMetrics;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::error;

use crate::store::Store;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn Store>,
    pub tokens: Arc<TokenService>,
    pub policy: Arc<TierPolicy>,
    pub passwords: Arc<PasswordVerifier>,
    pub audit: AuditRecorder,
    pub metrics: Arc<GatewayMetrics>,
}

impl FromRef<AppState> for Arc<TokenService> {
    fn from_ref(state: &AppState) -> Self {
        state.tokens.clone()
    }
}

impl FromRef<AppState> for Arc<TierPolicy> {
    fn from_ref(state: &AppState) -> Self {
        state.policy.clone()
    }
}

impl FromRef<AppState> for Arc<GatewayMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}

impl AppState {
    /// Wires the store into the audit writer and starts the failure monitor.
    /// Must run inside a tokio runtime.
    pub fn new<S>(
        store: Arc<S>,
        tokens: TokenService,
        policy: TierPolicy,
        passwords: PasswordVerifier,
        audit_queue_capacity: usize,
    ) -> prometheus::Result<Self>
    where
        S: Store + 'static,
    {
        let metrics = Arc::new(GatewayMetrics::new()?);
        let sink: Arc<dyn AuditSink> = store.clone();
        let (audit, failures) = AuditRecorder::spawn(sink, audit_queue_capacity);
        spawn_audit_failure_monitor(failures, metrics.clone());
        Ok(Self {
            store,
            tokens: Arc::new(tokens),
            policy: Arc::new(policy),
            passwords: Arc::new(passwords),
            audit,
            metrics,
        })
    }

    pub fn tier_gate(&self, min_tier: Tier) -> TierGate {
        TierGate::new(self.tokens.clone(), self.policy.clone(), min_tier)
    }

    pub fn record_login_metric(&self, outcome: &str) {
        self.metrics.record_login(outcome);
    }
}

/// Drains audit failures into the log and `gateway_audit_failures_total`.
pub fn spawn_audit_failure_monitor(
    mut failures: UnboundedReceiver<AuditFailure>,
    metrics: Arc<GatewayMetrics>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(failure) = failures.recv().await {
            metrics.record_audit_failure(failure.kind());
            error!(action = failure.action(), kind = failure.kind(), "audit entry lost");
        }
    })
}
