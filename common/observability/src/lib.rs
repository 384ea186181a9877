use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct GatewayMetrics {
    pub registry: Registry,
    pub login_attempts: IntCounterVec,
    pub audit_failures: IntCounterVec,
    pub inventory_hidden_items: IntCounter,
    pub http_errors_total: IntCounterVec,
}

impl GatewayMetrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();
        let login_attempts = IntCounterVec::new(
            Opts::new("gateway_login_attempts_total", "Login attempts by outcome"),
            &["outcome"],
        )?;
        let audit_failures = IntCounterVec::new(
            Opts::new(
                "gateway_audit_failures_total",
                "Audit entries that were dropped or failed to persist",
            ),
            &["kind"],
        )?;
        let inventory_hidden_items = IntCounter::new(
            "gateway_inventory_hidden_items_total",
            "Inventory items withheld from a listing by tier filtering",
        )?;
        let http_errors_total = IntCounterVec::new(
            Opts::new(
                "http_errors_total",
                "Count of HTTP error responses emitted (status >= 400)",
            ),
            &["service", "code", "status"],
        )?;
        registry.register(Box::new(login_attempts.clone()))?;
        registry.register(Box::new(audit_failures.clone()))?;
        registry.register(Box::new(inventory_hidden_items.clone()))?;
        registry.register(Box::new(http_errors_total.clone()))?;
        Ok(GatewayMetrics {
            registry,
            login_attempts,
            audit_failures,
            inventory_hidden_items,
            http_errors_total,
        })
    }

    pub fn record_login(&self, outcome: &str) {
        self.login_attempts.with_label_values(&[outcome]).inc();
    }

    pub fn record_audit_failure(&self, kind: &str) {
        self.audit_failures.with_label_values(&[kind]).inc();
    }

    pub fn record_http_error(&self, service: &str, code: &str, status: u16) {
        let status = status.to_string();
        self.http_errors_total
            .with_label_values(&[service, code, status.as_str()])
            .inc();
    }

    /// Prometheus text exposition of every registered family.
    pub fn render(&self) -> prometheus::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|err| prometheus::Error::Msg(err.to_string()))
    }
}
