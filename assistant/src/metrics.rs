use prometheus::IntCounter;

/// Pipeline counters, registered on the default registry gathered by
/// `GET /metrics`.
#[derive(Clone)]
pub struct Metrics {
    pub messages_received: IntCounter,
    pub retrievals_empty: IntCounter,
    pub generation_failures: IntCounter,
    pub delivery_failures: IntCounter,
}

impl Metrics {
    pub fn register() -> prometheus::Result<Self> {
        let messages_received = IntCounter::new(
            "assistant_messages_received_total",
            "Inbound webhook messages received",
        )?;
        let retrievals_empty = IntCounter::new(
            "assistant_retrievals_empty_total",
            "Retrievals that matched no catalog record",
        )?;
        let generation_failures = IntCounter::new(
            "assistant_generation_failures_total",
            "Language-model calls that failed and fell back",
        )?;
        let delivery_failures = IntCounter::new(
            "assistant_delivery_failures_total",
            "Outbound deliveries that fell back to TwiML",
        )?;

        let registry = prometheus::default_registry();
        registry.register(Box::new(messages_received.clone()))?;
        registry.register(Box::new(retrievals_empty.clone()))?;
        registry.register(Box::new(generation_failures.clone()))?;
        registry.register(Box::new(delivery_failures.clone()))?;

        Ok(Metrics {
            messages_received,
            retrievals_empty,
            generation_failures,
            delivery_failures,
        })
    }

    /// Unregistered counters for tests, so parallel tests never collide on
    /// the process-wide default registry.
    #[cfg(test)]
    pub fn unregistered() -> Self {
        Metrics {
            messages_received: IntCounter::new("test_received", "test").unwrap(),
            retrievals_empty: IntCounter::new("test_empty", "test").unwrap(),
            generation_failures: IntCounter::new("test_genfail", "test").unwrap(),
            delivery_failures: IntCounter::new("test_delfail", "test").unwrap(),
        }
    }
}
