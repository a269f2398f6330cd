//! Well-known attribute keys.

/// OpenTelemetry semantic convention attribute names
///
/// These are well-known attribute keys defined by the OpenTelemetry specification
/// for common resource properties. Some are lifted into dedicated columns.
///
/// Reference: https://opentelemetry.io/docs/specs/semconv/resource/
pub mod semconv {
    /// Logical name of the service (e.g., "checkout-service")
    pub const SERVICE_NAME: &str = "service.name";
    /// Unique identifier for this service instance (e.g., pod ID, hostname)
    pub const SERVICE_INSTANCE_ID: &str = "service.instance.id";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_semantic_conventions() {
        assert!(semconv::SERVICE_NAME.contains('.'));
        assert_eq!(semconv::SERVICE_NAME, "service.name");
        assert_eq!(semconv::SERVICE_INSTANCE_ID, "service.instance.id");
    }
}
