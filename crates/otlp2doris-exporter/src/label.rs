// Stream Load labels
//
// Doris deduplicates loads by label, so a label is minted once per
// (table kind, batch) and reused until the load settles.

use chrono::Utc;
use uuid::Uuid;

/// Mints fresh labels of the form
/// `{prefix}_{database}_{table}_{yyyyMMddHHmmss}_{uuid}`.
#[derive(Debug, Clone)]
pub struct LabelGenerator {
    prefix: String,
    database: String,
}

impl LabelGenerator {
    pub fn new(prefix: impl Into<String>, database: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            database: database.into(),
        }
    }

    pub fn generate(&self, table: &str) -> String {
        format!(
            "{}_{}_{}_{}_{}",
            self.prefix,
            self.database,
            table,
            Utc::now().format("%Y%m%d%H%M%S"),
            Uuid::new_v4()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_format() {
        let labels = LabelGenerator::new("otel", "observability");
        let label = labels.generate("otel_metrics_sum");

        let rest = label
            .strip_prefix("otel_observability_otel_metrics_sum_")
            .unwrap();
        let (timestamp, uuid) = rest.split_once('_').unwrap();
        assert_eq!(timestamp.len(), 14);
        assert!(timestamp.chars().all(|c| c.is_ascii_digit()));
        assert!(Uuid::parse_str(uuid).is_ok());
    }

    #[test]
    fn test_longest_label_matches_config_bound() {
        let config = otlp2doris_config::DorisConfig::default();
        let labels = LabelGenerator::new(&config.label_prefix, &config.database);
        let label = labels.generate("otel_metrics_exponential_histogram");
        assert_eq!(label.len(), config.max_label_len());
    }

    #[test]
    fn test_labels_are_unique() {
        let labels = LabelGenerator::new("otel", "otel");
        assert_ne!(labels.generate("otel_logs"), labels.generate("otel_logs"));
    }
}
