// Resource and scope context shared by every record below them

use std::sync::Arc;

use otlp2doris_proto::opentelemetry::proto::common::v1::InstrumentationScope;
use otlp2doris_proto::opentelemetry::proto::resource::v1::Resource;
use serde_json::{Map as JsonMap, Value as JsonValue};

use super::any_value::{any_value_string, attributes_to_map};
use super::field_names::semconv;

/// Attribute map shared by all rows of one resource.
pub type SharedAttributes = Arc<JsonMap<String, JsonValue>>;

#[derive(Debug, Clone, Default)]
pub(crate) struct ResourceContext {
    pub service_name: String,
    pub service_instance_id: String,
    pub attributes: SharedAttributes,
}

impl ResourceContext {
    pub fn from_resource(resource: Option<&Resource>) -> Self {
        let Some(resource) = resource else {
            return Self::default();
        };

        let mut service_name = String::new();
        let mut service_instance_id = String::new();
        for attr in &resource.attributes {
            let Some(value) = attr.value.as_ref().and_then(any_value_string) else {
                continue;
            };
            match attr.key.as_str() {
                semconv::SERVICE_NAME => service_name = value.to_string(),
                semconv::SERVICE_INSTANCE_ID => service_instance_id = value.to_string(),
                _ => {}
            }
        }

        Self {
            service_name,
            service_instance_id,
            attributes: Arc::new(attributes_to_map(&resource.attributes)),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ScopeContext {
    pub name: String,
    pub version: String,
}

impl ScopeContext {
    pub fn from_scope(scope: Option<&InstrumentationScope>) -> Self {
        scope
            .map(|scope| Self {
                name: scope.name.clone(),
                version: scope.version.clone(),
            })
            .unwrap_or_default()
    }
}
