// otlp2doris-proto - OpenTelemetry Protocol Definitions
//
// Message types come from the prost code generated by `opentelemetry-proto`
// (messages only, no gRPC services). They are re-exported under the
// canonical `opentelemetry::proto::*` package paths so the rest of the
// workspace does not depend on the upstream crate layout.

pub use prost::Message;

pub mod opentelemetry {
    pub mod proto {
        pub mod collector {
            pub mod logs {
                pub mod v1 {
                    pub use opentelemetry_proto::tonic::collector::logs::v1::*;
                }
            }
            pub mod trace {
                pub mod v1 {
                    pub use opentelemetry_proto::tonic::collector::trace::v1::*;
                }
            }
            pub mod metrics {
                pub mod v1 {
                    pub use opentelemetry_proto::tonic::collector::metrics::v1::*;
                }
            }
        }
        pub mod logs {
            pub mod v1 {
                pub use opentelemetry_proto::tonic::logs::v1::*;
            }
        }
        pub mod trace {
            pub mod v1 {
                pub use opentelemetry_proto::tonic::trace::v1::*;
            }
        }
        pub mod metrics {
            pub mod v1 {
                pub use opentelemetry_proto::tonic::metrics::v1::*;
            }
        }
        pub mod common {
            pub mod v1 {
                pub use opentelemetry_proto::tonic::common::v1::*;
            }
        }
        pub mod resource {
            pub mod v1 {
                pub use opentelemetry_proto::tonic::resource::v1::*;
            }
        }
    }
}
