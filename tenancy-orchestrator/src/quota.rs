use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Resource limits attached to a workspace, in the store's quantity syntax.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuotaDeclaration {
    pub pods: String,
    pub services: String,
    pub replication_controllers: String,
    pub secrets: String,
    pub config_maps: String,
    pub persistent_volume_claims: String,
    pub services_node_ports: String,
    pub services_load_balancers: String,
    pub requests_storage: String,
    pub limits_cpu: String,
    pub limits_memory: String,
}

impl Default for QuotaDeclaration {
    fn default() -> Self {
        Self {
            pods: "15".to_string(),
            services: "50".to_string(),
            replication_controllers: "50".to_string(),
            secrets: "50".to_string(),
            config_maps: "50".to_string(),
            persistent_volume_claims: "50".to_string(),
            services_node_ports: "0".to_string(),
            services_load_balancers: "0".to_string(),
            requests_storage: "10Gi".to_string(),
            limits_cpu: "2".to_string(),
            limits_memory: "4Gi".to_string(),
        }
    }
}
