//! Result payload of the Ethereum network lambda.

use serde::{Deserialize, Serialize};

use crate::orchestration::types::{ServiceId, StaticFileId};

/// Metadata the Ethereum lambda returns after provisioning a network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EthereumLambdaResult {
    pub bootnode_service_id: ServiceId,
    pub node_service_ids: Vec<ServiceId>,
    pub static_file_ids: Vec<StaticFileId>,
    pub genesis_static_file_id: StaticFileId,
    pub password_static_file_id: StaticFileId,
    pub signer_keystore_static_file_id: StaticFileId,
}

impl EthereumLambdaResult {
    /// Parse the JSON string returned by `LambdaContext::execute`.
    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}
