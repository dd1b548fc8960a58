//! Client metadata captured when a secret is issued or confirmed

use serde::{Deserialize, Serialize};

/// Origin of a request, recorded on verification records for auditing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestMetadata {
    pub ip: Option<String>,
    pub user_agent: Option<String>,
}

impl RequestMetadata {
    pub fn new(ip: Option<String>, user_agent: Option<String>) -> Self {
        Self { ip, user_agent }
    }
}
