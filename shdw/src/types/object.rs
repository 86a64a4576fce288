use serde::{Deserialize, Serialize};

/// Response of `POST /list-objects`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListObjectsResponse {
    pub keys: Vec<String>,
}
