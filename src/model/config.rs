use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewerConfig {
    pub version: u32,

    #[serde(default)]
    pub remote: Option<RemoteConfig>,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            version: 1,
            remote: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RemoteConfig {
    pub base_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}
