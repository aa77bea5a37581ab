use serde::{Deserialize, Serialize};

/// Connection settings for one network. `chain_id` and `name` are each unique.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainConfig {
    pub name: String,
    pub chain_id: String,
    #[serde(rename = "prefix")]
    pub address_prefix: String,
    pub rpc_endpoint: String,
    pub api_endpoint: String,
    pub grpc_endpoint: Option<String>,
}

/// One entry of a chains file, as written by hand.
///
/// Every field is optional at parse time so a single incomplete entry can be
/// skipped without rejecting the whole file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainDescriptor {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub chain_id: Option<String>,
    #[serde(default)]
    pub prefix: Option<String>,
    #[serde(default)]
    pub rpc_endpoint: Option<String>,
    #[serde(default)]
    pub api_endpoint: Option<String>,
    #[serde(default)]
    pub grpc_endpoint: Option<String>,
}

impl ChainDescriptor {
    /// Convert into a `ChainConfig`, or list the required fields that are missing.
    pub fn into_config(self) -> Result<ChainConfig, Vec<&'static str>> {
        fn present(value: Option<String>) -> Option<String> {
            value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
        }

        let name = present(self.name);
        let chain_id = present(self.chain_id);
        let prefix = present(self.prefix);
        let rpc_endpoint = present(self.rpc_endpoint);
        let api_endpoint = present(self.api_endpoint);

        match (name, chain_id, prefix, rpc_endpoint, api_endpoint) {
            (Some(name), Some(chain_id), Some(prefix), Some(rpc_endpoint), Some(api_endpoint)) => {
                Ok(ChainConfig {
                    name,
                    chain_id,
                    address_prefix: prefix,
                    rpc_endpoint,
                    api_endpoint,
                    grpc_endpoint: present(self.grpc_endpoint),
                })
            }
            (name, chain_id, prefix, rpc_endpoint, api_endpoint) => {
                let mut missing = Vec::new();
                for (field, value) in [
                    ("name", name.is_none()),
                    ("chain_id", chain_id.is_none()),
                    ("prefix", prefix.is_none()),
                    ("rpc_endpoint", rpc_endpoint.is_none()),
                    ("api_endpoint", api_endpoint.is_none()),
                ] {
                    if value {
                        missing.push(field);
                    }
                }
                Err(missing)
            }
        }
    }
}

impl From<ChainConfig> for ChainDescriptor {
    fn from(chain: ChainConfig) -> Self {
        Self {
            name: Some(chain.name),
            chain_id: Some(chain.chain_id),
            prefix: Some(chain.address_prefix),
            rpc_endpoint: Some(chain.rpc_endpoint),
            api_endpoint: Some(chain.api_endpoint),
            grpc_endpoint: chain.grpc_endpoint,
        }
    }
}

/// The `{"chains": [...]}` document used for both import and display.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainsFile {
    #[serde(default)]
    pub chains: Vec<ChainDescriptor>,
}
