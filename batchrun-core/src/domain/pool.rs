//! Pool domain model
//!
//! A pool is a named set of remote compute nodes, sized at creation.

use serde::{Deserialize, Serialize};

/// Operating system family of the pool's nodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeOs {
    #[default]
    Linux,
    Windows,
}

impl NodeOs {
    /// Marketplace image used for nodes of this OS family
    pub fn default_image(&self) -> VmImage {
        match self {
            NodeOs::Linux => VmImage {
                publisher: "Canonical".to_string(),
                offer: "UbuntuServer".to_string(),
                sku: "18.04-LTS".to_string(),
                version: "latest".to_string(),
                node_agent_sku: "batch.node.ubuntu 18.04".to_string(),
            },
            NodeOs::Windows => VmImage {
                publisher: "MicrosoftWindowsServer".to_string(),
                offer: "WindowsServer".to_string(),
                sku: "2016-datacenter-smalldisk".to_string(),
                version: "latest".to_string(),
                node_agent_sku: "batch.node.windows amd64".to_string(),
            },
        }
    }

    /// Command line that prints an input file to stdout
    ///
    /// `{file}` is replaced with the artifact's path on the node.
    pub fn default_command_template(&self) -> &'static str {
        match self {
            NodeOs::Linux => "/bin/bash -c 'cat {file}'",
            NodeOs::Windows => "cmd /c type {file}",
        }
    }
}

impl std::fmt::Display for NodeOs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeOs::Linux => write!(f, "linux"),
            NodeOs::Windows => write!(f, "windows"),
        }
    }
}

impl std::str::FromStr for NodeOs {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "linux" => Ok(NodeOs::Linux),
            "windows" => Ok(NodeOs::Windows),
            other => Err(format!("unknown node OS '{}'", other)),
        }
    }
}

/// Virtual machine image reference plus the node agent that runs on it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VmImage {
    pub publisher: String,
    pub offer: String,
    pub sku: String,
    pub version: String,
    pub node_agent_sku: String,
}

/// Pool creation request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PoolSpec {
    pub id: String,
    pub vm_size: String,
    pub target_dedicated_nodes: u32,
    pub image: VmImage,
}

impl PoolSpec {
    /// Creates a pool spec with the default VM size and node count
    pub fn new(id: impl Into<String>, os: NodeOs) -> Self {
        Self {
            id: id.into(),
            vm_size: "STANDARD_A1_v2".to_string(),
            target_dedicated_nodes: 2,
            image: os.default_image(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_pool_spec() {
        let spec = PoolSpec::new("pool", NodeOs::Linux);
        assert_eq!(spec.target_dedicated_nodes, 2);
        assert_eq!(spec.vm_size, "STANDARD_A1_v2");
        assert_eq!(spec.image.node_agent_sku, "batch.node.ubuntu 18.04");
    }

    #[test]
    fn test_node_os_parse() {
        assert_eq!("Windows".parse::<NodeOs>(), Ok(NodeOs::Windows));
        assert_eq!("linux".parse::<NodeOs>(), Ok(NodeOs::Linux));
        assert!("plan9".parse::<NodeOs>().is_err());
    }

    #[test]
    fn test_pool_spec_wire_format() {
        let json = serde_json::to_value(PoolSpec::new("p", NodeOs::Windows)).unwrap();
        assert_eq!(json["targetDedicatedNodes"], 2);
        assert_eq!(json["image"]["nodeAgentSku"], "batch.node.windows amd64");
    }
}
