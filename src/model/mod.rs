use std::collections::BTreeMap;

use serde::Deserialize;

mod operation;
mod outline;

pub use operation::{HttpRequest, Operation, PortScan, SocketMessage};
pub use outline::{Alternative, Conditional, FunctionOutline};

/// Document exactly as it comes out of the YAML loader.
///
/// Every field is optional or defaulted here; presence is checked later
/// by `parser` so the error can name the offending field.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDocument {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub created: Option<String>,
    #[serde(default)]
    pub imports: Vec<RawImport>,
    #[serde(default)]
    pub embedded_files: Vec<RawEmbeddedFile>,
    #[serde(default)]
    pub endpoint_calls: Vec<RawEndpointCall>,
    #[serde(default)]
    pub network_calls: Vec<RawNetworkCall>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawImport {
    #[serde(default)]
    pub alias: Option<String>,
    #[serde(default)]
    pub path: Option<String>,
    // `filename`, `embeddedFiles` and `embeddedFS` are tolerated but unused.
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEmbeddedFile {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
}

/// One entry of `endpointCalls`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawEndpointCall {
    pub function: String,
    #[serde(default)]
    pub arguments: Vec<String>,
    #[serde(default)]
    pub shell_commands: Vec<Vec<String>>,
    #[serde(default)]
    pub test_function: Option<String>,
    #[serde(default)]
    pub clean_function: Option<String>,
}

/// One entry of `networkCalls`.
#[derive(Debug, Default, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawNetworkCall {
    pub function: String,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub headers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub query_params: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub encoding: Option<String>,
    #[serde(default)]
    pub auth_type: Option<String>,
    #[serde(default)]
    pub credential: Option<String>,
    #[serde(default)]
    pub timeout: Option<u64>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default)]
    pub port: Option<RawPort>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub hostname: Option<String>,
    #[serde(default)]
    pub ports: Vec<u32>,
}

/// Ports show up both as `port: 8080` and `port: "8080"`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawPort {
    Number(u64),
    Text(String),
}

impl RawPort {
    pub fn as_text(&self) -> String {
        match self {
            RawPort::Number(n) => n.to_string(),
            RawPort::Text(s) => s.clone(),
        }
    }
}

/// `import ( alias "path" )` entry of the generated program.
#[derive(Debug, Clone, PartialEq)]
pub struct Import {
    pub alias: Option<String>,
    pub path: String,
}

/// Asset declaration copied verbatim into the generated program.
#[derive(Debug, Clone, PartialEq)]
pub struct EmbeddedFile {
    pub name: String,
    pub content: String,
}

/// Fully validated document handed to the assembler.
///
/// `endpoint_calls` are emitted before `network_calls`; inside each list the
/// document order is the emission order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub id: String,
    pub name: String,
    pub unit: String,
    pub created: String,
    pub imports: Vec<Import>,
    pub embedded_files: Vec<EmbeddedFile>,
    pub endpoint_calls: Vec<Operation>,
    pub network_calls: Vec<Operation>,
}

impl Document {
    /// Every descriptor in emission order.
    pub fn operations(&self) -> impl Iterator<Item = &Operation> {
        self.endpoint_calls.iter().chain(self.network_calls.iter())
    }
}
