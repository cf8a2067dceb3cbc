use std::collections::BTreeMap;

use tracing::{debug, info, warn};

use crate::error::ConfigError;
use crate::model::{
    Document, EmbeddedFile, HttpRequest, Import, Operation, PortScan, RawDocument,
    RawEndpointCall, RawNetworkCall, RawPort, SocketMessage,
};
use crate::processor::literal::is_identifier;

/// Artifact variable handed to `Endpoint.Quarantined` when none is named.
pub const DEFAULT_QUARANTINE_CONTENTS: &str = "malicious";

pub const DEFAULT_TEST_FUNCTION: &str = "test";
pub const DEFAULT_CLEAN_FUNCTION: &str = "clean";

type Result<T> = std::result::Result<T, ConfigError>;

/// Parse the whole input YAML string into a validated `Document`.
///
/// `id` and `created` are filled in here when the document leaves them out,
/// so they are generated exactly once per load.
pub fn load_from_yaml(yaml: &str) -> Result<Document> {
    debug!(bytes = yaml.len(), "parsing document");
    let raw: RawDocument = serde_yaml::from_str(yaml)?;
    to_document(raw)
}

/// Validate a raw document and lower every call into an [`Operation`].
pub fn to_document(raw: RawDocument) -> Result<Document> {
    let name = required(raw.name, "name")?;
    let unit = required(raw.unit, "unit")?;

    let id = match non_empty(raw.id) {
        Some(id) => id,
        None => {
            let id = uuid::Uuid::new_v4().to_string();
            info!(%id, "generated document id");
            id
        }
    };

    let created = match non_empty(raw.created) {
        Some(created) => created,
        None => {
            let created = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
            info!(%created, "generated creation timestamp");
            created
        }
    };

    let imports = raw
        .imports
        .into_iter()
        .enumerate()
        .map(|(i, imp)| {
            Ok(Import {
                alias: non_empty(imp.alias),
                path: required(imp.path, &format!("imports[{i}].path"))?,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let embedded_files = raw
        .embedded_files
        .into_iter()
        .enumerate()
        .map(|(i, file)| {
            Ok(EmbeddedFile {
                name: required(file.name, &format!("embeddedFiles[{i}].name"))?,
                content: file.content.unwrap_or_default(),
            })
        })
        .collect::<Result<Vec<_>>>()?;

    let endpoint_calls = raw
        .endpoint_calls
        .iter()
        .enumerate()
        .map(|(i, call)| endpoint_operation(call, &format!("endpointCalls[{i}]")))
        .collect::<Result<Vec<_>>>()?;

    let network_calls = raw
        .network_calls
        .iter()
        .enumerate()
        .map(|(i, call)| network_operation(call, &format!("networkCalls[{i}]")))
        .collect::<Result<Vec<_>>>()?;

    info!(
        %name,
        endpoint_calls = endpoint_calls.len(),
        network_calls = network_calls.len(),
        "document loaded"
    );

    Ok(Document {
        id,
        name,
        unit,
        created,
        imports,
        embedded_files,
        endpoint_calls,
        network_calls,
    })
}

// ─────────────────────────────────────────────────────
/// Helper: lower one `endpointCalls` entry. Only endpoint kinds are known here.
fn endpoint_operation(call: &RawEndpointCall, at: &str) -> Result<Operation> {
    let arg = |i: usize| -> Result<String> {
        call.arguments
            .get(i)
            .cloned()
            .ok_or_else(|| ConfigError::missing(format!("{at}.arguments[{i}]")))
    };

    let op = match call.function.as_str() {
        "Say" => Operation::Say { message: arg(0)? },
        "Shell" => {
            let commands: Vec<Vec<String>> = call
                .shell_commands
                .iter()
                .filter(|set| !set.is_empty())
                .cloned()
                .collect();
            if commands.is_empty() {
                return Err(ConfigError::missing(format!("{at}.shellCommands")));
            }
            Operation::Shell { commands }
        }
        "Find" => Operation::Find { file_type: arg(0)? },
        "Read" => Operation::Read { path: arg(0)? },
        "Write" => Operation::Write {
            path: arg(0)?,
            content: arg(1)?,
        },
        "Exists" => Operation::Exists { path: arg(0)? },
        "Quarantined" => {
            let contents = call
                .arguments
                .get(1)
                .cloned()
                .unwrap_or_else(|| DEFAULT_QUARANTINE_CONTENTS.to_string());
            if !is_identifier(&contents) {
                return Err(ConfigError::invalid(
                    format!("{at}.arguments[1]"),
                    format!("`{contents}` is not a Go identifier"),
                ));
            }
            Operation::Quarantined {
                filename: arg(0)?,
                contents,
            }
        }
        "Start" => Operation::Start {
            test_function: non_empty(call.test_function.clone())
                .unwrap_or_else(|| DEFAULT_TEST_FUNCTION.to_string()),
            clean_function: non_empty(call.clean_function.clone())
                .unwrap_or_else(|| DEFAULT_CLEAN_FUNCTION.to_string()),
        },
        "Stop" => {
            let code = match call.arguments.first() {
                Some(code) => code.trim().parse::<i32>().map_err(|_| {
                    ConfigError::invalid(
                        format!("{at}.arguments[0]"),
                        format!("`{code}` is not an exit code"),
                    )
                })?,
                None => 0,
            };
            Operation::Stop { code }
        }
        other => unknown(other, at, "endpointCalls"),
    };
    Ok(op)
}

/// Helper: lower one `networkCalls` entry. Only network kinds are known here.
fn network_operation(call: &RawNetworkCall, at: &str) -> Result<Operation> {
    let op = match call.function.as_str() {
        "GET" => Operation::Get(http_request(call, at)?),
        "POST" => Operation::Post(http_request(call, at)?),
        "TCP" => Operation::Tcp(socket_message(call, at)?),
        "UDP" => Operation::Udp(socket_message(call, at)?),
        "ScanPort" => {
            let port = call
                .port
                .as_ref()
                .ok_or_else(|| ConfigError::missing(format!("{at}.port")))?;
            Operation::ScanPort {
                scan: port_scan(call, at)?,
                port: port_number(port, &format!("{at}.port"))?,
            }
        }
        "MultiplePortScan" => {
            if call.ports.is_empty() {
                return Err(ConfigError::missing(format!("{at}.ports")));
            }
            let ports = call
                .ports
                .iter()
                .enumerate()
                .map(|(i, p)| port_number(&RawPort::Number(*p as u64), &format!("{at}.ports[{i}]")))
                .collect::<Result<Vec<_>>>()?;
            Operation::MultiplePortScan {
                scan: port_scan(call, at)?,
                ports,
            }
        }
        other => unknown(other, at, "networkCalls"),
    };
    Ok(op)
}

/// A known kind in the wrong list is still unknown there, but worth a warning.
fn unknown(kind: &str, at: &str, list: &str) -> Operation {
    if Operation::KIND_NAMES.contains(&kind) {
        warn!(field = %format!("{at}.function"), kind, "kind is not valid in {list}");
    }
    Operation::Unknown {
        kind: kind.to_string(),
    }
}

fn http_request(call: &RawNetworkCall, at: &str) -> Result<HttpRequest> {
    let url = required(call.url.clone(), &format!("{at}.url"))?;

    let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
    headers.insert("Content-Type".into(), vec!["application/json".into()]);
    if let Some(agent) = non_empty(call.user_agent.clone()) {
        headers.insert("User-Agent".into(), vec![agent]);
    }
    match (non_empty(call.auth_type.clone()), non_empty(call.credential.clone())) {
        (Some(kind), Some(credential)) => {
            headers.insert("Authorization".into(), vec![format!("{kind} {credential}")]);
        }
        (Some(_), None) => return Err(ConfigError::missing(format!("{at}.credential"))),
        _ => {}
    }
    // explicit headers win over every default above
    for (key, values) in &call.headers {
        headers.insert(key.clone(), values.clone());
    }

    Ok(HttpRequest {
        url,
        headers,
        query_params: call.query_params.clone(),
        body: non_empty(call.body.clone()),
    })
}

fn socket_message(call: &RawNetworkCall, at: &str) -> Result<SocketMessage> {
    let port = call
        .port
        .as_ref()
        .map(RawPort::as_text)
        .filter(|p| !p.trim().is_empty())
        .ok_or_else(|| ConfigError::missing(format!("{at}.port")))?;
    Ok(SocketMessage {
        host: required(call.host.clone(), &format!("{at}.host"))?,
        port,
        message: call.message.clone().unwrap_or_default(),
    })
}

fn port_scan(call: &RawNetworkCall, at: &str) -> Result<PortScan> {
    Ok(PortScan {
        protocol: required(call.protocol.clone(), &format!("{at}.protocol"))?,
        hostname: required(call.hostname.clone(), &format!("{at}.hostname"))?,
    })
}

fn port_number(port: &RawPort, field: &str) -> Result<u16> {
    let value = match port {
        RawPort::Number(n) => *n,
        RawPort::Text(s) => s
            .trim()
            .parse::<u64>()
            .map_err(|_| ConfigError::invalid(field, format!("`{s}` is not a port number")))?,
    };
    u16::try_from(value)
        .map_err(|_| ConfigError::invalid(field, format!("port {value} out of range")))
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn required(value: Option<String>, field: &str) -> Result<String> {
    non_empty(value).ok_or_else(|| ConfigError::missing(field))
}
