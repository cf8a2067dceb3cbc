//! Typed call descriptors, one variant per operation kind.
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    /// `Endpoint.Say(message)`.
    Say { message: String },

    /// One `Endpoint.Shell` invocation per command set.
    Shell { commands: Vec<Vec<String>> },

    /// `Endpoint.Find(fileType)`; stops with 104 when nothing matches.
    Find { file_type: String },

    Read { path: String },

    Write { path: String, content: String },

    Exists { path: String },

    /// Quarantine probe; `contents` is the Go identifier holding the artifact bytes.
    Quarantined { filename: String, contents: String },

    /// Lifecycle wiring: `Endpoint.Start(test_function, clean_function)`.
    Start {
        test_function: String,
        clean_function: String,
    },

    /// Lifecycle marker, never rendered inline.
    Stop { code: i32 },

    Get(HttpRequest),
    Post(HttpRequest),

    Tcp(SocketMessage),
    Udp(SocketMessage),

    ScanPort { scan: PortScan, port: u16 },

    /// Ports are scanned in the order given.
    MultiplePortScan { scan: PortScan, ports: Vec<u16> },

    /// Any kind string this version does not know; renders nothing.
    Unknown { kind: String },
}

impl Operation {
    /// Kind strings accepted in documents, in declaration order.
    pub const KIND_NAMES: &'static [&'static str] = &[
        "Say",
        "Shell",
        "Find",
        "Read",
        "Write",
        "Exists",
        "Quarantined",
        "Start",
        "Stop",
        "GET",
        "POST",
        "TCP",
        "UDP",
        "ScanPort",
        "MultiplePortScan",
    ];

    pub fn kind(&self) -> &str {
        match self {
            Operation::Say { .. } => "Say",
            Operation::Shell { .. } => "Shell",
            Operation::Find { .. } => "Find",
            Operation::Read { .. } => "Read",
            Operation::Write { .. } => "Write",
            Operation::Exists { .. } => "Exists",
            Operation::Quarantined { .. } => "Quarantined",
            Operation::Start { .. } => "Start",
            Operation::Stop { .. } => "Stop",
            Operation::Get(_) => "GET",
            Operation::Post(_) => "POST",
            Operation::Tcp(_) => "TCP",
            Operation::Udp(_) => "UDP",
            Operation::ScanPort { .. } => "ScanPort",
            Operation::MultiplePortScan { .. } => "MultiplePortScan",
            Operation::Unknown { kind } => kind,
        }
    }

    /// Start/Stop are consumed by the assembler instead of the body.
    pub fn is_lifecycle(&self) -> bool {
        matches!(self, Operation::Start { .. } | Operation::Stop { .. })
    }
}

/// Options for a GET or POST call.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HttpRequest {
    pub url: String,
    /// Final header set, defaults already merged in.
    pub headers: BTreeMap<String, Vec<String>>,
    pub query_params: BTreeMap<String, Vec<String>>,
    pub body: Option<String>,
}

/// Fire-and-forget TCP/UDP payload.
#[derive(Debug, Clone, PartialEq)]
pub struct SocketMessage {
    pub host: String,
    pub port: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PortScan {
    pub protocol: String,
    pub hostname: String,
}
