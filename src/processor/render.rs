//! Operation renderer: one pure function per operation kind.
//!
//! Every fragment is emitted relative to the body function's indentation and
//! is self-contained. Locals it binds carry the descriptor index as suffix
//! (`files3`, `response7`, ...) so fragments sharing one function scope
//! never redeclare each other's names.

use std::collections::BTreeMap;

use crate::model::{HttpRequest, Operation, PortScan, SocketMessage};

use super::literal::quote;

/// `Endpoint.Stop` status when a Find matched nothing.
pub const STATUS_NO_MATCHING_FILES: i32 = 104;
/// `Endpoint.Stop` status when a quarantine probe was intercepted.
pub const STATUS_QUARANTINED: i32 = 105;

/// Lines of Go source produced for one descriptor.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Fragment {
    lines: Vec<String>,
    depth: usize,
}

impl Fragment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        self.lines
            .push(format!("{}{}", "\t".repeat(self.depth), text.as_ref()));
    }

    /// Emit `text` and indent everything after it.
    pub fn open(&mut self, text: impl AsRef<str>) {
        self.line(text);
        self.depth += 1;
    }

    /// Dedent, then emit `text`.
    pub fn close(&mut self, text: impl AsRef<str>) {
        self.depth = self.depth.saturating_sub(1);
        self.line(text);
    }

    /// Dedent for `text`, then indent again: `} else {`.
    pub fn branch(&mut self, text: impl AsRef<str>) {
        self.close(text);
        self.depth += 1;
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Render descriptor number `index` of the document.
///
/// Lifecycle markers and unknown kinds produce an empty fragment.
pub fn render(op: &Operation, index: usize) -> Fragment {
    match op {
        Operation::Say { message } => say(message),
        Operation::Shell { commands } => shell(commands),
        Operation::Find { file_type } => find(file_type, index),
        Operation::Read { path } => read(path, index),
        Operation::Write { path, content } => write(path, content),
        Operation::Exists { path } => exists(path, index),
        Operation::Quarantined { filename, contents } => quarantined(filename, contents, index),
        Operation::Get(request) => http("GET", request, index),
        Operation::Post(request) => http("POST", request, index),
        Operation::Tcp(msg) => socket("TCP", msg),
        Operation::Udp(msg) => socket("UDP", msg),
        Operation::ScanPort { scan, port } => scan_port(scan, *port, index),
        Operation::MultiplePortScan { scan, ports } => multiple_port_scan(scan, ports, index),
        Operation::Start { .. } | Operation::Stop { .. } | Operation::Unknown { .. } => {
            Fragment::new()
        }
    }
}

pub fn say(message: &str) -> Fragment {
    let mut f = Fragment::new();
    f.line("// Say");
    f.line(format!("Endpoint.Say({})", quote(message)));
    f
}

pub fn shell(commands: &[Vec<String>]) -> Fragment {
    let mut f = Fragment::new();
    f.line("// Shell");
    for set in commands {
        f.line(format!("Endpoint.Shell({})", string_slice(set)));
    }
    f
}

pub fn find(file_type: &str, index: usize) -> Fragment {
    let files = format!("files{index}");
    let mut f = Fragment::new();
    f.line("// Find");
    f.line(r#"Endpoint.Say("Starting scan for files")"#);
    f.line(format!("{files} := Endpoint.Find({})", quote(file_type)));
    f.open(format!("if len({files}) == 0 {{"));
    f.line(format!("Endpoint.Stop({STATUS_NO_MATCHING_FILES})"));
    f.close("}");
    f
}

pub fn read(path: &str, index: usize) -> Fragment {
    let contents = format!("contents{index}");
    let mut f = Fragment::new();
    f.line("// Read");
    f.line(r#"Endpoint.Say("Reading file")"#);
    f.line(format!("{contents} := Endpoint.Read({})", quote(path)));
    f.line(format!("_ = {contents}"));
    f
}

pub fn write(path: &str, content: &str) -> Fragment {
    let mut f = Fragment::new();
    f.line("// Write");
    f.line(r#"Endpoint.Say("Writing file")"#);
    f.line(format!(
        "Endpoint.Write({}, []byte({}))",
        quote(path),
        quote(content)
    ));
    f
}

pub fn exists(path: &str, index: usize) -> Fragment {
    let exists = format!("exists{index}");
    let mut f = Fragment::new();
    f.line("// Exists");
    f.line(r#"Endpoint.Say("Checking if file exists")"#);
    f.line(format!("{exists} := Endpoint.Exists({})", quote(path)));
    f.line(format!("_ = {exists}"));
    f
}

/// The only two-branch endpoint fragment: caught stops with 105, not caught continues.
pub fn quarantined(filename: &str, contents: &str, index: usize) -> Fragment {
    let name = format!("filename{index}");
    let mut f = Fragment::new();
    f.line("// Quarantined");
    f.line(r#"Endpoint.Say("Extracting file for quarantine test")"#);
    f.line(format!("{name} := {}", quote(filename)));
    f.open(format!("if Endpoint.Quarantined({name}, {contents}) {{"));
    f.line(r#"Endpoint.Say("Malicious file was caught!")"#);
    f.line(format!("Endpoint.Stop({STATUS_QUARANTINED})"));
    f.branch("} else {");
    f.line(r#"Endpoint.Say("Malicious file was not caught")"#);
    f.close("}");
    f
}

pub fn http(method: &str, request: &HttpRequest, index: usize) -> Fragment {
    let options = format!("requestOptions{index}");
    let requester = format!("requester{index}");
    let response = format!("response{index}");
    let err = format!("err{index}");

    let mut f = Fragment::new();
    f.line(format!("// {method}"));
    f.line(format!(r#"Endpoint.Say("Executing {method} Request")"#));
    f.open(format!("{options} := Network.RequestParameters{{"));
    string_map(&mut f, "Headers", &request.headers);
    if !request.query_params.is_empty() {
        string_map(&mut f, "QueryParams", &request.query_params);
    }
    if let Some(body) = &request.body {
        f.line(format!("Body: []byte({}),", quote(body)));
    }
    f.close("}");
    f.line(format!(
        "{requester} := Network.NewHTTPRequest({}, nil)",
        quote(&request.url)
    ));
    f.line(format!("{response}, {err} := {requester}.{method}({options})"));
    f.open(format!("if {err} != nil {{"));
    f.line(format!(r#"Endpoint.Say("{method} Error: " + {err}.Error())"#));
    f.branch("} else {");
    f.line(format!(
        r#"Endpoint.Say("{method} Response: " + string({response}.Body))"#
    ));
    f.close("}");
    f
}

pub fn socket(protocol: &str, msg: &SocketMessage) -> Fragment {
    let mut f = Fragment::new();
    f.line(format!("// {protocol}"));
    f.line(format!(
        r#"Endpoint.Say("Executing {protocol} connection")"#
    ));
    f.line(format!(
        "Network.{protocol}({}, {}, []byte({}))",
        quote(&msg.host),
        quote(&msg.port),
        quote(&msg.message)
    ));
    f
}

pub fn scan_port(scan: &PortScan, port: u16, index: usize) -> Fragment {
    let open = format!("isOpen{index}");
    let mut f = Fragment::new();
    f.line("// ScanPort");
    f.line(r#"Endpoint.Say("Executing Port Scan")"#);
    f.line(format!(
        "{open} := Network.ScanPort({}, {}, {port})",
        quote(&scan.protocol),
        quote(&scan.hostname)
    ));
    f.line(format!(
        r#"Endpoint.Say(fmt.Sprintf("ScanPort: Port %d open: %v", {port}, {open}))"#
    ));
    f
}

/// Ports are emitted and scanned in the order given, never sorted.
pub fn multiple_port_scan(scan: &PortScan, ports: &[u16], index: usize) -> Fragment {
    let list = format!("ports{index}");
    let ports = ports
        .iter()
        .map(u16::to_string)
        .collect::<Vec<_>>()
        .join(", ");

    let mut f = Fragment::new();
    f.line("// MultiplePortScan");
    f.line(r#"Endpoint.Say("Executing Multi Port Scan")"#);
    f.line(format!("{list} := []int{{{ports}}}"));
    f.line(format!(r#"fmt.Println("Ports:", {list})"#));
    f.open(format!("for _, port := range {list} {{"));
    f.line(format!(
        "isOpen := Network.ScanPort({}, {}, port)",
        quote(&scan.protocol),
        quote(&scan.hostname)
    ));
    f.open("if isOpen {");
    f.line(r#"fmt.Printf("Port %d is open!\n", port)"#);
    f.branch("} else {");
    f.line(r#"fmt.Printf("Port %d is closed!\n", port)"#);
    f.close("}");
    f.close("}");
    f
}

fn string_slice(items: &[String]) -> String {
    let items = items.iter().map(|s| quote(s)).collect::<Vec<_>>().join(", ");
    format!("[]string{{{items}}}")
}

fn string_map(f: &mut Fragment, field: &str, map: &BTreeMap<String, Vec<String>>) {
    f.open(format!("{field}: map[string][]string{{"));
    for (key, values) in map {
        let values = values.iter().map(|v| quote(v)).collect::<Vec<_>>().join(", ");
        f.line(format!("{}: {{{values}}},", quote(key)));
    }
    f.close("},");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(f: &Fragment) -> String {
        f.lines().join("\n")
    }

    fn scan() -> PortScan {
        PortScan {
            protocol: "tcp".into(),
            hostname: "localhost".into(),
        }
    }

    #[test]
    fn test_single_statement_kinds() {
        let test_cases = vec![
            (
                Operation::Say {
                    message: "Starting \"tests\"".into(),
                },
                "// Say\nEndpoint.Say(\"Starting \\\"tests\\\"\")",
            ),
            (
                Operation::Shell {
                    commands: vec![
                        vec!["cmd.exe".into(), "/C".into(), "dir".into()],
                        vec!["whoami".into()],
                    ],
                },
                "// Shell\nEndpoint.Shell([]string{\"cmd.exe\", \"/C\", \"dir\"})\nEndpoint.Shell([]string{\"whoami\"})",
            ),
            (
                Operation::Write {
                    path: "filename.txt".into(),
                    content: "Hello, World!".into(),
                },
                "// Write\nEndpoint.Say(\"Writing file\")\nEndpoint.Write(\"filename.txt\", []byte(\"Hello, World!\"))",
            ),
            (
                Operation::Tcp(SocketMessage {
                    host: "127.0.0.1".into(),
                    port: "8080".into(),
                    message: "Hello TCP".into(),
                }),
                "// TCP\nEndpoint.Say(\"Executing TCP connection\")\nNetwork.TCP(\"127.0.0.1\", \"8080\", []byte(\"Hello TCP\"))",
            ),
            (
                Operation::Udp(SocketMessage {
                    host: "10.0.0.1".into(),
                    port: "8081".into(),
                    message: "".into(),
                }),
                "// UDP\nEndpoint.Say(\"Executing UDP connection\")\nNetwork.UDP(\"10.0.0.1\", \"8081\", []byte(\"\"))",
            ),
        ];

        for (op, expected) in test_cases {
            assert_eq!(text(&render(&op, 0)), expected);
        }
    }

    #[test]
    fn test_find_stops_with_104() {
        let f = render(
            &Operation::Find {
                file_type: ".txt".into(),
            },
            3,
        );
        assert_eq!(
            text(&f),
            "// Find\n\
             Endpoint.Say(\"Starting scan for files\")\n\
             files3 := Endpoint.Find(\".txt\")\n\
             if len(files3) == 0 {\n\
             \tEndpoint.Stop(104)\n\
             }"
        );
    }

    #[test]
    fn test_bound_locals_are_used() {
        let f = render(&Operation::Read { path: "a.txt".into() }, 1);
        assert_eq!(f.lines()[2], "contents1 := Endpoint.Read(\"a.txt\")");
        assert_eq!(f.lines()[3], "_ = contents1");

        let f = render(&Operation::Exists { path: "a.txt".into() }, 2);
        assert_eq!(f.lines()[2], "exists2 := Endpoint.Exists(\"a.txt\")");
        assert_eq!(f.lines()[3], "_ = exists2");
    }

    #[test]
    fn test_quarantined_branches() {
        let f = render(
            &Operation::Quarantined {
                filename: "malicious_file.exe".into(),
                contents: "malicious".into(),
            },
            0,
        );
        assert_eq!(
            text(&f),
            "// Quarantined\n\
             Endpoint.Say(\"Extracting file for quarantine test\")\n\
             filename0 := \"malicious_file.exe\"\n\
             if Endpoint.Quarantined(filename0, malicious) {\n\
             \tEndpoint.Say(\"Malicious file was caught!\")\n\
             \tEndpoint.Stop(105)\n\
             } else {\n\
             \tEndpoint.Say(\"Malicious file was not caught\")\n\
             }"
        );
    }

    #[test]
    fn test_http_request() {
        let mut headers = BTreeMap::new();
        headers.insert("Content-Type".to_string(), vec!["application/json".to_string()]);
        headers.insert("X-Trace".to_string(), vec!["a".to_string(), "b".to_string()]);
        let mut query_params = BTreeMap::new();
        query_params.insert("key".to_string(), vec!["value".to_string()]);
        let request = HttpRequest {
            url: "https://example.com".into(),
            headers,
            query_params,
            body: Some("payload".into()),
        };

        let f = render(&Operation::Get(request.clone()), 5);
        assert_eq!(
            text(&f),
            "// GET\n\
             Endpoint.Say(\"Executing GET Request\")\n\
             requestOptions5 := Network.RequestParameters{\n\
             \tHeaders: map[string][]string{\n\
             \t\t\"Content-Type\": {\"application/json\"},\n\
             \t\t\"X-Trace\": {\"a\", \"b\"},\n\
             \t},\n\
             \tQueryParams: map[string][]string{\n\
             \t\t\"key\": {\"value\"},\n\
             \t},\n\
             \tBody: []byte(\"payload\"),\n\
             }\n\
             requester5 := Network.NewHTTPRequest(\"https://example.com\", nil)\n\
             response5, err5 := requester5.GET(requestOptions5)\n\
             if err5 != nil {\n\
             \tEndpoint.Say(\"GET Error: \" + err5.Error())\n\
             } else {\n\
             \tEndpoint.Say(\"GET Response: \" + string(response5.Body))\n\
             }"
        );

        let post = HttpRequest {
            query_params: BTreeMap::new(),
            body: None,
            ..request
        };
        let f = text(&render(&Operation::Post(post), 6));
        assert!(f.contains("response6, err6 := requester6.POST(requestOptions6)"));
        assert!(!f.contains("QueryParams"));
        assert!(!f.contains("Body: []byte"));
    }

    #[test]
    fn test_scan_port() {
        let f = render(&Operation::ScanPort { scan: scan(), port: 80 }, 4);
        assert_eq!(
            text(&f),
            "// ScanPort\n\
             Endpoint.Say(\"Executing Port Scan\")\n\
             isOpen4 := Network.ScanPort(\"tcp\", \"localhost\", 80)\n\
             Endpoint.Say(fmt.Sprintf(\"ScanPort: Port %d open: %v\", 80, isOpen4))"
        );
    }

    #[test]
    fn test_multiple_port_scan_keeps_order() {
        let f = render(
            &Operation::MultiplePortScan {
                scan: scan(),
                ports: vec![443, 22, 80],
            },
            2,
        );
        assert_eq!(f.lines()[2], "ports2 := []int{443, 22, 80}");
        assert_eq!(f.lines()[4], "for _, port := range ports2 {");
        assert_eq!(f.lines()[7], "\t\tfmt.Printf(\"Port %d is open!\\n\", port)");
        assert_eq!(f.lines().last().map(String::as_str), Some("}"));
    }

    #[test]
    fn test_nothing_rendered_inline() {
        let test_cases = vec![
            Operation::Unknown {
                kind: "Teleport".into(),
            },
            Operation::Start {
                test_function: "test".into(),
                clean_function: "clean".into(),
            },
            Operation::Stop { code: 0 },
        ];

        for op in test_cases {
            assert!(render(&op, 0).is_empty(), "{op:?}");
        }
    }
}
