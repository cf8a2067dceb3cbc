use std::fs;

use yaml2vst::model::Operation;
use yaml2vst::parser::load_from_yaml;

#[test]
fn loads_sample_document() {
    let yaml = fs::read_to_string("tests/config.yaml").unwrap();
    let doc = load_from_yaml(&yaml).expect("valid document");

    assert_eq!(doc.id, "5529f7f3-a357-4583-b48c-efe1dc7c5445");
    assert_eq!(doc.name, "TestName");
    assert_eq!(doc.created, "2023-11-25 17:16:00");
    assert_eq!(doc.imports.len(), 4);
    assert_eq!(doc.imports[2].alias, None);
    assert_eq!(doc.embedded_files[1].name, "malicious");

    let kinds: Vec<&str> = doc.operations().map(Operation::kind).collect();
    assert_eq!(
        kinds,
        vec![
            "Say",
            "Shell",
            "Find",
            "Read",
            "Write",
            "Exists",
            "Quarantined",
            "Start",
            "GET",
            "POST",
            "TCP",
            "UDP",
            "ScanPort",
            "MultiplePortScan",
        ]
    );
}

#[test]
fn folds_request_options_into_headers() {
    let yaml = fs::read_to_string("tests/config.yaml").unwrap();
    let doc = load_from_yaml(&yaml).unwrap();

    let Operation::Post(request) = &doc.network_calls[1] else {
        panic!("expected POST, got {:?}", doc.network_calls[1]);
    };
    assert_eq!(request.headers["Authorization"], vec!["Bearer token123"]);
    assert_eq!(request.headers["User-Agent"], vec!["vst/1.0"]);
    assert_eq!(request.headers["Content-Type"], vec!["application/json"]);
    assert_eq!(request.body.as_deref(), Some("TESTING PAYLOAD"));

    let Operation::Udp(msg) = &doc.network_calls[3] else {
        panic!("expected UDP");
    };
    assert_eq!(msg.port, "8081");
}

#[test]
fn rejects_document_without_unit() {
    let err = load_from_yaml("name: Only a name\n").unwrap_err();
    assert_eq!(err.field(), Some("unit"));
}
