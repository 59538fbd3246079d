mod test_support;

use serde_json::json;
use std::io::{BufRead, Write};
use test_support::{admin_workspace, error_code, request, spawn_sidecar, temp_dir};

#[test]
fn router_dispatch_smoke_covers_handler_families() {
    let workspace = temp_dir("examdesk-router-smoke");
    let (mut child, mut stdin, mut reader) = spawn_sidecar();

    let health = request(&mut stdin, &mut reader, "1", "health", json!({}));
    assert_eq!(health["result"]["workspacePath"], serde_json::Value::Null);
    assert_eq!(health["result"]["authenticated"], json!(false));

    admin_workspace(&mut stdin, &mut reader, &workspace);

    let calls: Vec<(&str, serde_json::Value)> = vec![
        ("auth.session", json!({})),
        ("auth.hashPassword", json!({ "password": "x" })),
        ("users.list", json!({})),
        ("classes.list", json!({})),
        ("subjects.list", json!({})),
        ("papers.list", json!({})),
        ("papers.stats", json!({})),
        ("syllabus.list", json!({})),
        ("syllabus.templates", json!({})),
        ("datesheet.list", json!({})),
        ("datesheet.month", json!({ "year": 2026, "month": 11 })),
        ("documents.combinedSyllabusPdf", json!({ "classId": "none" })),
        ("translit.text", json!({ "text": "salam" })),
        ("translit.keyboard", json!({})),
        ("settings.get", json!({})),
    ];
    for (i, (method, params)) in calls.into_iter().enumerate() {
        let id = format!("c{}", i);
        let resp = request(&mut stdin, &mut reader, &id, method, params);
        assert_eq!(resp["ok"], json!(true), "{} failed: {}", method, resp);
    }

    let unknown = request(&mut stdin, &mut reader, "u", "grades.open", json!({}));
    assert_eq!(error_code(&unknown), "not_implemented");

    // A malformed line is answered and the loop keeps going.
    writeln!(stdin, "{{not json").expect("write garbage");
    stdin.flush().expect("flush");
    let mut line = String::new();
    reader.read_line(&mut line).expect("read bad_json reply");
    let bad: serde_json::Value = serde_json::from_str(line.trim()).expect("json reply");
    assert_eq!(error_code(&bad), "bad_json");

    let again = request(&mut stdin, &mut reader, "2", "health", json!({}));
    assert_eq!(again["result"]["authenticated"], json!(true));

    drop(stdin);
    let status = child.wait().expect("wait for exit");
    assert!(status.success());
}

#[test]
fn workspace_operations_need_a_workspace_and_a_login() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let no_ws = request(&mut stdin, &mut reader, "1", "classes.list", json!({}));
    assert_eq!(error_code(&no_ws), "no_workspace");

    let workspace = temp_dir("examdesk-router-auth");
    let _ = request(
        &mut stdin,
        &mut reader,
        "2",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    let anon = request(&mut stdin, &mut reader, "3", "classes.list", json!({}));
    assert_eq!(error_code(&anon), "not_authenticated");

    let missing = request(&mut stdin, &mut reader, "4", "workspace.select", json!({}));
    assert_eq!(error_code(&missing), "bad_params");
}
