mod test_support;

use serde_json::json;
use test_support::{request_ok, spawn_sidecar};

#[test]
fn transliteration_works_without_a_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let full = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "translit.text",
        json!({ "text": "salam" }),
    );
    assert_eq!(full["text"], json!("سلام"));
    assert_eq!(full["rtl"], json!(true));

    let digraph = request_ok(
        &mut stdin,
        &mut reader,
        "2",
        "translit.text",
        json!({ "text": "shukr" }),
    );
    assert_eq!(digraph["text"], json!("شوکر"));

    let append = request_ok(
        &mut stdin,
        &mut reader,
        "3",
        "translit.edit",
        json!({ "previous": "سل", "next": "سلa" }),
    );
    assert_eq!(append["text"], json!("سلا"));

    let delete = request_ok(
        &mut stdin,
        &mut reader,
        "4",
        "translit.edit",
        json!({ "previous": "سلا", "next": "سa" }),
    );
    assert_eq!(delete["text"], json!("سa"));

    let keyboard = request_ok(&mut stdin, &mut reader, "5", "translit.keyboard", json!({}));
    let rows = keyboard["rows"].as_array().expect("rows");
    assert_eq!(rows.len(), 4);
    assert_eq!(rows[0][0], json!("ق"));
}
