mod test_support;

use serde_json::json;
use test_support::{
    request_err, request_ok, spawn_sidecar, temp_dir, ADMIN_EMAIL, ADMIN_PASS,
};

#[test]
fn configured_admin_logs_in_without_a_workspace() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();

    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "auth.login",
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASS }),
    );
    assert_eq!(result["session"]["userId"], json!("superadmin"));
    assert_eq!(result["session"]["role"], json!("SuperAdmin"));

    let code = request_err(
        &mut stdin,
        &mut reader,
        "2",
        "auth.login",
        json!({ "email": ADMIN_EMAIL, "password": "wrong" }),
    );
    assert_eq!(code, "invalid_credentials");

    let session = request_ok(&mut stdin, &mut reader, "3", "auth.session", json!({}));
    assert_eq!(session["session"]["role"], json!("SuperAdmin"));

    let out = request_ok(&mut stdin, &mut reader, "4", "auth.logout", json!({}));
    assert_eq!(out["loggedOut"], json!(true));
    let session = request_ok(&mut stdin, &mut reader, "5", "auth.session", json!({}));
    assert!(session["session"].is_null());
}

#[test]
fn staff_accounts_log_in_and_inactive_ones_are_refused() {
    let workspace = temp_dir("examdesk-auth-staff");
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    request_ok(
        &mut stdin,
        &mut reader,
        "ws",
        "workspace.select",
        json!({ "path": workspace.to_string_lossy() }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "admin",
        "auth.login",
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASS }),
    );

    let teacher = request_ok(
        &mut stdin,
        &mut reader,
        "create",
        "users.create",
        json!({
            "name": "Ms. Ayesha",
            "email": "Ayesha@School.com",
            "password": "chalk-42",
            "role": "Teacher"
        }),
    );
    let teacher_id = teacher["id"].as_str().expect("teacher id").to_string();
    assert_eq!(teacher["email"], json!("ayesha@school.com"));
    assert!(teacher.get("passwordHash").is_none());

    let dup = request_err(
        &mut stdin,
        &mut reader,
        "dup",
        "users.create",
        json!({
            "name": "Other",
            "email": "ayesha@school.com",
            "password": "x",
            "role": "Teacher"
        }),
    );
    assert_eq!(dup, "bad_params");

    let bad_role = request_err(
        &mut stdin,
        &mut reader,
        "role",
        "users.create",
        json!({ "name": "N", "email": "n@s.com", "password": "x", "role": "Janitor" }),
    );
    assert_eq!(bad_role, "bad_params");

    let staff = request_ok(&mut stdin, &mut reader, "list", "users.list", json!({}));
    assert_eq!(staff["users"].as_array().map(|u| u.len()), Some(1));

    let login = request_ok(
        &mut stdin,
        &mut reader,
        "t1",
        "auth.login",
        json!({ "email": "ayesha@school.com", "password": "chalk-42" }),
    );
    assert_eq!(login["session"]["role"], json!("Teacher"));
    assert_eq!(login["session"]["userId"], json!(teacher_id));

    // Teachers cannot manage accounts.
    let forbidden = request_err(&mut stdin, &mut reader, "t2", "users.list", json!({}));
    assert_eq!(forbidden, "forbidden");

    request_ok(
        &mut stdin,
        &mut reader,
        "admin2",
        "auth.login",
        json!({ "email": ADMIN_EMAIL, "password": ADMIN_PASS }),
    );
    request_ok(
        &mut stdin,
        &mut reader,
        "off",
        "users.setActive",
        json!({ "userId": teacher_id, "active": false }),
    );
    let refused = request_err(
        &mut stdin,
        &mut reader,
        "t3",
        "auth.login",
        json!({ "email": "ayesha@school.com", "password": "chalk-42" }),
    );
    assert_eq!(refused, "account_inactive");

    let unknown = request_err(
        &mut stdin,
        &mut reader,
        "t4",
        "auth.login",
        json!({ "email": "nobody@school.com", "password": "chalk-42" }),
    );
    assert_eq!(unknown, "invalid_credentials");
}

#[test]
fn hash_password_returns_an_argon2_phc_string() {
    let (_child, mut stdin, mut reader) = spawn_sidecar();
    let result = request_ok(
        &mut stdin,
        &mut reader,
        "1",
        "auth.hashPassword",
        json!({ "password": "abc" }),
    );
    let hash = result["hash"].as_str().expect("hash");
    assert!(hash.starts_with("$argon2id$"), "{}", hash);

    let code = request_err(&mut stdin, &mut reader, "2", "auth.hashPassword", json!({}));
    assert_eq!(code, "bad_params");
}
