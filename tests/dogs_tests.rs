mod common;

use common::TestServer;
use serde_json::json;

#[test]
fn create_and_search_dog() {
    let server = TestServer::start();
    let created = server.post_json("/dog", &json!({"name": "Rex", "breed": "Lab", "age": 3}));
    assert_eq!(created.status, 200);
    assert_eq!(created.json(), json!({"name": "Rex", "breed": "Lab", "age": 3}));

    let found = server.get("/dog/name?name=Rex");
    assert_eq!(found.status, 200);
    assert_eq!(found.json(), json!({"name": "Rex", "breed": "Lab", "age": 3}));
}

#[test]
fn dog_validation_and_misses() {
    let server = TestServer::start();
    let bad = server.post_form("/dog", "name=Rex&breed=Lab");
    assert_eq!(bad.status, 400);
    assert_eq!(bad.json(), json!({"error": "name, breed and age are all required"}));
    assert!(server.store.is_empty("dogs"));

    let missing = server.get("/dog/name");
    assert_eq!(missing.status, 400);
    assert_eq!(missing.json(), json!({"error": "Name is required to perform a search"}));

    let none = server.get("/dog/name?name=Fido");
    assert_eq!(none.status, 200);
    assert_eq!(none.json(), json!({"error": "Dog not found"}));
}

#[test]
fn dog_save_failure_is_500() {
    let server = TestServer::start();
    server.store.set_fail_writes(true);
    let resp = server.post_json("/dog", &json!({"name": "Rex", "breed": "Lab", "age": 3}));
    assert_eq!(resp.status, 500);
    assert_eq!(resp.json()["error"], "Storage operation failed");
}

#[test]
fn dog_search_read_failure_is_500() {
    let server = TestServer::start();
    server.store.set_fail_reads(true);
    let resp = server.get("/dog/name?name=Rex");
    assert_eq!(resp.status, 500);
    let body = resp.json();
    assert_eq!(body["error"], "Storage operation failed");
    assert!(body["requestId"].is_string());
}
