mod common;

use common::TestServer;
use serde_json::json;

#[test]
fn home_shows_last_added_name() {
    let server = TestServer::start();
    let home = server.get("/");
    assert_eq!(home.status, 200);
    assert!(home.header("content-type").unwrap().starts_with("text/html"));
    assert!(home.body.contains("unknown"));

    server.post_json("/name", &json!({"firstname": "Alice", "lastname": "Smith", "beds": 2}));
    assert!(server.get("/").body.contains("Alice Smith"));
}

#[test]
fn page1_lists_cats_and_fails_with_store() {
    let server = TestServer::start();
    server.post_form("/name", "firstname=Tom&lastname=Cat&beds=1");
    server.post_form("/name", "firstname=Kit&lastname=Kat&beds=3");
    let page = server.get("/page1");
    assert_eq!(page.status, 200);
    assert!(page.body.contains("Tom Cat"));
    assert!(page.body.contains("Kit Kat"));

    server.store.set_fail_reads(true);
    let failed = server.get("/page1");
    assert_eq!(failed.status, 500);
    assert_eq!(failed.json()["error"], "Storage operation failed");
}

#[test]
fn static_pages_render() {
    let server = TestServer::start();
    for path in ["/page2", "/page3", "/page4"] {
        let page = server.get(path);
        assert_eq!(page.status, 200, "{path}");
        assert!(page.body.contains("<form"), "{path}");
    }
}

#[test]
fn unknown_path_renders_not_found() {
    let server = TestServer::start();
    let resp = server.get("/foobar");
    assert_eq!(resp.status, 404);
    assert!(resp.header("content-type").unwrap().starts_with("text/html"));
    assert!(resp.body.contains("/foobar"));

    let with_query = server.get("/foobar?x=1");
    assert!(with_query.body.contains("/foobar?x=1"));

    let wrong_method = server.send("DELETE /name HTTP/1.1\r\nHost: localhost\r\n\r\n");
    assert_eq!(wrong_method.status, 404);
}
