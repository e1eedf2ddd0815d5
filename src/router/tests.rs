use super::{RouteMeta, Router};
use http::Method;

fn router() -> Router {
    Router::new(vec![
        RouteMeta::new(Method::GET, "/", "render_home"),
        RouteMeta::new(Method::GET, "/name", "get_last_added_name"),
        RouteMeta::new(Method::POST, "/name", "create_cat"),
        RouteMeta::new(Method::GET, "/cat/name", "search_cat_by_name"),
        RouteMeta::new(Method::GET, "/dog/name", "search_dog_by_name"),
    ])
    .unwrap()
}

#[test]
fn test_root_path() {
    let re = Router::path_to_regex("/").unwrap();
    assert!(re.is_match("/"));
    assert!(!re.is_match("/x"));
}

#[test]
fn test_nested_literal_path() {
    let re = Router::path_to_regex("/cat/name").unwrap();
    assert!(re.is_match("/cat/name"));
    assert!(!re.is_match("/cat/name/more"));
    assert!(!re.is_match("/cat/other"));
}

#[test]
fn test_literal_segments_are_escaped() {
    let re = Router::path_to_regex("/a.b").unwrap();
    assert!(re.is_match("/a.b"));
    assert!(!re.is_match("/axb"));
}

#[test]
fn test_method_distinguishes_routes() {
    let router = router();
    assert_eq!(
        router.route(&Method::GET, "/name").unwrap().handler_name,
        "get_last_added_name"
    );
    assert_eq!(
        router.route(&Method::POST, "/name").unwrap().handler_name,
        "create_cat"
    );
    assert!(router.route(&Method::DELETE, "/name").is_none());
}

#[test]
fn test_same_leaf_under_different_prefixes() {
    let router = router();
    assert_eq!(
        router.route(&Method::GET, "/cat/name").unwrap().handler_name,
        "search_cat_by_name"
    );
    assert_eq!(
        router.route(&Method::GET, "/dog/name").unwrap().handler_name,
        "search_dog_by_name"
    );
    assert!(router.route(&Method::GET, "/cat/42").is_none());
}

#[test]
fn test_unknown_path() {
    assert!(router().route(&Method::GET, "/foobar").is_none());
}

#[test]
fn test_trailing_slash_tolerated() {
    assert!(router().route(&Method::GET, "/name/").is_some());
}

#[test]
fn test_routes_listed_in_match_order() {
    let router = router();
    let patterns: Vec<&str> = router.routes().map(|r| r.path_pattern.as_str()).collect();
    assert_eq!(patterns.len(), 5);
    assert_eq!(patterns.last(), Some(&"/"));
}
