use std::fs;
use std::path::Path;
use utam_inspector::pageobject::{DefinitionSource, DirectorySource, PageObjectDatabase};
use utam_inspector::{Inspector, InspectorError};

fn write(root: &Path, relative: &str, contents: &str) {
    let path = root.join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

fn definitions_dir() -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    write(
        dir.path(),
        "pageObjects/home.utam.json",
        r#"{"root": true, "selector": {"css": "main"}, "elements": [{"name": "header", "public": true, "selector": {"css": "header"}}]}"#,
    );
    write(
        dir.path(),
        "pageObjects/forms/login.json",
        r#"{"selector": {"css": "form"}, "elements": [{"name": "user", "type": ["editable"], "public": true, "selector": {"css": "input"}}]}"#,
    );
    write(dir.path(), "pageObjects/broken.utam.json", "{ nope");
    write(dir.path(), "README.md", "not a definition");
    dir
}

#[tokio::test]
async fn test_directory_source_uris() {
    let dir = definitions_dir();

    let definitions = DirectorySource::new(dir.path()).load_definitions().await.unwrap();
    let uris: Vec<&str> = definitions.keys().map(String::as_str).collect();
    assert_eq!(uris, vec!["pageObjects/forms/login", "pageObjects/home"]);

    let namespaced = DirectorySource::new(dir.path())
        .namespace("/my-app/")
        .load_definitions()
        .await
        .unwrap();
    assert!(namespaced.contains_key("my-app/pageObjects/home"));
}

#[tokio::test]
async fn test_reload_from_directory() {
    let dir = definitions_dir();
    let mut database = PageObjectDatabase::new();

    let count = database.reload(&DirectorySource::new(dir.path())).await.unwrap();
    assert_eq!(count, 2);

    let home = database.get_by_uri("pageObjects/home").unwrap();
    assert!(home.source.contains("\"header\""));
    assert_eq!(database.snapshot().unwrap().root_uris(), ["pageObjects/home".to_string()]);
}

#[tokio::test]
async fn test_failed_reload_drops_previous_snapshot() {
    let dir = definitions_dir();
    let mut database = PageObjectDatabase::new();
    database.reload(&DirectorySource::new(dir.path())).await.unwrap();
    assert!(database.is_loaded());

    let missing = dir.path().join("does-not-exist");
    let err = database.reload(&DirectorySource::new(missing)).await.unwrap_err();
    assert!(matches!(err, InspectorError::NoDefinitionsLoaded(_)));

    assert!(!database.is_loaded());
    assert!(matches!(
        database.public_members("pageObjects/home"),
        Err(InspectorError::NoDefinitionsLoaded(_))
    ));
}

#[tokio::test]
async fn test_inspector_reload_clears_session() {
    let dir = definitions_dir();
    let mut inspector = Inspector::new();
    inspector.reload(&DirectorySource::new(dir.path())).await.unwrap();

    inspector.load_document(utam_inspector::DomTree::new(
        utam_inspector::ElementNode::new("body").with_children(vec![utam_inspector::ElementNode::new("main")]),
    ));
    inspector.expand_root("pageObjects/home").unwrap();
    assert_eq!(inspector.nodes().len(), 1);

    inspector.reload(&DirectorySource::new(dir.path())).await.unwrap();
    assert!(inspector.nodes().is_empty());
}
