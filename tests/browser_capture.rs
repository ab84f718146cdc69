use utam_inspector::pageobject::{ArgValue, InMemorySource};
use utam_inspector::{BrowserSession, Inspector, LaunchOptions};

const SHADOW_PAGE: &str = concat!(
    "<html><body>",
    "<fruit-list><ul><li>Apple</li><li>Banana</li></ul></fruit-list>",
    "<script>",
    "const host = document.querySelector('fruit-list');",
    "const shadow = host.attachShadow({mode: 'open'});",
    "shadow.innerHTML = '<h2 class=\"title\">Fruits</h2><slot></slot>';",
    "</script>",
    "</body></html>"
);

fn launch() -> BrowserSession {
    BrowserSession::launch(LaunchOptions::new().headless(true)).expect("Failed to launch browser")
}

#[test]
#[ignore] // Requires Chrome to be installed
fn test_capture_includes_shadow_roots() {
    let session = launch();
    session
        .navigate(&format!("data:text/html,{}", SHADOW_PAGE))
        .expect("Failed to navigate");

    // Small delay to let the script attach the shadow root
    std::thread::sleep(std::time::Duration::from_millis(500));

    let dom = session.capture_dom().expect("Failed to capture DOM");
    let host = dom
        .query_selector(dom.document(), "fruit-list")
        .unwrap()
        .expect("host element missing");

    // script tags stay as placeholders that selectors never match
    assert_eq!(dom.query_selector(dom.document(), "script").unwrap(), None);

    let shadow = dom.shadow_root(host).expect("shadow root missing");
    let title = dom.query_selector(shadow, "h2.title").unwrap().expect("title missing");
    assert_eq!(dom.text(title).as_deref(), Some("Fruits"));
}

#[tokio::test]
#[ignore]
async fn test_inspect_live_page() {
    let source = InMemorySource::new().with_definition(
        "demo/fruitList",
        r#"{
            "root": true,
            "selector": {"css": "fruit-list"},
            "shadow": {"elements": [{"name": "title", "public": true, "selector": {"css": "h2"}}]},
            "elements": [{"name": "fruit", "public": true, "selector": {"css": "li:nth-child(%d)", "args": [{"name": "index", "type": "number"}]}}]
        }"#,
    );
    let mut inspector = Inspector::new();
    inspector.reload(&source).await.unwrap();

    let session = launch();
    session
        .navigate(&format!("data:text/html,{}", SHADOW_PAGE))
        .expect("Failed to navigate");
    std::thread::sleep(std::time::Duration::from_millis(500));
    inspector.load_document(session.capture_dom().expect("Failed to capture DOM"));

    let root = inspector.expand_root("demo/fruitList").unwrap();
    let title = inspector.expand_member(root.id, "title", Vec::new()).unwrap();
    assert!(title.element.is_some());

    let fruit = inspector
        .expand_member(root.id, "fruit", vec![ArgValue::new("index", 2)])
        .unwrap();
    let summary = inspector.element_summary(fruit.element.unwrap()).unwrap();
    assert_eq!(summary.text.as_deref(), Some("Banana"));
}
