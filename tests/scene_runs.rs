//! Integration tests running whole scene scripts

use std::path::Path;

use insta::assert_snapshot;
use page_zones::{run, Property, Scene, SceneError};

#[test]
fn test_drag_into_header_tree() {
    let input = r#"
        [page]
        width = 600
        height = 800

        [[box]]
        name = "head"
        kind = "header"
        style = { height = "100px" }

        [[box]]
        name = "body"
        kind = "section"
        style = { height = "400px" }

        [[box]]
        name = "logo"
        parent = "body"
        position = "absolute"
        style = { left = "30px", top = "50px", width = "40px", height = "20px" }

        [[box]]
        name = "foot"
        kind = "footer"
        style = { height = "100px" }

        [[event]]
        type = "drag-start"
        box = "logo"
        pointer = [50, 160]

        [[event]]
        type = "drag"
        box = "logo"
        pointer = [50, 80]

        [[event]]
        type = "drag-end"
        box = "logo"
        pointer = [50, 80]

        [[event]]
        type = "tick"
    "#;

    let result = run(input).expect("Should run");
    assert!(result.effect_log().contains("[1] drag logo: highlight #1"));
    assert!(result.steps[3].effects.is_empty());
    assert_snapshot!(result.to_string(), @r###"
    page {width: 600px, height: 800px, padding-top: 0px, padding-right: 0px, padding-bottom: 0px, padding-left: 0px}
      header#1 "head" relative {width: 100%, height: 100px}
        box#3 "logo" absolute {left: 30px, top: 70px, width: 40px, height: 20px}
      section#2 "body" relative {width: 100%, height: 400px}
      footer#4 "foot" relative {width: 100%, height: 100px}
    "###);
}

#[test]
fn test_added_cell_content_flows() {
    let input = r#"
        [page]
        width = 600
        height = 800

        [[box]]
        name = "body"
        kind = "section"

        [[box]]
        name = "grid"
        kind = "table"
        parent = "body"

        [[box]]
        name = "r1"
        kind = "row"
        parent = "grid"

        [[box]]
        name = "c1"
        kind = "cell"
        parent = "r1"
        style = { width = "120px", height = "40px" }

        [[event]]
        type = "add"
        box = { name = "icon", parent = "c1", position = "absolute", style = { left = "5px", top = "5px", width = "20px", height = "20px" } }

        [[event]]
        type = "tick"
    "#;

    let result = run(input).expect("Should run");
    let icon = result.find("icon").expect("icon exists");
    let node = result.document.get(icon).expect("icon exists");
    assert_eq!(node.position, page_zones::PositionMode::Static);
    assert!(!node.style.has(Property::Left));
    assert!(!node.style.has(Property::Top));
    assert_eq!(result.steps[0].effects.len(), 1);
    assert!(result.steps[1].effects.is_empty());
}

#[test]
fn test_remove_mid_drag() {
    let input = r#"
        [page]
        width = 600
        height = 800

        [[box]]
        name = "body"
        kind = "section"
        style = { height = "400px" }

        [[box]]
        name = "note"
        parent = "body"
        position = "absolute"
        style = { left = "10px", top = "10px", width = "40px", height = "20px" }

        [[event]]
        type = "drag-start"
        box = "note"
        pointer = [20, 20]

        [[event]]
        type = "remove"
        box = "note"

        [[event]]
        type = "tick"
    "#;

    let result = run(input).expect("Should run");
    assert_eq!(result.find("note"), None);
    assert_eq!(
        result.effect_log(),
        "[1] remove note: highlight off\n[1] remove note: drop line off\n[1] remove note: guides off\n"
    );
}

#[test]
fn test_unknown_box_in_event() {
    let input = "[page]\nwidth = 100\nheight = 100\n\n[[event]]\ntype = \"drag\"\nbox = \"ghost\"\npointer = [0, 0]\n";

    let err = run(input).unwrap_err();
    let page_zones::PageZonesError::Scene(err) = err else {
        panic!("expected a scene error");
    };
    assert!(matches!(err, SceneError::UnknownBox { ref name, .. } if name == "ghost"));
    let report = err.format(input, "ghost.toml");
    assert!(report.contains("ghost.toml"));
    assert!(report.contains("Unknown box 'ghost'"));
}

#[test]
fn test_bad_handle_is_rejected() {
    let input = r#"
        [page]
        width = 100
        height = 100

        [[box]]
        name = "a"
        kind = "section"

        [[event]]
        type = "resize-init"
        box = "a"
        handle = "middle"
    "#;

    let err = run(input).unwrap_err();
    assert!(err.to_string().contains("unknown resize handle 'middle'"));
}

#[test]
fn test_letterhead_demo() {
    let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("demos/letterhead.toml");
    let scene = Scene::from_file(&path).expect("Should load");
    assert_eq!(scene.event_count(), 10);

    let result = scene.run(&Default::default()).expect("Should run");
    let doc = &result.document;
    let stamp = result.find("stamp").expect("stamp exists");
    let foot = result.find("foot").expect("foot exists");
    assert_eq!(doc.parent(stamp), Some(foot.into()));
    assert!(doc.get(stamp).expect("stamp exists").style.has(Property::Bottom));

    let logo = result.find("logo").expect("logo exists");
    assert_eq!(doc.get(logo).expect("logo exists").style.px(Property::Width), Some(180.0));
    assert_eq!(doc.get(logo).expect("logo exists").style.px(Property::Height), Some(90.0));

    let body = result.find("body").expect("body exists");
    assert_eq!(doc.get(body).expect("body exists").style.px(Property::Height), Some(90.0));
    let log = result.effect_log();
    assert!(log.contains("[7] resize-update body: blocked"));
    assert!(log.contains("[7] resize-update body: overflow #3 needs 90 (1 boxes)"));
}
