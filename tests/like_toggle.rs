use like_toggle::{
    prelude::*,
    view::{Edit, Surface},
};
use std::{cell::RefCell, rc::Rc};

fn id(id: &str) -> ItemId {
    ItemId::new(id).unwrap()
}

fn button_for(root: &Root<Dom>, item: &str) -> NodeId {
    root.surface().find_by_attribute("data-id", item).unwrap()
}

fn assert_not_liked(root: &Root<Dom>, button: NodeId) {
    let dom = root.surface();
    assert_eq!(dom.text(button), Some("Me gusta"));
    assert!(!dom.has_class(button, "Liked"));
}

fn assert_liked(root: &Root<Dom>, button: NodeId) {
    let dom = root.surface();
    assert_eq!(dom.text(button), Some("Quitar me gusta"));
    assert!(dom.has_class(button, "Liked"));
}

#[test]
fn it_renders_not_liked() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render(LikeToggle::new("123", store).unwrap()).unwrap();

    let button = button_for(&root, "123");
    assert_eq!(root.surface().tag(button), Some("button"));
    assert_not_liked(&root, button);
}

#[test]
fn it_renders_initially_liked() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::with_liked([id("123")]));

    let mut root = Root::new(Dom::new());
    root.render(LikeToggle::new("123", store).unwrap()).unwrap();

    assert_liked(&root, button_for(&root, "123"));
}

#[test]
fn it_toggles_on_click() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render(LikeToggle::new("123", store.clone()).unwrap())
        .unwrap();

    let button = button_for(&root, "123");
    assert_not_liked(&root, button);

    assert!(root.click(button).unwrap());
    assert!(store.is_liked(&id("123")));
    assert_liked(&root, button);

    assert!(root.click(button).unwrap());
    assert!(!store.is_liked(&id("123")));
    assert_not_liked(&root, button);
}

#[test]
fn it_toggles_indefinitely() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render(LikeToggle::new(7u32, store.clone()).unwrap())
        .unwrap();

    let button = button_for(&root, "7");
    for n in 1..=5 {
        root.click(button).unwrap();
        assert_eq!(store.is_liked(&id("7")), n % 2 == 1);
    }
    assert_liked(&root, button);
}

#[test]
fn it_keeps_toggles_independent() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render((
        LikeToggle::new("123", store.clone()).unwrap(),
        LikeToggle::new("456", store.clone()).unwrap(),
    ))
    .unwrap();

    let a = button_for(&root, "123");
    let b = button_for(&root, "456");
    let b_html = root.surface().outer_html(b);

    root.click(a).unwrap();

    assert!(store.is_liked(&id("123")));
    assert!(!store.is_liked(&id("456")));
    assert_liked(&root, a);
    assert_not_liked(&root, b);
    assert_eq!(root.surface().outer_html(b), b_html);
}

#[test]
fn it_renders_in_composition_order() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render(div().content((
        LikeToggle::new("1", store.clone()).unwrap(),
        from_iter(["2", "3"], move |item| {
            LikeToggle::new(*item, store.clone()).unwrap()
        }),
    )))
    .unwrap();

    assert_eq!(
        root.surface().to_html(),
        concat!(
            r#"<div id="app"><div>"#,
            r#"<button data-id="1">Me gusta</button>"#,
            r#"<button data-id="2">Me gusta</button>"#,
            r#"<button data-id="3">Me gusta</button>"#,
            r#"</div></div>"#
        )
    );
}

#[test]
fn it_applies_minimal_edits() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render((
        LikeToggle::new("123", store.clone()).unwrap(),
        LikeToggle::new("456", store.clone()).unwrap(),
    ))
    .unwrap();

    let button = button_for(&root, "123");
    root.surface_mut().take_edits();

    root.click(button).unwrap();

    assert_eq!(
        root.surface_mut().take_edits(),
        [
            Edit::AddClass {
                id: button,
                class: "Liked".into()
            },
            Edit::SetText {
                id: button,
                text: "Quitar me gusta".into()
            },
        ]
    );
}

#[test]
fn it_uses_provided_labels() {
    #[derive(Data)]
    struct App {
        store: Rc<dyn LikeStore>,
    }

    impl Compose for App {
        fn compose(cx: Scope<Self>) -> impl Compose {
            use_provider(&cx, || LikeLabels {
                like: "Like".into(),
                unlike: "Unlike".into(),
                marker_class: "is-liked".into(),
            });

            LikeToggle::new("1", cx.me().store.clone()).unwrap()
        }
    }

    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render(App { store }).unwrap();

    let button = button_for(&root, "1");
    assert_eq!(root.surface().text(button), Some("Like"));

    root.click(button).unwrap();
    assert_eq!(root.surface().text(button), Some("Unlike"));
    assert!(root.surface().has_class(button, "is-liked"));
}

#[test]
fn it_rejects_missing_ids_at_construction() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    assert_eq!(
        LikeToggle::new(None::<&str>, store.clone()).err(),
        Some(ConfigurationError::MissingItemId)
    );
    assert_eq!(
        LikeToggle::new("", store).err(),
        Some(ConfigurationError::BlankItemId)
    );
}

#[test]
fn it_renders_siblings_of_misconfigured_toggles() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    let error = root
        .render((
            LikeToggle::new(None::<&str>, store.clone()).map_err(Error::from),
            LikeToggle::new("456", store.clone()).unwrap(),
        ))
        .unwrap_err();

    assert_eq!(
        error.downcast_ref::<ConfigurationError>(),
        Some(&ConfigurationError::MissingItemId)
    );

    let button = button_for(&root, "456");
    root.click(button).unwrap();
    assert_liked(&root, button);
}

#[test]
fn it_catches_misconfigured_toggles() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());
    let errors = Rc::new(RefCell::new(Vec::new()));
    let errors_handle = errors.clone();

    let mut root = Root::new(Dom::new());
    root.render(catch(
        move |error| errors_handle.borrow_mut().push(error.to_string()),
        (
            LikeToggle::new("123", store.clone()).map_err(Error::from),
            LikeToggle::new("  ", store.clone()).map_err(Error::from),
        ),
    ))
    .unwrap();

    assert_eq!(*errors.borrow(), ["Blank item identifier"]);
    assert_eq!(
        root.surface().find_all_by_tag("button").collect::<Vec<_>>(),
        [button_for(&root, "123")]
    );
}

#[test]
fn it_removes_nodes_on_unmount() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render(LikeToggle::new("123", store).unwrap()).unwrap();

    let button = button_for(&root, "123");
    root.unmount();

    assert!(root.surface().is_empty());
    assert!(!root.surface().contains(button));
    assert!(!root.click(button).unwrap());
}

#[test]
fn it_replaces_content_on_render() {
    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render(LikeToggle::new("123", store.clone()).unwrap())
        .unwrap();
    root.render(LikeToggle::new("456", store).unwrap()).unwrap();

    let dom = root.surface();
    assert_eq!(dom.children(dom.root()).len(), 1);
    assert_eq!(dom.find_by_attribute("data-id", "123"), None);
    assert!(dom.find_by_attribute("data-id", "456").is_some());
}

#[test]
fn it_ignores_events_without_listeners() {
    let mut root = Root::new(Dom::new());
    root.render(span().text("static")).unwrap();

    let span = root.surface().find_by_tag("span").unwrap();
    assert!(!root.click(span).unwrap());
}

#[test]
fn it_reads_the_store_when_the_item_changes() {
    #[derive(Data)]
    struct App {
        store: Rc<dyn LikeStore>,
    }

    impl Compose for App {
        fn compose(cx: Scope<Self>) -> impl Compose {
            let is_first = use_mut(&cx, || true);
            let item = if is_first.get() { "123" } else { "456" };

            div().content((
                LikeToggle::new(item, cx.me().store.clone()).unwrap(),
                button()
                    .attr("id", "swap")
                    .text("Swap")
                    .on_click(move || is_first.update(|x| *x = !*x)),
            ))
        }
    }

    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render(App {
        store: store.clone(),
    })
    .unwrap();

    let button = button_for(&root, "123");
    root.click(button).unwrap();
    assert_liked(&root, button);

    let swap = root.surface().find_by_attribute("id", "swap").unwrap();
    root.click(swap).unwrap();

    assert_eq!(button_for(&root, "456"), button);
    assert!(!store.is_liked(&id("456")));
    assert_not_liked(&root, button);

    root.click(button).unwrap();
    assert!(store.is_liked(&id("456")));
    assert!(store.is_liked(&id("123")));
    assert_liked(&root, button);

    root.click(swap).unwrap();
    assert_eq!(button_for(&root, "123"), button);
    assert_liked(&root, button);
}
