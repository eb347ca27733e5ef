use like_toggle::prelude::*;
use std::rc::Rc;
use tracing::{info, level_filters::LevelFilter};
use tracing_subscriber::FmtSubscriber;

#[derive(Data)]
struct App {
    store: Rc<dyn LikeStore>,
}

impl Compose for App {
    fn compose(cx: Scope<Self>) -> impl Compose {
        let store = cx.me().store.clone();

        div().class("posts").content(from_iter(["123", "456"], move |id| {
            LikeToggle::new(*id, store.clone()).map_err(Error::from)
        }))
    }
}

fn main() {
    tracing::subscriber::set_global_default(
        FmtSubscriber::builder()
            .with_max_level(LevelFilter::TRACE)
            .finish(),
    )
    .unwrap();

    let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());

    let mut root = Root::new(Dom::new());
    root.render(App {
        store: store.clone(),
    })
    .unwrap();
    info!("{}", root.surface().to_html());

    let button = root.surface().find_by_attribute("data-id", "123").unwrap();
    root.click(button).unwrap();
    info!("{}", root.surface().to_html());

    for edit in root.surface_mut().take_edits() {
        info!(?edit);
    }
}
