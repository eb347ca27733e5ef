use super::{CatchContext, Error};
use crate::{compose::Compose, data::Data, use_provider, Scope, Signal};
use alloc::rc::Rc;

/// Create a composable that catches errors from its children.
///
/// If a child returns a `Result<T, like_toggle::compose::Error>`,
/// any errors will be caught by this composable by calling `on_error`.
/// Siblings of the failing child keep composing.
pub fn catch<C: Compose>(on_error: impl Fn(Error) + 'static, content: C) -> Catch<C> {
    Catch {
        content,
        f: Rc::new(on_error),
    }
}

/// Error catch composable.
///
/// See [`catch`] for more.
#[derive(Data)]
#[like_toggle(path = "crate")]
#[must_use = "Composables do nothing unless composed or returned from other composables."]
pub struct Catch<C> {
    content: C,
    f: Rc<dyn Fn(Error)>,
}

impl<C: Compose> Compose for Catch<C> {
    fn compose(cx: Scope<Self>) -> impl Compose {
        let f = cx.me().f.clone();
        use_provider(&cx, move || CatchContext::new(move |error| f(error)));

        Signal::map(cx.me(), |me| &me.content)
    }
}
