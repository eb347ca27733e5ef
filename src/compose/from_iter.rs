use super::Composable;
use crate::{composer::Runtime, prelude::*};
use alloc::rc::Rc;

/// Composable from an iterator, created with [`from_iter`].
#[must_use = "Composables do nothing unless composed or returned from other composables."]
pub struct FromIter<Item, C> {
    items: Vec<Item>,
    make_item: Rc<dyn Fn(Signal<Item>) -> C>,
}

impl<Item, C> Data for FromIter<Item, C>
where
    Item: 'static,
    C: Data,
{
}

impl<Item, C> Compose for FromIter<Item, C>
where
    Item: 'static,
    C: Compose,
{
    fn compose(cx: Scope<Self>) -> impl Compose {
        let rt = Runtime::current();

        for idx in 0..cx.me().items.len() {
            let item = Signal::map(cx.me(), move |me| &me.items[idx]);
            let content = (cx.me().make_item)(item);
            rt.claim(&cx, Some(Rc::new(Composable::new(content))));
        }
    }
}

/// Create a composable from an iterator.
///
/// `make_item` will be called for each item to produce a composable.
/// Items are matched to the previous composition by position.
pub fn from_iter<I, C>(
    iter: I,
    make_item: impl Fn(Signal<I::Item>) -> C + 'static,
) -> FromIter<I::Item, C>
where
    I: IntoIterator,
    I::Item: 'static,
    C: Compose,
{
    FromIter {
        items: iter.into_iter().collect(),
        make_item: Rc::new(make_item),
    }
}
