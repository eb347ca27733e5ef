use super::{AnyCompose, Composable};
use crate::{composer::Runtime, compose::Compose, data::Data, use_ref, Scope, Signal};
use alloc::{borrow::Cow, rc::Rc};
use core::cell::RefCell;

/// Create a new memoized composable.
///
/// The content of the memoized composable is only re-composed when the dependency changes.
///
/// Children of this `Memo` may still be re-composed if their state has changed.
pub fn memo<D, C>(dependency: D, content: C) -> Memo<D, C>
where
    D: Data + Clone + PartialEq,
    C: Compose,
{
    Memo {
        dependency,
        content,
    }
}

/// Memoized composable.
///
/// See [`memo`] for more.
#[derive(Data)]
#[like_toggle(path = "crate")]
#[must_use = "Composables do nothing unless composed or returned from other composables."]
pub struct Memo<T, C> {
    dependency: T,
    content: C,
}

impl<T, C> Compose for Memo<T, C>
where
    T: Clone + Data + PartialEq,
    C: Compose,
{
    fn compose(cx: Scope<Self>) -> impl Compose {
        let last = use_ref(&cx, || RefCell::new(None::<T>));

        let is_changed = last.borrow().as_ref() != Some(&cx.me().dependency);
        let content: Option<Rc<dyn AnyCompose>> = if is_changed {
            *last.borrow_mut() = Some(cx.me().dependency.clone());

            let content = Signal::map(cx.me(), |me| &me.content);
            Some(Rc::new(Composable::from_signal(content)))
        } else {
            None
        };

        Runtime::current().claim(&cx, content);
    }

    fn name() -> Cow<'static, str> {
        format!("Memo<{}>", C::name()).into()
    }
}
