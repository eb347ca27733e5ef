use crate::{compose::Compose, data::Data, Scope, ScopeState};
use core::marker::PhantomData;

/// Create a composable from a function.
pub fn from_fn<F, C>(f: F) -> FromFn<F, C>
where
    F: Fn(ScopeState) -> C + 'static,
    C: Compose,
{
    FromFn {
        f,
        _marker: PhantomData,
    }
}

/// Function composable.
///
/// For more see [`from_fn`].
#[must_use = "Composables do nothing unless composed or returned from other composables."]
pub struct FromFn<F, C> {
    f: F,
    _marker: PhantomData<fn() -> C>,
}

impl<F, C> Data for FromFn<F, C>
where
    F: Fn(ScopeState) -> C + 'static,
    C: Compose,
{
}

impl<F, C> Compose for FromFn<F, C>
where
    F: Fn(ScopeState) -> C + 'static,
    C: Compose,
{
    fn compose(cx: Scope<Self>) -> impl Compose {
        (cx.me().f)(&cx)
    }
}
