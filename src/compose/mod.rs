use crate::{composer::Runtime, data::Data, use_context, Scope, ScopeData, Signal};
use alloc::{borrow::Cow, rc::Rc};
use core::{any::TypeId, fmt};

mod catch;
pub use self::catch::{catch, Catch};

mod dyn_compose;
pub use self::dyn_compose::{dyn_compose, DynCompose};

mod from_fn;
pub use self::from_fn::{from_fn, FromFn};

mod from_iter;
pub use self::from_iter::{from_iter, FromIter};

mod memo;
pub use self::memo::{memo, Memo};

/// A composable function.
///
/// For a dynamically-typed composable, see [`DynCompose`].
///
/// Composables are the building blocks of reactivity.
/// A composable is essentially a function that is re-run whenever its state (or its parent state) is changed.
/// Composables may return one or more children, that run after their parent.
///
/// When a composable is re-run, we call that "recomposition".
/// For example, on the initial composition, hooks may initialize their state.
/// Then on recomposition, hooks update their state from the last set value.
///
/// Children are matched to the previous composition by position.
/// A child at the same position with the same type keeps its state,
/// anything else is dropped and composed from scratch.
#[must_use = "Composables do nothing unless composed or returned from other composables."]
pub trait Compose: Data + Sized {
    /// Compose this function.
    fn compose(cx: Scope<Self>) -> impl Compose;

    #[doc(hidden)]
    fn name() -> Cow<'static, str> {
        let name = core::any::type_name::<Self>();
        name.split('<')
            .next()
            .unwrap_or(name)
            .split("::")
            .last()
            .unwrap_or(name)
            .into()
    }
}

impl Compose for () {
    fn compose(cx: Scope<Self>) -> impl Compose {
        let _ = cx;
    }
}

impl<C: Compose> Compose for Signal<C> {
    fn compose(cx: Scope<Self>) -> impl Compose {
        let content = (*cx.me()).clone();
        Runtime::current().claim(&cx, Some(Rc::new(Composable::from_signal(content))));
    }

    fn name() -> Cow<'static, str> {
        C::name()
    }
}

impl<C: Compose> Compose for Option<C> {
    fn compose(cx: Scope<Self>) -> impl Compose {
        if cx.me().is_some() {
            let content = Signal::map(cx.me(), |me| match me {
                Some(content) => content,
                None => unreachable!("composed `None` as `Some`"),
            });
            Runtime::current().claim(&cx, Some(Rc::new(Composable::from_signal(content))));
        }
    }
}

/// Composable error.
///
/// This can be handled by a parent composable with [`catch`].
/// Any error type converts into this with `?` or [`From`].
#[derive(Clone)]
pub struct Error {
    inner: Rc<dyn core::error::Error>,
}

impl Error {
    /// Create a new composable error.
    pub fn new(error: impl core::error::Error + 'static) -> Self {
        Self {
            inner: Rc::new(error),
        }
    }

    /// Returns a reference to the inner error if it is of type `E`.
    pub fn downcast_ref<E: core::error::Error + 'static>(&self) -> Option<&E> {
        self.inner.downcast_ref()
    }
}

impl<E: core::error::Error + 'static> From<E> for Error {
    fn from(error: E) -> Self {
        Self::new(error)
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Debug::fmt(&*self.inner, f)
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fmt::Display::fmt(&*self.inner, f)
    }
}

impl Data for Error {}

impl<C: Compose> Compose for Result<C, Error> {
    fn compose(cx: Scope<Self>) -> impl Compose {
        let catch_cx = use_context::<CatchContext>(&cx);

        match &*cx.me() {
            Ok(_) => {
                let content = Signal::map(cx.me(), |me| match me {
                    Ok(content) => content,
                    Err(_) => unreachable!("composed `Err` as `Ok`"),
                });
                Runtime::current().claim(&cx, Some(Rc::new(Composable::from_signal(content))));
            }
            Err(error) => {
                #[cfg(feature = "tracing")]
                tracing::warn!(%error, "Composable returned an error");

                if let Ok(catch_cx) = catch_cx {
                    (catch_cx.f)(error.clone());
                }
            }
        }
    }
}

pub(crate) struct CatchContext {
    f: Rc<dyn Fn(Error)>,
}

impl CatchContext {
    pub(crate) fn new(f: impl Fn(Error) + 'static) -> Self {
        Self { f: Rc::new(f) }
    }
}

macro_rules! impl_tuples {
    ($($t:tt : $idx:tt),*) => {
        impl<$($t: Data),*> Data for ($($t,)*) {}

        impl<$($t: Compose),*> Compose for ($($t,)*) {
            fn compose(cx: Scope<Self>) -> impl Compose {
                let rt = Runtime::current();

                $({
                    let content = Signal::map(cx.me(), |me| &me.$idx);
                    rt.claim(&cx, Some(Rc::new(Composable::from_signal(content))));
                })*
            }

            fn name() -> Cow<'static, str> {
                "Fragment".into()
            }
        }
    };
}

impl_tuples!(T1:0);
impl_tuples!(T1:0, T2:1);
impl_tuples!(T1:0, T2:1, T3:2);
impl_tuples!(T1:0, T2:1, T3:2, T4:3);
impl_tuples!(T1:0, T2:1, T3:2, T4:3, T5:4);
impl_tuples!(T1:0, T2:1, T3:2, T4:3, T5:4, T6:5);
impl_tuples!(T1:0, T2:1, T3:2, T4:3, T5:4, T6:5, T7:6);
impl_tuples!(T1:0, T2:1, T3:2, T4:3, T5:4, T6:5, T7:6, T8:7);

impl<C> Compose for Vec<C>
where
    C: Compose,
{
    fn compose(cx: Scope<Self>) -> impl Compose {
        let rt = Runtime::current();

        for idx in 0..cx.me().len() {
            let content = Signal::map(cx.me(), move |me| &me[idx]);
            rt.claim(&cx, Some(Rc::new(Composable::from_signal(content))));
        }
    }
}

/// Type-erased composable stored in a composition node.
pub(crate) trait AnyCompose {
    fn data_id(&self) -> TypeId;

    fn any_compose(&self, state: &Rc<ScopeData>);
}

/// A composable of type `C`, held through a [`Signal`] into its owner.
pub(crate) struct Composable<C> {
    signal: Signal<C>,
}

impl<C: Compose> Composable<C> {
    pub(crate) fn new(content: C) -> Self {
        Self::from_signal(Signal::new(content))
    }

    pub(crate) fn from_signal(signal: Signal<C>) -> Self {
        Self { signal }
    }
}

impl<C: Compose> AnyCompose for Composable<C> {
    fn data_id(&self) -> TypeId {
        TypeId::of::<C>()
    }

    fn any_compose(&self, state: &Rc<ScopeData>) {
        state.reset();

        #[cfg(feature = "tracing")]
        tracing::trace!("Compose: {}", C::name());

        let child = C::compose(Scope {
            me: self.signal.clone(),
            state: state.clone(),
        });

        claim_returned(state, child);
    }
}

/// Claim the content returned from a composable as its next child.
fn claim_returned<C: Compose>(state: &ScopeData, child: C) {
    if TypeId::of::<C>() == TypeId::of::<()>() {
        return;
    }

    Runtime::current().claim(state, Some(Rc::new(Composable::new(child))));
}
