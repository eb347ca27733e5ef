//! # like-toggle
//!
//! A declarative "like" button, built on a small reactive composition runtime.
//!
//! The widget is a pure function of an item identifier and its liked state:
//! it renders a `button` whose label and `Liked` class follow that state, and
//! toggles it through a [`LikeStore`](like::LikeStore) when clicked.
//!
//! ```
//! use like_toggle::prelude::*;
//! use std::rc::Rc;
//!
//! let store: Rc<dyn LikeStore> = Rc::new(MemoryLikeStore::new());
//!
//! let mut root = Root::new(Dom::new());
//! root.render((
//!     LikeToggle::new("123", store.clone()).unwrap(),
//!     LikeToggle::new("456", store.clone()).unwrap(),
//! ))
//! .unwrap();
//!
//! let button = root.surface().find_by_attribute("data-id", "123").unwrap();
//! root.click(button).unwrap();
//!
//! assert!(store.is_liked(&ItemId::new("123").unwrap()));
//! assert_eq!(root.surface().text(button), Some("Quitar me gusta"));
//! ```
//!
//! ## Hooks
//! Functions that begin with `use_` are called `hooks`.
//! Hooks are used to manage state and side effects in composables.
//!
//! Hooks must be used in the same order for every re-compose.
//! Don’t use hooks inside loops, conditions, nested functions, or match blocks.
//! Instead, always use hooks at the top level of your composable, before any early returns.

#![deny(missing_docs)]

extern crate alloc;

use crate::composer::Runtime;
use alloc::rc::Rc;
use core::{
    any::{Any, TypeId},
    cell::{Cell, RefCell},
    fmt,
    marker::PhantomData,
    ops::Deref,
};
use thiserror::Error;

pub(crate) use hashbrown::HashMap;

/// Prelude of commonly-used hooks and composables.
/// `use like_toggle::prelude::*;`
pub mod prelude {
    pub use crate::{
        data::Data, use_context, use_drop, use_memo, use_mut, use_provider, use_ref, Mut, Scope,
        ScopeData, ScopeState, Signal,
    };

    pub use crate::compose::{
        self, catch, dyn_compose, from_fn, from_iter, memo, Compose, DynCompose, Error, Memo,
    };

    pub use crate::view::{button, div, element, span, Dom, Element, Event, EventKind, NodeId};

    pub use crate::like::{
        ConfigurationError, ItemId, LikeLabels, LikeStore, LikeToggle, MemoryLikeStore,
    };

    pub use crate::root::Root;
}

/// Composable functions.
pub mod compose;

/// Composer and runtime.
pub mod composer;

pub mod data;

pub mod like;

mod root;
pub use self::root::Root;

pub mod view;

/// Shared, read-only handle to a value owned by the composition tree.
///
/// A signal either points at a whole value or at a part of one,
/// created with [`Signal::map`].
/// Composables receive their own value as a signal from [`Scope::me`]
/// and hand parts of it to children by mapping it.
pub struct Signal<T> {
    owner: Rc<dyn Any>,
    project: Rc<dyn Project<T>>,
}

impl<T: 'static> Signal<T> {
    /// Create a new signal owning `value`.
    pub fn new(value: T) -> Self {
        Self {
            owner: Rc::new(value),
            project: Rc::new(Owned(PhantomData)),
        }
    }

    /// Map this signal to a part of its value.
    pub fn map<U: 'static>(me: Self, f: impl Fn(&T) -> &U + 'static) -> Signal<U> {
        Signal {
            owner: me.owner,
            project: Rc::new(Mapped {
                inner: me.project,
                f,
            }),
        }
    }
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        Self {
            owner: self.owner.clone(),
            project: self.project.clone(),
        }
    }
}

impl<T> Deref for Signal<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        self.project.project(&*self.owner)
    }
}

impl<T: fmt::Debug> fmt::Debug for Signal<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&**self, f)
    }
}

trait Project<T> {
    fn project<'a>(&self, owner: &'a (dyn Any + 'static)) -> &'a T;
}

struct Owned<T>(PhantomData<fn() -> T>);

impl<T: 'static> Project<T> for Owned<T> {
    fn project<'a>(&self, owner: &'a (dyn Any + 'static)) -> &'a T {
        owner
            .downcast_ref()
            .expect("signal owner does not match its projection")
    }
}

struct Mapped<T, F> {
    inner: Rc<dyn Project<T>>,
    f: F,
}

impl<T, U, F> Project<U> for Mapped<T, F>
where
    T: 'static,
    U: 'static,
    F: Fn(&T) -> &U,
{
    fn project<'a>(&self, owner: &'a (dyn Any + 'static)) -> &'a U {
        (self.f)(self.inner.project(owner))
    }
}

/// Mutable handle to a value of type `T`, created with [`use_mut`].
///
/// Updates are queued on the runtime and applied before the next composition,
/// which then recomposes the composable owning this value.
pub struct Mut<T> {
    value: Rc<RefCell<T>>,
    scope_is_changed: Rc<Cell<bool>>,
    rt: Runtime,
}

impl<T: 'static> Mut<T> {
    /// Queue an update to this value, triggering an update to the composable owning this value.
    pub fn update(&self, f: impl FnOnce(&mut T) + 'static) {
        let value = self.value.clone();
        let is_changed = self.scope_is_changed.clone();

        self.rt.update(move || {
            f(&mut value.borrow_mut());
            is_changed.set(true);
        });
    }

    /// Set this value, triggering an update to the composable owning it.
    pub fn set(&self, value: T) {
        self.update(move |dst| *dst = value);
    }

    /// Get a copy of the current value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        self.value.borrow().clone()
    }
}

impl<T> Clone for Mut<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            scope_is_changed: self.scope_is_changed.clone(),
            rt: self.rt.clone(),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Mut<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Mut").field(&*self.value.borrow()).finish()
    }
}

/// Map of [`TypeId`] to context values.
#[derive(Clone, Default)]
pub(crate) struct Contexts {
    pub(crate) values: HashMap<TypeId, Rc<dyn Any>>,
}

type DropFn = Rc<RefCell<Option<Box<dyn FnOnce()>>>>;

/// Scope state of a composable function.
pub type ScopeState<'a> = &'a ScopeData;

/// State of a composable.
#[derive(Default)]
pub struct ScopeData {
    hooks: RefCell<Vec<Rc<dyn Any>>>,
    hook_idx: Cell<usize>,
    pub(crate) child_idx: Cell<usize>,
    pub(crate) is_changed: Rc<Cell<bool>>,
    pub(crate) contexts: RefCell<Contexts>,
    pub(crate) child_contexts: RefCell<Contexts>,
    drops: RefCell<Vec<DropFn>>,
    pub(crate) key: Cell<Option<slotmap::DefaultKey>>,
    pub(crate) path: Vec<usize>,
}

impl ScopeData {
    /// Create the state of the `idx`th child of `parent`.
    pub(crate) fn child_of(parent: &ScopeData, idx: usize) -> Self {
        let mut contexts = parent.contexts.borrow().clone();
        contexts
            .values
            .extend(parent.child_contexts.borrow().values.clone());

        let mut path = parent.path.clone();
        path.push(idx);

        Self {
            contexts: RefCell::new(contexts),
            path,
            is_changed: Rc::new(Cell::new(true)),
            ..Default::default()
        }
    }

    /// Reset the hook and child cursors before composing.
    pub(crate) fn reset(&self) {
        self.hook_idx.set(0);
        self.child_idx.set(0);
    }

    /// Set this scope as changed, recomposing it on the next composition.
    ///
    /// # Panics
    /// Panics if called outside of a runtime.
    pub fn set_changed(&self) {
        let is_changed = self.is_changed.clone();
        Runtime::current().update(move || is_changed.set(true));
    }

    /// Position of this scope in the composition tree, as child indices from the root.
    pub fn path(&self) -> &[usize] {
        &self.path
    }

    /// Run and clear every drop function registered with [`use_drop`].
    pub(crate) fn run_drops(&self) {
        let drops = core::mem::take(&mut *self.drops.borrow_mut());
        for f in drops {
            let f = f.borrow_mut().take();
            if let Some(f) = f {
                f();
            }
        }
    }
}

/// Composable scope.
pub struct Scope<C> {
    pub(crate) me: Signal<C>,
    pub(crate) state: Rc<ScopeData>,
}

impl<C> Scope<C> {
    /// Get a [`Signal`] to this composable.
    pub fn me(&self) -> Signal<C> {
        self.me.clone()
    }

    /// Get the state of this composable.
    pub fn state(&self) -> ScopeState<'_> {
        &self.state
    }
}

impl<C> Clone for Scope<C> {
    fn clone(&self) -> Self {
        Self {
            me: self.me.clone(),
            state: self.state.clone(),
        }
    }
}

impl<C> Deref for Scope<C> {
    type Target = ScopeData;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

/// Use an immutable reference to a value of type `T`.
///
/// `make_value` will only be called once to initialize this value.
///
/// # Panics
/// Panics if hooks were called in a different order than on the previous compose.
pub fn use_ref<T: 'static>(cx: ScopeState, make_value: impl FnOnce() -> T) -> Rc<T> {
    let idx = cx.hook_idx.get();
    cx.hook_idx.set(idx + 1);

    let existing = cx.hooks.borrow().get(idx).cloned();
    let any = match existing {
        Some(any) => any,
        None => {
            let value: Rc<dyn Any> = Rc::new(make_value());
            cx.hooks.borrow_mut().push(value.clone());
            value
        }
    };

    any.downcast()
        .unwrap_or_else(|_| panic!("hook {idx} changed type between compositions"))
}

/// Use a mutable reference to a value of type `T`.
///
/// `make_value` will only be called once to initialize this value.
///
/// # Panics
/// Panics if called outside of a runtime.
pub fn use_mut<T: 'static>(cx: ScopeState, make_value: impl FnOnce() -> T) -> Mut<T> {
    let value = use_ref(cx, || RefCell::new(make_value()));

    Mut {
        value,
        scope_is_changed: cx.is_changed.clone(),
        rt: Runtime::current(),
    }
}

/// Use a memoized value of type `T` with a dependency of type `D`.
///
/// `make_value` will update the returned value whenever `dependency` is changed.
pub fn use_memo<D, T>(cx: ScopeState, dependency: D, make_value: impl FnOnce() -> T) -> Rc<T>
where
    D: PartialEq + 'static,
    T: 'static,
{
    let memo = use_ref(cx, || RefCell::new(None::<(D, Rc<T>)>));
    let mut memo = memo.borrow_mut();

    match &*memo {
        Some((last, value)) if *last == dependency => value.clone(),
        _ => {
            let value = Rc::new(make_value());
            *memo = Some((dependency, value.clone()));
            value
        }
    }
}

/// Use a function that will be called when this scope is dropped.
///
/// The latest function passed is the one that runs.
pub fn use_drop(cx: ScopeState, f: impl FnOnce() + 'static) {
    let cell = use_ref(cx, || {
        let cell: DropFn = Rc::default();
        cx.drops.borrow_mut().push(cell.clone());
        cell
    });

    *cell.borrow_mut() = Some(Box::new(f));
}

/// Error for a missing context.
#[derive(Error)]
pub struct ContextError<T> {
    _marker: PhantomData<fn() -> T>,
}

impl<T> fmt::Debug for ContextError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ContextError")
            .field(&core::any::type_name::<T>())
            .finish()
    }
}

impl<T> fmt::Display for ContextError<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Context value not found for type: {}",
            core::any::type_name::<T>()
        )
    }
}

/// Use a context value of type `T`.
///
/// Returns the value provided by the nearest ancestor with [`use_provider`].
pub fn use_context<T: 'static>(cx: ScopeState) -> Result<Rc<T>, ContextError<T>> {
    let Some(any) = cx
        .contexts
        .borrow()
        .values
        .get(&TypeId::of::<T>())
        .cloned()
    else {
        return Err(ContextError {
            _marker: PhantomData,
        });
    };

    any.downcast().map_err(|_| ContextError {
        _marker: PhantomData,
    })
}

/// Provide a context value of type `T`.
///
/// This value will be available to [`use_context`] to all children of this composable.
pub fn use_provider<T: 'static>(cx: ScopeState, make_value: impl FnOnce() -> T) -> Rc<T> {
    let value = use_ref(cx, || {
        let value = Rc::new(make_value());
        cx.child_contexts
            .borrow_mut()
            .values
            .insert(TypeId::of::<T>(), value.clone());
        value
    });
    (*value).clone()
}
