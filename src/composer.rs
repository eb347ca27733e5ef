use crate::{
    compose::{AnyCompose, CatchContext, Composable, Compose, Error},
    ScopeData,
};
use alloc::rc::Rc;
use core::{
    any::TypeId,
    cell::{Cell, RefCell},
    fmt,
};
use crossbeam_queue::SegQueue;
use slotmap::{DefaultKey, SlotMap};
use thiserror::Error;

/// An update to apply to a composable.
pub struct Update {
    f: Box<dyn FnOnce()>,
}

impl Update {
    /// Apply this update.
    pub fn apply(self) {
        (self.f)();
    }
}

/// A node in the composition tree.
pub(crate) struct Node {
    pub(crate) compose: RefCell<Rc<dyn AnyCompose>>,
    pub(crate) scope: Rc<ScopeData>,
    pub(crate) children: RefCell<Vec<DefaultKey>>,
}

/// Runtime for a [`Composer`].
#[derive(Clone, Default)]
pub struct Runtime {
    /// Composition tree.
    pub(crate) nodes: Rc<RefCell<SlotMap<DefaultKey, Rc<Node>>>>,

    /// Queue for updates that mutate the composition tree.
    pub(crate) update_queue: Rc<SegQueue<Update>>,
}

impl Runtime {
    /// Get the current [`Runtime`].
    ///
    /// # Panics
    /// Panics if called outside of a runtime.
    pub fn current() -> Self {
        Self::try_current().expect("Runtime::current() called outside of a runtime")
    }

    /// Get the current [`Runtime`], or `None` if no runtime was entered.
    pub fn try_current() -> Option<Self> {
        RUNTIME.with(|runtime| runtime.borrow().clone())
    }

    /// Enter this runtime, making it available to [`Runtime::current`].
    pub fn enter(&self) {
        RUNTIME.with(|runtime| {
            *runtime.borrow_mut() = Some(self.clone());
        });
    }

    fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.nodes, &other.nodes)
    }

    /// Queue an update to run before the next composition.
    pub fn update(&self, f: impl FnOnce() + 'static) {
        self.update_queue.push(Update { f: Box::new(f) });
    }

    /// Claim the next child of the composable owning `cx`.
    ///
    /// A `content` of `None` keeps the existing child as it is.
    pub(crate) fn claim(&self, cx: &ScopeData, content: Option<Rc<dyn AnyCompose>>) {
        let idx = cx.child_idx.get();
        cx.child_idx.set(idx + 1);

        let Some(parent) = cx.key.get().and_then(|key| self.node(key)) else {
            return;
        };

        let existing = parent.children.borrow().get(idx).copied();
        let Some(content) = content else {
            return;
        };

        if let Some(key) = existing {
            let node = self
                .node(key)
                .filter(|node| node.compose.borrow().data_id() == content.data_id());

            if let Some(node) = node {
                *node.compose.borrow_mut() = content;
                node.scope.is_changed.set(true);
            } else {
                self.drop_node(key);

                let child = self.insert(cx, idx, content);
                parent.children.borrow_mut()[idx] = child;
            }
        } else {
            let child = self.insert(cx, idx, content);
            parent.children.borrow_mut().push(child);
        }
    }

    fn node(&self, key: DefaultKey) -> Option<Rc<Node>> {
        self.nodes.borrow().get(key).cloned()
    }

    fn insert(&self, parent: &ScopeData, idx: usize, content: Rc<dyn AnyCompose>) -> DefaultKey {
        let scope = Rc::new(ScopeData::child_of(parent, idx));

        let key = self.nodes.borrow_mut().insert(Rc::new(Node {
            compose: RefCell::new(content),
            scope: scope.clone(),
            children: RefCell::new(Vec::new()),
        }));
        scope.key.set(Some(key));

        key
    }

    /// Compose the node at `key` if it changed, then visit its children.
    fn compose_node(&self, key: DefaultKey) {
        let Some(node) = self.node(key) else {
            return;
        };

        if node.scope.is_changed.take() {
            let compose = node.compose.borrow().clone();
            compose.any_compose(&node.scope);

            let removed = {
                let mut children = node.children.borrow_mut();
                let len = node.scope.child_idx.get().min(children.len());
                children.split_off(len)
            };
            for child in removed {
                self.drop_node(child);
            }
        }

        let children = node.children.borrow().clone();
        for child in children {
            self.compose_node(child);
        }
    }

    /// Remove the node at `key` and its descendants, running their drop functions deepest-first.
    fn drop_node(&self, key: DefaultKey) {
        let Some(node) = self.nodes.borrow_mut().remove(key) else {
            return;
        };

        let children = node.children.take();
        for child in children {
            self.drop_node(child);
        }

        node.scope.run_drops();
    }
}

thread_local! {
    static RUNTIME: RefCell<Option<Runtime>> = const { RefCell::new(None) };
}

/// Error for [`Composer::try_compose`].
#[derive(Clone, Error)]
pub enum TryComposeError {
    /// No updates are ready to be applied.
    #[error("Pending")]
    Pending,

    /// A composable returned an error that no [`catch`](crate::compose::catch) handled.
    #[error("{0}")]
    Error(Error),
}

impl fmt::Debug for TryComposeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("Pending"),
            Self::Error(error) => f.debug_tuple("Error").field(error).finish(),
        }
    }
}

/// Composer for composable content.
///
/// ```
/// use like_toggle::{composer::{Composer, TryComposeError}, prelude::*};
///
/// #[derive(Data)]
/// struct App;
///
/// impl Compose for App {
///     fn compose(_cx: Scope<Self>) -> impl Compose {}
/// }
///
/// let mut composer = Composer::new(App);
/// composer.try_compose().unwrap();
///
/// assert!(matches!(composer.try_compose(), Err(TryComposeError::Pending)));
/// ```
pub struct Composer {
    rt: Runtime,
    root: DefaultKey,
    error: Rc<Cell<Option<Error>>>,
    is_initial: bool,
}

impl Composer {
    /// Create a new [`Composer`] with the given content.
    pub fn new(content: impl Compose) -> Self {
        let rt = Runtime::default();

        let error = Rc::new(Cell::new(None));
        let error_handle = error.clone();

        let scope = Rc::new(ScopeData::default());
        scope.contexts.borrow_mut().values.insert(
            TypeId::of::<CatchContext>(),
            Rc::new(CatchContext::new(move |e| {
                let first = error_handle.take().unwrap_or(e);
                error_handle.set(Some(first));
            })),
        );
        scope.is_changed.set(true);

        let root = rt.nodes.borrow_mut().insert(Rc::new(Node {
            compose: RefCell::new(Rc::new(Composable::new(content))),
            scope: scope.clone(),
            children: RefCell::new(Vec::new()),
        }));
        scope.key.set(Some(root));

        Self {
            rt,
            root,
            error,
            is_initial: true,
        }
    }

    /// Get the [`Runtime`] of this composer.
    pub fn runtime(&self) -> &Runtime {
        &self.rt
    }

    /// Try to immediately compose the content in this composer.
    ///
    /// The first call composes everything.
    /// Later calls apply queued updates and recompose what they changed,
    /// or return [`TryComposeError::Pending`] if no updates were queued.
    ///
    /// Errors are reported after the rest of the tree has been composed.
    pub fn try_compose(&mut self) -> Result<(), TryComposeError> {
        self.rt.enter();

        if self.is_initial {
            self.is_initial = false;
        } else {
            let mut is_ready = false;

            while let Some(update) = self.rt.update_queue.pop() {
                update.apply();
                is_ready = true;
            }

            if !is_ready {
                return Err(TryComposeError::Pending);
            }
        }

        #[cfg(feature = "tracing")]
        tracing::trace!("Start composition");

        self.rt.compose_node(self.root);

        match self.error.take() {
            Some(error) => Err(TryComposeError::Error(error)),
            None => Ok(()),
        }
    }

    /// Compose until no more updates are queued.
    ///
    /// Composition continues past errors, and the first one is returned once the tree is stable.
    pub fn compose(&mut self) -> Result<(), Error> {
        let mut first_error = None;

        loop {
            match self.try_compose() {
                Ok(()) => {}
                Err(TryComposeError::Pending) => break,
                Err(TryComposeError::Error(error)) => {
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

impl Drop for Composer {
    fn drop(&mut self) {
        let previous = Runtime::try_current().filter(|rt| !rt.ptr_eq(&self.rt));

        self.rt.enter();
        self.rt.drop_node(self.root);

        RUNTIME.with(|runtime| *runtime.borrow_mut() = previous);
    }
}

#[cfg(test)]
mod tests {
    use crate::{
        composer::{Composer, Runtime},
        prelude::*,
    };
    use std::{cell::Cell, rc::Rc};

    #[derive(Data)]
    #[like_toggle(path = "crate")]
    struct Counter {
        x: Rc<Cell<i32>>,
    }

    impl Compose for Counter {
        fn compose(cx: Scope<Self>) -> impl Compose {
            cx.me().x.set(cx.me().x.get() + 1);

            cx.set_changed();
        }
    }

    #[test]
    fn it_composes_until_stable() {
        #[derive(Data)]
        #[like_toggle(path = "crate")]
        struct Once {
            x: Rc<Cell<i32>>,
        }

        impl Compose for Once {
            fn compose(cx: Scope<Self>) -> impl Compose {
                let is_done = use_mut(&cx, || false);
                cx.me().x.set(cx.me().x.get() + 1);

                if !is_done.get() {
                    is_done.set(true);
                }
            }
        }

        let x = Rc::new(Cell::new(0));
        let mut composer = Composer::new(Once { x: x.clone() });

        composer.compose().unwrap();
        assert_eq!(x.get(), 2);
    }

    #[test]
    fn it_runs_drops_on_teardown() {
        #[derive(Data)]
        #[like_toggle(path = "crate")]
        struct Guard {
            dropped: Rc<Cell<bool>>,
        }

        impl Compose for Guard {
            fn compose(cx: Scope<Self>) -> impl Compose {
                let dropped = cx.me().dropped.clone();
                use_drop(&cx, move || dropped.set(true));
            }
        }

        let dropped = Rc::new(Cell::new(false));
        let mut composer = Composer::new((
            Guard {
                dropped: dropped.clone(),
            },
            Counter {
                x: Rc::new(Cell::new(0)),
            },
        ));
        composer.try_compose().unwrap();
        assert!(!dropped.get());

        drop(composer);
        assert!(dropped.get());
    }

    #[test]
    fn it_leaves_the_runtime_on_drop() {
        let composer = Composer::new(());
        composer.runtime().enter();
        assert!(Runtime::try_current().is_some());

        drop(composer);
        assert!(Runtime::try_current().is_none());
    }

    #[test]
    fn it_keeps_another_current_runtime_on_drop() {
        let first = Composer::new(());
        let second = Composer::new(());
        second.runtime().enter();

        drop(first);
        assert!(Runtime::try_current().is_some_and(|rt| rt.ptr_eq(second.runtime())));
    }
}
