use crate::{
    compose::{Compose, Error},
    composer::Composer,
    data::Data,
    use_provider,
    view::{Event, Host, NodeId, Surface, SurfaceContext},
    Scope, Signal,
};
use alloc::rc::Rc;
use core::cell::{Ref, RefCell, RefMut};

/// Root of a composition mounted into a [`Surface`].
///
/// Events dispatched to the root run the listener registered for their target,
/// then recompose synchronously: the surface is up to date when [`Root::dispatch`] returns.
///
/// ```
/// use like_toggle::prelude::*;
///
/// #[derive(Data)]
/// struct Counter;
///
/// impl Compose for Counter {
///     fn compose(cx: Scope<Self>) -> impl Compose {
///         let count = use_mut(&cx, || 0);
///
///         button()
///             .text(format!("Clicked {} times", count.get()))
///             .on_click(move || count.update(|x| *x += 1))
///     }
/// }
///
/// let mut root = Root::new(Dom::new());
/// root.render(Counter).unwrap();
///
/// let button = root.surface().find_by_tag("button").unwrap();
/// root.click(button).unwrap();
/// root.click(button).unwrap();
///
/// assert_eq!(root.surface().text(button), Some("Clicked 2 times"));
/// ```
pub struct Root<S> {
    surface: Rc<RefCell<S>>,
    host: Rc<Host>,
    composer: Option<Composer>,
}

impl<S: Surface + 'static> Root<S> {
    /// Create a new root mounting into `surface`.
    pub fn new(surface: S) -> Self {
        let surface = Rc::new(RefCell::new(surface));
        let host = Rc::new(Host::new(surface.clone()));

        Self {
            surface,
            host,
            composer: None,
        }
    }

    /// Render `content` into the surface, replacing any previous content.
    ///
    /// Composition runs until no more updates are queued.
    /// If a composable returned an unhandled error, the rest of the content is still rendered
    /// and the first error is returned.
    pub fn render(&mut self, content: impl Compose) -> Result<(), Error> {
        self.unmount();

        let mut composer = Composer::new(Mount {
            host: self.host.clone(),
            content,
        });
        let result = composer.compose();
        self.composer = Some(composer);

        result
    }

    /// Dispatch an event to the listener registered for its target.
    ///
    /// Returns `Ok(false)` if no listener handled the event.
    pub fn dispatch(&mut self, event: Event) -> Result<bool, Error> {
        let Some(composer) = &mut self.composer else {
            return Ok(false);
        };

        let Some(listener) = self.host.listener(&event) else {
            #[cfg(feature = "tracing")]
            tracing::warn!(kind = ?event.kind, "No listener for event on node {:?}", event.target);

            return Ok(false);
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(kind = ?event.kind, "Dispatch event to node {:?}", event.target);

        composer.runtime().enter();
        listener(&event);

        composer.compose()?;
        Ok(true)
    }

    /// Dispatch a click on `node`.
    pub fn click(&mut self, node: NodeId) -> Result<bool, Error> {
        self.dispatch(Event::click(node))
    }

    /// Drop all content, removing every host node it created.
    pub fn unmount(&mut self) {
        if self.composer.take().is_some() {
            #[cfg(feature = "tracing")]
            tracing::trace!("Unmounted root");
        }
    }

    /// Borrow the surface.
    pub fn surface(&self) -> Ref<'_, S> {
        self.surface.borrow()
    }

    /// Mutably borrow the surface.
    pub fn surface_mut(&self) -> RefMut<'_, S> {
        self.surface.borrow_mut()
    }
}

/// Root composable providing the surface context to its content.
#[derive(Data)]
#[like_toggle(path = "crate")]
struct Mount<C> {
    host: Rc<Host>,
    content: C,
}

impl<C: Compose> Compose for Mount<C> {
    fn compose(cx: Scope<Self>) -> impl Compose {
        let host = cx.me().host.clone();
        use_provider(&cx, || {
            let parent = host.surface.borrow().root();
            SurfaceContext::new(host.clone(), parent)
        });

        Signal::map(cx.me(), |me| &me.content)
    }
}
