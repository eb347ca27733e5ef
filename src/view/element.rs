use super::{Event, EventKind, Listener, NodeId, Surface, SurfaceContext};
use crate::{
    compose::{Compose, Error},
    data::Data,
    use_context, use_drop, use_provider, use_ref, Scope, Signal,
};
use alloc::{borrow::Cow, rc::Rc};
use core::cell::RefCell;

/// Create an [`Element`] with the given tag.
///
/// # Examples
///
/// ```
/// use like_toggle::prelude::*;
///
/// let mut root = Root::new(Dom::new());
/// root.render(
///     element("ul").content((
///         element("li").text("first"),
///         element("li").text("second").class("last"),
///     )),
/// )
/// .unwrap();
///
/// assert_eq!(
///     root.surface().to_html(),
///     r#"<div id="app"><ul><li>first</li><li class="last">second</li></ul></div>"#
/// );
/// ```
pub fn element(tag: impl Into<Cow<'static, str>>) -> Element<()> {
    Element {
        tag: tag.into(),
        attributes: Vec::new(),
        classes: Vec::new(),
        text: None,
        listeners: Vec::new(),
        content: (),
    }
}

/// Create a `button` [`Element`].
pub fn button() -> Element<()> {
    element("button")
}

/// Create a `div` [`Element`].
pub fn div() -> Element<()> {
    element("div")
}

/// Create a `span` [`Element`].
pub fn span() -> Element<()> {
    element("span")
}

/// Host element composable.
///
/// The host node is created on the first compose, at the position of this composable
/// among the elements of its parent.
/// The tag is only read at that point.
///
/// See [`element`] for more information.
#[derive(Data)]
#[like_toggle(path = "crate")]
#[must_use = "Composables do nothing unless composed or returned from other composables."]
pub struct Element<C> {
    tag: Cow<'static, str>,
    attributes: Vec<(Cow<'static, str>, String)>,
    classes: Vec<Cow<'static, str>>,
    text: Option<String>,
    listeners: Vec<(EventKind, Listener)>,
    content: C,
}

impl<C> Element<C> {
    /// Set an attribute.
    pub fn attr(mut self, name: impl Into<Cow<'static, str>>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();

        if let Some(slot) = self.attributes.iter_mut().find(|(n, _)| *n == name) {
            slot.1 = value;
        } else {
            self.attributes.push((name, value));
        }
        self
    }

    /// Add a class.
    pub fn class(self, class: impl Into<Cow<'static, str>>) -> Self {
        self.class_if(class, true)
    }

    /// Add a class if `condition` is `true`.
    pub fn class_if(mut self, class: impl Into<Cow<'static, str>>, condition: bool) -> Self {
        let class = class.into();
        if condition && !self.classes.contains(&class) {
            self.classes.push(class);
        }
        self
    }

    /// Set the text content.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Add a function to be called when this element is clicked.
    pub fn on_click(self, f: impl Fn() + 'static) -> Self {
        self.on(EventKind::Click, move |_| f())
    }

    /// Add a listener for events of `kind`.
    ///
    /// A later listener for the same kind replaces the earlier one.
    pub fn on(mut self, kind: EventKind, f: impl Fn(&Event) + 'static) -> Self {
        self.listeners.retain(|(k, _)| *k != kind);
        self.listeners.push((kind, Rc::new(f)));
        self
    }

    /// Set the child content.
    pub fn content<C2>(self, content: C2) -> Element<C2> {
        Element {
            tag: self.tag,
            attributes: self.attributes,
            classes: self.classes,
            text: self.text,
            listeners: self.listeners,
            content,
        }
    }
}

impl<C: Compose> Compose for Element<C> {
    fn compose(cx: Scope<Self>) -> impl Compose {
        let surface_cx = match use_context::<SurfaceContext>(&cx) {
            Ok(surface_cx) => surface_cx,
            Err(error) => return Err::<Signal<C>, Error>(error.into()),
        };
        let host = surface_cx.host.clone();

        let node = *use_ref(&cx, || {
            let mut surface = host.surface.borrow_mut();
            let node = surface.create_element(&cx.me().tag);

            let index = surface_cx.insert_slot(cx.path().to_vec(), node);
            surface.insert_child(surface_cx.parent, index, node);

            #[cfg(feature = "tracing")]
            tracing::trace!(tag = %cx.me().tag, index, "Created host node: {:?}", node);

            node
        });

        let rendered = use_ref(&cx, || RefCell::new(Rendered::default()));
        rendered
            .borrow_mut()
            .apply(&mut *host.surface.borrow_mut(), node, &cx.me());

        host.set_listeners(node, &cx.me().listeners);

        use_provider(&cx, || SurfaceContext::new(host.clone(), node));

        let path = cx.path().to_vec();
        use_drop(&cx, move || {
            surface_cx.remove_slot(&path);
            host.set_listeners(node, &[]);
            host.surface.borrow_mut().remove(node);

            #[cfg(feature = "tracing")]
            tracing::trace!("Removed host node: {:?}", node);
        });

        Ok(Signal::map(cx.me(), |me| &me.content))
    }
}

/// Host state last applied by an [`Element`].
#[derive(Default)]
struct Rendered {
    attributes: Vec<(Cow<'static, str>, String)>,
    classes: Vec<Cow<'static, str>>,
    text: Option<String>,
}

impl Rendered {
    /// Apply the difference between this state and `element` to `node`.
    fn apply<C>(&mut self, surface: &mut dyn Surface, node: NodeId, element: &Element<C>) {
        for (name, _) in &self.attributes {
            if !element.attributes.iter().any(|(n, _)| n == name) {
                surface.remove_attribute(node, name);
            }
        }
        for (name, value) in &element.attributes {
            let is_same = self
                .attributes
                .iter()
                .any(|(n, v)| n == name && v == value);
            if !is_same {
                surface.set_attribute(node, name, value);
            }
        }

        for class in &self.classes {
            if !element.classes.contains(class) {
                surface.remove_class(node, class);
            }
        }
        for class in &element.classes {
            if !self.classes.contains(class) {
                surface.add_class(node, class);
            }
        }

        if self.text != element.text {
            surface.set_text(node, element.text.as_deref().unwrap_or_default());
        }

        self.attributes.clone_from(&element.attributes);
        self.classes.clone_from(&element.classes);
        self.text.clone_from(&element.text);
    }
}
