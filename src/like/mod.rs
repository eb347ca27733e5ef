//! The like button and its store.
//!
//! [`LikeToggle`] renders a `button` for one item.
//! Its label and marker class follow the liked state of that item,
//! and clicking it flips that state through a [`LikeStore`].
//!
//! ```
//! use like_toggle::prelude::*;
//! use std::rc::Rc;
//!
//! let store = Rc::new(MemoryLikeStore::new());
//!
//! let mut root = Root::new(Dom::new());
//! root.render(LikeToggle::new(1u32, store.clone()).unwrap()).unwrap();
//!
//! assert_eq!(
//!     root.surface().to_html(),
//!     r#"<div id="app"><button data-id="1">Me gusta</button></div>"#
//! );
//!
//! let button = root.surface().find_by_tag("button").unwrap();
//! root.click(button).unwrap();
//!
//! assert_eq!(
//!     root.surface().to_html(),
//!     r#"<div id="app"><button data-id="1" class="Liked">Quitar me gusta</button></div>"#
//! );
//! ```

use crate::{compose::Compose, data::Data, use_context, use_mut, view::button, Scope};
use alloc::{borrow::Cow, rc::Rc};
use thiserror::Error;

mod store;
pub use self::store::{IntoItemId, ItemId, LikeStore, MemoryLikeStore};

/// Error for a misconfigured [`LikeToggle`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    /// No item identifier was given.
    #[error("Missing item identifier")]
    MissingItemId,

    /// The item identifier was empty or only whitespace.
    #[error("Blank item identifier")]
    BlankItemId,

    /// No like store was given.
    #[error("Missing like store")]
    MissingStore,
}

/// Labels and marker class of a [`LikeToggle`].
///
/// Provide a value with [`use_provider`](crate::use_provider) to change the labels of every
/// like button below it.
#[derive(Clone, Debug, PartialEq, Eq, Data)]
#[like_toggle(path = "crate")]
pub struct LikeLabels {
    /// Label of an item that is not liked.
    pub like: Cow<'static, str>,

    /// Label of a liked item.
    pub unlike: Cow<'static, str>,

    /// Class marking a liked item.
    pub marker_class: Cow<'static, str>,
}

impl LikeLabels {
    /// Label for the given liked state.
    pub fn label(&self, is_liked: bool) -> &str {
        if is_liked {
            &self.unlike
        } else {
            &self.like
        }
    }
}

impl Default for LikeLabels {
    fn default() -> Self {
        Self {
            like: Cow::Borrowed("Me gusta"),
            unlike: Cow::Borrowed("Quitar me gusta"),
            marker_class: Cow::Borrowed("Liked"),
        }
    }
}

/// Like button for one item.
///
/// The liked state is read from the store on the first compose,
/// and again whenever the button is recomposed for a different item.
/// Each click toggles the item in the store exactly once and renders the returned state.
#[derive(Data)]
#[like_toggle(path = "crate")]
#[must_use = "Composables do nothing unless composed or returned from other composables."]
pub struct LikeToggle {
    id: ItemId,
    store: Rc<dyn LikeStore>,
}

impl LikeToggle {
    /// Create a like button for the item `id`.
    ///
    /// Fails if `id` is missing or blank.
    pub fn new(id: impl IntoItemId, store: Rc<dyn LikeStore>) -> Result<Self, ConfigurationError> {
        Ok(Self {
            id: id.into_item_id()?,
            store,
        })
    }

    /// Create a [`LikeToggleBuilder`].
    pub fn builder() -> LikeToggleBuilder {
        LikeToggleBuilder::default()
    }

    /// Identifier of the item this button toggles.
    pub fn id(&self) -> &ItemId {
        &self.id
    }
}

impl Compose for LikeToggle {
    fn compose(cx: Scope<Self>) -> impl Compose {
        let labels = use_context::<LikeLabels>(&cx)
            .map(|labels| (*labels).clone())
            .unwrap_or_default();

        let id = cx.me().id.clone();
        let store = cx.me().store.clone();

        // Liked state of the item this button last rendered.
        let liked = use_mut(&cx, || (id.clone(), store.is_liked(&id)));
        let is_liked = {
            let (last_id, is_liked) = liked.get();
            if last_id == id {
                is_liked
            } else {
                let is_liked = store.is_liked(&id);
                liked.set((id.clone(), is_liked));
                is_liked
            }
        };

        button()
            .attr("data-id", id.to_string())
            .class_if(labels.marker_class.clone(), is_liked)
            .text(labels.label(is_liked))
            .on_click(move || {
                let is_liked = store.toggle_liked(&id);

                #[cfg(feature = "tracing")]
                tracing::debug!(item_id = %id, is_liked, "Toggled like");

                liked.set((id.clone(), is_liked));
            })
    }
}

/// Builder for a [`LikeToggle`].
pub struct LikeToggleBuilder {
    id: Result<ItemId, ConfigurationError>,
    store: Option<Rc<dyn LikeStore>>,
}

impl Default for LikeToggleBuilder {
    fn default() -> Self {
        Self {
            id: Err(ConfigurationError::MissingItemId),
            store: None,
        }
    }
}

impl LikeToggleBuilder {
    /// Set the item identifier.
    pub fn item_id(mut self, id: impl IntoItemId) -> Self {
        self.id = id.into_item_id();
        self
    }

    /// Set the like store.
    pub fn store(mut self, store: Rc<dyn LikeStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Build the [`LikeToggle`].
    ///
    /// Fails if the item identifier is missing or blank, or if no store was set.
    pub fn build(self) -> Result<LikeToggle, ConfigurationError> {
        let id = self.id?;
        let store = self.store.ok_or(ConfigurationError::MissingStore)?;

        Ok(LikeToggle { id, store })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigurationError, LikeLabels, LikeToggle, MemoryLikeStore};
    use std::rc::Rc;

    #[test]
    fn it_builds_with_id_and_store() {
        let toggle = LikeToggle::builder()
            .item_id("123")
            .store(Rc::new(MemoryLikeStore::new()))
            .build()
            .unwrap();

        assert_eq!(toggle.id().as_str(), "123");
    }

    #[test]
    fn it_rejects_incomplete_builders() {
        assert_eq!(
            LikeToggle::builder()
                .store(Rc::new(MemoryLikeStore::new()))
                .build()
                .err(),
            Some(ConfigurationError::MissingItemId)
        );
        assert_eq!(
            LikeToggle::builder().item_id("123").build().err(),
            Some(ConfigurationError::MissingStore)
        );
        assert_eq!(
            LikeToggle::builder().item_id("").build().err(),
            Some(ConfigurationError::BlankItemId)
        );
    }

    #[test]
    fn it_labels_by_state() {
        let labels = LikeLabels::default();
        assert_eq!(labels.label(false), "Me gusta");
        assert_eq!(labels.label(true), "Quitar me gusta");
    }
}
