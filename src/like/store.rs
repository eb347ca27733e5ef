use super::ConfigurationError;
use crate::{data::Data, HashMap};
use alloc::rc::Rc;
use core::{cell::RefCell, fmt};

/// Identifier of a likeable item.
///
/// Item identifiers are opaque: strings and integers are both accepted,
/// and integers are stored as their decimal form.
///
/// ```
/// use like_toggle::prelude::*;
///
/// assert_eq!(ItemId::new(123u32).unwrap(), ItemId::new("123").unwrap());
/// assert_eq!(ItemId::new(None::<&str>), Err(ConfigurationError::MissingItemId));
/// assert_eq!(ItemId::new("  "), Err(ConfigurationError::BlankItemId));
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(Rc<str>);

impl ItemId {
    /// Create a new item identifier.
    pub fn new(id: impl IntoItemId) -> Result<Self, ConfigurationError> {
        id.into_item_id()
    }

    /// Get this identifier as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn from_text(id: &str) -> Result<Self, ConfigurationError> {
        if id.trim().is_empty() {
            return Err(ConfigurationError::BlankItemId);
        }

        Ok(Self(Rc::from(id)))
    }
}

impl fmt::Debug for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemId").field(&self.as_str()).finish()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ItemId {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl Data for ItemId {}

/// Conversion into an [`ItemId`].
pub trait IntoItemId {
    /// Convert this value into an item identifier.
    fn into_item_id(self) -> Result<ItemId, ConfigurationError>;
}

impl IntoItemId for ItemId {
    fn into_item_id(self) -> Result<ItemId, ConfigurationError> {
        Ok(self)
    }
}

impl IntoItemId for &ItemId {
    fn into_item_id(self) -> Result<ItemId, ConfigurationError> {
        Ok(self.clone())
    }
}

impl IntoItemId for &str {
    fn into_item_id(self) -> Result<ItemId, ConfigurationError> {
        ItemId::from_text(self)
    }
}

impl IntoItemId for String {
    fn into_item_id(self) -> Result<ItemId, ConfigurationError> {
        ItemId::from_text(&self)
    }
}

macro_rules! impl_into_item_id_for_int {
    ($($t:ty),*) => {
        $(
            impl IntoItemId for $t {
                fn into_item_id(self) -> Result<ItemId, ConfigurationError> {
                    Ok(ItemId(Rc::from(self.to_string())))
                }
            }
        )*
    };
}

impl_into_item_id_for_int!(u32, u64, usize);

impl<T: IntoItemId> IntoItemId for Option<T> {
    fn into_item_id(self) -> Result<ItemId, ConfigurationError> {
        self.ok_or(ConfigurationError::MissingItemId)?.into_item_id()
    }
}

/// Store of liked states.
///
/// An identifier the store has never seen is not liked.
/// Neither operation may fail.
pub trait LikeStore {
    /// Returns `true` if `id` is liked.
    fn is_liked(&self, id: &ItemId) -> bool;

    /// Flip the liked state of `id`, returning the new state.
    ///
    /// This must not change the state of any other identifier.
    fn toggle_liked(&self, id: &ItemId) -> bool;
}

impl<T: LikeStore + ?Sized> LikeStore for Rc<T> {
    fn is_liked(&self, id: &ItemId) -> bool {
        (**self).is_liked(id)
    }

    fn toggle_liked(&self, id: &ItemId) -> bool {
        (**self).toggle_liked(id)
    }
}

/// In-memory [`LikeStore`].
#[derive(Debug, Default)]
pub struct MemoryLikeStore {
    liked: RefCell<HashMap<ItemId, bool>>,
}

impl MemoryLikeStore {
    /// Create a new, empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new store where every identifier in `ids` is liked.
    pub fn with_liked<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = ItemId>,
    {
        Self {
            liked: RefCell::new(ids.into_iter().map(|id| (id, true)).collect()),
        }
    }

    /// Every liked identifier, sorted.
    pub fn liked_ids(&self) -> Vec<ItemId> {
        let mut ids: Vec<_> = self
            .liked
            .borrow()
            .iter()
            .filter(|(_, is_liked)| **is_liked)
            .map(|(id, _)| id.clone())
            .collect();
        ids.sort();
        ids
    }
}

impl LikeStore for MemoryLikeStore {
    fn is_liked(&self, id: &ItemId) -> bool {
        self.liked.borrow().get(id).copied().unwrap_or(false)
    }

    fn toggle_liked(&self, id: &ItemId) -> bool {
        let mut liked = self.liked.borrow_mut();
        let is_liked = liked.entry(id.clone()).or_insert(false);
        *is_liked = !*is_liked;

        #[cfg(feature = "tracing")]
        tracing::trace!(item_id = %id, is_liked = *is_liked, "Stored like");

        *is_liked
    }
}

#[cfg(test)]
mod tests {
    use super::{ItemId, LikeStore, MemoryLikeStore};
    use crate::like::ConfigurationError;

    fn id(id: &str) -> ItemId {
        ItemId::new(id).unwrap()
    }

    #[test]
    fn it_treats_unseen_ids_as_not_liked() {
        let store = MemoryLikeStore::new();
        assert!(!store.is_liked(&id("123")));
        assert!(store.liked_ids().is_empty());
    }

    #[test]
    fn it_toggles_one_id() {
        let store = MemoryLikeStore::new();

        assert!(store.toggle_liked(&id("123")));
        assert!(store.is_liked(&id("123")));
        assert!(!store.is_liked(&id("456")));

        assert!(!store.toggle_liked(&id("123")));
        assert!(!store.is_liked(&id("123")));
    }

    #[test]
    fn it_seeds_liked_ids() {
        let store = MemoryLikeStore::with_liked([id("2"), id("1")]);
        assert_eq!(store.liked_ids(), [id("1"), id("2")]);
    }

    #[test]
    fn it_converts_ids() {
        assert_eq!(ItemId::new(7usize).unwrap().as_str(), "7");
        assert_eq!(ItemId::new(String::from("a")).unwrap(), id("a"));
        assert_eq!(ItemId::new(Some("a")).unwrap(), id("a"));
        assert_eq!(
            ItemId::new(Some("")),
            Err(ConfigurationError::BlankItemId)
        );
        assert_eq!(
            ItemId::new(None::<u64>),
            Err(ConfigurationError::MissingItemId)
        );
    }
}
