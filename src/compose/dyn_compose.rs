use super::{AnyCompose, Composable};
use crate::{composer::Runtime, prelude::*};
use alloc::rc::Rc;

/// Create a new dynamically-typed composable.
pub fn dyn_compose(content: impl Compose) -> DynCompose {
    DynCompose {
        compose: Rc::new(Composable::new(content)),
    }
}

/// Dynamically-typed composable.
///
/// Switching between contents of different types drops the previous content's state.
#[must_use = "Composables do nothing unless composed or returned from other composables."]
pub struct DynCompose {
    compose: Rc<dyn AnyCompose>,
}

impl Compose for DynCompose {
    fn compose(cx: Scope<Self>) -> impl Compose {
        let compose = cx.me().compose.clone();
        Runtime::current().claim(&cx, Some(compose));
    }
}
