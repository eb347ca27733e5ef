//! Data trait and macros.
//!
//! # Data
//!
//! [`Data`] marks a value that can live in the composition tree.
//! Composables are owned by the runtime for as long as they are mounted,
//! so everything they hold must be `'static`.
//!
//! The `#[derive(Data)]` macro can be used to derive the [`Data`] trait for a struct or enum.
//! Type parameters of the deriving type are required to be [`Data`] too.
//!
//! ```
//! use like_toggle::prelude::*;
//! use std::rc::Rc;
//!
//! #[derive(Data)]
//! struct Greeting {
//!     name: String,
//!     on_click: Rc<dyn Fn()>,
//! }
//!
//! impl Compose for Greeting {
//!     fn compose(cx: Scope<Self>) -> impl Compose {
//!         let on_click = cx.me().on_click.clone();
//!
//!         button()
//!             .text(format!("Hello, {}!", cx.me().name))
//!             .on_click(move || on_click())
//!     }
//! }
//! ```

use crate::{compose::DynCompose, HashMap, Signal};
use alloc::{borrow::Cow, rc::Rc};
use core::ops::Range;

pub use like_toggle_macros::Data;

/// Composable data.
///
/// In most cases, this trait should be derived with `#[derive(Data)]`.
/// For more information, see the [module-level documentation](crate::data).
pub trait Data: 'static {}

macro_rules! impl_data_for_std {
    ($($t:ty),*) => {
        $(
            impl Data for $t {}
        )*
    }
}

impl_data_for_std!(
    (),
    bool,
    char,
    f32,
    f64,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    String,
    &'static str,
    Cow<'static, str>
);

impl<T: Data> Data for Vec<T> {}

impl<T: Data, U: Data, S: 'static> Data for HashMap<T, U, S> {}

impl<T: Data> Data for Option<T> {}

impl<T: Data, U: Data> Data for Result<T, U> {}

impl<T: ?Sized + 'static> Data for Rc<T> {}

impl<T: 'static> Data for Range<T> {}

impl<T: 'static> Data for Signal<T> {}

impl Data for DynCompose {}
