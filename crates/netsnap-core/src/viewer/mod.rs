//! Filtered, paginated, selectable view over a loaded entry snapshot.

mod filter;
mod view;

pub use filter::{matches_text, type_label, TypeFilter};
pub use view::ViewState;
