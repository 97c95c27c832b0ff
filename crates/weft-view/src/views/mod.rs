#![forbid(unsafe_code)]

//! Reference views.
//!
//! | View | Shape | Control |
//! |------|-------|---------|
//! | [`Text`] | primitive | draws a line of text |
//! | [`Selectable`] | primitive | focusable text |
//! | [`Overlay`] | primitive container | aligns and stacks its content |
//! | [`Background`] | modifier | fills behind each content control |
//! | [`Group`] | composite | none |
//! | [`ForEach`] | composite | none |

mod background;
mod for_each;
mod group;
mod overlay;
mod selectable;
mod text;

pub use background::Background;
pub use for_each::ForEach;
pub use group::Group;
pub use overlay::Overlay;
pub use selectable::Selectable;
pub use text::Text;
