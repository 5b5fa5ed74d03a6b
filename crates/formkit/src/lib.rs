//! `formkit` bundles two form-style widgets for `ratatui`:
//!
//! - [`text_field::TextField`]: single-line validated input with label,
//!   helper/error text, clear and password-reveal affordances, and a loading
//!   state.
//! - [`table::DataTable`]: generic data table with per-column sorting and
//!   multi-row selection.
//!
//! Widgets are stateful: you feed them [`input::InputEvent`]s from your event
//! loop, inspect the returned action, and call `render` into a buffer. See
//! `examples/app.rs` for a complete screen wiring both widgets together.

pub mod style;
pub mod table;
pub mod text_field;

pub use formkit_core::input;
pub use formkit_core::keymap;
pub use formkit_core::render;
pub use formkit_core::theme;

#[cfg(feature = "crossterm")]
pub use formkit_core::crossterm_input;
