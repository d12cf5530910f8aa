//! Small page widgets
//!
//! - [`ExpandoToggle`]: buttons that expand and collapse a content region
//! - [`PairingRowEditor`]: a table of home/away team pickers with add and
//!   delete buttons

pub mod expando;
pub mod pairings;

pub use expando::{DEFAULT_DURATION, ExpandoToggle, register_expando};
pub use pairings::{PairingRowEditor, PairingTable, pairings_add_row, pairings_del_row};
