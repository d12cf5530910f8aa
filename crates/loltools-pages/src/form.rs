//! Asynchronous form submission
//!
//! Binding a form replaces its native submission with a background POST:
//!
//! ```ignore
//! use loltools_pages::dom::WebDom;
//! use loltools_pages::form::{FormOptions, register_form};
//! use loltools_pages::platform::Platform;
//!
//! let dom = WebDom::from_window()?;
//! let platform = Platform::browser()?;
//! register_form(&dom, &platform, "new-team", "/api/teams", FormOptions::eventual_consistency())?;
//! ```
//!
//! The server's answer decides what happens next: `201 Created` with a
//! `Location` navigates there, `204 No Content` reloads the page, and any
//! non-2xx status is shown to the user.

mod controller;
pub mod options;
pub mod serialize;

pub use controller::{FormSubmitController, SubmitOutcome, SubmitState, SubmitTask, register_form};
pub use options::{FormOptions, ResultMode};
