//! loltools Pages - browser behaviors for the loltools league manager
//!
//! WASM glue that the server-rendered loltools pages load to make their forms
//! and widgets interactive.
//!
//! ## Features
//!
//! - **Async forms**: POST a form's fields in the background, disable its
//!   controls while in flight, then navigate, reload or show the server's error
//! - **Single in-flight request**: a new submission aborts the previous one,
//!   whose completion never reaches the page
//! - **Widgets**: expand/collapse toggles and the match pairings table editor
//! - **Testable natively**: every behavior runs against an in-memory document
//!   with mock network, navigation and timers
//!
//! ## Architecture
//!
//! - [`dom`]: DOM abstraction ([`dom::WebDom`] in the browser, [`dom::MemoryDom`] in tests)
//! - [`platform`]: HTTP transport, navigation and timers
//! - [`form`](mod@form): form serialization and the submit controller
//! - [`widgets`]: expando toggle and pairing row editor
//! - [`autobind`]: binding from `data-*` attributes
//! - `bindings`: the JavaScript API (WASM only)
//! - [`testing`]: mock platform services
//!
//! ## Example
//!
//! ```ignore
//! use loltools_pages::dom::WebDom;
//! use loltools_pages::form::{FormOptions, register_form};
//! use loltools_pages::platform::Platform;
//! use loltools_pages::widgets::{pairings_add_row, pairings_del_row};
//!
//! let dom = WebDom::from_window()?;
//! let platform = Platform::browser()?;
//!
//! register_form(&dom, &platform, "new-match", "/api/leagues/7/matches", FormOptions::status_line())?;
//! pairings_add_row(&dom, "#add-pairing")?;
//! pairings_del_row(&dom, "#del-pairing")?;
//! ```

#![warn(missing_docs)]

// Core modules
pub mod dom;
pub mod error;
pub mod logging;
pub mod spawn;

// Platform services (browser and mock)
pub mod platform;

// Page behaviors
pub mod autobind;
pub mod form;
pub mod widgets;

// JavaScript entry points
#[cfg(target_arch = "wasm32")]
pub mod bindings;

// Test doubles (available on both WASM and native)
pub mod testing;

// Re-export commonly used types
pub use autobind::{BindSummary, bind_document};
pub use dom::{Dom, EventKind, MemoryDom};
#[cfg(target_arch = "wasm32")]
pub use dom::WebDom;
pub use error::{DomError, Error, Result, SubmitError};
pub use form::{
	FormOptions, FormSubmitController, ResultMode, SubmitOutcome, SubmitState, SubmitTask,
	register_form,
};
pub use platform::{HttpResponse, HttpTransport, Navigator, Platform, Timer, Transport};
pub use widgets::{
	ExpandoToggle, PairingRowEditor, PairingTable, pairings_add_row, pairings_del_row,
	register_expando,
};

// Logging macros are exported via #[macro_export]:
// loltools_pages::debug_log!, loltools_pages::info_log!, etc.

#[doc(hidden)]
pub mod __private {
	#[cfg(not(target_arch = "wasm32"))]
	pub use tracing;
	#[cfg(target_arch = "wasm32")]
	pub use web_sys;
}
