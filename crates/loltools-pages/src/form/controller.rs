//! Asynchronous form submission
//!
//! [`FormSubmitController`] replaces a form's native submission with a POST of
//! its URL-encoded fields and reflects the request lifecycle in the page.
//!
//! ## Lifecycle
//!
//! ```text
//!            submit                 response settles
//! ┌──────┐ ─────────▶ ┌────────────┐ ─────────────────▶ Redirecting | Reloading
//! │ Idle │            │ Submitting │                    Displaying  | Failed
//! └──────┘ ◀───────── └────────────┘                          │
//!     ▲    newer submit    │  ▲                               │
//!     │    (supersedes)    └──┘                               │
//!     └──────────────── controls restored ◀───────────────────┘
//! ```
//!
//! At most one request is live per form. Starting a submission while another
//! is in flight aborts the older request, restores the controls it disabled,
//! and guarantees its completion never touches the page.

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::{AbortHandle, Abortable, LocalBoxFuture};

use super::options::{FormOptions, ResultMode};
use super::serialize::{encode_fields, serialize_fields};
use crate::dom::{CONTROL_SELECTOR, Dom, EventKind, quote_attr_value};
use crate::error::{DomError, Result, SubmitError};
use crate::platform::{self, HttpResponse, Platform};
use crate::{debug_log, error_log, info_log, spawn};

/// Where a form currently is in its submission lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitState {
	/// No request in flight; controls are interactive.
	Idle,
	/// A request is in flight; controls are disabled.
	Submitting,
	/// `201 Created` with a location: the window is navigating there.
	Redirecting,
	/// `204 No Content`: the page is reloading.
	Reloading,
	/// Another 2xx status: feedback was displayed.
	Displaying,
	/// The request failed and the error was displayed.
	Failed,
}

/// How a submission ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
	/// Navigated to the created resource.
	Redirected(String),
	/// Reloaded the page.
	Reloaded,
	/// Succeeded with the given status without navigating.
	Displayed(u16),
	/// Failed; the error was shown to the user.
	Failed(SubmitError),
	/// A newer submission replaced this one before it settled.
	Superseded,
}

impl SubmitOutcome {
	fn state(&self) -> SubmitState {
		match self {
			Self::Redirected(_) => SubmitState::Redirecting,
			Self::Reloaded => SubmitState::Reloading,
			Self::Displayed(_) => SubmitState::Displaying,
			Self::Failed(_) => SubmitState::Failed,
			Self::Superseded => SubmitState::Idle,
		}
	}
}

/// The network half of a submission, returned by
/// [`FormSubmitController::begin_submit`].
pub type SubmitTask = LocalBoxFuture<'static, SubmitOutcome>;

/// Controls frozen for one submission, with what is needed to restore them.
#[derive(Debug)]
struct FormSnapshot<N> {
	/// Controls this submission disabled (already-disabled ones are left alone).
	disabled: Vec<N>,
	/// Submit buttons whose label was swapped, with the original label.
	labels: Vec<(N, String)>,
}

impl<N> FormSnapshot<N> {
	fn empty() -> Self {
		Self {
			disabled: Vec::new(),
			labels: Vec::new(),
		}
	}
}

struct PendingRequest<N> {
	generation: u64,
	abort: AbortHandle,
	snapshot: FormSnapshot<N>,
}

struct Inner<N> {
	state: SubmitState,
	generation: u64,
	pending: Option<PendingRequest<N>>,
}

/// Submits one form asynchronously.
pub struct FormSubmitController<D: Dom> {
	dom: D,
	platform: Platform,
	form: D::Node,
	form_id: String,
	submit_url: String,
	options: FormOptions,
	inner: RefCell<Inner<D::Node>>,
}

impl<D> FormSubmitController<D>
where
	D: Dom + Clone + 'static,
{
	/// Binds the form with id `form_id` to POST to `submit_url`.
	///
	/// Pre-fills the time-zone field once, then installs the submit listener.
	/// No request is made until the form is submitted.
	///
	/// # Errors
	///
	/// [`DomError::NotFound`] if no `<form>` has the given id.
	pub fn register(
		dom: &D,
		platform: &Platform,
		form_id: &str,
		submit_url: &str,
		options: FormOptions,
	) -> Result<Rc<Self>> {
		let form = dom
			.element_by_id(form_id)
			.filter(|node| dom.tag_name(node) == "form")
			.ok_or_else(|| DomError::NotFound(format!("form#{}", form_id)))?;

		let controller = Rc::new(Self {
			dom: dom.clone(),
			platform: platform.clone(),
			form,
			form_id: form_id.to_string(),
			submit_url: submit_url.to_string(),
			options,
			inner: RefCell::new(Inner {
				state: SubmitState::Idle,
				generation: 0,
				pending: None,
			}),
		});

		controller.prefill_time_zone()?;

		let handler = Rc::clone(&controller);
		dom.listen(
			&controller.form,
			EventKind::Submit,
			Rc::new(move || handler.handle_submit()),
		)?;

		info_log!("form #{} posts to {}", form_id, submit_url);
		Ok(controller)
	}

	/// The bound form element.
	pub fn form(&self) -> &D::Node {
		&self.form
	}

	/// The destination URL.
	pub fn submit_url(&self) -> &str {
		&self.submit_url
	}

	/// The options in effect.
	pub fn options(&self) -> &FormOptions {
		&self.options
	}

	/// Current lifecycle state.
	pub fn state(&self) -> SubmitState {
		self.inner.borrow().state
	}

	/// Whether a request is in flight or waiting to restore controls.
	pub fn is_pending(&self) -> bool {
		self.inner.borrow().pending.is_some()
	}

	fn handle_submit(self: &Rc<Self>) {
		match self.begin_submit() {
			Ok(task) => spawn::spawn_local(async move {
				let _outcome = task.await;
				debug_log!("submission settled: {:?}", _outcome);
			}),
			Err(err) => error_log!("form #{} could not be submitted: {}", self.form_id, err),
		}
	}

	/// Starts a submission.
	///
	/// Synchronously cancels any in-flight submission, serializes the fields,
	/// clears previous feedback and disables the form's controls. The returned
	/// task performs the POST and applies the outcome; it must be polled for
	/// the request to be sent.
	pub fn begin_submit(self: &Rc<Self>) -> Result<SubmitTask> {
		self.cancel();

		let controls = self.collect_controls()?;
		let body = encode_fields(&serialize_fields(&self.dom, &controls))?;

		self.clear_feedback()?;
		let snapshot = self.freeze(&controls)?;

		let (abort, registration) = AbortHandle::new_pair();
		let generation = {
			let mut inner = self.inner.borrow_mut();
			inner.generation += 1;
			inner.state = SubmitState::Submitting;
			inner.pending = Some(PendingRequest {
				generation: inner.generation,
				abort,
				snapshot,
			});
			inner.generation
		};

		let transport = self.platform.transport();
		let url = self.submit_url.clone();
		let request = Abortable::new(
			async move { transport.post_form(&url, body).await },
			registration,
		);

		let controller = Rc::clone(self);
		Ok(async move {
			match request.await {
				Ok(result) => controller.settle(generation, result).await,
				Err(_aborted) => SubmitOutcome::Superseded,
			}
		}
		.boxed_local())
	}

	/// Aborts the in-flight submission and restores its controls.
	///
	/// Returns whether there was anything to cancel.
	pub fn cancel(&self) -> bool {
		let pending = {
			let mut inner = self.inner.borrow_mut();
			let pending = inner.pending.take();
			if pending.is_some() {
				inner.state = SubmitState::Idle;
			}
			pending
		};

		match pending {
			Some(pending) => {
				pending.abort.abort();
				self.restore(pending.snapshot);
				debug_log!("form #{}: request {} superseded", self.form_id, pending.generation);
				true
			}
			None => false,
		}
	}

	fn is_current(&self, generation: u64) -> bool {
		self.inner
			.borrow()
			.pending
			.as_ref()
			.is_some_and(|pending| pending.generation == generation)
	}

	fn set_state(&self, generation: u64, state: SubmitState) {
		let mut inner = self.inner.borrow_mut();
		if inner.pending.as_ref().is_some_and(|p| p.generation == generation) {
			inner.state = state;
		}
	}

	async fn settle(
		&self,
		generation: u64,
		result: std::result::Result<HttpResponse, SubmitError>,
	) -> SubmitOutcome {
		if !self.is_current(generation) {
			return SubmitOutcome::Superseded;
		}

		let mut waited = Duration::ZERO;
		let outcome = match result {
			Ok(response) if response.is_success() => {
				let (outcome, slept) = self.apply_success(generation, response).await;
				waited = slept;
				outcome
			}
			Ok(response) => SubmitOutcome::Failed(SubmitError::from_response(response)),
			Err(err) => SubmitOutcome::Failed(err),
		};
		if outcome == SubmitOutcome::Superseded {
			return outcome;
		}

		if let SubmitOutcome::Failed(err) = &outcome
			&& let Err(dom_err) = self.show_failure(err)
		{
			error_log!("form #{}: could not display failure: {}", self.form_id, dom_err);
		}
		self.set_state(generation, outcome.state());

		let remaining = self.options.reenable_delay().saturating_sub(waited);
		if !remaining.is_zero() {
			self.platform.timer().sleep(remaining).await;
		}
		self.finish(generation);
		outcome
	}

	async fn apply_success(&self, generation: u64, response: HttpResponse) -> (SubmitOutcome, Duration) {
		let navigator = self.platform.navigator();
		match (response.status, response.location) {
			(201, Some(location)) => {
				if let Err(err) = navigator.assign(&location) {
					error_log!("redirect to {} failed: {}", location, err);
				}
				(SubmitOutcome::Redirected(location), Duration::ZERO)
			}
			(204, _) => {
				let delay = self.options.reload_delay();
				if !delay.is_zero() {
					self.platform.timer().sleep(delay).await;
				}
				if !self.is_current(generation) {
					return (SubmitOutcome::Superseded, delay);
				}
				if let Err(err) = navigator.reload() {
					error_log!("reload failed: {}", err);
				}
				(SubmitOutcome::Reloaded, delay)
			}
			(status, _) => {
				if self.options.result_mode == ResultMode::InlineText {
					let text = self
						.options
						.done_text
						.clone()
						.unwrap_or_else(|| response.status_text.clone());
					if let Err(err) = self.set_result_text(&text) {
						error_log!("form #{}: could not display result: {}", self.form_id, err);
					}
				}
				(SubmitOutcome::Displayed(status), Duration::ZERO)
			}
		}
	}

	fn finish(&self, generation: u64) {
		let pending = {
			let mut inner = self.inner.borrow_mut();
			match &inner.pending {
				Some(pending) if pending.generation == generation => {
					inner.state = SubmitState::Idle;
					inner.pending.take()
				}
				_ => None,
			}
		};
		if let Some(pending) = pending {
			self.restore(pending.snapshot);
		}
	}

	/// The form's own controls followed by controls elsewhere in the document
	/// that name it in their `form` attribute.
	fn collect_controls(&self) -> Result<Vec<D::Node>> {
		let mut controls = self.dom.query_all_within(&self.form, CONTROL_SELECTOR)?;

		let form_ref = quote_attr_value(&self.form_id);
		let associated = ["input", "select", "button", "textarea"]
			.iter()
			.map(|tag| format!("{}[form={}]", tag, form_ref))
			.collect::<Vec<_>>()
			.join(", ");
		for node in self.dom.query_all(&associated)? {
			if !controls.contains(&node) {
				controls.push(node);
			}
		}
		Ok(controls)
	}

	fn submit_buttons(&self) -> Result<Vec<D::Node>> {
		let mut buttons = self
			.dom
			.query_all_within(&self.form, &self.options.submit_selector)?;
		let external = format!(
			"input[type='submit'][form={}]",
			quote_attr_value(&self.form_id)
		);
		for node in self.dom.query_all(&external)? {
			if !buttons.contains(&node) {
				buttons.push(node);
			}
		}
		Ok(buttons)
	}

	fn freeze(&self, controls: &[D::Node]) -> Result<FormSnapshot<D::Node>> {
		let mut snapshot = FormSnapshot::empty();
		if let Err(err) = self.freeze_into(controls, &mut snapshot) {
			self.restore(snapshot);
			return Err(err);
		}
		Ok(snapshot)
	}

	fn freeze_into(&self, controls: &[D::Node], snapshot: &mut FormSnapshot<D::Node>) -> Result<()> {
		for control in controls {
			if !self.dom.is_disabled(control) {
				self.dom.set_disabled(control, true)?;
				snapshot.disabled.push(control.clone());
			}
		}

		if let Some(busy) = &self.options.busy_label {
			for button in self.submit_buttons()? {
				let original = self.label_of(&button);
				self.set_label(&button, busy)?;
				snapshot.labels.push((button, original));
			}
		}
		Ok(())
	}

	fn restore(&self, snapshot: FormSnapshot<D::Node>) {
		for (button, label) in &snapshot.labels {
			if let Err(err) = self.set_label(button, label) {
				error_log!("could not restore submit label: {}", err);
			}
		}
		for control in &snapshot.disabled {
			if let Err(err) = self.dom.set_disabled(control, false) {
				error_log!("could not re-enable control: {}", err);
			}
		}
	}

	fn label_of(&self, button: &D::Node) -> String {
		match self.dom.tag_name(button).as_str() {
			"button" => self.dom.text(button),
			_ => self.dom.value(button),
		}
	}

	fn set_label(&self, button: &D::Node, label: &str) -> Result<(), DomError> {
		match self.dom.tag_name(button).as_str() {
			"button" => self.dom.set_text(button, label),
			_ => self.dom.set_value(button, label),
		}
	}

	fn errors_region(&self) -> Result<Option<D::Node>> {
		Ok(self.dom.query_first(&self.options.errors_selector)?)
	}

	fn result_region(&self) -> Result<Option<D::Node>> {
		Ok(self
			.dom
			.query_first_within(&self.form, &self.options.result_selector)?)
	}

	fn set_result_text(&self, text: &str) -> Result<()> {
		if let Some(region) = self.result_region()? {
			self.dom.set_text(&region, text)?;
		}
		Ok(())
	}

	fn clear_feedback(&self) -> Result<()> {
		match self.options.result_mode {
			ResultMode::List => {
				if let Some(region) = self.errors_region()? {
					self.dom.clear_children(&region)?;
				}
			}
			ResultMode::InlineText => {
				let active = self.options.active_text.clone().unwrap_or_default();
				self.set_result_text(&active)?;
			}
		}
		Ok(())
	}

	fn show_failure(&self, err: &SubmitError) -> Result<()> {
		let message = err.display_text(&self.options.fail_prefix);
		error_log!("form #{}: {}", self.form_id, message);

		match self.options.result_mode {
			ResultMode::List => {
				if let Some(region) = self.errors_region()? {
					let entry = self.dom.create_element("div")?;
					self.dom.set_text(&entry, &message)?;
					self.dom.append_child(&region, &entry)?;
				}
			}
			ResultMode::InlineText => self.set_result_text(&message)?,
		}
		Ok(())
	}

	fn prefill_time_zone(&self) -> Result<()> {
		let Some(field) = self
			.dom
			.query_first_within(&self.form, &self.options.time_zone_selector)?
		else {
			return Ok(());
		};
		let zone = self
			.options
			.time_zone
			.clone()
			.or_else(platform::resolved_time_zone);
		if let Some(zone) = zone {
			self.dom.set_attribute(&field, "value", &zone)?;
			self.dom.set_value(&field, &zone)?;
		}
		Ok(())
	}
}

/// Binds `form_id` to submit asynchronously to `submit_url`.
///
/// Equivalent to [`FormSubmitController::register`].
pub fn register_form<D>(
	dom: &D,
	platform: &Platform,
	form_id: &str,
	submit_url: &str,
	options: FormOptions,
) -> Result<Rc<FormSubmitController<D>>>
where
	D: Dom + Clone + 'static,
{
	FormSubmitController::register(dom, platform, form_id, submit_url, options)
}

impl<D: Dom> std::fmt::Debug for FormSubmitController<D> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("FormSubmitController")
			.field("form_id", &self.form_id)
			.field("submit_url", &self.submit_url)
			.field("state", &self.inner.borrow().state)
			.finish()
	}
}
