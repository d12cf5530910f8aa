//! Expand/collapse toggle.
//!
//! Each click flips every content region: hidden regions are shown as the
//! animation starts, visible ones are hidden once it ends. When the animation
//! completes the buttons read `close_text` if any region is visible and
//! `open_text` otherwise.
//!
//! Regions carry `data-expando-state="open"` or `"closed"` for the duration of
//! the animation and after it, so a stylesheet can attach a transition.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use crate::dom::{Dom, EventKind};
use crate::error::{DomError, Result};
use crate::platform::Platform;
use crate::{debug_log, error_log, spawn};

/// Animation length used by [`ExpandoToggle::register`].
pub const DEFAULT_DURATION: Duration = Duration::from_millis(400);

/// Attribute reflecting the direction of the last toggle on each region.
pub const STATE_ATTRIBUTE: &str = "data-expando-state";

/// Buttons toggling the visibility of one or more content regions.
pub struct ExpandoToggle<D: Dom> {
	dom: D,
	platform: Platform,
	buttons: Vec<D::Node>,
	content_selector: String,
	open_text: String,
	close_text: String,
	duration: Duration,
	animating: Cell<bool>,
}

/// Clears the animating flag even if the toggle future is dropped midway.
struct AnimationGuard<'a>(&'a Cell<bool>);

impl Drop for AnimationGuard<'_> {
	fn drop(&mut self) {
		self.0.set(false);
	}
}

impl<D> ExpandoToggle<D>
where
	D: Dom + Clone + 'static,
{
	/// Binds every element matching `button_selector` to toggle the regions
	/// matching `content_selector` with the default animation length.
	pub fn register(
		dom: &D,
		platform: &Platform,
		button_selector: &str,
		content_selector: &str,
		open_text: &str,
		close_text: &str,
	) -> Result<Rc<Self>> {
		Self::register_with_duration(
			dom,
			platform,
			button_selector,
			content_selector,
			open_text,
			close_text,
			DEFAULT_DURATION,
		)
	}

	/// Like [`register`](Self::register) with an explicit animation length.
	///
	/// # Errors
	///
	/// [`DomError::NotFound`] if no button matches.
	pub fn register_with_duration(
		dom: &D,
		platform: &Platform,
		button_selector: &str,
		content_selector: &str,
		open_text: &str,
		close_text: &str,
		duration: Duration,
	) -> Result<Rc<Self>> {
		let buttons = dom.query_all(button_selector)?;
		if buttons.is_empty() {
			return Err(DomError::NotFound(button_selector.to_string()).into());
		}
		Self::attach(dom, platform, buttons, content_selector, open_text, close_text, duration)
	}

	/// Binds the given buttons.
	pub fn attach(
		dom: &D,
		platform: &Platform,
		buttons: Vec<D::Node>,
		content_selector: &str,
		open_text: &str,
		close_text: &str,
		duration: Duration,
	) -> Result<Rc<Self>> {
		// Validate the selector now rather than on first click.
		dom.query_all(content_selector)?;

		let toggle = Rc::new(Self {
			dom: dom.clone(),
			platform: platform.clone(),
			buttons,
			content_selector: content_selector.to_string(),
			open_text: open_text.to_string(),
			close_text: close_text.to_string(),
			duration,
			animating: Cell::new(false),
		});

		for button in &toggle.buttons {
			let handler = Rc::clone(&toggle);
			dom.listen(
				button,
				EventKind::Click,
				Rc::new(move || {
					let toggle = Rc::clone(&handler);
					spawn::spawn_local(async move {
						if let Err(err) = toggle.toggle().await {
							error_log!("expando toggle failed: {}", err);
						}
					});
				}),
			)?;
		}

		debug_log!(
			"expando: {} buttons toggle {}",
			toggle.buttons.len(),
			toggle.content_selector
		);
		Ok(toggle)
	}

	/// The bound buttons.
	pub fn buttons(&self) -> &[D::Node] {
		&self.buttons
	}

	/// Whether an animation is running.
	pub fn is_animating(&self) -> bool {
		self.animating.get()
	}

	/// Flips the content regions and relabels the buttons.
	///
	/// Returns `false` without touching the page if an animation is already
	/// running.
	pub async fn toggle(&self) -> Result<bool> {
		if self.animating.replace(true) {
			debug_log!("expando: ignoring click during animation");
			return Ok(false);
		}
		let _guard = AnimationGuard(&self.animating);

		let regions = self.dom.query_all(&self.content_selector)?;
		let mut closing = Vec::new();
		for region in &regions {
			if self.dom.is_visible(region) {
				self.dom.set_attribute(region, STATE_ATTRIBUTE, "closed")?;
				closing.push(region.clone());
			} else {
				self.dom.set_visible(region, true)?;
				self.dom.set_attribute(region, STATE_ATTRIBUTE, "open")?;
			}
		}

		if !self.duration.is_zero() {
			self.platform.timer().sleep(self.duration).await;
		}

		for region in &closing {
			self.dom.set_visible(region, false)?;
		}

		let label = if regions.iter().any(|region| self.dom.is_visible(region)) {
			&self.close_text
		} else {
			&self.open_text
		};
		for button in &self.buttons {
			self.dom.set_text(button, label)?;
		}
		Ok(true)
	}
}

/// Binds `button_selector` to toggle `content_selector`.
pub fn register_expando<D>(
	dom: &D,
	platform: &Platform,
	button_selector: &str,
	content_selector: &str,
	open_text: &str,
	close_text: &str,
) -> Result<Rc<ExpandoToggle<D>>>
where
	D: Dom + Clone + 'static,
{
	ExpandoToggle::register(dom, platform, button_selector, content_selector, open_text, close_text)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::dom::MemoryDom;
	use crate::testing::MockPlatform;
	use rstest::rstest;

	const PAGE: &str = r#"
		<button id="more">Show details</button>
		<div class="details" style="display: none">Patch 14.3 notes</div>
	"#;

	fn setup() -> (MemoryDom, MockPlatform, Rc<ExpandoToggle<MemoryDom>>) {
		let dom = MemoryDom::parse(PAGE).unwrap();
		let mock = MockPlatform::new();
		let toggle = register_expando(
			&dom,
			&mock.platform(),
			"#more",
			".details",
			"Show details",
			"Hide details",
		)
		.unwrap();
		(dom, mock, toggle)
	}

	#[rstest]
	fn test_register_requires_a_button() {
		let dom = MemoryDom::parse(PAGE).unwrap();
		let mock = MockPlatform::new();

		let result = register_expando(&dom, &mock.platform(), "#missing", ".details", "a", "b");

		assert!(result.is_err());
	}

	#[rstest]
	fn test_register_listens_on_each_button() {
		let (dom, _mock, toggle) = setup();

		assert_eq!(toggle.buttons().len(), 1);
		assert_eq!(dom.listener_count(&toggle.buttons()[0], EventKind::Click), 1);
	}

	#[cfg(not(target_arch = "wasm32"))]
	#[rstest]
	#[tokio::test]
	async fn test_open_shows_region_and_relabels() {
		let (dom, mock, toggle) = setup();
		let region = dom.query_first(".details").unwrap().unwrap();

		assert!(toggle.toggle().await.unwrap());

		assert!(dom.is_visible(&region));
		assert_eq!(dom.attribute(&region, STATE_ATTRIBUTE).as_deref(), Some("open"));
		assert_eq!(dom.text(&toggle.buttons()[0]), "Hide details");
		assert_eq!(mock.timer.sleeps(), vec![DEFAULT_DURATION]);
	}

	#[cfg(not(target_arch = "wasm32"))]
	#[rstest]
	#[tokio::test]
	async fn test_click_during_animation_is_ignored() {
		let (dom, _mock, toggle) = setup();
		let region = dom.query_first(".details").unwrap().unwrap();

		let mut first = Box::pin(toggle.toggle());
		assert!(futures::poll!(first.as_mut()).is_pending());
		assert!(toggle.is_animating());

		assert!(!toggle.toggle().await.unwrap());

		assert!(first.await.unwrap());
		assert!(dom.is_visible(&region));
		assert!(!toggle.is_animating());
	}
}
