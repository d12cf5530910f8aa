//! Browser-backed [`Navigator`] and [`Timer`] (WASM only).

use std::time::Duration;

use async_trait::async_trait;

use super::{Navigator, Timer};
use crate::error::Error;

fn location() -> Result<web_sys::Location, Error> {
	web_sys::window()
		.map(|window| window.location())
		.ok_or_else(|| Error::Environment("no window".to_string()))
}

/// Navigates through `window.location`.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowNavigator;

impl Navigator for WindowNavigator {
	fn assign(&self, href: &str) -> Result<(), Error> {
		location()?
			.set_href(href)
			.map_err(|err| Error::Navigation(format!("{:?}", err)))
	}

	fn reload(&self) -> Result<(), Error> {
		location()?
			.reload()
			.map_err(|err| Error::Navigation(format!("{:?}", err)))
	}
}

/// `setTimeout`-based timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct BrowserTimer;

#[async_trait(?Send)]
impl Timer for BrowserTimer {
	async fn sleep(&self, duration: Duration) {
		gloo_timers::future::sleep(duration).await;
	}
}
