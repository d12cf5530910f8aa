//! Test doubles for the platform services
//!
//! [`MockPlatform`] wires a scripted [`MockTransport`], a
//! [`RecordingNavigator`] and a [`RecordingTimer`] onto one virtual
//! [`Timeline`], so tests can assert both what happened and when:
//!
//! ```
//! use std::time::Duration;
//! use loltools_pages::platform::HttpResponse;
//! use loltools_pages::testing::{MockPlatform, TimelineEntry};
//!
//! let mock = MockPlatform::new();
//! mock.transport.enqueue(HttpResponse::new(204));
//! let platform = mock.platform();
//! # let _ = platform;
//! assert!(mock.timeline.entries().is_empty());
//! assert_eq!(mock.timeline.now(), Duration::ZERO);
//! ```
//!
//! Virtual sleeps complete after yielding to the executor once, without
//! waiting in real time.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::error::{Error, SubmitError};
use crate::platform::{HttpResponse, Navigator, Platform, Timer, Transport};

/// Something observable that happened at a point in virtual time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimelineEntry {
	/// A timer started sleeping.
	Sleep {
		/// Virtual time the sleep started.
		at: Duration,
		/// Requested length.
		duration: Duration,
	},
	/// The window navigated.
	Assign {
		/// Virtual time of the navigation.
		at: Duration,
		/// Target URL.
		href: String,
	},
	/// The page reloaded.
	Reload {
		/// Virtual time of the reload.
		at: Duration,
	},
}

#[derive(Debug, Default)]
struct TimelineState {
	now: Duration,
	entries: Vec<TimelineEntry>,
}

/// Shared virtual clock and event log.
#[derive(Debug, Clone, Default)]
pub struct Timeline {
	state: Rc<RefCell<TimelineState>>,
}

impl Timeline {
	/// Creates an empty timeline at time zero.
	pub fn new() -> Self {
		Self::default()
	}

	/// Current virtual time.
	pub fn now(&self) -> Duration {
		self.state.borrow().now
	}

	/// Everything recorded so far, in order.
	pub fn entries(&self) -> Vec<TimelineEntry> {
		self.state.borrow().entries.clone()
	}

	fn record(&self, entry: TimelineEntry) {
		self.state.borrow_mut().entries.push(entry);
	}

	fn advance(&self, duration: Duration) {
		self.state.borrow_mut().now += duration;
	}
}

type ResponseResult = Result<HttpResponse, SubmitError>;

enum Scripted {
	Ready(ResponseResult),
	Gated(oneshot::Receiver<ResponseResult>),
}

/// A request seen by [`MockTransport`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
	/// Destination URL.
	pub url: String,
	/// URL-encoded body.
	pub body: String,
}

/// Completes a request queued with [`MockTransport::enqueue_gated`].
#[derive(Debug)]
pub struct ResponseGate {
	sender: oneshot::Sender<ResponseResult>,
}

impl ResponseGate {
	/// Lets the request complete with `response`.
	pub fn respond(self, response: HttpResponse) {
		let _ = self.sender.send(Ok(response));
	}

	/// Lets the request fail with `err`.
	pub fn fail(self, err: SubmitError) {
		let _ = self.sender.send(Err(err));
	}
}

/// Transport answering requests from a queue.
///
/// Requests beyond the end of the queue fail with a transport error.
#[derive(Default)]
pub struct MockTransport {
	script: RefCell<VecDeque<Scripted>>,
	requests: RefCell<Vec<RecordedRequest>>,
}

impl MockTransport {
	/// Creates a transport with an empty queue.
	pub fn new() -> Self {
		Self::default()
	}

	/// Queues an immediate response.
	pub fn enqueue(&self, response: HttpResponse) {
		self.script
			.borrow_mut()
			.push_back(Scripted::Ready(Ok(response)));
	}

	/// Queues an immediate transport failure.
	pub fn enqueue_error(&self, err: SubmitError) {
		self.script.borrow_mut().push_back(Scripted::Ready(Err(err)));
	}

	/// Queues a response that stays in flight until the gate is opened.
	pub fn enqueue_gated(&self) -> ResponseGate {
		let (sender, receiver) = oneshot::channel();
		self.script.borrow_mut().push_back(Scripted::Gated(receiver));
		ResponseGate { sender }
	}

	/// Requests received so far.
	pub fn requests(&self) -> Vec<RecordedRequest> {
		self.requests.borrow().clone()
	}
}

#[async_trait(?Send)]
impl Transport for MockTransport {
	async fn post_form(&self, url: &str, body: String) -> Result<HttpResponse, SubmitError> {
		self.requests.borrow_mut().push(RecordedRequest {
			url: url.to_string(),
			body,
		});
		let next = self.script.borrow_mut().pop_front();
		match next {
			Some(Scripted::Ready(result)) => result,
			Some(Scripted::Gated(receiver)) => receiver
				.await
				.unwrap_or_else(|_| Err(SubmitError::transport("request dropped"))),
			None => Err(SubmitError::transport("no response queued")),
		}
	}
}

/// Navigator that records instead of navigating.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
	timeline: Timeline,
}

impl RecordingNavigator {
	/// Records onto `timeline`.
	pub fn new(timeline: Timeline) -> Self {
		Self { timeline }
	}

	/// URLs navigated to, in order.
	pub fn assigned(&self) -> Vec<String> {
		self.timeline
			.entries()
			.into_iter()
			.filter_map(|entry| match entry {
				TimelineEntry::Assign { href, .. } => Some(href),
				_ => None,
			})
			.collect()
	}

	/// Number of reloads.
	pub fn reload_count(&self) -> usize {
		self.timeline
			.entries()
			.iter()
			.filter(|entry| matches!(entry, TimelineEntry::Reload { .. }))
			.count()
	}
}

impl Navigator for RecordingNavigator {
	fn assign(&self, href: &str) -> Result<(), Error> {
		self.timeline.record(TimelineEntry::Assign {
			at: self.timeline.now(),
			href: href.to_string(),
		});
		Ok(())
	}

	fn reload(&self) -> Result<(), Error> {
		self.timeline.record(TimelineEntry::Reload {
			at: self.timeline.now(),
		});
		Ok(())
	}
}

/// Timer advancing a virtual clock.
#[derive(Debug, Default)]
pub struct RecordingTimer {
	timeline: Timeline,
}

impl RecordingTimer {
	/// Records onto `timeline`.
	pub fn new(timeline: Timeline) -> Self {
		Self { timeline }
	}

	/// Requested sleep lengths, in order.
	pub fn sleeps(&self) -> Vec<Duration> {
		self.timeline
			.entries()
			.into_iter()
			.filter_map(|entry| match entry {
				TimelineEntry::Sleep { duration, .. } => Some(duration),
				_ => None,
			})
			.collect()
	}
}

#[async_trait(?Send)]
impl Timer for RecordingTimer {
	async fn sleep(&self, duration: Duration) {
		self.timeline.record(TimelineEntry::Sleep {
			at: self.timeline.now(),
			duration,
		});
		YieldOnce(false).await;
		self.timeline.advance(duration);
	}
}

/// Returns `Pending` once so sleeping code observably suspends.
struct YieldOnce(bool);

impl Future for YieldOnce {
	type Output = ();

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
		if self.0 {
			Poll::Ready(())
		} else {
			self.0 = true;
			cx.waker().wake_by_ref();
			Poll::Pending
		}
	}
}

/// Mock services sharing one [`Timeline`].
pub struct MockPlatform {
	/// Scripted transport.
	pub transport: Rc<MockTransport>,
	/// Recording navigator.
	pub navigator: Rc<RecordingNavigator>,
	/// Virtual timer.
	pub timer: Rc<RecordingTimer>,
	/// Shared clock and log.
	pub timeline: Timeline,
}

impl Default for MockPlatform {
	fn default() -> Self {
		Self::new()
	}
}

impl MockPlatform {
	/// Creates fresh mocks.
	pub fn new() -> Self {
		let timeline = Timeline::new();
		Self {
			transport: Rc::new(MockTransport::new()),
			navigator: Rc::new(RecordingNavigator::new(timeline.clone())),
			timer: Rc::new(RecordingTimer::new(timeline.clone())),
			timeline,
		}
	}

	/// A [`Platform`] backed by these mocks.
	pub fn platform(&self) -> Platform {
		Platform::new(
			self.transport.clone(),
			self.navigator.clone(),
			self.timer.clone(),
		)
	}
}
