//! Spawning of page tasks.
//!
//! Event handlers are synchronous; the work they start (network round trips,
//! animation delays) runs as a local task on the current thread. In the
//! browser that is the JS microtask queue; natively it is the enclosing
//! `tokio::task::LocalSet`, which must exist when a handler fires.

use std::future::Future;

/// Spawns a `!Send` future on the current thread.
#[cfg(target_arch = "wasm32")]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	wasm_bindgen_futures::spawn_local(future);
}

/// Spawns a `!Send` future on the current `LocalSet`.
#[cfg(not(target_arch = "wasm32"))]
pub fn spawn_local<F>(future: F)
where
	F: Future<Output = ()> + 'static,
{
	tokio::task::spawn_local(future);
}
