//! Streaming `fetch` bodies chunk by chunk.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use js_sys::{Reflect, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{ReadableStreamDefaultReader, Response};

use crate::graph::StreamError;

fn js_error<T: Into<JsValue>>(err: T) -> StreamError {
	StreamError::transport(format!("{:?}", err.into()))
}

/// Fetch `url` and hand every body chunk to `on_chunk` as it arrives.
///
/// Returns `Ok(true)` once the body ended and `Ok(false)` if `cancelled` was
/// raised first, in which case the reader is cancelled and no further chunk
/// is delivered.
pub async fn stream_body(
	url: &str,
	cancelled: &Arc<AtomicBool>,
	mut on_chunk: impl FnMut(&[u8]),
) -> Result<bool, StreamError> {
	let window = web_sys::window().ok_or_else(|| StreamError::new("no window"))?;
	let response: Response = JsFuture::from(window.fetch_with_str(url))
		.await
		.map_err(js_error)?
		.dyn_into()
		.map_err(js_error)?;
	if !response.ok() {
		return Err(StreamError::new(format!(
			"{url} answered {}",
			response.status()
		)));
	}
	let body = response
		.body()
		.ok_or_else(|| StreamError::new(format!("{url} returned no body")))?;
	let reader: ReadableStreamDefaultReader = body.get_reader().dyn_into().map_err(js_error)?;

	let done_key = JsValue::from_str("done");
	let value_key = JsValue::from_str("value");
	loop {
		if cancelled.load(Ordering::Relaxed) {
			let _ = reader.cancel();
			return Ok(false);
		}
		let step = JsFuture::from(reader.read()).await.map_err(js_error)?;
		if cancelled.load(Ordering::Relaxed) {
			let _ = reader.cancel();
			return Ok(false);
		}
		let done = Reflect::get(&step, &done_key)
			.map_err(js_error)?
			.as_bool()
			.unwrap_or(true);
		if done {
			return Ok(true);
		}
		let value = Reflect::get(&step, &value_key).map_err(js_error)?;
		on_chunk(&Uint8Array::new(&value).to_vec());
	}
}
