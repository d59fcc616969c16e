//! Record framing for the chunked navigation endpoints.
//!
//! Each record is a JSON object terminated by a carriage return. Chunks may
//! split a record (or a multi-byte character) anywhere, so the decoder keeps
//! raw bytes until a delimiter arrives and only then decodes the segment.
//! Parsing the JSON is left to ingestion.

use std::collections::VecDeque;
use std::fmt;

use log::warn;

use super::error::StreamError;

/// Byte terminating every record on the wire.
pub const RECORD_DELIMITER: u8 = b'\r';

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum DecoderState {
	Open,
	Finished,
	Failed,
	Cancelled,
}

/// Push side of the decoder: feed chunks in, pull complete segments out.
#[derive(Debug)]
pub struct StreamDecoder {
	buffer: Vec<u8>,
	ready: VecDeque<String>,
	state: DecoderState,
	error: Option<StreamError>,
}

impl Default for StreamDecoder {
	fn default() -> Self {
		Self::new()
	}
}

impl StreamDecoder {
	pub fn new() -> Self {
		Self {
			buffer: Vec::new(),
			ready: VecDeque::new(),
			state: DecoderState::Open,
			error: None,
		}
	}

	/// Append a chunk and queue every record it completes.
	///
	/// Returns how many records became available. Chunks arriving after the
	/// stream finished, failed or was cancelled are ignored.
	pub fn push(&mut self, chunk: &[u8]) -> usize {
		if self.state != DecoderState::Open {
			return 0;
		}
		let scanned = self.buffer.len();
		self.buffer.extend_from_slice(chunk);
		// The retained tail never holds a delimiter, so only the new bytes need scanning.
		self.split_from(scanned)
	}

	/// Mark the source as complete.
	///
	/// The flush mirrors the per-chunk split: whatever follows the last
	/// delimiter is not a record and is dropped.
	pub fn finish(&mut self) -> usize {
		if self.state != DecoderState::Open {
			return 0;
		}
		let emitted = self.split_from(0);
		if self.buffer.iter().any(|b| !b.is_ascii_whitespace()) {
			warn!(
				"discarding {} bytes of unterminated trailing record",
				self.buffer.len()
			);
		}
		self.buffer.clear();
		self.state = DecoderState::Finished;
		emitted
	}

	/// Record a transport failure. Segments already completed are still
	/// handed out, followed by the error exactly once.
	pub fn fail(&mut self, error: StreamError) {
		if self.state != DecoderState::Open {
			return;
		}
		self.buffer.clear();
		self.error = Some(error);
		self.state = DecoderState::Failed;
	}

	/// Stop decoding for good. Queued segments are dropped.
	pub fn cancel(&mut self) {
		self.buffer.clear();
		self.ready.clear();
		self.error = None;
		self.state = DecoderState::Cancelled;
	}

	/// Next decoded segment, or the transport error once the queue is drained.
	pub fn next_record(&mut self) -> Option<Result<String, StreamError>> {
		if let Some(record) = self.ready.pop_front() {
			return Some(Ok(record));
		}
		self.error.take().map(Err)
	}

	pub fn is_open(&self) -> bool {
		self.state == DecoderState::Open
	}

	pub fn is_cancelled(&self) -> bool {
		self.state == DecoderState::Cancelled
	}

	/// True once the source ended and every segment has been pulled.
	pub fn is_exhausted(&self) -> bool {
		self.state != DecoderState::Open && self.ready.is_empty() && self.error.is_none()
	}

	fn split_from(&mut self, scan_from: usize) -> usize {
		let mut start = 0;
		let mut emitted = 0;
		for offset in scan_from..self.buffer.len() {
			if self.buffer[offset] == RECORD_DELIMITER {
				let segment = String::from_utf8_lossy(&self.buffer[start..offset]).into_owned();
				self.ready.push_back(segment);
				start = offset + 1;
				emitted += 1;
			}
		}
		self.buffer.drain(..start);
		emitted
	}
}

/// Pull-based record sequence over any chunk source.
///
/// The source is only polled when no decoded record is waiting, so the
/// sequence stays lazy and works without any particular scheduler.
pub struct RecordStream<S> {
	source: S,
	decoder: StreamDecoder,
}

impl<S, C, E> RecordStream<S>
where
	S: Iterator<Item = Result<C, E>>,
	C: AsRef<[u8]>,
	E: fmt::Display,
{
	pub fn new(source: S) -> Self {
		Self {
			source,
			decoder: StreamDecoder::new(),
		}
	}

	/// Stop reading; the source is never polled again.
	pub fn cancel(&mut self) {
		self.decoder.cancel();
	}
}

impl<S, C, E> Iterator for RecordStream<S>
where
	S: Iterator<Item = Result<C, E>>,
	C: AsRef<[u8]>,
	E: fmt::Display,
{
	type Item = Result<String, StreamError>;

	fn next(&mut self) -> Option<Self::Item> {
		loop {
			if let Some(record) = self.decoder.next_record() {
				return Some(record);
			}
			if !self.decoder.is_open() {
				return None;
			}
			match self.source.next() {
				Some(Ok(chunk)) => {
					self.decoder.push(chunk.as_ref());
				}
				Some(Err(err)) => self.decoder.fail(StreamError::transport(err)),
				None => {
					self.decoder.finish();
				}
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn drain(decoder: &mut StreamDecoder) -> Vec<String> {
		let mut out = Vec::new();
		while let Some(Ok(record)) = decoder.next_record() {
			out.push(record);
		}
		out
	}

	#[test]
	fn keeps_partial_record_between_chunks() {
		let mut decoder = StreamDecoder::new();
		assert_eq!(decoder.push(b"{\"id\":1}\r{\"id\":2"), 1);
		assert_eq!(decoder.push(b"}\r{\"id\":3}\r"), 2);
		decoder.finish();
		assert_eq!(
			drain(&mut decoder),
			vec!["{\"id\":1}", "{\"id\":2}", "{\"id\":3}"]
		);
		assert!(decoder.is_exhausted());
	}

	#[test]
	fn flush_drops_content_after_last_delimiter() {
		let mut decoder = StreamDecoder::new();
		decoder.push(b"{\"id\":1}\r{\"id\":");
		assert_eq!(decoder.finish(), 0);
		assert_eq!(drain(&mut decoder), vec!["{\"id\":1}"]);
	}

	#[test]
	fn multibyte_characters_survive_any_split() {
		let text = "{\"name\":\"Zürich ✓\"}\r";
		let bytes = text.as_bytes();
		for cut in 0..=bytes.len() {
			let mut decoder = StreamDecoder::new();
			decoder.push(&bytes[..cut]);
			decoder.push(&bytes[cut..]);
			decoder.finish();
			assert_eq!(drain(&mut decoder), vec!["{\"name\":\"Zürich ✓\"}"]);
		}
	}

	#[test]
	fn failure_surfaces_after_completed_records() {
		let mut decoder = StreamDecoder::new();
		decoder.push(b"a\rb");
		decoder.fail(StreamError::new("reset"));
		assert_eq!(decoder.push(b"\rc\r"), 0);
		assert_eq!(decoder.next_record(), Some(Ok("a".to_string())));
		assert_eq!(decoder.next_record(), Some(Err(StreamError::new("reset"))));
		assert_eq!(decoder.next_record(), None);
	}

	#[test]
	fn cancelled_decoder_ignores_late_chunks() {
		let mut decoder = StreamDecoder::new();
		decoder.push(b"a\r");
		decoder.cancel();
		assert_eq!(decoder.push(b"b\r"), 0);
		assert_eq!(decoder.next_record(), None);
		assert!(decoder.is_cancelled());
	}

	#[test]
	fn record_stream_pulls_lazily() {
		let chunks: Vec<Result<&[u8], String>> = vec![
			Ok(&b"x\ry"[..]),
			Ok(&b"\r"[..]),
			Err("boom".to_string()),
			Ok(&b"z\r"[..]),
		];
		let records: Vec<_> = RecordStream::new(chunks.into_iter()).collect();
		assert_eq!(
			records,
			vec![
				Ok("x".to_string()),
				Ok("y".to_string()),
				Err(StreamError::new("boom")),
			]
		);
	}
}
