/*
 * Copyright 2026 The Ferrite Authors
 *
 * This file is part of Ferrite.
 *
 * Ferrite is free software: you can redistribute it and/or modify it under the
 * terms of the GNU General Public License as published by the Free Software
 * Foundation, either version 3 of the License, or (at your option) any later
 * version.
 *
 * Ferrite is distributed in the hope that it will be useful, but WITHOUT ANY
 * WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS FOR
 * A PARTICULAR PURPOSE. See the GNU General Public License for more details.
 *
 * You should have received a copy of the GNU General Public License along with
 * Ferrite. If not, see <https://www.gnu.org/licenses/>.
 */

//! Kernel logging.
//!
//! If the logger is set as silent, logs are still kept in the ring buffer but are not handed to
//! the screen collaborator. The framebuffer text driver itself is an external collaborator (out
//! of scope, per the boot/device bring-up Non-goals): [`Logger`] calls into it only through the
//! [`Sink`] hook, which defaults to doing nothing.

use crate::sync::mutex::IntMutex;
use core::{
	cmp::{Ordering, min},
	fmt,
	fmt::Write,
};

/// The size of the kernel logs ring buffer in bytes.
const LOGS_SIZE: usize = 65536;

/// A function the logger forwards non-silenced writes to, e.g. a framebuffer text driver.
pub type Sink = fn(&[u8]);

/// The kernel's logger.
pub static LOGGER: IntMutex<Logger> = IntMutex::new(Logger::new());

/// Kernel logger, used to record and forward kernel logs.
///
/// Internally, the logger stores logs into a ring buffer so the tail of the log survives a
/// panic even if the screen collaborator was never installed.
pub struct Logger {
	/// Tells whether the logger is silent (logs are still recorded, but not forwarded).
	pub silent: bool,
	/// The collaborator writes are forwarded to, if any.
	sink: Option<Sink>,

	buf: [u8; LOGS_SIZE],
	read_head: usize,
	write_head: usize,
}

impl Logger {
	/// Creates a new instance.
	#[allow(clippy::new_without_default)]
	pub const fn new() -> Self {
		Self {
			silent: false,
			sink: None,
			buf: [0; LOGS_SIZE],
			read_head: 0,
			write_head: 0,
		}
	}

	/// Installs the sink writes are forwarded to when not silenced.
	pub fn set_sink(&mut self, sink: Sink) {
		self.sink = Some(sink);
	}

	/// Returns the number of available bytes in the buffer.
	fn available_space(&self) -> usize {
		match self.write_head.cmp(&self.read_head) {
			Ordering::Equal => self.buf.len(),
			Ordering::Greater => self.buf.len() - (self.write_head - self.read_head),
			Ordering::Less => self.read_head - self.write_head - 1,
		}
	}

	/// Returns a reference to the logger's backing buffer.
	pub fn get_content(&self) -> &[u8] {
		&self.buf
	}

	/// Pushes the given bytes onto the kernel logs buffer.
	pub fn push(&mut self, s: &[u8]) {
		if self.available_space() < s.len() {
			self.pop(s.len() - self.available_space());
		}
		let len = min(self.available_space(), s.len());
		let end = (self.write_head + len) % self.buf.len();
		if end < self.write_head {
			self.buf[self.write_head..].copy_from_slice(&s[0..(len - end)]);
			self.buf[0..end].copy_from_slice(&s[(len - end)..]);
		} else {
			self.buf[self.write_head..end].copy_from_slice(&s[0..len]);
		}
		self.write_head = end;
	}

	/// Pops at least `n` bytes from the buffer, rounding up to a full line so a line is never
	/// truncated in the middle.
	fn pop(&mut self, n: usize) {
		let read_new = (self.read_head + n) % self.buf.len();
		if read_new >= self.write_head && read_new < self.read_head {
			self.read_head = self.write_head;
			return;
		}
		let mut i = 0;
		while i < self.buf.len() {
			let off = (read_new + i) % self.buf.len();
			if off >= self.write_head || self.buf[off] == b'\n' {
				break;
			}
			i += 1;
		}
		self.read_head = (read_new + i) % self.buf.len();
	}
}

impl Write for Logger {
	fn write_str(&mut self, s: &str) -> fmt::Result {
		self.push(s.as_bytes());
		if !self.silent {
			if let Some(sink) = self.sink {
				sink(s.as_bytes());
			}
		}
		Ok(())
	}
}
