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

//! Userspace pointer wrappers for syscall arguments.
//!
//! A type whose name starts with `Syscall` is special-cased by `macros::syscall`: the generated
//! handler wraps the raw register value in it (`SyscallPtr::from(regs.ebx as usize)`) instead of
//! casting it to a plain integer, the same contract the teacher's `process::mem_space::ptr`
//! types serve for the six-register ABI this one is reduced from.

use crate::{
	errno::{Errno, KResult},
	memory::{VirtAddr, paging::PageDirectory},
};
use core::marker::PhantomData;

/// The longest path or format string a syscall argument may name.
pub const MAX_STRING_LEN: usize = 256;

/// A user-space pointer to a `T`, unchecked until resolved against a page directory.
pub struct SyscallPtr<T>(usize, PhantomData<T>);

impl<T> From<usize> for SyscallPtr<T> {
	fn from(val: usize) -> Self {
		Self(val, PhantomData)
	}
}

impl<T> SyscallPtr<T> {
	/// Tells whether the pointer is null.
	pub fn is_null(&self) -> bool {
		self.0 == 0
	}

	/// Validates that the pointer is mapped in `dir` and returns it as a raw pointer.
	pub fn resolve(&self, dir: &PageDirectory) -> KResult<*const T> {
		if self.is_null() {
			return Err(Errno::InvalidOffset);
		}
		dir.translate(VirtAddr(self.0)).ok_or(Errno::InvalidOffset)?;
		Ok(VirtAddr(self.0).as_ptr())
	}

	/// Same as [`Self::resolve`], but for a mutable destination.
	pub fn resolve_mut(&self, dir: &PageDirectory) -> KResult<*mut T> {
		self.resolve(dir).map(|p| p as *mut T)
	}
}

/// A user-space pointer to a byte buffer of a statically-unknown length, supplied alongside a
/// separate length argument by the caller (e.g. `read`/`write`'s `buf`/`len` pair).
pub struct SyscallSlice(usize);

impl From<usize> for SyscallSlice {
	fn from(val: usize) -> Self {
		Self(val)
	}
}

impl SyscallSlice {
	/// Validates and returns a `[u8]` of `len` bytes read from user memory.
	///
	/// # Safety
	///
	/// `dir` must be the currently bound page directory: the returned slice borrows directly
	/// from it for the lifetime of the call.
	pub unsafe fn as_slice<'d>(&self, dir: &'d PageDirectory, len: u32) -> KResult<&'d [u8]> {
		if self.0 == 0 {
			return Err(Errno::InvalidOffset);
		}
		dir.translate(VirtAddr(self.0)).ok_or(Errno::InvalidOffset)?;
		Ok(unsafe { core::slice::from_raw_parts(VirtAddr(self.0).as_ptr(), len as usize) })
	}

	/// Same as [`Self::as_slice`], mutable.
	///
	/// # Safety
	///
	/// See [`Self::as_slice`].
	pub unsafe fn as_slice_mut<'d>(&self, dir: &'d PageDirectory, len: u32) -> KResult<&'d mut [u8]> {
		if self.0 == 0 {
			return Err(Errno::InvalidOffset);
		}
		dir.translate(VirtAddr(self.0)).ok_or(Errno::InvalidOffset)?;
		Ok(unsafe { core::slice::from_raw_parts_mut(VirtAddr(self.0).as_ptr(), len as usize) })
	}
}

/// A user-space pointer to a NUL-terminated string, as passed for `open`'s path and `printf`'s
/// format argument.
pub struct SyscallString(usize);

impl From<usize> for SyscallString {
	fn from(val: usize) -> Self {
		Self(val)
	}
}

impl SyscallString {
	/// Copies the string out of user memory into a fixed-size stack buffer and returns it,
	/// validating every page it spans as it scans for the terminating NUL.
	///
	/// Capped at [`MAX_STRING_LEN`] bytes; a longer string is rejected rather than truncated.
	pub fn read(&self, dir: &PageDirectory, out: &mut [u8; MAX_STRING_LEN]) -> KResult<usize> {
		if self.0 == 0 {
			return Err(Errno::InvalidOffset);
		}
		for i in 0..MAX_STRING_LEN {
			let addr = VirtAddr(self.0 + i);
			dir.translate(addr).ok_or(Errno::InvalidOffset)?;
			let byte = unsafe { *addr.as_ptr::<u8>() };
			if byte == 0 {
				return Ok(i);
			}
			out[i] = byte;
		}
		Err(Errno::InvalidOffset)
	}
}
