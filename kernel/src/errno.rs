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

//! The kernel-wide error taxonomy.
//!
//! Every fallible subsystem call returns a [`KResult`]. Tier 2 (kernel invariant violations)
//! bypasses this type entirely and goes through [`panic!`] instead; see `panic.rs`.

use core::fmt;

/// An error produced by a kernel subsystem.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Errno {
	/// The kernel heap is exhausted.
	NoMem,
	/// No physical frame is free.
	NoFreeFrame,
	/// A frame index is out of the bitset's range.
	FrameOutOfRange,
	/// A mapping or frame is already present where none was expected.
	AlreadyPresent,
	/// A virtual address is already mapped.
	AlreadyMapped,
	/// An on-disk structure did not carry the expected magic number.
	BadSignature,
	/// The block group count computed from the superblock is inconsistent.
	IncoherentGroupCount,
	/// A byte offset is out of bounds for the object being addressed.
	InvalidOffset,
	/// Attempted to free a block or inode that was not allocated.
	NotAllocated,
	/// No free block is left in the filesystem.
	NoFreeBlock,
	/// No free inode is left in the filesystem.
	NoFreeInode,
	/// The process table is full.
	NoFreePid,
	/// A requested scheduling priority exceeds the configured maximum.
	PriorityTooHigh,
	/// The syscall number in `eax` does not name a known system call.
	InvalidSyscall,
	/// A path could not be resolved.
	InvalidPath,
	/// A file descriptor number is not open in the calling process.
	BadFd,
	/// The process's file descriptor table is full.
	TooManyOpenFiles,
}

impl Errno {
	/// Returns the negative `errno`-style code returned to userspace in `eax`.
	pub fn as_int(self) -> i32 {
		-(match self {
			Self::NoMem => 1,
			Self::NoFreeFrame => 2,
			Self::FrameOutOfRange => 3,
			Self::AlreadyPresent => 4,
			Self::AlreadyMapped => 5,
			Self::BadSignature => 6,
			Self::IncoherentGroupCount => 7,
			Self::InvalidOffset => 8,
			Self::NotAllocated => 9,
			Self::NoFreeBlock => 10,
			Self::NoFreeInode => 11,
			Self::NoFreePid => 12,
			Self::PriorityTooHigh => 13,
			Self::InvalidSyscall => 14,
			Self::InvalidPath => 15,
			Self::BadFd => 16,
			Self::TooManyOpenFiles => 17,
		} as i32)
	}
}

impl fmt::Display for Errno {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{self:?}")
	}
}

/// Shorthand for the result type returned by fallible kernel operations.
pub type KResult<T> = Result<T, Errno>;
