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

//! A Block Group Descriptor represents one block group: a subdivision of the filesystem holding
//! its own inode/block bitmaps and inode table.

/// The on-disk size of one block group descriptor.
pub const BGD_SIZE: usize = 32;

/// A single block group descriptor.
#[derive(Clone, Default)]
pub struct BlockGroupDescriptor {
	pub block_bitmap: u32,
	pub inode_bitmap: u32,
	pub inode_table: u32,
	pub free_blocks_count: u16,
	pub free_inodes_count: u16,
	pub used_dirs_count: u16,
}

impl BlockGroupDescriptor {
	/// Parses one descriptor out of its 32-byte on-disk representation.
	pub fn parse(buf: &[u8]) -> Self {
		let u32_at = |off: usize| u32::from_le_bytes(buf[off..off + 4].try_into().unwrap());
		let u16_at = |off: usize| u16::from_le_bytes(buf[off..off + 2].try_into().unwrap());
		Self {
			block_bitmap: u32_at(0),
			inode_bitmap: u32_at(4),
			inode_table: u32_at(8),
			free_blocks_count: u16_at(12),
			free_inodes_count: u16_at(14),
			used_dirs_count: u16_at(16),
		}
	}

	/// Writes the mutable counters back into their on-disk positions.
	pub fn write_back(&self, buf: &mut [u8]) {
		buf[12..14].copy_from_slice(&self.free_blocks_count.to_le_bytes());
		buf[14..16].copy_from_slice(&self.free_inodes_count.to_le_bytes());
	}
}
