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

//! The ext2 superblock.
//!
//! Only the fields this core reads or writes are named; the remainder of the on-disk 1024-byte
//! structure is kept as padding so the byte offsets of the fields below stay correct.

use crate::errno::{Errno, KResult};

/// The signature every valid ext2 superblock carries in `s_magic`.
pub const EXT2_SIGNATURE: u16 = 0xef53;
/// The byte offset, from the start of the volume, at which the superblock is stored.
pub const SUPERBLOCK_OFFSET: usize = 1024;

/// The on-disk ext2 superblock, reduced to the fields this core depends on.
#[repr(C)]
#[derive(Clone)]
pub struct Superblock {
	pub inodes_count: u32,
	pub blocks_count: u32,
	pub r_blocks_count: u32,
	pub free_blocks_count: u32,
	pub free_inodes_count: u32,
	pub first_data_block: u32,
	/// `log2(block_size) - 10`.
	pub log_block_size: u32,
	pub log_frag_size: u32,
	pub blocks_per_group: u32,
	pub frags_per_group: u32,
	pub inodes_per_group: u32,
	pub mtime: u32,
	pub wtime: u32,
	pub mnt_count: u16,
	pub max_mnt_count: u16,
	pub magic: u16,
	pub state: u16,
	pub errors: u16,
	pub minor_rev_level: u16,
	pub lastcheck: u32,
	pub checkinterval: u32,
	pub creator_os: u32,
	pub rev_level: u32,
	pub def_resuid: u16,
	pub def_resgid: u16,
	pub first_ino: u32,
	pub inode_size: u16,
	pub block_group_nr: u16,
	_rest: [u8; 940],
}

impl Superblock {
	/// Parses a superblock out of its 1024-byte on-disk representation.
	///
	/// Reads field-by-field in on-disk order rather than transmuting, since the struct above
	/// intentionally drops trailing fields this core never uses.
	pub fn parse(buf: &[u8; 1024]) -> KResult<Self> {
		let u32_at = |off: usize| u32::from_le_bytes(buf[off..off + 4].try_into().unwrap());
		let u16_at = |off: usize| u16::from_le_bytes(buf[off..off + 2].try_into().unwrap());
		let sb = Self {
			inodes_count: u32_at(0),
			blocks_count: u32_at(4),
			r_blocks_count: u32_at(8),
			free_blocks_count: u32_at(12),
			free_inodes_count: u32_at(16),
			first_data_block: u32_at(20),
			log_block_size: u32_at(24),
			log_frag_size: u32_at(28),
			blocks_per_group: u32_at(32),
			frags_per_group: u32_at(36),
			inodes_per_group: u32_at(40),
			mtime: u32_at(44),
			wtime: u32_at(48),
			mnt_count: u16_at(52),
			max_mnt_count: u16_at(54),
			magic: u16_at(56),
			state: u16_at(58),
			errors: u16_at(60),
			minor_rev_level: u16_at(62),
			lastcheck: u32_at(64),
			checkinterval: u32_at(68),
			creator_os: u32_at(72),
			rev_level: u32_at(76),
			def_resuid: u16_at(80),
			def_resgid: u16_at(82),
			first_ino: u32_at(84),
			inode_size: u16_at(88),
			block_group_nr: u16_at(90),
			_rest: [0; 940],
		};
		if sb.magic != EXT2_SIGNATURE {
			return Err(Errno::BadSignature);
		}
		Ok(sb)
	}

	/// Serializes the fields this core may have mutated back into their on-disk positions,
	/// leaving every other byte of `buf` untouched.
	pub fn write_back(&self, buf: &mut [u8; 1024]) {
		buf[12..16].copy_from_slice(&self.free_blocks_count.to_le_bytes());
		buf[16..20].copy_from_slice(&self.free_inodes_count.to_le_bytes());
	}

	/// The filesystem's block size in bytes: `1024 << log_block_size`.
	///
	/// The canonical ext2 formula; §3/§4.E's "512 ≪ log_block_size" mentions are artifacts of
	/// the source's 16-bit-word block-size counting (see the design notes).
	pub fn block_size(&self) -> u32 {
		1024 << self.log_block_size
	}

	/// The on-disk size of one inode record.
	pub fn inode_size(&self) -> u32 {
		if self.inode_size == 0 { 128 } else { self.inode_size as u32 }
	}
}
