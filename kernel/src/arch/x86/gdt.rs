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

//! Global Descriptor Table segment selectors.
//!
//! Bring-up of the table itself (and of the TSS it references) is an external collaborator's
//! responsibility; this module only names the selectors the rest of the kernel relies on for
//! ring transitions.

/// Kernel code segment selector.
pub const KERNEL_CS: u16 = 8;
/// Kernel data segment selector.
pub const KERNEL_DS: u16 = 16;
/// User code segment selector.
pub const USER_CS: u16 = 24;
/// User data segment selector.
pub const USER_DS: u16 = 32;
/// Task State Segment selector.
pub const TSS_OFFSET: u16 = 40;
