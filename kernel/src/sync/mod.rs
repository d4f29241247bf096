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

//! Synchronization primitives.

pub mod mutex;

pub use mutex::IntMutex;
