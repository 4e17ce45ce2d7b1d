// SPDX-FileCopyrightText: 2026 Servineo Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Collection stores for the Servineo request guard.
//!
//! [`MemoryStore`] keeps collections in process memory and backs tests.
//! [`JsonFileStore`] keeps one JSON array per collection under a data
//! directory, replacing files atomically on save.

pub mod json_file;
pub mod memory;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
