// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! State-changing operations.
//!
//! Inserts read the new id back through `PersistenceBackend`, since
//! `SQLite` has no portable `RETURNING` for every statement shape used here.
//!
//! - `branches`: branch create and update
//! - `users`: identities, profiles and coordinator assignments
//! - `sessions`: login sessions
//! - `reports`: daily report writes and verification

pub mod branches;
pub mod reports;
pub mod sessions;
pub mod users;
