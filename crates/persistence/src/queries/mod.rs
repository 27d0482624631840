// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Read-only queries.
//!
//! - `roles`: seeded roles and their permission tags
//! - `branches`: branch listing and lookup
//! - `users`: identities, profiles and resolver inputs
//! - `sessions`: session lookup
//! - `reports`: filtered report pages, counts and dashboard totals

pub mod branches;
pub mod reports;
pub mod roles;
pub mod sessions;
pub mod users;

pub use users::verify_password;
