// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

#![allow(clippy::expect_used, clippy::unwrap_used)]

mod photo_store_tests;
mod session_tests;

use crate::{Persistence, ReportFields, UserProfileData};

pub const TEST_PASSWORD: &str = "gizli-parola";

pub fn create_test_persistence() -> Persistence {
    Persistence::new_in_memory().expect("In-memory database")
}

pub fn create_test_branch(persistence: &mut Persistence, code: &str) -> i64 {
    persistence
        .create_branch(&format!("Şube {code}"), code, "all_year")
        .expect("Branch created")
}

/// Creates an identity plus profile with the given role.
pub fn create_test_user(
    persistence: &mut Persistence,
    email: &str,
    role_name: &str,
    home_branch_id: Option<i64>,
) -> i64 {
    let role_id: i64 = persistence
        .get_role_by_name(role_name)
        .unwrap()
        .expect("Seeded role")
        .role_id;
    let user_id: i64 = persistence
        .create_identity(email, TEST_PASSWORD)
        .expect("Identity created");
    persistence
        .insert_profile(
            user_id,
            &UserProfileData {
                full_name: format!("Kullanıcı {user_id}"),
                role_id,
                branch_id: home_branch_id,
                phone: None,
                is_active: true,
            },
            &[],
        )
        .expect("Profile created");
    user_id
}

/// Report fields with a consistent total.
pub fn report_fields(branch_id: i64, report_date: &str, cash: i64, credit: i64, debit: i64) -> ReportFields {
    ReportFields {
        branch_id,
        report_date: report_date.to_string(),
        cash_sales: cash,
        credit_card_sales: credit,
        debit_card_sales: debit,
        total_sales: cash + credit + debit,
        notes: None,
    }
}
