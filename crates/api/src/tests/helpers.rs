// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! Test helper functions and fixtures.

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use mutlukent_domain::{AmountInput, BusinessClock, format_report_date};
use mutlukent_persistence::{Persistence, PhotoStore, UserData, UserProfileData};
use time::{Date, Duration};

use crate::{AuthenticatedUser, SubmitReportRequest, resolve_scope};

pub const TEST_PASSWORD: &str = "gizli-parola";

static PHOTO_DIR_COUNTER: AtomicU64 = AtomicU64::new(0);

/// A seeded back office: two branches and one user per interesting role.
pub struct TestEnv {
    pub persistence: Persistence,
    pub photos: PhotoStore,
    pub clock: BusinessClock,
    pub bodrum: i64,
    pub cesme: i64,
    pub admin: i64,
    pub accountant: i64,
    pub manager: i64,
    pub coordinator: i64,
    pub staff: i64,
}

impl TestEnv {
    pub fn new() -> Self {
        let mut persistence: Persistence =
            Persistence::new_in_memory().expect("In-memory database");
        let bodrum: i64 = persistence
            .create_branch("Bodrum", "BDR", "summer")
            .unwrap();
        let cesme: i64 = persistence
            .create_branch("Çeşme", "CSM", "all_year")
            .unwrap();

        let admin: i64 = create_user(&mut persistence, "admin@mutlukent.com", "admin", None, &[]);
        let accountant: i64 = create_user(
            &mut persistence,
            "muhasebe@mutlukent.com",
            "accountant",
            None,
            &[],
        );
        let manager: i64 = create_user(
            &mut persistence,
            "mudur@mutlukent.com",
            "branch_manager",
            Some(bodrum),
            &[],
        );
        let coordinator: i64 = create_user(
            &mut persistence,
            "koordinator@mutlukent.com",
            "coordinator",
            None,
            &[cesme],
        );
        let staff: i64 = create_user(
            &mut persistence,
            "personel@mutlukent.com",
            "staff",
            Some(bodrum),
            &[],
        );

        Self {
            persistence,
            photos: temp_photo_store(),
            clock: BusinessClock::default(),
            bodrum,
            cesme,
            admin,
            accountant,
            manager,
            coordinator,
            staff,
        }
    }

    /// Resolves a user the way a validated session would.
    pub fn as_user(&mut self, user_id: i64) -> AuthenticatedUser {
        let user: UserData = self.persistence.get_user(user_id).unwrap().unwrap();
        let scope = resolve_scope(&mut self.persistence, user_id).unwrap();
        AuthenticatedUser { user, scope }
    }

    pub fn today(&self) -> Date {
        self.clock.today().unwrap()
    }

    /// Today's business date shifted by `days`, as stored.
    pub fn day(&self, days: i64) -> String {
        format_report_date(self.today() + Duration::days(days))
    }
}

impl Drop for TestEnv {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(self.photos.root());
    }
}

pub fn temp_photo_store() -> PhotoStore {
    let id: u64 = PHOTO_DIR_COUNTER.fetch_add(1, Ordering::SeqCst);
    let root: PathBuf = std::env::temp_dir().join(format!(
        "mutlukent-api-photos-{}-{id}",
        std::process::id()
    ));
    PhotoStore::new(root)
}

pub fn create_user(
    persistence: &mut Persistence,
    email: &str,
    role_name: &str,
    home_branch_id: Option<i64>,
    assigned: &[i64],
) -> i64 {
    let role_id: i64 = persistence
        .get_role_by_name(role_name)
        .unwrap()
        .expect("Seeded role")
        .role_id;
    let user_id: i64 = persistence.create_identity(email, TEST_PASSWORD).unwrap();
    persistence
        .insert_profile(
            user_id,
            &UserProfileData {
                full_name: format!("Test {role_name}"),
                role_id,
                branch_id: home_branch_id,
                phone: None,
                is_active: true,
            },
            assigned,
        )
        .unwrap();
    user_id
}

/// A report submission in whole liras.
pub fn submission(
    branch_id: i64,
    report_date: &str,
    cash: i64,
    credit: i64,
    debit: i64,
) -> SubmitReportRequest {
    SubmitReportRequest {
        branch_id: Some(branch_id),
        report_date: Some(report_date.to_string()),
        cash_sales: Some(AmountInput::Kurus(cash * 100)),
        credit_card_sales: Some(AmountInput::Kurus(credit * 100)),
        debit_card_sales: Some(AmountInput::Kurus(debit * 100)),
        notes: None,
    }
}
