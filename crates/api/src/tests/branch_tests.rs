// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::TestEnv;
use crate::{
    ApiError, AuthenticatedUser, CreateBranchRequest, ListBranchesRequest, ListBranchesResponse,
    SaveBranchResponse, UpdateBranchRequest, create_branch, list_branches, update_branch,
};

fn deactivate_cesme(env: &mut TestEnv) {
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let request: UpdateBranchRequest = UpdateBranchRequest {
        name: String::from("Çeşme"),
        code: String::from("CSM"),
        season: String::from("all_year"),
        is_active: false,
    };
    update_branch(&mut env.persistence, &admin, env.cesme, &request).unwrap();
}

#[test]
fn test_create_branch_defaults_season() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let request: CreateBranchRequest = CreateBranchRequest {
        name: String::from("  Alaçatı "),
        code: String::from("alc"),
        season: None,
    };

    let response: SaveBranchResponse = create_branch(&mut env.persistence, &admin, &request).unwrap();

    assert_eq!(response.branch.name, "Alaçatı");
    assert_eq!(response.branch.code, "ALC");
    assert_eq!(response.branch.season, "all_year");
    assert!(response.branch.is_active);
}

#[test]
fn test_duplicate_code_is_field_error() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let request: CreateBranchRequest = CreateBranchRequest {
        name: String::from("Bodrum Merkez"),
        code: String::from("BDR"),
        season: Some(String::from("summer")),
    };

    let err: ApiError = create_branch(&mut env.persistence, &admin, &request).unwrap_err();

    match err {
        ApiError::ValidationFailed { field_errors, .. } => {
            assert_eq!(field_errors["code"], vec!["Bu şube kodu zaten kullanılıyor."]);
        }
        other => panic!("Expected ValidationFailed, got {other:?}"),
    }
}

#[test]
fn test_invalid_season_is_rejected() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let request: CreateBranchRequest = CreateBranchRequest {
        name: String::from("Kaş"),
        code: String::from("KAS"),
        season: Some(String::from("spring")),
    };

    assert!(create_branch(&mut env.persistence, &admin, &request).is_err());
}

#[test]
fn test_general_manager_cannot_manage_branches() {
    let mut env: TestEnv = TestEnv::new();
    let gm_id: i64 = super::helpers::create_user(
        &mut env.persistence,
        "gm@mutlukent.com",
        "general_manager",
        None,
        &[],
    );
    let gm: AuthenticatedUser = env.as_user(gm_id);
    let request: CreateBranchRequest = CreateBranchRequest {
        name: String::from("Kaş"),
        code: String::from("KAS"),
        season: None,
    };

    let err: ApiError = create_branch(&mut env.persistence, &gm, &request).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_staff_cannot_list_branches() {
    let mut env: TestEnv = TestEnv::new();
    let staff: AuthenticatedUser = env.as_user(env.staff);

    let err: ApiError =
        list_branches(&mut env.persistence, &staff, ListBranchesRequest::default()).unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[test]
fn test_inactive_branches_only_for_managers() {
    let mut env: TestEnv = TestEnv::new();
    deactivate_cesme(&mut env);
    let include: ListBranchesRequest = ListBranchesRequest {
        include_inactive: true,
    };

    let admin: AuthenticatedUser = env.as_user(env.admin);
    let all: ListBranchesResponse =
        list_branches(&mut env.persistence, &admin, include).unwrap();
    assert_eq!(all.branches.len(), 2);

    let accountant: AuthenticatedUser = env.as_user(env.accountant);
    let active: ListBranchesResponse =
        list_branches(&mut env.persistence, &accountant, include).unwrap();
    assert_eq!(active.branches.len(), 1);
    assert_eq!(active.branches[0].branch_id, env.bodrum);
}

#[test]
fn test_deactivated_branch_leaves_scope() {
    let mut env: TestEnv = TestEnv::new();
    deactivate_cesme(&mut env);

    let admin: AuthenticatedUser = env.as_user(env.admin);
    assert_eq!(admin.scope.branch_ids, vec![env.bodrum]);
}

#[test]
fn test_update_missing_branch_is_not_found() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let request: UpdateBranchRequest = UpdateBranchRequest {
        name: String::from("Yok"),
        code: String::from("YOK"),
        season: String::from("winter"),
        is_active: true,
    };

    let err: ApiError = update_branch(&mut env.persistence, &admin, 9_999, &request).unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}
