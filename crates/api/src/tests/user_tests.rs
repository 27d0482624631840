// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use super::helpers::{TEST_PASSWORD, TestEnv};
use crate::{
    ApiError, AuthenticatedUser, AuthenticationService, CreateUserRequest, ListRolesResponse,
    ListUsersResponse, SaveUserResponse, UpdateUserRequest, UserInfo, create_user, delete_user,
    list_roles, list_users, update_user,
};

fn new_user_request(email: &str, role: &str) -> CreateUserRequest {
    CreateUserRequest {
        email: email.to_string(),
        password: String::from("yeni-parola"),
        full_name: String::from("Ayşe Yılmaz"),
        role: role.to_string(),
        branch_id: None,
        phone: Some(String::from("  ")),
        is_active: true,
        assigned_branch_ids: Vec::new(),
    }
}

fn find_user(users: &ListUsersResponse, user_id: i64) -> &UserInfo {
    users.users.iter().find(|u| u.user_id == user_id).unwrap()
}

#[test]
fn test_create_coordinator_with_assignments() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let mut request: CreateUserRequest = new_user_request("AYSE@Mutlukent.com", "coordinator");
    request.assigned_branch_ids = vec![env.cesme, env.bodrum, env.cesme];

    let response: SaveUserResponse = create_user(&mut env.persistence, &admin, &request).unwrap();
    assert_eq!(response.email, "ayse@mutlukent.com");
    assert_eq!(response.message, "Kullanıcı oluşturuldu.");

    let users: ListUsersResponse = list_users(&mut env.persistence, &admin).unwrap();
    let created: &UserInfo = find_user(&users, response.user_id);
    assert_eq!(created.role.as_deref(), Some("coordinator"));
    assert_eq!(created.branch_name, "-");
    assert_eq!(created.phone, None);
    let mut expected: Vec<i64> = vec![env.bodrum, env.cesme];
    expected.sort_unstable();
    assert_eq!(created.assigned_branch_ids, expected);

    let coordinator: AuthenticatedUser = env.as_user(response.user_id);
    assert_eq!(coordinator.scope.branch_ids, expected);
}

#[test]
fn test_assignments_ignored_for_other_roles() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let mut request: CreateUserRequest = new_user_request("kasa@mutlukent.com", "staff");
    request.branch_id = Some(env.bodrum);
    request.assigned_branch_ids = vec![env.cesme];

    let response: SaveUserResponse = create_user(&mut env.persistence, &admin, &request).unwrap();

    assert!(
        env.persistence
            .list_assigned_branch_ids(response.user_id)
            .unwrap()
            .is_empty()
    );
}

#[test]
fn test_unknown_role_leaves_no_identity() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let request: CreateUserRequest = new_user_request("hayalet@mutlukent.com", "wizard");

    let err: ApiError = create_user(&mut env.persistence, &admin, &request).unwrap_err();

    assert_eq!(err.public_message(), "Seçilen rol bulunamadı.");
    assert!(
        env.persistence
            .get_identity_by_email("hayalet@mutlukent.com")
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_profile_failure_removes_identity() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let mut request: CreateUserRequest = new_user_request("yetim@mutlukent.com", "staff");
    request.branch_id = Some(9_999);

    let err: ApiError = create_user(&mut env.persistence, &admin, &request).unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { .. }));
    assert!(
        env.persistence
            .get_identity_by_email("yetim@mutlukent.com")
            .unwrap()
            .is_none()
    );
}

#[test]
fn test_duplicate_email_is_a_field_error() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let request: CreateUserRequest = new_user_request("Personel@mutlukent.com", "staff");

    let err: ApiError = create_user(&mut env.persistence, &admin, &request).unwrap_err();

    match err {
        ApiError::ValidationFailed { field_errors, .. } => {
            assert_eq!(
                field_errors["email"],
                vec!["Bu e-posta adresi zaten kullanılıyor."]
            );
        }
        other => panic!("Expected ValidationFailed, got {other:?}"),
    }
}

#[test]
fn test_create_user_validates_password() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let mut request: CreateUserRequest = new_user_request("kisa@mutlukent.com", "staff");
    request.password = String::from("123");

    let err: ApiError = create_user(&mut env.persistence, &admin, &request).unwrap_err();

    match err {
        ApiError::ValidationFailed { field_errors, .. } => {
            assert!(field_errors.contains_key("password"));
        }
        other => panic!("Expected ValidationFailed, got {other:?}"),
    }
}

#[test]
fn test_user_management_requires_permission() {
    let mut env: TestEnv = TestEnv::new();
    let manager: AuthenticatedUser = env.as_user(env.manager);

    assert!(matches!(
        list_users(&mut env.persistence, &manager),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        create_user(
            &mut env.persistence,
            &manager,
            &new_user_request("x@mutlukent.com", "staff")
        ),
        Err(ApiError::Unauthorized { .. })
    ));
    assert!(matches!(
        delete_user(&mut env.persistence, &manager, env.staff),
        Err(ApiError::Unauthorized { .. })
    ));
}

#[test]
fn test_list_roles() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);

    let roles: ListRolesResponse = list_roles(&mut env.persistence, &admin).unwrap();

    assert_eq!(roles.roles.len(), 7);
    let staff = roles.roles.iter().find(|r| r.name == "staff").unwrap();
    assert_eq!(staff.display_name, "Personel");
    assert!(staff.permissions.contains(&String::from("view_reports:own")));
}

fn update_request_for(info: &UserInfo) -> UpdateUserRequest {
    UpdateUserRequest {
        email: info.email.clone(),
        password: None,
        full_name: info.full_name.clone(),
        role: info.role.clone().unwrap(),
        branch_id: info.branch_id,
        phone: info.phone.clone(),
        is_active: info.is_active,
        assigned_branch_ids: info.assigned_branch_ids.clone(),
    }
}

#[test]
fn test_update_keeps_password_when_blank() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let users: ListUsersResponse = list_users(&mut env.persistence, &admin).unwrap();
    let mut request: UpdateUserRequest = update_request_for(find_user(&users, env.staff));
    request.password = Some(String::new());
    request.full_name = String::from("Mehmet Kaya");

    update_user(&mut env.persistence, &admin, env.staff, &request).unwrap();

    assert!(
        AuthenticationService::login(&mut env.persistence, "personel@mutlukent.com", TEST_PASSWORD)
            .is_ok()
    );
    let user = env.persistence.get_user(env.staff).unwrap().unwrap();
    assert_eq!(user.full_name, "Mehmet Kaya");
}

#[test]
fn test_update_changes_password_and_email() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let users: ListUsersResponse = list_users(&mut env.persistence, &admin).unwrap();
    let mut request: UpdateUserRequest = update_request_for(find_user(&users, env.staff));
    request.email = String::from("mehmet@mutlukent.com");
    request.password = Some(String::from("yepyeni-sifre"));

    let response: SaveUserResponse =
        update_user(&mut env.persistence, &admin, env.staff, &request).unwrap();
    assert_eq!(response.message, "Kullanıcı güncellendi.");

    assert!(
        AuthenticationService::login(&mut env.persistence, "personel@mutlukent.com", TEST_PASSWORD)
            .is_err()
    );
    assert!(
        AuthenticationService::login(&mut env.persistence, "mehmet@mutlukent.com", "yepyeni-sifre")
            .is_ok()
    );
}

#[test]
fn test_update_rejects_email_of_another_user() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let users: ListUsersResponse = list_users(&mut env.persistence, &admin).unwrap();
    let mut request: UpdateUserRequest = update_request_for(find_user(&users, env.staff));
    request.email = String::from("mudur@mutlukent.com");

    let err: ApiError = update_user(&mut env.persistence, &admin, env.staff, &request).unwrap_err();
    assert!(matches!(err, ApiError::ValidationFailed { .. }));
}

#[test]
fn test_deactivation_revokes_sessions() {
    let mut env: TestEnv = TestEnv::new();
    let (token, _, _) =
        AuthenticationService::login(&mut env.persistence, "personel@mutlukent.com", TEST_PASSWORD)
            .unwrap();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let users: ListUsersResponse = list_users(&mut env.persistence, &admin).unwrap();
    let mut request: UpdateUserRequest = update_request_for(find_user(&users, env.staff));
    request.is_active = false;

    update_user(&mut env.persistence, &admin, env.staff, &request).unwrap();

    assert_eq!(env.persistence.count_sessions_for_user(env.staff).unwrap(), 0);
    assert!(AuthenticationService::validate_session(&mut env.persistence, &token).is_err());
}

#[test]
fn test_update_missing_user_is_not_found() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    let users: ListUsersResponse = list_users(&mut env.persistence, &admin).unwrap();
    let request: UpdateUserRequest = update_request_for(find_user(&users, env.staff));

    let err: ApiError = update_user(&mut env.persistence, &admin, 9_999, &request).unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}

#[test]
fn test_cannot_delete_self() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);

    let err: ApiError = delete_user(&mut env.persistence, &admin, env.admin).unwrap_err();

    assert!(matches!(err, ApiError::DomainRuleViolation { .. }));
    assert_eq!(err.public_message(), "Kendi hesabınızı silemezsiniz.");
    assert!(env.persistence.get_user(env.admin).unwrap().is_some());
}

#[test]
fn test_delete_user_removes_identity_and_profile() {
    let mut env: TestEnv = TestEnv::new();
    let admin: AuthenticatedUser = env.as_user(env.admin);
    AuthenticationService::login(&mut env.persistence, "personel@mutlukent.com", TEST_PASSWORD)
        .unwrap();

    delete_user(&mut env.persistence, &admin, env.staff).unwrap();

    assert!(env.persistence.get_user(env.staff).unwrap().is_none());
    assert!(env.persistence.get_identity_by_id(env.staff).unwrap().is_none());
    assert_eq!(env.persistence.count_sessions_for_user(env.staff).unwrap(), 0);

    let err: ApiError = delete_user(&mut env.persistence, &admin, env.staff).unwrap_err();
    assert!(matches!(err, ApiError::ResourceNotFound { .. }));
}
