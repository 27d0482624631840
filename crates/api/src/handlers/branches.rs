// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use std::str::FromStr;

use mutlukent_domain::{Permission, Season, validate_branch_fields};
use mutlukent_persistence::{BranchData, Persistence, PersistenceError};
use tracing::{debug, info};

use super::to_branch_info;
use crate::auth::AuthenticatedUser;
use crate::error::{ApiError, translate_domain_error, translate_persistence_error};
use crate::permissions::require;
use crate::request_response::{
    CreateBranchRequest, ListBranchesRequest, ListBranchesResponse, SaveBranchResponse,
    UpdateBranchRequest,
};

pub const VIEW_BRANCHES_DENIED_MESSAGE: &str = "Şubeleri görüntüleme yetkiniz yok.";
pub const MANAGE_BRANCHES_DENIED_MESSAGE: &str = "Şube yönetimi yetkiniz yok.";
pub const DUPLICATE_CODE_MESSAGE: &str = "Bu şube kodu zaten kullanılıyor.";

fn parse_season(raw: Option<&str>) -> Result<Season, ApiError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(Season::AllYear),
        Some(text) => Season::from_str(text).map_err(translate_domain_error),
    }
}

fn map_write_error(err: PersistenceError) -> ApiError {
    match err {
        PersistenceError::UniqueViolation(_) => ApiError::field("code", DUPLICATE_CODE_MESSAGE),
        PersistenceError::NotFound(message) => ApiError::ResourceNotFound {
            resource_type: String::from("Şube"),
            message,
        },
        other => translate_persistence_error(other),
    }
}

fn load_branch(persistence: &mut Persistence, branch_id: i64) -> Result<BranchData, ApiError> {
    persistence
        .get_branch(branch_id)
        .map_err(translate_persistence_error)?
        .ok_or_else(|| ApiError::ResourceNotFound {
            resource_type: String::from("Şube"),
            message: format!("Şube bulunamadı: {branch_id}"),
        })
}

/// Lists branches ordered by name.
///
/// Inactive branches are included only when requested by a caller who
/// manages branches.
///
/// # Errors
///
/// Returns `Unauthorized` without `view_branches`.
pub fn list_branches(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    request: ListBranchesRequest,
) -> Result<ListBranchesResponse, ApiError> {
    require(
        &user.scope,
        Permission::ViewBranches,
        "list_branches",
        VIEW_BRANCHES_DENIED_MESSAGE,
    )?;

    let include_inactive: bool =
        request.include_inactive && user.scope.has(Permission::ManageBranches);
    if request.include_inactive && !include_inactive {
        debug!(user_id = user.user_id(), "Ignoring include_inactive");
    }

    let branches: Vec<BranchData> = persistence
        .list_branches(include_inactive)
        .map_err(translate_persistence_error)?;
    Ok(ListBranchesResponse {
        branches: branches.into_iter().map(to_branch_info).collect(),
    })
}

/// Creates a branch.
///
/// # Errors
///
/// Returns an error if the caller lacks `manage_branches`, a field is
/// invalid, or the code is already taken.
pub fn create_branch(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    request: &CreateBranchRequest,
) -> Result<SaveBranchResponse, ApiError> {
    require(
        &user.scope,
        Permission::ManageBranches,
        "create_branch",
        MANAGE_BRANCHES_DENIED_MESSAGE,
    )?;

    let (name, code): (String, String) =
        validate_branch_fields(&request.name, &request.code).map_err(translate_domain_error)?;
    let season: Season = parse_season(request.season.as_deref())?;

    let branch_id: i64 = persistence
        .create_branch(&name, &code, season.as_str())
        .map_err(map_write_error)?;
    let branch: BranchData = load_branch(persistence, branch_id)?;

    info!(branch_id, code = %code, created_by = user.user_id(), "Created branch");
    Ok(SaveBranchResponse {
        branch: to_branch_info(branch),
        message: String::from("Şube oluşturuldu."),
    })
}

/// Renames, recodes, reseasons or (de)activates a branch.
///
/// # Errors
///
/// Returns an error if the caller lacks `manage_branches`, the branch does
/// not exist, a field is invalid, or the code is already taken.
pub fn update_branch(
    persistence: &mut Persistence,
    user: &AuthenticatedUser,
    branch_id: i64,
    request: &UpdateBranchRequest,
) -> Result<SaveBranchResponse, ApiError> {
    require(
        &user.scope,
        Permission::ManageBranches,
        "update_branch",
        MANAGE_BRANCHES_DENIED_MESSAGE,
    )?;

    let (name, code): (String, String) =
        validate_branch_fields(&request.name, &request.code).map_err(translate_domain_error)?;
    let season: Season = parse_season(Some(&request.season))?;

    persistence
        .update_branch(branch_id, &name, &code, season.as_str(), request.is_active)
        .map_err(map_write_error)?;
    let branch: BranchData = load_branch(persistence, branch_id)?;

    info!(
        branch_id,
        is_active = branch.is_active,
        updated_by = user.user_id(),
        "Updated branch"
    );
    Ok(SaveBranchResponse {
        branch: to_branch_info(branch),
        message: String::from("Şube güncellendi."),
    })
}
