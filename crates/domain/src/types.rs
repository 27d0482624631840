// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

use crate::error::DomainError;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// How a role's branch set is determined.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRule {
    /// Every active branch.
    AllActive,
    /// Branches assigned through the user-branch join table.
    Assigned,
    /// The user's single home branch, if any.
    HomeBranch,
}

/// The named roles a user can hold.
///
/// Role rows are reference data seeded at deploy time; the name stored in the
/// `roles` table is the `as_str` form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleName {
    Admin,
    GeneralManager,
    Coordinator,
    BranchManager,
    Accountant,
    WarehouseManager,
    Staff,
}

impl RoleName {
    /// All roles, in seed order.
    pub const ALL: [Self; 7] = [
        Self::Admin,
        Self::GeneralManager,
        Self::Coordinator,
        Self::BranchManager,
        Self::Accountant,
        Self::WarehouseManager,
        Self::Staff,
    ];

    /// Converts this role to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => "admin",
            Self::GeneralManager => "general_manager",
            Self::Coordinator => "coordinator",
            Self::BranchManager => "branch_manager",
            Self::Accountant => "accountant",
            Self::WarehouseManager => "warehouse_manager",
            Self::Staff => "staff",
        }
    }

    /// Turkish display name shown in the back office.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Admin => "Yönetici",
            Self::GeneralManager => "Genel Müdür",
            Self::Coordinator => "Koordinatör",
            Self::BranchManager => "Şube Müdürü",
            Self::Accountant => "Muhasebe",
            Self::WarehouseManager => "Depo Sorumlusu",
            Self::Staff => "Personel",
        }
    }

    /// Returns the rule used to compute this role's branch set.
    #[must_use]
    pub const fn branch_rule(&self) -> BranchRule {
        match self {
            Self::Admin | Self::GeneralManager | Self::Accountant | Self::WarehouseManager => {
                BranchRule::AllActive
            }
            Self::Coordinator => BranchRule::Assigned,
            Self::BranchManager | Self::Staff => BranchRule::HomeBranch,
        }
    }

    /// The permission set seeded for this role.
    #[must_use]
    pub fn default_permissions(&self) -> Vec<Permission> {
        match self {
            Self::Admin => vec![
                Permission::ViewReportsAll,
                Permission::CreateReport,
                Permission::EditReportAll,
                Permission::DeleteReportAll,
                Permission::ManageBranches,
                Permission::ViewBranches,
                Permission::ManageUsers,
            ],
            Self::GeneralManager => vec![
                Permission::ViewReportsAll,
                Permission::CreateReport,
                Permission::EditReportAll,
                Permission::DeleteReportAll,
                Permission::ViewBranches,
                Permission::ManageUsers,
            ],
            Self::Coordinator | Self::BranchManager => vec![
                Permission::ViewReportsBranch,
                Permission::CreateReport,
                Permission::EditReportBranch,
                Permission::ViewBranches,
            ],
            Self::Accountant | Self::WarehouseManager => {
                vec![Permission::ViewReportsAll, Permission::ViewBranches]
            }
            Self::Staff => vec![Permission::ViewReportsOwn, Permission::CreateReport],
        }
    }
}

impl FromStr for RoleName {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| DomainError::InvalidRole(s.to_string()))
    }
}

impl std::fmt::Display for RoleName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A capability tag carried by a role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Permission {
    ViewReportsAll,
    ViewReportsBranch,
    ViewReportsOwn,
    CreateReport,
    EditReportAll,
    EditReportBranch,
    EditReportOwn,
    DeleteReportAll,
    /// Recognised in stored role data but grants nothing on its own.
    DeleteReportOwn,
    ManageBranches,
    ViewBranches,
    ManageUsers,
}

impl Permission {
    const ALL: [Self; 12] = [
        Self::ViewReportsAll,
        Self::ViewReportsBranch,
        Self::ViewReportsOwn,
        Self::CreateReport,
        Self::EditReportAll,
        Self::EditReportBranch,
        Self::EditReportOwn,
        Self::DeleteReportAll,
        Self::DeleteReportOwn,
        Self::ManageBranches,
        Self::ViewBranches,
        Self::ManageUsers,
    ];

    /// Converts this permission to its tag form.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::ViewReportsAll => "view_reports:all",
            Self::ViewReportsBranch => "view_reports:branch",
            Self::ViewReportsOwn => "view_reports:own",
            Self::CreateReport => "create_report",
            Self::EditReportAll => "edit_report:all",
            Self::EditReportBranch => "edit_report:branch",
            Self::EditReportOwn => "edit_report:own",
            Self::DeleteReportAll => "delete_report:all",
            Self::DeleteReportOwn => "delete_report:own",
            Self::ManageBranches => "manage_branches",
            Self::ViewBranches => "view_branches",
            Self::ManageUsers => "manage_users",
        }
    }
}

impl FromStr for Permission {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|permission| permission.as_str() == s)
            .ok_or_else(|| DomainError::InvalidPermission(s.to_string()))
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for Permission {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let tag: String = String::deserialize(deserializer)?;
        Self::from_str(&tag).map_err(serde::de::Error::custom)
    }
}

/// Seasonal operating pattern of a branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Season {
    Summer,
    Winter,
    #[default]
    AllYear,
}

impl Season {
    /// Converts this season to its stored string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Summer => "summer",
            Self::Winter => "winter",
            Self::AllYear => "all_year",
        }
    }
}

impl FromStr for Season {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "summer" => Ok(Self::Summer),
            "winter" => Ok(Self::Winter),
            "all_year" => Ok(Self::AllYear),
            _ => Err(DomainError::InvalidSeason(s.to_string())),
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A physical retail location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Branch {
    /// The canonical numeric identifier assigned by the database.
    pub branch_id: i64,
    /// Display name.
    pub name: String,
    /// Short unique code.
    pub code: String,
    /// Seasonal operating pattern.
    pub season: Season,
    /// Inactive branches are hidden from forms and all-branch scopes.
    pub is_active: bool,
}
