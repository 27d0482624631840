// Copyright (C) 2026 Fred Clausen
// Use of this source code is governed by an MIT-style
// license that can be found in the LICENSE file or at
// https://opensource.org/licenses/MIT.

//! # xtask - Project Automation
//!
//! Wraps the cargo invocations used locally and in CI.
//!
//! - `cargo xtask ci` runs lint, deny, machete, build, test and the
//!   migration check in sequence.
//! - `cargo xtask verify-migrations` applies the embedded `SQLite`
//!   migrations to an in-memory database, checks the resulting schema
//!   against the tables the back office relies on, then reverts every
//!   migration and confirms nothing is left behind.
//!
//! No command needs external services.

#![deny(
    clippy::pedantic,
    //clippy::cargo,
    clippy::nursery,
    clippy::style,
    clippy::correctness,
    clippy::all
)]

use std::collections::{BTreeMap, BTreeSet};
use std::{io, process::Output, vec};

use cargo_metadata::MetadataCommand;
use clap::{Parser, Subcommand};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use color_eyre::{Result, eyre::Context, eyre::eyre};
use diesel::sql_types::{Integer, Text};
use diesel::{Connection, QueryableByName, RunQueryDsl, SqliteConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use duct::cmd;
use tracing::level_filters::LevelFilter;
use tracing_log::AsTrace;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../crates/persistence/migrations");

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = Args::parse();
    tracing_subscriber::fmt()
        .with_max_level(args.log_level())
        .without_time()
        .init();

    match args.run() {
        Ok(()) => (),
        Err(err) => {
            tracing::error!("{err}");
            std::process::exit(1);
        }
    }
    Ok(())
}

#[derive(Debug, Parser)]
#[command(bin_name = "cargo xtask", styles = clap_cargo::style::CLAP_STYLING)]
struct Args {
    #[command(subcommand)]
    command: Command,

    #[command(flatten)]
    verbosity: Verbosity<InfoLevel>,
}

impl Args {
    fn run(self) -> Result<()> {
        self.command.run()
    }

    fn log_level(&self) -> LevelFilter {
        self.verbosity.log_level_filter().as_trace()
    }
}

#[derive(Clone, Debug, Subcommand)]
enum Command {
    /// Run CI checks (lint, build, test, migrations)
    CI,

    /// Build the project
    #[command(visible_alias = "b")]
    Build,

    /// Run cargo check
    #[command(visible_alias = "c")]
    Check,

    /// Generate code coverage report
    #[command(visible_alias = "cov")]
    Coverage,

    /// Check dependencies
    #[command(visible_alias = "cd")]
    Deny,

    /// Check unused dependencies
    #[command(visible_alias = "m")]
    Machete,

    /// Lint formatting, typos, clippy, and docs
    #[command(visible_alias = "l")]
    Lint,

    /// Run clippy on the project
    #[command(visible_alias = "cl")]
    LintClippy,

    /// Check documentation for errors and warnings
    #[command(visible_alias = "d")]
    LintDocs,

    /// Check for formatting issues in the project
    #[command(visible_alias = "lf")]
    LintFormatting,

    /// Lint markdown files
    #[command(visible_alias = "md")]
    LintMarkdown,

    /// Check for typos in the project
    #[command(visible_alias = "lt")]
    LintTypos,

    /// Fix clippy warnings in the project
    #[command(visible_alias = "fc")]
    FixClippy,

    /// Fix formatting issues in the project
    #[command(visible_alias = "fmt")]
    FixFormatting,

    /// Fix typos in the project
    #[command(visible_alias = "typos")]
    FixTypos,

    /// Run tests
    #[command(visible_alias = "t")]
    Test,

    /// Run doc tests
    #[command(visible_alias = "td")]
    TestDocs,

    /// Run lib tests
    #[command(visible_alias = "tl")]
    TestLibs,

    /// Apply and revert the `SQLite` migrations and check the schema
    #[command(visible_alias = "vm")]
    VerifyMigrations,
}

impl Command {
    fn run(self) -> Result<()> {
        match self {
            Self::CI => ci(),
            Self::Build => build(),
            Self::Check => check(),
            Self::Deny => deny(),
            Self::Machete => machete(),
            Self::Coverage => coverage(),
            Self::Lint => lint(),
            Self::LintClippy => lint_clippy(),
            Self::LintDocs => lint_docs(),
            Self::LintFormatting => lint_format(),
            Self::LintTypos => lint_typos(),
            Self::LintMarkdown => lint_markdown(),
            Self::FixClippy => fix_clippy(),
            Self::FixFormatting => fix_format(),
            Self::FixTypos => fix_typos(),
            Self::Test => test(),
            Self::TestDocs => test_docs(),
            Self::TestLibs => test_libs(),
            Self::VerifyMigrations => verify_migrations(),
        }
    }
}

/// Run CI checks (lint, build, test, migrations)
fn ci() -> Result<()> {
    lint()?;
    deny()?;
    machete()?;
    build()?;
    test()?;
    verify_migrations()?;
    Ok(())
}

fn deny() -> Result<()> {
    run_cargo(vec!["deny", "check"])
}

fn machete() -> Result<()> {
    cmd!("cargo-machete").run_with_trace()?;
    Ok(())
}

/// Build the project
fn build() -> Result<()> {
    run_cargo(vec!["build", "--all-targets", "--all-features"])
}

/// Run cargo check
fn check() -> Result<()> {
    run_cargo(vec!["check", "--all-targets", "--all-features"])
}

/// Generate code coverage report
fn coverage() -> Result<()> {
    run_cargo(vec![
        "llvm-cov",
        "--lcov",
        "--output-path",
        "target/lcov.info",
        "--all-features",
    ])
}

/// Lint formatting, typos, clippy, and docs (and a soft fail on markdown)
fn lint() -> Result<()> {
    lint_clippy()?;
    lint_docs()?;
    lint_format()?;
    lint_typos()?;
    if let Err(err) = lint_markdown() {
        tracing::warn!("markdownlint reported issues: {err}");
    }
    Ok(())
}

/// Run clippy on the project
fn lint_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--",
        "-D",
        "warnings",
    ])
}

/// Fix clippy warnings in the project
fn fix_clippy() -> Result<()> {
    run_cargo(vec![
        "clippy",
        "--all-targets",
        "--all-features",
        "--fix",
        "--allow-dirty",
        "--allow-staged",
        "--",
        "-D",
        "warnings",
    ])
}

/// Check that docs build without errors using docs.rs-equivalent flags
fn lint_docs() -> Result<()> {
    let meta = MetadataCommand::new()
        .exec()
        .wrap_err("failed to get cargo metadata")?;

    for package in meta.workspace_default_packages() {
        cmd(
            "cargo",
            [
                "doc",
                "--no-deps",
                "--all-features",
                "--package",
                &package.name,
            ],
        )
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .env("RUSTDOCFLAGS", "--cfg docsrs -D warnings")
        .run_with_trace()?;
    }

    Ok(())
}

/// Lint formatting issues in the project
fn lint_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all", "--check"])
}

/// Fix formatting issues in the project
fn fix_format() -> Result<()> {
    run_cargo_nightly(vec!["fmt", "--all"])
}

/// Lint markdown files using [markdownlint-cli2](https://github.com/DavidAnson/markdownlint-cli2)
fn lint_markdown() -> Result<()> {
    cmd!(
        "markdownlint-cli2",
        "**/*.md",
        "!target",
        "!**/target",
        "!examples"
    )
    .run_with_trace()?;

    Ok(())
}

/// Check for typos in the project using [typos-cli](https://github.com/crate-ci/typos/)
fn lint_typos() -> Result<()> {
    cmd!("typos").run_with_trace()?;
    Ok(())
}

/// Fix typos in the project
fn fix_typos() -> Result<()> {
    cmd!("typos", "-w").run_with_trace()?;
    Ok(())
}

/// Run lib tests, then doc tests
fn test() -> Result<()> {
    test_libs()?;
    test_docs()?; // run last because it's slow
    Ok(())
}

/// Run doc tests for the workspace's default packages
fn test_docs() -> Result<()> {
    run_cargo(vec!["test", "--doc", "--all-features"])
}

/// Run lib tests for the workspace's default packages
fn test_libs() -> Result<()> {
    run_cargo(vec!["test", "--all-targets", "--all-features"])
}

/// Run a cargo subcommand with the default toolchain
fn run_cargo(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args).run_with_trace()?;
    Ok(())
}

/// Run a cargo subcommand with the nightly toolchain
fn run_cargo_nightly(args: Vec<&str>) -> Result<()> {
    cmd("cargo", args)
        // CARGO env var is set because we're running in a cargo subcommand
        .env_remove("CARGO")
        .env("RUSTUP_TOOLCHAIN", "nightly")
        .run_with_trace()?;
    Ok(())
}

// ============================================================================
// Migration verification
// ============================================================================

/// Tables the back office expects, with the foreign keys each must carry
/// as `(column, referenced table)`.
const EXPECTED_TABLES: &[(&str, &[(&str, &str)])] = &[
    ("roles", &[]),
    ("branches", &[]),
    ("identities", &[]),
    (
        "users",
        &[
            ("identity_id", "identities"),
            ("role_id", "roles"),
            ("branch_id", "branches"),
        ],
    ),
    (
        "user_branches",
        &[("user_id", "users"), ("branch_id", "branches")],
    ),
    (
        "daily_reports",
        &[
            ("branch_id", "branches"),
            ("created_by", "users"),
            ("verified_by", "users"),
        ],
    ),
    ("sessions", &[("user_id", "users")]),
];

/// Unique columns that reject duplicates, as `(table, column)`.
const EXPECTED_UNIQUE: &[(&str, &str)] = &[
    ("roles", "name"),
    ("branches", "code"),
    ("identities", "email"),
    ("sessions", "session_token"),
];

/// Roles the migration seeds.
const EXPECTED_ROLES: &[&str] = &[
    "accountant",
    "admin",
    "branch_manager",
    "coordinator",
    "general_manager",
    "staff",
    "warehouse_manager",
];

/// Apply every migration to a fresh in-memory database, check the schema,
/// revert everything, and apply again.
///
/// # Errors
///
/// Returns an error if any migration fails in either direction, or the
/// resulting schema is missing a table, foreign key, unique constraint or
/// seeded role.
fn verify_migrations() -> Result<()> {
    let mut conn = SqliteConnection::establish(":memory:")
        .wrap_err("Failed to create SQLite in-memory database")?;

    diesel::sql_query("PRAGMA foreign_keys = ON")
        .execute(&mut conn)
        .wrap_err("Failed to enable foreign keys on SQLite")?;

    tracing::info!("Applying migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to apply migrations: {e}"))?;

    let schema: Schema = introspect_sqlite_schema(&mut conn)?;
    check_schema(&schema)?;
    check_seeded_roles(&mut conn)?;
    tracing::info!(tables = schema.tables.len(), "Schema matches expectations");

    tracing::info!("Reverting migrations");
    conn.revert_all_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to revert migrations: {e}"))?;

    let reverted: Schema = introspect_sqlite_schema(&mut conn)?;
    if !reverted.tables.is_empty() {
        let leftover: Vec<&String> = reverted.tables.keys().collect();
        return Err(eyre!("Tables left after revert: {leftover:?}"));
    }

    tracing::info!("Re-applying migrations");
    conn.run_pending_migrations(MIGRATIONS)
        .map_err(|e| eyre!("Failed to re-apply migrations: {e}"))?;

    tracing::info!("✓ Migration verification passed");
    Ok(())
}

fn check_schema(schema: &Schema) -> Result<()> {
    let mut problems: Vec<String> = Vec::new();

    for (table_name, foreign_keys) in EXPECTED_TABLES {
        let Some(table) = schema.tables.get(*table_name) else {
            problems.push(format!("missing table {table_name}"));
            continue;
        };
        if table.primary_keys.is_empty() {
            problems.push(format!("{table_name} has no primary key"));
        }
        for (column, target) in *foreign_keys {
            let found: bool = table
                .foreign_keys
                .iter()
                .any(|fk| fk.from_column == *column && fk.to_table == *target);
            if !found {
                problems.push(format!(
                    "{table_name}.{column} does not reference {target}"
                ));
            }
        }
    }

    for (table_name, column) in EXPECTED_UNIQUE {
        let unique: bool = schema.tables.get(*table_name).is_some_and(|table| {
            table
                .unique_constraints
                .iter()
                .any(|u| u.columns.len() == 1 && u.columns[0] == *column)
        });
        if !unique {
            problems.push(format!("{table_name}.{column} is not unique"));
        }
    }

    if let Some(reports) = schema.tables.get("daily_reports") {
        for column in ["cash_sales", "credit_card_sales", "debit_card_sales", "total_sales"] {
            match reports.columns.get(column) {
                Some(c) if c.normalized_type == "integer" && !c.nullable => {}
                Some(c) => problems.push(format!(
                    "daily_reports.{column} should be a non-null integer, found {} (nullable: {})",
                    c.normalized_type, c.nullable
                )),
                None => problems.push(format!("daily_reports.{column} is missing")),
            }
        }
        if reports.indexes.is_empty() {
            problems.push(String::from("daily_reports has no indexes"));
        }
    }

    if problems.is_empty() {
        Ok(())
    } else {
        for problem in &problems {
            tracing::error!("{problem}");
        }
        Err(eyre!("Schema check found {} problem(s)", problems.len()))
    }
}

fn check_seeded_roles(conn: &mut SqliteConnection) -> Result<()> {
    #[derive(QueryableByName)]
    struct RoleName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let roles: Vec<RoleName> = diesel::sql_query("SELECT name FROM roles ORDER BY name")
        .load(conn)
        .wrap_err("Failed to read seeded roles")?;
    let found: BTreeSet<String> = roles.into_iter().map(|r| r.name).collect();
    let expected: BTreeSet<String> = EXPECTED_ROLES.iter().map(|r| (*r).to_string()).collect();

    if found == expected {
        Ok(())
    } else {
        Err(eyre!(
            "Seeded roles differ: expected {expected:?}, found {found:?}"
        ))
    }
}

/// Normalized schema representation
#[derive(Debug, Clone, PartialEq, Eq)]
struct Schema {
    tables: BTreeMap<String, Table>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Table {
    columns: BTreeMap<String, Column>,
    primary_keys: BTreeSet<String>,
    foreign_keys: BTreeSet<ForeignKey>,
    unique_constraints: BTreeSet<UniqueConstraint>,
    indexes: BTreeSet<Index>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Column {
    normalized_type: String,
    nullable: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct ForeignKey {
    from_column: String,
    to_table: String,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct UniqueConstraint {
    columns: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct Index {
    name: String,
    columns: Vec<String>,
}

/// Introspect `SQLite` schema
fn introspect_sqlite_schema(conn: &mut SqliteConnection) -> Result<Schema> {
    #[derive(QueryableByName)]
    struct TableName {
        #[diesel(sql_type = Text)]
        name: String,
    }

    #[derive(QueryableByName)]
    struct ColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        r#type: String,
        #[diesel(sql_type = Integer)]
        notnull: i32,
        #[diesel(sql_type = Integer)]
        pk: i32,
    }

    #[derive(QueryableByName)]
    struct ForeignKeyInfo {
        #[diesel(sql_type = Text)]
        table: String,
        #[diesel(sql_type = Text)]
        from: String,
    }

    #[derive(QueryableByName)]
    struct IndexInfo {
        #[diesel(sql_type = Text)]
        name: String,
        #[diesel(sql_type = Text)]
        origin: String,
    }

    #[derive(QueryableByName)]
    struct IndexColumnInfo {
        #[diesel(sql_type = Text)]
        name: String,
    }

    let mut schema = Schema {
        tables: BTreeMap::new(),
    };

    let tables: Vec<TableName> = diesel::sql_query(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%' AND name != '__diesel_schema_migrations' ORDER BY name",
    )
    .load(conn)
    .wrap_err("Failed to query SQLite tables")?;

    for table in tables {
        let mut table_info = Table {
            columns: BTreeMap::new(),
            primary_keys: BTreeSet::new(),
            foreign_keys: BTreeSet::new(),
            unique_constraints: BTreeSet::new(),
            indexes: BTreeSet::new(),
        };

        let columns: Vec<ColumnInfo> =
            diesel::sql_query(format!("PRAGMA table_info({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get columns for table {}", table.name))?;

        for col in columns {
            table_info.columns.insert(
                col.name.clone(),
                Column {
                    normalized_type: normalize_sqlite_type(&col.r#type),
                    nullable: col.notnull == 0,
                },
            );
            if col.pk > 0 {
                table_info.primary_keys.insert(col.name);
            }
        }

        let fks: Vec<ForeignKeyInfo> =
            diesel::sql_query(format!("PRAGMA foreign_key_list({})", table.name))
                .load(conn)
                .wrap_err(format!(
                    "Failed to get foreign keys for table {}",
                    table.name
                ))?;

        for fk in fks {
            table_info.foreign_keys.insert(ForeignKey {
                from_column: fk.from,
                to_table: fk.table,
            });
        }

        let indexes: Vec<IndexInfo> =
            diesel::sql_query(format!("PRAGMA index_list({})", table.name))
                .load(conn)
                .wrap_err(format!("Failed to get indexes for table {}", table.name))?;

        for idx in indexes {
            let index_columns: Vec<IndexColumnInfo> =
                diesel::sql_query(format!("PRAGMA index_info({})", idx.name))
                    .load(conn)
                    .wrap_err(format!("Failed to get index columns for {}", idx.name))?;
            let column_names: Vec<String> = index_columns.into_iter().map(|c| c.name).collect();

            // Origin 'u' covers UNIQUE column constraints (sqlite_autoindex_*)
            if idx.origin == "u" {
                table_info.unique_constraints.insert(UniqueConstraint {
                    columns: column_names,
                });
            } else if idx.origin == "c" {
                table_info.indexes.insert(Index {
                    name: idx.name,
                    columns: column_names,
                });
            }
        }

        schema.tables.insert(table.name, table_info);
    }

    Ok(schema)
}

/// Map a declared `SQLite` type onto its storage affinity.
fn normalize_sqlite_type(sqlite_type: &str) -> String {
    let normalized = sqlite_type.to_uppercase();
    let affinity: &str = if normalized.contains("INT") {
        "integer"
    } else if normalized.contains("REAL")
        || normalized.contains("FLOA")
        || normalized.contains("DOUB")
    {
        "real"
    } else if normalized.contains("BLOB") {
        "blob"
    } else {
        "text"
    };
    affinity.to_string()
}

/// An extension trait for `duct::Expression` that logs the command being run
/// before running it.
trait ExpressionExt {
    /// Run the command and log the command being run
    fn run_with_trace(&self) -> io::Result<Output>;
}

impl ExpressionExt for duct::Expression {
    fn run_with_trace(&self) -> io::Result<Output> {
        tracing::info!("running command: {:?}", self);
        self.run().inspect_err(|_| {
            // The command that was run may have scrolled off the screen, so repeat it here
            tracing::error!("failed to run command: {:?}", self);
        })
    }
}
