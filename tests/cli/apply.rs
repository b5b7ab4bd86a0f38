use crate::helpers::cli::CliTestHelper;
use anyhow::Result;
use permshift::catalog::Catalog;
use permshift::catalog::id::OperationKind;
use permshift::migration::CompiledMigration;
use predicates::prelude::*;

const DELETE_USER_SELECT: &str = r#"
change: delete
table: articles
role: user
action: select
"#;

fn snapshot(helper: &CliTestHelper) -> Result<Catalog> {
    Catalog::load(&helper.path("metadata.yaml"))
}

#[test]
fn test_dry_run_leaves_snapshot_alone() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("delete.yaml", DELETE_USER_SELECT)?;
    let before = helper.read_file("metadata.yaml")?;

    helper
        .command()
        .args(["apply", "delete.yaml", "--dry-run"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "pg_drop_select_permission public.articles user",
        ))
        .stdout(predicate::str::contains("Dry run completed"));

    assert_eq!(helper.read_file("metadata.yaml")?, before);
    assert!(helper.migration_dirs()?.is_empty());
    Ok(())
}

#[test]
fn test_apply_updates_snapshot_and_writes_migration() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("delete.yaml", DELETE_USER_SELECT)?;

    helper
        .command()
        .args(["apply", "delete.yaml", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Permissions deleted"));

    let catalog = snapshot(&helper)?;
    let articles = &catalog.tables[0];
    assert!(articles.permission("user", OperationKind::Select).is_none());
    assert!(articles.permission("admin", OperationKind::Select).is_some());

    let dirs = helper.migration_dirs()?;
    assert_eq!(dirs.len(), 1);
    let dir_name = dirs[0].file_name().unwrap().to_string_lossy().into_owned();
    assert!(dir_name.ends_with("_delete_permission_user_public_table_articles"));

    let up: Vec<serde_json::Value> =
        serde_yaml::from_str(&std::fs::read_to_string(dirs[0].join("up.yaml"))?)?;
    let down: Vec<serde_json::Value> =
        serde_yaml::from_str(&std::fs::read_to_string(dirs[0].join("down.yaml"))?)?;
    assert_eq!(up[0]["type"], "pg_drop_select_permission");
    assert_eq!(down[0]["type"], "pg_create_select_permission");
    assert_eq!(down[0]["args"]["permission"]["limit"], 10);
    Ok(())
}

#[test]
fn test_apply_without_confirmation_is_refused() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("delete.yaml", DELETE_USER_SELECT)?;
    let before = helper.read_file("metadata.yaml")?;

    helper
        .command()
        .args(["apply", "delete.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Refusing to apply"))
        .stderr(predicate::str::contains("--yes"));

    assert_eq!(helper.read_file("metadata.yaml")?, before);
    Ok(())
}

#[test]
fn test_apply_no_op_request() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file(
        "delete.yaml",
        r#"
change: delete
table: authors
role: user
action: delete
"#,
    )?;

    helper
        .command()
        .args(["apply", "delete.yaml", "--yes"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No permission changes"));

    assert!(helper.migration_dirs()?.is_empty());
    Ok(())
}

#[test]
fn test_config_file_disables_migration_files() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file(
        "permshift.yaml",
        r#"
migrations:
  write_files: false
"#,
    )?;
    helper.write_file(
        "grant.yaml",
        r#"
change: bulk_grant
table: authors
roles: [reviewer]
"#,
    )?;

    helper
        .command()
        .args(["apply", "grant.yaml", "-y"])
        .assert()
        .success();

    assert!(!helper.path("migrations").exists());
    let catalog = snapshot(&helper)?;
    for kind in OperationKind::ALL {
        assert!(catalog.tables[1].permission("reviewer", kind).is_some());
    }
    Ok(())
}

#[test]
fn test_apply_then_revert_from_down_file() -> Result<()> {
    let helper = CliTestHelper::new()?;
    let original = snapshot(&helper)?;
    helper.write_file(
        "copy.yaml",
        r#"
change: copy_role
from_role: admin
action: update
to_roles: [editor]
"#,
    )?;

    let output = helper
        .command()
        .args(["compile", "copy.yaml", "--format", "json"])
        .output()?;
    let compiled: CompiledMigration = serde_json::from_slice(&output.stdout)?;

    helper
        .command()
        .args(["apply", "copy.yaml", "--yes"])
        .assert()
        .success();

    let dirs = helper.migration_dirs()?;
    let down: Vec<serde_json::Value> =
        serde_yaml::from_str(&std::fs::read_to_string(dirs[0].join("down.yaml"))?)?;
    assert_eq!(down.len(), compiled.backward.len());

    let applied = snapshot(&helper)?;
    assert!(
        applied.tables[0]
            .permission("editor", OperationKind::Update)
            .is_some()
    );
    assert_ne!(applied, original);
    Ok(())
}
