use crate::helpers::cli::CliTestHelper;
use anyhow::Result;
use permshift::migration::CompiledMigration;
use predicates::prelude::*;

const GRANT_EDITOR: &str = r#"
change: save
table: authors
role: editor
action: select
permission:
  columns: [id]
  filter: {}
"#;

#[test]
fn test_compile_summary() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("grant.yaml", GRANT_EDITOR)?;

    helper
        .command()
        .args(["compile", "grant.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Migration update_permission_editor_public_table_authors",
        ))
        .stdout(predicate::str::contains(
            "pg_create_select_permission public.authors editor",
        ))
        .stdout(predicate::str::contains(
            "pg_drop_select_permission public.authors editor",
        ));

    // compiling never touches the snapshot
    assert!(!helper.read_file("metadata.yaml")?.contains("editor"));
    Ok(())
}

#[test]
fn test_compile_json_is_a_migration() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file(
        "revoke.yaml",
        r#"
change: bulk_revoke
table: articles
roles: [admin]
"#,
    )?;

    let output = helper
        .command()
        .args(["compile", "revoke.yaml", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let migration: CompiledMigration = serde_json::from_slice(&output.stdout)?;
    assert_eq!(migration.name, "remove_roles_public_table_articles");
    assert_eq!(migration.forward.len(), 2);
    assert!(migration.is_balanced());
    assert!(
        migration
            .forward
            .iter()
            .all(|op| op.op_type.starts_with("pg_drop_"))
    );
    Ok(())
}

#[test]
fn test_compile_to_output_file() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("grant.yaml", GRANT_EDITOR)?;

    helper
        .command()
        .args(["compile", "grant.yaml", "--format", "yaml", "--output", "out.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    let migration: CompiledMigration = serde_yaml::from_str(&helper.read_file("out.yaml")?)?;
    assert_eq!(migration.forward.len(), 1);
    assert_eq!(migration.forward[0].args["source"], "default");
    Ok(())
}

#[test]
fn test_compile_rejects_empty_role() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file(
        "remove.yaml",
        r#"
change: remove_role
table: articles
role: ""
"#,
    )?;

    helper
        .command()
        .args(["compile", "remove.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Role name cannot be empty"));
    Ok(())
}

#[test]
fn test_compile_missing_request_file() -> Result<()> {
    let helper = CliTestHelper::new()?;

    helper
        .command()
        .args(["compile", "nope.yaml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Failed to read change request"));
    Ok(())
}
