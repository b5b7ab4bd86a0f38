use crate::helpers::cli::{CliTestHelper, SNAPSHOT};
use anyhow::Result;
use predicates::prelude::*;

#[test]
fn test_show_lists_every_table() -> Result<()> {
    let helper = CliTestHelper::new()?;

    helper
        .command()
        .arg("show")
        .assert()
        .success()
        .stdout(predicate::str::contains("public.articles"))
        .stdout(predicate::str::contains("public.authors"))
        .stdout(predicate::str::contains("2 columns, filter, limit 10"))
        .stdout(predicate::str::contains("Roles: admin, user"));
    Ok(())
}

#[test]
fn test_show_filters_by_role() -> Result<()> {
    let helper = CliTestHelper::new()?;

    helper
        .command()
        .args(["show", "--role", "user"])
        .assert()
        .success()
        .stdout(predicate::str::contains("user"))
        .stdout(predicate::str::contains("admin").not())
        .stdout(predicate::str::contains("public.authors").not())
        .stdout(predicate::str::contains("Roles:").not());
    Ok(())
}

#[test]
fn test_show_json() -> Result<()> {
    let helper = CliTestHelper::new()?;

    let output = helper
        .command()
        .args(["show", "--table", "articles", "--format", "json"])
        .output()?;
    assert!(output.status.success());

    let rows: serde_json::Value = serde_json::from_slice(&output.stdout)?;
    let rows = rows.as_array().expect("array of permissions");
    assert_eq!(rows.len(), 3);
    assert!(rows.iter().all(|r| r["table"] == "public.articles"));
    assert_eq!(rows[0]["role"], "user");
    assert_eq!(rows[0]["permission"]["limit"], 10);
    Ok(())
}

#[test]
fn test_show_unknown_table_fails() -> Result<()> {
    let helper = CliTestHelper::new()?;

    helper
        .command()
        .args(["show", "--table", "ghosts"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "Table public.ghosts not found in schema snapshot",
        ));
    Ok(())
}

#[test]
fn test_show_reads_snapshot_from_flag() -> Result<()> {
    let helper = CliTestHelper::new()?;
    helper.write_file("meta/perms.yaml", SNAPSHOT)?;
    std::fs::remove_file(helper.path("metadata.yaml"))?;

    helper
        .command()
        .arg("show")
        .assert()
        .failure();

    helper
        .command()
        .args(["show", "--snapshot-file", "meta/perms.yaml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("public.articles"));
    Ok(())
}
