use crate::helpers::catalog::*;
use permshift::catalog::id::OperationKind;
use permshift::diff::PermissionChange;
use permshift::draft::{ApplySameField, PermissionDraft};
use permshift::error::{PermissionError, ValidationError};
use rstest::rstest;

fn with_target(
    draft: PermissionDraft,
    index: usize,
    table: &str,
    action: &str,
    role: &str,
) -> PermissionDraft {
    draft
        .set_apply_same(index, ApplySameField::Table, table)
        .unwrap()
        .set_apply_same(index, ApplySameField::Action, action)
        .unwrap()
        .set_apply_same(index, ApplySameField::Role, role)
        .unwrap()
}

fn apply(draft: PermissionDraft) -> PermissionChange {
    PermissionChange::ApplyToMany { draft }
}

#[test]
fn test_cross_table_clone_clears_columns_and_presets() {
    let catalog = blog_catalog();
    let draft = open_draft(&catalog, "articles", "editor", OperationKind::Insert);
    let draft = with_target(draft, 0, "authors", "insert", "writer");

    let migration = compile(&catalog, &apply(draft)).unwrap();

    assert_eq!(
        describe(&migration.forward),
        vec!["pg_create_insert_permission public.authors writer"]
    );
    let cloned = created_spec(&migration.forward[0]);
    assert!(cloned.columns.is_empty());
    assert!(cloned.set.is_empty());
    assert_eq!(cloned.check, Some(author_check()));
}

#[test]
fn test_same_table_clone_keeps_columns() {
    let catalog = blog_catalog();
    let draft = open_draft(&catalog, "articles", "editor", OperationKind::Insert);
    let draft = with_target(draft, 0, "public.articles", "insert", "writer");

    let migration = compile(&catalog, &apply(draft)).unwrap();

    let cloned = created_spec(&migration.forward[0]);
    assert_eq!(cloned.columns.len(), 2);
    assert_eq!(cloned.set.len(), 1);
}

#[rstest]
#[case::select_to_insert("user", OperationKind::Select, "insert")]
#[case::select_to_update("user", OperationKind::Select, "update")]
#[case::insert_to_select("editor", OperationKind::Insert, "select")]
#[case::insert_to_delete("editor", OperationKind::Insert, "delete")]
fn test_predicate_moves_to_target_slot(
    #[case] role: &str,
    #[case] from: OperationKind,
    #[case] to: &str,
) {
    let catalog = blog_catalog();
    let draft = open_draft(&catalog, "articles", role, from);
    let original = draft.current().and_then(|s| s.predicate(from)).cloned();
    assert!(original.is_some());

    let draft = with_target(draft, 0, "articles", to, "reviewer");
    let migration = compile(&catalog, &apply(draft)).unwrap();

    let to: OperationKind = to.parse().unwrap();
    let cloned = created_spec(&migration.forward[0]);
    assert_eq!(cloned.predicate(to).cloned(), original);
    match to {
        OperationKind::Insert => assert_eq!(cloned.filter, None),
        _ => assert_eq!(cloned.check, None),
    }
    assert_eq!(
        migration.forward[0].args["permission"]
            .as_object()
            .unwrap()
            .keys()
            .filter(|k| *k == "filter" || *k == "check")
            .count(),
        1
    );
    if to != OperationKind::Select {
        assert_eq!(cloned.limit, None);
    }
}

#[test]
fn test_existing_target_is_dropped_first_on_its_own_table() {
    let catalog = blog_catalog();
    let draft = open_draft(&catalog, "articles", "user", OperationKind::Select);
    let draft = with_target(draft, 0, "authors", "select", "user");

    let migration = compile(&catalog, &apply(draft)).unwrap();

    assert_eq!(migration.name, "apply_same_permissions_public_table_articles");
    assert_eq!(
        (
            migration.messages.pending.as_str(),
            migration.messages.success.as_str(),
            migration.messages.failure.as_str()
        ),
        (
            "Applying permissions",
            "Permission changes applied",
            "Permission changes failed"
        )
    );
    assert_eq!(
        describe(&migration.forward),
        vec![
            "pg_drop_select_permission public.authors user",
            "pg_create_select_permission public.authors user",
        ]
    );
    assert_eq!(
        describe(&migration.backward),
        vec![
            "pg_drop_select_permission public.authors user",
            "pg_create_select_permission public.authors user",
        ]
    );
    // the undo restores what authors had, not the edited articles spec
    let restored = created_spec(&migration.backward[1]);
    assert_eq!(
        restored.columns.iter().collect::<Vec<_>>(),
        vec!["id", "name"]
    );
}

#[test]
fn test_modified_draft_is_the_last_target() {
    let catalog = blog_catalog();
    let draft = open_draft(&catalog, "articles", "user", OperationKind::Select).set_limit(Some(5));
    let draft = with_target(draft, 0, "authors", "select", "editor");

    let migration = compile(&catalog, &apply(draft)).unwrap();

    assert_eq!(
        describe(&migration.forward),
        vec![
            "pg_create_select_permission public.authors editor",
            "pg_drop_select_permission public.articles user",
            "pg_create_select_permission public.articles user",
        ]
    );
    assert_eq!(created_spec(&migration.forward[2]).limit, Some(5));
}

#[test]
fn test_incomplete_rows_are_skipped() {
    let catalog = blog_catalog();
    let draft = open_draft(&catalog, "articles", "user", OperationKind::Select);
    let draft = with_target(draft, 0, "authors", "select", "");

    assert_eq!(
        compile(&catalog, &apply(draft)).unwrap_err(),
        PermissionError::Validation(ValidationError::NoTargets("targets"))
    );
}

#[test]
fn test_unknown_action_is_rejected() {
    let catalog = blog_catalog();
    let draft = open_draft(&catalog, "articles", "user", OperationKind::Select);
    let draft = with_target(draft, 0, "authors", "upsert", "editor");

    let err = compile(&catalog, &apply(draft)).unwrap_err();
    assert!(matches!(
        err,
        PermissionError::Validation(ValidationError::InvalidTarget { index: 0, .. })
    ));
}

#[test]
fn test_new_row_is_seeded_from_the_draft() {
    let catalog = blog_catalog();
    let draft = open_draft(&catalog, "articles", "user", OperationKind::Select)
        .set_apply_same(0, ApplySameField::Role, "editor")
        .unwrap();

    let row = &draft.apply_same.rows()[0];
    assert_eq!(row.table, "public.articles");
    assert_eq!(row.action, "select");

    let migration = compile(&catalog, &apply(draft)).unwrap();
    assert_eq!(
        describe(&migration.forward),
        vec!["pg_create_select_permission public.articles editor"]
    );
}
