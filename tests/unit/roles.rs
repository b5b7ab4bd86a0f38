use crate::helpers::catalog::*;
use permshift::catalog::Catalog;
use permshift::catalog::id::OperationKind;
use permshift::catalog::permission::PermissionSpec;
use permshift::catalog::table::Table;
use permshift::diff::{ActionScope, PermissionChange, TableScope};
use permshift::error::{PermissionError, ValidationError};

#[test]
fn test_delete_role_globally_covers_every_held_permission() {
    let mut t1 = Table::new("public", "t1");
    t1.set_permission("admin", OperationKind::Select, PermissionSpec::default());
    t1.set_permission("user", OperationKind::Select, PermissionSpec::default());
    let mut t2 = Table::new("public", "t2");
    t2.set_permission("admin", OperationKind::Update, PermissionSpec::default());
    let catalog = Catalog::new(vec![t1, t2, Table::new("public", "t3")]);

    let migration = compile(
        &catalog,
        &PermissionChange::DeleteRoleGlobally {
            role: "admin".to_string(),
        },
    )
    .unwrap();

    assert_eq!(migration.name, "delete_role_admin");
    assert_eq!(migration.messages.success, "Role Deleted");
    assert_eq!(
        describe(&migration.forward),
        vec![
            "pg_drop_select_permission public.t1 admin",
            "pg_drop_update_permission public.t2 admin",
        ]
    );
    assert_eq!(
        describe(&migration.backward),
        vec![
            "pg_create_update_permission public.t2 admin",
            "pg_create_select_permission public.t1 admin",
        ]
    );
}

#[test]
fn test_delete_role_globally_stays_in_current_schema() {
    let catalog = blog_catalog();
    let migration = compile(
        &catalog,
        &PermissionChange::DeleteRoleGlobally {
            role: "admin".to_string(),
        },
    )
    .unwrap();

    let forward = describe(&migration.forward);
    assert_eq!(forward.len(), 3);
    assert!(forward.iter().all(|op| !op.contains("audit.events")));
}

#[test]
fn test_delete_unknown_role_is_empty() {
    let migration = compile(
        &blog_catalog(),
        &PermissionChange::DeleteRoleGlobally {
            role: "nobody".to_string(),
        },
    )
    .unwrap();
    assert!(migration.is_empty());
}

#[test]
fn test_remove_role_from_table() {
    let catalog = blog_catalog();
    let migration = compile(
        &catalog,
        &PermissionChange::RemoveRole {
            table: table_ref("articles"),
            role: "admin".to_string(),
        },
    )
    .unwrap();

    assert_eq!(migration.name, "remove_permission_admin_public_table_articles");
    assert_eq!(migration.messages.success, "Permission removed");
    assert_eq!(
        describe(&migration.forward),
        vec![
            "pg_drop_select_permission public.articles admin",
            "pg_drop_update_permission public.articles admin",
        ]
    );
}

#[test]
fn test_remove_role_with_empty_name_is_rejected() {
    let err = compile(
        &blog_catalog(),
        &PermissionChange::RemoveRole {
            table: table_ref("articles"),
            role: String::new(),
        },
    )
    .unwrap_err();
    assert_eq!(err, PermissionError::Validation(ValidationError::EmptyRole));
}

#[test]
fn test_copy_role_replaces_destination_permissions() {
    let catalog = blog_catalog();
    let migration = compile(
        &catalog,
        &PermissionChange::CopyRole {
            from_role: "user".to_string(),
            tables: TableScope::One(table_ref("articles")),
            actions: ActionScope::All,
            to_roles: vec!["editor".to_string()],
        },
    )
    .unwrap();

    assert_eq!(
        migration.name,
        "copy_role_user_all_query_permissions_for_public_articles_table_to_editor"
    );
    assert_eq!(
        (
            migration.messages.pending.as_str(),
            migration.messages.success.as_str(),
            migration.messages.failure.as_str()
        ),
        (
            "Copying permissions",
            "Permissions copied",
            "Permissions copy failed"
        )
    );
    assert_eq!(
        describe(&migration.forward),
        vec![
            "pg_create_select_permission public.articles editor",
            "pg_drop_insert_permission public.articles editor",
        ]
    );

    let copied = created_spec(&migration.forward[0]);
    assert_eq!(copied.filter, Some(published_filter()));
    assert_eq!(copied.limit, Some(10));
}

#[test]
fn test_copy_role_across_schema_for_one_action() {
    let catalog = blog_catalog();
    let migration = compile(
        &catalog,
        &PermissionChange::CopyRole {
            from_role: "admin".to_string(),
            tables: TableScope::All,
            actions: ActionScope::One(OperationKind::Update),
            to_roles: vec!["editor".to_string(), "writer".to_string()],
        },
    )
    .unwrap();

    assert_eq!(
        migration.name,
        "copy_role_admin_update_query_permissions_for_all_table_to_editor_writer"
    );
    assert_eq!(
        describe(&migration.forward),
        vec![
            "pg_create_update_permission public.articles editor",
            "pg_create_update_permission public.articles writer",
            "pg_create_update_permission public.authors editor",
            "pg_create_update_permission public.authors writer",
        ]
    );
}

#[test]
fn test_copy_role_without_destinations_is_rejected() {
    let err = compile(
        &blog_catalog(),
        &PermissionChange::CopyRole {
            from_role: "admin".to_string(),
            tables: TableScope::All,
            actions: ActionScope::All,
            to_roles: vec![],
        },
    )
    .unwrap_err();
    assert_eq!(
        err,
        PermissionError::Validation(ValidationError::NoTargets("roles"))
    );
}

#[test]
fn test_copy_role_collapses_duplicate_destinations() {
    let catalog = blog_catalog();
    let migration = compile(
        &catalog,
        &PermissionChange::CopyRole {
            from_role: "admin".to_string(),
            tables: TableScope::One(table_ref("articles")),
            actions: ActionScope::One(OperationKind::Update),
            to_roles: vec!["reviewer".to_string(), "reviewer ".to_string()],
        },
    )
    .unwrap();

    assert_eq!(
        migration.name,
        "copy_role_admin_update_query_permissions_for_public_articles_table_to_reviewer"
    );
    assert_eq!(
        describe(&migration.forward),
        vec!["pg_create_update_permission public.articles reviewer"]
    );
}
