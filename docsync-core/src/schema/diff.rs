//! Comparison of a desired schema against the schema found in a live store.

use crate::schema::model::{Change, ChangeType, Schema, Table};

/// Computes the ordered list of changes that turns `actual` into `desired`.
///
/// Changes are emitted in three phases, walking tables in name order:
///
/// 1. for every desired table the store lacks, a `New` table change followed
///    by a `New` change for each of its indexes;
/// 2. for tables present on both sides, the output of [`diff_table`];
/// 3. a `ToDelete` change for every stored table absent from `desired`.
///
/// Dropped tables take their indexes with them, so those indexes are not
/// listed separately.
pub fn diff(desired: &Schema, actual: &Schema) -> Vec<Change> {
    let mut changes = Vec::new();

    for table in desired.tables().filter(|table| !actual.contains(table.name())) {
        changes.push(Change::table(table.clone(), ChangeType::New));
        changes.extend(
            table
                .indexes()
                .iter()
                .map(|index| Change::index(index.clone(), ChangeType::New)),
        );
    }

    for table in desired.tables() {
        if let Some(existing) = actual.get(table.name()) {
            changes.extend(diff_table(table, existing));
        }
    }

    changes.extend(
        actual
            .tables()
            .filter(|table| !desired.contains(table.name()))
            .map(|table| Change::table(table.clone(), ChangeType::ToDelete)),
    );

    changes
}

/// Compares the indexes of one table present on both sides.
///
/// Indexes are matched by name only: an index whose columns changed but whose
/// name did not is reported as unchanged. Creations come before deletions.
pub fn diff_table(desired: &Table, actual: &Table) -> Vec<Change> {
    let created = desired
        .indexes()
        .iter()
        .filter(|index| !actual.has_index(index.name()))
        .map(|index| Change::index(index.clone(), ChangeType::New));

    let dropped = actual
        .indexes()
        .iter()
        .filter(|index| !desired.has_index(index.name()))
        .map(|index| Change::index(index.clone(), ChangeType::ToDelete));

    created.chain(dropped).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::model::{Index, SchemaItem};

    fn users() -> Table {
        Table::new("odm-users")
            .with_primary_key(["id"])
            .with_index(Index::named("hometown-age", ["hometown", "age"]))
    }

    fn summary(changes: &[Change]) -> Vec<(ChangeType, &'static str, String)> {
        changes
            .iter()
            .map(|change| {
                (
                    change.change_type(),
                    change.item().kind(),
                    change.item().name().to_string(),
                )
            })
            .collect()
    }

    #[test]
    fn new_table_cascades_its_indexes() {
        let desired = Schema::from_iter([users()]);
        let changes = diff(&desired, &Schema::new());

        assert_eq!(
            summary(&changes),
            vec![
                (ChangeType::New, "table", "odm-users".to_string()),
                (ChangeType::New, "index", "primary_key".to_string()),
                (ChangeType::New, "index", "hometown_age".to_string()),
            ]
        );
    }

    #[test]
    fn identical_schemas_produce_nothing() {
        let schema = Schema::from_iter([users()]);
        assert!(diff(&schema, &schema.clone()).is_empty());
    }

    #[test]
    fn same_index_name_with_other_columns_is_unchanged() {
        let desired = Schema::from_iter([users()]);
        let actual = Schema::from_iter([Table::new("odm-users")
            .with_index(Index::named(crate::schema::model::PRIMARY_KEY_INDEX, ["id"]))
            .with_index(Index::named("hometown_age", ["wage"]))]);

        assert!(diff(&desired, &actual).is_empty());
    }

    #[test]
    fn index_creations_precede_deletions() {
        let desired = Schema::from_iter([users()]);
        let actual = Schema::from_iter([Table::new("odm-users")
            .with_primary_key(["id"])
            .with_index(Index::new(["alias"]))]);

        let changes = diff(&desired, &actual);
        assert_eq!(
            summary(&changes),
            vec![
                (ChangeType::New, "index", "hometown_age".to_string()),
                (ChangeType::ToDelete, "index", "alias".to_string()),
            ]
        );
        assert_eq!(changes[1].item().table_name(), "odm-users");
    }

    #[test]
    fn stored_only_table_is_dropped_without_its_indexes() {
        let actual = Schema::from_iter([Table::new("legacy")
            .with_primary_key(["id"])
            .with_index(Index::new(["code"]))]);

        let changes = diff(&Schema::new(), &actual);
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].change_type(), ChangeType::ToDelete);
        assert!(matches!(changes[0].item(), SchemaItem::Table(table) if table.name() == "legacy"));
    }

    #[test]
    fn table_drops_come_last() {
        let desired = Schema::from_iter([users(), Table::new("zeta").with_primary_key(["id"])]);
        let actual = Schema::from_iter([
            Table::new("alpha").with_primary_key(["id"]),
            Table::new("zeta").with_primary_key(["id"]),
        ]);

        assert_eq!(
            summary(&diff(&desired, &actual)),
            vec![
                (ChangeType::New, "table", "odm-users".to_string()),
                (ChangeType::New, "index", "primary_key".to_string()),
                (ChangeType::New, "index", "hometown_age".to_string()),
                (ChangeType::ToDelete, "table", "alpha".to_string()),
            ]
        );
    }

    #[test]
    fn new_tables_come_before_index_comparisons() {
        let desired = Schema::from_iter([
            Table::new("alpha").with_primary_key(["id"]),
            Table::new("beta").with_primary_key(["id"]),
        ]);
        let actual = Schema::from_iter([Table::new("alpha").with_index(Index::new(["code"]))]);

        assert_eq!(
            summary(&diff(&desired, &actual)),
            vec![
                (ChangeType::New, "table", "beta".to_string()),
                (ChangeType::New, "index", "primary_key".to_string()),
                (ChangeType::New, "index", "primary_key".to_string()),
                (ChangeType::ToDelete, "index", "code".to_string()),
            ]
        );
    }

    #[test]
    fn never_reports_modified() {
        let desired = Schema::from_iter([users()]);
        let actual = Schema::from_iter([Table::new("odm-users").with_primary_key(["uuid"])]);

        assert!(diff(&desired, &actual)
            .iter()
            .all(|change| change.change_type() != ChangeType::Modified));
    }
}
