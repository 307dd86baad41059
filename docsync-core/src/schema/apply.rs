//! Execution of schema changes against a [`StoreBackend`].

use serde::Serialize;
use tracing::{debug, warn};

use crate::{
    backend::StoreBackend,
    error::{DocSyncError, DocSyncResult},
    schema::model::{Change, ChangeType, SchemaItem},
};

/// Final line recorded after a successful apply.
pub const DONE_LINE: &str = "Done.";

/// Outcome of [`ChangeApplier::apply`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    /// Whether the store was left untouched.
    pub dry_run: bool,
    /// One description per change, in list order, plus [`DONE_LINE`] after a real apply.
    pub lines: Vec<String>,
    /// Number of changes processed successfully (always zero for dry runs).
    pub applied: usize,
}

/// Applies change lists produced by [`diff`](crate::schema::diff::diff).
///
/// Changes run strictly in order, each one awaited before the next. The first
/// store failure stops the run and nothing already applied is rolled back.
#[derive(Debug)]
pub struct ChangeApplier<'a, B: StoreBackend> {
    backend: &'a B,
}

impl<'a, B: StoreBackend> ChangeApplier<'a, B> {
    pub fn new(backend: &'a B) -> Self {
        Self { backend }
    }

    /// Renders the dry-run description of every change that has one.
    pub fn describe(changes: &[Change]) -> Vec<String> {
        changes.iter().filter_map(Change::describe).collect()
    }

    /// Applies `changes`, or only describes them when `dry_run` is set.
    ///
    /// # Errors
    ///
    /// Returns [`DocSyncError::Validation`], in both modes and before any store
    /// call, when an index to create or drop is not attached to a table.
    /// Returns [`DocSyncError::ApplyHalted`] wrapping the first store error,
    /// listing the descriptions of the changes that were applied before it.
    pub async fn apply(&self, changes: &[Change], dry_run: bool) -> DocSyncResult<ApplyReport> {
        Self::check_attached(changes)?;

        if dry_run {
            return Ok(ApplyReport {
                dry_run,
                lines: Self::describe(changes),
                applied: 0,
            });
        }

        let mut report = ApplyReport::default();

        for change in changes {
            let line = change.describe();

            if let Err(err) = self.apply_change(change).await {
                return Err(DocSyncError::ApplyHalted {
                    applied: report.lines,
                    source: Box::new(err),
                });
            }

            report.lines.extend(line);
            report.applied += 1;
        }

        report.lines.push(DONE_LINE.to_string());

        Ok(report)
    }

    fn check_attached(changes: &[Change]) -> DocSyncResult<()> {
        let detached = changes.iter().find_map(|change| match (change.item(), change.change_type()) {
            (SchemaItem::Index(index), ChangeType::New | ChangeType::ToDelete)
                if index.table().is_empty() => Some(index),
            _ => None,
        });

        match detached {
            Some(index) => Err(DocSyncError::validation(format!(
                "Index {} is not attached to a table",
                index.name()
            ))),
            None => Ok(()),
        }
    }

    async fn apply_change(&self, change: &Change) -> DocSyncResult<()> {
        debug!(
            kind = change.item().kind(),
            name = change.item().name(),
            change_type = ?change.change_type(),
            "applying schema change"
        );

        match (change.item(), change.change_type()) {
            (_, ChangeType::NoChange) => Ok(()),
            (item, ChangeType::Modified) => {
                warn!(
                    kind = item.kind(),
                    name = item.name(),
                    "change unsupported: {}",
                    change.describe().unwrap_or_default()
                );
                Ok(())
            }
            // collections are created by their first index
            (SchemaItem::Table(_), ChangeType::New) => Ok(()),
            (SchemaItem::Table(table), ChangeType::ToDelete) => {
                self.backend.drop_table(table.name()).await
            }
            (SchemaItem::Index(index), ChangeType::New) => {
                self.backend.create_index(index).await
            }
            (SchemaItem::Index(index), ChangeType::ToDelete) => {
                self.backend
                    .drop_index(index.table(), index.name())
                    .await
            }
        }
    }
}
