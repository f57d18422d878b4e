use indexmap::IndexMap;
use std::collections::HashMap;

use crate::db::LineItemStore;
use crate::error::{AppError, AppResult};
use crate::models::{LineItem, ProposedLineItem};

/// What to do with proposed item ids that are not children of the parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ForeignIdPolicy {
    /// Drop the entry and log it.
    #[default]
    Ignore,
    /// Fail the whole write with `AppError::NotOwnedReference`.
    Reject,
}

impl ForeignIdPolicy {
    pub fn from_config(reject_foreign_ids: bool) -> Self {
        if reject_foreign_ids {
            Self::Reject
        } else {
            Self::Ignore
        }
    }
}

/// Mutations that turn the stored children into the proposed list.
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilePlan<F> {
    /// Existing rows with their replacement fields, in proposal order.
    pub updates: Vec<LineItem<F>>,
    pub inserts: Vec<F>,
    pub deletes: Vec<i64>,
    /// Proposed ids that are not children of the parent.
    pub ignored: Vec<i64>,
}

impl<F> ReconcilePlan<F> {
    /// Diff `proposed` against `existing`. Only rows owned by `parent_id`
    /// can be matched or deleted. A repeated id keeps its first position and
    /// its last fields.
    pub fn build(parent_id: i64, existing: &[LineItem<F>], proposed: Vec<ProposedLineItem<F>>) -> Self {
        let owned: HashMap<i64, &LineItem<F>> = existing
            .iter()
            .filter(|item| item.parent_id == parent_id)
            .map(|item| (item.id, item))
            .collect();

        let mut updates: IndexMap<i64, LineItem<F>> = IndexMap::new();
        let mut inserts = Vec::new();
        let mut ignored = Vec::new();

        for entry in proposed {
            match entry.id {
                Some(id) => match owned.get(&id) {
                    Some(current) => {
                        updates.insert(id, current.with_fields(entry.fields));
                    }
                    None => ignored.push(id),
                },
                None => inserts.push(entry.fields),
            }
        }

        let deletes = existing
            .iter()
            .filter(|item| item.parent_id == parent_id && !updates.contains_key(&item.id))
            .map(|item| item.id)
            .collect();

        Self {
            updates: updates.into_values().collect(),
            inserts,
            deletes,
            ignored,
        }
    }
}

/// Result of applying a plan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileOutcome {
    /// Ids of the updated rows followed by the newly inserted ones.
    pub kept: Vec<i64>,
    pub updated: usize,
    pub inserted: usize,
    pub deleted: u64,
    pub ignored: Vec<i64>,
}

/// Make the children of `parent_id` match `proposed`.
///
/// Applies updates, then inserts, then deletions through `store`. The caller
/// owns the transaction; with `ForeignIdPolicy::Reject` the error is raised
/// before anything is written.
pub async fn reconcile<S, F>(
    store: &mut S,
    parent_id: i64,
    proposed: Vec<ProposedLineItem<F>>,
    policy: ForeignIdPolicy,
) -> AppResult<ReconcileOutcome>
where
    S: LineItemStore<F> + ?Sized,
    F: Send + Sync + 'static,
{
    let existing = store.list_children(parent_id).await?;
    let plan = ReconcilePlan::build(parent_id, &existing, proposed);

    if !plan.ignored.is_empty() {
        match policy {
            ForeignIdPolicy::Reject => return Err(AppError::NotOwnedReference(plan.ignored)),
            ForeignIdPolicy::Ignore => tracing::warn!(
                "Parent {} ignoring line items it does not own: {:?}",
                parent_id,
                plan.ignored
            ),
        }
    }

    let mut kept = Vec::with_capacity(plan.updates.len() + plan.inserts.len());
    for item in &plan.updates {
        store.update(item).await?;
        kept.push(item.id);
    }
    for fields in &plan.inserts {
        kept.push(store.insert(parent_id, fields).await?);
    }

    let deleted = if plan.deletes.is_empty() {
        0
    } else {
        store.delete_many(parent_id, &plan.deletes).await?
    };

    tracing::info!(
        "Parent {} line items reconciled: {} updated, {} inserted, {} deleted",
        parent_id,
        plan.updates.len(),
        plan.inserts.len(),
        deleted
    );

    Ok(ReconcileOutcome {
        kept,
        updated: plan.updates.len(),
        inserted: plan.inserts.len(),
        deleted,
        ignored: plan.ignored,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::QuotationLine;
    use async_trait::async_trait;
    use bigdecimal::BigDecimal;
    use std::collections::BTreeMap;

    /// Line items of every parent, keyed by id.
    #[derive(Default)]
    struct MemoryStore {
        rows: BTreeMap<i64, LineItem<QuotationLine>>,
        next_id: i64,
        fail_deletes: bool,
    }

    impl MemoryStore {
        fn seed(&mut self, parent_id: i64, description: &str, price: i64) -> i64 {
            self.next_id += 1;
            let id = self.next_id;
            self.rows.insert(
                id,
                LineItem {
                    id,
                    parent_id,
                    fields: line(id as i32, description, price),
                },
            );
            id
        }

        fn children(&self, parent_id: i64) -> Vec<LineItem<QuotationLine>> {
            self.rows
                .values()
                .filter(|item| item.parent_id == parent_id)
                .cloned()
                .collect()
        }
    }

    #[async_trait]
    impl LineItemStore<QuotationLine> for MemoryStore {
        async fn list_children(
            &mut self,
            parent_id: i64,
        ) -> Result<Vec<LineItem<QuotationLine>>, sqlx::Error> {
            Ok(self.children(parent_id))
        }

        async fn update(&mut self, item: &LineItem<QuotationLine>) -> Result<(), sqlx::Error> {
            match self.rows.get_mut(&item.id) {
                Some(row) if row.parent_id == item.parent_id => {
                    *row = item.clone();
                    Ok(())
                }
                _ => Err(sqlx::Error::RowNotFound),
            }
        }

        async fn insert(&mut self, parent_id: i64, fields: &QuotationLine) -> Result<i64, sqlx::Error> {
            self.next_id += 1;
            let id = self.next_id;
            self.rows.insert(
                id,
                LineItem {
                    id,
                    parent_id,
                    fields: fields.clone(),
                },
            );
            Ok(id)
        }

        async fn delete_many(&mut self, parent_id: i64, ids: &[i64]) -> Result<u64, sqlx::Error> {
            if self.fail_deletes {
                return Err(sqlx::Error::PoolTimedOut);
            }
            let before = self.rows.len();
            self.rows
                .retain(|id, item| !(item.parent_id == parent_id && ids.contains(id)));
            Ok((before - self.rows.len()) as u64)
        }
    }

    fn line(sl_no: i32, description: &str, price: i64) -> QuotationLine {
        QuotationLine {
            sl_no,
            description: description.to_string(),
            price: BigDecimal::from(price),
        }
    }

    fn descriptions(store: &MemoryStore, parent_id: i64) -> Vec<String> {
        let mut out: Vec<String> = store
            .children(parent_id)
            .into_iter()
            .map(|item| item.fields.description)
            .collect();
        out.sort();
        out
    }

    #[tokio::test]
    async fn updates_inserts_and_deletes_in_one_pass() {
        let mut store = MemoryStore::default();
        let a = store.seed(1, "a", 10);
        let b = store.seed(1, "b", 20);

        let outcome = reconcile(
            &mut store,
            1,
            vec![
                ProposedLineItem::existing(a, line(1, "a2", 15)),
                ProposedLineItem::new(line(2, "c", 5)),
            ],
            ForeignIdPolicy::Ignore,
        )
        .await
        .unwrap();

        assert_eq!(outcome.updated, 1);
        assert_eq!(outcome.inserted, 1);
        assert_eq!(outcome.deleted, 1);
        assert_eq!(outcome.kept.len(), 2);
        assert_eq!(outcome.kept[0], a);

        let children = store.children(1);
        assert_eq!(children.len(), 2);
        assert!(children.iter().all(|item| item.id != b));
        let updated = children.iter().find(|item| item.id == a).unwrap();
        assert_eq!(updated.fields.description, "a2");
        assert_eq!(updated.fields.price, BigDecimal::from(15));
        assert_eq!(descriptions(&store, 1), vec!["a2", "c"]);
    }

    #[tokio::test]
    async fn unknown_id_is_ignored_without_creating_anything() {
        let mut store = MemoryStore::default();
        let a = store.seed(1, "a", 10);

        let outcome = reconcile(
            &mut store,
            1,
            vec![
                ProposedLineItem::existing(a, line(1, "a", 10)),
                ProposedLineItem::existing(999, line(2, "ghost", 1)),
            ],
            ForeignIdPolicy::Ignore,
        )
        .await
        .unwrap();

        assert_eq!(outcome.ignored, vec![999]);
        assert_eq!(outcome.inserted, 0);
        assert_eq!(outcome.deleted, 0);
        assert_eq!(descriptions(&store, 1), vec!["a"]);
        assert!(!store.rows.contains_key(&999));
    }

    #[tokio::test]
    async fn another_parents_item_is_left_alone() {
        let mut store = MemoryStore::default();
        let mine = store.seed(1, "mine", 10);
        let theirs = store.seed(2, "theirs", 20);

        let outcome = reconcile(
            &mut store,
            1,
            vec![ProposedLineItem::existing(theirs, line(1, "hijacked", 0))],
            ForeignIdPolicy::Ignore,
        )
        .await
        .unwrap();

        assert_eq!(outcome.ignored, vec![theirs]);
        assert!(store.children(1).is_empty(), "item {} should be deleted", mine);
        let other = store.rows.get(&theirs).unwrap();
        assert_eq!(other.parent_id, 2);
        assert_eq!(other.fields.description, "theirs");
        assert_eq!(other.fields.price, BigDecimal::from(20));
    }

    #[tokio::test]
    async fn reject_policy_fails_before_writing() {
        let mut store = MemoryStore::default();
        let a = store.seed(1, "a", 10);
        store.seed(2, "other", 20);

        let err = reconcile(
            &mut store,
            1,
            vec![
                ProposedLineItem::existing(a, line(1, "changed", 11)),
                ProposedLineItem::existing(2, line(2, "other", 20)),
                ProposedLineItem::new(line(3, "new", 1)),
            ],
            ForeignIdPolicy::Reject,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::NotOwnedReference(ref ids) if ids == &vec![2]));
        assert_eq!(descriptions(&store, 1), vec!["a"]);
        assert_eq!(store.rows.len(), 2);
    }

    #[tokio::test]
    async fn empty_proposal_deletes_every_child() {
        let mut store = MemoryStore::default();
        store.seed(1, "a", 10);
        store.seed(1, "b", 20);
        store.seed(2, "kept elsewhere", 30);

        let outcome = reconcile(&mut store, 1, Vec::new(), ForeignIdPolicy::Ignore)
            .await
            .unwrap();

        assert_eq!(outcome.deleted, 2);
        assert!(outcome.kept.is_empty());
        assert!(store.children(1).is_empty());
        assert_eq!(store.children(2).len(), 1);
    }

    #[tokio::test]
    async fn new_parent_gets_every_item_inserted() {
        let mut store = MemoryStore::default();

        let outcome = reconcile(
            &mut store,
            7,
            vec![
                ProposedLineItem::new(line(1, "x", 1)),
                ProposedLineItem::new(line(2, "y", 2)),
            ],
            ForeignIdPolicy::Ignore,
        )
        .await
        .unwrap();

        assert_eq!(outcome.inserted, 2);
        assert_eq!(outcome.kept.len(), 2);
        assert_eq!(descriptions(&store, 7), vec!["x", "y"]);
    }

    #[tokio::test]
    async fn second_run_with_returned_ids_is_stable() {
        let mut store = MemoryStore::default();
        let a = store.seed(1, "a", 10);

        let first = reconcile(
            &mut store,
            1,
            vec![
                ProposedLineItem::existing(a, line(1, "a", 12)),
                ProposedLineItem::new(line(2, "b", 3)),
            ],
            ForeignIdPolicy::Ignore,
        )
        .await
        .unwrap();
        let after_first = store.children(1);

        let resubmitted = after_first
            .iter()
            .map(|item| ProposedLineItem::existing(item.id, item.fields.clone()))
            .collect();
        let second = reconcile(&mut store, 1, resubmitted, ForeignIdPolicy::Ignore)
            .await
            .unwrap();

        assert_eq!(second.inserted, 0);
        assert_eq!(second.deleted, 0);
        assert_eq!(store.children(1), after_first);
        let mut kept = second.kept.clone();
        kept.sort();
        let mut first_kept = first.kept.clone();
        first_kept.sort();
        assert_eq!(kept, first_kept);
    }

    #[tokio::test]
    async fn result_does_not_depend_on_proposal_order() {
        let mut forward = MemoryStore::default();
        let mut backward = MemoryStore::default();
        for store in [&mut forward, &mut backward] {
            store.seed(1, "a", 10);
            store.seed(1, "b", 20);
            store.seed(1, "c", 30);
        }

        let proposal = vec![
            ProposedLineItem::existing(3, line(1, "c2", 31)),
            ProposedLineItem::new(line(2, "d", 40)),
            ProposedLineItem::existing(1, line(3, "a2", 11)),
        ];
        let mut reversed = proposal.clone();
        reversed.reverse();

        reconcile(&mut forward, 1, proposal, ForeignIdPolicy::Ignore)
            .await
            .unwrap();
        reconcile(&mut backward, 1, reversed, ForeignIdPolicy::Ignore)
            .await
            .unwrap();

        assert_eq!(descriptions(&forward, 1), vec!["a2", "c2", "d"]);
        assert_eq!(descriptions(&forward, 1), descriptions(&backward, 1));
        assert!(!forward.rows.contains_key(&2));
        assert!(!backward.rows.contains_key(&2));
    }

    #[tokio::test]
    async fn storage_failure_is_surfaced() {
        let mut store = MemoryStore {
            fail_deletes: true,
            ..Default::default()
        };
        store.seed(1, "a", 10);

        let err = reconcile(&mut store, 1, Vec::new(), ForeignIdPolicy::Ignore)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Persistence(_)));
    }

    #[test]
    fn repeated_id_is_updated_once_with_last_fields() {
        let existing = vec![LineItem {
            id: 5,
            parent_id: 1,
            fields: line(1, "a", 10),
        }];
        let plan = ReconcilePlan::build(
            1,
            &existing,
            vec![
                ProposedLineItem::existing(5, line(1, "first", 1)),
                ProposedLineItem::existing(5, line(1, "second", 2)),
            ],
        );

        assert_eq!(plan.updates.len(), 1);
        assert_eq!(plan.updates[0].fields.description, "second");
        assert!(plan.deletes.is_empty());
        assert!(plan.inserts.is_empty());
    }

    #[test]
    fn plan_never_deletes_rows_of_other_parents() {
        let existing = vec![
            LineItem {
                id: 1,
                parent_id: 1,
                fields: line(1, "a", 10),
            },
            LineItem {
                id: 2,
                parent_id: 2,
                fields: line(1, "b", 10),
            },
        ];
        let plan = ReconcilePlan::build(1, &existing, Vec::new());
        assert_eq!(plan.deletes, vec![1]);
    }

    #[test]
    fn policy_follows_config_flag() {
        assert_eq!(ForeignIdPolicy::from_config(true), ForeignIdPolicy::Reject);
        assert_eq!(ForeignIdPolicy::from_config(false), ForeignIdPolicy::Ignore);
    }
}
