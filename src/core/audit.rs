//! Audit log - Append-only journal of state-changing operations.
//!
//! `append` is called by every engine inside the transaction that carries
//! the mutation it describes, so an operation and its journal entry
//! commit or vanish together. Entries are never updated or deleted.

use crate::entities::{Journal, JournalModel, journal};
use crate::errors::Result;
use sea_orm::{ActiveModelTrait, ConnectionTrait, EntityTrait, QueryOrder, QuerySelect, Set};

/// Appends one journal entry in the caller's transaction.
pub async fn append<C>(
    db: &C,
    action: &str,
    actor: &str,
    target: Option<&str>,
    detail: Option<String>,
) -> Result<JournalModel>
where
    C: ConnectionTrait,
{
    let entry = journal::ActiveModel {
        action: Set(action.to_string()),
        actor: Set(actor.to_string()),
        target: Set(target.map(ToString::to_string)),
        detail: Set(detail),
        recorded_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    entry.insert(db).await.map_err(Into::into)
}

/// The most recent journal entries, newest first.
pub async fn recent<C>(db: &C, limit: u64) -> Result<Vec<JournalModel>>
where
    C: ConnectionTrait,
{
    Journal::find()
        .order_by_desc(journal::Column::RecordedAt)
        .order_by_desc(journal::Column::Id)
        .limit(limit)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::*;

    #[tokio::test]
    async fn append_and_read_back() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();

        append(db, "deposit", "agent1", Some("1234"), Some("5000 FC".to_string())).await?;
        append(db, "withdrawal", "agent2", Some("1234"), None).await?;

        let entries = recent(db, 10).await?;
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].action, "withdrawal");
        assert_eq!(entries[1].action, "deposit");
        assert_eq!(entries[1].target.as_deref(), Some("1234"));
        Ok(())
    }

    #[tokio::test]
    async fn limit_truncates_history() -> Result<()> {
        let store = setup_test_store().await?;
        let db = store.connection();

        for i in 0..5 {
            let target = format!("{i}");
            append(db, "enrollment", "admin", Some(target.as_str()), None).await?;
        }
        let entries = recent(db, 3).await?;
        assert_eq!(entries.len(), 3);
        Ok(())
    }
}
