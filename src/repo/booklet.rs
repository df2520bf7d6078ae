//! Booklet repository - Persists the page layouts produced by the
//! allocator.

use crate::booklet::{Allocation, PageFill};
use crate::entities::{BookletPage, BookletPageModel, booklet_page};
use crate::errors::Result;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};

/// Loads an account's pages in ascending page order.
pub async fn load_pages<C>(db: &C, account_id: i64) -> Result<Vec<BookletPageModel>>
where
    C: ConnectionTrait,
{
    BookletPage::find()
        .filter(booklet_page::Column::AccountId.eq(account_id))
        .order_by_asc(booklet_page::Column::PageNumber)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Projects page rows into the allocator's input shape.
pub fn page_fills(pages: &[BookletPageModel]) -> Vec<PageFill> {
    pages
        .iter()
        .map(|p| PageFill {
            page_number: p.page_number as u32,
            filled_cases: p.filled_cases as u32,
        })
        .collect()
}

/// Writes an allocation outcome back: pages already on disk are updated
/// in place, pages the allocator opened are inserted.
pub async fn apply_allocation<C>(
    db: &C,
    account_id: i64,
    existing: &[BookletPageModel],
    allocation: &Allocation,
) -> Result<()>
where
    C: ConnectionTrait,
{
    for page in &allocation.pages {
        match existing
            .iter()
            .find(|row| row.page_number as u32 == page.page_number)
        {
            Some(row) if row.filled_cases as u32 == page.filled_cases => {}
            Some(row) => {
                let mut model: booklet_page::ActiveModel = row.clone().into();
                model.filled_cases = Set(page.filled_cases as i32);
                model.update(db).await?;
            }
            None => {
                let model = booklet_page::ActiveModel {
                    account_id: Set(account_id),
                    page_number: Set(page.page_number as i32),
                    filled_cases: Set(page.filled_cases as i32),
                    ..Default::default()
                };
                model.insert(db).await?;
            }
        }
    }
    Ok(())
}

/// Deletes every page of an account. Only the administrative reset uses
/// this.
pub async fn delete_pages<C>(db: &C, account_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let result = BookletPage::delete_many()
        .filter(booklet_page::Column::AccountId.eq(account_id))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::booklet::allocate;
    use crate::errors::Result;
    use crate::test_utils::*;

    #[tokio::test]
    async fn allocation_roundtrips_through_rows() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_fixed(&store, 5_000).await?;
        let db = store.connection();

        // First allocation opens page 1 with 3 cases.
        let pages = load_pages(db, enrolled.account.id).await?;
        let allocation = allocate(&page_fills(&pages), 3);
        apply_allocation(db, enrolled.account.id, &pages, &allocation).await?;

        let pages = load_pages(db, enrolled.account.id).await?;
        assert_eq!(pages.len(), 1);
        assert_eq!(pages[0].page_number, 1);
        assert_eq!(pages[0].filled_cases, 3);

        // Second allocation tops up page 1 and spills onto page 2.
        let allocation = allocate(&page_fills(&pages), 40);
        apply_allocation(db, enrolled.account.id, &pages, &allocation).await?;

        let pages = load_pages(db, enrolled.account.id).await?;
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0].filled_cases, 31);
        assert_eq!(pages[1].page_number, 2);
        assert_eq!(pages[1].filled_cases, 12);
        Ok(())
    }

    #[tokio::test]
    async fn delete_pages_clears_the_booklet() -> Result<()> {
        let store = setup_test_store().await?;
        let enrolled = enroll_test_fixed(&store, 5_000).await?;
        let db = store.connection();

        let allocation = allocate(&[], 10);
        apply_allocation(db, enrolled.account.id, &[], &allocation).await?;
        assert_eq!(load_pages(db, enrolled.account.id).await?.len(), 1);

        let removed = delete_pages(db, enrolled.account.id).await?;
        assert_eq!(removed, 1);
        assert!(load_pages(db, enrolled.account.id).await?.is_empty());
        Ok(())
    }
}
