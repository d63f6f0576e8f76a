use async_trait::async_trait;
use autoguard_application::ports::PageRepository;
use autoguard_domain::{DomainError, PageStatus, Variant};
use sqlx::SqlitePool;
use tracing::error;

pub struct SqlitePageRepository {
    pool: SqlitePool,
}

impl SqlitePageRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn set_status(
        &self,
        page_id: i64,
        variant: Variant,
        status: PageStatus,
        error_text: Option<&str>,
        stamp_generated: bool,
    ) -> Result<(), DomainError> {
        let generated_at = if stamp_generated {
            "datetime('now')"
        } else {
            "generated_at"
        };
        let sql = format!(
            "UPDATE pages
             SET status = ?, error = ?, generated_at = {generated_at},
                 updated_at = datetime('now')
             WHERE id = ? AND variant = ?"
        );
        let result = sqlx::query(&sql)
            .bind(status.as_str())
            .bind(error_text)
            .bind(page_id)
            .bind(variant.as_str())
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!(page_id, error = %e, "Page status update failed");
                DomainError::DatabaseError(e.to_string())
            })?;

        if result.rows_affected() == 0 {
            return Err(DomainError::PageNotFound(format!(
                "page {page_id} variant {}",
                variant.as_str()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl PageRepository for SqlitePageRepository {
    async fn mark_generating(&self, page_id: i64, variant: Variant) -> Result<(), DomainError> {
        self.set_status(page_id, variant, PageStatus::Generating, None, false)
            .await
    }

    async fn mark_generated(&self, page_id: i64, variant: Variant) -> Result<(), DomainError> {
        self.set_status(page_id, variant, PageStatus::Generated, None, true)
            .await
    }

    async fn record_attempt_error(
        &self,
        page_id: i64,
        variant: Variant,
        error_text: &str,
    ) -> Result<(), DomainError> {
        self.set_status(
            page_id,
            variant,
            PageStatus::Generating,
            Some(error_text),
            false,
        )
        .await
    }

    async fn mark_failed(
        &self,
        page_id: i64,
        variant: Variant,
        error_text: &str,
    ) -> Result<(), DomainError> {
        self.set_status(page_id, variant, PageStatus::Failed, Some(error_text), false)
            .await
    }
}
