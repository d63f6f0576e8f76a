use async_trait::async_trait;
use autoguard_application::ports::DecisionLogRepository;
use autoguard_domain::{DecisionLogRecord, DomainError};
use sqlx::SqlitePool;
use tracing::{debug, error};

const COLUMNS_PER_ROW: usize = 22;

/// Persists decision records: one multi-row INSERT inside one transaction
/// per batch. The log writer is the only sustained caller.
pub struct SqliteDecisionLogRepository {
    pool: SqlitePool,
}

impl SqliteDecisionLogRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DecisionLogRepository for SqliteDecisionLogRepository {
    async fn insert_batch(&self, records: &[DecisionLogRecord]) -> Result<(), DomainError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut sql = String::from(
            "INSERT INTO cloak_decisions (user_id, offer_id, ip_address, user_agent, referer,
             request_url, decision, decision_reason, fraud_score, blocked_at_layer,
             detection_details, ip_country, ip_city, ip_isp, ip_asn, is_datacenter, is_vpn,
             is_proxy, processing_time_ms, has_tracking_params, gclid, created_at) VALUES ",
        );
        let placeholder = format!("({})", vec!["?"; COLUMNS_PER_ROW].join(", "));
        for i in 0..records.len() {
            if i > 0 {
                sql.push_str(", ");
            }
            sql.push_str(&placeholder);
        }

        let mut query = sqlx::query(&sql);
        for record in records {
            query = query
                .bind(record.user_id)
                .bind(record.offer_id)
                .bind(&record.ip_address)
                .bind(&record.user_agent)
                .bind(record.referer.as_deref())
                .bind(&record.request_url)
                .bind(record.decision.as_str())
                .bind(record.decision_reason.as_deref())
                .bind(i64::from(record.fraud_score))
                .bind(record.blocked_at_layer.map(|l| l.as_str()))
                .bind(record.detection_details.to_string())
                .bind(record.ip_country.as_deref())
                .bind(record.ip_city.as_deref())
                .bind(record.ip_isp.as_deref())
                .bind(record.ip_asn.map(i64::from))
                .bind(i64::from(record.is_datacenter))
                .bind(i64::from(record.is_vpn))
                .bind(i64::from(record.is_proxy))
                .bind(record.processing_time_ms as i64)
                .bind(i64::from(record.has_tracking_params))
                .bind(record.gclid.as_deref())
                .bind(&record.created_at);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;
        query.execute(&mut *tx).await.map_err(|e| {
            error!(error = %e, count = records.len(), "Decision log batch insert failed");
            DomainError::DatabaseError(e.to_string())
        })?;
        tx.commit()
            .await
            .map_err(|e| DomainError::DatabaseError(e.to_string()))?;

        debug!(count = records.len(), "Decision log batch committed");
        Ok(())
    }
}
