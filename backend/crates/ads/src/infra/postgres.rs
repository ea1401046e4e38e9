//! PostgreSQL Repository Implementations

use chrono::{DateTime, NaiveDate, Utc};
use kernel::id::AdId;
use kernel::page::{Page, PageRequest};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entities::{AdSlot, AdStatus, Advertisement, SlotTier};
use crate::domain::repository::{AdRepository, SlotRepository};
use crate::error::{AdsError, AdsResult};

const SLOT_COLUMNS: &str = "slot_number, name, placement, tier, price_per_day, active";

const AD_COLUMNS: &str = r#"
    ad_id,
    slot_number,
    advertiser_id,
    title,
    image_url,
    target_url,
    start_date,
    end_date,
    days,
    amount,
    ad_status,
    created_at,
    activated_at,
    updated_at
"#;

/// PostgreSQL-backed ads repository
#[derive(Clone)]
pub struct PgAdsRepository {
    pool: PgPool,
}

impl PgAdsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SlotRepository for PgAdsRepository {
    async fn list_slots(&self) -> AdsResult<Vec<AdSlot>> {
        let sql = format!("SELECT {SLOT_COLUMNS} FROM ad_slots ORDER BY slot_number");
        let rows = sqlx::query_as::<_, SlotRow>(&sql)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(SlotRow::into_slot).collect()
    }

    async fn find_slot(&self, slot_number: i32) -> AdsResult<Option<AdSlot>> {
        let sql = format!("SELECT {SLOT_COLUMNS} FROM ad_slots WHERE slot_number = $1");
        let row = sqlx::query_as::<_, SlotRow>(&sql)
            .bind(slot_number)
            .fetch_optional(&self.pool)
            .await?;

        row.map(SlotRow::into_slot).transpose()
    }
}

impl AdRepository for PgAdsRepository {
    async fn book(&self, ad: &Advertisement) -> AdsResult<()> {
        let mut tx = self.pool.begin().await?;

        // Serialises concurrent bookings of the same slot
        let active = sqlx::query_scalar::<_, bool>(
            "SELECT active FROM ad_slots WHERE slot_number = $1 FOR UPDATE",
        )
        .bind(ad.slot_number)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AdsError::SlotNotFound(ad.slot_number))?;

        if !active {
            return Err(AdsError::SlotDisabled(ad.slot_number));
        }

        let occupied = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS(
                SELECT 1 FROM advertisements
                WHERE slot_number = $1
                  AND ad_status IN ($2, $3)
                  AND start_date <= $5
                  AND $4 <= end_date
            )
            "#,
        )
        .bind(ad.slot_number)
        .bind(AdStatus::Pending.id())
        .bind(AdStatus::Active.id())
        .bind(ad.start_date)
        .bind(ad.end_date)
        .fetch_one(&mut *tx)
        .await?;

        if occupied {
            return Err(AdsError::SlotOccupied {
                slot_number: ad.slot_number,
            });
        }

        sqlx::query(
            r#"
            INSERT INTO advertisements (
                ad_id,
                slot_number,
                advertiser_id,
                title,
                image_url,
                target_url,
                start_date,
                end_date,
                days,
                amount,
                ad_status,
                created_at,
                activated_at,
                updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(ad.id.into_uuid())
        .bind(ad.slot_number)
        .bind(ad.advertiser_id)
        .bind(&ad.title)
        .bind(&ad.image_url)
        .bind(&ad.target_url)
        .bind(ad.start_date)
        .bind(ad.end_date)
        .bind(ad.days)
        .bind(ad.amount)
        .bind(ad.status.id())
        .bind(ad.created_at)
        .bind(ad.activated_at)
        .bind(ad.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn find_by_id(&self, id: AdId) -> AdsResult<Option<Advertisement>> {
        let sql = format!("SELECT {AD_COLUMNS} FROM advertisements WHERE ad_id = $1");
        let row = sqlx::query_as::<_, AdRow>(&sql)
            .bind(id.into_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(AdRow::into_ad).transpose()
    }

    async fn update(&self, ad: &Advertisement, from: AdStatus) -> AdsResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE advertisements
            SET ad_status = $2, activated_at = $3, updated_at = $4
            WHERE ad_id = $1 AND ad_status = $5
            "#,
        )
        .bind(ad.id.into_uuid())
        .bind(ad.status.id())
        .bind(ad.activated_at)
        .bind(ad.updated_at)
        .bind(from.id())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() > 0 {
            return Ok(());
        }

        // Tell a vanished row apart from one another writer already moved
        let current: Option<i16> =
            sqlx::query_scalar("SELECT ad_status FROM advertisements WHERE ad_id = $1")
                .bind(ad.id.into_uuid())
                .fetch_optional(&self.pool)
                .await?;

        match current {
            None => Err(AdsError::AdNotFound),
            Some(id) => Err(AdsError::InvalidTransition {
                from: AdStatus::from_id(id)
                    .ok_or_else(|| AdsError::Internal(format!("Unknown ad status {id}")))?,
                to: ad.status,
            }),
        }
    }

    async fn list_by_advertiser(
        &self,
        advertiser_id: Uuid,
        page: PageRequest,
    ) -> AdsResult<Page<Advertisement>> {
        let total = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM advertisements WHERE advertiser_id = $1",
        )
        .bind(advertiser_id)
        .fetch_one(&self.pool)
        .await?;

        let sql = format!(
            "SELECT {AD_COLUMNS} FROM advertisements WHERE advertiser_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3"
        );
        let rows = sqlx::query_as::<_, AdRow>(&sql)
            .bind(advertiser_id)
            .bind(page.limit())
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        let items = rows
            .into_iter()
            .map(AdRow::into_ad)
            .collect::<AdsResult<Vec<_>>>()?;
        Ok(Page::new(items, page, total.max(0) as u64))
    }

    async fn list_blocking(&self, today: NaiveDate) -> AdsResult<Vec<Advertisement>> {
        let sql = format!(
            "SELECT {AD_COLUMNS} FROM advertisements \
             WHERE ad_status IN ($1, $2) AND end_date >= $3 \
             ORDER BY slot_number, start_date"
        );
        let rows = sqlx::query_as::<_, AdRow>(&sql)
            .bind(AdStatus::Pending.id())
            .bind(AdStatus::Active.id())
            .bind(today)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(AdRow::into_ad).collect()
    }

    async fn find_live(
        &self,
        slot_number: i32,
        today: NaiveDate,
    ) -> AdsResult<Option<Advertisement>> {
        let sql = format!(
            "SELECT {AD_COLUMNS} FROM advertisements \
             WHERE slot_number = $1 AND ad_status = $2 \
               AND start_date <= $3 AND end_date >= $3 \
             LIMIT 1"
        );
        let row = sqlx::query_as::<_, AdRow>(&sql)
            .bind(slot_number)
            .bind(AdStatus::Active.id())
            .bind(today)
            .fetch_optional(&self.pool)
            .await?;

        row.map(AdRow::into_ad).transpose()
    }

    async fn expire_ended(&self, today: NaiveDate) -> AdsResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE advertisements
            SET ad_status = $1, updated_at = NOW()
            WHERE ad_status IN ($2, $3) AND end_date < $4
            "#,
        )
        .bind(AdStatus::Expired.id())
        .bind(AdStatus::Pending.id())
        .bind(AdStatus::Active.id())
        .bind(today)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn cancel_unpaid(&self, cutoff: DateTime<Utc>) -> AdsResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE advertisements
            SET ad_status = $1, updated_at = NOW()
            WHERE ad_status = $2 AND created_at < $3
            "#,
        )
        .bind(AdStatus::Cancelled.id())
        .bind(AdStatus::Pending.id())
        .bind(cutoff)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }
}

// ============================================================================
// Row Types for sqlx mapping
// ============================================================================

#[derive(sqlx::FromRow)]
struct SlotRow {
    slot_number: i32,
    name: String,
    placement: String,
    tier: i16,
    price_per_day: i64,
    active: bool,
}

impl SlotRow {
    fn into_slot(self) -> AdsResult<AdSlot> {
        let tier = SlotTier::from_id(self.tier)
            .ok_or_else(|| AdsError::Internal(format!("Unknown slot tier {}", self.tier)))?;

        Ok(AdSlot {
            slot_number: self.slot_number,
            name: self.name,
            placement: self.placement,
            tier,
            price_per_day: self.price_per_day,
            active: self.active,
        })
    }
}

#[derive(sqlx::FromRow)]
struct AdRow {
    ad_id: Uuid,
    slot_number: i32,
    advertiser_id: Uuid,
    title: String,
    image_url: String,
    target_url: String,
    start_date: NaiveDate,
    end_date: NaiveDate,
    days: i32,
    amount: i64,
    ad_status: i16,
    created_at: DateTime<Utc>,
    activated_at: Option<DateTime<Utc>>,
    updated_at: DateTime<Utc>,
}

impl AdRow {
    fn into_ad(self) -> AdsResult<Advertisement> {
        let status = AdStatus::from_id(self.ad_status)
            .ok_or_else(|| AdsError::Internal(format!("Unknown ad status {}", self.ad_status)))?;

        Ok(Advertisement {
            id: AdId::from_uuid(self.ad_id),
            slot_number: self.slot_number,
            advertiser_id: self.advertiser_id,
            title: self.title,
            image_url: self.image_url,
            target_url: self.target_url,
            start_date: self.start_date,
            end_date: self.end_date,
            days: self.days,
            amount: self.amount,
            status,
            created_at: self.created_at,
            activated_at: self.activated_at,
            updated_at: self.updated_at,
        })
    }
}
