//! Database operations for the `approval_records` table.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use silverline_core::{format_record_date, ApprovalRecord, LabelMap};
use sqlx::PgPool;

use crate::DbError;

const RECORD_DATE_FORMAT: &str = "%Y%m%d";

const SELECT_COLUMNS: &str = "SELECT id, keyword, subreddit, record_date, approval_rating, \
     positive_count, negative_count, neutral_count, mixed_count, \
     positive_example, negative_example, neutral_example, mixed_example, \
     created_at, updated_at \
     FROM approval_records";

/// A row from the `approval_records` table.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ApprovalRecordRow {
    pub id: String,
    pub keyword: String,
    pub subreddit: String,
    pub record_date: NaiveDate,
    pub approval_rating: Decimal,
    pub positive_count: i32,
    pub negative_count: i32,
    pub neutral_count: i32,
    pub mixed_count: i32,
    pub positive_example: String,
    pub negative_example: String,
    pub neutral_example: String,
    pub mixed_example: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl TryFrom<ApprovalRecordRow> for ApprovalRecord {
    type Error = DbError;

    fn try_from(row: ApprovalRecordRow) -> Result<Self, Self::Error> {
        Ok(ApprovalRecord {
            approval_rating: decimal_to_rating(row.approval_rating)?,
            sentiments_breakdown: LabelMap {
                positive: count_from_column(row.positive_count)?,
                negative: count_from_column(row.negative_count)?,
                neutral: count_from_column(row.neutral_count)?,
                mixed: count_from_column(row.mixed_count)?,
            },
            comments: LabelMap {
                positive: row.positive_example,
                negative: row.negative_example,
                neutral: row.neutral_example,
                mixed: row.mixed_example,
            },
            date: format_record_date(row.record_date),
            id: row.id,
            keyword: row.keyword,
            subreddit: row.subreddit,
        })
    }
}

/// Bind-ready column values for one record.
struct RecordColumns<'a> {
    record: &'a ApprovalRecord,
    record_date: NaiveDate,
    approval_rating: Decimal,
    counts: LabelMap<i32>,
}

impl<'a> RecordColumns<'a> {
    fn new(record: &'a ApprovalRecord) -> Result<Self, DbError> {
        let record_date = NaiveDate::parse_from_str(&record.date, RECORD_DATE_FORMAT)
            .map_err(|e| DbError::InvalidRecord(format!("date {:?}: {e}", record.date)))?;
        let counts = &record.sentiments_breakdown;

        Ok(Self {
            record,
            record_date,
            approval_rating: rating_to_decimal(record.approval_rating)?,
            counts: LabelMap {
                positive: count_to_column(counts.positive)?,
                negative: count_to_column(counts.negative)?,
                neutral: count_to_column(counts.neutral)?,
                mixed: count_to_column(counts.mixed)?,
            },
        })
    }
}

/// Fetch a record by its composite id.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or
/// [`DbError::InvalidRecord`] if the row cannot be mapped.
pub async fn get_approval_record(
    pool: &PgPool,
    id: &str,
) -> Result<Option<ApprovalRecord>, DbError> {
    let row = sqlx::query_as::<_, ApprovalRecordRow>(&format!("{SELECT_COLUMNS} WHERE id = $1"))
        .bind(id)
        .fetch_optional(pool)
        .await?;

    row.map(ApprovalRecord::try_from).transpose()
}

/// Insert a record unless one with the same id exists.
///
/// Returns `true` if the row was written, `false` on conflict.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the insert fails or
/// [`DbError::InvalidRecord`] if the record cannot be mapped to columns.
pub async fn insert_approval_record(
    pool: &PgPool,
    record: &ApprovalRecord,
) -> Result<bool, DbError> {
    let columns = RecordColumns::new(record)?;
    let result = bind_columns(
        sqlx::query(
            "INSERT INTO approval_records \
                 (id, keyword, subreddit, record_date, approval_rating, \
                  positive_count, negative_count, neutral_count, mixed_count, \
                  positive_example, negative_example, neutral_example, mixed_example) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (id) DO NOTHING",
        ),
        &columns,
    )
    .execute(pool)
    .await?;

    Ok(result.rows_affected() == 1)
}

/// Insert or fully replace a record.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the upsert fails or
/// [`DbError::InvalidRecord`] if the record cannot be mapped to columns.
pub async fn upsert_approval_record(pool: &PgPool, record: &ApprovalRecord) -> Result<(), DbError> {
    let columns = RecordColumns::new(record)?;
    bind_columns(
        sqlx::query(
            "INSERT INTO approval_records \
                 (id, keyword, subreddit, record_date, approval_rating, \
                  positive_count, negative_count, neutral_count, mixed_count, \
                  positive_example, negative_example, neutral_example, mixed_example) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13) \
             ON CONFLICT (id) DO UPDATE SET \
                 approval_rating = EXCLUDED.approval_rating, \
                 positive_count = EXCLUDED.positive_count, \
                 negative_count = EXCLUDED.negative_count, \
                 neutral_count = EXCLUDED.neutral_count, \
                 mixed_count = EXCLUDED.mixed_count, \
                 positive_example = EXCLUDED.positive_example, \
                 negative_example = EXCLUDED.negative_example, \
                 neutral_example = EXCLUDED.neutral_example, \
                 mixed_example = EXCLUDED.mixed_example, \
                 updated_at = NOW()",
        ),
        &columns,
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// List every record for the pair, oldest `record_date` first.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if the query fails or
/// [`DbError::InvalidRecord`] if a row cannot be mapped.
pub async fn list_approval_records_for_pair(
    pool: &PgPool,
    keyword: &str,
    subreddit: &str,
) -> Result<Vec<ApprovalRecord>, DbError> {
    let rows = sqlx::query_as::<_, ApprovalRecordRow>(&format!(
        "{SELECT_COLUMNS} WHERE keyword = $1 AND subreddit = $2 ORDER BY record_date ASC"
    ))
    .bind(keyword)
    .bind(subreddit)
    .fetch_all(pool)
    .await?;

    rows.into_iter().map(ApprovalRecord::try_from).collect()
}

fn bind_columns<'q>(
    query: sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments>,
    columns: &'q RecordColumns<'q>,
) -> sqlx::query::Query<'q, sqlx::Postgres, sqlx::postgres::PgArguments> {
    let record = columns.record;
    query
        .bind(&record.id)
        .bind(&record.keyword)
        .bind(&record.subreddit)
        .bind(columns.record_date)
        .bind(columns.approval_rating)
        .bind(columns.counts.positive)
        .bind(columns.counts.negative)
        .bind(columns.counts.neutral)
        .bind(columns.counts.mixed)
        .bind(&record.comments.positive)
        .bind(&record.comments.negative)
        .bind(&record.comments.neutral)
        .bind(&record.comments.mixed)
}

/// Encode a rating as the exact decimal of its shortest `f64` rendering, so
/// that [`decimal_to_rating`] yields the same `f64` back.
pub(crate) fn rating_to_decimal(rating: f64) -> Result<Decimal, DbError> {
    if !rating.is_finite() {
        return Err(DbError::InvalidRecord(format!("approval rating {rating} is not finite")));
    }
    rating
        .to_string()
        .parse::<Decimal>()
        .map_err(|e| DbError::InvalidRecord(format!("approval rating {rating}: {e}")))
}

pub(crate) fn decimal_to_rating(value: Decimal) -> Result<f64, DbError> {
    value
        .normalize()
        .to_string()
        .parse::<f64>()
        .map_err(|e| DbError::InvalidRecord(format!("approval rating {value}: {e}")))
}

fn count_to_column(count: u32) -> Result<i32, DbError> {
    i32::try_from(count).map_err(|_| DbError::InvalidRecord(format!("count {count} overflows")))
}

fn count_from_column(count: i32) -> Result<u32, DbError> {
    u32::try_from(count).map_err(|_| DbError::InvalidRecord(format!("negative count {count}")))
}
