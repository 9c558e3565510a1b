use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder};
use time::{Date, OffsetDateTime};
use tracing::debug;

use crate::{
    application::query::{Predicate, Selection, SortKey, TradingQuery},
    application::repos::{RepoError, TradingRepo},
    domain::trading::{NewTradingRecord, TradingRecord},
};

use super::PostgresRepositories;

const RECORD_COLUMNS: &str = "id, exchange_product_id, exchange_product_name, oil_id, \
     delivery_basis_id, delivery_basis_name, delivery_type_id, volume, total, count, date, \
     created_on, updated_on";

// Ten binds per row keeps each statement well below the 65535 parameter limit.
const INSERT_CHUNK_ROWS: usize = 1_000;

#[derive(sqlx::FromRow)]
struct TradingRow {
    id: i64,
    exchange_product_id: String,
    exchange_product_name: String,
    oil_id: String,
    delivery_basis_id: String,
    delivery_basis_name: String,
    delivery_type_id: String,
    volume: i64,
    total: Decimal,
    count: i64,
    date: Date,
    created_on: OffsetDateTime,
    updated_on: OffsetDateTime,
}

impl From<TradingRow> for TradingRecord {
    fn from(row: TradingRow) -> Self {
        Self {
            id: row.id,
            exchange_product_id: row.exchange_product_id,
            exchange_product_name: row.exchange_product_name,
            oil_id: row.oil_id,
            delivery_basis_id: row.delivery_basis_id,
            delivery_basis_name: row.delivery_basis_name,
            delivery_type_id: row.delivery_type_id,
            volume: row.volume,
            total: row.total,
            count: row.count,
            date: row.date,
            created_on: row.created_on,
            updated_on: row.updated_on,
        }
    }
}

impl PostgresRepositories {
    /// Render a query description into SQL with every value bound.
    fn build_select(query: &TradingQuery) -> QueryBuilder<'static, Postgres> {
        let mut qb = QueryBuilder::new(match query.selection() {
            Selection::Records => format!("SELECT {RECORD_COLUMNS} FROM spimex_trading_results"),
            Selection::DistinctDates => {
                "SELECT DISTINCT date FROM spimex_trading_results".to_string()
            }
        });

        for (index, predicate) in query.predicates().iter().enumerate() {
            qb.push(if index == 0 { " WHERE " } else { " AND " });
            match predicate {
                Predicate::OilId(value) => {
                    qb.push("oil_id = ");
                    qb.push_bind(value.clone());
                }
                Predicate::DeliveryTypeId(value) => {
                    qb.push("delivery_type_id = ");
                    qb.push_bind(value.clone());
                }
                Predicate::DeliveryBasisId(value) => {
                    qb.push("delivery_basis_id = ");
                    qb.push_bind(value.clone());
                }
                Predicate::DateFrom(bound) => {
                    qb.push("date >= ");
                    qb.push_bind(*bound);
                }
                Predicate::DateTo(bound) => {
                    qb.push("date <= ");
                    qb.push_bind(*bound);
                }
            }
        }

        let order: Vec<&str> = query
            .order()
            .iter()
            .map(|key| match key {
                SortKey::DateDesc => "date DESC",
                SortKey::IdAsc => "id ASC",
            })
            .collect();
        if !order.is_empty() {
            qb.push(" ORDER BY ");
            qb.push(order.join(", "));
        }

        qb.push(" LIMIT ");
        qb.push_bind(i64::from(query.limit()));
        qb.push(" OFFSET ");
        qb.push_bind(i64::from(query.offset()));
        qb
    }
}

#[async_trait]
impl TradingRepo for PostgresRepositories {
    async fn fetch_records(&self, query: &TradingQuery) -> Result<Vec<TradingRecord>, RepoError> {
        let mut qb = Self::build_select(query);
        debug!(sql = qb.sql(), query = %query, "fetch_records");

        let rows = self
            .bounded(qb.build_query_as::<TradingRow>().fetch_all(self.pool()))
            .await?;

        Ok(rows.into_iter().map(TradingRecord::from).collect())
    }

    async fn fetch_dates(&self, query: &TradingQuery) -> Result<Vec<Date>, RepoError> {
        let mut qb = Self::build_select(query);
        debug!(sql = qb.sql(), query = %query, "fetch_dates");

        self.bounded(qb.build_query_scalar::<Date>().fetch_all(self.pool()))
            .await
    }

    async fn insert_records(&self, records: &[NewTradingRecord]) -> Result<u64, RepoError> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut tx = self.bounded(self.pool().begin()).await?;
        let mut inserted = 0_u64;

        for chunk in records.chunks(INSERT_CHUNK_ROWS) {
            let mut qb = QueryBuilder::<Postgres>::new(
                "INSERT INTO spimex_trading_results (exchange_product_id, exchange_product_name, \
                 oil_id, delivery_basis_id, delivery_basis_name, delivery_type_id, volume, total, \
                 count, date) ",
            );
            qb.push_values(chunk, |mut row, record| {
                row.push_bind(record.exchange_product_id.clone())
                    .push_bind(record.exchange_product_name.clone())
                    .push_bind(record.oil_id.clone())
                    .push_bind(record.delivery_basis_id.clone())
                    .push_bind(record.delivery_basis_name.clone())
                    .push_bind(record.delivery_type_id.clone())
                    .push_bind(record.volume)
                    .push_bind(record.total)
                    .push_bind(record.count)
                    .push_bind(record.date);
            });

            // An error drops `tx`, which rolls back every earlier chunk.
            let result = self.bounded(qb.build().execute(&mut *tx)).await?;
            inserted += result.rows_affected();
        }

        self.bounded(tx.commit()).await?;
        Ok(inserted)
    }
}
