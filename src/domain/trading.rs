//! Trading result rows as stored in `spimex_trading_results`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::{Date, OffsetDateTime};

/// One row of exchange activity. Rows are created by bulk insert only and
/// never mutated afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingRecord {
    pub id: i64,
    pub exchange_product_id: String,
    pub exchange_product_name: String,
    pub oil_id: String,
    pub delivery_basis_id: String,
    pub delivery_basis_name: String,
    pub delivery_type_id: String,
    pub volume: i64,
    pub total: Decimal,
    pub count: i64,
    pub date: Date,
    pub created_on: OffsetDateTime,
    pub updated_on: OffsetDateTime,
}

/// Insert payload; storage assigns `id`, `created_on` and `updated_on`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTradingRecord {
    pub exchange_product_id: String,
    pub exchange_product_name: String,
    pub oil_id: String,
    pub delivery_basis_id: String,
    pub delivery_basis_name: String,
    pub delivery_type_id: String,
    pub volume: i64,
    pub total: Decimal,
    pub count: i64,
    pub date: Date,
}

impl NewTradingRecord {
    pub fn into_record(self, id: i64, stamped_at: OffsetDateTime) -> TradingRecord {
        TradingRecord {
            id,
            exchange_product_id: self.exchange_product_id,
            exchange_product_name: self.exchange_product_name,
            oil_id: self.oil_id,
            delivery_basis_id: self.delivery_basis_id,
            delivery_basis_name: self.delivery_basis_name,
            delivery_type_id: self.delivery_type_id,
            volume: self.volume,
            total: self.total,
            count: self.count,
            date: self.date,
            created_on: stamped_at,
            updated_on: stamped_at,
        }
    }
}
