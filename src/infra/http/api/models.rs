//! Request and response shapes of the `/trading` routes.
//!
//! Query parameters arrive as raw strings so that malformed values are
//! reported as validation failures rather than extractor rejections.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::Date;

use crate::config::QuerySettings;
use crate::domain::error::DomainError;
use crate::domain::filter::{ExchangeCode, FilterCriteria, Pagination, parse_date};
use crate::domain::trading::TradingRecord;

#[derive(Debug, Default, Deserialize)]
pub struct PaginationQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

impl PaginationQuery {
    pub fn resolve(&self, settings: &QuerySettings) -> Result<Pagination, DomainError> {
        Pagination::parse(
            self.limit.as_deref(),
            self.offset.as_deref(),
            settings.default_limit,
            settings.max_limit,
        )
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct TradingResultsQuery {
    pub oil_id: Option<String>,
    pub delivery_type_id: Option<String>,
    pub delivery_basis_id: Option<String>,
    #[serde(flatten)]
    pub page: PaginationQuery,
}

impl TradingResultsQuery {
    pub fn into_criteria(self, settings: &QuerySettings) -> Result<FilterCriteria, DomainError> {
        Ok(FilterCriteria {
            oil_id: ExchangeCode::parse_optional("oil_id", self.oil_id.as_deref())?,
            delivery_type_id: ExchangeCode::parse_optional(
                "delivery_type_id",
                self.delivery_type_id.as_deref(),
            )?,
            delivery_basis_id: ExchangeCode::parse_optional(
                "delivery_basis_id",
                self.delivery_basis_id.as_deref(),
            )?,
            start_date: None,
            end_date: None,
            pagination: self.page.resolve(settings)?,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct DynamicsQuery {
    pub oil_id: Option<String>,
    pub delivery_type_id: Option<String>,
    pub delivery_basis_id: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(flatten)]
    pub page: PaginationQuery,
}

impl DynamicsQuery {
    pub fn into_criteria(self, settings: &QuerySettings) -> Result<FilterCriteria, DomainError> {
        let criteria = FilterCriteria {
            oil_id: ExchangeCode::parse_optional("oil_id", self.oil_id.as_deref())?,
            delivery_type_id: ExchangeCode::parse_optional(
                "delivery_type_id",
                self.delivery_type_id.as_deref(),
            )?,
            delivery_basis_id: ExchangeCode::parse_optional(
                "delivery_basis_id",
                self.delivery_basis_id.as_deref(),
            )?,
            start_date: parse_date("start_date", self.start_date.as_deref())?,
            end_date: parse_date("end_date", self.end_date.as_deref())?,
            pagination: self.page.resolve(settings)?,
        };
        criteria.validate()?;
        Ok(criteria)
    }
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LastTradingDatesResponse {
    pub dates: Vec<Date>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TradingResultResponse {
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
}

impl From<TradingRecord> for TradingResultResponse {
    fn from(record: TradingRecord) -> Self {
        Self {
            id: record.id,
            exchange_product_id: record.exchange_product_id,
            exchange_product_name: record.exchange_product_name,
            oil_id: record.oil_id,
            delivery_basis_id: record.delivery_basis_id,
            delivery_basis_name: record.delivery_basis_name,
            delivery_type_id: record.delivery_type_id,
            volume: record.volume,
            total: record.total,
            count: record.count,
            date: record.date,
        }
    }
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use super::*;

    #[test]
    fn blank_values_are_absent() {
        let query = DynamicsQuery {
            oil_id: Some(String::new()),
            start_date: Some(" ".into()),
            ..DynamicsQuery::default()
        };
        let criteria = query
            .into_criteria(&QuerySettings::default())
            .expect("valid query");
        assert!(criteria.is_unfiltered());
        assert_eq!(criteria.pagination, Pagination::default());
    }

    #[test]
    fn dynamics_parses_every_field() {
        let query = DynamicsQuery {
            oil_id: Some("A100".into()),
            delivery_type_id: Some("F".into()),
            delivery_basis_id: Some("NVY".into()),
            start_date: Some("2024-08-07".into()),
            end_date: Some("2024-08-09".into()),
            page: PaginationQuery {
                limit: Some("5".into()),
                offset: Some("1".into()),
            },
        };
        let criteria = query
            .into_criteria(&QuerySettings::default())
            .expect("valid query");

        assert_eq!(
            criteria.oil_id.as_ref().map(ExchangeCode::as_str),
            Some("A100")
        );
        assert_eq!(criteria.start_date, Some(date!(2024 - 08 - 07)));
        assert_eq!(criteria.end_date, Some(date!(2024 - 08 - 09)));
        assert_eq!(criteria.pagination, Pagination::new(5, 1));
    }

    #[test]
    fn inverted_range_is_rejected() {
        let query = DynamicsQuery {
            start_date: Some("2024-08-09".into()),
            end_date: Some("2024-08-07".into()),
            ..DynamicsQuery::default()
        };
        let err = query.into_criteria(&QuerySettings::default()).unwrap_err();
        assert_eq!(err.field(), "start_date");
    }

    #[test]
    fn configured_limits_apply() {
        let settings = QuerySettings {
            default_limit: 3,
            max_limit: 5,
        };
        let page = PaginationQuery::default()
            .resolve(&settings)
            .expect("valid pagination");
        assert_eq!(page.limit, 3);

        let too_many = PaginationQuery {
            limit: Some("6".into()),
            offset: None,
        };
        assert!(too_many.resolve(&settings).is_err());
    }

    #[test]
    fn response_omits_storage_timestamps() {
        let json = serde_json::to_value(LastTradingDatesResponse {
            dates: vec![date!(2024 - 08 - 09)],
        })
        .expect("serializable");
        assert_eq!(json, serde_json::json!({ "dates": ["2024-08-09"] }));
    }
}
