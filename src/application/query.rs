//! Query descriptions built from [`FilterCriteria`].
//!
//! A [`TradingQuery`] is a backend-neutral value: predicates are always emitted
//! in the same canonical field order so that two logically identical criteria
//! produce identical descriptions (and therefore identical cache keys).
//! Pagination is applied last.

use std::fmt::{self, Write as _};

use time::Date;

use crate::domain::filter::{FilterCriteria, Pagination};
use crate::domain::trading::TradingRecord;

/// Columns a query projects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Selection {
    /// Full rows.
    Records,
    /// The trading date column, de-duplicated before ordering and pagination.
    DistinctDates,
}

/// A single conjunctive predicate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Predicate {
    OilId(String),
    DeliveryTypeId(String),
    DeliveryBasisId(String),
    DateFrom(Date),
    DateTo(Date),
}

impl Predicate {
    pub fn matches(&self, record: &TradingRecord) -> bool {
        match self {
            Predicate::OilId(value) => record.oil_id == *value,
            Predicate::DeliveryTypeId(value) => record.delivery_type_id == *value,
            Predicate::DeliveryBasisId(value) => record.delivery_basis_id == *value,
            Predicate::DateFrom(bound) => record.date >= *bound,
            Predicate::DateTo(bound) => record.date <= *bound,
        }
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Predicate::OilId(value) => write!(f, "oil_id={value}"),
            Predicate::DeliveryTypeId(value) => write!(f, "delivery_type_id={value}"),
            Predicate::DeliveryBasisId(value) => write!(f, "delivery_basis_id={value}"),
            Predicate::DateFrom(bound) => write!(f, "date>={bound}"),
            Predicate::DateTo(bound) => write!(f, "date<={bound}"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    DateDesc,
    IdAsc,
}

impl SortKey {
    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::DateDesc => "date desc",
            SortKey::IdAsc => "id asc",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TradingQuery {
    selection: Selection,
    predicates: Vec<Predicate>,
    order: Vec<SortKey>,
    offset: u32,
    limit: u32,
}

impl TradingQuery {
    /// Rows matching every present field of `criteria`, newest trading date first.
    pub fn records(criteria: &FilterCriteria) -> Self {
        let mut predicates = Vec::with_capacity(5);
        if let Some(code) = &criteria.oil_id {
            predicates.push(Predicate::OilId(code.as_str().to_owned()));
        }
        if let Some(code) = &criteria.delivery_type_id {
            predicates.push(Predicate::DeliveryTypeId(code.as_str().to_owned()));
        }
        if let Some(code) = &criteria.delivery_basis_id {
            predicates.push(Predicate::DeliveryBasisId(code.as_str().to_owned()));
        }
        if let Some(start) = criteria.start_date {
            predicates.push(Predicate::DateFrom(start));
        }
        if let Some(end) = criteria.end_date {
            predicates.push(Predicate::DateTo(end));
        }

        Self {
            selection: Selection::Records,
            predicates,
            order: vec![SortKey::DateDesc, SortKey::IdAsc],
            offset: criteria.pagination.offset,
            limit: criteria.pagination.limit,
        }
    }

    /// Distinct trading dates, most recent first.
    pub fn distinct_dates(pagination: Pagination) -> Self {
        Self {
            selection: Selection::DistinctDates,
            predicates: Vec::new(),
            order: vec![SortKey::DateDesc],
            offset: pagination.offset,
            limit: pagination.limit,
        }
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    pub fn predicates(&self) -> &[Predicate] {
        &self.predicates
    }

    pub fn order(&self) -> &[SortKey] {
        &self.order
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn matches(&self, record: &TradingRecord) -> bool {
        self.predicates
            .iter()
            .all(|predicate| predicate.matches(record))
    }

    /// Stable textual form used for cache key derivation and logging.
    pub fn canonical(&self) -> String {
        let mut out = String::new();
        out.push_str(match self.selection {
            Selection::Records => "select=records",
            Selection::DistinctDates => "select=distinct(date)",
        });
        for predicate in &self.predicates {
            let _ = write!(out, ";{predicate}");
        }
        out.push_str(";order=");
        let order: Vec<&str> = self.order.iter().map(|key| key.as_str()).collect();
        out.push_str(&order.join(","));
        let _ = write!(out, ";offset={};limit={}", self.offset, self.limit);
        out
    }
}

impl fmt::Display for TradingQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}
