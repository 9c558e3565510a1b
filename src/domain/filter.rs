//! Sparse filter criteria accepted by the trading queries.
//!
//! Every field is optional; an absent field imposes no constraint. Values are
//! validated here and never truncated or padded.

use std::fmt;

use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

use super::error::DomainError;

/// Column width of the instrument and delivery code columns.
pub const MAX_CODE_LEN: usize = 4;
pub const DEFAULT_LIMIT: u32 = 10;

const DATE_FORMAT: &[BorrowedFormatItem<'static>] = format_description!("[year]-[month]-[day]");

/// Instrument, delivery-type or delivery-basis code matched exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExchangeCode(String);

impl ExchangeCode {
    pub fn parse(field: &'static str, raw: &str) -> Result<Self, DomainError> {
        let len = raw.chars().count();
        if len == 0 || len > MAX_CODE_LEN {
            return Err(DomainError::validation(
                field,
                format!("must be 1 to {MAX_CODE_LEN} characters, got {len}"),
            ));
        }
        if raw.chars().any(char::is_whitespace) {
            return Err(DomainError::validation(field, "must not contain whitespace"));
        }
        Ok(Self(raw.to_owned()))
    }

    /// Parse an optional request value; blank input counts as absent.
    pub fn parse_optional(
        field: &'static str,
        raw: Option<&str>,
    ) -> Result<Option<Self>, DomainError> {
        match non_blank(raw) {
            Some(value) => Self::parse(field, value).map(Some),
            None => Ok(None),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ExchangeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Offset/limit window. A limit of zero is an empty page, not "unlimited".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Pagination {
    pub limit: u32,
    pub offset: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            limit: DEFAULT_LIMIT,
            offset: 0,
        }
    }
}

impl Pagination {
    pub fn new(limit: u32, offset: u32) -> Self {
        Self { limit, offset }
    }

    pub fn parse(
        limit: Option<&str>,
        offset: Option<&str>,
        default_limit: u32,
        max_limit: u32,
    ) -> Result<Self, DomainError> {
        let limit = parse_count("limit", limit)?.unwrap_or(default_limit);
        if limit > max_limit {
            return Err(DomainError::validation(
                "limit",
                format!("must not exceed {max_limit}"),
            ));
        }
        let offset = parse_count("offset", offset)?.unwrap_or(0);
        Ok(Self { limit, offset })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterCriteria {
    pub oil_id: Option<ExchangeCode>,
    pub delivery_type_id: Option<ExchangeCode>,
    pub delivery_basis_id: Option<ExchangeCode>,
    /// Inclusive lower bound on the trading date.
    pub start_date: Option<Date>,
    /// Inclusive upper bound on the trading date.
    pub end_date: Option<Date>,
    pub pagination: Pagination,
}

impl FilterCriteria {
    pub fn with_pagination(pagination: Pagination) -> Self {
        Self {
            pagination,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), DomainError> {
        match (self.start_date, self.end_date) {
            (Some(start), Some(end)) if start > end => Err(DomainError::validation(
                "start_date",
                format!("{start} is after end_date {end}"),
            )),
            _ => Ok(()),
        }
    }

    pub fn is_unfiltered(&self) -> bool {
        self.oil_id.is_none()
            && self.delivery_type_id.is_none()
            && self.delivery_basis_id.is_none()
            && self.start_date.is_none()
            && self.end_date.is_none()
    }
}

/// Parse a `YYYY-MM-DD` request value; blank input counts as absent.
pub fn parse_date(field: &'static str, raw: Option<&str>) -> Result<Option<Date>, DomainError> {
    match non_blank(raw) {
        Some(value) => Date::parse(value, DATE_FORMAT)
            .map(Some)
            .map_err(|err| {
                DomainError::validation(field, format!("expected YYYY-MM-DD: {err}"))
            }),
        None => Ok(None),
    }
}

fn parse_count(field: &'static str, raw: Option<&str>) -> Result<Option<u32>, DomainError> {
    match non_blank(raw) {
        Some(value) => value
            .parse::<u32>()
            .map(Some)
            .map_err(|_| DomainError::validation(field, "must be a non-negative integer")),
        None => Ok(None),
    }
}

fn non_blank(raw: Option<&str>) -> Option<&str> {
    raw.map(str::trim).filter(|value| !value.is_empty())
}
