//! Parsing of untrusted `/api/advocates` query parameters into a [`SearchQuery`].

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;
use thiserror::Error;

pub const DEFAULT_PAGE: u64 = 1;
pub const DEFAULT_PAGE_SIZE: u64 = 20;
pub const MAX_PAGE_SIZE: u64 = 100;

/// Columns a search may be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    CreatedAt,
    LastName,
    YearsOfExperience,
}

impl SortKey {
    pub const ALL: [SortKey; 3] = [
        SortKey::CreatedAt,
        SortKey::LastName,
        SortKey::YearsOfExperience,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            SortKey::CreatedAt => "created_at",
            SortKey::LastName => "last_name",
            SortKey::YearsOfExperience => "years_of_experience",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|key| key.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// A validated search request. Built per request and dropped with the response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    pub name: Option<String>,
    pub city: Option<String>,
    pub degree: Option<String>,
    pub specialty: Option<String>,
    pub page: u64,
    pub page_size: u64,
    pub sort: SortKey,
    pub order: SortOrder,
}

impl Default for SearchQuery {
    fn default() -> Self {
        Self {
            name: None,
            city: None,
            degree: None,
            specialty: None,
            page: DEFAULT_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            sort: SortKey::default(),
            order: SortOrder::default(),
        }
    }
}

impl SearchQuery {
    /// Number of rows skipped before the requested page.
    pub fn offset(&self) -> u64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// Parse raw URL parameters. Every invalid field is reported, not just the first.
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ValidationErrors> {
        let mut errors = Vec::new();
        let mut query = SearchQuery {
            name: text_param(params, "q"),
            city: text_param(params, "city"),
            degree: text_param(params, "degree"),
            specialty: text_param(params, "specialty"),
            ..Default::default()
        };

        if let Some(raw) = params.get("page") {
            match parse_bounded(raw, 1, None) {
                Ok(page) => query.page = page,
                Err(reason) => errors.push(FieldError::new("page", reason)),
            }
        }

        if let Some(raw) = params.get("pageSize") {
            match parse_bounded(raw, 1, Some(MAX_PAGE_SIZE)) {
                Ok(size) => query.page_size = size,
                Err(reason) => errors.push(FieldError::new("pageSize", reason)),
            }
        }

        if let Some(raw) = params.get("sort") {
            match SortKey::parse(raw) {
                Some(sort) => query.sort = sort,
                None => errors.push(FieldError::new(
                    "sort",
                    format!(
                        "expected one of 'created_at' | 'last_name' | 'years_of_experience', received '{raw}'"
                    ),
                )),
            }
        }

        if let Some(raw) = params.get("order") {
            match SortOrder::parse(raw) {
                Some(order) => query.order = order,
                None => errors.push(FieldError::new(
                    "order",
                    format!("expected one of 'asc' | 'desc', received '{raw}'"),
                )),
            }
        }

        if errors.is_empty() {
            Ok(query)
        } else {
            Err(ValidationErrors { fields: errors })
        }
    }
}

fn text_param(params: &HashMap<String, String>, key: &str) -> Option<String> {
    params
        .get(key)
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

/// Plain decimal integers only; exponent (`1e1`) and fractional forms are rejected.
fn parse_bounded(raw: &str, min: u64, max: Option<u64>) -> Result<u64, String> {
    let trimmed = raw.trim();
    let value: i128 = trimmed
        .parse()
        .map_err(|_| format!("expected an integer, received '{raw}'"))?;

    if value < i128::from(min) {
        return Err(format!("must be greater than or equal to {min}"));
    }
    if let Some(max) = max {
        if value > i128::from(max) {
            return Err(format!("must be less than or equal to {max}"));
        }
    }

    u64::try_from(value).map_err(|_| format!("must be at most {}", u64::MAX))
}

/// One rejected parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub reason: String,
}

impl FieldError {
    fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.reason)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid query parameters: {}", summarize(.fields))]
pub struct ValidationErrors {
    pub fields: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn has_field(&self, field: &str) -> bool {
        self.fields.iter().any(|e| e.field == field)
    }
}

fn summarize(fields: &[FieldError]) -> String {
    fields
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
