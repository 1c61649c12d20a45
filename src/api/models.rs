use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::data_models::Advocate;
use crate::query_engine::SearchPage;
use crate::query_params::FieldError;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResponse {
    pub data: Vec<AdvocateResult>,
    pub page: u64,
    pub page_size: u64,
    pub total: u64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdvocateResult {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub city: String,
    pub degree: String,
    pub specialties: Vec<String>,
    pub years_of_experience: u32,
    pub phone_number: i64,
    pub created_at: DateTime<Utc>,
}

impl From<Advocate> for AdvocateResult {
    fn from(advocate: Advocate) -> Self {
        AdvocateResult {
            id: advocate.id,
            first_name: advocate.first_name,
            last_name: advocate.last_name,
            city: advocate.city,
            degree: advocate.degree,
            specialties: advocate.specialties,
            years_of_experience: advocate.years_of_experience,
            phone_number: advocate.phone_number,
            // Clamps to chrono's range rather than failing.
            created_at: advocate.created_at.to_chrono(),
        }
    }
}

impl From<SearchPage> for SearchResponse {
    fn from(page: SearchPage) -> Self {
        SearchResponse {
            data: page.advocates.into_iter().map(AdvocateResult::from).collect(),
            page: page.page,
            page_size: page.page_size,
            total: page.total,
        }
    }
}

/// Field-level detail for a rejected request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldError>,
}
