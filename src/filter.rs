//! The search predicate, built once per request and shared by the page read
//! and the count read.

use mongodb::bson::{Document, doc};

use crate::data_models::Advocate;
use crate::query_params::{SearchQuery, SortKey, SortOrder};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdvocateFilter {
    /// Substring of first or last name, case-insensitive.
    pub name: Option<String>,
    /// Substring of city, case-insensitive.
    pub city: Option<String>,
    /// Exact degree, case-sensitive.
    pub degree: Option<String>,
    /// Substring of any specialty, case-insensitive.
    pub specialty: Option<String>,
}

impl From<&SearchQuery> for AdvocateFilter {
    fn from(query: &SearchQuery) -> Self {
        Self {
            name: query.name.clone(),
            city: query.city.clone(),
            degree: query.degree.clone(),
            specialty: query.specialty.clone(),
        }
    }
}

impl AdvocateFilter {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.city.is_none()
            && self.degree.is_none()
            && self.specialty.is_none()
    }

    pub fn matches(&self, advocate: &Advocate) -> bool {
        let name_ok = self.name.as_deref().is_none_or(|name| {
            contains_ci(&advocate.first_name, name) || contains_ci(&advocate.last_name, name)
        });
        let city_ok = self
            .city
            .as_deref()
            .is_none_or(|city| contains_ci(&advocate.city, city));
        let degree_ok = self
            .degree
            .as_deref()
            .is_none_or(|degree| advocate.degree == degree);
        let specialty_ok = self.specialty.as_deref().is_none_or(|specialty| {
            advocate
                .specialties
                .iter()
                .any(|s| contains_ci(s, specialty))
        });

        name_ok && city_ok && degree_ok && specialty_ok
    }

    /// MongoDB query document for this filter.
    ///
    /// `$regex` against `specialties` matches a bare string as well as any
    /// element of an array, so rows stored either way are found.
    pub fn to_document(&self) -> Document {
        let mut clauses: Vec<Document> = Vec::new();

        if let Some(name) = &self.name {
            clauses.push(doc! {
                "$or": [
                    { "firstName": ci_substring(name) },
                    { "lastName": ci_substring(name) },
                ]
            });
        }
        if let Some(city) = &self.city {
            clauses.push(doc! { "city": ci_substring(city) });
        }
        if let Some(degree) = &self.degree {
            clauses.push(doc! { "degree": degree });
        }
        if let Some(specialty) = &self.specialty {
            clauses.push(doc! { "specialties": ci_substring(specialty) });
        }

        if clauses.is_empty() {
            doc! {}
        } else {
            doc! { "$and": clauses }
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

fn ci_substring(fragment: &str) -> Document {
    doc! { "$regex": regex::escape(fragment), "$options": "i" }
}

/// Ordering for a page read. Ties fall back to the record id in the same
/// direction so consecutive pages never overlap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SortSpec {
    pub key: SortKey,
    pub order: SortOrder,
}

impl From<&SearchQuery> for SortSpec {
    fn from(query: &SearchQuery) -> Self {
        Self {
            key: query.sort,
            order: query.order,
        }
    }
}

impl SortSpec {
    /// Stored field name backing the sort key.
    pub fn field(&self) -> &'static str {
        match self.key {
            SortKey::CreatedAt => "createdAt",
            SortKey::LastName => "lastName",
            SortKey::YearsOfExperience => "yearsOfExperience",
        }
    }

    pub fn direction(&self) -> i32 {
        match self.order {
            SortOrder::Asc => 1,
            SortOrder::Desc => -1,
        }
    }

    pub fn to_document(&self) -> Document {
        let direction = self.direction();
        let mut sort = Document::new();
        sort.insert(self.field(), direction);
        sort.insert("_id", direction);
        sort
    }

    pub fn compare(&self, a: &Advocate, b: &Advocate) -> std::cmp::Ordering {
        let ordering = match self.key {
            SortKey::CreatedAt => a.created_at.cmp(&b.created_at),
            SortKey::LastName => a.last_name.cmp(&b.last_name),
            SortKey::YearsOfExperience => a.years_of_experience.cmp(&b.years_of_experience),
        }
        .then_with(|| a.id.cmp(&b.id));

        match self.order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }
}

/// Rows to skip and rows to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub offset: u64,
    pub limit: u64,
}

impl From<&SearchQuery> for PageWindow {
    fn from(query: &SearchQuery) -> Self {
        Self {
            offset: query.offset(),
            limit: query.page_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mongodb::bson::DateTime;

    fn advocate(
        first: &str,
        last: &str,
        city: &str,
        degree: &str,
        specialties: &[&str],
    ) -> Advocate {
        Advocate {
            id: 1,
            first_name: first.to_string(),
            last_name: last.to_string(),
            city: city.to_string(),
            degree: degree.to_string(),
            specialties: specialties.iter().map(|s| s.to_string()).collect(),
            years_of_experience: 5,
            phone_number: 5551234567,
            created_at: DateTime::from_millis(0),
        }
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        let filter = AdvocateFilter::default();
        assert!(filter.is_empty());
        assert!(filter.matches(&advocate("Ann", "Lee", "Boston", "MD", &[])));
        assert_eq!(filter.to_document(), doc! {});
    }

    #[test]
    fn test_name_matches_first_or_last_case_insensitive() {
        let ann = advocate("Ann", "Lee", "Boston", "MD", &["trauma"]);
        for q in ["an", "ANN", "lee", "Le"] {
            let filter = AdvocateFilter {
                name: Some(q.to_string()),
                ..Default::default()
            };
            assert!(filter.matches(&ann), "q={q} should match Ann Lee");
        }
        let filter = AdvocateFilter {
            name: Some("bo".to_string()),
            ..Default::default()
        };
        assert!(!filter.matches(&ann));
    }

    #[test]
    fn test_degree_is_exact() {
        let md = advocate("Ann", "Lee", "Boston", "MD", &[]);
        let exact = AdvocateFilter {
            degree: Some("MD".to_string()),
            ..Default::default()
        };
        assert!(exact.matches(&md));
        for degree in ["M", "md", "MD "] {
            let filter = AdvocateFilter {
                degree: Some(degree.to_string()),
                ..Default::default()
            };
            assert!(!filter.matches(&md), "degree={degree:?} must not match MD");
        }
    }

    #[test]
    fn test_specialty_matches_any_element() {
        let bo = advocate("Bo", "Han", "Boston", "PhD", &["Coaching", "Trauma & PTSD"]);
        let filter = AdvocateFilter {
            specialty: Some("ptsd".to_string()),
            ..Default::default()
        };
        assert!(filter.matches(&bo));

        let none = advocate("Cy", "Ng", "Austin", "MSW", &[]);
        assert!(!filter.matches(&none));
    }

    #[test]
    fn test_document_combines_with_and() {
        let filter = AdvocateFilter {
            name: Some("a.n".to_string()),
            city: Some("Boston".to_string()),
            degree: Some("MD".to_string()),
            specialty: Some("trauma".to_string()),
        };
        let expected = doc! {
            "$and": [
                { "$or": [
                    { "firstName": { "$regex": "a\\.n", "$options": "i" } },
                    { "lastName": { "$regex": "a\\.n", "$options": "i" } },
                ] },
                { "city": { "$regex": "Boston", "$options": "i" } },
                { "degree": "MD" },
                { "specialties": { "$regex": "trauma", "$options": "i" } },
            ]
        };
        assert_eq!(filter.to_document(), expected);
    }

    #[test]
    fn test_sort_document_uses_fixed_columns() {
        let spec = SortSpec {
            key: SortKey::YearsOfExperience,
            order: SortOrder::Asc,
        };
        assert_eq!(spec.to_document(), doc! { "yearsOfExperience": 1, "_id": 1 });

        let spec = SortSpec::default();
        assert_eq!(spec.to_document(), doc! { "createdAt": -1, "_id": -1 });
    }
}
