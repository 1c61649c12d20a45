use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::options::{ClientOptions, FindOptions};
use mongodb::{
    Client, Collection, Database as MongoDatabase, IndexModel,
    bson::{Document, doc},
};
use serde::{Serialize, de::DeserializeOwned};

use crate::config::CONFIG;
use crate::data_models::Advocate;
use crate::filter::{AdvocateFilter, PageWindow, SortSpec};
use crate::store::AdvocateStore;

/// Collection names as constants for consistency
pub mod collections {
    pub const ADVOCATES: &str = "advocates";
}

/// Main database wrapper providing connection management and collection access
#[derive(Debug, Clone)]
pub struct Database {
    client: Client,
    db: MongoDatabase,
}

impl Database {
    /// Create a new Database instance with custom URI and database name.
    /// Useful for testing with a different database.
    pub async fn new(uri: &str, db_name: &str) -> Result<Self> {
        let client_options = ClientOptions::parse(uri)
            .await
            .context("Failed to parse MongoDB connection string")?;

        let client =
            Client::with_options(client_options).context("Failed to create MongoDB client")?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await
            .context("Failed to connect to MongoDB")?;

        log::info!("Connected to MongoDB database: {}", db_name);

        let db = client.database(db_name);

        Ok(Self { client, db })
    }

    /// Create a Database instance using environment configuration
    pub async fn from_config() -> Result<Self> {
        Self::new(CONFIG.require_mongo_uri()?, &CONFIG.mongo_db_name).await
    }

    /// Get a typed collection by name
    pub fn collection<T>(&self, name: &str) -> Collection<T>
    where
        T: Send + Sync,
    {
        self.db.collection(name)
    }

    /// Get the underlying MongoDB client (for advanced operations)
    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn advocates(&self) -> Collection<Advocate> {
        self.collection(collections::ADVOCATES)
    }
}

// =============================================================================
// Generic collection operations
// =============================================================================

pub struct Repository<T>
where
    T: Send + Sync,
{
    collection: Collection<T>,
}

impl<T> Repository<T>
where
    T: Serialize + DeserializeOwned + Unpin + Send + Sync,
{
    pub fn new(collection: Collection<T>) -> Self {
        Self { collection }
    }

    /// Insert multiple documents, returning how many were written
    pub async fn insert_many(&self, docs: &[T]) -> Result<usize> {
        if docs.is_empty() {
            return Ok(0);
        }
        let result = self
            .collection
            .insert_many(docs)
            .await
            .context("Failed to insert documents")?;

        Ok(result.inserted_ids.len())
    }

    /// Find documents matching a filter with sort/skip/limit options
    pub async fn find_with(&self, filter: Document, options: FindOptions) -> Result<Vec<T>> {
        let cursor = self
            .collection
            .find(filter)
            .with_options(options)
            .await
            .context("Failed to execute find query")?;

        cursor
            .try_collect()
            .await
            .context("Failed to collect results")
    }

    /// Count documents matching a filter
    pub async fn count(&self, filter: Document) -> Result<u64> {
        self.collection
            .count_documents(filter)
            .await
            .context("Failed to count documents")
    }

    /// Delete multiple documents matching a filter
    pub async fn delete_many(&self, filter: Document) -> Result<u64> {
        let result = self
            .collection
            .delete_many(filter)
            .await
            .context("Failed to delete documents")?;

        Ok(result.deleted_count)
    }

    /// Create ascending single-field indexes
    pub async fn ensure_indexes(&self, fields: &[&str]) -> Result<()> {
        let models = fields.iter().map(|field| {
            let mut keys = Document::new();
            keys.insert(*field, 1);
            IndexModel::builder().keys(keys).build()
        });
        self.collection
            .create_indexes(models)
            .await
            .context("Failed to create indexes")?;
        Ok(())
    }
}

// =============================================================================
// Advocate-specific operations
// =============================================================================

pub struct AdvocateRepo {
    repo: Repository<Advocate>,
}

impl AdvocateRepo {
    pub fn new(db: &Database) -> Self {
        Self {
            repo: Repository::new(db.advocates()),
        }
    }

    /// Replace every stored advocate with `advocates`.
    pub async fn replace_all(&self, advocates: &[Advocate]) -> Result<usize> {
        let removed = self.repo.delete_many(doc! {}).await?;
        log::info!("Removed {} existing advocates", removed);
        self.repo.insert_many(advocates).await
    }

    /// Indexes backing the sortable columns.
    pub async fn ensure_indexes(&self) -> Result<()> {
        self.repo
            .ensure_indexes(&["createdAt", "lastName", "yearsOfExperience"])
            .await
    }
}

#[async_trait]
impl AdvocateStore for AdvocateRepo {
    async fn find_page(
        &self,
        filter: &AdvocateFilter,
        sort: SortSpec,
        window: PageWindow,
    ) -> Result<Vec<Advocate>> {
        let Some(options) = page_find_options(sort, window) else {
            return Ok(Vec::new());
        };
        self.repo.find_with(filter.to_document(), options).await
    }

    async fn count(&self, filter: &AdvocateFilter) -> Result<u64> {
        self.repo.count(filter.to_document()).await
    }
}

/// Sort/skip/limit options for one page.
///
/// The driver sends `skip` as a signed 64-bit integer. An offset beyond
/// `i64::MAX` is past any real collection, so `None` means the page is empty.
pub fn page_find_options(sort: SortSpec, window: PageWindow) -> Option<FindOptions> {
    let skip = i64::try_from(window.offset).ok()?;
    let limit = i64::try_from(window.limit).unwrap_or(i64::MAX);
    Some(
        FindOptions::builder()
            .sort(sort.to_document())
            .skip(skip as u64)
            .limit(limit)
            .build(),
    )
}

// =============================================================================
// Test utilities
// =============================================================================

#[cfg(test)]
pub mod test_utils {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    static TEST_DB_COUNTER: AtomicUsize = AtomicUsize::new(0);

    /// Create a unique test database name
    pub fn unique_test_db_name() -> String {
        let count = TEST_DB_COUNTER.fetch_add(1, Ordering::SeqCst);
        let timestamp = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_millis();
        format!("advocates_test_{}_{}", timestamp, count)
    }

    /// Create a test database instance.
    /// Uses MONGO_URI from environment but creates a unique test database.
    pub async fn create_test_db() -> Result<(Database, String)> {
        dotenvy::dotenv().ok();
        let uri =
            std::env::var("MONGO_URI").unwrap_or_else(|_| "mongodb://localhost:27017".to_string());
        let db_name = unique_test_db_name();
        let db = Database::new(&uri, &db_name).await?;
        Ok((db, db_name))
    }

    /// Clean up a test database by dropping it
    pub async fn cleanup_test_db(db: &Database, db_name: &str) -> Result<()> {
        db.client()
            .database(db_name)
            .drop()
            .await
            .context("Failed to drop test database")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query_params::{SearchQuery, SortKey, SortOrder};
    use mongodb::bson::{self, DateTime};
    use std::collections::HashMap;
    use test_utils::*;

    fn advocate(id: i64, first: &str, last: &str, degree: &str, years: u32) -> Advocate {
        Advocate {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            city: "Boston".to_string(),
            degree: degree.to_string(),
            specialties: vec!["trauma".to_string()],
            years_of_experience: years,
            phone_number: 5550000000 + id,
            created_at: DateTime::from_millis(1_000 + id),
        }
    }

    #[test]
    fn test_page_find_options_window() {
        let sort = SortSpec {
            key: SortKey::LastName,
            order: SortOrder::Asc,
        };
        let options = page_find_options(sort, PageWindow { offset: 40, limit: 20 }).unwrap();
        assert_eq!(options.skip, Some(40));
        assert_eq!(options.limit, Some(20));
        assert_eq!(options.sort, Some(doc! { "lastName": 1, "_id": 1 }));
    }

    #[test]
    fn test_page_find_options_huge_offsets() {
        let query = SearchQuery::from_params(&HashMap::from([
            ("page".to_string(), "100000000000000000".to_string()),
            ("pageSize".to_string(), "100".to_string()),
        ]))
        .unwrap();
        let window = PageWindow::from(&query);
        assert!(window.offset > i64::MAX as u64);
        assert!(page_find_options(SortSpec::default(), window).is_none());

        let saturated = PageWindow {
            offset: u64::MAX,
            limit: 100,
        };
        assert!(page_find_options(SortSpec::default(), saturated).is_none());

        // The largest offset the driver accepts still encodes.
        let edge = PageWindow {
            offset: i64::MAX as u64,
            limit: 100,
        };
        let options = page_find_options(SortSpec::default(), edge).unwrap();
        let encoded = bson::to_document(&options).unwrap();
        assert_eq!(encoded.get_i64("skip").unwrap(), i64::MAX);
    }

    #[tokio::test]
    #[ignore = "requires MongoDB at MONGO_URI"]
    async fn test_advocate_repo_page_and_count() -> Result<()> {
        let (db, db_name) = create_test_db().await?;
        let repo = AdvocateRepo::new(&db);

        let advocates = vec![
            advocate(1, "Ann", "Lee", "MD", 5),
            advocate(2, "Bo", "Han", "PhD", 10),
            advocate(3, "Cy", "Ng", "MD", 1),
        ];
        assert_eq!(repo.replace_all(&advocates).await?, 3);
        repo.ensure_indexes().await?;

        let filter = AdvocateFilter {
            degree: Some("MD".to_string()),
            ..Default::default()
        };
        let sort = SortSpec {
            key: SortKey::YearsOfExperience,
            order: SortOrder::Asc,
        };
        let page = repo
            .find_page(&filter, sort, PageWindow { offset: 0, limit: 1 })
            .await?;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, 3);
        assert_eq!(repo.count(&filter).await?, 2);

        // Legacy row with a bare-string specialty.
        db.collection::<Document>(collections::ADVOCATES)
            .insert_one(doc! {
                "_id": 4_i64,
                "firstName": "Di",
                "lastName": "Oh",
                "city": "Denver",
                "degree": "LCSW",
                "specialties": "Eating disorders",
                "yearsOfExperience": 7,
                "phoneNumber": 5550000004_i64,
                "createdAt": DateTime::from_millis(2_000),
            })
            .await?;
        let filter = AdvocateFilter {
            specialty: Some("eating".to_string()),
            ..Default::default()
        };
        let page = repo
            .find_page(&filter, SortSpec::default(), PageWindow { offset: 0, limit: 5 })
            .await?;
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].specialties, vec!["Eating disorders".to_string()]);
        assert_eq!(repo.count(&filter).await?, 1);

        cleanup_test_db(&db, &db_name).await?;
        Ok(())
    }
}
