use mongodb::options::ClientOptions;

use super::error::{MongoDaoError, MongoResult};

const DEFAULT_DATABASE: &str = "quiz_arena";

/// Connection settings for the session store collection.
#[derive(Clone)]
pub struct MongoConfig {
    /// Parsed client options derived from the connection URI.
    pub options: ClientOptions,
    /// Database holding the `sessions` collection.
    pub database_name: String,
}

impl MongoConfig {
    /// Parse a MongoDB URI; the database name defaults to `quiz_arena`
    /// when none is given.
    pub async fn from_uri(uri: &str, db_name: Option<&str>) -> MongoResult<Self> {
        let options = ClientOptions::parse(uri).await.map_err(|source| {
            MongoDaoError::InvalidUri {
                uri: uri.to_owned(),
                source,
            }
        })?;

        Ok(Self {
            options,
            database_name: db_name.unwrap_or(DEFAULT_DATABASE).to_owned(),
        })
    }

    /// Build the configuration from `MONGO_URI`, with `MONGO_DB` optionally
    /// overriding the database name.
    pub async fn from_env() -> MongoResult<Self> {
        let uri = std::env::var("MONGO_URI")
            .map_err(|_| MongoDaoError::MissingEnvVar { var: "MONGO_URI" })?;
        let db = std::env::var("MONGO_DB").ok();
        Self::from_uri(&uri, db.as_deref()).await
    }
}
