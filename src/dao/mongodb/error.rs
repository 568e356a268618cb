use mongodb::error::Error as MongoError;
use thiserror::Error;
use uuid::Uuid;

/// Result alias for MongoDB session store operations.
pub type MongoResult<T> = Result<T, MongoDaoError>;

/// Failures surfaced by the MongoDB session store.
#[derive(Debug, Error)]
pub enum MongoDaoError {
    /// The connection URI could not be parsed.
    #[error("failed to parse MongoDB connection URI `{uri}`")]
    InvalidUri {
        /// The offending URI.
        uri: String,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// A required environment variable is missing.
    #[error("missing environment variable `{var}`")]
    MissingEnvVar {
        /// Name of the variable.
        var: &'static str,
    },
    /// The client could not be built from the parsed options.
    #[error("failed to build MongoDB client from options")]
    ClientConstruction {
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// The initial ping never succeeded.
    #[error("MongoDB ping failed during initial connection after {attempts} attempt(s)")]
    InitialPing {
        /// Number of attempts made before giving up.
        attempts: u32,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// The periodic health ping failed.
    #[error("MongoDB ping health check failed")]
    HealthPing {
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// Index creation failed at startup.
    #[error("failed to ensure index `{index}` on collection `{collection}`")]
    EnsureIndex {
        /// Target collection.
        collection: &'static str,
        /// Index description.
        index: &'static str,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// Inserting a new session document failed.
    #[error("failed to create session `{id}`")]
    CreateSession {
        /// Session id.
        id: Uuid,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// Reading a session document failed.
    #[error("failed to load session `{id}`")]
    LoadSession {
        /// Session id.
        id: Uuid,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
    /// Writing a session document failed.
    #[error("failed to store session `{id}`")]
    StoreSession {
        /// Session id.
        id: Uuid,
        /// Driver-level cause.
        #[source]
        source: MongoError,
    },
}
