/// In-memory implementations of the collaborator traits.
pub mod memory;
/// MongoDB-backed session store.
#[cfg(feature = "mongo-store")]
pub mod mongodb;
/// Durable player record access.
pub mod player_directory;
/// Read-only question pool access.
pub mod question_bank;
/// Versioned session document store abstraction.
pub mod session_store;
/// Storage abstraction layer shared by all backends.
pub mod storage;
