use mongodb::bson::{Binary, Document, doc, spec::BinarySubtype};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::dao::session_store::VersionedSession;
use crate::model::GameSession;

/// Stored shape of a session: the aggregate plus its concurrency token.
///
/// The version lives beside the payload so conditional writes can filter on
/// `{_id, version}` in a single replace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MongoSessionDocument {
    #[serde(rename = "_id")]
    pub id: Uuid,
    pub version: i64,
    pub session: GameSession,
}

impl MongoSessionDocument {
    pub fn new(session: GameSession, version: u64) -> Self {
        Self {
            id: session.id,
            version: version as i64,
            session,
        }
    }
}

impl From<MongoSessionDocument> for VersionedSession {
    fn from(value: MongoSessionDocument) -> Self {
        Self {
            session: value.session,
            version: value.version.max(0) as u64,
        }
    }
}

pub fn uuid_as_binary(id: Uuid) -> Binary {
    Binary {
        subtype: BinarySubtype::Uuid,
        bytes: id.into_bytes().to_vec(),
    }
}

pub fn doc_id(id: Uuid) -> Document {
    doc! {"_id": uuid_as_binary(id)}
}

pub fn doc_id_at_version(id: Uuid, version: u64) -> Document {
    doc! {"_id": uuid_as_binary(id), "version": version as i64}
}
