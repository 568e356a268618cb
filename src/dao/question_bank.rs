use futures::future::BoxFuture;
use uuid::Uuid;

use crate::dao::storage::StorageResult;
use crate::model::{Language, Question};

/// Read-only access to the authored question pool.
///
/// The authoring workflow lives outside this crate; the engine only ever
/// reads. Missing ids are simply absent from the result, callers decide
/// whether that is an error.
pub trait QuestionBank: Send + Sync {
    /// Fetch questions by id, preserving the requested order.
    fn get_by_ids(&self, ids: Vec<Uuid>) -> BoxFuture<'static, StorageResult<Vec<Question>>>;

    /// All questions authored in the given language, ordered by topic and
    /// ascending difficulty.
    fn query_by_language(
        &self,
        language: Language,
    ) -> BoxFuture<'static, StorageResult<Vec<Question>>>;
}
