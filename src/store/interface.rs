//! Document store interface
//!
//! The executor is written against this trait, not a concrete driver.
//! Methods mirror the driver collection surface the executor needs:
//! filtered reads, an aggregation pipeline, and acknowledged writes.
//! Connection management, pooling, and timeouts belong to the
//! implementation behind the trait.

use bson::oid::ObjectId;
use bson::Document;

use super::errors::StoreResult;

/// Result of a single-document insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertOutcome {
    /// Whether the write was acknowledged by the store
    pub acknowledged: bool,
    /// Identifier assigned to the new document
    pub inserted_id: Option<ObjectId>,
}

/// Result of an update/replace/delete write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WriteOutcome {
    /// Whether the write was acknowledged by the store
    pub acknowledged: bool,
    /// Documents matched by the filter
    pub matched: u64,
    /// Documents removed
    pub deleted: u64,
}

/// Backend collection operations consumed by the executor
pub trait DocumentStore {
    /// Counts documents matching a filter
    fn count(&self, collection: &str, filter: Option<&Document>) -> StoreResult<u64>;

    /// Filtered find with projection, pagination, and sort.
    ///
    /// `limit` of zero means unlimited. Sort directions are 1/-1.
    fn find(
        &self,
        collection: &str,
        filter: Option<&Document>,
        projection: Option<&Document>,
        skip: u64,
        limit: u64,
        sort: &[(String, i32)],
    ) -> StoreResult<Vec<Document>>;

    /// Runs an aggregation pipeline of `$match`/`$group`/`$project` stages
    fn aggregate(&self, collection: &str, pipeline: &[Document]) -> StoreResult<Vec<Document>>;

    /// Inserts one document, assigning an identifier when absent
    fn insert_one(
        &mut self,
        collection: &str,
        document: Document,
        acknowledged: bool,
    ) -> StoreResult<InsertOutcome>;

    /// Applies an update document (`$set`/`$pull`) to every match
    fn update_many(
        &mut self,
        collection: &str,
        filter: &Document,
        update: &Document,
        acknowledged: bool,
    ) -> StoreResult<WriteOutcome>;

    /// Replaces the first matching document wholesale
    fn replace_one(
        &mut self,
        collection: &str,
        filter: &Document,
        replacement: Document,
        acknowledged: bool,
    ) -> StoreResult<WriteOutcome>;

    /// Deletes every matching document
    fn delete_many(
        &mut self,
        collection: &str,
        filter: &Document,
        acknowledged: bool,
    ) -> StoreResult<WriteOutcome>;
}
