//! Shared access to one data tree from many threads.
//!
//! The schema is immutable and shared through an `Arc`. The data tree sits
//! behind a `parking_lot::RwLock`: any number of concurrent readers
//! (validation, encoding) or one writer at a time.

use std::sync::Arc;

use parking_lot::RwLock;
use ydm_core::{DecodeError, EncodeError};
use ydm_schema::SchemaTree;

use crate::codec::{self, DecodeOptions, EncodeOptions};
use crate::edit::NodeMut;
use crate::tree::DataTree;
use crate::validate::{validate, Violations};

/// A schema plus one lock-protected data tree. Cloning shares both.
#[derive(Debug, Clone)]
pub struct SharedTree {
    schema: Arc<SchemaTree>,
    data: Arc<RwLock<DataTree>>,
}

impl SharedTree {
    pub fn new(schema: Arc<SchemaTree>) -> Self {
        Self::with_data(schema, DataTree::new())
    }

    pub fn with_data(schema: Arc<SchemaTree>, data: DataTree) -> Self {
        Self {
            schema,
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub fn schema(&self) -> &Arc<SchemaTree> {
        &self.schema
    }

    /// Run `f` with shared access to the data.
    pub fn read<R>(&self, f: impl FnOnce(&DataTree) -> R) -> R {
        f(&self.data.read())
    }

    /// Run `f` with an editing cursor on the root, holding the write lock.
    pub fn edit<R>(&self, f: impl FnOnce(NodeMut<'_, '_>) -> R) -> R {
        let mut data = self.data.write();
        f(data.edit(&self.schema))
    }

    /// A copy of the current data.
    pub fn snapshot(&self) -> DataTree {
        self.data.read().clone()
    }

    pub fn validate(&self) -> Violations {
        validate(&self.data.read(), &self.schema)
    }

    pub fn encode(&self, opts: &EncodeOptions) -> Result<String, EncodeError> {
        codec::encode(&self.data.read(), &self.schema, opts)
    }

    /// Replace the data with a decoded document. The document is decoded
    /// before the write lock is taken; on error the data is unchanged.
    pub fn load_json(&self, json: &str, opts: &DecodeOptions) -> Result<(), DecodeError> {
        let decoded = codec::decode(json, &self.schema, opts)?;
        *self.data.write() = decoded;
        Ok(())
    }
}
