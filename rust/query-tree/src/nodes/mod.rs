//! Node variants for the constructs of `CREATE INDEX` statements.

mod column_reference;
mod create_index;
mod index_column;
mod index_column_list;
mod table_name;

pub use column_reference::{ColumnReference, ColumnReferenceFields};
pub use create_index::{CreateIndex, CreateIndexFields};
pub use index_column::{IndexColumn, IndexColumnFields, SortDirection};
pub use index_column_list::{IndexColumnList, IndexColumnListFields};
pub use table_name::{TableName, TableNameFields};

use crate::errors::NodeError;
use crate::node::Node;

/// Children are linked only once they are complete.
fn ensure_initialized(node: &dyn Node) -> Result<(), NodeError> {
    if node.is_initialized() {
        Ok(())
    } else {
        Err(NodeError::UninitializedAccess { tag: node.tag() })
    }
}
