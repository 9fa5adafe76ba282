use crate::args::ArgReader;
use crate::errors::NodeError;
use crate::node::{Initializer, NodeBase, NodeFields, Slot, Variant};
use crate::nodes::{ensure_initialized, TableName};

/// Column used in an expression, optionally qualified by its table.
#[derive(Debug, Default, Variant)]
pub struct ColumnReference {
    base: NodeBase,
    fields: Slot<ColumnReferenceFields>,
}

#[derive(Debug, NodeFields)]
pub struct ColumnReferenceFields {
    column_name: String,
    #[node(child)]
    table_name: Option<Box<TableName>>,
}

impl ColumnReference {
    pub fn init(
        &mut self,
        column_name: impl Into<String>,
        table_name: Option<impl Into<Box<TableName>>>,
    ) -> Result<(), NodeError> {
        let table_name = table_name.map(Into::into);
        if let Some(table) = &table_name {
            ensure_initialized(&**table)?;
        }
        self.fields.fill(
            Self::TAG,
            ColumnReferenceFields {
                column_name: column_name.into(),
                table_name,
            },
        )
    }

    pub fn column_name(&self) -> Result<&str, NodeError> {
        Ok(self.get()?.column_name.as_str())
    }

    pub fn table_name(&self) -> Result<Option<&TableName>, NodeError> {
        Ok(self.get()?.table_name.as_deref())
    }

    /// `table.column`, with the schema when the table has one.
    pub fn qualified_name(&self) -> Result<String, NodeError> {
        let fields = self.get()?;
        Ok(match &fields.table_name {
            Some(table) => format!("{}.{}", table.full_name()?, fields.column_name),
            None => fields.column_name.clone(),
        })
    }

    fn get(&self) -> Result<&ColumnReferenceFields, NodeError> {
        self.fields.get(Self::TAG)
    }
}

/// Accepts `(column, table)` with an optional `TableName` node.
impl Initializer for ColumnReferenceFields {
    fn decode(args: &mut ArgReader) -> Result<Self, NodeError> {
        let column_name = args.string()?;
        let table_name = args.opt_node::<TableName>()?;
        Ok(ColumnReferenceFields {
            column_name,
            table_name,
        })
    }
}
