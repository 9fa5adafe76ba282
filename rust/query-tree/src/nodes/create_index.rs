use crate::args::ArgReader;
use crate::errors::NodeError;
use crate::node::{Initializer, NodeBase, NodeFields, Slot, Variant};
use crate::nodes::{ensure_initialized, IndexColumnList, TableName};

/// `CREATE [UNIQUE] INDEX name ON table [USING type] (columns)`
#[derive(Debug, Default, Variant)]
pub struct CreateIndex {
    base: NodeBase,
    fields: Slot<CreateIndexFields>,
}

#[derive(Debug, NodeFields)]
pub struct CreateIndexFields {
    unique: bool,
    index_type: Option<String>,
    #[node(child)]
    index_name: Box<TableName>,
    #[node(child)]
    table_name: Box<TableName>,
    #[node(child)]
    columns: Box<IndexColumnList>,
}

impl CreateIndex {
    pub fn init(
        &mut self,
        unique: bool,
        index_type: Option<&str>,
        index_name: impl Into<Box<TableName>>,
        table_name: impl Into<Box<TableName>>,
        columns: impl Into<Box<IndexColumnList>>,
    ) -> Result<(), NodeError> {
        let index_name = index_name.into();
        let table_name = table_name.into();
        let columns = columns.into();
        ensure_initialized(&*index_name)?;
        ensure_initialized(&*table_name)?;
        ensure_initialized(&*columns)?;
        self.fields.fill(
            Self::TAG,
            CreateIndexFields {
                unique,
                index_type: index_type.map(String::from),
                index_name,
                table_name,
                columns,
            },
        )
    }

    pub fn is_unique(&self) -> Result<bool, NodeError> {
        Ok(self.get()?.unique)
    }

    /// Access method named in `USING`, if any.
    pub fn index_type(&self) -> Result<Option<&str>, NodeError> {
        Ok(self.get()?.index_type.as_deref())
    }

    pub fn index_name(&self) -> Result<&TableName, NodeError> {
        Ok(&*self.get()?.index_name)
    }

    pub fn table_name(&self) -> Result<&TableName, NodeError> {
        Ok(&*self.get()?.table_name)
    }

    pub fn columns(&self) -> Result<&IndexColumnList, NodeError> {
        Ok(&*self.get()?.columns)
    }

    pub fn columns_mut(&mut self) -> Result<&mut IndexColumnList, NodeError> {
        Ok(&mut *self.fields.get_mut(Self::TAG)?.columns)
    }

    /// True if any column is qualified by a table.
    pub fn has_group_columns(&self) -> Result<bool, NodeError> {
        for column in self.columns()?.columns()? {
            if column.is_part_of_group_index()? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn get(&self) -> Result<&CreateIndexFields, NodeError> {
        self.fields.get(Self::TAG)
    }
}

/// Accepts `(unique, index_type, index_name, table_name, columns)`, the
/// index type possibly `Null`.
impl Initializer for CreateIndexFields {
    fn decode(args: &mut ArgReader) -> Result<Self, NodeError> {
        Ok(CreateIndexFields {
            unique: args.boolean()?,
            index_type: args.opt_string()?,
            index_name: args.node()?,
            table_name: args.node()?,
            columns: args.node()?,
        })
    }
}
