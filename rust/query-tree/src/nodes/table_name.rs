use crate::args::ArgReader;
use crate::errors::NodeError;
use crate::node::{Initializer, NodeBase, NodeFields, Slot, Variant};

/// Possibly schema-qualified table name.
#[derive(Debug, Default, Variant)]
pub struct TableName {
    base: NodeBase,
    fields: Slot<TableNameFields>,
}

#[derive(Debug, PartialEq, NodeFields)]
pub struct TableNameFields {
    schema_name: Option<String>,
    table_name: String,
}

impl TableName {
    pub fn init(&mut self, schema_name: Option<&str>, table_name: &str) -> Result<(), NodeError> {
        self.fields.fill(
            Self::TAG,
            TableNameFields {
                schema_name: schema_name.map(String::from),
                table_name: table_name.to_string(),
            },
        )
    }

    pub fn schema_name(&self) -> Result<Option<&str>, NodeError> {
        Ok(self.get()?.schema_name.as_deref())
    }

    pub fn table_name(&self) -> Result<&str, NodeError> {
        Ok(self.get()?.table_name.as_str())
    }

    pub fn has_schema(&self) -> Result<bool, NodeError> {
        Ok(self.get()?.schema_name.is_some())
    }

    /// `schema.table`, or just `table` when unqualified.
    pub fn full_name(&self) -> Result<String, NodeError> {
        let fields = self.get()?;
        Ok(match &fields.schema_name {
            Some(schema) => format!("{schema}.{}", fields.table_name),
            None => fields.table_name.clone(),
        })
    }

    pub fn set_table_name(&mut self, table_name: impl Into<String>) -> Result<(), NodeError> {
        self.fields.get_mut(Self::TAG)?.table_name = table_name.into();
        Ok(())
    }

    pub fn set_schema_name(&mut self, schema_name: Option<&str>) -> Result<(), NodeError> {
        self.fields.get_mut(Self::TAG)?.schema_name = schema_name.map(String::from);
        Ok(())
    }

    fn get(&self) -> Result<&TableNameFields, NodeError> {
        self.fields.get(Self::TAG)
    }
}

/// Names are equal when they spell the same table, wherever they come from.
impl PartialEq for TableName {
    fn eq(&self, other: &Self) -> bool {
        self.fields == other.fields
    }
}

/// Accepts `(table)` or `(schema, table)`, the schema possibly `Null`.
impl Initializer for TableNameFields {
    fn decode(args: &mut ArgReader) -> Result<Self, NodeError> {
        let schema_name = if args.remaining() > 1 {
            args.opt_string()?
        } else {
            None
        };
        let table_name = args.string()?;
        Ok(TableNameFields {
            schema_name,
            table_name,
        })
    }
}

#[cfg(test)]
mod test {
    use super::TableName;
    use crate::errors::NodeError;
    use crate::node::{Node, NodeTag};
    use crate::position::Span;

    #[test]
    fn qualified() {
        let mut table = TableName::default();
        table.init(Some("sales"), "orders").unwrap();
        assert_eq!(table.schema_name().unwrap(), Some("sales"));
        assert_eq!(table.table_name().unwrap(), "orders");
        assert!(table.has_schema().unwrap());
        assert_eq!(table.full_name().unwrap(), "sales.orders");
    }

    #[test]
    fn erased_forms() {
        let mut plain = TableName::default();
        plain.initialize(crate::args!["orders"]).unwrap();
        assert_eq!(plain.full_name().unwrap(), "orders");

        let mut qualified = TableName::default();
        qualified
            .initialize(crate::args![crate::Arg::Null, "orders"])
            .unwrap();
        assert_eq!(qualified, plain);
    }

    #[test]
    fn equality_ignores_position() {
        let mut a = TableName::default();
        a.init(None, "orders").unwrap();
        a.base_mut().set_span(Span::new(0, 6));
        let mut b = TableName::default();
        b.init(None, "orders").unwrap();
        assert_eq!(a, b);
        b.set_schema_name(Some("sales")).unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn renames() {
        let mut table = TableName::default();
        assert_eq!(
            table.set_table_name("x").unwrap_err(),
            NodeError::UninitializedAccess { tag: NodeTag::TableName }
        );
        table.init(None, "orders").unwrap();
        table.set_table_name("orders_v2").unwrap();
        assert_eq!(table.render(), "schemaName: null\ntableName: orders_v2\n");
    }
}
