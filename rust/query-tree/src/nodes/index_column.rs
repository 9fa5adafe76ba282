use std::fmt;

use crate::args::{ArgKind, ArgReader};
use crate::errors::NodeError;
use crate::node::{FieldSink, Initializer, NodeBase, NodeFields, Slot, ValueField, Variant};
use crate::nodes::{ensure_initialized, TableName};

/// Column of an index, either plain or qualified by the table of a group
/// index.
///
/// Built by the grammar from either `(column, direction)` or
/// `(table, column, direction)`, where `table` may be `Null`; the direction is a boolean "ascending"
/// flag and defaults to ascending when the rule does not capture one.
#[derive(Debug, Default, Variant)]
pub struct IndexColumn {
    base: NodeBase,
    fields: Slot<IndexColumnFields>,
}

#[derive(Debug, NodeFields)]
pub struct IndexColumnFields {
    column_name: String,
    #[node(child)]
    table_name: Option<Box<TableName>>,
    #[node(bare)]
    direction: SortDirection,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> SortDirection {
        if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }
}

impl fmt::Display for SortDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortDirection::Ascending => f.write_str("ascending"),
            SortDirection::Descending => f.write_str("descending"),
        }
    }
}

impl ValueField for SortDirection {
    fn copy_value(&self) -> Self {
        *self
    }

    fn write_value(&self, label: Option<&str>, sink: &mut dyn FieldSink) {
        sink.value(label, self);
    }
}

impl IndexColumn {
    pub fn init_plain_column(
        &mut self,
        column_name: impl Into<String>,
        direction: SortDirection,
    ) -> Result<(), NodeError> {
        self.fields.fill(
            Self::TAG,
            IndexColumnFields {
                table_name: None,
                column_name: column_name.into(),
                direction,
            },
        )
    }

    /// Column of a group index. The table must already be initialized.
    pub fn init_qualified_column(
        &mut self,
        table_name: impl Into<Box<TableName>>,
        column_name: impl Into<String>,
        direction: SortDirection,
    ) -> Result<(), NodeError> {
        let table_name = table_name.into();
        ensure_initialized(&*table_name)?;
        self.fields.fill(
            Self::TAG,
            IndexColumnFields {
                table_name: Some(table_name),
                column_name: column_name.into(),
                direction,
            },
        )
    }

    pub fn column_name(&self) -> Result<&str, NodeError> {
        Ok(self.get()?.column_name.as_str())
    }

    pub fn table_name(&self) -> Result<Option<&TableName>, NodeError> {
        Ok(self.get()?.table_name.as_deref())
    }

    /// Qualifying table, for passes that rewrite names in place.
    pub fn table_name_mut(&mut self) -> Result<Option<&mut TableName>, NodeError> {
        Ok(self.fields.get_mut(Self::TAG)?.table_name.as_deref_mut())
    }

    pub fn direction(&self) -> Result<SortDirection, NodeError> {
        Ok(self.get()?.direction)
    }

    pub fn is_ascending(&self) -> Result<bool, NodeError> {
        Ok(self.get()?.direction.is_ascending())
    }

    pub fn is_part_of_group_index(&self) -> Result<bool, NodeError> {
        Ok(self.get()?.table_name.is_some())
    }

    fn get(&self) -> Result<&IndexColumnFields, NodeError> {
        self.fields.get(Self::TAG)
    }
}

impl Initializer for IndexColumnFields {
    fn decode(args: &mut ArgReader) -> Result<Self, NodeError> {
        let table_name = match args.peek() {
            Some(ArgKind::Node(_)) => Some(args.node::<TableName>()?),
            // three-argument form without a qualifying table
            Some(ArgKind::Null) if args.remaining() == 3 => args.opt_node::<TableName>()?,
            _ => None,
        };
        let column_name = args.string()?;
        let direction = args
            .opt_boolean()?
            .map_or(SortDirection::default(), SortDirection::from_ascending);
        Ok(IndexColumnFields {
            table_name,
            column_name,
            direction,
        })
    }
}
