use crate::args::{ArgKind, ArgReader};
use crate::errors::NodeError;
use crate::node::{Initializer, NodeBase, NodeFields, Slot, Variant};
use crate::nodes::{ensure_initialized, IndexColumn};

/// Parenthesized column list of `CREATE INDEX`.
///
/// The grammar creates it from the first column and appends every further
/// column with [`IndexColumnList::push`].
#[derive(Debug, Default, Variant)]
pub struct IndexColumnList {
    base: NodeBase,
    fields: Slot<IndexColumnListFields>,
}

#[derive(Debug, NodeFields)]
pub struct IndexColumnListFields {
    #[node(child)]
    columns: Vec<Box<IndexColumn>>,
}

impl IndexColumnList {
    pub fn init(
        &mut self,
        columns: impl IntoIterator<Item = IndexColumn>,
    ) -> Result<(), NodeError> {
        let columns = columns
            .into_iter()
            .map(|column| {
                ensure_initialized(&column)?;
                Ok(Box::new(column))
            })
            .collect::<Result<Vec<_>, NodeError>>()?;
        self.fields
            .fill(Self::TAG, IndexColumnListFields { columns })
    }

    pub fn push(&mut self, column: IndexColumn) -> Result<(), NodeError> {
        ensure_initialized(&column)?;
        self.fields
            .get_mut(Self::TAG)?
            .columns
            .push(Box::new(column));
        Ok(())
    }

    pub fn columns(&self) -> Result<impl Iterator<Item = &IndexColumn>, NodeError> {
        Ok(self.get()?.columns.iter().map(|column| &**column))
    }

    pub fn len(&self) -> Result<usize, NodeError> {
        Ok(self.get()?.columns.len())
    }

    pub fn is_empty(&self) -> Result<bool, NodeError> {
        Ok(self.get()?.columns.is_empty())
    }

    fn get(&self) -> Result<&IndexColumnListFields, NodeError> {
        self.fields.get(Self::TAG)
    }
}

/// Accepts the columns either as separate node arguments or as one list.
impl Initializer for IndexColumnListFields {
    fn decode(args: &mut ArgReader) -> Result<Self, NodeError> {
        let columns = match args.peek() {
            Some(ArgKind::List) => args.node_list::<IndexColumn>()?,
            _ => args.nodes::<IndexColumn>()?,
        };
        Ok(IndexColumnListFields { columns })
    }
}
