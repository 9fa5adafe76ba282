use query_tree::nodes::{IndexColumn, SortDirection, TableName};
use query_tree::{args, Arg, ArgKind, Args, Node, NodeError, NodeFactory, NodeTag, ParserContext, Span};
use rstest::rstest;

fn table(name: &str) -> TableName {
    let mut table = TableName::default();
    table.init(None, name).unwrap();
    table
}

#[test_log::test]
fn plain_ascending_column() {
    let mut column = IndexColumn::default();
    column
        .init_plain_column("age", SortDirection::Ascending)
        .unwrap();
    assert_eq!(column.column_name().unwrap(), "age");
    assert!(column.is_ascending().unwrap());
    assert!(!column.is_part_of_group_index().unwrap());
}

#[test_log::test]
fn qualified_descending_column() {
    let mut column = IndexColumn::default();
    column
        .init_qualified_column(table("orders"), "id", SortDirection::Descending)
        .unwrap();
    assert!(column.is_part_of_group_index().unwrap());
    assert_eq!(column.table_name().unwrap(), Some(&table("orders")));
    assert_eq!(column.column_name().unwrap(), "id");
    assert!(!column.is_ascending().unwrap());
}

#[rstest]
#[case::plain(args!["age"], false)]
#[case::plain_null(args!["age", Arg::Null], false)]
#[case::null_qualifier(args![None::<Box<dyn Node>>, "id", true], false)]
#[case::qualified(args![Arg::node(table("orders")), "id"], true)]
#[case::qualified_null(args![Arg::node(table("orders")), "id", Arg::Null], true)]
#[test_log::test]
fn direction_defaults_to_ascending(#[case] args: Args, #[case] group: bool) {
    let mut column = IndexColumn::default();
    column.initialize(args).unwrap();
    assert_eq!(column.direction().unwrap(), SortDirection::Ascending);
    assert_eq!(column.is_part_of_group_index().unwrap(), group);
    assert_eq!(column.table_name().unwrap().is_some(), group);
}

#[rstest]
#[case::number_as_column(args![42i64, true], 0, ArgKind::Int)]
#[case::string_as_direction(args!["age", "desc"], 1, ArgKind::Str)]
#[case::table_as_direction(args!["age", Arg::node(table("orders"))], 1, ArgKind::Node(NodeTag::TableName))]
#[case::missing_column(args![Arg::node(table("orders"))], 1, ArgKind::Missing)]
#[case::list_as_column(args![Vec::<Arg>::new()], 0, ArgKind::List)]
#[test_log::test]
fn wrong_argument_type(#[case] args: Args, #[case] position: usize, #[case] found: ArgKind) {
    let mut column = IndexColumn::default();
    match column.initialize(args) {
        Err(NodeError::InvalidArgumentType {
            tag,
            position: p,
            found: f,
            ..
        }) => {
            assert_eq!(tag, NodeTag::IndexColumn);
            assert_eq!(p, position);
            assert_eq!(f, found);
        }
        other => panic!("unexpected result {other:?}"),
    }
    assert!(!column.is_initialized());
    assert_eq!(
        column.column_name().unwrap_err(),
        NodeError::UninitializedAccess { tag: NodeTag::IndexColumn }
    );
}

#[test_log::test]
fn wrong_node_variant() {
    let mut inner = IndexColumn::default();
    inner
        .init_plain_column("a", SortDirection::Ascending)
        .unwrap();
    let mut column = IndexColumn::default();
    let err = column
        .initialize(args![Arg::node(inner), "id"])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "IndexColumn initializer: argument 0 must be TableName node, got IndexColumn node"
    );
}

#[test_log::test]
fn surplus_arguments() {
    let mut column = IndexColumn::default();
    assert_eq!(
        column
            .initialize(args!["age", true, "extra"])
            .unwrap_err(),
        NodeError::ArgumentCount {
            tag: NodeTag::IndexColumn,
            expected: 2,
            found: 3,
        }
    );
    assert!(!column.is_initialized());
}

#[test_log::test]
fn initialization_is_not_reentrant() {
    let mut column = IndexColumn::default();
    column.initialize(args!["age", true]).unwrap();
    assert_eq!(
        column.initialize(args!["other", false]).unwrap_err(),
        NodeError::AlreadyInitialized { tag: NodeTag::IndexColumn }
    );
    assert_eq!(
        column
            .init_plain_column("other", SortDirection::Descending)
            .unwrap_err(),
        NodeError::AlreadyInitialized { tag: NodeTag::IndexColumn }
    );
    assert_eq!(column.column_name().unwrap(), "age");
    assert!(column.is_ascending().unwrap());
}

#[test_log::test]
fn uninitialized_table_argument() {
    let mut column = IndexColumn::default();
    assert_eq!(
        column
            .init_qualified_column(TableName::default(), "id", SortDirection::Ascending)
            .unwrap_err(),
        NodeError::UninitializedAccess { tag: NodeTag::TableName }
    );
    assert!(!column.is_initialized());
}

#[test_log::test]
fn build_through_factory() {
    let source = "CREATE INDEX i ON orders (orders.id DESC)";
    let ctx = ParserContext::with_source(source);
    let factory = NodeFactory::standard();

    let table = factory
        .build(NodeTag::TableName, args!["orders"], &ctx, Span::new(26, 32))
        .unwrap();
    let column = factory
        .build_typed::<IndexColumn>(args![table, "id", false], &ctx, Span::new(26, 40))
        .unwrap();

    assert!(column.is_part_of_group_index().unwrap());
    assert_eq!(column.base().span(), Some(Span::new(26, 40)));
    assert_eq!(column.base().context().map(|c| c.id()), Some(ctx.id()));
    assert_eq!(column.base().position().map(|p| p.to_string()), Some("1:27".into()));
    let table = column.table_name().unwrap().unwrap();
    assert_eq!(table.base().span(), Some(Span::new(26, 32)));
    assert!(table.base().is_attached());
}

#[test_log::test]
fn failed_build_reports_error() {
    let ctx = ParserContext::new();
    let factory = NodeFactory::standard();
    let err = factory
        .build(NodeTag::IndexColumn, args![true], &ctx, Span::new(0, 1))
        .unwrap_err();
    assert!(matches!(err, NodeError::InvalidArgumentType { position: 0, .. }));
}
