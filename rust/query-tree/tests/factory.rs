use std::sync::Arc;

use query_tree::nodes::{IndexColumn, TableName};
use query_tree::{args, Arg, Node, NodeFactory, NodeTag, ParserContext, Span};
use rstest::rstest;

#[rstest]
#[case(NodeTag::TableName)]
#[case(NodeTag::ColumnReference)]
#[case(NodeTag::IndexColumn)]
#[case(NodeTag::IndexColumnList)]
#[case(NodeTag::CreateIndex)]
#[test_log::test]
fn allocation_is_deterministic(#[case] tag: NodeTag) {
    let factory = NodeFactory::standard();
    let first = factory.allocate(tag).unwrap();
    let second = factory.allocate(tag).unwrap();
    assert_eq!(first.tag(), tag);
    assert_eq!(second.tag(), tag);
    assert!(!first.is_initialized());
    assert!(!first.base().is_attached());
    assert_eq!(first.render(), second.render());
}

#[test_log::test]
fn custom_registry() {
    let factory = NodeFactory::builder()
        .register::<TableName>()
        .register::<IndexColumn>()
        .register::<TableName>()
        .build();
    assert_eq!(factory.tags(), [NodeTag::TableName, NodeTag::IndexColumn]);
    assert!(factory.allocate(NodeTag::CreateIndex).is_err());
}

#[test_log::test]
fn shared_between_parser_threads() {
    let factory = Arc::new(NodeFactory::standard());
    let renders: Vec<String> = std::thread::scope(|s| {
        let workers: Vec<_> = (0..4)
            .map(|i| {
                let factory = factory.clone();
                s.spawn(move || {
                    let ctx = ParserContext::new();
                    let table = factory
                        .build(NodeTag::TableName, args!["orders"], &ctx, Span::new(0, 6))
                        .unwrap();
                    let column = factory
                        .build_typed::<IndexColumn>(
                            args![table, format!("c{i}"), i % 2 == 0],
                            &ctx,
                            Span::new(0, 9),
                        )
                        .unwrap();
                    let copy = factory.copy_tree(&*column, &ctx).unwrap();
                    copy.render()
                })
            })
            .collect();
        workers
            .into_iter()
            .map(|w| w.join().unwrap())
            .collect()
    });
    assert_eq!(renders.len(), 4);
    assert!(renders[0].starts_with("columnName: c0\ntableName:\n"));
    assert!(renders[0].ends_with("orders\n    span: 0..6\nascending\nspan: 0..9\n"));
    assert!(renders[3].ends_with("\ndescending\nspan: 0..9\n"));
}

#[test_log::test]
fn nodes_outlive_their_context() {
    let factory = NodeFactory::standard();
    let ctx = ParserContext::with_source("orders");
    let node = factory
        .build(NodeTag::TableName, vec![Arg::from("orders")], &ctx, Span::new(0, 6))
        .unwrap();
    assert_eq!(node.base().position().map(|p| p.column), Some(1));
    drop(ctx);
    assert!(!node.base().is_attached());
    assert_eq!(node.base().position(), None);
    assert_eq!(node.render(), "schemaName: null\ntableName: orders\nspan: 0..6\n");
}
