use proc_macro::TokenStream;
use quote::quote;
use syn::parse_macro_input;

const NODE_ATTR: &str = "node";
const TAG_PATH: &str = "tag";
const CHILD_PATH: &str = "child";
const BARE_PATH: &str = "bare";
const LABEL_PATH: &str = "label";

const BASE_FIELD: &str = "base";
const FIELDS_FIELD: &str = "fields";

/// Implements [query_tree::node::Variant] for a node shell.
///
/// The struct must have a `base: NodeBase` field and a `fields: Slot<F>`
/// field, where `F` implements `Initializer`. Every other field is
/// rejected: construct-specific data lives in `F`, so that the shell can be
/// allocated empty and filled exactly once.
///
/// The variant tag defaults to the struct name and can be overridden with
/// `#[node(tag = OtherName)]`.
#[proc_macro_derive(Variant, attributes(node))]
pub fn node_variant(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as syn::DeriveInput);
    let name = &item.ident;

    let syn::Data::Struct(data) = &item.data else {
        panic!("Only structs can be node variants")
    };

    if find_field(&data.fields, BASE_FIELD).is_none() {
        panic!("node variant `{name}` is missing a `{BASE_FIELD}: NodeBase` field");
    }
    let Some(slot) = find_field(&data.fields, FIELDS_FIELD) else {
        panic!("node variant `{name}` is missing a `{FIELDS_FIELD}: Slot<...>` field");
    };
    if data.fields.len() != 2 {
        panic!("node variant `{name}` must only have `{BASE_FIELD}` and `{FIELDS_FIELD}` fields");
    }
    let slot_ty = &slot.ty;

    let mut tag = name.clone();
    for attr in item.attrs.iter().filter(|a| a.path().is_ident(NODE_ATTR)) {
        attr.parse_nested_meta(|m| {
            if m.path.is_ident(TAG_PATH) {
                tag = m.value()?.parse::<syn::Ident>()?;
                Ok(())
            } else {
                Err(m.error("unknown #[node(...)] option on a variant"))
            }
        })
        .unwrap_or_else(|e| panic!("Internal error during parsing of #[node()] attribute: {e}"));
    }

    let output = quote! {
        impl ::query_tree::node::Variant for #name {
            const TAG: ::query_tree::node::NodeTag = ::query_tree::node::NodeTag::#tag;
            type Fields = <#slot_ty as ::query_tree::node::SlotOf>::Fields;

            fn node_base(&self) -> &::query_tree::node::NodeBase {
                &self.base
            }

            fn node_base_mut(&mut self) -> &mut ::query_tree::node::NodeBase {
                &mut self.base
            }

            fn slot(&self) -> &::query_tree::node::Slot<Self::Fields> {
                &self.fields
            }

            fn slot_mut(&mut self) -> &mut ::query_tree::node::Slot<Self::Fields> {
                &mut self.fields
            }
        }
    };

    TokenStream::from(output)
}

/// Implements [query_tree::node::NodeFields] for the data of a node variant.
///
/// Fields are copied, rendered and traversed in declaration order. Each
/// field is either a value (copied by value, rendered as `label: value`) or,
/// with `#[node(child)]`, an owned child node (`Box<T>`, `Option<Box<T>>` or
/// `Vec<Box<T>>`) that is cloned through the node cloner and rendered
/// nested.
///
/// Labels default to the camel-cased field name. `#[node(label = "...")]`
/// overrides it, `#[node(bare)]` renders a value without any label.
#[proc_macro_derive(NodeFields, attributes(node))]
pub fn node_fields(input: TokenStream) -> TokenStream {
    let item = parse_macro_input!(input as syn::DeriveInput);
    let name = &item.ident;

    let syn::Data::Struct(data) = &item.data else {
        panic!("Only structs can hold node fields")
    };
    let syn::Fields::Named(named) = &data.fields else {
        panic!("node fields of `{name}` must be named")
    };

    let mut copies = proc_macro2::TokenStream::new();
    let mut writes = proc_macro2::TokenStream::new();
    let mut children = proc_macro2::TokenStream::new();

    for field in &named.named {
        let Some(ident) = &field.ident else {
            unreachable!()
        };
        let opts = FieldOptions::parse(field);
        let label = opts.label.unwrap_or_else(|| camel_case(&ident.to_string()));

        if opts.child {
            if opts.bare {
                panic!("child field `{ident}` of `{name}` cannot be bare");
            }
            copies.extend(quote! {
                #ident: ::query_tree::node::ChildField::copy_child(&self.#ident, cloner)?,
            });
            writes.extend(quote! {
                ::query_tree::node::ChildField::write_child(&self.#ident, #label, sink);
            });
            children.extend(quote! {
                ::query_tree::node::ChildField::collect(&self.#ident, #label, &mut out);
            });
        } else {
            let label = if opts.bare {
                quote!(::std::option::Option::None)
            } else {
                quote!(::std::option::Option::Some(#label))
            };
            copies.extend(quote! {
                #ident: ::query_tree::node::ValueField::copy_value(&self.#ident),
            });
            writes.extend(quote! {
                ::query_tree::node::ValueField::write_value(&self.#ident, #label, sink);
            });
        }
    }

    let output = quote! {
        impl ::query_tree::node::NodeFields for #name {
            #[allow(unused_variables)]
            fn copy_fields(
                &self,
                cloner: &dyn ::query_tree::node::NodeCloner,
            ) -> ::std::result::Result<Self, ::query_tree::errors::NodeError> {
                ::std::result::Result::Ok(Self {
                    #copies
                })
            }

            #[allow(unused_variables)]
            fn write_fields(&self, sink: &mut dyn ::query_tree::node::FieldSink) {
                #writes
            }

            fn children(&self) -> ::std::vec::Vec<::query_tree::node::Child<'_>> {
                #[allow(unused_mut)]
                let mut out = ::std::vec::Vec::new();
                #children
                out
            }
        }
    };

    TokenStream::from(output)
}

#[derive(Default)]
struct FieldOptions {
    child: bool,
    bare: bool,
    label: Option<String>,
}

impl FieldOptions {
    fn parse(field: &syn::Field) -> FieldOptions {
        let mut opts = FieldOptions::default();
        for attr in field.attrs.iter().filter(|a| a.path().is_ident(NODE_ATTR)) {
            attr.parse_nested_meta(|m| {
                if m.path.is_ident(CHILD_PATH) {
                    opts.child = true;
                } else if m.path.is_ident(BARE_PATH) {
                    opts.bare = true;
                } else if m.path.is_ident(LABEL_PATH) {
                    opts.label = Some(m.value()?.parse::<syn::LitStr>()?.value());
                } else {
                    return Err(m.error("unknown #[node(...)] option on a field"));
                }
                Ok(())
            })
            .unwrap_or_else(|e| panic!("Internal error during parsing of #[node()] attribute: {e}"));
        }
        opts
    }
}

fn find_field<'a>(fields: &'a syn::Fields, name: &str) -> Option<&'a syn::Field> {
    fields
        .iter()
        .find(|f| f.ident.as_ref().map_or(false, |i| i == name))
}

/// `column_name` -> `columnName`
fn camel_case(name: &str) -> String {
    let name = name.strip_prefix("r#").unwrap_or(name);
    let mut out = String::with_capacity(name.len());
    let mut upper = false;
    for c in name.chars() {
        if c == '_' {
            upper = !out.is_empty();
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}
