//! Derive macros for the Lariat SDK.

use proc_macro::TokenStream;
use proc_macro2::Span;
use quote::quote;
use syn::spanned::Spanned;
use syn::{parse_macro_input, Data, DeriveInput, Fields};

const MAX_AGGREGATE_FIELDS: usize = 10;

/// Derive the aggregate codec for a plain struct with named fields.
///
/// Expands to `Aggregate`, `ToStack` and `FromStack` impls: fields are
/// pushed in declaration order, one run of slots per field, and decoding
/// walks the same slots back with a cursor, failing fast on the first
/// field that does not match. Every field type must itself implement the
/// codec traits, so unsupported field types surface as ordinary trait
/// bound errors at the use site.
#[proc_macro_derive(Aggregate)]
pub fn derive_aggregate(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return compile_error(
            input.generics.span(),
            "#[derive(Aggregate)] does not support generic structs",
        );
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return compile_error(
                    Span::call_site(),
                    "#[derive(Aggregate)] requires a struct with named fields",
                )
            }
        },
        _ => {
            return compile_error(
                Span::call_site(),
                "#[derive(Aggregate)] only applies to structs",
            )
        }
    };

    if fields.is_empty() {
        return compile_error(
            Span::call_site(),
            "#[derive(Aggregate)] requires at least one field",
        );
    }
    if fields.len() > MAX_AGGREGATE_FIELDS {
        return compile_error(
            Span::call_site(),
            "#[derive(Aggregate)] supports at most 10 fields",
        );
    }

    let field_count = fields.len();
    let names: Vec<_> = fields
        .iter()
        .filter_map(|f| f.ident.clone())
        .collect();
    let types: Vec<_> = fields.iter().map(|f| f.ty.clone()).collect();

    let expanded = quote! {
        impl ::lariat_sdk::Aggregate for #name {
            const FIELD_COUNT: usize = #field_count;
        }

        impl ::lariat_sdk::ToStack for #name {
            const CATEGORY: ::lariat_sdk::Category = ::lariat_sdk::Category::Aggregate;
            const SLOT_COUNT: usize =
                0 #(+ <#types as ::lariat_sdk::ToStack>::SLOT_COUNT)*;

            fn push(self, vm: &mut ::lariat_sdk::Vm) {
                #(::lariat_sdk::ToStack::push(self.#names, vm);)*
            }
        }

        impl ::lariat_sdk::FromStack for #name {
            const CATEGORY: ::lariat_sdk::Category = ::lariat_sdk::Category::Aggregate;
            const SLOT_COUNT: usize =
                0 #(+ <#types as ::lariat_sdk::FromStack>::SLOT_COUNT)*;

            #[allow(unused_assignments)]
            fn is(vm: &::lariat_sdk::Vm, index: i32) -> bool {
                let base = match vm.absolute(index) {
                    Some(base) => base,
                    None => return false,
                };
                if base + <Self as ::lariat_sdk::FromStack>::SLOT_COUNT - 1 > vm.stack_size() {
                    return false;
                }
                let mut cursor = base as i32;
                #(
                    if !<#types as ::lariat_sdk::FromStack>::is(vm, cursor) {
                        return false;
                    }
                    cursor += <#types as ::lariat_sdk::FromStack>::SLOT_COUNT as i32;
                )*
                true
            }

            #[allow(unused_assignments)]
            fn get(
                vm: &::lariat_sdk::Vm,
                index: i32,
            ) -> Result<Self, ::lariat_sdk::MarshalError> {
                let base = vm.absolute(index).ok_or_else(|| {
                    ::lariat_sdk::MarshalError::new(
                        index,
                        ::lariat_sdk::TypeTag::None.name(),
                        <Self as ::lariat_sdk::FromStack>::type_name(),
                    )
                })?;
                let mut cursor = base as i32;
                #(
                    let #names = <#types as ::lariat_sdk::FromStack>::get(vm, cursor)?;
                    cursor += <#types as ::lariat_sdk::FromStack>::SLOT_COUNT as i32;
                )*
                Ok(Self { #(#names),* })
            }

            fn type_name() -> &'static str {
                stringify!(#name)
            }
        }
    };

    expanded.into()
}

fn compile_error(span: Span, message: &str) -> TokenStream {
    syn::Error::new(span, message).to_compile_error().into()
}
