use proc_macro2::TokenStream;
use quote::format_ident;
use syn::{Expr, Ident, Type};

use super::{Config, PropertyCodeGenerator};
use crate::metadata::Metadata;
use crate::model::{GetterShape, PropertyDescriptor};
use crate::util::*;

/// Matches getters returning `&[E]` or `&Vec<E>`.
///
/// Lists are never unset; they start empty, or with the elements the
/// constructor passes to the bulk setter, and merging appends.
pub fn create(config: &Config<'_>) -> Option<PropertyCodeGenerator> {
    let property = config.property;
    if property.shape != GetterShape::Ref {
        return None;
    }

    if last_segment_ident(&property.ty).is_none_or(|ident| ident != "Vec") {
        return None;
    }

    let element = first_generic_arg(&property.ty)?.clone();
    let label = property.label();
    let setter = format_ident!("set_{label}");
    let default = config.builder_constructor.invocation(&setter).cloned();

    Some(PropertyCodeGenerator::List(ListProperty {
        property: property.clone(),
        element,
        adder: format_ident!("add_{label}"),
        bulk_adder: format_ident!("add_all_{label}"),
        clear_method: format_ident!("clear_{label}"),
        setter,
        default,
    }))
}

#[derive(Debug, Clone)]
pub struct ListProperty {
    pub property: PropertyDescriptor,
    pub element: Type,
    pub adder: Ident,
    pub bulk_adder: Ident,
    pub setter: Ident,
    pub clear_method: Ident,
    /// Initial elements, passed to the setter by the constructor.
    pub default: Option<Expr>,
}

impl ListProperty {
    pub fn add_value_field_declaration(&self, code: &mut TokenStream) {
        let name = &self.property.name;
        let element = &self.element;
        code.extend(quote::quote! { #name: ::std::vec::Vec<#element>, });
    }

    pub fn add_builder_field_initializer(&self, code: &mut TokenStream) {
        let name = &self.property.name;
        let element = &self.element;
        code.extend(match &self.default {
            None => quote::quote! { #name: ::std::vec::Vec::new(), },
            Some(default) => quote::quote! {
                #name: <::std::vec::Vec<#element> as ::core::iter::FromIterator<#element>>::from_iter(#default),
            },
        });
    }

    pub fn add_builder_field_accessors(&self, code: &mut TokenStream, metadata: &Metadata) {
        let PropertyDescriptor {
            name,
            return_type,
            doc,
            ..
        } = &self.property;
        let Self {
            element,
            adder,
            bulk_adder,
            setter,
            clear_method,
            ..
        } = self;
        let type_name = &metadata.type_name;
        let builder = &metadata.builder;
        let doc = iter_doc_attrs(doc);

        let adder_doc = format!("Adds an element to the list returned by [`{type_name}::{name}`].");
        let bulk_adder_doc =
            format!("Adds each element to the list returned by [`{type_name}::{name}`].");
        let setter_doc = format!("Replaces the list returned by [`{type_name}::{name}`].");
        let clear_doc = format!("Removes all elements from the list returned by [`{type_name}::{name}`].");
        let getter_doc = format!("Returns the list that will be returned by [`{type_name}::{name}`].");
        let param = setter_param(element);
        let value = setter_conversion(element, quote::quote! { element });

        code.extend(quote::quote! {
            #[doc = #adder_doc]
            ///
            #(#doc)*
            pub fn #adder(&mut self, element: #param) -> &mut #builder {
                self.#name.push(#value);
                self
            }

            #[doc = #bulk_adder_doc]
            pub fn #bulk_adder(
                &mut self,
                elements: impl ::core::iter::IntoIterator<Item = #element>,
            ) -> &mut #builder {
                ::core::iter::Extend::extend(&mut self.#name, elements);
                self
            }

            #[doc = #setter_doc]
            pub fn #setter(
                &mut self,
                elements: impl ::core::iter::IntoIterator<Item = #element>,
            ) -> &mut #builder {
                self.#name.clear();
                self.#bulk_adder(elements)
            }

            #[doc = #clear_doc]
            pub fn #clear_method(&mut self) -> &mut #builder {
                self.#name.clear();
                self
            }

            #[doc = #getter_doc]
            pub fn #name(&self) -> #return_type {
                &self.#name
            }
        });
    }

    pub fn add_field_assignment(&self, code: &mut TokenStream, builder: &Ident) {
        let name = &self.property.name;
        code.extend(quote::quote! { #name: ::core::clone::Clone::clone(&#builder.#name), });
    }

    pub fn add_merge_from_value(&self, code: &mut TokenStream, metadata: &Metadata, value: &Ident) {
        let name = &self.property.name;
        let bulk_adder = &self.bulk_adder;
        let type_name = &metadata.type_name;

        code.extend(quote::quote! {
            self.#bulk_adder(::core::iter::Iterator::cloned(#type_name::#name(#value).iter()));
        });
    }

    pub fn add_merge_from_builder(&self, code: &mut TokenStream, builder: &Ident) {
        let name = &self.property.name;
        let bulk_adder = &self.bulk_adder;

        code.extend(quote::quote! {
            self.#bulk_adder(::core::iter::Iterator::cloned(#builder.#name.iter()));
        });
    }

    pub fn add_set_from_result(&self, code: &mut TokenStream, builder: &Ident, variable: TokenStream) {
        let setter = &self.setter;
        code.extend(quote::quote! {
            if let ::core::option::Option::Some(elements) = #variable {
                #builder.#setter(elements);
            }
        });
    }

    pub fn add_partial_clear(&self, code: &mut TokenStream, receiver: &TokenStream) {
        let name = &self.property.name;
        code.extend(quote::quote! { #receiver.#name.clear(); });
    }
}
