use proc_macro2::TokenStream;
use quote::format_ident;
use syn::{Expr, Ident};

use super::{Config, PropertyCodeGenerator};
use crate::metadata::Metadata;
use crate::model::PropertyDescriptor;
use crate::util::*;

/// Matches getters returning `Option`. Such properties start out as `None`
/// unless the constructor sets them.
pub fn create(config: &Config<'_>) -> Option<PropertyCodeGenerator> {
    let property = config.property;
    if !property.is_nullable() {
        return None;
    }

    let label = property.label();
    let setter = format_ident!("set_{label}");
    let default = config.builder_constructor.invocation(&setter).cloned();

    Some(PropertyCodeGenerator::Optional(OptionalProperty {
        property: property.clone(),
        nullable_setter: format_ident!("set_nullable_{label}"),
        clear_method: format_ident!("clear_{label}"),
        setter,
        default,
    }))
}

#[derive(Debug, Clone)]
pub struct OptionalProperty {
    pub property: PropertyDescriptor,
    pub setter: Ident,
    pub nullable_setter: Ident,
    pub clear_method: Ident,
    pub default: Option<Expr>,
}

impl OptionalProperty {
    pub fn add_value_field_declaration(&self, code: &mut TokenStream) {
        let PropertyDescriptor { name, ty, .. } = &self.property;
        code.extend(quote::quote! { #name: ::core::option::Option<#ty>, });
    }

    pub fn add_builder_field_initializer(&self, code: &mut TokenStream) {
        let PropertyDescriptor { name, ty, .. } = &self.property;
        code.extend(match &self.default {
            None => quote::quote! { #name: ::core::option::Option::None, },
            Some(default) => {
                let value = setter_conversion(ty, default);
                quote::quote! { #name: ::core::option::Option::Some(#value), }
            },
        });
    }

    pub fn add_builder_field_accessors(&self, code: &mut TokenStream, metadata: &Metadata) {
        let PropertyDescriptor {
            name,
            return_type,
            ty,
            doc,
            ..
        } = &self.property;
        let Self {
            setter,
            nullable_setter,
            clear_method,
            ..
        } = self;
        let type_name = &metadata.type_name;
        let builder = &metadata.builder;
        let doc = iter_doc_attrs(doc);

        let setter_doc = format!("Sets the value to be returned by [`{type_name}::{name}`].");
        let nullable_doc = format!(
            "Sets the value to be returned by [`{type_name}::{name}`], or clears it if `None`."
        );
        let clear_doc = format!("Sets [`{type_name}::{name}`] to return `None`.");
        let getter_doc = format!("Returns the value that will be returned by [`{type_name}::{name}`].");
        let param = setter_param(ty);
        let value = setter_conversion(ty, name);
        let read = self.property.read_fragment(quote::quote! { &self.#name });

        code.extend(quote::quote! {
            #[doc = #setter_doc]
            ///
            #(#doc)*
            pub fn #setter(&mut self, #name: #param) -> &mut #builder {
                self.#name = ::core::option::Option::Some(#value);
                self
            }

            #[doc = #nullable_doc]
            pub fn #nullable_setter(&mut self, #name: ::core::option::Option<#ty>) -> &mut #builder {
                self.#name = #name;
                self
            }

            #[doc = #clear_doc]
            pub fn #clear_method(&mut self) -> &mut #builder {
                self.#name = ::core::option::Option::None;
                self
            }

            #[doc = #getter_doc]
            pub fn #name(&self) -> #return_type {
                #read
            }
        });
    }

    pub fn add_field_assignment(&self, code: &mut TokenStream, builder: &Ident) {
        let name = &self.property.name;
        code.extend(quote::quote! { #name: ::core::clone::Clone::clone(&#builder.#name), });
    }

    pub fn add_merge_from_value(&self, code: &mut TokenStream, metadata: &Metadata, value: &Ident) {
        let name = &self.property.name;
        let nullable_setter = &self.nullable_setter;
        let type_name = &metadata.type_name;
        let owned = self
            .property
            .to_owned_fragment(quote::quote! { #type_name::#name(#value) });

        code.extend(quote::quote! { self.#nullable_setter(#owned); });
    }

    pub fn add_merge_from_builder(&self, code: &mut TokenStream, builder: &Ident) {
        let name = &self.property.name;
        let nullable_setter = &self.nullable_setter;
        let owned = self
            .property
            .to_owned_fragment(quote::quote! { #builder.#name() });

        code.extend(quote::quote! { self.#nullable_setter(#owned); });
    }

    pub fn add_set_from_result(&self, code: &mut TokenStream, builder: &Ident, variable: TokenStream) {
        let nullable_setter = &self.nullable_setter;
        code.extend(quote::quote! { #builder.#nullable_setter(#variable); });
    }
}
