use proc_macro2::TokenStream;
use quote::format_ident;
use syn::{Expr, Ident};

use super::{Config, PropertyCodeGenerator};
use crate::metadata::Metadata;
use crate::model::PropertyDescriptor;
use crate::util::*;

/// Reference semantics for any type. Required, unless the builder's
/// constructor calls the setter, in which case the property has a default.
pub fn create(config: &Config<'_>) -> PropertyCodeGenerator {
    let property = config.property;
    let setter = format_ident!("set_{}", property.label());
    let default = config.builder_constructor.invocation(&setter).cloned();

    PropertyCodeGenerator::Default(DefaultProperty {
        property: property.clone(),
        setter,
        default,
    })
}

#[derive(Debug, Clone)]
pub struct DefaultProperty {
    pub property: PropertyDescriptor,
    pub setter: Ident,
    /// Argument the builder constructor passes to the setter.
    pub default: Option<Expr>,
}

impl DefaultProperty {
    fn is_required(&self) -> bool {
        self.default.is_none()
    }

    pub fn add_builder_field_declaration(&self, code: &mut TokenStream) {
        let PropertyDescriptor { name, ty, .. } = &self.property;
        code.extend(if self.is_required() {
            quote::quote! { #name: ::core::option::Option<#ty>, }
        } else {
            quote::quote! { #name: #ty, }
        });
    }

    pub fn add_builder_field_initializer(&self, code: &mut TokenStream) {
        let PropertyDescriptor { name, ty, .. } = &self.property;
        code.extend(match &self.default {
            None => quote::quote! { #name: ::core::option::Option::None, },
            Some(default) => {
                let value = setter_conversion(ty, default);
                quote::quote! { #name: #value, }
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
        let setter = &self.setter;
        let type_name = &metadata.type_name;
        let builder = &metadata.builder;
        let doc = iter_doc_attrs(doc);

        let setter_doc = format!("Sets the value to be returned by [`{type_name}::{name}`].");
        let getter_doc = format!("Returns the value that will be returned by [`{type_name}::{name}`].");
        let param = setter_param(ty);
        let value = setter_conversion(ty, name);

        if self.is_required() {
            let variant = metadata.property_variant(&self.property);
            let read = self.property.read_fragment(quote::quote! { #name });
            let message = format!("{} not set", self.property.label());

            code.extend(quote::quote! {
                #[doc = #setter_doc]
                ///
                #(#doc)*
                pub fn #setter(&mut self, #name: #param) -> &mut #builder {
                    self.#name = ::core::option::Option::Some(#value);
                    self._unset_properties.remove(&#variant);
                    self
                }

                #[doc = #getter_doc]
                ///
                /// # Panics
                ///
                /// Panics if the value has not been set.
                pub fn #name(&self) -> #return_type {
                    match &self.#name {
                        ::core::option::Option::Some(#name) => #read,
                        ::core::option::Option::None => ::core::panic!(#message),
                    }
                }
            });
        } else {
            let read = self.property.read_fragment(quote::quote! { &self.#name });

            code.extend(quote::quote! {
                #[doc = #setter_doc]
                ///
                #(#doc)*
                pub fn #setter(&mut self, #name: #param) -> &mut #builder {
                    self.#name = #value;
                    self
                }

                #[doc = #getter_doc]
                pub fn #name(&self) -> #return_type {
                    #read
                }
            });
        }
    }

    pub fn add_value_field_declaration(&self, code: &mut TokenStream) {
        let PropertyDescriptor { name, ty, .. } = &self.property;
        code.extend(quote::quote! { #name: #ty, });
    }

    pub fn add_final_field_assignment(&self, code: &mut TokenStream, builder: &Ident) {
        let name = &self.property.name;
        code.extend(if self.is_required() {
            quote::quote! {
                #name: ::core::option::Option::ok_or_else(
                    ::core::clone::Clone::clone(&#builder.#name),
                    unset,
                )?,
            }
        } else {
            quote::quote! { #name: ::core::clone::Clone::clone(&#builder.#name), }
        });
    }

    pub fn add_partial_field_assignment(&self, code: &mut TokenStream, builder: &Ident) {
        let name = &self.property.name;
        code.extend(quote::quote! { #name: ::core::clone::Clone::clone(&#builder.#name), });
    }

    pub fn add_merge_from_value(&self, code: &mut TokenStream, metadata: &Metadata, value: &Ident) {
        let name = &self.property.name;
        let setter = &self.setter;
        let type_name = &metadata.type_name;
        let owned = self
            .property
            .to_owned_fragment(quote::quote! { #type_name::#name(#value) });

        code.extend(quote::quote! { self.#setter(#owned); });
    }

    pub fn add_merge_from_builder(&self, code: &mut TokenStream, builder: &Ident) {
        let name = &self.property.name;
        let setter = &self.setter;
        let owned = self
            .property
            .to_owned_fragment(quote::quote! { #builder.#name() });

        code.extend(quote::quote! { self.#setter(#owned); });
    }

    pub fn add_set_from_result(&self, code: &mut TokenStream, builder: &Ident, variable: TokenStream) {
        let setter = &self.setter;
        code.extend(quote::quote! {
            if let ::core::option::Option::Some(value) = #variable {
                #builder.#setter(value);
            }
        });
    }
}
