//! Assembles the builder, value and partial types of one annotated trait.
//!
//! Type-level logic lives here. Everything that depends on a single property
//! is delegated to its [`PropertyCodeGenerator`], always in declaration order.

use proc_macro2::TokenStream;
use quote::format_ident;

use crate::metadata::{Metadata, StandardMethod, UnderrideLevel, variant_ident};
use crate::model::TypeKind;
use crate::property::{Kind, PropertyCodeGenerator, Storage};

const BUILDER_BUILD_MUST_USE: &str = "building a value does not change the builder";

/// Which of the two built types an impl is emitted for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Value,
    Partial,
}

impl Target {
    fn storage(self, property: &PropertyCodeGenerator) -> Storage {
        match self {
            Target::Value => property.value_storage(),
            Target::Partial => property.partial_storage(),
        }
    }

    fn ident(self, metadata: &Metadata) -> &syn::Ident {
        match self {
            Target::Value => &metadata.value_type,
            Target::Partial => &metadata.partial_type,
        }
    }
}

pub fn write_builder_source(metadata: &Metadata) -> TokenStream {
    let mut output = TokenStream::new();

    if metadata.has_required_properties() {
        output.extend(emit_property_enum(metadata));
        output.extend(emit_build_error(metadata));
    }

    output.extend(emit_builder(metadata));
    output.extend(emit_value(metadata));
    output.extend(emit_partial(metadata));

    for target in [Target::Value, Target::Partial] {
        output.extend(emit_eq(metadata, target));
        output.extend(emit_hash(metadata, target));
        output.extend(emit_display(metadata, target));
        output.extend(emit_debug(metadata, target));
    }

    if metadata.serde {
        output.extend(emit_serialize(metadata));
        output.extend(emit_deserialize(metadata));
    }

    output
}

fn emit_property_enum(metadata: &Metadata) -> TokenStream {
    let Metadata {
        type_name,
        vis,
        property_enum,
        ..
    } = metadata;

    let enum_doc = format!("The required properties of [`{type_name}`].");
    let labels: Vec<_> = metadata
        .required_properties()
        .map(|p| p.property().label())
        .collect();
    let variants: Vec<_> = labels.iter().map(|l| variant_ident(l)).collect();
    let variant_docs = metadata
        .required_properties()
        .map(|p| format!("The [`{type_name}::{}`] property.", p.name()));

    quote::quote! {
        #[doc = #enum_doc]
        #[derive(
            ::core::clone::Clone,
            ::core::marker::Copy,
            ::core::fmt::Debug,
            ::core::cmp::PartialEq,
            ::core::cmp::Eq,
            ::core::cmp::PartialOrd,
            ::core::cmp::Ord,
            ::core::hash::Hash,
        )]
        #vis enum #property_enum {
            #(
                #[doc = #variant_docs]
                #variants,
            )*
        }

        impl #property_enum {
            /// Returns the name of the property.
            pub fn as_str(self) -> &'static str {
                match self {
                    #( Self::#variants => #labels, )*
                }
            }
        }

        #[automatically_derived]
        impl ::core::fmt::Display for #property_enum {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    }
}

fn emit_build_error(metadata: &Metadata) -> TokenStream {
    let Metadata {
        type_name,
        vis,
        property_enum,
        build_error,
        ..
    } = metadata;

    let error_doc = format!(
        "Returned when building a [`{type_name}`] before all its required properties are set."
    );

    quote::quote! {
        #[doc = #error_doc]
        #[derive(
            ::core::clone::Clone,
            ::core::fmt::Debug,
            ::core::cmp::PartialEq,
            ::core::cmp::Eq,
        )]
        #vis struct #build_error {
            unset: ::std::vec::Vec<#property_enum>,
        }

        impl #build_error {
            fn new(unset: &::std::collections::BTreeSet<#property_enum>) -> Self {
                Self {
                    unset: ::core::iter::Iterator::collect(::core::iter::Iterator::copied(unset.iter())),
                }
            }

            /// The properties that were not set, in declaration order.
            pub fn unset_properties(&self) -> &[#property_enum] {
                &self.unset
            }
        }

        #[automatically_derived]
        impl ::core::fmt::Display for #build_error {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str("Not set: [")?;
                for (index, property) in ::core::iter::Iterator::enumerate(self.unset.iter()) {
                    if index != 0 {
                        f.write_str(", ")?;
                    }
                    f.write_str(property.as_str())?;
                }
                f.write_str("]")
            }
        }

        #[automatically_derived]
        impl ::std::error::Error for #build_error {}
    }
}

fn emit_builder(metadata: &Metadata) -> TokenStream {
    let Metadata {
        type_name,
        vis,
        builder,
        partial_type,
        property_enum,
        properties,
        ..
    } = metadata;

    let has_required = metadata.has_required_properties();

    let mut fields = TokenStream::new();
    let mut initializers = TokenStream::new();
    let mut accessors = TokenStream::new();
    for property in properties {
        property.add_builder_field_declaration(&mut fields);
        property.add_builder_field_initializer(&mut initializers);
        property.add_builder_field_accessors(&mut accessors, metadata);
    }

    if has_required {
        let variants = metadata
            .required_properties()
            .map(|p| metadata.property_variant(p.property()));
        fields.extend(quote::quote! {
            _unset_properties: ::std::collections::BTreeSet<#property_enum>,
        });
        initializers.extend(quote::quote! {
            _unset_properties: ::std::collections::BTreeSet::from([#(#variants),*]),
        });
    }

    let builder_doc = format!("Builder for [`{type_name}`].");
    let build_partial_doc =
        format!("Returns a newly-created partial [`{type_name}`] for use in unit tests.");
    let new_fn = if metadata.builder_factory {
        quote::quote! {
            /// Creates a builder with every property in its initial state.
            pub fn new() -> Self {
                Self { #initializers }
            }
        }
    } else {
        quote::quote! {
            #[allow(dead_code)]
            fn new() -> Self {
                Self { #initializers }
            }
        }
    };

    let joiner = emit_comma_joiner(metadata);
    let build = emit_build(metadata);
    let merge_from = emit_merge_from(metadata);
    let merge_from_builder = emit_merge_from_builder(metadata);
    let clear = emit_clear(metadata);

    let default_impl = metadata.builder_factory.then(|| {
        quote::quote! {
            #[automatically_derived]
            impl ::core::default::Default for #builder {
                fn default() -> Self {
                    Self::new()
                }
            }
        }
    });

    quote::quote! {
        #[doc = #builder_doc]
        #[derive(::core::clone::Clone)]
        #vis struct #builder {
            #fields
        }

        impl #builder {
            #joiner

            #new_fn

            #accessors

            #build

            #merge_from

            #merge_from_builder

            #clear

            #[doc = #build_partial_doc]
            ///
            /// State checking does not occur. Reading an unset required property
            /// of the result panics.
            #[must_use = #BUILDER_BUILD_MUST_USE]
            pub fn build_partial(&self) -> #partial_type {
                #partial_type::new(self)
            }
        }

        #default_impl
    }
}

/// The separator shared by both `Display` impls. Only needed when more than
/// one property may be rendered.
fn emit_comma_joiner(metadata: &Metadata) -> TokenStream {
    if metadata.properties.len() < 2
        || metadata.standard_method_underride(StandardMethod::Display) == UnderrideLevel::Final
    {
        return TokenStream::new();
    }

    quote::quote! {
        const COMMA_JOINER: &str = ", ";
    }
}

fn emit_build(metadata: &Metadata) -> TokenStream {
    let Metadata {
        type_name,
        value_type,
        build_error,
        ..
    } = metadata;

    let doc = format!("Returns a newly-created [`{type_name}`] based on the contents of this builder.");

    if metadata.has_required_properties() {
        quote::quote! {
            #[doc = #doc]
            ///
            /// # Errors
            ///
            /// Returns an error naming every required property that has not been set.
            pub fn build(&self) -> ::core::result::Result<#value_type, #build_error> {
                if !self._unset_properties.is_empty() {
                    return ::core::result::Result::Err(#build_error::new(&self._unset_properties));
                }
                #value_type::new(self)
            }
        }
    } else {
        quote::quote! {
            #[doc = #doc]
            #[must_use = #BUILDER_BUILD_MUST_USE]
            pub fn build(&self) -> #value_type {
                #value_type::new(self)
            }
        }
    }
}

fn emit_merge_from(metadata: &Metadata) -> TokenStream {
    let Metadata {
        type_name, builder, ..
    } = metadata;

    let value = format_ident!("value");
    let mut body = TokenStream::new();
    for property in &metadata.properties {
        property.add_merge_from_value(&mut body, metadata, &value);
    }

    let value_param = if body.is_empty() {
        format_ident!("_value")
    } else {
        value
    };

    quote::quote! {
        /// Sets all property values from the given instance.
        ///
        /// Lists are appended to, everything else is overwritten.
        pub fn merge_from(
            &mut self,
            #value_param: &(impl #type_name + ?::core::marker::Sized),
        ) -> &mut #builder {
            #body
            self
        }
    }
}

fn emit_merge_from_builder(metadata: &Metadata) -> TokenStream {
    let builder = &metadata.builder;
    let template = format_ident!("template");

    let mut body = TokenStream::new();
    for property in &metadata.properties {
        let mut merge = TokenStream::new();
        property.add_merge_from_builder(&mut merge, &template);

        if property.kind() == Kind::Required {
            let variant = metadata.property_variant(property.property());
            body.extend(quote::quote! {
                if !#template._unset_properties.contains(&#variant) {
                    #merge
                }
            });
        } else {
            body.extend(merge);
        }
    }

    let template_param = if body.is_empty() {
        format_ident!("_template")
    } else {
        template
    };

    quote::quote! {
        /// Copies values from the given builder.
        ///
        /// Required properties not set on `template` are left untouched.
        pub fn merge_from_builder(&mut self, #template_param: &#builder) -> &mut #builder {
            #body
            self
        }
    }
}

fn emit_clear(metadata: &Metadata) -> TokenStream {
    let Metadata {
        builder,
        properties,
        ..
    } = metadata;

    if !metadata.builder_factory {
        let receiver = quote::quote!(self);
        let mut body = TokenStream::new();
        for property in properties {
            property.add_partial_clear(&mut body, &receiver);
        }

        return quote::quote! {
            /// Ensures a subsequent `merge_from` call will make a copy of its input.
            ///
            /// The exact effect of this method is not guaranteed to remain stable.
            /// It should always be followed directly by a `merge_from` call.
            pub fn clear(&mut self) -> &mut #builder {
                #body
                self
            }
        };
    }

    let template = format_ident!("template");
    let needs_template = properties.iter().any(|p| p.is_template_required_in_clear());

    let mut body = TokenStream::new();
    if needs_template {
        let new_builder = metadata.new_builder();
        body.extend(quote::quote! { let #template = #new_builder; });
    }

    for property in properties {
        let template = property.is_template_required_in_clear().then_some(&template);
        property.add_clear(&mut body, template);
    }

    if metadata.has_required_properties() {
        body.extend(quote::quote! {
            self._unset_properties = #template._unset_properties;
        });
    }

    quote::quote! {
        /// Resets the state of this builder.
        pub fn clear(&mut self) -> &mut #builder {
            #body
            self
        }
    }
}

fn emit_value(metadata: &Metadata) -> TokenStream {
    let Metadata {
        type_name,
        vis,
        builder,
        value_type,
        build_error,
        properties,
        ..
    } = metadata;

    let builder_var = format_ident!("builder");
    let mut fields = TokenStream::new();
    let mut assignments = TokenStream::new();
    let mut getters = TokenStream::new();
    for property in properties {
        property.add_value_field_declaration(&mut fields);
        property.add_final_field_assignment(&mut assignments, &builder_var);

        let name = property.name();
        let return_type = &property.property().return_type;
        let read = property.read_value_fragment(quote::quote! { &self.#name });
        getters.extend(quote::quote! {
            fn #name(&self) -> #return_type {
                #read
            }
        });
    }

    let value_doc = format!("Immutable [`{type_name}`] built by [`{builder}`].");

    let new_fn = if metadata.has_required_properties() {
        quote::quote! {
            fn new(builder: &#builder) -> ::core::result::Result<Self, #build_error> {
                let unset = || #build_error::new(&builder._unset_properties);
                ::core::result::Result::Ok(Self { #assignments })
            }
        }
    } else if properties.is_empty() {
        quote::quote! {
            fn new(_builder: &#builder) -> Self {
                Self {}
            }
        }
    } else {
        quote::quote! {
            fn new(builder: &#builder) -> Self {
                Self { #assignments }
            }
        }
    };

    let conveniences = metadata.builder_factory.then(|| {
        let new_builder = metadata.new_builder();
        let receiver = quote::quote!(builder);
        let mut reset = TokenStream::new();
        for property in properties {
            property.add_partial_clear(&mut reset, &receiver);
        }
        quote::quote! {
            /// Creates a new builder.
            pub fn builder() -> #builder {
                #new_builder
            }

            /// Creates a builder with every property copied from this value.
            pub fn to_builder(&self) -> #builder {
                let mut builder = #new_builder;
                #reset
                builder.merge_from(self);
                builder
            }
        }
    });

    quote::quote! {
        #[doc = #value_doc]
        #[derive(::core::clone::Clone)]
        #vis struct #value_type {
            #fields
        }

        impl #value_type {
            #new_fn

            #conveniences
        }

        #[automatically_derived]
        impl #type_name for #value_type {
            #getters
        }
    }
}

fn emit_partial(metadata: &Metadata) -> TokenStream {
    let Metadata {
        type_name,
        vis,
        builder,
        partial_type,
        property_enum,
        properties,
        ..
    } = metadata;

    let builder_var = format_ident!("builder");
    let mut fields = TokenStream::new();
    let mut assignments = TokenStream::new();
    let mut getters = TokenStream::new();
    for property in properties {
        property.add_partial_field_declaration(&mut fields);
        property.add_partial_field_assignment(&mut assignments, &builder_var);

        let name = property.name();
        let return_type = &property.property().return_type;
        let body = if property.kind() == Kind::Required {
            let read = property.read_value_fragment(quote::quote! { #name });
            let message = format!("{} not set", property.property().label());
            quote::quote! {
                match &self.#name {
                    ::core::option::Option::Some(#name) => #read,
                    ::core::option::Option::None => ::core::panic!(#message),
                }
            }
        } else {
            property.read_value_fragment(quote::quote! { &self.#name })
        };

        getters.extend(quote::quote! {
            fn #name(&self) -> #return_type {
                #body
            }
        });
    }

    if metadata.has_required_properties() {
        fields.extend(quote::quote! {
            _unset_properties: ::std::collections::BTreeSet<#property_enum>,
        });
        assignments.extend(quote::quote! {
            _unset_properties: ::core::clone::Clone::clone(&builder._unset_properties),
        });
    }

    let builder_param = if assignments.is_empty() {
        format_ident!("_builder")
    } else {
        builder_var
    };

    let partial_doc = format!(
        "Partially-built [`{type_name}`], for tests. Reading an unset required property panics."
    );

    quote::quote! {
        #[doc = #partial_doc]
        #[derive(::core::clone::Clone)]
        #vis struct #partial_type {
            #fields
        }

        impl #partial_type {
            fn new(#builder_param: &#builder) -> Self {
                Self { #assignments }
            }
        }

        #[automatically_derived]
        impl #type_name for #partial_type {
            #getters
        }
    }
}

/// An expression for `field` that compares and hashes consistently, i.e. the
/// bit pattern of floats.
fn comparable(property: &PropertyCodeGenerator, storage: Storage, field: TokenStream) -> TokenStream {
    if property.element_kind() != TypeKind::Float {
        return quote::quote! { #field };
    }

    match storage {
        Storage::Plain => quote::quote! { #field.to_bits() },
        Storage::Optional => quote::quote! {
            ::core::option::Option::map(#field, |value| value.to_bits())
        },
        Storage::List => quote::quote! {
            ::core::iter::Iterator::map(#field.iter(), |value| value.to_bits())
        },
    }
}

fn emit_eq(metadata: &Metadata, target: Target) -> TokenStream {
    let Metadata {
        type_name,
        value_type,
        partial_type,
        ..
    } = metadata;
    let ty = target.ident(metadata);

    match (metadata.standard_method_underride(StandardMethod::Eq), target) {
        (UnderrideLevel::Final, _) => return TokenStream::new(),
        (UnderrideLevel::Overridable, Target::Value) => {
            return quote::quote! {
                #[automatically_derived]
                impl ::core::cmp::PartialEq for #value_type {
                    fn eq(&self, other: &Self) -> bool {
                        <Self as #type_name>::eq(self, other)
                    }
                }

                #[automatically_derived]
                impl ::core::cmp::PartialEq<#partial_type> for #value_type {
                    fn eq(&self, _other: &#partial_type) -> bool {
                        false
                    }
                }
            };
        },
        _ => {},
    }

    let mut comparisons = Vec::new();
    for property in &metadata.properties {
        let name = property.name();
        let storage = target.storage(property);
        let lhs = comparable(property, storage, quote::quote! { self.#name });
        let rhs = comparable(property, storage, quote::quote! { other.#name });

        comparisons.push(if property.element_kind() == TypeKind::Float && storage == Storage::List {
            quote::quote! { ::core::iter::Iterator::eq(#lhs, #rhs) }
        } else {
            quote::quote! { #lhs == #rhs }
        });
    }

    if target == Target::Partial && metadata.has_required_properties() {
        comparisons.push(quote::quote! { self._unset_properties == other._unset_properties });
    }

    let other = if comparisons.is_empty() {
        format_ident!("_other")
    } else {
        format_ident!("other")
    };

    quote::quote! {
        #[automatically_derived]
        impl ::core::cmp::PartialEq for #ty {
            fn eq(&self, #other: &Self) -> bool {
                #( #comparisons && )* true
            }
        }
    }
}

fn emit_hash(metadata: &Metadata, target: Target) -> TokenStream {
    let type_name = &metadata.type_name;
    let ty = target.ident(metadata);

    match (metadata.standard_method_underride(StandardMethod::Hash), target) {
        (UnderrideLevel::Final, _) => return TokenStream::new(),
        (UnderrideLevel::Overridable, Target::Value) => {
            return quote::quote! {
                #[automatically_derived]
                impl ::core::hash::Hash for #ty {
                    fn hash<H: ::core::hash::Hasher>(&self, state: &mut H) {
                        <Self as #type_name>::hash(self, state)
                    }
                }
            };
        },
        _ => {},
    }

    let mut statements = TokenStream::new();
    for property in &metadata.properties {
        let name = property.name();
        let storage = target.storage(property);

        statements.extend(if property.element_kind() == TypeKind::Float && storage == Storage::List {
            quote::quote! {
                ::core::hash::Hash::hash(&self.#name.len(), state);
                for value in &self.#name {
                    ::core::hash::Hash::hash(&value.to_bits(), state);
                }
            }
        } else {
            let field = comparable(property, storage, quote::quote! { self.#name });
            quote::quote! { ::core::hash::Hash::hash(&#field, state); }
        });
    }

    if target == Target::Partial && metadata.has_required_properties() {
        statements.extend(quote::quote! {
            ::core::hash::Hash::hash(&self._unset_properties, state);
        });
    }

    let state = if statements.is_empty() {
        format_ident!("_state")
    } else {
        format_ident!("state")
    };

    quote::quote! {
        #[automatically_derived]
        impl ::core::hash::Hash for #ty {
            fn hash<H: ::core::hash::Hasher>(&self, #state: &mut H) {
                #statements
            }
        }
    }
}

/// Writes `name=value` for one property. `value` is a reference to the
/// stored value.
fn display_field(property: &PropertyCodeGenerator, value: TokenStream) -> TokenStream {
    let prefix = format!("{}=", property.property().label());

    match property.value_storage() {
        Storage::List => quote::quote! {
            f.write_str(#prefix)?;
            f.write_str("[")?;
            for (index, element) in ::core::iter::Iterator::enumerate(
                ::core::iter::IntoIterator::into_iter(#value),
            ) {
                if index != 0 {
                    f.write_str(", ")?;
                }
                ::core::fmt::Display::fmt(element, f)?;
            }
            f.write_str("]")?;
        },
        _ => quote::quote! {
            f.write_str(#prefix)?;
            ::core::fmt::Display::fmt(#value, f)?;
        },
    }
}

fn emit_display(metadata: &Metadata, target: Target) -> TokenStream {
    let Metadata {
        type_name, builder, ..
    } = metadata;
    let ty = target.ident(metadata);

    match (metadata.standard_method_underride(StandardMethod::Display), target) {
        (UnderrideLevel::Final, _) => return TokenStream::new(),
        (UnderrideLevel::Overridable, Target::Value) => {
            return quote::quote! {
                #[automatically_derived]
                impl ::core::fmt::Display for #ty {
                    fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                        <Self as #type_name>::fmt(self, f)
                    }
                }
            };
        },
        _ => {},
    }

    let properties = &metadata.properties;
    let any_conditional = properties
        .iter()
        .any(|p| target.storage(p) == Storage::Optional);
    let use_separator_var = properties.len() > 1 && any_conditional;

    let mut body = TokenStream::new();
    if use_separator_var {
        body.extend(quote::quote! { let mut separator = ""; });
    }

    for (index, property) in properties.iter().enumerate() {
        let name = property.name();
        let (leading, trailing) = if use_separator_var {
            (
                quote::quote! { f.write_str(separator)?; },
                quote::quote! { separator = #builder::COMMA_JOINER; },
            )
        } else if index != 0 {
            (
                quote::quote! { f.write_str(#builder::COMMA_JOINER)?; },
                TokenStream::new(),
            )
        } else {
            (TokenStream::new(), TokenStream::new())
        };

        body.extend(if target.storage(property) == Storage::Optional {
            let field = display_field(property, quote::quote! { value });
            quote::quote! {
                if let ::core::option::Option::Some(value) = &self.#name {
                    #leading
                    #field
                    #trailing
                }
            }
        } else {
            let field = display_field(property, quote::quote! { &self.#name });
            quote::quote! {
                #leading
                #field
                #trailing
            }
        });
    }

    let open = match target {
        Target::Value => format!("{type_name}{{"),
        Target::Partial => format!("partial {type_name}{{"),
    };
    let allow = use_separator_var.then(|| quote::quote! { #[allow(unused_assignments)] });

    quote::quote! {
        #[automatically_derived]
        impl ::core::fmt::Display for #ty {
            #allow
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                f.write_str(#open)?;
                #body
                f.write_str("}")
            }
        }
    }
}

fn emit_debug(metadata: &Metadata, target: Target) -> TokenStream {
    if metadata.debug_supertrait {
        return TokenStream::new();
    }

    let ty = target.ident(metadata);
    quote::quote! {
        #[automatically_derived]
        impl ::core::fmt::Debug for #ty {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(self, f)
            }
        }
    }
}

fn emit_serialize(metadata: &Metadata) -> TokenStream {
    let Metadata {
        type_name,
        value_type,
        properties,
        ..
    } = metadata;

    let struct_name = type_name.to_string();
    let len = properties.len();
    let names = properties.iter().map(|p| p.name());
    let labels = properties.iter().map(|p| p.property().label());

    let state = if properties.is_empty() {
        quote::quote! { state }
    } else {
        quote::quote! { mut state }
    };

    quote::quote! {
        #[automatically_derived]
        impl ::serde::Serialize for #value_type {
            fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
            where
                S: ::serde::Serializer,
            {
                let #state = ::serde::Serializer::serialize_struct(serializer, #struct_name, #len)?;
                #(
                    ::serde::ser::SerializeStruct::serialize_field(&mut state, #labels, &self.#names)?;
                )*
                ::serde::ser::SerializeStruct::end(state)
            }
        }
    }
}

/// Deserializes through a shadow struct, then applies each field through the
/// builder's setters so that building validates the result.
fn emit_deserialize(metadata: &Metadata) -> TokenStream {
    let Metadata {
        builder,
        value_type,
        properties,
        ..
    } = metadata;

    let fields_var = format_ident!("fields");
    let builder_var = format_ident!("builder");

    let names = properties.iter().map(|p| p.name());
    let field_types = properties.iter().map(|p| p.serialized_field_type());

    let mut apply = TokenStream::new();
    for property in properties {
        let name = property.name();
        property.add_set_from_result(&mut apply, &builder_var, quote::quote! { #fields_var.#name });
    }

    let (fields_binding, builder_binding) = if properties.is_empty() {
        (quote::quote! { _fields }, quote::quote! { #builder_var })
    } else {
        (quote::quote! { #fields_var }, quote::quote! { mut #builder_var })
    };

    let result = if metadata.has_required_properties() {
        quote::quote! { #builder_var.build().map_err(::serde::de::Error::custom) }
    } else {
        quote::quote! { ::core::result::Result::Ok(#builder_var.build()) }
    };

    quote::quote! {
        const _: () = {
            #[derive(::serde::Deserialize, ::core::default::Default)]
            #[serde(default)]
            struct Fields {
                #( #names: #field_types, )*
            }

            #[automatically_derived]
            impl<'de> ::serde::Deserialize<'de> for #value_type {
                fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
                where
                    D: ::serde::Deserializer<'de>,
                {
                    let #fields_binding = <Fields as ::serde::Deserialize<'de>>::deserialize(deserializer)?;
                    let #builder_binding = #builder::new();
                    #apply
                    #result
                }
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;
    use syn::ItemTrait;

    use super::*;
    use crate::free_builder_impl::entry_point;

    fn expand(args: TokenStream, item: ItemTrait) -> String {
        entry_point(args, item).unwrap().to_string()
    }

    #[rstest]
    #[case::none(syn::parse_quote! { trait T {} }, false)]
    #[case::one(syn::parse_quote! { trait T { fn a(&self) -> u32; } }, false)]
    #[case::two(syn::parse_quote! { trait T { fn a(&self) -> u32; fn b(&self) -> u32; } }, true)]
    #[case::two_final_display(
        syn::parse_quote! { trait T: ::core::fmt::Display { fn a(&self) -> u32; fn b(&self) -> u32; } },
        false
    )]
    fn comma_joiner(#[case] item: ItemTrait, #[case] expected: bool) {
        let output = expand(TokenStream::new(), item);
        assert_eq!(output.contains("COMMA_JOINER"), expected);
    }

    #[test]
    fn required_tracking_only_with_required_properties() {
        let output = expand(
            TokenStream::new(),
            syn::parse_quote! {
                trait Config {
                    #[builder(default = 1)]
                    fn retries(&self) -> u32;
                    fn proxy(&self) -> Option<&str>;
                }
            },
        );

        assert!(!output.contains("ConfigProperty"));
        assert!(!output.contains("ConfigBuildError"));
        assert!(!output.contains("_unset_properties"));

        let output = expand(
            TokenStream::new(),
            syn::parse_quote! {
                trait Config {
                    fn host(&self) -> &str;
                }
            },
        );

        assert!(output.contains("enum ConfigProperty"));
        assert!(output.contains("struct ConfigBuildError"));
        assert!(output.contains("_unset_properties"));
    }

    #[test]
    fn final_methods_are_not_generated() {
        let output = expand(
            TokenStream::new(),
            syn::parse_quote! {
                trait Id: PartialEq + ::core::hash::Hash {
                    fn id(&self) -> u64;
                }
            },
        );

        assert!(!output.contains("PartialEq for IdValue"));
        assert!(!output.contains("Hash for IdValue"));
        assert!(output.contains("Display for IdValue"));
        assert!(output.contains("Debug for IdValue"));
    }

    #[test]
    fn overridable_eq_makes_partials_unequal() {
        let output = expand(
            TokenStream::new(),
            syn::parse_quote! {
                trait Id {
                    fn id(&self) -> u64;
                    fn eq(&self, other: &Self) -> bool {
                        self.id() == other.id()
                    }
                }
            },
        );

        assert!(output.contains("PartialEq < IdPartial > for IdValue"));
        assert!(output.contains("< Self as Id > :: eq"));
        assert!(!output.contains("< Self as Id > :: hash"));
    }

    #[test]
    fn no_factory_hides_constructor() {
        let output = expand(
            quote::quote!(builder_factory = false),
            syn::parse_quote! {
                trait Id {
                    fn id(&self) -> u64;
                }
            },
        );

        assert!(!output.contains("pub fn new"));
        assert!(!output.contains("Default for IdBuilder"));
        assert!(!output.contains("to_builder"));
    }

    #[test]
    fn invalid_getters_are_reported_with_the_trait() {
        let output = expand(
            TokenStream::new(),
            syn::parse_quote! {
                trait Id {
                    fn id(&mut self) -> u64;
                    fn name(&self, other: u32) -> &str;
                }
            },
        );

        assert_eq!(output.matches("compile_error").count(), 2);
        assert!(output.contains("trait Id"));
        assert!(!output.contains("IdBuilder"));
    }

    #[test]
    fn rejects_generic_traits() {
        let item: ItemTrait = syn::parse_quote! {
            trait Id<T> {
                fn id(&self) -> T;
            }
        };

        assert!(entry_point(TokenStream::new(), item).is_err());
    }
}
