//! Per-property code generation.
//!
//! Every getter of the annotated trait is classified into one
//! [`PropertyCodeGenerator`] by running it through [`FACTORIES`] in order.
//! The first factory that recognizes the property wins, anything left over is
//! handled by the default factory. The assembler then asks each generator for
//! its share of the builder, value and partial types.

use proc_macro2::TokenStream;
use syn::Ident;

use crate::metadata::{BuilderConstructor, Metadata};
use crate::model::{PropertyDescriptor, TypeKind};

pub mod default_property;
pub mod list_property;
pub mod optional_property;

pub use default_property::DefaultProperty;
pub use list_property::ListProperty;
pub use optional_property::OptionalProperty;

/// Everything a factory may inspect to classify a property.
pub struct Config<'a> {
    pub property: &'a PropertyDescriptor,
    pub builder_constructor: &'a BuilderConstructor,
}

pub type Factory = fn(&Config<'_>) -> Option<PropertyCodeGenerator>;

/// Factories tried before falling back to [`default_property::create`].
pub static FACTORIES: &[Factory] = &[list_property::create, optional_property::create];

pub fn classify(config: &Config<'_>) -> PropertyCodeGenerator {
    FACTORIES
        .iter()
        .find_map(|factory| factory(config))
        .unwrap_or_else(|| default_property::create(config))
}

/// The semantic category of a property, as seen by the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Kind {
    /// Must be set before a value can be built.
    Required,
    /// Always holds a value, starting from the one the constructor sets.
    HasDefault,
    /// May be absent.
    Optional,
}

/// How a property is laid out in the value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Plain,
    Optional,
    List,
}

#[derive(Debug, Clone)]
pub enum PropertyCodeGenerator {
    Default(DefaultProperty),
    Optional(OptionalProperty),
    List(ListProperty),
}

impl PropertyCodeGenerator {
    pub fn property(&self) -> &PropertyDescriptor {
        match self {
            Self::Default(p) => &p.property,
            Self::Optional(p) => &p.property,
            Self::List(p) => &p.property,
        }
    }

    pub fn name(&self) -> &Ident {
        &self.property().name
    }

    /// Builder methods generated for the property, its getter included.
    pub fn builder_methods(&self) -> Vec<&Ident> {
        match self {
            Self::Default(p) => vec![&p.property.name, &p.setter],
            Self::Optional(p) => vec![
                &p.property.name,
                &p.setter,
                &p.nullable_setter,
                &p.clear_method,
            ],
            Self::List(p) => vec![
                &p.property.name,
                &p.adder,
                &p.bulk_adder,
                &p.setter,
                &p.clear_method,
            ],
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Self::Default(p) if p.default.is_some() => Kind::HasDefault,
            Self::Default(_) => Kind::Required,
            Self::Optional(_) => Kind::Optional,
            Self::List(_) => Kind::HasDefault,
        }
    }

    pub fn value_storage(&self) -> Storage {
        match self {
            Self::Default(_) => Storage::Plain,
            Self::Optional(_) => Storage::Optional,
            Self::List(_) => Storage::List,
        }
    }

    /// Partials keep required properties optional, since they may be unset.
    pub fn partial_storage(&self) -> Storage {
        match self.kind() {
            Kind::Required => Storage::Optional,
            _ => self.value_storage(),
        }
    }

    /// Kind of the individual values held, i.e. of a list's elements.
    pub fn element_kind(&self) -> TypeKind {
        match self {
            Self::List(p) => TypeKind::of(&p.element),
            _ => self.property().kind,
        }
    }

    pub fn add_builder_field_declaration(&self, code: &mut TokenStream) {
        match self {
            Self::Default(p) => p.add_builder_field_declaration(code),
            Self::Optional(p) => p.add_value_field_declaration(code),
            Self::List(p) => p.add_value_field_declaration(code),
        }
    }

    /// Field initializer used by the zero-argument builder constructor.
    pub fn add_builder_field_initializer(&self, code: &mut TokenStream) {
        match self {
            Self::Default(p) => p.add_builder_field_initializer(code),
            Self::Optional(p) => p.add_builder_field_initializer(code),
            Self::List(p) => p.add_builder_field_initializer(code),
        }
    }

    pub fn add_builder_field_accessors(&self, code: &mut TokenStream, metadata: &Metadata) {
        match self {
            Self::Default(p) => p.add_builder_field_accessors(code, metadata),
            Self::Optional(p) => p.add_builder_field_accessors(code, metadata),
            Self::List(p) => p.add_builder_field_accessors(code, metadata),
        }
    }

    pub fn add_value_field_declaration(&self, code: &mut TokenStream) {
        match self {
            Self::Default(p) => p.add_value_field_declaration(code),
            Self::Optional(p) => p.add_value_field_declaration(code),
            Self::List(p) => p.add_value_field_declaration(code),
        }
    }

    pub fn add_partial_field_declaration(&self, code: &mut TokenStream) {
        match self {
            // same layout as in the builder: unset until set
            Self::Default(p) => p.add_builder_field_declaration(code),
            Self::Optional(p) => p.add_value_field_declaration(code),
            Self::List(p) => p.add_value_field_declaration(code),
        }
    }

    /// Field initializer of the value type, reading from `builder`.
    ///
    /// Required properties propagate a missing value with `?` through the
    /// `unset` closure in scope.
    pub fn add_final_field_assignment(&self, code: &mut TokenStream, builder: &Ident) {
        match self {
            Self::Default(p) => p.add_final_field_assignment(code, builder),
            Self::Optional(p) => p.add_field_assignment(code, builder),
            Self::List(p) => p.add_field_assignment(code, builder),
        }
    }

    pub fn add_partial_field_assignment(&self, code: &mut TokenStream, builder: &Ident) {
        match self {
            Self::Default(p) => p.add_partial_field_assignment(code, builder),
            Self::Optional(p) => p.add_field_assignment(code, builder),
            Self::List(p) => p.add_field_assignment(code, builder),
        }
    }

    /// Expression reading the property from `storage`, a reference to the
    /// field, as the declared return type.
    pub fn read_value_fragment(&self, storage: TokenStream) -> TokenStream {
        self.property().read_fragment(storage)
    }

    pub fn add_merge_from_value(&self, code: &mut TokenStream, metadata: &Metadata, value: &Ident) {
        match self {
            Self::Default(p) => p.add_merge_from_value(code, metadata, value),
            Self::Optional(p) => p.add_merge_from_value(code, metadata, value),
            Self::List(p) => p.add_merge_from_value(code, metadata, value),
        }
    }

    /// Copies the property from another builder.
    ///
    /// For required properties the caller guards this against the template
    /// not having the property set.
    pub fn add_merge_from_builder(&self, code: &mut TokenStream, builder: &Ident) {
        match self {
            Self::Default(p) => p.add_merge_from_builder(code, builder),
            Self::Optional(p) => p.add_merge_from_builder(code, builder),
            Self::List(p) => p.add_merge_from_builder(code, builder),
        }
    }

    /// Applies a deserialized field (see [`Self::serialized_field_type`]) to
    /// `builder` through the property's setters.
    pub fn add_set_from_result(&self, code: &mut TokenStream, builder: &Ident, variable: TokenStream) {
        match self {
            Self::Default(p) => p.add_set_from_result(code, builder, variable),
            Self::Optional(p) => p.add_set_from_result(code, builder, variable),
            Self::List(p) => p.add_set_from_result(code, builder, variable),
        }
    }

    /// Type a deserializer reads the property into. Missing fields are `None`.
    pub fn serialized_field_type(&self) -> TokenStream {
        let ty = &self.property().ty;
        match self {
            Self::Default(_) | Self::Optional(_) => quote::quote! { ::core::option::Option<#ty> },
            Self::List(p) => {
                let element = &p.element;
                quote::quote! { ::core::option::Option<::std::vec::Vec<#element>> }
            },
        }
    }

    pub fn is_template_required_in_clear(&self) -> bool {
        match self {
            Self::Default(_) => true,
            Self::Optional(p) => p.default.is_some(),
            Self::List(p) => p.default.is_some(),
        }
    }

    /// Resets the property. `template` is a fresh builder if
    /// [`Self::is_template_required_in_clear`] returned `true`.
    pub fn add_clear(&self, code: &mut TokenStream, template: Option<&Ident>) {
        let name = self.name();
        match (self, template) {
            (_, Some(template)) if self.is_template_required_in_clear() => {
                code.extend(quote::quote! { self.#name = #template.#name; });
            },
            (Self::Default(_), _) => {},
            (Self::Optional(_), _) => {
                code.extend(quote::quote! { self.#name = ::core::option::Option::None; });
            },
            (Self::List(_), _) => {
                code.extend(quote::quote! { self.#name.clear(); });
            },
        }
    }

    /// Best-effort reset of the builder `receiver`, used when no builder can
    /// be created to copy defaults from, and to drop list defaults before a
    /// value is copied in. Only meaningful right before a merge.
    pub fn add_partial_clear(&self, code: &mut TokenStream, receiver: &TokenStream) {
        match self {
            Self::Default(_) | Self::Optional(_) => {},
            Self::List(p) => p.add_partial_clear(code, receiver),
        }
    }
}

#[cfg(test)]
mod tests;
