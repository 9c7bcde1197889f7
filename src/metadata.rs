use heck::ToUpperCamelCase as _;
use proc_macro2::TokenStream;
use quote::format_ident;
use syn::{Expr, Ident, Visibility};

use crate::model::PropertyDescriptor;
use crate::property::{Kind, PropertyCodeGenerator};

/// The standard traits the generated types implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StandardMethod {
    Eq,
    Hash,
    Display,
}

impl StandardMethod {
    pub const ALL: [StandardMethod; 3] = [Self::Eq, Self::Hash, Self::Display];

    /// Name of the method a trait may provide to take over the implementation.
    pub fn method_name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::Hash => "hash",
            Self::Display => "fmt",
        }
    }

    /// Name of the trait that, listed as a supertrait, makes the user
    /// responsible for the implementation.
    pub fn trait_name(self) -> &'static str {
        match self {
            Self::Eq => "PartialEq",
            Self::Hash => "Hash",
            Self::Display => "Display",
        }
    }
}

/// How strongly the user already provides a standard method.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnderrideLevel {
    /// Nothing provided, generate a full implementation.
    #[default]
    Absent,
    /// A provided trait method exists that the value type delegates to.
    Overridable,
    /// The standard trait is a supertrait, so the user implements it.
    Final,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct StandardMethods {
    pub eq: UnderrideLevel,
    pub hash: UnderrideLevel,
    pub display: UnderrideLevel,
}

impl StandardMethods {
    pub fn underride(&self, method: StandardMethod) -> UnderrideLevel {
        match method {
            StandardMethod::Eq => self.eq,
            StandardMethod::Hash => self.hash,
            StandardMethod::Display => self.display,
        }
    }

    pub fn set(&mut self, method: StandardMethod, level: UnderrideLevel) {
        match method {
            StandardMethod::Eq => self.eq = level,
            StandardMethod::Hash => self.hash = level,
            StandardMethod::Display => self.display = level,
        }
    }
}

/// A setter call made by the builder's zero-argument constructor.
#[derive(Debug, Clone)]
pub struct SetterInvocation {
    pub setter: Ident,
    pub argument: Expr,
}

/// What the generated zero-argument builder constructor does besides leaving
/// every property at its initial state.
#[derive(Debug, Clone, Default)]
pub struct BuilderConstructor {
    pub invocations: Vec<SetterInvocation>,
}

impl BuilderConstructor {
    /// Returns the argument passed to `setter`, if the constructor calls it.
    pub fn invocation(&self, setter: &Ident) -> Option<&Expr> {
        self.invocations
            .iter()
            .find(|i| i.setter == *setter)
            .map(|i| &i.argument)
    }
}

/// Everything known about one annotated trait.
pub struct Metadata {
    /// The annotated trait.
    pub type_name: Ident,
    pub vis: Visibility,
    pub builder: Ident,
    pub value_type: Ident,
    pub partial_type: Ident,
    pub property_enum: Ident,
    pub build_error: Ident,
    /// In declaration order.
    pub properties: Vec<PropertyCodeGenerator>,
    /// Whether the builder gets a public `new` and `Default`.
    pub builder_factory: bool,
    pub standard_methods: StandardMethods,
    /// `Debug` is a supertrait, so the user implements it.
    pub debug_supertrait: bool,
    pub serde: bool,
}

impl Metadata {
    pub fn standard_method_underride(&self, method: StandardMethod) -> UnderrideLevel {
        self.standard_methods.underride(method)
    }

    pub fn has_required_properties(&self) -> bool {
        self.properties.iter().any(|p| p.kind() == Kind::Required)
    }

    pub fn required_properties(&self) -> impl Iterator<Item = &PropertyCodeGenerator> {
        self.properties.iter().filter(|p| p.kind() == Kind::Required)
    }

    /// Path to the unset-tracking entry of a property, e.g. `PersonProperty::Name`.
    pub fn property_variant(&self, property: &PropertyDescriptor) -> TokenStream {
        let property_enum = &self.property_enum;
        let variant = variant_ident(&property.label());
        quote::quote! { #property_enum::#variant }
    }

    /// Expression creating a builder through the zero-argument constructor.
    pub fn new_builder(&self) -> TokenStream {
        let builder = &self.builder;
        quote::quote! { #builder::new() }
    }
}

pub fn variant_ident(label: &str) -> Ident {
    format_ident!("{}", label.to_upper_camel_case())
}
