use darling::util::Flag;
use darling::{FromAttributes, FromMeta};
use proc_macro2::TokenStream;
use syn::{Attribute, Expr, Ident, Type};

/// Arguments of the `#[free_builder(...)]` attribute itself.
#[derive(Default, Debug, FromMeta)]
pub struct TraitArgs {
    pub builder: Option<Ident>,
    pub value: Option<Ident>,
    pub partial: Option<Ident>,
    pub builder_factory: Option<bool>,
    pub serde: Flag,
}

#[derive(Default, Debug, FromAttributes)]
#[darling(attributes(builder))]
pub struct PropertyAttrs {
    pub default: Option<Box<Expr>>,
}

/// How a getter hands out the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GetterShape {
    /// `&T`, `&str` or `&[E]`.
    Ref,
    /// `T`, including `&'static T`.
    Owned,
    /// `Option<&T>`. `deref` is set when the storage type derefs to the
    /// declared referent, i.e. `Option<&str>` stored as `Option<String>`.
    OptionRef { deref: bool },
    /// `Option<T>`.
    OptionOwned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    Float,
    Primitive,
    Reference,
}

impl TypeKind {
    pub fn of(ty: &Type) -> Self {
        let Some(ident) = crate::util::bare_type_ident(ty) else {
            return TypeKind::Reference;
        };

        match ident.to_string().as_str() {
            "f32" | "f64" => TypeKind::Float,
            "bool" | "char" | "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16"
            | "u32" | "u64" | "u128" | "usize" => TypeKind::Primitive,
            _ => TypeKind::Reference,
        }
    }

    pub fn is_primitive(self) -> bool {
        !matches!(self, TypeKind::Reference)
    }
}

/// One getter of the annotated trait.
#[derive(Debug, Clone)]
pub struct PropertyDescriptor {
    /// Getter name, which doubles as the property name.
    pub name: Ident,
    /// The getter's declared return type, reused for builder getters.
    pub return_type: Type,
    /// The type held by builders and values, unwrapped from `Option`.
    pub ty: Type,
    pub kind: TypeKind,
    pub shape: GetterShape,
    pub doc: Vec<Attribute>,
}

impl PropertyDescriptor {
    pub fn is_nullable(&self) -> bool {
        matches!(
            self.shape,
            GetterShape::OptionRef { .. } | GetterShape::OptionOwned
        )
    }

    /// The property name without any raw identifier prefix.
    pub fn label(&self) -> String {
        syn::ext::IdentExt::unraw(&self.name).to_string()
    }

    /// Turns `storage`, an expression of type `&ty` (or `&Option<ty>` for
    /// nullable properties), into a value of the declared return type.
    pub fn read_fragment(&self, storage: TokenStream) -> TokenStream {
        match self.shape {
            GetterShape::Ref => storage,
            GetterShape::Owned | GetterShape::OptionOwned if self.kind.is_primitive() => {
                quote::quote! { *#storage }
            },
            GetterShape::Owned | GetterShape::OptionOwned => {
                quote::quote! { ::core::clone::Clone::clone(#storage) }
            },
            GetterShape::OptionRef { deref: true } => {
                quote::quote! { ::core::option::Option::as_deref(#storage) }
            },
            GetterShape::OptionRef { deref: false } => {
                quote::quote! { ::core::option::Option::as_ref(#storage) }
            },
        }
    }

    /// Turns `returned`, an expression of the declared return type, into an
    /// owned value of the storage type (wrapped in `Option` when nullable).
    pub fn to_owned_fragment(&self, returned: TokenStream) -> TokenStream {
        match self.shape {
            GetterShape::Ref => quote::quote! { ::std::borrow::ToOwned::to_owned(#returned) },
            GetterShape::Owned | GetterShape::OptionOwned => returned,
            GetterShape::OptionRef { .. } => quote::quote! {
                ::core::option::Option::map(#returned, ::std::borrow::ToOwned::to_owned)
            },
        }
    }
}
