use std::mem::take;

use proc_macro2::TokenStream;
use quote::ToTokens;
use syn::punctuated::Punctuated;
use syn::{Attribute, GenericArgument, Ident, PathArguments, Type, TypePath};

use crate::model::TypeKind;

/// Appends `new` to the errors collected so far.
pub fn push_error(res: &mut syn::Result<()>, new: syn::Error) {
    match res {
        Ok(()) => *res = Err(new),
        Err(err) => err.combine(new),
    }
}

/// Unwraps `value`, recording its error and substituting the default if it
/// failed.
pub fn push_result<T, E>(res: &mut syn::Result<()>, value: Result<T, E>) -> T
where
    T: Default,
    E: Into<syn::Error>,
{
    value.unwrap_or_else(|err| {
        push_error(res, err.into());
        T::default()
    })
}

/// Removes and returns all `#[builder(...)]` attributes.
pub fn take_builder_attrs(attrs: &mut Vec<Attribute>) -> Vec<Attribute> {
    let (l, r) = take(attrs)
        .into_iter()
        .partition(|i| i.meta.path().is_ident("builder"));
    *attrs = r;
    l
}

/// Iterates over all the meta items with the path `doc` in attributes.
pub fn iter_doc_attrs(attrs: &[Attribute]) -> impl Iterator<Item = &Attribute> {
    attrs.iter().filter(|f| f.path().is_ident("doc"))
}

fn first_punct<T, P>(p: &Punctuated<T, P>) -> Option<&T> {
    p.pairs().next().map(|p| p.into_value())
}

fn last_punct<T, P>(p: &Punctuated<T, P>) -> Option<&T> {
    p.pairs().next_back().map(|p| p.into_value())
}

fn unwrap_type(mut ty: &Type) -> &Type {
    loop {
        match ty {
            Type::Group(t) => ty = &t.elem,
            Type::Paren(t) => ty = &t.elem,
            _ => break ty,
        }
    }
}

/// Gets the first generic argument, if the last path segment of the type has
/// any. Generic arguments anywhere else in the path are ignored.
///
/// [`Type::Group`] and [`Type::Paren`] check their inner type instead. If the
/// final unwrapped value isn't [`Type::Path`], returns [`None`].
///
/// **Examples:**
/// - `Option<i32>` -> `Some(i32)`
/// - `std::vec::Vec<&str>` -> `Some(&str)`
/// - `u32` -> `None`
pub fn first_generic_arg(ty: &Type) -> Option<&Type> {
    fn inner(ty: &TypePath) -> Option<&Type> {
        let seg = last_punct(&ty.path.segments)?;
        if let PathArguments::AngleBracketed(a) = &seg.arguments {
            if let GenericArgument::Type(ty) = first_punct(&a.args)? {
                return Some(ty);
            }
        }
        None
    }

    match unwrap_type(ty) {
        Type::Path(t) => inner(t),
        _ => None,
    }
}

/// Returns the identifier of the last path segment, ignoring its generics.
///
/// - `std::option::Option<u32>` -> `Some(Option)`
/// - `&str` -> `None`
pub fn last_segment_ident(ty: &Type) -> Option<&Ident> {
    match unwrap_type(ty) {
        Type::Path(t) if t.qself.is_none() => last_punct(&t.path.segments).map(|s| &s.ident),
        _ => None,
    }
}

/// Returns the identifier if the type is a single, argument-free path
/// segment such as `u32` or `String`.
pub fn bare_type_ident(ty: &Type) -> Option<&Ident> {
    match unwrap_type(ty) {
        Type::Path(t) if t.qself.is_none() => t.path.get_ident(),
        _ => None,
    }
}

/// Parameter type for a setter taking one `ty`.
///
/// Primitives are taken by value so literals infer. Anything else accepts
/// whatever converts into it.
pub fn setter_param(ty: &Type) -> TokenStream {
    if TypeKind::of(ty).is_primitive() {
        quote::quote! { #ty }
    } else {
        quote::quote! { impl ::core::convert::Into<#ty> }
    }
}

/// Converts a setter argument declared with [`setter_param`] into `ty`.
pub fn setter_conversion(ty: &Type, value: impl ToTokens) -> TokenStream {
    if TypeKind::of(ty).is_primitive() {
        quote::quote! { #value }
    } else {
        quote::quote! { ::core::convert::Into::into(#value) }
    }
}
