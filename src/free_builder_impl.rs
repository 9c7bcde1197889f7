use darling::ast::NestedMeta;
use darling::{FromAttributes as _, FromMeta as _};
use proc_macro2::TokenStream;
use quote::format_ident;
use syn::{FnArg, Ident, ItemTrait, ReturnType, TraitItem, TraitItemFn, Type, TypeParamBound};

use crate::code_generator::write_builder_source;
use crate::metadata::*;
use crate::model::*;
use crate::property::{Config, PropertyCodeGenerator, classify};
use crate::util::*;

/// Builder methods a property getter would collide with.
const RESERVED_NAMES: &[&str] = &[
    "new",
    "build",
    "build_partial",
    "clear",
    "merge_from",
    "merge_from_builder",
];

pub fn entry_point(args: TokenStream, mut item: ItemTrait) -> syn::Result<TokenStream> {
    let args = NestedMeta::parse_meta_list(args)?;
    let args = TraitArgs::from_list(&args)?;

    if !item.generics.params.is_empty() || item.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &item.generics,
            "`free_builder` does not support generic traits",
        ));
    }

    let (standard_methods, debug_supertrait) = load_standard_methods(&item);
    let (properties, builder_constructor, mut errors) = load_properties(&mut item);

    let properties: Vec<_> = properties
        .iter()
        .map(|property| {
            classify(&Config {
                property,
                builder_constructor: &builder_constructor,
            })
        })
        .collect();
    check_method_names(&mut errors, &properties);

    let mut output = quote::quote! { #item };

    if let Err(err) = errors {
        output.extend(err.into_compile_error());
        return Ok(output);
    }

    let type_name = item.ident;
    let metadata = Metadata {
        builder: args
            .builder
            .unwrap_or_else(|| format_ident!("{}Builder", type_name)),
        value_type: args
            .value
            .unwrap_or_else(|| format_ident!("{}Value", type_name)),
        partial_type: args
            .partial
            .unwrap_or_else(|| format_ident!("{}Partial", type_name)),
        property_enum: format_ident!("{}Property", type_name),
        build_error: format_ident!("{}BuildError", type_name),
        vis: item.vis,
        properties,
        builder_factory: args.builder_factory.unwrap_or(true),
        standard_methods,
        debug_supertrait,
        serde: args.serde.is_present(),
        type_name,
    };

    output.extend(write_builder_source(&metadata));
    Ok(output)
}

/// Reports builder methods generated by more than one property.
fn check_method_names(res: &mut syn::Result<()>, properties: &[PropertyCodeGenerator]) {
    let mut seen: Vec<(String, &Ident)> = Vec::new();
    for property in properties {
        for method in property.builder_methods() {
            let method = method.to_string();
            match seen.iter().find(|(name, _)| *name == method) {
                Some((_, owner)) => push_error(
                    res,
                    syn::Error::new(
                        property.name().span(),
                        format!("builder method `{method}` is also generated for `{owner}`"),
                    ),
                ),
                None => seen.push((method, property.name())),
            }
        }
    }
}

/// Supertraits make the user responsible for a standard trait, provided
/// methods of the same name make it overridable.
fn load_standard_methods(item: &ItemTrait) -> (StandardMethods, bool) {
    let supertraits: Vec<_> = item
        .supertraits
        .iter()
        .filter_map(|bound| match bound {
            TypeParamBound::Trait(bound) => bound.path.segments.last().map(|s| s.ident.to_string()),
            _ => None,
        })
        .collect();

    let provided: Vec<_> = item
        .items
        .iter()
        .filter_map(|item| match item {
            TraitItem::Fn(f) if f.default.is_some() => Some(f.sig.ident.to_string()),
            _ => None,
        })
        .collect();

    let mut methods = StandardMethods::default();
    for method in StandardMethod::ALL {
        let level = if supertraits.iter().any(|s| s == method.trait_name()) {
            UnderrideLevel::Final
        } else if provided.iter().any(|p| p == method.method_name()) {
            UnderrideLevel::Overridable
        } else {
            UnderrideLevel::Absent
        };
        methods.set(method, level);
    }

    // `Eq` can only be implemented alongside `PartialEq`
    if supertraits.iter().any(|s| s == "Eq") {
        methods.set(StandardMethod::Eq, UnderrideLevel::Final);
    }

    let debug_supertrait = supertraits.iter().any(|s| s == "Debug");
    (methods, debug_supertrait)
}

fn load_properties(
    item: &mut ItemTrait,
) -> (Vec<PropertyDescriptor>, BuilderConstructor, syn::Result<()>) {
    let mut errors = Ok(());
    let mut properties = Vec::new();
    let mut builder_constructor = BuilderConstructor::default();

    for trait_item in &mut item.items {
        match trait_item {
            TraitItem::Fn(f) if f.default.is_some() => {
                let attrs = take_builder_attrs(&mut f.attrs);
                if let Some(attr) = attrs.first() {
                    push_error(
                        &mut errors,
                        syn::Error::new_spanned(
                            attr,
                            "`#[builder]` only applies to methods without a body",
                        ),
                    );
                }
            },
            TraitItem::Fn(f) => {
                let attrs = take_builder_attrs(&mut f.attrs);
                let attrs = push_result(&mut errors, PropertyAttrs::from_attributes(&attrs));

                let Some(property) = push_result(&mut errors, load_property(f).map(Some)) else {
                    continue;
                };

                if let Some(default) = attrs.default {
                    builder_constructor.invocations.push(SetterInvocation {
                        setter: format_ident!("set_{}", property.label()),
                        argument: *default,
                    });
                }

                properties.push(property);
            },
            TraitItem::Const(c) if c.default.is_none() => push_error(
                &mut errors,
                syn::Error::new_spanned(
                    &c.ident,
                    "associated constants of a `free_builder` trait need a default value",
                ),
            ),
            TraitItem::Type(t) => push_error(
                &mut errors,
                syn::Error::new_spanned(
                    &t.ident,
                    "`free_builder` does not support associated types",
                ),
            ),
            _ => {},
        }
    }

    (properties, builder_constructor, errors)
}

fn load_property(f: &TraitItemFn) -> syn::Result<PropertyDescriptor> {
    let sig = &f.sig;

    if sig.constness.is_some()
        || sig.asyncness.is_some()
        || sig.unsafety.is_some()
        || sig.abi.is_some()
    {
        return Err(syn::Error::new_spanned(
            sig,
            "property getters must be plain, safe functions",
        ));
    }

    if !sig.generics.params.is_empty() || sig.generics.where_clause.is_some() {
        return Err(syn::Error::new_spanned(
            &sig.generics,
            "property getters cannot be generic",
        ));
    }

    let takes_ref_self = match sig.inputs.first() {
        Some(FnArg::Receiver(r)) => {
            r.reference.is_some() && r.mutability.is_none() && r.colon_token.is_none()
        },
        _ => false,
    };

    if !takes_ref_self || sig.inputs.len() != 1 {
        return Err(syn::Error::new(
            sig.paren_token.span.join(),
            "property getters must take `&self` and nothing else",
        ));
    }

    let ReturnType::Type(_, return_type) = &sig.output else {
        return Err(syn::Error::new_spanned(
            &sig.ident,
            "property getters must return a value",
        ));
    };

    let name = sig.ident.clone();
    if RESERVED_NAMES.iter().any(|r| name == *r) {
        return Err(syn::Error::new_spanned(
            &name,
            format!("`{name}` collides with a generated builder method"),
        ));
    }

    let (shape, ty) = load_shape(return_type)?;

    Ok(PropertyDescriptor {
        name,
        return_type: (**return_type).clone(),
        kind: TypeKind::of(&ty),
        ty,
        shape,
        doc: iter_doc_attrs(&f.attrs).cloned().collect(),
    })
}

/// Works out how a getter hands out its value and what type stores it.
fn load_shape(return_type: &Type) -> syn::Result<(GetterShape, Type)> {
    if let Type::Reference(r) = return_type {
        if r.mutability.is_some() {
            return Err(syn::Error::new_spanned(
                return_type,
                "property getters cannot return mutable references",
            ));
        }

        match &r.lifetime {
            Some(l) if l.ident == "static" => return Ok((GetterShape::Owned, return_type.clone())),
            Some(l) => return Err(named_lifetime_error(l)),
            None => {},
        }

        let (ty, _) = referent_storage(&r.elem);
        return Ok((GetterShape::Ref, ty));
    }

    if last_segment_ident(return_type).is_some_and(|i| i == "Option") {
        let Some(inner) = first_generic_arg(return_type) else {
            return Err(syn::Error::new_spanned(
                return_type,
                "expected `Option` to have a type argument",
            ));
        };

        return match inner {
            Type::Reference(r) if r.mutability.is_some() => Err(syn::Error::new_spanned(
                inner,
                "property getters cannot return mutable references",
            )),
            Type::Reference(r) => match &r.lifetime {
                Some(l) if l.ident == "static" => Ok((GetterShape::OptionOwned, inner.clone())),
                Some(l) => Err(named_lifetime_error(l)),
                None => {
                    let (ty, deref) = referent_storage(&r.elem);
                    Ok((GetterShape::OptionRef { deref }, ty))
                },
            },
            _ => Ok((GetterShape::OptionOwned, inner.clone())),
        };
    }

    Ok((GetterShape::Owned, return_type.clone()))
}

fn named_lifetime_error(lifetime: &syn::Lifetime) -> syn::Error {
    syn::Error::new_spanned(
        lifetime,
        "property getters may only return references with an elided or `'static` lifetime",
    )
}

/// The owned type that stores a borrowed `elem`, and whether it only derefs
/// to it rather than being it.
fn referent_storage(elem: &Type) -> (Type, bool) {
    if bare_type_ident(elem).is_some_and(|i| i == "str") {
        return (syn::parse_quote!(::std::string::String), true);
    }

    if let Type::Slice(slice) = elem {
        let elem = &slice.elem;
        return (syn::parse_quote!(::std::vec::Vec<#elem>), true);
    }

    (elem.clone(), false)
}
