use quote::format_ident;
use rstest::rstest;
use syn::Type;

use super::*;
use crate::metadata::SetterInvocation;
use crate::model::GetterShape;

fn descriptor(name: &str, shape: GetterShape, ty: Type) -> PropertyDescriptor {
    PropertyDescriptor {
        name: format_ident!("{name}"),
        return_type: ty.clone(),
        kind: TypeKind::of(&ty),
        ty,
        shape,
        doc: Vec::new(),
    }
}

fn constructor_setting(setter: &str) -> BuilderConstructor {
    BuilderConstructor {
        invocations: vec![SetterInvocation {
            setter: format_ident!("{setter}"),
            argument: syn::parse_quote!(Default::default()),
        }],
    }
}

fn classify_with(property: &PropertyDescriptor, constructor: &BuilderConstructor) -> PropertyCodeGenerator {
    classify(&Config {
        property,
        builder_constructor: constructor,
    })
}

#[rstest]
#[case::required(GetterShape::Ref, syn::parse_quote!(String), "", Kind::Required, Storage::Plain)]
#[case::has_default(GetterShape::Owned, syn::parse_quote!(u32), "set_name", Kind::HasDefault, Storage::Plain)]
#[case::optional(GetterShape::OptionOwned, syn::parse_quote!(u32), "", Kind::Optional, Storage::Optional)]
#[case::optional_with_default(
    GetterShape::OptionRef { deref: true },
    syn::parse_quote!(::std::string::String),
    "set_name",
    Kind::Optional,
    Storage::Optional
)]
#[case::list(GetterShape::Ref, syn::parse_quote!(::std::vec::Vec<u32>), "", Kind::HasDefault, Storage::List)]
#[case::owned_vec(GetterShape::Owned, syn::parse_quote!(Vec<u32>), "", Kind::Required, Storage::Plain)]
fn classification(
    #[case] shape: GetterShape,
    #[case] ty: Type,
    #[case] setter: &str,
    #[case] kind: Kind,
    #[case] storage: Storage,
) {
    let property = descriptor("name", shape, ty);
    let constructor = if setter.is_empty() {
        BuilderConstructor::default()
    } else {
        constructor_setting(setter)
    };

    let generator = classify_with(&property, &constructor);
    assert_eq!(generator.kind(), kind);
    assert_eq!(generator.value_storage(), storage);
}

#[test]
fn unrelated_setters_do_not_give_defaults() {
    let property = descriptor("name", GetterShape::Ref, syn::parse_quote!(String));
    let generator = classify_with(&property, &constructor_setting("set_age"));

    assert_eq!(generator.kind(), Kind::Required);
}

#[test]
fn required_properties_are_optional_in_partials() {
    let property = descriptor("name", GetterShape::Ref, syn::parse_quote!(String));
    let generator = classify_with(&property, &BuilderConstructor::default());

    assert_eq!(generator.value_storage(), Storage::Plain);
    assert_eq!(generator.partial_storage(), Storage::Optional);
}

#[test]
fn list_elements_are_inspected() {
    let property = descriptor(
        "weights",
        GetterShape::Ref,
        syn::parse_quote!(::std::vec::Vec<f64>),
    );
    let generator = classify_with(&property, &BuilderConstructor::default());

    assert_eq!(property.kind, TypeKind::Reference);
    assert_eq!(generator.element_kind(), TypeKind::Float);
}

#[rstest]
#[case::required(GetterShape::Ref, syn::parse_quote!(String), false, true)]
#[case::optional(GetterShape::OptionOwned, syn::parse_quote!(u32), false, false)]
#[case::optional_with_default(GetterShape::OptionOwned, syn::parse_quote!(u32), true, true)]
#[case::list(GetterShape::Ref, syn::parse_quote!(Vec<u32>), false, false)]
#[case::list_with_default(GetterShape::Ref, syn::parse_quote!(Vec<u32>), true, true)]
fn template_required_in_clear(
    #[case] shape: GetterShape,
    #[case] ty: Type,
    #[case] has_default: bool,
    #[case] expected: bool,
) {
    let property = descriptor("name", shape, ty);
    let constructor = if has_default {
        constructor_setting("set_name")
    } else {
        BuilderConstructor::default()
    };

    let generator = classify_with(&property, &constructor);
    assert_eq!(generator.is_template_required_in_clear(), expected);
}

#[test]
fn clear_without_template() {
    let optional = descriptor("name", GetterShape::OptionOwned, syn::parse_quote!(u32));
    let list = descriptor("tags", GetterShape::Ref, syn::parse_quote!(Vec<u32>));
    let constructor = BuilderConstructor::default();

    let mut code = TokenStream::new();
    classify_with(&optional, &constructor).add_clear(&mut code, None);
    classify_with(&list, &constructor).add_clear(&mut code, None);

    let expected = quote::quote! {
        self.name = ::core::option::Option::None;
        self.tags.clear();
    };
    assert_eq!(code.to_string(), expected.to_string());
}

#[test]
fn clear_from_template() {
    let property = descriptor("name", GetterShape::Ref, syn::parse_quote!(String));
    let generator = classify_with(&property, &BuilderConstructor::default());
    let template = format_ident!("template");

    let mut code = TokenStream::new();
    generator.add_clear(&mut code, Some(&template));

    let expected = quote::quote! { self.name = template.name; };
    assert_eq!(code.to_string(), expected.to_string());
}

#[test]
fn only_lists_clear_partially() {
    let required = descriptor("name", GetterShape::Ref, syn::parse_quote!(String));
    let list = descriptor("tags", GetterShape::Ref, syn::parse_quote!(Vec<u32>));
    let constructor = BuilderConstructor::default();

    let receiver = quote::quote!(self);

    let mut code = TokenStream::new();
    classify_with(&required, &constructor).add_partial_clear(&mut code, &receiver);
    assert!(code.is_empty());

    classify_with(&list, &constructor).add_partial_clear(&mut code, &receiver);
    assert_eq!(code.to_string(), quote::quote!(self.tags.clear();).to_string());
}

#[test]
fn required_values_propagate_unset() {
    let property = descriptor("name", GetterShape::Ref, syn::parse_quote!(String));
    let generator = classify_with(&property, &BuilderConstructor::default());
    let builder = format_ident!("builder");

    let mut code = TokenStream::new();
    generator.add_final_field_assignment(&mut code, &builder);

    let expected = quote::quote! {
        name: ::core::option::Option::ok_or_else(
            ::core::clone::Clone::clone(&builder.name),
            unset,
        )?,
    };
    assert_eq!(code.to_string(), expected.to_string());
}
