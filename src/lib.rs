use proc_macro::TokenStream;
use syn::{ItemTrait, parse_macro_input};

mod code_generator;
mod free_builder_impl;
mod metadata;
mod model;
mod property;
mod util;

/// Attribute macro that turns a trait of getters into a builder, an immutable
/// value type and a partial value type for tests.
///
/// For a trait `Person`, the following items are generated next to it:
///
/// - `PersonBuilder`, with setters, `build`, `merge_from`, `merge_from_builder`,
///   `clear` and `build_partial`.
/// - `PersonValue`, the immutable implementation returned by `build`.
/// - `PersonPartial`, returned by `build_partial`, which panics when an unset
///   required property is read instead of refusing to be built.
/// - `PersonProperty` and `PersonBuildError`, if any property is required.
///
/// Every getter must take `&self` and nothing else. What the builder offers
/// depends on the return type:
///
/// - `Option<T>` and `Option<&T>` are optional. The builder gets `set_*`,
///   `set_nullable_*` and `clear_*`.
/// - `&[E]` and `&Vec<E>` are lists. The builder gets `add_*`, `add_all_*`,
///   `set_*` and `clear_*`.
/// - Anything else is required, unless a default is given with
///   `#[builder(default = expr)]`.
///
/// `PartialEq`, `Hash`, `Display` and `Debug` are implemented for the value
/// and partial types. Listing one of the first three as a supertrait leaves
/// it to you. Providing a method named `eq`, `hash` or `fmt` in the trait
/// makes the value type delegate to it.
///
/// # Arguments
///
/// - `builder = Name`, `value = Name`, `partial = Name` rename the generated
///   types.
/// - `builder_factory = false` makes `PersonBuilder::new` private and drops
///   `Default`, `PersonValue::builder` and `PersonValue::to_builder`.
/// - `serde` implements `Serialize` and `Deserialize` for the value type.
///
/// # Examples
///
/// ```
/// use free_builder::free_builder;
///
/// #[free_builder]
/// pub trait Person {
///     fn name(&self) -> &str;
///     #[builder(default = 18)]
///     fn age(&self) -> u32;
///     fn nickname(&self) -> Option<&str>;
/// }
///
/// let person = PersonBuilder::new()
///     .set_name("Alice")
///     .set_nickname("Al")
///     .build()
///     .unwrap();
///
/// assert_eq!(person.name(), "Alice");
/// assert_eq!(person.age(), 18);
/// assert_eq!(person.to_string(), "Person{name=Alice, age=18, nickname=Al}");
///
/// let err = PersonBuilder::new().build().unwrap_err();
/// assert_eq!(err.to_string(), "Not set: [name]");
/// ```
#[proc_macro_attribute]
pub fn free_builder(args: TokenStream, input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as ItemTrait);
    free_builder_impl::entry_point(args.into(), input)
        .unwrap_or_else(|e| e.into_compile_error())
        .into()
}
