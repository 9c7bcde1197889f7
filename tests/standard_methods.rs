use std::collections::hash_map::DefaultHasher;
use std::fmt;
use std::hash::{Hash, Hasher};

use free_builder::free_builder;

fn hash_of(value: &impl Hash) -> u64 {
    let mut hasher = DefaultHasher::new();
    Hash::hash(value, &mut hasher);
    hasher.finish()
}

#[free_builder]
pub trait Point {
    fn x(&self) -> f64;
    fn y(&self) -> f32;
    fn weights(&self) -> &[f64];
    fn label(&self) -> Option<f64>;
}

fn point(x: f64, weight: f64) -> PointValue {
    PointBuilder::new()
        .set_x(x)
        .set_y(0.5)
        .add_weights(weight)
        .set_label(x)
        .build()
        .unwrap()
}

#[test]
fn floats_compare_by_bits() {
    assert_eq!(point(f64::NAN, f64::NAN), point(f64::NAN, f64::NAN));
    assert_eq!(
        hash_of(&point(f64::NAN, f64::NAN)),
        hash_of(&point(f64::NAN, f64::NAN))
    );

    assert_ne!(point(0.0, 1.0), point(-0.0, 1.0));
    assert_ne!(point(1.0, 0.0), point(1.0, -0.0));
    assert_eq!(point(1.0, 2.0), point(1.0, 2.0));
}

#[test]
fn partial_floats_compare_by_bits() {
    let a = PointBuilder::new().set_x(f64::NAN).build_partial();
    let b = PointBuilder::new().set_x(f64::NAN).build_partial();

    assert_eq!(a, b);
    assert_eq!(hash_of(&a), hash_of(&b));
    assert_eq!(a.to_string(), "partial Point{x=NaN, weights=[]}");
}

/// Equality and formatting are implemented by hand.
#[free_builder]
pub trait Named: PartialEq + fmt::Display {
    fn name(&self) -> &str;
}

impl PartialEq for NamedValue {
    fn eq(&self, other: &Self) -> bool {
        self.name().eq_ignore_ascii_case(other.name())
    }
}

impl PartialEq for NamedPartial {
    fn eq(&self, _other: &Self) -> bool {
        false
    }
}

impl fmt::Display for NamedValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "named {}", self.name())
    }
}

impl fmt::Display for NamedPartial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("named ?")
    }
}

fn named(name: &str) -> NamedValue {
    NamedBuilder::new().set_name(name).build().unwrap()
}

#[test]
fn supertraits_are_left_to_the_user() {
    assert_eq!(named("Ann"), named("ANN"));
    assert_eq!(named("Ann").to_string(), "named Ann");
    assert_eq!(format!("{:?}", named("Ann")), "named Ann");

    // `Hash` was not a supertrait, so it is still structural.
    assert_ne!(hash_of(&named("Ann")), hash_of(&named("ANN")));

    let partial = NamedBuilder::new().build_partial();
    assert_ne!(partial, partial.clone());
    assert_eq!(partial.to_string(), "named ?");
}

#[free_builder]
pub trait Word {
    fn text(&self) -> &str;

    fn eq(&self, other: &Self) -> bool {
        self.text().eq_ignore_ascii_case(other.text())
    }

    fn hash<H: Hasher>(&self, state: &mut H) {
        Hash::hash(&self.text().to_ascii_lowercase(), state);
    }

    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}>", self.text())
    }
}

fn word(text: &str) -> WordValue {
    WordBuilder::new().set_text(text).build().unwrap()
}

#[test]
fn provided_methods_are_used_by_values() {
    assert_eq!(word("Hello"), word("HELLO"));
    assert_eq!(hash_of(&word("Hello")), hash_of(&word("HELLO")));
    assert_eq!(word("Hello").to_string(), "<Hello>");
    assert_eq!(format!("{:?}", word("Hello")), "<Hello>");
}

#[test]
fn partials_ignore_provided_methods() {
    let a = WordBuilder::new().set_text("Hello").build_partial();
    let b = WordBuilder::new().set_text("HELLO").build_partial();

    assert_ne!(a, b);
    assert_eq!(a, a.clone());
    assert_eq!(a.to_string(), "partial Word{text=Hello}");

    // values never equal partials, even with the same contents
    assert!(word("Hello") != a);
}
