use free_builder::free_builder;

#[free_builder(serde)]
pub trait Account {
    fn id(&self) -> u64;
    fn owner(&self) -> &str;
    fn email(&self) -> Option<&str>;
    fn roles(&self) -> &[String];
    #[builder(default = true)]
    fn active(&self) -> bool;
}

#[free_builder(serde)]
pub trait Flags {
    fn verbose(&self) -> Option<bool>;
}

fn ann() -> AccountValue {
    AccountBuilder::new()
        .set_id(7)
        .set_owner("ann")
        .add_roles("admin")
        .build()
        .unwrap()
}

#[test]
fn serializes_every_property() {
    let json = serde_json::to_string(&ann()).unwrap();

    assert_eq!(
        json,
        r#"{"id":7,"owner":"ann","email":null,"roles":["admin"],"active":true}"#
    );
}

#[test]
fn round_trip() {
    let account = AccountBuilder::new()
        .set_id(1)
        .set_owner("bob")
        .set_email("bob@example.com")
        .add_roles("a")
        .add_roles("b")
        .set_active(false)
        .build()
        .unwrap();

    let json = serde_json::to_string(&account).unwrap();
    let back: AccountValue = serde_json::from_str(&json).unwrap();
    assert_eq!(back, account);
}

#[test]
fn missing_fields_keep_builder_defaults() {
    let account: AccountValue = serde_json::from_str(r#"{"id":7,"owner":"ann"}"#).unwrap();

    assert_eq!(account.email(), None);
    assert!(account.roles().is_empty());
    assert!(account.active());
}

#[test]
fn missing_required_fields_fail() {
    let err = serde_json::from_str::<AccountValue>(r#"{"id":7}"#).unwrap_err();

    assert!(err.to_string().contains("Not set: [owner]"), "{err}");
}

#[test]
fn type_mismatches_fail() {
    assert!(serde_json::from_str::<AccountValue>(r#"{"id":"seven","owner":"ann"}"#).is_err());
}

#[test]
fn without_required_properties() {
    let flags: FlagsValue = serde_json::from_str("{}").unwrap();
    assert_eq!(flags.verbose(), None);

    let flags = FlagsBuilder::new().set_verbose(true).build();
    assert_eq!(serde_json::to_string(&flags).unwrap(), r#"{"verbose":true}"#);
}
