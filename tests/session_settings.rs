use paraquery::ParaqueryError;
use paraquery::normalize::Field;
use paraquery::session::{OrderMode, Settings, DEFAULT_LIMIT, SETTING_NAMES};

#[test]
fn defaults() {
    let settings = Settings::new();
    assert_eq!(settings.limit, Some(DEFAULT_LIMIT));
    assert_eq!(settings.order, OrderMode::HighestFirst);
    assert!(!settings.include_identity);
    assert!(!settings.same_pos_only);
    assert!(!settings.unique_target_only);
    assert_eq!(settings.group_by, None);
    assert!(!settings.debug);
    assert!(!settings.explain);
}

#[test]
fn every_named_setting_is_accepted() {
    let mut settings = Settings::new();
    for name in SETTING_NAMES {
        let value = match name {
            "order" => "random",
            "limit" => "5",
            "group_by" => "relation",
            _ => "on",
        };
        settings.set(name, value).expect("setting accepted");
    }
    assert_eq!(settings.limit, Some(5));
    assert_eq!(settings.order, OrderMode::Random);
    assert_eq!(settings.group_by, Some(Field::Relation));
    assert!(settings.include_identity && settings.same_pos_only && settings.unique_target_only);
    assert!(settings.debug && settings.explain);
}

#[test]
fn switches_are_case_insensitive() {
    let mut settings = Settings::new();
    settings.set("identical", "ON").expect("accepted");
    assert!(settings.include_identity);
    settings.set("identical", "False").expect("accepted");
    assert!(!settings.include_identity);
    settings.set("debug", "true").expect("accepted");
    assert!(settings.debug);
}

#[test]
fn order_aliases() {
    let mut settings = Settings::new();
    for (value, expected) in [
        ("rand", OrderMode::Random),
        ("lowprobfirst", OrderMode::LowestFirst),
        ("up", OrderMode::LowestFirst),
        ("prob", OrderMode::HighestFirst),
        ("decreasing", OrderMode::HighestFirst),
    ] {
        settings.set("order", value).expect("accepted");
        assert_eq!(settings.order, expected, "{value}");
    }
}

#[test]
fn limit_values() {
    let mut settings = Settings::new();
    settings.set("limit", "25").expect("accepted");
    assert_eq!(settings.limit, Some(25));
    settings.set("limit", "-1").expect("accepted");
    assert_eq!(settings.limit, None);
    settings.set("limit", "7").expect("accepted");
    settings.set("limit", "off").expect("accepted");
    assert_eq!(settings.limit, None);
}

#[test]
fn rejected_values_leave_the_setting_alone() {
    let mut settings = Settings::new();
    for (name, value) in [
        ("limit", "0"),
        ("limit", "many"),
        ("identical", "maybe"),
        ("order", "sideways"),
        ("group_by", "pivots"),
        ("group_by", "pe2e1"),
    ] {
        let err = settings.set(name, value).unwrap_err();
        assert!(matches!(err, ParaqueryError::Setting { .. }), "{name}={value}");
    }
    assert_eq!(settings, Settings::new());
}

#[test]
fn unknown_setting_names() {
    let mut settings = Settings::new();
    let err = settings.set("colour", "on").unwrap_err();
    assert!(matches!(err, ParaqueryError::UnknownSetting(ref name) if name == "colour"));
}

#[test]
fn grouping_can_be_switched_off() {
    let mut settings = Settings::new();
    settings.set("group_by", "samepos").expect("accepted");
    assert_eq!(settings.group_by, Some(Field::SamePos));
    settings.set("group_by", "none").expect("accepted");
    assert_eq!(settings.group_by, None);
}

#[test]
fn listing() {
    let mut settings = Settings::new();
    settings.set("same_pos", "on").expect("accepted");
    settings.set("group_by", "distance").expect("accepted");
    let listing = settings.to_string();
    assert!(listing.starts_with(" Current settings:\n"));
    assert!(listing.contains("  limit: 10\n"));
    assert!(listing.contains("  order: highest first\n"));
    assert!(listing.contains("  same_pos: on\n"));
    assert!(listing.contains("  identical: off\n"));
    assert!(listing.contains("  group_by: distance\n"));
}
