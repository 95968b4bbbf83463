use builder::{BuilderError, CollectionBuilder, KeyOptions, PairingBase, State};
use ir::{InnerShape, OuterShape, PairingBaseKind, PairingOptions, TemplateFamily};

fn no_options() -> KeyOptions { KeyOptions::default() }

/// Helper adding the minimum declarations each shape needs before `lock()`.
fn declare_minimum(builder: &mut CollectionBuilder) {
    match builder.family() {
        TemplateFamily::StrongMap => {
            builder.add_map_key("car", "The car.", false, no_options()).expect("car")
        }
        TemplateFamily::WeakMap => {
            builder.add_map_key("car", "The car.", true, no_options()).expect("car")
        }
        TemplateFamily::StrongSet => {
            builder.add_set_element("car", "The car.", false, no_options()).expect("car")
        }
        TemplateFamily::WeakSet => {
            builder.add_set_element("car", "The car.", true, no_options()).expect("car")
        }
        TemplateFamily::StrongMapOfStrongSets | TemplateFamily::WeakMapOfStrongSets => {
            let weak = builder.family().is_weak();
            builder.add_map_key("lot", "The lot.", weak, no_options()).expect("lot");
            builder.add_set_element("car", "The car.", false, no_options()).expect("car");
        }
        TemplateFamily::OneToOneMap => builder
            .configure_pairing(PairingBase::WellKnown("WeakMap"), "key", &PairingOptions::default())
            .expect("pairing"),
        other => panic!("unexpected family {other}"),
    }
}

fn legal_shapes() -> Vec<(OuterShape, Option<InnerShape>)> {
    vec![
        (OuterShape::Map, None),
        (OuterShape::WeakMap, None),
        (OuterShape::Set, None),
        (OuterShape::WeakSet, None),
        (OuterShape::OneToOne, None),
        (OuterShape::Map, Some(InnerShape::Set)),
        (OuterShape::WeakMap, Some(InnerShape::Set)),
    ]
}

#[test]
fn test_lock_requires_minimum_declarations() {
    for (outer, inner) in legal_shapes() {
        let mut early = CollectionBuilder::new("Early", outer, inner).expect("builder");
        assert!(early.lock().is_err(), "{outer}/{inner:?} locked too early");
        assert!(early.is_dead());

        let mut builder = CollectionBuilder::new("Complete", outer, inner).expect("builder");
        declare_minimum(&mut builder);
        builder.lock().expect("lock");
        assert!(builder.is_locked());
        builder.lock().expect("lock is idempotent");

        let err = builder.add_map_key("late", "Too late.", false, no_options()).expect_err("locked");
        assert_eq!(err, BuilderError::Locked);
    }
}

#[test]
fn test_mutation_after_lock_fails() {
    let mut builder = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
    builder.add_map_key("car", "The car.", false, no_options()).expect("car");
    builder.add_map_key("seat", "The seat.", false, no_options()).expect("seat");
    builder.set_value_type("The driver.", no_options()).expect("value");
    builder.lock().expect("lock");

    assert_eq!(builder.set_value_type("Again.", no_options()), Err(BuilderError::Locked));
    assert_eq!(builder.family(), TemplateFamily::StrongMap);
    assert!(builder.is_locked());
    assert!(!builder.is_dead());
    builder.lock().expect("still locked");

    assert_eq!(
        builder.add_map_key("driver", "The driver.", false, no_options()),
        Err(BuilderError::Locked)
    );
    assert_eq!(builder.state(), State::Locked);
    assert_eq!(builder.configuration().dimensions().len(), 2);
}

#[test]
fn test_reserved_and_invalid_names() {
    for reserved in ["__key__", "__a__", "____"] {
        let mut builder = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
        let err = builder.add_map_key(reserved, "Reserved.", false, no_options()).expect_err(reserved);
        assert_eq!(err, BuilderError::Reserved(reserved.to_string()));
    }

    let invalid = ["3", "class", "#private", "car()", "foo.bar"];
    for name in invalid {
        let mut builder = CollectionBuilder::new("Cars", OuterShape::Set, None).expect("builder");
        let err = builder.add_set_element(name, "Invalid.", false, no_options()).expect_err(name);
        assert_eq!(err, BuilderError::Identifier(name.to_string()));
    }

    for name in [" car", "car ", "\tcar"] {
        let mut builder = CollectionBuilder::new("Cars", OuterShape::Set, None).expect("builder");
        let err = builder.add_set_element(name, "Spaced.", false, no_options()).expect_err(name);
        assert_eq!(err, BuilderError::Whitespace(name.to_string()));
    }

    for class_name in ["Map", "WeakSet", "__Cars__", "3Cars"] {
        assert!(CollectionBuilder::new(class_name, OuterShape::Map, None).is_err(), "{class_name}");
    }
}

#[test]
fn test_value_name_is_reserved_for_maps_only() {
    let mut map = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
    assert_eq!(
        map.add_map_key("value", "The value.", false, no_options()),
        Err(BuilderError::Reserved("value".into()))
    );

    let mut set = CollectionBuilder::new("Values", OuterShape::Set, None).expect("builder");
    set.add_set_element("value", "The value.", false, no_options()).expect("sets may use value");
}

#[test]
fn test_failure_kills_the_builder() {
    let mut builder = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
    builder.add_map_key("car", "The car.", false, no_options()).expect("car");
    assert!(builder.add_map_key("car", "Again.", false, no_options()).is_err());
    assert_eq!(builder.state(), State::Errored);
    assert_eq!(
        builder.add_map_key("seat", "The seat.", false, no_options()),
        Err(BuilderError::Dead)
    );
    assert_eq!(builder.lock(), Err(BuilderError::Dead));
    assert!(BuilderError::Dead.to_string().contains("dead due to a previous error"));
}

#[test]
fn test_call_order_and_retention_rules() {
    let mut builder = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
    assert!(matches!(
        builder.set_value_type("Too early.", no_options()),
        Err(BuilderError::WrongPhase { operation: "setValueType", state: State::Start })
    ));

    let mut strong = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
    assert!(matches!(
        strong.add_map_key("car", "The car.", true, no_options()),
        Err(BuilderError::WeakNotAllowed { .. })
    ));

    let mut overview = CollectionBuilder::new("Cars", OuterShape::WeakSet, None).expect("builder");
    overview.set_overview("Cars in the lot.").expect("overview");
    overview.set_import_lines("import Car from \"./Car.mjs\";").expect("imports");
    overview.add_set_element("car", "The car.", true, no_options()).expect("car");
    assert!(overview.set_overview("Late.").is_err());

    let mut weak = CollectionBuilder::new("Cars", OuterShape::WeakMap, None).expect("builder");
    weak.add_map_key("car", "The car.", false, no_options()).expect("car");
    assert_eq!(weak.lock(), Err(BuilderError::MissingWeakKey(TemplateFamily::WeakMap)));

    assert_eq!(
        CollectionBuilder::new("Cars", OuterShape::WeakMap, Some(InnerShape::WeakSet)).err(),
        Some(BuilderError::WeakInnerSet)
    );
    assert!(CollectionBuilder::new("Cars", OuterShape::Set, Some(InnerShape::Set)).is_err());
}

#[test]
fn test_map_of_sets_rejects_weak_elements() {
    let mut builder =
        CollectionBuilder::new("Lots", OuterShape::WeakMap, Some(InnerShape::Set)).expect("builder");
    builder.add_map_key("lot", "The lot.", true, no_options()).expect("lot");
    assert!(matches!(
        builder.add_set_element("car", "The car.", true, no_options()),
        Err(BuilderError::WeakNotAllowed { .. })
    ));
}

#[test]
fn test_solo_rewrite() {
    let mut builder = CollectionBuilder::new("Drivers", OuterShape::WeakMap, None).expect("builder");
    builder.add_map_key("car", "The car.", true, no_options()).expect("car");
    builder.lock().expect("lock");
    assert_eq!(builder.family(), TemplateFamily::SoloWeakMap);

    let mut pair = CollectionBuilder::new("Pairs", OuterShape::Set, None).expect("builder");
    pair.add_set_element("a", "First.", false, no_options()).expect("a");
    pair.add_set_element("b", "Second.", false, no_options()).expect("b");
    pair.lock().expect("lock");
    assert_eq!(pair.family(), TemplateFamily::StrongSet);
}

#[test]
fn test_validators_and_docs_are_checked() {
    let mut builder = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
    let options = KeyOptions {
        jsdoc_type: Some("Car".into()),
        ts_type: Some("Car".into()),
        validator: Some("car => car instanceof Car".into()),
    };
    builder.add_map_key("car", "The car.", false, options).expect("car");
    let config = builder.configuration();
    let car = config.dimension("car").expect("car");
    assert_eq!(car.validator(), Some("car instanceof Car"));
    assert_eq!(car.jsdoc_type(), "Car");

    let commented =
        KeyOptions { validator: Some("car2 => car2.ok // must be ok".into()), ..KeyOptions::default() };
    let mut commented_builder = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
    assert!(matches!(
        commented_builder.add_map_key("car2", "Another.", false, commented),
        Err(BuilderError::Validator { .. })
    ));

    let bad = KeyOptions { validator: Some("seat => seat".into()), ..KeyOptions::default() };
    assert!(matches!(
        builder.add_map_key("car2", "Another.", false, bad),
        Err(BuilderError::Validator { .. })
    ));

    let mut empty = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
    assert_eq!(
        empty.add_map_key("car", "  ", false, no_options()),
        Err(BuilderError::EmptyText("description"))
    );

    let mut placeholder = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
    assert!(matches!(
        placeholder.add_map_key("car", "The __className__ car.", false, no_options()),
        Err(BuilderError::ReservedText { .. })
    ));
}

#[test]
fn test_configuration_snapshots_are_independent() {
    let mut builder = CollectionBuilder::new("Cars", OuterShape::Map, None).expect("builder");
    builder.add_map_key("car", "The car.", false, no_options()).expect("car");
    let first = builder.configuration();
    let second = builder.configuration();
    assert_eq!(first, second);

    builder.add_map_key("seat", "The seat.", false, no_options()).expect("seat");
    assert_eq!(first.argument_names(), vec!["car"]);
    assert_eq!(builder.configuration().argument_names(), vec!["car", "seat"]);
}

#[test]
fn test_pairing_bases() {
    let options = PairingOptions { path_to_base_module: Some("./Base.mjs".into()) };

    let mut unlocked = CollectionBuilder::new("Base", OuterShape::WeakMap, None).expect("base");
    unlocked.add_map_key("owner", "The owner.", true, no_options()).expect("owner");
    unlocked.add_map_key("tag", "The tag.", false, no_options()).expect("tag");

    let mut paired = CollectionBuilder::new("Pairs", OuterShape::OneToOne, None).expect("pairs");
    assert_eq!(
        paired.configure_pairing(PairingBase::Builder(&unlocked), "owner", &options),
        Err(BuilderError::BaseNotLocked("Base".into()))
    );

    unlocked.lock().expect("lock base");
    let mut paired = CollectionBuilder::new("Pairs", OuterShape::OneToOne, None).expect("pairs");
    assert!(matches!(
        paired.configure_pairing(PairingBase::Builder(&unlocked), "tag", &options),
        Err(BuilderError::ReservedKeyNotWeak { .. })
    ));

    let mut paired = CollectionBuilder::new("Pairs", OuterShape::OneToOne, None).expect("pairs");
    paired.configure_pairing(PairingBase::Builder(&unlocked), "owner", &options).expect("pairing");
    paired.lock().expect("lock");
    let config = paired.configuration();
    let record = config.pairing().expect("pairing record");
    assert_eq!(record.base_kind, PairingBaseKind::Declared);
    assert_eq!(record.options, options);
    assert_eq!(record.base.class_name(), "Base");

    let mut strong = CollectionBuilder::new("Strong", OuterShape::Map, None).expect("strong");
    strong.add_map_key("k", "Key.", false, no_options()).expect("k");
    strong.lock().expect("lock");
    let mut paired = CollectionBuilder::new("Pairs", OuterShape::OneToOne, None).expect("pairs");
    assert_eq!(
        paired.configure_pairing(PairingBase::Builder(&strong), "k", &options),
        Err(BuilderError::BaseNotWeakMap("Strong".into()))
    );

    let mut unknown = CollectionBuilder::new("Pairs", OuterShape::OneToOne, None).expect("pairs");
    assert_eq!(
        unknown.configure_pairing(PairingBase::WellKnown("Nope"), "key", &options),
        Err(BuilderError::UnknownBase("Nope".into()))
    );
}
