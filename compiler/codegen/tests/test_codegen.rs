use builder::{CollectionBuilder, KeyOptions, PairingBase};
use codegen::{CodegenError, HelperUse, SourceGenerator, TemplateVariant};
use config::CompileOptions;
use ir::{InnerShape, OuterShape, PairingOptions, TemplateFamily};

fn no_options() -> KeyOptions { KeyOptions::default() }

fn generate(builder: &CollectionBuilder, options: CompileOptions) -> codegen::GeneratedSource {
    SourceGenerator::new(builder.configuration(), options).generate().expect("generate")
}

fn weak_single_key_map() -> CollectionBuilder {
    let mut builder = CollectionBuilder::new("Cars", OuterShape::WeakMap, None).expect("builder");
    builder.add_map_key("car", "The car.", true, no_options()).expect("car");
    builder.lock().expect("lock");
    builder
}

fn owner_of_points() -> CollectionBuilder {
    let mut builder =
        CollectionBuilder::new("OwnerPoints", OuterShape::WeakMap, Some(InnerShape::Set))
            .expect("builder");
    builder.add_map_key("owner", "The owner.", true, no_options()).expect("owner");
    builder.add_set_element("x", "The x coordinate.", false, no_options()).expect("x");
    builder.add_set_element("y", "The y coordinate.", false, no_options()).expect("y");
    builder.lock().expect("lock");
    builder
}

fn paired(base: PairingBase<'_>, reserved_key: &str, options: &PairingOptions) -> CollectionBuilder {
    let mut builder = CollectionBuilder::new("Pairs", OuterShape::OneToOne, None).expect("builder");
    builder.configure_pairing(base, reserved_key, options).expect("pairing");
    builder.lock().expect("lock");
    builder
}

#[test]
fn test_weak_single_key_map_defines_declared_class() {
    let builder = weak_single_key_map();
    assert_eq!(builder.family(), TemplateFamily::SoloWeakMap);

    let generated = generate(&builder, CompileOptions::default());
    assert_eq!(generated.class_name, "Cars");
    assert_eq!(generated.variant, TemplateVariant::SoloWeakMap);
    assert_eq!(generated.helpers, HelperUse::default());
    assert!(generated.source.contains("class Cars {"));
    assert!(generated.source.contains("#root = new WeakMap;"));
    assert!(generated.source.contains("if (Object(car) !== car) return false;"));
    assert!(generated.source.ends_with("export default Cars;\n"));
    assert!(!generated.source.contains("import "));
}

#[test]
fn test_map_of_sets_specialization_can_be_disabled() {
    let builder = owner_of_points();

    let specialized = generate(&builder, CompileOptions::default());
    assert_eq!(specialized.variant, TemplateVariant::OneWeakKeyOfStrongSets);
    assert_eq!(specialized.helpers, HelperUse { hasher: true, composer: false });
    assert!(specialized.source.contains("#outerMap = new WeakMap;"));
    assert!(specialized.source.contains("return this.#outerMap.get(owner);"));

    let generic =
        generate(&builder, CompileOptions::default().with_disable_key_optimization(true));
    assert_eq!(generic.variant, TemplateVariant::WeakMapOfStrongSets);
    assert_eq!(generic.helpers, HelperUse { hasher: true, composer: true });
    assert!(generic.source.contains("import WeakKeyComposer from \"./keys/Composite.mjs\";"));
    assert!(generic.source.contains("new WeakKeyComposer([\"owner\"], []);"));
}

#[test]
fn test_strong_map_hashes_keys_and_splices_validators() {
    let mut builder = CollectionBuilder::new("CarSeats", OuterShape::Map, None).expect("builder");
    builder.add_map_key("car", "The car.", false, no_options()).expect("car");
    let seat = KeyOptions {
        validator: Some("seat => seat > 0".to_string()),
        ..KeyOptions::default()
    };
    builder.add_map_key("seat", "The seat number.", false, seat).expect("seat");
    builder.set_value_type("The driver.", no_options()).expect("value");
    builder.lock().expect("lock");

    let generated = generate(&builder, CompileOptions::default());
    assert_eq!(generated.variant, TemplateVariant::StrongMap);
    assert!(generated.source.contains("import KeyHasher from \"./keys/Hasher.mjs\";"));
    assert!(generated.source.contains("if (!(seat > 0)) return false;"));
    assert!(generated.source.contains("const __hash__ = this.#hasher.getHash(car, seat);"));
    assert!(generated.source.contains("set(car, seat, value) {"));
    assert!(generated.source.contains("@param {*} value The driver."));
    assert!(generated.source.contains("throw new Error(\"The ordered key set is not valid!\");"));
}

#[test]
fn test_file_header_is_emitted_when_supplied() {
    let mut builder = CollectionBuilder::new("Tags", OuterShape::Set, None).expect("builder");
    builder.set_overview("Tags by name.").expect("overview");
    builder.add_set_element("name", "The tag name.", false, no_options()).expect("name");
    builder.lock().expect("lock");

    let options = CompileOptions::default()
        .with_license("MIT")
        .with_author("Jane Doe")
        .with_generate_type_checked(true);
    let generated = generate(&builder, options);
    assert!(generated.source.starts_with("// @ts-check\n\n/**\n * @file\n * Tags by name.\n"));
    assert!(generated.source.contains(" * @license MIT\n * @author Jane Doe\n */"));
    assert!(!generated.source.contains("@copyright"));
    assert!(generated.source.contains("#root = new Set;"));
    assert!(generated.source.contains("@param {unknown} name The tag name."));
}

#[test]
fn test_output_is_normalized() {
    for builder in [weak_single_key_map(), owner_of_points()] {
        let source = generate(&builder, CompileOptions::default()).source;
        assert!(!source.contains("\n\n\n"));
        assert!(source.ends_with(";\n"));
        assert!(source.lines().all(|l| l == l.trim_end()));
    }
}

#[test]
fn test_paired_with_builtin_base_uses_single_argument_api() {
    let builder = paired(PairingBase::WellKnown("WeakMap"), "key", &PairingOptions::default());
    let generated = generate(&builder, CompileOptions::default());

    assert_eq!(generated.variant, TemplateVariant::OneToOneMap);
    assert!(generated.source.contains("#baseMap = new WeakMap;"));
    assert!(generated.source.contains("bindOneToOne(value_1, value_2) {"));
    assert!(generated.source.contains("get(value) {"));
    assert!(!generated.source.contains("hasIdentity"));
}

#[test]
fn test_paired_with_nested_base_emits_both_classes() {
    let builder =
        paired(PairingBase::WellKnown("WeakStrongMap"), "weakKey", &PairingOptions::default());
    let generated = generate(&builder, CompileOptions::default());
    let source = &generated.source;

    let base = source.find("class WeakStrongMap {").expect("nested base");
    let wrapper = source.find("class Pairs {").expect("wrapper");
    assert!(base < wrapper);
    assert_eq!(source.matches("export default").count(), 1);
    assert_eq!(source.matches("import WeakKeyComposer").count(), 1);
    assert!(generated.helpers.composer);

    assert!(source.contains("#baseMap = new WeakStrongMap;"));
    assert!(source.contains("bindOneToOne(strongKey_1, value_1, strongKey_2, value_2) {"));
    assert!(source.contains("this.#baseMap.set(__key__, strongKey_1, value_1);"));
    assert!(source.contains("hasIdentity(value, strongKey, allowNotDefined) {"));
    assert!(source.contains("return Boolean(allowNotDefined);"));
}

#[test]
fn test_paired_with_module_path_imports_base() {
    let options = PairingOptions { path_to_base_module: Some("./WeakStrongMap.mjs".to_string()) };
    let builder = paired(PairingBase::WellKnown("WeakStrongMap"), "weakKey", &options);
    let generated = generate(&builder, CompileOptions::default());

    assert!(generated.source.contains("import WeakStrongMap from \"./WeakStrongMap.mjs\";"));
    assert!(!generated.source.contains("class WeakStrongMap {"));
    assert_eq!(generated.imports, vec!["import WeakStrongMap from \"./WeakStrongMap.mjs\";"]);
}

#[test]
fn test_paired_base_must_not_share_class_name() {
    let mut base = CollectionBuilder::new("Pairs", OuterShape::WeakMap, None).expect("base");
    base.add_map_key("key", "The key.", true, no_options()).expect("key");
    base.lock().expect("lock base");
    let builder = paired(PairingBase::Builder(&base), "key", &PairingOptions::default());

    let err = SourceGenerator::new(builder.configuration(), CompileOptions::default())
        .generate()
        .expect_err("same class name");
    assert!(matches!(err, CodegenError::Message(_)));
}

fn keyed(class_name: &str, outer: OuterShape, keys: &[(&str, bool)]) -> CollectionBuilder {
    let mut builder = CollectionBuilder::new(class_name, outer, None).expect("builder");
    for (name, weak) in keys {
        let description = format!("The {}.", name);
        match outer {
            OuterShape::Set | OuterShape::WeakSet => {
                builder.add_set_element(name, &description, *weak, no_options()).expect(name)
            }
            _ => builder.add_map_key(name, &description, *weak, no_options()).expect(name),
        }
    }
    builder.lock().expect("lock");
    builder
}

fn map_of_sets(outer: OuterShape, keys: &[(&str, bool)], elements: &[&str]) -> CollectionBuilder {
    let mut builder =
        CollectionBuilder::new("Groups", outer, Some(InnerShape::Set)).expect("builder");
    for (name, weak) in keys {
        builder.add_map_key(name, &format!("The {}.", name), *weak, no_options()).expect(name);
    }
    for name in elements {
        builder.add_set_element(name, &format!("The {}.", name), false, no_options()).expect(name);
    }
    builder.lock().expect("lock");
    builder
}

fn assert_weak_outer(source: &str) {
    assert!(source.contains("#outerMap = new WeakMap;"));
    assert!(!source.contains("#sizeOfAll"));
    assert!(!source.contains("get size()"));
    assert!(!source.contains("[Symbol.iterator]()"));
    assert!(!source.contains("* values() {"));
}

fn assert_strong_outer(source: &str) {
    assert!(source.contains("#outerMap = new Map;"));
    assert!(source.contains("#sizeOfAll = 0;"));
    assert!(source.contains("get size() {"));
    assert!(source.contains("get mapSize() {"));
    assert!(source.contains("[Symbol.iterator]() {"));
}

#[test]
fn test_one_weak_key_of_one_element_sets_uses_native_storage() {
    let builder = map_of_sets(OuterShape::WeakMap, &[("owner", true)], &["tag"]);
    let generated = generate(&builder, CompileOptions::default());
    let source = &generated.source;

    assert_eq!(generated.variant, TemplateVariant::OneWeakKeyOfOneStrongSet);
    assert_eq!(generated.helpers, HelperUse::default());
    assert_weak_outer(source);
    assert!(source.contains("return this.#outerMap.get(owner);"));
    assert!(source.contains("__inner__ = { set: new Set };"));
    assert!(source.contains("__inner__.set.add(tag);"));
    assert!(!source.contains("KeyHasher"));
    assert!(!source.contains("WeakKeyComposer"));
    assert!(!source.contains("import "));
}

#[test]
fn test_one_strong_key_of_sets_hashes_elements_only() {
    let builder = map_of_sets(OuterShape::Map, &[("owner", false)], &["x", "y"]);
    let generated = generate(&builder, CompileOptions::default());
    let source = &generated.source;

    assert_eq!(generated.variant, TemplateVariant::OneStrongKeyOfStrongSets);
    assert_eq!(generated.helpers, HelperUse { hasher: true, composer: false });
    assert_strong_outer(source);
    assert!(source.contains("#setHasher = new KeyHasher;"));
    assert!(!source.contains("#mapHasher"));
    assert!(source.contains("__inner__ = { mapKeys: Object.freeze([owner]), set: new Map };"));
    assert!(source.contains("const __hash__ = this.#setHasher.getHash(x, y);"));
    assert!(source.contains("__inner__.set.set(__hash__, Object.freeze([x, y]));"));
    assert!(source.contains("return this.#outerMap.get(owner);"));
}

#[test]
fn test_one_strong_key_of_one_element_sets_needs_no_helpers() {
    let builder = map_of_sets(OuterShape::Map, &[("owner", false)], &["tag"]);
    let generated = generate(&builder, CompileOptions::default());
    let source = &generated.source;

    assert_eq!(generated.variant, TemplateVariant::OneStrongKeyOfOneStrongSet);
    assert_eq!(generated.helpers, HelperUse::default());
    assert_strong_outer(source);
    assert!(source.contains("__inner__ = { mapKeys: Object.freeze([owner]), set: new Set };"));
    assert!(source.contains("__inner__.set.add(tag);"));
    assert!(source.contains("for (const __element__ of __inner__.set)"));
    assert!(!source.contains("KeyHasher"));
}

#[test]
fn test_weak_map_of_one_element_sets_composes_map_keys() {
    let builder =
        map_of_sets(OuterShape::WeakMap, &[("owner", true), ("label", false)], &["tag"]);
    let generated = generate(&builder, CompileOptions::default());
    let source = &generated.source;

    assert_eq!(generated.variant, TemplateVariant::WeakMapOfOneStrongSet);
    assert_eq!(generated.helpers, HelperUse { hasher: false, composer: true });
    assert_weak_outer(source);
    assert!(source.contains("#keyComposer = new WeakKeyComposer([\"owner\"], [\"label\"]);"));
    assert!(source.contains("const __key__ = this.#keyComposer.getKey([owner], [label]);"));
    assert!(source.contains("const __key__ = this.#keyComposer.getKeyIfExists([owner], [label]);"));
    assert!(source.contains("this.#keyComposer.deleteKey([owner], [label]);"));
    assert!(source.contains("__inner__.set.add(tag);"));
    assert!(!source.contains("#setHasher"));
    assert!(source.contains("import WeakKeyComposer from \"./keys/Composite.mjs\";"));
}

#[test]
fn test_strong_map_of_one_element_sets_hashes_map_keys_only() {
    let builder =
        map_of_sets(OuterShape::Map, &[("owner", false), ("label", false)], &["tag"]);
    let generated = generate(&builder, CompileOptions::default());
    let source = &generated.source;

    assert_eq!(generated.variant, TemplateVariant::StrongMapOfOneStrongSet);
    assert_eq!(generated.helpers, HelperUse { hasher: true, composer: false });
    assert_strong_outer(source);
    assert!(source.contains("#mapHasher = new KeyHasher;"));
    assert!(!source.contains("#setHasher"));
    assert!(source.contains("const __hash__ = this.#mapHasher.getHash(owner, label);"));
    assert!(source.contains("const __hash__ = this.#mapHasher.getHashIfExists(owner, label);"));
    assert!(source.contains(
        "__inner__ = { mapKeys: Object.freeze([owner, label]), set: new Set };"
    ));
}

#[test]
fn test_strong_map_of_sets_hashes_both_sides() {
    let builder =
        map_of_sets(OuterShape::Map, &[("owner", false), ("label", false)], &["x", "y"]);
    let generated = generate(&builder, CompileOptions::default());

    assert_eq!(generated.variant, TemplateVariant::StrongMapOfStrongSets);
    assert_eq!(generated.helpers, HelperUse { hasher: true, composer: false });
    assert_strong_outer(&generated.source);
    assert!(generated.source.contains("#mapHasher = new KeyHasher;"));
    assert!(generated.source.contains("#setHasher = new KeyHasher;"));
    assert_eq!(generated.source.matches("import KeyHasher").count(), 1);
}

#[test]
fn test_weak_map_composes_keys_without_iteration() {
    let builder = keyed("CarSeats", OuterShape::WeakMap, &[("car", true), ("seat", false)]);
    assert_eq!(builder.family(), TemplateFamily::WeakMap);
    let generated = generate(&builder, CompileOptions::default());
    let source = &generated.source;

    assert_eq!(generated.variant, TemplateVariant::WeakMap);
    assert_eq!(generated.helpers, HelperUse { hasher: false, composer: true });
    assert!(source.contains("#root = new WeakMap;"));
    assert!(source.contains("#keyComposer = new WeakKeyComposer([\"car\"], [\"seat\"]);"));
    assert!(source.contains("const __key__ = this.#keyComposer.getKey([car], [seat]);"));
    assert!(source.contains("this.#root.set(__key__, value);"));
    assert!(source.contains("this.#keyComposer.deleteKey([car], [seat]);"));
    assert!(!source.contains("get size()"));
    assert!(!source.contains("* entries()"));
    assert!(!source.contains("KeyHasher"));
}

#[test]
fn test_strong_set_hashes_elements() {
    let builder = keyed("Points", OuterShape::Set, &[("x", false), ("y", false)]);
    let generated = generate(&builder, CompileOptions::default());
    let source = &generated.source;

    assert_eq!(generated.variant, TemplateVariant::StrongSet);
    assert_eq!(generated.helpers, HelperUse { hasher: true, composer: false });
    assert!(source.contains("#root = new Map;"));
    assert!(source.contains("#hasher = new KeyHasher;"));
    assert!(source.contains("this.#root.set(__hash__, Object.freeze([x, y]));"));
    assert!(source.contains("const __hash__ = this.#hasher.getHashIfExists(x, y);"));
    assert!(source.contains("get size() {"));
    assert!(source.contains("yield [...__set__];"));
}

#[test]
fn test_weak_set_composes_elements() {
    let builder = keyed("Visits", OuterShape::WeakSet, &[("visitor", true), ("day", false)]);
    let generated = generate(&builder, CompileOptions::default());
    let source = &generated.source;

    assert_eq!(generated.variant, TemplateVariant::WeakSet);
    assert_eq!(generated.helpers, HelperUse { hasher: false, composer: true });
    assert!(source.contains("#root = new WeakSet;"));
    assert!(source.contains("#keyComposer = new WeakKeyComposer([\"visitor\"], [\"day\"]);"));
    assert!(source.contains("const __key__ = this.#keyComposer.getKey([visitor], [day]);"));
    assert!(source.contains("this.#root.add(__key__);"));
    assert!(source.contains("this.#keyComposer.deleteKey([visitor], [day]);"));
    assert!(!source.contains("get size()"));
    assert!(!source.contains("* values()"));
}

#[test]
fn test_solo_sets_wrap_native_collections() {
    let strong = keyed("Tags", OuterShape::Set, &[("name", false)]);
    assert_eq!(strong.family(), TemplateFamily::SoloStrongSet);
    let generated = generate(&strong, CompileOptions::default());
    assert_eq!(generated.variant, TemplateVariant::SoloStrongSet);
    assert_eq!(generated.helpers, HelperUse::default());
    assert!(generated.source.contains("#root = new Set;"));
    assert!(generated.source.contains("this.#root.add(name);"));
    assert!(generated.source.contains("yield [__key__];"));

    let weak = keyed("Seen", OuterShape::WeakSet, &[("item", true)]);
    assert_eq!(weak.family(), TemplateFamily::SoloWeakSet);
    let generated = generate(&weak, CompileOptions::default());
    assert_eq!(generated.variant, TemplateVariant::SoloWeakSet);
    assert_eq!(generated.helpers, HelperUse::default());
    assert!(generated.source.contains("#root = new WeakSet;"));
    assert!(generated.source.contains("this.#root.add(item);"));
    assert!(!generated.source.contains("get size()"));
    assert!(!generated.source.contains("import "));
}
