//! Map-of-sets templates.
//!
//! Every variant stores one inner record per mapping-key tuple in `#outerMap`
//! and the set elements inside it. The variants differ in how the mapping
//! keys reach `#outerMap` and in how set elements are stored:
//!
//! | outer        | mapping keys                               |
//! |--------------|--------------------------------------------|
//! | hashed       | `Map` keyed by a `KeyHasher` string        |
//! | single       | `Map` keyed by the one strong key          |
//! | composite    | `WeakMap` keyed by a `WeakKeyComposer` key |
//! | weak single  | `WeakMap` keyed by the one weak key        |
//!
//! Inner sets either hash several elements into a `Map` of frozen arrays, or
//! hold a single element in a native `Set`. Strong outers can iterate and
//! keep a running element count; weak outers cannot.

use super::keyed_set::set_values_doc;
use super::{
    freeze_class, guard, validator_body, KeyPlan, Keying, TemplateContext, INVALID_KEY_ERROR,
};
use crate::utils::JsWriter;
use crate::Result;

const MAP_HASHER: &str = "#mapHasher";
const SET_HASHER: &str = "#setHasher";

/// `Strong/MapOfStrongSets`
pub fn strong_map_of_strong_sets(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Hashed, false, Keying::Hashed)
}

/// `Weak/MapOfStrongSets`
pub fn weak_map_of_strong_sets(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Composite, true, Keying::Hashed)
}

/// `1W/nS`
pub fn one_weak_key_of_strong_sets(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Direct, true, Keying::Hashed)
}

/// `1W/1S`
pub fn one_weak_key_of_one_strong_set(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Direct, true, Keying::Direct)
}

/// `1S/nS`
pub fn one_strong_key_of_strong_sets(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Direct, false, Keying::Hashed)
}

/// `1S/1S`
pub fn one_strong_key_of_one_strong_set(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Direct, false, Keying::Direct)
}

/// `nW/1S`
pub fn weak_map_of_one_strong_set(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Composite, true, Keying::Direct)
}

/// `nS/1S`
pub fn strong_map_of_one_strong_set(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Hashed, false, Keying::Direct)
}

fn render(
    ctx: &mut TemplateContext<'_>,
    outer_keying: Keying,
    weak: bool,
    inner_keying: Keying,
) -> Result<String> {
    let m = ctx.macros;
    let outer = KeyPlan {
        keying: outer_keying,
        all: &m.map_keys,
        weak: &m.weak_map_keys,
        strong: &m.strong_map_keys,
    };
    let inner = KeyPlan {
        keying: inner_keying,
        all: &m.set_elements,
        weak: &[],
        strong: &m.set_elements,
    };
    ctx.helpers = ctx.helpers.union(outer.helpers()).union(inner.helpers());
    ctx.docs.add_template("values", set_values_doc())?;

    let map_args = m.map_arg_list();
    let set_args = m.set_arg_list();
    let all_args = m.arg_list();
    let outer_local = outer.local();
    let inner_local = inner.local();
    let inner_hashed = inner_keying == Keying::Hashed;
    let inner_storage = if inner_hashed { "new Map" } else { "new Set" };

    let mut w = JsWriter::new();
    w.open(&format!("class {}", m.class_name));
    w.line(&format!("#outerMap = new {};", if weak { "WeakMap" } else { "Map" }));
    outer.fields(&mut w, MAP_HASHER);
    inner.fields(&mut w, SET_HASHER);
    if !weak {
        w.line("#sizeOfAll = 0;");
    }
    w.blank();

    w.doc(ctx.docs, "constructor")?;
    w.open("constructor(iterable)");
    w.open("if (iterable)");
    w.line("for (const __set__ of iterable)");
    w.line("  this.add(...__set__);");
    w.close().close();

    if !weak {
        w.blank();
        w.doc(ctx.docs, "size")?;
        w.open("get size()").line("return this.#sizeOfAll;").close();

        w.blank();
        w.doc(ctx.docs, "mapSize")?;
        w.open("get mapSize()").line("return this.#outerMap.size;").close();
    }

    w.blank();
    w.doc(ctx.docs, "getSizeOfSet")?;
    w.open(&format!("getSizeOfSet({})", map_args));
    guard(&mut w, m.has_map_validation(), "#isValidMapKey", &map_args, "return 0;");
    w.line(&format!("const __inner__ = this.#getInner({});", map_args));
    w.line("return __inner__ ? __inner__.set.size : 0;");
    w.close();

    w.blank();
    w.doc(ctx.docs, "add")?;
    w.open(&format!("add({})", all_args));
    if m.has_validation() {
        w.line(&format!("if (!this.#isValidKey({}))", all_args));
        w.line(&format!("  {}", INVALID_KEY_ERROR));
    }
    w.line(&format!("const __inner__ = this.#requireInner({});", map_args));
    count_added(&mut w, weak, &format!("this.#innerAdd(__inner__, {})", set_args));
    w.line("return this;");
    w.close();

    w.blank();
    w.doc(ctx.docs, "addSets")?;
    w.open(&format!("addSets({}, __sets__)", map_args));
    if m.has_map_validation() {
        w.line(&format!("if (!this.#isValidMapKey({}))", map_args));
        w.line(&format!("  {}", INVALID_KEY_ERROR));
    }
    w.line("const __array__ = Array.from(__sets__);");
    w.open("for (const __set__ of __array__)");
    w.line(&format!("if (__set__.length !== {})", m.set_elements.len()));
    w.line("  throw new Error(\"Set length mismatch!\");");
    if m.has_set_validation() {
        w.line("if (!this.#isValidSetKey(...__set__))");
        w.line(&format!("  {}", INVALID_KEY_ERROR));
    }
    w.close();
    w.line("if (__array__.length === 0)");
    w.line("  return this;");
    w.line(&format!("const __inner__ = this.#requireInner({});", map_args));
    w.open("for (const __set__ of __array__)");
    count_added(&mut w, weak, "this.#innerAdd(__inner__, ...__set__)");
    w.close();
    w.line("return this;");
    w.close();

    if !weak {
        w.blank();
        w.doc(ctx.docs, "clear")?;
        w.open("clear()");
        w.line("this.#outerMap.clear();");
        w.line("this.#sizeOfAll = 0;");
        w.close();
    }

    w.blank();
    w.doc(ctx.docs, "delete")?;
    w.open(&format!("delete({})", all_args));
    guard(&mut w, m.has_validation(), "#isValidKey", &all_args, "return false;");
    w.line(&format!("const __inner__ = this.#getInner({});", map_args));
    w.line(&format!("if (!__inner__ || !this.#innerDelete(__inner__, {}))", set_args));
    w.line("  return false;");
    if !weak {
        w.line("this.#sizeOfAll--;");
    }
    w.line("if (__inner__.set.size === 0)");
    w.line(&format!("  this.#deleteInner({});", map_args));
    w.line("return true;");
    w.close();

    w.blank();
    w.doc(ctx.docs, "deleteSets")?;
    w.open(&format!("deleteSets({})", map_args));
    guard(&mut w, m.has_map_validation(), "#isValidMapKey", &map_args, "return false;");
    w.line(&format!("const __inner__ = this.#getInner({});", map_args));
    w.line("if (!__inner__)");
    w.line("  return false;");
    if !weak {
        w.line("this.#sizeOfAll -= __inner__.set.size;");
    }
    w.line(&format!("return this.#deleteInner({});", map_args));
    w.close();

    if !weak {
        w.blank();
        w.doc(ctx.docs, "forEach")?;
        w.open("forEach(__callback__, __thisArg__)");
        w.line("for (const __entry__ of this.values())");
        w.line("  __callback__.apply(__thisArg__, [...__entry__, this]);");
        w.close();
    }

    w.blank();
    w.doc(ctx.docs, "forEachSet")?;
    w.open(&format!("forEachSet({}, __callback__, __thisArg__)", map_args));
    guard(&mut w, m.has_map_validation(), "#isValidMapKey", &map_args, "return;");
    w.line(&format!("const __inner__ = this.#getInner({});", map_args));
    w.line("if (!__inner__)");
    w.line("  return;");
    w.line("for (const __set__ of this.#innerValues(__inner__))");
    w.line(&format!("  __callback__.apply(__thisArg__, [{}, ...__set__, this]);", map_args));
    w.close();

    w.blank();
    w.doc(ctx.docs, "has")?;
    w.open(&format!("has({})", all_args));
    guard(&mut w, m.has_validation(), "#isValidKey", &all_args, "return false;");
    w.line(&format!("const __inner__ = this.#getInner({});", map_args));
    w.line(&format!("return __inner__ ? this.#innerHas(__inner__, {}) : false;", set_args));
    w.close();

    w.blank();
    w.doc(ctx.docs, "hasSets")?;
    w.open(&format!("hasSets({})", map_args));
    guard(&mut w, m.has_map_validation(), "#isValidMapKey", &map_args, "return false;");
    w.line(&format!("return Boolean(this.#getInner({}));", map_args));
    w.close();

    w.blank();
    w.doc(ctx.docs, "isValidKey")?;
    w.open(&format!("isValidKey({})", all_args));
    w.line(&format!("return this.#isValidKey({});", all_args));
    w.close();

    if !weak {
        w.blank();
        w.doc(ctx.docs, "values")?;
        w.open("* values()");
        w.open("for (const __inner__ of this.#outerMap.values())");
        w.line("for (const __set__ of this.#innerValues(__inner__))");
        w.line("  yield [...__inner__.mapKeys, ...__set__];");
        w.close();
        w.close();
    }

    w.blank();
    w.doc(ctx.docs, "valuesSet")?;
    w.open(&format!("* valuesSet({})", map_args));
    guard(&mut w, m.has_map_validation(), "#isValidMapKey", &map_args, "return;");
    w.line(&format!("const __inner__ = this.#getInner({});", map_args));
    w.line("if (!__inner__)");
    w.line("  return;");
    w.line("for (const __set__ of this.#innerValues(__inner__))");
    w.line(&format!("  yield [{}, ...__set__];", map_args));
    w.close();

    if !weak {
        w.blank();
        w.doc(ctx.docs, "iterator")?;
        w.open("[Symbol.iterator]()").line("return this.values();").close();
    }

    w.blank();
    w.doc(ctx.docs, "toStringTag")?;
    w.open("get [Symbol.toStringTag]()").line(&format!("return \"{}\";", m.class_name)).close();

    // Private helpers.
    w.blank();
    w.open(&format!("#getInner({})", map_args));
    outer.lookup(&mut w, MAP_HASHER, "return undefined;");
    w.line(&format!("return this.#outerMap.get({});", outer_local));
    w.close();

    w.blank();
    w.open(&format!("#requireInner({})", map_args));
    outer.require(&mut w, MAP_HASHER);
    w.line(&format!("let __inner__ = this.#outerMap.get({});", outer_local));
    w.open("if (!__inner__)");
    if weak {
        w.line(&format!("__inner__ = {{ set: {} }};", inner_storage));
    } else {
        w.line(&format!(
            "__inner__ = {{ mapKeys: Object.freeze([{}]), set: {} }};",
            map_args, inner_storage
        ));
    }
    w.line(&format!("this.#outerMap.set({}, __inner__);", outer_local));
    w.close();
    w.line("return __inner__;");
    w.close();

    w.blank();
    w.open(&format!("#deleteInner({})", map_args));
    outer.lookup(&mut w, MAP_HASHER, "return false;");
    w.line(&format!("const __deleted__ = this.#outerMap.delete({});", outer_local));
    outer.forget(&mut w);
    w.line("return __deleted__;");
    w.close();

    w.blank();
    w.open(&format!("#innerAdd(__inner__, {})", set_args));
    inner.require(&mut w, SET_HASHER);
    w.line(&format!("if (__inner__.set.has({}))", inner_local));
    w.line("  return false;");
    if inner_hashed {
        w.line(&format!("__inner__.set.set(__hash__, Object.freeze([{}]));", set_args));
    } else {
        w.line(&format!("__inner__.set.add({});", inner_local));
    }
    w.line("return true;");
    w.close();

    for operation in ["has", "delete"] {
        w.blank();
        let capitalized = if operation == "has" { "Has" } else { "Delete" };
        w.open(&format!("#inner{}(__inner__, {})", capitalized, set_args));
        inner.lookup(&mut w, SET_HASHER, "return false;");
        w.line(&format!("return __inner__.set.{}({});", operation, inner_local));
        w.close();
    }

    w.blank();
    w.open("* #innerValues(__inner__)");
    if inner_hashed {
        w.line("yield* __inner__.set.values();");
    } else {
        w.line("for (const __element__ of __inner__.set)");
        w.line("  yield [__element__];");
    }
    w.close();

    w.blank();
    w.open(&format!("#isValidKey({})", all_args));
    w.line(&format!(
        "return this.#isValidMapKey({}) && this.#isValidSetKey({});",
        map_args, set_args
    ));
    w.close();

    w.blank();
    validator_body(&mut w, &format!("#isValidMapKey({})", map_args), &m.validate_map_arguments);
    w.blank();
    validator_body(&mut w, &format!("#isValidSetKey({})", set_args), &m.validate_set_arguments);
    w.close();

    freeze_class(&mut w, &m.class_name);
    Ok(w.finish())
}

/// Adds to the running count on strong outers; weak outers only add.
fn count_added(w: &mut JsWriter, weak: bool, call: &str) {
    if weak {
        w.line(&format!("{};", call));
    } else {
        w.line(&format!("if ({})", call));
        w.line("  this.#sizeOfAll++;");
    }
}
