//! Paired one-to-one collections.
//!
//! A paired collection binds values to each other through a shared frozen
//! identity object. The identity is the reserved weak key of a base map; the
//! base stores, per identity, either the bound pair (single-argument API) or
//! one value per source-key tuple (double-argument API).

use std::sync::Arc;

use ir::KeyDescriptor;

use super::doc_comment::{ArgumentPolicy, MethodTemplate};
use super::{freeze_class, guard, validator_body, TemplateContext};
use crate::macros::PairingMacros;
use crate::utils::{name_list, suffixed, JsWriter};
use crate::{CodegenError, Result};

const ALREADY_BOUND: &str =
    "throw new Error(\"value_1 and value_2 are already in different one-to-one mappings!\");";

/// `OneToOne/Map`
pub fn one_to_one_map(ctx: &mut TemplateContext<'_>) -> Result<String> {
    let m = ctx.macros;
    let pairing = m.pairing.as_ref().ok_or_else(|| {
        CodegenError::Unreachable(format!("\"{}\" has no pairing macros", m.class_name))
    })?;

    let mut w = JsWriter::new();
    w.open(&format!("class {}", m.class_name));
    w.line(&format!("#baseMap = {};", pairing.base_constructor()));
    w.line("#weakValueToInternalKey = new WeakMap;");

    if pairing.is_single_argument() {
        single(ctx, &mut w)?;
    } else {
        double(ctx, pairing, &mut w)?;
    }

    w.blank();
    w.doc(ctx.docs, "isValidValue")?;
    w.open("isValidValue(value)").line("return Object(value) === value;").close();

    w.blank();
    w.doc(ctx.docs, "toStringTag")?;
    w.open("get [Symbol.toStringTag]()").line(&format!("return \"{}\";", m.class_name)).close();
    w.close();

    freeze_class(&mut w, &m.class_name);
    Ok(w.finish())
}

/// `bindOneToOne` doc for the double-argument API: each side's source keys
/// suffixed `_1` / `_2`, followed by that side's value.
pub fn bind_template(sources: &[Arc<KeyDescriptor>], use_ts_types: bool) -> MethodTemplate {
    let mut template =
        MethodTemplate::new("Bind two sets of keys and values together.", ArgumentPolicy::None);
    for side in ["_1", "_2"] {
        for source in sources {
            let type_name = if use_ts_types { source.ts_type() } else { source.jsdoc_type() };
            template = template.param_before(
                type_name,
                &format!("{}{}", source.name(), side),
                source.description(),
            );
        }
        template = template.param_before("object", &format!("value{}", side), "The value.");
    }
    template.void()
}

fn single(ctx: &mut TemplateContext<'_>, w: &mut JsWriter) -> Result<()> {
    w.blank();
    w.doc(ctx.docs, "bindOneToOne")?;
    w.open("bindOneToOne(value_1, value_2)");
    w.line("const __key1__ = this.#weakValueToInternalKey.get(value_1);");
    w.line("const __key2__ = this.#weakValueToInternalKey.get(value_2);");
    w.line("if (__key1__ && __key1__ === __key2__)");
    w.line("  return;");
    w.line("if (__key1__ || __key2__)");
    w.line(&format!("  {}", ALREADY_BOUND));
    check_values(w);
    w.line("const __key__ = Object.freeze({});");
    w.line("this.#weakValueToInternalKey.set(value_1, __key__);");
    w.line("this.#weakValueToInternalKey.set(value_2, __key__);");
    w.line("this.#baseMap.set(__key__, Object.freeze([value_1, value_2]));");
    w.close();

    w.blank();
    w.doc(ctx.docs, "delete")?;
    w.open("delete(value)");
    lookup_pair(w, "return false;");
    w.line("this.#weakValueToInternalKey.delete(__pair__[0]);");
    w.line("this.#weakValueToInternalKey.delete(__pair__[1]);");
    w.line("return this.#baseMap.delete(__key__);");
    w.close();

    w.blank();
    w.doc(ctx.docs, "get")?;
    w.open("get(value)");
    lookup_pair(w, "return undefined;");
    w.line("return __pair__[0] === value ? __pair__[1] : __pair__[0];");
    w.close();

    w.blank();
    w.doc(ctx.docs, "has")?;
    w.open("has(value)").line("return this.#weakValueToInternalKey.has(value);").close();
    Ok(())
}

fn double(ctx: &mut TemplateContext<'_>, pairing: &PairingMacros, w: &mut JsWriter) -> Result<()> {
    let sources = name_list(&pairing.source_names);
    let sources_1 = name_list(&suffixed(&pairing.source_names, "_1"));
    let sources_2 = name_list(&suffixed(&pairing.source_names, "_2"));
    let base_args = pairing.base_args_with_suffix("");
    let base_args_1 = pairing.base_args_with_suffix("_1");
    let base_args_2 = pairing.base_args_with_suffix("_2");
    let validated = !pairing.validate_sources.is_empty();

    w.blank();
    w.doc(ctx.docs, "bindOneToOne")?;
    w.open(&format!("bindOneToOne({}, value_1, {}, value_2)", sources_1, sources_2));
    if validated {
        w.line(&format!("if (!this.isValidKey({}))", sources_1));
        w.line("  throw new Error(\"The first ordered key set is not valid!\");");
        w.line(&format!("if (!this.isValidKey({}))", sources_2));
        w.line("  throw new Error(\"The second ordered key set is not valid!\");");
    }
    check_values(w);
    w.line("const __key1__ = this.#weakValueToInternalKey.get(value_1);");
    w.line("const __key2__ = this.#weakValueToInternalKey.get(value_2);");
    w.line("if (__key1__ && __key2__ && __key1__ !== __key2__)");
    w.line(&format!("  {}", ALREADY_BOUND));
    w.line("const __key__ = __key1__ || __key2__ || Object.freeze({});");
    w.blank();
    w.line(&format!("const __hasKeySet1__ = this.#baseMap.has({});", base_args_1));
    w.line(&format!("const __hasKeySet2__ = this.#baseMap.has({});", base_args_2));
    w.line(&format!(
        "if (__hasKeySet1__ && this.#baseMap.get({}) !== value_1)",
        base_args_1
    ));
    w.line("  throw new Error(\"value_1 mismatch!\");");
    w.line(&format!(
        "if (__hasKeySet2__ && this.#baseMap.get({}) !== value_2)",
        base_args_2
    ));
    w.line("  throw new Error(\"value_2 mismatch!\");");
    w.blank();
    w.line("this.#weakValueToInternalKey.set(value_1, __key__);");
    w.line("this.#weakValueToInternalKey.set(value_2, __key__);");
    w.line("if (!__hasKeySet1__)");
    w.line(&format!("  this.#baseMap.set({}, value_1);", base_args_1));
    w.line("if (!__hasKeySet2__)");
    w.line(&format!("  this.#baseMap.set({}, value_2);", base_args_2));
    w.close();

    w.blank();
    w.doc(ctx.docs, "delete")?;
    w.open(&format!("delete(value, {})", sources));
    guard(w, validated, "isValidKey", &sources, "return false;");
    lookup_identity(w, "return false;");
    w.line(&format!("const __target__ = this.#baseMap.get({});", base_args));
    w.line("if (!__target__)");
    w.line("  return false;");
    w.line(&format!("const __deleted__ = this.#baseMap.delete({});", base_args));
    w.line("if (__deleted__)");
    w.line("  this.#weakValueToInternalKey.delete(__target__);");
    w.line("return __deleted__;");
    w.close();

    w.blank();
    w.doc(ctx.docs, "get")?;
    w.open(&format!("get(value, {})", sources));
    guard(w, validated, "isValidKey", &sources, "return undefined;");
    lookup_identity(w, "return undefined;");
    w.line(&format!("return this.#baseMap.get({});", base_args));
    w.close();

    w.blank();
    w.doc(ctx.docs, "has")?;
    w.open(&format!("has(value, {})", sources));
    guard(w, validated, "isValidKey", &sources, "return false;");
    lookup_identity(w, "return false;");
    w.line(&format!("return this.#baseMap.has({});", base_args));
    w.close();

    w.blank();
    w.doc(ctx.docs, "hasIdentity")?;
    w.open(&format!("hasIdentity(value, {}, allowNotDefined)", sources));
    guard(w, validated, "isValidKey", &sources, "return false;");
    lookup_identity(w, "return Boolean(allowNotDefined);");
    w.line(&format!("return this.#baseMap.get({}) === value;", base_args));
    w.close();

    w.blank();
    w.doc(ctx.docs, "isValidKey")?;
    validator_body(w, &format!("isValidKey({})", sources), &pairing.validate_sources);
    Ok(())
}

fn check_values(w: &mut JsWriter) {
    for value in ["value_1", "value_2"] {
        w.line(&format!("if (!this.isValidValue({}))", value));
        w.line(&format!("  throw new Error(\"{} is not a valid value!\");", value));
    }
}

fn lookup_identity(w: &mut JsWriter, missing: &str) {
    w.line("const __key__ = this.#weakValueToInternalKey.get(value);");
    w.line(&format!("if (!__key__) {}", missing));
}

fn lookup_pair(w: &mut JsWriter, missing: &str) {
    lookup_identity(w, missing);
    w.line("const __pair__ = this.#baseMap.get(__key__);");
    w.line(&format!("if (!__pair__) {}", missing));
}

#[cfg(test)]
mod tests {
    use ir::KeyKind;

    use super::*;
    use crate::generators::doc_comment::{DocFlavor, DocGenerator};

    #[test]
    fn test_bind_template_suffixes_sources() {
        let sources = vec![Arc::new(
            KeyDescriptor::new("strongKey", KeyKind::StrongMapKey, "The strong key.")
                .with_jsdoc_type("string"),
        )];
        let mut docs = DocGenerator::new(DocFlavor::PairedDouble, "Pairs", false).expect("docs");
        docs.add_template("bindOneToOne", bind_template(&sources, false)).expect("bind");
        let block = docs.build_block("bindOneToOne", "").expect("block");
        assert_eq!(
            block,
            [
                "/**",
                " * Bind two sets of keys and values together.",
                " *",
                " * @param {string} strongKey_1 The strong key.",
                " * @param {object} value_1     The value.",
                " * @param {string} strongKey_2 The strong key.",
                " * @param {object} value_2     The value.",
                " */",
                "",
            ]
            .join("\n")
        );
    }

    #[test]
    fn test_values_are_checked_in_order() {
        let mut w = JsWriter::new();
        check_values(&mut w);
        let out = w.finish();
        let first = out.find("value_1 is not").expect("first");
        let second = out.find("value_2 is not").expect("second");
        assert!(first < second);
    }
}
