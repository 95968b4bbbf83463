//! Map templates.
//!
//! Strong multi-key maps hash their arguments with `KeyHasher` and keep the
//! frozen key array beside each value so they can iterate. Weak multi-key maps
//! compose one frozen key per argument tuple with `WeakKeyComposer`. Solo maps
//! wrap a native `Map` or `WeakMap` directly.

use super::{
    freeze_class, guard, validator_body, KeyPlan, Keying, TemplateContext, INVALID_KEY_ERROR,
    INVALID_VALUE_ERROR,
};
use crate::utils::JsWriter;
use crate::Result;

const HASHER: &str = "#hasher";

/// `Strong/Map`
pub fn strong_map(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Hashed, false)
}

/// `Weak/Map`
pub fn weak_map(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Composite, true)
}

/// `Solo/StrongMap`
pub fn solo_strong_map(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Direct, false)
}

/// `Solo/WeakMap`
pub fn solo_weak_map(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Direct, true)
}

fn render(ctx: &mut TemplateContext<'_>, keying: Keying, weak: bool) -> Result<String> {
    let m = ctx.macros;
    let plan = KeyPlan {
        keying,
        all: &m.arg_names,
        weak: &m.weak_map_keys,
        strong: &m.strong_map_keys,
    };
    ctx.helpers = ctx.helpers.union(plan.helpers());

    let args = m.arg_list();
    let validated = m.has_validation();
    let local = plan.local();
    let hashed = keying == Keying::Hashed;

    let mut w = JsWriter::new();
    w.open(&format!("class {}", m.class_name));
    w.line(&format!("#root = new {};", if weak { "WeakMap" } else { "Map" }));
    plan.fields(&mut w, HASHER);
    w.blank();

    w.doc(ctx.docs, "constructor")?;
    w.open("constructor(iterable)");
    w.open("if (iterable)");
    w.open(&format!("for (const [{}, value] of iterable)", args));
    w.line(&format!("this.set({}, value);", args));
    w.close().close().close();

    if !weak {
        w.blank();
        w.doc(ctx.docs, "size")?;
        w.open("get size()").line("return this.#root.size;").close();

        w.blank();
        w.doc(ctx.docs, "clear")?;
        w.open("clear()").line("this.#root.clear();").close();
    }

    w.blank();
    w.doc(ctx.docs, "delete")?;
    w.open(&format!("delete({})", args));
    guard(&mut w, validated, "isValidKey", &args, "return false;");
    plan.lookup(&mut w, HASHER, "return false;");
    if keying == Keying::Composite {
        w.line(&format!("const __deleted__ = this.#root.delete({});", local));
        plan.forget(&mut w);
        w.line("return __deleted__;");
    } else {
        w.line(&format!("return this.#root.delete({});", local));
    }
    w.close();

    if !weak {
        w.blank();
        w.doc(ctx.docs, "entries")?;
        w.open("* entries()");
        if hashed {
            w.line("for (const __entry__ of this.#root.values())");
            w.line("  yield [...__entry__.keys, __entry__.value];");
        } else {
            w.line("for (const [__key__, __value__] of this.#root)");
            w.line("  yield [__key__, __value__];");
        }
        w.close();

        w.blank();
        w.doc(ctx.docs, "forEach")?;
        w.open("forEach(__callback__, __thisArg__)");
        w.line("for (const __entry__ of this.entries())");
        w.line("  __callback__.apply(__thisArg__, [...__entry__, this]);");
        w.close();
    }

    w.blank();
    w.doc(ctx.docs, "get")?;
    w.open(&format!("get({})", args));
    guard(&mut w, validated, "isValidKey", &args, "return undefined;");
    plan.lookup(&mut w, HASHER, "return undefined;");
    if hashed {
        w.line("const __entry__ = this.#root.get(__hash__);");
        w.line("return __entry__ ? __entry__.value : undefined;");
    } else {
        w.line(&format!("return this.#root.get({});", local));
    }
    w.close();

    w.blank();
    w.doc(ctx.docs, "getDefault")?;
    w.open(&format!("getDefault({}, __defaultGetter__)", args));
    w.line(&format!("if (this.has({})) return this.get({});", args, args));
    w.line("const __value__ = __defaultGetter__();");
    w.line(&format!("this.set({}, __value__);", args));
    w.line("return __value__;");
    w.close();

    w.blank();
    w.doc(ctx.docs, "has")?;
    w.open(&format!("has({})", args));
    guard(&mut w, validated, "isValidKey", &args, "return false;");
    plan.lookup(&mut w, HASHER, "return false;");
    w.line(&format!("return this.#root.has({});", local));
    w.close();

    w.blank();
    w.doc(ctx.docs, "isValidKey")?;
    validator_body(&mut w, &format!("isValidKey({})", args), &m.validate_arguments);

    w.blank();
    w.doc(ctx.docs, "isValidValue")?;
    validator_body(&mut w, "isValidValue(value)", m.validate_value());

    if !weak {
        w.blank();
        w.doc(ctx.docs, "keys")?;
        w.open("* keys()");
        if hashed {
            w.line("for (const __entry__ of this.#root.values())");
            w.line("  yield [...__entry__.keys];");
        } else {
            w.line("for (const __key__ of this.#root.keys())");
            w.line("  yield [__key__];");
        }
        w.close();
    }

    w.blank();
    w.doc(ctx.docs, "set")?;
    w.open(&format!("set({}, value)", args));
    if validated {
        w.line(&format!("if (!this.isValidKey({}))", args));
        w.line(&format!("  {}", INVALID_KEY_ERROR));
    }
    if !m.validate_value().is_empty() {
        w.line("if (!this.isValidValue(value))");
        w.line(&format!("  {}", INVALID_VALUE_ERROR));
    }
    plan.require(&mut w, HASHER);
    if hashed {
        w.line(&format!("this.#root.set(__hash__, {{ keys: Object.freeze([{}]), value }});", args));
    } else {
        w.line(&format!("this.#root.set({}, value);", local));
    }
    w.line("return this;");
    w.close();

    if !weak {
        w.blank();
        w.doc(ctx.docs, "values")?;
        w.open("* values()");
        if hashed {
            w.line("for (const __entry__ of this.#root.values())");
            w.line("  yield __entry__.value;");
        } else {
            w.line("yield* this.#root.values();");
        }
        w.close();

        w.blank();
        w.doc(ctx.docs, "iterator")?;
        w.open("[Symbol.iterator]()").line("return this.entries();").close();
    }

    w.blank();
    w.doc(ctx.docs, "toStringTag")?;
    w.open("get [Symbol.toStringTag]()").line(&format!("return \"{}\";", m.class_name)).close();
    w.close();

    freeze_class(&mut w, &m.class_name);
    Ok(w.finish())
}
