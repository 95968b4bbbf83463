//! Set templates.

use super::doc_comment::{ArgumentPolicy, MethodTemplate};
use super::{
    freeze_class, guard, validator_body, KeyPlan, Keying, TemplateContext, INVALID_KEY_ERROR,
};
use crate::utils::JsWriter;
use crate::Result;

const HASHER: &str = "#hasher";

/// `Strong/Set`
pub fn strong_set(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Hashed, false)
}

/// `Weak/Set`
pub fn weak_set(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Composite, true)
}

/// `Solo/StrongSet`
pub fn solo_strong_set(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Direct, false)
}

/// `Solo/WeakSet`
pub fn solo_weak_set(ctx: &mut TemplateContext<'_>) -> Result<String> {
    render(ctx, Keying::Direct, true)
}

/// Doc template for `values()` of anything yielding key sets.
pub(crate) fn set_values_doc() -> MethodTemplate {
    MethodTemplate::new("Yield the key sets of the collection.", ArgumentPolicy::None)
        .yields("*[]", "The key set.")
}

fn render(ctx: &mut TemplateContext<'_>, keying: Keying, weak: bool) -> Result<String> {
    let m = ctx.macros;
    let plan = KeyPlan {
        keying,
        all: &m.arg_names,
        weak: &m.weak_set_elements,
        strong: &m.strong_set_elements,
    };
    ctx.helpers = ctx.helpers.union(plan.helpers());
    ctx.docs.add_template("values", set_values_doc())?;

    let args = m.arg_list();
    let validated = m.has_validation();
    let local = plan.local();
    let hashed = keying == Keying::Hashed;
    // Hashed sets keep hash -> frozen argument array so they can iterate.
    let storage = match (hashed, weak) {
        (true, _) => "Map",
        (false, true) => "WeakSet",
        (false, false) => "Set",
    };

    let mut w = JsWriter::new();
    w.open(&format!("class {}", m.class_name));
    w.line(&format!("#root = new {};", storage));
    plan.fields(&mut w, HASHER);
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
        w.open("get size()").line("return this.#root.size;").close();
    }

    w.blank();
    w.doc(ctx.docs, "add")?;
    w.open(&format!("add({})", args));
    if validated {
        w.line(&format!("if (!this.isValidKey({}))", args));
        w.line(&format!("  {}", INVALID_KEY_ERROR));
    }
    plan.require(&mut w, HASHER);
    if hashed {
        w.line("if (!this.#root.has(__hash__))");
        w.line(&format!("  this.#root.set(__hash__, Object.freeze([{}]));", args));
    } else {
        w.line(&format!("this.#root.add({});", local));
    }
    w.line("return this;");
    w.close();

    if !weak {
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
        w.doc(ctx.docs, "forEach")?;
        w.open("forEach(__callback__, __thisArg__)");
        w.line("for (const __set__ of this.values())");
        w.line("  __callback__.apply(__thisArg__, [...__set__, this]);");
        w.close();
    }

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

    if !weak {
        w.blank();
        w.doc(ctx.docs, "values")?;
        w.open("* values()");
        if hashed {
            w.line("for (const __set__ of this.#root.values())");
            w.line("  yield [...__set__];");
        } else {
            w.line("for (const __key__ of this.#root)");
            w.line("  yield [__key__];");
        }
        w.close();

        w.blank();
        w.doc(ctx.docs, "iterator")?;
        w.open("[Symbol.iterator]()").line("return this.values();").close();
    }

    w.blank();
    w.doc(ctx.docs, "toStringTag")?;
    w.open("get [Symbol.toStringTag]()").line(&format!("return \"{}\";", m.class_name)).close();
    w.close();

    freeze_class(&mut w, &m.class_name);
    Ok(w.finish())
}
