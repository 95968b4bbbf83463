//! Template functions and the registry that addresses them.
//!
//! Every template is a plain `fn(&mut TemplateContext) -> Result<String>`
//! returning the class body for one [`registry::TemplateVariant`].

/// Sub-crate generates: **`doc_comment`**
///
/// Renders JSDoc blocks from declarative method templates.
pub mod doc_comment;

/// Default method-template tables.
pub mod method_docs;

/// Template variants, variant selection and the registry.
pub mod registry;

/// `Strong/Map`, `Weak/Map` and the solo maps.
pub mod keyed_map;

/// `Strong/Set`, `Weak/Set` and the solo sets.
pub mod keyed_set;

/// Maps of strong sets and their specializations.
pub mod map_of_sets;

/// Paired one-to-one collections.
pub mod one_to_one;

use crate::generators::doc_comment::DocGenerator;
use crate::macros::MacroMap;
use crate::utils::{array_literal, js_string, name_list, JsWriter};

/// Runtime primitives a template body refers to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HelperUse {
    /// `KeyHasher` from `Hasher.mjs`.
    pub hasher: bool,
    /// `WeakKeyComposer` from `Composite.mjs`.
    pub composer: bool,
}

impl HelperUse {
    /// Union of two requirements.
    pub fn union(self, other: HelperUse) -> HelperUse {
        HelperUse { hasher: self.hasher || other.hasher, composer: self.composer || other.composer }
    }

    /// Whether any helper is required.
    pub fn any(&self) -> bool { self.hasher || self.composer }
}

/// Inputs a template reads and the helper requirements it records.
pub struct TemplateContext<'a> {
    /// Macro table of the collection.
    pub macros: &'a MacroMap,
    /// Doc blocks for the collection's flavor.
    pub docs: &'a mut DocGenerator,
    /// Helpers the emitted body refers to.
    pub helpers: HelperUse,
}

impl<'a> TemplateContext<'a> {
    /// Context with no helper requirements yet.
    pub fn new(macros: &'a MacroMap, docs: &'a mut DocGenerator) -> Self {
        Self { macros, docs, helpers: HelperUse::default() }
    }
}

/// How a collection turns its key arguments into one storage key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Keying {
    /// The single argument is the storage key.
    Direct,
    /// A `KeyHasher` string of every argument.
    Hashed,
    /// A frozen `WeakKeyComposer` key of the weak and strong arguments.
    Composite,
}

/// Key arguments of one collection and how they are combined.
#[derive(Debug, Clone, Copy)]
pub struct KeyPlan<'a> {
    /// Combination strategy.
    pub keying: Keying,
    /// Every argument in declared order.
    pub all: &'a [String],
    /// Weakly held arguments.
    pub weak: &'a [String],
    /// Strongly held arguments.
    pub strong: &'a [String],
}

impl<'a> KeyPlan<'a> {
    /// Name of the local holding the storage key.
    pub fn local(&self) -> String {
        match self.keying {
            Keying::Direct => self.all.first().cloned().unwrap_or_default(),
            Keying::Hashed => "__hash__".to_string(),
            Keying::Composite => "__key__".to_string(),
        }
    }

    /// Helpers the plan refers to.
    pub fn helpers(&self) -> HelperUse {
        match self.keying {
            Keying::Direct => HelperUse::default(),
            Keying::Hashed => HelperUse { hasher: true, composer: false },
            Keying::Composite => HelperUse { hasher: false, composer: true },
        }
    }

    /// Private field declarations the plan needs.
    pub fn fields(&self, w: &mut JsWriter, hasher_field: &str) {
        match self.keying {
            Keying::Direct => {}
            Keying::Hashed => {
                w.line(&format!("{} = new KeyHasher;", hasher_field));
            }
            Keying::Composite => {
                let quoted = |names: &[String]| {
                    array_literal(&names.iter().map(|n| js_string(n)).collect::<Vec<_>>())
                };
                w.line(&format!(
                    "#keyComposer = new WeakKeyComposer({}, {});",
                    quoted(self.weak),
                    quoted(self.strong)
                ));
            }
        }
    }

    /// Writes the lookup of an existing storage key, leaving through `missing`.
    pub fn lookup(&self, w: &mut JsWriter, hasher_field: &str, missing: &str) {
        match self.keying {
            Keying::Direct => {}
            Keying::Hashed => {
                w.line(&format!(
                    "const __hash__ = this.{}.getHashIfExists({});",
                    hasher_field,
                    name_list(self.all)
                ));
                w.line(&format!("if (!__hash__) {}", missing));
            }
            Keying::Composite => {
                w.line(&format!(
                    "const __key__ = this.#keyComposer.getKeyIfExists({});",
                    self.composer_args()
                ));
                w.line(&format!("if (!__key__) {}", missing));
            }
        }
    }

    /// Writes the get-or-create of the storage key.
    pub fn require(&self, w: &mut JsWriter, hasher_field: &str) {
        match self.keying {
            Keying::Direct => {}
            Keying::Hashed => {
                w.line(&format!(
                    "const __hash__ = this.{}.getHash({});",
                    hasher_field,
                    name_list(self.all)
                ));
            }
            Keying::Composite => {
                w.line(&format!(
                    "const __key__ = this.#keyComposer.getKey({});",
                    self.composer_args()
                ));
            }
        }
    }

    /// Writes the release of a composite key after its entry is deleted.
    pub fn forget(&self, w: &mut JsWriter) {
        if self.keying == Keying::Composite {
            w.line(&format!("this.#keyComposer.deleteKey({});", self.composer_args()));
        }
    }

    fn composer_args(&self) -> String {
        format!("{}, {}", array_literal(self.weak), array_literal(self.strong))
    }
}

/// `if (!this.<check>(args)) <missing>` when `validated`.
pub fn guard(w: &mut JsWriter, validated: bool, check: &str, args: &str, missing: &str) {
    if validated {
        w.line(&format!("if (!this.{}({})) {}", check, args, missing));
    }
}

/// `isValid*` body: validation lines, then `return true;`.
pub fn validator_body(w: &mut JsWriter, head: &str, lines: &str) {
    w.open(head);
    w.lines(lines);
    w.line("return true;");
    w.close();
}

/// Closing freeze statements shared by every class.
pub fn freeze_class(w: &mut JsWriter, class_name: &str) {
    w.blank();
    w.line(&format!("Object.freeze({});", class_name));
    w.line(&format!("Object.freeze({}.prototype);", class_name));
}

/// Message thrown when a mutation receives an invalid key.
pub const INVALID_KEY_ERROR: &str = "throw new Error(\"The ordered key set is not valid!\");";

/// Message thrown when a mutation receives an invalid value.
pub const INVALID_VALUE_ERROR: &str = "throw new Error(\"The value is not valid!\");";
