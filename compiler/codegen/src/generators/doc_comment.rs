//! Doc-comment template engine.
//!
//! A [`DocGenerator`] holds one table of [`MethodTemplate`]s and the key and
//! value descriptors of the collection being generated. Templates request one
//! rendered JSDoc block per method name.
//!
//! Four placeholders are replaced in every template, once, the first time a
//! block is requested after the table changed:
//!
//! | placeholder      | replaced with                          |
//! |------------------|----------------------------------------|
//! | `__className__`  | generated class name                   |
//! | `__valueType__`  | display type of the value dimension    |
//! | `__valueDesc__`  | description of the value dimension     |
//! | `__argList__`    | comma-joined key argument names        |
//!
//! Parameter rows are column aligned. The braced type column is as wide as the
//! widest type plus its two braces, and the name column as wide as the widest
//! name. Continuation lines of a multi-line description start under the first
//! character of the description. Generated output is compared byte for byte,
//! so this layout must not drift.

use std::collections::BTreeMap;
use std::sync::Arc;

use ir::{KeyDescriptor, KeyKind};

use crate::{CodegenError, Result};

/// Which declared dimensions a method documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgumentPolicy {
    /// No declared dimensions.
    None,
    /// Only the value dimension.
    Value,
    /// Every key dimension, then the value.
    All,
    /// Only mapping keys.
    MapOnly,
    /// Only set elements.
    SetOnly,
    /// Every key dimension.
    ExcludeValue,
}

/// Fixed parameter row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRow {
    /// Display type, without braces.
    pub type_name: String,
    /// Parameter name.
    pub name: String,
    /// Description; may span several lines.
    pub description: String,
}

impl ParamRow {
    /// Row for a fixed parameter.
    pub fn new(type_name: &str, name: &str, description: &str) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
            description: description.to_string(),
        }
    }
}

/// Declarative description of one method's doc block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodTemplate {
    /// Leading description.
    pub description: String,
    /// Declared dimensions to document.
    pub include_args: ArgumentPolicy,
    /// Lines after the description.
    pub headers: Vec<String>,
    /// Lines after the return line.
    pub footers: Vec<String>,
    /// Fixed rows before the declared dimensions.
    pub params_before: Vec<ParamRow>,
    /// Fixed rows after the declared dimensions.
    pub params_after: Vec<ParamRow>,
    /// Return or yield type.
    pub return_type: Option<String>,
    /// Return or yield description.
    pub return_description: Option<String>,
    /// Render `@yields` instead of `@returns`.
    pub is_generator: bool,
    /// A `@typedef` block.
    pub is_type_def: bool,
    /// A property accessor.
    pub is_property: bool,
    /// Returns nothing.
    pub returns_void: bool,
}

impl MethodTemplate {
    /// Template with only a description and an argument policy.
    pub fn new(description: &str, include_args: ArgumentPolicy) -> Self {
        Self {
            description: description.to_string(),
            include_args,
            headers: Vec::new(),
            footers: Vec::new(),
            params_before: Vec::new(),
            params_after: Vec::new(),
            return_type: None,
            return_description: None,
            is_generator: false,
            is_type_def: false,
            is_property: false,
            returns_void: false,
        }
    }

    /// Sets the return type and description.
    pub fn returns(mut self, type_name: &str, description: &str) -> Self {
        self.return_type = Some(type_name.to_string());
        self.return_description = Some(description.to_string());
        self
    }

    /// Sets the yield type and description.
    pub fn yields(mut self, type_name: &str, description: &str) -> Self {
        self.is_generator = true;
        self.returns(type_name, description)
    }

    /// Marks the method as returning nothing.
    pub fn void(mut self) -> Self {
        self.returns_void = true;
        self
    }

    /// Marks the block as a property accessor.
    pub fn property(mut self, type_name: &str, description: &str) -> Self {
        self.is_property = true;
        self.returns(type_name, description)
    }

    /// Marks the block as a type definition with the given header lines.
    pub fn type_def(mut self, headers: &[&str]) -> Self {
        self.is_type_def = true;
        self.headers = headers.iter().map(|h| h.to_string()).collect();
        self
    }

    /// Prepends a fixed row.
    pub fn param_before(mut self, type_name: &str, name: &str, description: &str) -> Self {
        self.params_before.push(ParamRow::new(type_name, name, description));
        self
    }

    /// Appends a fixed row.
    pub fn param_after(mut self, type_name: &str, name: &str, description: &str) -> Self {
        self.params_after.push(ParamRow::new(type_name, name, description));
        self
    }

    /// Adds a footer line.
    pub fn footer(mut self, line: &str) -> Self {
        self.footers.push(line.to_string());
        self
    }

    /// Rejects malformed templates.
    pub fn validate(&self, name: &str) -> Result<()> {
        let invalid = |reason: &str| CodegenError::InvalidDocTemplate {
            name: name.to_string(),
            reason: reason.to_string(),
        };
        if self.is_type_def {
            if self.include_args != ArgumentPolicy::None {
                return Err(invalid("a type definition must not include arguments"));
            }
            if self.headers.is_empty() {
                return Err(invalid("a type definition needs header lines"));
            }
            return Ok(());
        }
        if !self.returns_void
            && !self.is_property
            && (self.return_type.is_none() || self.return_description.is_none())
        {
            return Err(invalid("a non-void method needs a return type and description"));
        }
        Ok(())
    }

    fn substitute(&mut self, values: &[(&str, &str)]) {
        let apply = |text: &mut String| {
            for (placeholder, value) in values {
                if text.contains(placeholder) {
                    *text = text.replace(placeholder, value);
                }
            }
        };
        apply(&mut self.description);
        self.headers.iter_mut().for_each(apply);
        self.footers.iter_mut().for_each(apply);
        for row in self.params_before.iter_mut().chain(self.params_after.iter_mut()) {
            apply(&mut row.type_name);
            apply(&mut row.description);
        }
        if let Some(t) = self.return_type.as_mut() {
            apply(t);
        }
        if let Some(d) = self.return_description.as_mut() {
            apply(d);
        }
    }
}

/// Named sets of default templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocFlavor {
    /// Maps, sets and maps of sets.
    Collection,
    /// Paired collection over a base keyed only by the reserved key.
    PairedSingle,
    /// Paired collection over a base with further key dimensions.
    PairedDouble,
}

struct Entry {
    template: MethodTemplate,
    substituted: bool,
}

/// Renders doc blocks for one generated class.
pub struct DocGenerator {
    flavor: DocFlavor,
    class_name: String,
    use_ts_types: bool,
    templates: BTreeMap<String, Entry>,
    arguments: Vec<Arc<KeyDescriptor>>,
    value: Option<Arc<KeyDescriptor>>,
    dirty: bool,
}

impl DocGenerator {
    /// Generator preloaded with the default table of `flavor`.
    pub fn new(flavor: DocFlavor, class_name: &str, use_ts_types: bool) -> Result<Self> {
        let mut generator = Self {
            flavor,
            class_name: class_name.to_string(),
            use_ts_types,
            templates: BTreeMap::new(),
            arguments: Vec::new(),
            value: None,
            dirty: false,
        };
        for (name, template) in super::method_docs::defaults(flavor) {
            generator.add_template(name, template)?;
        }
        Ok(generator)
    }

    /// Flavor this generator was built for.
    pub fn flavor(&self) -> DocFlavor { self.flavor }

    /// Adds or replaces the template for `name`.
    pub fn add_template(&mut self, name: &str, template: MethodTemplate) -> Result<()> {
        template.validate(name)?;
        self.templates.insert(name.to_string(), Entry { template, substituted: false });
        self.dirty = true;
        Ok(())
    }

    /// Whether a template exists for `name`.
    pub fn has_template(&self, name: &str) -> bool { self.templates.contains_key(name) }

    /// Registers a declared dimension.
    pub fn add_parameter(&mut self, descriptor: Arc<KeyDescriptor>) {
        if descriptor.kind() == KeyKind::Value {
            self.value = Some(descriptor);
        } else {
            self.arguments.push(descriptor);
        }
        self.dirty = true;
    }

    /// Template for `name` as it will be rendered.
    pub fn template(&mut self, name: &str) -> Result<&MethodTemplate> {
        self.substitute_placeholders();
        self.templates
            .get(name)
            .map(|e| &e.template)
            .ok_or_else(|| CodegenError::MissingDocTemplate(name.to_string()))
    }

    /// Renders the block for `name`, each line prefixed by `indent`.
    pub fn build_block(&mut self, name: &str, indent: &str) -> Result<String> {
        self.substitute_placeholders();
        let template = self
            .templates
            .get(name)
            .map(|e| &e.template)
            .ok_or_else(|| CodegenError::MissingDocTemplate(name.to_string()))?;

        let mut lines: Vec<String> = vec!["/**".to_string()];
        for line in template.description.lines() {
            lines.push(format!(" * {}", line));
        }
        if !template.headers.is_empty() {
            lines.push(" *".to_string());
            lines.extend(template.headers.iter().map(|h| format!(" * {}", h)));
        }

        let rows = self.rows(template);
        if !rows.is_empty() {
            lines.push(" *".to_string());
            lines.extend(param_table(&rows));
        }

        if let (Some(type_name), Some(description)) =
            (&template.return_type, &template.return_description)
        {
            let tag = if template.is_generator { "@yields" } else { "@returns" };
            lines.push(" *".to_string());
            lines.push(format!(" * {} {{{}}} {}", tag, type_name, description));
        }
        if !template.footers.is_empty() {
            lines.push(" *".to_string());
            lines.extend(template.footers.iter().map(|f| format!(" * {}", f)));
        }

        while lines.last().map(|l| l.trim_end() == "*").unwrap_or(false) {
            lines.pop();
        }
        lines.push(" */".to_string());

        let mut block = String::new();
        for line in lines {
            block.push_str(indent);
            block.push_str(line.trim_end());
            block.push('\n');
        }
        Ok(block)
    }

    fn substitute_placeholders(&mut self) {
        if !self.dirty {
            return;
        }
        let value_type = self
            .value
            .as_ref()
            .map(|v| self.display_type(v).to_string())
            .unwrap_or_else(|| "*".to_string());
        let value_desc = self
            .value
            .as_ref()
            .map(|v| v.description().to_string())
            .unwrap_or_else(|| "The value.".to_string());
        let arg_list =
            self.arguments.iter().map(|a| a.name().to_string()).collect::<Vec<_>>().join(", ");
        let values = [
            ("__className__", self.class_name.as_str()),
            ("__valueType__", value_type.as_str()),
            ("__valueDesc__", value_desc.as_str()),
            ("__argList__", arg_list.as_str()),
        ];
        for entry in self.templates.values_mut().filter(|e| !e.substituted) {
            entry.template.substitute(&values);
            entry.substituted = true;
        }
        self.dirty = false;
    }

    fn display_type<'a>(&self, descriptor: &'a KeyDescriptor) -> &'a str {
        if self.use_ts_types {
            descriptor.ts_type()
        } else {
            descriptor.jsdoc_type()
        }
    }

    fn rows(&self, template: &MethodTemplate) -> Vec<ParamRow> {
        let declared = |d: &Arc<KeyDescriptor>| {
            ParamRow::new(self.display_type(d), d.name(), d.description())
        };
        let keys = |filter: &dyn Fn(KeyKind) -> bool| {
            self.arguments.iter().filter(|d| filter(d.kind())).map(declared).collect::<Vec<_>>()
        };
        let value = || self.value.iter().map(declared).collect::<Vec<_>>();

        let middle = match template.include_args {
            ArgumentPolicy::None => Vec::new(),
            ArgumentPolicy::Value => value(),
            ArgumentPolicy::All => {
                let mut rows = keys(&|_| true);
                rows.extend(value());
                rows
            }
            ArgumentPolicy::MapOnly => keys(&|k| k.is_map_key()),
            ArgumentPolicy::SetOnly => keys(&|k| k.is_set_element()),
            ArgumentPolicy::ExcludeValue => keys(&|_| true),
        };

        template
            .params_before
            .iter()
            .cloned()
            .chain(middle)
            .chain(template.params_after.iter().cloned())
            .collect()
    }
}

/// Column-aligned `@param` lines.
fn param_table(rows: &[ParamRow]) -> Vec<String> {
    // Widths count chars, matching how `{:<w$}` pads.
    let type_width = rows.iter().map(|r| r.type_name.chars().count()).max().unwrap_or(0) + 2;
    let name_width = rows.iter().map(|r| r.name.chars().count()).max().unwrap_or(0);
    let continuation = " ".repeat("@param ".len() + type_width + 1 + name_width + 1);

    let mut lines = Vec::new();
    for row in rows {
        let braced = format!("{{{}}}", row.type_name);
        let mut description = row.description.lines();
        let first = description.next().unwrap_or("");
        lines.push(format!(
            " * @param {:<tw$} {:<nw$} {}",
            braced,
            row.name,
            first,
            tw = type_width,
            nw = name_width
        ));
        for rest in description {
            lines.push(format!(" * {}{}", continuation, rest));
        }
    }
    lines
}
