//! Assembly of one generated module.
//!
//! [`SourceGenerator`] picks the template variant, computes the macro table,
//! prepares the doc generator and stitches the file together:
//!
//! 1. `// @ts-check` for type-checked output
//! 2. license text and the `@file` header block, each only if supplied
//! 3. runtime-helper imports, then the configuration's own import lines
//! 4. the class body of a nested pairing base, if any
//! 5. the class body
//! 6. `export default <class>;`
//!
//! A nested generator (the inline base of a paired collection) emits only
//! its class body and reports its imports and helper use to the outer one.

use std::sync::Arc;

use config::CompileOptions;
use ir::CollectionConfiguration;

use crate::generators::doc_comment::{DocFlavor, DocGenerator};
use crate::generators::one_to_one::bind_template;
use crate::generators::registry::{select_variant, TemplateRegistry, TemplateVariant};
use crate::generators::{HelperUse, TemplateContext};
use crate::macros::{BaseSource, MacroMap};
use crate::utils::js_string;
use crate::{format_source, CodegenError, Result};

/// Directory, relative to the generated file, holding the runtime helpers.
pub const DEFAULT_HELPER_DIR: &str = "./keys";

/// Output of one generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSource {
    /// Name of the generated class.
    pub class_name: String,
    /// Template the class was rendered with.
    pub variant: TemplateVariant,
    /// Formatted module text.
    pub source: String,
    /// Runtime helpers the module imports.
    pub helpers: HelperUse,
    /// Import statements of the module, helpers excluded.
    pub imports: Vec<String>,
}

/// Generates the source of one collection module.
#[derive(Debug, Clone)]
pub struct SourceGenerator {
    config: CollectionConfiguration,
    options: CompileOptions,
    registry: Arc<TemplateRegistry>,
    helper_dir: String,
    nested: bool,
}

impl SourceGenerator {
    /// Generator with its own template registry.
    pub fn new(config: CollectionConfiguration, options: CompileOptions) -> Self {
        Self {
            config,
            options,
            registry: Arc::new(TemplateRegistry::new()),
            helper_dir: DEFAULT_HELPER_DIR.to_string(),
            nested: false,
        }
    }

    /// Shares an existing registry.
    pub fn with_registry(mut self, registry: Arc<TemplateRegistry>) -> Self {
        self.registry = registry;
        self
    }

    /// Import specifier prefix of the runtime helpers, e.g. `../keys`.
    pub fn with_helper_dir(mut self, helper_dir: impl Into<String>) -> Self {
        self.helper_dir = helper_dir.into();
        self
    }

    /// Configuration being generated.
    pub fn configuration(&self) -> &CollectionConfiguration { &self.config }

    /// Compile-time options in effect.
    pub fn options(&self) -> &CompileOptions { &self.options }

    /// Template variant the configuration renders with.
    pub fn select_variant(&self) -> TemplateVariant {
        select_variant(&self.config, self.options.disable_key_optimization())
    }

    /// Macro table of the configuration.
    pub fn macros(&self) -> Result<MacroMap> { MacroMap::from_configuration(&self.config) }

    /// Generates the module.
    pub fn generate(&self) -> Result<GeneratedSource> {
        let class_name = self.config.class_name().to_string();
        logging::debug("codegen", &format!("generating {}", class_name));

        if !self.nested {
            self.validate()?;
        }

        let variant = self.select_variant();
        let macros = self.macros()?;

        let mut helpers = HelperUse::default();
        let mut imports: Vec<String> = Vec::new();
        let mut base_body = String::new();

        if let Some(pairing) = &macros.pairing {
            match &pairing.base_source {
                BaseSource::Builtin => {}
                BaseSource::Imported(path) => {
                    imports.push(format!(
                        "import {} from {};",
                        pairing.base_class_name,
                        js_string(path)
                    ));
                }
                BaseSource::Nested => {
                    let base = self.nested_base()?.generate()?;
                    helpers = helpers.union(base.helpers);
                    imports.extend(base.imports);
                    base_body = base.source;
                }
            }
        }
        if let Some(lines) = &macros.import_lines {
            imports.extend(
                lines.lines().map(str::trim).filter(|l| !l.is_empty()).map(String::from),
            );
        }
        dedup(&mut imports);

        let mut docs = self.doc_generator(&macros)?;
        let mut context = TemplateContext::new(&macros, &mut docs);
        let body = self.registry.render(variant, &mut context)?;
        helpers = helpers.union(context.helpers);

        let source = if self.nested {
            format_source(&format!("{}\n{}", base_body, body))?
        } else {
            self.assemble(&class_name, helpers, &imports, &base_body, &body)?
        };

        logging::debug("codegen", &format!("generated {} with {}", class_name, variant));
        Ok(GeneratedSource { class_name, variant, source, helpers, imports })
    }

    fn validate(&self) -> Result<()> {
        let family = self.config.family();
        if family.is_one_to_one() {
            let pairing = self.config.pairing().ok_or_else(|| {
                CodegenError::Unreachable(format!(
                    "paired collection \"{}\" has no base",
                    self.config.class_name()
                ))
            })?;
            if pairing.base.class_name() == self.config.class_name() {
                return Err(CodegenError::Message(format!(
                    "The base class name \"{}\" must differ from the paired class name!",
                    pairing.base.class_name()
                )));
            }
        } else if self.config.dimensions().is_empty() {
            return Err(CodegenError::Unreachable(format!(
                "collection \"{}\" has no key dimensions",
                self.config.class_name()
            )));
        }
        Ok(())
    }

    fn nested_base(&self) -> Result<SourceGenerator> {
        let pairing = self.config.pairing().ok_or_else(|| {
            CodegenError::Unreachable(format!(
                "\"{}\" has no base to nest",
                self.config.class_name()
            ))
        })?;
        Ok(SourceGenerator {
            config: (*pairing.base).clone(),
            options: self.options.clone(),
            registry: Arc::clone(&self.registry),
            helper_dir: self.helper_dir.clone(),
            nested: true,
        })
    }

    fn doc_generator(&self, macros: &MacroMap) -> Result<DocGenerator> {
        let use_ts_types = self.options.generate_type_checked();
        let flavor = match &macros.pairing {
            Some(p) if p.is_single_argument() => DocFlavor::PairedSingle,
            Some(_) => DocFlavor::PairedDouble,
            None => DocFlavor::Collection,
        };
        let mut docs = DocGenerator::new(flavor, self.config.class_name(), use_ts_types)?;

        match (flavor, self.config.pairing()) {
            (DocFlavor::Collection, _) | (_, None) => {
                for dimension in self.config.dimensions() {
                    docs.add_parameter(Arc::clone(dimension));
                }
                if let Some(value) = self.config.value() {
                    docs.add_parameter(Arc::clone(value));
                }
            }
            (DocFlavor::PairedSingle, Some(_)) => {}
            (DocFlavor::PairedDouble, Some(record)) => {
                let sources = record.source_dimensions();
                docs.add_template("bindOneToOne", bind_template(&sources, use_ts_types))?;
                for source in sources {
                    docs.add_parameter(source);
                }
            }
        }
        Ok(docs)
    }

    fn assemble(
        &self,
        class_name: &str,
        helpers: HelperUse,
        imports: &[String],
        base_body: &str,
        body: &str,
    ) -> Result<String> {
        let mut out = String::new();
        if self.options.generate_type_checked() {
            out.push_str("// @ts-check\n\n");
        }
        if let Some(text) = non_empty(self.options.license_text()) {
            out.push_str(&format!("/*\n{}\n*/\n\n", text.trim_end()));
        }
        out.push_str(&self.file_header());

        if helpers.hasher {
            out.push_str(&format!("import KeyHasher from \"{}/Hasher.mjs\";\n", self.helper_dir));
        }
        if helpers.composer {
            out.push_str(&format!(
                "import WeakKeyComposer from \"{}/Composite.mjs\";\n",
                self.helper_dir
            ));
        }
        for line in imports {
            out.push_str(line);
            out.push('\n');
        }
        out.push('\n');

        if !base_body.is_empty() {
            out.push_str(base_body);
            out.push('\n');
        }
        out.push_str(body);
        out.push_str(&format!("\nexport default {};\n", class_name));
        format_source(&out)
    }

    fn file_header(&self) -> String {
        let mut lines = Vec::new();
        if let Some(overview) = self.config.overview() {
            lines.push("@file".to_string());
            lines.extend(overview.lines().map(String::from));
        }
        if let Some(license) = non_empty(self.options.license()) {
            lines.push(format!("@license {}", license));
        }
        if let Some(author) = non_empty(self.options.author()) {
            lines.push(format!("@author {}", author));
        }
        if let Some(copyright) = non_empty(self.options.copyright()) {
            lines.push(format!("@copyright {}", copyright));
        }
        if lines.is_empty() {
            return String::new();
        }
        let mut header = String::from("/**\n");
        for line in lines {
            header.push_str(&format!(" * {}\n", line));
        }
        header.push_str(" */\n\n");
        header
    }
}

fn non_empty(text: &str) -> Option<&str> { Some(text).filter(|t| !t.trim().is_empty()) }

fn dedup(lines: &mut Vec<String>) {
    let mut seen = std::collections::HashSet::new();
    lines.retain(|l| seen.insert(l.clone()));
}
