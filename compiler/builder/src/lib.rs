#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::unwrap_used)]

//! keymesh collection builder
//!
//! [`CollectionBuilder`] is the only way to produce a [`CollectionConfiguration`].
//! Each builder owns one configuration snapshot and one
//! [`ConfigurationStateMachine`]; every mutating call is checked against the
//! machine's graph for the collection shape, and any failure leaves the builder
//! permanently dead.
//!
//! ```text
//! let mut cars = CollectionBuilder::new("CarDrivers", OuterShape::WeakMap, None)?;
//! cars.add_map_key("car", "The car.", true, KeyOptions::default())?;
//! cars.set_value_type("The driver.", KeyOptions::default())?;
//! cars.lock()?;
//! ```

pub mod identifiers;
pub mod state_machine;
pub mod validator_expr;
pub mod well_known;

use ir::{
    CollectionConfiguration, ConfigurationError, InnerShape, KeyDescriptor, KeyKind, OuterShape,
    PairingBaseKind, PairingOptions, PairingRecord, TemplateFamily,
};
pub use state_machine::{ConfigurationStateMachine, GraphKind, State};
use thiserror::Error;

/// Errors raised by the builder. Messages quote the offending value.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BuilderError {
    /// Not a legal identifier.
    #[error("\"{0}\" is not a valid identifier!")]
    Identifier(String),
    /// Leading or trailing whitespace.
    #[error("\"{0}\" must not have leading or trailing whitespace!")]
    Whitespace(String),
    /// A reserved name.
    #[error("\"{0}\" is a reserved name!")]
    Reserved(String),
    /// An empty documentation string.
    #[error("The {0} must be a non-empty string!")]
    EmptyText(&'static str),
    /// A documentation string containing a `__name__` token.
    #[error("The {field} \"{text}\" must not contain a reserved __name__ token!")]
    ReservedText {
        /// Field that was checked.
        field: &'static str,
        /// Rejected text.
        text: String,
    },
    /// A call made out of order.
    #[error("You may not call .{operation}() from the \"{state}\" state!")]
    WrongPhase {
        /// Builder method.
        operation: &'static str,
        /// Machine state at the time of the call.
        state: State,
    },
    /// A mutation after lock.
    #[error("You have already locked this configuration!")]
    Locked,
    /// Any call after a failure.
    #[error("This configuration is dead due to a previous error!")]
    Dead,
    /// A malformed validator expression.
    #[error("Validator for \"{name}\" is invalid: {reason}")]
    Validator {
        /// Dimension the validator guards.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
    /// Weak retention requested on a strong family.
    #[error("\"{name}\" cannot be held weakly in a {family} collection!")]
    WeakNotAllowed {
        /// Dimension name.
        name: String,
        /// Family of the builder.
        family: TemplateFamily,
    },
    /// A weak family without weak dimensions.
    #[error("A {0} collection must have at least one weak key!")]
    MissingWeakKey(TemplateFamily),
    /// An outer/inner shape combination with no template family.
    #[error("Unsupported shape: \"{outer}\" of \"{inner}\"")]
    UnsupportedShape {
        /// Outer shape.
        outer: OuterShape,
        /// Inner shape.
        inner: InnerShape,
    },
    /// Inner sets of weakly held elements.
    #[error("Sets of weakly held elements are not supported as an inner shape!")]
    WeakInnerSet,
    /// A well-known base name that does not exist.
    #[error("Unknown one-to-one base \"{0}\"")]
    UnknownBase(String),
    /// A pairing base that was not locked.
    #[error("The one-to-one base \"{0}\" must be locked first!")]
    BaseNotLocked(String),
    /// A pairing base that is not a weak mapping.
    #[error("The one-to-one base \"{0}\" must be a weak map!")]
    BaseNotWeakMap(String),
    /// A reserved key that is not a weak key of the base.
    #[error("\"{key}\" is not a weak key of the one-to-one base \"{base}\"!")]
    ReservedKeyNotWeak {
        /// Reserved key name.
        key: String,
        /// Base class name.
        base: String,
    },
    /// Structural violation in the configuration data.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
    /// Regex compilation error used by identifier checks.
    #[error("Regex error: {0}")]
    Pattern(#[from] regex::Error),
}

/// Convenient result type for builder operations.
pub type Result<T> = std::result::Result<T, BuilderError>;

/// Optional settings for a key, set element or value dimension.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyOptions {
    /// Display type for documentation.
    pub jsdoc_type: Option<String>,
    /// Type annotation for type-checked output.
    pub ts_type: Option<String>,
    /// Validator arrow function source.
    pub validator: Option<String>,
}

/// Base of a paired collection.
#[derive(Debug, Clone, Copy)]
pub enum PairingBase<'a> {
    /// A locked builder describing a weak mapping.
    Builder(&'a CollectionBuilder),
    /// A name listed in [`well_known::WELL_KNOWN_BASES`].
    WellKnown(&'a str),
}

/// Builder of one collection configuration.
#[derive(Debug, Clone)]
pub struct CollectionBuilder {
    machine: ConfigurationStateMachine,
    config: CollectionConfiguration,
}

impl CollectionBuilder {
    /// Starts a builder for `class_name` with the given shapes.
    pub fn new(class_name: &str, outer: OuterShape, inner: Option<InnerShape>) -> Result<Self> {
        identifiers::check_class_name(class_name)?;

        let family = match (outer, inner) {
            (_, Some(InnerShape::WeakSet)) => return Err(BuilderError::WeakInnerSet),
            (OuterShape::Map, None) => TemplateFamily::StrongMap,
            (OuterShape::WeakMap, None) => TemplateFamily::WeakMap,
            (OuterShape::Set, None) => TemplateFamily::StrongSet,
            (OuterShape::WeakSet, None) => TemplateFamily::WeakSet,
            (OuterShape::OneToOne, None) => TemplateFamily::OneToOneMap,
            (OuterShape::Map, Some(InnerShape::Set)) => TemplateFamily::StrongMapOfStrongSets,
            (OuterShape::WeakMap, Some(InnerShape::Set)) => TemplateFamily::WeakMapOfStrongSets,
            (outer, Some(inner)) => return Err(BuilderError::UnsupportedShape { outer, inner }),
        };
        let graph = if family.is_map_of_sets() {
            GraphKind::MapOfSets
        } else if family.is_map() {
            GraphKind::Map
        } else if family.is_set() {
            GraphKind::Set
        } else {
            GraphKind::OneToOne
        };

        logging::trace("builder", &format!("new builder \"{}\" ({})", class_name, family));
        Ok(Self {
            machine: ConfigurationStateMachine::new(graph),
            config: CollectionConfiguration::new(class_name, family),
        })
    }

    /// Name of the generated class.
    pub fn class_name(&self) -> &str { self.config.class_name() }

    /// Current template family. Rewritten to a solo family by [`Self::lock`].
    pub fn family(&self) -> TemplateFamily { self.config.family() }

    /// Current builder phase.
    pub fn state(&self) -> State { self.machine.current_state() }

    /// Whether [`Self::lock`] has succeeded.
    pub fn is_locked(&self) -> bool { self.state() == State::Locked }

    /// Whether a previous call failed.
    pub fn is_dead(&self) -> bool { self.machine.is_errored() }

    /// Independent snapshot of the configuration.
    pub fn configuration(&self) -> CollectionConfiguration { self.config.clone() }

    /// Sets the file overview. Only before any key is declared.
    pub fn set_overview(&mut self, overview: &str) -> Result<()> {
        let config = &mut self.config;
        self.machine.catch_error_state(|machine| {
            advance(machine, State::Overview, "setFileOverview")?;
            identifiers::check_text("file overview", overview)?;
            config.set_overview(overview)?;
            Ok(())
        })
    }

    /// Sets extra import lines. Only before any key is declared.
    pub fn set_import_lines(&mut self, lines: &str) -> Result<()> {
        let config = &mut self.config;
        self.machine.catch_error_state(|machine| {
            advance(machine, State::ImportText, "importLines")?;
            if lines.trim().is_empty() {
                return Err(BuilderError::EmptyText("import text"));
            }
            config.set_import_lines(lines)?;
            Ok(())
        })
    }

    /// Declares a mapping key.
    pub fn add_map_key(
        &mut self,
        name: &str,
        description: &str,
        hold_weak: bool,
        options: KeyOptions,
    ) -> Result<()> {
        let config = &mut self.config;
        self.machine.catch_error_state(|machine| {
            advance(machine, State::MapKeys, "addMapKey")?;
            let family = config.family();
            identifiers::check_dimension_name(name, !family.is_set())?;
            if hold_weak && !family.allows_weak_map_keys() {
                return Err(BuilderError::WeakNotAllowed { name: name.to_string(), family });
            }
            let kind = KeyKind::for_key(true, hold_weak);
            config.add_dimension(describe(name, kind, description, &options)?)?;
            Ok(())
        })
    }

    /// Declares a set element.
    pub fn add_set_element(
        &mut self,
        name: &str,
        description: &str,
        hold_weak: bool,
        options: KeyOptions,
    ) -> Result<()> {
        let config = &mut self.config;
        self.machine.catch_error_state(|machine| {
            advance(machine, State::SetElements, "addSetElement")?;
            let family = config.family();
            identifiers::check_dimension_name(name, !family.is_set())?;
            if hold_weak && !family.allows_weak_set_elements() {
                return Err(BuilderError::WeakNotAllowed { name: name.to_string(), family });
            }
            let kind = KeyKind::for_key(false, hold_weak);
            config.add_dimension(describe(name, kind, description, &options)?)?;
            Ok(())
        })
    }

    /// Sets the value type of a mapping, right after the last key.
    pub fn set_value_type(&mut self, description: &str, options: KeyOptions) -> Result<()> {
        let config = &mut self.config;
        self.machine.catch_error_state(|machine| {
            advance(machine, State::ValueType, "setValueType")?;
            config.set_value(describe(
                identifiers::VALUE_NAME,
                KeyKind::Value,
                description,
                &options,
            )?)?;
            Ok(())
        })
    }

    /// Configures the base of a paired collection.
    pub fn configure_pairing(
        &mut self,
        base: PairingBase<'_>,
        reserved_key: &str,
        options: &PairingOptions,
    ) -> Result<()> {
        let config = &mut self.config;
        self.machine.catch_error_state(|machine| {
            advance(machine, State::Pairing, "configureOneToOne")?;

            let (base_config, base_kind) = match base {
                PairingBase::Builder(builder) => {
                    if !builder.is_locked() {
                        return Err(BuilderError::BaseNotLocked(builder.class_name().to_string()));
                    }
                    let base_config = builder.configuration();
                    if !matches!(
                        base_config.family(),
                        TemplateFamily::WeakMap | TemplateFamily::SoloWeakMap
                    ) {
                        return Err(BuilderError::BaseNotWeakMap(
                            base_config.class_name().to_string(),
                        ));
                    }
                    (base_config, PairingBaseKind::Declared)
                }
                PairingBase::WellKnown(name) => well_known::resolve(name)?,
            };

            let weak = base_config
                .dimension(reserved_key)
                .map(|d| d.kind() == KeyKind::WeakMapKey)
                .unwrap_or(false);
            if !weak {
                return Err(BuilderError::ReservedKeyNotWeak {
                    key: reserved_key.to_string(),
                    base: base_config.class_name().to_string(),
                });
            }

            config.set_pairing(PairingRecord {
                reserved_key: reserved_key.to_string(),
                base: Box::new(base_config),
                base_kind,
                options: options.clone(),
            })?;
            Ok(())
        })
    }

    /// Locks the configuration. Calling it again after success is a no-op.
    pub fn lock(&mut self) -> Result<()> {
        if self.is_locked() {
            return Ok(());
        }
        let config = &mut self.config;
        self.machine.catch_error_state(|machine| {
            advance(machine, State::Locked, "lock")?;

            let family = config.family();
            let has_weak = if family.is_set() {
                !config.weak_set_elements().is_empty()
            } else {
                !config.weak_map_keys().is_empty()
            };
            if family.is_weak() && !has_weak {
                return Err(BuilderError::MissingWeakKey(family));
            }

            if let Some(solo) = family.solo() {
                if config.dimensions().len() == 1 {
                    config.set_family(solo);
                }
            }
            logging::trace(
                "builder",
                &format!("locked \"{}\" as {}", config.class_name(), config.family()),
            );
            Ok(())
        })
    }
}

fn advance(machine: &mut ConfigurationStateMachine, next: State, operation: &'static str) -> Result<()> {
    let state = machine.current_state();
    if machine.do_state_transition(next) {
        return Ok(());
    }
    if state == State::Locked {
        Err(BuilderError::Locked)
    } else {
        Err(BuilderError::WrongPhase { operation, state })
    }
}

fn describe(
    name: &str,
    kind: KeyKind,
    description: &str,
    options: &KeyOptions,
) -> Result<KeyDescriptor> {
    identifiers::check_text("description", description)?;
    let mut descriptor = KeyDescriptor::new(name, kind, description);
    if let Some(jsdoc_type) = &options.jsdoc_type {
        identifiers::check_text("jsDoc type", jsdoc_type)?;
        descriptor = descriptor.with_jsdoc_type(jsdoc_type.as_str());
    }
    if let Some(ts_type) = &options.ts_type {
        identifiers::check_text("type annotation", ts_type)?;
        descriptor = descriptor.with_ts_type(ts_type.as_str());
    }
    if let Some(source) = &options.validator {
        descriptor = descriptor.with_validator(validator_expr::parse_validator(name, source)?);
    }
    Ok(descriptor)
}
