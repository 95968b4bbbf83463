//! Template variants and the registry that maps them to template functions.
//!
//! A variant is either a [`TemplateFamily`] rendered as is, or one of the
//! map-of-sets specializations addressed by a cardinality/retention
//! discriminant of the form `<1|n><W|S>/<1|n><W|S>`.

use std::collections::HashMap;
use std::fmt;

use ir::{CollectionConfiguration, TemplateFamily};

use super::{keyed_map, keyed_set, map_of_sets, one_to_one, TemplateContext};
use crate::{CodegenError, Result};

/// Signature shared by every template.
pub type TemplateFn = fn(&mut TemplateContext<'_>) -> Result<String>;

/// Every template the generator can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateVariant {
    /// `Strong/Map`
    StrongMap,
    /// `Weak/Map`
    WeakMap,
    /// `Strong/Set`
    StrongSet,
    /// `Weak/Set`
    WeakSet,
    /// `Solo/StrongMap`
    SoloStrongMap,
    /// `Solo/WeakMap`
    SoloWeakMap,
    /// `Solo/StrongSet`
    SoloStrongSet,
    /// `Solo/WeakSet`
    SoloWeakSet,
    /// `Strong/MapOfStrongSets`
    StrongMapOfStrongSets,
    /// `Weak/MapOfStrongSets`
    WeakMapOfStrongSets,
    /// `OneToOne/Map`
    OneToOneMap,
    /// `1W/nS`: one weak key of strong sets.
    OneWeakKeyOfStrongSets,
    /// `1W/1S`: one weak key of one-element strong sets.
    OneWeakKeyOfOneStrongSet,
    /// `1S/nS`: one strong key of strong sets.
    OneStrongKeyOfStrongSets,
    /// `1S/1S`: one strong key of one-element strong sets.
    OneStrongKeyOfOneStrongSet,
    /// `nW/1S`: weak map of one-element strong sets.
    WeakMapOfOneStrongSet,
    /// `nS/1S`: strong map of one-element strong sets.
    StrongMapOfOneStrongSet,
}

impl TemplateVariant {
    /// Every variant, in registration order.
    pub const ALL: [TemplateVariant; 17] = [
        TemplateVariant::StrongMap,
        TemplateVariant::WeakMap,
        TemplateVariant::StrongSet,
        TemplateVariant::WeakSet,
        TemplateVariant::SoloStrongMap,
        TemplateVariant::SoloWeakMap,
        TemplateVariant::SoloStrongSet,
        TemplateVariant::SoloWeakSet,
        TemplateVariant::StrongMapOfStrongSets,
        TemplateVariant::WeakMapOfStrongSets,
        TemplateVariant::OneToOneMap,
        TemplateVariant::OneWeakKeyOfStrongSets,
        TemplateVariant::OneWeakKeyOfOneStrongSet,
        TemplateVariant::OneStrongKeyOfStrongSets,
        TemplateVariant::OneStrongKeyOfOneStrongSet,
        TemplateVariant::WeakMapOfOneStrongSet,
        TemplateVariant::StrongMapOfOneStrongSet,
    ];

    /// Template name as used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            TemplateVariant::StrongMap => "Strong/Map",
            TemplateVariant::WeakMap => "Weak/Map",
            TemplateVariant::StrongSet => "Strong/Set",
            TemplateVariant::WeakSet => "Weak/Set",
            TemplateVariant::SoloStrongMap => "Solo/StrongMap",
            TemplateVariant::SoloWeakMap => "Solo/WeakMap",
            TemplateVariant::SoloStrongSet => "Solo/StrongSet",
            TemplateVariant::SoloWeakSet => "Solo/WeakSet",
            TemplateVariant::StrongMapOfStrongSets => "Strong/MapOfStrongSets",
            TemplateVariant::WeakMapOfStrongSets => "Weak/MapOfStrongSets",
            TemplateVariant::OneToOneMap => "OneToOne/Map",
            TemplateVariant::OneWeakKeyOfStrongSets => "Weak/OneMapOfStrongSets",
            TemplateVariant::OneWeakKeyOfOneStrongSet => "Weak/OneMapOfOneStrongSet",
            TemplateVariant::OneStrongKeyOfStrongSets => "Strong/OneMapOfStrongSets",
            TemplateVariant::OneStrongKeyOfOneStrongSet => "Strong/OneMapOfOneStrongSet",
            TemplateVariant::WeakMapOfOneStrongSet => "Weak/MapOfOneStrongSet",
            TemplateVariant::StrongMapOfOneStrongSet => "Strong/MapOfOneStrongSet",
        }
    }

    /// Variant rendering `family` without specialization.
    pub fn from_family(family: TemplateFamily) -> Self {
        match family {
            TemplateFamily::StrongMap => TemplateVariant::StrongMap,
            TemplateFamily::WeakMap => TemplateVariant::WeakMap,
            TemplateFamily::StrongSet => TemplateVariant::StrongSet,
            TemplateFamily::WeakSet => TemplateVariant::WeakSet,
            TemplateFamily::StrongMapOfStrongSets => TemplateVariant::StrongMapOfStrongSets,
            TemplateFamily::WeakMapOfStrongSets => TemplateVariant::WeakMapOfStrongSets,
            TemplateFamily::OneToOneMap => TemplateVariant::OneToOneMap,
            TemplateFamily::SoloStrongMap => TemplateVariant::SoloStrongMap,
            TemplateFamily::SoloWeakMap => TemplateVariant::SoloWeakMap,
            TemplateFamily::SoloStrongSet => TemplateVariant::SoloStrongSet,
            TemplateFamily::SoloWeakSet => TemplateVariant::SoloWeakSet,
        }
    }

    /// Specialized variant for a discriminant, if the table has one.
    pub fn specialization(discriminant: &str) -> Option<Self> {
        match discriminant {
            "1W/nS" => Some(TemplateVariant::OneWeakKeyOfStrongSets),
            "1W/1S" => Some(TemplateVariant::OneWeakKeyOfOneStrongSet),
            "1S/nS" => Some(TemplateVariant::OneStrongKeyOfStrongSets),
            "1S/1S" => Some(TemplateVariant::OneStrongKeyOfOneStrongSet),
            "nW/1S" => Some(TemplateVariant::WeakMapOfOneStrongSet),
            "nS/1S" => Some(TemplateVariant::StrongMapOfOneStrongSet),
            _ => None,
        }
    }

    /// Whether this variant stores sets under mapping keys.
    pub fn is_map_of_sets(&self) -> bool {
        matches!(
            self,
            TemplateVariant::StrongMapOfStrongSets
                | TemplateVariant::WeakMapOfStrongSets
                | TemplateVariant::OneWeakKeyOfStrongSets
                | TemplateVariant::OneWeakKeyOfOneStrongSet
                | TemplateVariant::OneStrongKeyOfStrongSets
                | TemplateVariant::OneStrongKeyOfOneStrongSet
                | TemplateVariant::WeakMapOfOneStrongSet
                | TemplateVariant::StrongMapOfOneStrongSet
        )
    }

    fn template(&self) -> TemplateFn {
        match self {
            TemplateVariant::StrongMap => keyed_map::strong_map,
            TemplateVariant::WeakMap => keyed_map::weak_map,
            TemplateVariant::SoloStrongMap => keyed_map::solo_strong_map,
            TemplateVariant::SoloWeakMap => keyed_map::solo_weak_map,
            TemplateVariant::StrongSet => keyed_set::strong_set,
            TemplateVariant::WeakSet => keyed_set::weak_set,
            TemplateVariant::SoloStrongSet => keyed_set::solo_strong_set,
            TemplateVariant::SoloWeakSet => keyed_set::solo_weak_set,
            TemplateVariant::StrongMapOfStrongSets => map_of_sets::strong_map_of_strong_sets,
            TemplateVariant::WeakMapOfStrongSets => map_of_sets::weak_map_of_strong_sets,
            TemplateVariant::OneWeakKeyOfStrongSets => map_of_sets::one_weak_key_of_strong_sets,
            TemplateVariant::OneWeakKeyOfOneStrongSet => {
                map_of_sets::one_weak_key_of_one_strong_set
            }
            TemplateVariant::OneStrongKeyOfStrongSets => {
                map_of_sets::one_strong_key_of_strong_sets
            }
            TemplateVariant::OneStrongKeyOfOneStrongSet => {
                map_of_sets::one_strong_key_of_one_strong_set
            }
            TemplateVariant::WeakMapOfOneStrongSet => map_of_sets::weak_map_of_one_strong_set,
            TemplateVariant::StrongMapOfOneStrongSet => map_of_sets::strong_map_of_one_strong_set,
            TemplateVariant::OneToOneMap => one_to_one::one_to_one_map,
        }
    }
}

impl fmt::Display for TemplateVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}

/// Cardinality/retention code of a configuration with both mapping keys and
/// set elements, e.g. `1W/nS`.
pub fn discriminant(config: &CollectionConfiguration) -> Option<String> {
    let map_count = config.weak_map_keys().len() + config.strong_map_keys().len();
    let set_count = config.weak_set_elements().len() + config.strong_set_elements().len();
    if map_count == 0 || set_count == 0 {
        return None;
    }
    let code = |count: usize, weak: usize| {
        format!("{}{}", if count == 1 { "1" } else { "n" }, if weak > 0 { "W" } else { "S" })
    };
    Some(format!(
        "{}/{}",
        code(map_count, config.weak_map_keys().len()),
        code(set_count, config.weak_set_elements().len())
    ))
}

/// Picks the template for `config`.
///
/// Maps of sets use the specialization table unless `disable_specialization`
/// is set; everything else renders its nominal family.
pub fn select_variant(
    config: &CollectionConfiguration,
    disable_specialization: bool,
) -> TemplateVariant {
    let nominal = TemplateVariant::from_family(config.family());
    if disable_specialization || !config.family().is_map_of_sets() {
        return nominal;
    }
    discriminant(config).and_then(|d| TemplateVariant::specialization(&d)).unwrap_or(nominal)
}

/// Variant-to-function table, built once and shared by every generator of a run.
#[derive(Clone)]
pub struct TemplateRegistry {
    templates: HashMap<TemplateVariant, TemplateFn>,
}

impl TemplateRegistry {
    /// Registry holding every variant.
    pub fn new() -> Self {
        let templates = TemplateVariant::ALL.iter().map(|v| (*v, v.template())).collect();
        Self { templates }
    }

    /// Number of registered templates.
    pub fn len(&self) -> usize { self.templates.len() }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool { self.templates.is_empty() }

    /// Template function for `variant`.
    pub fn get(&self, variant: TemplateVariant) -> Result<TemplateFn> {
        self.templates.get(&variant).copied().ok_or_else(|| {
            CodegenError::Unreachable(format!("no template registered for {}", variant))
        })
    }

    /// Renders `variant` with `context`.
    pub fn render(
        &self,
        variant: TemplateVariant,
        context: &mut TemplateContext<'_>,
    ) -> Result<String> {
        let template = self.get(variant)?;
        logging::trace(
            "codegen",
            &format!("rendering {} for {}", variant, context.macros.class_name),
        );
        template(context)
    }
}

impl fmt::Debug for TemplateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.templates.keys().map(TemplateVariant::name).collect();
        names.sort_unstable();
        f.debug_struct("TemplateRegistry").field("templates", &names).finish()
    }
}

impl Default for TemplateRegistry {
    fn default() -> Self { Self::new() }
}

#[cfg(test)]
mod tests {
    use ir::{KeyDescriptor, KeyKind};

    use super::*;

    fn map_of_sets(family: TemplateFamily, keys: &[(&str, KeyKind)]) -> CollectionConfiguration {
        let mut config = CollectionConfiguration::new("Groups", family);
        for (name, kind) in keys {
            config.add_dimension(KeyDescriptor::new(*name, *kind, "A key.")).expect("dimension");
        }
        config
    }

    #[test]
    fn test_every_variant_is_registered() {
        let registry = TemplateRegistry::new();
        assert_eq!(registry.len(), TemplateVariant::ALL.len());
        for variant in TemplateVariant::ALL {
            assert!(registry.get(variant).is_ok(), "{}", variant);
        }
    }

    #[test]
    fn test_discriminant_codes() {
        let config = map_of_sets(
            TemplateFamily::WeakMapOfStrongSets,
            &[
                ("owner", KeyKind::WeakMapKey),
                ("x", KeyKind::StrongSetElement),
                ("y", KeyKind::StrongSetElement),
            ],
        );
        assert_eq!(discriminant(&config).as_deref(), Some("1W/nS"));
        assert_eq!(select_variant(&config, false), TemplateVariant::OneWeakKeyOfStrongSets);
        assert_eq!(select_variant(&config, true), TemplateVariant::WeakMapOfStrongSets);

        let config = map_of_sets(
            TemplateFamily::StrongMapOfStrongSets,
            &[
                ("a", KeyKind::StrongMapKey),
                ("b", KeyKind::StrongMapKey),
                ("x", KeyKind::StrongSetElement),
                ("y", KeyKind::StrongSetElement),
            ],
        );
        assert_eq!(discriminant(&config).as_deref(), Some("nS/nS"));
        assert_eq!(select_variant(&config, false), TemplateVariant::StrongMapOfStrongSets);
    }

    #[test]
    fn test_plain_families_are_not_specialized() {
        let mut config = CollectionConfiguration::new("Cars", TemplateFamily::StrongMap);
        config
            .add_dimension(KeyDescriptor::new("car", KeyKind::StrongMapKey, "The car."))
            .expect("car");
        assert_eq!(discriminant(&config), None);
        assert_eq!(select_variant(&config, false), TemplateVariant::StrongMap);
        assert_eq!(TemplateVariant::specialization("nW/nS"), None);
    }
}
