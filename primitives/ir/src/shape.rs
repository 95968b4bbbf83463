//! Structural shapes of composite collections.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Outer structure requested when a collection is declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OuterShape {
    /// Strongly held multi-key map.
    Map,
    /// Map holding at least one key weakly.
    WeakMap,
    /// Strongly held multi-element set.
    Set,
    /// Set holding at least one element weakly.
    WeakSet,
    /// Paired (one-to-one) collection over a weak base map.
    OneToOne,
}

impl OuterShape {
    /// Canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            OuterShape::Map => "Map",
            OuterShape::WeakMap => "WeakMap",
            OuterShape::Set => "Set",
            OuterShape::WeakSet => "WeakSet",
            OuterShape::OneToOne => "OneToOne",
        }
    }
}

impl fmt::Display for OuterShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for OuterShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Map" => Ok(OuterShape::Map),
            "WeakMap" => Ok(OuterShape::WeakMap),
            "Set" => Ok(OuterShape::Set),
            "WeakSet" => Ok(OuterShape::WeakSet),
            "OneToOne" => Ok(OuterShape::OneToOne),
            other => Err(format!("Unknown outer shape \"{}\"", other)),
        }
    }
}

/// Inner structure of a mapping-of-sets collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum InnerShape {
    /// Strongly held set of elements.
    Set,
    /// Weakly held set of elements. Never accepted by the builder.
    WeakSet,
}

impl InnerShape {
    /// Canonical spelling.
    pub fn as_str(&self) -> &'static str {
        match self {
            InnerShape::Set => "Set",
            InnerShape::WeakSet => "WeakSet",
        }
    }
}

impl fmt::Display for InnerShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

impl FromStr for InnerShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Set" => Ok(InnerShape::Set),
            "WeakSet" => Ok(InnerShape::WeakSet),
            other => Err(format!("Unknown inner shape \"{}\"", other)),
        }
    }
}

/// Template family: the nominal structural shape a configuration describes.
///
/// The generator starts from this family and may refine it into a more
/// specialized template variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum TemplateFamily {
    /// `Strong/Map`
    StrongMap,
    /// `Weak/Map`
    WeakMap,
    /// `Strong/Set`
    StrongSet,
    /// `Weak/Set`
    WeakSet,
    /// `Strong/MapOfStrongSets`
    StrongMapOfStrongSets,
    /// `Weak/MapOfStrongSets`
    WeakMapOfStrongSets,
    /// `OneToOne/Map`
    OneToOneMap,
    /// `Solo/StrongMap`
    SoloStrongMap,
    /// `Solo/WeakMap`
    SoloWeakMap,
    /// `Solo/StrongSet`
    SoloStrongSet,
    /// `Solo/WeakSet`
    SoloWeakSet,
}

impl TemplateFamily {
    /// Family identifier as used in logs and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateFamily::StrongMap => "Strong/Map",
            TemplateFamily::WeakMap => "Weak/Map",
            TemplateFamily::StrongSet => "Strong/Set",
            TemplateFamily::WeakSet => "Weak/Set",
            TemplateFamily::StrongMapOfStrongSets => "Strong/MapOfStrongSets",
            TemplateFamily::WeakMapOfStrongSets => "Weak/MapOfStrongSets",
            TemplateFamily::OneToOneMap => "OneToOne/Map",
            TemplateFamily::SoloStrongMap => "Solo/StrongMap",
            TemplateFamily::SoloWeakMap => "Solo/WeakMap",
            TemplateFamily::SoloStrongSet => "Solo/StrongSet",
            TemplateFamily::SoloWeakSet => "Solo/WeakSet",
        }
    }

    /// Whether the collection exposes a value dimension (`get`/`set`).
    pub fn is_map(&self) -> bool {
        matches!(
            self,
            TemplateFamily::StrongMap
                | TemplateFamily::WeakMap
                | TemplateFamily::SoloStrongMap
                | TemplateFamily::SoloWeakMap
        )
    }

    /// Whether the collection is a plain set.
    pub fn is_set(&self) -> bool {
        matches!(
            self,
            TemplateFamily::StrongSet
                | TemplateFamily::WeakSet
                | TemplateFamily::SoloStrongSet
                | TemplateFamily::SoloWeakSet
        )
    }

    /// Whether the collection maps keys to sets.
    pub fn is_map_of_sets(&self) -> bool {
        matches!(self, TemplateFamily::StrongMapOfStrongSets | TemplateFamily::WeakMapOfStrongSets)
    }

    /// Whether the collection is a paired (one-to-one) collection.
    pub fn is_one_to_one(&self) -> bool { matches!(self, TemplateFamily::OneToOneMap) }

    /// Whether the family omits multi-key hashing.
    pub fn is_solo(&self) -> bool {
        matches!(
            self,
            TemplateFamily::SoloStrongMap
                | TemplateFamily::SoloWeakMap
                | TemplateFamily::SoloStrongSet
                | TemplateFamily::SoloWeakSet
        )
    }

    /// Whether the family requires at least one weak dimension.
    pub fn is_weak(&self) -> bool {
        matches!(
            self,
            TemplateFamily::WeakMap
                | TemplateFamily::WeakSet
                | TemplateFamily::WeakMapOfStrongSets
                | TemplateFamily::SoloWeakMap
                | TemplateFamily::SoloWeakSet
        )
    }

    /// Whether mapping keys may be held weakly.
    pub fn allows_weak_map_keys(&self) -> bool {
        matches!(self, TemplateFamily::WeakMap | TemplateFamily::WeakMapOfStrongSets)
    }

    /// Whether set elements may be held weakly.
    pub fn allows_weak_set_elements(&self) -> bool { matches!(self, TemplateFamily::WeakSet) }

    /// Whether the family declares mapping keys.
    pub fn declares_map_keys(&self) -> bool { self.is_map() || self.is_map_of_sets() }

    /// Whether the family declares set elements.
    pub fn declares_set_elements(&self) -> bool { self.is_set() || self.is_map_of_sets() }

    /// The single-dimension specialization of this family, if it has one.
    pub fn solo(&self) -> Option<TemplateFamily> {
        match self {
            TemplateFamily::StrongMap => Some(TemplateFamily::SoloStrongMap),
            TemplateFamily::WeakMap => Some(TemplateFamily::SoloWeakMap),
            TemplateFamily::StrongSet => Some(TemplateFamily::SoloStrongSet),
            TemplateFamily::WeakSet => Some(TemplateFamily::SoloWeakSet),
            _ => None,
        }
    }
}

impl fmt::Display for TemplateFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}
