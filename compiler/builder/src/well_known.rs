//! Pairing bases that can be named instead of built.

use ir::{CollectionConfiguration, KeyDescriptor, KeyKind, PairingBaseKind, TemplateFamily};

use crate::{BuilderError, Result};

/// Names accepted by [`resolve`].
pub const WELL_KNOWN_BASES: [&str; 3] = ["WeakMap", "WeakStrongMap", "WeakWeakMap"];

/// Configuration and provenance of the well-known base called `name`.
pub fn resolve(name: &str) -> Result<(CollectionConfiguration, PairingBaseKind)> {
    let (family, keys, kind): (_, &[(&str, bool, &str)], _) = match name {
        "WeakMap" => (
            TemplateFamily::SoloWeakMap,
            &[("key", true, "The key.")],
            PairingBaseKind::BuiltinWeakMap,
        ),
        "WeakStrongMap" => (
            TemplateFamily::WeakMap,
            &[("weakKey", true, "The weakly held key."), ("strongKey", false, "The strongly held key.")],
            PairingBaseKind::WellKnown(name.to_string()),
        ),
        "WeakWeakMap" => (
            TemplateFamily::WeakMap,
            &[("weakKey1", true, "The first key."), ("weakKey2", true, "The second key.")],
            PairingBaseKind::WellKnown(name.to_string()),
        ),
        other => return Err(BuilderError::UnknownBase(other.to_string())),
    };

    let mut config = CollectionConfiguration::new(name, family);
    for &(key, weak, description) in keys {
        config.add_dimension(KeyDescriptor::new(key, KeyKind::for_key(true, weak), description))?;
    }
    config.set_value(KeyDescriptor::new("value", KeyKind::Value, "The value."))?;
    Ok((config, kind))
}
