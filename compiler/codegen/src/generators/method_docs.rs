//! Default method-template tables, one per [`DocFlavor`].

use super::doc_comment::{ArgumentPolicy as Args, DocFlavor, MethodTemplate as T};

const CALLBACK: &str = "A function to invoke for each iteration.";
const THIS_ARG: &str = "Value to use as this when executing callback.";

/// Default templates of `flavor`, keyed by method name.
pub fn defaults(flavor: DocFlavor) -> Vec<(&'static str, T)> {
    match flavor {
        DocFlavor::Collection => collection(),
        DocFlavor::PairedSingle => paired_single(),
        DocFlavor::PairedDouble => paired_double(),
    }
}

fn collection() -> Vec<(&'static str, T)> {
    vec![
        (
            "constructor",
            T::new("Create a new __className__.", Args::None)
                .param_before("Iterable<*[]>", "[iterable]", "Initial entries.")
                .void(),
        ),
        (
            "size",
            T::new("The number of elements in this collection.", Args::None)
                .property("number", "The element count."),
        ),
        (
            "mapSize",
            T::new("The number of sets in this collection.", Args::None)
                .property("number", "The set count."),
        ),
        ("clear", T::new("Clear the collection.", Args::None).void()),
        (
            "delete",
            T::new("Delete an element from the collection by its key sequence.", Args::ExcludeValue)
                .returns("boolean", "True if we found the value and deleted it."),
        ),
        (
            "deleteSets",
            T::new("Delete all sets from the collection by the given map sequence.", Args::MapOnly)
                .returns("boolean", "True if we found the sets and deleted them."),
        ),
        (
            "entries",
            T::new("Yield the key-value tuples of the collection.", Args::None)
                .yields("*[]", "The keys and values."),
        ),
        (
            "forEach",
            T::new("Iterate over the keys and values.", Args::None)
                .param_before("function", "__callback__", CALLBACK)
                .param_before("object", "[__thisArg__]", THIS_ARG)
                .void(),
        ),
        (
            "forEachSet",
            T::new("Iterate over the set keys of one map key sequence.", Args::MapOnly)
                .param_after("function", "__callback__", CALLBACK)
                .param_after("object", "[__thisArg__]", THIS_ARG)
                .void(),
        ),
        (
            "get",
            T::new("Get a value for a key set.", Args::ExcludeValue).returns(
                "__valueType__ | undefined",
                "__valueDesc__ Undefined if it isn't in the collection.",
            ),
        ),
        (
            "getDefault",
            T::new("Provide a default value for .get() if there isn't a value.", Args::ExcludeValue)
                .param_after("function", "__defaultGetter__", "A function to provide a default.")
                .returns("__valueType__", "__valueDesc__"),
        ),
        (
            "getSizeOfSet",
            T::new("Report the number of sets for a map key sequence.", Args::MapOnly)
                .returns("number", "The set size."),
        ),
        (
            "has",
            T::new("Report if the collection has a value for a key set.", Args::ExcludeValue)
                .returns("boolean", "True if the key set refers to a value in the collection."),
        ),
        (
            "hasSets",
            T::new("Report if the collection has any sets for a map key sequence.", Args::MapOnly)
                .returns("boolean", "True if the map key sequence refers to a set."),
        ),
        (
            "isValidKey",
            T::new("Determine if a set of keys is valid.", Args::ExcludeValue)
                .returns("boolean", "True if the validation passes, false if it doesn't."),
        ),
        (
            "isValidValue",
            T::new("Determine if a value is valid.", Args::Value)
                .returns("boolean", "True if the value is valid."),
        ),
        (
            "keys",
            T::new("Yield the key sets of the collection.", Args::None)
                .yields("*[]", "The key set."),
        ),
        (
            "set",
            T::new("Set a value for a key set.", Args::All)
                .returns("__className__", "This collection."),
        ),
        (
            "add",
            T::new("Add a key set to this collection.", Args::ExcludeValue)
                .returns("__className__", "This collection."),
        ),
        (
            "addSets",
            T::new("Add several sets to a map in this collection.", Args::MapOnly)
                .param_after("Iterable<*[]>", "__sets__", "The sets to add.")
                .returns("__className__", "This collection."),
        ),
        (
            "values",
            T::new("Yield the values of the collection.", Args::None)
                .yields("__valueType__", "The value."),
        ),
        (
            "valuesSet",
            T::new("Yield the sets of the collection for a map key sequence.", Args::MapOnly)
                .yields("*[]", "The map and set keys."),
        ),
        (
            "iterator",
            T::new("Iterate over the collection.", Args::None).yields("*[]", "The next entry."),
        ),
        (
            "toStringTag",
            T::new("The class name.", Args::None).property("string", "__className__"),
        ),
    ]
}

fn paired_single() -> Vec<(&'static str, T)> {
    vec![
        ("constructor", T::new("Create a new __className__.", Args::None).void()),
        (
            "bindOneToOne",
            T::new("Bind two values together.", Args::None)
                .param_before("object", "value_1", "The first value.")
                .param_before("object", "value_2", "The second value.")
                .void(),
        ),
        (
            "delete",
            T::new("Unbind a value from its partner.", Args::None)
                .param_before("object", "value", "The value.")
                .returns("boolean", "True if the value was bound and is now unbound."),
        ),
        (
            "get",
            T::new("Get the partner of a value.", Args::None)
                .param_before("object", "value", "The value.")
                .returns("object | undefined", "The partner value, or undefined."),
        ),
        (
            "has",
            T::new("Report if a value has a partner.", Args::None)
                .param_before("object", "value", "The value.")
                .returns("boolean", "True if the value is bound."),
        ),
        (
            "isValidValue",
            T::new("Determine if a value is valid.", Args::None)
                .param_before("*", "value", "The value.")
                .returns("boolean", "True if the value is an object."),
        ),
        (
            "toStringTag",
            T::new("The class name.", Args::None).property("string", "__className__"),
        ),
    ]
}

fn paired_double() -> Vec<(&'static str, T)> {
    vec![
        ("constructor", T::new("Create a new __className__.", Args::None).void()),
        (
            "bindOneToOne",
            T::new("Bind two sets of keys and values together.", Args::None)
                .param_before("object", "value_1", "The first value.")
                .param_before("object", "value_2", "The second value.")
                .void(),
        ),
        (
            "delete",
            T::new("Delete a target value.", Args::ExcludeValue)
                .param_before("object", "value", "The value.")
                .returns("boolean", "True if the target value was deleted."),
        ),
        (
            "get",
            T::new("Get a target value.", Args::ExcludeValue)
                .param_before("object", "value", "The value.")
                .returns("object | undefined", "The target value, or undefined."),
        ),
        (
            "has",
            T::new("Determine if a target value exists.", Args::ExcludeValue)
                .param_before("object", "value", "The value.")
                .returns("boolean", "True if the target value exists."),
        ),
        (
            "hasIdentity",
            T::new("Determine if a target value is an identity in this map.", Args::ExcludeValue)
                .param_before("object", "value", "The value.")
                .param_after("boolean", "allowNotDefined", "Treat an unbound value as an identity.")
                .returns("boolean", "True if the target value exists."),
        ),
        (
            "isValidKey",
            T::new("Determine if a set of keys is valid.", Args::ExcludeValue)
                .returns("boolean", "True if the validation passes, false if it doesn't."),
        ),
        (
            "isValidValue",
            T::new("Determine if a value is valid.", Args::None)
                .param_before("*", "value", "The value.")
                .returns("boolean", "True if the value is an object."),
        ),
        (
            "toStringTag",
            T::new("The class name.", Args::None).property("string", "__className__"),
        ),
    ]
}
