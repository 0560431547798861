//! Property model: the Package → Type → Property graph built by one scan.
//!
//! Everything is created lazily through the factory methods below and lives
//! only for one generation run.

use std::collections::{BTreeMap, HashMap};

use indexmap::IndexSet;

use crate::ast::{last_segment, Expr};

/// One Go package (a single directory)
#[derive(Debug, Clone, PartialEq)]
pub struct Package {
    name: String,
    path: String,
    types: BTreeMap<String, Type>,
}

impl Package {
    /// Create a package for a module path; the display name starts out as the
    /// last path segment until a package clause is seen.
    pub fn new(path: impl Into<String>) -> Self {
        let path = path.into();
        Self {
            name: last_segment(&path).to_string(),
            path,
            types: BTreeMap::new(),
        }
    }

    /// Package clause name
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// Fully qualified module path, empty when unknown
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Find or create the type with this name
    pub fn type_mut(&mut self, name: &str) -> &mut Type {
        self.types
            .entry(name.to_string())
            .or_insert_with(|| Type::new(name))
    }

    pub fn get_type(&self, name: &str) -> Option<&Type> {
        self.types.get(name)
    }

    /// Types in lexicographic order of name
    pub fn types(&self) -> impl Iterator<Item = &Type> {
        self.types.values()
    }
}

/// A named type with the fields declared on it
#[derive(Debug, Clone, PartialEq)]
pub struct Type {
    name: String,
    recv_name: Option<String>,
    type_params: Vec<String>,
    field_names: Vec<String>,
    properties: HashMap<String, Property>,
    observed_receivers: IndexSet<String>,
}

impl Type {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            recv_name: None,
            type_params: Vec::new(),
            field_names: Vec::new(),
            properties: HashMap::new(),
            observed_receivers: IndexSet::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Receiver name requested through a `recv` tag
    pub fn recv_name(&self) -> Option<&str> {
        self.recv_name.as_deref()
    }

    pub fn set_recv_name(&mut self, name: impl Into<String>) {
        self.recv_name = Some(name.into());
    }

    /// Names of the type parameters, in declaration order
    pub fn type_params(&self) -> &[String] {
        &self.type_params
    }

    pub fn set_type_params(&mut self, params: Vec<String>) {
        self.type_params = params;
    }

    /// Register a declared field, keeping declaration order.
    ///
    /// Registering the same name twice keeps its original position.
    pub fn add_property(&mut self, name: &str) -> &mut Property {
        if !self.field_names.iter().any(|existing| existing == name) {
            self.field_names.push(name.to_string());
        }
        self.property_mut(name)
    }

    /// Find or create a property without declaring it as a field
    pub fn property_mut(&mut self, name: &str) -> &mut Property {
        self.properties
            .entry(name.to_string())
            .or_insert_with(|| Property::new(name))
    }

    pub fn property(&self, name: &str) -> Option<&Property> {
        self.properties.get(name)
    }

    /// Declared fields in source order
    pub fn properties(&self) -> impl Iterator<Item = &Property> {
        self.field_names
            .iter()
            .filter_map(|name| self.properties.get(name))
    }

    pub fn field_names(&self) -> &[String] {
        &self.field_names
    }

    /// Record a receiver name used by an existing method of this type
    pub fn record_receiver(&mut self, name: &str) {
        self.observed_receivers.insert(name.to_string());
    }

    /// The receiver name existing methods agree on, if there is exactly one
    pub fn observed_receiver(&self) -> Option<&str> {
        match self.observed_receivers.len() {
            1 => self.observed_receivers.first().map(String::as_str),
            _ => None,
        }
    }

    pub fn observed_receivers(&self) -> impl Iterator<Item = &str> {
        self.observed_receivers.iter().map(String::as_str)
    }
}

/// One struct field and everything known about its accessors
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    /// Getter to generate; `None` means none was requested
    pub getter: Option<String>,
    /// Setter to generate; `None` means none was requested
    pub setter: Option<String>,
    /// The getter returns the field's address instead of its value
    pub ref_getter: bool,
    /// Declared type, qualifiers already rewritten to module paths
    pub ty: Option<Expr>,
    /// Tag literal as written in source
    pub tag: Option<String>,
    existing_getters: IndexSet<String>,
    existing_setters: IndexSet<String>,
}

impl Property {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            getter: None,
            setter: None,
            ref_getter: false,
            ty: None,
            tag: None,
            existing_getters: IndexSet::new(),
            existing_setters: IndexSet::new(),
        }
    }

    /// True when at least one accessor should be generated
    pub fn wants_accessors(&self) -> bool {
        self.getter.is_some() || self.setter.is_some()
    }

    pub fn record_existing_getter(&mut self, method: &str) {
        self.existing_getters.insert(method.to_string());
    }

    pub fn record_existing_setter(&mut self, method: &str) {
        self.existing_setters.insert(method.to_string());
    }

    pub fn has_existing_getter(&self, method: &str) -> bool {
        self.existing_getters.contains(method)
    }

    pub fn has_existing_setter(&self, method: &str) -> bool {
        self.existing_setters.contains(method)
    }

    /// Existing getter-shaped methods, in the order they were seen
    pub fn existing_getters(&self) -> impl Iterator<Item = &str> {
        self.existing_getters.iter().map(String::as_str)
    }

    /// Existing setter-shaped methods, in the order they were seen
    pub fn existing_setters(&self) -> impl Iterator<Item = &str> {
        self.existing_setters.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_package_name_defaults_to_last_segment() {
        let mut pkg = Package::new("github.com/acme/shop/cart");
        assert_eq!(pkg.name(), "cart");
        assert_eq!(pkg.path(), "github.com/acme/shop/cart");

        pkg.set_name("basket");
        assert_eq!(pkg.name(), "basket");

        assert_eq!(Package::new("").name(), "");
    }

    #[test]
    fn test_types_sorted_by_name() {
        let mut pkg = Package::new("shop");
        pkg.type_mut("Order");
        pkg.type_mut("Cart");
        pkg.type_mut("Item");
        pkg.type_mut("Cart");

        let names: Vec<_> = pkg.types().map(Type::name).collect();
        assert_eq!(names, vec!["Cart", "Item", "Order"]);
    }

    #[test]
    fn test_field_order_is_declaration_order() {
        let mut typ = Type::new("Cart");
        typ.add_property("zeta");
        typ.add_property("alpha");
        typ.add_property("mid");
        typ.add_property("zeta");

        let names: Vec<_> = typ.properties().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_undeclared_property_not_listed() {
        let mut typ = Type::new("Cart");
        typ.property_mut("ghost").record_existing_getter("Ghost");
        typ.add_property("id");

        let names: Vec<_> = typ.properties().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["id"]);
        assert!(typ.property("ghost").unwrap().has_existing_getter("Ghost"));

        // declaring it later keeps what was observed
        typ.add_property("ghost");
        assert!(typ.property("ghost").unwrap().has_existing_getter("Ghost"));
        assert_eq!(typ.field_names(), &["id".to_string(), "ghost".to_string()]);
    }

    #[test]
    fn test_observed_receiver_needs_single_name() {
        let mut typ = Type::new("Cart");
        assert_eq!(typ.observed_receiver(), None);

        typ.record_receiver("c");
        typ.record_receiver("c");
        assert_eq!(typ.observed_receiver(), Some("c"));

        typ.record_receiver("cart");
        assert_eq!(typ.observed_receiver(), None);
    }

    #[test]
    fn test_existing_accessors_deduplicated_in_order() {
        let mut prop = Property::new("name");
        prop.record_existing_getter("Name");
        prop.record_existing_getter("GetName");
        prop.record_existing_getter("Name");

        let getters: Vec<_> = prop.existing_getters().collect();
        assert_eq!(getters, vec!["Name", "GetName"]);
        assert!(!prop.has_existing_setter("SetName"));
    }
}
