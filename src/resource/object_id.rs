//! Every generated child is identified by the `namespace` and `name` from its `metadata`, which for
//! the rsync source controller is always the namespace and name of the parent `RsyncSource`.
//!
//! `ObjectIdRef` borrows its fields, typically from a json `Value`. A missing namespace is
//! represented as an empty string, and `namespace()` returns `None` in that case.
use std::fmt::{self, Display};

/// An id that borrows its fields
#[derive(Debug, PartialEq, Eq, Hash, Clone)]
pub struct ObjectIdRef<'a> {
    pub namespace: &'a str,
    pub name: &'a str,
}

impl<'a> ObjectIdRef<'a> {
    pub fn new(namespace: &'a str, name: &'a str) -> ObjectIdRef<'a> {
        ObjectIdRef { namespace, name }
    }

    pub fn namespace(&self) -> Option<&'a str> {
        if self.namespace.is_empty() {
            None
        } else {
            Some(self.namespace)
        }
    }

    pub fn name(&self) -> &'a str {
        self.name
    }
}

impl<'a> Display for ObjectIdRef<'a> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl<'a> From<(&'a str, &'a str)> for ObjectIdRef<'a> {
    fn from((namespace, name): (&'a str, &'a str)) -> ObjectIdRef<'a> {
        ObjectIdRef { namespace, name }
    }
}
