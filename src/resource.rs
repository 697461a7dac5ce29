pub mod object_id;

pub use self::object_id::ObjectIdRef;

use crate::k8s_types::K8sType;

use serde_json::Value;

use std::borrow::Cow;

#[derive(Debug, PartialEq, Clone)]
pub struct InvalidResourceError {
    pub message: &'static str,
    pub value: Value,
}

impl InvalidResourceError {
    pub fn new(message: &'static str, value: Value) -> Self {
        InvalidResourceError { message, value }
    }
}

impl std::fmt::Display for InvalidResourceError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Invalid Resource: {}", self.message)
    }
}

impl std::error::Error for InvalidResourceError {}

/// A Kubernetes resource as raw json, as it was observed in the cluster. A `K8sResource` is always
/// guaranteed to have an `apiVersion`, `kind` and `metadata.name`.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct K8sResource(Value);

impl K8sResource {
    pub fn from_value(value: Value) -> Result<K8sResource, InvalidResourceError> {
        if let Err(msg) = K8sResource::validate(&value) {
            Err(InvalidResourceError::new(msg, value))
        } else {
            Ok(K8sResource(value))
        }
    }

    pub fn into_value(self) -> Value {
        self.0
    }

    pub fn name(&self) -> &str {
        self.str_value("/metadata/name").unwrap_or("")
    }

    pub fn namespace(&self) -> Option<&str> {
        self.str_value("/metadata/namespace")
    }

    pub fn api_version(&self) -> &str {
        self.str_value("/apiVersion").unwrap_or("")
    }

    pub fn kind(&self) -> &str {
        self.str_value("/kind").unwrap_or("")
    }

    pub fn status(&self) -> Option<&Value> {
        self.0.pointer("/status")
    }

    pub fn get_object_id(&self) -> ObjectIdRef {
        let ns = self.namespace().unwrap_or("");
        ObjectIdRef::new(ns, self.name())
    }

    pub fn get_type_ref(&self) -> K8sTypeRef {
        K8sTypeRef::new(self.api_version(), self.kind())
    }

    pub fn is_type(&self, k8s_type: &K8sType) -> bool {
        self.get_type_ref() == *k8s_type
    }

    fn validate(value: &Value) -> Result<(), &'static str> {
        value
            .pointer("/metadata/name")
            .and_then(Value::as_str)
            .ok_or("missing metadata.name")?;
        value
            .pointer("/apiVersion")
            .and_then(Value::as_str)
            .ok_or("missing apiVersion")?;
        value
            .pointer("/kind")
            .and_then(Value::as_str)
            .ok_or("missing kind")?;
        Ok(())
    }

    pub fn str_value(&self, pointer: &str) -> Option<&str> {
        self.0.pointer(pointer).and_then(Value::as_str)
    }

    pub fn pointer(&self, pointer: &str) -> Option<&Value> {
        self.0.pointer(pointer)
    }
}

impl std::convert::AsRef<Value> for K8sResource {
    fn as_ref(&self) -> &Value {
        &self.0
    }
}

impl Into<Value> for K8sResource {
    fn into(self) -> Value {
        self.into_value()
    }
}

impl std::fmt::Display for K8sResource {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A borrowed or owned `(apiVersion, kind)` pair, as read from a resource
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct K8sTypeRef<'a>(Cow<'a, str>, Cow<'a, str>);

impl<'a> K8sTypeRef<'a> {
    pub fn new(api_version: impl Into<Cow<'a, str>>, kind: impl Into<Cow<'a, str>>) -> Self {
        K8sTypeRef(api_version.into(), kind.into())
    }
}

impl<'a> std::fmt::Display for K8sTypeRef<'a> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}/{}", self.0, self.1)
    }
}

impl<'a> std::cmp::PartialEq<K8sType> for K8sTypeRef<'a> {
    fn eq(&self, rhs: &K8sType) -> bool {
        self.0 == rhs.api_version && self.1 == rhs.kind
    }
}
