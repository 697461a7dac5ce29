//! Configuration for the rsync source templates. Nothing in here is global or mutable: the
//! label keys and the `created-by` value are plain values that get passed into the template
//! builder, and the `OperatorConfig` ties them to the parent type that the handler accepts.
use crate::error::InvalidSpec;
use crate::k8s_types::{self, K8sType};

/// The name of this controller, which is used as the value of the `created-by` label
pub const DEFAULT_OPERATOR_NAME: &str = "rsync-source-controller";

pub const DEFAULT_CREATED_BY_LABEL: &str = "created-by";
pub const DEFAULT_NAME_LABEL: &str = "name";
pub const DEFAULT_APP_LABEL: &str = "app";

/// Well-known node label that the scheduler uses to identify a node by its hostname
pub const DEFAULT_HOSTNAME_LABEL: &str = "kubernetes.io/hostname";

/// The label keys (and the single constant label value) that bind the generated children
/// together. Every generated object gets the same three labels, and the Deployment selector
/// and the Service selector are built from exactly this set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelConfig {
    /// key of the label whose value identifies the controller that created the object
    pub created_by_label: String,
    /// value of the `created_by_label`
    pub created_by: String,
    /// key of the label whose value is the name of the parent
    pub name_label: String,
    /// key of a second label that also has the parent's name as its value
    pub app_label: String,
    /// node label used to pin the daemon to a specific host
    pub hostname_label: String,
}

impl Default for LabelConfig {
    fn default() -> LabelConfig {
        LabelConfig::new(DEFAULT_OPERATOR_NAME)
    }
}

impl LabelConfig {
    /// Returns the default label keys, using the given value for the `created-by` label
    pub fn new(created_by: impl Into<String>) -> LabelConfig {
        LabelConfig {
            created_by_label: DEFAULT_CREATED_BY_LABEL.to_owned(),
            created_by: created_by.into(),
            name_label: DEFAULT_NAME_LABEL.to_owned(),
            app_label: DEFAULT_APP_LABEL.to_owned(),
            hostname_label: DEFAULT_HOSTNAME_LABEL.to_owned(),
        }
    }

    /// The three label keys must all be set and must all be different, otherwise one label
    /// would overwrite another and the children would end up with fewer than three labels.
    pub fn validate(&self) -> Result<(), InvalidSpec> {
        let keys = [
            ("labels.created_by_label", self.created_by_label.as_str()),
            ("labels.name_label", self.name_label.as_str()),
            ("labels.app_label", self.app_label.as_str()),
        ];
        for (i, &(field, key)) in keys.iter().enumerate() {
            if key.is_empty() {
                return Err(InvalidSpec::new(field, "must not be empty"));
            }
            if let Some((other, _)) = keys[..i].iter().find(|&&(_, k)| k == key) {
                return Err(InvalidSpec::new(
                    field,
                    format!("'{}' is already used by {}", key, other),
                ));
            }
        }
        if self.created_by.is_empty() {
            return Err(InvalidSpec::new("labels.created_by", "must not be empty"));
        }
        if self.hostname_label.is_empty() {
            return Err(InvalidSpec::new("labels.hostname_label", "must not be empty"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct OperatorConfig {
    pub parent: &'static K8sType,
    pub operator_name: String,
    pub labels: LabelConfig,
}

impl OperatorConfig {
    pub fn new(operator_name: impl Into<String>, parent: &'static K8sType) -> OperatorConfig {
        let operator_name = operator_name.into();
        let labels = LabelConfig::new(operator_name.as_str());
        OperatorConfig {
            parent,
            operator_name,
            labels,
        }
    }

    /// The configuration for the `RsyncSource` controller
    pub fn rsync_source() -> OperatorConfig {
        OperatorConfig::new(DEFAULT_OPERATOR_NAME, k8s_types::demo_io::v1::RsyncSource)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn rsync_source_config_uses_the_default_labels() {
        let config = OperatorConfig::rsync_source();
        assert_eq!("RsyncSource", config.parent.kind);
        assert_eq!(LabelConfig::default(), config.labels);
        assert!(config.labels.validate().is_ok());
    }

    #[test]
    fn operator_name_is_used_as_created_by_label_value() {
        let config = OperatorConfig::new("my-operator", k8s_types::demo_io::v1::RsyncSource);
        assert_eq!("my-operator", config.labels.created_by);
        assert_eq!(DEFAULT_CREATED_BY_LABEL, config.labels.created_by_label);
    }

    #[test]
    fn label_keys_must_be_distinct() {
        let mut labels = LabelConfig::default();
        labels.app_label = "name".to_owned();
        let err = labels.validate().unwrap_err();
        assert_eq!("labels.app_label", err.field);
        assert_eq!("'name' is already used by labels.name_label", err.reason);

        let mut labels = LabelConfig::default();
        labels.name_label = "created-by".to_owned();
        assert_eq!("labels.name_label", labels.validate().unwrap_err().field);
    }

    #[test]
    fn label_keys_and_created_by_must_not_be_empty() {
        let mut labels = LabelConfig::default();
        labels.created_by_label = String::new();
        assert_eq!("labels.created_by_label", labels.validate().unwrap_err().field);

        let labels = LabelConfig::new("");
        assert_eq!("labels.created_by", labels.validate().unwrap_err().field);

        let mut labels = LabelConfig::default();
        labels.hostname_label = String::new();
        assert_eq!("labels.hostname_label", labels.validate().unwrap_err().field);
    }
}
