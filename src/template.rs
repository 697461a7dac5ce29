//! Builds the child resources that run an rsync daemon for an `RsyncSource`.
//!
//! Every call produces a Deployment, a ConfigMap and a Service that all share the same name and
//! the same set of labels. The Deployment selector, the pod template labels and the Service
//! selector are all built from that one label set, so the Service always selects exactly the
//! pods that belong to the same `RsyncSource`. Building a template is a pure function of its
//! inputs: there's no I/O and nothing is cached between calls.
use crate::config::LabelConfig;
use crate::error::InvalidSpec;
use crate::rsync_source::{RsyncSource, RsyncSourceSpec};

use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
use k8s_openapi::api::core::v1::{
    ConfigMap, ConfigMapVolumeSource, Container, ContainerPort, EnvVar, PodSpec, PodTemplateSpec,
    Service, ServicePort, ServiceSpec, Volume, VolumeMount,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{LabelSelector, ObjectMeta};
use serde_json::Value;

use std::collections::BTreeMap;

pub const CONTAINER_NAME: &str = "rsync-daemon";
pub const PORT_NAME: &str = "rsync-daemon";
pub const RSYNC_PORT: i32 = 873;
pub const PROTOCOL_TCP: &str = "TCP";
pub const IMAGE_PULL_POLICY: &str = "Always";
pub const PASSWORD_ENV_VAR: &str = "RSYNC_PASSWORD";

pub const DATA_MOUNT_PATH: &str = "/data";
pub const DATA_MOUNT_PROPAGATION: &str = "HostToContainer";

pub const CONFIG_VOLUME_NAME: &str = "config";
// Existing deployments mount the config at these paths, so they can't change.
pub const CONFIG_MOUNT_PATH: &str = "/etc/rsyncd.con";
pub const CONFIG_SUB_PATH: &str = "rsyncd.con";
pub const CONFIG_KEY: &str = "rsyncd.conf";

/// The rsyncd configuration that's stored in every generated ConfigMap. It is the same for
/// every `RsyncSource`.
///
/// Note that the `auth users` line starts with an empty entry before `user:rw`. Deployed
/// configs depend on this exact text, so it's kept as is.
pub const RSYNCD_CONFIG: &str = "
# /etc/rsyncd.conf
# Minimal configuration file for rsync daemon
# See rsync(1) and rsyncd.conf(5) man pages for help
# This line is required by the /etc/init.d/rsyncd script
pid file = /var/run/rsyncd.pid
uid = 0
gid = 0
use chroot = yes
reverse lookup = no
[data]
    hosts deny = *
    hosts allow = 0.0.0.0/0
    read only = false
    path = /data
    auth users = , user:rw
    secrets file = /etc/rsyncd.secrets
    timeout = 600
    transfer logging = true
";

/// The name and namespace that get used for every generated child
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TemplateIdentity {
    pub name: String,
    pub namespace: String,
}

impl TemplateIdentity {
    pub fn new(name: impl Into<String>, namespace: impl Into<String>) -> TemplateIdentity {
        TemplateIdentity {
            name: name.into(),
            namespace: namespace.into(),
        }
    }

    /// Returns the identity of the given parent resource
    pub fn of(source: &RsyncSource) -> TemplateIdentity {
        TemplateIdentity::new(
            source.metadata.name.as_str(),
            source.metadata.namespace.as_str(),
        )
    }

    fn namespace(&self) -> Option<String> {
        if self.namespace.is_empty() {
            None
        } else {
            Some(self.namespace.clone())
        }
    }
}

/// The complete set of children for one `RsyncSource`
#[derive(Debug, Clone, PartialEq)]
pub struct RsyncTemplate {
    pub deployment: Deployment,
    pub config_map: ConfigMap,
    pub service: Service,
}

impl RsyncTemplate {
    /// Serializes all three children to json, with `apiVersion` and `kind` set on each
    pub fn children(&self) -> Result<Vec<Value>, serde_json::Error> {
        Ok(vec![
            serde_json::to_value(&self.deployment)?,
            serde_json::to_value(&self.config_map)?,
            serde_json::to_value(&self.service)?,
        ])
    }

    /// Renders the children as a multi-document yaml stream, suitable for `kubectl apply -f -`
    pub fn to_manifest(&self) -> Result<String, serde_yaml::Error> {
        let docs = vec![
            serde_yaml::to_string(&self.deployment)?,
            serde_yaml::to_string(&self.config_map)?,
            serde_yaml::to_string(&self.service)?,
        ];
        let mut manifest = String::new();
        for doc in docs {
            if !doc.starts_with("---") {
                manifest.push_str("---\n");
            }
            manifest.push_str(doc.as_str());
            if !manifest.ends_with('\n') {
                manifest.push('\n');
            }
        }
        Ok(manifest)
    }
}

/// Builds all the children for the given spec and identity, using the default labels
pub fn build_template(
    spec: &RsyncSourceSpec,
    identity: &TemplateIdentity,
) -> Result<RsyncTemplate, InvalidSpec> {
    TemplateConfig::new(identity.clone(), spec.clone(), LabelConfig::default()).map(|tc| tc.build())
}

/// A validated spec together with everything else that's needed to build the children. Once one
/// of these exists, building any of the children can no longer fail.
#[derive(Debug, Clone, PartialEq)]
pub struct TemplateConfig {
    identity: TemplateIdentity,
    rsync: RsyncSourceSpec,
    labels: LabelConfig,
}

impl TemplateConfig {
    pub fn new(
        identity: TemplateIdentity,
        rsync: RsyncSourceSpec,
        labels: LabelConfig,
    ) -> Result<TemplateConfig, InvalidSpec> {
        validate(&identity, &rsync)?;
        labels.validate()?;
        Ok(TemplateConfig {
            identity,
            rsync,
            labels,
        })
    }

    pub fn from_rsync_source(source: &RsyncSource) -> Result<TemplateConfig, InvalidSpec> {
        TemplateConfig::new(
            TemplateIdentity::of(source),
            source.spec.clone(),
            LabelConfig::default(),
        )
    }

    pub fn identity(&self) -> &TemplateIdentity {
        &self.identity
    }

    pub fn build(&self) -> RsyncTemplate {
        log::debug!(
            "Building rsync template for {}/{} with replicas: {:?}",
            self.identity.namespace,
            self.identity.name,
            self.rsync.replicas
        );
        RsyncTemplate {
            deployment: self.deployment(),
            config_map: self.config_map(),
            service: self.service(),
        }
    }

    /// The labels that are shared by every child, and used as the selector for both the
    /// Deployment and the Service
    pub fn label_set(&self) -> BTreeMap<String, String> {
        let name = self.identity.name.as_str();
        let mut labels = BTreeMap::new();
        labels.insert(
            self.labels.created_by_label.clone(),
            self.labels.created_by.clone(),
        );
        labels.insert(self.labels.name_label.clone(), name.to_owned());
        labels.insert(self.labels.app_label.clone(), name.to_owned());
        labels
    }

    fn object_meta(&self) -> ObjectMeta {
        ObjectMeta {
            name: Some(self.identity.name.clone()),
            namespace: self.identity.namespace(),
            labels: Some(self.label_set()),
            ..Default::default()
        }
    }

    pub fn deployment(&self) -> Deployment {
        Deployment {
            metadata: self.object_meta(),
            spec: Some(DeploymentSpec {
                replicas: self.rsync.replicas,
                selector: LabelSelector {
                    match_labels: Some(self.label_set()),
                    ..Default::default()
                },
                template: PodTemplateSpec {
                    metadata: Some(ObjectMeta {
                        labels: Some(self.label_set()),
                        ..Default::default()
                    }),
                    spec: Some(self.pod_spec()),
                },
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    fn node_selector(&self) -> Option<BTreeMap<String, String>> {
        self.rsync.host_name().map(|host| {
            let mut selector = BTreeMap::new();
            selector.insert(self.labels.hostname_label.clone(), host.to_owned());
            selector
        })
    }

    fn pod_spec(&self) -> PodSpec {
        PodSpec {
            node_selector: self.node_selector(),
            containers: vec![self.container()],
            volumes: Some(vec![self.rsync.volume.clone(), self.config_volume()]),
            ..Default::default()
        }
    }

    fn container(&self) -> Container {
        Container {
            name: CONTAINER_NAME.to_owned(),
            image: Some(self.rsync.image.clone()),
            image_pull_policy: Some(IMAGE_PULL_POLICY.to_owned()),
            // TODO: reference a Secret key through `value_from` instead of embedding the password in the pod spec
            env: Some(vec![EnvVar {
                name: PASSWORD_ENV_VAR.to_owned(),
                value: Some(self.rsync.password.clone()),
                ..Default::default()
            }]),
            ports: Some(vec![ContainerPort {
                name: Some(PORT_NAME.to_owned()),
                container_port: RSYNC_PORT,
                ..Default::default()
            }]),
            volume_mounts: Some(vec![
                VolumeMount {
                    name: self.rsync.volume.name.clone(),
                    mount_path: DATA_MOUNT_PATH.to_owned(),
                    read_only: Some(true),
                    mount_propagation: Some(DATA_MOUNT_PROPAGATION.to_owned()),
                    ..Default::default()
                },
                VolumeMount {
                    name: CONFIG_VOLUME_NAME.to_owned(),
                    mount_path: CONFIG_MOUNT_PATH.to_owned(),
                    sub_path: Some(CONFIG_SUB_PATH.to_owned()),
                    ..Default::default()
                },
            ]),
            ..Default::default()
        }
    }

    fn config_volume(&self) -> Volume {
        Volume {
            name: CONFIG_VOLUME_NAME.to_owned(),
            config_map: Some(ConfigMapVolumeSource {
                name: Some(self.identity.name.clone()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    pub fn config_map(&self) -> ConfigMap {
        let mut data = BTreeMap::new();
        data.insert(CONFIG_KEY.to_owned(), RSYNCD_CONFIG.to_owned());
        ConfigMap {
            metadata: self.object_meta(),
            data: Some(data),
            ..Default::default()
        }
    }

    pub fn service(&self) -> Service {
        Service {
            metadata: self.object_meta(),
            spec: Some(ServiceSpec {
                ports: Some(vec![ServicePort {
                    name: Some(PORT_NAME.to_owned()),
                    port: RSYNC_PORT,
                    protocol: Some(PROTOCOL_TCP.to_owned()),
                    ..Default::default()
                }]),
                selector: Some(self.label_set()),
                ..Default::default()
            }),
            ..Default::default()
        }
    }
}

fn validate(identity: &TemplateIdentity, spec: &RsyncSourceSpec) -> Result<(), InvalidSpec> {
    if identity.name.is_empty() {
        return Err(InvalidSpec::new("metadata.name", "must not be empty"));
    }
    if spec.image.is_empty() {
        return Err(InvalidSpec::new("spec.image", "must not be empty"));
    }
    if spec.volume.name.is_empty() {
        return Err(InvalidSpec::new("spec.volume.name", "must not be empty"));
    }
    if spec.volume.name == CONFIG_VOLUME_NAME {
        return Err(InvalidSpec::new(
            "spec.volume.name",
            format!("'{}' is reserved for the rsyncd configuration", CONFIG_VOLUME_NAME),
        ));
    }
    match spec.replicas {
        Some(replicas) if replicas < 0 => Err(InvalidSpec::new(
            "spec.replicas",
            format!("must not be negative, got {}", replicas),
        )),
        _ => Ok(()),
    }
}
