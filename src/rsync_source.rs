//! Typed representation of the `RsyncSource` custom resource. The schema of the CRD itself is
//! validated by the api server, so these structs only need to deserialize what's already there.
use k8s_openapi::api::core::v1::Volume;

/// An instance of the `RsyncSource` CRD, as it exists in the cluster
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct RsyncSource {
    pub metadata: Metadata,
    pub spec: RsyncSourceSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<RsyncSourceStatus>,
}

/// Only the fields of the metadata that the templates need
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
pub struct Metadata {
    pub name: String,
    #[serde(default)]
    pub namespace: String,
}

/// The desired state of the rsync daemon
#[derive(Deserialize, Serialize, Clone, Debug, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RsyncSourceSpec {
    pub image: String,

    /// Passed straight through to the Deployment. When this is `None` the api server default applies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Pins the daemon to the node with this hostname. An empty string is treated the same as `None`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host_name: Option<String>,

    /// Handed to the daemon as the plain `RSYNC_PASSWORD` environment variable
    pub password: String,

    /// The volume to serve. It's added to the pod exactly as given, and its name is used for the `/data` mount.
    pub volume: Volume,
}

impl RsyncSourceSpec {
    /// Returns the host name to pin the daemon to, if there is a non-empty one
    pub fn host_name(&self) -> Option<&str> {
        self.host_name.as_deref().filter(|host| !host.is_empty())
    }
}

#[derive(Deserialize, Serialize, Clone, Debug, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct RsyncSourceStatus {
    pub ready_replicas: i32,
    pub message: String,
}

#[cfg(test)]
mod test {
    use super::*;
    use serde_json::json;

    #[test]
    fn rsync_source_is_deserialized_from_camel_case_json() {
        let source: RsyncSource = serde_json::from_value(json!({
            "apiVersion": "demo.io/v1",
            "kind": "RsyncSource",
            "metadata": {
                "name": "demo",
                "namespace": "ns1",
                "uid": "1234",
            },
            "spec": {
                "image": "rsync:1.0",
                "replicas": 2,
                "hostName": "node-a",
                "password": "secret",
                "volume": {
                    "name": "data-vol",
                    "hostPath": {
                        "path": "/mnt/data"
                    }
                }
            }
        }))
        .unwrap();

        assert_eq!("demo", source.metadata.name);
        assert_eq!("ns1", source.metadata.namespace);
        assert_eq!(Some(2), source.spec.replicas);
        assert_eq!(Some("node-a"), source.spec.host_name());
        assert_eq!("data-vol", source.spec.volume.name);
        assert_eq!(
            "/mnt/data",
            source.spec.volume.host_path.as_ref().unwrap().path
        );
        assert!(source.status.is_none());
    }

    #[test]
    fn optional_fields_may_be_omitted() {
        let source: RsyncSource = serde_json::from_value(json!({
            "metadata": {
                "name": "demo",
            },
            "spec": {
                "image": "rsync:1.0",
                "password": "secret",
                "volume": {
                    "name": "data-vol",
                }
            }
        }))
        .unwrap();

        assert_eq!("", source.metadata.namespace);
        assert!(source.spec.replicas.is_none());
        assert!(source.spec.host_name().is_none());
    }

    #[test]
    fn empty_host_name_is_treated_as_unset() {
        let spec = RsyncSourceSpec {
            image: "rsync:1.0".to_owned(),
            replicas: None,
            host_name: Some(String::new()),
            password: "secret".to_owned(),
            volume: Volume {
                name: "data-vol".to_owned(),
                ..Default::default()
            },
        };
        assert!(spec.host_name().is_none());
    }
}
