use crate::config::OperatorConfig;
use crate::k8s_types::{self, K8sType};
use crate::resource::{InvalidResourceError, K8sResource, ObjectIdRef};
use crate::rsync_source::{RsyncSource, RsyncSourceStatus};
use crate::template::{TemplateConfig, TemplateIdentity};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use std::convert::TryFrom;

/// The type passed to the Handler that provides a snapshot view of the parent Custom Resource and all of the children
/// as they exist in the Kubernetes cluster. The handler will be passed an immutable reference to this struct.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SyncRequest {
    /// The parent custom resource instance
    pub parent: K8sResource,
    /// The entire set of children related to this parent instance, as they exist in the cluster at the time.
    pub children: Vec<K8sResource>,
}

impl SyncRequest {
    /// Deserialize the parent resource as the given type
    pub fn deserialize_parent<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.parent.clone().into_value())
    }

    /// Returns a view of just the children of this request, which is useful for determining the current status
    pub fn children(&self) -> RequestChildren {
        RequestChildren(self)
    }

    /// Finds a child resource with the given type and id. An empty namespace matches a child in any namespace,
    /// since children of a parent without a namespace get placed into one by the api server.
    pub fn raw_child<'a, 'b>(
        &'a self,
        k8s_type: &'b K8sType,
        namespace: &'b str,
        name: &'b str,
    ) -> Option<&'a K8sResource> {
        let id = ObjectIdRef::new(namespace, name);
        self.children.iter().find(move |child| {
            if !child.is_type(k8s_type) {
                return false;
            }
            if namespace.is_empty() {
                child.name() == name
            } else {
                child.get_object_id() == id
            }
        })
    }
}

/// A view of raw `K8sResource` children that share the same apiVersion and kind
pub struct RawView<'a> {
    req: &'a SyncRequest,
    k8s_type: &'a K8sType,
}

impl<'a> RawView<'a> {
    pub fn get(&self, namespace: &str, name: &str) -> Option<&'a K8sResource> {
        self.req.raw_child(self.k8s_type, namespace, name)
    }
}

/// A view of all of the children from a `SyncRequest`. This represents a snapshot of the known state of
/// the children, and the parent status should be computed from this view rather than from the _desired_ children.
pub struct RequestChildren<'a>(&'a SyncRequest);

impl<'a> RequestChildren<'a> {
    pub fn of_type_raw(&self, k8s_type: &'a K8sType) -> RawView<'a> {
        RawView {
            req: self.0,
            k8s_type,
        }
    }
}

/// The return value from a handler, which has the status to set for the parent, as well as the entire set
/// of desired child resources.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SyncResponse {
    pub status: Value,
    pub children: Vec<Value>,
}

impl SyncResponse {
    pub fn new(status: Value) -> SyncResponse {
        SyncResponse {
            status,
            children: Vec::new(),
        }
    }

    /// Attempts to construct a `SyncResponse` by serializing the given object to use for the parent status.
    pub fn from_status<S: Serialize>(status: S) -> Result<SyncResponse, serde_json::Error> {
        serde_json::to_value(status).map(SyncResponse::new)
    }
}

/// The response returned from a finalize function, which may only modify the parent status.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct FinalizeResponse {
    pub status: Value,
    pub finalized: bool,
}

/// Trait for errors that can be returned from a Handler function. This just enforces the
/// bounds we need in order to convert the errors into trait objects and send them between threads.
pub trait HandlerError: std::error::Error + Send + 'static {}
impl<T> HandlerError for T where T: std::error::Error + Send + 'static {}

/// An error that can be returned from a `Handler` function
pub type Error = Box<dyn HandlerError>;

impl<T> From<T> for Error
where
    T: HandlerError,
{
    fn from(e: T) -> Error {
        Box::new(e)
    }
}

/// The trait that a reconciler calls into in order to determine the desired children of a parent.
pub trait Handler: Send + Sync + 'static {
    /// Returns the desired child resources and the status to be set on the parent. If this returns an
    /// `Error`, then neither the status or any child resources should be updated.
    fn sync(&self, request: &SyncRequest) -> Result<SyncResponse, Error>;

    /// Invoked when the parent resource starts being deleted. The default implementation keeps the
    /// current status and reports that finalization is complete.
    fn finalize(&self, request: &SyncRequest) -> Result<FinalizeResponse, Error> {
        Ok(FinalizeResponse {
            status: request.parent.status().cloned().unwrap_or(Value::Null),
            finalized: true,
        })
    }
}

/// Handles `RsyncSource` parents by generating a Deployment, ConfigMap and Service for each one
#[derive(Debug, Clone)]
pub struct RsyncSourceHandler {
    config: OperatorConfig,
}

impl Default for RsyncSourceHandler {
    fn default() -> RsyncSourceHandler {
        RsyncSourceHandler::new(OperatorConfig::rsync_source())
    }
}

impl RsyncSourceHandler {
    pub fn new(config: OperatorConfig) -> RsyncSourceHandler {
        RsyncSourceHandler { config }
    }

    pub fn config(&self) -> &OperatorConfig {
        &self.config
    }

    fn template_config(&self, source: &RsyncSource) -> Result<TemplateConfig, Error> {
        let identity = TemplateIdentity::of(source);
        TemplateConfig::new(identity, source.spec.clone(), self.config.labels.clone()).map_err(
            |err| {
                log::warn!(
                    "Refusing to generate children for {}: {}",
                    source.metadata.name,
                    err
                );
                Error::from(err)
            },
        )
    }
}

impl Handler for RsyncSourceHandler {
    fn sync(&self, request: &SyncRequest) -> Result<SyncResponse, Error> {
        log::info!("Got sync request for parent: {}", request.parent.get_object_id());
        if !request.parent.is_type(self.config.parent) {
            return Err(Error::from(InvalidResourceError::new(
                "parent is not an RsyncSource",
                request.parent.clone().into_value(),
            )));
        }
        let source: RsyncSource = request.deserialize_parent()?;
        let template_config = self.template_config(&source)?;
        let template = template_config.build();

        let status = determine_status(request, &source);
        let mut response = SyncResponse::from_status(status)?;
        response.children = template.children()?;
        Ok(response)
    }
}

const DEFAULT_REPLICAS: i32 = 1;

/// Computes the parent status from the Deployment as it currently exists in the cluster
pub fn determine_status(request: &SyncRequest, source: &RsyncSource) -> RsyncSourceStatus {
    let desired = source.spec.replicas.unwrap_or(DEFAULT_REPLICAS);
    let deployment = request
        .children()
        .of_type_raw(k8s_types::apps::v1::Deployment)
        .get(
            source.metadata.namespace.as_str(),
            source.metadata.name.as_str(),
        );

    let deployment = match deployment {
        Some(d) => d,
        None => {
            return RsyncSourceStatus {
                ready_replicas: 0,
                message: "Waiting for Deployment to be created".to_owned(),
            }
        }
    };

    let ready_replicas = deployment
        .pointer("/status/readyReplicas")
        .and_then(Value::as_i64)
        .map(|ready| i32::try_from(ready.max(0)).unwrap_or(i32::MAX))
        .unwrap_or(0);

    let message = if ready_replicas >= desired {
        "Ready".to_owned()
    } else {
        format!(
            "Waiting for {}/{} replicas to be ready",
            ready_replicas, desired
        )
    };
    RsyncSourceStatus {
        ready_replicas,
        message,
    }
}
