//! Generates the child resources that run an rsync daemon for each instance of the `RsyncSource`
//! Custom Resource: a Deployment running the daemon, a ConfigMap holding its `rsyncd.conf`, and a
//! Service exposing port 873. All three share a name and a set of labels, so the Service always
//! selects exactly the pods of the Deployment generated for the same parent.
//!
//! Building a template is pure. Applying the children to a cluster is up to whichever reconciler
//! calls into the `RsyncSourceHandler`.
//!
//! ```no_run
//! use rsync_source::prelude::*;
//! use rsync_source::serde_json::json;
//!
//! let source: RsyncSource = rsync_source::serde_json::from_value(json!({
//!     "metadata": { "namespace": "ns1", "name": "demo" },
//!     "spec": {
//!         "image": "rsync:1.0",
//!         "replicas": 2,
//!         "hostName": "node-a",
//!         "password": "secret",
//!         "volume": {
//!             "name": "data-vol",
//!             "hostPath": { "path": "/mnt/data" }
//!         }
//!     }
//! })).unwrap();
//!
//! let template = build_template(&source.spec, &TemplateIdentity::of(&source)).unwrap();
//! println!("{}", template.to_manifest().unwrap());
//! ```

#[macro_use]
extern crate serde_derive;

pub mod config;
pub mod error;
pub mod handler;
pub mod k8s_types;
pub mod resource;
pub mod rsync_source;
pub mod template;

pub use k8s_openapi;
pub use serde;
pub use serde_json;
pub use serde_yaml;

pub mod prelude {
    pub use crate::config::{LabelConfig, OperatorConfig};
    pub use crate::error::InvalidSpec;
    pub use crate::handler::{
        FinalizeResponse, Handler, RsyncSourceHandler, SyncRequest, SyncResponse,
    };
    pub use crate::k8s_types::{self, K8sType};
    pub use crate::resource::K8sResource;
    pub use crate::rsync_source::{RsyncSource, RsyncSourceSpec, RsyncSourceStatus};
    pub use crate::template::{build_template, RsyncTemplate, TemplateConfig, TemplateIdentity};
    pub use serde::{Deserialize, Serialize};
}
