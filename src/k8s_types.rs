use std::fmt::{self, Display};

/// A basic description of a Kubernetes resource type. We use `&'static str` for all of these so that it's easy
/// to pass references around without copying. The types that the rsync source controller works with are all
/// declared as statics in this module, for example:
///
/// ```no_run
/// use rsync_source::k8s_types::K8sType;
///
/// #[allow(non_upper_case_globals)]
/// pub static MyCrd: &K8sType = &K8sType {
///     api_version: "example.com/v1",
///     kind: "MyCrd",
///     plural_kind: "mycrds"
/// };
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct K8sType {
    pub api_version: &'static str,
    pub kind: &'static str,
    pub plural_kind: &'static str,
}

impl Display for K8sType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.api_version, self.plural_kind)
    }
}

macro_rules! k8s_type {
    ($ref_name:ident, $api_version:expr, $kind:expr, $plural_kind:expr) => {
        #[allow(non_upper_case_globals)]
        pub static $ref_name: &crate::k8s_types::K8sType = &crate::k8s_types::K8sType {
            api_version: $api_version,
            kind: $kind,
            plural_kind: $plural_kind,
        };
    };
}

macro_rules! def_types {
    (@nogroupmod, $group:expr, [
        $( $version:ident => [
            $( $kind:ident ~ $plural_kind:ident ),*
        ]),*
    ]) => {
        $(
            pub mod $version {
                $(
                    k8s_type!($kind, concat!($group, "/", stringify!($version)), stringify!($kind), stringify!($plural_kind));
                )*
            }
        )*
    };
    ($group:ident => $rem:tt ) => {
        pub mod $group {
            def_types!{@nogroupmod, stringify!($group), $rem }
        }
    };
    (@core => [
        $( $version:ident => [
            $( $kind:ident ~ $plural_kind:ident ),*
        ]),*
    ]) => {
        pub mod core {
            $(pub mod $version {
                $(
                    k8s_type!($kind, stringify!($version), stringify!($kind), stringify!($plural_kind));
                )*
            })*
        }
    }
}

def_types! {
    @core => [
        v1 => [
            ConfigMap ~ configmaps,
            Service ~ services
        ]
    ]
}

def_types! {
    apps => [
        v1 => [
            Deployment ~ deployments
        ]
    ]
}

/// The `RsyncSource` custom resource, which is the parent of all the generated children
pub mod demo_io {
    def_types! {
        @nogroupmod, "demo.io", [
            v1 => [
                RsyncSource ~ rsyncsources
            ]
        ]
    }
}
