//! CustomResourceDefinitions of the Traefik 2 Kubernetes CRD provider.
use kubragen::data::Data;

pub const CRD_API_VERSION: &str = "apiextensions.k8s.io/v1beta1";
pub const CRD_GROUP: &str = "traefik.containo.us";
pub const CRD_VERSION: &str = "v1alpha1";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraefikCrd {
    /// `metadata.name`, also used as the build item name.
    pub name: &'static str,
    pub kind: &'static str,
    pub plural: &'static str,
    pub singular: &'static str,
}

pub const TRAEFIK_CRDS: &[TraefikCrd] = &[
    TraefikCrd {
        name: "ingressroutes.traefik.containo.us",
        kind: "IngressRoute",
        plural: "ingressroutes",
        singular: "ingressroute",
    },
    TraefikCrd {
        name: "middlewares.traefik.containo.us",
        kind: "Middleware",
        plural: "middlewares",
        singular: "middleware",
    },
    TraefikCrd {
        name: "ingressroutetcps.traefik.containo.us",
        kind: "IngressRouteTCP",
        plural: "ingressroutetcps",
        singular: "ingressroutetcp",
    },
    TraefikCrd {
        name: "ingressrouteudps.traefik.containo.us",
        kind: "IngressRouteUDP",
        plural: "ingressrouteudps",
        singular: "ingressrouteudp",
    },
    TraefikCrd {
        name: "tlsoptions.traefik.containo.us",
        kind: "TLSOption",
        plural: "tlsoptions",
        singular: "tlsoption",
    },
    TraefikCrd {
        name: "tlsstores.traefik.containo.us",
        kind: "TLSStore",
        plural: "tlsstores",
        singular: "tlsstore",
    },
    TraefikCrd {
        name: "traefikservices.traefik.containo.us",
        kind: "TraefikService",
        plural: "traefikservices",
        singular: "traefikservice",
    },
];

impl TraefikCrd {
    /// The CustomResourceDefinition object.
    ///
    /// `v1beta1` is kept, as it is what the Traefik 2.2 CRD provider ships
    /// with; k8s-openapi only models `v1`, so the object is assembled as data.
    pub fn to_data(&self) -> Data {
        Data::from_iter([
            ("apiVersion", Data::from(CRD_API_VERSION)),
            ("kind", Data::from("CustomResourceDefinition")),
            ("metadata", Data::from_iter([("name", self.name)])),
            (
                "spec",
                Data::from_iter([
                    ("group", Data::from(CRD_GROUP)),
                    ("version", Data::from(CRD_VERSION)),
                    (
                        "names",
                        Data::from_iter([
                            ("kind", self.kind),
                            ("plural", self.plural),
                            ("singular", self.singular),
                        ]),
                    ),
                    ("scope", Data::from("Namespaced")),
                ]),
            ),
        ])
    }
}
