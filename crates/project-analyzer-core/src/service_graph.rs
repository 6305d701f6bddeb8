//! Cross-service relationships.
//!
//! A [`ServiceMap`] maps URL fragments (service names, endpoint paths and
//! their host-prefixed variants) to the microservice that owns them. Outbound
//! calls of every microservice are then resolved against the map to produce
//! [`Relationship`] edges.

use crate::models::{ProjectRecord, Relationship, RelationshipType};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use tracing::debug;

static PATH_PARAMETER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[<{][^>}]+[>}]").unwrap());

const LOOPBACK_HOSTS: &[&str] = &["localhost", "127.0.0.1"];

/// Insertion-ordered lookup from URL fragments to service names.
///
/// Re-inserting a key moves its value to the new service but keeps the key's
/// original position, so lookups that scan keys in order stay stable.
#[derive(Debug, Clone, Default)]
pub struct ServiceMap {
    entries: Vec<(String, String)>,
    index: HashMap<String, usize>,
}

impl ServiceMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a key. Empty keys are ignored.
    pub fn insert(&mut self, key: impl Into<String>, service: &str) {
        let key = key.into();
        if key.is_empty() {
            return;
        }
        match self.index.get(&key) {
            Some(&position) => self.entries[position].1 = service.to_string(),
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, service.to_string()));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.index
            .get(key)
            .map(|&position| self.entries[position].1.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys and services in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, service)| (key.as_str(), service.as_str()))
    }

    /// Builds the map over the detected microservices among `projects`, in
    /// the order given.
    ///
    /// For every endpoint, with path parameters (`{id}`, `<id>`) replaced by
    /// `*`, the following keys are registered: `{name}{path}`,
    /// `{lowercase name}{path}`, `{path}`, the path without its leading `/`,
    /// and `{host}/{name}{path}` plus `{host}{path}` for each loopback host.
    /// Finally the service name and its lowercase form are registered.
    pub fn build(projects: &[ProjectRecord]) -> Self {
        let mut map = Self::new();

        for project in projects.iter().filter(|p| p.is_microservice()) {
            let name = project.name.as_str();
            let lower = name.to_lowercase();
            let endpoints = project
                .microservice
                .as_ref()
                .map(|profile| profile.endpoints.as_slice())
                .unwrap_or_default();

            for endpoint in endpoints {
                if endpoint.path.is_empty() {
                    continue;
                }
                let path = PATH_PARAMETER.replace_all(&endpoint.path, "*");

                map.insert(format!("{}{}", name, path), name);
                map.insert(format!("{}{}", lower, path), name);
                map.insert(path.to_string(), name);
                map.insert(path.strip_prefix('/').unwrap_or(&path).to_string(), name);
                for host in LOOPBACK_HOSTS {
                    map.insert(format!("{}/{}{}", host, name, path), name);
                    map.insert(format!("{}{}", host, path), name);
                }
            }

            map.insert(name, name);
            map.insert(lower, name);
        }

        map
    }

    /// Resolves a call URL to a service name.
    ///
    /// Strategies are tried in order and the first hit wins:
    ///
    /// 1. any key contained in the lowercased URL, scanning keys in order
    /// 2. a `/`-separated URL segment, or a hyphen/underscore variant of it,
    ///    equal to a key
    /// 3. the URL host, or one of its dot-separated labels, equal to a key
    pub fn resolve(&self, url: &str) -> Option<&str> {
        let lower = url.to_lowercase();

        if let Some((_, service)) = self.iter().find(|(key, _)| lower.contains(key)) {
            return Some(service);
        }

        for part in lower.split('/') {
            let variants = [
                part.to_string(),
                part.replace('-', ""),
                part.replace('_', ""),
                part.replace('-', "_"),
                part.replace('_', "-"),
            ];
            if let Some(service) = variants.iter().find_map(|variant| self.get(variant)) {
                return Some(service);
            }
        }

        if let Some((_, rest)) = url.split_once("://") {
            let host = rest.split('/').next().unwrap_or("");
            let host = host.split(':').next().unwrap_or("");
            if let Some(service) = self.get(host) {
                return Some(service);
            }
            return host.split('.').find_map(|label| self.get(label));
        }

        None
    }
}

/// Derives the edge type from the caller's communication style, then from
/// the URL itself.
pub fn relationship_type(primary_communication: &str, url: &str) -> RelationshipType {
    if let Some(kind) = RelationshipType::from_communication(primary_communication) {
        return kind;
    }

    let lower = url.to_lowercase();
    if lower.contains("graphql") {
        RelationshipType::GraphQl
    } else if lower.contains("grpc://") {
        RelationshipType::Grpc
    } else if lower.contains("soap") || lower.contains("wsdl") {
        RelationshipType::Soap
    } else if lower.contains("ws://") || lower.contains("wss://") {
        RelationshipType::WebSocket
    } else if lower.starts_with("http://") || lower.starts_with("https://") {
        RelationshipType::Rest
    } else {
        RelationshipType::Http
    }
}

/// Resolves every outbound call of every detected microservice into
/// relationships.
///
/// Self-references are dropped, duplicates on (source, target, type) keep the
/// first call seen, and the result is sorted by source then target.
pub fn resolve_relationships(projects: &[ProjectRecord]) -> Vec<Relationship> {
    let map = ServiceMap::build(projects);
    let mut seen: HashSet<(String, String, RelationshipType)> = HashSet::new();
    let mut relationships = Vec::new();

    for project in projects.iter().filter(|p| p.is_microservice()) {
        let Some(profile) = project.microservice.as_ref() else {
            continue;
        };

        for call in &profile.calls {
            let Some(target) = map.resolve(&call.url) else {
                continue;
            };
            if target == project.name {
                continue;
            }

            let kind = relationship_type(&profile.primary_communication, &call.url);
            if !seen.insert((project.name.clone(), target.to_string(), kind)) {
                continue;
            }

            debug!(caller = %project.name, callee = %target, kind = %kind, url = %call.url, "Resolved service call");
            relationships.push(Relationship {
                source: project.name.clone(),
                target: target.to_string(),
                relationship_type: kind,
                url: call.url.clone(),
                file: call.file.clone(),
            });
        }
    }

    relationships.sort_by(|a, b| {
        (&a.source, &a.target, a.relationship_type).cmp(&(&b.source, &b.target, b.relationship_type))
    });
    relationships
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extraction::endpoint_kind;
    use crate::models::{HttpMethod, MicroserviceProfile, ServiceCall, ServiceEndpoint};
    use proptest::prelude::*;

    fn service(name: &str, endpoints: &[&str], calls: &[&str], communication: &str) -> ProjectRecord {
        let mut project = ProjectRecord::new(name, format!("/srv/{}", name));
        project.microservice = Some(MicroserviceProfile {
            is_microservice: true,
            primary_communication: communication.to_string(),
            endpoints: endpoints
                .iter()
                .map(|path| ServiceEndpoint {
                    path: path.to_string(),
                    method: HttpMethod::Get,
                    file: "app.py".to_string(),
                    framework: "flask".to_string(),
                    kind: endpoint_kind(path),
                })
                .collect(),
            calls: calls
                .iter()
                .map(|url| ServiceCall {
                    url: url.to_string(),
                    file: "client.py".to_string(),
                    family: "python".to_string(),
                })
                .collect(),
            ..Default::default()
        });
        project
    }

    #[test]
    fn test_service_map_keys() {
        let orders = service("Orders", &["/orders/{id}"], &[], "rest_api");
        let map = ServiceMap::build(&[orders]);

        assert_eq!(map.get("Orders/orders/*"), Some("Orders"));
        assert_eq!(map.get("orders/orders/*"), Some("Orders"));
        assert_eq!(map.get("/orders/*"), Some("Orders"));
        assert_eq!(map.get("orders/*"), Some("Orders"));
        assert_eq!(map.get("localhost/Orders/orders/*"), Some("Orders"));
        assert_eq!(map.get("127.0.0.1/orders/*"), Some("Orders"));
        assert_eq!(map.get("orders"), Some("Orders"));
    }

    #[test]
    fn test_reinsert_keeps_position() {
        let mut map = ServiceMap::new();
        map.insert("/a", "one");
        map.insert("/b", "one");
        map.insert("/a", "two");
        map.insert("", "three");

        let entries: Vec<_> = map.iter().collect();
        assert_eq!(entries, vec![("/a", "two"), ("/b", "one")]);
    }

    #[test]
    fn test_non_microservices_not_mapped() {
        let mut library = service("utils", &["/x"], &[], "unknown");
        if let Some(profile) = library.microservice.as_mut() {
            profile.is_microservice = false;
        }
        assert!(ServiceMap::build(&[library]).is_empty());
    }

    #[test]
    fn test_resolve_by_segment_variant() {
        let mut map = ServiceMap::new();
        map.insert("user_service", "user_service");
        assert_eq!(map.resolve("http://gw:8080/user-service/v1/me"), Some("user_service"));
    }

    #[test]
    fn test_resolve_by_host_label() {
        let mut map = ServiceMap::new();
        map.insert("billing", "billing");
        assert_eq!(map.resolve("http://BILLING.internal:9000/charge"), Some("billing"));
        assert_eq!(map.resolve("http://unknown.internal/charge"), None);
    }

    #[test]
    fn test_relationship_type_fallbacks() {
        assert_eq!(relationship_type("grpc", "http://x"), RelationshipType::Grpc);
        assert_eq!(relationship_type("unknown", "http://x/graphql"), RelationshipType::GraphQl);
        assert_eq!(relationship_type("unknown", "grpc://x/y"), RelationshipType::Grpc);
        assert_eq!(relationship_type("unknown", "http://x/service.wsdl"), RelationshipType::Soap);
        assert_eq!(relationship_type("unknown", "wss://x/feed"), RelationshipType::WebSocket);
        assert_eq!(relationship_type("unknown", "https://x/y"), RelationshipType::Rest);
        assert_eq!(relationship_type("unknown", "/api/users"), RelationshipType::Http);
    }

    #[test]
    fn test_relationship_deduplicated() {
        let checkout = service(
            "checkout",
            &[],
            &[
                "http://order-service/api/orders",
                "http://order-service/api/orders?page=2",
            ],
            "rest_api",
        );
        let orders = service("order-service", &["/api/orders"], &[], "rest_api");

        let relationships = resolve_relationships(&[checkout, orders]);
        assert_eq!(relationships.len(), 1);
        assert_eq!(relationships[0].source, "checkout");
        assert_eq!(relationships[0].target, "order-service");
        assert_eq!(relationships[0].relationship_type, RelationshipType::Rest);
        assert_eq!(relationships[0].url, "http://order-service/api/orders");
    }

    #[test]
    fn test_self_calls_dropped() {
        let orders = service(
            "orders",
            &["/api/orders"],
            &["http://localhost:5000/api/orders"],
            "rest_api",
        );
        assert!(resolve_relationships(&[orders]).is_empty());
    }

    proptest! {
        #[test]
        fn prop_relationships_have_no_self_loops_or_duplicates(
            names in prop::collection::btree_set("[a-z]{2,8}", 1..5),
            paths in prop::collection::vec("/[a-z]{1,6}", 0..4),
        ) {
            let names: Vec<String> = names.into_iter().collect();
            let projects: Vec<ProjectRecord> = names
                .iter()
                .enumerate()
                .map(|(i, name)| {
                    let endpoints: Vec<&str> = paths.iter().skip(i % 2).map(String::as_str).collect();
                    let calls: Vec<String> = names
                        .iter()
                        .flat_map(|other| paths.iter().map(move |p| format!("http://{}{}", other, p)))
                        .collect();
                    let calls: Vec<&str> = calls.iter().map(String::as_str).collect();
                    service(name, &endpoints, &calls, "rest_api")
                })
                .collect();

            let first = resolve_relationships(&projects);
            let again = resolve_relationships(&projects);
            prop_assert_eq!(&first, &again);

            let mut triples = HashSet::new();
            for rel in &first {
                prop_assert_ne!(&rel.source, &rel.target);
                prop_assert!(triples.insert((rel.source.clone(), rel.target.clone(), rel.relationship_type)));
            }
        }
    }
}
