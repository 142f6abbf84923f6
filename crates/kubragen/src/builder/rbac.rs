use k8s_openapi::api::{
    core::v1::ServiceAccount,
    rbac::v1::{ClusterRole, ClusterRoleBinding, PolicyRule, RoleRef, Subject},
};

use crate::builder::meta::ObjectMetaBuilder;

const RBAC_API_GROUP: &str = "rbac.authorization.k8s.io";

/// Builds a [`PolicyRule`] granting `verbs` on `resources` of `api_groups`.
pub fn policy_rule(api_groups: &[&str], resources: &[&str], verbs: &[&str]) -> PolicyRule {
    PolicyRule {
        api_groups: Some(to_strings(api_groups)),
        resources: Some(to_strings(resources)),
        verbs: to_strings(verbs),
        ..PolicyRule::default()
    }
}

fn to_strings(values: &[&str]) -> Vec<String> {
    values.iter().map(ToString::to_string).collect()
}

pub fn build_service_account(name: &str, namespace: &str) -> ServiceAccount {
    ServiceAccount {
        metadata: ObjectMetaBuilder::new()
            .name(name)
            .namespace(namespace)
            .build(),
        ..ServiceAccount::default()
    }
}

pub fn build_cluster_role(name: &str, rules: Vec<PolicyRule>) -> ClusterRole {
    ClusterRole {
        metadata: ObjectMetaBuilder::new().name(name).build(),
        rules: Some(rules),
        ..ClusterRole::default()
    }
}

/// Binds the ClusterRole `role_name` to the ServiceAccount
/// `service_account_name` in `service_account_namespace`.
///
/// Both names are taken as given; callers pass the names of objects they
/// know exist.
pub fn build_cluster_role_binding(
    name: &str,
    role_name: &str,
    service_account_name: &str,
    service_account_namespace: &str,
) -> ClusterRoleBinding {
    ClusterRoleBinding {
        metadata: ObjectMetaBuilder::new().name(name).build(),
        role_ref: RoleRef {
            api_group: RBAC_API_GROUP.to_owned(),
            kind: "ClusterRole".to_owned(),
            name: role_name.to_owned(),
        },
        subjects: Some(vec![Subject {
            kind: "ServiceAccount".to_owned(),
            name: service_account_name.to_owned(),
            namespace: Some(service_account_namespace.to_owned()),
            ..Subject::default()
        }]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NAMESPACE: &str = "myns";

    #[test]
    fn build() {
        let service_account = build_service_account("mytraefik2", NAMESPACE);
        assert_eq!(
            service_account.metadata.name.as_deref(),
            Some("mytraefik2"),
            "service account does not match"
        );
        assert_eq!(
            service_account.metadata.namespace.as_deref(),
            Some(NAMESPACE),
            "namespace does not match"
        );

        let binding = build_cluster_role_binding("binding", "role", "mytraefik2", NAMESPACE);
        assert_eq!(binding.role_ref.name, "role", "role_ref does not match");
        assert_eq!(binding.role_ref.api_group, RBAC_API_GROUP);
        assert!(binding.metadata.namespace.is_none());
        let subject = &binding.subjects.unwrap()[0];
        assert_eq!(subject.name, "mytraefik2");
        assert_eq!(subject.namespace.as_deref(), Some(NAMESPACE));
    }

    #[test]
    fn rule() {
        let rule = policy_rule(&["extensions"], &["ingresses/status"], &["update"]);
        assert_eq!(rule.api_groups, Some(vec!["extensions".to_owned()]));
        assert_eq!(rule.resources, Some(vec!["ingresses/status".to_owned()]));
        assert_eq!(rule.verbs, vec!["update".to_owned()]);
        assert!(rule.resource_names.is_none());
    }
}
