// ABOUTME: Deterministic cloud resource names derived from the project name.
// ABOUTME: Create and cleanup find each other's resources purely by these names.

use crate::types::ProjectName;

/// Names of the per-project cloud resources.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceNames {
    pub security_group: String,
    pub network: String,
    pub subnet: String,
    pub router: String,
    pub router_port: String,
    pub keypair: String,
}

impl ResourceNames {
    pub fn for_project(project: &ProjectName) -> Self {
        let p = project.as_str();
        Self {
            security_group: format!("{p}_secgroup"),
            network: format!("{p}_network"),
            subnet: format!("{p}_network_subnet"),
            router: format!("{p}_network_router"),
            router_port: format!("{p}_network_router_port"),
            keypair: format!("{p}_ssh"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_follow_project() {
        let project = ProjectName::new("demo").unwrap();
        let names = ResourceNames::for_project(&project);

        assert_eq!(names.security_group, "demo_secgroup");
        assert_eq!(names.network, "demo_network");
        assert_eq!(names.subnet, "demo_network_subnet");
        assert_eq!(names.router, "demo_network_router");
        assert_eq!(names.router_port, "demo_network_router_port");
        assert_eq!(names.keypair, "demo_ssh");
    }

    #[test]
    fn names_are_stable_across_calls() {
        let project = ProjectName::new("stable").unwrap();
        assert_eq!(
            ResourceNames::for_project(&project),
            ResourceNames::for_project(&project)
        );
    }
}
