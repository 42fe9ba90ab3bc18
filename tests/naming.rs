// ABOUTME: Tests for instance naming, index rules, and CIDR allocation.
// ABOUTME: Mixes example cases with property tests over host counts and taken ranges.

use cirrus::cidr::{self, CidrError};
use cirrus::config::HostSpec;
use cirrus::hosts;
use cirrus::rules::{self, IndexSelector, InventoryValue};
use cirrus::types::ProjectName;
use proptest::prelude::*;
use std::collections::HashSet;

fn project() -> ProjectName {
    ProjectName::new("demo").unwrap()
}

mod instance_names {
    use super::*;

    #[test]
    fn single_instance_has_no_suffix() {
        let roster = hosts::expand(&project(), &[HostSpec::new("bastion", 1)]);
        assert_eq!(roster.len(), 1);
        assert_eq!(roster[0].full_name, "demo-bastion");
        assert_eq!(roster[0].inventory_name, "bastion");
        assert_eq!(roster[0].position, 0);
    }

    #[test]
    fn replicas_are_numbered_from_one() {
        let roster = hosts::expand(&project(), &[HostSpec::new("web", 3)]);
        let names: Vec<_> = roster.iter().map(|i| i.full_name.as_str()).collect();
        assert_eq!(names, ["demo-web_1", "demo-web_2", "demo-web_3"]);
        assert_eq!(roster[2].position, 2);
    }

    #[test]
    fn host_order_is_preserved() {
        let roster = hosts::expand(
            &project(),
            &[HostSpec::new("db", 2), HostSpec::new("app", 1)],
        );
        let names: Vec<_> = roster.iter().map(|i| i.inventory_name.as_str()).collect();
        assert_eq!(names, ["db_1", "db_2", "app"]);
    }

    #[test]
    fn find_by_host_and_position() {
        let roster = hosts::expand(&project(), &[HostSpec::new("web", 2)]);
        let found = hosts::find(&roster, "web", 1).unwrap();
        assert_eq!(found.full_name, "demo-web_2");
        assert!(hosts::find(&roster, "web", 2).is_none());
        assert!(hosts::find(&roster, "db", 0).is_none());
    }

    proptest! {
        /// Every expanded name is unique and the total matches the counts.
        #[test]
        fn names_unique(counts in proptest::collection::vec(1usize..6, 1..5)) {
            let specs: Vec<HostSpec> = counts
                .iter()
                .enumerate()
                .map(|(i, count)| HostSpec::new(format!("h{i}"), *count))
                .collect();
            let roster = hosts::expand(&project(), &specs);

            prop_assert_eq!(roster.len(), counts.iter().sum::<usize>());
            let unique: HashSet<_> = roster.iter().map(|i| i.full_name.clone()).collect();
            prop_assert_eq!(unique.len(), roster.len());
            prop_assert!(roster.iter().all(|i| i.full_name.starts_with("demo-")));
        }
    }
}

mod index_rules {
    use super::*;

    #[test]
    fn index_applies_only_at_its_position() {
        let payload = "x";
        assert_eq!(
            rules::resolve_inventory(IndexSelector::Index(1), 1, &payload),
            Some(InventoryValue::Payload(&payload))
        );
        assert_eq!(rules::resolve_inventory(IndexSelector::Index(1), 0, &payload), None);
    }

    #[test]
    fn counter_yields_one_based_ordinal() {
        let payload = "ignored";
        assert_eq!(
            rules::resolve_inventory(IndexSelector::Counter, 0, &payload),
            Some(InventoryValue::Ordinal("1".to_string()))
        );
        assert_eq!(
            rules::resolve_inventory(IndexSelector::Counter, 4, &payload),
            Some(InventoryValue::Ordinal("5".to_string()))
        );
    }

    #[test]
    fn all_applies_everywhere() {
        let payload = 7;
        for position in 0..4 {
            assert_eq!(
                rules::resolve_inventory(IndexSelector::All, position, &payload),
                Some(InventoryValue::Payload(&payload))
            );
        }
    }

    #[test]
    fn floating_ip_targets_per_selector() {
        assert_eq!(rules::floating_ip_targets(IndexSelector::All, 3), [0, 1, 2]);
        assert_eq!(rules::floating_ip_targets(IndexSelector::Counter, 2), [0, 1]);
        assert_eq!(rules::floating_ip_targets(IndexSelector::Index(2), 3), [2]);
    }

    #[test]
    fn selector_parses_from_yaml() {
        let parsed: Vec<IndexSelector> = serde_yaml::from_str("[0, all, counter, 3]").unwrap();
        assert_eq!(
            parsed,
            [
                IndexSelector::Index(0),
                IndexSelector::All,
                IndexSelector::Counter,
                IndexSelector::Index(3)
            ]
        );
        assert!(serde_yaml::from_str::<IndexSelector>("every").is_err());
    }
}

mod cidr_allocation {
    use super::*;

    #[test]
    fn first_cidr_starts_at_one() {
        let taken: [&str; 0] = [];
        assert_eq!(
            cidr::next_free_cidr("10.X.100.0/24", &taken).unwrap(),
            "10.1.100.0/24"
        );
    }

    #[test]
    fn probing_starts_after_existing_count() {
        let taken = ["172.16.0.0/16", "192.168.0.0/24"];
        assert_eq!(
            cidr::next_free_cidr("10.X.100.0/24", &taken).unwrap(),
            "10.3.100.0/24"
        );
    }

    #[test]
    fn collisions_are_skipped() {
        let taken = ["10.2.100.0/24", "10.3.100.0/24"];
        assert_eq!(
            cidr::next_free_cidr("10.X.100.0/24", &taken).unwrap(),
            "10.4.100.0/24"
        );
    }

    #[test]
    fn invalid_template_is_an_error() {
        let taken: [&str; 0] = [];
        assert!(matches!(
            cidr::next_free_cidr("10.0.100.0/24", &taken),
            Err(CidrError::InvalidTemplate(_))
        ));
    }

    proptest! {
        /// The chosen CIDR never collides with a taken one.
        #[test]
        fn chosen_cidr_is_free(taken in proptest::collection::vec(1u8..40, 0..20)) {
            let existing: Vec<String> = taken.iter().map(|n| format!("10.{n}.100.0/24")).collect();
            let chosen = cidr::next_free_cidr("10.X.100.0/24", &existing).unwrap();

            prop_assert!(!existing.contains(&chosen));
            prop_assert!(cidr::gateway_address(&chosen).is_ok());
        }
    }
}
