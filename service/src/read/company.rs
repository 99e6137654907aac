//! [`Company`]-related read definitions.

use derive_more::Deref;

#[cfg(doc)]
use crate::domain::{Company, User};

/// Indicator whether a [`Company`] is referenced by any [`User`].
#[derive(Clone, Copy, Debug, Deref, Eq, Hash, PartialEq)]
pub struct HasMembers(pub bool);

impl PartialEq<bool> for HasMembers {
    fn eq(&self, other: &bool) -> bool {
        self.0 == *other
    }
}

pub mod list {
    //! [`Company`]s list definitions.

    use common::define_pagination;

    use crate::domain::Company;

    define_pagination!(Node, Filter);

    /// Node of a [`Page`].
    pub type Node = Company;

    /// Filter for [`Selector`].
    ///
    /// Every provided part is matched case-insensitively as a substring, and
    /// all of them must match.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// Part of the [`Company`] name.
        pub name: Option<String>,

        /// Part of the [`Company`] address.
        pub address: Option<String>,

        /// Part of the [`Company`] phone number.
        pub phone_number: Option<String>,
    }

    impl Filter {
        /// Checks whether the provided [`Company`] matches this [`Filter`].
        #[must_use]
        pub fn matches(&self, company: &Company) -> bool {
            fn contains(haystack: &str, needle: Option<&String>) -> bool {
                needle.map_or(true, |n| {
                    haystack.to_lowercase().contains(&n.to_lowercase())
                })
            }

            contains(company.name.as_ref(), self.name.as_ref())
                && contains(company.address.as_ref(), self.address.as_ref())
                && contains(
                    company.phone_number.as_ref(),
                    self.phone_number.as_ref(),
                )
        }
    }

    #[cfg(test)]
    mod spec {
        use crate::domain::{company, user, Company};

        use super::Filter;

        fn company() -> Company {
            Company {
                id: company::Id::new(),
                name: company::Name::new("Sunny Homes").unwrap(),
                address: company::Address::new("Bulevar 12, Novi Sad")
                    .unwrap(),
                phone_number: user::Phone::new("021 555 333").unwrap(),
            }
        }

        #[test]
        fn empty_filter_matches_everything() {
            assert!(Filter::default().matches(&company()));
        }

        #[test]
        fn matches_case_insensitive_substrings() {
            let filter = Filter {
                name: Some("sunny".into()),
                address: Some("NOVI".into()),
                phone_number: Some("555".into()),
            };
            assert!(filter.matches(&company()));
        }

        #[test]
        fn requires_all_parts_to_match() {
            let filter = Filter {
                name: Some("sunny".into()),
                address: Some("Beograd".into()),
                phone_number: None,
            };
            assert!(!filter.matches(&company()));
        }
    }
}
