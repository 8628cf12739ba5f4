//! Drivers and their rank eligibility.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{AssociationId, BankingId, DriverId, RankId};

/// A registered driver.
///
/// `linked_ranks` is the eligibility set: a driver may only be assigned to a
/// leg whose route departs from one of these ranks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id:           DriverId,
    pub name:         String,
    pub phone:        String,
    #[serde(default)]
    pub email:        Option<String>,
    #[serde(default)]
    pub linked_ranks: BTreeSet<RankId>,
    #[serde(default)]
    pub association:  Option<AssociationId>,
    #[serde(default)]
    pub banking:      Option<BankingId>,
    #[serde(default)]
    pub version:      u64,
}

impl Driver {
    pub fn from_new(id: DriverId, new: NewDriver) -> Self {
        Self {
            id,
            name:         new.name,
            phone:        new.phone,
            email:        new.email,
            linked_ranks: BTreeSet::new(),
            association:  new.association,
            banking:      new.banking,
            version:      0,
        }
    }

    #[inline]
    pub fn is_linked_to(&self, rank: RankId) -> bool {
        self.linked_ranks.contains(&rank)
    }
}

/// Client input for driver registration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct NewDriver {
    pub name:        String,
    pub phone:       String,
    #[serde(default)]
    pub email:       Option<String>,
    #[serde(default)]
    pub association: Option<AssociationId>,
    #[serde(default)]
    pub banking:     Option<BankingId>,
}
