//! Sector / industry exclusion.
//!
//! Case-sensitive set membership. A snapshot with no sector or industry
//! can't match an exclusion and passes this stage.

use std::collections::BTreeSet;

use super::{ScreenRule, ScreenStage, Verdict};
use crate::domain::Snapshot;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryExclusion {
    pub sectors: BTreeSet<String>,
    pub industries: BTreeSet<String>,
}

impl CategoryExclusion {
    pub fn new(sectors: BTreeSet<String>, industries: BTreeSet<String>) -> Self {
        Self {
            sectors,
            industries,
        }
    }
}

impl ScreenRule for CategoryExclusion {
    fn name(&self) -> &str {
        "category_exclusion"
    }

    fn stage(&self) -> ScreenStage {
        ScreenStage::Categories
    }

    fn evaluate(&self, snapshot: &Snapshot) -> Verdict {
        if let Some(sector) = &snapshot.profile.sector {
            if self.sectors.contains(sector) {
                return Verdict::ExcludedSector(sector.clone());
            }
        }
        if let Some(industry) = &snapshot.profile.industry {
            if self.industries.contains(industry) {
                return Verdict::ExcludedIndustry(industry.clone());
            }
        }
        Verdict::Passed
    }
}
