use std::cmp::Ordering;

use rust_decimal::Decimal;
use serde::Serialize;

/// Dimension a dashboard aggregate is grouped by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupBy {
    Country,
    OrgUnit,
    Theme,
}

/// One bucket of a dashboard aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupSummary {
    /// `None` collects projects without an org unit or theme.
    pub group_key: Option<String>,
    pub count: i64,
    /// Sum of PAG values. `None` when no project in the group has one.
    pub total_value: Option<Decimal>,
}

impl GroupSummary {
    /// Dashboard ordering: most projects first, then by key with the empty group last.
    pub fn dashboard_order(a: &Self, b: &Self) -> Ordering {
        b.count
            .cmp(&a.count)
            .then_with(|| match (&a.group_key, &b.group_key) {
                (Some(a), Some(b)) => a.cmp(b),
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub by_country: Vec<GroupSummary>,
    pub by_org_unit: Vec<GroupSummary>,
    pub by_theme: Vec<GroupSummary>,
}
