//! Canonical field catalogue.
//!
//! The scoring logic only understands these internal field names. User
//! uploads carry arbitrary column names; a [`crate::FieldMapping`] bridges
//! the two. The catalogue is a closed enumeration so membership and
//! required/optional status are checked at compile time rather than by
//! string lookup.

use serde::{Deserialize, Serialize};

/// A canonical field the scoring pipeline understands after mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    AccountId,
    PlanTier,
    SeatsCurrent,
    ArrCurrent,
    UsageCountCurrent,
    UsageCountPrev,
    TicketsOpenedCurrent,
    TicketsOpenedPrev,
    Industry,
    CompanySize,
    MrrCurrent,
    MrrPrev,
    SubscriptionEndInCurrentPeriod,
}

/// Fields that must be mapped before scoring can run.
pub const REQUIRED_FIELDS: [Field; 8] = [
    Field::AccountId,
    Field::PlanTier,
    Field::SeatsCurrent,
    Field::ArrCurrent,
    Field::UsageCountCurrent,
    Field::UsageCountPrev,
    Field::TicketsOpenedCurrent,
    Field::TicketsOpenedPrev,
];

/// Fields that improve the feature set when present but are never fatal.
pub const OPTIONAL_FIELDS: [Field; 5] = [
    Field::Industry,
    Field::CompanySize,
    Field::MrrCurrent,
    Field::MrrPrev,
    Field::SubscriptionEndInCurrentPeriod,
];

impl Field {
    /// All catalogue fields, required first.
    pub fn all() -> impl Iterator<Item = Field> {
        REQUIRED_FIELDS.into_iter().chain(OPTIONAL_FIELDS)
    }

    /// The stable internal column name this field materializes under.
    pub fn wire_name(self) -> &'static str {
        match self {
            Field::AccountId => "account_id",
            Field::PlanTier => "plan_tier",
            Field::SeatsCurrent => "seats_current",
            Field::ArrCurrent => "arr_current",
            Field::UsageCountCurrent => "usage_count_current",
            Field::UsageCountPrev => "usage_count_prev",
            Field::TicketsOpenedCurrent => "tickets_opened_current",
            Field::TicketsOpenedPrev => "tickets_opened_prev",
            Field::Industry => "industry",
            Field::CompanySize => "company_size",
            Field::MrrCurrent => "mrr_current",
            Field::MrrPrev => "mrr_prev",
            Field::SubscriptionEndInCurrentPeriod => "subscription_end_in_current_period",
        }
    }

    /// Human-friendly label for mapping UIs and reports.
    pub fn label(self) -> &'static str {
        match self {
            Field::AccountId => "Account ID",
            Field::PlanTier => "Plan Tier",
            Field::SeatsCurrent => "Seats (Current)",
            Field::ArrCurrent => "ARR (Current)",
            Field::UsageCountCurrent => "Usage Count (Current)",
            Field::UsageCountPrev => "Usage Count (Previous)",
            Field::TicketsOpenedCurrent => "Tickets Opened (Current)",
            Field::TicketsOpenedPrev => "Tickets Opened (Previous)",
            Field::Industry => "Industry",
            Field::CompanySize => "Company Size",
            Field::MrrCurrent => "MRR (Current)",
            Field::MrrPrev => "MRR (Previous)",
            Field::SubscriptionEndInCurrentPeriod => "Subscription Ends This Period (0/1)",
        }
    }

    /// Whether the field must be mapped for scoring to proceed.
    pub fn is_required(self) -> bool {
        REQUIRED_FIELDS.contains(&self)
    }

    /// Resolve a wire name back to its catalogue entry.
    pub fn from_wire_name(name: &str) -> Option<Field> {
        Field::all().find(|field| field.wire_name() == name)
    }
}

impl std::fmt::Display for Field {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}
