//! Parent record kinds and their line-item wiring.
//!
//! The wizard runs against one parent record (an opportunity, quote or order).
//! The parent kind decides which child record type gets created, which field
//! links a child back to its parent, and how the required price field is named
//! in user-facing messages.

use serde::{Deserialize, Serialize};

use crate::error::DomainError;

/// Kind of the parent record the wizard is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParentKind {
    Opportunity,
    Quote,
    Order,
}

impl ParentKind {
    /// Parse the object name reported by the catalog collaborator.
    pub fn parse(name: &str) -> Result<Self, DomainError> {
        match name {
            "Opportunity" => Ok(ParentKind::Opportunity),
            "Quote" => Ok(ParentKind::Quote),
            "Order" => Ok(ParentKind::Order),
            other => Err(DomainError::validation(format!(
                "unsupported parent object: {other}"
            ))),
        }
    }

    /// Object name of the parent record itself.
    pub fn object_name(&self) -> &'static str {
        match self {
            ParentKind::Opportunity => "Opportunity",
            ParentKind::Quote => "Quote",
            ParentKind::Order => "Order",
        }
    }

    /// Child record type created per selection entry.
    pub fn child_record_type(&self) -> &'static str {
        match self {
            ParentKind::Opportunity => "OpportunityLineItem",
            ParentKind::Quote => "QuoteLineItem",
            ParentKind::Order => "OrderItem",
        }
    }

    /// Field on the child record that links it back to the parent.
    pub fn linkage_field(&self) -> &'static str {
        match self {
            ParentKind::Opportunity => "OpportunityId",
            ParentKind::Quote => "QuoteId",
            ParentKind::Order => "OrderId",
        }
    }

    /// User-facing label of the required price field.
    ///
    /// The stored field is `UnitPrice` for every kind; only the label differs.
    pub fn price_field_label(&self) -> &'static str {
        match self {
            ParentKind::Opportunity | ParentKind::Quote => "Sales Price",
            ParentKind::Order => "Unit Price",
        }
    }
}

impl core::fmt::Display for ParentKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.object_name())
    }
}
