use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use textileflow_core::{BrokerId, CustomerId, DomainError, DomainResult, Entity, VendorId};

/// Which side of the trade a party sits on.
///
/// The kind fixes the balance sign convention:
/// - vendor balance is **negative** when the business owes the vendor;
/// - customer balance is **positive** when the customer owes the business.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartyKind {
    Vendor,
    Customer,
}

impl PartyKind {
    /// Sign an unsigned outstanding amount per this party's convention.
    pub fn signed(self, outstanding: Decimal) -> Decimal {
        match self {
            PartyKind::Vendor => -outstanding,
            PartyKind::Customer => outstanding,
        }
    }

    /// Recover the unsigned outstanding amount from a signed balance.
    ///
    /// Returns zero when the balance points the other way (an advance or
    /// overpayment).
    pub fn outstanding(self, signed_balance: Decimal) -> Decimal {
        let unsigned = self.signed(signed_balance);
        if unsigned.is_sign_positive() {
            unsigned
        } else {
            Decimal::ZERO
        }
    }
}

/// Reference to either side of a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "lowercase")]
pub enum PartyRef {
    Vendor(VendorId),
    Customer(CustomerId),
}

impl PartyRef {
    pub fn kind(&self) -> PartyKind {
        match self {
            PartyRef::Vendor(_) => PartyKind::Vendor,
            PartyRef::Customer(_) => PartyKind::Customer,
        }
    }
}

/// Supplier of fabric lots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vendor {
    pub id: VendorId,
    pub name: String,
    pub contact: String,
    pub address: Option<String>,
    pub bank_details: Option<String>,
    /// Backend-maintained signed balance (negative = we owe the vendor).
    pub balance: Decimal,
}

/// Buyer of fabric.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub id: CustomerId,
    pub name: String,
    pub contact: String,
    pub address: Option<String>,
    pub short_description: Option<String>,
    /// Backend-maintained signed balance (positive = customer owes us).
    pub balance: Decimal,
}

/// Middleman who earns commission on sales.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Broker {
    pub id: BrokerId,
    pub name: String,
    pub contact: Option<String>,
    pub address: Option<String>,
}

impl Vendor {
    /// Amount the business currently owes this vendor (never negative).
    pub fn payable(&self) -> Decimal {
        PartyKind::Vendor.outstanding(self.balance)
    }
}

impl Customer {
    /// Amount this customer currently owes the business (never negative).
    pub fn receivable(&self) -> Decimal {
        PartyKind::Customer.outstanding(self.balance)
    }
}

impl Entity for Vendor {
    type Id = VendorId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Entity for Customer {
    type Id = CustomerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

impl Entity for Broker {
    type Id = BrokerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.name
    }
}

/// Editable fields shared by the vendor, customer and broker forms.
///
/// `bank_details` is only sent for vendors; `short_description` only for
/// customers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PartyDetails {
    pub name: String,
    pub contact: String,
    pub address: Option<String>,
    pub bank_details: Option<String>,
    pub short_description: Option<String>,
}

impl PartyDetails {
    pub fn new(name: impl Into<String>, contact: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contact: contact.into(),
            ..Self::default()
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = non_blank(address.into());
        self
    }

    pub fn with_bank_details(mut self, bank_details: impl Into<String>) -> Self {
        self.bank_details = non_blank(bank_details.into());
        self
    }

    /// Validate for a vendor or customer (contact is mandatory there).
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("name cannot be empty"));
        }
        if self.contact.trim().is_empty() {
            return Err(DomainError::validation("contact cannot be empty"));
        }
        if self.name.chars().count() > 255 {
            return Err(DomainError::validation("name cannot exceed 255 characters"));
        }
        Ok(())
    }

    /// Validate for a broker (contact optional).
    pub fn validate_broker(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::validation("broker name cannot be empty"));
        }
        Ok(())
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
