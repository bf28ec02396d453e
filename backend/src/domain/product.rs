//! Products offered by sellers.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use utoipa::ToSchema;
use uuid::Uuid;

use super::coins::Coin;
use super::user::UserId;

/// Validation errors returned by the product constructors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    #[error("product id must be a valid UUID")]
    InvalidId,
    #[error("product name must not be empty")]
    EmptyName,
    #[error("cost must be a positive multiple of 5")]
    InvalidCost,
    #[error("amount available must be greater than zero")]
    EmptyStock,
}

/// Stable product identifier stored as a UUID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct ProductId(Uuid);

impl ProductId {
    /// Generate a new random [`ProductId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4())
    }

    /// Wrap a UUID read back from storage.
    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Access the underlying UUID.
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for ProductId {
    type Err = ProductValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s)
            .map(Self)
            .map_err(|_| ProductValidationError::InvalidId)
    }
}

/// Product name, trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ProductName(String);

impl ProductName {
    /// Trim and validate a product name.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::ProductName;
    ///
    /// assert_eq!(ProductName::new("  Cola ").expect("valid").as_str(), "Cola");
    /// assert!(ProductName::new("   ").is_err());
    /// ```
    pub fn new(name: impl AsRef<str>) -> Result<Self, ProductValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(ProductValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// Borrow the name.
    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ProductName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unit price: positive and a multiple of 5.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Cost(u64);

impl Cost {
    /// Validate a raw price.
    pub fn new(value: i64) -> Result<Self, ProductValidationError> {
        u64::try_from(value)
            .ok()
            .filter(|cost| *cost > 0 && cost % Coin::Five.value() == 0)
            .map(Self)
            .ok_or(ProductValidationError::InvalidCost)
    }

    /// Raw price in the smallest coin unit.
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Price of `quantity` units, or `None` on overflow.
    pub fn total_for(self, quantity: Quantity) -> Option<u64> {
        self.0.checked_mul(quantity.value())
    }
}

/// Number of units requested in a purchase; always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Quantity(u64);

impl Quantity {
    /// Parse a path-supplied quantity, yielding `None` for anything that is
    /// not a positive integer.
    ///
    /// # Examples
    /// ```
    /// use backend::domain::Quantity;
    ///
    /// assert_eq!(Quantity::parse("5").map(|q| q.value()), Some(5));
    /// assert!(Quantity::parse("five").is_none());
    /// assert!(Quantity::parse("0").is_none());
    /// ```
    pub fn parse(raw: &str) -> Option<Self> {
        raw.parse::<u64>().ok().and_then(Self::new)
    }

    /// Wrap a positive quantity.
    pub fn new(value: u64) -> Option<Self> {
        (value > 0).then_some(Self(value))
    }

    /// Raw unit count.
    pub const fn value(self) -> u64 {
        self.0
    }
}

/// Fields needed to list a new product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    pub name: ProductName,
    pub cost: Cost,
    pub amount_available: u64,
}

impl ProductDraft {
    /// Validate raw listing inputs.
    pub fn try_from_parts(
        amount_available: i64,
        cost: i64,
        name: &str,
    ) -> Result<Self, ProductValidationError> {
        let amount_available = u64::try_from(amount_available)
            .ok()
            .filter(|amount| *amount > 0)
            .ok_or(ProductValidationError::EmptyStock)?;
        let cost = Cost::new(cost)?;
        let name = ProductName::new(name)?;
        Ok(Self {
            name,
            cost,
            amount_available,
        })
    }
}

/// A product listed by a seller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[schema(value_type = String, example = "9b2f3c1e-5d8a-4f0b-a1c2-7e6d5f4a3b2c")]
    id: ProductId,
    #[schema(value_type = String, example = "Cola")]
    #[serde(rename = "productName")]
    name: ProductName,
    #[schema(value_type = u64, example = 25)]
    cost: Cost,
    #[schema(example = 10)]
    amount_available: u64,
    #[schema(value_type = String)]
    seller_id: UserId,
}

impl Product {
    /// Assemble a product from validated parts.
    pub fn new(
        id: ProductId,
        name: ProductName,
        cost: Cost,
        amount_available: u64,
        seller_id: UserId,
    ) -> Self {
        Self {
            id,
            name,
            cost,
            amount_available,
            seller_id,
        }
    }

    /// List a draft under a fresh identifier.
    pub fn list(draft: ProductDraft, seller_id: UserId) -> Self {
        let ProductDraft {
            name,
            cost,
            amount_available,
        } = draft;
        Self::new(ProductId::random(), name, cost, amount_available, seller_id)
    }

    pub fn id(&self) -> &ProductId {
        &self.id
    }

    pub fn name(&self) -> &ProductName {
        &self.name
    }

    pub fn cost(&self) -> Cost {
        self.cost
    }

    pub fn amount_available(&self) -> u64 {
        self.amount_available
    }

    pub fn seller_id(&self) -> &UserId {
        &self.seller_id
    }

    /// Whether `user_id` owns this product.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.seller_id == user_id
    }

    /// Copy with a new stock level.
    pub fn with_stock(&self, amount_available: u64) -> Self {
        Self {
            amount_available,
            ..self.clone()
        }
    }

    /// Copy with a new name and cost; identity, stock and owner are kept.
    pub fn revised(&self, name: ProductName, cost: Cost) -> Self {
        Self {
            name,
            cost,
            ..self.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for product validators.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(5)]
    #[case(25)]
    #[case(1_000)]
    fn valid_costs(#[case] raw: i64) {
        assert!(Cost::new(raw).is_ok());
    }

    #[rstest]
    #[case(0)]
    #[case(-5)]
    #[case(7)]
    #[case(101)]
    fn invalid_costs(#[case] raw: i64) {
        assert_eq!(Cost::new(raw), Err(ProductValidationError::InvalidCost));
    }

    #[rstest]
    #[case("1", Some(1))]
    #[case("42", Some(42))]
    #[case("0", None)]
    #[case("-3", None)]
    #[case("two", None)]
    #[case("", None)]
    fn quantity_parsing(#[case] raw: &str, #[case] expected: Option<u64>) {
        assert_eq!(Quantity::parse(raw).map(Quantity::value), expected);
    }

    #[rstest]
    #[case(0, 5, "Cola", ProductValidationError::EmptyStock)]
    #[case(-1, 5, "Cola", ProductValidationError::EmptyStock)]
    #[case(3, 12, "Cola", ProductValidationError::InvalidCost)]
    #[case(3, 5, "  ", ProductValidationError::EmptyName)]
    fn invalid_drafts(
        #[case] amount: i64,
        #[case] cost: i64,
        #[case] name: &str,
        #[case] expected: ProductValidationError,
    ) {
        assert_eq!(ProductDraft::try_from_parts(amount, cost, name), Err(expected));
    }

    #[rstest]
    fn listed_product_serialises_camel_case() {
        let seller = UserId::random();
        let draft = ProductDraft::try_from_parts(10, 25, " Cola ").expect("valid draft");
        let product = Product::list(draft, seller);
        let value = serde_json::to_value(&product).expect("serialise product");
        assert_eq!(value["productName"], "Cola");
        assert_eq!(value["cost"], 25);
        assert_eq!(value["amountAvailable"], 10);
        assert_eq!(value["sellerId"], seller.to_string());
        assert!(product.is_owned_by(&seller));
    }

    #[rstest]
    fn total_for_detects_overflow() {
        let cost = Cost::new(5).expect("valid cost");
        let huge = Quantity::new(u64::MAX).expect("positive");
        assert_eq!(cost.total_for(huge), None);
        let five = Quantity::new(5).expect("positive");
        assert_eq!(cost.total_for(five), Some(25));
    }
}
