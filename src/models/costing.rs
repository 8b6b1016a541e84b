// src/models/costing.rs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CostCalculation {
    pub id: Uuid,
    // 1:1 with the inquiry item (UNIQUE in the schema)
    pub inquiry_item_id: Uuid,
    #[schema(example = "100.00")]
    pub material_cost: Decimal,
    #[schema(example = "50.00")]
    pub labor_cost: Decimal,
    #[schema(example = "20.00")]
    pub overhead_cost: Decimal,
    #[schema(example = "170.00")]
    pub total_cost: Decimal,
    pub calculated_by_id: Uuid,
    pub is_approved: bool,
    pub approved_at: Option<DateTime<Utc>>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateCostCalculationPayload {
    pub inquiry_item_id: Uuid,
    #[schema(example = "100.00")]
    pub material_cost: Decimal,
    #[schema(example = "50.00")]
    pub labor_cost: Decimal,
    #[schema(example = "20.00")]
    pub overhead_cost: Decimal,
    pub notes: Option<String>,
}

impl CreateCostCalculationPayload {
    /// All cost components must be non-negative. `validator` has no range
    /// check for Decimal, so this runs next to `validate()` in the handler.
    pub fn check_amounts(&self) -> Result<(), &'static str> {
        if self.material_cost.is_sign_negative()
            || self.labor_cost.is_sign_negative()
            || self.overhead_cost.is_sign_negative()
        {
            return Err("negative_cost");
        }
        Ok(())
    }

    pub fn total(&self) -> Decimal {
        self.material_cost + self.labor_cost + self.overhead_cost
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn payload(m: &str, l: &str, o: &str) -> CreateCostCalculationPayload {
        CreateCostCalculationPayload {
            inquiry_item_id: Uuid::new_v4(),
            material_cost: Decimal::from_str(m).unwrap(),
            labor_cost: Decimal::from_str(l).unwrap(),
            overhead_cost: Decimal::from_str(o).unwrap(),
            notes: None,
        }
    }

    #[test]
    fn total_is_exact_sum() {
        let p = payload("100", "50", "20");
        assert_eq!(p.total(), Decimal::from_str("170").unwrap());

        // Exact decimal arithmetic, no float drift
        let p = payload("0.10", "0.20", "0.30");
        assert_eq!(p.total(), Decimal::from_str("0.60").unwrap());
    }

    #[test]
    fn rejects_negative_components() {
        assert!(payload("100", "50", "20").check_amounts().is_ok());
        assert!(payload("-0.01", "50", "20").check_amounts().is_err());
        assert!(payload("0", "0", "0").check_amounts().is_ok());
    }
}
