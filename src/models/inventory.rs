use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Unit {
    Kg,
    Pc,
    Ltr,
    Gm,
}

impl Unit {
    pub fn as_str(&self) -> &'static str {
        match self {
            Unit::Kg => "kg",
            Unit::Pc => "pc",
            Unit::Ltr => "ltr",
            Unit::Gm => "gm",
        }
    }
}

impl FromStr for Unit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "kg" => Ok(Unit::Kg),
            "pc" => Ok(Unit::Pc),
            "ltr" => Ok(Unit::Ltr),
            "gm" => Ok(Unit::Gm),
            other => Err(format!("unknown unit '{other}'")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: Uuid,
    pub stall_id: Uuid,
    pub name: String,
    pub quantity: f64,
    pub unit: Unit,
    pub low_stock_threshold: f64,
}

impl InventoryItem {
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.low_stock_threshold
    }
}
