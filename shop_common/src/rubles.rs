use std::fmt::Display;

use serde::{Deserialize, Serialize};
use sqlx::Type;

pub const RUBLE_CURRENCY_CODE: &str = "RUB";

//--------------------------------------       Rubles        ---------------------------------------------------------
/// A price in whole rubles. Catalog prices and order totals carry no kopecks.
///
/// Serializes as a bare integer, so `{"total_price": 450000}` on the wire.
#[derive(Debug, Clone, Copy, Default, Type, PartialEq, Eq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[sqlx(transparent)]
#[serde(transparent)]
pub struct Rubles(i64);

impl From<i64> for Rubles {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for Rubles {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ₽", self.0)
    }
}

impl Rubles {
    pub fn value(&self) -> i64 {
        self.0
    }
}
