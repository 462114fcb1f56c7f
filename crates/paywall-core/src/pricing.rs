//! The subscription product shown on the home page.

use serde::{Deserialize, Serialize};

use crate::provider::Price;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
  pub price_id: String,
  /// Display amount, e.g. `$10.00`.
  pub amount:   String,
}

impl Product {
  pub fn from_price(price: &Price) -> Self {
    Self {
      price_id: price.id.clone(),
      amount:   format_amount(price.unit_amount, &price.currency),
    }
  }
}

/// Render an amount in minor units with two decimals.
///
/// Known currencies get a prefix symbol; anything else is suffixed with its
/// uppercase code.
pub fn format_amount(unit_amount: i64, currency: &str) -> String {
  let sign = if unit_amount < 0 { "-" } else { "" };
  let abs = unit_amount.unsigned_abs();
  let number = format!("{}.{:02}", abs / 100, abs % 100);
  match currency.to_ascii_lowercase().as_str() {
    "usd" => format!("{sign}${number}"),
    "eur" => format!("{sign}€{number}"),
    "gbp" => format!("{sign}£{number}"),
    "brl" => format!("{sign}R${number}"),
    other => format!("{sign}{number} {}", other.to_ascii_uppercase()),
  }
}
