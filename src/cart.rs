// Shopping cart persisted under the `cart` key

use crate::money::Amount;
use crate::record::{Record, RecordId};
use crate::store::KvStore;
use eyre::{Result, eyre};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

pub const CART_KEY: &str = "cart";

const RESERVED: &[&str] = &["line_id", "added_at", "quantity"];

/// One cart entry: the record's fields plus bookkeeping
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub line_id: String,
    /// RFC 3339 timestamp
    pub added_at: String,
    pub quantity: u32,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl CartLine {
    pub fn id(&self) -> Option<RecordId> {
        self.fields.get("id").and_then(RecordId::from_json)
    }

    /// Price of one unit as stored in `price_field`
    pub fn unit_price(&self, price_field: &str) -> Result<Amount> {
        match self.fields.get(price_field) {
            Some(Value::Number(n)) => match n.as_i64() {
                Some(whole) => Ok(Amount::from_whole(whole)?),
                None => {
                    let n = n
                        .as_f64()
                        .ok_or_else(|| eyre!("Cart line {}: price is not representable", self.line_id))?;
                    Ok(Amount::from_f64(n)?)
                }
            },
            Some(Value::String(s)) => Ok(s.parse::<Amount>()?),
            Some(_) => Err(eyre!("Cart line {}: field '{}' is not a price", self.line_id, price_field)),
            None => Err(eyre!("Cart line {}: missing field '{}'", self.line_id, price_field)),
        }
    }
}

/// The cart blob: an ordered sequence of lines, rewritten in full on each change
#[derive(Debug, Clone)]
pub struct Cart {
    store: KvStore,
}

impl Cart {
    pub fn new(store: KvStore) -> Self {
        Cart { store }
    }

    /// Append `record` with `quantity` and return the new number of lines
    ///
    /// Adding the same record twice yields two lines, matching how the cart
    /// badge counts entries.
    pub fn add(&self, record: &Record, quantity: u32) -> Result<usize> {
        if quantity == 0 {
            return Err(eyre!("Quantity must be at least 1"));
        }

        let mut fields = record.to_json("id");
        for key in RESERVED {
            fields.remove(*key);
        }
        let line = CartLine {
            line_id: uuid::Uuid::now_v7().to_string(),
            added_at: chrono::Utc::now().to_rfc3339(),
            quantity,
            fields,
        };

        let count = self.store.update(CART_KEY, |current: Option<Vec<CartLine>>| {
            let mut lines = current.unwrap_or_default();
            lines.push(line);
            let count = lines.len();
            Ok((lines, count))
        })?;

        info!(id = %record.id(), quantity, count, "Added to cart");
        Ok(count)
    }

    pub fn items(&self) -> Result<Vec<CartLine>> {
        Ok(self.store.get(CART_KEY)?.unwrap_or_default())
    }

    /// Number of lines, not units
    pub fn count(&self) -> Result<usize> {
        Ok(self.items()?.len())
    }

    /// Sum of unit price times quantity across all lines
    pub fn total(&self, price_field: &str) -> Result<Amount> {
        let mut total = Amount::ZERO;
        for line in self.items()? {
            total = line
                .unit_price(price_field)?
                .checked_mul(line.quantity)
                .and_then(|subtotal| total.checked_add(subtotal))
                .ok_or_else(|| eyre!("Cart total out of range at line {}", line.line_id))?;
        }
        Ok(total)
    }

    pub fn clear(&self) -> Result<()> {
        self.store.remove(CART_KEY)?;
        Ok(())
    }
}
