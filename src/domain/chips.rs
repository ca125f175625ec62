use crate::domain::money::Amount;
use crate::error::ValidationError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Denomination-by-count decomposition of an issued credit amount.
///
/// Denominations are unique by construction: the map is keyed by denomination
/// and [`ChipBreakdown::add`] refuses to overwrite an existing entry.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ChipBreakdown(BTreeMap<Amount, u32>);

impl ChipBreakdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, denomination: Amount, count: u32) -> Result<(), ValidationError> {
        if self.0.contains_key(&denomination) {
            return Err(ValidationError::DuplicateDenomination {
                denomination: denomination.value(),
            });
        }
        self.0.insert(denomination, count);
        Ok(())
    }

    /// Sum of `denomination * count`, or `BreakdownOverflow` when the total
    /// does not fit in a `Decimal`.
    pub fn total(&self) -> Result<Decimal, ValidationError> {
        self.0
            .iter()
            .try_fold(Decimal::ZERO, |total, (denomination, count)| {
                denomination
                    .value()
                    .checked_mul(Decimal::from(*count))
                    .and_then(|subtotal| total.checked_add(subtotal))
                    .ok_or(ValidationError::BreakdownOverflow {
                        denomination: denomination.value(),
                        count: *count,
                    })
            })
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Amount, &u32)> {
        self.0.iter()
    }
}

impl TryFrom<Vec<(Amount, u32)>> for ChipBreakdown {
    type Error = ValidationError;

    fn try_from(entries: Vec<(Amount, u32)>) -> Result<Self, Self::Error> {
        let mut breakdown = Self::new();
        for (denomination, count) in entries {
            breakdown.add(denomination, count)?;
        }
        Ok(breakdown)
    }
}

/// Parses `"1000x3 500x2"`; entries may also be separated by `;` or `,`.
impl FromStr for ChipBreakdown {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut breakdown = Self::new();
        for entry in s
            .split(|c: char| c.is_whitespace() || c == ';' || c == ',')
            .filter(|e| !e.is_empty())
        {
            let malformed = || ValidationError::MalformedBreakdown {
                entry: entry.to_string(),
            };
            let (denomination, count) = entry
                .split_once(['x', 'X', '*'])
                .ok_or_else(malformed)?;
            let denomination = Decimal::from_str(denomination.trim()).map_err(|_| malformed())?;
            let count = count.trim().parse::<u32>().map_err(|_| malformed())?;
            breakdown.add(Amount::new(denomination)?, count)?;
        }
        Ok(breakdown)
    }
}

impl fmt::Display for ChipBreakdown {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for (denomination, count) in self.0.iter().rev() {
            if !first {
                f.write_str(" ")?;
            }
            write!(f, "{}x{}", denomination, count)?;
            first = false;
        }
        Ok(())
    }
}

/// Checks that `breakdown` adds up to exactly `requested`.
pub fn validate(breakdown: &ChipBreakdown, requested: Decimal) -> Result<(), ValidationError> {
    let breakdown_total = breakdown.total()?;
    if breakdown_total <= Decimal::ZERO {
        return Err(ValidationError::NoChipsSelected { requested });
    }
    if breakdown_total != requested {
        return Err(ValidationError::MismatchedTotal {
            requested,
            breakdown_total,
        });
    }
    Ok(())
}
