use crate::config::*;
use log::debug;
use rust_decimal::Decimal;
use snafu::ensure;

/// Number of entries of every rank coefficient table.
pub const RANK_TABLE_LEN: usize = 401;

/// The coefficients granted for a relative rank, best first.
///
/// Invariant: exactly [RANK_TABLE_LEN] entries, never increasing.
#[derive(Eq, PartialEq, Debug, Clone)]
pub struct RankTable {
    values: Vec<Decimal>,
}

impl RankTable {
    /// Builds a table from arbitrary values, checking its shape.
    pub fn new(values: Vec<Decimal>) -> Result<RankTable, TableError> {
        check_shape(&values)?;
        Ok(RankTable { values })
    }

    /// The default table: a flat region stepping by 1 from 100 to 40, then two
    /// regions attenuated by 0.15 and 0.05 per step down to 0.
    pub fn standard() -> RankTable {
        let flat = (40..=100i64).rev().map(Decimal::from);
        let steep = (51..=239i64)
            .rev()
            .map(|i| Decimal::new(15, 2) * Decimal::from(i));
        let tail = (0..=150i64)
            .rev()
            .map(|i| Decimal::new(5, 2) * Decimal::from(i));
        let values: Vec<Decimal> = flat.chain(steep).chain(tail).collect();
        debug_assert!(check_shape(&values).is_ok());
        debug!("RankTable::standard: built {} entries", values.len());
        RankTable { values }
    }

    pub fn get(&self, index: usize) -> Option<Decimal> {
        self.values.get(index).cloned()
    }

    /// The coefficient of the best possible rank.
    pub fn max(&self) -> Decimal {
        self.values[0]
    }

    /// The coefficient of the worst possible rank.
    pub fn min(&self) -> Decimal {
        self.values[RANK_TABLE_LEN - 1]
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[Decimal] {
        &self.values
    }
}

fn check_shape(values: &[Decimal]) -> Result<(), TableError> {
    ensure!(
        values.len() == RANK_TABLE_LEN,
        WrongLengthSnafu {
            len: values.len(),
            expected: RANK_TABLE_LEN
        }
    );
    for (index, pair) in values.windows(2).enumerate() {
        ensure!(
            pair[0] >= pair[1],
            NotMonotonicSnafu {
                index,
                before: pair[0],
                after: pair[1]
            }
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_shape() {
        let table = RankTable::standard();
        assert_eq!(table.len(), RANK_TABLE_LEN);
        for i in 0..RANK_TABLE_LEN - 1 {
            assert!(
                table.values()[i] >= table.values()[i + 1],
                "increase at {}",
                i
            );
        }
        assert_eq!(table.max(), Decimal::from(100));
        assert_eq!(table.min(), Decimal::ZERO);
    }

    #[test]
    fn standard_table_breakpoints() {
        let table = RankTable::standard();
        assert_eq!(table.get(60), Some(Decimal::from(40)));
        // 0.15 * 239
        assert_eq!(table.get(61), Some(Decimal::new(3585, 2)));
        // 0.15 * 51
        assert_eq!(table.get(249), Some(Decimal::new(765, 2)));
        // 0.05 * 150
        assert_eq!(table.get(250), Some(Decimal::new(75, 1)));
        assert_eq!(table.get(401), None);
    }

    #[test]
    fn new_rejects_wrong_length() {
        let res = RankTable::new(vec![Decimal::ONE; 400]);
        assert_eq!(
            res,
            Err(TableError::WrongLength {
                len: 400,
                expected: RANK_TABLE_LEN
            })
        );
    }

    #[test]
    fn new_rejects_increase() {
        let mut values = RankTable::standard().values().to_vec();
        values[10] = Decimal::from(1000);
        match RankTable::new(values) {
            Err(TableError::NotMonotonic { index, .. }) => assert_eq!(index, 9),
            x => panic!("unexpected {:?}", x),
        }
    }

    #[test]
    fn new_accepts_flat_table() {
        let table = RankTable::new(vec![Decimal::ONE; RANK_TABLE_LEN]).unwrap();
        assert_eq!(table.max(), table.min());
    }
}
