use crate::Error;

use super::Crs;

/// A table of rows sharing one coordinate reference system.
///
/// Every transformation that does not reproject keeps `crs` unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<R> {
    pub crs: Crs,
    pub rows: Vec<R>,
}

impl<R> Table<R> {
    pub fn new(crs: Crs, rows: Vec<R>) -> Self {
        Self { crs, rows }
    }

    pub fn empty(crs: Crs) -> Self {
        Self {
            crs,
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.rows.iter()
    }

    /// Row-wise transform into a new table with the same CRS
    pub fn map<S>(self, f: impl FnMut(R) -> S) -> Table<S> {
        Table {
            crs: self.crs,
            rows: self.rows.into_iter().map(f).collect(),
        }
    }

    pub fn retain(mut self, f: impl FnMut(&R) -> bool) -> Self {
        self.rows.retain(f);
        self
    }

    /// Stacks `other` below this table.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] if both tables use different references.
    pub fn concat(mut self, other: Table<R>) -> Result<Self, Error> {
        if self.crs != other.crs {
            return Err(Error::InvalidData(format!(
                "Cannot stack tables in {} and {}",
                self.crs, other.crs
            )));
        }
        self.rows.extend(other.rows);
        Ok(self)
    }
}

impl<R> IntoIterator for Table<R> {
    type Item = R;
    type IntoIter = std::vec::IntoIter<R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.into_iter()
    }
}

impl<'a, R> IntoIterator for &'a Table<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
