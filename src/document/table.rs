// Copyright (c) 2018-2025  Brendan Molloy <brendan@bbqsrc.net>,
//                          Ilya Solovyiov <ilya.solovyiov@gmail.com>,
//                          Kai Ren <tyranron@gmail.com>
//
// Licensed under the Apache License, Version 2.0 <LICENSE-APACHE or
// http://www.apache.org/licenses/LICENSE-2.0> or the MIT license
// <LICENSE-MIT or http://opensource.org/licenses/MIT>, at your
// option. This file may not be copied, modified, or distributed
// except according to those terms.

//! [`DataTable`] step argument.

use std::{collections::HashMap, fmt};

/// Data table attached to a [`Step`] as its structured argument.
///
/// The first row is conventionally a header, but nothing enforces it: the
/// table reaches step handlers exactly as it was written.
///
/// # Example
///
/// ```rust
/// use gherkin_runner::DataTable;
///
/// let table = DataTable::from(vec![
///     vec!["name", "age"],
///     vec!["Alice", "30"],
///     vec!["Bob", "25"],
/// ]);
///
/// let hashes = table.hashes();
/// assert_eq!(hashes[0].get("name"), Some(&"Alice".to_owned()));
/// assert_eq!(table.body().len(), 2);
/// ```
///
/// [`Step`]: super::Step
#[derive(Clone, Debug, Default, Eq, Hash, PartialEq)]
pub struct DataTable {
    rows: Vec<Vec<String>>,
}

impl DataTable {
    /// Creates a new [`DataTable`] out of the given rows.
    #[must_use]
    pub const fn new(rows: Vec<Vec<String>>) -> Self {
        Self { rows }
    }

    /// Returns all the rows, including the header one.
    #[must_use]
    pub fn raw(&self) -> &[Vec<String>] {
        &self.rows
    }

    /// Returns the header row, if any.
    #[must_use]
    pub fn header(&self) -> Option<&[String]> {
        self.rows.first().map(Vec::as_slice)
    }

    /// Returns the rows following the header one.
    #[must_use]
    pub fn body(&self) -> &[Vec<String>] {
        self.rows.get(1..).unwrap_or_default()
    }

    /// Converts the body rows into maps keyed by the header cells.
    #[must_use]
    pub fn hashes(&self) -> Vec<HashMap<String, String>> {
        let Some(header) = self.header() else {
            return Vec::new();
        };

        self.body()
            .iter()
            .map(|row| header.iter().cloned().zip(row.iter().cloned()).collect())
            .collect()
    }

    /// Converts a two-column table into a map of the first column onto the
    /// second one, header row included.
    ///
    /// Returns [`None`] if any row doesn't have exactly 2 cells.
    #[must_use]
    pub fn rows_hash(&self) -> Option<HashMap<String, String>> {
        self.rows
            .iter()
            .map(|row| match row.as_slice() {
                [k, v] => Some((k.clone(), v.clone())),
                _ => None,
            })
            .collect()
    }

    /// Indicates whether this [`DataTable`] has no rows at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Returns the number of rows, including the header one.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Returns the number of cells in the header row, or `0` if the table is
    /// empty.
    #[must_use]
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    /// Iterates mutably over every cell of this [`DataTable`].
    pub(crate) fn cells_mut(&mut self) -> impl Iterator<Item = &mut String> {
        self.rows.iter_mut().flatten()
    }
}

impl From<Vec<Vec<&str>>> for DataTable {
    fn from(rows: Vec<Vec<&str>>) -> Self {
        Self::new(
            rows.into_iter()
                .map(|row| row.into_iter().map(str::to_owned).collect())
                .collect(),
        )
    }
}

impl From<Vec<Vec<String>>> for DataTable {
    fn from(rows: Vec<Vec<String>>) -> Self {
        Self::new(rows)
    }
}

impl From<&gherkin::Table> for DataTable {
    fn from(table: &gherkin::Table) -> Self {
        Self::new(table.rows.clone())
    }
}

impl fmt::Display for DataTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            writeln!(f, "| {} |", row.join(" | "))?;
        }
        Ok(())
    }
}
