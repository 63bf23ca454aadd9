//! A small in-memory CSV table with suffix-resolving left joins.
//!
//! Cells are `Option<String>`: an empty CSV field, or one of the
//! [`MISSING_MARKERS`] such as `NULL`, loads as `None` and `None` is
//! written back as an empty field. A key containing `None`
//! never matches anything.

use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use csv::{ReaderBuilder, StringRecord, WriterBuilder};
use tracing::debug;

use crate::error::JoinError;

pub type Cell = Option<String>;

/// Suffixes for overlapping non-key column names, left then right.
pub const SUFFIXES: (&str, &str) = ("_x", "_y");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    name: String,
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

/// Field texts that load as missing cells, besides the empty field.
pub const MISSING_MARKERS: &[&str] = &[
    "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN", "<NA>", "N/A", "NA",
    "NULL", "NaN", "None", "n/a", "nan", "null",
];

fn to_cell(field: &str) -> Cell {
    if field.is_empty() || MISSING_MARKERS.contains(&field) {
        None
    } else {
        Some(field.to_string())
    }
}

fn to_cells(record: &StringRecord, width: usize) -> Vec<Cell> {
    let mut cells: Vec<Cell> = record.iter().map(to_cell).collect();
    cells.resize(width, None);
    cells
}

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows,
        }
    }

    /// Load a CSV. With `names`, the file has no header row and `names`
    /// labels its columns; otherwise the first row is the header.
    ///
    /// Short rows are padded with missing cells; long rows are an error.
    pub fn from_reader<R: Read>(name: &str, reader: R, names: Option<&[&str]>) -> Result<Self, JoinError> {
        let mut rdr = ReaderBuilder::new()
            .has_headers(names.is_none())
            .flexible(true)
            .from_reader(reader);
        let headers: Vec<String> = match names {
            Some(names) => names.iter().map(|n| n.to_string()).collect(),
            None => rdr.headers()?.iter().map(str::to_string).collect(),
        };

        let mut rows = Vec::new();
        for (i, record) in rdr.records().enumerate() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(JoinError::RowWidth {
                    table: name.to_string(),
                    row: i + 1,
                    expected: headers.len(),
                    found: record.len(),
                });
            }
            rows.push(to_cells(&record, headers.len()));
        }
        debug!(table = name, rows = rows.len(), columns = headers.len(), "loaded table");
        Ok(Self::new(name, headers, rows))
    }

    pub fn from_path(path: impl AsRef<Path>, names: Option<&[&str]>) -> Result<Self, JoinError> {
        let path = path.as_ref();
        let file = File::open(path)?;
        Self::from_reader(&path.display().to_string(), file, names)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    /// (rows, columns)
    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.headers.len())
    }

    pub fn column_index(&self, column: &str) -> Result<usize, JoinError> {
        self.headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| JoinError::MissingColumn {
                table: self.name.clone(),
                column: column.to_string(),
            })
    }

    /// Cells of `column`, top to bottom.
    pub fn column(&self, column: &str) -> Result<impl Iterator<Item = Option<&str>>, JoinError> {
        let idx = self.column_index(column)?;
        Ok(self.rows.iter().map(move |row| row[idx].as_deref()))
    }

    /// Replace every cell of `column` with `f(cell)`.
    pub fn map_column<F>(&mut self, column: &str, f: F) -> Result<(), JoinError>
    where
        F: Fn(Option<&str>) -> Cell,
    {
        let idx = self.column_index(column)?;
        for row in &mut self.rows {
            row[idx] = f(row[idx].as_deref());
        }
        Ok(())
    }

    /// Append `new_column` computed from the cells of `from`.
    pub fn derive_column<F>(&mut self, from: &str, new_column: &str, f: F) -> Result<(), JoinError>
    where
        F: Fn(Option<&str>) -> Cell,
    {
        let idx = self.column_index(from)?;
        for row in &mut self.rows {
            let cell = f(row[idx].as_deref());
            row.push(cell);
        }
        self.headers.push(new_column.to_string());
        Ok(())
    }

    /// Remove the named columns; names that are absent are ignored.
    pub fn drop_columns(&mut self, columns: &[&str]) {
        let keep: Vec<bool> = self
            .headers
            .iter()
            .map(|h| !columns.contains(&h.as_str()))
            .collect();
        let retain = |cells: &mut Vec<_>| {
            let mut it = keep.iter();
            cells.retain(|_| *it.next().unwrap_or(&true));
        };
        for row in &mut self.rows {
            retain(row);
        }
        let mut it = keep.iter();
        self.headers.retain(|_| *it.next().unwrap_or(&true));
    }

    /// Left join `self` with `right` on `left_on[i] == right_on[i]` for every `i`.
    ///
    /// Every left row is kept, in order, once per matching right row (in
    /// right order) or once with missing right cells when nothing matches.
    /// A key pair with the same name on both sides yields one column; other
    /// right key columns are kept. Remaining column names present on both
    /// sides get [`SUFFIXES`].
    pub fn left_join(&self, right: &Table, left_on: &[&str], right_on: &[&str]) -> Result<Table, JoinError> {
        if left_on.len() != right_on.len() {
            return Err(JoinError::KeyArity {
                left: left_on.len(),
                right: right_on.len(),
            });
        }
        let left_keys = left_on
            .iter()
            .map(|c| self.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;
        let right_keys = right_on
            .iter()
            .map(|c| right.column_index(c))
            .collect::<Result<Vec<_>, _>>()?;

        // right columns folded into the matching left key column
        let merged: HashSet<usize> = left_on
            .iter()
            .zip(right_on)
            .zip(&right_keys)
            .filter(|((l, r), _)| l == r)
            .map(|(_, &idx)| idx)
            .collect();
        let merged_names: HashSet<&str> = merged.iter().map(|&i| right.headers[i].as_str()).collect();
        let right_cols: Vec<usize> = (0..right.headers.len()).filter(|i| !merged.contains(i)).collect();

        let right_names: HashSet<&str> = right_cols.iter().map(|&i| right.headers[i].as_str()).collect();
        let left_names: HashSet<&str> = self.headers.iter().map(String::as_str).collect();
        let overlap = |name: &str| !merged_names.contains(name) && left_names.contains(name) && right_names.contains(name);

        let mut headers: Vec<String> = self
            .headers
            .iter()
            .map(|h| if overlap(h) { format!("{h}{}", SUFFIXES.0) } else { h.clone() })
            .collect();
        headers.extend(right_cols.iter().map(|&i| {
            let h = &right.headers[i];
            if overlap(h) {
                format!("{h}{}", SUFFIXES.1)
            } else {
                h.clone()
            }
        }));

        let key_of = |row: &[Cell], idxs: &[usize]| -> Option<Vec<String>> {
            idxs.iter().map(|&i| row[i].clone()).collect()
        };
        let mut index: HashMap<Vec<String>, Vec<usize>> = HashMap::new();
        for (i, row) in right.rows.iter().enumerate() {
            if let Some(key) = key_of(row, &right_keys) {
                index.entry(key).or_default().push(i);
            }
        }

        let mut rows = Vec::with_capacity(self.rows.len());
        let mut matched = 0usize;
        for row in &self.rows {
            let hits = key_of(row, &left_keys).and_then(|k| index.get(&k));
            match hits {
                Some(hits) => {
                    matched += 1;
                    for &r in hits {
                        let mut out = row.clone();
                        out.extend(right_cols.iter().map(|&c| right.rows[r][c].clone()));
                        rows.push(out);
                    }
                }
                None => {
                    let mut out = row.clone();
                    out.resize(row.len() + right_cols.len(), None);
                    rows.push(out);
                }
            }
        }
        debug!(
            left = %self.name,
            right = %right.name,
            left_rows = self.rows.len(),
            matched,
            rows = rows.len(),
            "left join"
        );

        Ok(Table::new(format!("{} + {}", self.name, right.name), headers, rows))
    }

    pub fn to_writer<W: Write>(&self, writer: W) -> Result<(), JoinError> {
        let mut wtr = WriterBuilder::new().from_writer(writer);
        wtr.write_record(&self.headers)?;
        for row in &self.rows {
            wtr.write_record(row.iter().map(|c| c.as_deref().unwrap_or("")))?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn to_path(&self, path: impl AsRef<Path>) -> Result<(), JoinError> {
        let file = File::create(path)?;
        self.to_writer(file)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table(name: &str, csv: &str) -> Table {
        Table::from_reader(name, csv.as_bytes(), None).unwrap()
    }

    fn render(t: &Table) -> String {
        let mut out = Vec::new();
        t.to_writer(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn load_pads_short_rows_and_marks_empty_cells_missing() {
        let t = table("t", "a,b,c\n1,,3\n4\n");
        assert_eq!(t.shape(), (2, 3));
        assert_eq!(t.rows()[0], vec![Some("1".into()), None, Some("3".into())]);
        assert_eq!(t.rows()[1], vec![Some("4".into()), None, None]);
    }

    #[test]
    fn missing_markers_load_as_missing() {
        let t = table("t", "week,last_week,name\n1,NULL,NA\n2,nan,Nancy\n3, NULL,None\n");
        assert_eq!(t.rows()[0], vec![Some("1".into()), None, None]);
        assert_eq!(t.rows()[1], vec![Some("2".into()), None, Some("Nancy".into())]);
        // only exact matches count
        assert_eq!(t.rows()[2], vec![Some("3".into()), Some(" NULL".into()), None]);
        assert_eq!(render(&t), "week,last_week,name\n1,,\n2,,Nancy\n3, NULL,\n");
    }

    #[test]
    fn load_rejects_long_rows() {
        let err = Table::from_reader("t", "a,b\n1,2,3\n".as_bytes(), None).unwrap_err();
        assert!(matches!(err, JoinError::RowWidth { row: 1, expected: 2, found: 3, .. }));
    }

    #[test]
    fn headerless_load_uses_names() {
        let t = Table::from_reader("t", "Drake,100\n".as_bytes(), Some(&["artist_name", "artist_listeners"])).unwrap();
        assert_eq!(t.headers(), ["artist_name", "artist_listeners"]);
        assert_eq!(t.shape(), (1, 2));
    }

    #[test]
    fn left_join_same_key_name_keeps_one_column() {
        let left = table("l", "k,v\na,1\nb,2\nc,3\n");
        let right = table("r", "k,w\nb,x\na,y\na,z\n");
        let joined = left.left_join(&right, &["k"], &["k"]).unwrap();
        assert_eq!(render(&joined), "k,v,w\na,1,y\na,1,z\nb,2,x\nc,3,\n");
    }

    #[test]
    fn left_join_suffixes_overlapping_columns() {
        let left = table("l", "name,primary_artist,artist_name\nHello,Adele,x\n");
        let right = table("r", "artist_name,artist_listeners\nAdele,99\n");
        let joined = left.left_join(&right, &["primary_artist"], &["artist_name"]).unwrap();
        assert_eq!(
            joined.headers(),
            ["name", "primary_artist", "artist_name_x", "artist_name_y", "artist_listeners"]
        );
        assert_eq!(render(&joined), "name,primary_artist,artist_name_x,artist_name_y,artist_listeners\nHello,Adele,x,Adele,99\n");
    }

    #[test]
    fn missing_key_never_matches() {
        let left = table("l", "k,v\n,1\n");
        let right = table("r", "k,w\n,x\n");
        let joined = left.left_join(&right, &["k"], &["k"]).unwrap();
        assert_eq!(joined.rows(), [vec![None, Some("1".into()), None]]);
    }

    #[test]
    fn join_errors() {
        let left = table("l", "k\n1\n");
        let right = table("r", "j\n1\n");
        assert!(matches!(
            left.left_join(&right, &["k"], &["k"]),
            Err(JoinError::MissingColumn { .. })
        ));
        assert!(matches!(
            left.left_join(&right, &["k"], &[]),
            Err(JoinError::KeyArity { left: 1, right: 0 })
        ));
    }

    #[test]
    fn drop_and_derive_columns() {
        let mut t = table("t", "a,b,c\n1,2,3\n");
        t.derive_column("a", "d", |c| c.map(|s| format!("{s}!"))).unwrap();
        t.drop_columns(&["b", "nope"]);
        assert_eq!(render(&t), "a,c,d\n1,3,1!\n");
    }
}
