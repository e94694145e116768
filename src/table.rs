//! Presorted attribute tables: the SPRINT-style column index that lets
//! split search run as a single linear sweep per node, with no re-sorting.

use std::collections::HashMap;

/// One feature value together with the row it came from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeEntry {
    /// The feature value.
    pub value: f64,
    /// The zero-based row the value came from.
    pub row: usize,
}

/// One attribute table: entries for a single feature column, sorted
/// ascending by value. Equal values keep their original row order.
pub type AttributeTable = Vec<AttributeEntry>;

/// One table per feature column; index `j` always refers to feature `j`.
pub type AttributeTables = Vec<AttributeTable>;

/// Build one sorted attribute table per feature column.
///
/// Each table has one entry per row; a stable sort keeps ties in original
/// row order. Cost is O(D·N·log N).
pub(crate) fn build_attribute_tables(features: &[Vec<f64>], n_features: usize) -> AttributeTables {
    let mut tables = Vec::with_capacity(n_features);
    for column in 0..n_features {
        let mut table: AttributeTable = features
            .iter()
            .enumerate()
            .map(|(row, values)| AttributeEntry {
                value: values[column],
                row,
            })
            .collect();
        // sort_by is stable; total_cmp gives a total order over finite values.
        table.sort_by(|a, b| a.value.total_cmp(&b.value));
        tables.push(table);
    }
    tables
}

/// Partition every attribute table into left/right halves for a chosen split.
///
/// Rows in the winning table's prefix `0..=boundary` go left, the rest go
/// right. Each table is filtered in order, so both halves stay sorted
/// without re-sorting. Cost is O(D·N).
///
/// Panics if the tables do not all cover the same row set; that is a
/// caller bug, not a recoverable condition.
pub(crate) fn split_attribute_tables(
    tables: &AttributeTables,
    attribute_index: usize,
    boundary: usize,
) -> (AttributeTables, AttributeTables) {
    let winning = &tables[attribute_index];
    let mut goes_left: HashMap<usize, bool> = HashMap::with_capacity(winning.len());
    for (i, entry) in winning.iter().enumerate() {
        goes_left.insert(entry.row, i <= boundary);
    }

    let mut left = Vec::with_capacity(tables.len());
    let mut right = Vec::with_capacity(tables.len());
    for table in tables {
        let mut left_table = Vec::with_capacity(boundary + 1);
        let mut right_table = Vec::with_capacity(table.len() - boundary - 1);
        for entry in table {
            if goes_left[&entry.row] {
                left_table.push(*entry);
            } else {
                right_table.push(*entry);
            }
        }
        left.push(left_table);
        right.push(right_table);
    }
    (left, right)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_features() -> Vec<Vec<f64>> {
        vec![
            vec![3.0, 10.0],
            vec![1.0, 30.0],
            vec![2.0, 20.0],
            vec![4.0, 40.0],
        ]
    }

    #[test]
    fn tables_sorted_with_full_row_coverage() {
        let features = sample_features();
        let tables = build_attribute_tables(&features, 2);
        assert_eq!(tables.len(), 2);
        for table in &tables {
            assert_eq!(table.len(), 4);
            for pair in table.windows(2) {
                assert!(pair[0].value <= pair[1].value);
            }
            let mut rows: Vec<usize> = table.iter().map(|e| e.row).collect();
            rows.sort_unstable();
            assert_eq!(rows, vec![0, 1, 2, 3]);
        }
        // Column 0 sorted: 1.0(r1), 2.0(r2), 3.0(r0), 4.0(r3)
        let rows: Vec<usize> = tables[0].iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![1, 2, 0, 3]);
    }

    #[test]
    fn tied_values_keep_row_order() {
        let features = vec![vec![5.0], vec![5.0], vec![1.0], vec![5.0]];
        let tables = build_attribute_tables(&features, 1);
        let rows: Vec<usize> = tables[0].iter().map(|e| e.row).collect();
        assert_eq!(rows, vec![2, 0, 1, 3]);
    }

    #[test]
    fn split_partitions_every_table_consistently() {
        let features = sample_features();
        let tables = build_attribute_tables(&features, 2);
        // Split on column 0 at boundary 1: rows {1, 2} left, rows {0, 3} right.
        let (left, right) = split_attribute_tables(&tables, 0, 1);
        for (l, r) in left.iter().zip(right.iter()) {
            assert_eq!(l.len(), 2);
            assert_eq!(r.len(), 2);
            let mut left_rows: Vec<usize> = l.iter().map(|e| e.row).collect();
            left_rows.sort_unstable();
            assert_eq!(left_rows, vec![1, 2]);
            let mut all_rows: Vec<usize> =
                l.iter().chain(r.iter()).map(|e| e.row).collect();
            all_rows.sort_unstable();
            assert_eq!(all_rows, vec![0, 1, 2, 3]);
        }
        // Both halves of every table remain sorted.
        for table in left.iter().chain(right.iter()) {
            for pair in table.windows(2) {
                assert!(pair[0].value <= pair[1].value);
            }
        }
    }

    #[test]
    fn split_at_last_boundary_sends_all_but_none_right() {
        let features = sample_features();
        let tables = build_attribute_tables(&features, 2);
        let (left, right) = split_attribute_tables(&tables, 0, 2);
        assert_eq!(left[0].len(), 3);
        assert_eq!(right[0].len(), 1);
        assert_eq!(right[0][0].row, 3);
    }
}
