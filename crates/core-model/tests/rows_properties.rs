//! Property-based tests for RowIndex under random expand/collapse sequences.

use core_model::{RowIndex, RowPos};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Expand(usize, usize),
    Collapse(usize),
    Resize(usize, usize),
}

fn op_strategy(lines: usize) -> impl Strategy<Value = Op> {
    prop_oneof![
        (0..lines, 1usize..8).prop_map(|(l, n)| Op::Expand(l, n)),
        (0..lines).prop_map(Op::Collapse),
        (0..lines, 0usize..8).prop_map(|(l, n)| Op::Resize(l, n)),
    ]
}

fn apply(idx: &mut RowIndex, op: &Op) {
    match *op {
        Op::Expand(l, n) => {
            idx.expand(l, n);
        }
        Op::Collapse(l) => {
            idx.collapse(l);
        }
        Op::Resize(l, n) => {
            if idx.is_line_expanded(l) {
                idx.set_block_len(l, n);
            }
        }
    }
}

fn check_invariants(idx: &RowIndex) -> Result<(), TestCaseError> {
    let rows = idx.rows();
    prop_assert_eq!(rows.len(), idx.row_count());
    prop_assert!(rows.windows(2).all(|w| w[0] <= w[1]), "non-decreasing");
    for line in 0..idx.line_count() {
        let count = rows.iter().filter(|&&l| l == line).count();
        prop_assert!(count >= 1, "line {} missing", line);
        prop_assert_eq!(count, idx.run_length(line));
        let row = idx.line_to_row(line).unwrap();
        prop_assert_eq!(idx.row_to_line(row), Some(RowPos { line, disass: None }));
    }
    for (row, &line) in rows.iter().enumerate() {
        let pos = idx.row_to_line(row).unwrap();
        prop_assert_eq!(pos.line, line);
        prop_assert_eq!(idx.is_row_disassembly_row(row), pos.disass.is_some());
        prop_assert_eq!(idx.is_row_expanded(row), idx.run_length(line) > 1);
    }
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_under_random_ops(
        lines in 1usize..40,
        ops in prop::collection::vec(op_strategy(40), 0..60),
    ) {
        let mut idx = RowIndex::new(lines);
        for op in &ops {
            apply(&mut idx, op);
            check_invariants(&idx)?;
        }
    }

    #[test]
    fn expand_then_collapse_restores_rows(
        lines in 1usize..40,
        ops in prop::collection::vec(op_strategy(40), 0..30),
        target in 0usize..40,
        n in 1usize..10,
    ) {
        let mut idx = RowIndex::new(lines);
        for op in &ops {
            apply(&mut idx, op);
        }
        let target = target % lines;
        idx.collapse(target);
        let before = idx.rows();
        idx.expand(target, n);
        prop_assert_eq!(idx.run_length(target), n + 1);
        idx.collapse(target);
        prop_assert_eq!(idx.rows(), before);
    }

    #[test]
    fn remap_keeps_cursor_line(
        lines in 2usize..30,
        target in 0usize..30,
        n in 1usize..10,
        cursor_line in 0usize..30,
    ) {
        let mut idx = RowIndex::new(lines);
        let target = target % lines;
        let cursor_line = cursor_line % lines;
        let row = idx.line_to_row(cursor_line).unwrap();
        let change = idx.expand(target, n).unwrap();
        let moved = change.remap_row(row);
        prop_assert_eq!(idx.row_to_line(moved).map(|p| p.line), Some(cursor_line));
    }
}
