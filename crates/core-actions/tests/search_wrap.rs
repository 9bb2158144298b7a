mod common;

use common::view;
use core_actions::{Action, DispatchResult, FindDirection, dispatch};
use core_events::DisassembledInsn;
use pretty_assertions::assert_eq;

const TEXT: &str = "int main() {\n  helper();\n  return 0;\n}\n";

/// Rows: 0 `int main() {`, 1 `  helper();`, 2 `push rbp`, 3 `call helper`,
/// 4 `  return 0;`, 5 `}`.
fn expanded() -> core_actions::SourceView {
    let mut v = view(TEXT);
    v.expand(1);
    v.disassembled(
        1,
        vec![
            DisassembledInsn::new("push rbp", 0x10u64),
            DisassembledInsn::new("call helper", 0x14u64),
        ],
    );
    v
}

fn hit(v: &mut core_actions::SourceView, dir: FindDirection) -> Option<(usize, std::ops::Range<usize>)> {
    v.find("helper", false, dir).map(|h| (h.row, h.range))
}

#[test]
fn forward_search_visits_disassembly_rows_and_wraps() {
    let mut v = expanded();
    assert_eq!(hit(&mut v, FindDirection::Forward), Some((1, 2..8)));
    assert_eq!(v.cursor().selection(), 2..8);
    assert_eq!(hit(&mut v, FindDirection::Forward), Some((3, 5..11)));
    assert_eq!(v.cursor().row, 3);
    assert_eq!(hit(&mut v, FindDirection::Forward), Some((1, 2..8)));
}

#[test]
fn backward_search_wraps_through_the_end() {
    let mut v = expanded();
    v.find("helper", false, FindDirection::Forward);
    assert_eq!(hit(&mut v, FindDirection::Backward), Some((3, 5..11)));
    assert_eq!(hit(&mut v, FindDirection::Backward), Some((1, 2..8)));
}

#[test]
fn single_match_is_found_again_after_full_cycle() {
    let mut v = view(TEXT);
    assert_eq!(v.find("return", true, FindDirection::Forward).map(|h| h.row), Some(2));
    assert_eq!(v.find("return", true, FindDirection::Forward).map(|h| h.row), Some(2));
}

#[test]
fn miss_leaves_cursor_alone() {
    let mut v = expanded();
    v.scroll_to(2, None);
    let before = v.cursor();
    assert_eq!(v.find("zzz", false, FindDirection::Forward), None);
    assert_eq!(v.find("", false, FindDirection::Backward), None);
    assert_eq!(v.cursor(), before);
}

#[test]
fn case_sensitivity() {
    let mut v = view(TEXT);
    assert_eq!(v.find("HELPER", true, FindDirection::Forward), None);
    assert_eq!(v.find("HELPER", false, FindDirection::Forward).map(|h| h.row), Some(1));
    assert_eq!(v.find_default("MAIN", FindDirection::Forward).map(|h| h.row), Some(0));
}

#[test]
fn find_action_reports_match() {
    let mut v = expanded();
    let found = dispatch(
        &mut v,
        Action::Find {
            needle: "call".into(),
            case_sensitive: true,
            direction: FindDirection::Forward,
        },
    );
    assert_eq!(found, DispatchResult::found());
    assert_eq!(v.cursor().row, 3);
    let missing = dispatch(
        &mut v,
        Action::Find {
            needle: "CALL".into(),
            case_sensitive: true,
            direction: FindDirection::Forward,
        },
    );
    assert_eq!(missing, DispatchResult::clean());
}
