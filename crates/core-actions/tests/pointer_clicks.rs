mod common;

use common::view;
use core_actions::{Action, GutterColumn, dispatch};
use core_events::{Address, ClickButton, DisassembledInsn, SourceNotification};
use core_model::{PixelPoint, PixelRect};
use pretty_assertions::assert_eq;

const LEFT: ClickButton = ClickButton::Left { shift: false };

#[test]
fn click_text_selects_expression_and_reports_it() {
    let mut v = view("int main() {\n\tp->next = 0;\n}\n");
    let word = v.click_text(PixelPoint::new(11 * 8 + 2, 16 + 3), LEFT).unwrap();
    assert_eq!(word.text, "p->next");
    assert_eq!(word.row, 1);
    assert_eq!(word.rect, PixelRect { x: 64, y: 16, width: 56, height: 16 });
    assert_eq!(v.cursor().row, 1);
    assert_eq!(v.cursor().selection(), 1..8);
    assert_eq!(
        v.pending_notifications(),
        &[SourceNotification::Clicked {
            expression: Some("p->next".into()),
            line: 1,
            address: None,
            button: LEFT,
        }]
    );
}

#[test]
fn click_on_instruction_row_carries_address() {
    let mut v = view("x = count;\ny = 1;\n");
    v.expand(0);
    v.disassembled(0, vec![DisassembledInsn::new("mov eax, count", 0x20u64)]);
    let word = v
        .click_text(PixelPoint::new(9 * 8 + 1, 16 + 4), ClickButton::Middle)
        .unwrap();
    assert_eq!(word.text, "count");
    assert_eq!(word.line, 0);
    assert_eq!(word.address, Some(Address(0x20)));
    assert_eq!(
        v.pending_notifications().last(),
        Some(&SourceNotification::Clicked {
            expression: Some("count".into()),
            line: 0,
            address: Some(Address(0x20)),
            button: ClickButton::Middle,
        })
    );
}

#[test]
fn clicks_on_blank_space_do_nothing() {
    let mut v = view("a = b;\n");
    assert!(v.click_text(PixelPoint::new(8 * 20, 2), LEFT).is_none());
    assert!(v.click_text(PixelPoint::new(8 * 2, 2), LEFT).is_none());
    assert!(v.click_text(PixelPoint::new(-4, 2), LEFT).is_none());
    assert!(v.pending_notifications().is_empty());
}

#[test]
fn expander_column_toggles_source_rows_only() {
    let mut v = view("a;\nb;\n");
    assert!(v.click_gutter(0, GutterColumn::Expander, LEFT));
    assert_eq!(v.pending_notifications(), &[SourceNotification::DisassembleRequested(0)]);
    v.disassembled(0, vec![DisassembledInsn::new("nop", 1u64)]);
    assert!(!v.click_gutter(1, GutterColumn::Expander, LEFT));
    assert!(v.click_gutter(0, GutterColumn::Expander, LEFT));
    assert!(!v.is_line_expanded(0));
    assert!(!v.click_gutter(7, GutterColumn::Expander, LEFT));
}

#[test]
fn marker_column_reports_line_and_address() {
    let mut v = view("a;\nb;\n");
    v.expand(1);
    v.disassembled(1, vec![DisassembledInsn::new("nop", 0x30u64)]);
    let mut sink = Vec::new();
    v.flush_notifications(&mut sink);
    let shift = ClickButton::Left { shift: true };
    let res = dispatch(
        &mut v,
        Action::ClickGutter {
            row: 2,
            column: GutterColumn::Markers,
            button: shift,
        },
    );
    assert!(res.dirty);
    assert_eq!(
        v.pending_notifications(),
        &[SourceNotification::Clicked {
            expression: None,
            line: 1,
            address: Some(Address(0x30)),
            button: shift,
        }]
    );
}

#[test]
fn click_text_action() {
    let mut v = view("foo.bar[i] = 1;\n");
    let res = dispatch(
        &mut v,
        Action::ClickText {
            point: PixelPoint::new(5 * 8, 0),
            button: LEFT,
        },
    );
    assert!(res.dirty);
    assert_eq!(v.cursor().selection(), 0..10);
}
