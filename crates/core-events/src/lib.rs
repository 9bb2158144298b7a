//! Shared vocabulary between the source-view engine and its collaborators.
//!
//! Two directions of traffic cross the engine boundary:
//! * Inbound `DebuggerEvent`s pushed by the debugger-control side (marker
//!   snapshots, disassembly results, program-counter updates, breakpoint lists).
//! * Outbound `SourceNotification`s consumed by the presentation layer
//!   (expanded / collapsed lines, disassembly requests, click results).
//!
//! The engine itself is single threaded. Notifications are queued inside the
//! engine and flushed into any `NotificationSink`; an async presentation loop
//! can hand in a tokio unbounded sender, tests usually hand in a `Vec`.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::mpsc::UnboundedSender;

// -------------------------------------------------------------------------------------------------
// Telemetry
// -------------------------------------------------------------------------------------------------
// Relaxed atomic counters; inspected by tests and logged by the driver on shutdown.
// -------------------------------------------------------------------------------------------------
pub static NOTIFICATIONS_SENT: AtomicU64 = AtomicU64::new(0);
pub static NOTIFICATION_SEND_FAILURES: AtomicU64 = AtomicU64::new(0);
pub static DISASSEMBLY_REQUESTS: AtomicU64 = AtomicU64::new(0);

/// Machine code address of one disassembled instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(pub u64);

impl From<u64> for Address {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

/// One row of a line's disassembly block as delivered by the debugger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisassembledInsn {
    pub text: String,
    pub address: Address,
}

impl DisassembledInsn {
    pub fn new(text: impl Into<String>, address: impl Into<Address>) -> Self {
        Self {
            text: text.into(),
            address: address.into(),
        }
    }
}

bitflags::bitflags! {
    /// Debugger state icons shown next to a source line.
    ///
    /// Breakpoint bits normally appear one per line, although temporary and
    /// conditional combine with enabled/disabled. PC bits combine freely with
    /// any breakpoint bit.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
    pub struct MarkerFlags: u8 {
        const PC = 1;
        const PC_UP = 2;
        const BP = 4;
        const BP_DISABLED = 8;
        const BP_TEMPORARY = 16;
        const BP_CONDITIONAL = 32;
        const BP_ORPHAN = 64;

        const PC_ANY = Self::PC.bits() | Self::PC_UP.bits();
        const BP_ANY = Self::BP.bits()
            | Self::BP_DISABLED.bits()
            | Self::BP_TEMPORARY.bits()
            | Self::BP_CONDITIONAL.bits()
            | Self::BP_ORPHAN.bits();
    }
}

impl MarkerFlags {
    /// PC bit for a stack frame: frame 0 is the innermost frame.
    pub fn pc_for_frame(frame: usize) -> Self {
        if frame == 0 { Self::PC } else { Self::PC_UP }
    }
}

/// Breakpoint description as known by the debugger-control side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointInfo {
    pub file: String,
    /// Zero-based source line.
    pub line: usize,
    pub address: Option<Address>,
    pub enabled: bool,
    pub temporary: bool,
    pub condition: Option<String>,
    pub ignore_count: u32,
    pub orphaned: bool,
}

impl BreakpointInfo {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            address: None,
            enabled: true,
            temporary: false,
            condition: None,
            ignore_count: 0,
            orphaned: false,
        }
    }

    /// Marker bits this breakpoint contributes to its line.
    pub fn marker_flags(&self) -> MarkerFlags {
        let mut flags = if self.enabled {
            MarkerFlags::BP
        } else {
            MarkerFlags::BP_DISABLED
        };
        if self.temporary {
            flags |= MarkerFlags::BP_TEMPORARY;
        }
        let has_condition = self.condition.as_deref().is_some_and(|c| !c.is_empty());
        if has_condition || self.ignore_count != 0 {
            flags |= MarkerFlags::BP_CONDITIONAL;
        }
        if self.orphaned {
            flags |= MarkerFlags::BP_ORPHAN;
        }
        flags
    }
}

/// Events pushed into the engine by the debugger-control collaborator.
#[derive(Debug, Clone)]
pub enum DebuggerEvent {
    /// Complete line -> marker mask mapping; lines absent from the snapshot are cleared.
    Markers(Vec<(usize, MarkerFlags)>),
    /// Current breakpoint list (all files; the engine filters by file name).
    Breakpoints(Vec<BreakpointInfo>),
    /// Disassembly result for one source line.
    Disassembled {
        line: usize,
        code: Vec<DisassembledInsn>,
    },
    /// Program counter of a stack frame entered or left a line.
    ProgramCounter {
        line: usize,
        address: Option<Address>,
        frame: usize,
        set: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClickButton {
    /// Left click; `shift` reports the shift modifier (temporary breakpoint toggles).
    Left { shift: bool },
    Middle,
}

/// Notifications emitted by the engine for the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceNotification {
    /// A source line now shows its disassembly block. PC markers of the line
    /// should be re-applied so they land on instruction rows.
    LineExpanded(usize),
    LineCollapsed(usize),
    /// The line has no disassembly yet; the debugger should disassemble it and
    /// answer with `DebuggerEvent::Disassembled`.
    DisassembleRequested(usize),
    /// Gutter (`expression == None`) or text click.
    Clicked {
        expression: Option<String>,
        line: usize,
        address: Option<Address>,
        button: ClickButton,
    },
}

/// Destination for engine notifications.
pub trait NotificationSink {
    /// Deliver one notification; returns false if the receiver is gone.
    fn notify(&mut self, notification: SourceNotification) -> bool;
}

impl NotificationSink for Vec<SourceNotification> {
    fn notify(&mut self, notification: SourceNotification) -> bool {
        self.push(notification);
        true
    }
}

impl NotificationSink for UnboundedSender<SourceNotification> {
    fn notify(&mut self, notification: SourceNotification) -> bool {
        self.send(notification).is_ok()
    }
}

/// Drain `items` into `sink`, updating telemetry. Returns the number delivered.
pub fn forward_all<I>(items: I, sink: &mut dyn NotificationSink) -> usize
where
    I: IntoIterator<Item = SourceNotification>,
{
    let mut delivered = 0;
    for n in items {
        if matches!(n, SourceNotification::DisassembleRequested(_)) {
            DISASSEMBLY_REQUESTS.fetch_add(1, Ordering::Relaxed);
        }
        if sink.notify(n) {
            delivered += 1;
            NOTIFICATIONS_SENT.fetch_add(1, Ordering::Relaxed);
        } else {
            NOTIFICATION_SEND_FAILURES.fetch_add(1, Ordering::Relaxed);
            tracing::warn!(target: "runtime.events", "notification_sink_closed");
        }
    }
    delivered
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_is_hex() {
        assert_eq!(Address(0x104).to_string(), "0x104");
        assert!(Address(0x100) < Address(0x104));
    }

    #[test]
    fn breakpoint_flags_follow_state() {
        let mut bp = BreakpointInfo::new("main.c", 4);
        assert_eq!(bp.marker_flags(), MarkerFlags::BP);
        bp.enabled = false;
        bp.temporary = true;
        assert_eq!(
            bp.marker_flags(),
            MarkerFlags::BP_DISABLED | MarkerFlags::BP_TEMPORARY
        );
        bp.enabled = true;
        bp.temporary = false;
        bp.ignore_count = 3;
        assert!(bp.marker_flags().contains(MarkerFlags::BP_CONDITIONAL));
        bp.ignore_count = 0;
        bp.condition = Some(String::new());
        assert!(!bp.marker_flags().contains(MarkerFlags::BP_CONDITIONAL));
        bp.orphaned = true;
        assert!(bp.marker_flags().contains(MarkerFlags::BP_ORPHAN));
    }

    #[test]
    fn pc_flag_per_frame() {
        assert_eq!(MarkerFlags::pc_for_frame(0), MarkerFlags::PC);
        assert_eq!(MarkerFlags::pc_for_frame(3), MarkerFlags::PC_UP);
        assert!(MarkerFlags::PC_ANY.contains(MarkerFlags::PC_UP));
        assert!(!MarkerFlags::BP_ANY.intersects(MarkerFlags::PC_ANY));
    }

    #[test]
    fn forward_into_vec() {
        let mut out: Vec<SourceNotification> = Vec::new();
        let n = forward_all(
            vec![
                SourceNotification::LineExpanded(3),
                SourceNotification::DisassembleRequested(4),
            ],
            &mut out,
        );
        assert_eq!(n, 2);
        assert_eq!(out[0], SourceNotification::LineExpanded(3));
    }

    #[tokio::test]
    async fn forward_into_channel() {
        let (mut tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
        let n = forward_all(vec![SourceNotification::LineCollapsed(1)], &mut tx);
        assert_eq!(n, 1);
        assert_eq!(rx.recv().await, Some(SourceNotification::LineCollapsed(1)));
    }

    #[test]
    fn closed_channel_counts_failure() {
        let (mut tx, rx) = tokio::sync::mpsc::unbounded_channel();
        drop(rx);
        let before = NOTIFICATION_SEND_FAILURES.load(Ordering::Relaxed);
        let n = forward_all(vec![SourceNotification::LineCollapsed(1)], &mut tx);
        assert_eq!(n, 0);
        assert!(NOTIFICATION_SEND_FAILURES.load(Ordering::Relaxed) > before);
    }
}
