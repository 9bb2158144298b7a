use core_events::{Address, DisassembledInsn};

/// State of one logical source line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    pub disass: Vec<DisassembledInsn>,
    pub can_disass: bool,
    pub expand_pending: bool,
}

impl Default for SourceLine {
    fn default() -> Self {
        Self {
            disass: Vec::new(),
            can_disass: true,
            expand_pending: false,
        }
    }
}

impl SourceLine {
    pub fn has_disassembly(&self) -> bool {
        !self.disass.is_empty()
    }

    pub fn address_at(&self, offset: usize) -> Option<Address> {
        self.disass.get(offset).map(|i| i.address)
    }

    pub fn exact_address_offset(&self, address: Address) -> Option<usize> {
        self.disass.iter().position(|i| i.address == address)
    }

    /// Offset of the instruction containing `address`.
    ///
    /// An exact match wins. An address strictly between two instructions
    /// resolves to the preceding one. Addresses below the first or above the
    /// last instruction are not part of the block.
    pub fn find_address_row_offset(&self, address: Address) -> Option<usize> {
        let first = self.disass.first()?.address;
        let last = self.disass.last()?.address;
        if let Some(exact) = self.exact_address_offset(address) {
            return Some(exact);
        }
        if address < first || address > last {
            return None;
        }
        self.disass.iter().rposition(|i| i.address < address)
    }
}

/// What a disassembly delivery changed, for the row index to follow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub previous_len: usize,
    pub new_len: usize,
    pub was_pending: bool,
}

#[derive(Debug, Clone, Default)]
pub struct LineStore {
    lines: Vec<SourceLine>,
}

impl LineStore {
    pub fn new(line_count: usize) -> Self {
        Self {
            lines: vec![SourceLine::default(); line_count],
        }
    }

    /// Drop all disassembly and flags and resize to `line_count` lines.
    pub fn reset(&mut self, line_count: usize) {
        self.lines.clear();
        self.lines.resize(line_count, SourceLine::default());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn get(&self, line: usize) -> Option<&SourceLine> {
        self.lines.get(line)
    }

    pub fn can_disassemble(&self, line: usize) -> bool {
        self.lines.get(line).is_some_and(|l| l.can_disass)
    }

    pub fn is_pending(&self, line: usize) -> bool {
        self.lines.get(line).is_some_and(|l| l.expand_pending)
    }

    pub fn block_len(&self, line: usize) -> usize {
        self.lines.get(line).map_or(0, |l| l.disass.len())
    }

    /// Record that `line` wants to expand once disassembly arrives.
    /// Returns false when the line cannot be disassembled or is already waiting.
    pub fn mark_pending(&mut self, line: usize) -> bool {
        match self.lines.get_mut(line) {
            Some(l) if l.can_disass && !l.expand_pending => {
                l.expand_pending = true;
                true
            }
            _ => false,
        }
    }

    /// Returns true if a pending expansion was cancelled.
    pub fn cancel_pending(&mut self, line: usize) -> bool {
        match self.lines.get_mut(line) {
            Some(l) if l.expand_pending => {
                l.expand_pending = false;
                true
            }
            _ => false,
        }
    }

    /// Store a delivered block. An empty block marks the line as not
    /// disassemblable. Always clears the pending flag.
    pub fn deliver(&mut self, line: usize, code: Vec<DisassembledInsn>) -> Option<DeliveryOutcome> {
        let Some(l) = self.lines.get_mut(line) else {
            tracing::debug!(target: "srcview.disasm", line, "deliver_out_of_range");
            return None;
        };
        let outcome = DeliveryOutcome {
            previous_len: l.disass.len(),
            new_len: code.len(),
            was_pending: l.expand_pending,
        };
        l.expand_pending = false;
        if code.is_empty() {
            l.can_disass = false;
        }
        l.disass = code;
        tracing::trace!(
            target: "srcview.disasm",
            line,
            previous = outcome.previous_len,
            new = outcome.new_len,
            pending = outcome.was_pending,
            "deliver"
        );
        Some(outcome)
    }

    /// Drop every disassembly block and pending request, e.g. after the
    /// program was rebuilt. `can_disass` is reset to true.
    pub fn clear_disassembly(&mut self) {
        for l in &mut self.lines {
            *l = SourceLine::default();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn block(addrs: &[u64]) -> Vec<DisassembledInsn> {
        addrs
            .iter()
            .map(|&a| DisassembledInsn::new(format!("insn {a:#x}"), a))
            .collect()
    }

    fn line_with(addrs: &[u64]) -> SourceLine {
        SourceLine {
            disass: block(addrs),
            ..SourceLine::default()
        }
    }

    #[test]
    fn address_offset_exact_and_preceding() {
        let l = line_with(&[0x100, 0x104, 0x108]);
        assert_eq!(l.find_address_row_offset(Address(0x104)), Some(1));
        assert_eq!(l.find_address_row_offset(Address(0x106)), Some(1));
        assert_eq!(l.find_address_row_offset(Address(0x108)), Some(2));
        assert_eq!(l.find_address_row_offset(Address(0xff)), None);
        assert_eq!(l.find_address_row_offset(Address(0x200)), None);
        assert_eq!(SourceLine::default().find_address_row_offset(Address(0x100)), None);
    }

    #[test]
    fn deliver_clears_pending_and_reports_lengths() {
        let mut store = LineStore::new(3);
        assert!(store.mark_pending(1));
        assert!(!store.mark_pending(1));
        let out = store.deliver(1, block(&[1, 2])).unwrap();
        assert_eq!(
            out,
            DeliveryOutcome {
                previous_len: 0,
                new_len: 2,
                was_pending: true
            }
        );
        assert!(!store.is_pending(1));
        assert_eq!(store.block_len(1), 2);
        assert!(store.deliver(9, block(&[1])).is_none());
    }

    #[test]
    fn empty_delivery_disables_line() {
        let mut store = LineStore::new(2);
        store.mark_pending(0);
        store.deliver(0, Vec::new());
        assert!(!store.can_disassemble(0));
        assert!(!store.mark_pending(0));
        assert!(store.can_disassemble(1));
        assert!(!store.can_disassemble(5));
    }

    #[test]
    fn reset_and_clear() {
        let mut store = LineStore::new(2);
        store.deliver(0, block(&[4]));
        store.deliver(1, Vec::new());
        store.clear_disassembly();
        assert_eq!(store.block_len(0), 0);
        assert!(store.can_disassemble(1));
        store.reset(5);
        assert_eq!(store.len(), 5);
    }
}
