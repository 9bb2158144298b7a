use core_events::{Address, MarkerFlags};

/// Marker mask of one line plus the instruction addresses its markers refer to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MarkerEntry {
    pub flags: MarkerFlags,
    pub pc_inner: Option<Address>,
    pub pc_outer: Option<Address>,
    pub breakpoint: Option<Address>,
}

impl MarkerEntry {
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    /// Drop addresses whose marker bit is no longer set.
    fn prune(&mut self) {
        if !self.flags.contains(MarkerFlags::PC) {
            self.pc_inner = None;
        }
        if !self.flags.contains(MarkerFlags::PC_UP) {
            self.pc_outer = None;
        }
        if !self.flags.intersects(MarkerFlags::BP_ANY) {
            self.breakpoint = None;
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct MarkerSet {
    entries: Vec<MarkerEntry>,
}

impl MarkerSet {
    pub fn new(line_count: usize) -> Self {
        Self {
            entries: vec![MarkerEntry::default(); line_count],
        }
    }

    pub fn reset(&mut self, line_count: usize) {
        self.entries.clear();
        self.entries.resize(line_count, MarkerEntry::default());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn flags(&self, line: usize) -> MarkerFlags {
        self.entries.get(line).map_or(MarkerFlags::empty(), |e| e.flags)
    }

    pub fn entry(&self, line: usize) -> Option<&MarkerEntry> {
        self.entries.get(line)
    }

    /// Lines carrying any of `flags`, ascending.
    pub fn lines_with(&self, flags: MarkerFlags) -> impl Iterator<Item = usize> + '_ {
        self.entries
            .iter()
            .enumerate()
            .filter(move |(_, e)| e.flags.intersects(flags))
            .map(|(i, _)| i)
    }

    /// Replace the mask of one line. Returns true if it changed.
    pub fn update(&mut self, line: usize, flags: MarkerFlags) -> bool {
        let Some(entry) = self.entries.get_mut(line) else {
            return false;
        };
        if entry.flags == flags {
            return false;
        }
        entry.flags = flags;
        entry.prune();
        true
    }

    /// Replace every mask; lines missing from `snapshot` are cleared.
    /// Returns the lines whose mask changed, ascending.
    pub fn apply_snapshot<I>(&mut self, snapshot: I) -> Vec<usize>
    where
        I: IntoIterator<Item = (usize, MarkerFlags)>,
    {
        let mut next = vec![MarkerFlags::empty(); self.entries.len()];
        for (line, flags) in snapshot {
            if let Some(slot) = next.get_mut(line) {
                *slot = flags;
            }
        }
        let changed: Vec<usize> = next
            .into_iter()
            .enumerate()
            .filter_map(|(line, flags)| self.update(line, flags).then_some(line))
            .collect();
        tracing::debug!(target: "srcview.markers", changed = changed.len(), "apply_snapshot");
        changed
    }

    /// Set or clear the PC marker of a frame class on `line`.
    pub fn set_program_counter(
        &mut self,
        line: usize,
        address: Option<Address>,
        frame: usize,
        on: bool,
    ) -> bool {
        let Some(entry) = self.entries.get_mut(line) else {
            return false;
        };
        let bit = MarkerFlags::pc_for_frame(frame);
        let before = *entry;
        entry.flags.set(bit, on);
        let slot = if bit == MarkerFlags::PC {
            &mut entry.pc_inner
        } else {
            &mut entry.pc_outer
        };
        *slot = if on { address } else { None };
        *entry != before
    }

    /// Replace all breakpoint bits with `breakpoints` (line, bits, address),
    /// leaving PC bits alone. Returns the lines whose entry changed, ascending.
    pub fn apply_breakpoints<I>(&mut self, breakpoints: I) -> Vec<usize>
    where
        I: IntoIterator<Item = (usize, MarkerFlags, Option<Address>)>,
    {
        let before = self.entries.clone();
        for entry in &mut self.entries {
            entry.flags.remove(MarkerFlags::BP_ANY);
            entry.breakpoint = None;
        }
        for (line, flags, address) in breakpoints {
            let Some(entry) = self.entries.get_mut(line) else {
                continue;
            };
            entry.flags |= flags & MarkerFlags::BP_ANY;
            if entry.breakpoint.is_none() {
                entry.breakpoint = address;
            }
        }
        let changed: Vec<usize> = before
            .iter()
            .zip(self.entries.iter())
            .enumerate()
            .filter(|(_, (a, b))| a != b)
            .map(|(i, _)| i)
            .collect();
        tracing::debug!(target: "srcview.markers", changed = changed.len(), "apply_breakpoints");
        changed
    }
}
