//! Disassembly listings answering `DisassembleRequested` in the headless driver.
//!
//! One instruction per line: `LINE ADDRESS TEXT`, where `LINE` is the 1-based
//! source line, `ADDRESS` is hexadecimal (`0x` prefix optional) and `TEXT` is
//! the rest of the line. Blank lines and lines starting with `#` are skipped.
//! Instructions keep file order within a source line.
//!
//! ```text
//! # main.c
//! 3 0x401000 push rbp
//! 3 0x401001 mov rbp, rsp
//! 4 401004   mov dword ptr [rbp-4], 0
//! ```

use anyhow::{Context, Result, bail};
use core_events::{Address, DisassembledInsn};
use std::collections::BTreeMap;
use std::path::Path;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Listing {
    /// Zero-based source line -> block.
    blocks: BTreeMap<usize, Vec<DisassembledInsn>>,
}

impl Listing {
    pub fn parse(content: &str) -> Result<Self> {
        let mut blocks: BTreeMap<usize, Vec<DisassembledInsn>> = BTreeMap::new();
        for (idx, raw) in content.lines().enumerate() {
            let trimmed = raw.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            let (line, insn) = parse_entry(trimmed).with_context(|| format!("listing line {}", idx + 1))?;
            blocks.entry(line).or_default().push(insn);
        }
        Ok(Self { blocks })
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read listing {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid listing {}", path.display()))
    }

    /// Block for a zero-based line; empty when the listing has none.
    pub fn block(&self, line: usize) -> Vec<DisassembledInsn> {
        self.blocks.get(&line).cloned().unwrap_or_default()
    }

    pub fn lines(&self) -> impl Iterator<Item = usize> + '_ {
        self.blocks.keys().copied()
    }
}

fn parse_entry(entry: &str) -> Result<(usize, DisassembledInsn)> {
    let mut parts = entry.splitn(3, char::is_whitespace);
    let line_field = parts.next().unwrap_or_default();
    let line: usize = line_field
        .parse()
        .with_context(|| format!("bad line number {line_field:?}"))?;
    if line == 0 {
        bail!("line numbers start at 1");
    }
    let Some(addr_field) = parts.next() else {
        bail!("missing address");
    };
    let address = parse_address(addr_field)?;
    let text = parts.next().unwrap_or_default().trim();
    if text.is_empty() {
        bail!("missing instruction text");
    }
    Ok((line - 1, DisassembledInsn::new(text, address)))
}

pub fn parse_address(field: &str) -> Result<Address> {
    let digits = field
        .strip_prefix("0x")
        .or_else(|| field.strip_prefix("0X"))
        .unwrap_or(field);
    let raw = u64::from_str_radix(digits, 16).with_context(|| format!("bad address {field:?}"))?;
    Ok(Address(raw))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn groups_by_line_in_file_order() {
        let listing = Listing::parse(
            "# comment\n\n3 0x10 push rbp\n3 0x11   mov rbp,  rsp\n1 20 ret\n",
        )
        .unwrap();
        assert_eq!(listing.lines().collect::<Vec<_>>(), vec![0, 2]);
        assert_eq!(
            listing.block(2),
            vec![
                DisassembledInsn::new("push rbp", 0x10u64),
                DisassembledInsn::new("mov rbp,  rsp", 0x11u64),
            ]
        );
        assert_eq!(listing.block(0), vec![DisassembledInsn::new("ret", 0x20u64)]);
        assert!(listing.block(1).is_empty());
    }

    #[test]
    fn errors_name_the_offending_line() {
        let err = Listing::parse("1 0x10 nop\n2 zz nop\n").unwrap_err();
        assert!(format!("{err:#}").contains("listing line 2"));
        assert!(Listing::parse("0 0x10 nop").is_err());
        assert!(Listing::parse("4 0x10").is_err());
        assert!(Listing::parse("x 0x10 nop").is_err());
    }

    #[test]
    fn load_reads_file() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(tmp.path(), "2 0xff jmp 0x10\n").unwrap();
        let listing = Listing::load(tmp.path()).unwrap();
        assert_eq!(listing.block(1), vec![DisassembledInsn::new("jmp 0x10", 0xffu64)]);
        assert!(Listing::load(Path::new("__missing_listing__.txt")).is_err());
    }
}
