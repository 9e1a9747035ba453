//! Bank classification.
//!
//! A bank is a fixed-size region of PRG ROM positioned somewhere in
//! [$8000, $10000). Construction walks the raw bytes once, segmenting them
//! into subroutines, data tables, and (for the bank at the top of the
//! address space) the three interrupt-vector words. If the caller does not
//! know the base address, the jump targets of the first pass are used to
//! infer it and the walk runs once more from the corrected base. A final
//! pass stamps labels on every branch and jump target so the formatter can
//! emit label lines without mutating anything.

use crate::component::{Component, Instruction, Subroutine, Table, Word};
use crate::mmio;
use crate::types::{AddrMode, DisasmOptions};

/// A classified ROM bank.
#[derive(Debug, Clone)]
pub struct Bank {
    /// Index of this bank within PRG ROM.
    pub number: usize,
    /// CPU address the bank bytes start at.
    pub base: u16,
    /// Classified segments, contiguous and in address order.
    pub components: Vec<Component>,
    bytes: Vec<u8>,
    fixed_banks: usize,
}

impl Bank {
    /// Classify a bank.
    ///
    /// `base` is the CPU address the bank maps at, or `None` to infer it
    /// from the bank's own jump targets. `fixed_banks` is the mapper's
    /// count of non-swappable banks at the top of the address space; it
    /// bounds base inference and decides whether the vector labels get a
    /// bank prefix.
    pub fn new(
        number: usize,
        base: Option<u16>,
        bytes: Vec<u8>,
        fixed_banks: usize,
        options: &DisasmOptions,
    ) -> Self {
        let mut bank = Self {
            number,
            base: base.unwrap_or(0x8000),
            components: Vec::new(),
            bytes,
            fixed_banks,
        };
        bank.disassemble(options);
        if base.is_none() {
            let inferred = bank.infer_base();
            if inferred != bank.base {
                tracing::debug!(
                    "bank {}: correcting base ${:04x} -> ${:04x}",
                    bank.number,
                    bank.base,
                    inferred
                );
                bank.base = inferred;
                bank.disassemble(options);
            }
        }
        bank.resolve_labels();
        bank
    }

    /// Length of the bank in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the bank holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// The raw bank bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The component containing an address, if the address is in this bank.
    pub fn find_component(&self, addr: u16) -> Option<&Component> {
        self.components.iter().find(|c| c.contains(addr))
    }

    fn find_component_mut(&mut self, addr: u16) -> Option<&mut Component> {
        self.components.iter_mut().find(|c| c.contains(addr))
    }

    /// Label text for an address: the canonical component label when the
    /// address is inside this bank, a bare `$xxxx` otherwise.
    pub fn label_for(&self, addr: u16) -> String {
        match self.find_component(addr) {
            Some(c) => c.label_at(addr, self.number),
            None => format!("${addr:04x}"),
        }
    }

    /// Run classification over the bank bytes, splitting off the trailing
    /// six vector bytes.
    fn disassemble(&mut self, options: &DisasmOptions) {
        let split = self.bytes.len().saturating_sub(6);
        self.components = classify(&self.bytes[..split], self.base, options);
        if self.bytes.len() >= 6 {
            let mut vectors = [0u8; 6];
            vectors.copy_from_slice(&self.bytes[split..]);
            self.attach_vectors(vectors);
        }
    }

    /// Attach the trailing six bytes: as the NMI/RESET/IRQ word triple when
    /// this bank tops out the address space, as plain table data otherwise.
    fn attach_vectors(&mut self, vectors: [u8; 6]) {
        let size = self.bytes.len() as u32;
        let top = u32::from(self.base) + size;
        // No need to prefix the labels if there are fixed banks.
        let prefix = if self.fixed_banks == 0 {
            format!("b{}_", self.number)
        } else {
            String::new()
        };
        let pos = |k: u32| (top - 6 + 2 * k) as u16;
        let nmi = Word::new(pos(0), vectors[0], vectors[1], format!("{prefix}NMI"));
        let reset = Word::new(pos(1), vectors[2], vectors[3], format!("{prefix}RESET"));
        let irq = Word::new(pos(2), vectors[4], vectors[5], format!("{prefix}IRQ"));
        if top == 0x1_0000 {
            self.components.push(Component::Word(nmi));
            self.components.push(Component::Word(reset));
            self.components.push(Component::Word(irq));
        } else {
            if !matches!(self.components.last(), Some(Component::Table(_))) {
                self.components
                    .push(Component::Table(Table::new(pos(0))));
            }
            if let Some(Component::Table(t)) = self.components.last_mut() {
                t.extend(&vectors);
            }
        }
    }

    /// Guess the base address from this bank's own jump targets.
    ///
    /// A bank can sit on any boundary of its own size between $8000 and the
    /// fixed banks at the top; code compiled for base B predominantly jumps
    /// into [B, B+size), so the candidate with the most outgoing jmp/jsr
    /// targets wins. The top slot only stays a candidate when the bank ends
    /// in a vector table.
    fn infer_base(&self) -> u16 {
        let size = self.bytes.len() as u32;
        if size == 0 {
            return self.base;
        }
        let top = 0x1_0000u32.saturating_sub(size * self.fixed_banks as u32);
        let mut candidates: Vec<u32> = Vec::new();
        let mut b = 0x8000u32;
        while b <= top {
            candidates.push(b);
            b += size;
        }
        if !matches!(self.components.last(), Some(Component::Word(_))) {
            candidates.pop();
        }
        if candidates.len() < 2 {
            return candidates
                .first()
                .map_or(self.base, |&c| c as u16);
        }

        let mut counts = vec![0usize; candidates.len()];
        for component in &self.components {
            let Component::Subroutine(sub) = component else {
                continue;
            };
            for instruction in &sub.instructions {
                if instruction.mode != AddrMode::Absolute
                    || !matches!(instruction.mnemonic, "jmp" | "jsr")
                {
                    continue;
                }
                let target = u32::from(instruction.absolute_target());
                for (k, &candidate) in candidates.iter().enumerate() {
                    if target > candidate && target < candidate + size {
                        counts[k] += 1;
                    }
                }
            }
        }
        let mut best = 0;
        for (k, &count) in counts.iter().enumerate() {
            if count > counts[best] {
                best = k;
            }
        }
        candidates[best] as u16
    }

    /// Stamp labels on every component targeted by a branch, a non-store
    /// absolute operand, or a vector word. Runs once after classification;
    /// rendering afterwards is read-only.
    fn resolve_labels(&mut self) {
        let mut targets: Vec<u16> = Vec::new();
        for component in &self.components {
            match component {
                Component::Subroutine(sub) => {
                    for instruction in &sub.instructions {
                        match instruction.mode {
                            AddrMode::Branch => targets.push(instruction.branch_target()),
                            AddrMode::Absolute if !instruction.is_store() => {
                                let addr = instruction.absolute_target();
                                // MMIO operands render as register names.
                                if mmio::register_name(addr).is_none() {
                                    targets.push(addr);
                                }
                            }
                            _ => {}
                        }
                    }
                }
                Component::Word(word) => targets.push(word.addr()),
                Component::Table(_) => {}
            }
        }
        let number = self.number;
        for addr in targets {
            if let Some(component) = self.find_component_mut(addr) {
                component.stamp_label(addr, number);
            }
        }
    }
}

/// Segment raw bytes into subroutines and tables.
fn classify(body: &[u8], base: u16, options: &DisasmOptions) -> Vec<Component> {
    let mut components: Vec<Component> = Vec::new();
    let mut i = 0usize;
    while i < body.len() {
        let end = (i + 3).min(body.len());
        let position = (u32::from(base) + i as u32) as u16;
        if let Some(instruction) = Instruction::decode_at(&body[i..end], position, options.dq_brk)
        {
            let continue_current = matches!(
                components.last(),
                Some(Component::Subroutine(s)) if !s.is_complete(options)
            );
            if !continue_current {
                if matches!(components.last(), Some(Component::Subroutine(_))) {
                    demote_invalid(&mut components, options);
                }
                components.push(Component::Subroutine(Subroutine::new(position)));
            }
            i += instruction.len();
            if let Some(Component::Subroutine(sub)) = components.last_mut() {
                sub.push(instruction);
            }
        } else {
            if matches!(components.last(), Some(Component::Subroutine(_))) {
                demote_invalid(&mut components, options);
            }
            if !matches!(components.last(), Some(Component::Table(_))) {
                components.push(Component::Table(Table::new(position)));
            }
            if let Some(Component::Table(table)) = components.last_mut() {
                table.push(body[i]);
            }
            i += 1;
        }
    }
    components
}

/// Demote a trailing invalid subroutine to a table, merging it with any
/// tables immediately before it.
fn demote_invalid(components: &mut Vec<Component>, options: &DisasmOptions) {
    let invalid = matches!(
        components.last(),
        Some(Component::Subroutine(s)) if !s.is_valid(options)
    );
    if !invalid {
        return;
    }
    let Some(Component::Subroutine(sub)) = components.pop() else {
        return;
    };
    let mut table = Table {
        position: sub.position,
        bytes: sub.bytes(),
        label: None,
    };
    while matches!(components.last(), Some(Component::Table(_))) {
        let Some(Component::Table(mut previous)) = components.pop() else {
            break;
        };
        previous.extend(&table.bytes);
        table = previous;
    }
    components.push(Component::Table(table));
}
