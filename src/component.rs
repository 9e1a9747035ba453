//! Disassembly components.
//!
//! A bank segments into an ordered run of components: subroutines (decoded
//! instruction runs), tables (data bytes), and words (the interrupt-vector
//! pointers). All three support the same small surface — position, length,
//! raw bytes, label text — so the classifier and formatter can treat them
//! uniformly through the [`Component`] sum type.
//!
//! Components do not hold a reference back to their bank; anything that
//! needs bank context (the bank number for label names, label lookup for
//! operands) receives it as an argument.

use crate::opcode;
use crate::types::{AddrMode, DisasmOptions, Indexing};

/// Mnemonics that terminate a subroutine.
const TERMINATORS: [&str; 3] = ["rts", "rti", "jmp"];

/// Mnemonics that write memory. Their absolute operands target RAM, so
/// they never resolve to code labels or MMIO names.
const STORES: [&str; 5] = ["sta", "stx", "sty", "dec", "inc"];

/// A single decoded instruction positioned at a CPU address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    /// CPU address of the first byte.
    pub position: u16,
    /// Lowercase mnemonic.
    pub mnemonic: &'static str,
    /// Addressing mode.
    pub mode: AddrMode,
    /// Index register applied to the operand.
    pub indexing: Indexing,
    /// Raw bytes, 1-3 of them.
    pub bytes: Vec<u8>,
    /// Label stamped by the resolution pass when something targets this
    /// instruction.
    pub label: Option<String>,
}

impl Instruction {
    /// Decode an instruction at a CPU address. Returns `None` when the
    /// bytes do not start with a documented opcode.
    pub fn decode_at(bytes: &[u8], position: u16, dq_brk: bool) -> Option<Self> {
        let decoded = opcode::decode(bytes, dq_brk)?;
        Some(Self {
            position,
            mnemonic: decoded.mnemonic,
            mode: decoded.mode,
            indexing: decoded.indexing,
            bytes: bytes[..usize::from(decoded.length)].to_vec(),
            label: None,
        })
    }

    /// First raw byte.
    pub fn opcode(&self) -> u8 {
        self.bytes[0]
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// True for mnemonics that write memory.
    pub fn is_store(&self) -> bool {
        STORES.contains(&self.mnemonic)
    }

    /// Destination CPU address of a branch instruction.
    pub fn branch_target(&self) -> u16 {
        let offset = i32::from(self.bytes[1] as i8);
        ((i32::from(self.position) + 2 + offset) & 0xFFFF) as u16
    }

    /// Operand address of an absolute instruction.
    pub fn absolute_target(&self) -> u16 {
        u16::from_le_bytes([self.bytes[1], self.bytes[2]])
    }

    /// Canonical label for this instruction in the given bank.
    pub fn label_text(&self, bank_number: usize) -> String {
        format!("b{}_{:04x}", bank_number, self.position)
    }

    /// Label for an address inside this instruction, with a `+N` suffix
    /// when it is not the first byte.
    pub fn label_at(&self, addr: u16, bank_number: usize) -> String {
        let label = self.label_text(bank_number);
        if addr == self.position {
            label
        } else {
            format!("{}+{}", label, addr - self.position)
        }
    }
}

/// A contiguous run of instructions classified as executable code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subroutine {
    /// CPU address of the first instruction.
    pub position: u16,
    /// The instructions, contiguous and in address order.
    pub instructions: Vec<Instruction>,
}

impl Subroutine {
    /// Create an empty subroutine starting at an address.
    pub fn new(position: u16) -> Self {
        Self {
            position,
            instructions: Vec::new(),
        }
    }

    /// Append the next instruction.
    pub fn push(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }

    /// Whether the run has reached a terminator: `rts`, `rti`, `jmp`, or
    /// any user-configured terminator substring.
    pub fn is_complete(&self, options: &DisasmOptions) -> bool {
        let Some(last) = self.instructions.last() else {
            return false;
        };
        if TERMINATORS.contains(&last.mnemonic) {
            return true;
        }
        options
            .terminators
            .iter()
            .any(|t| !t.is_empty() && last.mnemonic.contains(t.as_str()))
    }

    /// Whether the run counts as real code: complete and at least
    /// `min_sub_size` instructions, unless the validity check is off.
    pub fn is_valid(&self, options: &DisasmOptions) -> bool {
        options.no_sub_check
            || (self.is_complete(options) && self.instructions.len() >= options.min_sub_size)
    }

    /// Total length in bytes.
    pub fn len(&self) -> usize {
        self.instructions.iter().map(Instruction::len).sum()
    }

    /// Whether the run holds no instructions yet.
    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// Concatenated raw bytes.
    pub fn bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.len());
        for instruction in &self.instructions {
            out.extend_from_slice(&instruction.bytes);
        }
        out
    }

    /// The instruction containing an address, if any.
    pub fn instruction_at(&self, addr: u16) -> Option<&Instruction> {
        self.instructions
            .iter()
            .find(|i| addr >= i.position && u32::from(addr) < u32::from(i.position) + i.len() as u32)
    }

    /// Mutable access to the instruction containing an address.
    pub fn instruction_at_mut(&mut self, addr: u16) -> Option<&mut Instruction> {
        self.instructions
            .iter_mut()
            .find(|i| addr >= i.position && u32::from(addr) < u32::from(i.position) + i.len() as u32)
    }
}

/// A contiguous run of bytes classified as data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    /// CPU address of the first byte.
    pub position: u16,
    /// The data bytes.
    pub bytes: Vec<u8>,
    /// Label stamped by the resolution pass when something targets this
    /// table.
    pub label: Option<String>,
}

impl Table {
    /// Create an empty table starting at an address.
    pub fn new(position: u16) -> Self {
        Self {
            position,
            bytes: Vec::new(),
            label: None,
        }
    }

    /// Append one byte.
    pub fn push(&mut self, byte: u8) {
        self.bytes.push(byte);
    }

    /// Append several bytes.
    pub fn extend(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Whether the table holds no bytes yet.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Canonical label for this table in the given bank.
    pub fn label_text(&self, bank_number: usize) -> String {
        format!("tab_b{}_{:04x}", bank_number, self.position)
    }

    /// Label for an address inside this table, with a `+N` suffix when it
    /// is not the first byte.
    pub fn label_at(&self, addr: u16, bank_number: usize) -> String {
        let label = self.label_text(bank_number);
        if addr == self.position {
            label
        } else {
            format!("{}+{}", label, addr - self.position)
        }
    }
}

/// A 16-bit little-endian pointer. Only the NMI/RESET/IRQ interrupt
/// vectors are represented this way.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Word {
    /// CPU address of the low byte.
    pub position: u16,
    /// Low byte.
    pub lo: u8,
    /// High byte.
    pub hi: u8,
    /// Fixed label (`NMI`, `RESET`, `IRQ`, possibly bank-prefixed).
    pub label: String,
    /// Trailing comment, if any.
    pub comment: String,
}

impl Word {
    /// Create a labeled word from its two bytes.
    pub fn new(position: u16, lo: u8, hi: u8, label: String) -> Self {
        Self {
            position,
            lo,
            hi,
            label,
            comment: String::new(),
        }
    }

    /// The 16-bit address this word points at.
    pub fn addr(&self) -> u16 {
        u16::from(self.hi) << 8 | u16::from(self.lo)
    }

    /// The two raw bytes, in memory order.
    pub fn bytes(&self) -> [u8; 2] {
        [self.lo, self.hi]
    }

    /// Label for an address inside this word.
    pub fn label_at(&self, addr: u16) -> String {
        if addr == self.position {
            self.label.clone()
        } else {
            format!("{}+{}", self.label, addr - self.position)
        }
    }
}

/// One segment of a bank: code, data, or an interrupt vector.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Component {
    /// Decoded instruction run.
    Subroutine(Subroutine),
    /// Data bytes.
    Table(Table),
    /// Interrupt-vector pointer.
    Word(Word),
}

impl Component {
    /// CPU address of the first byte.
    pub fn position(&self) -> u16 {
        match self {
            Component::Subroutine(s) => s.position,
            Component::Table(t) => t.position,
            Component::Word(w) => w.position,
        }
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        match self {
            Component::Subroutine(s) => s.len(),
            Component::Table(t) => t.len(),
            Component::Word(_) => 2,
        }
    }

    /// Whether the component holds no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Raw bytes in memory order.
    pub fn bytes(&self) -> Vec<u8> {
        match self {
            Component::Subroutine(s) => s.bytes(),
            Component::Table(t) => t.bytes.clone(),
            Component::Word(w) => w.bytes().to_vec(),
        }
    }

    /// Whether an address falls inside this component.
    pub fn contains(&self, addr: u16) -> bool {
        addr >= self.position() && u32::from(addr) < u32::from(self.position()) + self.len() as u32
    }

    /// Canonical label text for an address inside this component.
    pub fn label_at(&self, addr: u16, bank_number: usize) -> String {
        match self {
            Component::Subroutine(s) => s
                .instruction_at(addr)
                .map(|i| i.label_at(addr, bank_number))
                .unwrap_or_else(|| format!("${addr:04x}")),
            Component::Table(t) => t.label_at(addr, bank_number),
            Component::Word(w) => w.label_at(addr),
        }
    }

    /// Stamp a label on the piece of this component containing `addr`, so
    /// the formatter emits a label line for it.
    pub fn stamp_label(&mut self, addr: u16, bank_number: usize) {
        match self {
            Component::Subroutine(s) => {
                if let Some(instruction) = s.instruction_at_mut(addr) {
                    let label = instruction.label_text(bank_number);
                    instruction.label = Some(label);
                }
            }
            Component::Table(t) => {
                let label = t.label_text(bank_number);
                t.label = Some(label);
            }
            // Vector words carry their label from construction.
            Component::Word(_) => {}
        }
    }
}
