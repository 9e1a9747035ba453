//! Assembler-source rendering.
//!
//! Rendering is a pure pass over classified banks: labels were already
//! stamped during bank construction, so every function here only reads.
//! The layout contract is fixed: a twelve-column label field, operands
//! padded to column 40, then a `; AAAAA:  xx xx ..` trace giving the
//! linear offset of the bytes within the PRG image so output can be
//! checked against a hex dump of the ROM.

use crate::bank::Bank;
use crate::component::{Component, Instruction, Subroutine, Table, Word};
use crate::header::Header;
use crate::mmio;
use crate::types::{AddrMode, Indexing};

/// Width of the label column.
const LABEL_COLUMN: usize = 12;

/// Column where the source trace starts.
const TRACE_COLUMN: usize = 40;

/// Render a whole bank: a `.base` directive followed by every component.
pub fn render_bank(bank: &Bank) -> String {
    let mut out = format!(".base ${:04x}\n\n", bank.base);
    for component in &bank.components {
        out.push_str(&render_component(component, bank));
    }
    out
}

/// Render one component.
pub fn render_component(component: &Component, bank: &Bank) -> String {
    match component {
        Component::Subroutine(sub) => render_subroutine(sub, bank),
        Component::Table(table) => render_table(table, bank),
        Component::Word(word) => render_word(word, bank),
    }
}

/// Render a subroutine: its instructions followed by a blank line.
pub fn render_subroutine(sub: &Subroutine, bank: &Bank) -> String {
    let mut out = String::new();
    for instruction in &sub.instructions {
        out.push_str(&render_instruction(instruction, bank));
    }
    out.push('\n');
    out
}

/// Render a single instruction line (two lines for `brk`).
pub fn render_instruction(instruction: &Instruction, bank: &Bank) -> String {
    let source_pos = source_position(instruction.position, bank);
    let mut out = label_field(instruction.label.as_deref());

    // brk: emit the mnemonic, then its signature byte(s) as a hex
    // directive so reassembly keeps the layout.
    if instruction.opcode() == 0x00 {
        let b1 = instruction.bytes[1];
        out.push_str("brk");
        out.push_str(&" ".repeat(25));
        out.push_str(&format!("; {source_pos:05X}:  00\n"));
        out.push_str(&" ".repeat(LABEL_COLUMN));
        if instruction.bytes.len() > 2 {
            let b2 = instruction.bytes[2];
            out.push_str(&format!("hex {b1:02x} {b2:02x}"));
            out.push_str(&" ".repeat(19));
            out.push_str(&format!("; {:05X}:  {b1:02x} {b2:02x}\n", source_pos + 1));
        } else {
            out.push_str(&format!("hex {b1:02x}"));
            out.push_str(&" ".repeat(22));
            out.push_str(&format!("; {:05X}:  {b1:02x}\n", source_pos + 1));
        }
        return out;
    }

    out.push_str(&render_operand(instruction, bank));
    pad_to(&mut out, TRACE_COLUMN);
    out.push_str(&format!("; {source_pos:05X}:  "));
    out.push_str(&hex_bytes(&instruction.bytes));
    out.push('\n');
    out
}

/// Mnemonic plus operand text for one instruction.
fn render_operand(instruction: &Instruction, bank: &Bank) -> String {
    let mnemonic = instruction.mnemonic;
    match instruction.mode {
        AddrMode::Implied => mnemonic.to_string(),
        AddrMode::Accumulator => format!("{mnemonic} a"),
        AddrMode::Immediate => format!("{mnemonic} #${:02x}", instruction.bytes[1]),
        AddrMode::Branch => format!(
            "{mnemonic} {}",
            bank.label_for(instruction.branch_target())
        ),
        AddrMode::ZeroPage => {
            let b1 = instruction.bytes[1];
            match instruction.indexing {
                Indexing::None => format!("{mnemonic} ${b1:02x}"),
                idx => format!("{mnemonic} ${b1:02x},{idx}"),
            }
        }
        AddrMode::Absolute => {
            let addr = instruction.absolute_target();
            // Stores target RAM: never a code label, never an MMIO name.
            let operand = if instruction.is_store() {
                format!("${addr:04x}")
            } else if let Some(name) = mmio::register_name(addr) {
                name.to_string()
            } else {
                bank.label_for(addr)
            };
            let mut text = format!("{mnemonic} {operand}");
            if instruction.indexing != Indexing::None {
                text.push_str(&format!(",{}", instruction.indexing));
            }
            // An absolute operand with a zero high byte would be shrunk to
            // zero page on reassembly, changing the byte stream; emit the
            // raw bytes and keep the text as a comment.
            if instruction.bytes[2] == 0 && !matches!(mnemonic, "jmp" | "jsr") {
                text = format!(
                    "hex {:02x} {:02x} {:02x} ; {text}",
                    instruction.opcode(),
                    instruction.bytes[1],
                    instruction.bytes[2],
                );
            }
            text
        }
        AddrMode::Indirect => {
            let b1 = instruction.bytes[1];
            if mnemonic == "jmp" {
                format!("jmp (${:02x}{b1:02x})", instruction.bytes[2])
            } else {
                match instruction.indexing {
                    Indexing::None => format!("{mnemonic} ${b1:02x}"),
                    Indexing::X => format!("{mnemonic} (${b1:02x},x)"),
                    Indexing::Y => format!("{mnemonic} (${b1:02x}),y"),
                }
            }
        }
    }
}

/// Render a table: an optional label header, then rows of eight bytes.
pub fn render_table(table: &Table, bank: &Bank) -> String {
    let source_pos = source_position(table.position, bank);
    let mut out = String::new();
    if let Some(label) = &table.label {
        out.push_str(&format!("{label}: ; {} bytes\n", table.len()));
    }
    for (row, chunk) in table.bytes.chunks(8).enumerate() {
        let text = hex_bytes(chunk);
        let mut line = " ".repeat(LABEL_COLUMN);
        line.push_str("hex ");
        line.push_str(&text);
        pad_to(&mut line, TRACE_COLUMN);
        line.push_str(&format!("; {:05X}:  ", source_pos + row * 8));
        line.push_str(&text);
        line.push('\n');
        out.push_str(&line);
    }
    out.push('\n');
    out
}

/// Render an interrupt-vector word.
pub fn render_word(word: &Word, bank: &Bank) -> String {
    let source_pos = source_position(word.position, bank);
    let mut out = if word.label.is_empty() {
        " ".repeat(LABEL_COLUMN)
    } else {
        label_field(Some(word.label.as_str()))
    };
    out.push_str(&format!(
        "{:<28}",
        format!("word {}", bank.label_for(word.addr()))
    ));
    out.push_str(&format!(
        "; {source_pos:05X}: {:02x} {:02x}",
        word.lo, word.hi
    ));
    if !word.comment.is_empty() {
        out.push_str(&format!("     {}", word.comment));
    }
    out.push('\n');
    out
}

/// Render the main-file prolog: the header comment block and the MMIO
/// register equates.
pub fn render_prolog(header: &Header) -> String {
    let mut out = format!("{header}\n\n");
    out.push_str(";  MMIO\n");
    for &(addr, name) in mmio::REGISTERS {
        out.push_str(&format!("        {name:<10} EQU ${addr:04x}\n"));
    }
    out.push('\n');
    out
}

/// Linear offset of a CPU address within the PRG image.
fn source_position(position: u16, bank: &Bank) -> usize {
    let size = bank.len().max(1);
    usize::from(position) % size + size * bank.number
}

fn label_field(label: Option<&str>) -> String {
    match label {
        Some(label) => format!("{:<width$}", format!("{label}:"), width = LABEL_COLUMN),
        None => " ".repeat(LABEL_COLUMN),
    }
}

fn pad_to(line: &mut String, column: usize) {
    while line.len() < column {
        line.push(' ');
    }
}

fn hex_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DisasmOptions;
    use pretty_assertions::assert_eq;

    fn bank_at(base: u16, code: &[u8]) -> Bank {
        let mut bytes = code.to_vec();
        bytes.extend_from_slice(&[0x00; 6]);
        Bank::new(0, Some(base), bytes, 1, &DisasmOptions::new())
    }

    #[test]
    fn test_branch_render() {
        let bank = bank_at(0x8000, &[0xA9, 0x01, 0xF0, 0x02, 0xA9, 0x02, 0x60]);
        let text = render_bank(&bank);
        assert!(text.starts_with(".base $8000\n\n"));
        assert!(text.contains("            lda #$01"));
        assert!(text.contains("            beq b0_8006"));
        assert!(text.contains("b0_8006:    rts"));
        assert!(text.contains("; 00002:  f0 02"));
    }

    #[test]
    fn test_store_never_uses_mmio_name() {
        // sta $2000 renders raw, lda $2000 renders the register name.
        let bank = bank_at(
            0x8000,
            &[0x8D, 0x00, 0x20, 0xAD, 0x00, 0x20, 0x60],
        );
        let text = render_bank(&bank);
        assert!(text.contains("sta $2000"));
        assert!(!text.contains("sta PPUCTRL"));
        assert!(text.contains("lda PPUCTRL"));
    }

    #[test]
    fn test_absolute_zero_high_byte() {
        // lda $0020 would be shrunk to zero page by an assembler.
        let bank = bank_at(0x8000, &[0xAD, 0x20, 0x00, 0x60]);
        let text = render_bank(&bank);
        assert!(text.contains("hex ad 20 00 ; lda $0020"));

        // jmp keeps its three-byte encoding either way.
        let bank = bank_at(0x8000, &[0xEA, 0x4C, 0x06, 0x00]);
        let text = render_bank(&bank);
        assert!(text.contains("jmp $0006"));
        assert!(!text.contains("hex 4c"));
    }

    #[test]
    fn test_instruction_columns() {
        let bank = bank_at(0x8000, &[0xA9, 0x01, 0x60]);
        let text = render_bank(&bank);
        let line = text
            .lines()
            .find(|l| l.contains("lda #$01"))
            .unwrap();
        // Label field ends at column 12, trace starts at column 40.
        assert_eq!(&line[..12], "            ");
        assert_eq!(&line[40..42], "; ");
        assert!(line.ends_with("; 00000:  a9 01"));
    }

    #[test]
    fn test_brk_render() {
        let mut options = DisasmOptions::new();
        options.no_sub_check = true;
        let mut bytes = vec![0x00, 0x42, 0x60];
        bytes.extend_from_slice(&[0x00; 6]);
        let bank = Bank::new(0, Some(0x8000), bytes, 1, &options);
        let text = render_bank(&bank);
        assert!(text.contains("            brk"));
        assert!(text.contains("            hex 42"));
        assert!(text.contains("; 00001:  42"));
    }

    #[test]
    fn test_table_render() {
        let mut code = vec![0x02; 10];
        code.push(0x60);
        let bank = bank_at(0x8000, &code);
        let text = render_bank(&bank);
        // Rows of eight bytes, trace offset advancing by 8.
        assert!(text.contains("hex 02 02 02 02 02 02 02 02"));
        assert!(text.contains("; 00000:  02 02 02 02 02 02 02 02"));
        assert!(text.contains("; 00008:  "));
    }

    #[test]
    fn test_labeled_table_render() {
        let code = [
            0xAD, 0x08, 0x80, // lda $8008 (inside the data below)
            0x60, // rts
            0x02, 0x02, 0x02, 0x02, 0x02, 0x02, // data
        ];
        let bank = bank_at(0x8000, &code);
        let text = render_bank(&bank);
        assert!(text.contains("lda tab_b0_8004+4"));
        assert!(text.contains("tab_b0_8004: ; 12 bytes\n"));
    }

    #[test]
    fn test_word_render() {
        let mut bytes = vec![0xEA; 16378];
        bytes.extend_from_slice(&[0x00, 0x80, 0x10, 0x80, 0x20, 0x80]);
        let bank = Bank::new(0, Some(0xC000), bytes, 2, &DisasmOptions::new());
        let text = render_bank(&bank);
        assert!(text.contains("NMI:        word $8000"));
        assert!(text.contains("RESET:      word $8010"));
        assert!(text.contains("IRQ:        word $8020"));
        assert!(text.contains("; 03FFA: 00 80"));
    }

    #[test]
    fn test_prolog() {
        let header = Header::default();
        let text = render_prolog(&header);
        assert!(text.contains(";  MMIO\n"));
        assert!(text.contains("        PPUCTRL    EQU $2000\n"));
        assert!(text.contains("        JOY2       EQU $4017\n"));
    }

    #[test]
    fn test_indirect_render() {
        let bank = bank_at(0x8000, &[0xEA, 0x6C, 0x34, 0x12, 0xB1, 0x10, 0x60]);
        let text = render_bank(&bank);
        assert!(text.contains("jmp ($1234)"));
        assert!(text.contains("lda ($10),y"));
    }
}
