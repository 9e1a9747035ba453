//! NES Disassembler CLI
//!
//! Command-line tool that turns an iNES ROM into assembler source files,
//! one per bank, plus a main file that includes them.

use clap::Parser;
use nes_disasm::{disassemble_file, formatter, DisasmError, DisasmOptions, Disassembly};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// NES ROM disassembler.
///
/// Splits a ROM into banks, classifies code and data, resolves labels,
/// and emits assembler source that rebuilds the same bytes.
#[derive(Parser, Debug)]
#[command(name = "nes-disasm")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// The ROM file to disassemble
    filename: Option<PathBuf>,

    /// Print ROM info to stderr - do not disassemble
    #[arg(long)]
    info: bool,

    /// With --info, also print the info as JSON on stdout
    #[arg(long, requires = "info")]
    json: bool,

    /// The size of the switchable bank in KB. Should be 4, 8, 16, or 32.
    /// The default is to auto-detect based on the mapper
    #[arg(short = 's', long)]
    bank_size: Option<u32>,

    /// Only disassemble the specified bank
    #[arg(short, long)]
    bank: Option<usize>,

    /// The number of banks which are fixed (non-swappable) at the end of
    /// PRG-ROM space. The default is to auto-detect based on the mapper
    #[arg(short, long)]
    fixed_banks: Option<u32>,

    /// The minimum number of instructions for a valid subroutine.
    /// Anything smaller will be converted to a data table
    #[arg(short, long, default_value_t = 2)]
    min_sub_size: usize,

    /// Adds extra valid endings for a subroutine beyond 'jmp', 'rti', and
    /// 'rts'. A comma-separated list of strings to look for in the final
    /// instruction
    #[arg(short = 'v', long, value_delimiter = ',')]
    sub_valid_end: Vec<String>,

    /// Do not attempt to analyze subroutines for validity. Some
    /// applications intermix data and code in a way that confuses the
    /// analysis; this output will require much more cleanup
    #[arg(short = 'n', long)]
    no_sub_check: bool,

    /// Indicates that the ROM has no header. The mapper number will need
    /// to be specified
    #[arg(long)]
    no_header: bool,

    /// Specify the size of the PRG ROM in kilobytes
    #[arg(short = 'p', long)]
    prg_size: Option<u32>,

    /// Specify the size of the CHR ROM in kilobytes
    #[arg(short = 'c', long)]
    chr_size: Option<u32>,

    /// Override the mapper number from the header or specify the mapper
    /// for a headerless ROM
    #[arg(long)]
    mapper: Option<u16>,

    /// Do not create a CHR ROM file
    #[arg(short = 'r', long)]
    no_chr: bool,

    /// Write all assembly code to stdout. A CHR ROM file is not created
    #[arg(long)]
    stdout: bool,

    /// The Dragon Quest games do weird things with brk instructions which
    /// makes them consume 3 bytes instead of 2
    #[arg(long)]
    dq_brk: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("nes_disasm=info")),
        )
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut options = build_options(args);
    if args.info {
        // Info needs only the header facts; skip bank construction.
        options.bank = Some(usize::MAX);
    }
    let filename = args.filename.as_ref().ok_or(DisasmError::MissingFilename)?;
    let disassembly = disassemble_file(filename, &options)?;

    if args.info {
        print_info(&disassembly, args)?;
        return Ok(());
    }
    write_output(filename, &disassembly, args)?;
    Ok(())
}

fn build_options(args: &Args) -> DisasmOptions {
    DisasmOptions {
        bank_size: args.bank_size,
        fixed_banks: args.fixed_banks,
        min_sub_size: args.min_sub_size,
        terminators: args.sub_valid_end.clone(),
        no_sub_check: args.no_sub_check,
        no_header: args.no_header,
        mapper: args.mapper,
        prg_size: args.prg_size,
        chr_size: args.chr_size,
        bank: args.bank,
        dq_brk: args.dq_brk,
    }
}

fn print_info(disassembly: &Disassembly, args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let info = &disassembly.info;
    match &info.mapper_name {
        Some(name) => eprintln!("Mapper:      {} - {}", info.mapper, name),
        None => eprintln!("Mapper:      {}", info.mapper),
    }
    eprintln!("Bank size:   {}KB", info.bank_size_kb);
    eprintln!("PRG ROM:     {} banks ({}KB)", info.prg_banks, info.prg_kb);
    eprintln!("CHR ROM:     {} banks ({}KB)", info.chr_banks, info.chr_kb);
    eprintln!("Fixed banks: {}", info.fixed_banks);
    let mirroring = if info.four_screen {
        "four-screen"
    } else if info.vertical_mirroring {
        "vertical"
    } else {
        "horizontal"
    };
    eprintln!("Mirroring:   {mirroring}");
    if info.battery {
        eprintln!("Battery-backed PRG RAM present");
    }
    if info.trainer {
        eprintln!("512-byte trainer present");
    }
    if args.json {
        println!("{}", serde_json::to_string_pretty(info)?);
    }
    Ok(())
}

fn write_output(
    filename: &Path,
    disassembly: &Disassembly,
    args: &Args,
) -> Result<(), Box<dyn std::error::Error>> {
    if args.stdout {
        let stdout = std::io::stdout();
        let mut out = stdout.lock();
        out.write_all(formatter::render_prolog(&disassembly.header).as_bytes())?;
        for bank in &disassembly.banks {
            out.write_all(formatter::render_bank(bank).as_bytes())?;
            out.write_all(b"\n\n")?;
        }
        return Ok(());
    }

    for bank in &disassembly.banks {
        let name = format!("bank_{:02}.asm", bank.number);
        std::fs::write(&name, formatter::render_bank(bank))?;
    }

    // A single-bank run emits only that bank file.
    if args.bank.is_some() {
        return Ok(());
    }

    let stem = filename
        .file_stem()
        .map_or_else(|| "rom".to_string(), |s| s.to_string_lossy().into_owned());
    let mut main_asm = formatter::render_prolog(&disassembly.header);
    for bank in &disassembly.banks {
        main_asm.push_str(&format!("        .include bank_{:02}.asm\n", bank.number));
    }
    if !args.no_chr && !disassembly.chr.is_empty() {
        std::fs::write("chr_rom.bin", &disassembly.chr)?;
        main_asm.push_str("        .incbin chr_rom.bin\n");
    }
    std::fs::write(format!("{stem}.asm"), main_asm)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::try_parse_from(["nes-disasm", "game.nes"]).unwrap();
        assert_eq!(args.filename, Some(PathBuf::from("game.nes")));
        assert!(!args.info);
        assert_eq!(args.min_sub_size, 2);
    }

    #[test]
    fn test_short_flags() {
        let args = Args::try_parse_from([
            "nes-disasm", "-s", "16", "-b", "3", "-f", "1", "-m", "4", "-n", "game.nes",
        ])
        .unwrap();
        assert_eq!(args.bank_size, Some(16));
        assert_eq!(args.bank, Some(3));
        assert_eq!(args.fixed_banks, Some(1));
        assert_eq!(args.min_sub_size, 4);
        assert!(args.no_sub_check);
    }

    #[test]
    fn test_terminator_list() {
        let args =
            Args::try_parse_from(["nes-disasm", "-v", "bpl,bne", "game.nes"]).unwrap();
        assert_eq!(args.sub_valid_end, vec!["bpl", "bne"]);
    }

    #[test]
    fn test_json_requires_info() {
        assert!(Args::try_parse_from(["nes-disasm", "--json", "game.nes"]).is_err());
        assert!(Args::try_parse_from(["nes-disasm", "--info", "--json", "game.nes"]).is_ok());
    }

    #[test]
    fn test_missing_filename_fails() {
        let args = Args::try_parse_from(["nes-disasm"]).unwrap();
        assert!(run(&args).is_err());
    }

    #[test]
    fn test_build_options() {
        let args = Args::try_parse_from([
            "nes-disasm", "--mapper", "4", "--dq-brk", "--no-header", "game.nes",
        ])
        .unwrap();
        let options = build_options(&args);
        assert_eq!(options.mapper, Some(4));
        assert!(options.dq_brk);
        assert!(options.no_header);
    }
}
