//! Build script for aix-firmware
//!
//! - Sets up linker search paths for memory.x
//! - Validates board.toml at compile time
//! - Generates `board_config.rs` with the board constants

use std::env;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// SRAM that memory.x keeps away from the linker
const RESERVED_START: u64 = 0x2003_0000;
const RESERVED_END: u64 = 0x2004_0000;

/// Size of the engine register block (CTRL, IFM, OFM, WGT)
const ENGINE_BLOCK_LEN: u64 = 16;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct BoardFile {
    uart: UartSection,
    window: WindowSection,
    engine: EngineSection,
    pause: PauseSection,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UartSection {
    baudrate: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct WindowSection {
    base: u32,
    size: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct EngineSection {
    base: u32,
    ifm_pointer: u32,
    ofm_pointer: u32,
    weight_pointer: u32,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PauseSection {
    ms: u32,
}

fn main() {
    setup_linker();
    let board = load_board();
    validate_board(&board);
    generate_constants(&board);
}

/// Set up linker search paths for memory.x
fn setup_linker() {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());

    // Copy memory.x to the output directory
    let memory_x = include_bytes!("memory.x");
    let mut f = File::create(out_dir.join("memory.x")).unwrap();
    f.write_all(memory_x).unwrap();

    // Tell rustc where to find memory.x
    println!("cargo:rustc-link-search={}", out_dir.display());

    println!("cargo:rerun-if-changed=memory.x");
    println!("cargo:rerun-if-changed=build.rs");
}

/// Read and parse board.toml
fn load_board() -> BoardFile {
    println!("cargo:rerun-if-changed=board.toml");

    let config_path = Path::new("board.toml");

    if !config_path.exists() {
        fail(
            "board.toml not found",
            &["The firmware requires a board.toml next to Cargo.toml.".to_string()],
        );
    }

    let content = match fs::read_to_string(config_path) {
        Ok(content) => content,
        Err(e) => fail("Failed to read board.toml", &[e.to_string()]),
    };

    match toml::from_str(&content) {
        Ok(board) => board,
        Err(e) => {
            let lines: Vec<String> = e.to_string().lines().map(str::to_string).collect();
            fail("Invalid board.toml", &lines)
        }
    }
}

/// Check addresses and sizes against the board memory map
fn validate_board(board: &BoardFile) {
    let mut errors = Vec::new();

    if board.uart.baudrate == 0 {
        errors.push("[uart] baudrate must be non-zero".to_string());
    }

    let window_start = board.window.base as u64;
    let window_end = window_start + board.window.size as u64;
    if board.window.size == 0 {
        errors.push("[window] size must be non-zero".to_string());
    }
    if board.window.base % 4 != 0 || board.window.size % 4 != 0 {
        errors.push("[window] base and size must be multiples of 4".to_string());
    }
    if window_start < RESERVED_START || window_end > RESERVED_END {
        errors.push(format!(
            "[window] must lie inside {:#010x}..{:#010x}",
            RESERVED_START, RESERVED_END
        ));
    }

    let engine_start = board.engine.base as u64;
    let engine_end = engine_start + ENGINE_BLOCK_LEN;
    if board.engine.base % 4 != 0 {
        errors.push("[engine] base must be a multiple of 4".to_string());
    }
    if engine_start < RESERVED_START || engine_end > RESERVED_END {
        errors.push(format!(
            "[engine] register block must lie inside {:#010x}..{:#010x}",
            RESERVED_START, RESERVED_END
        ));
    }
    if engine_start < window_end && window_start < engine_end {
        errors.push("[engine] register block overlaps [window]".to_string());
    }

    if !errors.is_empty() {
        fail("Invalid board configuration", &errors);
    }

    println!("cargo:warning=board.toml validated successfully");
}

/// Write board_config.rs into OUT_DIR
fn generate_constants(board: &BoardFile) {
    let out_dir = PathBuf::from(env::var("OUT_DIR").unwrap());
    let source = format!(
        "// Generated from board.toml\n\
         pub const UART_BAUDRATE: u32 = {};\n\
         pub const WINDOW_BASE: u32 = {:#010x};\n\
         pub const WINDOW_SIZE: u32 = {:#010x};\n\
         pub const ENGINE_BASE: u32 = {:#010x};\n\
         pub const IFM_POINTER: u32 = {};\n\
         pub const OFM_POINTER: u32 = {};\n\
         pub const WEIGHT_POINTER: u32 = {};\n\
         pub const PAUSE_MS: u32 = {};\n",
        board.uart.baudrate,
        board.window.base,
        board.window.size,
        board.engine.base,
        board.engine.ifm_pointer,
        board.engine.ofm_pointer,
        board.engine.weight_pointer,
        board.pause.ms,
    );
    fs::write(out_dir.join("board_config.rs"), source).unwrap();
}

/// Abort the build with a boxed report
fn fail(title: &str, lines: &[String]) -> ! {
    panic!(
        "\n\
        ╔══════════════════════════════════════════════════════════════════╗\n\
        ║  ERROR: {:<56} ║\n\
        ╠══════════════════════════════════════════════════════════════════╣\n\
        {}\n\
        ╚══════════════════════════════════════════════════════════════════╝\n",
        title,
        format_error_lines(lines)
    );
}

/// Format error message lines with box drawing
fn format_error_lines(lines: &[String]) -> String {
    lines
        .iter()
        .map(|line| {
            // Count chars: toml errors quote board.toml text verbatim
            let truncated = if line.chars().count() > 62 {
                format!("{}...", line.chars().take(59).collect::<String>())
            } else {
                line.to_string()
            };
            format!("║  • {:<62} ║", truncated)
        })
        .collect::<Vec<_>>()
        .join("\n")
}
