/// Interactive track console application

use fluxtrack::format::constants::revolution_micros;
use fluxtrack::*;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};

/// Tracks on a standard 80 cylinder, double-sided disk
const NR_TRACKS: usize = 160;

/// Command completer for the REPL
struct CommandCompleter {
    commands: Vec<&'static str>,
    track_types: Vec<&'static str>,
}

impl CommandCompleter {
    fn new(registry: &Registry) -> Self {
        Self {
            commands: vec![
                "decode",
                "dump",
                "encode",
                "exit",
                "help",
                "identify",
                "info",
                "load",
                "protection",
                "quit",
                "save",
                "track",
                "types",
                "verify",
            ],
            track_types: registry.track_types().iter().map(|t| t.name()).collect(),
        }
    }
}

impl Completer for CommandCompleter {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];

        // Track type names complete the argument of decode
        let (start, candidates) = match line_to_cursor.split_once(' ') {
            Some(("decode", arg)) if !arg.contains(' ') => (pos - arg.len(), &self.track_types),
            Some(_) => return Ok((pos, vec![])),
            None => (0, &self.commands),
        };

        let prefix = line_to_cursor[start..].to_lowercase();
        let matches: Vec<Pair> = candidates
            .iter()
            .filter(|cmd| cmd.starts_with(&prefix))
            .map(|cmd| Pair {
                display: cmd.to_string(),
                replacement: cmd.to_string(),
            })
            .collect();

        Ok((start, matches))
    }
}

impl Hinter for CommandCompleter {
    type Hint = String;
}

impl Highlighter for CommandCompleter {}
impl Validator for CommandCompleter {}
impl Helper for CommandCompleter {}

/// Get the path to the history file
fn history_path() -> Option<std::path::PathBuf> {
    dirs::home_dir().map(|mut p| {
        p.push(".fluxtrack_history");
        p
    })
}

/// Loaded revolution and the decoded disk
struct Session {
    registry: Registry,
    disk: Disk,
    tracknr: usize,
    filename: Option<String>,
    cells: Option<Bitcells>,
}

impl Session {
    fn new() -> Self {
        Self {
            registry: Registry::new(),
            disk: Disk::new(NR_TRACKS),
            tracknr: 0,
            filename: None,
            cells: None,
        }
    }

    fn track(&self) -> Option<&TrackInfo> {
        self.disk.get_track(self.tracknr)
    }

    /// Track types to try when identifying, plain long tracks last
    fn identify_order(&self) -> Vec<TrackType> {
        let (empty, mut types): (Vec<_>, Vec<_>) = self
            .registry
            .track_types()
            .into_iter()
            .partition(|t| *t == TrackType::EmptyLongtrack);
        types.extend(empty);
        types
    }
}

fn main() {
    println!("=== fluxtrack ===");
    println!("Interactive console for decoding Amiga protection and custom tracks.");
    println!("Type 'help' for available commands\n");

    let mut session = Session::new();

    let mut rl = match Editor::new() {
        Ok(rl) => rl,
        Err(e) => {
            eprintln!("Failed to create editor: {}", e);
            std::process::exit(1);
        }
    };
    rl.set_helper(Some(CommandCompleter::new(&session.registry)));

    // Load history if available
    if let Some(history_path) = history_path() {
        let _ = rl.load_history(&history_path);
    }

    loop {
        let readline = rl.readline("> ");
        let input = match readline {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        };

        let input = input.trim();
        if input.is_empty() {
            continue;
        }

        let _ = rl.add_history_entry(input);

        let parts = parse_command_line(input);
        if parts.is_empty() {
            continue;
        }
        let command = parts[0].to_lowercase();

        match command.as_str() {
            "help" => {
                print_help();
            }
            "quit" | "exit" => {
                if let Some(history_path) = history_path() {
                    let _ = rl.save_history(&history_path);
                }
                println!("Goodbye!");
                break;
            }
            "load" | "open" => {
                if parts.len() < 2 {
                    println!("Usage: load <path> [track]");
                    continue;
                }
                if let Some(arg) = parts.get(2) {
                    match parse_track(arg) {
                        Some(tracknr) => session.tracknr = tracknr,
                        None => {
                            println!("Invalid track number: {}", arg);
                            continue;
                        }
                    }
                }
                match io::read_bitcells(&parts[1]) {
                    Ok(cells) => {
                        println!(
                            "Loaded: {} ({} bitcells) as track {}",
                            parts[1],
                            cells.len(),
                            session.tracknr
                        );
                        session.filename = Some(parts[1].clone());
                        session.cells = Some(cells);
                    }
                    Err(e) => println!("Error: {}", e),
                }
            }
            "track" => match parts.get(1).map(|arg| parse_track(arg)) {
                Some(Some(tracknr)) => {
                    session.tracknr = tracknr;
                    println!("Current track: {}", tracknr);
                }
                Some(None) => println!("Track must be 0-{}", NR_TRACKS - 1),
                None => println!("Current track: {}", session.tracknr),
            },
            "info" => {
                print_info(&session);
            }
            "types" => {
                list_types(&session.registry);
            }
            "decode" => {
                if parts.len() < 2 {
                    println!("Usage: decode <type>");
                    continue;
                }
                let track_type: TrackType = match parts[1].parse() {
                    Ok(t) => t,
                    Err(e) => {
                        println!("Error: {}", e);
                        continue;
                    }
                };
                let Some(cells) = session.cells.as_ref() else {
                    println!("No bitcells loaded. Use 'load <path>' first.");
                    continue;
                };
                match session
                    .disk
                    .decode_track(session.tracknr, track_type, cells, &session.registry)
                {
                    Ok(track) => print_track(session.tracknr, track),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "identify" => {
                let Some(cells) = session.cells.as_ref() else {
                    println!("No bitcells loaded. Use 'load <path>' first.");
                    continue;
                };
                let order = session.identify_order();
                match session
                    .disk
                    .identify_track(session.tracknr, &order, cells, &session.registry)
                {
                    Ok(Some(_)) => {
                        if let Some(track) = session.disk.get_track(session.tracknr) {
                            print_track(session.tracknr, track);
                        }
                    }
                    Ok(None) => println!("No known track format found"),
                    Err(e) => println!("Error: {}", e),
                }
            }
            "protection" => {
                let Some(cells) = session.cells.as_ref() else {
                    println!("No bitcells loaded. Use 'load <path>' first.");
                    continue;
                };
                match protection::detect(cells) {
                    Some(result) => println!("Protection: {}", result),
                    None => println!("No protection detected"),
                }
            }
            "encode" => match session.disk.encode_track(session.tracknr, &session.registry) {
                Ok(cells) => println!(
                    "Regenerated track {}: {} bitcells ({} us at {} kbps)",
                    session.tracknr,
                    cells.len(),
                    revolution_micros(cells.len()),
                    format::NOMINAL_KBPS
                ),
                Err(e) => println!("Error: {}", e),
            },
            "verify" => {
                verify_track(&session);
            }
            "dump" => {
                let max_bytes = parts
                    .get(1)
                    .and_then(|s| s.parse::<usize>().ok())
                    .unwrap_or(256);
                match session.track() {
                    Some(track) if track.is_formatted() => {
                        if track.dat.is_empty() {
                            println!("Track {} carries no data", session.tracknr);
                        } else {
                            print_hex_dump(&track.dat, max_bytes);
                        }
                    }
                    _ => println!("Track {} is not decoded", session.tracknr),
                }
            }
            "save" => {
                if parts.len() < 2 {
                    println!("Usage: save <path>");
                    continue;
                }
                let result = session
                    .disk
                    .encode_track(session.tracknr, &session.registry)
                    .and_then(|cells| io::write_bitcells(&cells, &parts[1]));
                match result {
                    Ok(()) => println!("Saved track {} to {}", session.tracknr, parts[1]),
                    Err(e) => println!("Error: {}", e),
                }
            }
            _ => {
                println!(
                    "Unknown command: {}. Type 'help' for available commands.",
                    command
                );
            }
        }
    }
}

/// Parse a command line, respecting quoted strings
fn parse_command_line(input: &str) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    for ch in input.chars() {
        match ch {
            '"' => {
                in_quotes = !in_quotes;
            }
            ' ' | '\t' if !in_quotes => {
                if !current.is_empty() {
                    parts.push(std::mem::take(&mut current));
                }
            }
            _ => {
                current.push(ch);
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }

    parts
}

fn parse_track(s: &str) -> Option<usize> {
    s.parse::<usize>().ok().filter(|&t| t < NR_TRACKS)
}

fn print_help() {
    println!("Available commands:");
    println!("  load <path> [track]            - Load a bitcell dump (use quotes for paths with spaces)");
    println!("  track [n]                      - Show or set the current track number (0-159)");
    println!("  info                           - Show loaded revolution and current track");
    println!("  types                          - List supported track types");
    println!("  decode <type>                  - Decode the loaded revolution as a track type");
    println!("  identify                       - Try every track type in turn");
    println!("  protection                     - Detect copy protection scheme");
    println!("  encode                         - Regenerate the current track");
    println!("  verify                         - Regenerate and decode again, comparing results");
    println!("  dump [max]                     - Hex dump the decoded track data (default 256 bytes)");
    println!("  save <path>                    - Save the regenerated track as a bitcell dump");
    println!("  help                           - Show this help");
    println!("  quit, exit                     - Exit");
}

fn print_info(session: &Session) {
    match (&session.filename, &session.cells) {
        (Some(filename), Some(cells)) => {
            println!("Filename: {}", filename);
            println!(
                "Bitcells: {} ({} us at {} kbps)",
                cells.len(),
                revolution_micros(cells.len()),
                format::NOMINAL_KBPS
            );
        }
        _ => println!("No bitcells loaded"),
    }
    println!(
        "Decoded tracks: {}/{}",
        session.disk.formatted_count(),
        session.disk.track_count()
    );
    if let Some(track) = session.track() {
        print_track(session.tracknr, track);
    }
}

fn print_track(tracknr: usize, track: &TrackInfo) {
    println!("Track {}: {}", tracknr, track.track_type.description());
    if !track.is_formatted() {
        return;
    }
    println!("  Total bits:  {}", track.total_bits);
    println!("  Data offset: {}", track.data_bitoff);
    println!("  Data length: {}", track.dat.len());
    if track.nr_sectors > 0 {
        println!(
            "  Sectors:     {}/{} valid ({} bytes each)",
            track.valid_sector_count(),
            track.nr_sectors,
            track.bytes_per_sector
        );
    }
}

fn list_types(registry: &Registry) {
    println!("{:<32} {:<34} Geometry", "Name", "Description");
    for track_type in registry.track_types() {
        let geometry = registry.geometry(track_type);
        let layout = if geometry.is_empty() {
            "-".to_string()
        } else {
            format!("{} x {} bytes", geometry.nr_sectors, geometry.bytes_per_sector)
        };
        println!(
            "{:<32} {:<34} {}",
            track_type.name(),
            track_type.description(),
            layout
        );
    }
}

fn verify_track(session: &Session) {
    let Some(track) = session.track().filter(|t| t.is_formatted()) else {
        println!("Track {} is not decoded", session.tracknr);
        return;
    };
    let cells = match session.disk.encode_track(session.tracknr, &session.registry) {
        Ok(cells) => cells,
        Err(e) => {
            println!("Error: {}", e);
            return;
        }
    };

    let mut copy = Disk::new(NR_TRACKS);
    match copy.decode_track(session.tracknr, track.track_type, &cells, &session.registry) {
        Ok(decoded) if decoded == track => println!("Verified: regenerated track decodes identically"),
        Ok(decoded) => {
            println!("Mismatch after regeneration:");
            print_track(session.tracknr, decoded);
        }
        Err(e) => println!("Regenerated track failed to decode: {}", e),
    }
}

fn print_hex_dump(data: &[u8], max_bytes: usize) {
    let len = data.len().min(max_bytes);

    for (i, chunk) in data[..len].chunks(16).enumerate() {
        print!("{:04X}: ", i * 16);

        for (j, byte) in chunk.iter().enumerate() {
            print!("{:02X} ", byte);
            if j == 7 {
                print!(" ");
            }
        }

        // Pad if less than 16 bytes
        for j in chunk.len()..16 {
            print!("   ");
            if j == 7 {
                print!(" ");
            }
        }

        print!(" |");
        for byte in chunk {
            let c = if (32..127).contains(byte) {
                *byte as char
            } else {
                '.'
            };
            print!("{}", c);
        }
        println!("|");
    }

    if data.len() > max_bytes {
        println!("... ({} more bytes)", data.len() - max_bytes);
    }
}
