use clap::{Parser, Subcommand};
use osr::{batch, Replay, ReplayHeader};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "osr", about = "osu! .osr replay decoder CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the header of a replay file (the payload is not decoded)
    Info {
        file: PathBuf,
        /// Emit the header as pretty JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode a replay and print its per-millisecond samples
    Dump {
        file: PathBuf,
        /// Print every Nth millisecond
        #[arg(short, long, default_value_t = 1)]
        every: u64,
        /// Stop after N rows
        #[arg(short, long)]
        limit: Option<u64>,
    },
    /// Decode every replay in a folder and print a ranked listing
    Rank {
        dir: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    match Cli::parse().command {

        // ── Info ─────────────────────────────────────────────────────────────
        Commands::Info { file, json } => {
            let header = read_header(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&header)?);
            } else {
                print_header(&header);
            }
        }

        // ── Dump ─────────────────────────────────────────────────────────────
        Commands::Dump { file, every, limit } => {
            let replay = read_replay(&file)?;
            let every = every.max(1) as usize;
            println!("{:>8} {:>10} {:>10}  K1 K2 M1 M2 SMOKE", "ms", "x", "y");
            let mut shown = 0u64;
            for (offset, s) in replay.timeline().samples().iter().enumerate().step_by(every) {
                if let Some(n) = limit {
                    if shown >= n {
                        break;
                    }
                }
                println!("{:>8} {:>10.4} {:>10.4}  {}", offset, s.x, s.y, s.buttons);
                shown += 1;
            }
            println!("{} ms total", replay.duration_ms());
        }

        // ── Rank ─────────────────────────────────────────────────────────────
        Commands::Rank { dir } => {
            let report = batch::load_dir(&dir)
                .map_err(|e| format!("{}: {}", dir.display(), e))?;
            for failure in &report.failures {
                eprintln!("skipped {}: {}", failure.path.display(), failure.error);
            }
            let mut replays = report.replays;
            replays.sort();
            let mut place = replays.len();
            for r in &replays {
                println!("{:>2}. {:>15} - {}", place, r.header().player_name, r.header().score);
                place -= 1;
            }
            println!("read {} replays", replays.len());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

fn read_header(path: &Path) -> Result<ReplayHeader, Box<dyn std::error::Error>> {
    let file = std::fs::File::open(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let header = ReplayHeader::read(std::io::BufReader::new(file))
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(header)
}

fn read_replay(path: &Path) -> Result<Replay, Box<dyn std::error::Error>> {
    let bytes = std::fs::read(path).map_err(|e| format!("{}: {}", path.display(), e))?;
    let replay = Replay::from_bytes(&bytes)
        .map_err(|e| format!("{}: {}", path.display(), e))?;
    Ok(replay)
}

fn print_header(h: &ReplayHeader) {
    println!("Game mode   : {}", h.mode);
    println!("Version     : {}", h.version);
    println!("Beatmap MD5 : {}", h.beatmap_hash);
    println!("Player      : {}", h.player_name);
    println!("Replay MD5  : {}", h.replay_hash);
    println!("300s        : {}", h.count_300);
    println!("100s        : {}", h.count_100);
    println!("50s         : {}", h.count_50);
    println!("Gekis       : {}", h.count_geki);
    println!("Katus       : {}", h.count_katu);
    println!("Misses      : {}", h.count_miss);
    println!("Score       : {}", h.score);
    println!("Combo       : {}", h.max_combo);
    println!("Perfect     : {}", h.perfect);
    println!("Mods        : {}", h.mods.short_string());
    println!("Life points : {}", h.life_graph.len());
    println!("Timestamp   : {}", h.recorded_at);
    println!("Length      : {}", h.payload_length);
}
