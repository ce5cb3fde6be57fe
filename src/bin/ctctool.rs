use std::io::{self, Read};
use std::process;

use clap::{Parser, Subcommand};

use dianma_engine::dict::{CharacterSet, CodeDictionary};
use dianma_engine::settings::Settings;
use dianma_engine::{translate, TranslateMode};

#[derive(Parser)]
#[command(name = "ctctool", about = "Chinese telegraph code conversion diagnostics")]
struct Cli {
    /// Path to a settings TOML file (embedded defaults otherwise)
    #[arg(long, global = true)]
    settings: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert text between Chinese characters and telegraph code
    Convert {
        /// Text to convert; "-" reads standard input
        text: String,
        /// Convert telegraph code to characters (default is the reverse)
        #[arg(long)]
        tele_to_han: bool,
        /// Use the traditional character set
        #[arg(long)]
        traditional: bool,
    },

    /// Look up a single character or telegraph code
    Lookup {
        /// A single character, or an all-digit telegraph code
        key: String,
        /// Use the traditional character set
        #[arg(long)]
        traditional: bool,
    },

    /// Show table sizes and duplicate-entry counts
    Stats {
        /// Output as JSON instead of text
        #[arg(long)]
        json: bool,
    },
}

macro_rules! die {
    ($result:expr, $($arg:tt)*) => {
        $result.unwrap_or_else(|e| {
            eprintln!($($arg)*, e);
            process::exit(1);
        })
    };
}

fn charset_for(traditional: bool) -> CharacterSet {
    if traditional {
        CharacterSet::Traditional
    } else {
        CharacterSet::Simplified
    }
}

fn main() {
    dianma_engine::trace_init::init_tracing();

    let cli = Cli::parse();
    let settings = match &cli.settings {
        Some(path) => die!(Settings::load(path), "Error reading settings: {}"),
        None => Settings::default(),
    };
    let dict = CodeDictionary::new(settings.source());

    match cli.command {
        Command::Convert {
            text,
            tele_to_han,
            traditional,
        } => {
            let charset = charset_for(traditional);
            let mode = if tele_to_han {
                TranslateMode::TeleToHan
            } else {
                TranslateMode::HanToTele
            };
            die!(dict.load(charset), "Error loading code table: {}");

            let text = if text == "-" {
                let mut buf = String::new();
                die!(io::stdin().read_to_string(&mut buf), "Error reading stdin: {}");
                buf
            } else {
                text
            };

            let result = die!(
                translate(&dict, mode, charset, &text),
                "Error during conversion: {}"
            );
            println!("{result}");
        }

        Command::Lookup { key, traditional } => {
            let charset = charset_for(traditional);
            die!(dict.load(charset), "Error loading code table: {}");

            if !key.is_empty() && key.chars().all(|c| c.is_ascii_digit()) {
                let tele: u32 = die!(key.parse(), "Error parsing telegraph code: {}");
                match die!(dict.han_for(charset, tele), "Error during lookup: {}") {
                    Some(han) => println!("{tele:04} {han}"),
                    None => println!("{tele:04} (no mapping)"),
                }
            } else {
                let mut chars = key.chars();
                let (Some(han), None) = (chars.next(), chars.next()) else {
                    eprintln!("Error: key must be a single character or a telegraph code");
                    process::exit(1);
                };
                match die!(dict.tele_for(charset, han), "Error during lookup: {}") {
                    Some(tele) => println!("{han} {tele:04}"),
                    None => println!("{han} (no mapping)"),
                }
            }
        }

        Command::Stats { json } => {
            die!(dict.load_all(), "Error loading code tables: {}");
            let variants = [CharacterSet::Simplified, CharacterSet::Traditional];

            if json {
                let mut map = serde_json::Map::new();
                for charset in variants {
                    let stats = dict.stats(charset).expect("table loaded above");
                    map.insert(
                        charset.as_str().to_string(),
                        serde_json::json!({
                            "entries": stats.entries,
                            "overwrites": stats.overwrites,
                        }),
                    );
                }
                println!(
                    "{}",
                    serde_json::to_string_pretty(&serde_json::Value::Object(map))
                        .expect("stats serialize")
                );
            } else {
                for charset in variants {
                    let stats = dict.stats(charset).expect("table loaded above");
                    println!(
                        "{}: {} entries, {} overwritten",
                        charset.as_str(),
                        stats.entries,
                        stats.overwrites
                    );
                }
            }
        }
    }
}
