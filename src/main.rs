use clap::{Parser, Subcommand};
use elective::cli::{
    decrypt_file, encrypt_file, generate_key_file, hash_file, protect_file, recover_file,
    show_info, EncryptOptions, HashOptions, KeySource, KeygenOptions, ProtectOptions,
    RecoverOptions,
};
use elective::header::{CipherMode, HashMode, ParityHeader, Width};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Version info from build.rs
const VERSION: &str = env!("ELECTIVE_VERSION");
const TARGET: &str = env!("ELECTIVE_TARGET");
const PROFILE: &str = env!("ELECTIVE_PROFILE");
const GIT_HASH: &str = env!("ELECTIVE_GIT_HASH");

fn get_version() -> &'static str {
    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();
    VERSION_STRING.get_or_init(|| {
        format!(
            "{} ({} {}, {}, parity format v{})",
            VERSION,
            PROFILE,
            GIT_HASH,
            TARGET,
            ParityHeader::VERSION
        )
    })
}

#[derive(Parser)]
#[command(name = "elective")]
#[command(author, about = "Keyed ring transforms: block cipher, block hash and burst-repair parity", long_about = None)]
struct Cli {
    /// Print version
    #[arg(short = 'V', long)]
    version: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Key material flags shared by the keyed commands
#[derive(clap::Args)]
struct KeyArgs {
    /// Password stretched into the symmetry vector
    #[arg(long, conflicts_with = "key_file")]
    password: Option<String>,

    /// Raw key file (see `keygen`)
    #[arg(long)]
    key_file: Option<PathBuf>,
}

impl KeyArgs {
    fn source(self) -> KeySource {
        KeySource::from_flags(self.password, self.key_file)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encrypt a file block by block
    #[command(alias = "e")]
    Encrypt {
        #[command(flatten)]
        key: KeyArgs,

        /// Input file
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Symbol width (8, 16, 32 or 64 bits)
        #[arg(long, default_value = "64", value_parser = parse_width)]
        width: Width,

        /// Symbols per cipher block
        #[arg(long, default_value = "64")]
        block_symbols: usize,

        /// Composition order
        #[arg(long, default_value = "long", value_parser = parse_cipher)]
        mode: CipherMode,
    },

    /// Decrypt a file produced by `encrypt`
    #[command(alias = "d")]
    Decrypt {
        #[command(flatten)]
        key: KeyArgs,

        /// Input file
        input: PathBuf,

        /// Output file
        output: PathBuf,

        /// Symbol width (8, 16, 32 or 64 bits)
        #[arg(long, default_value = "64", value_parser = parse_width)]
        width: Width,

        /// Symbols per cipher block
        #[arg(long, default_value = "64")]
        block_symbols: usize,

        /// Composition order
        #[arg(long, default_value = "long", value_parser = parse_cipher)]
        mode: CipherMode,
    },

    /// Print one digest per block
    #[command(alias = "h")]
    Hash {
        #[command(flatten)]
        key: KeyArgs,

        /// Input file
        input: PathBuf,

        /// Symbol width (8, 16, 32 or 64 bits)
        #[arg(long, default_value = "64", value_parser = parse_width)]
        width: Width,

        /// Symbols per hashed block
        #[arg(long, default_value = "64")]
        block_symbols: usize,

        /// Digest symbols per block
        #[arg(long, default_value = "4")]
        digest_symbols: usize,

        /// Hash variant (feedback needs no key)
        #[arg(long, default_value = "long", value_parser = parse_hash)]
        mode: HashMode,
    },

    /// Write a parity file for a data file
    #[command(alias = "p")]
    Protect {
        #[command(flatten)]
        key: KeyArgs,

        /// Data file to protect
        input: PathBuf,

        /// Parity file (defaults to <input>.epf)
        parity: Option<PathBuf>,

        /// Symbol width (8, 16, 32 or 64 bits)
        #[arg(long, default_value = "64", value_parser = parse_width)]
        width: Width,

        /// Symbols per protected chunk
        #[arg(long, default_value = "64")]
        block_symbols: usize,

        /// Redundancy symbols per chunk (longest repairable burst)
        #[arg(long, default_value = "3")]
        redundancy: usize,

        /// Auxiliary symbols per chunk used to locate a burst
        #[arg(long, default_value = "2")]
        auxiliary: usize,

        /// Burst scan stride stored for recovery
        #[arg(long, default_value = "1")]
        stride: usize,
    },

    /// Validate a data file against its parity file and repair bursts
    #[command(alias = "r")]
    Recover {
        #[command(flatten)]
        key: KeyArgs,

        /// Data file to check
        input: PathBuf,

        /// Parity file (defaults to <input>.epf)
        parity: Option<PathBuf>,

        /// Override the scan stride stored in the parity file
        #[arg(long)]
        stride: Option<usize>,

        /// Report only, leave the data file untouched
        #[arg(long)]
        dry_run: bool,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show information about a parity file
    #[command(alias = "i")]
    Info {
        /// Parity file to inspect
        file: PathBuf,
    },

    /// Generate a random key file
    #[command(alias = "k")]
    Keygen {
        /// Output key file
        output: PathBuf,

        /// Key length in bytes
        #[arg(long, default_value = "32")]
        bytes: usize,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

fn parse_width(s: &str) -> Result<Width, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_cipher(s: &str) -> Result<CipherMode, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn parse_hash(s: &str) -> Result<HashMode, String> {
    s.parse().map_err(|e| format!("{}", e))
}

fn default_parity_path(input: &Path, parity: Option<PathBuf>) -> PathBuf {
    parity.unwrap_or_else(|| {
        let mut name = input.as_os_str().to_owned();
        name.push(".epf");
        PathBuf::from(name)
    })
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    if cli.version {
        println!("elective {}", get_version());
        return ExitCode::SUCCESS;
    }

    let command = match cli.command {
        Some(cmd) => cmd,
        None => {
            use clap::CommandFactory;
            if let Err(e) = Cli::command().print_help() {
                eprintln!("Error: {}", e);
                return ExitCode::FAILURE;
            }
            println!();
            return ExitCode::SUCCESS;
        }
    };

    let result = match command {
        Commands::Encrypt {
            key,
            input,
            output,
            width,
            block_symbols,
            mode,
        } => {
            let options = EncryptOptions {
                key: key.source(),
                width,
                block_symbols,
                mode,
            };
            encrypt_file(&input, &output, &options).map(|blocks| {
                println!("Encrypted {} blocks to {}", blocks, output.display());
                true
            })
        }

        Commands::Decrypt {
            key,
            input,
            output,
            width,
            block_symbols,
            mode,
        } => {
            let options = EncryptOptions {
                key: key.source(),
                width,
                block_symbols,
                mode,
            };
            decrypt_file(&input, &output, &options).map(|bytes| {
                println!("Decrypted {} bytes to {}", bytes, output.display());
                true
            })
        }

        Commands::Hash {
            key,
            input,
            width,
            block_symbols,
            digest_symbols,
            mode,
        } => {
            let options = HashOptions {
                key: key.source(),
                width,
                block_symbols,
                digest_symbols,
                mode,
            };
            hash_file(&input, &options).map(|digests| {
                for (index, digest) in digests.iter().enumerate() {
                    println!("{:>6}  {}", index, digest);
                }
                true
            })
        }

        Commands::Protect {
            key,
            input,
            parity,
            width,
            block_symbols,
            redundancy,
            auxiliary,
            stride,
        } => {
            let parity = default_parity_path(&input, parity);
            let options = ProtectOptions {
                key: key.source(),
                width,
                block_symbols,
                redundancy,
                auxiliary,
                stride,
            };
            protect_file(&input, &parity, &options).map(|header| {
                println!(
                    "Protected {} chunks of {} in {}",
                    header.chunk_count,
                    input.display(),
                    parity.display()
                );
                true
            })
        }

        Commands::Recover {
            key,
            input,
            parity,
            stride,
            dry_run,
            json,
        } => {
            let parity = default_parity_path(&input, parity);
            let options = RecoverOptions {
                key: key.source(),
                stride,
                dry_run,
            };
            recover_file(&input, &parity, &options).and_then(|report| {
                if json {
                    println!("{}", serde_json::to_string_pretty(&report)?);
                } else {
                    for chunk in report.repaired() {
                        println!(
                            "Repaired chunk {} (bytes {}..{})",
                            chunk.index, chunk.range.start, chunk.range.end
                        );
                    }
                    for chunk in report.unrecoverable() {
                        println!(
                            "Unrecoverable chunk {} (bytes {}..{})",
                            chunk.index, chunk.range.start, chunk.range.end
                        );
                    }
                    println!(
                        "{} of {} chunks intact{}",
                        report.intact_count(),
                        report.chunks.len(),
                        if report.written { ", file rewritten" } else { "" }
                    );
                }
                Ok(report.is_complete())
            })
        }

        Commands::Info { file } => show_info(&file).map(|info| {
            print!("{}", info);
            true
        }),

        Commands::Keygen {
            output,
            bytes,
            force,
        } => {
            let options = KeygenOptions { bytes, force };
            generate_key_file(&output, &options).map(|()| {
                println!("Wrote {} byte key to {}", bytes, output.display());
                true
            })
        }
    };

    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
