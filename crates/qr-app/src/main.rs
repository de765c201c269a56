use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use qr_app::{describe_decoded, describe_symbol, run_shell, AppConfig, FormState};
use qr_codec::{to_terminal_string, ErrorCorrectionLevel, MaskPattern, Version};

#[derive(Parser)]
#[command(name = "qr-app", version, about = "QR code generator & reader")]
struct Cli {
    /// JSON configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Only print errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Print debug logs
    #[arg(long, global = true, conflicts_with = "quiet")]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Generate a QR code from text
    Generate {
        text: String,
        /// QR version 1-40
        #[arg(short = 'v', long)]
        version: Option<Version>,
        /// Error correction level: L, M, Q or H
        #[arg(short, long)]
        ec: Option<ErrorCorrectionLevel>,
        /// Treat the version as a minimum and pick the smallest one that fits
        #[arg(long)]
        fit: bool,
        /// Force a mask pattern 0-7 instead of choosing by penalty
        #[arg(long)]
        mask: Option<MaskPattern>,
        /// Save the QR code as PNG
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Print the QR code to the terminal
        #[arg(long)]
        preview: bool,
    },
    /// Decode QR codes from an image file
    Read { image: PathBuf },
    /// Interactive form: text, version, ec, generate, save, read
    Shell,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logger(&cli);

    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Command::Generate {
            text,
            version,
            ec,
            fit,
            mask,
            output,
            preview,
        } => {
            config.encoder.fit_version |= fit;
            if mask.is_some() {
                config.encoder.mask = mask;
            }
            let toolkit = config.toolkit();
            let version = version.unwrap_or(config.default_version);
            let ec_level = ec.unwrap_or(config.default_ec_level);

            let symbol = toolkit
                .generate(&text, version, ec_level)
                .context("Failed to generate QR code")?;
            println!("{}", describe_symbol(&symbol));

            if let Some(path) = &output {
                toolkit
                    .save(&symbol, path)
                    .with_context(|| format!("Failed to save {}", path.display()))?;
                println!("Saved to {}", path.display());
            }
            if preview || output.is_none() {
                print!("{}", to_terminal_string(&symbol, config.render.quiet_zone as usize));
            }
        }
        Command::Read { image } => {
            let toolkit = config.toolkit();
            let decoded = toolkit
                .read_file(&image)
                .with_context(|| format!("Failed to read {}", image.display()))?;
            for line in describe_decoded(&decoded) {
                println!("{}", line);
            }
        }
        Command::Shell => {
            let toolkit = config.toolkit();
            let mut state = FormState::new(config.default_version, config.default_ec_level);
            run_shell(&mut state, &toolkit, io::stdin().lock(), io::stdout().lock())
                .context("Shell I/O failed")?;
        }
    }

    Ok(())
}

fn init_logger(cli: &Cli) {
    let level = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "warn"
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}
