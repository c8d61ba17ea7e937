//! mcqdrill CLI: exam-style MCQ practice from the command line.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "mcqdrill",
    version,
    about = "Exam-style MCQ practice with no-repeat selection and negative marking"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a test session
    Generate {
        /// Test mode: full, subject, topic
        #[arg(long, default_value = "full")]
        mode: String,

        /// Subject to draw from (subject mode, exact match)
        #[arg(long)]
        subject: Option<String>,

        /// Topic keyword (topic mode, case-insensitive substring)
        #[arg(long)]
        topic: Option<String>,

        /// Number of questions (defaults per mode: full 120, subject 20, topic 10)
        #[arg(long, allow_hyphen_values = true)]
        count: Option<i64>,

        /// User whose history is consulted and updated
        #[arg(long)]
        user: Option<String>,

        /// Seed for a reproducible selection
        #[arg(long)]
        seed: Option<u64>,

        /// Question bank (.csv or .json); overrides the config
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Write the session JSON here instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Grade a session against an answer sheet
    Grade {
        /// Session JSON produced by `generate`
        #[arg(long)]
        session: PathBuf,

        /// Answers JSON: {"<question id>": <option index> | null}
        #[arg(long)]
        answers: PathBuf,

        /// Output format: text, json, markdown
        #[arg(long, default_value = "text")]
        format: String,

        /// Also save the result JSON here
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Validate a question bank
    Validate {
        /// Question bank (.csv or .json)
        #[arg(long)]
        bank: PathBuf,
    },

    /// Show how much of a pool a user has already been served
    History {
        /// Test mode: full, subject, topic
        #[arg(long, default_value = "full")]
        mode: String,

        /// Subject (subject mode)
        #[arg(long)]
        subject: Option<String>,

        /// Topic keyword (topic mode)
        #[arg(long)]
        topic: Option<String>,

        /// User to inspect
        #[arg(long)]
        user: Option<String>,

        /// Question bank (.csv or .json); overrides the config
        #[arg(long)]
        bank: Option<PathBuf>,

        /// Config file path
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Create a starter config and sample question bank
    Init,
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("mcqdrill=info".parse().unwrap()),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            mode,
            subject,
            topic,
            count,
            user,
            seed,
            bank,
            output,
            config,
        } => commands::generate::execute(
            mode, subject, topic, count, user, seed, bank, output, config,
        ),
        Commands::Grade {
            session,
            answers,
            format,
            output,
        } => commands::grade::execute(session, answers, format, output),
        Commands::Validate { bank } => commands::validate::execute(bank),
        Commands::History {
            mode,
            subject,
            topic,
            user,
            bank,
            config,
        } => commands::history::execute(mode, subject, topic, user, bank, config),
        Commands::Init => commands::init::execute(),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
