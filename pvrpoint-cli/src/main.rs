// CLI application
use clap::Parser;
use pvrpoint_core::config::HardwareProfile;
use std::path::PathBuf;

mod commands;

#[derive(Parser)]
#[command(name = "pvrpoint")]
#[command(about = "PowerVR point-primitive pipeline driver")]
#[command(version)]
struct Cli {
    /// Raise the default log level (repeat for more)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Subcommand)]
enum Commands {
    /// Draw a point scene into software parameter buffers
    Render {
        /// Scene description (JSON: context, vertices, optional indices)
        #[arg(short, long)]
        scene: PathBuf,

        /// Pipeline configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Override the configured ISP profile
        #[arg(long, value_enum)]
        profile: Option<ProfileArg>,

        /// ISP buffer size in words
        #[arg(long, default_value_t = 0x1_0000)]
        isp_words: usize,

        /// TSP buffer size in words
        #[arg(long, default_value_t = 0x1_0000)]
        tsp_words: usize,

        /// ISP segment size in words (0 for one contiguous segment)
        #[arg(long, default_value_t = 0)]
        segment_words: usize,

        /// Hex dump both buffers after the draw
        #[arg(long)]
        dump: bool,
    },
    /// Print the mode dispatch tables
    Tables,
}

#[derive(Clone, Copy, clap::ValueEnum)]
enum ProfileArg {
    NativeFloat,
    PackedFixed,
}

impl From<ProfileArg> for HardwareProfile {
    fn from(arg: ProfileArg) -> Self {
        match arg {
            ProfileArg::NativeFloat => HardwareProfile::NativeFloat,
            ProfileArg::PackedFixed => HardwareProfile::PackedFixed,
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let default_level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();

    match cli.command {
        Commands::Render {
            scene,
            config,
            profile,
            isp_words,
            tsp_words,
            segment_words,
            dump,
        } => {
            commands::render(&commands::RenderOptions {
                scene,
                config,
                profile: profile.map(Into::into),
                isp_words,
                tsp_words,
                segment_words,
                dump,
            })?;
        }
        Commands::Tables => commands::print_tables(),
    }

    Ok(())
}
