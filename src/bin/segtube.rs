use std::{
    fs::OpenOptions,
    path::{Path, PathBuf},
    sync::Arc,
    thread,
    time::Duration,
};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand, ValueEnum};
use segtube::{
    Animation, Assembler, CommandSink, DEFAULT_TUBES, PackedSink, RunConfig, SerialSink,
    TerminalSink,
    animation::{MarqueeAnimation, escape_text},
    codec,
    encode::open_port,
};

#[derive(Parser, Debug)]
#[command(name = "segtube", version)]
struct Cli {
    /// More logging (`-v` debug, `-vv` trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Decode a command string and draw it.
    Decode {
        /// Command string, e.g. `12{0x113f}:`.
        cmd: String,
    },
    /// Validate an animation file, listing every failing line.
    Check {
        file: PathBuf,
        #[arg(long, default_value_t = DEFAULT_TUBES)]
        tubes: usize,
    },
    /// Play an animation file.
    Play {
        file: PathBuf,
        /// Start over whenever the animation finishes.
        #[arg(long)]
        repeat: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Scroll text across the display.
    Marquee {
        text: String,
        /// Milliseconds per scroll step.
        #[arg(long, default_value_t = 400)]
        delay_ms: u64,
        /// Scroll forever.
        #[arg(long)]
        repeat: bool,
        #[command(flatten)]
        output: OutputArgs,
    },
    /// Run programs on a schedule from a JSON configuration.
    Run {
        #[arg(long)]
        config: PathBuf,
    },
}

#[derive(Args, Debug)]
struct OutputArgs {
    #[arg(long, value_enum, default_value_t = SinkChoice::Terminal)]
    sink: SinkChoice,

    /// Device node for the `serial` and `packed` sinks.
    #[arg(long)]
    device: Option<PathBuf>,

    #[arg(long, default_value_t = DEFAULT_TUBES)]
    tubes: usize,

    /// Milliseconds between render ticks.
    #[arg(long, default_value_t = 50)]
    period_ms: u64,

    /// Draw terminal frames below each other instead of clearing the screen.
    #[arg(long)]
    no_clear: bool,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum SinkChoice {
    Terminal,
    Serial,
    Packed,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.cmd {
        Command::Decode { cmd } => cmd_decode(&cmd),
        Command::Check { file, tubes } => cmd_check(&file, tubes),
        Command::Play {
            file,
            repeat,
            output,
        } => {
            let animation = segtube::dsl::load_path(&file, output.tubes)
                .with_context(|| format!("load animation '{}'", file.display()))?;
            play(animation.into(), repeat, &output)
        }
        Command::Marquee {
            text,
            delay_ms,
            repeat,
            output,
        } => {
            let animation = MarqueeAnimation::from_text(&escape_text(&text, &[]), output.tubes)
                .context("build marquee")?
                .with_delay(Duration::from_millis(delay_ms));
            play(animation.into(), repeat, &output)
        }
        Command::Run { config } => cmd_run(&config),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn cmd_decode(cmd: &str) -> anyhow::Result<()> {
    let codes = codec::decode(cmd).with_context(|| format!("decode '{cmd}'"))?;
    let hex: Vec<String> = codes.iter().map(|c| format!("{c:#06x}")).collect();
    println!("{}", hex.join(" "));
    print!("{}", codec::render_codes(&codes));
    Ok(())
}

fn cmd_check(file: &Path, tubes: usize) -> anyhow::Result<()> {
    let animation = segtube::dsl::load_path(file, tubes)?;
    println!(
        "{}: ok, {} frames, {:.2}s",
        file.display(),
        animation.frame_count(),
        animation.length().as_secs_f64()
    );
    Ok(())
}

fn make_sink(output: &OutputArgs) -> anyhow::Result<Box<dyn CommandSink>> {
    let device = || {
        output
            .device
            .as_deref()
            .context("--device is required for this sink")
    };
    Ok(match output.sink {
        SinkChoice::Terminal => {
            Box::new(TerminalSink::new(std::io::stdout()).clear_screen(!output.no_clear))
        }
        SinkChoice::Serial => {
            let path = device()?;
            let port = open_port(path)
                .with_context(|| format!("open serial device '{}'", path.display()))?;
            Box::new(SerialSink::new(port))
        }
        SinkChoice::Packed => {
            let path = device()?;
            let out = OpenOptions::new()
                .write(true)
                .create(true)
                .open(path)
                .with_context(|| format!("open device '{}'", path.display()))?;
            Box::new(PackedSink::new(out, output.tubes))
        }
    })
}

fn play(animation: Animation, repeat: bool, output: &OutputArgs) -> anyhow::Result<()> {
    let period = Duration::from_millis(output.period_ms.max(1));
    let assembler = Assembler::with_boxed_sink(make_sink(output)?).with_period(period);
    assembler.set_animation(animation);
    assembler.start()?;

    while assembler.is_running() {
        thread::sleep(period);
        if assembler.animation_done() {
            if !repeat {
                break;
            }
            assembler.rerun();
        }
    }
    let crashed = !assembler.is_running() && !assembler.animation_done();
    assembler.stop();
    anyhow::ensure!(!crashed, "render thread stopped unexpectedly");
    Ok(())
}

fn cmd_run(path: &Path) -> anyhow::Result<()> {
    let config = RunConfig::from_path(path)
        .with_context(|| format!("load run configuration '{}'", path.display()))?;
    let assembler = Arc::new(config.build_assembler()?);
    let scheduler = config.build_scheduler(Arc::clone(&assembler))?;

    assembler.start()?;
    scheduler.start()?;
    while assembler.is_running() && scheduler.is_running() {
        thread::sleep(Duration::from_millis(500));
    }
    scheduler.stop();
    assembler.stop();
    anyhow::bail!("a worker thread stopped unexpectedly")
}
