use anyhow::{anyhow, Context, Result};
use clap::{Args, Parser, Subcommand};
use dashbot_autopilot::benchmark::{run_benchmark, BenchmarkConfig};
use dashbot_autopilot::course::Course;
use dashbot_autopilot::runner::{run_pathfind, run_replay, Player, SimConfig};
use dashbot_autopilot::util::{
    load_tuning, parse_seed, parse_seed_csv, seed_sequence, seed_to_hex, write_json,
};
use dashbot_core::codec::{self, SaveDocument};
use dashbot_core::constants::SAVE_FORMAT_VERSION;
use dashbot_core::{BotController, RecordingInput};
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Parser, Debug)]
#[command(name = "dashbot")]
#[command(about = "Death-driven autopilot for side-scrolling obstacle courses")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Debug)]
struct CourseArgs {
    /// Course JSON file; takes precedence over --seed
    #[arg(long)]
    course: Option<PathBuf>,
    /// Seed for a generated course
    #[arg(long)]
    seed: Option<String>,
    #[arg(long, default_value_t = 3_000.0)]
    length: f32,
}

impl CourseArgs {
    fn resolve(&self) -> Result<Course> {
        if let Some(path) = &self.course {
            return Course::load(path);
        }
        let seed = self
            .seed
            .as_deref()
            .ok_or_else(|| anyhow!("either --course or --seed is required"))?;
        Course::generate(parse_seed(seed)?, self.length)
    }
}

#[derive(Args, Debug)]
struct SimArgs {
    #[arg(long, default_value_t = 5.0)]
    speed: f32,
    #[arg(long, default_value_t = 80.0)]
    jump_span: f32,
    #[arg(long, default_value_t = 500)]
    max_attempts: u32,
}

impl From<&SimArgs> for SimConfig {
    fn from(args: &SimArgs) -> Self {
        Self {
            speed: args.speed,
            jump_span: args.jump_span,
            max_attempts: args.max_attempts,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Learn a timeline for a course from scratch and save it
    Pathfind {
        #[command(flatten)]
        course: CourseArgs,
        #[command(flatten)]
        sim: SimArgs,
        /// Tuning overrides (JSON); unspecified fields keep their defaults
        #[arg(long)]
        tuning: Option<PathBuf>,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Also write the full attempt report here
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Play a saved timeline once against a course
    Replay {
        #[command(flatten)]
        course: CourseArgs,
        #[command(flatten)]
        sim: SimArgs,
        #[arg(long)]
        save: PathBuf,
    },
    /// Print the status of a saved timeline
    Inspect {
        #[arg(long)]
        save: PathBuf,
        /// List every action as well
        #[arg(long, default_value_t = false)]
        actions: bool,
    },
    /// Rewrite a save file in the current (or the legacy) layout
    Migrate {
        #[arg(long)]
        input: PathBuf,
        #[arg(long)]
        output: PathBuf,
        #[arg(long, default_value_t = false)]
        legacy: bool,
    },
    /// Write a seeded course to JSON
    GenerateCourse {
        #[arg(long)]
        seed: String,
        #[arg(long, default_value_t = 3_000.0)]
        length: f32,
        #[arg(long)]
        output: PathBuf,
    },
    /// Pathfind many seeded courses in parallel
    Benchmark {
        #[arg(long)]
        seeds: Option<String>,
        #[arg(long)]
        seed_start: Option<String>,
        #[arg(long, default_value_t = 12)]
        seed_count: u32,
        #[arg(long, default_value_t = 3_000.0)]
        length: f32,
        #[command(flatten)]
        sim: SimArgs,
        #[arg(long)]
        tuning: Option<PathBuf>,
        #[arg(long)]
        out_dir: Option<PathBuf>,
        #[arg(long, default_value_t = 3)]
        save_top: usize,
        #[arg(long)]
        jobs: Option<usize>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    match Cli::parse().command {
        Commands::Pathfind {
            course,
            sim,
            tuning,
            output,
            report,
        } => {
            let course = course.resolve()?;
            let tuning = load_tuning(tuning.as_deref())?;
            let artifact = run_pathfind(&course, tuning, &SimConfig::from(&sim))?;
            let output = output
                .unwrap_or_else(|| PathBuf::from(format!("timelines/{}.json", course.id)));
            artifact.bot.save(&output)?;
            if let Some(path) = report {
                write_json(&path, &artifact.report)?;
                println!("report={}", path.display());
            }

            let status = artifact.report.status;
            println!("course={}", course.id);
            println!("completed={}", artifact.report.completed);
            println!("attempts={}", artifact.report.attempts);
            println!("best={}", status.best_progress);
            println!("actions={}", status.action_count);
            println!("output={}", output.display());
        }
        Commands::Replay { course, sim, save } => {
            let course = course.resolve()?;
            let mut bot = BotController::new(Player::default());
            bot.load(&save)?;
            let report = run_replay(&mut bot, &course, &SimConfig::from(&sim))?;
            println!("course={}", report.course_id);
            println!("{}", serde_json::to_string(&report.outcome)?);
            println!("presses={}", report.presses);
        }
        Commands::Inspect { save, actions } => {
            let mut bot = BotController::new(RecordingInput::new());
            bot.load(&save)?;
            println!("{}", serde_json::to_string_pretty(&bot.status())?);
            if actions {
                for action in bot.timeline() {
                    println!("{:>10.2} {:?}", action.position, action.kind);
                }
            }
        }
        Commands::Migrate {
            input,
            output,
            legacy,
        } => {
            let text = fs::read_to_string(&input)
                .with_context(|| format!("failed reading {}", input.display()))?;
            let doc = codec::decode(&text)
                .map_err(|err| anyhow!("{}: {err}", input.display()))?;
            let from_version = doc.version;
            let encoded = if legacy {
                codec::encode_legacy(doc.best, &doc.actions)
            } else {
                codec::encode(&SaveDocument {
                    version: SAVE_FORMAT_VERSION,
                    ..doc
                })?
            };
            fs::write(&output, encoded)
                .with_context(|| format!("failed writing {}", output.display()))?;
            println!("from_version={from_version}");
            println!("legacy={legacy}");
            println!("output={}", output.display());
        }
        Commands::GenerateCourse {
            seed,
            length,
            output,
        } => {
            let seed = parse_seed(&seed)?;
            let course = Course::generate(seed, length)?;
            course.write(&output)?;
            println!("seed={}", seed_to_hex(seed));
            println!("hazards={}", course.hazards.len());
            println!("output={}", output.display());
        }
        Commands::Benchmark {
            seeds,
            seed_start,
            seed_count,
            length,
            sim,
            tuning,
            out_dir,
            save_top,
            jobs,
        } => {
            let seeds = match seeds.as_deref() {
                Some(csv) => parse_seed_csv(csv)?,
                None => {
                    let start = match seed_start.as_deref() {
                        Some(start) => parse_seed(start)?,
                        None => 0xA57E_0001,
                    };
                    seed_sequence(start, seed_count)
                }
            };
            let out_dir = out_dir
                .unwrap_or_else(|| PathBuf::from(format!("benchmarks/{}", timestamp_suffix())));

            let report = run_benchmark(BenchmarkConfig {
                seeds,
                course_length: length,
                sim: SimConfig::from(&sim),
                tuning: load_tuning(tuning.as_deref())?,
                out_dir: out_dir.clone(),
                save_top,
                jobs,
            })?;

            println!("runs={}", report.run_count);
            println!(
                "jobs={}",
                report
                    .jobs
                    .map(|value| value.to_string())
                    .unwrap_or_else(|| "auto".to_string())
            );
            println!("completion_rate={:.3}", report.completion_rate);
            println!("avg_attempts={:.1}", report.avg_attempts_completed);
            println!("out_dir={}", out_dir.display());
            for run in report.runs.iter().take(5) {
                println!(
                    "  {} completed={} attempts={} actions={}",
                    run.seed_hex, run.completed, run.attempts, run.action_count
                );
            }
        }
    }

    Ok(())
}

fn timestamp_suffix() -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    format!("{now}")
}
