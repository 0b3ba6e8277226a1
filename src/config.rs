use std::collections::BTreeMap;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::animation::library::{spin_animation, text_animation};
use crate::animation::{Animation, MarqueeAnimation, escape_text};
use crate::dsl;
use crate::encode::{CommandSink, PackedSink, SerialSink, TerminalSink, open_port};
use crate::foundation::core::DEFAULT_TUBES;
use crate::foundation::error::{SegError, SegResult};
use crate::render::{Assembler, DEFAULT_RENDER_PERIOD};
use crate::schedule::{
    AnimationProgram, CronExpr, CronSchedule, DEFAULT_SCHEDULER_PERIOD, DEFAULT_TOLERANCE,
    Program, ProgramId, ScheduleEntry, Scheduler,
};

/// Everything `segtube run` needs: display size, output sink, programs and their schedule.
///
/// Relative animation paths are resolved against the directory of the configuration file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    #[serde(default = "default_tubes")]
    pub tubes: usize,
    #[serde(default = "default_render_period_ms")]
    pub render_period_ms: u64,
    #[serde(default)]
    pub sink: SinkConfig,
    pub programs: BTreeMap<String, ProgramConfig>,
    pub schedule: ScheduleConfig,
    #[serde(skip)]
    base_dir: Option<PathBuf>,
}

fn default_tubes() -> usize {
    DEFAULT_TUBES
}

fn default_render_period_ms() -> u64 {
    DEFAULT_RENDER_PERIOD.as_millis() as u64
}

fn default_scheduler_period_ms() -> u64 {
    DEFAULT_SCHEDULER_PERIOD.as_millis() as u64
}

fn default_tolerance_ms() -> u64 {
    DEFAULT_TOLERANCE.as_millis() as u64
}

fn default_marquee_delay_ms() -> u64 {
    400
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum SinkConfig {
    Terminal {
        #[serde(default)]
        clear_screen: bool,
        #[serde(default)]
        print_code: bool,
    },
    Serial {
        device: PathBuf,
        #[serde(default)]
        prompt: Option<String>,
        #[serde(default)]
        attempts: Option<usize>,
        /// Milliseconds to wait for the prompt per attempt.
        #[serde(default)]
        timeout_ms: Option<u64>,
    },
    Packed {
        device: PathBuf,
    },
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self::Terminal {
            clear_screen: false,
            print_code: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case", deny_unknown_fields)]
pub enum ProgramConfig {
    /// An animation file.
    Animation {
        path: PathBuf,
        #[serde(default, rename = "loop")]
        looped: bool,
        /// Report done after one play, handing the display back to the default program.
        #[serde(default)]
        once: bool,
    },
    /// Scrolling text.
    Marquee {
        text: String,
        #[serde(default = "default_marquee_delay_ms")]
        delay_ms: u64,
        /// Hold a message that fits instead of scrolling it.
        #[serde(default)]
        freeze_ms: Option<u64>,
        #[serde(default = "default_true", rename = "loop")]
        looped: bool,
    },
    /// Static text.
    Text { text: String },
    /// Spinning segments on every tube.
    Spin { rate: f64 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScheduleConfig {
    #[serde(default = "default_scheduler_period_ms")]
    pub period_ms: u64,
    #[serde(default = "default_tolerance_ms")]
    pub tolerance_ms: u64,
    #[serde(default)]
    pub default: Option<String>,
    #[serde(default)]
    pub entries: Vec<EntryConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EntryConfig {
    pub cron: String,
    #[serde(default)]
    pub priority: i32,
    pub program: String,
}

impl RunConfig {
    /// Parse and validate a configuration from JSON.
    pub fn from_reader<R: Read>(r: R) -> SegResult<Self> {
        let config: Self = serde_json::from_reader(r)
            .map_err(|e| SegError::config(format!("parse run configuration JSON: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Parse and validate the configuration file at `path`.
    pub fn from_path(path: impl AsRef<Path>) -> SegResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            SegError::config(format!("open run configuration '{}': {e}", path.display()))
        })?;
        let mut config = Self::from_reader(BufReader::new(f))?;
        config.base_dir = path.parent().map(Path::to_path_buf);
        Ok(config)
    }

    pub fn validate(&self) -> SegResult<()> {
        if self.tubes == 0 {
            return Err(SegError::config("tubes must be positive"));
        }
        if self.render_period_ms == 0 || self.schedule.period_ms == 0 {
            return Err(SegError::config("periods must be positive"));
        }
        if self.programs.is_empty() {
            return Err(SegError::config("no programs defined"));
        }
        if self.schedule.entries.is_empty() && self.schedule.default.is_none() {
            return Err(SegError::config(
                "schedule needs at least one entry or a default program",
            ));
        }

        let referenced = self
            .schedule
            .entries
            .iter()
            .map(|e| &e.program)
            .chain(&self.schedule.default);
        for name in referenced {
            if !self.programs.contains_key(name) {
                return Err(SegError::config(format!("unknown program '{name}'")));
            }
        }
        for entry in &self.schedule.entries {
            CronExpr::parse(&entry.cron).map_err(|e| SegError::config(e.to_string()))?;
        }
        for (name, program) in &self.programs {
            if let ProgramConfig::Spin { rate } = program
                && !(rate.is_finite() && *rate > 0.0)
            {
                return Err(SegError::config(format!(
                    "program '{name}': spin rate must be positive"
                )));
            }
        }
        Ok(())
    }

    pub fn render_period(&self) -> Duration {
        Duration::from_millis(self.render_period_ms)
    }

    fn resolve(&self, path: &Path) -> PathBuf {
        match &self.base_dir {
            Some(dir) if path.is_relative() => dir.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Open the configured output.
    pub fn build_sink(&self) -> SegResult<Box<dyn CommandSink>> {
        Ok(match &self.sink {
            SinkConfig::Terminal {
                clear_screen,
                print_code,
            } => Box::new(
                TerminalSink::new(std::io::stdout())
                    .clear_screen(*clear_screen)
                    .print_code(*print_code),
            ),
            SinkConfig::Serial {
                device,
                prompt,
                attempts,
                timeout_ms,
            } => {
                let mut sink = SerialSink::new(open_port(device)?);
                if let Some(prompt) = prompt {
                    sink = sink.with_prompt(prompt);
                }
                if let Some(attempts) = attempts {
                    sink = sink.with_attempts(*attempts);
                }
                if let Some(ms) = timeout_ms {
                    sink = sink.with_timeout(Duration::from_millis(*ms));
                }
                Box::new(sink)
            }
            SinkConfig::Packed { device } => {
                let out = OpenOptions::new().write(true).create(true).open(device)?;
                Box::new(PackedSink::new(out, self.tubes))
            }
        })
    }

    pub fn build_assembler(&self) -> SegResult<Assembler> {
        Ok(Assembler::with_boxed_sink(self.build_sink()?).with_period(self.render_period()))
    }

    fn build_animation(&self, program: &ProgramConfig) -> SegResult<Animation> {
        Ok(match program {
            ProgramConfig::Animation { path, looped, .. } => {
                let animation: Animation = dsl::load_path(&self.resolve(path), self.tubes)?.into();
                if *looped {
                    animation.looped()
                } else {
                    animation
                }
            }
            ProgramConfig::Marquee {
                text,
                delay_ms,
                freeze_ms,
                looped,
            } => {
                let mut marquee = MarqueeAnimation::from_text(&escape_text(text, &[]), self.tubes)?
                    .with_delay(Duration::from_millis(*delay_ms));
                if let Some(ms) = freeze_ms {
                    marquee = marquee.with_freeze(Duration::from_millis(*ms));
                }
                let animation: Animation = marquee.into();
                if *looped {
                    animation.looped()
                } else {
                    animation
                }
            }
            ProgramConfig::Text { text } => text_animation(&escape_text(text, &[]))?,
            ProgramConfig::Spin { rate } => spin_animation(*rate, self.tubes, true)?,
        })
    }

    /// Build every program, in name order, with the id each name maps to.
    pub fn build_programs(
        &self,
    ) -> SegResult<(Vec<Box<dyn Program>>, BTreeMap<String, ProgramId>)> {
        let mut programs: Vec<Box<dyn Program>> = Vec::with_capacity(self.programs.len());
        let mut ids = BTreeMap::new();
        for (name, config) in &self.programs {
            let animation = self
                .build_animation(config)
                .map_err(|e| SegError::config(format!("program '{name}': {e}")))?;
            let mut program = AnimationProgram::new(name.clone(), animation);
            if let ProgramConfig::Animation { once: true, .. } = config {
                program = program.once();
            }
            debug!(program = %name, id = programs.len(), "built program");
            ids.insert(name.clone(), ProgramId(programs.len()));
            programs.push(Box::new(program));
        }
        Ok((programs, ids))
    }

    pub fn build_schedule(&self, ids: &BTreeMap<String, ProgramId>) -> SegResult<CronSchedule> {
        let lookup = |name: &str| {
            ids.get(name)
                .copied()
                .ok_or_else(|| SegError::config(format!("unknown program '{name}'")))
        };
        let entries = self
            .schedule
            .entries
            .iter()
            .map(|e| ScheduleEntry::new(&e.cron, e.priority, lookup(&e.program)?))
            .collect::<SegResult<Vec<_>>>()?;

        let mut schedule = CronSchedule::new(entries)
            .with_tolerance(Duration::from_millis(self.schedule.tolerance_ms));
        if let Some(name) = &self.schedule.default {
            schedule = schedule.with_default(lookup(name)?);
        }
        Ok(schedule)
    }

    /// Build the programs and their cron schedule on top of `assembler`.
    pub fn build_scheduler(&self, assembler: Arc<Assembler>) -> SegResult<Scheduler> {
        let (programs, ids) = self.build_programs()?;
        let schedule = self.build_schedule(&ids)?;
        Ok(Scheduler::new(assembler, programs, schedule)?
            .with_period(Duration::from_millis(self.schedule.period_ms)))
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
