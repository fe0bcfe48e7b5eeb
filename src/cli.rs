//! Terminal front-end: stdin/stdout REPL over the decision workflow.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};

use crate::decision::model::ACTIVITY_PRESETS;
use crate::decision::quotes::pick_quote;
use crate::decision::{
    CycleOutcome, DecisionMode, DecisionRecord, DecisionReply, DecisionService, FileDescriptor,
    RequestContext, Role, TimeBucket,
};
use crate::error::DecisionError;
use crate::preferences::{PersonalityMode, PreferenceStore};

const HELP: &str = "\
Commands:
  role <student|professional>      who you are
  pick <tag>[, <tag>...]           toggle activities (see `presets`)
  presets                          list suggested activities
  file [path]                      attach a schedule/doc (no path detaches)
  time <morning|afternoon|evening|auto>
  decide                           pick the single best activity
  timetable                        plan the next few hours
  share                            print the last decision for sharing
  history | show <n> | clear       browse or wipe past decisions
  stats                            decisions made and time saved
  settings                         show stored preferences
  personality <balanced|strict|zen>
  instructions [text]              custom rules for the AI (no text clears)
  notifications <on|off>
  save-history <on|off>
  quit";

/// A parsed REPL line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Role(Role),
    Pick(Vec<String>),
    Presets,
    File(Option<String>),
    Time(Option<TimeBucket>),
    Run(DecisionMode),
    Share,
    History,
    Show(usize),
    Clear,
    Stats,
    Settings,
    Personality(PersonalityMode),
    Instructions(String),
    Notifications(bool),
    SaveHistory(bool),
    Quit,
}

fn parse_toggle(arg: &str) -> Result<bool, String> {
    match arg.trim().to_ascii_lowercase().as_str() {
        "on" | "true" | "yes" => Ok(true),
        "off" | "false" | "no" => Ok(false),
        other => Err(format!("expected on/off, got '{other}'")),
    }
}

/// Parse one input line.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (head, rest) = line
        .split_once(char::is_whitespace)
        .map(|(h, r)| (h, r.trim()))
        .unwrap_or((line, ""));

    match head.to_ascii_lowercase().as_str() {
        "help" | "?" => Ok(Command::Help),
        "role" => rest.parse().map(Command::Role),
        "pick" => {
            let tags: Vec<String> = rest
                .split(',')
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .collect();
            if tags.is_empty() {
                Err("usage: pick <tag>[, <tag>...]".to_string())
            } else {
                Ok(Command::Pick(tags))
            }
        }
        "presets" => Ok(Command::Presets),
        "file" => Ok(Command::File((!rest.is_empty()).then(|| rest.to_string()))),
        "time" => match rest.to_ascii_lowercase().as_str() {
            "morning" => Ok(Command::Time(Some(TimeBucket::Morning))),
            "afternoon" => Ok(Command::Time(Some(TimeBucket::Afternoon))),
            "evening" => Ok(Command::Time(Some(TimeBucket::Evening))),
            "auto" | "" => Ok(Command::Time(None)),
            other => Err(format!("unknown time of day '{other}'")),
        },
        "decide" => Ok(Command::Run(DecisionMode::Decision)),
        "timetable" => Ok(Command::Run(DecisionMode::Timetable)),
        "share" => Ok(Command::Share),
        "history" => Ok(Command::History),
        "show" => rest
            .parse::<usize>()
            .ok()
            .filter(|n| *n > 0)
            .map(Command::Show)
            .ok_or_else(|| "usage: show <n> (1 = most recent)".to_string()),
        "clear" => Ok(Command::Clear),
        "stats" => Ok(Command::Stats),
        "settings" => Ok(Command::Settings),
        "personality" => rest.parse().map(Command::Personality),
        "instructions" => Ok(Command::Instructions(rest.to_string())),
        "notifications" => parse_toggle(rest).map(Command::Notifications),
        "save-history" => parse_toggle(rest).map(Command::SaveHistory),
        "quit" | "exit" | "/quit" => Ok(Command::Quit),
        other => Err(format!("unknown command '{other}', try `help`")),
    }
}

fn render_reply(reply: &DecisionReply) -> String {
    format!("[{}] {}\n{}", reply.icon, reply.decision, reply.reason)
}

fn render_record(record: &DecisionRecord) -> String {
    let kind = if record.is_timetable { "timetable" } else { "decision" };
    format!(
        "[{}] {} ({kind}, {})\n{}",
        record.icon, record.decision, record.timestamp, record.reason
    )
}

/// Interactive session state: the current selection and the last answer.
pub struct Repl {
    service: Arc<DecisionService>,
    prefs: PreferenceStore,
    ctx: RequestContext,
    time_override: Option<TimeBucket>,
    last: Option<DecisionRecord>,
    pending_clear: bool,
}

impl Repl {
    pub fn new(service: Arc<DecisionService>, prefs: PreferenceStore) -> Self {
        Self {
            service,
            prefs,
            ctx: RequestContext::new(Role::Student, TimeBucket::now()),
            time_override: None,
            last: None,
            pending_clear: false,
        }
    }

    /// Handle one line. Returns `None` when the session should end.
    pub async fn handle_line(&mut self, line: &str) -> Option<String> {
        if self.pending_clear {
            self.pending_clear = false;
            return Some(if line.trim().eq_ignore_ascii_case("yes") {
                if self.service.history().clear().await {
                    "Decision history has been cleared.".to_string()
                } else {
                    "Could not clear history from storage.".to_string()
                }
            } else {
                "Clear cancelled.".to_string()
            });
        }

        let command = match parse_command(line) {
            Ok(c) => c,
            Err(e) => return Some(e),
        };
        if command == Command::Quit {
            return None;
        }
        Some(self.execute(command).await)
    }

    async fn execute(&mut self, command: Command) -> String {
        match command {
            Command::Help => HELP.to_string(),
            Command::Role(role) => {
                self.ctx.role = role;
                format!("Role set to {role}.")
            }
            Command::Pick(tags) => {
                for tag in &tags {
                    self.ctx.toggle_activity(tag);
                }
                self.selection_summary()
            }
            Command::Presets => format!("Suggested activities: {}", ACTIVITY_PRESETS.join(", ")),
            Command::File(path) => match path.as_deref().and_then(FileDescriptor::from_path) {
                Some(file) => {
                    let name = file.name.clone();
                    self.ctx.file = Some(file);
                    format!("Attached \"{name}\".")
                }
                None => {
                    self.ctx.file = None;
                    "No file attached.".to_string()
                }
            },
            Command::Time(bucket) => {
                self.time_override = bucket;
                match bucket {
                    Some(b) => format!("Time of day fixed to {b}."),
                    None => "Time of day follows the clock.".to_string(),
                }
            }
            Command::Run(mode) => self.run(mode).await,
            Command::Share => match &self.last {
                Some(record) => record.share_summary(self.prefs.nickname().await.as_deref()),
                None => "Nothing to share yet. Run `decide` first.".to_string(),
            },
            Command::History => {
                let entries = self.service.history().list().await;
                if entries.is_empty() {
                    return "No decisions yet.".to_string();
                }
                entries
                    .iter()
                    .enumerate()
                    .map(|(i, r)| format!("{:>2}. {} ({})", i + 1, r.decision, r.timestamp))
                    .collect::<Vec<_>>()
                    .join("\n")
            }
            Command::Show(n) => match self.service.history().get(n - 1).await {
                Some(record) => render_record(&record),
                None => format!("No decision #{n}."),
            },
            Command::Clear => {
                self.pending_clear = true;
                "Clear all saved decision history? This cannot be undone. Type `yes` to confirm."
                    .to_string()
            }
            Command::Stats => {
                let stats = self.service.history().stats().await;
                format!(
                    "Decisions: {}\nTime saved: {}m",
                    stats.total_decisions, stats.minutes_saved
                )
            }
            Command::Settings => {
                let p = self.prefs.snapshot().await;
                let [from, to] = p.personality_mode.theme_colors();
                format!(
                    "Personality: [{}] {} ({}) theme {from} → {to}\nCustom instructions: {}\n\
                     Notifications: {}\nSave history: {}\nNickname: {}",
                    p.personality_mode.icon(),
                    p.personality_mode,
                    p.personality_mode.description(),
                    if p.custom_instructions.is_empty() {
                        "(none)"
                    } else {
                        p.custom_instructions.as_str()
                    },
                    if p.notifications_enabled { "on" } else { "off" },
                    if p.save_history_enabled { "on" } else { "off" },
                    p.nickname.as_deref().unwrap_or("(not set)"),
                )
            }
            Command::Personality(mode) => {
                self.prefs.set_personality(mode).await;
                format!("DeciMate is now in {mode} mode. {}", mode.description())
            }
            Command::Instructions(text) => {
                self.prefs.set_custom_instructions(&text).await;
                if text.is_empty() {
                    "Custom instructions cleared.".to_string()
                } else {
                    "DeciMate has learned your new rules!".to_string()
                }
            }
            Command::Notifications(on) => {
                self.prefs.set_notifications_enabled(on).await;
                format!("Notifications {}.", if on { "on" } else { "off" })
            }
            Command::SaveHistory(on) => {
                self.prefs.set_save_history_enabled(on).await;
                format!("Save history {}.", if on { "on" } else { "off" })
            }
            Command::Quit => String::new(),
        }
    }

    fn selection_summary(&self) -> String {
        if self.ctx.activities.is_empty() {
            "No activities selected.".to_string()
        } else {
            format!(
                "Selected: {}",
                self.ctx
                    .activities
                    .iter()
                    .map(String::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        }
    }

    async fn run(&mut self, mode: DecisionMode) -> String {
        if self.service.is_busy().await {
            return "Still thinking about the last one...".to_string();
        }

        self.ctx.mode = mode;
        self.ctx.time_bucket = self.time_override.unwrap_or_else(TimeBucket::now);

        if self.ctx.has_input() {
            let personality = self.prefs.personality().await;
            let quote = pick_quote(personality, self.ctx.role, &mut rand::thread_rng());
            eprintln!("⏳ {quote}");
        }

        match self.service.run(&self.ctx).await {
            Ok(CycleOutcome::Decided { record, saved }) => {
                let mut out = render_record(&record);
                if !saved {
                    out.push_str("\n(not saved to history)");
                }
                self.last = Some(record);
                out
            }
            Ok(CycleOutcome::Failed { fallback, .. }) => render_reply(&fallback),
            Err(DecisionError::InputRequired) => {
                "Please select at least one activity or upload a file.".to_string()
            }
        }
    }

    /// Read commands from stdin until EOF or `quit`.
    pub async fn run_stdin(mut self) -> std::io::Result<()> {
        let reader = BufReader::new(tokio::io::stdin());
        let mut lines = reader.lines();

        if self.prefs.nickname().await.is_none() {
            eprint!("Welcome to DeciMate! What should I call you? ");
            if let Some(name) = lines.next_line().await? {
                self.prefs.set_nickname_once(&name).await;
            }
        }
        match self.prefs.nickname().await {
            Some(name) => eprintln!("Hi {name}! Type `help` for commands."),
            None => eprintln!("Type `help` for commands."),
        }

        eprint!("> ");
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                eprint!("> ");
                continue;
            }
            match self.handle_line(&line).await {
                Some(output) => println!("\n{output}\n"),
                None => break,
            }
            eprint!("> ");
        }
        Ok(())
    }
}
