//! Terminal front-end for the weekly planner.
//!
//! # Responsibility
//! - Parse commands and configuration (flags with env fallbacks).
//! - Forward edits to `WeekStore` and print what it returns.
//!
//! # Invariants
//! - All state changes go through `WeekStore`; this binary holds no state.
//! - Day arguments are 1-based (1 = Monday .. 7 = Sunday).

use clap::{Parser, Subcommand, ValueEnum};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use weekplan_core::db::open_db;
use weekplan_core::{
    default_log_level, init_logging, Energy, HabitName, Labeled, Mood, SqliteStateRepository,
    StateRepository, Theme, Week, WeekKey, WeekStore,
};

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

#[derive(Parser, Debug)]
#[command(name = "weekplan", version, about = "Weekly planner", propagate_version = true)]
struct Cli {
    /// Planner database file.
    #[arg(long, env = "WEEKPLAN_DB", default_value = "weekplan.sqlite3")]
    db: PathBuf,
    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "WEEKPLAN_LOG_DIR")]
    log_dir: Option<String>,
    /// trace|debug|info|warn|error
    #[arg(long, env = "WEEKPLAN_LOG_LEVEL")]
    log_level: Option<String>,
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the selected week.
    #[command(alias = "s")]
    Show,
    /// Select (or create) the week containing DATE (YYYY-MM-DD).
    #[command(alias = "w")]
    Switch { date: String },
    #[command(subcommand)]
    Task(TaskAction),
    #[command(subcommand)]
    Day(DayAction),
    #[command(subcommand)]
    Habit(HabitAction),
    #[command(subcommand)]
    Calendar(CalendarAction),
    /// Archive table of all stored weeks, newest first.
    History,
    /// Delete a stored week by any date inside it.
    Delete { date: String },
    /// Show or change the color theme.
    Theme { value: Option<ThemeArg> },
}

#[derive(Subcommand, Debug)]
enum TaskAction {
    Add {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,
        text: Option<String>,
    },
    Text {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,
        index: usize,
        text: String,
    },
    Done {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,
        index: usize,
        #[arg(long)]
        undo: bool,
    },
    Rm {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,
        index: usize,
    },
}

#[derive(Subcommand, Debug)]
enum DayAction {
    /// Energy level 0-4 (0 clears).
    Energy {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,
        #[arg(value_parser = clap::value_parser!(u8).range(0..=4))]
        level: u8,
    },
    /// Mood emoji, or an empty string to clear.
    Mood {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,
        mood: String,
    },
    Sleep {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,
        value: String,
    },
    Note {
        #[arg(value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,
        text: String,
    },
}

#[derive(Subcommand, Debug)]
enum HabitAction {
    Add { name: Option<String> },
    Rename { index: usize, name: String },
    Check {
        index: usize,
        #[arg(value_parser = clap::value_parser!(u8).range(1..=7))]
        day: u8,
        #[arg(long)]
        off: bool,
    },
    Rm { index: usize },
}

#[derive(Subcommand, Debug)]
enum CalendarAction {
    Get { date: String },
    /// Set a note; an empty text removes it.
    Set { date: String, text: String },
    Rm { date: String },
    List,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
enum ThemeArg {
    Light,
    Dark,
    Toggle,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let conn = open_db(&cli.db)?;
    let mut store = WeekStore::load(SqliteStateRepository::new(&conn));
    if !store.instructions_seen() {
        println!("Tip: `weekplan switch <date>` picks a week; `weekplan --help` lists the rest.");
        store.mark_instructions_seen()?;
    }

    match cli.command.unwrap_or(Command::Show) {
        Command::Show => print_live_week(&store),
        Command::Switch { date } => match store.switch_to(&date)? {
            Some(_) => print_live_week(&store),
            None => println!("`{date}` is not a date; nothing changed"),
        },
        Command::Task(action) => {
            run_task(&mut store, action)?;
            print_live_week(&store);
        }
        Command::Day(action) => {
            run_day(&mut store, action)?;
            print_live_week(&store);
        }
        Command::Habit(action) => {
            run_habit(&mut store, action)?;
            print_habits(store.live_week());
        }
        Command::Calendar(action) => run_calendar(&mut store, action)?,
        Command::History => print_history(&store),
        Command::Delete { date } => {
            let key = WeekKey::parse(&date).ok_or_else(|| format!("`{date}` is not a date"))?;
            if store.delete_week(key)? {
                println!("deleted week {key}");
            } else {
                println!("no week stored at {key}");
            }
        }
        Command::Theme { value } => {
            let theme = match value {
                None => store.theme(),
                Some(ThemeArg::Toggle) => store.toggle_theme()?,
                Some(ThemeArg::Light) => set_theme(&mut store, Theme::Light)?,
                Some(ThemeArg::Dark) => set_theme(&mut store, Theme::Dark)?,
            };
            println!("theme: {theme:?}");
        }
    }
    Ok(())
}

fn run_task<R: StateRepository>(
    store: &mut WeekStore<R>,
    action: TaskAction,
) -> Result<(), Box<dyn Error>> {
    match action {
        TaskAction::Add { day, text } => {
            let day = day_index(day);
            let index = store.add_task(day)?;
            if let Some(text) = text {
                store.set_task_text(day, index, &text)?;
            }
        }
        TaskAction::Text { day, index, text } => store.set_task_text(day_index(day), index, &text)?,
        TaskAction::Done { day, index, undo } => {
            store.set_task_done(day_index(day), index, !undo)?
        }
        TaskAction::Rm { day, index } => {
            store.remove_task(day_index(day), index)?;
        }
    }
    Ok(())
}

fn run_day<R: StateRepository>(
    store: &mut WeekStore<R>,
    action: DayAction,
) -> Result<(), Box<dyn Error>> {
    match action {
        DayAction::Energy { day, level } => {
            let energy = level
                .checked_sub(1)
                .and_then(|index| Energy::ALL.get(usize::from(index)).copied());
            store.set_energy(day_index(day), energy)?;
        }
        DayAction::Mood { day, mood } => {
            let parsed = Mood::from_label(mood.trim());
            if parsed.is_none() && !mood.trim().is_empty() {
                let known: Vec<&str> = Mood::ALL.iter().map(|known| known.label()).collect();
                return Err(format!("unknown mood `{mood}`; expected one of {}", known.join(" ")).into());
            }
            store.set_mood(day_index(day), parsed)?;
        }
        DayAction::Sleep { day, value } => store.set_sleep(day_index(day), &value)?,
        DayAction::Note { day, text } => store.set_note(day_index(day), &text)?,
    }
    Ok(())
}

fn run_habit<R: StateRepository>(
    store: &mut WeekStore<R>,
    action: HabitAction,
) -> Result<(), Box<dyn Error>> {
    match action {
        HabitAction::Add { name } => {
            store.add_habit(HabitName::from_label(name.as_deref().unwrap_or("")))?;
        }
        HabitAction::Rename { index, name } => {
            store.rename_habit(index, HabitName::from_label(&name))?
        }
        HabitAction::Check { index, day, off } => {
            store.set_habit_check(index, day_index(day), !off)?
        }
        HabitAction::Rm { index } => {
            store.remove_habit(index)?;
        }
    }
    Ok(())
}

fn run_calendar<R: StateRepository>(
    store: &mut WeekStore<R>,
    action: CalendarAction,
) -> Result<(), Box<dyn Error>> {
    match action {
        CalendarAction::Get { date } => {
            println!("{}", store.calendar_note(&date).unwrap_or("(no note)"));
        }
        CalendarAction::Set { date, text } => store.set_calendar_note(&date, &text)?,
        CalendarAction::Rm { date } => {
            store.delete_calendar_note(&date)?;
        }
        CalendarAction::List => {
            for (day, note) in store.calendar() {
                println!("{day}  {note}");
            }
        }
    }
    Ok(())
}

fn set_theme<R: StateRepository>(
    store: &mut WeekStore<R>,
    theme: Theme,
) -> Result<Theme, Box<dyn Error>> {
    store.set_theme(theme)?;
    Ok(theme)
}

fn day_index(day: u8) -> usize {
    usize::from(day) - 1
}

fn print_live_week<R: StateRepository>(store: &WeekStore<R>) {
    let (Some(key), Some(week)) = (store.current_week_key(), store.live_week()) else {
        println!("No week selected. Run `weekplan switch <date>`.");
        return;
    };

    println!("Week of {key}");
    for (index, day) in week.days.iter().enumerate() {
        println!(
            "\n{} {}  energy:{} mood:{} sleep:{}",
            DAY_NAMES[index],
            day.date,
            day.energy.map_or("-", Energy::label),
            day.mood.map_or("-", Mood::label),
            if day.sleep.is_empty() { "-" } else { day.sleep.as_str() }
        );
        for (task_index, task) in day.tasks.iter().enumerate() {
            let text = if task.text.is_empty() { "(new task)" } else { task.text.as_str() };
            println!("  {task_index}. [{}] {text}", if task.done { "x" } else { " " });
        }
        if !day.note.is_empty() {
            println!("  note: {}", day.note);
        }
    }

    if let Some(progress) = store.live_progress() {
        println!(
            "\nDone {}/{} ({}%)  daily: {:?}",
            progress.tasks_done, progress.tasks_total, progress.completion_percent, progress.daily_percent
        );
    }
    print_habits(Some(week));
}

fn print_habits(week: Option<&Week>) {
    let Some(week) = week else {
        println!("No week selected.");
        return;
    };
    if week.habits.is_empty() {
        println!("\nNo habits yet.");
        return;
    }
    println!("\nHabits        {}", DAY_NAMES.join(" "));
    for (index, habit) in week.habits.iter().enumerate() {
        let checks: Vec<&str> = habit
            .checks
            .iter()
            .map(|checked| if *checked { " x " } else { " . " })
            .collect();
        let name = match &habit.name {
            HabitName::Unnamed => "(unnamed)".to_string(),
            HabitName::Preset(preset) => format!("{} {}", preset.label(), preset.title()),
            HabitName::Legacy(text) => text.clone(),
        };
        println!("{index}. {name:<10} {}", checks.join(" "));
    }
}

fn print_history<R: StateRepository>(store: &WeekStore<R>) {
    let summaries = store.history();
    if summaries.is_empty() {
        println!("History is empty. Switch to another week to start one.");
        return;
    }
    println!("Week        Tasks    Habits  Sleep   Mood");
    for summary in summaries {
        println!(
            "{}  {:>3}/{:<3}  {:>6}  {:>6}  {}",
            summary.week_key,
            summary.tasks_done,
            summary.tasks_total,
            summary.habit_checks_done,
            summary.sleep_label(),
            summary.mood_label()
        );
    }
}
