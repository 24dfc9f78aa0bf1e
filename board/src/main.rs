//! Terminal front end of the task board.
//!
//! Every command loads one month through [`BoardController`] and goes through
//! the same drag and view flows as a graphical board would.

use anyhow::{bail, Context};
use chrono::{Datelike, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use shared::MonthRange;
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

use board::views::{tag_badge_class, TaskCard};
use board::{BoardConfig, BoardController, HttpBackend, MoveOutcome, NagerHolidays, Session, SessionFile};

type Controller = BoardController<HttpBackend, NagerHolidays>;

#[derive(Parser)]
#[command(name = "board", version, about = "Monthly task board")]
struct Cli {
    /// Month to work on (YYYY-MM); defaults to the current month
    #[arg(long, short, global = true, value_parser = parse_month)]
    month: Option<MonthRange>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Print the month grid
    Show {
        /// Only show tasks whose content or tag names match
        search: Option<String>,
    },
    /// Add a task at the top of a day
    Add {
        date: NaiveDate,
        content: String,
        /// Tag name to attach; repeatable
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Move a task to a position on a day of the same month
    Move {
        task_id: Uuid,
        date: NaiveDate,
        index: usize,
    },
    /// Replace a task's content and tags
    Edit {
        task_id: Uuid,
        content: String,
        #[arg(long = "tag")]
        tags: Vec<String>,
    },
    /// Delete a task
    Delete {
        task_id: Uuid,
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },
}

fn parse_month(arg: &str) -> Result<MonthRange, String> {
    NaiveDate::parse_from_str(&format!("{}-01", arg), "%Y-%m-%d")
        .map(MonthRange::containing)
        .map_err(|_| format!("expected YYYY-MM, got {:?}", arg))
}

fn tag_ids(controller: &Controller, names: &[String]) -> anyhow::Result<Vec<Uuid>> {
    names
        .iter()
        .map(|name| {
            controller
                .tags()
                .iter()
                .find(|t| t.name.eq_ignore_ascii_case(name))
                .map(|t| t.id)
                .with_context(|| format!("Unknown tag {:?}", name))
        })
        .collect()
}

fn card(controller: &Controller, task_id: Uuid) -> anyhow::Result<TaskCard> {
    controller
        .card(task_id)
        .with_context(|| format!("Task {} is not on the board for {}", task_id, controller.month().first.format("%Y-%m")))
}

fn print_month(controller: &Controller) {
    println!("{}", controller.month().first.format("%B %Y"));
    for week in controller.grid().chunks(7) {
        println!();
        for day in week {
            if !day.in_month {
                continue;
            }
            let mut header = format!("{} {:>2}", day.date.weekday(), day.date.day());
            for holiday in &day.holidays {
                header.push_str(&format!("  * {}", holiday.name));
            }
            println!("{}", header);
            for task in &day.tasks {
                let tags: Vec<String> = task
                    .tags
                    .iter()
                    .map(|t| format!("[{} {}]", t.name, tag_badge_class(t)))
                    .collect();
                let card = TaskCard::new(task.clone());
                println!("    {}. {} {} ({})", task.order, card.display_text(), tags.join(" "), task.id);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_target(false)
        .init();

    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Show { search: None });
    let month = match (&command, cli.month) {
        (_, Some(month)) => month,
        (Command::Add { date, .. } | Command::Move { date, .. }, None) => MonthRange::containing(*date),
        _ => MonthRange::containing(Utc::now().date_naive()),
    };

    let config = BoardConfig::from_env();
    let backend = HttpBackend::new(config.api_url.clone());
    let holidays = NagerHolidays::new(config.holiday_api_url.clone(), config.holiday_country.clone());
    let session = Session::resolve(&backend, &SessionFile::new(config.session_file.clone()))
        .await
        .context("Failed to resolve calendar session")?;

    let mut controller = BoardController::new(backend, holidays, session, month);
    controller.load().await.context("Failed to load board")?;

    let intent = match command {
        Command::Show { search } => {
            controller.set_search(search.unwrap_or_default());
            print_month(&controller);
            return Ok(());
        }
        Command::Move { task_id, date, index } => {
            let mv = controller.move_of(task_id, date, index)?;
            match controller.on_drag_end(mv).await {
                MoveOutcome::Persisted => print_month(&controller),
                MoveOutcome::Ignored => println!("Nothing to move"),
                MoveOutcome::Recovered => bail!("Move failed; the board was reloaded"),
            }
            return Ok(());
        }
        Command::Add { date, content, tags } => {
            let tag_ids = tag_ids(&controller, &tags)?;
            let mut cell = controller.day_cell(date);
            if cell.drop_disabled() {
                bail!("{} is outside {}", date, month.first.format("%Y-%m"));
            }
            cell.start_adding();
            cell.draft_content = content;
            cell.draft_tag_ids = tag_ids;
            cell.submit()
        }
        Command::Edit { task_id, content, tags } => {
            let tag_ids = tag_ids(&controller, &tags)?;
            let mut card = card(&controller, task_id)?;
            card.start_edit();
            card.draft_content = content;
            card.draft_tag_ids = tag_ids;
            card.save()
        }
        Command::Delete { task_id, yes } => card(&controller, task_id)?.delete(yes),
    };

    let Some(intent) = intent else {
        println!("Nothing to do");
        return Ok(());
    };
    if !controller.dispatch(intent).await {
        bail!("The server rejected the change; see the log for details");
    }
    print_month(&controller);
    Ok(())
}
