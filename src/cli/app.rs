//! CLI module for the kbboard application
//!
//! This module handles the command-line interface for interacting with the
//! board.
use std::{
    fs,
    io::{stdin, stdout, Write},
    path::{Path, PathBuf},
    sync::Arc,
};

use chrono::{Datelike, Months, NaiveDate};
use console::{style, StyledObject};
use log::{debug, info, warn};
use tokio::sync::Mutex;

use crate::{
    column_counts, export_csv, export_json, load_history, parse_import, parse_tags,
    save_history, AddNoteOptions, Board, BoardError, ChangeSummary, Column, Commands, Config,
    EditNoteOptions, Filter, JsonFileStore, ListNotesOptions, Note, NoteColor, NoteDraft,
    NoteUpdate, Query, Recurrence, ReminderScheduler, Result,
};

const SHORT_ID_LEN: usize = 8;

/// CLI Application handler - processes CLI commands against the board
pub struct App {
    /// The board, shared with the reminder scheduler
    board: Arc<Mutex<Board>>,

    /// Application configuration
    config: Config,

    /// Where `config --set` and `config --reset` write to
    config_path: PathBuf,

    /// Whether to display verbose output
    verbose: bool,
}

impl App {
    /// Opens the board described by `config`, restoring saved history when
    /// it still matches the stored notes
    pub fn new(config: Config, config_path: PathBuf, verbose: bool) -> Result<Self> {
        let store = JsonFileStore::new(config.notes_file());
        let mut board = Board::open(Box::new(store), &config)?;

        if config.persist_history {
            match load_history(&config.history_file()) {
                Ok(history) => {
                    if board.restore_history(history, config.max_history) {
                        debug!("Restored history from {}", config.history_file().display());
                    }
                }
                Err(BoardError::NotFound { .. }) => debug!("No saved history"),
                Err(e) => warn!("Ignoring unreadable history: {}", e),
            }
        }

        Ok(Self {
            board: Arc::new(Mutex::new(board)),
            config,
            config_path,
            verbose,
        })
    }

    /// Run the CLI application with the given command
    pub async fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Add(options) => self.handle_add(options).await?,
            Commands::Edit(options) => self.handle_edit(options).await?,
            Commands::Delete { id } => self.handle_delete(id).await?,
            Commands::Toggle { id } => self.handle_toggle(id).await?,
            Commands::Move { id, column } => self.handle_move(id, column).await?,
            Commands::BulkDelete { ids } => self.handle_bulk_delete(ids).await?,
            Commands::BulkMove { column, ids } => self.handle_bulk_move(column, ids).await?,
            Commands::BulkColor { color, ids } => self.handle_bulk_color(color, ids).await?,
            Commands::List(options) => self.list_notes(options).await?,
            Commands::Tags { json } => self.handle_tags(json).await?,
            Commands::Stats { json } => self.handle_stats(json).await?,
            Commands::Calendar { month } => self.handle_calendar(month).await?,
            Commands::Undo => self.handle_undo().await?,
            Commands::Redo => self.handle_redo().await?,
            Commands::History => self.handle_history().await?,
            Commands::Export { output, format } => self.handle_export(output, &format).await?,
            Commands::Import { source } => self.handle_import(&source).await?,
            Commands::Clear { force } => self.handle_clear(force).await?,
            Commands::Remind => self.handle_remind().await?,
            Commands::Config { show, set, reset } => run_config_command(
                &self.config_path,
                Some(self.config.data_dir.clone()),
                show,
                set,
                reset,
            )?,
        }

        Ok(())
    }

    async fn handle_add(&self, options: AddNoteOptions) -> Result<()> {
        let mut board = self.board.lock().await;

        let date = match (options.date, options.no_date) {
            (Some(date), _) => Some(date),
            (None, true) => None,
            (None, false) => Some(board.today()),
        };
        let draft = NoteDraft {
            title: options.title,
            description: options.description.unwrap_or_default(),
            date,
            time: options.time,
            color: options.color,
            column: options.column,
            priority: options.priority,
            tags: parse_tags(options.tags),
            recurrence: options.recurrence,
        };

        let summary = board.add(draft)?;
        self.save_history(&board);

        if let Some(note) = summary.note_ids.first().and_then(|id| board.get(id)) {
            println!("Note created with ID: {}", short_id(&note.id));
            self.print_note(note);
        }
        Ok(())
    }

    async fn handle_edit(&self, options: EditNoteOptions) -> Result<()> {
        let mut board = self.board.lock().await;
        let id = board.resolve_id(&options.id)?;

        let update = NoteUpdate {
            title: options.title,
            description: options.description,
            date: if options.clear_date {
                Some(None)
            } else {
                options.date.map(Some)
            },
            time: if options.clear_time {
                Some(None)
            } else {
                options.time.map(Some)
            },
            color: options.color,
            column: options.column,
            priority: options.priority,
            tags: options.tags.map(|t| parse_tags(Some(t))),
            recurrence: options.recurrence,
        };

        let summary = board.edit(&id, update)?;
        self.save_history(&board);
        self.report(&summary);
        Ok(())
    }

    async fn handle_delete(&self, id: String) -> Result<()> {
        let mut board = self.board.lock().await;
        let id = board.resolve_id(&id)?;
        let summary = board.delete(&id)?;
        self.save_history(&board);
        self.report(&summary);
        Ok(())
    }

    async fn handle_toggle(&self, id: String) -> Result<()> {
        let mut board = self.board.lock().await;
        let id = board.resolve_id(&id)?;
        let summary = board.toggle_complete(&id)?;
        self.save_history(&board);
        self.report(&summary);
        Ok(())
    }

    async fn handle_move(&self, id: String, column: Column) -> Result<()> {
        let mut board = self.board.lock().await;
        let id = board.resolve_id(&id)?;
        match board.move_note(&id, column)? {
            Some(summary) => {
                self.save_history(&board);
                self.report(&summary);
            }
            None => println!("Note is already in {}", column.display_name()),
        }
        Ok(())
    }

    async fn handle_bulk_delete(&self, ids: Vec<String>) -> Result<()> {
        let mut board = self.board.lock().await;
        let ids = resolve_all(&board, &ids)?;
        let summary = board.bulk_delete(&ids)?;
        self.save_history(&board);
        self.report(&summary);
        Ok(())
    }

    async fn handle_bulk_move(&self, column: Column, ids: Vec<String>) -> Result<()> {
        let mut board = self.board.lock().await;
        let ids = resolve_all(&board, &ids)?;
        let summary = board.bulk_move(&ids, column)?;
        self.save_history(&board);
        self.report(&summary);
        Ok(())
    }

    async fn handle_bulk_color(&self, color: NoteColor, ids: Vec<String>) -> Result<()> {
        let mut board = self.board.lock().await;
        let ids = resolve_all(&board, &ids)?;
        let summary = board.bulk_color(&ids, color)?;
        self.save_history(&board);
        self.report(&summary);
        Ok(())
    }

    async fn handle_undo(&self) -> Result<()> {
        let mut board = self.board.lock().await;
        let description = board.undo()?;
        self.save_history(&board);
        println!("Undone: {}", description);
        Ok(())
    }

    async fn handle_redo(&self) -> Result<()> {
        let mut board = self.board.lock().await;
        let description = board.redo()?;
        self.save_history(&board);
        println!("Redone: {}", description);
        Ok(())
    }

    async fn handle_import(&self, source: &Path) -> Result<()> {
        if !source.exists() {
            return Err(BoardError::NotFound {
                path: source.to_path_buf(),
            });
        }
        let payload = fs::read_to_string(source)?;
        let notes = parse_import(&payload)?;

        let mut board = self.board.lock().await;
        let summary = board.import_notes(notes)?;
        self.save_history(&board);
        println!("{} from {}", summary.description, source.display());
        Ok(())
    }

    async fn handle_clear(&self, force: bool) -> Result<()> {
        let mut board = self.board.lock().await;

        if !force {
            println!("You are about to delete all {} notes.", board.notes().len());
            print!("Are you sure? This can be undone with `kbboard undo`. [y/N]: ");
            stdout().flush()?;

            let mut input = String::new();
            stdin().read_line(&mut input)?;

            let input = input.trim().to_lowercase();
            if input != "y" && input != "yes" {
                println!("Clear cancelled.");
                return Ok(());
            }
        }

        let summary = board.clear_all()?;
        self.save_history(&board);
        self.report(&summary);
        Ok(())
    }

    /// Saves history next to the notes. A failure here only costs undo
    /// across runs, so it is logged rather than returned.
    fn save_history(&self, board: &Board) {
        if !self.config.persist_history {
            return;
        }
        if let Err(e) = save_history(&self.config.history_file(), board.history()) {
            warn!("Failed to save history: {}", e);
        }
    }

    fn report(&self, summary: &ChangeSummary) {
        println!("{}", summary.description);
        for note in &summary.spawned {
            println!(
                "Next occurrence scheduled: {} ({})",
                note.title,
                format_due(note)
            );
        }
    }

    async fn list_notes(&self, options: ListNotesOptions) -> Result<()> {
        let filter = match (options.tag, options.date, options.filter) {
            (Some(tag), _, _) => Filter::Tag(tag.trim().to_lowercase()),
            (None, Some(date), _) => Filter::Date(date),
            (None, None, Some(filter)) => filter.parse()?,
            (None, None, None) => self.config.default_filter.clone(),
        };
        let sort = match options.sort {
            Some(sort) => sort.parse()?,
            None => self.config.default_sort,
        };

        let mut board = self.board.lock().await;
        board.set_query(Query::new(filter, sort).with_search(options.search.unwrap_or_default()));
        let visible = board.visible();

        if options.json {
            println!("{}", serde_json::to_string_pretty(&visible)?);
            return Ok(());
        }

        self.display_board(&visible, board.query());
        Ok(())
    }

    /// Display the visible notes grouped by column
    fn display_board(&self, notes: &[Note], query: &Query) {
        let term_width = terminal_size::terminal_size()
            .map(|(w, _)| w.0 as usize)
            .unwrap_or(80);

        let label = match query.filter {
            Filter::All => "All".to_string(),
            ref filter => filter.label(),
        };
        let mut heading = format!("Filter: {} | Sort: {}", label, query.sort);
        if !query.search.trim().is_empty() {
            heading.push_str(&format!(" | Search: \"{}\"", query.search.trim()));
        }
        println!("{}", style(heading).dim());

        let counts = column_counts(notes);
        for column in Column::ALL {
            println!("{}", "-".repeat(term_width.min(60)));
            println!(
                "{} ({})",
                style(column.display_name()).bold(),
                counts.get(column)
            );

            let mut any = false;
            for note in notes.iter().filter(|n| n.column == column) {
                any = true;
                self.print_note(note);
            }
            if !any {
                println!("  {}", style("No notes").dim());
            }
        }

        println!(
            "\nFound {} note{}",
            notes.len(),
            if notes.len() == 1 { "" } else { "s" }
        );
    }

    fn print_note(&self, note: &Note) {
        let id = if self.verbose {
            note.id.clone()
        } else {
            short_id(&note.id)
        };
        let marker = if note.completed { "✓" } else { "■" };
        let mut title = paint(note.color, format!("{} {}", marker, note.title));
        if note.completed {
            title = title.dim();
        }

        let mut line = format!("  [{}] {}", id, title);
        line.push_str(&format!("  {}", style(format!("({})", note.priority)).dim()));
        let due = format_due(note);
        if !due.is_empty() {
            line.push_str(&format!("  {}", due));
        }
        if !note.tags.is_empty() {
            let tags = note
                .tags
                .iter()
                .map(|tag| format!("#{}", tag))
                .collect::<Vec<_>>()
                .join(" ");
            line.push_str(&format!("  {}", style(tags).cyan()));
        }
        if note.recurrence != Recurrence::None {
            line.push_str(&format!("  ↻ {}", note.recurrence));
        }
        println!("{}", line);

        if self.verbose && !note.description.is_empty() {
            println!("      {}", note.description);
        }
    }

    async fn handle_tags(&self, json: bool) -> Result<()> {
        let tags = self.board.lock().await.tags();
        if json {
            println!("{}", serde_json::to_string_pretty(&tags)?);
        } else if tags.is_empty() {
            println!("No tags in use.");
        } else {
            for tag in tags {
                println!("#{}", tag);
            }
        }
        Ok(())
    }

    async fn handle_stats(&self, json: bool) -> Result<()> {
        let board = self.board.lock().await;
        let counts = column_counts(board.notes());
        let smart = board.smart_filter_counts();

        if json {
            let stats = serde_json::json!({
                "total": counts.total(),
                "columns": counts,
                "smart_filters": smart,
                "can_undo": board.history().can_undo(),
                "can_redo": board.history().can_redo(),
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
            return Ok(());
        }

        println!("{}", style("Columns").bold());
        for column in Column::ALL {
            println!("  {:<12} {}", column.display_name(), counts.get(column));
        }
        println!("  {:<12} {}", "Total", counts.total());
        println!("{}", style("Smart filters").bold());
        println!("  {:<12} {}", "Overdue", style(smart.overdue).red());
        println!("  {:<12} {}", "High priority", smart.high_priority);
        println!("  {:<12} {}", "This week", smart.this_week);
        Ok(())
    }

    async fn handle_calendar(&self, month: Option<String>) -> Result<()> {
        let board = self.board.lock().await;
        let first = match month {
            Some(month) => NaiveDate::parse_from_str(&format!("{}-01", month.trim()), "%Y-%m-%d")
                .map_err(|_| {
                    BoardError::validation(format!("Invalid month '{}', expected YYYY-MM", month))
                })?,
            None => board.today().with_day(1).unwrap_or_else(|| board.today()),
        };
        let days_in_month = first
            .checked_add_months(Months::new(1))
            .and_then(|next| next.pred_opt())
            .map(|last| last.day())
            .unwrap_or(31);

        let marked = board.calendar(first.year(), first.month());
        let today = board.today();

        println!("{}", style(first.format("%B %Y").to_string()).bold());
        println!(" Su  Mo  Tu  We  Th  Fr  Sa");

        let offset = first.weekday().num_days_from_sunday() as usize;
        let mut row = "    ".repeat(offset);
        for day in 1..=days_in_month {
            let cell = format!("{:>3}{}", day, if marked.contains_key(&day) { "*" } else { " " });
            let is_today = first.with_day(day) == Some(today);
            let cell = match (is_today, marked.contains_key(&day)) {
                (true, _) => style(cell).reverse().to_string(),
                (false, true) => style(cell).yellow().bold().to_string(),
                (false, false) => cell,
            };
            row.push_str(&cell);

            if (offset + day as usize) % 7 == 0 {
                println!("{}", row.trim_end());
                row.clear();
            }
        }
        if !row.is_empty() {
            println!("{}", row.trim_end());
        }

        if !marked.is_empty() {
            println!();
            for (day, count) in &marked {
                println!(
                    "  {:>2}: {} note{}",
                    day,
                    count,
                    if *count == 1 { "" } else { "s" }
                );
            }
        }
        Ok(())
    }

    async fn handle_history(&self) -> Result<()> {
        let board = self.board.lock().await;
        let history = board.history();
        let cursor = history.cursor();

        for (index, entry) in history.entries().iter().enumerate() {
            let marker = if Some(index) == cursor { ">" } else { " " };
            let line = format!(
                "{} {:>3}  {:<12} {}",
                marker, index, entry.action, entry.description
            );
            match cursor {
                Some(c) if index > c => println!("{}", style(line).dim()),
                _ => println!("{}", line),
            }
        }
        println!(
            "\nUndo: {} | Redo: {}",
            if history.can_undo() { "available" } else { "none" },
            if history.can_redo() { "available" } else { "none" }
        );
        Ok(())
    }

    async fn handle_export(&self, output: Option<PathBuf>, format: &str) -> Result<()> {
        let board = self.board.lock().await;
        let content = match format {
            "csv" => export_csv(board.notes())?,
            _ => export_json(board.notes())?,
        };

        match output {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    fs::create_dir_all(parent).map_err(|_| BoardError::DirectoryError {
                        path: parent.to_path_buf(),
                    })?;
                }
                fs::write(&path, content)?;
                info!("Exported {} notes to {}", board.notes().len(), path.display());
                println!(
                    "Exported {} notes to {}",
                    board.notes().len(),
                    path.display()
                );
            }
            None => print!("{}", content),
        }
        Ok(())
    }

    async fn handle_remind(&self) -> Result<()> {
        let mut scheduler = ReminderScheduler::new(self.config.clone());
        scheduler.set_board(&self.board);
        let mut reminders = scheduler.start()?;

        println!(
            "Watching for due notes every {}s. Press Ctrl-C to stop.",
            self.config.reminder_interval_secs
        );

        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                reminder = reminders.recv() => match reminder {
                    Some(reminder) => println!(
                        "{} {} is due at {}",
                        style("Reminder:").yellow().bold(),
                        style(&reminder.title).bold(),
                        reminder.due.format("%H:%M")
                    ),
                    None => break,
                },
                _ = &mut ctrl_c => {
                    info!("Interrupted, stopping reminders");
                    break;
                }
            }
        }

        drop(reminders);
        scheduler.stop().await
    }
}

/// Runs `config --show/--set/--reset` without opening the board.
///
/// `--reset` never reads the file and `--set` skips validation on load, so
/// both can repair a configuration that `Config::load` rejects.
pub fn run_config_command(
    config_path: &Path,
    data_dir: Option<PathBuf>,
    show: bool,
    set: Option<String>,
    reset: bool,
) -> Result<()> {
    if reset {
        Config::default().save(config_path)?;
        println!("Configuration reset to defaults");
        return Ok(());
    }

    if let Some(assignment) = set {
        // Start from the file, not the effective config with CLI overrides
        let mut config = Config::load_unvalidated(config_path)?;
        config.set(&assignment)?;
        config.save(config_path)?;
        println!("Updated {}", assignment.trim());
        return Ok(());
    }

    let mut config = Config::load(config_path)?;
    if let Some(data_dir) = data_dir {
        config.data_dir = data_dir;
    }
    if show {
        println!("Config file: {}", config_path.display());
    }
    println!("{}", serde_json::to_string_pretty(&config)?);
    Ok(())
}

fn resolve_all(board: &Board, ids: &[String]) -> Result<Vec<String>> {
    ids.iter().map(|id| board.resolve_id(id)).collect()
}

fn short_id(id: &str) -> String {
    id.chars().take(SHORT_ID_LEN).collect()
}

fn format_due(note: &Note) -> String {
    match (note.date, note.time) {
        (Some(date), Some(time)) => format!("{} {}", date.format("%Y-%m-%d"), time.format("%H:%M")),
        (Some(date), None) => date.format("%Y-%m-%d").to_string(),
        (None, Some(time)) => time.format("%H:%M").to_string(),
        (None, None) => String::new(),
    }
}

fn paint(color: NoteColor, text: String) -> StyledObject<String> {
    let styled = style(text);
    match color {
        NoteColor::Yellow => styled.yellow(),
        NoteColor::Pink => styled.magenta(),
        NoteColor::Mint => styled.green(),
        NoteColor::Lavender => styled.blue(),
        NoteColor::Coral => styled.red(),
    }
}
