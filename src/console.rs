//! Console front-end.
//!
//! Peripheral glue around the core: table rendering, the grouped title
//! menu, stdin-backed operator prompts, comment staging and the platform
//! URL opener. All checklist semantics live in `checklist-core`; this
//! module only translates operator commands into tracker and workflow
//! calls.

use std::io::{self, BufRead, Write};
use std::process::Command;

use indexmap::IndexMap;

use checklist_core::{
    build_report, ChecklistStore, CompletionTracker, OperatorPrompt, RowState, SessionEvent,
    SessionState, SubmissionOutcome, SubmissionWorkflow, TrackerError,
};
use checklist_elog::ElogClient;

/// Operator prompt over stdin/stdout. Anything other than an explicit yes
/// declines a confirmation.
struct StdinPrompt;

impl OperatorPrompt for StdinPrompt {
    fn confirm(&mut self, question: &str) -> bool {
        print!("{question} [y/N] ");
        if io::stdout().flush().is_err() {
            return false;
        }
        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(_) => matches!(line.trim().to_ascii_lowercase().as_str(), "y" | "yes"),
            Err(_) => false,
        }
    }

    fn notify(&mut self, notice: &str) {
        println!("{notice}");
    }
}

/// Groups titles by the segment before the first `-`.
///
/// Titles without a prefix fall under `other`. Group order follows the
/// first appearance of each prefix in load order, titles keep load order
/// within their group.
fn group_titles(store: &ChecklistStore) -> IndexMap<String, Vec<String>> {
    let mut groups: IndexMap<String, Vec<String>> = IndexMap::new();
    for title in store.titles() {
        let group = match title.split_once('-') {
            Some((prefix, rest)) if !prefix.is_empty() && !rest.is_empty() => prefix.to_string(),
            _ => "other".to_string(),
        };
        groups.entry(group).or_default().push(title.to_string());
    }
    groups
}

fn render_menu(groups: &IndexMap<String, Vec<String>>) -> String {
    let mut out = String::from("Available checklists:\n");
    for (group, titles) in groups {
        out.push_str(&format!("  {group}\n"));
        for title in titles {
            out.push_str(&format!("    {title}\n"));
        }
    }
    out.push_str("Type 'show <title>' to open one.");
    out
}

fn render_table(title: &str, rows: &[RowState]) -> String {
    let mut out = format!("== {title} ==\n");
    if rows.is_empty() {
        out.push_str("(no rows)\n");
        return out;
    }
    for (index, row) in rows.iter().enumerate() {
        let help = if row.help_url.is_some() { " (?)" } else { "" };
        if row.header_only {
            out.push_str(&format!("{index:>3} --- {}{help}\n", row.text));
        } else {
            let mark = if row.checked { "[x]" } else { "[ ]" };
            out.push_str(&format!("{index:>3} {mark} {}{help}\n", row.text));
            if !row.comment.is_empty() {
                out.push_str(&format!("        comment: {}\n", row.comment));
            }
        }
    }
    out
}

/// Spawns the platform URL opener. The opener runs detached; only the
/// spawn itself is checked.
fn open_help_url(url: &str) -> io::Result<()> {
    let mut command = if cfg!(target_os = "macos") {
        let mut c = Command::new("open");
        c.arg(url);
        c
    } else if cfg!(target_os = "windows") {
        let mut c = Command::new("cmd");
        c.args(["/C", "start", "", url]);
        c
    } else {
        let mut c = Command::new("xdg-open");
        c.arg(url);
        c
    };
    command.spawn().map(|_| ())
}

fn activate(
    tracker: &mut CompletionTracker,
    store: &ChecklistStore,
    title: &str,
    session: &mut SessionState,
) {
    match tracker.activate(store, title) {
        Ok(()) => {
            *session = session.apply(SessionEvent::Activated);
            println!("{}", render_table(title, tracker.rows()));
        }
        Err(TrackerError::ChecklistNotFound(t)) => {
            println!("No checklist titled '{t}'.");
            println!("{}", render_table(&t, tracker.rows()));
        }
        Err(e) => println!("{e}"),
    }
}

fn parse_row(rest: &str) -> Option<usize> {
    match rest.trim().parse() {
        Ok(row) => Some(row),
        Err(_) => {
            println!("expected a row number, got '{}'", rest.trim());
            None
        }
    }
}

const COMMAND_HELP: &str =
    "commands: menu, show <title>, table, check <n>, uncheck <n>, comment <n> <text>, \
     help <n>, submit, close";

/// Interactive session loop.
///
/// Reads one command per line until the session closes or stdin ends. A
/// staged comment edit is committed by the next non-comment command, the
/// same way leaving a table cell commits its editor.
pub fn run(store: &ChecklistStore, mut elog: ElogClient) -> anyhow::Result<()> {
    let mut tracker = CompletionTracker::new();
    let mut session = SessionState::Loaded;

    if store.len() == 1 {
        if let Some(title) = store.titles().next() {
            let title = title.to_string();
            activate(&mut tracker, store, &title, &mut session);
        }
    } else {
        println!("{}", render_menu(&group_titles(store)));
    }

    while !session.is_closed() {
        print!("> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line)? == 0 {
            break;
        }
        let line = line.trim();

        let (command, rest) = match line.split_once(char::is_whitespace) {
            Some((c, r)) => (c, r.trim()),
            None => (line, ""),
        };

        if command != "comment" {
            tracker.commit_pending();
        }

        match command {
            "" => {}
            "menu" | "list" => println!("{}", render_menu(&group_titles(store))),
            "show" => {
                if rest.is_empty() {
                    println!("usage: show <title>");
                } else {
                    activate(&mut tracker, store, rest, &mut session);
                }
            }
            "table" => {
                let title = tracker.active_title().unwrap_or("(none)").to_string();
                println!("{}", render_table(&title, tracker.rows()));
            }
            "check" | "uncheck" => {
                if let Some(row) = parse_row(rest) {
                    if let Err(e) = tracker.set_checked(row, command == "check") {
                        println!("{e}");
                    }
                }
            }
            "comment" => match rest.split_once(char::is_whitespace) {
                Some((row, text)) => {
                    if let Some(row) = parse_row(row) {
                        if let Err(e) = tracker.stage_comment(row, text.trim()) {
                            println!("{e}");
                        }
                    }
                }
                None => println!("usage: comment <n> <text>"),
            },
            "help" => {
                if let Some(row) = parse_row(rest) {
                    match tracker.rows().get(row).and_then(|r| r.help_url.clone()) {
                        Some(url) if !url.is_empty() => {
                            if let Err(e) = open_help_url(&url) {
                                println!("could not open {url}: {e}");
                            }
                        }
                        _ => println!("No help URL for this row."),
                    }
                }
            }
            "submit" => {
                let Some(title) = tracker.active_title().map(str::to_string) else {
                    println!("No active checklist.");
                    continue;
                };
                let Some(checklist) = store.get(&title) else {
                    continue;
                };

                session = session.apply(SessionEvent::SubmissionStarted);
                let mut prompt = StdinPrompt;
                let outcome = SubmissionWorkflow::new(&mut prompt, &mut elog)
                    .submit(&mut tracker, checklist);

                session = match outcome {
                    SubmissionOutcome::Empty | SubmissionOutcome::Cancelled => {
                        session.apply(SessionEvent::SubmissionCancelled)
                    }
                    SubmissionOutcome::Closed { completed, logged } => {
                        println!("Checklist closed (completed: {completed}, logged: {logged}).");
                        session.apply(SessionEvent::SessionClosed)
                    }
                };
            }
            "close" | "quit" | "exit" => {
                session = session.apply(SessionEvent::SessionClosed);
            }
            _ => println!("{COMMAND_HELP}"),
        }
    }

    Ok(())
}

/// Non-interactive rendering: every checklist's table and initial report.
pub fn run_batch(store: &ChecklistStore) {
    let mut tracker = CompletionTracker::new();
    for checklist in store.iter() {
        if tracker.activate(store, &checklist.title).is_ok() {
            println!("{}", render_table(&checklist.title, tracker.rows()));
            let report = build_report(tracker.rows());
            println!("{}", report.text);
            println!("unchecked rows: {}\n", report.unchecked);
        }
    }
}
