//! Student Roster CLI

use anyhow::Context;
use clap::{Parser, Subcommand};
use record_validator::MarkDraft;
use roster_client::api_client::DEFAULT_BASE_URL;
use roster_client::view::{FormField, NotificationKind, StudentForm};
use roster_client::{ApiClient, StudentApi, StudentManagementView};
use serde_json::Value;
use std::io::{self, BufRead, Write};
use std::process::ExitCode;
use std::sync::Arc;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

/// Manage the student roster from the command line
#[derive(Parser, Debug)]
#[command(name = "roster")]
#[command(version, about, long_about = None)]
struct Cli {
    /// API base URL
    #[arg(long, default_value = DEFAULT_BASE_URL)]
    base_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List students, newest first
    List {
        #[arg(long, default_value_t = 1)]
        page: u64,

        /// Case-insensitive name filter
        #[arg(long)]
        search: Option<String>,
    },

    /// Show a student and their marks
    Show { id: String },

    /// Add a student
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        age: String,
        #[arg(long)]
        parents_email: String,
    },

    /// Edit a student; omitted fields keep their values
    Edit {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        age: Option<String>,
        #[arg(long)]
        parents_email: Option<String>,
    },

    /// Delete a student and their marks
    Delete {
        id: String,

        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },

    /// Record marks for a subject
    AddMark {
        id: String,
        #[arg(long)]
        subject: String,
        #[arg(long)]
        marks: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::WARN)
        .with_writer(io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();
    let api = Arc::new(ApiClient::new(&cli.base_url).context("building HTTP client")?);
    let mut view = StudentManagementView::new(api.clone());

    match cli.command {
        Command::List { page, search } => {
            if let Some(search) = search {
                view.on_search_input(search, std::time::Instant::now());
                view.on_search_submit();
            }
            view.set_page(page);
            view.load().await;
            print!("{}", view.render());
        }

        Command::Show { id } => match api.get_student(&id).await {
            Ok(detail) => {
                let s = &detail.student;
                println!("{} <{}>", s.name, s.email);
                println!("  id:            {}", s.id);
                println!("  age:           {}", s.age);
                println!("  parent email:  {}", s.parents_email);
                if detail.marks.is_empty() {
                    println!("  no marks recorded");
                }
                for mark in &detail.marks {
                    println!("  {:<16} {}", mark.subject, mark.marks);
                }
            }
            Err(e) => {
                eprintln!("{}", e.server_message().unwrap_or("Failed to load student."));
                return Ok(ExitCode::FAILURE);
            }
        },

        Command::Add {
            name,
            email,
            age,
            parents_email,
        } => {
            view.open_create();
            if let Some(form) = view.form_mut() {
                form.set(FormField::Name, name);
                form.set(FormField::Email, email);
                form.set(FormField::Age, age);
                form.set(FormField::ParentsEmail, parents_email);
            }
            if !view.submit_form().await && report_form_errors(view.form()) {
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::Edit {
            id,
            name,
            email,
            age,
            parents_email,
        } => {
            let detail = match api.get_student(&id).await {
                Ok(detail) => detail,
                Err(e) => {
                    eprintln!("{}", e.server_message().unwrap_or("Failed to load student."));
                    return Ok(ExitCode::FAILURE);
                }
            };
            view.open_edit(&detail.student);
            if let Some(form) = view.form_mut() {
                let changes = [
                    (FormField::Name, name),
                    (FormField::Email, email),
                    (FormField::Age, age),
                    (FormField::ParentsEmail, parents_email),
                ];
                for (field, value) in changes {
                    if let Some(value) = value {
                        form.set(field, value);
                    }
                }
            }
            if !view.submit_form().await && report_form_errors(view.form()) {
                return Ok(ExitCode::FAILURE);
            }
        }

        Command::Delete { id, yes } => {
            let detail = match api.get_student(&id).await {
                Ok(detail) => detail,
                Err(e) => {
                    eprintln!("{}", e.server_message().unwrap_or("Failed to load student."));
                    return Ok(ExitCode::FAILURE);
                }
            };
            view.request_delete(&detail.student);

            let confirmed = match view.pending_confirmation() {
                Some(_) if yes => true,
                Some(prompt) => ask(&prompt.title, &prompt.message)?,
                None => false,
            };
            if confirmed {
                view.confirm_delete().await;
            } else {
                view.cancel_delete();
                println!("Cancelled.");
            }
        }

        Command::AddMark { id, subject, marks } => {
            let marks = serde_json::from_str::<Value>(&marks).unwrap_or(Value::String(marks));
            let draft = MarkDraft {
                subject: Some(subject),
                marks: Some(marks),
            };
            match api.add_mark(&id, &draft).await {
                Ok(envelope) => println!("{}", envelope.message),
                Err(e) => {
                    eprintln!("{}", e.server_message().unwrap_or("Failed to add marks."));
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }

    let mut failed = false;
    for notification in view.take_notifications() {
        match notification.kind {
            NotificationKind::Success => println!("{}", notification.message),
            NotificationKind::Error => {
                failed = true;
                eprintln!("{}", notification.message);
            }
        }
    }

    Ok(if failed {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    })
}

/// Print per-field form errors; true when there were any
fn report_form_errors(form: Option<&StudentForm>) -> bool {
    let Some(form) = form else {
        return false;
    };
    let fields = [
        ("name", FormField::Name),
        ("email", FormField::Email),
        ("age", FormField::Age),
        ("parents-email", FormField::ParentsEmail),
    ];

    let mut any = false;
    for (label, field) in fields {
        if let Some(message) = form.errors().get(field) {
            eprintln!("--{label}: {message}");
            any = true;
        }
    }
    any
}

fn ask(title: &str, message: &str) -> anyhow::Result<bool> {
    let mut stdout = io::stdout();
    writeln!(stdout, "{title}")?;
    write!(stdout, "{message} [y/N] ")?;
    stdout.flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}
