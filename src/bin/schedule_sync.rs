use std::{error::Error, fs::File, io::BufReader, sync::Arc};

use clap::Parser;
use figment::{
    providers::{Env, Format, Json},
    Figment,
};
use log::{error, info, warn};
use serde::Serialize;

use schedule_sync::{
    api::{ApiClient, ScheduleApi},
    calendar::{
        formatter::format_event, CalendarSyncController, CalendarWidget, EditOutcome,
        EditorRequest, EventEditor, RangeOutcome, SyncError,
    },
    models::{
        display_model::CalendarDisplayEvent, event_model::EventDraft, Args, Command,
        ConflictQuery, Config, DateRange, FilterState, Id,
    },
    notify::LogNotifier,
    session::{FileTokenStore, LogNavigator, Session},
};

/// Prints whatever the calendar would render.
struct StdoutWidget;

impl CalendarWidget for StdoutWidget {
    fn render_events(&self, range: &DateRange, events: &[CalendarDisplayEvent]) {
        info!("{} event(s) in {}", events.len(), range);
        if let Err(e) = print_json(&events) {
            error!("Could not print events: {}", e);
        }
    }

    fn render_error(&self, range: &DateRange, error: &SyncError) {
        error!("Could not show {}: {}", range, error);
    }

    fn revert(&self, event_id: Id) {
        warn!("Event {} keeps its previous slot", event_id);
    }
}

struct StdoutEditor;

impl EventEditor for StdoutEditor {
    fn open(&self, request: EditorRequest) {
        println!("{:?}", request);
    }
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<(), Box<dyn Error>> {
    serde_json::to_writer_pretty(std::io::stdout().lock(), value)?;
    println!();
    Ok(())
}

async fn fetch_display_event(
    client: &ApiClient,
    id: Id,
) -> Result<CalendarDisplayEvent, Box<dyn Error>> {
    let record = client.get_event(id).await?;
    Ok(format_event(&record)?)
}

fn edit_result(outcome: EditOutcome) -> Result<(), Box<dyn Error>> {
    match outcome {
        EditOutcome::Committed(record) => print_json(&record),
        EditOutcome::Reverted(e) => Err(e.into()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    /* Setup logging */
    env_logger::builder()
        .target(env_logger::Target::Stdout)
        .filter_level(log::LevelFilter::Info)
        .init();

    /* Get all the required resources */
    let args = Args::parse();
    let config: Config = Figment::new()
        .merge(Json::file(&args.config_json_path))
        .merge(Env::prefixed("SCHEDULE_"))
        .extract()?;
    info!(
        "Read config from {}",
        std::path::absolute(&args.config_json_path)?.display()
    );

    let mut session = Session::new(Arc::new(LogNotifier))
        .with_csrf_token(config.csrf_token.clone())
        .with_login_url(config.login_url.clone())
        .with_navigator(Box::new(LogNavigator));
    if let Some(token_path) = &config.token_path {
        session = session.with_store(Box::new(FileTokenStore::new(token_path)));
    }
    let session = Arc::new(session);
    let client = ApiClient::new(&config, session.clone())?;
    let controller =
        CalendarSyncController::new(client.clone(), StdoutWidget, StdoutEditor, session.clone());

    match args.command {
        Command::Login { username, password } => {
            client.authenticate(&username, &password).await?;
        }
        Command::Events {
            start,
            end,
            plan,
            groups,
            teachers,
            subjects,
            rooms,
        } => {
            session.set_filters(FilterState {
                groups: groups.into_iter().collect(),
                teachers: teachers.into_iter().collect(),
                subjects: subjects.into_iter().collect(),
                rooms: rooms.into_iter().collect(),
            });
            let controller = controller.with_plan(plan);
            if let RangeOutcome::Failed(e) =
                controller.request_range(DateRange::new(start, end)).await
            {
                return Err(e.into());
            }
        }
        Command::Move { id, start } => {
            let event = fetch_display_event(&client, id).await?;
            edit_result(controller.move_event(&event, start).await)?;
        }
        Command::Resize { id, start, end } => {
            let event = fetch_display_event(&client, id).await?;
            edit_result(controller.resize_event(&event, start, end).await)?;
        }
        Command::Create { draft_json_path } => {
            info!("Reading draft from {}", draft_json_path.display());
            let draft: EventDraft =
                serde_json::from_reader(BufReader::new(File::open(&draft_json_path)?))?;
            print_json(&controller.create_event(&draft).await?)?;
        }
        Command::Delete { id } => {
            controller.delete_event(id).await?;
        }
        Command::List { resource } => {
            let items: Vec<serde_json::Value> = client.list(resource, &[]).await?;
            print_json(&items)?;
        }
        Command::FilterOptions => {
            print_json(&client.filter_options().await?)?;
        }
        Command::Conflicts {
            plan,
            resolved,
            conflict_type,
        } => {
            let query = ConflictQuery {
                plan,
                resolved,
                conflict_type,
            };
            print_json(&client.list_conflicts(&query).await?)?;
        }
        Command::CheckConflicts { plan: Some(plan) } => {
            print_json(&controller.check_conflicts(plan).await?)?;
        }
        Command::CheckConflicts { plan: None } => {
            print_json(&controller.check_active_plan_conflicts().await?)?;
        }
        Command::ResolveConflicts { plan } => {
            print_json(&controller.resolve_conflicts(plan).await?)?;
        }
    }

    Ok(())
}
