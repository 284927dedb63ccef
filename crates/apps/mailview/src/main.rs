//! Mailview - terminal front-end for the mail widget
//!
//! Mounts the widget on a demo host serving a mailbox file (or a built-in
//! sample) and drives it with commands typed on stdin.

use anyhow::{Context, Result};
use log::{error, info, warn};
use mailwidget::{DeleteOutcome, FileHandle, MailWidget, RowTarget, WidgetConfig};
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::{self, UnboundedSender};

mod commands;
mod host;
mod render;

use commands::{Command, HELP};
use host::{DemoHost, Event, Mailbox};

/// Delay before the demo host answers a service call
const HOST_LATENCY: Duration = Duration::from_millis(300);

/// Pixel height reported to the widget
const WIDGET_HEIGHT: u32 = 480;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    // Bootstrap config directory
    if let Err(e) = config::init() {
        error!("Failed to initialize config directory: {}", e);
    }

    let widget_config = match WidgetConfig::load() {
        Ok(config) => config,
        Err(e) => {
            warn!("Using default widget settings: {:#}", e);
            if let Some(path) = config::config_path("widget.json") {
                warn!("Fix or remove {} to use your own settings", path.display());
            }
            WidgetConfig::default()
        }
    };

    let mailbox = match std::env::args_os().nth(1).map(PathBuf::from) {
        Some(path) => Mailbox::load(&path)?,
        None => {
            info!("No mailbox file given; using the built-in sample");
            Mailbox::sample()
        }
    };
    info!("Loaded {} mails", mailbox.mails.len());

    let (events, mut inbox) = mpsc::unbounded_channel();
    spawn_input_reader(events.clone());

    let host = Arc::new(DemoHost::new(mailbox, events, HOST_LATENCY, WIDGET_HEIGHT));
    let mut widget =
        MailWidget::mount(host.clone(), widget_config).context("Failed to mount mail widget")?;

    println!("{}\n", HELP);
    show(&mut widget);

    while let Some(event) = inbox.recv().await {
        let keep_running = handle_event(&mut widget, &host, event);
        show(&mut widget);
        if !keep_running {
            break;
        }
    }

    widget.teardown()?;
    info!("Mailview exiting");
    Ok(())
}

/// Read stdin on its own thread so a pending read never holds up shutdown
fn spawn_input_reader(events: UnboundedSender<Event>) {
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if events.send(Event::Input(line)).is_err() {
                        return;
                    }
                }
                Err(e) => {
                    error!("Failed to read stdin: {}", e);
                    break;
                }
            }
        }
        let _ = events.send(Event::InputClosed);
    });
}

/// Print the frame queued by the last event, if any
fn show(widget: &mut MailWidget) {
    if let Some(frame) = widget.take_frame() {
        println!("\n{}\n", render::render(&frame));
    }
}

/// Returns false when the loop should stop
fn handle_event(widget: &mut MailWidget, host: &DemoHost, event: Event) -> bool {
    match event {
        Event::Input(line) => match line.parse::<Command>() {
            Ok(Command::Quit) => return false,
            Ok(command) => {
                if let Err(e) = run_command(widget, host, command) {
                    println!("error: {:#}", e);
                }
            }
            Err(e) => println!("{:#}", e),
        },
        Event::InputClosed => return false,
        Event::Feed(payload) => {
            if let Err(e) = widget.on_feed_json(payload) {
                error!("{}", e);
            }
        }
        Event::FullBody { id, payload } => {
            widget.on_full_body_json(&id, payload);
        }
        Event::SendResult { session, result } => {
            let accepted = result.is_ok();
            match widget.on_send_result(session, result) {
                Ok(()) if accepted => println!("Message sent."),
                Ok(()) => {}
                Err(e) => println!("{}", e),
            }
        }
        Event::Timer(token) => {
            widget.on_timer(token);
        }
    }
    true
}

fn run_command(widget: &mut MailWidget, host: &DemoHost, command: Command) -> Result<()> {
    match command {
        Command::Search(text) => {
            if text.is_empty() {
                widget.search_input("")?;
            }
            // One call per keystroke, as a text box would report them
            for (i, c) in text.char_indices() {
                widget.search_input(&text[..i + c.len_utf8()])?;
            }
        }
        Command::Filter(filter) => widget.set_filter(filter)?,
        Command::Sort(key) => widget.sort_by(key)?,
        Command::Dir => widget.toggle_sort_dir()?,
        Command::Size(size) => widget.set_page_size(size)?,
        Command::Next => {
            if !widget.next_page()? {
                println!("Already on the last page.");
            }
        }
        Command::Prev => {
            if !widget.prev_page()? {
                println!("Already on the first page.");
            }
        }
        Command::Open(id) => {
            widget.click_row(&id, RowTarget::Row)?;
        }
        Command::Close => widget.close_mail()?,
        Command::Delete { id, confirm } => {
            host.set_next_confirm(confirm);
            if let Some(DeleteOutcome::Declined) = widget.click_row(&id, RowTarget::DeleteButton)? {
                println!("Kept {}.", id);
            }
        }
        Command::Compose => widget.open_compose()?,
        Command::Field(field, value) => widget.set_compose_field(field, value)?,
        Command::Attach(path) => {
            let file = FileHandle::from_path(&path)?;
            let slot = widget.push_attachment(file)?;
            info!("Attached {} in slot {}", path.display(), slot);
        }
        Command::Remove(slot) => widget.remove_attachment(slot)?,
        Command::Send => widget.send()?,
        Command::Cancel => widget.cancel_compose()?,
        Command::Show => println!("\n{}\n", render::render(&widget.frame())),
        Command::Help => println!("{}", HELP),
        Command::Quit => {}
    }
    Ok(())
}
