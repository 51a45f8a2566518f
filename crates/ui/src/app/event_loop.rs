use super::{App, TurnUpdate, greeting_due, next_turn_update};
use crate::event_handler::EventHandler;

use crossterm::event::Event;
use lumen_voice::VoiceEvent;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::Result;
use std::{panic, time::Duration};
use tokio::time::{Interval, MissedTickBehavior};

/// Cadence of terminal polls; the poll itself never blocks
const INPUT_POLL: Duration = Duration::from_millis(25);

/// Redraw cadence for the typing indicator
const TICK_RATE: Duration = Duration::from_millis(120);

#[derive(Debug)]
enum LoopEvent {
    Terminal(Option<Event>),
    Turn(TurnUpdate),
    Voice(VoiceEvent),
    Greeting,
    Tick,
}

/// Run the TUI until the user quits
pub async fn run(app: &mut App) -> Result<()> {
    crossterm::terminal::enable_raw_mode()?;
    crossterm::execute!(
        std::io::stdout(),
        crossterm::terminal::EnterAlternateScreen,
        crossterm::event::EnableBracketedPaste
    )?;

    let backend = CrosstermBackend::new(std::io::stdout());
    let mut terminal = Terminal::new(backend)?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |panic_info| {
        restore_terminal();
        original_hook(panic_info);
    }));

    let result = event_loop(app, &mut terminal).await;

    app.shutdown();
    let _ = terminal.show_cursor();
    restore_terminal();

    result
}

/// Timers driving the loop. They keep their schedule across iterations, so
/// a busy reply stream cannot hold off terminal polling.
struct LoopTimers {
    input: Interval,
    render: Interval,
}

impl LoopTimers {
    fn new() -> Self {
        let mut input = tokio::time::interval(INPUT_POLL);
        input.set_missed_tick_behavior(MissedTickBehavior::Skip);
        let mut render = tokio::time::interval(TICK_RATE);
        render.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self { input, render }
    }
}

/// Wait for whichever source is ready first
async fn next_event(app: &mut App, timers: &mut LoopTimers, read_terminal: impl Fn() -> Option<Event>) -> LoopEvent {
    let turn = &mut app.turn;
    let voice = &mut app.voice;
    let greeting_at = app.greeting_at;

    tokio::select! {
        _ = timers.input.tick() => LoopEvent::Terminal(read_terminal()),
        update = next_turn_update(turn) => LoopEvent::Turn(update),
        voice_event = voice.recv() => LoopEvent::Voice(voice_event),
        _ = greeting_due(greeting_at) => LoopEvent::Greeting,
        _ = timers.render.tick() => LoopEvent::Tick,
    }
}

/// Apply one event; returns whether the screen needs a redraw
fn dispatch(app: &mut App, event: LoopEvent) -> bool {
    match event {
        LoopEvent::Terminal(Some(event)) => {
            app.handle_event(&event);
            true
        }
        LoopEvent::Terminal(None) => false,
        LoopEvent::Turn(update) => {
            app.apply_turn_update(update);
            true
        }
        LoopEvent::Voice(voice_event) => {
            app.handle_voice_event(voice_event);
            true
        }
        LoopEvent::Greeting => {
            app.fire_greeting();
            true
        }
        LoopEvent::Tick => {
            app.tick();
            app.is_animating()
        }
    }
}

async fn event_loop(app: &mut App, terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>) -> Result<()> {
    terminal.clear()?;
    terminal.draw(|frame| app.render(frame))?;

    let mut timers = LoopTimers::new();

    while !app.should_quit() {
        let event = next_event(app, &mut timers, || EventHandler::read(Duration::ZERO)).await;
        if dispatch(app, event) {
            terminal.draw(|frame| app.render(frame))?;
        }
    }

    Ok(())
}

fn restore_terminal() {
    let _ = crossterm::terminal::disable_raw_mode();
    let _ = crossterm::execute!(
        std::io::stdout(),
        crossterm::event::DisableBracketedPaste,
        crossterm::terminal::LeaveAlternateScreen
    );
}
