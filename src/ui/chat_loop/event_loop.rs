//! Event polling, dispatching, and UI rendering loop.
//!
//! Terminal input is read on a background task and forwarded over a channel;
//! the loop drains it alongside the stream channel and redraws at most once
//! per frame.

use std::{
    error::Error,
    time::{Duration, Instant},
};

use ratatui::crossterm::event::{self, Event, KeyEventKind};
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::core::chat_stream::CompletionGateway;
use crate::core::config::Settings;
use crate::ui::renderer::ui;
use crate::ui::state::ChatUi;

use super::lifecycle::{restore_terminal, setup_terminal, ChatTerminal};
use super::stream::{StreamDispatcher, StreamReceiver};

#[derive(Debug)]
pub enum UiEvent {
    Crossterm(Event),
}

fn spawn_event_reader(event_tx: mpsc::UnboundedSender<UiEvent>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if let Ok(true) = event::poll(Duration::from_millis(10)) {
                match event::read() {
                    Ok(ev) => {
                        if event_tx.send(UiEvent::Crossterm(ev)).is_err() {
                            break;
                        }
                    }
                    Err(_) => continue,
                }
            } else {
                tokio::task::yield_now().await;
            }
        }
    })
}

/// Applies queued terminal events. Returns true when anything was handled.
fn process_ui_events(
    chat: &mut ChatUi,
    event_rx: &mut mpsc::UnboundedReceiver<UiEvent>,
    gateway: &CompletionGateway,
    dispatcher: &StreamDispatcher,
    term_height: u16,
) -> bool {
    let mut handled = false;
    while let Ok(ev) = event_rx.try_recv() {
        handled = true;
        match ev {
            UiEvent::Crossterm(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                if let Some(submission) = chat.handle_key(key, term_height / 2) {
                    debug!(stream_id = submission.stream_id, "dispatching completion");
                    dispatcher.spawn(gateway.clone(), submission);
                }
            }
            UiEvent::Crossterm(Event::Paste(text)) => chat.paste(&text),
            UiEvent::Crossterm(_) => {}
        }
        if chat.should_quit {
            break;
        }
    }
    handled
}

fn process_stream_updates(chat: &mut ChatUi, rx: &mut StreamReceiver) -> bool {
    let mut received_any = false;
    while let Ok((message, stream_id)) = rx.try_recv() {
        chat.on_stream_message(message, stream_id);
        received_any = true;
    }
    received_any
}

async fn drive(
    terminal: &mut ChatTerminal,
    chat: &mut ChatUi,
    gateway: &CompletionGateway,
) -> Result<(), Box<dyn Error>> {
    let (dispatcher, mut rx) = StreamDispatcher::new();
    let (event_tx, mut event_rx) = mpsc::unbounded_channel::<UiEvent>();
    let event_reader_handle = spawn_event_reader(event_tx);

    const MAX_FPS: u64 = 60;
    let frame_duration = Duration::from_millis(1000 / MAX_FPS);
    let mut last_draw = Instant::now() - frame_duration;
    let mut request_redraw = true;

    let result = loop {
        if chat.should_quit {
            break Ok(());
        }

        if request_redraw && last_draw.elapsed() >= frame_duration {
            if let Err(err) = terminal.draw(|f| ui(f, chat)) {
                break Err(err.into());
            }
            last_draw = Instant::now();
            request_redraw = false;
        }

        let term_height = terminal.size().map(|size| size.height).unwrap_or(24);
        let events_processed =
            process_ui_events(chat, &mut event_rx, gateway, &dispatcher, term_height);
        let received_any = process_stream_updates(chat, &mut rx);

        if events_processed || received_any {
            request_redraw = true;
        } else if !request_redraw {
            tokio::time::sleep(Duration::from_millis(16)).await;
        } else {
            tokio::time::sleep(frame_duration.saturating_sub(last_draw.elapsed())).await;
        }
    };

    event_reader_handle.abort();
    result
}

pub async fn run_chat(settings: Settings) -> Result<(), Box<dyn Error>> {
    let client = reqwest::Client::builder().build()?;
    let gateway = CompletionGateway::new(
        client,
        settings.base_url.as_str(),
        settings.api_key.as_str(),
        settings.model.as_str(),
    );
    info!(model = gateway.model(), base_url = gateway.base_url(), "starting chat session");

    let mut chat = ChatUi::new(settings.model);
    let mut terminal = setup_terminal()?;

    let result = drive(&mut terminal, &mut chat, &gateway).await;

    restore_terminal(&mut terminal)?;
    info!(turns = chat.session.log().len(), "chat session ended");
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::message::Turn;
    use crate::core::test_support::{delta, serve_once, sse_response, test_gateway};
    use ratatui::crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

    fn press(code: KeyCode) -> UiEvent {
        UiEvent::Crossterm(Event::Key(KeyEvent::new(code, KeyModifiers::NONE)))
    }

    fn idle_gateway() -> CompletionGateway {
        test_gateway("http://127.0.0.1:9/v1")
    }

    #[tokio::test]
    async fn empty_queue_requests_no_redraw() {
        let (dispatcher, _rx) = StreamDispatcher::new();
        let (_event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut chat = ChatUi::new("m");

        assert!(!process_ui_events(
            &mut chat,
            &mut event_rx,
            &idle_gateway(),
            &dispatcher,
            40
        ));
    }

    #[tokio::test]
    async fn key_releases_and_resizes_do_not_edit() {
        let (dispatcher, _rx) = StreamDispatcher::new();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut chat = ChatUi::new("m");

        event_tx
            .send(UiEvent::Crossterm(Event::Key(KeyEvent::new_with_kind(
                KeyCode::Char('x'),
                KeyModifiers::NONE,
                KeyEventKind::Release,
            ))))
            .unwrap();
        event_tx.send(UiEvent::Crossterm(Event::Resize(80, 24))).unwrap();

        assert!(process_ui_events(
            &mut chat,
            &mut event_rx,
            &idle_gateway(),
            &dispatcher,
            40
        ));
        assert_eq!(chat.input_text(), "");
        assert!(!chat.session.is_streaming());
    }

    #[tokio::test]
    async fn paste_events_are_sanitized_into_the_input() {
        let (dispatcher, _rx) = StreamDispatcher::new();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut chat = ChatUi::new("m");

        event_tx
            .send(UiEvent::Crossterm(Event::Paste("linen\x1b[0m\napron".into())))
            .unwrap();
        process_ui_events(&mut chat, &mut event_rx, &idle_gateway(), &dispatcher, 40);

        assert_eq!(chat.input_text(), "linen[0m apron");
    }

    #[tokio::test]
    async fn quit_stops_draining_the_queue() {
        let (dispatcher, _rx) = StreamDispatcher::new();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut chat = ChatUi::new("m");

        event_tx
            .send(UiEvent::Crossterm(Event::Key(KeyEvent::new(
                KeyCode::Char('c'),
                KeyModifiers::CONTROL,
            ))))
            .unwrap();
        event_tx.send(press(KeyCode::Char('x'))).unwrap();
        process_ui_events(&mut chat, &mut event_rx, &idle_gateway(), &dispatcher, 40);

        assert!(chat.should_quit);
        assert!(event_rx.try_recv().is_ok());
        assert_eq!(chat.input_text(), "");
    }

    #[tokio::test]
    async fn enter_dispatches_and_stream_updates_fill_the_transcript() {
        let body = format!("{}{}data: [DONE]\n\n", delta("Try"), delta(" a tote"));
        let (base_url, _captured) = serve_once(sse_response(&body)).await;
        let gateway = test_gateway(&base_url);
        let (dispatcher, mut rx) = StreamDispatcher::new();
        let (event_tx, mut event_rx) = mpsc::unbounded_channel();
        let mut chat = ChatUi::new("gpt-4o-mini");

        for c in "hi".chars() {
            event_tx.send(press(KeyCode::Char(c))).unwrap();
        }
        event_tx.send(press(KeyCode::Enter)).unwrap();

        assert!(process_ui_events(
            &mut chat,
            &mut event_rx,
            &gateway,
            &dispatcher,
            40
        ));
        assert!(chat.session.is_streaming());
        assert_eq!(chat.session.log().all(), [Turn::user("hi")]);

        let mut redraws = 0;
        tokio::time::timeout(Duration::from_secs(5), async {
            while chat.session.is_streaming() {
                if process_stream_updates(&mut chat, &mut rx) {
                    redraws += 1;
                } else {
                    tokio::time::sleep(Duration::from_millis(5)).await;
                }
            }
        })
        .await
        .expect("stream finished");

        assert!(redraws > 0);
        assert_eq!(
            chat.session.log().all(),
            [Turn::user("hi"), Turn::assistant("Try a tote")]
        );
        assert!(!process_stream_updates(&mut chat, &mut rx));
    }
}
