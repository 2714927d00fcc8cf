use std::time::Duration;

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::{backend::Backend, Terminal};

use crate::{
    render::{FrameScene, SceneWidget},
    Result,
};

/// Input the frame loop reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayEvent {
    CloseRequested,
}

/// Output surface the frame loop presents to, plus its input queue.
pub trait Screen {
    /// Returns every event that arrived since the previous call without
    /// blocking.
    fn poll_events(&mut self) -> Result<Vec<DisplayEvent>>;

    /// Clears, draws `scene`, and shows the result.
    fn present(&mut self, scene: &FrameScene) -> Result<()>;
}

/// Non-blocking event queue feeding a [`TerminalScreen`].
pub trait EventSource {
    fn drain(&mut self) -> Result<Vec<DisplayEvent>>;
}

/// Reads crossterm events. `q`, `Esc` and `Ctrl+C` request a close.
#[derive(Debug, Default)]
pub struct CrosstermEvents;

impl EventSource for CrosstermEvents {
    fn drain(&mut self) -> Result<Vec<DisplayEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if is_close_key(&key) {
                    events.push(DisplayEvent::CloseRequested);
                }
            }
        }
        Ok(events)
    }
}

fn is_close_key(key: &KeyEvent) -> bool {
    if key.kind != KeyEventKind::Press {
        return false;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => true,
        KeyCode::Char('c') => key.modifiers.contains(KeyModifiers::CONTROL),
        _ => false,
    }
}

/// Presents scenes through a ratatui terminal.
pub struct TerminalScreen<B: Backend, E: EventSource = CrosstermEvents> {
    terminal: Terminal<B>,
    events: E,
}

impl<B: Backend, E: EventSource> TerminalScreen<B, E> {
    pub fn new(terminal: Terminal<B>, events: E) -> Self {
        Self { terminal, events }
    }

    pub fn terminal(&self) -> &Terminal<B> {
        &self.terminal
    }

    pub fn into_terminal(self) -> Terminal<B> {
        self.terminal
    }
}

impl<B: Backend, E: EventSource> Screen for TerminalScreen<B, E> {
    fn poll_events(&mut self) -> Result<Vec<DisplayEvent>> {
        self.events.drain()
    }

    fn present(&mut self, scene: &FrameScene) -> Result<()> {
        self.terminal.draw(|frame| {
            let area = frame.area();
            frame.render_widget(SceneWidget::new(scene), area);
        })?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::{
        bars::BarCollection,
        config::{DisplayConfig, LabelConfig},
        render::{compose, BACKGROUND},
    };

    struct NoEvents;

    impl EventSource for NoEvents {
        fn drain(&mut self) -> Result<Vec<DisplayEvent>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn recognises_close_keys() {
        let press = |code, modifiers| KeyEvent::new(code, modifiers);
        assert!(is_close_key(&press(KeyCode::Char('q'), KeyModifiers::NONE)));
        assert!(is_close_key(&press(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(is_close_key(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)));
        assert!(!is_close_key(&press(KeyCode::Char('c'), KeyModifiers::NONE)));
        assert!(!is_close_key(&press(KeyCode::Char(' '), KeyModifiers::NONE)));
    }

    #[test]
    fn presents_scene_on_test_backend() {
        let terminal = Terminal::new(TestBackend::new(40, 12)).unwrap();
        let mut screen = TerminalScreen::new(terminal, NoEvents);
        let scene = compose(
            &BarCollection::from_values(vec![0.9, 0.1]),
            &DisplayConfig::default(),
            &LabelConfig::default(),
        );

        screen.present(&scene).unwrap();
        assert!(screen.poll_events().unwrap().is_empty());

        let buffer = screen.terminal().backend().buffer();
        let corner = buffer.cell((39, 0)).unwrap();
        assert_eq!(corner.fg, ratatui::style::Color::Rgb(BACKGROUND.r, BACKGROUND.g, BACKGROUND.b));
    }
}
