//! Terminal backend built on crossterm and ratatui.

mod render;

use std::{
    io::{self, Stdout, stdout},
    time::Duration,
};

use async_trait::async_trait;
use crossterm::{
    ExecutableCommand,
    event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures_util::StreamExt;
use ratatui::backend::CrosstermBackend;

use crate::terminal::{Key, Terminal, View};

pub use render::{draw, truncate_line};

/// Raw-mode, alternate-screen terminal.
///
/// The terminal is restored when the value is dropped.
pub struct CrosstermTerminal {
    terminal: ratatui::Terminal<CrosstermBackend<Stdout>>,
    events: EventStream,
}

impl CrosstermTerminal {
    pub fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        if let Err(e) = stdout().execute(EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e);
        }

        let terminal = ratatui::Terminal::new(CrosstermBackend::new(stdout()))?;
        Ok(Self {
            terminal,
            events: EventStream::new(),
        })
    }
}

impl Drop for CrosstermTerminal {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = stdout().execute(LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

#[async_trait]
impl Terminal for CrosstermTerminal {
    fn render(&mut self, view: &View<'_>) -> io::Result<()> {
        self.terminal.draw(|frame| draw(frame, view))?;
        Ok(())
    }

    async fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let event = match tokio::time::timeout_at(deadline, self.events.next()).await {
                Err(_) => return Ok(None),
                // stdin is gone, nothing more will ever arrive
                Ok(None) => return Ok(Some(Key::Cancel)),
                Ok(Some(event)) => event?,
            };

            match event {
                Event::Key(key) if key.kind != KeyEventKind::Release => {
                    return Ok(Some(map_key(key)));
                }
                // Redraw right away at the new size
                Event::Resize(..) => return Ok(None),
                _ => {}
            }
        }
    }
}

/// Map a crossterm key event to the chat's key set.
pub fn map_key(event: KeyEvent) -> Key {
    let ctrl = event.modifiers.contains(KeyModifiers::CONTROL);
    let alt = event.modifiers.contains(KeyModifiers::ALT);

    match event.code {
        KeyCode::Enter => Key::Submit,
        KeyCode::Backspace => Key::Erase,
        KeyCode::Esc => Key::Cancel,
        KeyCode::Char('c') if ctrl => Key::Cancel,
        KeyCode::Char(c) if !ctrl && !alt && !c.is_control() => Key::Char(c),
        _ => Key::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyEvent {
        KeyEvent::new(code, modifiers)
    }

    #[test]
    fn test_map_key_editing_keys() {
        // テスト項目: Enter / Backspace / ESC がそれぞれ送信・削除・終了になる
        // given (前提条件):
        let none = KeyModifiers::NONE;

        // when (操作):
        let submit = map_key(key(KeyCode::Enter, none));
        let erase = map_key(key(KeyCode::Backspace, none));
        let cancel = map_key(key(KeyCode::Esc, none));

        // then (期待する結果):
        assert_eq!(submit, Key::Submit);
        assert_eq!(erase, Key::Erase);
        assert_eq!(cancel, Key::Cancel);
    }

    #[test]
    fn test_map_key_printable_characters() {
        // テスト項目: 印字可能文字は Shift 付きや非 ASCII でも入力文字になる
        // given (前提条件):

        // when (操作):
        let lower = map_key(key(KeyCode::Char('a'), KeyModifiers::NONE));
        let upper = map_key(key(KeyCode::Char('A'), KeyModifiers::SHIFT));
        let kana = map_key(key(KeyCode::Char('あ'), KeyModifiers::NONE));
        let space = map_key(key(KeyCode::Char(' '), KeyModifiers::NONE));

        // then (期待する結果):
        assert_eq!(lower, Key::Char('a'));
        assert_eq!(upper, Key::Char('A'));
        assert_eq!(kana, Key::Char('あ'));
        assert_eq!(space, Key::Char(' '));
    }

    #[test]
    fn test_map_key_modified_and_unknown_keys() {
        // テスト項目: Ctrl+C は終了、その他の修飾付きキーや特殊キーは無視される
        // given (前提条件):

        // when (操作):
        let ctrl_c = map_key(key(KeyCode::Char('c'), KeyModifiers::CONTROL));
        let ctrl_a = map_key(key(KeyCode::Char('a'), KeyModifiers::CONTROL));
        let alt_x = map_key(key(KeyCode::Char('x'), KeyModifiers::ALT));
        let arrow = map_key(key(KeyCode::Left, KeyModifiers::NONE));
        let tab = map_key(key(KeyCode::Tab, KeyModifiers::NONE));

        // then (期待する結果):
        assert_eq!(ctrl_c, Key::Cancel);
        assert_eq!(ctrl_a, Key::Other);
        assert_eq!(alt_x, Key::Other);
        assert_eq!(arrow, Key::Other);
        assert_eq!(tab, Key::Other);
    }
}
