//! Scripted terminal for driving the interactive loop in tests.

use std::{collections::VecDeque, io, time::Duration};

use async_trait::async_trait;

use crate::terminal::{Key, Screen, Terminal, View};

/// Upper bound on idle polls, so a broken loop fails the test instead of hanging it.
const MAX_IDLE_POLLS: usize = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Return this key immediately
    Press(Key),
    /// Wait out the poll timeout and return no key
    Idle,
}

/// One frame as the renderer received it.
#[derive(Debug, Clone)]
pub struct Rendered {
    pub screen: Screen,
    pub notice: String,
    pub lines: Vec<String>,
    pub input_text: String,
}

#[derive(Default)]
pub struct ScriptedTerminal {
    chat_script: VecDeque<Step>,
    lost_script: VecDeque<Key>,
    pub renders: Vec<Rendered>,
    idle_polls: usize,
}

impl ScriptedTerminal {
    /// Keys fed while the chat screen is shown. Once exhausted the terminal idles.
    pub fn new(steps: impl IntoIterator<Item = Step>) -> Self {
        Self {
            chat_script: steps.into_iter().collect(),
            ..Self::default()
        }
    }

    /// Keys fed once the connection-lost screen is shown, followed by `Cancel`.
    pub fn on_connection_lost(mut self, keys: impl IntoIterator<Item = Key>) -> Self {
        self.lost_script = keys.into_iter().collect();
        self
    }

    pub fn last_screen(&self) -> Option<Screen> {
        self.renders.last().map(|r| r.screen)
    }

    pub fn renders_of(&self, screen: Screen) -> usize {
        self.renders.iter().filter(|r| r.screen == screen).count()
    }
}

#[async_trait]
impl Terminal for ScriptedTerminal {
    fn render(&mut self, view: &View<'_>) -> io::Result<()> {
        self.renders.push(Rendered {
            screen: view.screen,
            notice: view.notice.to_string(),
            lines: view.history.iter().map(|m| m.format_line()).collect(),
            input_text: view.input_text.to_string(),
        });
        Ok(())
    }

    async fn poll_key(&mut self, timeout: Duration) -> io::Result<Option<Key>> {
        if self.last_screen() == Some(Screen::ConnectionLost) {
            return Ok(Some(self.lost_script.pop_front().unwrap_or(Key::Cancel)));
        }

        match self.chat_script.pop_front() {
            Some(Step::Press(key)) => Ok(Some(key)),
            Some(Step::Idle) | None => {
                self.idle_polls += 1;
                if self.idle_polls > MAX_IDLE_POLLS {
                    return Ok(Some(Key::Cancel));
                }
                tokio::time::sleep(timeout).await;
                Ok(None)
            }
        }
    }
}
