//! Client session lifecycle: name entry, connect, chat.

use std::sync::Arc;

use hiroba_shared::time::{Clock, SystemClock};

use crate::{
    config::ClientConfig,
    duplex::{ClientDuplexLoop, DuplexOutcome},
    error::ClientError,
    history::{ChatHistoryBuffer, ChatMessage},
    prompt::prompt_user_name,
    session::{ClientSessionState, resolve_user_name},
    terminal::{Screen, Terminal, View},
    transport,
    ui::CrosstermTerminal,
};

/// Run the chat client on the process's terminal.
///
/// When `name` is `None` the user is asked for one first; aborting that
/// prompt ends the client without connecting.
pub async fn run_client(config: ClientConfig, name: Option<String>) -> Result<(), ClientError> {
    let entered = match name {
        Some(name) => Some(name),
        None => tokio::task::spawn_blocking(prompt_user_name).await??,
    };

    let Some(user_name) = resolve_user_name(entered) else {
        tracing::info!("Name entry aborted, exiting");
        return Ok(());
    };
    tracing::info!("Starting session as '{}'", user_name);

    let mut terminal = CrosstermTerminal::new()?;
    let outcome = run_session(&mut terminal, &config, &user_name).await?;
    tracing::info!("Session ended: {:?}", outcome);

    Ok(())
}

/// Connect to `config.url` and run the chat on `terminal` until the user leaves.
///
/// A failed connection is shown on the `ConnectFailed` screen until any key
/// is pressed and then returned as [`ClientError::Connect`]. There is no retry.
pub async fn run_session<T>(
    terminal: &mut T,
    config: &ClientConfig,
    user_name: &str,
) -> Result<DuplexOutcome, ClientError>
where
    T: Terminal + ?Sized,
{
    let (sender, receiver) = match transport::connect(&config.url).await {
        Ok(halves) => halves,
        Err(source) => {
            tracing::error!("Failed to connect to {}: {}", config.url, source);
            show_connect_failure(terminal, config).await?;
            return Err(ClientError::Connect {
                url: config.url.clone(),
                source,
            });
        }
    };

    let clock = Arc::new(SystemClock);
    let history = Arc::new(ChatHistoryBuffer::with_capacity(config.max_messages));
    history.append(ChatMessage::system(
        clock.now(),
        format!("Connected to {} as {}", config.url, user_name),
    ));

    ClientDuplexLoop::new(
        ClientSessionState::new(user_name),
        history,
        config.poll_interval,
    )
    .with_clock(clock)
    .run(terminal, sender, receiver)
    .await
}

async fn show_connect_failure<T>(terminal: &mut T, config: &ClientConfig) -> Result<(), ClientError>
where
    T: Terminal + ?Sized,
{
    let notice = format!(
        "Could not connect to server at {}. Is it running?",
        config.url
    );
    let view = View {
        screen: Screen::ConnectFailed,
        notice: &notice,
        history: &[],
        input_text: "",
        user_name: "",
    };

    loop {
        terminal.render(&view)?;
        if terminal.poll_key(config.poll_interval).await?.is_some() {
            return Ok(());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        terminal::Key,
        test_support::{ScriptedTerminal, Step},
    };
    use std::time::Duration;

    fn closed_port_url() -> String {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        format!("ws://127.0.0.1:{}", port)
    }

    #[tokio::test]
    async fn test_connect_failure_shows_screen_and_returns_error() {
        // テスト項目: 接続に失敗すると接続失敗画面が表示され、キー入力後に Connect エラーが返る
        // given (前提条件):
        let config = ClientConfig {
            url: closed_port_url(),
            poll_interval: Duration::from_millis(10),
            ..ClientConfig::default()
        };
        let mut terminal =
            ScriptedTerminal::new([Step::Idle, Step::Idle, Step::Press(Key::Other)]);

        // when (操作):
        let result = run_session(&mut terminal, &config, "alice").await;

        // then (期待する結果):
        match result {
            Err(ClientError::Connect { url, .. }) => assert_eq!(url, config.url),
            other => panic!("expected a connect error, got {:?}", other),
        }
        assert_eq!(terminal.renders_of(Screen::ConnectFailed), 3);
        assert_eq!(terminal.renders_of(Screen::Chat), 0);
        let last = terminal.renders.last().unwrap();
        assert_eq!(
            last.notice,
            format!("Could not connect to server at {}. Is it running?", config.url)
        );
    }
}
