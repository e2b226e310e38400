use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::{mpsc, Arc};
use std::thread;

use chat_core::{update, AuthState, ChatEvent, Effect, Msg, SessionState, SessionView};
use chat_engine::{ReqwestCandidateFetcher, StaticTokenProvider};
use chat_logging::{chat_info, chat_warn};
use chrono::Utc;

use super::config::AppConfig;
use super::effects::EffectRunner;
use super::logging;
use super::ui::chat_log::{ChatLog, Role};
use super::ui::commands::{self, Command, HELP};
use super::ui::render;

/// Everything the event loop reacts to.
pub enum AppInput {
    Line(String),
    InputClosed,
    Session(Msg),
}

pub fn run_app(config_path: &Path) -> anyhow::Result<()> {
    // Nothing may log before the logger exists.
    let config = AppConfig::load(config_path)?;
    logging::initialize(config.log_destination, &config.log_file);

    let session_config = config.session_config()?;
    let settings = config.engine_settings()?;
    let tokens = Arc::new(StaticTokenProvider::from_env(&config.token_env));
    let fetcher = Arc::new(ReqwestCandidateFetcher::new(settings.fetch.clone())?);

    let (input_tx, input_rx) = mpsc::channel();
    let runner = EffectRunner::new(settings, tokens, fetcher, input_tx.clone())?;
    spawn_input_reader(input_tx)?;

    if config_path.exists() {
        chat_info!("loaded config from {:?}", config_path);
    } else {
        chat_info!("no config at {:?}; using defaults", config_path);
    }
    let mut app = App::new(SessionState::with_config(session_config), runner);
    app.say("type /help for commands")?;
    app.run(&input_rx)
}

fn spawn_input_reader(tx: mpsc::Sender<AppInput>) -> io::Result<()> {
    thread::Builder::new()
        .name("stdin-reader".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                match line {
                    Ok(line) => {
                        if tx.send(AppInput::Line(line)).is_err() {
                            return;
                        }
                    }
                    Err(err) => {
                        chat_warn!("stdin read failed: {}", err);
                        break;
                    }
                }
            }
            let _ = tx.send(AppInput::InputClosed);
        })?;
    Ok(())
}

struct App {
    state: SessionState,
    rendered: SessionView,
    runner: EffectRunner,
    chat_log: ChatLog,
    out: io::Stdout,
}

impl App {
    fn new(state: SessionState, runner: EffectRunner) -> Self {
        let rendered = state.view();
        Self {
            state,
            rendered,
            runner,
            chat_log: ChatLog::default(),
            out: io::stdout(),
        }
    }

    fn run(&mut self, input_rx: &mpsc::Receiver<AppInput>) -> anyhow::Result<()> {
        while let Ok(input) = input_rx.recv() {
            let keep_running = match input {
                AppInput::Line(line) => self.handle_line(&line)?,
                AppInput::Session(msg) => {
                    self.dispatch_msg(msg)?;
                    true
                }
                AppInput::InputClosed => false,
            };
            if !keep_running {
                break;
            }
        }
        self.dispatch_msg(Msg::DisconnectRequested)?;
        chat_info!("chat client exiting");
        Ok(())
    }

    fn handle_line(&mut self, line: &str) -> anyhow::Result<bool> {
        let command = match commands::parse(line) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(true),
            Err(err) => {
                self.say(&err.to_string())?;
                return Ok(true);
            }
        };

        match command {
            Command::Send(content) => self.send(content)?,
            Command::Ask(action) => self.send(action.prompt().to_string())?,
            Command::Connect => self.dispatch_msg(Msg::ConnectRequested)?,
            Command::Disconnect => self.dispatch_msg(Msg::DisconnectRequested)?,
            Command::SignOut => self.runner.sign_out(),
            Command::Language(language) => self.dispatch_msg(Msg::LanguageChanged(language))?,
            Command::NewConversation => {
                if self.state.auth_state() == AuthState::Ready && !self.chat_log.is_empty() {
                    self.chat_log.clear();
                }
                self.dispatch_msg(Msg::NewConversationRequested)?;
            }
            Command::Status => {
                let status = render::status(&self.state.view(), self.chat_log.len());
                self.say(&status)?;
            }
            Command::Help => self.say(HELP)?,
            Command::Quit => return Ok(false),
        }
        Ok(true)
    }

    /// Only messages the session will actually transmit enter the log.
    fn send(&mut self, content: String) -> anyhow::Result<()> {
        if self.state.auth_state() == AuthState::Ready {
            self.chat_log.push(Role::User, content.clone(), Utc::now());
            if let Some(message) = self.chat_log.last() {
                let line = render::message_line(message);
                self.say(&line)?;
            }
        } else {
            self.say("not connected; message not sent (use /connect)")?;
        }
        self.dispatch_msg(Msg::SendRequested(content))
    }

    fn dispatch_msg(&mut self, msg: Msg) -> anyhow::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        for effect in effects {
            match effect {
                Effect::Emit(event) => self.on_chat_event(event)?,
                other => self.runner.run(other),
            }
        }

        if was_dirty {
            let view = self.state.view();
            for line in render::changes(&self.rendered, &view) {
                self.say(&line)?;
            }
            self.rendered = view;
        }
        Ok(())
    }

    fn on_chat_event(&mut self, event: ChatEvent) -> anyhow::Result<()> {
        match event {
            ChatEvent::Ready => chat_info!("chat session ready"),
            ChatEvent::MessageReceived { content } => {
                self.chat_log.push(Role::Assistant, content, Utc::now());
                if let Some(message) = self.chat_log.last() {
                    let line = render::message_line(message);
                    self.say(&line)?;
                }
            }
            // Rendered from the view's typing flag.
            ChatEvent::Typing { .. } => {}
            ChatEvent::Notice(notice) => self.say(&render::notice_line(&notice))?,
        }
        Ok(())
    }

    fn say(&mut self, text: &str) -> io::Result<()> {
        let mut out = self.out.lock();
        writeln!(out, "{text}")?;
        out.flush()
    }
}
