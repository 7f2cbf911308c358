//! Interactive terminal session.
//!
//! One screen: a header with the current mode, preset and attached file, the
//! problem statement input, the answer view and a status line. Generation
//! runs inline, so keys are not read while a request is in flight.

use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use devarch_core::{
    CoreError, Engine, GenerateOutcome, ImageHandle, OutputMode, Presenter, PromptRequest,
    QuickStart, Session,
};
use ratatui::layout::{Constraint, Layout};
use ratatui::style::Stylize;
use ratatui::text::{Line, Text};
use ratatui::widgets::{Block, Paragraph, Wrap};
use ratatui::{DefaultTerminal, Frame};
use tracing::{error, info};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

const KEY_HELP: &str = "Enter generate · Ctrl-N continue · Tab mode · Ctrl-P preset · ↑↓ scroll · Esc quit";

/// An uploaded file: display name and content.
#[derive(Debug, Clone)]
pub struct Upload {
    pub name: String,
    pub content: String,
}

/// Start the terminal UI and run until the user quits.
pub async fn run(engine: Engine, upload: Option<Upload>, mode: OutputMode) -> Result<()> {
    let mut terminal = ratatui::init();
    let result = App::new(engine, upload, mode).run(&mut terminal).await;
    ratatui::restore();
    result
}

/// What a key press asks the event loop to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Generate,
    Continue,
    Quit,
}

/// Answer area contents, filled by the engine through [`Presenter`].
#[derive(Debug, Default)]
struct AnswerView {
    lines: Vec<String>,
    warning: Option<String>,
}

impl Presenter for AnswerView {
    fn warn(&mut self, message: &str) {
        self.warning = Some(message.to_owned());
    }

    fn answer(&mut self, heading: &str, text: &str) {
        self.lines.clear();
        self.lines.push(heading.to_owned());
        self.lines.push(String::new());
        self.lines.extend(text.lines().map(str::to_owned));
    }

    fn diagram_section(&mut self, heading: &str) {
        self.lines.push(String::new());
        self.lines.push(heading.to_owned());
    }

    fn diagram(&mut self, image: &ImageHandle, caption: &str) {
        self.lines
            .push(format!("🖼  {caption}: {}", image.path().display()));
    }
}

struct App {
    engine: Engine,
    session: Session,
    input: String,
    mode: OutputMode,
    preset: Option<QuickStart>,
    upload: Option<Upload>,
    view: AnswerView,
    status: String,
    scroll: u16,
    running: bool,
}

impl App {
    fn new(engine: Engine, upload: Option<Upload>, mode: OutputMode) -> Self {
        Self {
            engine,
            session: Session::new(),
            input: String::new(),
            mode,
            preset: None,
            upload,
            view: AnswerView::default(),
            status: "Describe your infrastructure need.".to_owned(),
            scroll: 0,
            running: true,
        }
    }

    async fn run(mut self, terminal: &mut DefaultTerminal) -> Result<()> {
        while self.running {
            terminal.draw(|frame| self.draw(frame))?;

            if !event::poll(POLL_INTERVAL)? {
                continue;
            }
            let Event::Key(key) = event::read()? else {
                continue;
            };
            if key.kind != KeyEventKind::Press {
                continue;
            }

            match self.handle_key(key) {
                Action::None => {}
                Action::Quit => self.running = false,
                Action::Generate => {
                    self.status = "⏳ Generating...".to_owned();
                    terminal.draw(|frame| self.draw(frame))?;
                    self.generate().await;
                }
                Action::Continue => {
                    self.status = "⏳ Continuing...".to_owned();
                    terminal.draw(|frame| self.draw(frame))?;
                    self.continue_answer().await;
                }
            }
        }
        info!("terminal session closed");
        Ok(())
    }

    fn handle_key(&mut self, key: KeyEvent) -> Action {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Esc => Action::Quit,
            KeyCode::Enter => Action::Generate,
            KeyCode::Char('n') if ctrl => Action::Continue,
            KeyCode::Char('p') if ctrl => {
                self.preset = QuickStart::cycle(self.preset);
                if let Some(preset) = self.preset {
                    self.input = preset.prompt().to_owned();
                }
                Action::None
            }
            KeyCode::Char('c') if ctrl => Action::Quit,
            KeyCode::Tab => {
                self.mode = self.mode.next();
                Action::None
            }
            KeyCode::Char(c) if !ctrl => {
                self.input.push(c);
                Action::None
            }
            KeyCode::Backspace => {
                self.input.pop();
                Action::None
            }
            KeyCode::Up => {
                self.scroll = self.scroll.saturating_sub(1);
                Action::None
            }
            KeyCode::Down => {
                self.scroll = self.scroll.saturating_add(1);
                Action::None
            }
            KeyCode::PageUp => {
                self.scroll = self.scroll.saturating_sub(10);
                Action::None
            }
            KeyCode::PageDown => {
                self.scroll = self.scroll.saturating_add(10);
                Action::None
            }
            _ => Action::None,
        }
    }

    fn request(&self) -> PromptRequest {
        let request = PromptRequest::new(self.input.clone(), self.mode);
        match &self.upload {
            Some(upload) => request.with_file_content(upload.content.clone()),
            None => request,
        }
    }

    async fn generate(&mut self) {
        let request = self.request();
        self.view.warning = None;
        match self
            .engine
            .generate(&mut self.session, &request, &mut self.view)
            .await
        {
            Ok(GenerateOutcome::Answered(_)) => {
                self.scroll = 0;
                self.status = format!("✅ Answer ready ({})", self.mode.label());
            }
            Ok(GenerateOutcome::Rejected) => {
                self.status = self.view.warning.take().unwrap_or_default();
            }
            Err(e) => {
                error!(error = %e, "generate failed");
                self.status = format!("❌ {e}");
            }
        }
    }

    async fn continue_answer(&mut self) {
        match self
            .engine
            .continue_answer(&mut self.session, &mut self.view)
            .await
        {
            Ok(_) => self.status = "✅ Response continued".to_owned(),
            Err(CoreError::NothingToContinue) => {
                self.status = "Nothing to continue yet. Generate an answer first.".to_owned();
            }
            Err(e) => {
                error!(error = %e, "continue failed");
                self.status = format!("❌ {e}");
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let [header, input, answer, status] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Min(3),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let preset = self.preset.map_or("none", QuickStart::label);
        let file = self.upload.as_ref().map_or("none", |u| u.name.as_str());
        let header_line = Line::from(vec![
            "🛠️ DevOps Architect".bold(),
            format!("  mode: {}  preset: {preset}  file: {file}", self.mode.label()).into(),
        ]);
        frame.render_widget(Paragraph::new(header_line), header);

        frame.render_widget(
            Paragraph::new(self.input.as_str())
                .wrap(Wrap { trim: false })
                .block(Block::bordered().title(" Describe your infrastructure need ")),
            input,
        );

        let body = Text::from_iter(self.view.lines.iter().map(String::as_str));
        frame.render_widget(
            Paragraph::new(body)
                .wrap(Wrap { trim: false })
                .scroll((self.scroll, 0))
                .block(Block::bordered().title(format!(" {:?} ", self.session.phase()))),
            answer,
        );

        frame.render_widget(
            Paragraph::new(Line::from(vec![
                self.status.as_str().into(),
                "  ".into(),
                KEY_HELP.dim(),
            ])),
            status,
        );
    }
}
