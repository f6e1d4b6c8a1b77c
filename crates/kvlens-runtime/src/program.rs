#![forbid(unsafe_code)]

//! The update/view loop.
//!
//! `Program::run` owns the terminal: raw mode, optional alternate
//! screen and mouse capture, a poll-based event loop, and teardown on
//! exit. Background work goes through `Cmd::Task`, which runs a
//! closure on a spawned thread and feeds its result back into
//! `update` as a message over a channel. The UI thread itself never
//! blocks on I/O.

use std::io::{self, Stdout};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::Frame;
use tracing::debug;

/// Application state and behavior.
pub trait Model: Sized {
    /// Message type driving `update`. Every terminal event must map to
    /// one (use a `Noop` variant for events the app ignores).
    type Message: From<Event> + Send + 'static;

    /// Startup commands. Runs once before the first frame.
    fn init(&mut self) -> Cmd<Self::Message> {
        Cmd::none()
    }

    /// The state transition function.
    fn update(&mut self, msg: Self::Message) -> Cmd<Self::Message>;

    /// Draw the current state.
    fn view(&self, frame: &mut Frame);
}

/// A side effect requested by `init` or `update`.
pub enum Cmd<M> {
    /// Nothing to do.
    None,
    /// Stop the program.
    Quit,
    /// Feed a message straight back into `update`.
    Msg(M),
    /// Execute several commands.
    Batch(Vec<Cmd<M>>),
    /// Run a blocking closure on a background thread; its return value
    /// re-enters `update` as a message.
    Task(Box<dyn FnOnce() -> M + Send>),
}

impl<M> Default for Cmd<M> {
    fn default() -> Self {
        Self::None
    }
}

impl<M: std::fmt::Debug> std::fmt::Debug for Cmd<M> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::None => write!(f, "None"),
            Self::Quit => write!(f, "Quit"),
            Self::Msg(m) => f.debug_tuple("Msg").field(m).finish(),
            Self::Batch(cmds) => f.debug_tuple("Batch").field(cmds).finish(),
            Self::Task(_) => write!(f, "Task(..)"),
        }
    }
}

impl<M> Cmd<M> {
    #[inline]
    pub fn none() -> Self {
        Self::None
    }

    #[inline]
    pub fn quit() -> Self {
        Self::Quit
    }

    #[inline]
    pub fn msg(m: M) -> Self {
        Self::Msg(m)
    }

    /// Collapse a command list: empty becomes `None`, a single entry
    /// is unwrapped.
    pub fn batch(cmds: Vec<Self>) -> Self {
        let mut cmds: Vec<Self> = cmds
            .into_iter()
            .filter(|c| !matches!(c, Self::None))
            .collect();
        match cmds.len() {
            0 => Self::None,
            1 => cmds.remove(0),
            _ => Self::Batch(cmds),
        }
    }

    /// Run `f` on a background thread and deliver its result as a
    /// message.
    pub fn task<F>(f: F) -> Self
    where
        F: FnOnce() -> M + Send + 'static,
    {
        Self::Task(Box::new(f))
    }

    /// Lift a command into an enclosing message type. This is how a
    /// host embeds a sub-component's commands.
    pub fn map<N, F>(self, f: F) -> Cmd<N>
    where
        M: 'static,
        F: Fn(M) -> N + Clone + Send + 'static,
    {
        match self {
            Self::None => Cmd::None,
            Self::Quit => Cmd::Quit,
            Self::Msg(m) => Cmd::Msg(f(m)),
            Self::Batch(cmds) => {
                Cmd::Batch(cmds.into_iter().map(|c| c.map(f.clone())).collect())
            }
            Self::Task(task) => Cmd::Task(Box::new(move || f(task()))),
        }
    }
}

/// Execute a command tree inline, without threads or a terminal.
///
/// `Task` closures run on the calling thread and their results are
/// collected in order. Returns the produced messages and whether a
/// `Quit` was encountered. Tests use this to drive task completions
/// deterministically, including out-of-order interleavings.
pub fn drain<M>(cmd: Cmd<M>) -> (Vec<M>, bool) {
    fn walk<M>(cmd: Cmd<M>, msgs: &mut Vec<M>, quit: &mut bool) {
        match cmd {
            Cmd::None => {}
            Cmd::Quit => *quit = true,
            Cmd::Msg(m) => msgs.push(m),
            Cmd::Batch(cmds) => {
                for c in cmds {
                    walk(c, msgs, quit);
                }
            }
            Cmd::Task(f) => msgs.push(f()),
        }
    }
    let mut msgs = Vec::new();
    let mut quit = false;
    walk(cmd, &mut msgs, &mut quit);
    (msgs, quit)
}

/// Runtime knobs.
#[derive(Debug, Clone)]
pub struct ProgramConfig {
    /// Input poll timeout; also bounds redraw latency for task results.
    pub poll_timeout: Duration,
    /// Use the alternate screen buffer.
    pub alt_screen: bool,
    /// Enable mouse capture.
    pub mouse: bool,
}

impl Default for ProgramConfig {
    fn default() -> Self {
        Self {
            poll_timeout: Duration::from_millis(100),
            alt_screen: true,
            mouse: false,
        }
    }
}

impl ProgramConfig {
    pub fn with_poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = timeout;
        self
    }

    pub fn with_mouse(mut self) -> Self {
        self.mouse = true;
        self
    }
}

/// Owns a model and the terminal for its lifetime.
pub struct Program<M: Model> {
    model: M,
    config: ProgramConfig,
}

impl<M: Model> Program<M> {
    pub fn new(model: M) -> Self {
        Self::with_config(model, ProgramConfig::default())
    }

    pub fn with_config(model: M, config: ProgramConfig) -> Self {
        Self { model, config }
    }

    /// Run until a `Cmd::Quit`. Returns the final model so callers can
    /// inspect or persist state after exit.
    pub fn run(mut self) -> io::Result<M> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        if self.config.alt_screen {
            execute!(stdout, EnterAlternateScreen)?;
        }
        if self.config.mouse {
            execute!(stdout, EnableMouseCapture)?;
        }
        let mut terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        terminal.clear()?;

        let result = self.event_loop(&mut terminal);

        // Teardown mirrors setup in reverse, even if the loop failed.
        let mut out = io::stdout();
        if self.config.mouse {
            let _ = execute!(out, DisableMouseCapture);
        }
        if self.config.alt_screen {
            let _ = execute!(out, LeaveAlternateScreen);
        }
        let _ = disable_raw_mode();
        let _ = terminal.show_cursor();

        result.map(|()| self.model)
    }

    fn event_loop(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    ) -> io::Result<()> {
        let (tx, rx) = mpsc::channel::<M::Message>();

        let cmd = self.model.init();
        if self.dispatch(cmd, &tx) {
            return Ok(());
        }

        loop {
            // Task completions queued since the last pass.
            while let Ok(msg) = rx.try_recv() {
                let cmd = self.model.update(msg);
                if self.dispatch(cmd, &tx) {
                    return Ok(());
                }
            }

            terminal.draw(|frame| self.model.view(frame))?;

            if event::poll(self.config.poll_timeout)? {
                let msg = M::Message::from(event::read()?);
                let cmd = self.model.update(msg);
                if self.dispatch(cmd, &tx) {
                    return Ok(());
                }
            }
        }
    }

    /// Execute a command. Returns true when the program should quit.
    fn dispatch(&mut self, cmd: Cmd<M::Message>, tx: &mpsc::Sender<M::Message>) -> bool {
        match cmd {
            Cmd::None => false,
            Cmd::Quit => {
                debug!("quit requested");
                true
            }
            Cmd::Msg(m) => {
                let next = self.model.update(m);
                self.dispatch(next, tx)
            }
            Cmd::Batch(cmds) => {
                let mut quit = false;
                for c in cmds {
                    quit |= self.dispatch(c, tx);
                }
                quit
            }
            Cmd::Task(f) => {
                let tx = tx.clone();
                thread::spawn(move || {
                    // The receiver is gone once the loop exits; a late
                    // completion is simply dropped.
                    let _ = tx.send(f());
                });
                false
            }
        }
    }
}
