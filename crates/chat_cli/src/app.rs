//! Read-eval-print loop driving a [`SessionController`].

use chat_session::{
    ChatTransport, InitializeOutcome, SessionController, SessionEvent, SubmitOutcome,
    SubmitRejection,
};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc::UnboundedReceiver;

use crate::commands::{parse_slash_command, SlashCommand, HELP_TEXT};
use crate::renderer::{render_event, render_message};

pub struct ChatApp<T: ChatTransport, W> {
    controller: SessionController<T>,
    events: UnboundedReceiver<SessionEvent>,
    output: W,
}

impl<T, W> ChatApp<T, W>
where
    T: ChatTransport,
    W: AsyncWrite + Unpin,
{
    pub fn new(
        controller: SessionController<T>,
        events: UnboundedReceiver<SessionEvent>,
        output: W,
    ) -> Self {
        Self {
            controller,
            events,
            output,
        }
    }

    pub fn controller(&self) -> &SessionController<T> {
        &self.controller
    }

    /// Loads history, then handles input lines until `/quit` or EOF. The
    /// session is torn down on the way out.
    pub async fn run<R>(mut self, input: R) -> std::io::Result<W>
    where
        R: AsyncBufRead + Unpin,
    {
        self.load_history().await?;

        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            match parse_slash_command(&line) {
                Some(SlashCommand::Quit) => break,
                Some(command) => self.handle_command(command).await?,
                None => self.handle_text(&line).await?,
            }
        }

        self.controller.request_close();
        self.controller.teardown();
        tracing::debug!("chat loop finished");
        self.output.flush().await?;
        Ok(self.output)
    }

    async fn load_history(&mut self) -> std::io::Result<()> {
        let outcome = self.controller.initialize().await;
        self.print_history(outcome).await
    }

    async fn print_history(&mut self, outcome: InitializeOutcome) -> std::io::Result<()> {
        match outcome {
            InitializeOutcome::Loaded { .. } => {
                self.drain_events();
                for message in self.controller.snapshot().visible {
                    if let Some(line) = render_message(&message) {
                        self.write_line(&line).await?;
                    }
                }
                Ok(())
            }
            InitializeOutcome::Rejected(reason) => {
                self.write_line(&format!("(reload not possible: {reason:?})")).await
            }
            InitializeOutcome::Failed { .. } | InitializeOutcome::Abandoned => {
                self.flush_events().await
            }
        }
    }

    async fn handle_command(&mut self, command: SlashCommand) -> std::io::Result<()> {
        match command {
            SlashCommand::Help => self.write_line(HELP_TEXT).await,
            SlashCommand::Clear => {
                self.controller.clear_messages();
                self.write_line("(conversation cleared)").await
            }
            SlashCommand::Reload => {
                let outcome = self.controller.reload().await;
                self.print_history(outcome).await
            }
            SlashCommand::Unknown(name) => {
                self.write_line(&format!("unknown command {name}; try /help")).await
            }
            SlashCommand::Quit => Ok(()),
        }
    }

    async fn handle_text(&mut self, text: &str) -> std::io::Result<()> {
        match self.controller.submit(text).await {
            SubmitOutcome::Rejected(SubmitRejection::EmptyText) => Ok(()),
            SubmitOutcome::Rejected(reason) => {
                self.write_line(&format!("(not sent: {reason:?})")).await
            }
            SubmitOutcome::Delivered(_)
            | SubmitOutcome::Failed { .. }
            | SubmitOutcome::Abandoned => self.flush_events().await,
        }
    }

    fn drain_events(&mut self) {
        while self.events.try_recv().is_ok() {}
    }

    async fn flush_events(&mut self) -> std::io::Result<()> {
        while let Ok(event) = self.events.try_recv() {
            if let Some(line) = render_event(&event) {
                self.write_line(&line).await?;
            }
        }
        Ok(())
    }

    async fn write_line(&mut self, line: &str) -> std::io::Result<()> {
        self.output.write_all(line.as_bytes()).await?;
        self.output.write_all(b"\n").await
    }
}
