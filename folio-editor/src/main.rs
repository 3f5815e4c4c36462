use anyhow::Context;
use clap::Parser;
use folio_core::{
    Command, RenderBatch, RenderOutcome, StatusLevel, StatusMessage, ViewerConfig, ViewerEvent,
};
use iced::{
    keyboard,
    widget::{
        button, column, container, horizontal_space, image as img, row, scrollable, text,
        text_input, Column,
    },
    Element, Length, Subscription, Task, Theme,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod keymap;
mod pdf_viewer;
mod renderer;
mod session;
mod viewport;

use pdf_viewer::{LoadError, PdfDocument};
use session::Session;
use viewport::PageSlot;

const PAGES_SCROLLABLE: &str = "folio-pages";

/// Folio PDF viewer
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// PDF files to open on startup
    files: Vec<PathBuf>,

    /// Viewer configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("folio_editor=debug,folio_core=debug,info")),
        )
        .init();

    let config = match &args.config {
        Some(path) => ViewerConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => ViewerConfig::default(),
    };

    iced::application("Folio", FolioEditor::update, FolioEditor::view)
        .subscription(FolioEditor::subscription)
        .theme(|_| Theme::Dark)
        .run_with(move || FolioEditor::new(config, args.files))?;

    Ok(())
}

#[derive(Debug, Clone)]
enum Message {
    PathInputChanged(String),
    OpenPath,
    FileOpened(Result<PdfDocument, LoadError>),
    Reload,
    Reloaded(u64, Result<PdfDocument, LoadError>),
    Viewer(Command),
    GoToInputChanged(String),
    GoToSubmitted,
    RenderFinished(u64, RenderBatch),
    CloseTab(usize),
    SelectTab(usize),
}

struct Tab {
    id: u64,
    document: PdfDocument,
    session: Session,
}

struct FolioEditor {
    config: ViewerConfig,
    tabs: Vec<Tab>,
    active_tab: usize,
    next_tab_id: u64,
    path_input: String,
    go_to_input: String,
    status: Option<StatusMessage>,
}

impl FolioEditor {
    fn new(config: ViewerConfig, files: Vec<PathBuf>) -> (Self, Task<Message>) {
        let supersample = config.render.supersample;
        let open = files
            .into_iter()
            .map(|path| Task::perform(PdfDocument::load(path, supersample), Message::FileOpened));

        (
            Self {
                config,
                tabs: Vec::new(),
                active_tab: 0,
                next_tab_id: 0,
                path_input: String::new(),
                go_to_input: String::new(),
                status: None,
            },
            Task::batch(open),
        )
    }

    fn update(&mut self, message: Message) -> Task<Message> {
        match message {
            Message::PathInputChanged(value) => {
                self.path_input = value;
            }
            Message::OpenPath => {
                let path = self.path_input.trim();
                if path.is_empty() {
                    return Task::none();
                }
                return Task::perform(
                    PdfDocument::load(PathBuf::from(path), self.config.render.supersample),
                    Message::FileOpened,
                );
            }
            Message::FileOpened(result) => match result {
                Ok(document) => return self.add_tab(document),
                Err(e) => {
                    tracing::error!("Failed to open PDF: {}", e);
                    self.status = Some(StatusMessage::error(e.to_string()));
                }
            },
            Message::Reload => {
                if let Some(tab) = self.tabs.get(self.active_tab) {
                    let id = tab.id;
                    return Task::perform(
                        PdfDocument::load(
                            tab.document.path().to_path_buf(),
                            self.config.render.supersample,
                        ),
                        move |result| Message::Reloaded(id, result),
                    );
                }
            }
            Message::Reloaded(id, result) => {
                let Some(index) = self.tabs.iter().position(|tab| tab.id == id) else {
                    return Task::none();
                };
                match result {
                    Ok(document) => {
                        let tab = &mut self.tabs[index];
                        let events = tab.session.reopen(
                            document.renderer(),
                            document.page_count(),
                            document.file_name(),
                        );
                        tab.document = document;
                        return self.handle_events(index, events);
                    }
                    Err(e) => {
                        tracing::error!("Failed to reload PDF: {}", e);
                        self.status = Some(StatusMessage::error(e.to_string()));
                    }
                }
            }
            Message::Viewer(command) => {
                if let Some(tab) = self.tabs.get_mut(self.active_tab) {
                    let events = tab.session.viewer.dispatch(command);
                    return self.handle_events(self.active_tab, events);
                }
            }
            Message::GoToInputChanged(value) => {
                self.go_to_input = value;
            }
            Message::GoToSubmitted => {
                if let Some(tab) = self.tabs.get_mut(self.active_tab) {
                    match tab.session.viewer.go_to_text(&self.go_to_input) {
                        Ok(events) => {
                            self.go_to_input.clear();
                            return self.handle_events(self.active_tab, events);
                        }
                        Err(e) => self.status = Some(StatusMessage::warning(e.to_string())),
                    }
                }
            }
            Message::RenderFinished(id, batch) => {
                // The tab may have been closed while rendering
                let Some(tab) = self.tabs.iter_mut().find(|tab| tab.id == id) else {
                    return Task::none();
                };
                match tab.session.viewer.accept_render(batch) {
                    RenderOutcome::Applied(applied) => {
                        if let Some(status) = tab.session.viewport.apply(applied) {
                            self.status = Some(status);
                        }
                    }
                    RenderOutcome::Stale { generation, latest } => {
                        tracing::debug!(generation, latest, "dropped stale render");
                    }
                }
            }
            Message::CloseTab(index) => {
                if index < self.tabs.len() {
                    let mut tab = self.tabs.remove(index);
                    tab.session.close();
                    tracing::info!("Closed {}", tab.document.file_name());
                    if self.active_tab >= self.tabs.len() && !self.tabs.is_empty() {
                        self.active_tab = self.tabs.len() - 1;
                    }
                }
            }
            Message::SelectTab(index) => {
                if index < self.tabs.len() {
                    self.active_tab = index;
                    self.go_to_input.clear();
                }
            }
        }
        Task::none()
    }

    fn add_tab(&mut self, document: PdfDocument) -> Task<Message> {
        let id = self.next_tab_id;
        self.next_tab_id += 1;

        let (session, events) = Session::open(
            &self.config,
            document.renderer(),
            document.page_count(),
            document.file_name(),
        );
        self.tabs.push(Tab {
            id,
            document,
            session,
        });
        self.active_tab = self.tabs.len() - 1;
        self.handle_events(self.active_tab, events)
    }

    /// Turn viewer events into view updates and follow-up tasks
    fn handle_events(&mut self, index: usize, events: Vec<ViewerEvent>) -> Task<Message> {
        let Some(tab) = self.tabs.get_mut(index) else {
            return Task::none();
        };

        let mut tasks = Vec::new();
        for event in events {
            match event {
                ViewerEvent::StateChanged(snapshot) => {
                    tab.session.viewport.set_snapshot(snapshot);
                }
                ViewerEvent::Render(request) => {
                    let id = tab.id;
                    let render = tab.session.coordinator.render(request);
                    tasks.push(Task::perform(render, move |batch| {
                        Message::RenderFinished(id, batch)
                    }));
                }
                ViewerEvent::ScrollToPage(page_index) => {
                    let page_count = tab.document.page_count();
                    let y = if page_count > 1 {
                        page_index as f32 / (page_count - 1) as f32
                    } else {
                        0.0
                    };
                    tasks.push(scrollable::snap_to(
                        scrollable::Id::new(PAGES_SCROLLABLE),
                        scrollable::RelativeOffset { x: 0.0, y },
                    ));
                }
                ViewerEvent::Status(status) => self.status = Some(status),
                ViewerEvent::DocumentClosed => tab.session.viewport.clear(),
            }
        }
        Task::batch(tasks)
    }

    fn subscription(&self) -> Subscription<Message> {
        keyboard::on_key_press(|key, modifiers| {
            keymap::command_for_key(key.as_ref(), modifiers).map(Message::Viewer)
        })
    }

    fn view(&self) -> Element<'_, Message> {
        let open_bar = row![
            text_input("Path to a PDF file", &self.path_input)
                .on_input(Message::PathInputChanged)
                .on_submit(Message::OpenPath)
                .width(Length::Fixed(360.0)),
            button("Open").on_press(Message::OpenPath),
        ]
        .spacing(5);

        let content: Element<Message> = if self.tabs.is_empty() {
            // Welcome screen
            container(
                column![
                    text("Folio").size(32),
                    text("Open a PDF document to get started").size(16),
                    open_bar
                ]
                .spacing(20)
                .align_x(iced::Alignment::Center),
            )
            .width(Length::Fill)
            .height(Length::Fill)
            .center_x(Length::Fill)
            .center_y(Length::Fill)
            .into()
        } else {
            // Tab bar
            let mut tab_bar = row![].spacing(5);
            for (idx, tab) in self.tabs.iter().enumerate() {
                let tab_button = button(
                    row![
                        text(tab.document.file_name()).size(14),
                        button("×").on_press(Message::CloseTab(idx))
                    ]
                    .spacing(5),
                )
                .on_press(Message::SelectTab(idx));
                tab_bar = tab_bar.push(tab_button);
            }
            tab_bar = tab_bar.push(horizontal_space()).push(open_bar);

            let main_content: Element<Message> = match self.tabs.get(self.active_tab) {
                Some(tab) => self.tab_view(tab),
                None => text("No document loaded").into(),
            };

            column![tab_bar, main_content].spacing(10).into()
        };

        column![content, self.status_bar()]
            .spacing(10)
            .padding(10)
            .into()
    }

    fn tab_view<'a>(&'a self, tab: &'a Tab) -> Element<'a, Message> {
        let Some(snapshot) = tab.session.viewport.snapshot() else {
            return text("Loading...").into();
        };
        let action = |enabled: bool, command: Command| enabled.then_some(Message::Viewer(command));
        let continuous = snapshot.layout.is_continuous();

        let toolbar = row![
            button("−").on_press_maybe(action(snapshot.can_zoom, Command::ZoomOut)),
            text(&snapshot.zoom_label),
            button("+").on_press_maybe(action(snapshot.can_zoom, Command::ZoomIn)),
            button("Reset").on_press_maybe(action(snapshot.can_zoom, Command::ZoomReset)),
            horizontal_space(),
            button("Reload").on_press(Message::Reload),
            button(if snapshot.layout.is_double_page() { "Single" } else { "Double" })
                .on_press_maybe(action(!continuous, Command::ToggleDoublePage)),
            button(if snapshot.cover_page { "Cover ✓" } else { "Cover" })
                .on_press_maybe(action(!continuous, Command::ToggleCoverPage)),
            button(if continuous { "Paged" } else { "Continuous" })
                .on_press(Message::Viewer(Command::ToggleContinuous)),
            horizontal_space(),
            button("◀").on_press_maybe(action(snapshot.can_go_previous, Command::Previous)),
            text(&snapshot.display_label),
            button("▶").on_press_maybe(action(snapshot.can_go_next, Command::Next)),
            text_input("Go to", &self.go_to_input)
                .on_input(Message::GoToInputChanged)
                .on_submit(Message::GoToSubmitted)
                .width(Length::Fixed(80.0)),
        ]
        .spacing(10)
        .padding(10)
        .align_y(iced::Alignment::Center);

        let pages: Element<Message> = if continuous {
            Column::with_children((0..snapshot.page_count).map(|index| page_view(tab, index)))
                .spacing(10)
                .align_x(iced::Alignment::Center)
                .width(Length::Fill)
                .into()
        } else {
            let slot = |page: Option<usize>| match page {
                Some(index) => page_view(tab, index),
                None => horizontal_space().into(),
            };
            let spread = if snapshot.layout.is_double_page() {
                row![slot(snapshot.spread.left), slot(snapshot.spread.right)]
            } else {
                row![slot(snapshot.spread.left)]
            };
            container(spread.spacing(10))
                .width(Length::Fill)
                .center_x(Length::Fill)
                .into()
        };

        let page_area = scrollable(pages)
            .id(scrollable::Id::new(PAGES_SCROLLABLE))
            .width(Length::Fill)
            .height(Length::Fill);

        column![toolbar, page_area].into()
    }

    fn status_bar(&self) -> Element<'_, Message> {
        let line = match &self.status {
            Some(status) => {
                let prefix = match status.level {
                    StatusLevel::Info => "",
                    StatusLevel::Warning => "Warning: ",
                    StatusLevel::Error => "Error: ",
                };
                format!("{}{}", prefix, status)
            }
            None => String::new(),
        };
        text(line).size(13).into()
    }
}

fn page_view(tab: &Tab, index: usize) -> Element<'_, Message> {
    match tab.session.viewport.slot(index) {
        PageSlot::Ready(handle, width) => img(handle.clone()).width(Length::Fixed(width)).into(),
        PageSlot::Failed => container(text(format!("Page {} could not be rendered", index + 1)))
            .padding(40)
            .into(),
        PageSlot::Pending => container(text("Rendering page...")).padding(40).into(),
    }
}
