mod local_ip;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use admin_web::AdminState;
use app_core::{PinOutcome, RemoteSession};
use ecp::{EcpClient, EcpKey};
use iced::alignment::{Horizontal, Vertical};
use iced::widget::image::Handle;
use iced::widget::{button, column, container, horizontal_space, row, text, text_input, Space};
use iced::{
    Alignment, Application, Background, Border, Color, Command, Element, Length, Settings,
    Shadow, Theme,
};
use storage::config::RemoteConfig;
use storage::icons::IconCache;
use tracing::{debug, error, info, warn};

const APP_SLOTS: usize = 4;
const PLACEHOLDER_SIZE: u32 = 128;

fn main() -> iced::Result {
    init_tracing();

    let env_path = storage::env_file::locate();
    info!(path = %env_path.display(), "using config file");
    let config = RemoteConfig::load(&env_path).unwrap_or_else(|e| {
        warn!(error = %e, "failed to read config; using defaults");
        RemoteConfig::default()
    });

    let ecp = match EcpClient::new() {
        Ok(c) => Arc::new(c),
        Err(e) => {
            error!(error = %e, "failed to build HTTP client");
            std::process::exit(1);
        }
    };

    let admin_addr = SocketAddr::from(([0, 0, 0, 0], config.admin_port));
    let admin_state = Arc::new(AdminState::new(env_path.clone(), ecp.clone()));
    if let Err(e) = admin_web::spawn_background(admin_addr, admin_state) {
        error!(error = %e, "failed to start admin panel thread");
    }

    let flags = Flags {
        env_path,
        config,
        ecp,
        local_ip: local_ip::local_ip().to_string(),
    };

    App::run(Settings {
        window: iced::window::Settings {
            size: iced::Size::new(800.0, 480.0),
            ..Default::default()
        },
        ..Settings::with_flags(flags)
    })
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(filter))
        .init();
}

struct Flags {
    env_path: PathBuf,
    config: RemoteConfig,
    ecp: Arc<EcpClient>,
    local_ip: String,
}

struct App {
    env_path: PathBuf,
    config: RemoteConfig,
    ecp: Arc<EcpClient>,
    session: RemoteSession,
    icons: Option<IconCache>,
    icon_handles: [Option<Handle>; APP_SLOTS],
    local_ip: String,
    login: Option<LoginPrompt>,
}

#[derive(Debug, Clone, Copy, Default)]
struct LoginPrompt {
    rejected: bool,
}

impl Application for App {
    type Executor = iced::executor::Default;
    type Message = Message;
    type Theme = Theme;
    type Flags = Flags;

    fn new(flags: Self::Flags) -> (Self, Command<Self::Message>) {
        let icons = open_icon_cache(&flags.config);
        let fullscreen = flags.config.fullscreen;

        let app = Self {
            env_path: flags.env_path,
            config: flags.config,
            ecp: flags.ecp,
            session: RemoteSession::new(),
            icons,
            icon_handles: Default::default(),
            local_ip: flags.local_ip,
            login: None,
        };

        let mut cmds = vec![app.refresh_icons()];
        // Monitor size is not detected; small panels need FULLSCREEN=1.
        if fullscreen {
            cmds.push(iced::window::change_mode(
                iced::window::Id::MAIN,
                iced::window::Mode::Fullscreen,
            ));
        }
        (app, Command::batch(cmds))
    }

    fn title(&self) -> String {
        "Roku Remote".to_string()
    }

    fn theme(&self) -> Self::Theme {
        Theme::Dark
    }

    fn update(&mut self, message: Self::Message) -> Command<Self::Message> {
        match message {
            Message::Key(key) => {
                let ip = self.active_ip();
                Command::perform(
                    send_key_async(self.ecp.clone(), ip, key),
                    Message::KeySent,
                )
            }
            Message::KeySent(res) | Message::Launched(res) => {
                if let Err(e) = res {
                    debug!(error = %e, "device command failed");
                }
                Command::none()
            }
            Message::Launch(slot) => {
                let Some(app_id) = self.config.app_ids.get(slot).cloned() else {
                    return Command::none();
                };
                let ip = self.active_ip();
                Command::perform(
                    launch_async(self.ecp.clone(), ip, app_id),
                    Message::Launched,
                )
            }
            Message::ToggleTv => match self.session.toggle_tv() {
                Ok(_) => self.refresh_icons(),
                Err(e) => {
                    info!("{e}");
                    Command::none()
                }
            },
            Message::IconLoaded {
                slot,
                app_id,
                result,
            } => {
                // Ignore answers for an app that was swapped out by a reload.
                if self.config.app_ids.get(slot) != Some(&app_id) {
                    return Command::none();
                }
                let handle = match result {
                    Ok(Some(path)) => Some(Handle::from_path(path)),
                    Ok(None) => placeholder_handle(&app_id),
                    Err(e) => {
                        warn!(%app_id, error = %e, "icon unavailable");
                        placeholder_handle(&app_id)
                    }
                };
                if let Some(h) = self.icon_handles.get_mut(slot) {
                    *h = handle;
                }
                Command::none()
            }
            Message::OpenLogin => {
                self.session.clear_pin();
                self.login = Some(LoginPrompt::default());
                Command::none()
            }
            Message::CloseLogin => {
                self.session.clear_pin();
                self.login = None;
                Command::none()
            }
            Message::PinInput(value) => {
                self.session.set_pin(value);
                Command::none()
            }
            Message::PinDigit(c) => {
                self.session.push_pin(c);
                Command::none()
            }
            Message::PinBackspace => {
                self.session.pop_pin();
                Command::none()
            }
            Message::PinClear => {
                self.session.clear_pin();
                Command::none()
            }
            Message::SubmitPin => {
                match self.session.submit_pin(&self.config.admin_password) {
                    PinOutcome::Accepted { .. } => self.login = None,
                    PinOutcome::Rejected => {
                        if let Some(prompt) = &mut self.login {
                            prompt.rejected = true;
                        }
                    }
                }
                Command::none()
            }
            Message::ReloadConfig => Command::perform(
                load_config_async(self.env_path.clone()),
                Message::ConfigReloaded,
            ),
            Message::ConfigReloaded(res) => match res {
                Ok(config) => {
                    if config.icon_dir != self.config.icon_dir || self.icons.is_none() {
                        self.icons = open_icon_cache(&config);
                    }
                    self.config = config;
                    info!("configuration reloaded");
                    self.refresh_icons()
                }
                Err(e) => {
                    warn!(error = %e, "configuration reload failed");
                    Command::none()
                }
            },
        }
    }

    fn view(&self) -> Element<'_, Self::Message> {
        let root = column![
            self.view_topbar(),
            self.view_dpad(),
            self.view_app_row(),
            self.view_admin_row(),
        ]
        .spacing(8)
        .padding(8)
        .width(Length::Fill)
        .height(Length::Fill);

        let content: Element<'_, Message> = match self.login {
            Some(prompt) => container(self.view_login(prompt))
                .width(Length::Fill)
                .height(Length::Fill)
                .center_x()
                .center_y()
                .into(),
            None => root.into(),
        };

        container(content)
            .width(Length::Fill)
            .height(Length::Fill)
            .style(app_background())
            .into()
    }
}

#[derive(Debug, Clone)]
enum Message {
    Key(EcpKey),
    KeySent(Result<(), String>),
    Launch(usize),
    Launched(Result<(), String>),
    ToggleTv,
    IconLoaded {
        slot: usize,
        app_id: String,
        result: Result<Option<PathBuf>, String>,
    },
    OpenLogin,
    CloseLogin,
    PinInput(String),
    PinDigit(char),
    PinBackspace,
    PinClear,
    SubmitPin,
    ReloadConfig,
    ConfigReloaded(Result<RemoteConfig, String>),
}

impl App {
    fn active_ip(&self) -> String {
        self.config.tv_ip(self.session.active_slot()).to_string()
    }

    /// Reload every app icon for the active TV.
    fn refresh_icons(&self) -> Command<Message> {
        let Some(cache) = &self.icons else {
            let cmds = self
                .config
                .app_ids
                .iter()
                .enumerate()
                .map(|(slot, app_id)| {
                    let app_id = app_id.clone();
                    Command::perform(async {}, move |_| Message::IconLoaded {
                        slot,
                        app_id,
                        result: Ok(None),
                    })
                });
            return Command::batch(cmds);
        };

        let ip = self.active_ip();
        let cmds = self
            .config
            .app_ids
            .iter()
            .enumerate()
            .map(|(slot, app_id)| {
                let key = app_id.clone();
                Command::perform(
                    load_icon_async(cache.clone(), self.ecp.clone(), ip.clone(), app_id.clone()),
                    move |result| Message::IconLoaded {
                        slot,
                        app_id: key,
                        result,
                    },
                )
            });
        Command::batch(cmds)
    }

    fn view_topbar(&self) -> Element<'_, Message> {
        let tv_toggle = button(
            text(self.session.active_slot().label())
                .size(20)
                .horizontal_alignment(Horizontal::Center),
        )
        .style(iced::theme::Button::Secondary)
        .width(Length::FillPortion(2))
        .on_press(Message::ToggleTv);

        let address = text(format!("{}:{}", self.local_ip, self.config.admin_port))
            .size(16)
            .style(Color::from_rgb(0.5, 0.5, 0.5))
            .width(Length::FillPortion(6))
            .horizontal_alignment(Horizontal::Center);

        // Invisible admin login trigger.
        let admin_trigger = button(Space::new(Length::Fill, Length::Fill))
            .style(iced::theme::Button::Text)
            .width(Length::FillPortion(2))
            .height(Length::Fill)
            .on_press(Message::OpenLogin);

        row![tv_toggle, address, admin_trigger]
            .align_items(Alignment::Center)
            .height(Length::FillPortion(10))
            .into()
    }

    fn view_dpad(&self) -> Element<'_, Message> {
        let blank = || Space::new(Length::Fill, Length::Fill);

        column![
            row![blank(), key_button("Up", EcpKey::Up), blank()].spacing(8),
            row![
                key_button("Left", EcpKey::Left),
                key_button("OK", EcpKey::Select),
                key_button("Right", EcpKey::Right),
            ]
            .spacing(8),
            row![blank(), key_button("Down", EcpKey::Down), blank()].spacing(8),
        ]
        .spacing(8)
        .height(Length::FillPortion(60))
        .into()
    }

    fn view_app_row(&self) -> Element<'_, Message> {
        let mut apps = row![].spacing(8).height(Length::FillPortion(15));
        for (slot, handle) in self.icon_handles.iter().enumerate() {
            let content: Element<'_, Message> = match handle {
                Some(h) => iced::widget::image(h.clone())
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .into(),
                None => text("…")
                    .width(Length::Fill)
                    .horizontal_alignment(Horizontal::Center)
                    .vertical_alignment(Vertical::Center)
                    .into(),
            };
            apps = apps.push(
                button(content)
                    .style(iced::theme::Button::Text)
                    .width(Length::Fill)
                    .height(Length::Fill)
                    .on_press(Message::Launch(slot)),
            );
        }
        apps.into()
    }

    fn view_admin_row(&self) -> Element<'_, Message> {
        if !self.session.is_admin() {
            return Space::new(Length::Fill, Length::FillPortion(15)).into();
        }

        row![
            key_button("Home", EcpKey::Home),
            key_button("Volume Up", EcpKey::VolumeUp),
            key_button("Volume Down", EcpKey::VolumeDown),
            key_button("Power", EcpKey::Power),
            wide_button("Reload Config", Message::ReloadConfig),
        ]
        .spacing(8)
        .height(Length::FillPortion(15))
        .into()
    }

    fn view_login(&self, prompt: LoginPrompt) -> Element<'_, Message> {
        let placeholder = if prompt.rejected {
            "Incorrect, try again"
        } else {
            "Password"
        };
        let input = text_input(placeholder, self.session.pin())
            .secure(true)
            .on_input(Message::PinInput)
            .on_submit(Message::SubmitPin)
            .size(20);

        let digit = |c: char| pad_button(c.to_string(), Message::PinDigit(c));
        let keypad = column![
            row![digit('1'), digit('2'), digit('3')].spacing(6),
            row![digit('4'), digit('5'), digit('6')].spacing(6),
            row![digit('7'), digit('8'), digit('9')].spacing(6),
            row![
                pad_button("⌫".to_string(), Message::PinBackspace),
                digit('0'),
                pad_button("Clear".to_string(), Message::PinClear),
            ]
            .spacing(6),
        ]
        .spacing(6);

        let actions = row![
            horizontal_space(),
            button(text("Cancel"))
                .style(iced::theme::Button::Secondary)
                .on_press(Message::CloseLogin),
            button(text("OK")).on_press(Message::SubmitPin),
        ]
        .spacing(10)
        .align_items(Alignment::Center);

        container(
            column![
                text("Enter Admin Password:").size(18),
                input,
                keypad,
                actions
            ]
            .spacing(10),
        )
        .padding(16)
        .width(Length::Fixed(420.0))
        .style(panel())
        .into()
    }
}

fn key_button(label: &str, key: EcpKey) -> Element<'_, Message> {
    wide_button(label, Message::Key(key))
}

fn wide_button(label: &str, on_press: Message) -> Element<'_, Message> {
    button(
        text(label)
            .size(22)
            .width(Length::Fill)
            .height(Length::Fill)
            .horizontal_alignment(Horizontal::Center)
            .vertical_alignment(Vertical::Center),
    )
    .width(Length::Fill)
    .height(Length::Fill)
    .on_press(on_press)
    .into()
}

fn pad_button<'a>(label: String, on_press: Message) -> Element<'a, Message> {
    button(
        text(label)
            .size(20)
            .width(Length::Fill)
            .horizontal_alignment(Horizontal::Center),
    )
    .style(iced::theme::Button::Secondary)
    .width(Length::Fill)
    .padding(10)
    .on_press(on_press)
    .into()
}

fn app_background() -> iced::theme::Container {
    iced::theme::Container::Custom(Box::new(|theme: &Theme| {
        let p = theme.extended_palette();
        iced::widget::container::Appearance {
            background: Some(Background::Color(p.background.base.color)),
            text_color: Some(p.background.base.text),
            border: Border::default(),
            shadow: Shadow::default(),
        }
    }))
}

fn panel() -> iced::theme::Container {
    iced::theme::Container::Custom(Box::new(|theme: &Theme| {
        let p = theme.extended_palette();
        iced::widget::container::Appearance {
            background: Some(Background::Color(p.background.weak.color)),
            text_color: Some(p.background.base.text),
            border: Border {
                radius: 12.0.into(),
                width: 1.0,
                color: p.background.strong.color,
            },
            shadow: Shadow {
                color: Color::from_rgba8(0, 0, 0, 0.35),
                offset: iced::Vector::new(0.0, 6.0),
                blur_radius: 18.0,
            },
        }
    }))
}

fn open_icon_cache(config: &RemoteConfig) -> Option<IconCache> {
    match IconCache::new(&config.icon_dir) {
        Ok(cache) => Some(cache),
        Err(e) => {
            warn!(dir = %config.icon_dir.display(), error = %e, "icon cache unavailable");
            None
        }
    }
}

fn placeholder_handle(app_id: &str) -> Option<Handle> {
    match render::placeholder::placeholder_icon_png(PLACEHOLDER_SIZE, PLACEHOLDER_SIZE, app_id) {
        Ok(png) => Some(Handle::from_memory(png)),
        Err(e) => {
            warn!(app_id, error = %e, "failed to render placeholder icon");
            None
        }
    }
}

async fn send_key_async(ecp: Arc<EcpClient>, ip: String, key: EcpKey) -> Result<(), String> {
    ecp.keypress(&ip, key).await.map_err(|e| e.to_string())
}

async fn launch_async(ecp: Arc<EcpClient>, ip: String, app_id: String) -> Result<(), String> {
    ecp.launch(&ip, &app_id).await.map_err(|e| e.to_string())
}

async fn load_icon_async(
    cache: IconCache,
    ecp: Arc<EcpClient>,
    ip: String,
    app_id: String,
) -> Result<Option<PathBuf>, String> {
    cache
        .ensure(&*ecp, &ip, &app_id)
        .await
        .map_err(|e| e.to_string())
}

async fn load_config_async(path: PathBuf) -> Result<RemoteConfig, String> {
    RemoteConfig::load(&path).map_err(|e| e.to_string())
}
