/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! The iced program that hosts the tenant session.
//!
//! All state lives on the UI thread. Native surface callbacks and background
//! tasks only ever come back in as [`Message`]s.

use std::time::Duration;

use iced::keyboard::{self, Key, key::Named};
use iced::{Element, Event, Size, Subscription, Task, event, time, window};
use log::{debug, info, warn};
use tenantshell_core::{
    AccountRouteMarkers, ExitDecision, ExitGate, OriginTemplate, RefreshTicket, Session,
    ShellLayout, SurfaceEvent, TenantStore, project,
};

use crate::persistence::open_tenant_store;
use crate::prefs::ShellPreferences;
use crate::shell::desktop::lifecycle::origin_probe::{ProbeOutcome, probe_origin};
use crate::shell::desktop::lifecycle::webview_controller::{
    MountOutcome, WebviewController, desired_surface,
};
use crate::shell::desktop::ui::{browser_view, entry_form, exit_dialog};

const APP_TITLE: &str = "Tenant Shell";
const SURFACE_POLL_INTERVAL: Duration = Duration::from_millis(50);

#[derive(Debug, Clone)]
pub enum Message {
    TenantTextChanged(String),
    SubmitTenant,
    ResetTenant,
    RefreshRequested,
    RefreshExpired(RefreshTicket),
    SurfaceTick,
    SurfaceMounted(MountOutcome),
    OriginProbed { origin: String, outcome: ProbeOutcome },
    WindowOpened(window::Id),
    WindowResized(Size),
    ExitRequested,
    ExitConfirmed,
    ExitCancelled,
}

pub struct ShellApp {
    session: Session<Box<dyn TenantStore>>,
    exit_gate: ExitGate,
    webview: WebviewController,
    /// Origin the surface has finished loading at least once since it was
    /// last (re)loaded. Probe verdicts for it are moot.
    loaded_origin: Option<String>,
    refresh_fallback: Duration,
    probe_timeout: Duration,
}

impl ShellApp {
    pub fn new(prefs: &ShellPreferences) -> (Self, Task<Message>) {
        let store = open_tenant_store(prefs.data_dir.as_deref(), prefs.ephemeral);
        let session = Session::restore(
            store,
            OriginTemplate::new(&prefs.suffix_domain),
            Box::new(AccountRouteMarkers::new(prefs.route_markers.clone())),
        );
        Self::with_session(session, prefs)
    }

    pub fn with_session(
        session: Session<Box<dyn TenantStore>>,
        prefs: &ShellPreferences,
    ) -> (Self, Task<Message>) {
        let app = Self {
            session,
            exit_gate: ExitGate::new(),
            webview: WebviewController::new(Size::new(prefs.window_width, prefs.window_height)),
            refresh_fallback: prefs.refresh_fallback,
            loaded_origin: None,
            probe_timeout: prefs.probe_timeout,
        };
        let task = app.probe_current_origin();
        (app, task)
    }

    pub fn session(&self) -> &Session<Box<dyn TenantStore>> {
        &self.session
    }

    pub fn layout(&self) -> ShellLayout {
        project(&self.session)
    }

    pub fn is_exit_prompt_open(&self) -> bool {
        self.exit_gate.is_prompting()
    }

    pub fn webview(&self) -> &WebviewController {
        &self.webview
    }

    pub fn title(&self) -> String {
        match self.session.tenant() {
            Some(tenant) => format!("{tenant} - {APP_TITLE}"),
            None => APP_TITLE.to_string(),
        }
    }

    pub fn update(&mut self, message: Message) -> Task<Message> {
        let task = match message {
            Message::TenantTextChanged(text) => {
                self.session.set_tenant_text(text);
                Task::none()
            },
            Message::SubmitTenant => {
                if self.session.submit().changed() {
                    self.probe_current_origin()
                } else {
                    Task::none()
                }
            },
            Message::ResetTenant => {
                self.session.reset();
                self.loaded_origin = None;
                Task::none()
            },
            Message::RefreshRequested => self.refresh(),
            Message::RefreshExpired(ticket) => {
                if self.session.expire_refresh(ticket) {
                    debug!("Refresh indicator cleared by fallback timer");
                }
                Task::none()
            },
            Message::SurfaceTick => {
                for event in self.webview.drain_events() {
                    if let SurfaceEvent::LoadFinished { .. } = event {
                        self.loaded_origin = self.session.url();
                    }
                    self.session.observe(&event);
                }
                Task::none()
            },
            Message::SurfaceMounted(outcome) => {
                self.mount_settled(outcome);
                Task::none()
            },
            Message::OriginProbed { origin, outcome } => {
                if self.session.url().as_deref() != Some(origin.as_str()) {
                    debug!("Ignoring stale probe result for {origin}");
                } else if self.loaded_origin.as_deref() == Some(origin.as_str()) {
                    debug!("Ignoring probe result for {origin}; the surface already loaded it");
                } else if let Some(event) = outcome.into_surface_event(&origin) {
                    self.session.observe(&event);
                }
                Task::none()
            },
            Message::WindowOpened(id) => {
                self.webview.attach_window(id);
                Task::none()
            },
            Message::WindowResized(size) => {
                self.webview.resize(size);
                Task::none()
            },
            Message::ExitRequested => match self.exit_gate.request(self.session.has_url()) {
                ExitDecision::Proceed => {
                    info!("Exiting");
                    iced::exit()
                },
                ExitDecision::Confirm => Task::none(),
            },
            Message::ExitConfirmed => {
                if self.exit_gate.confirm() {
                    info!("Exit confirmed");
                    iced::exit()
                } else {
                    Task::none()
                }
            },
            Message::ExitCancelled => {
                self.exit_gate.cancel();
                Task::none()
            },
        };

        Task::batch([task, self.sync_surface()])
    }

    pub fn view(&self) -> Element<'_, Message> {
        if self.exit_gate.is_prompting() {
            return exit_dialog::view();
        }
        match self.layout() {
            ShellLayout::EntryForm { can_submit, .. } => {
                entry_form::view(self.session.tenant_text(), can_submit)
            },
            ShellLayout::TenantError { message } => browser_view::error_view(message),
            ShellLayout::Browser {
                show_reset,
                refreshing,
                ..
            } => browser_view::view(show_reset, refreshing),
        }
    }

    pub fn subscription(&self) -> Subscription<Message> {
        let surface_tick = if self.webview.is_mounted() {
            time::every(SURFACE_POLL_INTERVAL).map(|_| Message::SurfaceTick)
        } else {
            Subscription::none()
        };

        Subscription::batch([
            window::open_events().map(Message::WindowOpened),
            window::resize_events().map(|(_, size)| Message::WindowResized(size)),
            window::close_requests().map(|_| Message::ExitRequested),
            event::listen_with(shortcut_for_event),
            surface_tick,
        ])
    }

    fn mount_settled(&mut self, outcome: MountOutcome) {
        let MountOutcome {
            url,
            generation,
            result,
        } = outcome;
        let Err(e) = result else {
            return;
        };
        if !self.webview.is_current_mount(generation)
            || self.session.url().as_deref() != Some(url.as_str())
        {
            debug!("Ignoring outcome of superseded mount for {url}: {e}");
            return;
        }

        warn!("Browser surface failed to mount {url}: {e}");
        self.webview.mount_failed(generation);
        self.session.observe(&SurfaceEvent::LoadFailed {
            url,
            reason: format!("{e}"),
        });
    }

    fn refresh(&mut self) -> Task<Message> {
        let Some(ticket) = self.session.begin_refresh() else {
            return Task::none();
        };
        self.loaded_origin = None;
        if let Err(e) = self.webview.reload() {
            warn!("Failed to reload browser surface: {e}");
        }

        let fallback = self.refresh_fallback;
        let expire = Task::perform(
            async move { tokio::time::sleep(fallback).await },
            move |_| Message::RefreshExpired(ticket),
        );
        Task::batch([expire, self.probe_current_origin()])
    }

    fn probe_current_origin(&self) -> Task<Message> {
        if !self.session.state().shows_surface() {
            return Task::none();
        }
        let Some(origin) = self.session.url() else {
            return Task::none();
        };
        let target = origin.clone();
        Task::perform(probe_origin(target, self.probe_timeout), move |outcome| {
            Message::OriginProbed { origin, outcome }
        })
    }

    fn sync_surface(&mut self) -> Task<Message> {
        let desired = desired_surface(&self.layout(), self.exit_gate.is_prompting());
        self.webview.sync(&desired).map(Message::SurfaceMounted)
    }
}

fn shortcut_for_event(event: Event, status: event::Status, _window: window::Id) -> Option<Message> {
    let Event::Keyboard(keyboard::Event::KeyPressed { key, modifiers, .. }) = event else {
        return None;
    };
    if status == event::Status::Captured {
        return None;
    }

    match key.as_ref() {
        Key::Named(Named::F5) => Some(Message::RefreshRequested),
        Key::Character("r") if modifiers.command() => Some(Message::RefreshRequested),
        Key::Named(Named::BrowserBack) => Some(Message::ExitRequested),
        Key::Named(Named::Escape) => Some(Message::ExitCancelled),
        _ => None,
    }
}
