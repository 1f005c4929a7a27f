/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Browser surface lifecycle.
//!
//! The surface is a native wry child view laid over the iced window. The
//! controller compares the surface the current layout wants against what is
//! mounted and issues the create/destroy/show/hide operations that close the
//! gap. Everything the page does comes back as [`SurfaceEvent`]s on a
//! channel that the host drains once per tick.

use std::cell::{Cell, RefCell};
use std::fmt;

use crossbeam_channel::{Receiver, Sender};
use iced::{Size, Task, window};
use log::{debug, warn};
use raw_window_handle::HasWindowHandle;
use tenantshell_core::{ShellLayout, SurfaceEvent};
use wry::{PageLoadEvent, Rect, WebView, WebViewBuilder};

use crate::shell::desktop::lifecycle::surface_bridge::{SURFACE_BRIDGE_SCRIPT, parse_bridge_message};

/// Height of the control strip iced draws below the surface.
pub const CONTROL_STRIP_HEIGHT: f32 = 52.0;

thread_local! {
    // wry webviews are !Send and must stay on the thread that owns the window.
    static MOUNTED_WEBVIEW: RefCell<Option<WebView>> = const { RefCell::new(None) };
    // Generation a pending mount must still match when it runs.
    static CURRENT_MOUNT: Cell<u64> = const { Cell::new(0) };
}

#[derive(Debug, Clone)]
pub enum SurfaceError {
    NotMounted,
    /// The mount was overtaken by an unmount or a newer mount.
    Superseded,
    InvalidUrl(String),
    Backend(String),
}

impl fmt::Display for SurfaceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotMounted => write!(f, "No browser surface is mounted"),
            Self::Superseded => write!(f, "Browser surface mount was superseded"),
            Self::InvalidUrl(e) => write!(f, "Invalid origin: {e}"),
            Self::Backend(e) => write!(f, "Browser surface error: {e}"),
        }
    }
}

impl std::error::Error for SurfaceError {}

/// What the surface should look like for the current frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DesiredSurface {
    /// No surface at all (entry form, tenant error).
    Absent,
    /// Keep the page alive but out of sight (exit prompt over a loaded page).
    Hidden,
    Shown { url: String },
}

pub fn desired_surface(layout: &ShellLayout, exit_prompting: bool) -> DesiredSurface {
    match layout.surface_url() {
        None => DesiredSurface::Absent,
        Some(_) if exit_prompting => DesiredSurface::Hidden,
        Some(url) => DesiredSurface::Shown {
            url: url.to_string(),
        },
    }
}

/// Logical-pixel rectangle the surface occupies inside the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SurfaceBounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl SurfaceBounds {
    fn to_rect(self) -> Rect {
        Rect {
            position: dpi::LogicalPosition::new(self.x, self.y).into(),
            size: dpi::LogicalSize::new(self.width, self.height).into(),
        }
    }
}

/// Everything above the control strip.
pub fn surface_bounds(window: Size) -> SurfaceBounds {
    SurfaceBounds {
        x: 0.0,
        y: 0.0,
        width: window.width.max(0.0),
        height: (window.height - CONTROL_STRIP_HEIGHT).max(0.0),
    }
}

/// Result of one mount attempt, tagged with what it was for.
#[derive(Debug, Clone)]
pub struct MountOutcome {
    pub url: String,
    pub generation: u64,
    pub result: Result<(), SurfaceError>,
}

fn is_current_mount(generation: u64) -> bool {
    CURRENT_MOUNT.with(|current| current.get() == generation)
}

/// Events a native page-load notification turns into.
pub fn page_load_events(event: PageLoadEvent, url: String) -> Vec<SurfaceEvent> {
    match event {
        PageLoadEvent::Started => Vec::new(),
        // Re-check account markers against the page that actually settled.
        PageLoadEvent::Finished => vec![
            SurfaceEvent::LoadFinished { url: url.clone() },
            SurfaceEvent::Navigation { url },
        ],
    }
}

pub struct WebviewController {
    events_tx: Sender<SurfaceEvent>,
    events_rx: Receiver<SurfaceEvent>,
    window_id: Option<window::Id>,
    /// Set as soon as a mount is issued, so a pending mount is not repeated.
    mounted_url: Option<String>,
    visible: bool,
    bounds: SurfaceBounds,
    generation: u64,
}

impl WebviewController {
    pub fn new(window_size: Size) -> Self {
        let (events_tx, events_rx) = crossbeam_channel::unbounded();
        Self {
            events_tx,
            events_rx,
            window_id: None,
            mounted_url: None,
            visible: false,
            bounds: surface_bounds(window_size),
            generation: CURRENT_MOUNT.with(Cell::get),
        }
    }

    pub fn attach_window(&mut self, id: window::Id) {
        debug!("Attaching browser surface to window {id:?}");
        self.window_id = Some(id);
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted_url.is_some()
    }

    pub fn mounted_url(&self) -> Option<&str> {
        self.mounted_url.as_deref()
    }

    pub fn is_visible(&self) -> bool {
        self.mounted_url.is_some() && self.visible
    }

    /// Generation of the most recent mount or unmount.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Whether `generation` is the mount this controller is waiting on.
    pub fn is_current_mount(&self, generation: u64) -> bool {
        self.generation == generation && is_current_mount(generation)
    }

    pub fn bounds(&self) -> SurfaceBounds {
        self.bounds
    }

    /// Sender handed to the native callbacks.
    pub fn events(&self) -> Sender<SurfaceEvent> {
        self.events_tx.clone()
    }

    /// Everything the page reported since the last drain.
    pub fn drain_events(&self) -> Vec<SurfaceEvent> {
        self.events_rx.try_iter().collect()
    }

    /// Bring the mounted surface in line with `desired`. A returned task
    /// resolves once a new mount has been attempted.
    pub fn sync(&mut self, desired: &DesiredSurface) -> Task<MountOutcome> {
        match desired {
            DesiredSurface::Absent => {
                self.unmount();
                Task::none()
            },
            DesiredSurface::Hidden => {
                self.set_visible(false);
                Task::none()
            },
            DesiredSurface::Shown { url } => {
                if self.mounted_url.as_deref() == Some(url.as_str()) {
                    self.set_visible(true);
                    return Task::none();
                }
                self.unmount();
                self.mount(url.clone())
            },
        }
    }

    fn mount(&mut self, url: String) -> Task<MountOutcome> {
        let Some(id) = self.window_id else {
            debug!("Window not open yet; deferring surface mount for {url}");
            return Task::none();
        };
        let generation = self.advance_generation();
        if let Err(e) = url::Url::parse(&url) {
            let result = Err(SurfaceError::InvalidUrl(format!("{url}: {e}")));
            return Task::done(MountOutcome {
                url,
                generation,
                result,
            });
        }

        debug!("Mounting browser surface at {url} (generation {generation})");
        self.mounted_url = Some(url.clone());
        self.visible = true;
        let bounds = self.bounds;
        let events = self.events_tx.clone();
        window::run(id, move |window| {
            let result = mount_webview(window, &url, bounds, generation, events);
            MountOutcome {
                url,
                generation,
                result,
            }
        })
    }

    fn advance_generation(&mut self) -> u64 {
        self.generation = CURRENT_MOUNT.with(|current| {
            let next = current.get().wrapping_add(1);
            current.set(next);
            next
        });
        self.generation
    }

    /// Forget a mount that never came up. Outcomes of older mounts are ignored.
    pub fn mount_failed(&mut self, generation: u64) {
        if !self.is_current_mount(generation) {
            return;
        }
        self.mounted_url = None;
        self.visible = false;
    }

    pub fn unmount(&mut self) {
        if self.mounted_url.take().is_none() {
            return;
        }
        self.visible = false;
        // A mount still queued for this generation must not land.
        self.advance_generation();
        MOUNTED_WEBVIEW.with(|slot| slot.borrow_mut().take());
        // Events from the old page must not reach the next session.
        let stale = self.drain_events().len();
        debug!("Unmounted browser surface; dropped {stale} pending events");
    }

    pub fn reload(&self) -> Result<(), SurfaceError> {
        with_webview(|webview| webview.reload())
    }

    pub fn resize(&mut self, window_size: Size) {
        self.bounds = surface_bounds(window_size);
        if !self.is_mounted() {
            return;
        }
        let rect = self.bounds.to_rect();
        if let Err(e) = with_webview(|webview| webview.set_bounds(rect)) {
            warn!("Failed to resize browser surface: {e}");
        }
    }

    fn set_visible(&mut self, visible: bool) {
        if !self.is_mounted() || self.visible == visible {
            return;
        }
        self.visible = visible;
        if let Err(e) = with_webview(|webview| webview.set_visible(visible)) {
            warn!("Failed to change browser surface visibility: {e}");
        }
    }
}

fn with_webview<T>(f: impl FnOnce(&WebView) -> wry::Result<T>) -> Result<T, SurfaceError> {
    MOUNTED_WEBVIEW.with(|slot| match slot.borrow().as_ref() {
        Some(webview) => f(webview).map_err(|e| SurfaceError::Backend(format!("{e}"))),
        None => Err(SurfaceError::NotMounted),
    })
}

fn mount_webview<W: HasWindowHandle + ?Sized>(
    window: &W,
    url: &str,
    bounds: SurfaceBounds,
    generation: u64,
    events: Sender<SurfaceEvent>,
) -> Result<(), SurfaceError> {
    if !is_current_mount(generation) {
        return Err(SurfaceError::Superseded);
    }
    let handle = window
        .window_handle()
        .map_err(|e| SurfaceError::Backend(format!("{e}")))?;

    let navigation_events = events.clone();
    let load_events = events.clone();
    let ipc_events = events;

    let webview = WebViewBuilder::new()
        .with_url(url)
        .with_bounds(bounds.to_rect())
        .with_initialization_script(SURFACE_BRIDGE_SCRIPT)
        .with_navigation_handler(move |target: String| {
            let _ = navigation_events.send(SurfaceEvent::Navigation { url: target });
            true
        })
        .with_on_page_load_handler(move |event, url| {
            for surface_event in page_load_events(event, url) {
                let _ = load_events.send(surface_event);
            }
        })
        .with_ipc_handler(move |request: wry::http::Request<String>| {
            if let Some(event) = parse_bridge_message(request.body()) {
                let _ = ipc_events.send(event);
            }
        })
        .build_as_child(&handle)
        .map_err(|e| SurfaceError::Backend(format!("{e}")))?;

    if !is_current_mount(generation) {
        debug!("Dropping webview from superseded mount {generation}");
        return Err(SurfaceError::Superseded);
    }
    MOUNTED_WEBVIEW.with(|slot| *slot.borrow_mut() = Some(webview));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn browser(url: &str) -> ShellLayout {
        ShellLayout::Browser {
            url: url.to_string(),
            show_reset: false,
            refreshing: false,
        }
    }

    #[rstest]
    #[case(false, DesiredSurface::Shown { url: "https://a.example".to_string() })]
    #[case(true, DesiredSurface::Hidden)]
    fn browser_layout_shows_or_hides_surface(#[case] prompting: bool, #[case] expected: DesiredSurface) {
        assert_eq!(desired_surface(&browser("https://a.example"), prompting), expected);
    }

    #[rstest]
    #[case(false)]
    #[case(true)]
    fn entry_and_error_layouts_have_no_surface(#[case] prompting: bool) {
        let entry = ShellLayout::EntryForm {
            tenant_text: String::new(),
            can_submit: false,
        };
        let error = ShellLayout::TenantError {
            message: tenantshell_core::TENANT_NOT_FOUND_MESSAGE,
        };
        assert_eq!(desired_surface(&entry, prompting), DesiredSurface::Absent);
        assert_eq!(desired_surface(&error, prompting), DesiredSurface::Absent);
    }

    #[test]
    fn bounds_leave_room_for_control_strip() {
        let bounds = surface_bounds(Size::new(420.0, 860.0));
        assert_eq!(bounds.x, 0.0);
        assert_eq!(bounds.y, 0.0);
        assert_eq!(bounds.width, 420.0);
        assert_eq!(bounds.height, 860.0 - CONTROL_STRIP_HEIGHT);
    }

    #[test]
    fn bounds_never_go_negative() {
        let bounds = surface_bounds(Size::new(10.0, 10.0));
        assert_eq!(bounds.height, 0.0);
    }

    #[test]
    fn shown_without_window_defers_mount() {
        let mut controller = WebviewController::new(Size::new(420.0, 860.0));
        let _ = controller.sync(&DesiredSurface::Shown {
            url: "https://a.example".to_string(),
        });
        assert!(!controller.is_mounted());
    }

    #[test]
    fn invalid_url_is_not_recorded_as_mounted() {
        let mut controller = WebviewController::new(Size::new(420.0, 860.0));
        controller.attach_window(window::Id::unique());
        let _ = controller.sync(&DesiredSurface::Shown {
            url: "https://exa mple".to_string(),
        });
        assert!(!controller.is_mounted());
    }

    #[test]
    fn pending_mount_is_not_repeated_and_absent_unmounts() {
        let mut controller = WebviewController::new(Size::new(420.0, 860.0));
        controller.attach_window(window::Id::unique());
        let shown = DesiredSurface::Shown {
            url: "https://a.example".to_string(),
        };
        let _ = controller.sync(&shown);
        assert_eq!(controller.mounted_url(), Some("https://a.example"));
        assert!(controller.is_visible());

        let _ = controller.sync(&DesiredSurface::Hidden);
        assert!(controller.is_mounted());
        assert!(!controller.is_visible());

        let _ = controller.sync(&shown);
        assert!(controller.is_visible());

        let _ = controller.sync(&DesiredSurface::Absent);
        assert!(!controller.is_mounted());
    }

    #[test]
    fn unmount_drops_pending_events() {
        let mut controller = WebviewController::new(Size::new(420.0, 860.0));
        controller.attach_window(window::Id::unique());
        let _ = controller.sync(&DesiredSurface::Shown {
            url: "https://a.example".to_string(),
        });
        controller
            .events()
            .send(SurfaceEvent::LoadFinished {
                url: "https://a.example".to_string(),
            })
            .unwrap();
        controller.unmount();
        assert!(controller.drain_events().is_empty());
    }

    #[test]
    fn failed_mount_clears_state() {
        let mut controller = WebviewController::new(Size::new(420.0, 860.0));
        controller.attach_window(window::Id::unique());
        let _ = controller.sync(&DesiredSurface::Shown {
            url: "https://a.example".to_string(),
        });
        controller.mount_failed(controller.generation);
        assert!(!controller.is_mounted());
        assert!(matches!(controller.reload(), Err(SurfaceError::NotMounted)));
    }

    #[test]
    fn unmount_supersedes_pending_mount() {
        let mut controller = WebviewController::new(Size::new(420.0, 860.0));
        controller.attach_window(window::Id::unique());
        let _ = controller.sync(&DesiredSurface::Shown {
            url: "https://a.example".to_string(),
        });
        let pending = controller.generation;
        assert!(is_current_mount(pending));

        controller.unmount();
        assert!(!is_current_mount(pending));
        assert!(!controller.is_current_mount(pending));
    }

    #[test]
    fn failure_of_older_mount_leaves_newer_mount_alone() {
        let mut controller = WebviewController::new(Size::new(420.0, 860.0));
        controller.attach_window(window::Id::unique());
        let _ = controller.sync(&DesiredSurface::Shown {
            url: "https://a.example".to_string(),
        });
        let first = controller.generation;
        let _ = controller.sync(&DesiredSurface::Absent);
        let _ = controller.sync(&DesiredSurface::Shown {
            url: "https://b.example".to_string(),
        });

        controller.mount_failed(first);
        assert_eq!(controller.mounted_url(), Some("https://b.example"));
        assert!(controller.is_current_mount(controller.generation));
    }

    #[rstest]
    #[case(PageLoadEvent::Started, vec![])]
    #[case(
        PageLoadEvent::Finished,
        vec![
            SurfaceEvent::LoadFinished { url: "https://a.example/accounts/log-in".to_string() },
            SurfaceEvent::Navigation { url: "https://a.example/accounts/log-in".to_string() },
        ]
    )]
    fn page_load_reports_finish_then_settled_url(
        #[case] event: PageLoadEvent,
        #[case] expected: Vec<SurfaceEvent>,
    ) {
        assert_eq!(
            page_load_events(event, "https://a.example/accounts/log-in".to_string()),
            expected
        );
    }
}
