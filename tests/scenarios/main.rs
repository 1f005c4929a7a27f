use std::time::Duration;

use tempfile::TempDir;
use tenantshell::VERSION;
use tenantshell::persistence::RedbTenantStore;
use tenantshell::prefs::ShellPreferences;
use tenantshell::shell::desktop::host::app::{Message, ShellApp};
use tenantshell::shell::desktop::lifecycle::origin_probe::ProbeOutcome;
use tenantshell_core::{
    SessionState, ShellLayout, SurfaceEvent, TENANT_NOT_FOUND_MESSAGE, TENANT_RECORD_KEY,
    TenantStore,
};

fn prefs_in(dir: &TempDir) -> ShellPreferences {
    ShellPreferences {
        data_dir: Some(dir.path().to_path_buf()),
        probe_timeout: Duration::from_millis(10),
        ..ShellPreferences::default()
    }
}

fn launch(prefs: &ShellPreferences) -> ShellApp {
    let (app, _task) = ShellApp::new(prefs);
    app
}

#[test]
fn scenarios_binary_smoke_runs() {
    assert!(!VERSION.is_empty());
}

#[test]
fn first_launch_submit_and_restart_restores_tenant() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);

    {
        let mut app = launch(&prefs);
        assert!(app.layout().is_entry_form());

        let _ = app.update(Message::TenantTextChanged("myschool".to_string()));
        let _ = app.update(Message::SubmitTenant);
        assert_eq!(
            app.layout().surface_url(),
            Some("https://myschool.olympicatechnologies.co.in")
        );
    }

    let store = RedbTenantStore::open(dir.path()).unwrap();
    assert_eq!(
        store.get(TENANT_RECORD_KEY).unwrap().as_deref(),
        Some("myschool")
    );
    drop(store);

    let app = launch(&prefs);
    assert_eq!(app.session().state(), SessionState::Active);
    assert_eq!(
        app.layout().surface_url(),
        Some("https://myschool.olympicatechnologies.co.in")
    );
}

#[test]
fn unknown_tenant_error_then_reset_clears_record() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);

    {
        let mut app = launch(&prefs);
        let _ = app.update(Message::TenantTextChanged("ghost".to_string()));
        let _ = app.update(Message::SubmitTenant);
        app.webview()
            .events()
            .send(SurfaceEvent::HttpError {
                url: "https://ghost.olympicatechnologies.co.in".to_string(),
                status: 404,
            })
            .unwrap();
        let _ = app.update(Message::SurfaceTick);
        assert_eq!(
            app.layout(),
            ShellLayout::TenantError {
                message: TENANT_NOT_FOUND_MESSAGE
            }
        );

        let _ = app.update(Message::ResetTenant);
        assert!(app.layout().is_entry_form());
    }

    let app = launch(&prefs);
    assert!(app.layout().is_entry_form());
}

#[test]
fn forbidden_probe_answer_keeps_loaded_tenant() {
    let dir = TempDir::new().unwrap();
    let mut app = launch(&prefs_in(&dir));
    let _ = app.update(Message::TenantTextChanged("district5".to_string()));
    let _ = app.update(Message::SubmitTenant);

    let origin = "https://district5.olympicatechnologies.co.in".to_string();
    app.webview()
        .events()
        .send(SurfaceEvent::LoadFinished {
            url: origin.clone(),
        })
        .unwrap();
    let _ = app.update(Message::SurfaceTick);
    let _ = app.update(Message::OriginProbed {
        origin,
        outcome: ProbeOutcome::HttpError { status: 403 },
    });
    assert_eq!(app.session().state(), SessionState::Active);
}

#[test]
fn error_state_persists_record_until_reset() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);

    {
        let mut app = launch(&prefs);
        let _ = app.update(Message::TenantTextChanged("district5".to_string()));
        let _ = app.update(Message::SubmitTenant);
        let _ = app.update(Message::OriginProbed {
            origin: "https://district5.olympicatechnologies.co.in".to_string(),
            outcome: ProbeOutcome::Unreachable {
                reason: "offline".to_string(),
            },
        });
        assert_eq!(app.session().state(), SessionState::ErrorNoTenantFound);
    }

    // A transient failure must not lose the tenant.
    let app = launch(&prefs);
    assert_eq!(app.session().state(), SessionState::Active);
}

#[test]
fn custom_suffix_domain_resolves_origin() {
    let dir = TempDir::new().unwrap();
    let prefs = ShellPreferences {
        suffix_domain: "tenants.example.org".to_string(),
        ..prefs_in(&dir)
    };

    let mut app = launch(&prefs);
    let _ = app.update(Message::TenantTextChanged("acme".to_string()));
    let _ = app.update(Message::SubmitTenant);
    assert_eq!(
        app.layout().surface_url(),
        Some("https://acme.tenants.example.org")
    );
}

#[test]
fn ephemeral_run_forgets_tenant() {
    let dir = TempDir::new().unwrap();
    let prefs = ShellPreferences {
        ephemeral: true,
        ..prefs_in(&dir)
    };

    {
        let mut app = launch(&prefs);
        let _ = app.update(Message::TenantTextChanged("myschool".to_string()));
        let _ = app.update(Message::SubmitTenant);
        assert_eq!(app.session().state(), SessionState::Active);
    }

    let app = launch(&prefs);
    assert!(app.layout().is_entry_form());
}

#[test]
fn exit_prompt_only_with_loaded_tenant() {
    let dir = TempDir::new().unwrap();
    let prefs = prefs_in(&dir);

    let mut app = launch(&prefs);
    let _ = app.update(Message::ExitRequested);
    assert!(!app.is_exit_prompt_open());

    let _ = app.update(Message::TenantTextChanged("myschool".to_string()));
    let _ = app.update(Message::SubmitTenant);
    let _ = app.update(Message::ExitRequested);
    assert!(app.is_exit_prompt_open());

    let _ = app.update(Message::ExitCancelled);
    assert!(!app.is_exit_prompt_open());
    assert_eq!(app.session().state(), SessionState::Active);
}
