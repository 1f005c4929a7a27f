/* This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/. */

//! Script injected into every document the surface loads, and the IPC
//! messages it posts back.

use log::debug;
use serde::Deserialize;
use tenantshell_core::SurfaceEvent;

/// Runs before any page script.
///
/// - `window.open` and `target=` links/forms navigate the same surface
///   instead of opening a new browsing context.
/// - history API route changes are reported as navigations, since they never
///   reach the native navigation handler.
/// - the document's HTTP status is reported once it has loaded.
pub const SURFACE_BRIDGE_SCRIPT: &str = r#"
(function () {
  if (window.__tenantShellBridge) { return; }
  window.__tenantShellBridge = true;

  function post(message) {
    try { window.ipc.postMessage(JSON.stringify(message)); } catch (_) {}
  }

  window.open = function (url) {
    if (url) { window.location.assign(String(url)); }
    return window;
  };

  document.addEventListener('click', function (event) {
    var anchor = event.target && event.target.closest ? event.target.closest('a[target]') : null;
    if (anchor && anchor.target !== '_self' && anchor.href) {
      event.preventDefault();
      window.location.assign(anchor.href);
    }
  }, true);

  document.addEventListener('submit', function (event) {
    var form = event.target;
    if (form && form.target && form.target !== '_self') { form.target = '_self'; }
  }, true);

  ['pushState', 'replaceState'].forEach(function (name) {
    var original = history[name];
    history[name] = function () {
      var result = original.apply(this, arguments);
      post({ kind: 'navigation', url: window.location.href });
      return result;
    };
  });
  window.addEventListener('popstate', function () {
    post({ kind: 'navigation', url: window.location.href });
  });

  window.addEventListener('load', function () {
    var entries = performance.getEntriesByType ? performance.getEntriesByType('navigation') : [];
    var status = entries.length && entries[0].responseStatus ? entries[0].responseStatus : 0;
    post({ kind: 'document-status', url: window.location.href, status: status });
  });
})();
"#;

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum BridgeMessage {
    Navigation { url: String },
    DocumentStatus { url: String, status: u16 },
}

/// Translate an IPC body into a surface event. Unknown or malformed bodies
/// and successful document statuses produce nothing.
pub fn parse_bridge_message(body: &str) -> Option<SurfaceEvent> {
    let message = match serde_json::from_str::<BridgeMessage>(body) {
        Ok(message) => message,
        Err(e) => {
            debug!("Ignoring bridge message ({e}): {body}");
            return None;
        },
    };

    match message {
        BridgeMessage::Navigation { url } => Some(SurfaceEvent::Navigation { url }),
        BridgeMessage::DocumentStatus { url, status } if status >= 400 => {
            Some(SurfaceEvent::HttpError { url, status })
        },
        BridgeMessage::DocumentStatus { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn history_navigation_becomes_navigation_event() {
        let event = parse_bridge_message(
            r#"{"kind":"navigation","url":"https://a.example/accounts/log-out"}"#,
        );
        assert_eq!(
            event,
            Some(SurfaceEvent::Navigation {
                url: "https://a.example/accounts/log-out".to_string()
            })
        );
    }

    #[rstest]
    #[case(404, true)]
    #[case(500, true)]
    #[case(400, true)]
    #[case(200, false)]
    #[case(304, false)]
    #[case(0, false)]
    fn document_status_maps_errors_only(#[case] status: u16, #[case] is_error: bool) {
        let body = format!(r#"{{"kind":"document-status","url":"https://a.example/","status":{status}}}"#);
        let event = parse_bridge_message(&body);
        assert_eq!(event.is_some(), is_error);
        if let Some(event) = event {
            assert!(event.is_failure());
        }
    }

    #[rstest]
    #[case("")]
    #[case("not json")]
    #[case(r#"{"kind":"unknown"}"#)]
    #[case(r#"{"kind":"document-status","url":"x"}"#)]
    fn malformed_messages_are_ignored(#[case] body: &str) {
        assert_eq!(parse_bridge_message(body), None);
    }

    #[test]
    fn script_rewrites_new_browsing_contexts() {
        assert!(SURFACE_BRIDGE_SCRIPT.contains("window.open = function"));
        assert!(SURFACE_BRIDGE_SCRIPT.contains("a[target]"));
        assert!(SURFACE_BRIDGE_SCRIPT.contains("'document-status'"));
    }
}
