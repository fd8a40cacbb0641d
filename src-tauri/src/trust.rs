//! Certificate failures from child webviews
//!
//! WebKitGTK and WebView2 raise certificate errors on the main thread and keep the
//! navigation waiting. The platform handle is parked in a main-thread table, the
//! failure goes onto the session queue, and a [`PlatformResponder`] hops back to
//! the main thread to settle it once the policy has decided.
//!
//! WKWebView answers authentication challenges inside wry's navigation delegate,
//! which is not reachable from here; on macOS untrusted certificates stay rejected.

use tauri::Webview;
use vyking_core::{SurfaceError, SurfaceGeneration, WeakEventSender};

#[cfg(any(target_os = "linux", windows))]
use std::sync::atomic::{AtomicU64, Ordering};
#[cfg(any(target_os = "linux", windows))]
use vyking_core::{SessionEvent, TrustFailure, TrustResponder};

#[cfg(any(target_os = "linux", windows))]
static NEXT_FAILURE_ID: AtomicU64 = AtomicU64::new(1);

/// Route certificate failures of `webview` to the session queue
#[cfg(any(target_os = "linux", windows))]
pub fn install(
    webview: &Webview,
    generation: SurfaceGeneration,
    events: WeakEventSender,
) -> Result<(), SurfaceError> {
    platform::install(webview, generation, events)
}

#[cfg(not(any(target_os = "linux", windows)))]
pub fn install(
    _webview: &Webview,
    generation: SurfaceGeneration,
    _events: WeakEventSender,
) -> Result<(), SurfaceError> {
    tracing::debug!(generation = %generation, "No certificate error hook on this platform");
    Ok(())
}

#[cfg(any(target_os = "linux", windows))]
fn next_failure_id() -> u64 {
    NEXT_FAILURE_ID.fetch_add(1, Ordering::Relaxed)
}

/// Post a parked failure; false when the session is gone and nobody will answer
#[cfg(any(target_os = "linux", windows))]
fn post(
    events: &WeakEventSender,
    generation: SurfaceGeneration,
    failure: TrustFailure,
    webview: &Webview,
    id: u64,
) -> bool {
    tracing::info!(
        generation = %generation,
        kind = %failure.kind,
        host = %failure.host,
        "Certificate failure"
    );

    events.send(SessionEvent::TrustFailure {
        generation,
        failure,
        responder: Box::new(PlatformResponder {
            webview: webview.clone(),
            id,
        }),
    })
}

/// Settles one parked platform handle
#[cfg(any(target_os = "linux", windows))]
struct PlatformResponder {
    webview: Webview,
    id: u64,
}

#[cfg(any(target_os = "linux", windows))]
impl PlatformResponder {
    fn settle(self: Box<Self>, proceed: bool) {
        let id = self.id;
        let result = self
            .webview
            .with_webview(move |platform| platform::resolve(&platform, id, proceed));

        if let Err(e) = result {
            tracing::warn!(id, proceed, error = %e, "Certificate decision not delivered");
        }
    }
}

#[cfg(any(target_os = "linux", windows))]
impl TrustResponder for PlatformResponder {
    fn proceed(self: Box<Self>) {
        self.settle(true);
    }

    fn cancel(self: Box<Self>) {
        self.settle(false);
    }
}

#[cfg(target_os = "linux")]
mod platform {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use gio::{TlsCertificate, TlsCertificateFlags};
    use tauri::webview::PlatformWebview;
    use tauri::Webview;
    use vyking_core::{
        SurfaceError, SurfaceGeneration, TrustFailure, TrustFailureKind, WeakEventSender,
    };
    use webkit2gtk::{WebContextExt, WebViewExt};

    use super::{next_failure_id, post};

    struct Held {
        certificate: TlsCertificate,
        host: String,
        uri: String,
    }

    thread_local! {
        static HELD: RefCell<HashMap<u64, Held>> = RefCell::new(HashMap::new());
    }

    pub fn install(
        webview: &Webview,
        generation: SurfaceGeneration,
        events: WeakEventSender,
    ) -> Result<(), SurfaceError> {
        let handle = webview.clone();

        webview
            .with_webview(move |platform| {
                platform.inner().connect_load_failed_with_tls_errors(
                    move |_view, uri, certificate, errors| {
                        let failure = TrustFailure::from_url(failure_kind(errors), uri);
                        let id = next_failure_id();
                        let held = Held {
                            certificate: certificate.clone(),
                            host: failure.host.clone(),
                            uri: uri.to_string(),
                        };
                        HELD.with(|table| table.borrow_mut().insert(id, held));

                        if !post(&events, generation, failure, &handle, id) {
                            HELD.with(|table| table.borrow_mut().remove(&id));
                        }

                        // Handled; WebKit shows no error page of its own
                        true
                    },
                );
            })
            .map_err(|e| SurfaceError::Create(e.to_string()))
    }

    pub fn resolve(platform: &PlatformWebview, id: u64, proceed: bool) {
        let Some(held) = HELD.with(|table| table.borrow_mut().remove(&id)) else {
            return;
        };
        if !proceed {
            return;
        }

        let view = platform.inner();
        match view.context() {
            Some(context) => {
                context.allow_tls_certificate_for_host(&held.certificate, &held.host);
                view.load_uri(&held.uri);
            }
            None => tracing::warn!(host = %held.host, "Web context gone, certificate not allowed"),
        }
    }

    /// Most severe flag wins
    fn failure_kind(errors: TlsCertificateFlags) -> TrustFailureKind {
        let invalid = TlsCertificateFlags::REVOKED
            | TlsCertificateFlags::INSECURE
            | TlsCertificateFlags::GENERIC_ERROR;

        if errors.intersects(invalid) {
            TrustFailureKind::Invalid
        } else if errors.contains(TlsCertificateFlags::UNKNOWN_CA) {
            TrustFailureKind::IssuerNotTrusted
        } else if errors.contains(TlsCertificateFlags::BAD_IDENTITY) {
            TrustFailureKind::HostMismatch
        } else if errors.contains(TlsCertificateFlags::EXPIRED) {
            TrustFailureKind::Expired
        } else if errors.contains(TlsCertificateFlags::NOT_ACTIVATED) {
            TrustFailureKind::NotYetValid
        } else {
            TrustFailureKind::Invalid
        }
    }

}

#[cfg(windows)]
mod platform {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use tauri::webview::PlatformWebview;
    use tauri::Webview;
    use vyking_core::{
        SurfaceError, SurfaceGeneration, TrustFailure, TrustFailureKind, WeakEventSender,
    };
    use webview2_com::Microsoft::Web::WebView2::Win32::{
        ICoreWebView2Deferral, ICoreWebView2ServerCertificateErrorDetectedEventArgs,
        ICoreWebView2_14, COREWEBVIEW2_SERVER_CERTIFICATE_ERROR_ACTION_ALWAYS_ALLOW,
        COREWEBVIEW2_SERVER_CERTIFICATE_ERROR_ACTION_CANCEL, COREWEBVIEW2_WEB_ERROR_STATUS,
        COREWEBVIEW2_WEB_ERROR_STATUS_CERTIFICATE_COMMON_NAME_IS_INCORRECT,
        COREWEBVIEW2_WEB_ERROR_STATUS_CERTIFICATE_EXPIRED,
        COREWEBVIEW2_WEB_ERROR_STATUS_CERTIFICATE_IS_INVALID,
    };
    use webview2_com::{take_pwstr, ServerCertificateErrorDetectedEventHandler};
    use windows::core::{Interface, PWSTR};

    use super::{next_failure_id, post};

    struct Held {
        args: ICoreWebView2ServerCertificateErrorDetectedEventArgs,
        deferral: ICoreWebView2Deferral,
    }

    thread_local! {
        static HELD: RefCell<HashMap<u64, Held>> = RefCell::new(HashMap::new());
    }

    pub fn install(
        webview: &Webview,
        generation: SurfaceGeneration,
        events: WeakEventSender,
    ) -> Result<(), SurfaceError> {
        let handle = webview.clone();

        webview
            .with_webview(move |platform| {
                if let Err(e) = subscribe(&platform, handle, generation, events) {
                    tracing::warn!(generation = %generation, error = %e, "Certificate error hook unavailable");
                }
            })
            .map_err(|e| SurfaceError::Create(e.to_string()))
    }

    fn subscribe(
        platform: &PlatformWebview,
        handle: Webview,
        generation: SurfaceGeneration,
        events: WeakEventSender,
    ) -> windows::core::Result<()> {
        let core = unsafe { platform.controller().CoreWebView2()? }.cast::<ICoreWebView2_14>()?;

        let handler = ServerCertificateErrorDetectedEventHandler::create(Box::new(
            move |_sender, args| {
                let Some(args) = args else {
                    return Ok(());
                };

                let (uri, status, deferral) = unsafe {
                    let mut uri = PWSTR::null();
                    args.RequestUri(&mut uri)?;
                    let mut status = COREWEBVIEW2_WEB_ERROR_STATUS::default();
                    args.ErrorStatus(&mut status)?;
                    (take_pwstr(uri), status, args.GetDeferral()?)
                };

                let failure = TrustFailure::from_url(failure_kind(status), &uri);
                let id = next_failure_id();
                HELD.with(|table| table.borrow_mut().insert(id, Held { args, deferral }));

                if !post(&events, generation, failure, &handle, id) {
                    if let Some(held) = HELD.with(|table| table.borrow_mut().remove(&id)) {
                        complete(held, false);
                    }
                }

                Ok(())
            },
        ));

        let mut token = 0;
        unsafe { core.add_ServerCertificateErrorDetected(&handler, &mut token) }
    }

    pub fn resolve(_platform: &PlatformWebview, id: u64, proceed: bool) {
        if let Some(held) = HELD.with(|table| table.borrow_mut().remove(&id)) {
            complete(held, proceed);
        }
    }

    fn complete(held: Held, proceed: bool) {
        let action = if proceed {
            COREWEBVIEW2_SERVER_CERTIFICATE_ERROR_ACTION_ALWAYS_ALLOW
        } else {
            COREWEBVIEW2_SERVER_CERTIFICATE_ERROR_ACTION_CANCEL
        };

        let result = unsafe {
            held.args
                .SetAction(action)
                .and_then(|()| held.deferral.Complete())
        };
        if let Err(e) = result {
            tracing::warn!(proceed, error = %e, "Failed to complete certificate deferral");
        }
    }

    /// WebView2 reports an unknown or self-signed authority as `CERTIFICATE_IS_INVALID`
    fn failure_kind(status: COREWEBVIEW2_WEB_ERROR_STATUS) -> TrustFailureKind {
        match status {
            COREWEBVIEW2_WEB_ERROR_STATUS_CERTIFICATE_IS_INVALID => {
                TrustFailureKind::IssuerNotTrusted
            }
            COREWEBVIEW2_WEB_ERROR_STATUS_CERTIFICATE_COMMON_NAME_IS_INCORRECT => {
                TrustFailureKind::HostMismatch
            }
            COREWEBVIEW2_WEB_ERROR_STATUS_CERTIFICATE_EXPIRED => TrustFailureKind::Expired,
            _ => TrustFailureKind::Invalid,
        }
    }
}
