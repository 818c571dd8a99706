//! Best-effort desktop helpers. Failures are logged and never abort a flow.

use qrcode::render::unicode::Dense1x2;
use qrcode::QrCode;
use tracing::warn;

/// Copy to clipboard
pub fn copy_to_clipboard(text: &str) -> bool {
    match arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text)) {
        Ok(()) => true,
        Err(e) => {
            warn!("clipboard unavailable: {e}");
            false
        }
    }
}

/// Open URL in the default browser
pub fn open_url(url: &str) {
    if let Err(e) = open::that(url) {
        warn!(url, "could not open browser: {e}");
    }
}

/// Terminal QR code for `text`, two modules per character cell.
///
/// Colors are inverted so the code scans on dark terminal backgrounds.
pub fn render_qr(text: &str) -> Option<String> {
    match QrCode::new(text.as_bytes()) {
        Ok(code) => Some(
            code.render::<Dense1x2>()
                .dark_color(Dense1x2::Light)
                .light_color(Dense1x2::Dark)
                .quiet_zone(true)
                .build(),
        ),
        Err(e) => {
            warn!("could not render QR code: {e}");
            None
        }
    }
}
