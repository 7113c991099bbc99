//! Outbound links from a landmark: directions, website and tickets.

/// URL scheme of the Google Maps app.
pub const MAPS_APP_SCHEME: &str = "comgooglemaps://";
/// Web fallback when the maps app is not installed.
pub const MAPS_WEB_URL: &str = "https://maps.google.com/maps";

/// Opens URLs on the host platform.
pub trait LinkLauncher {
    /// Returns `false` when nothing on the device can open `url`.
    fn open_url(&mut self, url: &str) -> bool;
}

/// Launcher for headless runs: logs web links and accepts them, optionally
/// pretending an app handles custom schemes too.
#[derive(Debug, Clone, Default)]
pub struct LoggingLauncher {
    pub accept_app_links: bool,
}

impl LinkLauncher for LoggingLauncher {
    fn open_url(&mut self, url: &str) -> bool {
        let is_web = url.starts_with("https://") || url.starts_with("http://");
        if is_web || self.accept_app_links {
            log::info!("opening {}", url);
            true
        } else {
            log::debug!("no handler for {}", url);
            false
        }
    }
}

/// Percent-encodes a query value, leaving only RFC 3986 unreserved characters.
pub fn encode_query_value(value: &str) -> String {
    let mut encoded = String::with_capacity(value.len());
    for byte in value.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                encoded.push(byte as char)
            }
            _ => encoded.push_str(&format!("%{:02X}", byte)),
        }
    }
    encoded
}

/// Transit directions to `address` in the maps app.
pub fn directions_app_url(address: &str) -> String {
    format!(
        "{}?daddr={}&directionsmode=transit",
        MAPS_APP_SCHEME,
        encode_query_value(address)
    )
}

/// Directions to `address` on the maps website.
pub fn directions_web_url(address: &str) -> String {
    format!("{}?daddr={}", MAPS_WEB_URL, encode_query_value(address))
}

/// Opens directions in the maps app, falling back to the browser.
///
/// Returns the URL that was opened, if any.
pub fn open_directions(launcher: &mut dyn LinkLauncher, address: &str) -> Option<String> {
    let app = directions_app_url(address);
    if launcher.open_url(&app) {
        return Some(app);
    }

    let web = directions_web_url(address);
    if launcher.open_url(&web) {
        return Some(web);
    }

    log::warn!("could not open directions to {}", address);
    None
}
