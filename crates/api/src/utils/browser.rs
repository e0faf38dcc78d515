//! Browser launcher for terminal sessions

use dulynoted_domain::Result;
use dulynoted_infra::BrowserLauncher;
use tracing::warn;

/// Opens the system browser, printing the URL when none is available
/// (SSH sessions, headless machines)
#[derive(Debug, Default, Clone, Copy)]
pub struct TerminalBrowser;

impl BrowserLauncher for TerminalBrowser {
    #[allow(clippy::print_stderr)]
    fn open(&self, url: &str) -> Result<()> {
        if let Err(err) = open::that(url) {
            warn!(error = %err, "Could not open a browser");
            eprintln!("Open this URL in your browser to continue:\n\n  {url}\n");
        } else {
            eprintln!("Opened your browser to finish signing in. Waiting for the redirect...");
        }
        Ok(())
    }
}
