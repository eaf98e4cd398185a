//! Headless capture engine (uses the `headless_chrome` crate)
//!
//! One engine instance is one scoped browser session: launch, load the page
//! over a `data:` URL, wait for the render signal, settle, screenshot, tear
//! down. The session never outlives the capture that created it.

use std::sync::Arc;
use std::time::{Duration, Instant};

use headless_chrome::browser::tab::Tab;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::debug;

use crate::error::{Error, Result};
use crate::template::RENDER_SIGNAL_EXPR;
use crate::ScreenshotOptions;

const SIGNAL_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// A single headless Chrome session sized to the requested viewport.
pub struct CaptureEngine {
    browser: Browser,
    tab: Arc<Tab>,
    options: ScreenshotOptions,
}

impl CaptureEngine {
    /// Launch the browser and open a fresh tab.
    pub fn new(options: ScreenshotOptions) -> Result<Self> {
        let mut builder = LaunchOptions::default_builder();
        builder
            .headless(true)
            .sandbox(false)
            .window_size(Some((options.width, options.height)));
        if let Some(path) = &options.chrome_path {
            builder.path(Some(path.clone()));
        }
        let launch_options = builder
            .build()
            .map_err(|e| Error::Launch(format!("Failed to build launch options: {}", e)))?;

        let browser = Browser::new(launch_options).map_err(|e| match &options.chrome_path {
            Some(path) => Error::Launch(format!(
                "Failed to launch browser at {}: {}",
                path.display(),
                e
            )),
            None => Error::Launch(format!("Failed to launch browser: {}", e)),
        })?;

        let tab = browser
            .new_tab()
            .map_err(|e| Error::Launch(format!("Failed to create tab: {}", e)))?;

        Ok(Self {
            browser,
            tab,
            options,
        })
    }

    /// Load the page, wait out the render protocol, and return PNG bytes.
    pub fn capture(&self, html: &str) -> Result<Vec<u8>> {
        self.load_html(html)?;
        self.wait_for_render_signal()?;
        // Fixed settle time so the entry animation finishes before capture.
        std::thread::sleep(Duration::from_millis(self.options.wait_ms));
        self.screenshot_png()
    }

    fn load_html(&self, html: &str) -> Result<()> {
        let data_url = format!("data:text/html;charset=utf-8,{}", urlencoding::encode(html));
        debug!("loading generated page ({} bytes of HTML)", html.len());
        self.tab
            .navigate_to(&data_url)
            .map_err(|e| Error::Load(format!("Navigation failed: {}", e)))?;
        self.tab
            .wait_until_navigated()
            .map_err(|e| Error::Load(format!("Wait for navigation failed: {}", e)))?;
        Ok(())
    }

    /// Poll until the page publishes its render signal or the timeout elapses.
    fn wait_for_render_signal(&self) -> Result<()> {
        let deadline = Instant::now() + Duration::from_millis(self.options.signal_timeout_ms);
        loop {
            let ready = self
                .tab
                .evaluate(RENDER_SIGNAL_EXPR, false)
                .ok()
                .and_then(|r| r.value)
                .and_then(|v| v.as_bool())
                .unwrap_or(false);
            if ready {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(Error::Timeout(self.options.signal_timeout_ms));
            }
            std::thread::sleep(SIGNAL_POLL_INTERVAL);
        }
    }

    fn screenshot_png(&self) -> Result<Vec<u8>> {
        let clip = if self.options.full_page {
            Some(self.document_viewport()?)
        } else {
            None
        };
        self.tab
            .capture_screenshot(Page::CaptureScreenshotFormatOption::Png, None, clip, true)
            .map_err(|e| Error::Capture(format!("Screenshot failed: {}", e)))
    }

    /// Clip covering the full scrollable document, for `full_page` captures.
    fn document_viewport(&self) -> Result<Page::Viewport> {
        let width = self.eval_number(
            "Math.max(document.body.scrollWidth, document.documentElement.scrollWidth, document.documentElement.clientWidth)",
        )?;
        let height = self.eval_number(
            "Math.max(document.body.scrollHeight, document.documentElement.scrollHeight, document.documentElement.clientHeight)",
        )?;
        Ok(Page::Viewport {
            x: 0.0,
            y: 0.0,
            width,
            height,
            scale: 1.0,
        })
    }

    fn eval_number(&self, expr: &str) -> Result<f64> {
        let result = self
            .tab
            .evaluate(expr, false)
            .map_err(|e| Error::Capture(format!("Evaluation failed: {}", e)))?;
        result
            .value
            .as_ref()
            .and_then(|v| v.as_f64())
            .ok_or_else(|| Error::Capture(format!("Expected a number from: {}", expr)))
    }

    /// Tear the session down.
    pub fn close(self) -> Result<()> {
        // Drop tab and browser explicitly so the child process terminates
        // promptly.
        drop(self.tab);
        drop(self.browser);
        Ok(())
    }
}
