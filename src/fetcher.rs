use std::sync::Arc;
use std::thread;
use std::time::Duration;

use headless_chrome::{Browser, LaunchOptions, Tab};
use reqwest::blocking::Client;
use reqwest::redirect;
use tracing::{debug, info, warn};
use url::Url;

use crate::config::Settings;
use crate::error::Result;
use crate::parser::{COOKIE_ACCEPT, LOAD_MORE};

const MAX_REDIRECTS: usize = 10;

/// Source of page HTML for the pipeline.
pub trait Fetcher {
    /// Static HTML as served.
    fn get(&self, url: &Url) -> Result<String>;

    /// HTML after every "load more" click has been exhausted in a browser.
    fn get_rendered(&self, url: &Url) -> Result<String>;
}

pub struct HttpFetcher {
    client: Client,
    browser: BrowserOptions,
}

#[derive(Debug, Clone)]
pub struct BrowserOptions {
    pub headless: bool,
    pub user_agent: String,
    pub max_clicks: usize,
    pub click_delay: Duration,
}

impl HttpFetcher {
    pub fn new(settings: &Settings) -> Result<Self> {
        let redirect_policy = redirect::Policy::custom(|attempt| {
            if attempt.previous().len() > MAX_REDIRECTS {
                attempt.error(format!("Too many redirects (>{})", MAX_REDIRECTS))
            } else {
                attempt.follow()
            }
        });

        let client = Client::builder()
            .redirect(redirect_policy)
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(HttpFetcher {
            client,
            browser: BrowserOptions {
                headless: settings.headless,
                user_agent: settings.user_agent.clone(),
                max_clicks: settings.max_load_more,
                click_delay: settings.click_delay,
            },
        })
    }
}

impl Fetcher for HttpFetcher {
    fn get(&self, url: &Url) -> Result<String> {
        debug!(%url, "GET");
        let body = self
            .client
            .get(url.clone())
            .send()?
            .error_for_status()?
            .text()?;
        Ok(body)
    }

    fn get_rendered(&self, url: &Url) -> Result<String> {
        render_page(
            || ChromeSession::open(url, &self.browser),
            self.browser.max_clicks,
            self.browser.click_delay,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClickOutcome {
    Clicked,
    /// Control is gone, hidden or disabled.
    NotInteractable,
    /// Something else sits on top of the control.
    Intercepted,
}

/// A rendered page holding a "load more" control.
pub trait LoadMorePage {
    /// Returns whether a cookie banner was found and accepted.
    fn dismiss_cookies(&self) -> Result<bool>;
    fn click_load_more(&self) -> Result<ClickOutcome>;
    fn page_source(&self) -> Result<String>;
    /// Releases the page. Called exactly once, after the source has been read or the loop failed.
    fn close(&self);
}

/// Opens a page, loads every item, and closes the page on every path out.
pub fn render_page<P, O>(open: O, max_clicks: usize, delay: Duration) -> Result<String>
where
    P: LoadMorePage,
    O: FnOnce() -> Result<P>,
{
    let page = open()?;
    let loaded = load_all(&page, max_clicks, delay);
    page.close();
    loaded.map(|(html, _)| html)
}

/// Clicks "load more" until the page stops offering it, then returns the
/// final source and the number of successful clicks.
pub fn load_all<P: LoadMorePage>(
    page: &P,
    max_clicks: usize,
    delay: Duration,
) -> Result<(String, usize)> {
    if page.dismiss_cookies()? {
        debug!("cookie banner dismissed");
    }

    let mut clicks = 0;
    loop {
        if clicks >= max_clicks {
            warn!(clicks, "load more still clickable after cap, stopping");
            break;
        }
        match page.click_load_more()? {
            ClickOutcome::Clicked => {
                clicks += 1;
                debug!(clicks, "load more clicked");
                if !delay.is_zero() {
                    thread::sleep(delay);
                }
            }
            ClickOutcome::NotInteractable => {
                info!(clicks, "load more no longer interactable, all items loaded");
                break;
            }
            ClickOutcome::Intercepted => {
                info!(clicks, "load more click intercepted, treating page as loaded");
                break;
            }
        }
    }

    Ok((page.page_source()?, clicks))
}

const CLICK_SCRIPT: &str = r#"
(() => {
    const el = document.querySelector('__SELECTOR__');
    if (!el) return 'not_interactable';
    const style = window.getComputedStyle(el);
    if (style.display === 'none' || style.visibility === 'hidden' || el.disabled
        || el.classList.contains('disabled') || el.offsetParent === null) {
        return 'not_interactable';
    }
    el.scrollIntoView({ block: 'center' });
    const box = el.getBoundingClientRect();
    const top = document.elementFromPoint(box.left + box.width / 2, box.top + box.height / 2);
    if (top && top !== el && !el.contains(top)) return 'intercepted';
    el.click();
    return 'clicked';
})()
"#;

struct ChromeSession {
    _browser: Browser,
    tab: Arc<Tab>,
}

impl ChromeSession {
    fn open(url: &Url, options: &BrowserOptions) -> Result<Self> {
        let browser = Browser::new(LaunchOptions {
            headless: options.headless,
            window_size: Some((1920, 1080)),
            ..Default::default()
        })?;

        let tab = browser.new_tab()?;
        tab.set_user_agent(&options.user_agent, None, None)?;
        tab.navigate_to(url.as_str())?;
        tab.wait_until_navigated()?;
        info!(%url, "browser session opened");

        Ok(ChromeSession {
            _browser: browser,
            tab,
        })
    }

    fn run_click(&self, selector: &str) -> Result<String> {
        let script = CLICK_SCRIPT.replace("__SELECTOR__", selector);
        let result = self.tab.evaluate(&script, false)?;
        Ok(result
            .value
            .as_ref()
            .and_then(|v| v.as_str())
            .unwrap_or("not_interactable")
            .to_string())
    }
}

impl LoadMorePage for ChromeSession {
    fn dismiss_cookies(&self) -> Result<bool> {
        Ok(self.run_click(COOKIE_ACCEPT)? == "clicked")
    }

    fn click_load_more(&self) -> Result<ClickOutcome> {
        let outcome = match self.run_click(LOAD_MORE)?.as_str() {
            "clicked" => ClickOutcome::Clicked,
            "intercepted" => ClickOutcome::Intercepted,
            _ => ClickOutcome::NotInteractable,
        };
        Ok(outcome)
    }

    fn page_source(&self) -> Result<String> {
        Ok(self.tab.get_content()?)
    }

    fn close(&self) {
        if let Err(e) = self.tab.close(true) {
            warn!("failed to close browser tab: {:#}", e);
        }
        debug!("browser session closed");
    }
}
