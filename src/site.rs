//! Everything that touches the driven browser: login, the gift popup, the
//! balance readout. Selectors are tied to one external page and are expected
//! to break whenever the site ships new markup.

use std::time::Duration;

use async_trait::async_trait;
use backoff::backoff::Backoff;
use backoff::ExponentialBackoff;
use thirtyfour::error::WebDriverError;
use thirtyfour::prelude::*;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::driver::make_driver;
use crate::error::{session_gone, webdriver_err, SiteError};
use crate::models::RewardProbe;

pub const LOGIN_URL: &str = "https://www.packetshare.io/login/";

mod selectors {
    pub const EMAIL_INPUT: &str = r#"input[placeholder="Please enter the email"]"#;
    pub const PASSWORD_INPUT: &str = r#"input[placeholder="Please enter password"]"#;
    pub const LOGIN_BUTTON: &str = "div.btn.login";
    pub const BALANCE: &str = "div.money span";
    pub const GIFT_ICON: &str = "#__nuxt > div.ucenter-header > div.header > div > div.flow-box > img";
    pub const GIFT_ICON_LOOSE: &str = "div.flow-box > img";
    pub const CLAIM_BUTTON: &str = "body > div.dialog-flow-box > div > div.button";
    pub const POPUP_CLOSE: &str = "body > div.dialog-flow-box > div > img.close-button";
}

// One atomic read of the popup instead of racing individual lookups.
const POPUP_SNAPSHOT_JS: &str = r#"
    function text(el){ return el ? (el.textContent||'').trim() : null; }
    const res = { countdown_text: null, claim_available: false };
    res.countdown_text = text(document.querySelector('div.time'));
    if (document.querySelector('body > div.dialog-flow-box > div > div.button')) {
        res.claim_available = true;
    }
    return res;
"#;

const NAV_ATTEMPTS: u32 = 3;
const POLL: Duration = Duration::from_millis(500);
const LOGIN_FIELD_WAIT: Duration = Duration::from_secs(10);
const LOGIN_SETTLE: Duration = Duration::from_secs(5);
const GIFT_WAIT: Duration = Duration::from_secs(10);
const POPUP_SETTLE: Duration = Duration::from_secs(3);
const POPUP_WAIT: Duration = Duration::from_secs(5);
const CLAIM_SETTLE: Duration = Duration::from_secs(5);
const BALANCE_WAIT: Duration = Duration::from_secs(15);
const RELOAD_SETTLE: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// The browser-facing collaborator the scheduler drives. Split out as a trait
/// so the run loop can be exercised against a scripted fake.
#[async_trait]
pub trait SiteClient: Send {
    async fn authenticate(&mut self) -> Result<(), SiteError>;
    async fn probe_reward_state(&mut self) -> Result<RewardProbe, SiteError>;
    async fn attempt_claim(&mut self) -> Result<bool, SiteError>;
    async fn read_balance(&mut self) -> Result<String, SiteError>;
    async fn refresh(&mut self) -> Result<(), SiteError>;
    async fn close(&mut self);
}

pub struct PacketShare {
    creds: Credentials,
    headless: bool,
    webdriver_url: String,
    driver: Option<WebDriver>,
}

impl PacketShare {
    pub fn new(creds: Credentials, headless: bool, webdriver_url: impl Into<String>) -> Self {
        Self {
            creds,
            headless,
            webdriver_url: webdriver_url.into(),
            driver: None,
        }
    }

    async fn ensure_driver(&mut self) -> Result<(), SiteError> {
        if self.driver.is_none() {
            info!("launching browser session");
            let drv = make_driver(self.headless, &self.webdriver_url)
                .await
                .map_err(webdriver_err)?;
            self.driver = Some(drv);
        }
        Ok(())
    }

    fn session(&self) -> Result<&WebDriver, SiteError> {
        self.driver
            .as_ref()
            .ok_or_else(|| SiteError::SessionLost("no active browser session".into()))
    }

    async fn open_gift_popup(&self) -> Result<(), SiteError> {
        let drv = self.session()?;
        let icon = drv
            .query(By::Css(selectors::GIFT_ICON))
            .or(By::Css(selectors::GIFT_ICON_LOOSE))
            .wait(GIFT_WAIT, POLL)
            .first()
            .await
            .map_err(|e| not_found_or(e, selectors::GIFT_ICON))?;
        icon.click().await.map_err(webdriver_err)?;
        sleep(POPUP_SETTLE).await;
        Ok(())
    }

    async fn snapshot_popup(&self) -> Result<RewardProbe, SiteError> {
        let drv = self.session()?;
        let probe: RewardProbe = drv
            .execute(POPUP_SNAPSHOT_JS, vec![])
            .await
            .map_err(webdriver_err)?
            .convert()
            .map_err(webdriver_err)?;
        Ok(probe)
    }

    /// Best effort: the close button is not always rendered.
    async fn dismiss_popup(&self) {
        if let Ok(drv) = self.session() {
            if let Ok(el) = drv
                .query(By::Css(selectors::POPUP_CLOSE))
                .wait(POPUP_SETTLE, POLL)
                .first()
                .await
            {
                let _ = el.click().await;
            }
        }
    }
}

#[async_trait]
impl SiteClient for PacketShare {
    async fn authenticate(&mut self) -> Result<(), SiteError> {
        self.ensure_driver().await?;
        let drv = self.session()?;

        info!("opening login page");
        goto_with_retry(drv, LOGIN_URL).await?;

        let email = drv
            .query(By::Css(selectors::EMAIL_INPUT))
            .wait(LOGIN_FIELD_WAIT, POLL)
            .first()
            .await
            .map_err(|e| not_found_or(e, selectors::EMAIL_INPUT))?;
        let password = drv
            .query(By::Css(selectors::PASSWORD_INPUT))
            .wait(LOGIN_FIELD_WAIT, POLL)
            .first()
            .await
            .map_err(|e| not_found_or(e, selectors::PASSWORD_INPUT))?;
        let button = drv
            .query(By::Css(selectors::LOGIN_BUTTON))
            .wait(LOGIN_FIELD_WAIT, POLL)
            .first()
            .await
            .map_err(|e| not_found_or(e, selectors::LOGIN_BUTTON))?;

        email
            .send_keys(self.creds.email.as_str())
            .await
            .map_err(webdriver_err)?;
        password
            .send_keys(self.creds.password.as_str())
            .await
            .map_err(webdriver_err)?;
        button.click().await.map_err(webdriver_err)?;
        sleep(LOGIN_SETTLE).await;

        let url = drv.current_url().await.map_err(webdriver_err)?;
        if !url.as_str().contains("/dashboard") {
            return Err(SiteError::Authentication(format!(
                "landed on {url} instead of the dashboard"
            )));
        }
        info!("login ok, dashboard reached");
        Ok(())
    }

    async fn probe_reward_state(&mut self) -> Result<RewardProbe, SiteError> {
        self.open_gift_popup().await?;
        let probe = self.snapshot_popup().await?;
        debug!(
            "popup probe: claim_available={} countdown={:?}",
            probe.claim_available, probe.countdown_text
        );
        if !probe.claim_available {
            // leave the popup open when a claim is pending, attempt_claim needs it
            self.dismiss_popup().await;
        }
        Ok(probe)
    }

    async fn attempt_claim(&mut self) -> Result<bool, SiteError> {
        let drv = self.session()?;
        let button = match drv
            .query(By::Css(selectors::CLAIM_BUTTON))
            .wait(POPUP_WAIT, POLL)
            .first()
            .await
        {
            Ok(b) => b,
            Err(e) if session_gone(&e) => return Err(SiteError::SessionLost(e.to_string())),
            Err(_) => {
                // popup got dismissed between probe and claim, reopen it
                self.open_gift_popup().await?;
                let drv = self.session()?;
                drv.query(By::Css(selectors::CLAIM_BUTTON))
                    .wait(POPUP_WAIT, POLL)
                    .first()
                    .await
                    .map_err(|e| not_found_or(e, selectors::CLAIM_BUTTON))?
            }
        };
        button.click().await.map_err(webdriver_err)?;
        sleep(CLAIM_SETTLE).await;

        // the control disappearing is the only confirmation the popup offers
        let drv = self.session()?;
        let still_there = drv
            .query(By::Css(selectors::CLAIM_BUTTON))
            .nowait()
            .exists()
            .await
            .map_err(webdriver_err)?;
        Ok(!still_there)
    }

    async fn read_balance(&mut self) -> Result<String, SiteError> {
        let drv = self.session()?;
        match drv
            .query(By::Css(selectors::BALANCE))
            .wait(BALANCE_WAIT, POLL)
            .first()
            .await
        {
            Ok(el) => el.text().await.map_err(webdriver_err),
            Err(e) if session_gone(&e) => Err(SiteError::SessionLost(e.to_string())),
            Err(_) => {
                // markup drift fallback: pull the text straight out of the DOM
                let text: Option<String> = drv
                    .execute(
                        "return (document.querySelector('div.money span')||{}).textContent;",
                        vec![],
                    )
                    .await
                    .map_err(webdriver_err)?
                    .convert()
                    .map_err(webdriver_err)?;
                text.map(|s| s.trim().to_string())
                    .ok_or_else(|| SiteError::ElementNotFound(selectors::BALANCE.into()))
            }
        }
    }

    async fn refresh(&mut self) -> Result<(), SiteError> {
        let drv = self.session()?;
        drv.refresh().await.map_err(webdriver_err)?;
        sleep(RELOAD_SETTLE).await;
        Ok(())
    }

    async fn close(&mut self) {
        if let Some(drv) = self.driver.take() {
            if let Err(e) = drv.quit().await {
                warn!("error closing browser: {e}");
            }
        }
    }
}

fn not_found_or(e: WebDriverError, what: &str) -> SiteError {
    if session_gone(&e) {
        SiteError::SessionLost(e.to_string())
    } else {
        SiteError::ElementNotFound(format!("{what}: {e}"))
    }
}

async fn goto_with_retry(drv: &WebDriver, url: &str) -> Result<(), SiteError> {
    let mut eb = ExponentialBackoff {
        current_interval: Duration::from_millis(800),
        initial_interval: Duration::from_millis(800),
        max_interval: Duration::from_secs(5),
        max_elapsed_time: Some(Duration::from_secs(15)),
        ..ExponentialBackoff::default()
    };
    let mut attempt = 0;
    loop {
        match drv.goto(url).await {
            Ok(()) => {
                if attempt > 0 {
                    debug!("recovered {url} after {attempt} retries");
                }
                return Ok(());
            }
            Err(e) if session_gone(&e) => return Err(SiteError::SessionLost(e.to_string())),
            Err(e) => {
                attempt += 1;
                if attempt >= NAV_ATTEMPTS {
                    return Err(SiteError::WebDriver(e));
                }
                let nap = eb.next_backoff().unwrap_or(Duration::from_millis(1200));
                warn!(
                    "goto {url} failed (attempt {attempt}/{NAV_ATTEMPTS}): {e}; retrying in {}ms",
                    nap.as_millis()
                );
                sleep(nap).await;
            }
        }
    }
}
