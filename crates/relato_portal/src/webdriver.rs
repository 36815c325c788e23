//! WebDriver implementation of the portal driver.
//!
//! Drives a Chrome session through chromedriver. Element waits use the
//! uniform per-condition timeout from the configuration; there are no fixed
//! sleeps between steps.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use thirtyfour::components::SelectElement;
use thirtyfour::prelude::*;
use thirtyfour::ChromeCapabilities;
use tokio::time::Instant;
use tracing::{debug, info};

use relato_core::{AppConfig, DateRange, PortalCredentials};

use crate::driver::{PortalConnector, PortalDriver};
use crate::error::{PortalError, PortalResult};

const LOGIN_URL: &str = "https://basic.controlservices.com.br/login";
const REPORT_URL: &str = "https://basic.controlservices.com.br/financeiro/relatorio";
const HOME_URL_FRAGMENT: &str = "/home";

const IDENTITY_FIELD: &str = "email";
const PASSWORD_FIELD: &str = "password";
const LOGIN_SUBMIT_XPATH: &str = "//button[@type='submit']";
const FINANCE_NAV_XPATH: &str = "//a[contains(@href, '/financeiro')]";

const MODEL_SELECT_NAME: &str = "tipoRelat";
const SELECT2_CONTAINER_CSS: &str = ".select2-container";
const SELECT2_SEARCH_CSS: &str = ".select2-search__field";
const START_DATE_FIELD: &str = "data_ini";
const END_DATE_FIELD: &str = "data_fim";
const REPORT_SUBMIT_XPATH: &str = "//button[contains(text(), 'BUSCAR')]";

const SET_VALUE_SCRIPT: &str = "arguments[0].value = arguments[1];";

const QUERY_POLL: Duration = Duration::from_millis(500);

/// XPath accepting only a selector option whose normalized text equals the
/// base name exactly. Substring matches (e.g. `BASE BAURU` against
/// `BASE BAURU VT`) do not satisfy the predicate.
fn base_option_xpath(name: &str) -> String {
    format!(
        "//li[contains(@class, 'select2-results__option') and normalize-space(text())=\"{}\"]",
        name
    )
}

/// Starts one Chrome session per `connect()` call.
pub struct WebDriverConnector {
    webdriver_url: String,
    download_dir: PathBuf,
    headless: bool,
    wait_timeout: Duration,
}

impl WebDriverConnector {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            download_dir: config.download_dir.clone(),
            headless: config.headless,
            wait_timeout: config.wait_timeout,
        }
    }

    fn capabilities(&self) -> PortalResult<ChromeCapabilities> {
        let mut caps = DesiredCapabilities::chrome();
        for arg in [
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "window-size=1920x1080",
            "start-maximized",
            "--lang=pt-BR",
        ] {
            caps.add_arg(arg)?;
        }
        if self.headless {
            caps.add_arg("--headless=new")?;
        }

        // Chrome wants an absolute path for the download directory.
        let download_dir = self
            .download_dir
            .canonicalize()
            .unwrap_or_else(|_| self.download_dir.clone());
        caps.add_experimental_option(
            "prefs",
            json!({
                "download.default_directory": download_dir.to_string_lossy(),
                "download.prompt_for_download": false,
                "download.directory_upgrade": true,
                "plugins.always_open_pdf_externally": true,
                "safebrowsing.enabled": true,
            }),
        )?;
        Ok(caps)
    }
}

#[async_trait]
impl PortalConnector for WebDriverConnector {
    async fn connect(&self) -> PortalResult<Box<dyn PortalDriver>> {
        info!(url = %self.webdriver_url, "Starting browser session");
        let caps = self.capabilities()?;
        let driver = WebDriver::new(&self.webdriver_url, caps)
            .await
            .map_err(|e| PortalError::Connect(e.to_string()))?;
        Ok(Box::new(WebDriverPortal {
            driver,
            wait_timeout: self.wait_timeout,
        }))
    }
}

/// One live Chrome session against the portal.
pub struct WebDriverPortal {
    driver: WebDriver,
    wait_timeout: Duration,
}

impl WebDriverPortal {
    /// Wait for an element to be present, within the uniform budget.
    async fn wait_for(&self, by: By) -> PortalResult<WebElement> {
        let elem = self
            .driver
            .query(by)
            .wait(self.wait_timeout, QUERY_POLL)
            .first()
            .await?;
        Ok(elem)
    }

    async fn wait_for_url_fragment(&self, fragment: &str) -> PortalResult<()> {
        let deadline = Instant::now() + self.wait_timeout;
        loop {
            let url = self.driver.current_url().await?;
            if url.as_str().contains(fragment) {
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(PortalError::WaitTimeout {
                    condition: format!("URL containing '{}'", fragment),
                    timeout_secs: self.wait_timeout.as_secs(),
                });
            }
            tokio::time::sleep(QUERY_POLL).await;
        }
    }

    async fn set_field_value(&self, field_name: &str, value: &str) -> PortalResult<()> {
        let field = self.driver.find(By::Name(field_name)).await?;
        self.driver
            .execute(SET_VALUE_SCRIPT, vec![field.to_json()?, json!(value)])
            .await?;
        Ok(())
    }
}

#[async_trait]
impl PortalDriver for WebDriverPortal {
    async fn open_login(&self) -> PortalResult<()> {
        info!("Opening the portal login page");
        self.driver.goto(LOGIN_URL).await?;
        self.wait_for(By::Name(IDENTITY_FIELD)).await?;
        Ok(())
    }

    async fn sign_in(&self, credentials: &PortalCredentials) -> PortalResult<()> {
        info!("Signing in");
        let email = self.wait_for(By::Name(IDENTITY_FIELD)).await?;
        email.send_keys(&credentials.email).await?;

        let password = self.driver.find(By::Name(PASSWORD_FIELD)).await?;
        password.send_keys(&credentials.password).await?;

        self.driver.find(By::XPath(LOGIN_SUBMIT_XPATH)).await?.click().await?;

        debug!("Waiting for the authenticated landing page");
        self.wait_for_url_fragment(HOME_URL_FRAGMENT).await?;
        self.wait_for(By::XPath(FINANCE_NAV_XPATH)).await?;
        Ok(())
    }

    async fn open_report_form(&self) -> PortalResult<()> {
        info!("Opening the report form");
        self.driver.goto(REPORT_URL).await?;
        Ok(())
    }

    async fn select_report_model(&self, label: &str) -> PortalResult<()> {
        debug!(label, "Selecting the report model");
        let elem = self.wait_for(By::Name(MODEL_SELECT_NAME)).await?;
        let select = SelectElement::new(&elem).await?;
        select.select_by_visible_text(label).await?;
        Ok(())
    }

    async fn select_base(&self, name: &str) -> PortalResult<()> {
        info!(base = name, "Selecting the base");

        let container = self.wait_for(By::Css(SELECT2_CONTAINER_CSS)).await?;
        container.click().await?;

        let search = self.wait_for(By::Css(SELECT2_SEARCH_CSS)).await?;
        search.send_keys(name).await?;

        // The option list is populated asynchronously while typing; wait for
        // the exact-text option, never a partial match.
        let xpath = base_option_xpath(name);
        let option = self.wait_for(By::XPath(&xpath)).await?;
        option.click().await?;
        Ok(())
    }

    async fn submit_dates(&self, range: &DateRange) -> PortalResult<()> {
        info!(
            start = %range.wire_start(),
            end = %range.wire_end(),
            "Filling the dates and submitting the form"
        );

        // Write straight into the inputs, bypassing the date-picker widget.
        self.set_field_value(START_DATE_FIELD, &range.wire_start()).await?;
        self.set_field_value(END_DATE_FIELD, &range.wire_end()).await?;

        self.driver.find(By::XPath(REPORT_SUBMIT_XPATH)).await?.click().await?;
        Ok(())
    }

    async fn close(self: Box<Self>) -> PortalResult<()> {
        debug!("Tearing down the browser session");
        self.driver.quit().await?;
        Ok(())
    }
}
