//! Page state shared by every page object

use sauceqa_common::{get_logger, Config, TestLogger};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::driver::BrowserDriver;
use crate::interactor::ElementInteractor;

/// A driver bound to a logger and the framework's wait settings
#[derive(Debug, Clone)]
pub struct BasePage<D> {
    driver: D,
    logger: TestLogger,
    screenshot_dir: PathBuf,
    implicit_wait: Duration,
    explicit_wait: Duration,
}

impl<D: BrowserDriver> BasePage<D> {
    /// `name` is the logger prefix, usually the page type
    pub fn new(driver: D, name: &str, config: &Config) -> Self {
        Self {
            driver,
            logger: get_logger(name),
            screenshot_dir: config.paths().reports_dir,
            implicit_wait: config.implicit_wait(),
            explicit_wait: config.explicit_wait(),
        }
    }

    /// Default timeout for direct lookups
    pub fn implicit_wait(&self) -> Duration {
        self.implicit_wait
    }

    /// Default timeout for page-object interactions
    pub fn explicit_wait(&self) -> Duration {
        self.explicit_wait
    }

    pub fn into_driver(self) -> D {
        self.driver
    }
}

impl<D: BrowserDriver> ElementInteractor for BasePage<D> {
    type Driver = D;

    fn driver(&self) -> &D {
        &self.driver
    }

    fn logger(&self) -> &TestLogger {
        &self.logger
    }

    fn screenshot_dir(&self) -> &Path {
        &self.screenshot_dir
    }
}
