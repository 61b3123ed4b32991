//! Inventory page shown after a successful login

use sauceqa_common::{Config, TestLogger};
use std::path::Path;

use super::BasePage;
use crate::driver::BrowserDriver;
use crate::error::E2eResult;
use crate::interactor::ElementInteractor;
use crate::locator::Locator;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryLocators {
    pub inventory_list: Locator,
    pub inventory_item: Locator,
}

impl Default for InventoryLocators {
    fn default() -> Self {
        Self {
            inventory_list: Locator::class_name("inventory_list"),
            inventory_item: Locator::class_name("inventory_item"),
        }
    }
}

/// Product listing shown after a successful login
pub struct InventoryPage<D> {
    base: BasePage<D>,
    pub locators: InventoryLocators,
}

impl<D: BrowserDriver> InventoryPage<D> {
    /// Bind to the page the session is already on
    pub fn attach(driver: D, config: &Config) -> Self {
        Self {
            base: BasePage::new(driver, "InventoryPage", config),
            locators: InventoryLocators::default(),
        }
    }

    pub async fn is_loaded(&self) -> bool {
        self.is_element_visible(&self.locators.inventory_list, self.base.implicit_wait())
            .await
    }

    /// Products listed on the page
    pub async fn product_count(&self) -> E2eResult<usize> {
        let items = self
            .find_elements(&self.locators.inventory_item, self.base.implicit_wait())
            .await?;
        self.logger()
            .log_info(format!("Found {} products on inventory page", items.len()));
        Ok(items.len())
    }
}

impl<D: BrowserDriver> ElementInteractor for InventoryPage<D> {
    type Driver = D;

    fn driver(&self) -> &D {
        self.base.driver()
    }

    fn logger(&self) -> &TestLogger {
        self.base.logger()
    }

    fn screenshot_dir(&self) -> &Path {
        self.base.screenshot_dir()
    }
}
