//! Page objects
//!
//! Each page pairs a [`BasePage`] with a plain locator table and implements
//! [`ElementInteractor`](crate::interactor::ElementInteractor) by delegating to
//! it.

pub mod base;
pub mod inventory;
pub mod login;
pub mod password_reset;

pub use base::BasePage;
pub use inventory::{InventoryLocators, InventoryPage};
pub use login::{LoginLocators, LoginPage};
pub use password_reset::{PasswordResetLocators, PasswordResetPage};
