//! Known storefront themes and the theme-specific button override.

use crate::async_api::Page;
use crate::collector;
use crate::dom::ThemeDescriptor;
use crate::style::ButtonStyle;
use crate::Result;
use log::debug;

/// A storefront theme whose primary button can be located directly
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Theme {
    pub name: &'static str,
    pub schema_name: &'static str,
    pub store_id: u64,
    pub button_selector: &'static str,
}

/// Recognized themes. Earlier entries win when a descriptor matches several.
pub static THEMES: [Theme; 5] = [
    Theme {
        name: "Dawn",
        schema_name: "Dawn",
        store_id: 887,
        button_selector: "form[action*='/cart/add'] .product-form__submit",
    },
    Theme {
        name: "Refresh",
        schema_name: "Refresh",
        store_id: 1567,
        button_selector: ".product-form__buttons .product-form__submit",
    },
    Theme {
        name: "Sense",
        schema_name: "Sense",
        store_id: 1356,
        button_selector: "form[action*='/cart/add'] button[name='add']",
    },
    Theme {
        name: "Craft",
        schema_name: "Craft",
        store_id: 1368,
        button_selector: ".product-form__submit.button--full-width",
    },
    Theme {
        name: "Studio",
        schema_name: "Studio",
        store_id: 1431,
        button_selector: ".product-form__submit.button--primary",
    },
];

/// Find the first theme matching the descriptor by schema name or store id.
pub fn match_theme(descriptor: &ThemeDescriptor) -> Option<&'static Theme> {
    THEMES.iter().find(|t| {
        descriptor.schema_name.as_deref() == Some(t.schema_name)
            || descriptor.theme_store_id == Some(t.store_id)
    })
}

/// Resolve the theme override button for `page`, if the page runs a known
/// theme and its button selector matches an element. The element is not
/// checked for visibility.
pub async fn resolve(page: &Page) -> Result<Option<ButtonStyle>> {
    let descriptor = match page.theme_descriptor().await? {
        Some(d) => d,
        None => return Ok(None),
    };

    let theme = match match_theme(&descriptor) {
        Some(t) => t,
        None => {
            debug!("theme descriptor {:?} is not a known theme", descriptor);
            return Ok(None);
        }
    };

    let element = page.query_element_style(theme.button_selector).await?;
    if element.is_none() {
        debug!("theme {} detected but '{}' matched nothing", theme.name, theme.button_selector);
    }
    Ok(element.map(|el| collector::to_candidate(el).into_style()))
}
