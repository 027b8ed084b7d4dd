//! Python `selenium` target.

use super::{
    comment_text, describe, key_constant, millis_as_seconds, quote_literal, unsupported_action,
    Browser, EmitOptions, ScriptLanguage, ScriptTarget,
};
use crate::action::{ActionRecord, ActionType};
use crate::locator::LocatorKind;
use crate::result::{GrabarError, GrabarResult};

/// Emits a flat Python script
#[derive(Debug, Clone, Copy, Default)]
pub struct PythonTarget;

const IMPORTS: &str = "\
from selenium import webdriver
from selenium.webdriver.common.by import By
from selenium.webdriver.common.keys import Keys
from selenium.webdriver.support import expected_conditions as EC
from selenium.webdriver.support.ui import Select, WebDriverWait
import time
";

fn by(kind: LocatorKind) -> &'static str {
    match kind {
        LocatorKind::Id => "By.ID",
        LocatorKind::Css => "By.CSS_SELECTOR",
        LocatorKind::XPath => "By.XPATH",
        LocatorKind::Name => "By.NAME",
    }
}

const fn driver_class(browser: Browser) -> &'static str {
    match browser {
        Browser::Chrome => "Chrome",
        Browser::Firefox => "Firefox",
        Browser::Edge => "Edge",
    }
}

impl ScriptTarget for PythonTarget {
    fn language(&self) -> ScriptLanguage {
        ScriptLanguage::Python
    }

    fn comment(&self, text: &str) -> String {
        format!("# {}", comment_text(text))
    }

    fn preamble(&self, options: &EmitOptions, start_url: Option<&str>) -> String {
        let mut out = String::from(IMPORTS);
        out.push('\n');
        out.push_str(&format!("driver = webdriver.{}()\n", driver_class(options.browser)));
        if options.explicit_wait {
            out.push_str(&format!(
                "wait = WebDriverWait(driver, {})\n",
                options.wait_timeout_secs
            ));
        }
        if let Some(url) = start_url {
            out.push_str(&format!("driver.get({})\n", quote_literal(url)));
        }
        out
    }

    fn action_block(
        &self,
        step: usize,
        action: &ActionRecord,
        options: &EmitOptions,
    ) -> GrabarResult<String> {
        let locator = format!(
            "({}, {})",
            by(action.locator_kind),
            quote_literal(action.locator().strategy_value())
        );
        let value = quote_literal(action.value.as_deref().unwrap_or_default());

        let mut out = self.comment(&format!("Step {step}: {}", describe(action)));
        out.push('\n');

        if options.explicit_wait {
            let condition = if action.action_type == ActionType::Click {
                "element_to_be_clickable"
            } else {
                "presence_of_element_located"
            };
            out.push_str(&format!("element = wait.until(EC.{condition}({locator}))\n"));
        } else {
            out.push_str(&format!("element = driver.find_element(*{locator})\n"));
        }

        match action.action_type {
            ActionType::Click | ActionType::Change => out.push_str("element.click()\n"),
            ActionType::Input => {
                out.push_str("element.clear()\n");
                out.push_str(&format!("element.send_keys({value})\n"));
            }
            ActionType::Select => {
                out.push_str(&format!("Select(element).select_by_value({value})\n"));
            }
            ActionType::Keydown => {
                let key = action.value.as_deref().unwrap_or_default();
                let constant = key_constant(key)
                    .ok_or_else(|| GrabarError::generation(format!("unsupported key '{key}'")))?;
                out.push_str(&format!("element.send_keys(Keys.{constant})\n"));
            }
            ActionType::Navigate => return Err(unsupported_action(action)),
        }

        if options.action_delay_ms > 0 {
            out.push_str(&format!(
                "time.sleep({})\n",
                millis_as_seconds(options.action_delay_ms)
            ));
        }
        Ok(out)
    }

    fn teardown(&self, _options: &EmitOptions) -> String {
        "\ndriver.quit()\n".to_string()
    }
}
