//! Node `selenium-webdriver` target.

use super::{
    comment_text, describe, key_constant, quote_literal, unsupported_action, Browser,
    EmitOptions, ScriptLanguage, ScriptTarget,
};
use crate::action::{ActionRecord, ActionType};
use crate::dom::selector::quote_value;
use crate::locator::LocatorKind;
use crate::result::{GrabarError, GrabarResult};

/// Emits an async IIFE with try/finally teardown
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaScriptTarget;

const INDENT: &str = "    ";

fn by(kind: LocatorKind) -> &'static str {
    match kind {
        LocatorKind::Id => "By.id",
        LocatorKind::Css => "By.css",
        LocatorKind::XPath => "By.xpath",
        LocatorKind::Name => "By.name",
    }
}

const fn browser_name(browser: Browser) -> &'static str {
    match browser {
        Browser::Chrome => "chrome",
        Browser::Firefox => "firefox",
        Browser::Edge => "MicrosoftEdge",
    }
}

impl ScriptTarget for JavaScriptTarget {
    fn language(&self) -> ScriptLanguage {
        ScriptLanguage::JavaScript
    }

    fn comment(&self, text: &str) -> String {
        format!("{INDENT}// {}", comment_text(text))
    }

    fn preamble(&self, options: &EmitOptions, start_url: Option<&str>) -> String {
        let mut out = String::from(
            "const { Builder, By, Key, until } = require(\"selenium-webdriver\");\n\n",
        );
        out.push_str("(async function recorded() {\n");
        out.push_str(&format!(
            "  const driver = await new Builder().forBrowser({}).build();\n",
            quote_literal(browser_name(options.browser))
        ));
        out.push_str("  try {\n");
        if let Some(url) = start_url {
            out.push_str(&format!("{INDENT}await driver.get({});\n", quote_literal(url)));
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
            "{}({})",
            by(action.locator_kind),
            quote_literal(action.locator().strategy_value())
        );
        let value = action.value.as_deref().unwrap_or_default();
        let inner = format!("{INDENT}  ");

        let mut out = self.comment(&format!("Step {step}: {}", describe(action)));
        out.push('\n');
        out.push_str(&format!("{INDENT}{{\n"));

        if options.explicit_wait {
            let timeout_ms = options.wait_timeout_secs.saturating_mul(1000);
            out.push_str(&format!(
                "{inner}const element = await driver.wait(until.elementLocated({locator}), {timeout_ms});\n"
            ));
            out.push_str(&format!(
                "{inner}await driver.wait(until.elementIsVisible(element), {timeout_ms});\n"
            ));
        } else {
            out.push_str(&format!(
                "{inner}const element = await driver.findElement({locator});\n"
            ));
        }

        match action.action_type {
            ActionType::Click | ActionType::Change => {
                out.push_str(&format!("{inner}await element.click();\n"));
            }
            ActionType::Input => {
                out.push_str(&format!("{inner}await element.clear();\n"));
                out.push_str(&format!(
                    "{inner}await element.sendKeys({});\n",
                    quote_literal(value)
                ));
            }
            ActionType::Select => {
                let option = format!("option[value={}]", quote_value(value));
                out.push_str(&format!(
                    "{inner}await element.findElement(By.css({})).click();\n",
                    quote_literal(&option)
                ));
            }
            ActionType::Keydown => {
                let constant = key_constant(value)
                    .ok_or_else(|| GrabarError::generation(format!("unsupported key '{value}'")))?;
                out.push_str(&format!("{inner}await element.sendKeys(Key.{constant});\n"));
            }
            ActionType::Navigate => return Err(unsupported_action(action)),
        }

        out.push_str(&format!("{INDENT}}}\n"));
        if options.action_delay_ms > 0 {
            out.push_str(&format!(
                "{INDENT}await driver.sleep({});\n",
                options.action_delay_ms
            ));
        }
        Ok(out)
    }

    fn teardown(&self, _options: &EmitOptions) -> String {
        "  } finally {\n    await driver.quit();\n  }\n})();\n".to_string()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::locator::Locator;
    use crate::script::ScriptEmitter;
    use pretty_assertions::assert_eq;

    fn options() -> EmitOptions {
        EmitOptions::default()
            .with_target(ScriptLanguage::JavaScript)
            .with_header(false)
    }

    #[test]
    fn test_full_script() {
        let actions = vec![
            ActionRecord::navigate("https://example.com/form"),
            ActionRecord::click(Locator::id("submit")),
        ];
        let opts = options().with_explicit_wait(false);
        let script = ScriptEmitter::new(opts).emit(&actions).unwrap();
        let expected = "\
const { Builder, By, Key, until } = require(\"selenium-webdriver\");

(async function recorded() {
  const driver = await new Builder().forBrowser(\"chrome\").build();
  try {
    await driver.get(\"https://example.com/form\");

    // Step 1: click ID=#submit
    {
      const element = await driver.findElement(By.id(\"submit\"));
      await element.click();
    }
    await driver.sleep(500);
  } finally {
    await driver.quit();
  }
})();
";
        assert_eq!(script.text, expected);
    }

    #[test]
    fn test_explicit_wait_uses_millis() {
        let block = JavaScriptTarget
            .action_block(1, &ActionRecord::click(Locator::xpath("/html[1]/body[1]")), &options())
            .unwrap();
        assert!(block.contains("until.elementLocated(By.xpath(\"/html[1]/body[1]\")), 10000)"));
        assert!(block.contains("until.elementIsVisible(element), 10000)"));
    }

    #[test]
    fn test_select_picks_option_by_value() {
        let select = ActionRecord::new(ActionType::Select, Locator::name("plan")).with_value("pro");
        let block = JavaScriptTarget.action_block(1, &select, &options()).unwrap();
        assert!(block.contains(r#"By.css("option[value=\"pro\"]")"#));
    }

    #[test]
    fn test_keydown() {
        let key = ActionRecord::new(ActionType::Keydown, Locator::id("q")).with_value("Tab");
        let block = JavaScriptTarget.action_block(1, &key, &options()).unwrap();
        assert!(block.contains("await element.sendKeys(Key.TAB);"));
    }

    #[test]
    fn test_edge_browser_name() {
        let pre = JavaScriptTarget.preamble(&options().with_browser(Browser::Edge), None);
        assert!(pre.contains("forBrowser(\"MicrosoftEdge\")"));
    }

    #[test]
    fn test_later_navigate_comment_indented() {
        let actions = vec![
            ActionRecord::navigate("https://a.example"),
            ActionRecord::navigate("https://b.example"),
        ];
        let script = ScriptEmitter::new(options()).emit(&actions).unwrap();
        assert!(script.text.contains("\n    // navigated to https://b.example\n"));
        assert_eq!(script.block_count, 0);
    }
}
