//! Locate command handler

use crate::config::CliConfig;
use crate::error::{CliError, CliResult};
use crate::LocateArgs;
use grabar::{Document, GrabarConfig, GrabarError, Locator, LocatorSynthesizer, NodeId};

/// Element matched by a CSS query, or an XPath when `query` starts with `/`
pub fn find_target(doc: &Document, query: &str) -> CliResult<NodeId> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::invalid_argument("empty element query"));
    }
    let found = if query.starts_with('/') {
        doc.resolve_xpath(query)?
    } else {
        doc.query_selector(query)?
    };
    found.ok_or_else(|| {
        GrabarError::ElementNotFound {
            selector: query.to_string(),
        }
        .into()
    })
}

/// Synthesize the locator for the element `query` selects in `html`
pub fn locate(html: &str, query: &str, settings: &GrabarConfig) -> CliResult<(Document, Locator)> {
    let doc = Document::parse(html)?;
    let node = find_target(&doc, query)?;
    let locator = LocatorSynthesizer::new(settings.locator.clone()).synthesize(&doc, node)?;
    Ok((doc, locator))
}

/// Execute the locate command
pub fn execute_locate(config: &CliConfig, settings: &GrabarConfig, args: &LocateArgs) -> CliResult<()> {
    let html = std::fs::read_to_string(&args.html)?;
    let (doc, locator) = locate(&html, &args.query, settings)?;
    println!("{locator}");

    if args.check {
        let reporter = config.reporter();
        match locator.resolve(&doc)?.len() {
            1 => reporter.success("locator resolves to exactly one element"),
            0 => reporter.failure("locator matches nothing"),
            n => reporter.warning(&format!("locator matches {n} elements")),
        }
    }
    Ok(())
}
