//! Print the table of contents of one article

use anyhow::Result;

use crate::context::ArticleView;
use crate::{Site, SiteContext};

/// Print the headings of article `id` as JSON
pub fn run(site: &Site, id: &str) -> Result<()> {
    let context = site.clone().load_context();
    println!("{}", headings_json(&context, id)?);
    Ok(())
}

fn headings_json(context: &SiteContext, id: &str) -> Result<String> {
    match context.article(Some(id)) {
        ArticleView::Found { toc, .. } => {
            Ok(serde_json::to_string_pretty(&toc.annotated.headings)?)
        }
        ArticleView::NotFound => anyhow::bail!("No article with id {:?}", id),
    }
}
