//! Generator module - renders the site with the built-in Tera templates

use anyhow::Result;
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use tera::Context;
use walkdir::WalkDir;

use crate::content::{Post, Update};
use crate::context::{ArticleView, SiteContext};
use crate::helpers::{
    article_page_url, article_url, deep_link_url, full_url_for, html_escape,
    is_safe_path_segment, summarize, ARTICLE_PAGE,
};
use crate::templates::{
    ArticleData, ConfigData, ModalData, PostCardData, TemplateRenderer, ThemeData, UpdateData,
};
use crate::view::ModalState;

/// Top-level names a deep-link slug must not shadow
const RESERVED_PATHS: &[&str] = &["article", ARTICLE_PAGE, "index.html"];

/// Static site generator using Tera templates
pub struct Generator {
    renderer: TemplateRenderer,
}

impl Generator {
    /// Create a new generator
    pub fn new() -> Result<Self> {
        Ok(Self {
            renderer: TemplateRenderer::new()?,
        })
    }

    /// Generate the entire site
    pub fn generate(&self, ctx: &SiteContext) -> Result<()> {
        let public_dir = &ctx.site.public_dir;
        fs::create_dir_all(public_dir)?;

        // Copy source assets (images, etc.)
        self.copy_source_assets(ctx)?;

        // Home feed
        let html = self.render_home(ctx, &ModalState::default())?;
        write_page(&public_dir.join("index.html"), &html)?;

        // Article pages, plus the query-string entry point
        self.generate_article_pages(ctx)?;

        // Deep links open the post's modal over the home feed
        self.generate_deep_links(ctx)?;

        tracing::info!(
            "Generated home, {} articles into {:?}",
            ctx.posts().len(),
            public_dir
        );

        Ok(())
    }

    /// Render the home feed with the given modal state
    pub fn render_home(&self, ctx: &SiteContext, modal: &ModalState) -> Result<String> {
        self.render_feed(ctx, modal, "/")
    }

    fn render_feed(&self, ctx: &SiteContext, modal: &ModalState, path: &str) -> Result<String> {
        let (latest, logs) = ctx.featured();
        let latest: Vec<PostCardData> = latest.iter().map(|p| post_card(ctx, p)).collect();
        let logs: Vec<PostCardData> = logs.iter().map(|p| post_card(ctx, p)).collect();
        let preview: Vec<UpdateData> = ctx
            .preview_updates()
            .iter()
            .map(|u| update_data(ctx, u))
            .collect();

        let mut context = self.create_base_context(ctx, modal, path);
        context.insert("page_title", &html_escape(&ctx.config().title));
        context.insert("page_description", &html_escape(&ctx.config().description));
        context.insert("latest_stories", &latest);
        context.insert("featured_logs", &logs);
        context.insert("preview_updates", &preview);
        context.insert("has_more_updates", &ctx.has_more_updates());

        self.renderer.render("index.html", &context)
    }

    /// Render the article view for `?id=`; unknown ids render "not found"
    pub fn render_article(&self, ctx: &SiteContext, id: Option<&str>) -> Result<String> {
        let path = match id {
            Some(id) if ctx.find_post(id).is_some() && is_safe_path_segment(id) => {
                format!("article/{}/", id)
            }
            _ => ARTICLE_PAGE.to_string(),
        };
        let mut context = self.create_base_context(ctx, &ModalState::default(), &path);
        let site_title = &ctx.config().title;

        match ctx.article(id) {
            ArticleView::Found { post, toc } => {
                let article = ArticleData {
                    id: post.id.clone(),
                    title: post.title.clone(),
                    tag: post.tag.clone(),
                    date: post.date.clone(),
                    image: post.image.clone(),
                    toc: toc.index_html(),
                    has_toc: !toc.is_empty(),
                    toc_ids: toc.entries.iter().map(|e| e.id.clone()).collect(),
                    toc_root_margin: ctx.config().toc.band().root_margin(),
                    content: toc.annotated.html,
                };
                context.insert(
                    "page_title",
                    &html_escape(&format!("{} - {}", post.title, site_title)),
                );
                context.insert(
                    "page_description",
                    &html_escape(&summarize(&article.content, 160)),
                );
                context.insert("article", &Some(article));
            }
            ArticleView::NotFound => {
                if let Some(id) = id {
                    tracing::debug!("Article {:?} not found", id);
                }
                context.insert(
                    "page_title",
                    &html_escape(&format!("Article not found - {}", site_title)),
                );
                context.insert("page_description", "");
                context.insert("article", &None::<ArticleData>);
            }
        }

        // Ids with a pre-rendered page under `article/`
        let known_ids: Vec<&str> = ctx
            .posts()
            .iter()
            .map(|p| p.id.as_str())
            .filter(|id| is_safe_path_segment(id))
            .collect();
        context.insert("known_ids", &known_ids);

        self.renderer.render("article.html", &context)
    }

    /// Render the home feed with a post's preview modal open
    pub fn render_deep_link(&self, ctx: &SiteContext, post: &Post) -> Result<String> {
        let mut modal = ModalState::default();
        modal.open_post(&post.id, ctx.posts());
        self.render_feed(ctx, &modal, &format!("{}/", post.slug()))
    }

    /// Create a base context with common variables
    fn create_base_context(&self, ctx: &SiteContext, modal: &ModalState, path: &str) -> Context {
        let config = ctx.config();
        let mut context = Context::new();
        context.insert("page_url", &full_url_for(config, path));

        context.insert(
            "config",
            &ConfigData {
                title: html_escape(&config.title),
                description: html_escape(&config.description),
                author: html_escape(&config.author),
                language: config.language.clone(),
                root: config.root.clone(),
            },
        );
        context.insert(
            "theme",
            &ThemeData {
                html_class: config.theme.html_class().to_string(),
                icon_class: config.theme.icon_class().to_string(),
            },
        );

        let all_updates: Vec<UpdateData> =
            ctx.updates().iter().map(|u| update_data(ctx, u)).collect();
        context.insert("all_updates", &all_updates);
        context.insert("modal", &modal_data(ctx, modal));
        context.insert("current_year", &chrono::Local::now().format("%Y").to_string());
        context
    }

    /// Generate `article/<id>/` for every post and the `article.html` fallback
    fn generate_article_pages(&self, ctx: &SiteContext) -> Result<()> {
        let public_dir = &ctx.site.public_dir;

        for post in ctx.posts() {
            if !is_safe_path_segment(&post.id) {
                tracing::warn!(
                    "Skipping article page for {:?}: id is not a plain path segment",
                    post.id
                );
                continue;
            }
            let html = self.render_article(ctx, Some(&post.id))?;
            let output_path = public_dir.join("article").join(&post.id).join("index.html");
            write_page(&output_path, &html)?;
        }

        let html = self.render_article(ctx, None)?;
        write_page(&public_dir.join(ARTICLE_PAGE), &html)?;

        Ok(())
    }

    /// Generate `<slug>/index.html` deep-link pages
    fn generate_deep_links(&self, ctx: &SiteContext) -> Result<()> {
        let mut seen = HashSet::new();

        for post in ctx.posts_in_data_order() {
            let slug = post.slug();
            if slug.is_empty() || RESERVED_PATHS.contains(&slug.as_str()) {
                tracing::warn!("Skipping deep link for {:?}: unusable slug {:?}", post.id, slug);
                continue;
            }
            if !seen.insert(slug.clone()) {
                tracing::warn!("Duplicate deep link {:?}, keeping the first listed post", slug);
                continue;
            }

            let html = self.render_deep_link(ctx, post)?;
            write_page(&ctx.site.public_dir.join(&slug).join("index.html"), &html)?;
        }

        Ok(())
    }

    /// Copy source assets (images, etc.) to public directory
    fn copy_source_assets(&self, ctx: &SiteContext) -> Result<()> {
        let source_dir = &ctx.site.source_dir;
        if !source_dir.exists() {
            return Ok(());
        }

        for entry in WalkDir::new(source_dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
        {
            let path = entry.path();
            if path.is_file() {
                let relative = path.strip_prefix(source_dir)?;
                let dest = ctx.site.public_dir.join(relative);

                if let Some(parent) = dest.parent() {
                    fs::create_dir_all(parent)?;
                }

                fs::copy(path, &dest)?;
            }
        }

        Ok(())
    }
}

fn write_page(output_path: &Path, html: &str) -> Result<()> {
    if let Some(parent) = output_path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| anyhow::anyhow!("Failed to create dir {:?}: {}", parent, e))?;
    }
    fs::write(output_path, html)
        .map_err(|e| anyhow::anyhow!("Failed to write {:?}: {}", output_path, e))?;
    tracing::debug!("Generated: {:?}", output_path);
    Ok(())
}

fn post_card(ctx: &SiteContext, post: &Post) -> PostCardData {
    let config = ctx.config();
    // Unsafe ids get no pre-rendered page
    let page_url = if is_safe_path_segment(&post.id) {
        article_page_url(config, &post.id)
    } else {
        article_url(config, &post.id)
    };
    let style = match post.style {
        crate::content::PostStyle::Image => "image",
        crate::content::PostStyle::Default => "default",
    };

    PostCardData {
        id: post.id.clone(),
        title: post.title.clone(),
        date: post.date.clone(),
        tag: post.tag.clone(),
        tag_color: config.tag_color(&post.tag).to_string(),
        category: post
            .category
            .clone()
            .unwrap_or_else(|| config.default_category.clone()),
        style: style.to_string(),
        link: if post.link.is_empty() {
            page_url.clone()
        } else {
            post.link.clone()
        },
        image: post.image.clone(),
        article_url: page_url,
        deep_link: deep_link_url(config, &post.title),
    }
}

fn update_data(ctx: &SiteContext, update: &Update) -> UpdateData {
    UpdateData {
        id: update.id.clone(),
        title: update.title.clone(),
        content: update.content.clone(),
        full_content: update.full_content.clone(),
        date: update.date.clone(),
        tag: update.tag.clone(),
        tag_color: update
            .tag_color
            .clone()
            .unwrap_or_else(|| ctx.config().default_tag_color.clone()),
        image: update.image.clone(),
    }
}

fn modal_data(ctx: &SiteContext, modal: &ModalState) -> ModalData {
    ModalData {
        overlay_hidden: !modal.is_open(),
        body_overflow: modal.body_overflow().to_string(),
        open_static: modal.active_static().unwrap_or_default().to_string(),
        open_update: modal.active_update().unwrap_or_default().to_string(),
        post: modal
            .active_post()
            .and_then(|id| ctx.find_post(id))
            .map(|p| post_card(ctx, p)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::ContentSet;
    use crate::context::tests::{post, sample_context, update};
    use tempfile::TempDir;

    fn context_in(dir: &Path, mut ctx: SiteContext) -> SiteContext {
        ctx.site.base_dir = dir.to_path_buf();
        ctx.site.source_dir = dir.join("source");
        ctx.site.public_dir = dir.join("public");
        ctx
    }

    #[test]
    fn test_render_home() {
        let generator = Generator::new().unwrap();
        let ctx = sample_context();
        let html = generator.render_home(&ctx, &ModalState::default()).unwrap();

        assert!(html.contains("<title>GlitchyKernel</title>"));
        assert!(html.contains("Writing a Kernel"));
        assert!(html.contains("Middle Ground"));
        assert!(html.contains("Old Notes"));
        assert!(html.contains("May 1, 2024"));
        assert!(html.contains("read-more-updates"));
        assert!(html.contains(r#"id="modal-overlay" class="hidden "#));
        assert!(html.contains("overflow: auto"));
        assert!(html.contains(r#"<link rel="canonical" href="http://example.com/">"#));
    }

    #[test]
    fn test_render_article_with_toc() {
        let generator = Generator::new().unwrap();
        let ctx = sample_context();
        let html = generator.render_article(&ctx, Some("kernel")).unwrap();

        assert!(html.contains("<title>Writing a Kernel - GlitchyKernel</title>"));
        assert!(html.contains(r#"<h2 id="heading-0">Intro</h2>"#));
        assert!(html.contains(r#"<h3 id="heading-1">Details</h3>"#));
        assert!(html.contains(r##"href="#heading-1" id="link-heading-1""##));
        assert!(html.contains("rootMargin: '-10% 0px -70% 0px'"));
        assert!(html.contains(r#"["heading-0","heading-1"]"#));
        assert!(!html.contains("No sections"));
    }

    #[test]
    fn test_render_article_without_headings() {
        let generator = Generator::new().unwrap();
        let ctx = sample_context();
        let html = generator.render_article(&ctx, Some("mid")).unwrap();

        assert!(html.contains("No sections"));
        assert!(html.contains(r#"<aside class="hidden lg:col-span-1">"#));
        assert!(!html.contains("IntersectionObserver"));
    }

    #[test]
    fn test_render_article_not_found() {
        let generator = Generator::new().unwrap();
        let ctx = sample_context();
        let html = generator.render_article(&ctx, Some("missing")).unwrap();

        assert!(html.contains("article-not-found"));
        assert!(!html.contains("article-wrapper"));
    }

    #[test]
    fn test_render_deep_link_opens_post_modal() {
        let generator = Generator::new().unwrap();
        let ctx = sample_context();
        let post = ctx.resolve_deep_link("/writing-a-kernel/").unwrap();
        let html = generator.render_deep_link(&ctx, post).unwrap();

        assert!(html.contains(r#"id="modal-post-kernel""#));
        assert!(html.contains(r#"href="/article/kernel/""#));
        assert!(html.contains("overflow: hidden"));
        assert!(html.contains(r#"href="http://example.com/writing-a-kernel/""#));
        assert!(!html.contains(r#"id="modal-overlay" class="hidden "#));
    }

    #[test]
    fn test_generate_writes_site() {
        let dir = TempDir::new().unwrap();
        let ctx = context_in(dir.path(), sample_context());
        fs::create_dir_all(ctx.site.source_dir.join("img")).unwrap();
        fs::write(ctx.site.source_dir.join("img/logo.png"), b"png").unwrap();

        let generator = Generator::new().unwrap();
        generator.generate(&ctx).unwrap();

        let public = dir.path().join("public");
        assert!(public.join("index.html").exists());
        assert!(public.join("article.html").exists());
        assert!(public.join("article/kernel/index.html").exists());
        assert!(public.join("writing-a-kernel/index.html").exists());
        assert!(public.join("img/logo.png").exists());

        let article = fs::read_to_string(public.join("article/kernel/index.html")).unwrap();
        assert!(article.contains(r#"<h2 id="heading-0">Intro</h2>"#));
    }

    #[test]
    fn test_plain_text_fields_are_escaped() {
        let mut notice = update("update-1", "2024-01-02");
        notice.title = "<b>bold</b>".to_string();
        notice.full_content = "a < b".to_string();
        let data = ContentSet {
            posts: vec![post(
                "tpl",
                r#"Using <template> & "quotes""#,
                "2024-01-01",
                "<h2>Body</h2>",
            )],
            updates: vec![notice],
        };
        let ctx = SiteContext::new(sample_context().site, data);
        let generator = Generator::new().unwrap();

        let html = generator.render_article(&ctx, Some("tpl")).unwrap();
        assert!(html.contains("Using &lt;template&gt; &amp; &quot;quotes&quot;</h1>"));
        assert!(!html.contains("<template>"));
        // Article markup itself is kept
        assert!(html.contains(r#"<h2 id="heading-0">Body</h2>"#));

        assert!(html.contains("&lt;b&gt;bold&lt;&#x2F;b&gt;</h3>"));
        assert!(html.contains("a &lt; b</p>"));
    }

    #[test]
    fn test_unsafe_post_id_stays_inside_public_dir() {
        let dir = TempDir::new().unwrap();
        let site_dir = dir.path().join("site");
        let base = sample_context();
        let mut escaping = post("../../outside", "Escaping Post", "2024-06-01", "<h2>x</h2>");
        escaping.link = String::new();
        let mut posts = base.posts().to_vec();
        posts.push(escaping);
        posts.push(post("/abs", "Absolute", "2024-06-02", ""));
        let data = ContentSet {
            posts,
            updates: Vec::new(),
        };
        let ctx = context_in(&site_dir, SiteContext::new(base.site, data));

        let generator = Generator::new().unwrap();
        generator.generate(&ctx).unwrap();

        assert!(!dir.path().join("outside").exists());
        assert!(!site_dir.join("outside").exists());
        assert!(site_dir.join("public/article/kernel/index.html").exists());

        let entries: Vec<_> = fs::read_dir(site_dir.join("public/article"))
            .unwrap()
            .map(|e| e.unwrap().file_name().into_string().unwrap())
            .collect();
        assert_eq!(entries.len(), 3, "{:?}", entries);

        // Cards fall back to the query-string address
        let home = fs::read_to_string(site_dir.join("public/index.html")).unwrap();
        assert!(home.contains("/article.html?id=..%2F..%2Foutside"));
    }
}
