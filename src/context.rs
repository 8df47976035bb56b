//! Application context: the loaded collections and the site they belong to

use crate::config::SiteConfig;
use crate::content::{newest_first, ContentSet, Post, Update};
use crate::helpers::deep_link_slug;
use crate::toc::ArticleToc;
use crate::Site;

/// Everything the renderers need, created once the data is loaded
#[derive(Debug, Clone)]
pub struct SiteContext {
    pub site: Site,
    /// Newest first
    posts: Vec<Post>,
    /// Indices into `posts`, in the order the data file lists them
    data_order: Vec<usize>,
    updates: Vec<Update>,
}

/// Result of selecting an article by id
#[derive(Debug, Clone)]
pub enum ArticleView<'a> {
    Found { post: &'a Post, toc: ArticleToc },
    NotFound,
}

impl SiteContext {
    pub fn new(site: Site, data: ContentSet) -> Self {
        let ContentSet { posts, updates } = data;
        let mut indexed: Vec<(usize, Post)> = posts.into_iter().enumerate().collect();
        indexed.sort_by(|(_, a), (_, b)| newest_first(a, b));

        let mut data_order = vec![0; indexed.len()];
        for (position, (listed, _)) in indexed.iter().enumerate() {
            data_order[*listed] = position;
        }
        let posts = indexed.into_iter().map(|(_, post)| post).collect();

        Self {
            site,
            posts,
            data_order,
            updates,
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.site.config
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn updates(&self) -> &[Update] {
        &self.updates
    }

    /// Posts in the order the data file lists them
    pub fn posts_in_data_order(&self) -> impl Iterator<Item = &Post> {
        self.data_order.iter().map(|&i| &self.posts[i])
    }

    pub fn find_post(&self, id: &str) -> Option<&Post> {
        self.posts.iter().find(|p| p.id == id)
    }

    /// Post whose title slug equals the request path, if any.
    ///
    /// When titles collide, the post listed first in the data file wins.
    pub fn resolve_deep_link(&self, path: &str) -> Option<&Post> {
        let slug = deep_link_slug(path)?;
        let post = self.posts_in_data_order().find(|p| p.slug() == slug);
        match post {
            Some(post) => tracing::debug!("Deep link {:?} -> {}", path, post.id),
            None => tracing::debug!("Deep link {:?} matched no post", path),
        }
        post
    }

    /// Annotated article for `?id=`; a missing or unknown id is `NotFound`
    pub fn article(&self, id: Option<&str>) -> ArticleView<'_> {
        match id.and_then(|id| self.find_post(id)) {
            Some(post) => ArticleView::Found {
                post,
                toc: ArticleToc::build(&post.content.to_html(), &self.config().toc),
            },
            None => ArticleView::NotFound,
        }
    }

    /// Latest stories (grid) and the remaining featured logs (list)
    pub fn featured(&self) -> (&[Post], &[Post]) {
        let split = self.config().featured_count.min(self.posts.len());
        self.posts.split_at(split)
    }

    /// Updates shown before "Read More Updates"
    pub fn preview_updates(&self) -> &[Update] {
        let count = self.config().updates_preview.min(self.updates.len());
        &self.updates[..count]
    }

    pub fn has_more_updates(&self) -> bool {
        self.updates.len() > self.config().updates_preview
    }
}
