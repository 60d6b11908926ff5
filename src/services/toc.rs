use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, error};

use crate::error::ContentError;

const TOC_FILE_SUFFIX: &str = "-toc.html";

/// The slice of blog metadata the generator needs.
#[derive(Clone, Debug, PartialEq)]
pub struct BlogSummary {
    pub id: String,
    pub title: String,
}

/// Capability the generator pulls blog listings and bodies through. It never
/// touches the content files behind the provider directly; its own persisted
/// artifacts are the only filesystem surface it owns.
#[async_trait]
pub trait BlogProvider: Send + Sync {
    async fn all_blogs(&self) -> Result<Vec<BlogSummary>, ContentError>;
    async fn blog_content(&self, blog_id: &str) -> Result<String, ContentError>;
}

static HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"<h([1-6])[^>]*>(.*?)</h[1-6]>").expect("heading pattern"));
static ID_ATTR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"id=["']([^"']*)["']"#).expect("id pattern"));
static INLINE_TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern"));
static NON_ANCHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^a-z0-9-]").expect("anchor pattern"));

/// Scan HTML for `<h1>`..`<h6>` tags and build a nested outline mirroring
/// the heading-level transitions, in document order. A deeper heading opens
/// a nested list under the current item, a shallower one closes lists back
/// up to its level, a same-level one becomes a sibling. Every opened
/// `<ul>`/`<li>` pair is balanced by the end; with no headings at all the
/// result is the closed container `<ul class="toc-list"></ul>`.
///
/// Anchors reuse an explicit `id` attribute when the tag carries one and are
/// slugified from the heading text otherwise. Colliding anchors are emitted
/// as-is; a heading whose anchor collides simply links to the first
/// occurrence.
pub fn generate_table_of_contents(html: &str) -> String {
    let mut out = String::from(r#"<ul class="toc-list">"#);

    // one flag per open list, innermost last: is an <li> still open in it?
    // index 0 is the outer container
    let mut open_items: Vec<bool> = vec![false];
    let mut current_level = 0usize;

    for caps in HEADING_RE.captures_iter(html) {
        let level: usize = caps[1].parse().unwrap_or(0);
        if level == 0 {
            continue;
        }

        let text = strip_inline_tags(&caps[2]);
        let id = match ID_ATTR_RE.captures(&caps[0]) {
            Some(id_caps) => id_caps[1].to_string(),
            None => slugify_heading(&text),
        };

        if current_level == 0 {
            // the very first heading opens the first item directly in the
            // container, whatever its level
        } else if level > current_level {
            for _ in current_level..level {
                out.push_str("<ul>");
                open_items.push(false);
            }
        } else if level < current_level {
            let mut steps = current_level - level;
            while steps > 0 && open_items.len() > 1 {
                if open_items.pop().unwrap_or(false) {
                    out.push_str("</li>");
                }
                out.push_str("</ul>");
                steps -= 1;
            }
            close_open_item(&mut out, &mut open_items);
        } else {
            close_open_item(&mut out, &mut open_items);
        }

        out.push_str(&format!(r##"<li><a href="#{id}">{text}</a>"##));
        if let Some(last) = open_items.last_mut() {
            *last = true;
        }
        current_level = level;
    }

    // unwind everything still open, container included
    while let Some(item_open) = open_items.pop() {
        if item_open {
            out.push_str("</li>");
        }
        out.push_str("</ul>");
    }

    out
}

/// Close the sibling `<li>` still open in the innermost list, if any.
fn close_open_item(out: &mut String, open_items: &mut [bool]) {
    if let Some(last) = open_items.last_mut() {
        if *last {
            out.push_str("</li>");
            *last = false;
        }
    }
}

/// Strip inline markup from a heading's inner HTML, leaving the text.
/// Whitespace inside the text survives untouched; only the surrounding
/// whitespace is trimmed.
pub(crate) fn strip_inline_tags(html: &str) -> String {
    INLINE_TAG_RE.replace_all(html, "").trim().to_string()
}

/// Derive an anchor id from heading text: the text is lowercased with
/// spaces turned into hyphens, then cleaned down to `[a-z0-9-]`.
pub(crate) fn slugify_heading(text: &str) -> String {
    clean_anchor_id(&text.replace(' ', "-").to_lowercase())
}

/// Keep only characters valid in our anchor ids. Expects lowercased input;
/// anything else, uppercase included, is dropped rather than mapped.
pub(crate) fn clean_anchor_id(text: &str) -> String {
    NON_ANCHOR_RE.replace_all(text, "").into_owned()
}

/// Pre-generates navigable table-of-contents fragments from blog HTML and
/// persists one artifact per blog under `toc_dir`, named `{id}-toc.html`.
/// Artifacts are written once and reread by the serving layer without
/// re-parsing the blog body.
pub struct TocService {
    toc_dir: PathBuf,
}

impl TocService {
    pub fn new(toc_dir: impl Into<PathBuf>) -> Self {
        Self {
            toc_dir: toc_dir.into(),
        }
    }

    /// Where the persisted fragment for a blog lives.
    pub fn artifact_path(&self, blog_id: &str) -> PathBuf {
        self.toc_dir.join(format!("{blog_id}{TOC_FILE_SUFFIX}"))
    }

    /// Generate the fragment for one blog body and persist it.
    pub fn generate_and_save(&self, blog_id: &str, content: &str) -> Result<(), ContentError> {
        let toc = generate_table_of_contents(content);
        let wrapped = format!(r#"<div class="blog-toc"><h2>Table of Contents</h2>{toc}</div>"#);

        fs::create_dir_all(&self.toc_dir).map_err(|err| ContentError::ArtifactIo {
            path: self.toc_dir.clone(),
            source: Arc::new(err),
        })?;

        let path = self.artifact_path(blog_id);
        fs::write(&path, wrapped).map_err(|err| ContentError::ArtifactIo {
            path: path.clone(),
            source: Arc::new(err),
        })?;

        debug!(blog_id, "generated table of contents artifact");
        Ok(())
    }

    /// Generate fragments for every blog the provider knows. Individual
    /// failures are logged and skipped; the batch never aborts part-way and
    /// partial success is not reported as an error.
    pub async fn generate_all(&self, provider: &dyn BlogProvider) -> Result<(), ContentError> {
        let blogs = provider.all_blogs().await?;

        for blog in &blogs {
            let content = match provider.blog_content(&blog.id).await {
                Ok(content) => content,
                Err(err) => {
                    error!(blog_id = %blog.id, error = %err, "skipping blog, content fetch failed");
                    continue;
                }
            };

            if let Err(err) = self.generate_and_save(&blog.id, &content) {
                error!(blog_id = %blog.id, error = %err, "skipping blog, generation failed");
            }
        }

        debug!(count = blogs.len(), "table of contents batch finished");
        Ok(())
    }

    /// Return the persisted fragment for a blog, synthesizing it first if it
    /// is missing: find the blog through the provider, fetch its body,
    /// generate, persist, then read back. Fails with `UnknownContentId` when
    /// the provider has never heard of the id.
    pub async fn get_or_generate(
        &self,
        blog_id: &str,
        provider: &dyn BlogProvider,
    ) -> Result<String, ContentError> {
        let path = self.artifact_path(blog_id);

        if !path.exists() {
            debug!(blog_id, "table of contents artifact missing, generating");

            let blogs = provider.all_blogs().await?;
            if !blogs.iter().any(|blog| blog.id == blog_id) {
                return Err(ContentError::UnknownContentId {
                    id: blog_id.to_string(),
                });
            }

            let content = provider.blog_content(blog_id).await?;
            self.generate_and_save(blog_id, &content)?;
        }

        fs::read_to_string(&path).map_err(|err| ContentError::ArtifactIo {
            path: path.clone(),
            source: Arc::new(err),
        })
    }
}
