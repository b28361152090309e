//! Server-side HTML rendering for article structures.
//!
//! Preview mode produces reader-facing semantic HTML. Editor mode wraps every
//! node in a `palika-node` frame carrying its id and type so the editing UI
//! can attach selection and drag handles.
//!
//! Sections render their children inline from the flat node bag. A child
//! that cannot be resolved, or that would re-enter a section already being
//! rendered, is skipped.

use std::collections::HashSet;

use palika_sdk::node::{
    Button, Callout, Chart, Form, FormFieldType, Heading, Image, List, ListStyle, Quote, Section,
    SectionLayout, Table, Toc, Video,
};
use palika_sdk::{Article, MultilingualContent, Node, NodeBody, NodeId, Structure};
use tracing::debug;

use crate::content::html::{
    html_escape, is_safe_color, is_safe_href, is_safe_url, is_whitelisted_embed, sanitize_text,
};
use crate::content::registry::NodeRegistry;

/// Maximum section nesting rendered.
pub const MAX_DEPTH: usize = 16;

/// Which renderer a node is drawn with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RenderMode {
    Editor,
    #[default]
    Preview,
}

impl RenderMode {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderMode::Editor => "editor",
            RenderMode::Preview => "preview",
        }
    }
}

impl std::str::FromStr for RenderMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "editor" => Ok(RenderMode::Editor),
            "preview" => Ok(RenderMode::Preview),
            other => Err(format!("unknown render mode '{other}'")),
        }
    }
}

/// Per-render settings.
#[derive(Debug, Clone, Copy)]
pub struct RenderOptions<'a> {
    pub mode: RenderMode,
    pub lang: &'a str,
    /// Node highlighted as selected in editor mode.
    pub active: Option<&'a NodeId>,
}

impl<'a> RenderOptions<'a> {
    pub fn preview(lang: &'a str) -> Self {
        Self {
            mode: RenderMode::Preview,
            lang,
            active: None,
        }
    }

    pub fn editor(lang: &'a str) -> Self {
        Self {
            mode: RenderMode::Editor,
            lang,
            active: None,
        }
    }

    pub fn with_active(mut self, active: Option<&'a NodeId>) -> Self {
        self.active = active;
        self
    }
}

/// State threaded through one render pass.
pub struct RenderContext<'a> {
    structure: &'a Structure,
    registry: &'a NodeRegistry,
    options: RenderOptions<'a>,
    /// Ids of the nodes currently being rendered, outermost first.
    stack: Vec<NodeId>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        structure: &'a Structure,
        registry: &'a NodeRegistry,
        options: RenderOptions<'a>,
    ) -> Self {
        Self {
            structure,
            registry,
            options,
            stack: Vec::new(),
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.options.mode
    }

    pub fn lang(&self) -> &'a str {
        self.options.lang
    }

    pub fn structure(&self) -> &'a Structure {
        self.structure
    }

    /// Current nesting depth.
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Resolve and sanitize rich text for the render language.
    pub fn rich(&self, content: &MultilingualContent) -> String {
        sanitize_text(content.resolve(self.lang()))
    }

    /// Resolve and escape plain text for the render language.
    pub fn plain(&self, content: &MultilingualContent) -> String {
        html_escape(content.resolve(self.lang()))
    }

    fn shows(&self, node: &Node) -> bool {
        self.mode() == RenderMode::Editor || node.is_visible_in(self.lang())
    }

    /// Render one node through the registry.
    pub fn render_node(&mut self, node: &Node) -> String {
        if !self.shows(node) {
            return String::new();
        }
        if self.stack.len() >= MAX_DEPTH {
            debug!(node_id = %node.id, "render depth limit reached");
            return String::new();
        }
        if self.stack.contains(&node.id) {
            debug!(node_id = %node.id, "section cycle skipped");
            return String::new();
        }

        self.stack.push(node.id.clone());
        let registry = self.registry;
        let rendered = registry.render(node, self);
        self.stack.pop();

        match rendered {
            Some(html) if self.mode() == RenderMode::Preview => wrap_presentation(node, html),
            Some(html) => html,
            None => {
                debug!(node_id = %node.id, node_type = node.type_tag(), "no renderer registered");
                String::new()
            }
        }
    }

    /// Render a section child by id. Dangling ids render nothing.
    pub fn render_child(&mut self, id: &NodeId) -> String {
        let structure = self.structure;
        match structure.node(id.as_str()) {
            Some(child) => self.render_node(child),
            None => {
                debug!(node_id = %id, "dangling section child skipped");
                String::new()
            }
        }
    }
}

/// Render a whole article.
///
/// Nodes owned by a section render inside that section only.
pub fn render_article(
    article: &Article,
    registry: &NodeRegistry,
    options: RenderOptions<'_>,
) -> String {
    let structure = &article.structure;
    let owned = structure.referenced_children();
    let mut ctx = RenderContext::new(structure, registry, options);

    let mut html = format!(
        "<article class=\"palika-article theme-{}\" data-article-id=\"{}\" lang=\"{}\">",
        article.settings.theme.as_str(),
        html_escape(article.id.as_str()),
        html_escape(options.lang)
    );
    let title = ctx.plain(&article.metadata.title);
    if !title.is_empty() {
        html.push_str(&format!("<header><h1>{title}</h1></header>"));
    }
    for node in structure.ordered_nodes() {
        if owned.contains(&node.id) {
            continue;
        }
        html.push_str(&ctx.render_node(node));
    }
    html.push_str("</article>");
    html
}

/// Apply a node's styling and animation as a wrapper in preview mode.
fn wrap_presentation(node: &Node, html: String) -> String {
    if html.is_empty() || (node.styling.is_none() && node.animation.is_none()) {
        return html;
    }

    let mut classes = vec!["palika-styled".to_string()];
    let mut attrs = String::new();
    if let Some(styling) = &node.styling {
        if let Some(class_name) = &styling.class_name {
            classes.push(html_escape(class_name));
        }
        if let Some(align) = styling.align {
            classes.push(format!("align-{}", align_str(align)));
        }
        if let Some(background) = styling.background.as_deref()
            && is_safe_color(background)
        {
            attrs.push_str(&format!(" style=\"background: {}\"", background.trim()));
        }
    }
    if let Some(animation) = &node.animation {
        attrs.push_str(&format!(
            " data-animation=\"{}\" data-animation-duration=\"{}\" data-animation-delay=\"{}\"",
            html_escape(&animation.effect),
            animation.duration_ms,
            animation.delay_ms
        ));
    }
    format!("<div class=\"{}\"{attrs}>{html}</div>", classes.join(" "))
}

fn align_str(align: palika_sdk::node::Align) -> &'static str {
    match align {
        palika_sdk::node::Align::Left => "left",
        palika_sdk::node::Align::Center => "center",
        palika_sdk::node::Align::Right => "right",
    }
}

// ---------------------------------------------------------------------------
// Editor renderer
// ---------------------------------------------------------------------------

/// Editor renderer shared by the standard types: the node's preview
/// fragment inside a selectable frame.
pub fn editor_frame(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let preview = ctx.registry.get(node.type_tag()).map(|d| d.preview);
    let inner = preview.map(|render| render(node, ctx)).unwrap_or_default();

    let mut classes = String::from("palika-node");
    if ctx.options.active.is_some_and(|active| *active == node.id) {
        classes.push_str(" is-active");
    }
    if !node.is_visible_in(ctx.lang()) {
        classes.push_str(" is-hidden");
    }
    format!(
        "<div class=\"{classes}\" data-node-id=\"{}\" data-node-type=\"{}\">{inner}</div>",
        html_escape(node.id.as_str()),
        html_escape(node.type_tag())
    )
}

// ---------------------------------------------------------------------------
// Preview renderers
// ---------------------------------------------------------------------------

fn heading_anchor(node: &Node, heading: &Heading) -> String {
    let anchor = heading
        .anchor
        .as_deref()
        .filter(|a| !a.trim().is_empty())
        .unwrap_or(node.id.as_str());
    html_escape(anchor)
}

pub fn preview_heading(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Heading(heading) = &node.body else {
        return String::new();
    };
    let level = heading.level.clamp(1, 6);
    format!(
        "<h{level} id=\"{}\">{}</h{level}>",
        heading_anchor(node, heading),
        ctx.rich(&heading.content)
    )
}

pub fn preview_paragraph(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Paragraph(paragraph) = &node.body else {
        return String::new();
    };
    format!("<p>{}</p>", ctx.rich(&paragraph.content))
}

pub fn preview_list(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::List(List { style, items }) = &node.body else {
        return String::new();
    };
    let (tag, class) = match style {
        ListStyle::Ordered => ("ol", ""),
        ListStyle::Unordered => ("ul", ""),
        ListStyle::Checklist => ("ul", " class=\"checklist\""),
    };

    let mut html = format!("<{tag}{class}>");
    for item in items {
        let text = ctx.rich(&item.content);
        if *style == ListStyle::Checklist {
            let checked = if item.checked.unwrap_or(false) {
                " checked"
            } else {
                ""
            };
            html.push_str(&format!(
                "<li><input type=\"checkbox\" disabled{checked}> {text}</li>"
            ));
        } else {
            html.push_str(&format!("<li>{text}</li>"));
        }
    }
    html.push_str(&format!("</{tag}>"));
    html
}

pub fn preview_quote(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Quote(Quote { content, citation }) = &node.body else {
        return String::new();
    };
    let text = ctx.rich(content);
    let cite = citation.as_ref().map(|c| ctx.rich(c)).unwrap_or_default();
    if cite.is_empty() {
        format!("<blockquote><p>{text}</p></blockquote>")
    } else {
        format!("<blockquote><p>{text}</p><cite>{cite}</cite></blockquote>")
    }
}

fn figcaption(ctx: &RenderContext<'_>, caption: Option<&MultilingualContent>) -> String {
    let text = caption.map(|c| ctx.plain(c)).unwrap_or_default();
    if text.is_empty() {
        String::new()
    } else {
        format!("<figcaption>{text}</figcaption>")
    }
}

pub fn preview_image(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Image(image) = &node.body else {
        return String::new();
    };
    let Image {
        src,
        alt,
        caption,
        width,
        height,
    } = image;
    if !is_safe_url(src) {
        debug!(node_id = %node.id, "image with unsafe source dropped");
        return String::new();
    }

    let mut size = String::new();
    if let Some(width) = width {
        size.push_str(&format!(" width=\"{width}\""));
    }
    if let Some(height) = height {
        size.push_str(&format!(" height=\"{height}\""));
    }
    format!(
        "<figure class=\"palika-image\">\
         <img src=\"{}\" alt=\"{}\"{size} loading=\"lazy\">{}</figure>",
        html_escape(src.trim()),
        ctx.plain(alt),
        figcaption(ctx, caption.as_ref())
    )
}

pub fn preview_video(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Video(Video {
        src,
        caption,
        autoplay,
        ..
    }) = &node.body
    else {
        return String::new();
    };
    if !is_safe_url(src) {
        debug!(node_id = %node.id, "video with unsafe source dropped");
        return String::new();
    }

    let escaped_url = html_escape(src.trim());
    let player = if is_whitelisted_embed(src) {
        format!(
            "<div class=\"embed-responsive\">\
             <iframe src=\"{escaped_url}\" frameborder=\"0\" allowfullscreen></iframe>\
             </div>"
        )
    } else {
        let autoplay = if *autoplay { " autoplay muted" } else { "" };
        format!("<video src=\"{escaped_url}\" controls{autoplay}></video>")
    };
    format!(
        "<figure class=\"palika-video\">{player}{}</figure>",
        figcaption(ctx, caption.as_ref())
    )
}

pub fn preview_table(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Table(Table { data, caption }) = &node.body else {
        return String::new();
    };

    let columns: Vec<_> = if data.column_order.is_empty() {
        data.columns.iter().collect()
    } else {
        data.column_order
            .iter()
            .filter_map(|id| data.column(id))
            .collect()
    };
    let rows: Vec<_> = if data.row_order.is_empty() {
        data.rows.iter().collect()
    } else {
        data.row_order
            .iter()
            .filter_map(|id| data.row(id))
            .collect()
    };

    let mut html = String::from("<table class=\"palika-table\">");
    if let Some(caption) = caption {
        let text = ctx.plain(caption);
        if !text.is_empty() {
            html.push_str(&format!("<caption>{text}</caption>"));
        }
    }

    html.push_str("<thead><tr>");
    for column in &columns {
        let align = column
            .align
            .map(|a| format!(" class=\"align-{}\"", align_str(a)))
            .unwrap_or_default();
        html.push_str(&format!("<th{align}>{}</th>", ctx.plain(&column.header)));
    }
    html.push_str("</tr></thead><tbody>");

    for row in rows {
        html.push_str("<tr>");
        for column in &columns {
            let cell = row
                .cells
                .get(&column.id)
                .map(|c| ctx.plain(c))
                .unwrap_or_default();
            html.push_str(&format!("<td>{cell}</td>"));
        }
        html.push_str("</tr>");
    }
    html.push_str("</tbody></table>");
    html
}

pub fn preview_chart(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Chart(Chart { data, title }) = &node.body else {
        return String::new();
    };
    let payload = serde_json::to_string(data).unwrap_or_default();
    format!(
        "<figure class=\"palika-chart chart-{}\" data-chart=\"{}\">{}</figure>",
        html_escape(&data.chart_type),
        html_escape(&payload),
        figcaption(ctx, title.as_ref())
    )
}

pub fn preview_section(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Section(Section {
        title,
        nodes,
        layout,
    }) = &node.body
    else {
        return String::new();
    };
    let layout = match layout {
        SectionLayout::Stack => "stack",
        SectionLayout::TwoColumn => "two-column",
        SectionLayout::ThreeColumn => "three-column",
    };

    let mut html = format!("<section class=\"palika-section layout-{layout}\">");
    if let Some(title) = title {
        let text = ctx.plain(title);
        if !text.is_empty() {
            html.push_str(&format!("<header><h2>{text}</h2></header>"));
        }
    }
    for child in nodes {
        html.push_str(&ctx.render_child(child));
    }
    html.push_str("</section>");
    html
}

pub fn preview_callout(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Callout(Callout {
        variant,
        title,
        content,
    }) = &node.body
    else {
        return String::new();
    };
    let title = title
        .as_ref()
        .map(|t| ctx.plain(t))
        .filter(|t| !t.is_empty())
        .map(|t| format!("<strong class=\"callout-title\">{t}</strong>"))
        .unwrap_or_default();
    format!(
        "<aside class=\"callout callout-{}\" role=\"note\">{title}<p>{}</p></aside>",
        variant.as_str(),
        ctx.rich(content)
    )
}

/// Headings in document order, descending into sections.
fn document_headings(structure: &Structure) -> Vec<&Node> {
    fn collect<'s>(
        structure: &'s Structure,
        node: &'s Node,
        seen: &mut HashSet<&'s NodeId>,
        out: &mut Vec<&'s Node>,
        depth: usize,
    ) {
        if depth >= MAX_DEPTH || !seen.insert(&node.id) {
            return;
        }
        match &node.body {
            NodeBody::Heading(_) => out.push(node),
            NodeBody::Section(section) => {
                for child in &section.nodes {
                    if let Some(child) = structure.node(child.as_str()) {
                        collect(structure, child, seen, out, depth + 1);
                    }
                }
            }
            _ => {}
        }
    }

    let owned = structure.referenced_children();
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for node in structure.ordered_nodes() {
        if !owned.contains(&node.id) {
            collect(structure, node, &mut seen, &mut out, 0);
        }
    }
    out
}

pub fn preview_toc(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Toc(Toc { title, max_depth }) = &node.body else {
        return String::new();
    };
    let max_depth = (*max_depth).clamp(1, 6);

    let mut html = String::from("<nav class=\"palika-toc\">");
    if let Some(title) = title {
        let text = ctx.plain(title);
        if !text.is_empty() {
            html.push_str(&format!("<p class=\"toc-title\">{text}</p>"));
        }
    }
    html.push_str("<ol>");
    for entry in document_headings(ctx.structure()) {
        let NodeBody::Heading(heading) = &entry.body else {
            continue;
        };
        let level = heading.level.clamp(1, 6);
        if level > max_depth || !ctx.shows(entry) {
            continue;
        }
        html.push_str(&format!(
            "<li class=\"toc-level-{level}\"><a href=\"#{}\">{}</a></li>",
            heading_anchor(entry, heading),
            ctx.plain(&heading.content)
        ));
    }
    html.push_str("</ol></nav>");
    html
}

pub fn preview_button(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Button(Button {
        label,
        href,
        variant,
        new_tab,
    }) = &node.body
    else {
        return String::new();
    };
    let label = ctx.plain(label);
    let class = format!("button button-{}", variant.as_str());
    if !is_safe_href(href) {
        return format!("<span class=\"{class}\">{label}</span>");
    }
    let target = if *new_tab {
        " target=\"_blank\" rel=\"noopener noreferrer\""
    } else {
        ""
    };
    format!(
        "<a class=\"{class}\" href=\"{}\"{target}>{label}</a>",
        html_escape(href.trim())
    )
}

pub fn preview_form(node: &Node, ctx: &mut RenderContext<'_>) -> String {
    let NodeBody::Form(Form {
        title,
        fields,
        submit_label,
        action,
    }) = &node.body
    else {
        return String::new();
    };

    let action = action
        .as_deref()
        .filter(|a| is_safe_href(a))
        .map(|a| format!(" action=\"{}\"", html_escape(a.trim())))
        .unwrap_or_default();
    let mut html = format!("<form class=\"palika-form\" method=\"post\"{action}><fieldset>");
    if let Some(title) = title {
        let text = ctx.plain(title);
        if !text.is_empty() {
            html.push_str(&format!("<legend>{text}</legend>"));
        }
    }

    for field in fields {
        let name = html_escape(&field.name);
        let label = ctx.plain(&field.label);
        let required = if field.required { " required" } else { "" };
        let control = match field.field_type {
            FormFieldType::Text => format!("<input type=\"text\" name=\"{name}\"{required}>"),
            FormFieldType::Email => format!("<input type=\"email\" name=\"{name}\"{required}>"),
            FormFieldType::Number => format!("<input type=\"number\" name=\"{name}\"{required}>"),
            FormFieldType::Checkbox => {
                format!("<input type=\"checkbox\" name=\"{name}\"{required}>")
            }
            FormFieldType::Textarea => format!("<textarea name=\"{name}\"{required}></textarea>"),
            FormFieldType::Select => {
                let mut select = format!("<select name=\"{name}\"{required}>");
                for option in &field.options {
                    select.push_str(&format!(
                        "<option value=\"{}\">{}</option>",
                        html_escape(&option.value),
                        ctx.plain(&option.label)
                    ));
                }
                select.push_str("</select>");
                select
            }
        };
        html.push_str(&format!("<label>{label} {control}</label>"));
    }

    let submit = ctx.plain(submit_label);
    let submit = if submit.is_empty() {
        "Submit".to_string()
    } else {
        submit
    };
    html.push_str(&format!(
        "</fieldset><button type=\"submit\">{submit}</button></form>"
    ));
    html
}
