//! Markdown to node-tree transformation
//!
//! Folds the `pulldown-cmark` event stream into the heading/bullet tree the
//! mind-map renderer consumes. Headings nest by level, list items nest under
//! the preceding heading (or their parent item), and everything else becomes
//! a leaf under the current branch. Node content is an HTML fragment because
//! the renderer treats it as such.

use log::warn;
use pulldown_cmark::{html, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;
use serde::{Deserialize, Serialize};

/// A node of the mind-map tree. `content` is an HTML fragment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapNode {
    pub content: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MapNode>,
}

impl MapNode {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            children: Vec::new(),
        }
    }
}

/// Document-level metadata parsed from a leading YAML block.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Frontmatter {
    /// Optional `title:` key
    pub title: Option<String>,
    /// Optional `markmap:` mapping with renderer options
    pub markmap: Option<serde_json::Value>,
}

/// Result of [`transform`]: the node tree plus any front-matter.
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub root: MapNode,
    pub frontmatter: Frontmatter,
}

/// Transform Markdown text into a mind-map node tree.
pub fn transform(markdown: &str) -> Transformed {
    let (frontmatter, body) = split_front_matter(markdown);
    let root = build_tree(body);
    Transformed { root, frontmatter }
}

/// Split a leading `---` YAML block off the document.
///
/// Malformed YAML is not an error: the block stays in the body, matching the
/// reference transformer's behavior.
pub fn split_front_matter(input: &str) -> (Frontmatter, &str) {
    let re = Regex::new(r"(?s)^-{3}[ \t]*\n(.*?)\n-{3}[ \t]*(\n+|$)").unwrap();
    let Some(caps) = re.captures(input) else {
        return (Frontmatter::default(), input);
    };

    let yaml_body = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
    let rest = &input[caps.get(0).map(|m| m.end()).unwrap_or(0)..];

    let value: serde_yaml::Value = match serde_yaml::from_str(yaml_body) {
        Ok(v) => v,
        Err(err) => {
            warn!("ignoring malformed front matter: {err}");
            return (Frontmatter::default(), input);
        }
    };

    let title = value
        .get("title")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string());
    let markmap = value
        .get("markmap")
        .and_then(|m| serde_json::to_value(m).ok());

    (Frontmatter { title, markmap }, rest)
}

/// A list item under construction: inline content plus nested children.
#[derive(Default)]
struct ItemFrame<'a> {
    content: Vec<Event<'a>>,
    children: Vec<MapNode>,
}

impl<'a> ItemFrame<'a> {
    fn into_node(self) -> MapNode {
        MapNode {
            content: render_events(self.content),
            children: self.children,
        }
    }
}

fn build_tree(markdown: &str) -> MapNode {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_TASKLISTS);
    let parser = Parser::new_ext(markdown, opts);

    // Open headings, bottom of the stack is the synthetic root (level 0).
    let mut headings: Vec<(u8, MapNode)> = vec![(0, MapNode::new(""))];
    let mut items: Vec<ItemFrame> = Vec::new();
    let mut heading_buf: Option<(u8, Vec<Event>)> = None;
    let mut para_buf: Option<Vec<Event>> = None;
    let mut block_buf: Option<(Vec<Event>, u32)> = None;
    // Promotion bookkeeping: a lone level-1 heading becomes the root.
    let mut h1_into_root = 0usize;
    let mut root_direct_leaves = 0usize;

    for ev in parser {
        // A non-heading, non-list block is captured whole and rendered as one leaf.
        if let Some((buf, depth)) = block_buf.as_mut() {
            match &ev {
                Event::Start(_) => *depth += 1,
                Event::End(_) => *depth -= 1,
                _ => {}
            }
            buf.push(ev);
            if *depth == 0 {
                let (events, _) = block_buf.take().unwrap();
                let content = render_events(events);
                if !content.is_empty() {
                    attach_leaf(&mut headings, MapNode::new(content), &mut root_direct_leaves);
                }
            }
            continue;
        }

        if let Some((level, buf)) = heading_buf.as_mut() {
            if matches!(ev, Event::End(TagEnd::Heading(_))) {
                let level = *level;
                let (_, events) = heading_buf.take().unwrap();
                let content = render_events(events);
                fold_to(&mut headings, level, &mut h1_into_root);
                headings.push((level, MapNode::new(content)));
            } else {
                buf.push(ev);
            }
            continue;
        }

        if let Some(buf) = para_buf.as_mut() {
            if matches!(ev, Event::End(TagEnd::Paragraph)) {
                let events = para_buf.take().unwrap();
                let content = render_events(events);
                if !content.is_empty() {
                    attach_leaf(&mut headings, MapNode::new(content), &mut root_direct_leaves);
                }
            } else {
                buf.push(ev);
            }
            continue;
        }

        if !items.is_empty() {
            match ev {
                Event::Start(Tag::Item) => items.push(ItemFrame::default()),
                Event::End(TagEnd::Item) => {
                    let node = items.pop().map(ItemFrame::into_node).unwrap_or_else(|| MapNode::new(""));
                    match items.last_mut() {
                        Some(parent) => parent.children.push(node),
                        None => attach_leaf(&mut headings, node, &mut root_direct_leaves),
                    }
                }
                Event::Start(Tag::List(_)) | Event::End(TagEnd::List(_)) => {}
                // Item content renders inline; paragraph boundaries become soft breaks.
                Event::Start(Tag::Paragraph) => {}
                Event::End(TagEnd::Paragraph) => {
                    if let Some(frame) = items.last_mut() {
                        if !frame.content.is_empty() {
                            frame.content.push(Event::SoftBreak);
                        }
                    }
                }
                other => {
                    if let Some(frame) = items.last_mut() {
                        frame.content.push(other);
                    }
                }
            }
            continue;
        }

        match ev {
            Event::Start(Tag::Heading { level, .. }) => {
                heading_buf = Some((level as u8, Vec::new()));
            }
            Event::Start(Tag::List(_)) | Event::End(TagEnd::List(_)) => {}
            Event::Start(Tag::Item) => items.push(ItemFrame::default()),
            Event::Start(Tag::Paragraph) => para_buf = Some(Vec::new()),
            Event::Rule => {}
            Event::Start(_) => block_buf = Some((vec![ev], 1)),
            _ => {}
        }
    }

    fold_to(&mut headings, 1, &mut h1_into_root);
    let (_, mut root) = headings.pop().unwrap_or((0, MapNode::new("")));

    // A document with exactly one level-1 heading and nothing else at the top
    // level renders that heading as the root node.
    if h1_into_root == 1 && root_direct_leaves == 0 && root.children.len() == 1 {
        root = root.children.remove(0);
    }
    root
}

/// Pop completed headings of level >= `level` into their parents.
fn fold_to(headings: &mut Vec<(u8, MapNode)>, level: u8, h1_into_root: &mut usize) {
    while headings.len() > 1 && headings.last().map(|(l, _)| *l >= level).unwrap_or(false) {
        let (l, node) = headings.pop().unwrap();
        if l == 1 && headings.len() == 1 {
            *h1_into_root += 1;
        }
        if let Some((_, parent)) = headings.last_mut() {
            parent.children.push(node);
        }
    }
}

fn attach_leaf(headings: &mut Vec<(u8, MapNode)>, node: MapNode, root_direct_leaves: &mut usize) {
    if headings.len() == 1 {
        *root_direct_leaves += 1;
    }
    if let Some((_, parent)) = headings.last_mut() {
        parent.children.push(node);
    }
}

/// Render a buffered event run to an HTML fragment.
fn render_events(events: Vec<Event>) -> String {
    let mut out = String::new();
    html::push_html(&mut out, events.into_iter());
    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(nodes: &[MapNode]) -> Vec<&str> {
        nodes.iter().map(|n| n.content.as_str()).collect()
    }

    #[test]
    fn empty_document_gives_empty_root() {
        let t = transform("");
        assert_eq!(t.root, MapNode::new(""));
        assert_eq!(t.frontmatter, Frontmatter::default());
    }

    #[test]
    fn single_h1_becomes_root() {
        let t = transform("# Topic\n\n## Branch\n\n- leaf\n");
        assert_eq!(t.root.content, "Topic");
        assert_eq!(contents(&t.root.children), vec!["Branch"]);
        assert_eq!(contents(&t.root.children[0].children), vec!["leaf"]);
    }

    #[test]
    fn multiple_h1_stay_under_synthetic_root() {
        let t = transform("# One\n\n# Two\n");
        assert_eq!(t.root.content, "");
        assert_eq!(contents(&t.root.children), vec!["One", "Two"]);
    }

    #[test]
    fn headings_nest_by_level() {
        let t = transform("# A\n\n## B\n\n### C\n\n## D\n");
        assert_eq!(t.root.content, "A");
        assert_eq!(contents(&t.root.children), vec!["B", "D"]);
        assert_eq!(contents(&t.root.children[0].children), vec!["C"]);
    }

    #[test]
    fn skipped_levels_attach_to_nearest_open_heading() {
        let t = transform("# A\n\n### C\n\n## B\n");
        assert_eq!(t.root.content, "A");
        assert_eq!(contents(&t.root.children), vec!["C", "B"]);
    }

    #[test]
    fn nested_bullets_nest_under_items() {
        let t = transform("# T\n\n- a\n  - a1\n  - a2\n- b\n");
        assert_eq!(contents(&t.root.children), vec!["a", "b"]);
        assert_eq!(contents(&t.root.children[0].children), vec!["a1", "a2"]);
    }

    #[test]
    fn ordered_lists_behave_like_bullets() {
        let t = transform("# T\n\n1. first\n2. second\n");
        assert_eq!(contents(&t.root.children), vec!["first", "second"]);
    }

    #[test]
    fn inline_markup_renders_to_html() {
        let t = transform("# A *b* `c`\n\n- [link](https://example.com)\n");
        assert_eq!(t.root.content, "A <em>b</em> <code>c</code>");
        assert_eq!(
            t.root.children[0].content,
            "<a href=\"https://example.com\">link</a>"
        );
    }

    #[test]
    fn paragraph_becomes_leaf_under_current_heading() {
        let t = transform("# T\n\nsome prose\n");
        assert_eq!(contents(&t.root.children), vec!["some prose"]);
    }

    #[test]
    fn code_block_becomes_pre_leaf() {
        let t = transform("# T\n\n```\nlet x = 1;\n```\n");
        assert_eq!(t.root.children.len(), 1);
        assert!(t.root.children[0].content.starts_with("<pre><code>"));
        assert!(t.root.children[0].content.contains("let x = 1;"));
    }

    #[test]
    fn leaf_before_any_heading_blocks_promotion() {
        let t = transform("intro text\n\n# Topic\n");
        assert_eq!(t.root.content, "");
        assert_eq!(contents(&t.root.children), vec!["intro text", "Topic"]);
    }

    #[test]
    fn front_matter_is_split_and_parsed() {
        let md = "---\ntitle: My Map\nmarkmap:\n  maxWidth: 300\n  zoom: false\n---\n\n# T\n";
        let (fm, rest) = split_front_matter(md);
        assert_eq!(fm.title.as_deref(), Some("My Map"));
        let markmap = fm.markmap.expect("markmap options");
        assert_eq!(markmap["maxWidth"], 300);
        assert_eq!(markmap["zoom"], false);
        assert!(rest.starts_with("# T"));
    }

    #[test]
    fn malformed_front_matter_stays_in_body() {
        let md = "---\n[ not yaml\n---\n\n# T\n";
        let (fm, rest) = split_front_matter(md);
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(rest, md);
    }

    #[test]
    fn document_without_front_matter_is_untouched() {
        let (fm, rest) = split_front_matter("# Hello\n");
        assert_eq!(fm, Frontmatter::default());
        assert_eq!(rest, "# Hello\n");
    }

    #[test]
    fn node_tree_serializes_without_empty_children() {
        let t = transform("# T\n\n- leaf\n");
        let json = serde_json::to_value(&t.root).unwrap();
        assert_eq!(json["content"], "T");
        assert!(json["children"][0].get("children").is_none());
    }
}
