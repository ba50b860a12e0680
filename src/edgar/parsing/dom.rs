use scraper::{ElementRef, Node as HtmlNode, Selector};

/// Elements that break a line when rendered; their text never runs into
/// the previous sibling's.
const BLOCK_TAGS: &[&str] = &["br", "p", "div", "tr", "td", "th", "li"];

/// Read-only view of one element in a parsed filing. Everything above the
/// cell extractor talks to the document through this trait, so a locator or
/// scanner never depends on which HTML backend produced the tree.
pub trait Node: Copy {
    /// Descendants matching a CSS selector, in document order.
    fn query_all(&self, selector: &str) -> Vec<Self>;

    fn query_one(&self, selector: &str) -> Option<Self> {
        self.query_all(selector).into_iter().next()
    }

    /// Element children only, in document order.
    fn children(&self) -> Vec<Self>;

    /// Concatenated text content of the subtree.
    fn text(&self) -> String;

    fn attribute(&self, name: &str) -> Option<String>;

    /// Lowercase tag name.
    fn tag_name(&self) -> String;

    fn has_ancestor(&self, tag: &str) -> bool;
}

fn parse_selector(selector: &str) -> Option<Selector> {
    match Selector::parse(selector) {
        Ok(parsed) => Some(parsed),
        Err(e) => {
            log::warn!("Ignoring invalid selector {:?}: {:?}", selector, e);
            None
        }
    }
}

impl<'a> Node for ElementRef<'a> {
    fn query_all(&self, selector: &str) -> Vec<Self> {
        match parse_selector(selector) {
            Some(parsed) => self.select(&parsed).collect(),
            None => Vec::new(),
        }
    }

    fn children(&self) -> Vec<Self> {
        (**self)
            .children()
            .filter_map(ElementRef::wrap)
            .collect()
    }

    fn text(&self) -> String {
        let mut out = String::new();
        for node in self.descendants().skip(1) {
            match node.value() {
                HtmlNode::Text(text) => out.push_str(text),
                HtmlNode::Element(el) if BLOCK_TAGS.contains(&el.name()) => out.push(' '),
                _ => {}
            }
        }
        out
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.value().attr(name).map(str::to_string)
    }

    fn tag_name(&self) -> String {
        self.value().name().to_ascii_lowercase()
    }

    fn has_ancestor(&self, tag: &str) -> bool {
        self.ancestors()
            .filter_map(ElementRef::wrap)
            .any(|a| a.value().name().eq_ignore_ascii_case(tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::Html;

    #[test]
    fn test_scraper_node_queries() {
        let doc = Html::parse_document(
            r#"<html><body><div><p style="x">One</p><table><tr><td colspan="2"><p>Two</p></td></tr></table></div></body></html>"#,
        );
        let root = doc.root_element();
        let divs = root.query_all("body > div");
        assert_eq!(divs.len(), 1);
        let div = divs[0];
        assert_eq!(div.children().len(), 2);
        assert_eq!(div.query_all("p").len(), 2);
        let cell = div.query_one("td").unwrap();
        assert_eq!(cell.attribute("colspan").as_deref(), Some("2"));
        assert_eq!(cell.tag_name(), "td");
        assert_eq!(Node::text(&cell).trim(), "Two");
        assert!(cell.has_ancestor("table"));
        assert!(!div.has_ancestor("table"));
        assert!(root.query_all("td >>> p").is_empty());

        let doc = Html::parse_document("<p>Schedule of Investments<br>As of March 31, 2020</p>");
        let p = doc.root_element().query_one("p").unwrap();
        assert_eq!(Node::text(&p), "Schedule of Investments As of March 31, 2020");
    }
}
