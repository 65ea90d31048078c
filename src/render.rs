//! Presentation of catalog nodes: a collapsible HTML tree for notebooks and
//! an indented text tree for terminals.

use std::fmt::Write;

use serde_json::Value;

use crate::bunch::{Bunch, Node};
use crate::dataset::Dataset;

const CSS_STYLE: &str = include_str!("../data/catalog.css");

/// Renders `node` as self-contained HTML, stylesheet included.
pub fn to_html(node: &Node) -> String {
    let mut renderer = HtmlRenderer::default();
    match node {
        Node::Bunch(bunch) => renderer.bunch(bunch, false),
        Node::Dataset(dataset) => renderer.dataset(dataset, false),
    }
}

#[derive(Default)]
struct HtmlRenderer {
    next_id: usize,
}

impl HtmlRenderer {
    fn bunch(&mut self, bunch: &Bunch, inside: bool) -> String {
        let mut children = String::new();
        for (key, node) in bunch.iter() {
            let (kind, inner) = match node {
                Node::Dataset(dataset) => ("geodatasets.Dataset", self.dataset(dataset, true)),
                Node::Bunch(child) => ("geodatasets.Bunch", self.bunch(child, true)),
            };
            self.next_id += 1;
            let id = format!("geodatasets-node-{}", self.next_id);
            let _ = write!(
                children,
                "<li class=\"xyz-child\"><input type=\"checkbox\" id=\"{id}\" class=\"xyz-checkbox\"/>\
                 <label for=\"{id}\">{} <span>{kind}</span></label>\
                 <div class=\"xyz-inside\">{inner}</div></li>",
                escape(key)
            );
        }
        wrap(
            inside,
            "geodatasets.Bunch",
            &format!("{} items", bunch.len()),
            &format!("<ul class=\"xyz-collapsible\">{children}</ul>"),
        )
    }

    fn dataset(&mut self, dataset: &Dataset, inside: bool) -> String {
        let mut attrs = String::new();
        for (key, value) in dataset.as_map() {
            if key == "name" {
                continue;
            }
            let value = match value {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            };
            let _ = write!(
                attrs,
                "<dt><span>{}</span></dt><dd>{}</dd>",
                escape(key),
                escape(&value)
            );
        }
        wrap(
            inside,
            "geodatasets.Dataset",
            &escape(dataset.name()),
            &format!("<dl class=\"xyz-attrs\">{attrs}</dl>"),
        )
    }
}

fn wrap(inside: bool, kind: &str, title: &str, details: &str) -> String {
    let style = if inside {
        String::new()
    } else {
        format!("<style>{CSS_STYLE}</style>")
    };
    format!(
        "<div>{style}<div class=\"xyz-wrap\"><div class=\"xyz-header\">\
         <div class=\"xyz-obj\">{kind}</div><div class=\"xyz-name\">{title}</div></div>\
         <div class=\"xyz-details\">{details}</div></div></div>"
    )
}

fn escape(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Indented tree of group keys with dataset names and geometry types.
pub fn to_text_tree(bunch: &Bunch) -> String {
    let mut out = String::new();
    text_level(bunch, 0, &mut out);
    out
}

fn text_level(bunch: &Bunch, depth: usize, out: &mut String) {
    let indent = "  ".repeat(depth);
    for (key, node) in bunch.iter() {
        match node {
            Node::Bunch(child) => {
                let _ = writeln!(out, "{indent}{key}/ ({} items)", child.len());
                text_level(child, depth + 1, out);
            }
            Node::Dataset(dataset) => {
                let geometry = dataset.geometry_type().unwrap_or("-");
                let _ = writeln!(out, "{indent}{key}  {}  [{geometry}]", dataset.name());
            }
        }
    }
}
