//! Sidebar generation from the folder structure.
//!
//! Directories become categories and files become doc entries. Siblings are
//! ordered by `sidebar_position` (or the file/directory number prefix), then
//! by id; unpositioned entries come last.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use folio_content::{Corpus, Document, strip_number_prefix, titlecase_from_slug};

use crate::NavNode;

#[derive(Default)]
struct DirNode<'a> {
    /// Path of the directory within the doc ids.
    path: String,
    position: Option<f64>,
    docs: Vec<&'a Document>,
    subdirs: BTreeMap<String, DirNode<'a>>,
}

/// Generate sidebar items for the documents under `dir` (`""` for all).
pub(crate) fn autogenerate(corpus: &Corpus, dir: &str) -> Vec<NavNode> {
    let dir = dir.trim_matches('/');
    let base_depth = if dir.is_empty() {
        0
    } else {
        dir.split('/').count()
    };

    let mut root = DirNode {
        path: dir.to_owned(),
        ..DirNode::default()
    };
    for doc in corpus.iter() {
        let Some(rel) = relative_id(&doc.id, dir) else {
            continue;
        };
        let source_dirs: Vec<&str> = doc.source_path.split('/').collect();
        let mut node = &mut root;
        let segments: Vec<&str> = rel.split('/').collect();
        let dirs = segments.split_last().map_or(&[][..], |(_, dirs)| dirs);
        for (depth, segment) in dirs.iter().enumerate() {
            let prefix = source_dirs
                .get(base_depth + depth)
                .and_then(|s| strip_number_prefix(s).0);
            let parent_path = node.path.clone();
            node = node
                .subdirs
                .entry((*segment).to_owned())
                .or_insert_with(|| DirNode {
                    path: join(&parent_path, segment),
                    position: prefix.map(f64::from),
                    ..DirNode::default()
                });
        }
        node.docs.push(doc);
    }

    root.into_items(true)
}

impl DirNode<'_> {
    fn into_items(self, is_root: bool) -> Vec<NavNode> {
        let index = if is_root {
            None
        } else {
            self.docs.iter().position(|d| is_index_of(d, &self.path))
        };

        let mut entries: Vec<(Option<f64>, String, NavNode)> = Vec::new();
        for (i, doc) in self.docs.iter().enumerate() {
            if Some(i) == index {
                continue;
            }
            entries.push((
                doc.sidebar_position(),
                doc.id.clone(),
                NavNode::Doc {
                    id: doc.id.clone(),
                    label: doc.sidebar_label().to_owned(),
                },
            ));
        }

        for (name, sub) in self.subdirs {
            let sub_index = sub
                .docs
                .iter()
                .find(|d| is_index_of(d, &sub.path))
                .copied();
            let position = sub_index
                .and_then(Document::sidebar_position)
                .or(sub.position);
            let path = sub.path.clone();
            let label = sub_index.map_or_else(
                || titlecase_from_slug(&name),
                |d| d.sidebar_label().to_owned(),
            );
            let items = sub.into_items(false);

            let node = match (sub_index, items.is_empty()) {
                (Some(doc), true) => NavNode::Doc {
                    id: doc.id.clone(),
                    label,
                },
                (link, _) => NavNode::Category {
                    label,
                    collapsed: true,
                    collapsible: true,
                    link: link.map(|d| d.id.clone()),
                    items,
                },
            };
            entries.push((position, path, node));
        }

        entries.sort_by(|a, b| compare_position(a.0, b.0).then_with(|| a.1.cmp(&b.1)));
        entries.into_iter().map(|(_, _, node)| node).collect()
    }
}

/// Positioned entries first, ascending; unpositioned last.
fn compare_position(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.total_cmp(&b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// `index`, `readme` or a file named after its directory.
fn is_index_of(doc: &Document, dir_path: &str) -> bool {
    let (parent, leaf) = doc.id.rsplit_once('/').unwrap_or(("", &doc.id));
    if parent != dir_path {
        return false;
    }
    let dir_name = dir_path.rsplit('/').next().unwrap_or(dir_path);
    leaf.eq_ignore_ascii_case("index") || leaf.eq_ignore_ascii_case("readme") || leaf == dir_name
}

fn relative_id<'a>(id: &'a str, dir: &str) -> Option<&'a str> {
    if dir.is_empty() {
        return Some(id);
    }
    id.strip_prefix(dir)?.strip_prefix('/')
}

fn join(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_owned()
    } else {
        format!("{parent}/{name}")
    }
}
