//! Resolved navigation tree and queries over it.

use std::collections::{BTreeMap, BTreeSet};

use folio_content::Corpus;

use crate::NavError;
use crate::autogen::autogenerate;
use crate::sidebars::{CategoryLink, SidebarItem, SidebarsFile, TypedItem};

/// A resolved navigation entry.
#[derive(Clone, Debug, PartialEq)]
pub enum NavNode {
    Doc {
        id: String,
        label: String,
    },
    Category {
        label: String,
        collapsed: bool,
        collapsible: bool,
        /// Doc shown when the category label is clicked.
        link: Option<String>,
        items: Vec<NavNode>,
    },
    Link {
        label: String,
        href: String,
    },
}

impl NavNode {
    #[must_use]
    pub fn label(&self) -> &str {
        match self {
            Self::Doc { label, .. } | Self::Category { label, .. } | Self::Link { label, .. } => {
                label
            }
        }
    }

    /// Whether this node is, or contains, the given doc.
    #[must_use]
    pub fn contains_doc(&self, doc_id: &str) -> bool {
        match self {
            Self::Doc { id, .. } => id == doc_id,
            Self::Category { link, items, .. } => {
                link.as_deref() == Some(doc_id) || items.iter().any(|i| i.contains_doc(doc_id))
            }
            Self::Link { .. } => false,
        }
    }
}

/// A named sidebar.
#[derive(Clone, Debug, PartialEq)]
pub struct Sidebar {
    pub name: String,
    pub items: Vec<NavNode>,
}

/// Category on the path to a document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Breadcrumb {
    pub label: String,
    /// Category index doc, when the category has one.
    pub doc_id: Option<String>,
}

/// Neighbouring document in sidebar order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLink {
    pub doc_id: String,
    pub label: String,
}

/// Previous and next documents.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Pagination {
    pub previous: Option<PageLink>,
    pub next: Option<PageLink>,
}

/// All sidebars, resolved against the corpus.
///
/// Every doc id in the tree exists in the corpus it was resolved against.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NavigationTree {
    sidebars: Vec<Sidebar>,
    /// Docs of each sidebar in depth-first order, without repeats.
    flat: Vec<Vec<PageLink>>,
    /// First sidebar each doc appears in.
    doc_sidebar: BTreeMap<String, usize>,
}

impl NavigationTree {
    /// Build a tree from resolved sidebars.
    #[must_use]
    pub fn new(sidebars: Vec<Sidebar>) -> Self {
        let mut flat = Vec::with_capacity(sidebars.len());
        let mut doc_sidebar = BTreeMap::new();
        for (idx, sidebar) in sidebars.iter().enumerate() {
            let mut links = Vec::new();
            let mut seen = BTreeSet::new();
            flatten(&sidebar.items, &mut links, &mut seen);
            for link in &links {
                doc_sidebar.entry(link.doc_id.clone()).or_insert(idx);
            }
            flat.push(links);
        }
        Self {
            sidebars,
            flat,
            doc_sidebar,
        }
    }

    /// A single `docs` sidebar generated from the folder structure.
    #[must_use]
    pub fn autogenerated(corpus: &Corpus) -> Self {
        Self::new(vec![Sidebar {
            name: "docs".to_owned(),
            items: autogenerate(corpus, ""),
        }])
    }

    #[must_use]
    pub fn sidebars(&self) -> &[Sidebar] {
        &self.sidebars
    }

    /// The sidebar containing `doc_id` (the first one if several do).
    #[must_use]
    pub fn sidebar_for(&self, doc_id: &str) -> Option<&Sidebar> {
        self.doc_sidebar.get(doc_id).map(|&i| &self.sidebars[i])
    }

    /// Categories from the sidebar root down to `doc_id`.
    ///
    /// A category's own index doc gets the categories above it.
    #[must_use]
    pub fn breadcrumbs(&self, doc_id: &str) -> Vec<Breadcrumb> {
        let Some(sidebar) = self.sidebar_for(doc_id) else {
            return Vec::new();
        };
        let mut trail = Vec::new();
        find_trail(&sidebar.items, doc_id, &mut trail);
        trail
    }

    /// Previous and next docs in the flattened order of the doc's sidebar.
    #[must_use]
    pub fn pagination(&self, doc_id: &str) -> Pagination {
        let Some(&idx) = self.doc_sidebar.get(doc_id) else {
            return Pagination::default();
        };
        let links = &self.flat[idx];
        let Some(pos) = links.iter().position(|l| l.doc_id == doc_id) else {
            return Pagination::default();
        };
        Pagination {
            previous: pos.checked_sub(1).and_then(|p| links.get(p)).cloned(),
            next: links.get(pos + 1).cloned(),
        }
    }

    /// Every referenced doc id in tree order, each once.
    #[must_use]
    pub fn referenced_docs(&self) -> Vec<&str> {
        let mut seen = BTreeSet::new();
        self.flat
            .iter()
            .flatten()
            .map(|l| l.doc_id.as_str())
            .filter(|id| seen.insert(*id))
            .collect()
    }

    /// First doc of the first sidebar, used as the landing target.
    #[must_use]
    pub fn first_doc(&self) -> Option<&str> {
        self.flat.iter().flatten().next().map(|l| l.doc_id.as_str())
    }
}

fn flatten(items: &[NavNode], out: &mut Vec<PageLink>, seen: &mut BTreeSet<String>) {
    for item in items {
        match item {
            NavNode::Doc { id, label } => {
                if seen.insert(id.clone()) {
                    out.push(PageLink {
                        doc_id: id.clone(),
                        label: label.clone(),
                    });
                }
            }
            NavNode::Category {
                label, link, items, ..
            } => {
                if let Some(id) = link
                    && seen.insert(id.clone())
                {
                    out.push(PageLink {
                        doc_id: id.clone(),
                        label: label.clone(),
                    });
                }
                flatten(items, out, seen);
            }
            NavNode::Link { .. } => {}
        }
    }
}

/// Push the category chain leading to `doc_id`; returns whether it was found.
fn find_trail(items: &[NavNode], doc_id: &str, trail: &mut Vec<Breadcrumb>) -> bool {
    for item in items {
        match item {
            NavNode::Doc { id, .. } if id == doc_id => return true,
            NavNode::Category {
                label, link, items, ..
            } => {
                if link.as_deref() == Some(doc_id) {
                    return true;
                }
                trail.push(Breadcrumb {
                    label: label.clone(),
                    doc_id: link.clone(),
                });
                if find_trail(items, doc_id, trail) {
                    return true;
                }
                trail.pop();
            }
            _ => {}
        }
    }
    false
}

impl SidebarsFile {
    /// Resolve every item against the corpus.
    ///
    /// All missing doc references are reported together.
    ///
    /// # Errors
    ///
    /// Returns `NavError::MissingDocs` if any referenced doc is not in the
    /// corpus, or `NavError::EmptyCategory` for a category without items.
    pub fn resolve(&self, corpus: &Corpus) -> Result<NavigationTree, NavError> {
        let mut resolver = Resolver {
            corpus,
            missing: Vec::new(),
            empty: None,
        };
        let sidebars: Vec<Sidebar> = self
            .sidebars
            .iter()
            .map(|(name, items)| Sidebar {
                name: name.clone(),
                items: resolver.items(name, items),
            })
            .collect();

        if !resolver.missing.is_empty() {
            return Err(NavError::MissingDocs {
                ids: resolver.missing,
            });
        }
        if let Some((sidebar, label)) = resolver.empty {
            return Err(NavError::EmptyCategory { sidebar, label });
        }
        Ok(NavigationTree::new(sidebars))
    }
}

struct Resolver<'a> {
    corpus: &'a Corpus,
    missing: Vec<String>,
    empty: Option<(String, String)>,
}

impl Resolver<'_> {
    fn items(&mut self, sidebar: &str, items: &[SidebarItem]) -> Vec<NavNode> {
        let mut nodes = Vec::with_capacity(items.len());
        for item in items {
            match item {
                SidebarItem::DocId(id) => nodes.extend(self.doc(id, None)),
                SidebarItem::Typed(TypedItem::Doc { id, label }) => {
                    nodes.extend(self.doc(id, label.as_deref()));
                }
                SidebarItem::Typed(TypedItem::Category {
                    label,
                    collapsed,
                    collapsible,
                    items,
                    link,
                }) => {
                    let link = link.as_ref().and_then(|CategoryLink::Doc { id }| {
                        self.doc(id, None).map(|_| id.clone())
                    });
                    nodes.push(self.category(sidebar, label, *collapsed, *collapsible, link, items));
                }
                SidebarItem::Typed(TypedItem::Link { label, href }) => nodes.push(NavNode::Link {
                    label: label.clone(),
                    href: href.clone(),
                }),
                SidebarItem::Typed(TypedItem::Autogenerated { dir_name }) => {
                    nodes.extend(autogenerate(self.corpus, dir_name));
                }
                SidebarItem::Shorthand(categories) => {
                    for (label, items) in &categories.0 {
                        nodes.push(self.category(sidebar, label, true, true, None, items));
                    }
                }
            }
        }
        nodes
    }

    fn category(
        &mut self,
        sidebar: &str,
        label: &str,
        collapsed: bool,
        collapsible: bool,
        link: Option<String>,
        items: &[SidebarItem],
    ) -> NavNode {
        let items = self.items(sidebar, items);
        if items.is_empty() && self.empty.is_none() {
            self.empty = Some((sidebar.to_owned(), label.to_owned()));
        }
        NavNode::Category {
            label: label.to_owned(),
            collapsed,
            collapsible,
            link,
            items,
        }
    }

    /// Resolve a doc reference, recording it as missing if unknown.
    fn doc(&mut self, id: &str, label: Option<&str>) -> Option<NavNode> {
        if let Some(doc) = self.corpus.get(id) {
            return Some(NavNode::Doc {
                id: doc.id.clone(),
                label: label.unwrap_or_else(|| doc.sidebar_label()).to_owned(),
            });
        }
        if !self.missing.iter().any(|m| m == id) {
            self.missing.push(id.to_owned());
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::sidebars::SidebarsFormat;
    use folio_content::Document;
    use pretty_assertions::assert_eq;

    fn corpus(files: &[(&str, &str)]) -> Corpus {
        let docs = files
            .iter()
            .map(|(path, text)| Document::parse(path, PathBuf::from(path), text).unwrap())
            .collect();
        Corpus::from_documents(docs).unwrap()
    }

    fn sample_corpus() -> Corpus {
        corpus(&[
            ("intro.md", "# Introduction"),
            ("cloud/index.md", "# Cloud"),
            ("cloud/kubernetes.md", "---\nsidebar_label: K8s\n---\n# Kubernetes"),
            ("cloud/helm.md", "# Helm"),
            ("faq.md", "# FAQ"),
        ])
    }

    const SIDEBARS: &str = r"
docs:
  - intro
  - type: category
    label: Cloud
    link: { type: doc, id: cloud/index }
    items:
      - cloud/kubernetes
      - type: category
        label: Packaging
        items: [cloud/helm]
  - type: link
    label: Status
    href: https://status.example.com
extra:
  - faq
";

    fn tree() -> NavigationTree {
        SidebarsFile::parse(SIDEBARS, SidebarsFormat::Yaml)
            .unwrap()
            .resolve(&sample_corpus())
            .unwrap()
    }

    #[test]
    fn test_resolve_labels_from_documents() {
        let tree = tree();
        let docs = &tree.sidebars()[0];
        assert_eq!(docs.items[0].label(), "Introduction");
        let NavNode::Category { items, link, .. } = &docs.items[1] else {
            panic!("expected category");
        };
        assert_eq!(link.as_deref(), Some("cloud/index"));
        assert_eq!(items[0].label(), "K8s");
    }

    #[test]
    fn test_referenced_docs_in_tree_order() {
        assert_eq!(
            tree().referenced_docs(),
            vec!["intro", "cloud/index", "cloud/kubernetes", "cloud/helm", "faq"]
        );
    }

    #[test]
    fn test_sidebar_for() {
        let tree = tree();
        assert_eq!(tree.sidebar_for("cloud/helm").map(|s| s.name.as_str()), Some("docs"));
        assert_eq!(tree.sidebar_for("faq").map(|s| s.name.as_str()), Some("extra"));
        assert!(tree.sidebar_for("nope").is_none());
    }

    #[test]
    fn test_breadcrumbs() {
        let tree = tree();
        assert_eq!(
            tree.breadcrumbs("cloud/helm"),
            vec![
                Breadcrumb {
                    label: "Cloud".to_owned(),
                    doc_id: Some("cloud/index".to_owned()),
                },
                Breadcrumb {
                    label: "Packaging".to_owned(),
                    doc_id: None,
                },
            ]
        );
        assert!(tree.breadcrumbs("cloud/index").is_empty());
        assert!(tree.breadcrumbs("intro").is_empty());
    }

    #[test]
    fn test_pagination() {
        let tree = tree();
        let page = tree.pagination("cloud/index");
        assert_eq!(page.previous.map(|p| p.doc_id), Some("intro".to_owned()));
        assert_eq!(
            page.next,
            Some(PageLink {
                doc_id: "cloud/kubernetes".to_owned(),
                label: "K8s".to_owned(),
            })
        );

        let first = tree.pagination("intro");
        assert!(first.previous.is_none());

        // Sidebars paginate independently.
        let last = tree.pagination("cloud/helm");
        assert!(last.next.is_none());
        assert_eq!(tree.pagination("faq"), Pagination::default());
    }

    #[test]
    fn test_missing_docs_reported_together() {
        let yaml = "docs:\n  - intro\n  - ghost\n  - type: category\n    label: C\n    link: { type: doc, id: phantom }\n    items: [intro, ghost]\n";
        let err = SidebarsFile::parse(yaml, SidebarsFormat::Yaml)
            .unwrap()
            .resolve(&sample_corpus())
            .unwrap_err();
        match err {
            NavError::MissingDocs { ids } => assert_eq!(ids, vec!["ghost", "phantom"]),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_empty_category_is_error() {
        let yaml = "docs:\n  - type: category\n    label: Empty\n    items: []\n";
        let err = SidebarsFile::parse(yaml, SidebarsFormat::Yaml)
            .unwrap()
            .resolve(&sample_corpus())
            .unwrap_err();
        assert!(
            matches!(err, NavError::EmptyCategory { ref sidebar, ref label } if sidebar == "docs" && label == "Empty")
        );
    }

    #[test]
    fn test_shorthand_category() {
        let yaml = "docs:\n  - Cloud: [cloud/helm, cloud/kubernetes]\n";
        let tree = SidebarsFile::parse(yaml, SidebarsFormat::Yaml)
            .unwrap()
            .resolve(&sample_corpus())
            .unwrap();
        assert_eq!(
            tree.sidebars()[0].items,
            vec![NavNode::Category {
                label: "Cloud".to_owned(),
                collapsed: true,
                collapsible: true,
                link: None,
                items: vec![
                    NavNode::Doc {
                        id: "cloud/helm".to_owned(),
                        label: "Helm".to_owned(),
                    },
                    NavNode::Doc {
                        id: "cloud/kubernetes".to_owned(),
                        label: "K8s".to_owned(),
                    },
                ],
            }]
        );
    }

    #[test]
    fn test_first_doc() {
        assert_eq!(tree().first_doc(), Some("intro"));
        assert_eq!(NavigationTree::default().first_doc(), None);
    }
}
