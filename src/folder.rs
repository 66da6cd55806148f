use crate::resource::ResourceRecord;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Identifier of the node holding resources without a folder.
pub const ROOT: &str = "root";

const SEPARATOR: char = '/';

/// How empty segments in a folder path (`A//B`, `A/`) are treated.
///
/// Leading separators are stripped under every policy: a folder has to
/// start with a named segment, the empty path always addresses the root.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SegmentPolicy {
    /// Every literal segment after the first, empty or not, is part of the
    /// node identity.
    #[default]
    Preserve,

    /// Empty segments are dropped before any ancestor is derived.
    Collapse,
}

impl SegmentPolicy {
    /// Split a path into segments. No segments means the root.
    fn segments<'a>(&self, path: &'a str) -> Vec<&'a str> {
        let path = path.trim_start_matches(SEPARATOR);
        if path.is_empty() {
            return vec![];
        }

        match self {
            Self::Preserve => path.split(SEPARATOR).collect(),
            Self::Collapse => path
                .split(SEPARATOR)
                .filter(|segment| !segment.is_empty())
                .collect(),
        }
    }

    /// Bring a lookup path into the same shape the tree keys are in.
    /// The root comes out as the empty string.
    fn normalize(&self, path: &str) -> String {
        self.segments(path).join("/")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderNode {
    /// Full path, all ancestor segments joined by `/`
    pub path: String,

    /// Number of segments in the path, 0 for the root
    pub depth: usize,

    /// Resources whose folder is exactly this one
    pub direct_count: usize,

    /// Resources in this folder and every folder below it
    pub cumulative_count: usize,
}

impl FolderNode {
    fn new(path: String, depth: usize) -> Self {
        Self {
            path,
            depth,
            direct_count: 0,
            cumulative_count: 0,
        }
    }
}

/// Child folder as shown while browsing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FolderEntry {
    pub path: String,

    /// Last segment of the path. Not unique across parents.
    pub name: String,

    pub cumulative_count: usize,
}

/// Everything needed to render a single folder.
#[derive(Debug, Clone, Serialize)]
pub struct FolderListing {
    pub path: String,
    pub folders: Vec<FolderEntry>,
    pub resources: Vec<ResourceRecord>,
    pub cumulative_count: usize,
}

/// Folder hierarchy derived from the flat `folder_path` of general resources.
///
/// Nodes live in a map keyed by their full path. The tree is never mutated,
/// it gets rebuilt whenever the underlying resource list changes.
#[derive(Debug, Clone, Default)]
pub struct FolderTree {
    policy: SegmentPolicy,
    nodes: BTreeMap<String, FolderNode>,
    members: HashMap<String, Vec<ResourceRecord>>,
    root: Vec<ResourceRecord>,
}

impl FolderTree {
    pub fn new(resources: impl IntoIterator<Item = ResourceRecord>) -> Self {
        Self::with_policy(resources, SegmentPolicy::default())
    }

    pub fn with_policy(
        resources: impl IntoIterator<Item = ResourceRecord>,
        policy: SegmentPolicy,
    ) -> Self {
        let mut tree = Self {
            policy,
            ..Default::default()
        };

        for resource in resources {
            if resource.company_id.is_some() {
                continue;
            }
            tree.insert(resource);
        }

        tree
    }

    fn insert(&mut self, resource: ResourceRecord) {
        let segments = resource
            .folder_path
            .as_deref()
            .map(|path| self.policy.segments(path))
            .unwrap_or_default();

        if segments.is_empty() {
            self.root.push(resource);
            return;
        }

        // Every prefix of the path is an ancestor, the last one being the
        // resource's own folder.
        let mut prefix = String::new();
        for (i, segment) in segments.iter().enumerate() {
            if i > 0 {
                prefix.push(SEPARATOR);
            }
            prefix.push_str(segment);

            self.nodes
                .entry(prefix.clone())
                .or_insert_with(|| FolderNode::new(prefix.clone(), i + 1))
                .cumulative_count += 1;
        }

        if let Some(node) = self.nodes.get_mut(&prefix) {
            node.direct_count += 1;
        }

        self.members.entry(prefix).or_default().push(resource);
    }

    pub fn policy(&self) -> SegmentPolicy {
        self.policy
    }

    /// All folder nodes ordered by path. The root group is not included.
    pub fn nodes(&self) -> impl Iterator<Item = &FolderNode> {
        self.nodes.values()
    }

    /// Look up a node. Any path that normalizes to nothing resolves to the
    /// root group.
    pub fn node(&self, path: &str) -> Option<FolderNode> {
        let current = self.policy.normalize(path);

        if current.is_empty() {
            return Some(FolderNode {
                path: ROOT.to_string(),
                depth: 0,
                direct_count: self.root.len(),
                cumulative_count: self.root.len(),
            });
        }

        self.nodes.get(&current).cloned()
    }

    pub fn contains(&self, path: &str) -> bool {
        let current = self.policy.normalize(path);
        current.is_empty() || self.nodes.contains_key(&current)
    }

    /// Folders exactly one level below `path`, ordered by full path.
    /// The empty path lists the top level folders.
    pub fn list_children(&self, path: &str) -> Vec<FolderEntry> {
        let current = self.policy.normalize(path);

        if current.is_empty() {
            return self
                .nodes
                .values()
                .filter(|node| node.depth == 1)
                .map(FolderEntry::from)
                .collect();
        }

        let depth = self.policy.segments(&current).len() + 1;
        let prefix = format!("{current}{SEPARATOR}");

        self.nodes
            .range(prefix.clone()..)
            .take_while(|(key, _)| key.starts_with(&prefix))
            .filter(|(_, node)| node.depth == depth)
            .map(|(_, node)| FolderEntry::from(node))
            .collect()
    }

    /// Resources that live in `path` itself and not in one of its descendants.
    pub fn list_direct_resources(&self, path: &str) -> &[ResourceRecord] {
        let current = self.policy.normalize(path);

        if current.is_empty() {
            return &self.root;
        }

        self.members
            .get(&current)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn direct_count(&self, path: &str) -> usize {
        self.node(path).map(|node| node.direct_count).unwrap_or(0)
    }

    pub fn cumulative_count(&self, path: &str) -> usize {
        self.node(path).map(|node| node.cumulative_count).unwrap_or(0)
    }

    pub fn child_count(&self, path: &str) -> usize {
        self.list_children(path).len()
    }

    pub fn listing(&self, path: &str) -> FolderListing {
        FolderListing {
            path: self.policy.normalize(path),
            folders: self.list_children(path),
            resources: self.list_direct_resources(path).to_vec(),
            cumulative_count: self.cumulative_count(path),
        }
    }
}

impl From<&FolderNode> for FolderEntry {
    fn from(node: &FolderNode) -> Self {
        let name = node
            .path
            .rsplit(SEPARATOR)
            .next()
            .unwrap_or_default()
            .to_string();

        Self {
            path: node.path.clone(),
            name,
            cumulative_count: node.cumulative_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paths(entries: &[FolderEntry]) -> Vec<&str> {
        entries.iter().map(|e| e.path.as_str()).collect()
    }

    fn sample() -> Vec<ResourceRecord> {
        vec![
            ResourceRecord::fixture(1, Some("Apt")),
            ResourceRecord::fixture(2, Some("Apt/MCQ")),
            ResourceRecord::fixture(3, None),
        ]
    }

    #[test]
    fn lists_top_level_and_nested() {
        let tree = FolderTree::new(sample());

        let top = tree.list_children("");
        assert_eq!(vec!["Apt"], paths(&top));
        assert_eq!("Apt", top[0].name);
        assert_eq!(2, top[0].cumulative_count);

        let nested = tree.list_children("Apt");
        assert_eq!(vec!["Apt/MCQ"], paths(&nested));
        assert_eq!("MCQ", nested[0].name);
        assert_eq!(1, nested[0].cumulative_count);

        let root = tree.list_direct_resources("");
        assert_eq!(1, root.len());
        assert_eq!(uuid::Uuid::from_u128(3), root[0].id);
    }

    #[test]
    fn direct_resources_exclude_descendants() {
        let tree = FolderTree::new(sample());

        let apt = tree.list_direct_resources("Apt");
        assert_eq!(1, apt.len());
        assert_eq!(uuid::Uuid::from_u128(1), apt[0].id);

        assert!(tree.list_direct_resources("Nope").is_empty());
    }

    #[test]
    fn ancestors_are_registered_for_deep_paths() {
        let tree = FolderTree::new(vec![ResourceRecord::fixture(1, Some("A/B/C"))]);

        assert!(tree.contains("A"));
        assert!(tree.contains("A/B"));
        assert!(tree.contains("A/B/C"));

        assert_eq!(1, tree.cumulative_count("A"));
        assert_eq!(1, tree.cumulative_count("A/B"));
        assert_eq!(0, tree.direct_count("A/B"));
        assert_eq!(1, tree.direct_count("A/B/C"));
        assert_eq!(3, tree.node("A/B/C").unwrap().depth);
    }

    #[test]
    fn children_are_one_level_deep_and_sorted() {
        let tree = FolderTree::new(vec![
            ResourceRecord::fixture(1, Some("Coding/Trees/BST")),
            ResourceRecord::fixture(2, Some("Coding/Arrays")),
            ResourceRecord::fixture(3, Some("Coding/Graphs")),
            ResourceRecord::fixture(4, Some("CodingExtra")),
            ResourceRecord::fixture(5, Some("Aptitude")),
        ]);

        assert_eq!(
            vec!["Aptitude", "Coding", "CodingExtra"],
            paths(&tree.list_children(""))
        );
        assert_eq!(
            vec!["Coding/Arrays", "Coding/Graphs", "Coding/Trees"],
            paths(&tree.list_children("Coding"))
        );
        assert_eq!(3, tree.child_count("Coding"));
        assert_eq!(
            vec!["Coding/Trees/BST"],
            paths(&tree.list_children("Coding/Trees"))
        );
        assert!(tree.list_children("Coding/Trees/BST").is_empty());
    }

    #[test]
    fn cumulative_counts_never_grow_towards_leaves() {
        let tree = FolderTree::new(vec![
            ResourceRecord::fixture(1, Some("A")),
            ResourceRecord::fixture(2, Some("A/B")),
            ResourceRecord::fixture(3, Some("A/B")),
            ResourceRecord::fixture(4, Some("A/B/C")),
            ResourceRecord::fixture(5, Some("A/D")),
            ResourceRecord::fixture(6, Some("E/F")),
        ]);

        for node in tree.nodes() {
            assert!(node.cumulative_count >= node.direct_count);

            for other in tree.nodes() {
                if other.path.starts_with(&format!("{}/", node.path)) {
                    assert!(node.cumulative_count >= other.cumulative_count);
                }
            }
        }

        assert_eq!(5, tree.cumulative_count("A"));
        assert_eq!(3, tree.cumulative_count("A/B"));
        assert_eq!(2, tree.direct_count("A/B"));
        assert_eq!(0, tree.direct_count("E"));
        assert_eq!(1, tree.cumulative_count("E"));
    }

    #[test]
    fn company_resources_are_skipped() {
        let mut company = ResourceRecord::fixture(9, Some("Apt"));
        company.company_id = Some(uuid::Uuid::from_u128(100));

        let mut resources = sample();
        resources.push(company);

        let tree = FolderTree::new(resources);
        assert_eq!(2, tree.cumulative_count("Apt"));
        assert_eq!(1, tree.list_direct_resources("Apt").len());
    }

    #[test]
    fn empty_path_is_root() {
        let tree = FolderTree::new(vec![
            ResourceRecord::fixture(1, Some("")),
            ResourceRecord::fixture(2, None),
        ]);

        assert_eq!(0, tree.nodes().count());
        assert_eq!(2, tree.list_direct_resources("").len());

        let root = tree.node("").unwrap();
        assert_eq!(ROOT, root.path);
        assert_eq!(0, root.depth);
        assert_eq!(2, root.cumulative_count);
    }

    #[test]
    fn preserve_keeps_empty_segments() {
        let tree = FolderTree::new(vec![
            ResourceRecord::fixture(1, Some("A//B")),
            ResourceRecord::fixture(2, Some("A/")),
        ]);

        assert_eq!(SegmentPolicy::Preserve, tree.policy());
        assert!(tree.contains("A/"));
        assert!(tree.contains("A//B"));
        assert!(!tree.contains("A/B"));

        let children = tree.list_children("A");
        assert_eq!(vec!["A/"], paths(&children));
        assert_eq!("", children[0].name);
        assert_eq!(2, children[0].cumulative_count);
        assert_eq!(1, tree.list_direct_resources("A//B").len());
    }

    #[test]
    fn leading_separator_is_not_a_folder() {
        let tree = FolderTree::new(vec![
            ResourceRecord::fixture(1, Some("/A")),
            ResourceRecord::fixture(2, Some("//A/B")),
            ResourceRecord::fixture(3, Some("/")),
        ]);

        let top = tree.list_children("");
        assert_eq!(vec!["A"], paths(&top));
        assert_eq!(2, top[0].cumulative_count);

        let listing = tree.listing("A");
        assert_eq!(vec!["A/B"], paths(&listing.folders));
        assert_eq!(1, listing.resources.len());
        assert_eq!(uuid::Uuid::from_u128(1), listing.resources[0].id);
        assert_eq!(2, listing.cumulative_count);

        assert_eq!(1, tree.list_direct_resources("/A/B").len());
        assert_eq!(1, tree.list_direct_resources("").len());
        assert!(tree.nodes().all(|node| !node.path.is_empty()));
    }

    #[test]
    fn collapse_drops_empty_segments() {
        let tree = FolderTree::with_policy(
            vec![
                ResourceRecord::fixture(1, Some("A//B")),
                ResourceRecord::fixture(2, Some("/A/B/")),
                ResourceRecord::fixture(3, Some("///")),
            ],
            SegmentPolicy::Collapse,
        );

        assert_eq!(vec!["A", "A/B"], tree.nodes().map(|n| n.path.as_str()).collect::<Vec<_>>());
        assert_eq!(2, tree.direct_count("A/B"));
        assert_eq!(2, tree.list_direct_resources("A//B").len());
        assert_eq!(vec!["A/B"], paths(&tree.list_children("A/")));
        assert_eq!(1, tree.list_direct_resources("").len());
    }

    #[test]
    fn separator_only_lookups_resolve_to_root() {
        for policy in [SegmentPolicy::Preserve, SegmentPolicy::Collapse] {
            let tree = FolderTree::with_policy(
                vec![
                    ResourceRecord::fixture(1, None),
                    ResourceRecord::fixture(2, Some("A")),
                ],
                policy,
            );

            assert!(tree.contains("///"));
            assert_eq!(Some(ROOT), tree.node("///").map(|n| n.path).as_deref());
            assert_eq!(1, tree.cumulative_count("///"));
            assert_eq!(1, tree.list_direct_resources("///").len());
            assert_eq!(vec!["A"], paths(&tree.list_children("///")));
        }
    }

    #[test]
    fn rebuilding_is_idempotent() {
        let resources = vec![
            ResourceRecord::fixture(1, Some("X/Y")),
            ResourceRecord::fixture(2, Some("X")),
            ResourceRecord::fixture(3, Some("Z")),
            ResourceRecord::fixture(4, None),
        ];

        let first = FolderTree::new(resources.clone());
        let second = FolderTree::new(resources);

        assert_eq!(
            first.nodes().collect::<Vec<_>>(),
            second.nodes().collect::<Vec<_>>()
        );
        assert_eq!(first.list_direct_resources(""), second.list_direct_resources(""));
    }

    #[test]
    fn listing_collects_folder_view() {
        let tree = FolderTree::new(sample());
        let listing = tree.listing("Apt");

        assert_eq!("Apt", listing.path);
        assert_eq!(vec!["Apt/MCQ"], paths(&listing.folders));
        assert_eq!(1, listing.resources.len());
        assert_eq!(2, listing.cumulative_count);
    }
}
