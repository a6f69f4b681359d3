/// An absolute, `/`-delimited path in the projected tree
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodePath {
    /// Path segments (e.g., ["content", "dropbox", "foo.txt"])
    segments: Vec<String>,
}

impl NodePath {
    /// Parse a path string, dropping empty and `.` segments
    pub fn parse(path: &str) -> Self {
        let segments: Vec<String> = path
            .trim_start_matches('/')
            .split('/')
            .filter(|s| !s.is_empty() && *s != ".")
            .map(String::from)
            .collect();

        NodePath { segments }
    }

    /// The root path `/`
    pub fn root() -> Self {
        NodePath {
            segments: Vec::new(),
        }
    }

    /// Get the path segments
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Check if this path is the root
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Number of segments below the root
    pub fn depth(&self) -> usize {
        self.segments.len()
    }

    /// Get the parent path; the root has none
    pub fn parent(&self) -> Option<Self> {
        if self.segments.is_empty() {
            None
        } else {
            let mut parent_segments = self.segments.clone();
            parent_segments.pop();
            Some(NodePath {
                segments: parent_segments,
            })
        }
    }

    /// Get the last segment
    pub fn name(&self) -> Option<&str> {
        self.segments.last().map(|s| s.as_str())
    }

    /// Join this path with a relative one, resolving `..`
    pub fn join(&self, other: &str) -> Self {
        let mut new_segments = self.segments.clone();

        for segment in other.split('/') {
            if segment.is_empty() || segment == "." {
                continue;
            } else if segment == ".." {
                new_segments.pop();
            } else {
                new_segments.push(segment.to_string());
            }
        }

        NodePath {
            segments: new_segments,
        }
    }

    /// True when `self` is a strict ancestor of `other`, compared segment-wise
    pub fn is_ancestor_of(&self, other: &NodePath) -> bool {
        self.segments.len() < other.segments.len() && other.segments.starts_with(&self.segments)
    }

    /// True when `self` equals `other` or is one of its ancestors
    pub fn is_ancestor_or_self(&self, other: &NodePath) -> bool {
        other.segments.starts_with(&self.segments)
    }
}

impl std::fmt::Display for NodePath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.segments.is_empty() {
            write!(f, "/")
        } else {
            write!(f, "/{}", self.segments.join("/"))
        }
    }
}

/// Concatenate a parent path and a name without doubling the separator
pub fn concat(parent: &str, name: &str) -> String {
    let name = name.trim_start_matches('/');
    if parent.is_empty() || parent == "/" {
        format!("/{name}")
    } else if name.is_empty() {
        parent.to_string()
    } else {
        format!("{}/{}", parent.trim_end_matches('/'), name)
    }
}

/// Parent of an absolute path string (`/` for top-level entries and the root)
pub fn parent_of(path: &str) -> String {
    NodePath::parse(path)
        .parent()
        .unwrap_or_else(NodePath::root)
        .to_string()
}

/// Last segment of a path string, empty for the root
pub fn name_of(path: &str) -> &str {
    path.trim_end_matches('/').rsplit('/').next().unwrap_or("")
}
