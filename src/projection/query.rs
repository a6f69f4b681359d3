//! A query manager that understands exactly one statement shape: the XPath
//! listing of a folder's non-hidden children, newest first.
//!
//! ```text
//! /jcr:root<queryPath>/*[((@hidden = 'false' or not(@hidden)))] order by @jcr:created descending
//! ```
//!
//! When `queryPath` is the parent of a mount root the mount roots themselves
//! are listed; when it lies within a mount root its children are listed.
//! Everything else returns no rows. Ordering is enumeration order, and
//! limits, offsets and bind values are accepted and ignored.

use tracing::debug;

use super::node::ProjectedNode;
use super::session::Session;
use super::value::Value;
use crate::error::{MountError, Result};
use crate::tree::{JCR_PATH, NodePath};

pub const XPATH: &str = "xpath";
pub const SQL: &str = "sql";
pub const JCR_SQL2: &str = "JCR-SQL2";
pub const JCR_JQOM: &str = "JCR-JQOM";

const SUPPORTED_LANGUAGES: &[&str] = &[XPATH, SQL, JCR_SQL2, JCR_JQOM];

const ROOT_ANCHOR: &str = "/jcr:root";
const LISTING_SUFFIX: &str =
    "/*[((@hidden = 'false' or not(@hidden)))] order by @jcr:created descending";

/// A path the query manager answers for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MountRoot {
    Path(NodePath),
    /// `*` matches within a segment, `**` any number of segments, `?` one character
    Glob(String),
}

impl MountRoot {
    /// `glob:<pattern>` or a plain absolute path
    pub fn parse(root: &str) -> Self {
        match root.strip_prefix("glob:") {
            Some(pattern) => MountRoot::Glob(pattern.to_string()),
            None => MountRoot::Path(NodePath::parse(root)),
        }
    }

    /// Whether `path` is this root or lies below it
    pub fn matches(&self, path: &NodePath) -> bool {
        match self {
            MountRoot::Path(root) => root.is_ancestor_or_self(path),
            MountRoot::Glob(pattern) => {
                let pattern: Vec<&str> = pattern.split('/').filter(|s| !s.is_empty()).collect();
                let segments = path.segments();
                (0..=segments.len()).any(|n| glob_segments(&pattern, &segments[..n]))
            }
        }
    }

    fn parent(&self) -> Option<NodePath> {
        match self {
            MountRoot::Path(root) => root.parent(),
            MountRoot::Glob(_) => None,
        }
    }
}

/// What a statement asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryIntent {
    /// List the mount roots at these paths
    RootListing(Vec<String>),
    /// List the children of this path
    ChildListing(String),
    Unsupported,
}

/// Match a statement against the one recognized listing shape
pub fn classify(statement: &str, language: &str, roots: &[MountRoot]) -> QueryIntent {
    if language != XPATH {
        return QueryIntent::Unsupported;
    }
    let Some(query_path) = listing_path(statement) else {
        return QueryIntent::Unsupported;
    };

    let mut listed: Vec<String> = roots
        .iter()
        .filter(|root| root.parent().as_ref() == Some(&query_path))
        .filter_map(|root| match root {
            MountRoot::Path(path) => Some(path.to_string()),
            MountRoot::Glob(_) => None,
        })
        .collect();
    if !listed.is_empty() {
        listed.sort();
        listed.dedup();
        return QueryIntent::RootListing(listed);
    }

    if roots.iter().any(|root| root.matches(&query_path)) {
        return QueryIntent::ChildListing(query_path.to_string());
    }
    QueryIntent::Unsupported
}

/// The listing statement for the children of `path`
pub fn listing_statement(path: &str) -> String {
    let path = NodePath::parse(path);
    let path = if path.is_root() {
        String::new()
    } else {
        path.to_string()
    };
    format!("{ROOT_ANCHOR}{path}{LISTING_SUFFIX}")
}

fn listing_path(statement: &str) -> Option<NodePath> {
    let body = statement.strip_prefix(ROOT_ANCHOR)?;
    if !body.starts_with('/') || !statement.ends_with(LISTING_SUFFIX) {
        return None;
    }
    let end = body.find("/*")?;
    Some(NodePath::parse(&body[..end]))
}

fn glob_segments(pattern: &[&str], path: &[String]) -> bool {
    match pattern.split_first() {
        None => path.is_empty(),
        Some((&"**", rest)) => (0..=path.len()).any(|i| glob_segments(rest, &path[i..])),
        Some((segment, rest)) => match path.split_first() {
            Some((name, tail)) => matches_glob(name, segment) && glob_segments(rest, tail),
            None => false,
        },
    }
}

/// Match one name against a pattern with `*` and `?` wildcards
pub fn matches_glob(name: &str, pattern: &str) -> bool {
    fn go(name: &[char], pattern: &[char]) -> bool {
        match (name.first(), pattern.first()) {
            (_, Some('*')) => {
                go(name, &pattern[1..]) || (!name.is_empty() && go(&name[1..], pattern))
            }
            (Some(_), Some('?')) => go(&name[1..], &pattern[1..]),
            (Some(n), Some(p)) if n == p => go(&name[1..], &pattern[1..]),
            (None, None) => true,
            _ => false,
        }
    }

    let name: Vec<char> = name.chars().collect();
    let pattern: Vec<char> = pattern.chars().collect();
    go(&name, &pattern)
}

/// Creates and runs queries against one session
#[derive(Debug, Clone)]
pub struct QueryManager {
    session: Session,
    roots: Vec<MountRoot>,
}

impl QueryManager {
    pub fn new(session: Session, roots: Vec<MountRoot>) -> Self {
        QueryManager { session, roots }
    }

    pub fn roots(&self) -> &[MountRoot] {
        &self.roots
    }

    pub fn supported_languages(&self) -> &'static [&'static str] {
        SUPPORTED_LANGUAGES
    }

    pub fn create_query(&self, statement: &str, language: &str) -> Query {
        Query {
            manager: self.clone(),
            statement: statement.to_string(),
            language: language.to_string(),
        }
    }

    /// Run `statement` and return its rows
    pub fn evaluate(&self, statement: &str, language: &str) -> Vec<Row> {
        self.create_query(statement, language).execute().rows
    }
}

#[derive(Debug, Clone)]
pub struct Query {
    manager: QueryManager,
    statement: String,
    language: String,
}

impl Query {
    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    /// Queries are never persisted
    pub fn stored_query_path(&self) -> Option<&str> {
        None
    }

    pub fn set_limit(&mut self, _limit: u64) {}

    pub fn set_offset(&mut self, _offset: u64) {}

    pub fn bind_value(&mut self, _name: &str, _value: Value) {}

    pub fn bind_variable_names(&self) -> Vec<String> {
        Vec::new()
    }

    pub fn execute(&self) -> QueryResult {
        let session = &self.manager.session;
        let intent = classify(&self.statement, &self.language, &self.manager.roots);

        let nodes: Vec<ProjectedNode> = match &intent {
            QueryIntent::RootListing(paths) => paths
                .iter()
                .filter_map(|path| session.get_node_or_none(path))
                .collect(),
            QueryIntent::ChildListing(path) => session.provider().get_children(path).collect(),
            QueryIntent::Unsupported => Vec::new(),
        };

        debug!(
            statement = %self.statement,
            language = %self.language,
            ?intent,
            rows = nodes.len(),
            "query executed"
        );

        QueryResult {
            rows: nodes.into_iter().map(Row::new).collect(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct QueryResult {
    rows: Vec<Row>,
}

impl QueryResult {
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ProjectedNode> {
        self.rows.iter().map(Row::node)
    }

    /// Column names are not tracked
    pub fn column_names(&self) -> &[String] {
        &[]
    }

    pub fn selector_names(&self) -> &[String] {
        &[]
    }

    pub fn into_rows(self) -> Vec<Row> {
        self.rows
    }
}

/// One result node: `jcr:path` first, then each property's first value
#[derive(Debug, Clone)]
pub struct Row {
    node: ProjectedNode,
    values: Vec<Value>,
}

impl Row {
    fn new(node: ProjectedNode) -> Self {
        let mut values = vec![Value::from(node.path())];
        values.extend(node.properties().map(|p| p.value().clone()));
        Row { node, values }
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Value of a column by property name; `jcr:path` is the node path
    pub fn value(&self, column: &str) -> Result<Value> {
        if column == JCR_PATH {
            return Ok(Value::from(self.node.path()));
        }
        self.node
            .properties()
            .find(|p| p.name() == column)
            .map(|p| p.value().clone())
            .ok_or_else(|| MountError::ItemNotFound {
                name: column.to_string(),
            })
    }

    pub fn path(&self) -> &str {
        self.node.path()
    }

    pub fn node(&self) -> &ProjectedNode {
        &self.node
    }

    pub fn score(&self) -> f64 {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listing(path: &str) -> String {
        listing_statement(path)
    }

    fn roots() -> Vec<MountRoot> {
        vec![MountRoot::parse("/content/dropbox")]
    }

    #[test]
    fn test_parent_of_mount_root_lists_roots() {
        assert_eq!(
            classify(&listing("/content"), XPATH, &roots()),
            QueryIntent::RootListing(vec!["/content/dropbox".to_string()])
        );
    }

    #[test]
    fn test_mount_root_lists_children() {
        assert_eq!(
            classify(&listing("/content/dropbox"), XPATH, &roots()),
            QueryIntent::ChildListing("/content/dropbox".to_string())
        );
        assert_eq!(
            classify(&listing("/content/dropbox/bar"), XPATH, &roots()),
            QueryIntent::ChildListing("/content/dropbox/bar".to_string())
        );
    }

    #[test]
    fn test_root_listing_is_sorted_and_deduplicated() {
        let roots = vec![
            MountRoot::parse("/content/s3"),
            MountRoot::parse("/content/dropbox"),
            MountRoot::parse("/content/s3"),
        ];
        assert_eq!(
            classify(&listing("/content"), XPATH, &roots),
            QueryIntent::RootListing(vec![
                "/content/dropbox".to_string(),
                "/content/s3".to_string()
            ])
        );
    }

    #[test]
    fn test_unrecognized_statements() {
        let roots = roots();
        let unsupported = |statement: &str, language: &str| {
            classify(statement, language, &roots) == QueryIntent::Unsupported
        };

        assert!(unsupported(&listing("/content/dropbox"), SQL));
        assert!(unsupported(&listing("/content/dropbox"), "lucene"));
        assert!(unsupported(&listing("/apps"), XPATH));
        assert!(unsupported("/jcr:root/content/dropbox/*", XPATH));
        assert!(unsupported(&format!("/content/dropbox{LISTING_SUFFIX}"), XPATH));
        // string prefix of the root, not a segment-wise descendant
        assert!(unsupported(&listing("/content/dropboxes"), XPATH));
    }

    #[test]
    fn test_repository_root_is_parent_of_top_level_mount() {
        let roots = vec![MountRoot::parse("/dropbox")];
        assert_eq!(
            classify(&listing(""), XPATH, &roots),
            QueryIntent::RootListing(vec!["/dropbox".to_string()])
        );
    }

    #[test]
    fn test_glob_roots() {
        let roots = vec![MountRoot::parse("glob:/content/*/files")];
        assert_eq!(
            classify(&listing("/content/dropbox/files"), XPATH, &roots),
            QueryIntent::ChildListing("/content/dropbox/files".to_string())
        );
        assert_eq!(classify(&listing("/content/dropbox"), XPATH, &roots), QueryIntent::Unsupported);

        let deep = MountRoot::parse("glob:/content/**/media");
        assert!(deep.matches(&NodePath::parse("/content/media")));
        assert!(deep.matches(&NodePath::parse("/content/a/b/media/2024")));
        assert!(!deep.matches(&NodePath::parse("/apps/media")));
    }

    #[test]
    fn test_matches_glob() {
        assert!(matches_glob("foo.txt", "*.txt"));
        assert!(matches_glob("foo.txt", "f?o.*"));
        assert!(matches_glob("foo", "*"));
        assert!(matches_glob("", "*"));
        assert!(!matches_glob("foo.txt", "*.rs"));
        assert!(!matches_glob("foo", "fo"));
    }
}
