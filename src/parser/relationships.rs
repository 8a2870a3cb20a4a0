//! Relationship path parser
//!
//! Rules for each requested path:
//! - Paths are trimmed and deduplicated ignoring case; the first spelling wins
//! - Each segment must name a relation alias of the current type, ignoring case
//! - An alias may appear only once per path (`Parent.Child.parent` is a cycle)
//! - Valid paths come back in canonical alias casing, in request order
//!
//! Every invalid path is collected before failing, and reported exactly as
//! the caller spelled it.

use std::collections::HashSet;

use crate::errors::{MapResult, MapperError};
use crate::metadata::MetadataCache;
use crate::observability::{log_event_with_fields, Event};

/// Validates and canonicalizes relationship include paths for a type.
pub struct RelationshipParser<'a> {
    cache: &'a MetadataCache,
}

impl<'a> RelationshipParser<'a> {
    pub fn new(cache: &'a MetadataCache) -> Self {
        Self { cache }
    }

    /// Declared relation aliases of a type, in declaration order.
    pub fn relationship_aliases(&self, type_name: &str) -> MapResult<Vec<String>> {
        let descriptor = self.cache.descriptor(type_name)?;
        Ok(descriptor
            .relations()
            .map(|(_, relation)| relation.alias.clone())
            .collect())
    }

    /// Parses a comma-separated include string. Empty entries are ignored;
    /// an absent or empty string yields no paths.
    pub fn parse_include(&self, include: Option<&str>, type_name: &str) -> MapResult<Vec<String>> {
        let paths: Vec<&str> = include
            .unwrap_or_default()
            .split(',')
            .filter(|path| !path.trim().is_empty())
            .collect();
        self.parse(&paths, type_name)
    }

    /// Canonicalizes each path against `type_name`.
    ///
    /// # Errors
    ///
    /// - `UnknownRelationships` listing every path that did not resolve
    /// - `MetadataResolution` if a type along a path cannot be resolved
    pub fn parse<S: AsRef<str>>(&self, paths: &[S], type_name: &str) -> MapResult<Vec<String>> {
        let mut seen = HashSet::new();
        let mut canonical = Vec::new();
        let mut invalid = Vec::new();

        for original in paths {
            let original = original.as_ref();
            let trimmed = original.trim();
            if !seen.insert(trimmed.to_lowercase()) {
                continue;
            }

            let mut used = Vec::new();
            match self.canonicalize(type_name, trimmed, &mut used)? {
                Some(path) => canonical.push(path),
                None => invalid.push(original.to_string()),
            }
        }

        if invalid.is_empty() {
            return Ok(canonical);
        }

        let joined = invalid.join(",");
        log_event_with_fields(
            Event::RelationshipsRejected,
            &[("type", type_name), ("paths", &joined)],
        );
        Err(MapperError::UnknownRelationships { paths: invalid })
    }

    /// Resolves `path` against `type_name`, returning `None` if any segment
    /// is unknown or repeats an alias already used in the path.
    fn canonicalize(
        &self,
        type_name: &str,
        path: &str,
        used: &mut Vec<String>,
    ) -> MapResult<Option<String>> {
        let descriptor = self.cache.descriptor(type_name)?;

        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head.trim(), Some(rest)),
            None => (path.trim(), None),
        };

        let relation = match descriptor.relation_by_alias(head) {
            Some(relation) => relation,
            None => return Ok(None),
        };

        let key = relation.alias.to_lowercase();
        if used.contains(&key) {
            return Ok(None);
        }
        used.push(key);

        match rest {
            None => Ok(Some(relation.alias.clone())),
            Some(rest) => Ok(self
                .canonicalize(&relation.related_type, rest, used)?
                .map(|tail| format!("{}.{}", relation.alias, tail))),
        }
    }
}
