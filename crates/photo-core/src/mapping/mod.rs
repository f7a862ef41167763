//! Album to gallery mapping
//!
//! Resolution order, first match wins:
//!
//! 1. explicit rule keyed by exact album name (slug taken verbatim)
//! 2. first pattern rule, in configured order, whose regex matches the
//!    *entire* album name (slug derived with [`slugify`])
//! 3. unmapped
//!
//! Two albums resolving to the same `(category, slug)` is a configuration
//! error, never a merge.

mod slug;

pub use slug::slugify;

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use regex::Regex;
use serde::Serialize;

use crate::provider::Album;
use crate::{Error, Result};

/// Where an album's photos land in the gallery tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct GalleryTarget {
    pub category: String,
    pub slug: String,
}

impl GalleryTarget {
    pub fn new(category: impl Into<String>, slug: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            slug: slug.into(),
        }
    }
}

impl fmt::Display for GalleryTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.category, self.slug)
    }
}

/// Which kind of rule produced a mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleSource {
    Explicit,
    Pattern,
}

impl fmt::Display for RuleSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => f.write_str("explicit"),
            Self::Pattern => f.write_str("pattern"),
        }
    }
}

/// Outcome of resolving one album name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Mapped {
        target: GalleryTarget,
        source: RuleSource,
    },
    Unmapped,
}

impl Resolution {
    pub fn target(&self) -> Option<&GalleryTarget> {
        match self {
            Self::Mapped { target, .. } => Some(target),
            Self::Unmapped => None,
        }
    }

    pub fn is_mapped(&self) -> bool {
        matches!(self, Self::Mapped { .. })
    }
}

#[derive(Debug, Clone)]
struct PatternRule {
    pattern: String,
    regex: Regex,
    category: String,
}

/// Two albums that would share one output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingConflict {
    pub first: String,
    pub second: String,
    pub target: GalleryTarget,
}

impl From<MappingConflict> for Error {
    fn from(conflict: MappingConflict) -> Self {
        Error::MappingConflict {
            first: conflict.first,
            second: conflict.second,
            category: conflict.target.category,
            slug: conflict.target.slug,
        }
    }
}

/// Resolves album names into gallery targets.
///
/// Rules are immutable once built; build a new resolver to change them.
#[derive(Debug, Clone, Default)]
pub struct MappingResolver {
    explicit: BTreeMap<String, GalleryTarget>,
    patterns: Vec<PatternRule>,
}

impl MappingResolver {
    /// Build a resolver from explicit `(album name, target)` rules and ordered
    /// `(regex, category)` pattern rules.
    ///
    /// Patterns are anchored to the full album name.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidPattern`] for a regex that does not compile and
    /// [`Error::MappingConflict`] when two explicit rules share a target.
    pub fn new(
        explicit: impl IntoIterator<Item = (String, GalleryTarget)>,
        patterns: impl IntoIterator<Item = (String, String)>,
    ) -> Result<Self> {
        let mut rules = BTreeMap::new();
        let mut seen: HashMap<GalleryTarget, String> = HashMap::new();
        for (album, target) in explicit {
            if let Some(first) = seen.get(&target) {
                return Err(MappingConflict {
                    first: first.clone(),
                    second: album,
                    target,
                }
                .into());
            }
            seen.insert(target.clone(), album.clone());
            rules.insert(album, target);
        }

        let patterns = patterns
            .into_iter()
            .map(|(pattern, category)| {
                let regex = Regex::new(&format!("^(?:{pattern})$")).map_err(|e| {
                    Error::InvalidPattern {
                        pattern: pattern.clone(),
                        message: e.to_string(),
                    }
                })?;
                Ok(PatternRule {
                    pattern,
                    regex,
                    category,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            explicit: rules,
            patterns,
        })
    }

    /// Resolve one album name.
    pub fn resolve(&self, album_name: &str) -> Resolution {
        if let Some(target) = self.explicit.get(album_name) {
            return Resolution::Mapped {
                target: target.clone(),
                source: RuleSource::Explicit,
            };
        }

        if let Some(rule) = self.patterns.iter().find(|r| r.regex.is_match(album_name)) {
            tracing::trace!(album = %album_name, pattern = %rule.pattern, "Pattern rule matched");
            return Resolution::Mapped {
                target: GalleryTarget::new(rule.category.clone(), slugify(album_name)),
                source: RuleSource::Pattern,
            };
        }

        Resolution::Unmapped
    }

    /// Resolve every album, keeping input order.
    ///
    /// # Errors
    ///
    /// [`Error::MappingConflict`] for the first pair of albums sharing a target.
    pub fn resolve_all<'a>(&self, albums: &'a [Album]) -> Result<Vec<(&'a Album, Resolution)>> {
        let resolved: Vec<_> = albums
            .iter()
            .map(|album| (album, self.resolve(&album.name)))
            .collect();
        if let Some(conflict) = find_conflicts(&resolved).into_iter().next() {
            return Err(conflict.into());
        }
        Ok(resolved)
    }

    /// Every pair of albums that collide, in album order.
    pub fn conflicts(&self, albums: &[Album]) -> Vec<MappingConflict> {
        let resolved: Vec<_> = albums
            .iter()
            .map(|album| (album, self.resolve(&album.name)))
            .collect();
        find_conflicts(&resolved)
    }
}

fn find_conflicts(resolved: &[(&Album, Resolution)]) -> Vec<MappingConflict> {
    let mut owners: HashMap<&GalleryTarget, &Album> = HashMap::new();
    let mut conflicts = Vec::new();
    for (album, resolution) in resolved {
        let Some(target) = resolution.target() else {
            continue;
        };
        match owners.get(target) {
            Some(owner) if owner.id != album.id => conflicts.push(MappingConflict {
                first: owner.name.clone(),
                second: album.name.clone(),
                target: target.clone(),
            }),
            Some(_) => {}
            None => {
                owners.insert(target, *album);
            }
        }
    }
    conflicts
}
