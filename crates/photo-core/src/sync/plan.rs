//! Sync planning
//!
//! Diffs what the provider currently holds against the state store and
//! decides, per photo, whether it must be exported. Planning never writes.

use std::collections::{HashMap, HashSet};
use std::fmt;

use photo_fs::NormalizedPath;
use sha2::{Digest, Sha256};

use crate::config::{ExportParams, OutputTemplate, output_filename};
use crate::mapping::{MappingResolver, Resolution, RuleSource};
use crate::provider::{Album, Photo, PhotoProvider};
use crate::state::{StateStore, SyncRecord};
use crate::{Error, Result};

/// Restricts a run to some albums and/or one category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AlbumFilter {
    /// Album names (or ids); empty means every album
    pub albums: Vec<String>,
    pub category: Option<String>,
}

impl AlbumFilter {
    pub fn is_empty(&self) -> bool {
        self.albums.is_empty() && self.category.is_none()
    }

    /// First requested album that matches none of `albums` by name or id.
    pub fn missing_album<'f>(&'f self, albums: &[Album]) -> Option<&'f str> {
        self.albums
            .iter()
            .find(|wanted| !albums.iter().any(|a| a.name == **wanted || a.id == **wanted))
            .map(String::as_str)
    }

    /// Whether an album is in scope.
    ///
    /// With a category filter, unmapped albums are out of scope.
    pub fn matches(&self, album: &Album, resolution: &Resolution) -> bool {
        if !self.albums.is_empty()
            && !self
                .albums
                .iter()
                .any(|a| *a == album.name || *a == album.id)
        {
            return false;
        }
        match (&self.category, resolution.target()) {
            (None, _) => true,
            (Some(category), Some(target)) => target.category == *category,
            (Some(_), None) => false,
        }
    }
}

/// Per-run switches.
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    /// Export every in-scope photo regardless of state
    pub force: bool,
    /// Report only; no export and no state writes
    pub dry_run: bool,
    pub filter: AlbumFilter,
}

/// What happens to a plan entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Export,
    Skip,
    Unmapped,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Export => "export",
            Self::Skip => "skip",
            Self::Unmapped => "unmapped",
        })
    }
}

/// Why an entry got its action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reason {
    /// Never exported before
    New,
    /// Source fingerprint differs from the record
    SourceChanged,
    /// Export parameters differ from the record
    ParamsChanged,
    /// Same photo, but it now renders to a different path
    OutputMoved,
    Forced,
    UpToDate,
    /// Photo is exported through an earlier album it also belongs to
    ClaimedBy { album: String },
    NoMatchingRule,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::New => f.write_str("new"),
            Self::SourceChanged => f.write_str("source changed"),
            Self::ParamsChanged => f.write_str("export settings changed"),
            Self::OutputMoved => f.write_str("output path changed"),
            Self::Forced => f.write_str("forced"),
            Self::UpToDate => f.write_str("up to date"),
            Self::ClaimedBy { album } => write!(f, "exported via album {album:?}"),
            Self::NoMatchingRule => f.write_str("no mapping rule"),
        }
    }
}

/// Where a mapped photo goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedTarget {
    pub category: String,
    pub slug: String,
    /// Relative to the output base
    pub output_path: NormalizedPath,
    pub rule: RuleSource,
}

/// One photo's (or one unmapped album's) decision for this run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanEntry {
    pub album_id: String,
    pub album_name: String,
    /// `None` for an unmapped album entry
    pub photo: Option<Photo>,
    pub fingerprint: Option<String>,
    pub target: Option<PlannedTarget>,
    pub action: Action,
    pub reason: Reason,
}

impl PlanEntry {
    pub fn photo_id(&self) -> Option<&str> {
        self.photo.as_ref().map(|p| p.id.as_str())
    }
}

/// Totals by action.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlanCounts {
    pub export: usize,
    pub skip: usize,
    pub unmapped: usize,
}

/// Ordered plan for one run: albums in enumeration order, photos in album
/// membership order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncPlan {
    pub entries: Vec<PlanEntry>,
    /// Hash of the export parameters the plan was computed against
    pub params_hash: String,
}

impl SyncPlan {
    pub fn counts(&self) -> PlanCounts {
        let mut counts = PlanCounts::default();
        for entry in &self.entries {
            match entry.action {
                Action::Export => counts.export += 1,
                Action::Skip => counts.skip += 1,
                Action::Unmapped => counts.unmapped += 1,
            }
        }
        counts
    }

    /// Entries that will be exported.
    pub fn exports(&self) -> impl Iterator<Item = &PlanEntry> {
        self.entries.iter().filter(|e| e.action == Action::Export)
    }

    /// True when nothing needs exporting.
    pub fn is_noop(&self) -> bool {
        self.exports().next().is_none()
    }
}

/// Decide one photo's action against its existing record.
///
/// Precedence: no record, force, source change, parameter change, moved
/// output, then up to date.
pub fn decide(
    record: Option<&SyncRecord>,
    fingerprint: &str,
    params_hash: &str,
    output_path: &NormalizedPath,
    force: bool,
) -> (Action, Reason) {
    let Some(record) = record else {
        return (Action::Export, Reason::New);
    };
    if force {
        (Action::Export, Reason::Forced)
    } else if record.fingerprint != fingerprint {
        (Action::Export, Reason::SourceChanged)
    } else if record.params_hash != params_hash {
        (Action::Export, Reason::ParamsChanged)
    } else if record.output_path != output_path.as_str() {
        (Action::Export, Reason::OutputMoved)
    } else {
        (Action::Skip, Reason::UpToDate)
    }
}

/// Builds a [`SyncPlan`] from provider albums, mapping rules and state.
#[derive(Debug, Clone, Copy)]
pub struct SyncPlanner<'a> {
    resolver: &'a MappingResolver,
    state: &'a StateStore,
    template: &'a OutputTemplate,
    params: &'a ExportParams,
}

impl<'a> SyncPlanner<'a> {
    pub fn new(
        resolver: &'a MappingResolver,
        state: &'a StateStore,
        template: &'a OutputTemplate,
        params: &'a ExportParams,
    ) -> Self {
        Self {
            resolver,
            state,
            template,
            params,
        }
    }

    /// Plan a run over `albums`.
    ///
    /// Mapping conflicts are checked across every album before the filter is
    /// applied, so a filtered run fails the same way a full run would.
    ///
    /// # Errors
    ///
    /// Configuration errors (mapping conflict, unusable output path),
    /// [`Error::AlbumNotFound`] when the filter names an album the provider
    /// does not have, provider errors and state store errors. Nothing is
    /// written either way.
    pub fn plan(
        &self,
        provider: &dyn PhotoProvider,
        albums: &[Album],
        options: &SyncOptions,
    ) -> Result<SyncPlan> {
        let resolved = self.resolver.resolve_all(albums)?;
        if let Some(name) = options.filter.missing_album(albums) {
            return Err(Error::AlbumNotFound {
                name: name.to_string(),
            });
        }
        let params_hash = self.params.hash();

        let mapped_order: Vec<(&str, &str)> = resolved
            .iter()
            .filter(|(_, r)| r.is_mapped())
            .map(|(a, _)| (a.id.as_str(), a.name.as_str()))
            .collect();

        let mut entries = Vec::new();
        let mut used_paths = UsedPaths::new(self.state.list_all()?);

        for (album, resolution) in &resolved {
            if !options.filter.matches(album, resolution) {
                continue;
            }

            let Resolution::Mapped { target, source } = resolution else {
                tracing::info!(album = %album.name, "Album has no mapping rule");
                entries.push(PlanEntry {
                    album_id: album.id.clone(),
                    album_name: album.name.clone(),
                    photo: None,
                    fingerprint: None,
                    target: None,
                    action: Action::Unmapped,
                    reason: Reason::NoMatchingRule,
                });
                continue;
            };

            for photo in ordered_photos(album, provider.list_photos(&album.id)?) {
                if let Some(owner) = claiming_album(&photo, &album.id, &mapped_order) {
                    entries.push(PlanEntry {
                        album_id: album.id.clone(),
                        album_name: album.name.clone(),
                        photo: Some(photo),
                        fingerprint: None,
                        target: None,
                        action: Action::Skip,
                        reason: Reason::ClaimedBy {
                            album: owner.to_string(),
                        },
                    });
                    continue;
                }

                let fingerprint = provider.fingerprint(&photo);
                let record = self.state.get(&photo.id)?;
                let output_path = self.output_path(
                    &photo,
                    &target.category,
                    &target.slug,
                    record.as_ref(),
                    &mut used_paths,
                )?;
                let (action, reason) = decide(
                    record.as_ref(),
                    &fingerprint,
                    &params_hash,
                    &output_path,
                    options.force,
                );

                tracing::debug!(photo_id = %photo.id, %action, %reason, output = %output_path, "Planned photo");
                entries.push(PlanEntry {
                    album_id: album.id.clone(),
                    album_name: album.name.clone(),
                    photo: Some(photo),
                    fingerprint: Some(fingerprint),
                    target: Some(PlannedTarget {
                        category: target.category.clone(),
                        slug: target.slug.clone(),
                        output_path,
                        rule: *source,
                    }),
                    action,
                    reason,
                });
            }
        }

        let plan = SyncPlan {
            entries,
            params_hash,
        };
        let counts = plan.counts();
        tracing::info!(
            export = counts.export,
            skip = counts.skip,
            unmapped = counts.unmapped,
            "Sync plan ready"
        );
        Ok(plan)
    }

    /// Render the output path, suffixing the stem when the plain path belongs
    /// to another photo, either earlier in this plan or in the state store.
    ///
    /// A photo keeps the suffixed path it was recorded under while the plain
    /// path is free, so it does not move back onto a name it once lost.
    fn output_path(
        &self,
        photo: &Photo,
        category: &str,
        slug: &str,
        record: Option<&SyncRecord>,
        used: &mut UsedPaths,
    ) -> Result<NormalizedPath> {
        let extension = self.params.format.extension();
        let filename = output_filename(&photo.filename, extension);
        let plain = self.template.render(category, slug, &filename)?;
        let stem = filename
            .strip_suffix(&format!(".{extension}"))
            .unwrap_or(&filename);
        let suffixed = self.template.render(
            category,
            slug,
            &format!("{stem}-{}.{extension}", short_hash(&photo.id)),
        )?;

        let keeps_suffix = record.is_some_and(|r| r.output_path == suffixed.as_str());
        let path = if !keeps_suffix && !used.taken_by_other(&plain, &photo.id) {
            plain
        } else {
            if !keeps_suffix {
                tracing::debug!(photo_id = %photo.id, from = %plain, to = %suffixed, "Output filename collision");
            }
            suffixed
        };

        used.claim(path.clone(), &photo.id);
        Ok(path)
    }
}

/// Output paths owned by photos: those recorded in state and those claimed
/// so far in the plan being built.
struct UsedPaths {
    recorded: HashMap<String, String>,
    planned: HashMap<NormalizedPath, String>,
}

impl UsedPaths {
    fn new(records: Vec<SyncRecord>) -> Self {
        Self {
            recorded: records
                .into_iter()
                .map(|r| (r.output_path, r.photo_id))
                .collect(),
            planned: HashMap::new(),
        }
    }

    fn taken_by_other(&self, path: &NormalizedPath, photo_id: &str) -> bool {
        self.planned.get(path).is_some_and(|owner| owner != photo_id)
            || self
                .recorded
                .get(path.as_str())
                .is_some_and(|owner| owner != photo_id)
    }

    fn claim(&mut self, path: NormalizedPath, photo_id: &str) {
        self.planned.insert(path, photo_id.to_string());
    }
}

/// Provider photos ordered by the album's membership list. Listed photos
/// missing from the membership list follow in listing order.
fn ordered_photos(album: &Album, photos: Vec<Photo>) -> Vec<Photo> {
    let mut by_id: HashMap<String, Photo> =
        photos.iter().map(|p| (p.id.clone(), p.clone())).collect();
    let mut ordered = Vec::with_capacity(photos.len());
    for id in &album.photo_ids {
        match by_id.remove(id) {
            Some(photo) => ordered.push(photo),
            None => {
                tracing::warn!(album = %album.name, photo_id = %id, "Album member not returned by provider");
            }
        }
    }
    let listed_members: HashSet<&str> = album.photo_ids.iter().map(String::as_str).collect();
    ordered.extend(
        photos
            .into_iter()
            .filter(|p| !listed_members.contains(p.id.as_str())),
    );
    ordered
}

/// The first mapped album, in enumeration order, that contains `photo`, when
/// that album is not `album_id`.
fn claiming_album<'a>(
    photo: &Photo,
    album_id: &str,
    mapped_order: &[(&str, &'a str)],
) -> Option<&'a str> {
    let (owner_id, owner_name) = mapped_order
        .iter()
        .find(|(id, _)| photo.albums.contains(*id))?;
    (*owner_id != album_id).then_some(*owner_name)
}

fn short_hash(value: &str) -> String {
    Sha256::digest(value.as_bytes())
        .iter()
        .take(4)
        .map(|b| format!("{b:02x}"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn record(fingerprint: &str, params_hash: &str, output: &str) -> SyncRecord {
        SyncRecord {
            photo_id: "p".to_string(),
            album: "A".to_string(),
            category: "c".to_string(),
            output_path: output.to_string(),
            fingerprint: fingerprint.to_string(),
            params_hash: params_hash.to_string(),
            checksum: "sha256:00".to_string(),
            synced_at: Utc::now(),
        }
    }

    #[test]
    fn decide_covers_every_reason() {
        let out = NormalizedPath::new("c/a/p.jpg");
        let current = record("fp", "ph", "c/a/p.jpg");

        assert_eq!(decide(None, "fp", "ph", &out, false), (Action::Export, Reason::New));
        assert_eq!(
            decide(Some(&current), "fp", "ph", &out, false),
            (Action::Skip, Reason::UpToDate)
        );
        assert_eq!(
            decide(Some(&current), "fp", "ph", &out, true),
            (Action::Export, Reason::Forced)
        );
        assert_eq!(
            decide(Some(&current), "fp2", "ph", &out, false),
            (Action::Export, Reason::SourceChanged)
        );
        assert_eq!(
            decide(Some(&current), "fp", "ph2", &out, false),
            (Action::Export, Reason::ParamsChanged)
        );
        assert_eq!(
            decide(
                Some(&current),
                "fp",
                "ph",
                &NormalizedPath::new("c/b/p.jpg"),
                false
            ),
            (Action::Export, Reason::OutputMoved)
        );
    }

    #[test]
    fn filter_by_name_and_category() {
        use crate::mapping::GalleryTarget;

        let album = Album {
            id: "1".to_string(),
            name: "Sail Day".to_string(),
            photo_ids: vec![],
        };
        let mapped = Resolution::Mapped {
            target: GalleryTarget::new("sailing", "sail-day"),
            source: RuleSource::Pattern,
        };

        assert!(AlbumFilter::default().matches(&album, &Resolution::Unmapped));
        let by_name = AlbumFilter {
            albums: vec!["Sail Day".to_string()],
            category: None,
        };
        assert!(by_name.matches(&album, &mapped));
        let by_category = AlbumFilter {
            albums: vec![],
            category: Some("eagles".to_string()),
        };
        assert!(!by_category.matches(&album, &mapped));
        assert!(!by_category.matches(&album, &Resolution::Unmapped));
    }

    #[test]
    fn missing_album_reports_first_unknown_name() {
        let albums = vec![Album {
            id: "id-1".to_string(),
            name: "Sail Day".to_string(),
            photo_ids: vec![],
        }];
        let filter = AlbumFilter {
            albums: vec!["id-1".to_string(), "Sail Dya".to_string(), "Other".to_string()],
            category: None,
        };
        assert_eq!(filter.missing_album(&albums), Some("Sail Dya"));
        assert_eq!(AlbumFilter::default().missing_album(&albums), None);
    }

    #[test]
    fn short_hash_is_eight_hex_chars() {
        let hash = short_hash("Eagles/IMG_0001.HEIC");
        assert_eq!(hash.len(), 8);
        assert!(hash.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
