//! Exposure discovery: scan, filter, sort.
//!
//! Runs on the coordinator only. The produced list is frozen and broadcast;
//! workers never re-derive it, so a filesystem race cannot skew the
//! partition.

use std::fs;
use std::path::Path;

use tracing::{debug, info, warn};

use contracts::{
    Camera, DataLayout, ExpId, Flavor, FrameFormat, Night, NightRange, PipelineError, RunBlueprint,
    WorkItem,
};
use observability::record_exposure_skipped;

use crate::header;

/// Knobs that vary per run (CLI-driven), as opposed to blueprint facts.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryOptions {
    /// Half-open night selection
    pub range: NightRange,

    /// Queue items even when every expected output already exists
    pub clobber: bool,
}

/// Coordinator-side exposure discovery.
pub struct Discovery {
    layout: DataLayout,
    cameras: Vec<Camera>,
    whitelist: Vec<Flavor>,
    format: FrameFormat,
    options: DiscoveryOptions,
}

impl Discovery {
    /// Build a discovery pass from the blueprint and per-run options.
    pub fn new(blueprint: &RunBlueprint, layout: DataLayout, options: DiscoveryOptions) -> Self {
        Self {
            cameras: blueprint.cameras(),
            whitelist: blueprint.selection.flavors.clone(),
            format: blueprint.fastframe.format,
            layout,
            options,
        }
    }

    /// Enumerate, filter and sort the work list.
    ///
    /// Deterministic given (range, clobber, filesystem state): repeated runs
    /// over an unchanged tree yield an identical list in identical order.
    pub fn discover(&self) -> Result<Vec<WorkItem>, PipelineError> {
        let mut items = Vec::new();

        for night in self.candidate_nights()? {
            for expid_dir in self.exposure_dirs(&night)? {
                if let Some(item) = self.consider_exposure(&night, &expid_dir)? {
                    items.push(item);
                }
            }
        }

        // Flavor-major sort clusters similar-cost items per worker
        items.sort_by_key(WorkItem::sort_key);

        info!(items = items.len(), "discovery complete");
        Ok(items)
    }

    /// Night directories under the raw root that parse as nights and fall
    /// inside the half-open range, sorted.
    fn candidate_nights(&self) -> Result<Vec<Night>, PipelineError> {
        let mut nights = Vec::new();

        for entry in fs::read_dir(self.layout.raw_root())? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            let Ok(night) = Night::parse(name) else {
                debug!(entry = name, "ignoring non-night directory");
                continue;
            };

            if self.options.range.contains(&night) {
                nights.push(night);
            } else {
                debug!(night = %night, "night outside selected range");
            }
        }

        nights.sort();
        Ok(nights)
    }

    /// All-digit exposure directories of one night, sorted.
    fn exposure_dirs(&self, night: &Night) -> Result<Vec<String>, PipelineError> {
        let mut dirs = Vec::new();

        for entry in fs::read_dir(self.layout.night_dir(night))? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if name.bytes().all(|b| b.is_ascii_digit()) {
                dirs.push(name.to_string());
            } else {
                debug!(night = %night, entry = name, "ignoring non-exposure directory");
            }
        }

        dirs.sort();
        Ok(dirs)
    }

    /// Evaluate one exposure directory; `None` means filtered out.
    fn consider_exposure(
        &self,
        night: &Night,
        expid_dir: &str,
    ) -> Result<Option<WorkItem>, PipelineError> {
        let dir = self.layout.night_dir(night).join(expid_dir);
        let Some(simspec) = find_simspec(&dir)? else {
            debug!(night = %night, expid = expid_dir, "no simspec input in exposure directory");
            return Ok(None);
        };

        // The header is authoritative for both metadata fields; the
        // directory name is only a navigation convention.
        let header = header::read_header(&simspec)?;

        if expid_dir != header.expid.padded() {
            warn!(
                night = %night,
                dir = expid_dir,
                header_expid = %header.expid,
                "exposure directory name disagrees with header EXPID"
            );
        }

        let item = WorkItem {
            night: night.clone(),
            expid: header.expid,
            flavor: header.flavor,
            simspec,
        };

        if !self.whitelist.contains(&item.flavor) {
            info!(item = %item, "skipping non-whitelisted flavor");
            record_exposure_skipped("flavor");
            return Ok(None);
        }

        if !self.options.clobber && self.is_complete(&item) {
            info!(item = %item, "skipping exposure, all outputs exist");
            record_exposure_skipped("complete");
            return Ok(None);
        }

        Ok(Some(item))
    }

    /// Conservative completeness test: an exposure is done only when every
    /// expected output exists. Partial completion is retried in full.
    fn is_complete(&self, item: &WorkItem) -> bool {
        self.layout
            .expected_outputs(self.format, &self.cameras, item)
            .iter()
            .all(|path| path.exists())
    }
}

/// First `simspec-*.fits` file in an exposure directory.
fn find_simspec(dir: &Path) -> Result<Option<std::path::PathBuf>, PipelineError> {
    let mut matches = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else {
            continue;
        };
        if name.starts_with("simspec-") && name.ends_with(".fits") {
            matches.push(entry.path());
        }
    }

    matches.sort();
    Ok(matches.into_iter().next())
}

/// Convenience for callers that don't need to keep the `Discovery` around.
pub fn discover(
    blueprint: &RunBlueprint,
    layout: DataLayout,
    options: DiscoveryOptions,
) -> Result<Vec<WorkItem>, PipelineError> {
    Discovery::new(blueprint, layout, options).discover()
}
