// src/watch/patterns.rs

use std::fmt;

use globset::GlobSet;

use crate::stage::context::BuildContext;
use crate::stage::AssetClass;

/// Compiled change-routing profile for one asset class.
///
/// The watcher passes paths relative to the project root (with forward
/// slashes) into [`ClassWatchProfile::matches`]; the profile re-bases them
/// against the class source dir before evaluating the source globs.
#[derive(Clone)]
pub struct ClassWatchProfile {
    class: AssetClass,
    src_dir: String,
    sources: GlobSet,
    exclude: Option<GlobSet>,
}

impl fmt::Debug for ClassWatchProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassWatchProfile")
            .field("class", &self.class)
            .field("src_dir", &self.src_dir)
            .finish_non_exhaustive()
    }
}

impl ClassWatchProfile {
    pub fn class(&self) -> AssetClass {
        self.class
    }

    /// Whether this class is interested in the given root-relative path.
    pub fn matches(&self, rel_path: &str) -> bool {
        let Some(in_src) = rel_path
            .strip_prefix(self.src_dir.as_str())
            .and_then(|rest| rest.strip_prefix('/'))
        else {
            return false;
        };

        if !self.sources.is_match(in_src) {
            return false;
        }
        if let Some(exclude) = &self.exclude
            && exclude.is_match(in_src)
        {
            return false;
        }
        true
    }
}

/// Build a profile for every class that participates in watch mode, reusing
/// the glob sets already compiled into the build context.
pub fn build_watch_profiles(ctx: &BuildContext) -> Vec<ClassWatchProfile> {
    ctx.classes
        .values()
        .filter(|spec| spec.watch)
        .map(|spec| ClassWatchProfile {
            class: spec.class,
            src_dir: spec.src_dir.clone(),
            sources: spec.sources.clone(),
            exclude: spec.exclude.clone(),
        })
        .collect()
}
