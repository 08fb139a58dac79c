// src/stage/mod.rs

//! Asset classes and the stages that transform them.
//!
//! Each asset class owns a source glob set, an output location under the
//! build directory and a transformation chain:
//!
//! - [`clean`] removes a class's previous output before its build stage runs.
//! - [`script`] lowers script sources and inlines environment references.
//! - [`style`] compiles, minifies and concatenates stylesheets.
//! - [`copy`] is the structure-preserving copy used by markup/fonts/locales.
//! - [`image`] copies static images and drives the rasterizer collaborator.
//! - [`header`] stamps the release header onto produced script artifacts.
//!
//! Stages know nothing about ordering; the dag/engine layers decide when a
//! stage runs.

pub mod clean;
pub mod context;
pub mod copy;
pub mod fsutil;
pub mod header;
pub mod image;
pub mod script;
pub mod style;

use std::fmt;

use anyhow::Result;

pub use context::{BuildContext, ClassSpec};

/// The fixed set of asset categories a build pass covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetClass {
    Scripts,
    Styles,
    Markup,
    Fonts,
    Images,
    Locales,
}

impl AssetClass {
    pub const ALL: [AssetClass; 6] = [
        AssetClass::Scripts,
        AssetClass::Styles,
        AssetClass::Markup,
        AssetClass::Fonts,
        AssetClass::Images,
        AssetClass::Locales,
    ];

    pub fn name(self) -> &'static str {
        match self {
            AssetClass::Scripts => "scripts",
            AssetClass::Styles => "styles",
            AssetClass::Markup => "markup",
            AssetClass::Fonts => "fonts",
            AssetClass::Images => "images",
            AssetClass::Locales => "locales",
        }
    }
}

impl fmt::Display for AssetClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of a single schedulable stage in the build graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum StageId {
    /// Remove the class's previous output.
    Clean(AssetClass),
    /// Transform/copy the class's sources into the build directory.
    Build(AssetClass),
    /// Rasterizer collaborator, strictly after `Build(Images)`.
    Raster,
    /// Release header stamping, after every build stage.
    Stamp,
}

impl StageId {
    /// Asset class this stage belongs to, if any. `Stamp` spans all script
    /// artifacts and carries no single class.
    pub fn class(self) -> Option<AssetClass> {
        match self {
            StageId::Clean(c) | StageId::Build(c) => Some(c),
            StageId::Raster => Some(AssetClass::Images),
            StageId::Stamp => None,
        }
    }
}

impl fmt::Display for StageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StageId::Clean(c) => write!(f, "clean:{c}"),
            StageId::Build(c) => write!(f, "build:{c}"),
            StageId::Raster => f.write_str("raster:images"),
            StageId::Stamp => f.write_str("stamp"),
        }
    }
}

/// Execute a single stage against the build context.
pub async fn run_stage(ctx: &BuildContext, stage: StageId) -> Result<()> {
    match stage {
        StageId::Clean(class) => clean::run(ctx, class),
        StageId::Build(AssetClass::Scripts) => script::run(ctx).await,
        StageId::Build(AssetClass::Styles) => style::run(ctx).await,
        StageId::Build(AssetClass::Images) => image::copy_static(ctx),
        StageId::Build(class) => copy::run(ctx, class),
        StageId::Raster => image::rasterize(ctx).await,
        StageId::Stamp => header::run(ctx),
    }
}
