use std::fmt;

/// Steps one hierarchy goes through, in order.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Stage {
    Partitioning,
    BuildingBuffers,
    Flattening,
    Materials,
    Writing,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Stage::Partitioning => "partitioning meshes by material",
            Stage::BuildingBuffers => "building vertex buffers",
            Stage::Flattening => "flattening the hierarchy",
            Stage::Materials => "exporting materials",
            Stage::Writing => "writing documents",
        };
        f.write_str(text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Progress {
    /// Hierarchy `index` (zero based) of `total` starts.
    Hierarchy { index: usize, total: usize, name: String },
    Stage { hierarchy: String, stage: Stage },
    Finished { name: String, ok: bool },
}

/// Receives progress of an export run.
///
/// The exporter calls `notify` in this order:
///
/// 1. `Progress::Hierarchy` once per hierarchy before any work on it starts
/// 2. `Progress::Stage` for each [`Stage`] the hierarchy reaches
/// 3. `Progress::Finished` once the hierarchy's documents are written or it failed
///
/// Observers only watch; nothing they do changes the exported documents.
pub trait ProgressObserver {
    fn notify(&mut self, event: &Progress);
}

/// Forwards progress to the `log` facade.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogObserver;

impl ProgressObserver for LogObserver {
    fn notify(&mut self, event: &Progress) {
        match event {
            Progress::Hierarchy { index, total, name } => {
                log::info!("Exporting {} ({}/{})", name, index + 1, total)
            }
            Progress::Stage { hierarchy, stage } => log::debug!("{}: {}", hierarchy, stage),
            Progress::Finished { name, ok: true } => log::info!("Exported {}", name),
            Progress::Finished { name, ok: false } => log::info!("Gave up on {}", name),
        }
    }
}

/// Ignores all progress.
impl ProgressObserver for () {
    fn notify(&mut self, _event: &Progress) {}
}
