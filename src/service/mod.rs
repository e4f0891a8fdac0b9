//! Service layer: the catalog projection and the selection state machine.

pub mod sector;
pub mod selection;

pub use sector::SectorService;
pub use selection::SelectionService;
