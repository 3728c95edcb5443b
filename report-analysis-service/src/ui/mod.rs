pub mod html;
pub mod page;
pub mod report;
pub mod upload;

pub use page::{PageState, TransitionError, render_page};
pub use report::render_analysis;
pub use upload::{SelectedFile, UploadEvent, UploadZone};
