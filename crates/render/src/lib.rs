pub mod diagram;
pub mod layout;
pub mod mermaid;

pub use diagram::render_diagram;
pub use mermaid::{document as mermaid_document, flowchart, save_document as save_mermaid};
