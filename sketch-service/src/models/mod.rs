pub mod upload;
pub mod ui_description;

pub use ui_description::{
    Element, ElementType, ElementValue, Layout, NavItem, NavVariant, Position, Section, Size,
    UiDescription,
};
pub use upload::{SketchImage, UploadResponse};
